pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use config::AppConfig;
pub use error::{BrokerError, BrokerResult};
pub use result::{DomainError, DomainResult};
