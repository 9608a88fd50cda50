//! Creative validation against ad-server placeholder slots.

pub mod validator;

pub use adcp_core::types::RequirementViolation;
pub use validator::{check_requirements, validate, ValidationOutcome};
