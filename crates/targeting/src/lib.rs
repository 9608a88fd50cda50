//! Targeting access control: which dimensions an external caller may set
//! directly versus which are reserved for the trusted internal
//! signal-injection path.

pub mod classification;
pub mod controller;

pub use classification::ClassificationTable;
pub use controller::{apply, AccessViolation};
