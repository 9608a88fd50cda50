//! Transport envelope mapping.
//!
//! Domain results carry no transport metadata; this crate derives
//! lifecycle status and message from the result content and wraps it for
//! a concrete transport. Transport handlers never compute status or
//! message themselves.

pub mod envelope;

pub use envelope::{wrap, ProtocolEnvelope, TaskStatus, TransportKind};
