//! Bounded retry wrappers around unreliable network operations.
//!
//! Both wrappers retry transient failures with exponential backoff and hand
//! the caller exactly one [`ClassifiedError`](nm_core::ClassifiedError) once
//! they give up. Raw transport errors never escape.

mod query;
mod request;

pub use query::ResilientQuery;
pub use request::ResilientRequest;
