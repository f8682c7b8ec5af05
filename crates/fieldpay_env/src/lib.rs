#![forbid(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

//!
//! Environment of the payment-field engine: logger and environment awareness.
//!

pub mod env;
pub mod logger;

#[doc(inline)]
pub use logger::*;
pub use tracing;
pub use tracing::instrument;
pub use tracing_appender;

#[doc(inline)]
pub use self::env::*;
