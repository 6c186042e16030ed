//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber with JSON or
//! pretty output and `RUST_LOG` overrides.

pub mod logger;

pub use logger::{LogFormat, LoggerImpl};
