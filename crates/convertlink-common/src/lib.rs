//! Convertlink-Common: Shared types, constants, and error handling.
//!
//! This crate provides the vocabulary shared by the session adapter and its
//! front ends:
//!
//! - **Queues**: The logical destinations used to talk to the conversion service
//! - **Output formats**: The target formats a conversion can be requested in
//! - **Error Handling**: Common error types and result aliases
//!
//! # Examples
//!
//! ```
//! use convertlink_common::{Error, OutputFormat, Queue, Result};
//!
//! let format: OutputFormat = "mp3".parse().unwrap();
//! assert_eq!(format.extension(), "mp3");
//!
//! assert!(Queue::Progress.is_inbound());
//! assert!(!Queue::JobStart.is_inbound());
//!
//! fn example() -> Result<()> {
//!     Err(Error::config("broker url is empty"))
//! }
//! assert!(example().is_err());
//! ```

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::*;
