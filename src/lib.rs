//! Convertlink - client-side session adapter for a remote conversion service
//!
//! Turns a multi-queue publish/subscribe connection into a handful of
//! observable fields a user interface can render:
//!
//! - [`transport`]: the pub/sub client contract, plus an in-memory implementation
//! - [`decode`]: per-queue payload decoders
//! - [`store`]: observable session state and job reset
//! - [`session`]: the adapter tying them together
//! - [`config`]: TOML configuration
//!
//! ```
//! use std::sync::Arc;
//! use convertlink::{MemoryTransport, OutputFormat, SessionAdapter, SessionSettings};
//!
//! let transport = Arc::new(MemoryTransport::default().with_auto_connect(true));
//! let adapter = SessionAdapter::new(transport.clone(), SessionSettings::default());
//!
//! adapter.connect();
//! assert!(adapter.is_connected());
//!
//! adapter.start_conversion("https://youtu.be/dQw4w9WgXcQ", OutputFormat::Mp3);
//! transport.deliver("/queue/progress", r#"{"progress": 40}"#);
//! assert_eq!(adapter.store().progress().get(), Some(40.0));
//! ```

pub mod config;
pub mod decode;
pub mod session;
pub mod store;
pub mod transport;

pub use convertlink_common::{Error, OutputFormat, Queue, Result};
pub use session::{SessionAdapter, SessionSettings};
pub use store::{ConnectionState, ObservableField, SessionSnapshot, SessionStore};
pub use transport::{MemoryTransport, Transport, TransportOptions};
