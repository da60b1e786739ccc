//! newswire: search several news APIs at once from the command line.
//!
//! The provider adapters, transport and merge logic live in the
//! [`newswire_search`] crate. This crate adds the application around it:
//!
//! - [`config`]: TOML configuration with environment-supplied credentials
//! - [`session`]: a search session that pages through results ("load more")
//! - [`digest`]: plain-text digest rendering
//! - [`logging`]: `tracing` subscriber setup for the binary

pub mod config;
pub mod digest;
pub mod error;
pub mod logging;
pub mod newswire_dirs;
pub mod session;

pub use config::NewswireConfig;
pub use error::{NewswireError, Result};
pub use session::{NewsSession, SearchSummary};
