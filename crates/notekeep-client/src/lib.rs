//! # notekeep-client
//!
//! Typed client for the notekeep HTTP API.
//!
//! [`NotekeepClient`] exposes one method per endpoint and validates input
//! before sending. [`NoteCache`] keeps a snapshot of the caller's notes and
//! labels, refetching it after every mutation and publishing it through a
//! `tokio::sync::watch` channel.
//!
//! ```rust,no_run
//! use notekeep_client::{ClientConfig, NoteCache, NotekeepClient};
//!
//! # async fn run() -> notekeep_client::Result<()> {
//! let client = NotekeepClient::new(ClientConfig::from_env(), 42)?;
//! let cache = NoteCache::new(client);
//! let snapshot = cache.load().await?;
//! println!("{} pinned", snapshot.views().pinned.len());
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod client;
pub mod config;
pub mod error;

pub use cache::{NoteCache, Snapshot};
pub use client::NotekeepClient;
pub use config::ClientConfig;
pub use error::{ClientError, Result};
