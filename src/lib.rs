//! Data-source backend for querying a CouchDB-style database through its
//! HTTP view API and reshaping view rows into columnar time-series frames.

mod client;
mod config;
mod error;
mod executor;
mod frame;
mod types;

pub use client::{Client, ProbeOutcome};
pub use config::{Config, DEFAULT_BASE_URL};
pub use error::Error;
pub use frame::Frame;
pub use types::{ErrorPolicy, Query, SelectableOption, TimeRange};
