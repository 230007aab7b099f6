//! Core types for Restyle: request/response envelopes, account records,
//! the error taxonomy surfaced to callers, and configuration.
//!
//! # Architecture
//!
//! - [`types`]: wire types for the convert endpoint and the account store
//! - [`error::ConvertError`]: every failure the handler can report, with its HTTP status and code
//! - [`config`]: `~/.restyle/config.json` schema, loader, and env overrides
//! - [`utils`]: paths, timestamps, UTF-16 length and truncation

pub mod config;
pub mod error;
pub mod types;
pub mod utils;

pub use error::ConvertError;
pub use types::{
    ConvertRequest, Envelope, Identity, NewProfile, UsageLogEntry, UsageMetadata, UsageSummary,
    UserProfile, UserSummary,
};
