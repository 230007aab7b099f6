//! Request handling for Restyle.
//!
//! # Architecture
//!
//! - [`pipeline::ConvertPipeline`]: method check, optional account gate, validation, generation, bookkeeping
//! - [`pipeline::AccountGate`]: bearer auth + quota + usage log, all behind the account ports
//! - [`server`]: axum router (convert route, `/health`), CORS headers, request tracing

pub mod error;
pub mod pipeline;
pub mod server;

#[cfg(test)]
mod testing;

pub use error::SetupError;
pub use pipeline::{AccountGate, ConvertPipeline, Reply};
pub use server::{router, serve};
