//! Account layer for Restyle: who is calling, how much quota they have left,
//! and where successful conversions are logged.
//!
//! # Architecture
//!
//! - [`ports`]: `IdentityProvider`, `ProfileStore`, `UsageLogStore` traits
//! - [`supabase::SupabaseClient`]: GoTrue + PostgREST implementation of all three
//! - [`memory::MemoryAccounts`]: in-process implementation for tests and `serve --dev`

pub mod error;
pub mod memory;
pub mod ports;
pub mod supabase;

pub use error::AccountError;
pub use memory::MemoryAccounts;
pub use ports::{IdentityProvider, ProfileStore, UsageLogStore};
pub use supabase::SupabaseClient;
