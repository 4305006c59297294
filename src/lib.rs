//! cleanup-games — HTTP maintenance endpoint that runs a Supabase database
//! procedure with the service-role key and relays its result as JSON.
//!
//! The binary in `main.rs` wires these modules together; integration tests in
//! `tests/` drive [`api::router`] directly.

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod supabase;
