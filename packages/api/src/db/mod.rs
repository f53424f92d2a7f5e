//! # Database module: PostgreSQL connection pool and migrations
//!
//! Gated behind `#[cfg(feature = "server")]` so client (WASM) builds never pull in SQLx.
//!
//! The pool is a lazy, process-wide singleton backed by a [`tokio::sync::OnceCell`]. The
//! first call to [`get_pool`] reads the `database` section of the server settings and
//! caches the pool for every later caller. [`run_migrations`] is called once by the web
//! server at startup.

#[cfg(feature = "server")]
mod pool;

#[cfg(feature = "server")]
pub use pool::{get_pool, run_migrations};
