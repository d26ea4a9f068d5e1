//! Deskfolio HTTP server
//!
//! Exposes the project catalog and asset uploads as a small JSON API. Routing
//! and handlers live in [`http`]; backend wiring in [`state`]. The binary in
//! `main.rs` is a thin shell over [`build_router`] so integration tests can
//! drive the exact same router.

pub mod http;
pub mod state;

pub use http::build_router;
pub use state::AppState;
