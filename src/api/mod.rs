//! API layer
//!
//! HTTP handlers for:
//! - Sign-in and profile pages
//! - The static game page
//! - Metrics (Prometheus)

mod game;
pub mod metrics;
mod pages;

pub use game::game_router;
pub use metrics::metrics_router;
pub use pages::pages_router;
