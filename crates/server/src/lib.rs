//! HTTP surface of the alert relay.
//!
//! `POST /handle_alert` accepts alert-manager webhook batches and forwards
//! them through the [`AlertDispatcher`](alertbridge_notify::AlertDispatcher);
//! `GET /health` reports liveness and the active channel.

pub mod api;
pub mod router;
pub mod startup;
pub mod state;

pub use router::build_router;
pub use startup::build_app_state;
pub use state::AppState;
