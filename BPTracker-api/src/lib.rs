// BPTracker-api lib.rs
//
// HTTP surface for BPTracker: routes, handlers, public entities and the
// OpenAPI document.

// Public modules
pub mod api;
pub mod config;
pub mod entities;
pub mod openapi;

pub use api::create_app;
