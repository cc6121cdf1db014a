//! API module - HTTP transport surface: routes, handlers, and models

pub mod handlers;
pub mod models;
pub mod routes;
