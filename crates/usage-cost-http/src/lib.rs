//! HTTP adapter for usage-cost
//!
//! This crate provides:
//! - an axum router exposing the cost calculator at `POST /` and `POST /api`
//! - optional function-key authentication on the calculation routes
//! - a `GET /health` endpoint
//!
//! The calculator itself lives in `usage-cost-pricing`; nothing here touches
//! pricing logic beyond handing it a validated request.

pub mod auth;
pub mod handlers;
pub mod server;

pub use auth::FunctionKeyAuth;
pub use server::{AppState, HttpServer, ServerConfig, create_router};
