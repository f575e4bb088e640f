//! Stockroom API Library
//!
//! Core functionality for the stockroom inventory service: registries for
//! categories, machines, and materials; the transactional stock ledger; and
//! the usage-history views built on its audit trail.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod openapi;
pub mod services;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub auth: Arc<auth::AuthService>,
    pub services: handlers::AppServices,
}

pub(crate) fn default_page() -> u64 {
    1
}

pub(crate) fn default_limit() -> u64 {
    20
}

/// The versioned API surface, nested under `/api/v1` by the binary.
pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::auth_routes())
        .nest("/categories", handlers::categories::categories_router())
        .nest("/machines", handlers::machines::machines_router())
        .nest("/materials", handlers::materials::materials_router())
        .nest("/stock", handlers::stock::stock_router())
        .nest("/history", handlers::history::history_router())
        .nest("/users", handlers::users::users_router())
}
