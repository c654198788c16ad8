pub mod api;
pub mod app;
pub mod auth;
pub mod broker;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod query;
pub mod storage;

pub use app::{app, AppState};
