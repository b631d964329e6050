pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod store;
pub mod timeline;
