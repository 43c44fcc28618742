pub mod app_state;
pub mod auth;
pub mod config;
pub mod handlers;
pub mod models;
pub mod notify;
pub mod policy;
pub mod routes;
pub mod store;
pub mod utils;
pub mod workflow;
