pub mod api;
pub mod app;
pub mod config;
pub mod ingest;
pub mod loader;
pub mod normalize;
pub mod query;
pub mod services;
pub mod store;
