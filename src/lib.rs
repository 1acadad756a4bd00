pub mod cli;
pub mod config;
pub mod editor;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;
pub mod telemetry;
