pub mod api;
pub mod auth;
pub mod backend;
pub mod booking;
pub mod chat;
pub mod config;
pub mod error;
pub mod models;
pub mod views;

pub use config::Config;
pub use error::ClientError;
