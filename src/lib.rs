pub mod config;
pub mod error;
pub mod handlers;
pub mod key_generator;
pub mod middleware;
pub mod models;
pub mod pagination;
pub mod rate_limiter;
pub mod redis;
pub mod repository;
pub mod response;
pub mod server;
pub mod service;
pub mod validation;

pub use config::Config;
pub use error::AppError;
pub use handlers::AppState;
pub use server::create_app;
