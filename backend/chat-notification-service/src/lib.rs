pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod services;

pub use config::{Config, MissingSenderPolicy};
pub use error::{AppError, DispatchError, Result};
pub use models::*;
pub use services::*;
