/// HTTP handlers for the operational endpoints
pub mod health;

pub use health::register_routes;
