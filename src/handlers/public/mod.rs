// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition, health and API documentation.

pub mod auth;
pub mod docs;
pub mod health;

pub use docs::{redoc_get, schema_get, swagger_get};
pub use health::health_get;
