pub mod allowed_hosts;
pub mod auth;
pub mod response;

pub use allowed_hosts::{allowed_hosts_middleware, host_is_allowed};
pub use auth::{jwt_auth_middleware, AuthUser};
pub use response::{ApiResponse, ApiResult};
