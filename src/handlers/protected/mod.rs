// handlers/protected/mod.rs - Protected handlers (bearer access token required)
//
// Every route here sits behind `jwt_auth_middleware`, so handlers may rely on
// an `AuthUser` extension being present.

pub mod items;
pub mod root;

pub use root::api_root_get;
