// handlers/mod.rs - Handlers grouped by security tier
//
// Public (no auth) → Protected (bearer access token required)
pub mod protected;
pub mod public;
pub mod utils;
