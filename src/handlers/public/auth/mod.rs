// handlers/public/auth/mod.rs - Token acquisition

pub mod refresh;
pub mod token;

pub use refresh::token_refresh_post;
pub use token::token_obtain_post;
