pub mod manager;
pub mod models;
pub mod repository;
pub mod users;

pub use manager::{DatabaseError, DatabaseManager};
pub use repository::{ItemRepository, SqliteItemRepository};
pub use users::{SqliteUserRepository, UserRepository};
