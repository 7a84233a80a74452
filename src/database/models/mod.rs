pub mod item;
pub mod user;

pub use item::{Item, ItemChanges, ItemRow, NewItem};
pub use user::User;
