pub mod format;
pub mod openapi;
pub mod pagination;

pub use format::{ItemRepresentation, ItemSerializer};
pub use pagination::PaginatedResponse;
