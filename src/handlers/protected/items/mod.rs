pub mod collection;
pub mod record;
pub mod utils;

pub use collection::create as items_create;
pub use collection::list as items_list;

pub use record::delete as item_delete;
pub use record::get as item_get;
pub use record::patch as item_patch;
pub use record::put as item_put;
