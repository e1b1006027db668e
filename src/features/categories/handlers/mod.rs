pub mod category_handler;

pub use category_handler::{
    admin_list_categories, create_category, delete_category, get_category, list_categories,
    reorder_categories, update_category,
};
