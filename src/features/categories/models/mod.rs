mod category;

pub use category::{Category, DeletePolicy};
