mod core;
mod endpoints;

pub use core::{
    Category, NewCategory, create_category, create_category_table, delete_category,
    get_categories, get_category, seed_default_categories, update_category,
};
pub use endpoints::{
    create_category_endpoint, delete_category_endpoint, get_categories_endpoint,
    get_category_endpoint, update_category_endpoint,
};
