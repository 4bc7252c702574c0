mod core;
mod endpoints;

pub use core::{
    NewUser, User, create_user, create_user_table, delete_user, get_user_by_identity, update_user,
};
pub use endpoints::{
    create_user_endpoint, delete_user_endpoint, get_user_endpoint, update_user_endpoint,
};
