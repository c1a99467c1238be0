mod core;
mod create_endpoint;

pub use core::{User, create_user, create_user_table, get_user};
pub use create_endpoint::create_user_endpoint;

#[cfg(test)]
pub use core::count_users;
