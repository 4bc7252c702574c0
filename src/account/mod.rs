mod core;
mod create_endpoint;
mod delete_endpoint;
mod detail;
mod edit_endpoint;
mod list_endpoint;

pub use core::{
    Account, AccountFields, AccountView, create_account, create_account_table, delete_account,
    get_account, get_account_view, get_account_views_by_owner, update_account,
};
pub use create_endpoint::create_account_endpoint;
pub use delete_endpoint::delete_account_endpoint;
pub use detail::{
    AccountDetail, AccountsOverview, get_account_detail_endpoint, get_accounts_overview_endpoint,
};
pub use edit_endpoint::update_account_endpoint;
pub use list_endpoint::get_accounts_endpoint;
