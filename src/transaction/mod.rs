//! Transaction management.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and the database functions for storing transactions
//! - Filtered lookups by owner, account and type
//! - Expense totals per category and income vs. expense summaries
//! - The JSON endpoints for transactions

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod form;
mod list_endpoint;
mod query;
mod summary;
mod summary_endpoint;

pub use core::{
    NewTransaction, Transaction, create_transaction, create_transaction_table, delete_transaction,
    delete_transactions_by_account, get_transaction, update_transaction,
};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use edit_endpoint::update_transaction_endpoint;
pub use form::TransactionForm;
pub use list_endpoint::{
    get_account_transactions_endpoint, get_transaction_endpoint, get_user_transactions_endpoint,
};
pub use query::{TransactionFilter, get_transactions};
pub use summary::{
    CategoryTotal, IncomeExpenseSummary, get_expenses_by_category, get_income_expense_summary,
    group_expenses_by_category,
};
pub use summary_endpoint::{get_expenses_by_category_endpoint, get_income_and_expenses_endpoint};
