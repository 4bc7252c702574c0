//! Assembles the detailed view of an account and the overview of all of a caller's accounts.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::Response,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error, Money, TransactionType,
    account::{AccountView, get_account_view, get_account_views_by_owner},
    auth::{CallerIdentity, ensure_owned},
    database_id::AccountId,
    db::lock_connection,
    response::{ApiPath, ApiResponse},
    transaction::{
        CategoryTotal, Transaction, TransactionFilter, get_transactions, group_expenses_by_category,
    },
    user::get_user_by_identity,
};

/// An account with its transactions split by type and summarized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountDetail {
    /// The account and the name of its bank.
    #[serde(flatten)]
    pub account: AccountView,
    /// The name of the owner, or `None` if the owner has no user profile.
    pub owner_name: Option<String>,
    /// The income transactions of the account.
    pub income: Vec<Transaction>,
    /// The expense transactions of the account.
    pub expenses: Vec<Transaction>,
    /// The expense totals per category name, ordered by name.
    pub expenses_by_category: Vec<CategoryTotal>,
    /// The number of income transactions.
    pub income_count: usize,
    /// The number of expense transactions.
    pub expense_count: usize,
    /// The sum of the income transactions.
    pub total_income: Money,
    /// The sum of the expense transactions.
    pub total_expenses: Money,
}

impl AccountDetail {
    /// Summarize the `income` and `expenses` of `account`.
    ///
    /// # Errors
    /// Returns [Error::AmountOutOfRange] if a total overflows.
    pub fn new(
        account: AccountView,
        owner_name: Option<String>,
        income: Vec<Transaction>,
        expenses: Vec<Transaction>,
    ) -> Result<Self, Error> {
        let expenses_by_category = group_expenses_by_category(&expenses)?;
        let total_income = Money::checked_sum(income.iter().map(|transaction| transaction.amount))?;
        let total_expenses =
            Money::checked_sum(expenses.iter().map(|transaction| transaction.amount))?;

        Ok(Self {
            account,
            owner_name,
            income_count: income.len(),
            expense_count: expenses.len(),
            total_income,
            total_expenses,
            income,
            expenses,
            expenses_by_category,
        })
    }
}

/// All of a caller's accounts and their combined balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountsOverview {
    /// The caller's accounts.
    pub accounts: Vec<AccountView>,
    /// The sum of the account balances.
    pub total_balance: Money,
}

/// The state needed for the detailed account views.
#[derive(Debug, Clone)]
pub struct AccountDetailState {
    /// The database connection for reading accounts and transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AccountDetailState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for the caller's accounts and their total balance.
pub async fn get_accounts_overview_endpoint(
    State(state): State<AccountDetailState>,
    caller: CallerIdentity,
) -> Result<Response, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let accounts = get_account_views_by_owner(caller.as_str(), &connection)?;

    if accounts.is_empty() {
        return Err(Error::NoAccounts);
    }

    let total_balance = Money::checked_sum(accounts.iter().map(|view| view.account.balance))?;

    Ok(ApiResponse::ok(
        "Accounts retrieved successfully",
        AccountsOverview {
            accounts,
            total_balance,
        },
    ))
}

/// A route handler for the detailed view of one of the caller's accounts.
pub async fn get_account_detail_endpoint(
    State(state): State<AccountDetailState>,
    caller: CallerIdentity,
    ApiPath(account_id): ApiPath<AccountId>,
) -> Result<Response, Error> {
    let connection = lock_connection(&state.db_connection)?;

    let view = get_account_view(account_id, &connection)
        .map_err(|error| error.not_found_as(Error::AccountNotFound))?;
    let view = ensure_owned(&caller, view, Error::AccountNotFound)?;

    let detail = get_account_detail(view, &connection)?;

    Ok(ApiResponse::ok("Account detail retrieved successfully", detail))
}

fn get_account_detail(view: AccountView, connection: &Connection) -> Result<AccountDetail, Error> {
    let owner_name = match get_user_by_identity(&view.account.owner_uid, connection) {
        Ok(user) => Some(user.name),
        Err(Error::NotFound) => None,
        Err(error) => return Err(error),
    };

    let account_filter = TransactionFilter::for_account(view.account.id);
    let income = get_transactions(&account_filter.of_kind(TransactionType::Income), connection)?;
    let expenses = get_transactions(&account_filter.of_kind(TransactionType::Expense), connection)?;

    AccountDetail::new(view, owner_name, income, expenses)
}
