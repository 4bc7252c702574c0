//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/v1/contas/{account_id}', use [format_endpoint].

/// The route for listing and creating categories.
pub const CATEGORIES: &str = "/v1/categorias";
/// The route for reading, updating and deleting a single category.
pub const CATEGORY: &str = "/v1/categorias/{category_id}";

/// The route for listing and creating the caller's accounts.
pub const ACCOUNTS: &str = "/v1/contas";
/// The route for updating and deleting one of the caller's accounts.
pub const ACCOUNT: &str = "/v1/contas/{account_id}";
/// The route for an overview of all the caller's accounts.
pub const ACCOUNTS_DETAILED: &str = "/v1/contas/detalhado";
/// The route for the detailed view of one account.
pub const ACCOUNT_DETAILED: &str = "/v1/contas/detalhado/{account_id}";

/// The route for creating transactions.
pub const TRANSACTIONS: &str = "/v1/transacoes";
/// The route for reading, updating and deleting a single transaction.
pub const TRANSACTION: &str = "/v1/transacoes/{transaction_id}";
/// The route listing all the caller's transactions.
pub const USER_TRANSACTIONS: &str = "/v1/transacoes/usuario";
/// The route listing the transactions of one account.
pub const ACCOUNT_TRANSACTIONS: &str = "/v1/transacoes/conta/{account_id}";
/// The route for the caller's expense totals per category.
pub const EXPENSES_BY_CATEGORY: &str = "/v1/transacoes/usuario/gastos-por-categoria";
/// The route for the caller's total income and expenses.
pub const INCOME_AND_EXPENSES: &str = "/v1/transacoes/usuario/entradas-saidas";

/// The route for creating users.
pub const USERS: &str = "/v1/usuarios";
/// The route for a single user.
///
/// `GET` reads the parameter as the user's external identity, while `PUT`
/// and `DELETE` read it as the user's database ID.
pub const USER: &str = "/v1/usuarios/{user_key}";

/// The route listing the bank institutions.
pub const INSTITUTIONS: &str = "/v1/instituicoes";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter starts with a left brace and ends with a right brace, e.g.
/// '{account_id}' in '/v1/contas/{account_id}'.
///
/// This function assumes that an endpoint path contains at most one parameter.
/// If no parameter is found in `endpoint_path`, the function returns the
/// original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: impl std::fmt::Display) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}

// These tests are here so that we know when we call `Uri::from_shared` it will not panic.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::format_endpoint;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok());
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::CATEGORIES);
        assert_endpoint_is_valid_uri(endpoints::CATEGORY);
        assert_endpoint_is_valid_uri(endpoints::ACCOUNTS);
        assert_endpoint_is_valid_uri(endpoints::ACCOUNT);
        assert_endpoint_is_valid_uri(endpoints::ACCOUNTS_DETAILED);
        assert_endpoint_is_valid_uri(endpoints::ACCOUNT_DETAILED);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTIONS);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTION);
        assert_endpoint_is_valid_uri(endpoints::USER_TRANSACTIONS);
        assert_endpoint_is_valid_uri(endpoints::ACCOUNT_TRANSACTIONS);
        assert_endpoint_is_valid_uri(endpoints::EXPENSES_BY_CATEGORY);
        assert_endpoint_is_valid_uri(endpoints::INCOME_AND_EXPENSES);
        assert_endpoint_is_valid_uri(endpoints::USERS);
        assert_endpoint_is_valid_uri(endpoints::USER);
        assert_endpoint_is_valid_uri(endpoints::INSTITUTIONS);
    }

    #[test]
    fn produces_valid_uri() {
        let formatted_path = format_endpoint("/hello/{world_id}", 1);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn accepts_string_ids() {
        assert_eq!(
            format_endpoint(endpoints::USER, "abc123"),
            "/v1/usuarios/abc123"
        );
    }

    #[test]
    fn returns_original_path_with_no_parameter() {
        let formatted_path = format_endpoint("/hello/world", 1);

        assert_eq!(formatted_path, "/hello/world");
    }

    #[test]
    fn parameter_in_middle() {
        let formatted_path = format_endpoint("/hello/{world}/bye", 1);

        assert_eq!(formatted_path, "/hello/1/bye");
    }
}
