//! The JSON endpoints for listing, creating, updating and deleting categories.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::Response,
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    category::{
        NewCategory, create_category, delete_category, get_categories, get_category,
        update_category,
    },
    database_id::CategoryId,
    db::lock_connection,
    endpoints::{self, format_endpoint},
    response::{ApiJson, ApiPath, ApiResponse, no_content},
};

/// The state needed by the category endpoints.
#[derive(Debug, Clone)]
pub struct CategoryState {
    /// The database connection for managing categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for creating or updating a category.
#[derive(Debug, Deserialize)]
pub struct CategoryForm {
    /// Only checked on update, where it must match the ID in the path.
    #[serde(default)]
    pub id: Option<CategoryId>,
    /// The display name.
    pub name: String,
    /// Either "Entrada" or "Despesa".
    #[serde(rename = "type")]
    pub kind: String,
}

/// A route handler that lists every category, or responds with 404 if there are none.
pub async fn get_categories_endpoint(
    State(state): State<CategoryState>,
) -> Result<Response, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let categories = get_categories(&connection)?;

    if categories.is_empty() {
        return Err(Error::NoCategories);
    }

    Ok(ApiResponse::ok("Categories retrieved successfully", categories))
}

/// A route handler for a single category.
pub async fn get_category_endpoint(
    State(state): State<CategoryState>,
    ApiPath(category_id): ApiPath<CategoryId>,
) -> Result<Response, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let category = get_category(category_id, &connection)
        .map_err(|error| error.not_found_as(Error::CategoryNotFound))?;

    Ok(ApiResponse::ok("Category retrieved successfully", category))
}

/// A route handler for creating a category, responds with 201 and the new category.
pub async fn create_category_endpoint(
    State(state): State<CategoryState>,
    ApiJson(form): ApiJson<CategoryForm>,
) -> Result<Response, Error> {
    let new_category = NewCategory::new(&form.name, &form.kind)?;

    let connection = lock_connection(&state.db_connection)?;
    let category = create_category(new_category, &connection)?;
    tracing::debug!("Created category {}", category.id);

    Ok(ApiResponse::created(
        &format_endpoint(endpoints::CATEGORY, category.id),
        "Category created successfully",
        category,
    ))
}

/// A route handler for replacing the name and type of a category.
///
/// The ID in the body must match the ID in the path.
pub async fn update_category_endpoint(
    State(state): State<CategoryState>,
    ApiPath(category_id): ApiPath<CategoryId>,
    ApiJson(form): ApiJson<CategoryForm>,
) -> Result<Response, Error> {
    if form.id != Some(category_id) {
        return Err(Error::IdMismatch);
    }

    let new_category = NewCategory::new(&form.name, &form.kind)?;

    let connection = lock_connection(&state.db_connection)?;
    let category = update_category(category_id, new_category, &connection)
        .map_err(|error| error.not_found_as(Error::CategoryNotFound))?;

    Ok(ApiResponse::ok("Category updated successfully", category))
}

/// A route handler for deleting a category.
///
/// Responds with 400 while transactions still use the category.
pub async fn delete_category_endpoint(
    State(state): State<CategoryState>,
    ApiPath(category_id): ApiPath<CategoryId>,
) -> Result<Response, Error> {
    let connection = lock_connection(&state.db_connection)?;

    if delete_category(category_id, &connection)? {
        Ok(no_content())
    } else {
        Err(Error::CategoryNotFound)
    }
}
