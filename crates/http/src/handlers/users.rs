//! Paginated users listing.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use tazeai_db::{Builder, Filter, OrderBy, Page, PaginateOptions, User};

use crate::AppState;
use crate::api_error::ApiError;
use crate::query_types::UsersQuery;
use crate::response_types::UserView;

/// `GET /users?page=&pageSize=&query=` — newest first, optionally filtered
/// by a case-insensitive name substring. Invalid paging input falls back
/// to the defaults rather than rejecting the request.
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UsersQuery>,
) -> Result<Json<Page<UserView>>, ApiError> {
    let filter = query
        .query
        .as_deref()
        .filter(|needle| !needle.is_empty())
        .map(|needle| Filter::new().ilike("name", needle));

    let options = PaginateOptions {
        per_page: query.page_size,
        filter,
        order_by: vec![OrderBy::desc("created_at")],
    };

    let page = Builder::new(&state.db, "users")
        .paginate::<User>(query.page.as_deref(), options)
        .await?;

    Ok(Json(Page {
        data: page.data.into_iter().map(UserView::from).collect(),
        pagination: page.pagination,
        total: page.total,
        duration: page.duration,
    }))
}
