use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::catalog::{Category, Intent};
use crate::errors::AppError;
use crate::models::user::UserType;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CatalogQuery {
    pub category: Option<Category>,
    pub user_type: Option<UserType>,
}

#[derive(Serialize)]
pub struct CatalogResponse {
    pub intents: Vec<Intent>,
}

/// GET /api/v1/catalog
/// Lists navigable destinations, optionally filtered by category or by the
/// destinations visible to a given user role.
pub async fn handle_list_catalog(
    State(state): State<AppState>,
    Query(params): Query<CatalogQuery>,
) -> Result<Json<CatalogResponse>, AppError> {
    let intents: Vec<Intent> = match (params.category, params.user_type) {
        (Some(category), _) => state
            .catalog
            .by_category(category)
            .into_iter()
            .cloned()
            .collect(),
        (None, Some(user_type)) => state
            .catalog
            .for_user_type(user_type)
            .into_iter()
            .cloned()
            .collect(),
        (None, None) => state.catalog.all().to_vec(),
    };

    Ok(Json(CatalogResponse { intents }))
}
