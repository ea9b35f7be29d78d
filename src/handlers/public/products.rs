use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::checkout::ProductView;
use crate::error::Result;
use crate::extractors::Json;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct ProductsResponse {
    pub products: Vec<ProductView>,
}

/// Active catalog products with their default price flattened in.
pub async fn list_products(State(state): State<AppState>) -> Result<Json<ProductsResponse>> {
    let products = state.checkout.list_products().await?;
    Ok(Json(ProductsResponse { products }))
}
