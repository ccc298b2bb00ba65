//! Application router configuration.

use axum::{Router, http::StatusCode, middleware, routing::get};

use crate::{
    AppState,
    auth::auth_guard,
    cash_card::{
        create_cash_card_endpoint, delete_cash_card_endpoint, edit_cash_card_endpoint,
        get_cash_card_endpoint, list_cash_cards_endpoint,
    },
    endpoints,
};

/// Return a router with all the app's routes.
///
/// Every cash card route requires basic auth credentials for a card owner.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            endpoints::CASH_CARDS,
            get(list_cash_cards_endpoint).post(create_cash_card_endpoint),
        )
        .route(
            endpoints::CASH_CARD,
            get(get_cash_card_endpoint)
                .put(edit_cash_card_endpoint)
                .delete(delete_cash_card_endpoint),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard))
        .fallback(get_404_not_found)
        .with_state(state)
}

async fn get_404_not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}
