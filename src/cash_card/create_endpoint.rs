//! Defines the endpoint for creating a new cash card.

use axum::{
    Extension, Json,
    extract::State,
    http::{StatusCode, header::LOCATION},
    response::{IntoResponse, Response},
};

use crate::{
    Error, Username,
    cash_card::core::{CashCardForm, CashCardState, create_cash_card},
    endpoints::{self, format_endpoint},
};

/// A route handler for creating a new cash card owned by the authenticated user.
///
/// Responds with 201 Created and the location of the new card.
pub async fn create_cash_card_endpoint(
    State(state): State<CashCardState>,
    Extension(owner): Extension<Username>,
    Json(form): Json<CashCardForm>,
) -> Result<Response, Error> {
    let cash_card = {
        let connection = state.connection()?;
        create_cash_card(form.amount, owner.as_str(), &connection)?
    };

    tracing::debug!("Created cash card {} for {}", cash_card.id, owner);

    let location = format_endpoint(endpoints::CASH_CARD, cash_card.id);

    Ok((StatusCode::CREATED, [(LOCATION, location)]).into_response())
}
