//! Defines the endpoint for fetching a single cash card.

use axum::{
    Extension, Json,
    extract::{Path, State},
};

use crate::{
    Error, Username,
    cash_card::core::{CashCard, CashCardId, CashCardState, get_cash_card},
};

/// A route handler that responds with the cash card as JSON.
///
/// Responds with 404 Not Found if the card does not exist or belongs to another user.
pub async fn get_cash_card_endpoint(
    State(state): State<CashCardState>,
    Extension(owner): Extension<Username>,
    Path(cash_card_id): Path<CashCardId>,
) -> Result<Json<CashCard>, Error> {
    let connection = state.connection()?;

    get_cash_card(cash_card_id, owner.as_str(), &connection).map(Json)
}
