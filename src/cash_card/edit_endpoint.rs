//! Defines the endpoint for updating a cash card.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    Error, Username,
    cash_card::core::{CashCardForm, CashCardId, CashCardState, update_cash_card},
};

/// A route handler for replacing the amount on a cash card.
///
/// The card keeps its ID and owner. Responds with 204 No Content on success and
/// 404 Not Found if the card does not exist or belongs to another user.
pub async fn edit_cash_card_endpoint(
    State(state): State<CashCardState>,
    Extension(owner): Extension<Username>,
    Path(cash_card_id): Path<CashCardId>,
    Json(form): Json<CashCardForm>,
) -> Result<StatusCode, Error> {
    let connection = state.connection()?;

    update_cash_card(cash_card_id, owner.as_str(), form.amount, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}
