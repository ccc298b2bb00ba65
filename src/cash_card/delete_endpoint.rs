//! Defines the endpoint for deleting a cash card.

use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    Error, Username,
    cash_card::core::{CashCardId, CashCardState, delete_cash_card},
};

/// A route handler for deleting a cash card.
///
/// Responds with 204 No Content on success and 404 Not Found if the card does not
/// exist or belongs to another user.
pub async fn delete_cash_card_endpoint(
    State(state): State<CashCardState>,
    Extension(owner): Extension<Username>,
    Path(cash_card_id): Path<CashCardId>,
) -> Result<StatusCode, Error> {
    let connection = state.connection()?;

    delete_cash_card(cash_card_id, owner.as_str(), &connection)?;
    tracing::debug!("Deleted cash card {cash_card_id} for {owner}");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::http::{StatusCode, header::AUTHORIZATION};

    use crate::{
        endpoints::{self, format_endpoint},
        test_utils::{basic_auth, get_test_server},
    };

    #[tokio::test]
    async fn deletes_existing_cash_card() {
        let server = get_test_server();

        let response = server
            .delete(&format_endpoint(endpoints::CASH_CARD, 99))
            .add_header(AUTHORIZATION, basic_auth("sarah1", "abc123"))
            .await;

        response.assert_status(StatusCode::NO_CONTENT);

        server
            .get(&format_endpoint(endpoints::CASH_CARD, 99))
            .add_header(AUTHORIZATION, basic_auth("sarah1", "abc123"))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn deleting_twice_is_not_found() {
        let server = get_test_server();

        server
            .delete(&format_endpoint(endpoints::CASH_CARD, 100))
            .add_header(AUTHORIZATION, basic_auth("sarah1", "abc123"))
            .await
            .assert_status(StatusCode::NO_CONTENT);

        server
            .delete(&format_endpoint(endpoints::CASH_CARD, 100))
            .add_header(AUTHORIZATION, basic_auth("sarah1", "abc123"))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn missing_cash_card_is_not_found() {
        let server = get_test_server();

        server
            .delete(&format_endpoint(endpoints::CASH_CARD, 99999))
            .add_header(AUTHORIZATION, basic_auth("sarah1", "abc123"))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn cannot_delete_other_owners_cash_card() {
        let server = get_test_server();

        server
            .delete(&format_endpoint(endpoints::CASH_CARD, 102))
            .add_header(AUTHORIZATION, basic_auth("sarah1", "abc123"))
            .await
            .assert_status(StatusCode::NOT_FOUND);

        server
            .get(&format_endpoint(endpoints::CASH_CARD, 102))
            .add_header(AUTHORIZATION, basic_auth("kumar2", "xyz789"))
            .await
            .assert_status_ok();
    }
}
