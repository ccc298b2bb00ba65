//! Defines the endpoint for paging through the authenticated user's cash cards.

use axum::{Extension, Json, extract::State};
use axum_extra::extract::Query;

use crate::{
    Error, Username,
    cash_card::core::{CashCard, CashCardState, DEFAULT_SORT, list_cash_cards},
    pagination::{PageParams, PageRequest},
};

/// A route handler that responds with one page of the user's cash cards as a JSON array.
///
/// Supports the query parameters `page` (zero-based), `size` and `sort` (`field` or
/// `field,direction`). `sort` may be repeated to sort by several keys. Malformed `page` and `size`
/// values fall back to the first page and the default size. Cards are sorted by ascending amount
/// by default.
pub async fn list_cash_cards_endpoint(
    State(state): State<CashCardState>,
    Extension(owner): Extension<Username>,
    Query(params): Query<PageParams>,
) -> Result<Json<Vec<CashCard>>, Error> {
    let page = PageRequest::from_params(params, &state.pagination_config, DEFAULT_SORT)?;
    tracing::debug!(
        "Listing cash cards for {owner}: page={} size={} sort={}",
        page.page,
        page.size,
        page.sort_description()
    );

    let connection = state.connection()?;

    list_cash_cards(owner.as_str(), &page, &connection).map(Json)
}
