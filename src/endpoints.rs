//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/cashcards/{cash_card_id}', use [format_endpoint].

/// The route for listing and creating cash cards.
pub const CASH_CARDS: &str = "/cashcards";
/// The route to access a single cash card.
pub const CASH_CARD: &str = "/cashcards/{cash_card_id}";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/cashcards/{cash_card_id}', '{cash_card_id}' is the parameter.
///
/// This function assumes that an endpoint path contains at most a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
