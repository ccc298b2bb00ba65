//! The cash card model and the SQL queries for storing it.
//!
//! Every query that touches a single card matches on both the card ID and the owner, so a card
//! that belongs to someone else behaves exactly like a card that does not exist.

use std::{
    fmt::Display,
    str::FromStr,
    sync::{Arc, Mutex, MutexGuard},
};

use axum::extract::FromRef;
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    pagination::{PageRequest, PaginationConfig, Sort, SortOrder},
};

/// Alias for the integer type used for cash card IDs.
pub type CashCardId = i64;

/// A monetary record owned by a single user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashCard {
    /// The ID assigned by the database when the card was created.
    pub id: CashCardId,
    /// The amount of money on the card. May be negative.
    pub amount: f64,
    /// The username of the user that created the card.
    pub owner: String,
}

/// The JSON body sent to create or update a cash card.
///
/// Clients may send the full cash card shape, but `id` and `owner` are ignored: the ID is
/// assigned by the database and the owner is always the authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CashCardForm {
    /// The new amount for the card.
    pub amount: f64,
}

/// The fields a list of cash cards can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CashCardField {
    /// The card ID.
    Id,
    /// The amount on the card.
    Amount,
    /// The card owner.
    Owner,
}

impl CashCardField {
    fn as_column(&self) -> &'static str {
        match self {
            CashCardField::Id => "id",
            CashCardField::Amount => "amount",
            CashCardField::Owner => "owner",
        }
    }
}

impl FromStr for CashCardField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(CashCardField::Id),
            "amount" => Ok(CashCardField::Amount),
            "owner" => Ok(CashCardField::Owner),
            other => Err(Error::InvalidSortField(other.to_owned())),
        }
    }
}

impl Display for CashCardField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_column())
    }
}

/// Cash card lists are sorted by ascending amount unless the client asks otherwise.
pub const DEFAULT_SORT: Sort<CashCardField> = Sort {
    field: CashCardField::Amount,
    order: SortOrder::Ascending,
};

/// The state needed by the cash card endpoints.
#[derive(Debug, Clone)]
pub struct CashCardState {
    /// The database connection for managing cash cards.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The config that controls how to page through lists of cash cards.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for CashCardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config,
        }
    }
}

impl CashCardState {
    /// Lock the database connection.
    ///
    /// # Errors
    /// Returns an [Error::DatabaseLockError] if the lock is poisoned.
    pub fn connection(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.db_connection.lock().map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            Error::DatabaseLockError
        })
    }
}

/// Create the cash card table.
///
/// IDs use `AUTOINCREMENT` so that the ID of a deleted card is never handed out again.
pub fn create_cash_card_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS cash_card (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            amount REAL NOT NULL,
            owner TEXT NOT NULL
        )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_cash_card_owner ON cash_card(owner)",
        (),
    )?;

    Ok(())
}

fn map_row_to_cash_card(row: &Row) -> Result<CashCard, rusqlite::Error> {
    let id = row.get(0)?;
    let amount = row.get(1)?;
    let owner = row.get(2)?;

    Ok(CashCard { id, amount, owner })
}

/// Insert a new cash card for `owner`.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn create_cash_card(
    amount: f64,
    owner: &str,
    connection: &Connection,
) -> Result<CashCard, Error> {
    connection
        .prepare(
            "INSERT INTO cash_card (amount, owner) VALUES (?1, ?2)
             RETURNING id, amount, owner",
        )?
        .query_row((amount, owner), map_row_to_cash_card)
        .map_err(Error::from)
}

/// Get the cash card with `id` if it belongs to `owner`.
///
/// # Errors
/// Returns a:
/// - [Error::NotFound] if there is no card with `id` owned by `owner`,
/// - [Error::SqlError] if there is some other SQL error.
pub fn get_cash_card(
    id: CashCardId,
    owner: &str,
    connection: &Connection,
) -> Result<CashCard, Error> {
    connection
        .prepare("SELECT id, amount, owner FROM cash_card WHERE id = ?1 AND owner = ?2")?
        .query_row((id, owner), map_row_to_cash_card)
        .map_err(Error::from)
}

/// Get one page of the cash cards that belong to `owner`.
///
/// Cards are ordered by each requested sort key in turn and then by ascending ID so that the
/// order is the same between requests. A page past the end is empty.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn list_cash_cards(
    owner: &str,
    page: &PageRequest<CashCardField>,
    connection: &Connection,
) -> Result<Vec<CashCard>, Error> {
    let Some(offset) = page.offset() else {
        return Ok(Vec::new());
    };

    let order_by = page
        .sort
        .iter()
        .map(|sort| format!("{} {}", sort.field.as_column(), sort.order.as_sql()))
        .collect::<Vec<_>>()
        .join(", ");

    let query = format!(
        "SELECT id, amount, owner FROM cash_card
         WHERE owner = ?1
         ORDER BY {order_by}, id ASC
         LIMIT ?2 OFFSET ?3"
    );

    connection
        .prepare(&query)?
        .query_map((owner, page.limit(), offset), map_row_to_cash_card)?
        .map(|maybe_cash_card| maybe_cash_card.map_err(Error::from))
        .collect()
}

/// Set the amount of the cash card with `id` if it belongs to `owner`.
///
/// The check and the update happen in a single statement.
///
/// # Errors
/// Returns a:
/// - [Error::NotFound] if there is no card with `id` owned by `owner`,
/// - [Error::SqlError] if there is some other SQL error.
pub fn update_cash_card(
    id: CashCardId,
    owner: &str,
    amount: f64,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE cash_card SET amount = ?1 WHERE id = ?2 AND owner = ?3",
        (amount, id, owner),
    )?;

    match rows_affected {
        0 => Err(Error::NotFound),
        _ => Ok(()),
    }
}

/// Delete the cash card with `id` if it belongs to `owner`.
///
/// # Errors
/// Returns a:
/// - [Error::NotFound] if there is no card with `id` owned by `owner`,
/// - [Error::SqlError] if there is some other SQL error.
pub fn delete_cash_card(id: CashCardId, owner: &str, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM cash_card WHERE id = ?1 AND owner = ?2",
        (id, owner),
    )?;

    match rows_affected {
        0 => Err(Error::NotFound),
        _ => Ok(()),
    }
}


#[cfg(test)]
mod db_tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        cash_card::core::{
            CashCardField, DEFAULT_SORT, create_cash_card, delete_cash_card, get_cash_card,
            list_cash_cards, update_cash_card,
        },
        pagination::{PageRequest, Sort, SortOrder},
        test_utils::must_create_test_connection,
    };

    fn page(page: u64, size: u64, sort: Sort<CashCardField>) -> PageRequest<CashCardField> {
        PageRequest {
            page,
            size,
            sort: vec![sort],
        }
    }

    fn amounts(connection: &Connection, request: &PageRequest<CashCardField>) -> Vec<f64> {
        list_cash_cards("sarah1", request, connection)
            .unwrap()
            .into_iter()
            .map(|cash_card| cash_card.amount)
            .collect()
    }

    #[test]
    fn create_assigns_id_and_owner() {
        let connection = must_create_test_connection();

        let cash_card = create_cash_card(250.0, "sarah1", &connection).unwrap();

        assert!(cash_card.id > 0);
        assert_eq!(cash_card.amount, 250.0);
        assert_eq!(cash_card.owner, "sarah1");
        assert_eq!(
            get_cash_card(cash_card.id, "sarah1", &connection),
            Ok(cash_card)
        );
    }

    #[test]
    fn create_accepts_negative_amount() {
        let connection = must_create_test_connection();

        let cash_card = create_cash_card(-42.5, "sarah1", &connection).unwrap();

        assert_eq!(cash_card.amount, -42.5);
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let connection = must_create_test_connection();
        let first = create_cash_card(1.0, "sarah1", &connection).unwrap();
        let second = create_cash_card(2.0, "sarah1", &connection).unwrap();

        delete_cash_card(second.id, "sarah1", &connection).unwrap();
        let third = create_cash_card(3.0, "sarah1", &connection).unwrap();

        assert!(second.id > first.id);
        assert!(third.id > second.id);
    }

    #[test]
    fn get_hides_cards_of_other_owners() {
        let connection = must_create_test_connection();
        let cash_card = create_cash_card(200.0, "kumar2", &connection).unwrap();

        assert_eq!(
            get_cash_card(cash_card.id, "sarah1", &connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn update_changes_only_amount() {
        let connection = must_create_test_connection();
        let cash_card = create_cash_card(123.45, "sarah1", &connection).unwrap();

        update_cash_card(cash_card.id, "sarah1", 19.99, &connection).unwrap();

        let got = get_cash_card(cash_card.id, "sarah1", &connection).unwrap();
        assert_eq!(got.id, cash_card.id);
        assert_eq!(got.amount, 19.99);
        assert_eq!(got.owner, "sarah1");
    }

    #[test]
    fn update_of_other_owners_card_leaves_it_unchanged() {
        let connection = must_create_test_connection();
        let cash_card = create_cash_card(200.0, "kumar2", &connection).unwrap();

        let result = update_cash_card(cash_card.id, "sarah1", 333.33, &connection);

        assert_eq!(result, Err(Error::NotFound));
        assert_eq!(
            get_cash_card(cash_card.id, "kumar2", &connection),
            Ok(cash_card)
        );
    }

    #[test]
    fn update_of_missing_card_is_not_found() {
        let connection = must_create_test_connection();

        let result = update_cash_card(99999, "sarah1", 19.99, &connection);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn delete_twice_is_not_found() {
        let connection = must_create_test_connection();
        let cash_card = create_cash_card(1.0, "sarah1", &connection).unwrap();

        assert_eq!(
            delete_cash_card(cash_card.id, "sarah1", &connection),
            Ok(())
        );
        assert_eq!(
            delete_cash_card(cash_card.id, "sarah1", &connection),
            Err(Error::NotFound)
        );
        assert_eq!(
            get_cash_card(cash_card.id, "sarah1", &connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn delete_of_other_owners_card_keeps_it() {
        let connection = must_create_test_connection();
        let cash_card = create_cash_card(200.0, "kumar2", &connection).unwrap();

        let result = delete_cash_card(cash_card.id, "sarah1", &connection);

        assert_eq!(result, Err(Error::NotFound));
        assert_eq!(
            get_cash_card(cash_card.id, "kumar2", &connection),
            Ok(cash_card)
        );
    }

    fn insert_sarahs_cards(connection: &Connection) {
        for amount in [123.45, 1.00, 150.00] {
            create_cash_card(amount, "sarah1", connection).unwrap();
        }
        create_cash_card(200.0, "kumar2", connection).unwrap();
    }

    #[test]
    fn list_defaults_to_ascending_amount() {
        let connection = must_create_test_connection();
        insert_sarahs_cards(&connection);

        let got = amounts(&connection, &page(0, 20, DEFAULT_SORT));

        assert_eq!(got, vec![1.00, 123.45, 150.00]);
    }

    #[test]
    fn list_sorts_descending() {
        let connection = must_create_test_connection();
        insert_sarahs_cards(&connection);
        let sort = Sort {
            field: CashCardField::Amount,
            order: SortOrder::Descending,
        };

        let got = amounts(&connection, &page(0, 1, sort));

        assert_eq!(got, vec![150.00]);
    }

    #[test]
    fn list_slices_pages() {
        let connection = must_create_test_connection();
        insert_sarahs_cards(&connection);

        assert_eq!(
            amounts(&connection, &page(0, 2, DEFAULT_SORT)),
            vec![1.00, 123.45]
        );
        assert_eq!(
            amounts(&connection, &page(1, 2, DEFAULT_SORT)),
            vec![150.00]
        );
        assert!(amounts(&connection, &page(2, 2, DEFAULT_SORT)).is_empty());
    }

    #[test]
    fn list_breaks_ties_by_id() {
        let connection = must_create_test_connection();
        let first = create_cash_card(5.0, "sarah1", &connection).unwrap();
        let second = create_cash_card(5.0, "sarah1", &connection).unwrap();
        let sort = Sort {
            field: CashCardField::Amount,
            order: SortOrder::Descending,
        };

        let got: Vec<_> = list_cash_cards("sarah1", &page(0, 20, sort), &connection)
            .unwrap()
            .into_iter()
            .map(|cash_card| cash_card.id)
            .collect();

        assert_eq!(got, vec![first.id, second.id]);
    }

    #[test]
    fn list_sorts_by_each_key_in_turn() {
        let connection = must_create_test_connection();
        let small = create_cash_card(5.0, "sarah1", &connection).unwrap();
        let large = create_cash_card(50.0, "sarah1", &connection).unwrap();
        let also_small = create_cash_card(5.0, "sarah1", &connection).unwrap();
        let request = PageRequest {
            page: 0,
            size: 20,
            sort: vec![
                Sort {
                    field: CashCardField::Amount,
                    order: SortOrder::Ascending,
                },
                Sort {
                    field: CashCardField::Id,
                    order: SortOrder::Descending,
                },
            ],
        };

        let got: Vec<_> = list_cash_cards("sarah1", &request, &connection)
            .unwrap()
            .into_iter()
            .map(|cash_card| cash_card.id)
            .collect();

        assert_eq!(got, vec![also_small.id, small.id, large.id]);
    }

    #[test]
    fn list_only_returns_owners_cards() {
        let connection = must_create_test_connection();
        insert_sarahs_cards(&connection);

        let got = list_cash_cards("kumar2", &page(0, 20, DEFAULT_SORT), &connection).unwrap();

        assert_eq!(got.len(), 1);
        assert!(got.iter().all(|cash_card| cash_card.owner == "kumar2"));
    }

    #[test]
    fn list_is_empty_for_owner_without_cards() {
        let connection = must_create_test_connection();
        insert_sarahs_cards(&connection);

        for request in [page(0, 20, DEFAULT_SORT), page(3, 1, DEFAULT_SORT)] {
            let got = list_cash_cards("hank-owns-no-cards", &request, &connection).unwrap();
            assert!(got.is_empty());
        }
    }

    #[test]
    fn list_with_overflowing_offset_is_empty() {
        let connection = must_create_test_connection();
        insert_sarahs_cards(&connection);

        let got =
            list_cash_cards("sarah1", &page(u64::MAX, 20, DEFAULT_SORT), &connection).unwrap();

        assert!(got.is_empty());
    }

    #[test]
    fn parses_sort_fields() {
        assert_eq!("amount".parse::<CashCardField>(), Ok(CashCardField::Amount));
        assert_eq!("id".parse::<CashCardField>(), Ok(CashCardField::Id));
        assert_eq!("owner".parse::<CashCardField>(), Ok(CashCardField::Owner));
        assert_eq!(
            "password".parse::<CashCardField>(),
            Err(Error::InvalidSortField("password".to_owned()))
        );
    }
}
