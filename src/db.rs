//! Sets up the application's database.

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::{Error, auth::create_user_table, cash_card::create_cash_card_table};

/// Create the tables for all the domain models.
///
/// Safe to call on a database that has already been initialized.
///
/// # Errors
/// Returns an [Error::SqlError] if a table could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_cash_card_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

/// Insert the demonstration cash cards.
///
/// sarah1 owns cards 99, 100 and 101 with the amounts 123.45, 1.00 and 150.00,
/// kumar2 owns card 102 with the amount 200.00.
///
/// # Errors
/// Returns an [Error::SqlError] if the cards could not be inserted, e.g. because
/// the IDs are already taken.
pub fn seed_demo_data(connection: &Connection) -> Result<(), Error> {
    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    {
        let mut statement =
            transaction.prepare("INSERT INTO cash_card (id, amount, owner) VALUES (?1, ?2, ?3)")?;

        for (id, amount, owner) in [
            (99, 123.45, "sarah1"),
            (100, 1.00, "sarah1"),
            (101, 150.00, "sarah1"),
            (102, 200.00, "kumar2"),
        ] {
            statement.execute((id, amount, owner))?;
        }
    }

    transaction.commit()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use crate::db::{initialize, seed_demo_data};

    #[test]
    fn initialize_is_idempotent() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).unwrap();
        initialize(&connection).unwrap();
    }

    #[test]
    fn seeds_demo_cash_cards() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        seed_demo_data(&connection).unwrap();

        let count: i64 = connection
            .query_row(
                "SELECT COUNT(id) FROM cash_card WHERE owner = 'sarah1'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 3);
    }

    #[test]
    fn seeding_twice_fails() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        seed_demo_data(&connection).unwrap();

        assert!(seed_demo_data(&connection).is_err());
    }
}
