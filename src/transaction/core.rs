//! Defines the core data model and database queries for transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    auth::UserID,
    category::Category,
    database_id::TransactionId,
    money::Cents,
};

// ============================================================================
// MODELS
// ============================================================================

/// Whether a transaction brought money in or sent money out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub enum TransactionType {
    /// Money coming in, e.g. wages.
    Income,
    /// Money going out, e.g. groceries.
    Expense,
}

impl TransactionType {
    /// Both transaction types, in the order they are shown in form dropdowns.
    pub const ALL: [TransactionType; 2] = [TransactionType::Expense, TransactionType::Income];

    /// The lowercase identifier stored in the database and posted by forms.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }

    /// The human-readable label shown in pages.
    pub fn label(&self) -> &'static str {
        match self {
            TransactionType::Income => "Income",
            TransactionType::Expense => "Expense",
        }
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            _ => Err(Error::InvalidTransactionType(s.to_string())),
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;

        text.parse()
            .map_err(|_| FromSqlError::Other(format!("unknown transaction type {text:?}").into()))
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The ID of the user who owns the transaction.
    pub user_id: UserID,
    /// The amount of money spent or earned, in cents. Always positive, the
    /// direction is carried by `transaction_type`.
    pub amount: Cents,
    /// Whether the transaction is income or an expense.
    pub transaction_type: TransactionType,
    /// The spending category of the transaction.
    pub category: Category,
    /// Who the money went to or came from.
    pub merchant: String,
    /// A text description of what the transaction was for.
    pub description: String,
    /// When the transaction happened.
    pub date: Date,
    /// When the transaction was recorded.
    pub created_at: OffsetDateTime,
}

/// The validated data needed to create a transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// The ID of the user who owns the transaction.
    pub user_id: UserID,
    /// The amount of money spent or earned, in cents.
    pub amount: Cents,
    /// Whether the transaction is income or an expense.
    pub transaction_type: TransactionType,
    /// The spending category of the transaction.
    pub category: Category,
    /// Who the money went to or came from.
    pub merchant: String,
    /// A text description of what the transaction was for.
    pub description: String,
    /// When the transaction happened.
    pub date: Date,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                amount INTEGER NOT NULL,
                transaction_type TEXT NOT NULL,
                category TEXT NOT NULL,
                merchant TEXT NOT NULL,
                description TEXT NOT NULL,
                date TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    // Composite index used by the transactions list page.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a [Transaction].
pub(super) fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        user_id: row.get(1)?,
        amount: row.get(2)?,
        transaction_type: row.get(3)?,
        category: row.get(4)?,
        merchant: row.get(5)?,
        description: row.get(6)?,
        date: row.get(7)?,
        created_at: row.get(8)?,
    })
}

const TRANSACTION_COLUMNS: &str =
    "id, user_id, amount, transaction_type, category, merchant, description, date, created_at";

/// Create a new transaction in the database.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn create_transaction(
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!(
            "INSERT INTO \"transaction\" \
            (user_id, amount, transaction_type, category, merchant, description, date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            (
                new_transaction.user_id,
                new_transaction.amount,
                new_transaction.transaction_type,
                new_transaction.category,
                new_transaction.merchant,
                new_transaction.description,
                new_transaction.date,
                OffsetDateTime::now_utc(),
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve the transaction with `id` belonging to `user_id`.
///
/// Rows belonging to other users are invisible, asking for them returns the
/// same error as asking for an ID that does not exist.
///
/// # Errors
/// This function will return an:
/// - [Error::NotFound] if `id` does not refer to a transaction owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE id = ?1 AND user_id = ?2"
        ))?
        .query_row((id, user_id), map_transaction_row)?;

    Ok(transaction)
}

/// Overwrite the transaction with `id` using the fields of `update`.
///
/// # Errors
/// This function will return an:
/// - [Error::UpdateMissingTransaction] if `id` does not refer to a transaction
///   owned by `update.user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_transaction(
    id: TransactionId,
    update: NewTransaction,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_updated = connection.execute(
        "UPDATE \"transaction\"
        SET amount = ?1, transaction_type = ?2, category = ?3, merchant = ?4, \
        description = ?5, date = ?6
        WHERE id = ?7 AND user_id = ?8",
        (
            update.amount,
            update.transaction_type,
            update.category,
            update.merchant,
            update.description,
            update.date,
            id,
            update.user_id,
        ),
    )?;

    if rows_updated == 0 {
        return Err(Error::UpdateMissingTransaction);
    }

    Ok(())
}

/// Delete the transaction with `id` belonging to `user_id`.
///
/// # Errors
/// This function will return an:
/// - [Error::DeleteMissingTransaction] if `id` does not refer to a transaction
///   owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_deleted = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        (id, user_id),
    )?;

    if rows_deleted == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    Ok(())
}

// The free-text search matches against the columns a user is likely to
// remember a transaction by.
const TRANSACTION_SEARCH_CLAUSE: &str = "(?2 = ''
        OR merchant LIKE '%' || ?2 || '%'
        OR description LIKE '%' || ?2 || '%'
        OR category LIKE '%' || ?2 || '%'
        OR transaction_type LIKE '%' || ?2 || '%')";

/// Count the transactions of `user_id` that match the free-text `search_text`.
///
/// An empty `search_text` matches every transaction.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn count_matching_transactions(
    user_id: UserID,
    search_text: &str,
    connection: &Connection,
) -> Result<u64, Error> {
    connection
        .query_row(
            &format!(
                "SELECT COUNT(id) FROM \"transaction\" \
                WHERE user_id = ?1 AND {TRANSACTION_SEARCH_CLAUSE}"
            ),
            (user_id, search_text),
            |row| row.get::<_, i64>(0).map(|count| count as u64),
        )
        .map_err(|error| error.into())
}

/// Get one page of the transactions of `user_id` matching `search_text`,
/// newest first.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn get_transaction_page(
    user_id: UserID,
    search_text: &str,
    limit: u64,
    offset: u64,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" \
            WHERE user_id = ?1 AND {TRANSACTION_SEARCH_CLAUSE} \
            ORDER BY date DESC, id DESC \
            LIMIT ?3 OFFSET ?4"
        ))?
        .query_map(
            (user_id, search_text, limit as i64, offset as i64),
            map_transaction_row,
        )?
        .map(|transaction_result| transaction_result.map_err(Error::from))
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================
