//! Defines the core data model and database queries for savings pots.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{Error, auth::UserID, database_id::PotId, money::Cents};

/// The palette a pot's color may be chosen from.
pub const POT_COLORS: [&str; 20] = [
    "red", "orange", "amber", "yellow", "lime", "green", "emerald", "teal", "cyan", "sky", "blue",
    "indigo", "violet", "purple", "fuchsia", "pink", "rose", "slate", "gray", "zinc",
];

/// The icons a pot may be decorated with.
pub const POT_ICONS: [&str; 10] = [
    "piggy-bank",
    "car",
    "house",
    "graduation-cap",
    "plane",
    "shield-check",
    "smartphone",
    "heart",
    "gamepad",
    "shopping-bag",
];

/// Check that `color` is one of [POT_COLORS].
///
/// # Errors
/// Returns an [Error::InvalidPotColor] otherwise.
pub fn validate_pot_color(color: &str) -> Result<(), Error> {
    if POT_COLORS.contains(&color) {
        Ok(())
    } else {
        Err(Error::InvalidPotColor(color.to_string()))
    }
}

/// Check that `icon` is one of [POT_ICONS].
///
/// # Errors
/// Returns an [Error::InvalidPotIcon] otherwise.
pub fn validate_pot_icon(icon: &str) -> Result<(), Error> {
    if POT_ICONS.contains(&icon) {
        Ok(())
    } else {
        Err(Error::InvalidPotIcon(icon.to_string()))
    }
}

/// A savings goal with a target and a running balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pot {
    /// The ID of the pot.
    pub id: PotId,
    /// The ID of the user who owns the pot.
    pub user_id: UserID,
    /// A display name, e.g. "House deposit".
    pub name: String,
    /// The savings target, in cents.
    pub target_amount: Cents,
    /// How much has been saved so far, in cents.
    pub current_amount: Cents,
    /// An optional color from [POT_COLORS].
    pub color: Option<String>,
    /// An optional icon from [POT_ICONS].
    pub icon: Option<String>,
    /// An optional date the user wants to hit the target by.
    pub target_date: Option<Date>,
    /// Whether the pot has been archived.
    pub is_archived: bool,
    /// When the pot was created.
    pub created_at: OffsetDateTime,
}

/// The validated data needed to create a pot.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPot {
    /// The ID of the user who owns the pot.
    pub user_id: UserID,
    /// A display name for the pot.
    pub name: String,
    /// The savings target, in cents.
    pub target_amount: Cents,
    /// How much has been saved so far, in cents.
    pub current_amount: Cents,
    /// An optional color from [POT_COLORS].
    pub color: Option<String>,
    /// An optional icon from [POT_ICONS].
    pub icon: Option<String>,
    /// An optional date the user wants to hit the target by.
    pub target_date: Option<Date>,
    /// Whether the pot has been archived.
    pub is_archived: bool,
}

/// Create the pot table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_pot_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS pot (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                target_amount INTEGER NOT NULL,
                current_amount INTEGER NOT NULL DEFAULT 0,
                color TEXT,
                icon TEXT,
                target_date TEXT,
                is_archived INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

/// Map a database row to a [Pot].
pub(super) fn map_pot_row(row: &Row) -> Result<Pot, rusqlite::Error> {
    Ok(Pot {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        target_amount: row.get(3)?,
        current_amount: row.get(4)?,
        color: row.get(5)?,
        icon: row.get(6)?,
        target_date: row.get(7)?,
        is_archived: row.get(8)?,
        created_at: row.get(9)?,
    })
}

const POT_COLUMNS: &str = "id, user_id, name, target_amount, current_amount, color, icon, \
    target_date, is_archived, created_at";

/// Create a new pot in the database.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn create_pot(new_pot: NewPot, connection: &Connection) -> Result<Pot, Error> {
    let pot = connection
        .prepare(&format!(
            "INSERT INTO pot \
            (user_id, name, target_amount, current_amount, color, icon, target_date, \
            is_archived, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             RETURNING {POT_COLUMNS}"
        ))?
        .query_row(
            (
                new_pot.user_id,
                new_pot.name,
                new_pot.target_amount,
                new_pot.current_amount,
                new_pot.color,
                new_pot.icon,
                new_pot.target_date,
                new_pot.is_archived,
                OffsetDateTime::now_utc(),
            ),
            map_pot_row,
        )?;

    Ok(pot)
}

/// Retrieve the pot with `id` belonging to `user_id`.
///
/// # Errors
/// This function will return an:
/// - [Error::NotFound] if `id` does not refer to a pot owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_pot(id: PotId, user_id: UserID, connection: &Connection) -> Result<Pot, Error> {
    let pot = connection
        .prepare(&format!(
            "SELECT {POT_COLUMNS} FROM pot WHERE id = ?1 AND user_id = ?2"
        ))?
        .query_row((id, user_id), map_pot_row)?;

    Ok(pot)
}

/// Overwrite the pot with `id` using the fields of `update`.
///
/// # Errors
/// This function will return an:
/// - [Error::UpdateMissingPot] if `id` does not refer to a pot owned by
///   `update.user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_pot(id: PotId, update: NewPot, connection: &Connection) -> Result<(), Error> {
    let rows_updated = connection.execute(
        "UPDATE pot
        SET name = ?1, target_amount = ?2, current_amount = ?3, color = ?4, icon = ?5, \
        target_date = ?6, is_archived = ?7
        WHERE id = ?8 AND user_id = ?9",
        (
            update.name,
            update.target_amount,
            update.current_amount,
            update.color,
            update.icon,
            update.target_date,
            update.is_archived,
            id,
            update.user_id,
        ),
    )?;

    if rows_updated == 0 {
        return Err(Error::UpdateMissingPot);
    }

    Ok(())
}

/// Delete the pot with `id` belonging to `user_id`.
///
/// # Errors
/// This function will return an:
/// - [Error::DeleteMissingPot] if `id` does not refer to a pot owned by
///   `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_pot(id: PotId, user_id: UserID, connection: &Connection) -> Result<(), Error> {
    let rows_deleted = connection.execute(
        "DELETE FROM pot WHERE id = ?1 AND user_id = ?2",
        (id, user_id),
    )?;

    if rows_deleted == 0 {
        return Err(Error::DeleteMissingPot);
    }

    Ok(())
}

const POT_SEARCH_CLAUSE: &str = "(?2 = ''
        OR name LIKE '%' || ?2 || '%'
        OR color LIKE '%' || ?2 || '%'
        OR icon LIKE '%' || ?2 || '%')";

/// Count the pots of `user_id` that match the free-text `search_text`.
///
/// An empty `search_text` matches every pot.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn count_matching_pots(
    user_id: UserID,
    search_text: &str,
    connection: &Connection,
) -> Result<u64, Error> {
    connection
        .query_row(
            &format!("SELECT COUNT(id) FROM pot WHERE user_id = ?1 AND {POT_SEARCH_CLAUSE}"),
            (user_id, search_text),
            |row| row.get::<_, i64>(0).map(|count| count as u64),
        )
        .map_err(|error| error.into())
}

/// Get one page of the pots of `user_id` matching `search_text`, newest first.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn get_pot_page(
    user_id: UserID,
    search_text: &str,
    limit: u64,
    offset: u64,
    connection: &Connection,
) -> Result<Vec<Pot>, Error> {
    connection
        .prepare(&format!(
            "SELECT {POT_COLUMNS} FROM pot \
            WHERE user_id = ?1 AND {POT_SEARCH_CLAUSE} \
            ORDER BY created_at DESC, id DESC \
            LIMIT ?3 OFFSET ?4"
        ))?
        .query_map(
            (user_id, search_text, limit as i64, offset as i64),
            map_pot_row,
        )?
        .map(|pot_result| pot_result.map_err(Error::from))
        .collect()
}
