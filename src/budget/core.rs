//! Defines the core data model and database queries for budgets.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    Error, auth::UserID, category::Category, database_id::BudgetId, money::Cents,
};

/// A spending budget for one category over a period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    /// The ID of the budget.
    pub id: BudgetId,
    /// The ID of the user who owns the budget.
    pub user_id: UserID,
    /// A display name, e.g. "January groceries".
    pub name: String,
    /// The spending category the budget covers.
    pub category: Category,
    /// The spending limit for the period, in cents.
    pub limit: Cents,
    /// How much has been spent so far, in cents. Entered by the user.
    pub spent: Cents,
    /// A label for the period, e.g. "2025-01".
    pub period: String,
    /// The first day of the period.
    pub start_date: Date,
    /// The last day of the period.
    pub end_date: Date,
    /// Whether the budget is currently in force.
    pub is_active: bool,
    /// When the budget was created.
    pub created_at: OffsetDateTime,
}

/// The validated data needed to create a budget.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBudget {
    /// The ID of the user who owns the budget.
    pub user_id: UserID,
    /// A display name for the budget.
    pub name: String,
    /// The spending category the budget covers.
    pub category: Category,
    /// The spending limit for the period, in cents.
    pub limit: Cents,
    /// How much has been spent so far, in cents.
    pub spent: Cents,
    /// A label for the period.
    pub period: String,
    /// The first day of the period.
    pub start_date: Date,
    /// The last day of the period.
    pub end_date: Date,
    /// Whether the budget is currently in force.
    pub is_active: bool,
}

/// Create the budget table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    // "limit" is an SQL keyword, so the column name is quoted everywhere.
    connection.execute(
        "CREATE TABLE IF NOT EXISTS budget (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                category TEXT NOT NULL,
                \"limit\" INTEGER NOT NULL,
                spent INTEGER NOT NULL DEFAULT 0,
                period TEXT NOT NULL,
                start_date TEXT NOT NULL,
                end_date TEXT NOT NULL,
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

/// Map a database row to a [Budget].
pub(super) fn map_budget_row(row: &Row) -> Result<Budget, rusqlite::Error> {
    Ok(Budget {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        category: row.get(3)?,
        limit: row.get(4)?,
        spent: row.get(5)?,
        period: row.get(6)?,
        start_date: row.get(7)?,
        end_date: row.get(8)?,
        is_active: row.get(9)?,
        created_at: row.get(10)?,
    })
}

const BUDGET_COLUMNS: &str = "id, user_id, name, category, \"limit\", spent, period, \
    start_date, end_date, is_active, created_at";

/// Create a new budget in the database.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn create_budget(new_budget: NewBudget, connection: &Connection) -> Result<Budget, Error> {
    let budget = connection
        .prepare(&format!(
            "INSERT INTO budget \
            (user_id, name, category, \"limit\", spent, period, start_date, end_date, \
            is_active, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             RETURNING {BUDGET_COLUMNS}"
        ))?
        .query_row(
            (
                new_budget.user_id,
                new_budget.name,
                new_budget.category,
                new_budget.limit,
                new_budget.spent,
                new_budget.period,
                new_budget.start_date,
                new_budget.end_date,
                new_budget.is_active,
                OffsetDateTime::now_utc(),
            ),
            map_budget_row,
        )?;

    Ok(budget)
}

/// Retrieve the budget with `id` belonging to `user_id`.
///
/// # Errors
/// This function will return an:
/// - [Error::NotFound] if `id` does not refer to a budget owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_budget(id: BudgetId, user_id: UserID, connection: &Connection) -> Result<Budget, Error> {
    let budget = connection
        .prepare(&format!(
            "SELECT {BUDGET_COLUMNS} FROM budget WHERE id = ?1 AND user_id = ?2"
        ))?
        .query_row((id, user_id), map_budget_row)?;

    Ok(budget)
}

/// Overwrite the budget with `id` using the fields of `update`.
///
/// # Errors
/// This function will return an:
/// - [Error::UpdateMissingBudget] if `id` does not refer to a budget owned by
///   `update.user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_budget(
    id: BudgetId,
    update: NewBudget,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_updated = connection.execute(
        "UPDATE budget
        SET name = ?1, category = ?2, \"limit\" = ?3, spent = ?4, period = ?5, \
        start_date = ?6, end_date = ?7, is_active = ?8
        WHERE id = ?9 AND user_id = ?10",
        (
            update.name,
            update.category,
            update.limit,
            update.spent,
            update.period,
            update.start_date,
            update.end_date,
            update.is_active,
            id,
            update.user_id,
        ),
    )?;

    if rows_updated == 0 {
        return Err(Error::UpdateMissingBudget);
    }

    Ok(())
}

/// Delete the budget with `id` belonging to `user_id`.
///
/// # Errors
/// This function will return an:
/// - [Error::DeleteMissingBudget] if `id` does not refer to a budget owned by
///   `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_budget(id: BudgetId, user_id: UserID, connection: &Connection) -> Result<(), Error> {
    let rows_deleted = connection.execute(
        "DELETE FROM budget WHERE id = ?1 AND user_id = ?2",
        (id, user_id),
    )?;

    if rows_deleted == 0 {
        return Err(Error::DeleteMissingBudget);
    }

    Ok(())
}

const BUDGET_SEARCH_CLAUSE: &str = "(?2 = ''
        OR name LIKE '%' || ?2 || '%'
        OR category LIKE '%' || ?2 || '%'
        OR period LIKE '%' || ?2 || '%')";

/// Count the budgets of `user_id` that match the free-text `search_text`.
///
/// An empty `search_text` matches every budget.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn count_matching_budgets(
    user_id: UserID,
    search_text: &str,
    connection: &Connection,
) -> Result<u64, Error> {
    connection
        .query_row(
            &format!("SELECT COUNT(id) FROM budget WHERE user_id = ?1 AND {BUDGET_SEARCH_CLAUSE}"),
            (user_id, search_text),
            |row| row.get::<_, i64>(0).map(|count| count as u64),
        )
        .map_err(|error| error.into())
}

/// Get one page of the budgets of `user_id` matching `search_text`, newest
/// first.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn get_budget_page(
    user_id: UserID,
    search_text: &str,
    limit: u64,
    offset: u64,
    connection: &Connection,
) -> Result<Vec<Budget>, Error> {
    connection
        .prepare(&format!(
            "SELECT {BUDGET_COLUMNS} FROM budget \
            WHERE user_id = ?1 AND {BUDGET_SEARCH_CLAUSE} \
            ORDER BY created_at DESC, id DESC \
            LIMIT ?3 OFFSET ?4"
        ))?
        .query_map(
            (user_id, search_text, limit as i64, offset as i64),
            map_budget_row,
        )?
        .map(|budget_result| budget_result.map_err(Error::from))
        .collect()
}

#[cfg(test)]
mod database_tests {
    use time::macros::date;

    use crate::{
        Error,
        auth::UserID,
        category::Category,
        money::Cents,
        test_utils::{create_test_user, create_test_user_with_email, get_test_connection},
    };

    use super::{
        NewBudget, count_matching_budgets, create_budget, delete_budget, get_budget,
        get_budget_page, update_budget,
    };

    fn new_budget(user_id: UserID, name: &str) -> NewBudget {
        NewBudget {
            user_id,
            name: name.to_string(),
            category: Category::Groceries,
            limit: Cents::new(50_000),
            spent: Cents::new(0),
            period: "2025-10".to_string(),
            start_date: date!(2025 - 10 - 01),
            end_date: date!(2025 - 10 - 31),
            is_active: true,
        }
    }

    #[test]
    fn create_and_get_round_trip() {
        let conn = get_test_connection();
        let user = create_test_user(&conn);

        let created = create_budget(new_budget(user.id, "Groceries"), &conn).unwrap();
        let got = get_budget(created.id, user.id, &conn).unwrap();

        assert_eq!(created, got);
        assert_eq!(got.limit, Cents::new(50_000));
        assert!(got.is_active);
    }

    #[test]
    fn get_fails_for_other_users_budget() {
        let conn = get_test_connection();
        let user = create_test_user(&conn);
        let created = create_budget(new_budget(user.id, "Groceries"), &conn).unwrap();

        let result = get_budget(created.id, UserID::new(user.id.as_i64() + 1), &conn);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn update_overwrites_fields() {
        let conn = get_test_connection();
        let user = create_test_user(&conn);
        let created = create_budget(new_budget(user.id, "Groceries"), &conn).unwrap();

        let mut update = new_budget(user.id, "Food");
        update.spent = Cents::new(12_345);
        update.is_active = false;
        update_budget(created.id, update, &conn).unwrap();

        let got = get_budget(created.id, user.id, &conn).unwrap();
        assert_eq!(got.name, "Food");
        assert_eq!(got.spent, Cents::new(12_345));
        assert!(!got.is_active);
    }

    #[test]
    fn update_fails_on_missing_budget() {
        let conn = get_test_connection();
        let user = create_test_user(&conn);

        let result = update_budget(999, new_budget(user.id, "Groceries"), &conn);

        assert_eq!(result, Err(Error::UpdateMissingBudget));
    }

    #[test]
    fn delete_removes_budget() {
        let conn = get_test_connection();
        let user = create_test_user(&conn);
        let created = create_budget(new_budget(user.id, "Groceries"), &conn).unwrap();

        delete_budget(created.id, user.id, &conn).unwrap();

        assert_eq!(get_budget(created.id, user.id, &conn), Err(Error::NotFound));
    }

    #[test]
    fn delete_fails_for_other_users_budget() {
        let conn = get_test_connection();
        let user = create_test_user(&conn);
        let created = create_budget(new_budget(user.id, "Groceries"), &conn).unwrap();

        let result = delete_budget(created.id, UserID::new(user.id.as_i64() + 1), &conn);

        assert_eq!(result, Err(Error::DeleteMissingBudget));
    }

    #[test]
    fn search_matches_name_and_period() {
        let conn = get_test_connection();
        let user = create_test_user(&conn);
        create_budget(new_budget(user.id, "Groceries"), &conn).unwrap();
        let mut november = new_budget(user.id, "Dining out");
        november.period = "2025-11".to_string();
        create_budget(november, &conn).unwrap();

        assert_eq!(count_matching_budgets(user.id, "dining", &conn), Ok(1));
        assert_eq!(count_matching_budgets(user.id, "2025-11", &conn), Ok(1));
        assert_eq!(count_matching_budgets(user.id, "", &conn), Ok(2));
    }

    #[test]
    fn page_is_scoped_to_user() {
        let conn = get_test_connection();
        let user = create_test_user(&conn);
        let other_user = create_test_user_with_email(&conn, "other@bar.baz");
        create_budget(new_budget(user.id, "Mine"), &conn).unwrap();
        create_budget(new_budget(other_user.id, "Theirs"), &conn).unwrap();

        let page = get_budget_page(user.id, "", 10, 0, &conn).unwrap();

        assert_eq!(page.len(), 1);
        assert_eq!(page[0].name, "Mine");
    }
}
