//! Defines the core data model and database queries for recurring bills.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{Error, auth::UserID, category::Category, database_id::BillId, money::Cents};

/// How often a recurring bill falls due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub enum Frequency {
    /// Due every day.
    Daily,
    /// Due every week.
    Weekly,
    /// Due every month.
    Monthly,
    /// Due every year.
    Yearly,
}

impl Frequency {
    /// Every frequency, in the order they are shown in form dropdowns.
    pub const ALL: [Frequency; 4] = [
        Frequency::Daily,
        Frequency::Weekly,
        Frequency::Monthly,
        Frequency::Yearly,
    ];

    /// The lowercase identifier stored in the database and posted by forms.
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Yearly => "yearly",
        }
    }

    /// The human-readable label shown in pages.
    pub fn label(&self) -> &'static str {
        match self {
            Frequency::Daily => "Daily",
            Frequency::Weekly => "Weekly",
            Frequency::Monthly => "Monthly",
            Frequency::Yearly => "Yearly",
        }
    }
}

impl FromStr for Frequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            "yearly" => Ok(Frequency::Yearly),
            _ => Err(Error::InvalidFrequency(s.to_string())),
        }
    }
}

impl Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl ToSql for Frequency {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Frequency {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;

        text.parse()
            .map_err(|_| FromSqlError::Other(format!("unknown frequency {text:?}").into()))
    }
}

/// A periodic obligation such as rent or an electricity bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    /// The ID of the bill.
    pub id: BillId,
    /// The ID of the user who owns the bill.
    pub user_id: UserID,
    /// A display name, e.g. "Electricity".
    pub name: String,
    /// The amount due each period, in cents.
    pub amount: Cents,
    /// The spending category of the bill.
    pub category: Category,
    /// How often the bill falls due.
    pub frequency: Frequency,
    /// The next day the bill is due.
    pub next_due_date: Date,
    /// The day the bill was last paid, if ever.
    pub last_paid_date: Option<Date>,
    /// How many days before the due date the bill counts as due soon.
    pub reminder_days: i64,
    /// Whether the bill is paid automatically.
    pub auto_deduct: bool,
    /// Whether the bill is still in force.
    pub is_active: bool,
    /// When the bill was created.
    pub created_at: OffsetDateTime,
}

impl Bill {
    /// Whether the bill's next due date falls within its reminder window as
    /// of `today`. Inactive bills are never due.
    pub fn is_due_soon(&self, today: Date) -> bool {
        self.is_active && (self.next_due_date - today).whole_days() <= self.reminder_days
    }
}

/// The validated data needed to create a recurring bill.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBill {
    /// The ID of the user who owns the bill.
    pub user_id: UserID,
    /// A display name for the bill.
    pub name: String,
    /// The amount due each period, in cents.
    pub amount: Cents,
    /// The spending category of the bill.
    pub category: Category,
    /// How often the bill falls due.
    pub frequency: Frequency,
    /// The next day the bill is due.
    pub next_due_date: Date,
    /// The day the bill was last paid, if ever.
    pub last_paid_date: Option<Date>,
    /// How many days before the due date the bill counts as due soon.
    pub reminder_days: i64,
    /// Whether the bill is paid automatically.
    pub auto_deduct: bool,
    /// Whether the bill is still in force.
    pub is_active: bool,
}

/// Create the recurring bill table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_bill_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS recurring_bill (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                amount INTEGER NOT NULL,
                category TEXT NOT NULL,
                frequency TEXT NOT NULL,
                next_due_date TEXT NOT NULL,
                last_paid_date TEXT,
                reminder_days INTEGER NOT NULL DEFAULT 3,
                auto_deduct INTEGER NOT NULL DEFAULT 0,
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

/// Map a database row to a [Bill].
pub(super) fn map_bill_row(row: &Row) -> Result<Bill, rusqlite::Error> {
    Ok(Bill {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        amount: row.get(3)?,
        category: row.get(4)?,
        frequency: row.get(5)?,
        next_due_date: row.get(6)?,
        last_paid_date: row.get(7)?,
        reminder_days: row.get(8)?,
        auto_deduct: row.get(9)?,
        is_active: row.get(10)?,
        created_at: row.get(11)?,
    })
}

const BILL_COLUMNS: &str = "id, user_id, name, amount, category, frequency, next_due_date, \
    last_paid_date, reminder_days, auto_deduct, is_active, created_at";

/// Create a new recurring bill in the database.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn create_bill(new_bill: NewBill, connection: &Connection) -> Result<Bill, Error> {
    let bill = connection
        .prepare(&format!(
            "INSERT INTO recurring_bill \
            (user_id, name, amount, category, frequency, next_due_date, last_paid_date, \
            reminder_days, auto_deduct, is_active, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
             RETURNING {BILL_COLUMNS}"
        ))?
        .query_row(
            (
                new_bill.user_id,
                new_bill.name,
                new_bill.amount,
                new_bill.category,
                new_bill.frequency,
                new_bill.next_due_date,
                new_bill.last_paid_date,
                new_bill.reminder_days,
                new_bill.auto_deduct,
                new_bill.is_active,
                OffsetDateTime::now_utc(),
            ),
            map_bill_row,
        )?;

    Ok(bill)
}

/// Retrieve the bill with `id` belonging to `user_id`.
///
/// # Errors
/// This function will return an:
/// - [Error::NotFound] if `id` does not refer to a bill owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_bill(id: BillId, user_id: UserID, connection: &Connection) -> Result<Bill, Error> {
    let bill = connection
        .prepare(&format!(
            "SELECT {BILL_COLUMNS} FROM recurring_bill WHERE id = ?1 AND user_id = ?2"
        ))?
        .query_row((id, user_id), map_bill_row)?;

    Ok(bill)
}

/// Overwrite the bill with `id` using the fields of `update`.
///
/// # Errors
/// This function will return an:
/// - [Error::UpdateMissingBill] if `id` does not refer to a bill owned by
///   `update.user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_bill(id: BillId, update: NewBill, connection: &Connection) -> Result<(), Error> {
    let rows_updated = connection.execute(
        "UPDATE recurring_bill
        SET name = ?1, amount = ?2, category = ?3, frequency = ?4, next_due_date = ?5, \
        last_paid_date = ?6, reminder_days = ?7, auto_deduct = ?8, is_active = ?9
        WHERE id = ?10 AND user_id = ?11",
        (
            update.name,
            update.amount,
            update.category,
            update.frequency,
            update.next_due_date,
            update.last_paid_date,
            update.reminder_days,
            update.auto_deduct,
            update.is_active,
            id,
            update.user_id,
        ),
    )?;

    if rows_updated == 0 {
        return Err(Error::UpdateMissingBill);
    }

    Ok(())
}

/// Delete the bill with `id` belonging to `user_id`.
///
/// # Errors
/// This function will return an:
/// - [Error::DeleteMissingBill] if `id` does not refer to a bill owned by
///   `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_bill(id: BillId, user_id: UserID, connection: &Connection) -> Result<(), Error> {
    let rows_deleted = connection.execute(
        "DELETE FROM recurring_bill WHERE id = ?1 AND user_id = ?2",
        (id, user_id),
    )?;

    if rows_deleted == 0 {
        return Err(Error::DeleteMissingBill);
    }

    Ok(())
}

const BILL_SEARCH_CLAUSE: &str = "(?2 = ''
        OR name LIKE '%' || ?2 || '%'
        OR category LIKE '%' || ?2 || '%'
        OR frequency LIKE '%' || ?2 || '%')";

/// Count the bills of `user_id` that match the free-text `search_text`.
///
/// An empty `search_text` matches every bill.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn count_matching_bills(
    user_id: UserID,
    search_text: &str,
    connection: &Connection,
) -> Result<u64, Error> {
    connection
        .query_row(
            &format!(
                "SELECT COUNT(id) FROM recurring_bill \
                WHERE user_id = ?1 AND {BILL_SEARCH_CLAUSE}"
            ),
            (user_id, search_text),
            |row| row.get::<_, i64>(0).map(|count| count as u64),
        )
        .map_err(|error| error.into())
}

/// Get one page of the bills of `user_id` matching `search_text`, soonest due
/// first.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn get_bill_page(
    user_id: UserID,
    search_text: &str,
    limit: u64,
    offset: u64,
    connection: &Connection,
) -> Result<Vec<Bill>, Error> {
    connection
        .prepare(&format!(
            "SELECT {BILL_COLUMNS} FROM recurring_bill \
            WHERE user_id = ?1 AND {BILL_SEARCH_CLAUSE} \
            ORDER BY next_due_date ASC, id ASC \
            LIMIT ?3 OFFSET ?4"
        ))?
        .query_map(
            (user_id, search_text, limit as i64, offset as i64),
            map_bill_row,
        )?
        .map(|bill_result| bill_result.map_err(Error::from))
        .collect()
}

/// Count the active bills of `user_id` whose next due date falls within their
/// reminder window as of `today`.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn count_bills_due_soon(
    user_id: UserID,
    today: Date,
    connection: &Connection,
) -> Result<u64, Error> {
    connection
        .query_row(
            "SELECT COUNT(id) FROM recurring_bill \
            WHERE user_id = ?1 AND is_active = 1 \
            AND julianday(next_due_date) - julianday(?2) <= reminder_days",
            (user_id, today),
            |row| row.get::<_, i64>(0).map(|count| count as u64),
        )
        .map_err(|error| error.into())
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
        Frequency, NewBill, count_bills_due_soon, count_matching_bills, create_bill, delete_bill,
        get_bill, get_bill_page, update_bill,
    };

    fn new_bill(user_id: UserID, name: &str) -> NewBill {
        NewBill {
            user_id,
            name: name.to_string(),
            amount: Cents::new(12_000),
            category: Category::Bills,
            frequency: Frequency::Monthly,
            next_due_date: date!(2025 - 11 - 01),
            last_paid_date: Some(date!(2025 - 10 - 01)),
            reminder_days: 3,
            auto_deduct: false,
            is_active: true,
        }
    }

    #[test]
    fn create_and_get_round_trip() {
        let conn = get_test_connection();
        let user = create_test_user(&conn);

        let created = create_bill(new_bill(user.id, "Electricity"), &conn).unwrap();
        let got = get_bill(created.id, user.id, &conn).unwrap();

        assert_eq!(created, got);
        assert_eq!(got.frequency, Frequency::Monthly);
        assert_eq!(got.reminder_days, 3);
    }

    #[test]
    fn last_paid_date_can_be_empty() {
        let conn = get_test_connection();
        let user = create_test_user(&conn);
        let mut bill = new_bill(user.id, "Rent");
        bill.last_paid_date = None;

        let created = create_bill(bill, &conn).unwrap();

        assert_eq!(created.last_paid_date, None);
    }

    #[test]
    fn get_fails_for_other_users_bill() {
        let conn = get_test_connection();
        let user = create_test_user(&conn);
        let created = create_bill(new_bill(user.id, "Electricity"), &conn).unwrap();

        let result = get_bill(created.id, UserID::new(user.id.as_i64() + 1), &conn);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn update_overwrites_fields() {
        let conn = get_test_connection();
        let user = create_test_user(&conn);
        let created = create_bill(new_bill(user.id, "Electricity"), &conn).unwrap();

        let mut update = new_bill(user.id, "Electricity");
        update.amount = Cents::new(13_500);
        update.auto_deduct = true;
        update.last_paid_date = Some(date!(2025 - 11 - 01));
        update_bill(created.id, update, &conn).unwrap();

        let got = get_bill(created.id, user.id, &conn).unwrap();
        assert_eq!(got.amount, Cents::new(13_500));
        assert!(got.auto_deduct);
        assert_eq!(got.last_paid_date, Some(date!(2025 - 11 - 01)));
    }

    #[test]
    fn update_fails_on_missing_bill() {
        let conn = get_test_connection();
        let user = create_test_user(&conn);

        let result = update_bill(999, new_bill(user.id, "Electricity"), &conn);

        assert_eq!(result, Err(Error::UpdateMissingBill));
    }

    #[test]
    fn delete_removes_bill() {
        let conn = get_test_connection();
        let user = create_test_user(&conn);
        let created = create_bill(new_bill(user.id, "Electricity"), &conn).unwrap();

        delete_bill(created.id, user.id, &conn).unwrap();

        assert_eq!(get_bill(created.id, user.id, &conn), Err(Error::NotFound));
    }

    #[test]
    fn search_matches_name_and_frequency() {
        let conn = get_test_connection();
        let user = create_test_user(&conn);
        create_bill(new_bill(user.id, "Electricity"), &conn).unwrap();
        let mut gym = new_bill(user.id, "Gym");
        gym.frequency = Frequency::Weekly;
        create_bill(gym, &conn).unwrap();

        assert_eq!(count_matching_bills(user.id, "gym", &conn), Ok(1));
        assert_eq!(count_matching_bills(user.id, "weekly", &conn), Ok(1));
        assert_eq!(count_matching_bills(user.id, "", &conn), Ok(2));
    }

    #[test]
    fn page_is_ordered_by_due_date() {
        let conn = get_test_connection();
        let user = create_test_user(&conn);
        let mut rent = new_bill(user.id, "Rent");
        rent.next_due_date = date!(2025 - 10 - 20);
        create_bill(rent, &conn).unwrap();
        create_bill(new_bill(user.id, "Electricity"), &conn).unwrap();

        let page = get_bill_page(user.id, "", 10, 0, &conn).unwrap();

        let names: Vec<&str> = page.iter().map(|bill| bill.name.as_str()).collect();
        assert_eq!(names, vec!["Rent", "Electricity"]);
    }

    #[test]
    fn counts_bills_due_within_reminder_window() {
        let conn = get_test_connection();
        let user = create_test_user(&conn);
        let other_user = create_test_user_with_email(&conn, "other@bar.baz");
        let today = date!(2025 - 10 - 29);

        // Due in 3 days with a 3 day reminder window.
        create_bill(new_bill(user.id, "Electricity"), &conn).unwrap();

        // Due in 33 days, outside the window.
        let mut rent = new_bill(user.id, "Rent");
        rent.next_due_date = date!(2025 - 12 - 01);
        create_bill(rent, &conn).unwrap();

        // Inactive bills are never due.
        let mut cancelled = new_bill(user.id, "Old gym");
        cancelled.is_active = false;
        create_bill(cancelled, &conn).unwrap();

        // Another user's bill does not count.
        create_bill(new_bill(other_user.id, "Electricity"), &conn).unwrap();

        assert_eq!(count_bills_due_soon(user.id, today, &conn), Ok(1));
    }
}

#[cfg(test)]
mod bill_tests {
    use time::macros::date;

    use crate::{auth::UserID, category::Category, money::Cents};

    use super::{Bill, Frequency};

    fn bill() -> Bill {
        Bill {
            id: 1,
            user_id: UserID::new(1),
            name: "Electricity".to_string(),
            amount: Cents::new(12_000),
            category: Category::Bills,
            frequency: Frequency::Monthly,
            next_due_date: date!(2025 - 11 - 01),
            last_paid_date: None,
            reminder_days: 3,
            auto_deduct: false,
            is_active: true,
            created_at: time::OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn due_soon_within_reminder_window() {
        assert!(bill().is_due_soon(date!(2025 - 10 - 29)));
    }

    #[test]
    fn not_due_soon_outside_reminder_window() {
        assert!(!bill().is_due_soon(date!(2025 - 10 - 20)));
    }

    #[test]
    fn overdue_bill_is_due_soon() {
        assert!(bill().is_due_soon(date!(2025 - 11 - 05)));
    }

    #[test]
    fn inactive_bill_is_never_due_soon() {
        let mut bill = bill();
        bill.is_active = false;

        assert!(!bill.is_due_soon(date!(2025 - 10 - 31)));
    }
}
