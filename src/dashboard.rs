//! The dashboard page: summary cards for the signed-in user's month so far.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::Date;

use crate::{
    AppState, Error,
    auth::UserID,
    bill::count_bills_due_soon,
    endpoints,
    html::{LINK_STYLE, PAGE_CONTAINER_STYLE, base, format_currency},
    money::Cents,
    navigation::NavBar,
    timezone::current_local_date,
    transaction::TransactionType,
};

/// The state needed for the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The numbers shown on the dashboard cards.
#[derive(Debug, PartialEq)]
struct DashboardSummary {
    income_this_month: Cents,
    expenses_this_month: Cents,
    total_saved: Cents,
    bills_due_soon: u64,
}

/// Sum the user's transactions of `transaction_type` in the month containing
/// `today`.
fn sum_transactions_in_month(
    user_id: UserID,
    transaction_type: TransactionType,
    today: Date,
    connection: &Connection,
) -> Result<Cents, Error> {
    connection
        .query_row(
            "SELECT COALESCE(SUM(amount), 0) FROM \"transaction\" \
            WHERE user_id = ?1 AND transaction_type = ?2 \
            AND strftime('%Y-%m', date) = strftime('%Y-%m', ?3)",
            (user_id, transaction_type, today),
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Sum the balances of the user's pots that have not been archived.
fn sum_pot_balances(user_id: UserID, connection: &Connection) -> Result<Cents, Error> {
    connection
        .query_row(
            "SELECT COALESCE(SUM(current_amount), 0) FROM pot \
            WHERE user_id = ?1 AND is_archived = 0",
            (user_id,),
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

fn build_summary(
    user_id: UserID,
    today: Date,
    connection: &Connection,
) -> Result<DashboardSummary, Error> {
    Ok(DashboardSummary {
        income_this_month: sum_transactions_in_month(
            user_id,
            TransactionType::Income,
            today,
            connection,
        )?,
        expenses_this_month: sum_transactions_in_month(
            user_id,
            TransactionType::Expense,
            today,
            connection,
        )?,
        total_saved: sum_pot_balances(user_id, connection)?,
        bills_due_soon: count_bills_due_soon(user_id, today, connection)?,
    })
}

/// Render the dashboard page.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    let today = match current_local_date(&state.local_timezone) {
        Ok(today) => today,
        Err(error) => return error.into_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let summary = match build_summary(user_id, today, &connection) {
        Ok(summary) => summary,
        Err(error) => {
            tracing::error!("Failed to build dashboard summary: {error}");
            return error.into_response();
        }
    };
    drop(connection);

    dashboard_view(&summary).into_response()
}

const CARD_STYLE: &str = "p-6 bg-white rounded-lg shadow dark:bg-gray-800";
const CARD_LABEL_STYLE: &str = "text-sm font-medium text-gray-500 dark:text-gray-400";
const CARD_VALUE_STYLE: &str = "text-3xl font-bold text-gray-900 dark:text-white";

fn summary_card(label: &str, value: &str, link_url: &str, link_text: &str) -> Markup {
    html! {
        div class=(CARD_STYLE)
        {
            p class=(CARD_LABEL_STYLE) { (label) }
            p class=(CARD_VALUE_STYLE) { (value) }
            a href=(link_url) class=(LINK_STYLE) { (link_text) }
        }
    }
}

fn dashboard_view(summary: &DashboardSummary) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();

    let bills_due_label = if summary.bills_due_soon == 1 {
        "1 bill".to_owned()
    } else {
        format!("{} bills", summary.bills_due_soon)
    };

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-4xl"
            {
                h1 class="text-2xl font-bold mb-4" { "Dashboard" }

                div class="grid grid-cols-1 md:grid-cols-2 gap-4"
                {
                    (summary_card(
                        "Income this month",
                        &format_currency(summary.income_this_month),
                        endpoints::TRANSACTIONS_VIEW,
                        "View transactions",
                    ))

                    (summary_card(
                        "Spent this month",
                        &format_currency(summary.expenses_this_month),
                        endpoints::TRANSACTIONS_VIEW,
                        "View transactions",
                    ))

                    (summary_card(
                        "Saved in pots",
                        &format_currency(summary.total_saved),
                        endpoints::POTS_VIEW,
                        "View pots",
                    ))

                    (summary_card(
                        "Due soon",
                        &bills_due_label,
                        endpoints::BILLS_VIEW,
                        "View bills",
                    ))
                }
            }
        }
    };

    base("Dashboard", &content)
}

#[cfg(test)]
mod dashboard_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use time::OffsetDateTime;

    use crate::{
        auth::UserID,
        category::Category,
        money::Cents,
        pot::{NewPot, create_pot},
        test_utils::{
            assert_valid_html, create_test_user, create_test_user_with_email, get_test_connection,
            parse_html_document,
        },
        transaction::{NewTransaction, TransactionType, create_transaction},
    };

    use super::{DashboardState, get_dashboard_page};

    fn get_state() -> DashboardState {
        DashboardState {
            db_connection: Arc::new(Mutex::new(get_test_connection())),
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    fn new_transaction(
        user_id: UserID,
        amount: Cents,
        transaction_type: TransactionType,
    ) -> NewTransaction {
        NewTransaction {
            user_id,
            amount,
            transaction_type,
            category: Category::Other,
            merchant: "Somewhere".to_string(),
            description: "something".to_string(),
            date: OffsetDateTime::now_utc().date(),
        }
    }

    #[tokio::test]
    async fn sums_this_months_income_and_expenses() {
        let state = get_state();
        let user_id = {
            let connection = state.db_connection.lock().unwrap();
            let user = create_test_user(&connection);
            create_transaction(
                new_transaction(user.id, Cents::new(500_000), TransactionType::Income),
                &connection,
            )
            .unwrap();
            create_transaction(
                new_transaction(user.id, Cents::new(4_599), TransactionType::Expense),
                &connection,
            )
            .unwrap();
            create_transaction(
                new_transaction(user.id, Cents::new(10_000), TransactionType::Expense),
                &connection,
            )
            .unwrap();
            user.id
        };

        let response = get_dashboard_page(State(state), Extension(user_id)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert!(html.html().contains("$5,000.00"));
        assert!(html.html().contains("$145.99"));
    }

    #[tokio::test]
    async fn old_transactions_are_not_counted() {
        let state = get_state();
        let user_id = {
            let connection = state.db_connection.lock().unwrap();
            let user = create_test_user(&connection);
            let mut transaction =
                new_transaction(user.id, Cents::new(99_900), TransactionType::Expense);
            transaction.date = time::macros::date!(2020 - 01 - 15);
            create_transaction(transaction, &connection).unwrap();
            user.id
        };

        let response = get_dashboard_page(State(state), Extension(user_id)).await;

        let html = parse_html_document(response).await;
        assert!(!html.html().contains("$999.00"));
    }

    #[tokio::test]
    async fn sums_only_the_users_unarchived_pots() {
        let state = get_state();
        let user_id = {
            let connection = state.db_connection.lock().unwrap();
            let user = create_test_user(&connection);
            let other_user = create_test_user_with_email(&connection, "other@bar.baz");

            create_pot(
                NewPot {
                    user_id: user.id,
                    name: "House deposit".to_string(),
                    target_amount: Cents::new(1_000_000),
                    current_amount: Cents::new(250_000),
                    color: None,
                    icon: None,
                    target_date: None,
                    is_archived: false,
                },
                &connection,
            )
            .unwrap();

            create_pot(
                NewPot {
                    user_id: user.id,
                    name: "Old goal".to_string(),
                    target_amount: Cents::new(100_000),
                    current_amount: Cents::new(100_000),
                    color: None,
                    icon: None,
                    target_date: None,
                    is_archived: true,
                },
                &connection,
            )
            .unwrap();

            create_pot(
                NewPot {
                    user_id: other_user.id,
                    name: "Not mine".to_string(),
                    target_amount: Cents::new(100_000),
                    current_amount: Cents::new(50_000),
                    color: None,
                    icon: None,
                    target_date: None,
                    is_archived: false,
                },
                &connection,
            )
            .unwrap();

            user.id
        };

        let response = get_dashboard_page(State(state), Extension(user_id)).await;

        let html = parse_html_document(response).await;
        assert!(html.html().contains("$2,500.00"));
    }
}
