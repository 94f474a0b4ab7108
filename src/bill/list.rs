//! Defines the route handler for the page that displays recurring bills as a
//! paginated, searchable table.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::Date;

use crate::{
    AppState, Error,
    auth::UserID,
    endpoints,
    html::{
        BADGE_MUTED_STYLE, BADGE_STYLE, BADGE_WARNING_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE,
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, edit_delete_action_links,
        format_currency, search_box,
    },
    navigation::NavBar,
    pagination::{ListQuery, PaginationConfig, page_count, page_offset, pagination_nav},
    timezone::current_local_date,
};

use super::core::{Bill, count_matching_bills, get_bill_page};

/// The state needed for the bills page.
#[derive(Debug, Clone)]
pub struct BillsViewState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub pagination_config: PaginationConfig,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for BillsViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// A bill with its formatted URLs for template rendering.
struct BillTableRow {
    bill: Bill,
    edit_url: String,
    delete_url: String,
}

impl BillTableRow {
    fn new(bill: Bill) -> Self {
        Self {
            edit_url: endpoints::format_endpoint(endpoints::EDIT_BILL_VIEW, bill.id),
            delete_url: endpoints::format_endpoint(endpoints::DELETE_BILL, bill.id),
            bill,
        }
    }
}

/// Render an overview of the user's recurring bills, soonest due first.
pub async fn get_bills_page(
    State(state): State<BillsViewState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<ListQuery>,
) -> Response {
    let today = match current_local_date(&state.local_timezone) {
        Ok(today) => today,
        Err(error) => return error.into_response(),
    };

    let search_text = query.search_text().to_owned();
    let page_size = state.pagination_config.default_page_size;

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let row_count = match count_matching_bills(user_id, &search_text, &connection) {
        Ok(row_count) => row_count,
        Err(error) => {
            tracing::error!("Failed to count bills: {error}");
            return error.into_response();
        }
    };

    let pages = page_count(row_count, page_size);
    let curr_page = query.page_or_default(&state.pagination_config).min(pages);

    let bills = match get_bill_page(
        user_id,
        &search_text,
        page_size,
        page_offset(curr_page, page_size),
        &connection,
    ) {
        Ok(bills) => bills,
        Err(error) => {
            tracing::error!("Failed to retrieve bills: {error}");
            return error.into_response();
        }
    };
    drop(connection);

    let rows: Vec<BillTableRow> = bills.into_iter().map(BillTableRow::new).collect();

    bills_view(
        &rows,
        today,
        curr_page,
        pages,
        state.pagination_config.max_pages,
        &search_text,
    )
    .into_response()
}

fn bills_view(
    rows: &[BillTableRow],
    today: Date,
    curr_page: u64,
    pages: u64,
    max_pages: u64,
    search_text: &str,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::BILLS_VIEW).into_html();

    let table_row = |row: &BillTableRow| {
        let bill = &row.bill;
        let confirm_message = format!("Are you sure you want to delete '{}'?", bill.name);

        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE)
                {
                    p class="font-medium" { (bill.name) }
                    p class="text-sm text-gray-500 dark:text-gray-400" { (bill.frequency) }
                }

                td class=(TABLE_CELL_STYLE)
                {
                    span class=(BADGE_STYLE) { (bill.category) }
                }

                td class=(TABLE_CELL_STYLE) { (format_currency(bill.amount)) }

                td class=(TABLE_CELL_STYLE)
                {
                    p { (bill.next_due_date) }

                    @if bill.is_due_soon(today) {
                        span class=(BADGE_WARNING_STYLE) { "Due soon" }
                    }
                }

                td class=(TABLE_CELL_STYLE)
                {
                    @if !bill.is_active {
                        span class=(BADGE_MUTED_STYLE) { "Inactive" }
                    } @else if bill.auto_deduct {
                        span class=(BADGE_MUTED_STYLE) { "Auto" }
                    }
                }

                td class=(TABLE_CELL_STYLE)
                {
                    (edit_delete_action_links(&row.edit_url, &row.delete_url, &confirm_message))
                }
            }
        )
    };

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-4xl"
            {
                div class="flex items-center justify-between mb-4"
                {
                    h1 class="text-2xl font-bold" { "Bills" }

                    a href=(endpoints::NEW_BILL_VIEW) class=(LINK_STYLE) { "New Bill" }
                }

                (search_box(endpoints::BILLS_VIEW, search_text, "Search bills"))

                @if rows.is_empty() {
                    @if search_text.is_empty() {
                        p { "No bills yet. Add your recurring payments to keep track of due dates." }
                    } @else {
                        p { "No bills match your search." }
                    }
                } @else {
                    div class="relative overflow-x-auto shadow-md sm:rounded-lg mb-4"
                    {
                        table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                        {
                            thead class=(TABLE_HEADER_STYLE)
                            {
                                tr
                                {
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Next due" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Status" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                                }
                            }

                            tbody
                            {
                                @for row in rows {
                                    (table_row(row))
                                }
                            }
                        }
                    }

                    (pagination_nav(endpoints::BILLS_VIEW, curr_page, pages, max_pages, search_text))
                }
            }
        }
    };

    base("Bills", &content)
}
