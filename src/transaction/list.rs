//! Defines the route handler for the page that displays transactions as a
//! paginated, searchable table.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    endpoints,
    html::{
        BADGE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE,
        TABLE_ROW_STYLE, base, edit_delete_action_links, format_currency, search_box,
    },
    money::Cents,
    navigation::NavBar,
    pagination::{ListQuery, PaginationConfig, page_count, page_offset, pagination_nav},
};

use super::core::{
    Transaction, TransactionType, count_matching_transactions, get_transaction_page,
};

/// The state needed for the transactions page.
#[derive(Debug, Clone)]
pub struct TransactionsViewState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for TransactionsViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// A transaction with its formatted URLs for template rendering.
struct TransactionTableRow {
    transaction: Transaction,
    edit_url: String,
    delete_url: String,
}

impl TransactionTableRow {
    fn new(transaction: Transaction) -> Self {
        Self {
            edit_url: endpoints::format_endpoint(
                endpoints::EDIT_TRANSACTION_VIEW,
                transaction.id,
            ),
            delete_url: endpoints::format_endpoint(endpoints::DELETE_TRANSACTION, transaction.id),
            transaction,
        }
    }
}

/// Render an overview of the user's transactions, newest first.
pub async fn get_transactions_page(
    State(state): State<TransactionsViewState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<ListQuery>,
) -> Response {
    let search_text = query.search_text().to_owned();
    let page_size = state.pagination_config.default_page_size;

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let row_count = match count_matching_transactions(user_id, &search_text, &connection) {
        Ok(row_count) => row_count,
        Err(error) => {
            tracing::error!("Failed to count transactions: {error}");
            return error.into_response();
        }
    };

    let pages = page_count(row_count, page_size);
    let curr_page = query.page_or_default(&state.pagination_config).min(pages);

    let transactions = match get_transaction_page(
        user_id,
        &search_text,
        page_size,
        page_offset(curr_page, page_size),
        &connection,
    ) {
        Ok(transactions) => transactions,
        Err(error) => {
            tracing::error!("Failed to retrieve transactions: {error}");
            return error.into_response();
        }
    };
    drop(connection);

    let rows: Vec<TransactionTableRow> =
        transactions.into_iter().map(TransactionTableRow::new).collect();

    transactions_view(
        &rows,
        curr_page,
        pages,
        state.pagination_config.max_pages,
        &search_text,
    )
    .into_response()
}

/// The transaction amount with its sign decided by the transaction type.
fn signed_amount(transaction: &Transaction) -> Cents {
    match transaction.transaction_type {
        TransactionType::Income => transaction.amount,
        TransactionType::Expense => Cents::new(-transaction.amount.as_i64()),
    }
}

fn transactions_view(
    rows: &[TransactionTableRow],
    curr_page: u64,
    pages: u64,
    max_pages: u64,
    search_text: &str,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();

    let table_row = |row: &TransactionTableRow| {
        let transaction = &row.transaction;
        let amount = signed_amount(transaction);
        let amount_style = match transaction.transaction_type {
            TransactionType::Income => "text-green-600 dark:text-green-400",
            TransactionType::Expense => "text-red-600 dark:text-red-400",
        };
        let confirm_message = format!(
            "Are you sure you want to delete the transaction '{}' from {}?",
            transaction.merchant, transaction.date
        );

        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE) { (transaction.date) }

                td class=(TABLE_CELL_STYLE)
                {
                    p class="font-medium" { (transaction.merchant) }
                    p class="text-sm text-gray-500 dark:text-gray-400" { (transaction.description) }
                }

                td class=(TABLE_CELL_STYLE)
                {
                    span class=(BADGE_STYLE) { (transaction.category) }
                }

                td class=(TABLE_CELL_STYLE)
                {
                    span class=(amount_style) { (format_currency(amount)) }
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
                    h1 class="text-2xl font-bold" { "Transactions" }

                    a href=(endpoints::NEW_TRANSACTION_VIEW) class=(LINK_STYLE) { "New Transaction" }
                }

                (search_box(endpoints::TRANSACTIONS_VIEW, search_text, "Search transactions"))

                @if rows.is_empty() {
                    @if search_text.is_empty() {
                        p { "No transactions yet. Add your first one to get started." }
                    } @else {
                        p { "No transactions match your search." }
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
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Merchant" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
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

                    (pagination_nav(endpoints::TRANSACTIONS_VIEW, curr_page, pages, max_pages, search_text))
                }
            }
        }
    };

    base("Transactions", &content)
}
