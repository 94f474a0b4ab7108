//! Defines the route handler for the page that displays budgets as a
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
        BADGE_MUTED_STYLE, BADGE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, edit_delete_action_links, format_currency,
        search_box,
    },
    navigation::NavBar,
    pagination::{ListQuery, PaginationConfig, page_count, page_offset, pagination_nav},
};

use super::core::{Budget, count_matching_budgets, get_budget_page};

/// The state needed for the budgets page.
#[derive(Debug, Clone)]
pub struct BudgetsViewState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for BudgetsViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// A budget with its formatted URLs for template rendering.
struct BudgetTableRow {
    budget: Budget,
    edit_url: String,
    delete_url: String,
}

impl BudgetTableRow {
    fn new(budget: Budget) -> Self {
        Self {
            edit_url: endpoints::format_endpoint(endpoints::EDIT_BUDGET_VIEW, budget.id),
            delete_url: endpoints::format_endpoint(endpoints::DELETE_BUDGET, budget.id),
            budget,
        }
    }
}

/// Render an overview of the user's budgets, newest first.
pub async fn get_budgets_page(
    State(state): State<BudgetsViewState>,
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

    let row_count = match count_matching_budgets(user_id, &search_text, &connection) {
        Ok(row_count) => row_count,
        Err(error) => {
            tracing::error!("Failed to count budgets: {error}");
            return error.into_response();
        }
    };

    let pages = page_count(row_count, page_size);
    let curr_page = query.page_or_default(&state.pagination_config).min(pages);

    let budgets = match get_budget_page(
        user_id,
        &search_text,
        page_size,
        page_offset(curr_page, page_size),
        &connection,
    ) {
        Ok(budgets) => budgets,
        Err(error) => {
            tracing::error!("Failed to retrieve budgets: {error}");
            return error.into_response();
        }
    };
    drop(connection);

    let rows: Vec<BudgetTableRow> = budgets.into_iter().map(BudgetTableRow::new).collect();

    budgets_view(
        &rows,
        curr_page,
        pages,
        state.pagination_config.max_pages,
        &search_text,
    )
    .into_response()
}

/// How much of the budget's limit has been spent, clamped to 100.
fn percent_spent(budget: &Budget) -> i64 {
    if budget.limit.as_i64() <= 0 {
        return 100;
    }

    (budget.spent.as_i64() * 100 / budget.limit.as_i64()).min(100)
}

fn budgets_view(
    rows: &[BudgetTableRow],
    curr_page: u64,
    pages: u64,
    max_pages: u64,
    search_text: &str,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::BUDGETS_VIEW).into_html();

    let table_row = |row: &BudgetTableRow| {
        let budget = &row.budget;
        let confirm_message = format!("Are you sure you want to delete '{}'?", budget.name);
        let percent = percent_spent(budget);

        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE)
                {
                    p class="font-medium" { (budget.name) }
                    p class="text-sm text-gray-500 dark:text-gray-400" { (budget.period) }
                }

                td class=(TABLE_CELL_STYLE)
                {
                    span class=(BADGE_STYLE) { (budget.category) }
                }

                td class=(TABLE_CELL_STYLE)
                {
                    p { (format_currency(budget.spent)) " of " (format_currency(budget.limit)) }

                    div class="w-full bg-gray-200 rounded-full h-1.5 dark:bg-gray-700"
                    {
                        div
                            class="bg-blue-600 h-1.5 rounded-full dark:bg-blue-500"
                            style=(format!("width: {percent}%")) {}
                    }
                }

                td class=(TABLE_CELL_STYLE)
                {
                    @if !budget.is_active {
                        span class=(BADGE_MUTED_STYLE) { "Inactive" }
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
                    h1 class="text-2xl font-bold" { "Budgets" }

                    a href=(endpoints::NEW_BUDGET_VIEW) class=(LINK_STYLE) { "New Budget" }
                }

                (search_box(endpoints::BUDGETS_VIEW, search_text, "Search budgets"))

                @if rows.is_empty() {
                    @if search_text.is_empty() {
                        p { "No budgets yet. Create one to keep your spending in check." }
                    } @else {
                        p { "No budgets match your search." }
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
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Spent" }
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

                    (pagination_nav(endpoints::BUDGETS_VIEW, curr_page, pages, max_pages, search_text))
                }
            }
        }
    };

    base("Budgets", &content)
}
