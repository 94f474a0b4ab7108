//! Defines the route handler for the page that displays savings pots as a
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
        BADGE_MUTED_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE,
        TABLE_ROW_STYLE, base, edit_delete_action_links, format_currency, search_box,
    },
    navigation::NavBar,
    pagination::{ListQuery, PaginationConfig, page_count, page_offset, pagination_nav},
};

use super::core::{Pot, count_matching_pots, get_pot_page};

/// The state needed for the pots page.
#[derive(Debug, Clone)]
pub struct PotsViewState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for PotsViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// A pot with its formatted URLs for template rendering.
struct PotTableRow {
    pot: Pot,
    edit_url: String,
    delete_url: String,
}

impl PotTableRow {
    fn new(pot: Pot) -> Self {
        Self {
            edit_url: endpoints::format_endpoint(endpoints::EDIT_POT_VIEW, pot.id),
            delete_url: endpoints::format_endpoint(endpoints::DELETE_POT, pot.id),
            pot,
        }
    }
}

/// Render an overview of the user's savings pots, newest first.
pub async fn get_pots_page(
    State(state): State<PotsViewState>,
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

    let row_count = match count_matching_pots(user_id, &search_text, &connection) {
        Ok(row_count) => row_count,
        Err(error) => {
            tracing::error!("Failed to count pots: {error}");
            return error.into_response();
        }
    };

    let pages = page_count(row_count, page_size);
    let curr_page = query.page_or_default(&state.pagination_config).min(pages);

    let pots = match get_pot_page(
        user_id,
        &search_text,
        page_size,
        page_offset(curr_page, page_size),
        &connection,
    ) {
        Ok(pots) => pots,
        Err(error) => {
            tracing::error!("Failed to retrieve pots: {error}");
            return error.into_response();
        }
    };
    drop(connection);

    let rows: Vec<PotTableRow> = pots.into_iter().map(PotTableRow::new).collect();

    pots_view(
        &rows,
        curr_page,
        pages,
        state.pagination_config.max_pages,
        &search_text,
    )
    .into_response()
}

/// How much of the pot's target has been saved, clamped to 100.
fn percent_saved(pot: &Pot) -> i64 {
    if pot.target_amount.as_i64() <= 0 {
        return 100;
    }

    (pot.current_amount.as_i64() * 100 / pot.target_amount.as_i64()).min(100)
}

fn pots_view(
    rows: &[PotTableRow],
    curr_page: u64,
    pages: u64,
    max_pages: u64,
    search_text: &str,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::POTS_VIEW).into_html();

    let table_row = |row: &PotTableRow| {
        let pot = &row.pot;
        let confirm_message = format!("Are you sure you want to delete '{}'?", pot.name);
        let percent = percent_saved(pot);
        // Colors come from a fixed palette, so interpolation is safe here.
        let bar_color = pot.color.as_deref().unwrap_or("blue");

        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE)
                {
                    p class="font-medium" { (pot.name) }

                    @if let Some(icon) = &pot.icon {
                        p class="text-sm text-gray-500 dark:text-gray-400" { (icon) }
                    }
                }

                td class=(TABLE_CELL_STYLE)
                {
                    p { (format_currency(pot.current_amount)) " of " (format_currency(pot.target_amount)) }

                    div class="w-full bg-gray-200 rounded-full h-1.5 dark:bg-gray-700"
                    {
                        div
                            class=(format!("bg-{bar_color}-600 h-1.5 rounded-full"))
                            style=(format!("width: {percent}%")) {}
                    }
                }

                td class=(TABLE_CELL_STYLE)
                {
                    @if let Some(target_date) = pot.target_date {
                        (target_date)
                    }
                }

                td class=(TABLE_CELL_STYLE)
                {
                    @if pot.is_archived {
                        span class=(BADGE_MUTED_STYLE) { "Archived" }
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
                    h1 class="text-2xl font-bold" { "Pots" }

                    a href=(endpoints::NEW_POT_VIEW) class=(LINK_STYLE) { "New Pot" }
                }

                (search_box(endpoints::POTS_VIEW, search_text, "Search pots"))

                @if rows.is_empty() {
                    @if search_text.is_empty() {
                        p { "No pots yet. Create one to start saving towards a goal." }
                    } @else {
                        p { "No pots match your search." }
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
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Saved" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Target date" }
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

                    (pagination_nav(endpoints::POTS_VIEW, curr_page, pages, max_pages, search_text))
                }
            }
        }
    };

    base("Pots", &content)
}
