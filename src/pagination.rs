//! Common functionality for paging and searching the resource list pages.
//!
//! Every list page accepts the same pair of query parameters: `page` (1-based
//! page number) and `q` (free-text search). The page links rendered by
//! [pagination_nav] preserve the active search so that paging does not reset
//! the filter.

use maud::{Markup, html};
use serde::Deserialize;

/// The config for pagination
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The maximum rows to display per page when not specified in a request.
    pub default_page_size: u64,
    /// The maximum number of pages to show in the pagination indicator.
    pub max_pages: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 6,
            max_pages: 5,
        }
    }
}

/// The query parameters shared by all list pages.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    /// The 1-based page number to display.
    pub page: Option<u64>,
    /// Free-text search over the resource's text columns.
    pub q: Option<String>,
}

impl ListQuery {
    /// The page number to display, clamped to at least 1.
    pub fn page_or_default(&self, config: &PaginationConfig) -> u64 {
        self.page.unwrap_or(config.default_page).max(1)
    }

    /// The trimmed search text, or the empty string when no search is active.
    pub fn search_text(&self) -> &str {
        self.q.as_deref().map(str::trim).unwrap_or_default()
    }
}

/// The number of pages needed to display `row_count` rows.
///
/// An empty result set still has one (empty) page.
pub fn page_count(row_count: u64, page_size: u64) -> u64 {
    row_count.div_ceil(page_size).max(1)
}

/// The offset of the first row on `page`.
pub fn page_offset(page: u64, page_size: u64) -> u64 {
    (page - 1) * page_size
}

#[derive(Debug, PartialEq, Eq)]
pub enum PaginationIndicator {
    Page(u64),
    CurrPage(u64),
    Ellipsis,
    NextButton(u64),
    BackButton(u64),
}

pub fn create_pagination_indicators(
    curr_page: u64,
    page_count: u64,
    max_pages: u64,
) -> Vec<PaginationIndicator> {
    let map_page = |page| {
        if page == curr_page {
            PaginationIndicator::CurrPage(page)
        } else {
            PaginationIndicator::Page(page)
        }
    };

    let mut indicators: Vec<PaginationIndicator> = if page_count <= max_pages {
        (1..=page_count).map(map_page).collect()
    } else if curr_page <= (max_pages / 2) {
        (1..=max_pages).map(map_page).collect()
    } else if curr_page > (page_count - max_pages / 2) {
        ((page_count - max_pages + 1)..=page_count)
            .map(map_page)
            .collect()
    } else {
        ((curr_page - max_pages / 2)..=(curr_page + max_pages / 2))
            .map(map_page)
            .collect()
    };

    if page_count > max_pages {
        if curr_page > (max_pages / 2) + 1 {
            indicators.insert(0, PaginationIndicator::Page(1));
            indicators.insert(1, PaginationIndicator::Ellipsis);
        }

        if curr_page < (page_count - max_pages / 2) {
            indicators.push(PaginationIndicator::Ellipsis);
            indicators.push(PaginationIndicator::Page(page_count));
        }
    }

    if curr_page > 1 {
        indicators.insert(0, PaginationIndicator::BackButton(curr_page - 1));
    }

    if curr_page < page_count {
        indicators.push(PaginationIndicator::NextButton(curr_page + 1));
    }

    indicators
}

/// Build the URL for `page` of the list page at `route`, preserving the
/// active search text.
pub fn page_url(route: &str, page: u64, search_text: &str) -> String {
    if search_text.is_empty() {
        return format!("{route}?page={page}");
    }

    match serde_urlencoded::to_string([("q", search_text)]) {
        Ok(query) => format!("{route}?page={page}&{query}"),
        Err(error) => {
            tracing::error!("Could not encode search text {search_text:?}: {error}");
            format!("{route}?page={page}")
        }
    }
}

const PAGE_LINK_STYLE: &str = "flex items-center justify-center px-3 h-8 leading-tight \
    text-gray-500 bg-white border border-gray-300 hover:bg-gray-100 hover:text-gray-700 \
    dark:bg-gray-800 dark:border-gray-700 dark:text-gray-400 dark:hover:bg-gray-700 \
    dark:hover:text-white";

const CURR_PAGE_STYLE: &str = "flex items-center justify-center px-3 h-8 \
    text-blue-600 border border-gray-300 bg-blue-50 hover:bg-blue-100 \
    hover:text-blue-700 dark:bg-gray-700 dark:border-gray-700 dark:text-white";

/// Render the pagination controls for a list page.
///
/// Returns nothing when there is only a single page.
pub fn pagination_nav(route: &str, curr_page: u64, pages: u64, max_pages: u64, search_text: &str) -> Markup {
    if pages <= 1 {
        return html! {};
    }

    let indicators = create_pagination_indicators(curr_page, pages, max_pages);

    html! {
        nav aria-label="pagination"
        {
            ul class="inline-flex -space-x-px text-sm"
            {
                @for indicator in indicators {
                    li
                    {
                        @match indicator {
                            PaginationIndicator::BackButton(page) => {
                                a href=(page_url(route, page, search_text)) class=(PAGE_LINK_STYLE) { "Previous" }
                            }
                            PaginationIndicator::NextButton(page) => {
                                a href=(page_url(route, page, search_text)) class=(PAGE_LINK_STYLE) { "Next" }
                            }
                            PaginationIndicator::Page(page) => {
                                a href=(page_url(route, page, search_text)) class=(PAGE_LINK_STYLE) { (page) }
                            }
                            PaginationIndicator::CurrPage(page) => {
                                a href=(page_url(route, page, search_text)) aria-current="page" class=(CURR_PAGE_STYLE) { (page) }
                            }
                            PaginationIndicator::Ellipsis => {
                                span class=(PAGE_LINK_STYLE) { "..." }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod pagination_indicator_tests {
    use crate::pagination::{PaginationIndicator, create_pagination_indicators};

    #[test]
    fn shows_all_pages() {
        let max_pages = 5;
        let page_count = 5;
        let curr_page = 1;
        let want = [
            PaginationIndicator::CurrPage(1),
            PaginationIndicator::Page(2),
            PaginationIndicator::Page(3),
            PaginationIndicator::Page(4),
            PaginationIndicator::Page(5),
            PaginationIndicator::NextButton(2),
        ];

        let got = create_pagination_indicators(curr_page, page_count, max_pages);

        assert_eq!(want, got.as_slice());
    }

    #[test]
    fn shows_page_subset_on_left() {
        let max_pages = 5;
        let page_count = 10;
        let curr_page = 1;
        let want = [
            PaginationIndicator::CurrPage(1),
            PaginationIndicator::Page(2),
            PaginationIndicator::Page(3),
            PaginationIndicator::Page(4),
            PaginationIndicator::Page(5),
            PaginationIndicator::Ellipsis,
            PaginationIndicator::Page(10),
            PaginationIndicator::NextButton(2),
        ];

        let got = create_pagination_indicators(curr_page, page_count, max_pages);

        assert_eq!(want, got.as_slice());
    }

    #[test]
    fn shows_both_buttons_and_trailing_ellipsis() {
        let max_pages = 5;
        let page_count = 10;
        let curr_page = 3;
        let want = [
            PaginationIndicator::BackButton(2),
            PaginationIndicator::Page(1),
            PaginationIndicator::Page(2),
            PaginationIndicator::CurrPage(3),
            PaginationIndicator::Page(4),
            PaginationIndicator::Page(5),
            PaginationIndicator::Ellipsis,
            PaginationIndicator::Page(10),
            PaginationIndicator::NextButton(4),
        ];

        let got = create_pagination_indicators(curr_page, page_count, max_pages);

        assert_eq!(want, got.as_slice());
    }

    #[test]
    fn shows_page_subset_on_right() {
        let max_pages = 5;
        let page_count = 10;
        let curr_page = 10;
        let want = [
            PaginationIndicator::BackButton(9),
            PaginationIndicator::Page(1),
            PaginationIndicator::Ellipsis,
            PaginationIndicator::Page(6),
            PaginationIndicator::Page(7),
            PaginationIndicator::Page(8),
            PaginationIndicator::Page(9),
            PaginationIndicator::CurrPage(10),
        ];

        let got = create_pagination_indicators(curr_page, page_count, max_pages);

        assert_eq!(want, got.as_slice());
    }

    #[test]
    fn shows_page_subset_in_center() {
        let max_pages = 5;
        let page_count = 10;
        let curr_page = 5;
        let want = [
            PaginationIndicator::BackButton(4),
            PaginationIndicator::Page(1),
            PaginationIndicator::Ellipsis,
            PaginationIndicator::Page(3),
            PaginationIndicator::Page(4),
            PaginationIndicator::CurrPage(5),
            PaginationIndicator::Page(6),
            PaginationIndicator::Page(7),
            PaginationIndicator::Ellipsis,
            PaginationIndicator::Page(10),
            PaginationIndicator::NextButton(6),
        ];

        let got = create_pagination_indicators(curr_page, page_count, max_pages);

        assert_eq!(want, got.as_slice());
    }
}


#[cfg(test)]
mod page_url_tests {
    use super::page_url;

    #[test]
    fn omits_empty_search_text() {
        assert_eq!(page_url("/transactions", 2, ""), "/transactions?page=2");
    }

    #[test]
    fn preserves_search_text() {
        assert_eq!(
            page_url("/transactions", 2, "coffee"),
            "/transactions?page=2&q=coffee"
        );
    }

    #[test]
    fn url_encodes_search_text() {
        assert_eq!(
            page_url("/bills", 1, "gym & pool"),
            "/bills?page=1&q=gym+%26+pool"
        );
    }
}
