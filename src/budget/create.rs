//! Budget creation page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::Markup;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    endpoints,
    html::{FORM_CONTAINER_STYLE, base},
    navigation::NavBar,
};

use super::{
    core::create_budget,
    form::{
        BudgetFormAction, BudgetFormData, BudgetFormValues, budget_form_view, parse_budget_form,
    },
};

/// The state needed for creating a budget.
#[derive(Debug, Clone)]
pub struct CreateBudgetState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateBudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the budget creation page.
pub async fn get_new_budget_page() -> Response {
    new_budget_view(&BudgetFormValues::default(), "").into_response()
}

/// Handle budget creation form submission, redirects to the budgets view on
/// success.
pub async fn create_budget_endpoint(
    State(state): State<CreateBudgetState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<BudgetFormData>,
) -> Response {
    let new_budget = match parse_budget_form(&form, user_id) {
        Ok(new_budget) => new_budget,
        Err(error) => {
            return new_budget_view(
                &BudgetFormValues::from_form_data(&form),
                &format!("Error: {error}"),
            )
            .into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_budget(new_budget, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::BUDGETS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a budget: {error}");

            error.into_alert_response()
        }
    }
}

fn new_budget_view(values: &BudgetFormValues, error_message: &str) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_BUDGET_VIEW).into_html();
    let form = budget_form_view(&BudgetFormAction::Create, values, error_message);

    let content = maud::html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form) }
    };

    base("New Budget", &content)
}

#[cfg(test)]
mod new_budget_page_tests {
    use crate::{
        endpoints,
        test_utils::{
            assert_form_input, assert_form_select, assert_form_submit_button, assert_hx_endpoint,
            assert_valid_html, must_get_form, parse_html_document,
        },
    };

    use super::get_new_budget_page;

    #[tokio::test]
    async fn render_page() {
        let response = get_new_budget_page().await;

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::POST_BUDGET, "hx-post");
        assert_form_input(&form, "name", "text");
        assert_form_input(&form, "limit", "number");
        assert_form_input(&form, "spent", "number");
        assert_form_input(&form, "period", "text");
        assert_form_input(&form, "start_date", "date");
        assert_form_input(&form, "end_date", "date");
        assert_form_select(
            &form,
            "category",
            &[
                "groceries",
                "transport",
                "entertainment",
                "bills",
                "shopping",
                "dining",
                "salary",
                "other",
            ],
        );
        assert_form_submit_button(&form);
    }
}

#[cfg(test)]
mod create_budget_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode, response::IntoResponse};
    use axum_extra::extract::Form;
    use time::macros::date;

    use crate::{
        budget::get_budget,
        endpoints,
        money::Cents,
        test_utils::{
            assert_form_error_message, assert_hx_redirect, create_test_user, get_test_connection,
            must_get_form, parse_html_document,
        },
    };

    use super::{BudgetFormData, CreateBudgetState, create_budget_endpoint};

    fn form_data() -> BudgetFormData {
        BudgetFormData {
            name: "January groceries".to_string(),
            category: "groceries".to_string(),
            limit: 500.0,
            spent: 0.0,
            period: "2025-01".to_string(),
            start_date: date!(2025 - 01 - 01),
            end_date: date!(2025 - 01 - 31),
            is_active: Some("on".to_string()),
        }
    }

    #[tokio::test]
    async fn can_create_budget() {
        let conn = get_test_connection();
        let user = create_test_user(&conn);
        let state = CreateBudgetState {
            db_connection: Arc::new(Mutex::new(conn)),
        };

        let response =
            create_budget_endpoint(State(state.clone()), Extension(user.id), Form(form_data()))
                .await
                .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::BUDGETS_VIEW);

        let connection = state.db_connection.lock().unwrap();
        let budget = get_budget(1, user.id, &connection).unwrap();
        assert_eq!(budget.limit, Cents::new(50_000));
        assert_eq!(budget.name, "January groceries");
    }

    #[tokio::test]
    async fn create_fails_on_invalid_date_range() {
        let conn = get_test_connection();
        let user = create_test_user(&conn);
        let state = CreateBudgetState {
            db_connection: Arc::new(Mutex::new(conn)),
        };
        let mut form = form_data();
        form.end_date = date!(2024 - 12 - 31);

        let response = create_budget_endpoint(State(state), Extension(user.id), Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        let form = must_get_form(&html);
        assert_form_error_message(&form, "Error: the end date must be after the start date");
    }
}
