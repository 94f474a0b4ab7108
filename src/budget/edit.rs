//! Budget editing page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
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
    database_id::BudgetId,
    endpoints,
    html::{FORM_CONTAINER_STYLE, base},
    navigation::NavBar,
};

use super::{
    core::{get_budget, update_budget},
    form::{
        BudgetFormAction, BudgetFormData, BudgetFormValues, budget_form_view, parse_budget_form,
    },
};

/// The state needed for the edit budget page and endpoint.
#[derive(Debug, Clone)]
pub struct EditBudgetState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditBudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the budget editing page, pre-filled from the stored row.
pub async fn get_edit_budget_page(
    Path(budget_id): Path<BudgetId>,
    State(state): State<EditBudgetState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match get_budget(budget_id, user_id, &connection) {
        Ok(budget) => {
            edit_budget_view(budget_id, &BudgetFormValues::from_budget(&budget), "")
                .into_response()
        }
        Err(error) => error.into_response(),
    }
}

/// Handle budget update form submission.
pub async fn update_budget_endpoint(
    Path(budget_id): Path<BudgetId>,
    State(state): State<EditBudgetState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<BudgetFormData>,
) -> Response {
    let update = match parse_budget_form(&form, user_id) {
        Ok(update) => update,
        Err(error) => {
            return edit_budget_view(
                budget_id,
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

    match update_budget(budget_id, update, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::BUDGETS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(Error::UpdateMissingBudget) => Error::UpdateMissingBudget.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while updating budget {budget_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

fn edit_budget_view(budget_id: BudgetId, values: &BudgetFormValues, error_message: &str) -> Markup {
    let edit_endpoint = endpoints::format_endpoint(endpoints::EDIT_BUDGET_VIEW, budget_id);
    let update_endpoint = endpoints::format_endpoint(endpoints::PUT_BUDGET, budget_id);

    let nav_bar = NavBar::new(&edit_endpoint).into_html();
    let form = budget_form_view(
        &BudgetFormAction::Update(update_endpoint),
        values,
        error_message,
    );

    let content = maud::html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form) }
    };

    base("Edit Budget", &content)
}

#[cfg(test)]
mod edit_budget_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use axum_extra::extract::Form;
    use time::macros::date;

    use crate::{
        auth::UserID,
        budget::{NewBudget, create_budget, get_budget},
        category::Category,
        endpoints,
        money::Cents,
        test_utils::{
            assert_form_input_with_value, assert_hx_redirect, create_test_user,
            get_test_connection, must_get_form, parse_html_document,
        },
    };

    use super::{BudgetFormData, EditBudgetState, get_edit_budget_page, update_budget_endpoint};

    fn get_state_with_budget() -> (EditBudgetState, UserID, i64) {
        let conn = get_test_connection();
        let user = create_test_user(&conn);
        let budget = create_budget(
            NewBudget {
                user_id: user.id,
                name: "January groceries".to_string(),
                category: Category::Groceries,
                limit: Cents::new(50_000),
                spent: Cents::new(12_500),
                period: "2025-01".to_string(),
                start_date: date!(2025 - 01 - 01),
                end_date: date!(2025 - 01 - 31),
                is_active: true,
            },
            &conn,
        )
        .unwrap();

        let state = EditBudgetState {
            db_connection: Arc::new(Mutex::new(conn)),
        };

        (state, user.id, budget.id)
    }

    #[tokio::test]
    async fn page_is_prefilled_from_stored_row() {
        let (state, user_id, budget_id) = get_state_with_budget();

        let response =
            get_edit_budget_page(Path(budget_id), State(state), Extension(user_id)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;

        let form = must_get_form(&html);
        assert_form_input_with_value(&form, "name", "text", "January groceries");
        assert_form_input_with_value(&form, "limit", "number", "500.00");
        assert_form_input_with_value(&form, "spent", "number", "125.00");
    }

    #[tokio::test]
    async fn page_returns_not_found_for_other_users_budget() {
        let (state, user_id, budget_id) = get_state_with_budget();
        let other_user_id = UserID::new(user_id.as_i64() + 1);

        let response =
            get_edit_budget_page(Path(budget_id), State(state), Extension(other_user_id)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn can_update_budget() {
        let (state, user_id, budget_id) = get_state_with_budget();
        let form = BudgetFormData {
            name: "Food".to_string(),
            category: "dining".to_string(),
            limit: 400.0,
            spent: 250.0,
            period: "2025-02".to_string(),
            start_date: date!(2025 - 02 - 01),
            end_date: date!(2025 - 02 - 28),
            is_active: None,
        };

        let response = update_budget_endpoint(
            Path(budget_id),
            State(state.clone()),
            Extension(user_id),
            Form(form),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::BUDGETS_VIEW);

        let connection = state.db_connection.lock().unwrap();
        let budget = get_budget(budget_id, user_id, &connection).unwrap();
        assert_eq!(budget.name, "Food");
        assert_eq!(budget.spent, Cents::new(25_000));
        assert!(!budget.is_active);
    }

    #[tokio::test]
    async fn update_fails_for_other_users_budget() {
        let (state, user_id, budget_id) = get_state_with_budget();
        let other_user_id = UserID::new(user_id.as_i64() + 1);
        let form = BudgetFormData {
            name: "Food".to_string(),
            category: "dining".to_string(),
            limit: 400.0,
            spent: 250.0,
            period: "2025-02".to_string(),
            start_date: date!(2025 - 02 - 01),
            end_date: date!(2025 - 02 - 28),
            is_active: None,
        };

        let response = update_budget_endpoint(
            Path(budget_id),
            State(state),
            Extension(other_user_id),
            Form(form),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
