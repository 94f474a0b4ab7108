//! Transaction creation page and endpoint.

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
    core::create_transaction,
    form::{
        TransactionFormAction, TransactionFormData, TransactionFormValues, parse_transaction_form,
        transaction_form_view,
    },
};

/// The state needed for creating a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the transaction creation page.
pub async fn get_new_transaction_page() -> Response {
    new_transaction_view(&TransactionFormValues::default(), "").into_response()
}

/// Handle transaction creation form submission, redirects to the transactions
/// view on success.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<TransactionFormData>,
) -> Response {
    let new_transaction = match parse_transaction_form(&form, user_id) {
        Ok(new_transaction) => new_transaction,
        Err(error) => {
            return new_transaction_view(
                &TransactionFormValues::from_form_data(&form),
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

    match create_transaction(new_transaction, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a transaction: {error}");

            error.into_alert_response()
        }
    }
}

fn new_transaction_view(values: &TransactionFormValues, error_message: &str) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_TRANSACTION_VIEW).into_html();
    let form = transaction_form_view(&TransactionFormAction::Create, values, error_message);

    let content = maud::html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form) }
    };

    base("New Transaction", &content)
}


#[cfg(test)]
mod create_transaction_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode, response::IntoResponse};
    use axum_extra::extract::Form;
    use time::macros::date;

    use crate::{
        endpoints,
        money::Cents,
        test_utils::{
            assert_form_error_message, assert_hx_redirect, assert_valid_html, create_test_user,
            get_test_connection, must_get_form, parse_html_document,
        },
        transaction::get_transaction,
    };

    use super::{CreateTransactionState, TransactionFormData, create_transaction_endpoint};

    fn form_data() -> TransactionFormData {
        TransactionFormData {
            amount: 45.99,
            transaction_type: "expense".to_string(),
            category: "groceries".to_string(),
            merchant: "Countdown".to_string(),
            description: "weekly shop".to_string(),
            date: date!(2025 - 10 - 05),
        }
    }

    #[tokio::test]
    async fn can_create_transaction() {
        let conn = get_test_connection();
        let user = create_test_user(&conn);
        let state = CreateTransactionState {
            db_connection: Arc::new(Mutex::new(conn)),
        };

        let response = create_transaction_endpoint(
            State(state.clone()),
            Extension(user.id),
            Form(form_data()),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::TRANSACTIONS_VIEW);

        let connection = state.db_connection.lock().unwrap();
        let transaction = get_transaction(1, user.id, &connection).unwrap();
        assert_eq!(transaction.amount, Cents::new(4599));
        assert_eq!(transaction.merchant, "Countdown");
    }

    #[tokio::test]
    async fn create_fails_on_zero_amount() {
        let conn = get_test_connection();
        let user = create_test_user(&conn);
        let state = CreateTransactionState {
            db_connection: Arc::new(Mutex::new(conn)),
        };
        let mut form = form_data();
        form.amount = 0.0;

        let response = create_transaction_endpoint(State(state), Extension(user.id), Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_form_error_message(&form, "Error: amount must be greater than zero");
    }
}
