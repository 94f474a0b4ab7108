//! Bill creation page and endpoint.

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
    core::create_bill,
    form::{BillFormAction, BillFormData, BillFormValues, bill_form_view, parse_bill_form},
};

/// The state needed for creating a bill.
#[derive(Debug, Clone)]
pub struct CreateBillState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateBillState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the bill creation page.
pub async fn get_new_bill_page() -> Response {
    new_bill_view(&BillFormValues::default(), "").into_response()
}

/// Handle bill creation form submission, redirects to the bills view on
/// success.
pub async fn create_bill_endpoint(
    State(state): State<CreateBillState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<BillFormData>,
) -> Response {
    let new_bill = match parse_bill_form(&form, user_id) {
        Ok(new_bill) => new_bill,
        Err(error) => {
            return new_bill_view(
                &BillFormValues::from_form_data(&form),
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

    match create_bill(new_bill, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::BILLS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a bill: {error}");

            error.into_alert_response()
        }
    }
}

fn new_bill_view(values: &BillFormValues, error_message: &str) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_BILL_VIEW).into_html();
    let form = bill_form_view(&BillFormAction::Create, values, error_message);

    let content = maud::html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form) }
    };

    base("New Bill", &content)
}


#[cfg(test)]
mod create_bill_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode, response::IntoResponse};
    use axum_extra::extract::Form;
    use time::macros::date;

    use crate::{
        bill::{Frequency, get_bill},
        endpoints,
        money::Cents,
        test_utils::{
            assert_form_error_message, assert_hx_redirect, create_test_user, get_test_connection,
            must_get_form, parse_html_document,
        },
    };

    use super::{BillFormData, CreateBillState, create_bill_endpoint};

    fn form_data() -> BillFormData {
        BillFormData {
            name: "Electricity".to_string(),
            amount: 120.0,
            category: "bills".to_string(),
            frequency: "monthly".to_string(),
            next_due_date: date!(2025 - 11 - 01),
            last_paid_date: None,
            reminder_days: 3,
            auto_deduct: None,
            is_active: Some("on".to_string()),
        }
    }

    #[tokio::test]
    async fn can_create_bill() {
        let conn = get_test_connection();
        let user = create_test_user(&conn);
        let state = CreateBillState {
            db_connection: Arc::new(Mutex::new(conn)),
        };

        let response =
            create_bill_endpoint(State(state.clone()), Extension(user.id), Form(form_data()))
                .await
                .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::BILLS_VIEW);

        let connection = state.db_connection.lock().unwrap();
        let bill = get_bill(1, user.id, &connection).unwrap();
        assert_eq!(bill.amount, Cents::new(12_000));
        assert_eq!(bill.frequency, Frequency::Monthly);
        assert!(!bill.auto_deduct);
    }

    #[tokio::test]
    async fn create_fails_on_zero_reminder_days() {
        let conn = get_test_connection();
        let user = create_test_user(&conn);
        let state = CreateBillState {
            db_connection: Arc::new(Mutex::new(conn)),
        };
        let mut form = form_data();
        form.reminder_days = 0;

        let response = create_bill_endpoint(State(state), Extension(user.id), Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        let form = must_get_form(&html);
        assert_form_error_message(&form, "Error: reminder days must be greater than zero");
    }
}
