//! Bill editing page and endpoint.

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
    database_id::BillId,
    endpoints,
    html::{FORM_CONTAINER_STYLE, base},
    navigation::NavBar,
};

use super::{
    core::{get_bill, update_bill},
    form::{BillFormAction, BillFormData, BillFormValues, bill_form_view, parse_bill_form},
};

/// The state needed for the edit bill page and endpoint.
#[derive(Debug, Clone)]
pub struct EditBillState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditBillState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the bill editing page, pre-filled from the stored row.
pub async fn get_edit_bill_page(
    Path(bill_id): Path<BillId>,
    State(state): State<EditBillState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match get_bill(bill_id, user_id, &connection) {
        Ok(bill) => edit_bill_view(bill_id, &BillFormValues::from_bill(&bill), "").into_response(),
        Err(error) => error.into_response(),
    }
}

/// Handle bill update form submission.
pub async fn update_bill_endpoint(
    Path(bill_id): Path<BillId>,
    State(state): State<EditBillState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<BillFormData>,
) -> Response {
    let update = match parse_bill_form(&form, user_id) {
        Ok(update) => update,
        Err(error) => {
            return edit_bill_view(
                bill_id,
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

    match update_bill(bill_id, update, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::BILLS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(Error::UpdateMissingBill) => Error::UpdateMissingBill.into_alert_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while updating bill {bill_id}: {error}");
            error.into_alert_response()
        }
    }
}

fn edit_bill_view(bill_id: BillId, values: &BillFormValues, error_message: &str) -> Markup {
    let edit_endpoint = endpoints::format_endpoint(endpoints::EDIT_BILL_VIEW, bill_id);
    let update_endpoint = endpoints::format_endpoint(endpoints::PUT_BILL, bill_id);

    let nav_bar = NavBar::new(&edit_endpoint).into_html();
    let form = bill_form_view(
        &BillFormAction::Update(update_endpoint),
        values,
        error_message,
    );

    let content = maud::html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form) }
    };

    base("Edit Bill", &content)
}
