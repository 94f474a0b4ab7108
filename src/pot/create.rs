//! Pot creation page and endpoint.

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
    core::create_pot,
    form::{PotFormAction, PotFormData, PotFormValues, parse_pot_form, pot_form_view},
};

/// The state needed for creating a pot.
#[derive(Debug, Clone)]
pub struct CreatePotState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreatePotState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the pot creation page.
pub async fn get_new_pot_page() -> Response {
    new_pot_view(&PotFormValues::default(), "").into_response()
}

/// Handle pot creation form submission, redirects to the pots view on success.
pub async fn create_pot_endpoint(
    State(state): State<CreatePotState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<PotFormData>,
) -> Response {
    let new_pot = match parse_pot_form(&form, user_id) {
        Ok(new_pot) => new_pot,
        Err(error) => {
            return new_pot_view(
                &PotFormValues::from_form_data(&form),
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

    match create_pot(new_pot, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::POTS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a pot: {error}");

            error.into_alert_response()
        }
    }
}

fn new_pot_view(values: &PotFormValues, error_message: &str) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_POT_VIEW).into_html();
    let form = pot_form_view(&PotFormAction::Create, values, error_message);

    let content = maud::html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form) }
    };

    base("New Pot", &content)
}
