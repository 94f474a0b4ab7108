//! Pot editing page and endpoint.

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
    database_id::PotId,
    endpoints,
    html::{FORM_CONTAINER_STYLE, base},
    navigation::NavBar,
};

use super::{
    core::{get_pot, update_pot},
    form::{PotFormAction, PotFormData, PotFormValues, parse_pot_form, pot_form_view},
};

/// The state needed for the edit pot page and endpoint.
#[derive(Debug, Clone)]
pub struct EditPotState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditPotState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the pot editing page, pre-filled from the stored row.
pub async fn get_edit_pot_page(
    Path(pot_id): Path<PotId>,
    State(state): State<EditPotState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match get_pot(pot_id, user_id, &connection) {
        Ok(pot) => edit_pot_view(pot_id, &PotFormValues::from_pot(&pot), "").into_response(),
        Err(error) => error.into_response(),
    }
}

/// Handle pot update form submission.
pub async fn update_pot_endpoint(
    Path(pot_id): Path<PotId>,
    State(state): State<EditPotState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<PotFormData>,
) -> Response {
    let update = match parse_pot_form(&form, user_id) {
        Ok(update) => update,
        Err(error) => {
            return edit_pot_view(
                pot_id,
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

    match update_pot(pot_id, update, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::POTS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(Error::UpdateMissingPot) => Error::UpdateMissingPot.into_alert_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while updating pot {pot_id}: {error}");
            error.into_alert_response()
        }
    }
}

fn edit_pot_view(pot_id: PotId, values: &PotFormValues, error_message: &str) -> Markup {
    let edit_endpoint = endpoints::format_endpoint(endpoints::EDIT_POT_VIEW, pot_id);
    let update_endpoint = endpoints::format_endpoint(endpoints::PUT_POT, pot_id);

    let nav_bar = NavBar::new(&edit_endpoint).into_html();
    let form = pot_form_view(
        &PotFormAction::Update(update_endpoint),
        values,
        error_message,
    );

    let content = maud::html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form) }
    };

    base("Edit Pot", &content)
}

#[cfg(test)]
mod edit_pot_tests {
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
        endpoints,
        money::Cents,
        pot::{NewPot, create_pot, get_pot},
        test_utils::{
            assert_form_input_with_value, assert_hx_redirect, create_test_user,
            get_test_connection, must_get_form, parse_html_document,
        },
    };

    use super::{EditPotState, PotFormData, get_edit_pot_page, update_pot_endpoint};

    fn get_state_with_pot() -> (EditPotState, UserID, i64) {
        let conn = get_test_connection();
        let user = create_test_user(&conn);
        let pot = create_pot(
            NewPot {
                user_id: user.id,
                name: "House deposit".to_string(),
                target_amount: Cents::new(1_000_000),
                current_amount: Cents::new(250_000),
                color: Some("teal".to_string()),
                icon: Some("piggy-bank".to_string()),
                target_date: Some(date!(2026 - 06 - 01)),
                is_archived: false,
            },
            &conn,
        )
        .unwrap();

        let state = EditPotState {
            db_connection: Arc::new(Mutex::new(conn)),
        };

        (state, user.id, pot.id)
    }

    #[tokio::test]
    async fn page_is_prefilled_from_stored_row() {
        let (state, user_id, pot_id) = get_state_with_pot();

        let response = get_edit_pot_page(Path(pot_id), State(state), Extension(user_id)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;

        let form = must_get_form(&html);
        assert_form_input_with_value(&form, "name", "text", "House deposit");
        assert_form_input_with_value(&form, "target_amount", "number", "10000.00");
        assert_form_input_with_value(&form, "target_date", "date", "2026-06-01");
    }

    #[tokio::test]
    async fn page_returns_not_found_for_other_users_pot() {
        let (state, user_id, pot_id) = get_state_with_pot();
        let other_user_id = UserID::new(user_id.as_i64() + 1);

        let response = get_edit_pot_page(Path(pot_id), State(state), Extension(other_user_id)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn can_update_pot() {
        let (state, user_id, pot_id) = get_state_with_pot();
        let form = PotFormData {
            name: "House deposit".to_string(),
            target_amount: 10_000.0,
            current_amount: 3_000.0,
            color: Some("emerald".to_string()),
            icon: None,
            target_date: None,
            is_archived: Some("on".to_string()),
        };

        let response = update_pot_endpoint(
            Path(pot_id),
            State(state.clone()),
            Extension(user_id),
            Form(form),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::POTS_VIEW);

        let connection = state.db_connection.lock().unwrap();
        let pot = get_pot(pot_id, user_id, &connection).unwrap();
        assert_eq!(pot.current_amount, Cents::new(300_000));
        assert_eq!(pot.color.as_deref(), Some("emerald"));
        assert_eq!(pot.icon, None);
        assert!(pot.is_archived);
    }

    #[tokio::test]
    async fn update_fails_for_other_users_pot() {
        let (state, user_id, pot_id) = get_state_with_pot();
        let other_user_id = UserID::new(user_id.as_i64() + 1);
        let form = PotFormData {
            name: "House deposit".to_string(),
            target_amount: 10_000.0,
            current_amount: 3_000.0,
            color: None,
            icon: None,
            target_date: None,
            is_archived: None,
        };

        let response = update_pot_endpoint(
            Path(pot_id),
            State(state),
            Extension(other_user_id),
            Form(form),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
