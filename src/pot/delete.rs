//! Pot deletion endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{AppState, Error, alert::AlertView, auth::UserID, database_id::PotId};

use super::core::delete_pot;

/// The state needed for deleting a pot.
#[derive(Debug, Clone)]
pub struct DeletePotState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeletePotState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle pot deletion. Returns a success alert or an error alert.
pub async fn delete_pot_endpoint(
    Path(pot_id): Path<PotId>,
    State(state): State<DeletePotState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_pot(pot_id, user_id, &connection) {
        Ok(_) => AlertView::success("Pot deleted successfully").into_response(),
        Err(Error::DeleteMissingPot) => Error::DeleteMissingPot.into_alert_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while deleting pot {pot_id}: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod delete_pot_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };

    use crate::{
        Error,
        auth::UserID,
        money::Cents,
        pot::{NewPot, create_pot, get_pot},
        test_utils::{create_test_user, get_test_connection},
    };

    use super::{DeletePotState, delete_pot_endpoint};

    fn get_state_with_pot() -> (DeletePotState, UserID, i64) {
        let conn = get_test_connection();
        let user = create_test_user(&conn);
        let pot = create_pot(
            NewPot {
                user_id: user.id,
                name: "House deposit".to_string(),
                target_amount: Cents::new(1_000_000),
                current_amount: Cents::new(0),
                color: None,
                icon: None,
                target_date: None,
                is_archived: false,
            },
            &conn,
        )
        .unwrap();

        let state = DeletePotState {
            db_connection: Arc::new(Mutex::new(conn)),
        };

        (state, user.id, pot.id)
    }

    #[tokio::test]
    async fn can_delete_pot() {
        let (state, user_id, pot_id) = get_state_with_pot();

        let response = delete_pot_endpoint(Path(pot_id), State(state.clone()), Extension(user_id))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_pot(pot_id, user_id, &connection), Err(Error::NotFound));
    }

    #[tokio::test]
    async fn delete_fails_for_other_users_pot() {
        let (state, user_id, pot_id) = get_state_with_pot();
        let other_user_id = UserID::new(user_id.as_i64() + 1);

        let response = delete_pot_endpoint(Path(pot_id), State(state.clone()), Extension(other_user_id))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let connection = state.db_connection.lock().unwrap();
        assert!(get_pot(pot_id, user_id, &connection).is_ok());
    }
}
