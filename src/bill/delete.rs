//! Bill deletion endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{AppState, Error, alert::AlertView, auth::UserID, database_id::BillId};

use super::core::delete_bill;

/// The state needed for deleting a bill.
#[derive(Debug, Clone)]
pub struct DeleteBillState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteBillState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle bill deletion. Returns a success alert or an error alert.
pub async fn delete_bill_endpoint(
    Path(bill_id): Path<BillId>,
    State(state): State<DeleteBillState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_bill(bill_id, user_id, &connection) {
        Ok(_) => AlertView::success("Bill deleted successfully").into_response(),
        Err(Error::DeleteMissingBill) => Error::DeleteMissingBill.into_alert_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while deleting bill {bill_id}: {error}");
            error.into_alert_response()
        }
    }
}
