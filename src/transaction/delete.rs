//! Transaction deletion endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error, alert::AlertView, auth::UserID, database_id::TransactionId,
};

use super::core::delete_transaction;

/// The state needed for deleting a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle transaction deletion. Returns a success alert or an error alert.
pub async fn delete_transaction_endpoint(
    Path(transaction_id): Path<TransactionId>,
    State(state): State<DeleteTransactionState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_transaction(transaction_id, user_id, &connection) {
        Ok(_) => AlertView::success("Transaction deleted successfully").into_response(),
        Err(Error::DeleteMissingTransaction) => {
            Error::DeleteMissingTransaction.into_alert_response()
        }
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting transaction {transaction_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod delete_transaction_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use time::macros::date;

    use crate::{
        Error,
        auth::UserID,
        category::Category,
        money::Cents,
        test_utils::{create_test_user, get_test_connection},
        transaction::{NewTransaction, TransactionType, create_transaction, get_transaction},
    };

    use super::{DeleteTransactionState, delete_transaction_endpoint};

    fn get_state_with_transaction() -> (DeleteTransactionState, UserID, i64) {
        let conn = get_test_connection();
        let user = create_test_user(&conn);
        let transaction = create_transaction(
            NewTransaction {
                user_id: user.id,
                amount: Cents::new(4599),
                transaction_type: TransactionType::Expense,
                category: Category::Groceries,
                merchant: "Countdown".to_string(),
                description: "weekly shop".to_string(),
                date: date!(2025 - 10 - 05),
            },
            &conn,
        )
        .unwrap();

        let state = DeleteTransactionState {
            db_connection: Arc::new(Mutex::new(conn)),
        };

        (state, user.id, transaction.id)
    }

    #[tokio::test]
    async fn can_delete_transaction() {
        let (state, user_id, transaction_id) = get_state_with_transaction();

        let response = delete_transaction_endpoint(
            Path(transaction_id),
            State(state.clone()),
            Extension(user_id),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(
            get_transaction(transaction_id, user_id, &connection),
            Err(Error::NotFound)
        );
    }

    #[tokio::test]
    async fn delete_fails_for_other_users_transaction() {
        let (state, user_id, transaction_id) = get_state_with_transaction();
        let other_user_id = UserID::new(user_id.as_i64() + 1);

        let response = delete_transaction_endpoint(
            Path(transaction_id),
            State(state.clone()),
            Extension(other_user_id),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        // The transaction is still there for its owner.
        let connection = state.db_connection.lock().unwrap();
        assert!(get_transaction(transaction_id, user_id, &connection).is_ok());
    }
}
