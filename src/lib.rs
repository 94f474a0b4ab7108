//! Centsible is a web app for tracking your personal finances: transactions,
//! budgets, savings pots, and recurring bills.
//!
//! This library provides a REST API that directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod alert;
mod app_state;
mod auth;
mod bill;
mod budget;
mod category;
mod dashboard;
mod database_id;
mod db;
mod endpoints;
mod html;
mod internal_server_error;
mod logging;
mod money;
mod navigation;
mod not_found;
mod pagination;
mod pot;
mod routing;
#[cfg(test)]
mod test_utils;
mod timezone;
mod transaction;

pub use app_state::AppState;
pub use auth::{Email, PasswordHash, User, UserID, ValidatedPassword, get_user_by_id};
pub use db::initialize as initialize_db;
pub use logging::logging_middleware;
pub use money::Cents;
pub use pagination::PaginationConfig;
pub use routing::build_router;

use crate::{
    alert::AlertView, html::render, internal_server_error::render_internal_server_error,
    not_found::get_404_not_found_response,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user provided an invalid combination of email and password.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The session token cookie is missing from the cookie jar in the request.
    #[error("no session cookie in the cookie jar")]
    CookieMissing,

    /// The session token in the auth cookie could not be serialized or parsed.
    ///
    /// Callers should pass in the original error as a string.
    #[error("could not read or write the session token: {0}")]
    TokenError(String),

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The email used to register already belongs to an account.
    #[error("the email address is already registered")]
    DuplicateEmail,

    /// A string could not be parsed as an email address.
    #[error("\"{0}\" is not a valid email address")]
    InvalidEmail(String),

    /// A required text field was submitted empty.
    #[error("{0} cannot be empty")]
    EmptyField(&'static str),

    /// A money amount was zero, negative, or not a number.
    #[error("amount must be greater than zero")]
    InvalidAmount,

    /// A string did not match any spending category.
    #[error("\"{0}\" is not a valid category")]
    InvalidCategory(String),

    /// A string did not match either transaction type.
    #[error("\"{0}\" is not a valid transaction type")]
    InvalidTransactionType(String),

    /// A string did not match any billing frequency.
    #[error("\"{0}\" is not a valid frequency")]
    InvalidFrequency(String),

    /// A string did not match any pot color.
    #[error("\"{0}\" is not a valid pot color")]
    InvalidPotColor(String),

    /// A string did not match any pot icon.
    #[error("\"{0}\" is not a valid pot icon")]
    InvalidPotIcon(String),

    /// Reminder lead time must be at least one day.
    #[error("reminder days must be greater than zero")]
    InvalidReminderDays,

    /// A budget's end date must come after its start date.
    #[error("the end date must be after the start date")]
    InvalidDateRange,

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Tried to update a transaction that does not exist
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to update a budget that does not exist
    #[error("tried to update a budget that is not in the database")]
    UpdateMissingBudget,

    /// Tried to delete a budget that does not exist
    #[error("tried to delete a budget that is not in the database")]
    DeleteMissingBudget,

    /// Tried to update a pot that does not exist
    #[error("tried to update a pot that is not in the database")]
    UpdateMissingPot,

    /// Tried to delete a pot that does not exist
    #[error("tried to delete a pot that is not in the database")]
    DeleteMissingPot,

    /// Tried to update a recurring bill that does not exist
    #[error("tried to update a bill that is not in the database")]
    UpdateMissingBill,

    /// Tried to delete a recurring bill that does not exist
    #[error("tried to delete a bill that is not in the database")]
    DeleteMissingBill,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::InvalidTimezoneError(timezone) => render_internal_server_error(
                "Invalid Timezone Settings",
                &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to a valid, canonical timezone string"
                ),
            ),
            Error::DatabaseLockError => render_internal_server_error(
                "Sorry, something went wrong.",
                "Try again later or check the server logs",
            ),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                render_internal_server_error(
                    "Sorry, something went wrong.",
                    "Try again later or check the server logs",
                )
            }
        }
    }
}

impl Error {
    fn into_alert_response(self) -> Response {
        match self {
            Error::UpdateMissingTransaction => render(
                StatusCode::NOT_FOUND,
                AlertView::error(
                    "Could not update transaction",
                    "The transaction could not be found.",
                )
                .into_markup(),
            ),
            Error::DeleteMissingTransaction => render(
                StatusCode::NOT_FOUND,
                AlertView::error(
                    "Could not delete transaction",
                    "The transaction could not be found. \
                    Try refreshing the page to see if the transaction has already been deleted.",
                )
                .into_markup(),
            ),
            Error::UpdateMissingBudget => render(
                StatusCode::NOT_FOUND,
                AlertView::error("Could not update budget", "The budget could not be found.")
                    .into_markup(),
            ),
            Error::DeleteMissingBudget => render(
                StatusCode::NOT_FOUND,
                AlertView::error(
                    "Could not delete budget",
                    "The budget could not be found. \
                    Try refreshing the page to see if the budget has already been deleted.",
                )
                .into_markup(),
            ),
            Error::UpdateMissingPot => render(
                StatusCode::NOT_FOUND,
                AlertView::error("Could not update pot", "The pot could not be found.")
                    .into_markup(),
            ),
            Error::DeleteMissingPot => render(
                StatusCode::NOT_FOUND,
                AlertView::error(
                    "Could not delete pot",
                    "The pot could not be found. \
                    Try refreshing the page to see if the pot has already been deleted.",
                )
                .into_markup(),
            ),
            Error::UpdateMissingBill => render(
                StatusCode::NOT_FOUND,
                AlertView::error("Could not update bill", "The bill could not be found.")
                    .into_markup(),
            ),
            Error::DeleteMissingBill => render(
                StatusCode::NOT_FOUND,
                AlertView::error(
                    "Could not delete bill",
                    "The bill could not be found. \
                    Try refreshing the page to see if the bill has already been deleted.",
                )
                .into_markup(),
            ),
            Error::DuplicateEmail => render(
                StatusCode::BAD_REQUEST,
                AlertView::error(
                    "Email already registered",
                    "An account already exists for this email address. \
                    Log in instead, or register with a different email.",
                )
                .into_markup(),
            ),
            _ => render(
                StatusCode::INTERNAL_SERVER_ERROR,
                AlertView::error(
                    "Something went wrong",
                    "An unexpected error occurred, check the server logs for more details.",
                )
                .into_markup(),
            ),
        }
    }
}
