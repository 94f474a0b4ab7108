//! Alert fragments for displaying success and error messages to users.
//!
//! Alerts are rendered as HTML fragments targeted at the fixed
//! `#alert-container` element, which htmx swaps in without a page reload.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::html::render;

const ALERT_SUCCESS_STYLE: &str = "block p-4 mb-4 text-sm text-green-800 rounded-lg \
    bg-green-50 dark:bg-gray-800 dark:text-green-400";
const ALERT_ERROR_STYLE: &str = "block p-4 mb-4 text-sm text-red-800 rounded-lg \
    bg-red-50 dark:bg-gray-800 dark:text-red-400";

enum AlertKind {
    Success,
    Error,
}

/// An alert message with a short title and optional details.
pub struct AlertView {
    kind: AlertKind,
    message: String,
    details: String,
}

impl AlertView {
    /// Create a success alert.
    pub fn success(message: &str) -> Self {
        Self {
            kind: AlertKind::Success,
            message: message.to_owned(),
            details: String::new(),
        }
    }

    /// Create an error alert.
    pub fn error(message: &str, details: &str) -> Self {
        Self {
            kind: AlertKind::Error,
            message: message.to_owned(),
            details: details.to_owned(),
        }
    }

    /// Render the alert as a fragment that replaces `#alert-container`.
    pub fn into_markup(self) -> Markup {
        let style = match self.kind {
            AlertKind::Success => ALERT_SUCCESS_STYLE,
            AlertKind::Error => ALERT_ERROR_STYLE,
        };

        html! {
            div id="alert-container" class=(style) role="alert"
            {
                p class="font-medium" { (self.message) }

                @if !self.details.is_empty() {
                    p { (self.details) }
                }
            }
        }
    }
}

impl IntoResponse for AlertView {
    fn into_response(self) -> Response {
        render(StatusCode::OK, self.into_markup())
    }
}
