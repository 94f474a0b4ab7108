#![allow(missing_docs)]

pub(crate) mod form;
pub(crate) mod http;

pub(crate) use form::{
    assert_form_error_message, assert_form_hidden_input, assert_form_input,
    assert_form_input_with_value, assert_form_select, assert_form_submit_button,
    assert_hx_endpoint, must_get_form,
};
pub(crate) use http::assert_hx_redirect;

use axum::{body::Body, response::Response};
use rusqlite::Connection;
use scraper::Html;

use crate::{
    auth::{Email, PasswordHash, User, create_user},
    db::initialize,
};

pub(crate) async fn parse_html_document(response: Response<Body>) -> Html {
    let body = response.into_body();
    let body = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Could not get response body");
    let text = String::from_utf8_lossy(&body).to_string();

    Html::parse_document(&text)
}

pub(crate) async fn parse_html_fragment(response: Response<Body>) -> Html {
    let body = response.into_body();
    let body = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Could not get response body");
    let text = String::from_utf8_lossy(&body).to_string();

    Html::parse_fragment(&text)
}

#[track_caller]
pub(crate) fn assert_valid_html(html: &Html) {
    assert!(
        html.errors.is_empty(),
        "Got HTML parsing errors: {:?}",
        html.errors
    );
}

/// An in-memory database with the application tables created.
pub(crate) fn get_test_connection() -> Connection {
    let conn = Connection::open_in_memory().expect("Could not open in-memory SQLite database");
    initialize(&conn).expect("Could not initialize database");

    conn
}

/// Insert a user to own the test data.
pub(crate) fn create_test_user(connection: &Connection) -> User {
    create_test_user_with_email(connection, "test@example.com")
}

pub(crate) fn create_test_user_with_email(connection: &Connection, email: &str) -> User {
    create_user(
        Email::new_unchecked(email),
        PasswordHash::new_unchecked("hunter2"),
        connection,
    )
    .expect("Could not create test user")
}
