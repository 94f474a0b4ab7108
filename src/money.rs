//! The monetary-amount convention: every currency field in the application is
//! stored as a whole number of cents. Dollar amounts coming in from forms are
//! scaled by 100 and rounded; amounts going out to views are scaled back down.

use std::fmt::Display;

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};

use crate::Error;

/// A monetary amount in whole cents.
///
/// Stored in SQLite as an INTEGER column, which avoids the rounding drift of
/// REAL columns when amounts are summed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cents(i64);

impl Cents {
    /// Wrap a raw cent count.
    pub fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Convert a dollar amount to cents, rounding to the nearest cent.
    pub fn from_dollars(dollars: f64) -> Self {
        Self((dollars * 100.0).round() as i64)
    }

    /// Convert a dollar amount from a form input into cents.
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidAmount] if `dollars` is not a finite number
    /// greater than zero.
    pub fn from_form_input(dollars: f64) -> Result<Self, Error> {
        if !dollars.is_finite() || dollars <= 0.0 {
            return Err(Error::InvalidAmount);
        }

        Ok(Self::from_dollars(dollars))
    }

    /// The amount in dollars, for display and for pre-filling form inputs.
    pub fn as_dollars(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// The raw cent count.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for Cents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.as_dollars())
    }
}

impl ToSql for Cents {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0))
    }
}

impl FromSql for Cents {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(Cents)
    }
}
