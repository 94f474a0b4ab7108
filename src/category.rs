//! The fixed set of spending categories shared by transactions, budgets, and
//! recurring bills.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};

use crate::Error;

/// A spending category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub enum Category {
    /// Supermarket and food shopping.
    Groceries,
    /// Fuel, fares, and vehicle costs.
    Transport,
    /// Movies, games, events.
    Entertainment,
    /// Utilities and household bills.
    Bills,
    /// General retail purchases.
    Shopping,
    /// Restaurants, cafes, takeaways.
    Dining,
    /// Wages and other earned income.
    Salary,
    /// Anything that does not fit the above.
    Other,
}

impl Category {
    /// Every category, in the order they are shown in form dropdowns.
    pub const ALL: [Category; 8] = [
        Category::Groceries,
        Category::Transport,
        Category::Entertainment,
        Category::Bills,
        Category::Shopping,
        Category::Dining,
        Category::Salary,
        Category::Other,
    ];

    /// The lowercase identifier stored in the database and posted by forms.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Groceries => "groceries",
            Category::Transport => "transport",
            Category::Entertainment => "entertainment",
            Category::Bills => "bills",
            Category::Shopping => "shopping",
            Category::Dining => "dining",
            Category::Salary => "salary",
            Category::Other => "other",
        }
    }

    /// The human-readable label shown in pages.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Groceries => "Groceries",
            Category::Transport => "Transport",
            Category::Entertainment => "Entertainment",
            Category::Bills => "Bills",
            Category::Shopping => "Shopping",
            Category::Dining => "Dining",
            Category::Salary => "Salary",
            Category::Other => "Other",
        }
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "groceries" => Ok(Category::Groceries),
            "transport" => Ok(Category::Transport),
            "entertainment" => Ok(Category::Entertainment),
            "bills" => Ok(Category::Bills),
            "shopping" => Ok(Category::Shopping),
            "dining" => Ok(Category::Dining),
            "salary" => Ok(Category::Salary),
            "other" => Ok(Category::Other),
            _ => Err(Error::InvalidCategory(s.to_string())),
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl ToSql for Category {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Category {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;

        text.parse()
            .map_err(|_| FromSqlError::Other(format!("unknown category {text:?}").into()))
    }
}
