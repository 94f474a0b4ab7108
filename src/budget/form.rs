//! The budget form shared by the create and edit pages.

use maud::{Markup, html};
use serde::Deserialize;
use time::Date;

use crate::{
    Error,
    auth::UserID,
    category::Category,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CHECKBOX_STYLE, FORM_LABEL_STYLE, FORM_SELECT_STYLE,
        FORM_TEXT_INPUT_STYLE, dollar_input_styles,
    },
    money::Cents,
};

use super::core::{Budget, NewBudget};

/// The raw form data for creating or updating a budget.
#[derive(Debug, Clone, Deserialize)]
pub struct BudgetFormData {
    /// A display name for the budget.
    pub name: String,
    /// The spending category the budget covers.
    pub category: String,
    /// The spending limit in dollars.
    pub limit: f64,
    /// How much has been spent so far, in dollars.
    pub spent: f64,
    /// A label for the period, e.g. "2025-01".
    pub period: String,
    /// The first day of the period.
    pub start_date: Date,
    /// The last day of the period.
    pub end_date: Date,
    /// Present when the active checkbox is ticked.
    #[serde(default)]
    pub is_active: Option<String>,
}

/// Validate the raw form data for the user `user_id`.
///
/// # Errors
/// Returns the first validation error encountered, to be displayed in the
/// re-rendered form.
pub(super) fn parse_budget_form(form: &BudgetFormData, user_id: UserID) -> Result<NewBudget, Error> {
    let name = form.name.trim();
    if name.is_empty() {
        return Err(Error::EmptyField("name"));
    }

    let category: Category = form.category.parse()?;
    let limit = Cents::from_form_input(form.limit)?;

    // Unlike the limit, zero is a sensible spent amount for a fresh budget.
    if !form.spent.is_finite() || form.spent < 0.0 {
        return Err(Error::InvalidAmount);
    }
    let spent = Cents::from_dollars(form.spent);

    let period = form.period.trim();
    if period.is_empty() {
        return Err(Error::EmptyField("period"));
    }

    if form.end_date <= form.start_date {
        return Err(Error::InvalidDateRange);
    }

    Ok(NewBudget {
        user_id,
        name: name.to_string(),
        category,
        limit,
        spent,
        period: period.to_string(),
        start_date: form.start_date,
        end_date: form.end_date,
        is_active: form.is_active.is_some(),
    })
}

/// The string values used to pre-fill the budget form.
#[derive(Debug)]
pub(super) struct BudgetFormValues {
    pub name: String,
    pub category: String,
    pub limit: String,
    pub spent: String,
    pub period: String,
    pub start_date: String,
    pub end_date: String,
    pub is_active: bool,
}

impl Default for BudgetFormValues {
    fn default() -> Self {
        Self {
            name: String::new(),
            category: String::new(),
            limit: String::new(),
            spent: "0".to_string(),
            period: String::new(),
            start_date: String::new(),
            end_date: String::new(),
            is_active: true,
        }
    }
}

impl BudgetFormValues {
    /// Echo back what the user submitted, used when re-rendering after a
    /// validation error.
    pub fn from_form_data(form: &BudgetFormData) -> Self {
        Self {
            name: form.name.clone(),
            category: form.category.clone(),
            limit: form.limit.to_string(),
            spent: form.spent.to_string(),
            period: form.period.clone(),
            start_date: form.start_date.to_string(),
            end_date: form.end_date.to_string(),
            is_active: form.is_active.is_some(),
        }
    }

    /// Pre-fill the form from an existing budget, used by the edit page.
    pub fn from_budget(budget: &Budget) -> Self {
        Self {
            name: budget.name.clone(),
            category: budget.category.as_str().to_string(),
            limit: budget.limit.to_string(),
            spent: budget.spent.to_string(),
            period: budget.period.clone(),
            start_date: budget.start_date.to_string(),
            end_date: budget.end_date.to_string(),
            is_active: budget.is_active,
        }
    }
}

/// Which endpoint the form submits to.
pub(super) enum BudgetFormAction {
    Create,
    Update(String),
}

pub(super) fn budget_form_view(
    action: &BudgetFormAction,
    values: &BudgetFormValues,
    error_message: &str,
) -> Markup {
    let (post_url, put_url, submit_label) = match action {
        BudgetFormAction::Create => (Some(crate::endpoints::POST_BUDGET), None, "Create Budget"),
        BudgetFormAction::Update(url) => (None, Some(url.as_str()), "Save Budget"),
    };

    html! {
        (dollar_input_styles())

        form
            hx-post=[post_url]
            hx-put=[put_url]
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label for="name" class=(FORM_LABEL_STYLE) { "Name" }

                input
                    id="name"
                    type="text"
                    name="name"
                    placeholder="e.g. January groceries"
                    required
                    autofocus
                    value=(values.name)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="category" class=(FORM_LABEL_STYLE) { "Category" }

                select id="category" name="category" required class=(FORM_SELECT_STYLE)
                {
                    @for category in Category::ALL {
                        option
                            value=(category.as_str())
                            selected[values.category == category.as_str()]
                        {
                            (category.label())
                        }
                    }
                }
            }

            div
            {
                label for="limit" class=(FORM_LABEL_STYLE) { "Limit" }

                div class="input-wrapper w-full"
                {
                    input
                        id="limit"
                        type="number"
                        name="limit"
                        step="0.01"
                        min="0.01"
                        placeholder="0.00"
                        required
                        value=(values.limit)
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            div
            {
                label for="spent" class=(FORM_LABEL_STYLE) { "Spent so far" }

                div class="input-wrapper w-full"
                {
                    input
                        id="spent"
                        type="number"
                        name="spent"
                        step="0.01"
                        min="0"
                        placeholder="0.00"
                        required
                        value=(values.spent)
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            div
            {
                label for="period" class=(FORM_LABEL_STYLE) { "Period" }

                input
                    id="period"
                    type="text"
                    name="period"
                    placeholder="e.g. 2025-01"
                    required
                    value=(values.period)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="start_date" class=(FORM_LABEL_STYLE) { "Start date" }

                input
                    id="start_date"
                    type="date"
                    name="start_date"
                    required
                    value=(values.start_date)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="end_date" class=(FORM_LABEL_STYLE) { "End date" }

                input
                    id="end_date"
                    type="date"
                    name="end_date"
                    required
                    value=(values.end_date)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div class="flex items-center gap-x-3"
            {
                input
                    type="checkbox"
                    name="is_active"
                    id="is_active"
                    checked[values.is_active]
                    class=(FORM_CHECKBOX_STYLE);

                label for="is_active" class=(FORM_LABEL_STYLE) { "Active" }
            }

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400"
                {
                    (error_message)
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { (submit_label) }
        }
    }
}
