//! The recurring bill form shared by the create and edit pages.

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

use super::core::{Bill, Frequency, NewBill};

/// The default reminder lead time for new bills, in days.
const DEFAULT_REMINDER_DAYS: i64 = 3;

/// The raw form data for creating or updating a bill.
#[derive(Debug, Clone, Deserialize)]
pub struct BillFormData {
    /// A display name for the bill.
    pub name: String,
    /// The amount due each period, in dollars.
    pub amount: f64,
    /// The spending category of the bill.
    pub category: String,
    /// How often the bill falls due.
    pub frequency: String,
    /// The next day the bill is due.
    pub next_due_date: Date,
    /// The day the bill was last paid, if ever.
    #[serde(default)]
    pub last_paid_date: Option<Date>,
    /// How many days before the due date to flag the bill.
    pub reminder_days: i64,
    /// Present when the auto-deduct checkbox is ticked.
    #[serde(default)]
    pub auto_deduct: Option<String>,
    /// Present when the active checkbox is ticked.
    #[serde(default)]
    pub is_active: Option<String>,
}

/// Validate the raw form data for the user `user_id`.
///
/// # Errors
/// Returns the first validation error encountered, to be displayed in the
/// re-rendered form.
pub(super) fn parse_bill_form(form: &BillFormData, user_id: UserID) -> Result<NewBill, Error> {
    let name = form.name.trim();
    if name.is_empty() {
        return Err(Error::EmptyField("name"));
    }

    let amount = Cents::from_form_input(form.amount)?;
    let category: Category = form.category.parse()?;
    let frequency: Frequency = form.frequency.parse()?;

    if form.reminder_days <= 0 {
        return Err(Error::InvalidReminderDays);
    }

    Ok(NewBill {
        user_id,
        name: name.to_string(),
        amount,
        category,
        frequency,
        next_due_date: form.next_due_date,
        last_paid_date: form.last_paid_date,
        reminder_days: form.reminder_days,
        auto_deduct: form.auto_deduct.is_some(),
        is_active: form.is_active.is_some(),
    })
}

/// The string values used to pre-fill the bill form.
#[derive(Debug)]
pub(super) struct BillFormValues {
    pub name: String,
    pub amount: String,
    pub category: String,
    pub frequency: String,
    pub next_due_date: String,
    pub last_paid_date: String,
    pub reminder_days: String,
    pub auto_deduct: bool,
    pub is_active: bool,
}

impl Default for BillFormValues {
    fn default() -> Self {
        Self {
            name: String::new(),
            amount: String::new(),
            category: String::new(),
            frequency: String::new(),
            next_due_date: String::new(),
            last_paid_date: String::new(),
            reminder_days: DEFAULT_REMINDER_DAYS.to_string(),
            auto_deduct: false,
            is_active: true,
        }
    }
}

impl BillFormValues {
    /// Echo back what the user submitted, used when re-rendering after a
    /// validation error.
    pub fn from_form_data(form: &BillFormData) -> Self {
        Self {
            name: form.name.clone(),
            amount: form.amount.to_string(),
            category: form.category.clone(),
            frequency: form.frequency.clone(),
            next_due_date: form.next_due_date.to_string(),
            last_paid_date: form
                .last_paid_date
                .map(|date| date.to_string())
                .unwrap_or_default(),
            reminder_days: form.reminder_days.to_string(),
            auto_deduct: form.auto_deduct.is_some(),
            is_active: form.is_active.is_some(),
        }
    }

    /// Pre-fill the form from an existing bill, used by the edit page.
    pub fn from_bill(bill: &Bill) -> Self {
        Self {
            name: bill.name.clone(),
            amount: bill.amount.to_string(),
            category: bill.category.as_str().to_string(),
            frequency: bill.frequency.as_str().to_string(),
            next_due_date: bill.next_due_date.to_string(),
            last_paid_date: bill
                .last_paid_date
                .map(|date| date.to_string())
                .unwrap_or_default(),
            reminder_days: bill.reminder_days.to_string(),
            auto_deduct: bill.auto_deduct,
            is_active: bill.is_active,
        }
    }
}

/// Which endpoint the form submits to.
pub(super) enum BillFormAction {
    Create,
    Update(String),
}

pub(super) fn bill_form_view(
    action: &BillFormAction,
    values: &BillFormValues,
    error_message: &str,
) -> Markup {
    let (post_url, put_url, submit_label) = match action {
        BillFormAction::Create => (Some(crate::endpoints::POST_BILL), None, "Create Bill"),
        BillFormAction::Update(url) => (None, Some(url.as_str()), "Save Bill"),
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
                    placeholder="e.g. Electricity"
                    required
                    autofocus
                    value=(values.name)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                div class="input-wrapper w-full"
                {
                    input
                        id="amount"
                        type="number"
                        name="amount"
                        step="0.01"
                        min="0.01"
                        placeholder="0.00"
                        required
                        value=(values.amount)
                        class=(FORM_TEXT_INPUT_STYLE);
                }
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
                label for="frequency" class=(FORM_LABEL_STYLE) { "Frequency" }

                select id="frequency" name="frequency" required class=(FORM_SELECT_STYLE)
                {
                    @for frequency in Frequency::ALL {
                        option
                            value=(frequency.as_str())
                            selected[values.frequency == frequency.as_str()]
                        {
                            (frequency.label())
                        }
                    }
                }
            }

            div
            {
                label for="next_due_date" class=(FORM_LABEL_STYLE) { "Next due" }

                input
                    id="next_due_date"
                    type="date"
                    name="next_due_date"
                    required
                    value=(values.next_due_date)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="last_paid_date" class=(FORM_LABEL_STYLE) { "Last paid" }

                input
                    id="last_paid_date"
                    type="date"
                    name="last_paid_date"
                    value=(values.last_paid_date)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="reminder_days" class=(FORM_LABEL_STYLE) { "Remind me days before" }

                input
                    id="reminder_days"
                    type="number"
                    name="reminder_days"
                    min="1"
                    required
                    value=(values.reminder_days)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div class="flex items-center gap-x-3"
            {
                input
                    type="checkbox"
                    name="auto_deduct"
                    id="auto_deduct"
                    checked[values.auto_deduct]
                    class=(FORM_CHECKBOX_STYLE);

                label for="auto_deduct" class=(FORM_LABEL_STYLE) { "Paid automatically" }
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
