//! The transaction form shared by the create and edit pages.

use maud::{Markup, html};
use serde::Deserialize;
use time::Date;

use crate::{
    Error,
    auth::UserID,
    category::Category,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_SELECT_STYLE, FORM_TEXT_INPUT_STYLE,
        dollar_input_styles,
    },
    money::Cents,
};

use super::core::{NewTransaction, Transaction, TransactionType};

/// The raw form data for creating or updating a transaction.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionFormData {
    /// The value of the transaction in dollars.
    pub amount: f64,
    /// Whether the transaction is income or an expense.
    pub transaction_type: String,
    /// The spending category of the transaction.
    pub category: String,
    /// Who the money went to or came from.
    pub merchant: String,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The date when the transaction occurred.
    pub date: Date,
}

/// Validate the raw form data for the user `user_id`.
///
/// # Errors
/// Returns the first validation error encountered, to be displayed in the
/// re-rendered form.
pub(super) fn parse_transaction_form(
    form: &TransactionFormData,
    user_id: UserID,
) -> Result<NewTransaction, Error> {
    let amount = Cents::from_form_input(form.amount)?;
    let transaction_type: TransactionType = form.transaction_type.parse()?;
    let category: Category = form.category.parse()?;

    let merchant = form.merchant.trim();
    if merchant.is_empty() {
        return Err(Error::EmptyField("merchant"));
    }

    let description = form.description.trim();
    if description.is_empty() {
        return Err(Error::EmptyField("description"));
    }

    Ok(NewTransaction {
        user_id,
        amount,
        transaction_type,
        category,
        merchant: merchant.to_string(),
        description: description.to_string(),
        date: form.date,
    })
}

/// The string values used to pre-fill the transaction form.
#[derive(Debug, Default)]
pub(super) struct TransactionFormValues {
    pub amount: String,
    pub transaction_type: String,
    pub category: String,
    pub merchant: String,
    pub description: String,
    pub date: String,
}

impl TransactionFormValues {
    /// Echo back what the user submitted, used when re-rendering after a
    /// validation error.
    pub fn from_form_data(form: &TransactionFormData) -> Self {
        Self {
            amount: form.amount.to_string(),
            transaction_type: form.transaction_type.clone(),
            category: form.category.clone(),
            merchant: form.merchant.clone(),
            description: form.description.clone(),
            date: form.date.to_string(),
        }
    }

    /// Pre-fill the form from an existing transaction, used by the edit page.
    pub fn from_transaction(transaction: &Transaction) -> Self {
        Self {
            amount: transaction.amount.to_string(),
            transaction_type: transaction.transaction_type.as_str().to_string(),
            category: transaction.category.as_str().to_string(),
            merchant: transaction.merchant.clone(),
            description: transaction.description.clone(),
            date: transaction.date.to_string(),
        }
    }
}

/// Which endpoint the form submits to.
pub(super) enum TransactionFormAction {
    /// POST to the transaction creation endpoint.
    Create,
    /// PUT to the update endpoint for a specific transaction.
    Update(String),
}

pub(super) fn transaction_form_view(
    action: &TransactionFormAction,
    values: &TransactionFormValues,
    error_message: &str,
) -> Markup {
    let (post_url, put_url, submit_label) = match action {
        TransactionFormAction::Create => {
            (Some(crate::endpoints::POST_TRANSACTION), None, "Create Transaction")
        }
        TransactionFormAction::Update(url) => (None, Some(url.as_str()), "Save Transaction"),
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
                label for="merchant" class=(FORM_LABEL_STYLE) { "Merchant" }

                input
                    id="merchant"
                    type="text"
                    name="merchant"
                    placeholder="Who was paid, or who paid you"
                    required
                    autofocus
                    value=(values.merchant)
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
                label for="transaction_type" class=(FORM_LABEL_STYLE) { "Type" }

                select id="transaction_type" name="transaction_type" required class=(FORM_SELECT_STYLE)
                {
                    @for transaction_type in TransactionType::ALL {
                        option
                            value=(transaction_type.as_str())
                            selected[values.transaction_type == transaction_type.as_str()]
                        {
                            (transaction_type.label())
                        }
                    }
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
                label for="date" class=(FORM_LABEL_STYLE) { "Date" }

                input
                    id="date"
                    type="date"
                    name="date"
                    required
                    value=(values.date)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="description" class=(FORM_LABEL_STYLE) { "Description" }

                input
                    id="description"
                    type="text"
                    name="description"
                    placeholder="What was it for?"
                    required
                    value=(values.description)
                    class=(FORM_TEXT_INPUT_STYLE);
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

#[cfg(test)]
mod parse_transaction_form_tests {
    use time::macros::date;

    use crate::{Error, auth::UserID, category::Category, money::Cents};

    use super::{TransactionFormData, parse_transaction_form};

    fn form_data() -> TransactionFormData {
        TransactionFormData {
            amount: 45.99,
            transaction_type: "expense".to_string(),
            category: "groceries".to_string(),
            merchant: "Countdown".to_string(),
            description: "weekly shop".to_string(),
            date: date!(2025 - 10 - 05),
        }
    }

    #[test]
    fn converts_dollars_to_cents() {
        let new_transaction = parse_transaction_form(&form_data(), UserID::new(1)).unwrap();

        assert_eq!(new_transaction.amount, Cents::new(4599));
        assert_eq!(new_transaction.category, Category::Groceries);
    }

    #[test]
    fn trims_text_fields() {
        let mut form = form_data();
        form.merchant = "  Countdown  ".to_string();

        let new_transaction = parse_transaction_form(&form, UserID::new(1)).unwrap();

        assert_eq!(new_transaction.merchant, "Countdown");
    }

    #[test]
    fn rejects_zero_amount() {
        let mut form = form_data();
        form.amount = 0.0;

        let result = parse_transaction_form(&form, UserID::new(1));

        assert_eq!(result, Err(Error::InvalidAmount));
    }

    #[test]
    fn rejects_unknown_category() {
        let mut form = form_data();
        form.category = "holidays".to_string();

        let result = parse_transaction_form(&form, UserID::new(1));

        assert_eq!(result, Err(Error::InvalidCategory("holidays".to_string())));
    }

    #[test]
    fn rejects_empty_merchant() {
        let mut form = form_data();
        form.merchant = "   ".to_string();

        let result = parse_transaction_form(&form, UserID::new(1));

        assert_eq!(result, Err(Error::EmptyField("merchant")));
    }
}
