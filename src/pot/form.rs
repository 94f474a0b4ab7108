//! The pot form shared by the create and edit pages.

use maud::{Markup, html};
use serde::Deserialize;
use time::Date;

use crate::{
    Error,
    auth::UserID,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CHECKBOX_STYLE, FORM_LABEL_STYLE, FORM_SELECT_STYLE,
        FORM_TEXT_INPUT_STYLE, dollar_input_styles,
    },
    money::Cents,
};

use super::core::{NewPot, POT_COLORS, POT_ICONS, Pot, validate_pot_color, validate_pot_icon};

/// The raw form data for creating or updating a pot.
///
/// The optional fields rely on `axum_extra`'s `Form`, which parses an empty
/// string as `None` instead of failing like `axum::Form`.
#[derive(Debug, Clone, Deserialize)]
pub struct PotFormData {
    /// A display name for the pot.
    pub name: String,
    /// The savings target in dollars.
    pub target_amount: f64,
    /// How much has been saved so far, in dollars.
    pub current_amount: f64,
    /// An optional color from the pot palette.
    #[serde(default)]
    pub color: Option<String>,
    /// An optional icon name.
    #[serde(default)]
    pub icon: Option<String>,
    /// An optional date to hit the target by.
    #[serde(default)]
    pub target_date: Option<Date>,
    /// Present when the archived checkbox is ticked.
    #[serde(default)]
    pub is_archived: Option<String>,
}

/// Validate the raw form data for the user `user_id`.
///
/// # Errors
/// Returns the first validation error encountered, to be displayed in the
/// re-rendered form.
pub(super) fn parse_pot_form(form: &PotFormData, user_id: UserID) -> Result<NewPot, Error> {
    let name = form.name.trim();
    if name.is_empty() {
        return Err(Error::EmptyField("name"));
    }

    let target_amount = Cents::from_form_input(form.target_amount)?;

    // A brand new pot may not have any savings in it yet.
    if !form.current_amount.is_finite() || form.current_amount < 0.0 {
        return Err(Error::InvalidAmount);
    }
    let current_amount = Cents::from_dollars(form.current_amount);

    let color = match form.color.as_deref().filter(|color| !color.is_empty()) {
        Some(color) => {
            validate_pot_color(color)?;
            Some(color.to_string())
        }
        None => None,
    };

    let icon = match form.icon.as_deref().filter(|icon| !icon.is_empty()) {
        Some(icon) => {
            validate_pot_icon(icon)?;
            Some(icon.to_string())
        }
        None => None,
    };

    Ok(NewPot {
        user_id,
        name: name.to_string(),
        target_amount,
        current_amount,
        color,
        icon,
        target_date: form.target_date,
        is_archived: form.is_archived.is_some(),
    })
}

/// The string values used to pre-fill the pot form.
#[derive(Debug, Default)]
pub(super) struct PotFormValues {
    pub name: String,
    pub target_amount: String,
    pub current_amount: String,
    pub color: String,
    pub icon: String,
    pub target_date: String,
    pub is_archived: bool,
}

impl PotFormValues {
    /// Echo back what the user submitted, used when re-rendering after a
    /// validation error.
    pub fn from_form_data(form: &PotFormData) -> Self {
        Self {
            name: form.name.clone(),
            target_amount: form.target_amount.to_string(),
            current_amount: form.current_amount.to_string(),
            color: form.color.clone().unwrap_or_default(),
            icon: form.icon.clone().unwrap_or_default(),
            target_date: form
                .target_date
                .map(|date| date.to_string())
                .unwrap_or_default(),
            is_archived: form.is_archived.is_some(),
        }
    }

    /// Pre-fill the form from an existing pot, used by the edit page.
    pub fn from_pot(pot: &Pot) -> Self {
        Self {
            name: pot.name.clone(),
            target_amount: pot.target_amount.to_string(),
            current_amount: pot.current_amount.to_string(),
            color: pot.color.clone().unwrap_or_default(),
            icon: pot.icon.clone().unwrap_or_default(),
            target_date: pot
                .target_date
                .map(|date| date.to_string())
                .unwrap_or_default(),
            is_archived: pot.is_archived,
        }
    }
}

/// Which endpoint the form submits to.
pub(super) enum PotFormAction {
    Create,
    Update(String),
}

pub(super) fn pot_form_view(
    action: &PotFormAction,
    values: &PotFormValues,
    error_message: &str,
) -> Markup {
    let (post_url, put_url, submit_label) = match action {
        PotFormAction::Create => (Some(crate::endpoints::POST_POT), None, "Create Pot"),
        PotFormAction::Update(url) => (None, Some(url.as_str()), "Save Pot"),
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
                    placeholder="e.g. House deposit"
                    required
                    autofocus
                    value=(values.name)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="target_amount" class=(FORM_LABEL_STYLE) { "Target amount" }

                div class="input-wrapper w-full"
                {
                    input
                        id="target_amount"
                        type="number"
                        name="target_amount"
                        step="0.01"
                        min="0.01"
                        placeholder="0.00"
                        required
                        value=(values.target_amount)
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            div
            {
                label for="current_amount" class=(FORM_LABEL_STYLE) { "Saved so far" }

                div class="input-wrapper w-full"
                {
                    input
                        id="current_amount"
                        type="number"
                        name="current_amount"
                        step="0.01"
                        min="0"
                        placeholder="0.00"
                        required
                        value=(values.current_amount)
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            div
            {
                label for="color" class=(FORM_LABEL_STYLE) { "Color" }

                select id="color" name="color" class=(FORM_SELECT_STYLE)
                {
                    option value="" selected[values.color.is_empty()] { "No color" }

                    @for color in POT_COLORS {
                        option value=(color) selected[values.color == color] { (color) }
                    }
                }
            }

            div
            {
                label for="icon" class=(FORM_LABEL_STYLE) { "Icon" }

                select id="icon" name="icon" class=(FORM_SELECT_STYLE)
                {
                    option value="" selected[values.icon.is_empty()] { "No icon" }

                    @for icon in POT_ICONS {
                        option value=(icon) selected[values.icon == icon] { (icon) }
                    }
                }
            }

            div
            {
                label for="target_date" class=(FORM_LABEL_STYLE) { "Target date" }

                input
                    id="target_date"
                    type="date"
                    name="target_date"
                    value=(values.target_date)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div class="flex items-center gap-x-3"
            {
                input
                    type="checkbox"
                    name="is_archived"
                    id="is_archived"
                    checked[values.is_archived]
                    class=(FORM_CHECKBOX_STYLE);

                label for="is_archived" class=(FORM_LABEL_STYLE) { "Archived" }
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
