//! Savings pot management: the `Pot` model, its database queries, and the
//! pages and endpoints for creating, editing, deleting, and listing pots.

mod core;
mod create;
mod delete;
mod edit;
mod form;
mod list;

pub use self::core::{Pot, create_pot_table};
pub use create::{create_pot_endpoint, get_new_pot_page};
pub use delete::delete_pot_endpoint;
pub use edit::{get_edit_pot_page, update_pot_endpoint};
pub use list::get_pots_page;

#[cfg(test)]
pub(crate) use self::core::{NewPot, create_pot, get_pot};
