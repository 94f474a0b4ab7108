//! Recurring bill management: the `Bill` model, its database queries, and the
//! pages and endpoints for creating, editing, deleting, and listing bills.

mod core;
mod create;
mod delete;
mod edit;
mod form;
mod list;

pub use self::core::{Bill, Frequency, count_bills_due_soon, create_bill_table};
pub use create::{create_bill_endpoint, get_new_bill_page};
pub use delete::delete_bill_endpoint;
pub use edit::{get_edit_bill_page, update_bill_endpoint};
pub use list::get_bills_page;

#[cfg(test)]
pub(crate) use self::core::{NewBill, create_bill, get_bill};
