//! Transaction management: the `Transaction` model, its database queries, and
//! the pages and endpoints for creating, editing, deleting, and listing
//! transactions.

mod core;
mod create;
mod delete;
mod edit;
mod form;
mod list;

pub use self::core::{Transaction, TransactionType, create_transaction_table};
pub use create::{create_transaction_endpoint, get_new_transaction_page};
pub use delete::delete_transaction_endpoint;
pub use edit::{get_edit_transaction_page, update_transaction_endpoint};
pub use list::get_transactions_page;

#[cfg(test)]
pub(crate) use self::core::{NewTransaction, create_transaction, get_transaction};
