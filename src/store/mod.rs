//! Persistence layer — SQLite-backed storage for users and orders.

pub mod db;
pub mod orders;
pub mod users;

pub use db::Database;
pub use orders::{OrderStore, SaveOutcome};
pub use users::UserStore;
