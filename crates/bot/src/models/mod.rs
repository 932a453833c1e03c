//! Domain types.
//!
//! These are validated domain objects, separate from the row structs the
//! repositories read from SQLite.

pub mod cart;
pub mod order;
pub mod product;
pub mod user;

pub use cart::CartLine;
pub use order::{LineItem, LineItems, Order};
pub use product::{Pack, Product};
pub use user::{ProfilePatch, User};
