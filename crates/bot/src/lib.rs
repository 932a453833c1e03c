//! Packshop Bot - conversational storefront core.
//!
//! One administrator manages a catalog of products, each with purchasable
//! packs; customers fill a cart from channel buttons, enter their shipping
//! details through a short form, and place orders the admin reviews. Payment
//! is a manually reviewed receipt photo, driven by the order status machine
//! in [`db::orders`].
//!
//! # Architecture
//!
//! - [`db`] - SQLite repositories (catalog, users, cart, orders, stats)
//! - [`models`] - domain types, including the frozen order line items
//! - [`collector`] - the reusable three-step profile form
//! - [`sessions`] - role dispatch and the admin/customer handlers
//! - [`keyboards`] / [`transport`] - pure outbound message and button data;
//!   the chat transport itself is an external adapter implementing
//!   [`transport::ChatTransport`]
//!
//! The crate is a library on purpose: process bootstrapping and the
//! transport loop live outside it. The [`crate::sessions::handle_update`]
//! entry point takes an inbound [`sessions::Update`] and returns the
//! outbound messages to deliver.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod collector;
pub mod config;
pub mod db;
pub mod error;
pub mod keyboards;
pub mod models;
pub mod sessions;
pub mod state;
pub mod transport;

pub use config::BotConfig;
pub use error::{BotError, Result};
pub use state::AppState;
