//! Role sessions and update dispatch.
//!
//! Every inbound update resolves its role once (`Role::resolve`) and is then
//! handled by a capability object - [`AdminSession`] or [`CustomerSession`] -
//! so identity comparisons never leak into individual handlers. Handlers
//! mutate state first and only then produce [`OutboundMessage`] values;
//! delivery happens last and its failures are logged, not propagated.

pub mod admin;
pub mod customer;

use packshop_core::{MediaRef, OrderStatus, ShippingMethod, UserId};

pub use admin::{AdminSession, PackWizard, ProductWizard};
pub use customer::CustomerSession;

use crate::collector::ProfileCollector;
use crate::db::UserRepository;
use crate::error::Result;
use crate::models::{LineItem, Order, User};
use crate::state::AppState;
use crate::transport::{ChatTransport, OutboundMessage};

/// The transport-provided identity behind an update.
#[derive(Debug, Clone)]
pub struct ChatUser {
    /// Stable chat ID.
    pub id: UserId,
    /// Transport username, if the platform has one.
    pub username: Option<String>,
    /// Transport first name.
    pub first_name: Option<String>,
}

/// What an update carries.
#[derive(Debug, Clone)]
pub enum UpdatePayload {
    /// A plain text message (includes reply-menu button presses).
    Text(String),
    /// Inline-button callback data.
    Callback(String),
    /// A photo upload, by media handle.
    Photo(MediaRef),
}

/// One inbound update from the transport.
#[derive(Debug, Clone)]
pub struct Update {
    /// Who sent it.
    pub from: ChatUser,
    /// What it carries.
    pub payload: UpdatePayload,
}

/// The two roles, resolved once per update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Customer,
}

impl Role {
    /// Resolve the role for a user against the configured administrator.
    #[must_use]
    pub fn resolve(user: UserId, admin: UserId) -> Self {
        if user == admin { Self::Admin } else { Self::Customer }
    }
}

/// Per-user in-flight conversation state.
///
/// A user has at most one of these at a time; installing a new flow
/// discards the previous one along with any partial input.
pub enum Flow {
    /// Admin add-product wizard.
    AddProduct(ProductWizard),
    /// Admin add-pack wizard.
    AddPack(PackWizard),
    /// The profile collector, in any of its four resume contexts.
    Collecting(ProfileCollector),
    /// Checkout: shipping chosen, final invoice preview showing.
    FinalPreview {
        /// Shipping method the customer picked.
        shipping: ShippingMethod,
    },
}

/// Handle one update and return the replies to deliver.
///
/// Errors never escape: they are logged and turned into the user-facing
/// message from [`BotError::user_message`](crate::error::BotError::user_message).
pub async fn handle_update(state: &AppState, update: Update) -> Vec<OutboundMessage> {
    let user = update.from.id;
    match route(state, update).await {
        Ok(messages) => messages,
        Err(e) => {
            tracing::warn!(user = %user, error = %e, "update handling failed");
            vec![OutboundMessage::text(user, e.user_message())]
        }
    }
}

async fn route(state: &AppState, update: Update) -> Result<Vec<OutboundMessage>> {
    // First contact creates the user row; repeat contact is a no-op.
    UserRepository::new(state.pool())
        .ensure(
            update.from.id,
            update.from.username.as_deref(),
            update.from.first_name.as_deref(),
        )
        .await?;

    match Role::resolve(update.from.id, state.config().admin_id) {
        Role::Admin => AdminSession::new(state).handle(update).await,
        Role::Customer => CustomerSession::new(state, update.from.id).handle(update).await,
    }
}

/// Handle one update and deliver the replies through the transport.
///
/// State is already committed when delivery starts, so a failed send is
/// logged and dropped; it cannot corrupt lifecycle state.
pub async fn run_update<T: ChatTransport>(state: &AppState, transport: &T, update: Update) {
    for message in handle_update(state, update).await {
        if let Err(e) = transport.deliver(&message).await {
            tracing::warn!(error = %e, "dropping undeliverable message");
        }
    }
}

/// Numbered line-item listing used in invoices and admin reviews.
pub(crate) fn format_line_items(items: &[LineItem]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            format!(
                "{}. {} - {} ({} pcs) ×{} = {}",
                i + 1,
                item.product,
                item.pack,
                item.units_per_pack,
                item.quantity,
                item.subtotal()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Customer-facing wording for a status.
pub(crate) const fn status_label(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Pending => "awaiting review",
        OrderStatus::WaitingPayment => "awaiting payment",
        OrderStatus::ReceiptSent => "receipt under review",
        OrderStatus::Confirmed => "confirmed",
        OrderStatus::Rejected => "rejected",
    }
}

/// The order block shown to the admin during review.
pub(crate) fn admin_order_summary(order: &Order, customer: Option<&User>) -> String {
    let mut text = format!(
        "🧾 Order #{}\n{}\nTotal: {}",
        order.id,
        format_line_items(order.items.items()),
        order.total_price
    );

    if let Some(method) = order.shipping_method {
        text.push_str(&format!("\nShipping: {}", method.label()));
    }

    if let Some(user) = customer {
        text.push_str(&format!("\n\nCustomer: {}", profile_block(user)));
    }

    text
}

/// Name/address/phone block used in summaries.
pub(crate) fn profile_block(user: &User) -> String {
    let name = user
        .full_name
        .as_deref()
        .or(user.first_name.as_deref())
        .unwrap_or("(no name)");
    let mut text = name.to_owned();

    if let Some(username) = user.username.as_deref() {
        text.push_str(&format!(" (@{username})"));
    }
    if let Some(address) = user.address.as_deref() {
        text.push_str(&format!("\nAddress: {address}"));
    }
    if let Some(phone) = user.phone.as_deref() {
        text.push_str(&format!("\nPhone: {phone}"));
    }

    text
}
