//! A customer's session: browsing, cart, checkout, receipts, and the
//! profile views.

use packshop_core::{MediaRef, Price, ShippingMethod, UserId};

use crate::collector::{CollectorOutcome, NAME_PROMPT, ProfileCollector, ResumeAction};
use crate::db::{CartRepository, CatalogRepository, OrderRepository, RepositoryError, UserRepository};
use crate::error::{BotError, Result};
use crate::keyboards::{self, Callback, menu};
use crate::models::{CartLine, ProfilePatch, User};
use crate::sessions::{Flow, Update, UpdatePayload, admin_order_summary, format_line_items, status_label};
use crate::state::AppState;
use crate::transport::OutboundMessage;

const HELP_TEXT: &str = "📚 How to order:\n\
    1. Browse the products in our channel\n\
    2. Tap a pack button under a product\n\
    3. Every tap adds one pack to your cart\n\
    4. When you are done, open \"🛒 Cart\"\n\
    5. Finalize your order and enter your details\n\
    6. After approval, pay the total\n\
    7. Upload a photo of the receipt here\n\
    8. Your order ships! 🎉";

/// A customer's capability object.
pub struct CustomerSession<'a> {
    state: &'a AppState,
    user: UserId,
}

impl<'a> CustomerSession<'a> {
    /// Create a session for one customer.
    #[must_use]
    pub const fn new(state: &'a AppState, user: UserId) -> Self {
        Self { state, user }
    }

    /// Handle one customer update.
    ///
    /// # Errors
    ///
    /// Returns `BotError` when a referenced entity is missing or an order
    /// operation is attempted from the wrong status; the dispatcher turns
    /// that into a reply.
    pub async fn handle(&self, update: Update) -> Result<Vec<OutboundMessage>> {
        match update.payload {
            UpdatePayload::Text(text) => self.handle_text(&text).await,
            UpdatePayload::Callback(data) => self.handle_callback(&data).await,
            UpdatePayload::Photo(media) => self.handle_photo(media).await,
        }
    }

    async fn handle_text(&self, text: &str) -> Result<Vec<OutboundMessage>> {
        if text == menu::CANCEL {
            self.state.clear_flow(self.user).await;
            return Ok(vec![OutboundMessage::with_keyboard(
                self.user,
                "Cancelled.",
                keyboards::customer_main_keyboard(),
            )]);
        }

        if let Some(flow) = self.state.take_flow(self.user).await {
            match flow {
                Flow::Collecting(mut collector) => {
                    return match collector.advance(text) {
                        CollectorOutcome::Prompt(prompt) => {
                            self.state
                                .set_flow(self.user, Flow::Collecting(collector))
                                .await;
                            Ok(vec![OutboundMessage::text(self.user, prompt)])
                        }
                        CollectorOutcome::Invalid(message) => {
                            self.state
                                .set_flow(self.user, Flow::Collecting(collector))
                                .await;
                            Ok(vec![OutboundMessage::text(self.user, message)])
                        }
                        CollectorOutcome::Complete(profile) => {
                            let resume = collector.resume_action();
                            // The whole triple commits as one update; nothing
                            // was written while the form was in flight.
                            UserRepository::new(self.state.pool())
                                .update_profile(
                                    self.user,
                                    &ProfilePatch {
                                        full_name: Some(profile.full_name),
                                        address: Some(profile.address),
                                        phone: Some(profile.phone.into_inner()),
                                        ..ProfilePatch::default()
                                    },
                                )
                                .await?;
                            self.resume_after_collect(resume).await
                        }
                    };
                }
                other => {
                    // Keep a final-preview flow alive while the user pokes at
                    // the menu.
                    self.state.set_flow(self.user, other).await;
                }
            }
        }

        match text {
            "/start" => Ok(vec![OutboundMessage::with_keyboard(
                self.user,
                "Welcome! Browse our channel and tap a pack button to start an order.",
                keyboards::customer_main_keyboard(),
            )]),
            menu::CART => self.render_cart().await,
            menu::MY_ORDERS => self.my_orders().await,
            menu::MY_ADDRESS => self.my_address().await,
            menu::CONTACT => Ok(vec![OutboundMessage::text(
                self.user,
                self.state
                    .config()
                    .contact
                    .clone()
                    .unwrap_or_else(|| "Message the channel admin to reach us.".to_owned()),
            )]),
            menu::HELP => Ok(vec![OutboundMessage::text(self.user, HELP_TEXT)]),
            _ => Ok(vec![OutboundMessage::with_keyboard(
                self.user,
                "Use the menu below.",
                keyboards::customer_main_keyboard(),
            )]),
        }
    }

    async fn handle_callback(&self, data: &str) -> Result<Vec<OutboundMessage>> {
        let catalog = CatalogRepository::new(self.state.pool());
        let cart = CartRepository::new(self.state.pool());

        let Some(callback) = Callback::parse(data) else {
            tracing::warn!(data, "unparseable callback");
            return Ok(vec![OutboundMessage::text(self.user, "Unknown action.")]);
        };

        match callback {
            Callback::SelectPack { product, pack } => {
                match cart.add(self.user, product, pack, 1).await {
                    Ok(()) => Ok(vec![OutboundMessage::with_keyboard(
                        self.user,
                        "Added to cart ✅ (every tap adds one more pack)",
                        keyboards::view_cart_keyboard(),
                    )]),
                    Err(RepositoryError::NotFound) => Ok(vec![OutboundMessage::text(
                        self.user,
                        "This pack is no longer available.",
                    )]),
                    Err(e) => Err(e.into()),
                }
            }
            Callback::BackToPacks { product } => {
                let product = catalog
                    .product(product)
                    .await?
                    .ok_or(BotError::NotFound("Product"))?;
                let packs = catalog.packs(product.id).await?;
                Ok(vec![OutboundMessage::photo(
                    self.user,
                    product.photo.clone(),
                    format!("{}\n\n{}", product.name, product.description),
                    Some(keyboards::pack_selection_keyboard(product.id, &packs)),
                )])
            }
            Callback::ViewCart => self.render_cart().await,
            Callback::RemoveCartEntry(entry) => {
                cart.remove(entry).await?;
                self.render_cart().await
            }
            Callback::ClearCart => {
                cart.clear(self.user).await?;
                Ok(vec![OutboundMessage::with_keyboard(
                    self.user,
                    "Cart cleared.",
                    keyboards::customer_main_keyboard(),
                )])
            }
            Callback::FinalizeOrder => {
                let lines = cart.lines(self.user).await?;
                if lines.is_empty() {
                    return Ok(vec![OutboundMessage::text(self.user, "Your cart is empty.")]);
                }
                self.start_collector(ResumeAction::NewOrder).await
            }
            Callback::EditUserInfo => self.start_collector(ResumeAction::EditProfileMidOrder).await,
            Callback::EditAddress => self.start_collector(ResumeAction::EditProfile).await,
            Callback::ConfirmUserInfo => Ok(vec![OutboundMessage::with_keyboard(
                self.user,
                "Choose a shipping method:",
                keyboards::shipping_method_keyboard(),
            )]),
            Callback::Ship(shipping) => {
                self.state
                    .set_flow(self.user, Flow::FinalPreview { shipping })
                    .await;
                self.render_final_preview(shipping).await
            }
            Callback::FinalConfirm => self.submit_order().await,
            Callback::FinalEdit => match self.state.take_flow(self.user).await {
                Some(Flow::FinalPreview { shipping }) => {
                    self.start_collector(ResumeAction::EditInvoice { shipping }).await
                }
                other => {
                    if let Some(flow) = other {
                        self.state.set_flow(self.user, flow).await;
                    }
                    Ok(vec![OutboundMessage::text(
                        self.user,
                        "Please open your cart and finalize again.",
                    )])
                }
            },
            _ => Ok(vec![OutboundMessage::text(self.user, "Unknown action.")]),
        }
    }

    async fn handle_photo(&self, media: MediaRef) -> Result<Vec<OutboundMessage>> {
        let orders = OrderRepository::new(self.state.pool());

        let Some(order) = orders.latest_payable_for_user(self.user).await? else {
            return Ok(vec![OutboundMessage::text(
                self.user,
                "You have no order awaiting payment.",
            )]);
        };

        orders.attach_receipt(order.id, &media).await?;

        let customer = UserRepository::new(self.state.pool()).get(self.user).await?;
        let admin = self.state.config().admin_id;
        let order = orders.get(order.id).await?;

        Ok(vec![
            OutboundMessage::text(
                self.user,
                format!(
                    "Receipt for order #{} received ✅ We'll confirm your payment soon.",
                    order.id
                ),
            ),
            OutboundMessage::photo(
                admin,
                media,
                format!("💳 Receipt uploaded\n\n{}", admin_order_summary(&order, customer.as_ref())),
                Some(keyboards::payment_confirmation_keyboard(order.id)),
            ),
        ])
    }

    /// Install a fresh collector, discarding any in-flight flow, and prompt
    /// for the first field.
    async fn start_collector(&self, resume: ResumeAction) -> Result<Vec<OutboundMessage>> {
        self.state
            .set_flow(self.user, Flow::Collecting(ProfileCollector::new(resume)))
            .await;
        Ok(vec![OutboundMessage::with_keyboard(
            self.user,
            NAME_PROMPT,
            keyboards::cancel_keyboard(),
        )])
    }

    /// Continue wherever the completed collector came from.
    async fn resume_after_collect(&self, resume: ResumeAction) -> Result<Vec<OutboundMessage>> {
        match resume {
            ResumeAction::NewOrder | ResumeAction::EditProfileMidOrder => {
                let profile = self.profile().await?;
                Ok(vec![OutboundMessage::with_keyboard(
                    self.user,
                    format!(
                        "Please confirm your details:\n{}",
                        super::profile_block(&profile)
                    ),
                    keyboards::confirm_info_keyboard(),
                )])
            }
            ResumeAction::EditProfile => {
                let profile = self.profile().await?;
                Ok(vec![OutboundMessage::with_keyboard(
                    self.user,
                    format!("Saved ✅\n{}", super::profile_block(&profile)),
                    keyboards::customer_main_keyboard(),
                )])
            }
            ResumeAction::EditInvoice { shipping } => {
                self.state
                    .set_flow(self.user, Flow::FinalPreview { shipping })
                    .await;
                self.render_final_preview(shipping).await
            }
        }
    }

    /// Snapshot the cart into an order. The engine does not clear the cart;
    /// this is the caller that does, right after creation succeeds.
    async fn submit_order(&self) -> Result<Vec<OutboundMessage>> {
        let Some(Flow::FinalPreview { shipping }) = self.state.take_flow(self.user).await else {
            return Ok(vec![OutboundMessage::text(
                self.user,
                "Please open your cart and finalize again.",
            )]);
        };

        let cart = CartRepository::new(self.state.pool());
        let orders = OrderRepository::new(self.state.pool());

        let lines = cart.lines(self.user).await?;
        let order_id = orders.create(self.user, &lines).await?;
        orders.set_shipping_method(order_id, shipping).await?;
        cart.clear(self.user).await?;

        let order = orders.get(order_id).await?;
        let customer = UserRepository::new(self.state.pool()).get(self.user).await?;
        let admin = self.state.config().admin_id;

        Ok(vec![
            OutboundMessage::with_keyboard(
                self.user,
                format!(
                    "✅ Order #{order_id} submitted! Total: {}.\n\
                     We'll notify you as soon as it is reviewed.",
                    order.total_price
                ),
                keyboards::customer_main_keyboard(),
            ),
            OutboundMessage::with_keyboard(
                admin,
                format!("📋 New order\n\n{}", admin_order_summary(&order, customer.as_ref())),
                keyboards::order_confirmation_keyboard(order_id),
            ),
        ])
    }

    async fn render_cart(&self) -> Result<Vec<OutboundMessage>> {
        let lines = CartRepository::new(self.state.pool()).lines(self.user).await?;

        if lines.is_empty() {
            return Ok(vec![OutboundMessage::with_keyboard(
                self.user,
                "Your cart is empty.",
                keyboards::customer_main_keyboard(),
            )]);
        }

        Ok(vec![OutboundMessage::with_keyboard(
            self.user,
            format!("🛒 Your cart:\n{}", cart_text(&lines)),
            keyboards::cart_keyboard(&lines),
        )])
    }

    async fn render_final_preview(&self, shipping: ShippingMethod) -> Result<Vec<OutboundMessage>> {
        let lines = CartRepository::new(self.state.pool()).lines(self.user).await?;
        if lines.is_empty() {
            self.state.clear_flow(self.user).await;
            return Ok(vec![OutboundMessage::text(self.user, "Your cart is empty.")]);
        }

        let profile = self.profile().await?;
        Ok(vec![OutboundMessage::with_keyboard(
            self.user,
            format!(
                "🧾 Invoice preview\n{}\nShipping: {}\n\nRecipient: {}",
                cart_text(&lines),
                shipping.label(),
                super::profile_block(&profile)
            ),
            keyboards::final_confirmation_keyboard(),
        )])
    }

    async fn my_orders(&self) -> Result<Vec<OutboundMessage>> {
        let orders = OrderRepository::new(self.state.pool())
            .orders_for_user(self.user)
            .await?;

        if orders.is_empty() {
            return Ok(vec![OutboundMessage::text(self.user, "You have no orders yet.")]);
        }

        let listing = orders
            .iter()
            .map(|order| {
                format!(
                    "Order #{} ({}): {} - {}\n{}",
                    order.id,
                    order.created_at.format("%Y-%m-%d"),
                    order.total_price,
                    status_label(order.status),
                    format_line_items(order.items.items()),
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        Ok(vec![OutboundMessage::text(self.user, format!("📦 Your orders:\n\n{listing}"))])
    }

    async fn my_address(&self) -> Result<Vec<OutboundMessage>> {
        let profile = self.profile().await?;

        let text = if profile.address.is_some() {
            format!("📍 On file:\n{}", super::profile_block(&profile))
        } else {
            "No address on file yet.".to_owned()
        };

        Ok(vec![OutboundMessage::with_keyboard(
            self.user,
            text,
            keyboards::edit_address_keyboard(),
        )])
    }

    async fn profile(&self) -> Result<User> {
        UserRepository::new(self.state.pool())
            .get(self.user)
            .await?
            .ok_or(BotError::NotFound("User"))
    }
}

/// Cart listing with per-line subtotals and the grand total.
fn cart_text(lines: &[CartLine]) -> String {
    let total: Price = lines.iter().map(CartLine::subtotal).sum();
    let body = lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            format!(
                "{}. {} - {} ({} pcs) ×{} = {}",
                i + 1,
                line.product_name,
                line.pack_name,
                line.units_per_pack,
                line.quantity,
                line.subtotal()
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!("{body}\nTotal: {total}")
}
