//! The administrator's session: catalog management, order review, payment
//! review, and statistics.

use packshop_core::{MediaRef, OrderStatus, Price, ProductId};

use crate::db::{CatalogRepository, OrderRepository, StatsRepository, UserRepository};
use crate::error::{BotError, Result};
use crate::keyboards::{self, Callback, menu};
use crate::sessions::{Flow, Update, UpdatePayload, admin_order_summary, format_line_items};
use crate::state::AppState;
use crate::transport::OutboundMessage;

const PRODUCT_NAME_PROMPT: &str = "Product name?";
const PRODUCT_NAME_REPROMPT: &str = "Name cannot be empty. Product name?";
const PRODUCT_DESC_PROMPT: &str = "Product description?";
const PRODUCT_DESC_REPROMPT: &str = "Description cannot be empty. Product description?";
const PRODUCT_PHOTO_PROMPT: &str = "Now send the product photo.";

const PACK_NAME_PROMPT: &str = "Pack name? (e.g. \"Box of 10\")";
const PACK_NAME_REPROMPT: &str = "Name cannot be empty. Pack name?";
const PACK_QUANTITY_PROMPT: &str = "Units per pack?";
const PACK_PRICE_PROMPT: &str = "Pack price?";

/// A completed add-product wizard.
#[derive(Debug, Clone)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub photo: MediaRef,
}

/// Result of feeding one input into an admin wizard.
pub enum WizardOutcome<T> {
    /// Input accepted; ask for the next field.
    Prompt(&'static str),
    /// Input rejected; re-ask the same field.
    Invalid(String),
    /// Wizard finished.
    Complete(T),
}

enum ProductStep {
    Name,
    Description { name: String },
    Photo { name: String, description: String },
}

/// Add-product wizard: name, then description, then a photo.
pub struct ProductWizard {
    step: ProductStep,
}

impl ProductWizard {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            step: ProductStep::Name,
        }
    }

    /// Feed a text message into the wizard.
    pub fn text(&mut self, input: &str) -> WizardOutcome<ProductDraft> {
        let input = input.trim();
        match std::mem::replace(&mut self.step, ProductStep::Name) {
            ProductStep::Name => {
                if input.is_empty() {
                    return WizardOutcome::Invalid(PRODUCT_NAME_REPROMPT.to_owned());
                }
                self.step = ProductStep::Description {
                    name: input.to_owned(),
                };
                WizardOutcome::Prompt(PRODUCT_DESC_PROMPT)
            }
            ProductStep::Description { name } => {
                if input.is_empty() {
                    self.step = ProductStep::Description { name };
                    return WizardOutcome::Invalid(PRODUCT_DESC_REPROMPT.to_owned());
                }
                self.step = ProductStep::Photo {
                    name,
                    description: input.to_owned(),
                };
                WizardOutcome::Prompt(PRODUCT_PHOTO_PROMPT)
            }
            step @ ProductStep::Photo { .. } => {
                self.step = step;
                WizardOutcome::Invalid(PRODUCT_PHOTO_PROMPT.to_owned())
            }
        }
    }

    /// Feed a photo into the wizard.
    pub fn photo(&mut self, photo: MediaRef) -> WizardOutcome<ProductDraft> {
        match std::mem::replace(&mut self.step, ProductStep::Name) {
            ProductStep::Photo { name, description } => WizardOutcome::Complete(ProductDraft {
                name,
                description,
                photo,
            }),
            step => {
                self.step = step;
                WizardOutcome::Invalid("Finish the current step first.".to_owned())
            }
        }
    }
}

impl Default for ProductWizard {
    fn default() -> Self {
        Self::new()
    }
}

/// A completed add-pack wizard.
#[derive(Debug, Clone)]
pub struct PackDraft {
    pub product: ProductId,
    pub name: String,
    pub quantity: i64,
    pub price: Price,
}

enum PackStep {
    Name,
    Quantity { name: String },
    Price { name: String, quantity: i64 },
}

/// Add-pack wizard: name, then units per pack, then price.
pub struct PackWizard {
    product: ProductId,
    step: PackStep,
}

impl PackWizard {
    #[must_use]
    pub const fn new(product: ProductId) -> Self {
        Self {
            product,
            step: PackStep::Name,
        }
    }

    /// Feed a text message into the wizard.
    pub fn text(&mut self, input: &str) -> WizardOutcome<PackDraft> {
        let input = input.trim();
        match std::mem::replace(&mut self.step, PackStep::Name) {
            PackStep::Name => {
                if input.is_empty() {
                    return WizardOutcome::Invalid(PACK_NAME_REPROMPT.to_owned());
                }
                self.step = PackStep::Quantity {
                    name: input.to_owned(),
                };
                WizardOutcome::Prompt(PACK_QUANTITY_PROMPT)
            }
            PackStep::Quantity { name } => match parse_amount(input) {
                Some(quantity) if quantity > 0 => {
                    self.step = PackStep::Price { name, quantity };
                    WizardOutcome::Prompt(PACK_PRICE_PROMPT)
                }
                _ => {
                    self.step = PackStep::Quantity { name };
                    WizardOutcome::Invalid(format!(
                        "Quantity must be a positive whole number. {PACK_QUANTITY_PROMPT}"
                    ))
                }
            },
            PackStep::Price { name, quantity } => match parse_amount(input) {
                Some(price) if price >= 0 => WizardOutcome::Complete(PackDraft {
                    product: self.product,
                    name,
                    quantity,
                    price: Price::new(price),
                }),
                _ => {
                    self.step = PackStep::Price { name, quantity };
                    WizardOutcome::Invalid(format!(
                        "Price must be a non-negative whole number. {PACK_PRICE_PROMPT}"
                    ))
                }
            },
        }
    }
}

/// Parse a number the way people type prices: separators tolerated.
fn parse_amount(input: &str) -> Option<i64> {
    let cleaned: String = input.chars().filter(|c| !matches!(c, ',' | ' ' | '_')).collect();
    cleaned.parse().ok()
}

/// The administrator's capability object.
pub struct AdminSession<'a> {
    state: &'a AppState,
}

impl<'a> AdminSession<'a> {
    /// Create a session for the configured administrator.
    #[must_use]
    pub const fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    /// Handle one admin update.
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
        let admin = self.state.config().admin_id;

        if text == menu::CANCEL {
            self.state.clear_flow(admin).await;
            return Ok(vec![OutboundMessage::with_keyboard(
                admin,
                "Cancelled.",
                keyboards::admin_main_keyboard(),
            )]);
        }

        match self.state.take_flow(admin).await {
            Some(Flow::AddProduct(mut wizard)) => {
                let outcome = wizard.text(text);
                return Ok(match outcome {
                    WizardOutcome::Prompt(prompt) => {
                        self.state.set_flow(admin, Flow::AddProduct(wizard)).await;
                        vec![OutboundMessage::text(admin, prompt)]
                    }
                    WizardOutcome::Invalid(message) => {
                        self.state.set_flow(admin, Flow::AddProduct(wizard)).await;
                        vec![OutboundMessage::text(admin, message)]
                    }
                    // The product wizard cannot complete on text input.
                    WizardOutcome::Complete(_) => vec![],
                });
            }
            Some(Flow::AddPack(mut wizard)) => {
                return match wizard.text(text) {
                    WizardOutcome::Prompt(prompt) => {
                        self.state.set_flow(admin, Flow::AddPack(wizard)).await;
                        Ok(vec![OutboundMessage::text(admin, prompt)])
                    }
                    WizardOutcome::Invalid(message) => {
                        self.state.set_flow(admin, Flow::AddPack(wizard)).await;
                        Ok(vec![OutboundMessage::text(admin, message)])
                    }
                    WizardOutcome::Complete(draft) => {
                        CatalogRepository::new(self.state.pool())
                            .add_pack(draft.product, &draft.name, draft.quantity, draft.price)
                            .await?;
                        Ok(vec![OutboundMessage::with_keyboard(
                            admin,
                            format!(
                                "Pack \"{}\" added: {} pcs at {} ✅",
                                draft.name, draft.quantity, draft.price
                            ),
                            keyboards::admin_main_keyboard(),
                        )])
                    }
                };
            }
            // A stale customer-style flow has no meaning for the admin.
            Some(_) | None => {}
        }

        match text {
            "/start" => Ok(vec![OutboundMessage::with_keyboard(
                admin,
                "Admin panel ready.",
                keyboards::admin_main_keyboard(),
            )]),
            menu::ADD_PRODUCT => {
                self.state
                    .set_flow(admin, Flow::AddProduct(ProductWizard::new()))
                    .await;
                Ok(vec![OutboundMessage::with_keyboard(
                    admin,
                    PRODUCT_NAME_PROMPT,
                    keyboards::cancel_keyboard(),
                )])
            }
            menu::PRODUCT_LIST => self.list_products().await,
            menu::NEW_ORDERS => self.list_pending_orders().await,
            menu::PAYMENT_REVIEW => self.list_payment_receipts().await,
            menu::STATISTICS => self.show_statistics().await,
            _ => Ok(vec![OutboundMessage::with_keyboard(
                admin,
                "Choose an action:",
                keyboards::admin_main_keyboard(),
            )]),
        }
    }

    async fn handle_callback(&self, data: &str) -> Result<Vec<OutboundMessage>> {
        let admin = self.state.config().admin_id;
        let catalog = CatalogRepository::new(self.state.pool());
        let orders = OrderRepository::new(self.state.pool());

        let Some(callback) = Callback::parse(data) else {
            tracing::warn!(data, "unparseable callback");
            return Ok(vec![OutboundMessage::text(admin, "Unknown action.")]);
        };

        match callback {
            Callback::AddPack(product_id) => {
                let product = catalog
                    .product(product_id)
                    .await?
                    .ok_or(BotError::NotFound("Product"))?;
                self.state
                    .set_flow(admin, Flow::AddPack(PackWizard::new(product.id)))
                    .await;
                Ok(vec![OutboundMessage::with_keyboard(
                    admin,
                    format!("Adding a pack to \"{}\". {PACK_NAME_PROMPT}", product.name),
                    keyboards::cancel_keyboard(),
                )])
            }
            Callback::ViewPacks(product_id) => {
                let product = catalog
                    .product(product_id)
                    .await?
                    .ok_or(BotError::NotFound("Product"))?;
                let packs = catalog.packs(product_id).await?;
                if packs.is_empty() {
                    return Ok(vec![OutboundMessage::text(
                        admin,
                        format!("No packs yet for \"{}\".", product.name),
                    )]);
                }
                let listing = packs
                    .iter()
                    .map(|p| format!("• {} - {} pcs at {}", p.name, p.quantity, p.price))
                    .collect::<Vec<_>>()
                    .join("\n");
                Ok(vec![OutboundMessage::with_keyboard(
                    admin,
                    format!("Packs of \"{}\":\n{listing}", product.name),
                    keyboards::pack_management_keyboard(&packs),
                )])
            }
            Callback::PublishProduct(product_id) => {
                let Some(channel) = self.state.config().channel.clone() else {
                    return Ok(vec![OutboundMessage::text(
                        admin,
                        "No broadcast channel is configured.",
                    )]);
                };
                let product = catalog
                    .product(product_id)
                    .await?
                    .ok_or(BotError::NotFound("Product"))?;
                let packs = catalog.packs(product_id).await?;
                if packs.is_empty() {
                    return Ok(vec![OutboundMessage::text(
                        admin,
                        "Add at least one pack before publishing.",
                    )]);
                }
                Ok(vec![
                    OutboundMessage::channel_photo(
                        channel,
                        product.photo.clone(),
                        format!("{}\n\n{}", product.name, product.description),
                        Some(keyboards::pack_selection_keyboard(product.id, &packs)),
                    ),
                    OutboundMessage::text(admin, "Published to the channel ✅"),
                ])
            }
            Callback::DeleteProduct(product_id) => {
                catalog.delete_product(product_id).await?;
                Ok(vec![OutboundMessage::text(admin, "Product deleted.")])
            }
            Callback::DeletePack(pack_id) => {
                catalog.delete_pack(pack_id).await?;
                Ok(vec![OutboundMessage::text(admin, "Pack deleted.")])
            }
            Callback::ConfirmOrder(order_id) => {
                orders.confirm(order_id).await?;
                let order = orders.get(order_id).await?;
                Ok(vec![
                    OutboundMessage::text(admin, format!("Order #{order_id} approved ✅")),
                    OutboundMessage::text(
                        order.user_id,
                        format!(
                            "Your order #{order_id} was approved! Total: {}.\n\
                             Please pay and upload a photo of your receipt here.",
                            order.total_price
                        ),
                    ),
                ])
            }
            Callback::RejectOrder(order_id) | Callback::RejectFull(order_id) => {
                orders.reject(order_id).await?;
                let order = orders.get(order_id).await?;
                Ok(vec![
                    OutboundMessage::text(admin, format!("Order #{order_id} rejected.")),
                    OutboundMessage::text(
                        order.user_id,
                        format!("Unfortunately your order #{order_id} was rejected."),
                    ),
                ])
            }
            Callback::EditOrder(order_id) | Callback::BackToOrder(order_id) => {
                let order = orders.get(order_id).await?;
                let customer = UserRepository::new(self.state.pool())
                    .get(order.user_id)
                    .await?;
                let keyboard = if matches!(callback, Callback::EditOrder(_)) {
                    keyboards::order_items_removal_keyboard(order.id, order.items.items())
                } else {
                    keyboards::order_confirmation_keyboard(order.id)
                };
                Ok(vec![OutboundMessage::with_keyboard(
                    admin,
                    admin_order_summary(&order, customer.as_ref()),
                    keyboard,
                )])
            }
            Callback::RemoveItem { order: order_id, index } => {
                let order = orders.remove_line_item(order_id, index).await?;
                if order.status == OrderStatus::Rejected {
                    return Ok(vec![
                        OutboundMessage::text(
                            admin,
                            format!("Last item removed; order #{order_id} is now rejected."),
                        ),
                        OutboundMessage::text(
                            order.user_id,
                            format!("Unfortunately your order #{order_id} was rejected."),
                        ),
                    ]);
                }
                Ok(vec![OutboundMessage::with_keyboard(
                    admin,
                    admin_order_summary(&order, None),
                    keyboards::order_items_removal_keyboard(order.id, order.items.items()),
                )])
            }
            Callback::ConfirmModified(order_id) => {
                orders.confirm_modified(order_id).await?;
                let order = orders.get(order_id).await?;
                Ok(vec![
                    OutboundMessage::text(
                        admin,
                        format!("Order #{order_id} approved with changes ✅"),
                    ),
                    OutboundMessage::text(
                        order.user_id,
                        format!(
                            "Your order #{order_id} was approved with changes:\n{}\n\
                             New total: {}.\nPlease pay and upload a photo of your receipt here.",
                            format_line_items(order.items.items()),
                            order.total_price
                        ),
                    ),
                ])
            }
            Callback::ConfirmPayment(order_id) => {
                orders.confirm_payment(order_id).await?;
                let order = orders.get(order_id).await?;
                Ok(vec![
                    OutboundMessage::text(admin, format!("Payment for order #{order_id} approved ✅")),
                    OutboundMessage::text(
                        order.user_id,
                        format!("Payment received! 🎉 Your order #{order_id} is on its way."),
                    ),
                ])
            }
            Callback::RejectPayment(order_id) => {
                orders.reject_payment(order_id).await?;
                let order = orders.get(order_id).await?;
                Ok(vec![
                    OutboundMessage::text(admin, format!("Receipt for order #{order_id} rejected.")),
                    OutboundMessage::text(
                        order.user_id,
                        format!(
                            "The receipt for order #{order_id} was not accepted. \
                             Please pay and upload a new receipt."
                        ),
                    ),
                ])
            }
            _ => Ok(vec![OutboundMessage::text(admin, "Unknown action.")]),
        }
    }

    async fn handle_photo(&self, media: MediaRef) -> Result<Vec<OutboundMessage>> {
        let admin = self.state.config().admin_id;

        match self.state.take_flow(admin).await {
            Some(Flow::AddProduct(mut wizard)) => match wizard.photo(media) {
                WizardOutcome::Complete(draft) => {
                    let catalog = CatalogRepository::new(self.state.pool());
                    let id = catalog
                        .create_product(&draft.name, &draft.description, &draft.photo)
                        .await?;
                    Ok(vec![OutboundMessage::photo(
                        admin,
                        draft.photo,
                        format!("\"{}\" created ✅\n\n{}", draft.name, draft.description),
                        Some(keyboards::product_management_keyboard(id)),
                    )])
                }
                WizardOutcome::Invalid(message) => {
                    self.state.set_flow(admin, Flow::AddProduct(wizard)).await;
                    Ok(vec![OutboundMessage::text(admin, message)])
                }
                WizardOutcome::Prompt(prompt) => {
                    self.state.set_flow(admin, Flow::AddProduct(wizard)).await;
                    Ok(vec![OutboundMessage::text(admin, prompt)])
                }
            },
            Some(other) => {
                self.state.set_flow(admin, other).await;
                Ok(vec![OutboundMessage::text(admin, "Not expecting a photo right now.")])
            }
            None => Ok(vec![OutboundMessage::text(
                admin,
                "Not expecting a photo right now.",
            )]),
        }
    }

    async fn list_products(&self) -> Result<Vec<OutboundMessage>> {
        let admin = self.state.config().admin_id;
        let products = CatalogRepository::new(self.state.pool()).products().await?;

        if products.is_empty() {
            return Ok(vec![OutboundMessage::text(admin, "No products yet.")]);
        }

        Ok(products
            .into_iter()
            .map(|product| {
                OutboundMessage::photo(
                    admin,
                    product.photo.clone(),
                    format!("{}\n\n{}", product.name, product.description),
                    Some(keyboards::product_management_keyboard(product.id)),
                )
            })
            .collect())
    }

    async fn list_pending_orders(&self) -> Result<Vec<OutboundMessage>> {
        let admin = self.state.config().admin_id;
        let orders = OrderRepository::new(self.state.pool()).pending().await?;

        if orders.is_empty() {
            return Ok(vec![OutboundMessage::text(admin, "No new orders.")]);
        }

        let users = UserRepository::new(self.state.pool());
        let mut messages = Vec::with_capacity(orders.len());
        for order in orders {
            let customer = users.get(order.user_id).await?;
            messages.push(OutboundMessage::with_keyboard(
                admin,
                admin_order_summary(&order, customer.as_ref()),
                keyboards::order_confirmation_keyboard(order.id),
            ));
        }
        Ok(messages)
    }

    async fn list_payment_receipts(&self) -> Result<Vec<OutboundMessage>> {
        let admin = self.state.config().admin_id;
        let orders = OrderRepository::new(self.state.pool()).receipt_review().await?;

        if orders.is_empty() {
            return Ok(vec![OutboundMessage::text(admin, "No receipts to review.")]);
        }

        let users = UserRepository::new(self.state.pool());
        let mut messages = Vec::with_capacity(orders.len());
        for order in orders {
            let customer = users.get(order.user_id).await?;
            let caption = admin_order_summary(&order, customer.as_ref());
            let keyboard = keyboards::payment_confirmation_keyboard(order.id);
            messages.push(match order.receipt_photo.clone() {
                Some(receipt) => OutboundMessage::photo(admin, receipt, caption, Some(keyboard)),
                // receipt_sent without a photo would be corrupt data; still
                // show the order so the admin can act on it.
                None => OutboundMessage::with_keyboard(admin, caption, keyboard),
            });
        }
        Ok(messages)
    }

    async fn show_statistics(&self) -> Result<Vec<OutboundMessage>> {
        let admin = self.state.config().admin_id;
        let stats = StatsRepository::new(self.state.pool()).gather().await?;

        Ok(vec![OutboundMessage::text(
            admin,
            format!(
                "📊 Shop statistics\n\
                 Orders: {} total, {} today, {} pending\n\
                 Income: {} total, {} today\n\
                 Users: {}\n\
                 Products: {}",
                stats.total_orders,
                stats.today_orders,
                stats.pending_orders,
                stats.total_income,
                stats.today_income,
                stats.total_users,
                stats.total_products,
            ),
        )])
    }
}
