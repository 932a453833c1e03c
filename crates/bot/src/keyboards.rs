//! Keyboard rendering and the callback-data grammar.
//!
//! Keyboards are pure data ([`Keyboard`] values); the transport adapter
//! turns them into whatever the chat platform wants. Callback data is a
//! typed [`Callback`] that encodes to `action:arg:arg` strings and parses
//! back - the round trip is the wire contract between a button press and
//! the dispatcher.

use packshop_core::{CartEntryId, OrderId, PackId, ProductId, ShippingMethod};

use crate::models::{CartLine, LineItem, Pack};
use crate::transport::{InlineButton, Keyboard};

/// Fixed reply-menu labels. Pressing one arrives as plain message text.
pub mod menu {
    pub const ADD_PRODUCT: &str = "➕ Add product";
    pub const PRODUCT_LIST: &str = "📦 Product list";
    pub const NEW_ORDERS: &str = "📋 New orders";
    pub const PAYMENT_REVIEW: &str = "💳 Payment review";
    pub const STATISTICS: &str = "📊 Statistics";

    pub const CART: &str = "🛒 Cart";
    pub const MY_ORDERS: &str = "📦 My orders";
    pub const MY_ADDRESS: &str = "📍 My address";
    pub const CONTACT: &str = "📞 Contact us";
    pub const HELP: &str = "ℹ️ Help";

    pub const CANCEL: &str = "❌ Cancel";
}

/// Every button press the bot understands, in typed form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Callback {
    // Customer: browsing and cart
    SelectPack { product: ProductId, pack: PackId },
    BackToPacks { product: ProductId },
    ViewCart,
    RemoveCartEntry(CartEntryId),
    ClearCart,

    // Customer: checkout
    FinalizeOrder,
    ConfirmUserInfo,
    EditUserInfo,
    EditAddress,
    Ship(ShippingMethod),
    FinalConfirm,
    FinalEdit,

    // Admin: catalog management
    AddPack(ProductId),
    ViewPacks(ProductId),
    PublishProduct(ProductId),
    DeleteProduct(ProductId),
    DeletePack(PackId),

    // Admin: order review
    ConfirmOrder(OrderId),
    RejectOrder(OrderId),
    EditOrder(OrderId),
    RemoveItem { order: OrderId, index: usize },
    RejectFull(OrderId),
    BackToOrder(OrderId),
    ConfirmModified(OrderId),
    ConfirmPayment(OrderId),
    RejectPayment(OrderId),
}

impl Callback {
    /// Encode into the wire string carried as callback data.
    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            Self::SelectPack { product, pack } => format!("select_pack:{product}:{pack}"),
            Self::BackToPacks { product } => format!("back_to_packs:{product}"),
            Self::ViewCart => "view_cart".to_owned(),
            Self::RemoveCartEntry(entry) => format!("remove_cart:{entry}"),
            Self::ClearCart => "clear_cart".to_owned(),
            Self::FinalizeOrder => "finalize_order".to_owned(),
            Self::ConfirmUserInfo => "confirm_user_info".to_owned(),
            Self::EditUserInfo => "edit_user_info".to_owned(),
            Self::EditAddress => "edit_address".to_owned(),
            Self::Ship(method) => format!("ship_{method}"),
            Self::FinalConfirm => "final_confirm".to_owned(),
            Self::FinalEdit => "final_edit".to_owned(),
            Self::AddPack(product) => format!("add_pack:{product}"),
            Self::ViewPacks(product) => format!("view_packs:{product}"),
            Self::PublishProduct(product) => format!("send_to_channel:{product}"),
            Self::DeleteProduct(product) => format!("delete_product:{product}"),
            Self::DeletePack(pack) => format!("delete_pack:{pack}"),
            Self::ConfirmOrder(order) => format!("confirm_order:{order}"),
            Self::RejectOrder(order) => format!("reject_order:{order}"),
            Self::EditOrder(order) => format!("edit_order:{order}"),
            Self::RemoveItem { order, index } => format!("remove_item:{order}:{index}"),
            Self::RejectFull(order) => format!("reject_full:{order}"),
            Self::BackToOrder(order) => format!("back_to_order:{order}"),
            Self::ConfirmModified(order) => format!("confirm_modified:{order}"),
            Self::ConfirmPayment(order) => format!("confirm_payment:{order}"),
            Self::RejectPayment(order) => format!("reject_payment:{order}"),
        }
    }

    /// Parse a wire string back into a typed callback.
    ///
    /// Returns `None` for anything malformed - stale buttons from older
    /// deployments degrade into an "unknown action" reply, not a panic.
    #[must_use]
    pub fn parse(data: &str) -> Option<Self> {
        if let Some(method) = data.strip_prefix("ship_") {
            return method.parse().ok().map(Self::Ship);
        }

        let mut parts = data.split(':');
        let action = parts.next()?;
        let arg1 = parts.next();
        let arg2 = parts.next();
        if parts.next().is_some() {
            return None;
        }

        match (action, arg1, arg2) {
            ("view_cart", None, None) => Some(Self::ViewCart),
            ("clear_cart", None, None) => Some(Self::ClearCart),
            ("finalize_order", None, None) => Some(Self::FinalizeOrder),
            ("confirm_user_info", None, None) => Some(Self::ConfirmUserInfo),
            ("edit_user_info", None, None) => Some(Self::EditUserInfo),
            ("edit_address", None, None) => Some(Self::EditAddress),
            ("final_confirm", None, None) => Some(Self::FinalConfirm),
            ("final_edit", None, None) => Some(Self::FinalEdit),
            ("select_pack", Some(a), Some(b)) => Some(Self::SelectPack {
                product: a.parse().ok()?,
                pack: b.parse().ok()?,
            }),
            ("remove_item", Some(a), Some(b)) => Some(Self::RemoveItem {
                order: a.parse().ok()?,
                index: b.parse().ok()?,
            }),
            ("back_to_packs", Some(a), None) => Some(Self::BackToPacks {
                product: a.parse().ok()?,
            }),
            ("remove_cart", Some(a), None) => Some(Self::RemoveCartEntry(a.parse().ok()?)),
            ("add_pack", Some(a), None) => Some(Self::AddPack(a.parse().ok()?)),
            ("view_packs", Some(a), None) => Some(Self::ViewPacks(a.parse().ok()?)),
            ("send_to_channel", Some(a), None) => Some(Self::PublishProduct(a.parse().ok()?)),
            ("delete_product", Some(a), None) => Some(Self::DeleteProduct(a.parse().ok()?)),
            ("delete_pack", Some(a), None) => Some(Self::DeletePack(a.parse().ok()?)),
            ("confirm_order", Some(a), None) => Some(Self::ConfirmOrder(a.parse().ok()?)),
            ("reject_order", Some(a), None) => Some(Self::RejectOrder(a.parse().ok()?)),
            ("edit_order", Some(a), None) => Some(Self::EditOrder(a.parse().ok()?)),
            ("reject_full", Some(a), None) => Some(Self::RejectFull(a.parse().ok()?)),
            ("back_to_order", Some(a), None) => Some(Self::BackToOrder(a.parse().ok()?)),
            ("confirm_modified", Some(a), None) => Some(Self::ConfirmModified(a.parse().ok()?)),
            ("confirm_payment", Some(a), None) => Some(Self::ConfirmPayment(a.parse().ok()?)),
            ("reject_payment", Some(a), None) => Some(Self::RejectPayment(a.parse().ok()?)),
            _ => None,
        }
    }
}

fn button(label: impl Into<String>, callback: &Callback) -> InlineButton {
    InlineButton {
        label: label.into(),
        data: callback.encode(),
    }
}

/// Admin main menu.
#[must_use]
pub fn admin_main_keyboard() -> Keyboard {
    Keyboard::Reply(vec![
        vec![menu::ADD_PRODUCT.to_owned(), menu::PRODUCT_LIST.to_owned()],
        vec![menu::NEW_ORDERS.to_owned(), menu::PAYMENT_REVIEW.to_owned()],
        vec![menu::STATISTICS.to_owned()],
    ])
}

/// Customer main menu.
#[must_use]
pub fn customer_main_keyboard() -> Keyboard {
    Keyboard::Reply(vec![
        vec![menu::CART.to_owned(), menu::MY_ORDERS.to_owned()],
        vec![menu::MY_ADDRESS.to_owned()],
        vec![menu::CONTACT.to_owned(), menu::HELP.to_owned()],
    ])
}

/// Single cancel button shown during wizards and the collector.
#[must_use]
pub fn cancel_keyboard() -> Keyboard {
    Keyboard::Reply(vec![vec![menu::CANCEL.to_owned()]])
}

/// Pack-selection buttons under a product listing (channel or chat).
/// One tap adds one pack to the cart.
#[must_use]
pub fn pack_selection_keyboard(product: ProductId, packs: &[Pack]) -> Keyboard {
    Keyboard::Inline(
        packs
            .iter()
            .map(|pack| {
                vec![button(
                    format!("📦 {} - {}", pack.name, pack.price),
                    &Callback::SelectPack {
                        product,
                        pack: pack.id,
                    },
                )]
            })
            .collect(),
    )
}

/// Cart view: one removal button per line, then finalize and clear.
#[must_use]
pub fn cart_keyboard(lines: &[CartLine]) -> Keyboard {
    let mut rows: Vec<Vec<InlineButton>> = lines
        .iter()
        .map(|line| {
            vec![button(
                format!("🗑 Remove {} ({})", line.product_name, line.pack_name),
                &Callback::RemoveCartEntry(line.entry_id),
            )]
        })
        .collect();

    rows.push(vec![button("✅ Finalize order", &Callback::FinalizeOrder)]);
    rows.push(vec![button("🗑 Clear cart", &Callback::ClearCart)]);
    Keyboard::Inline(rows)
}

/// Shortcut button sent right after a pack lands in the cart.
#[must_use]
pub fn view_cart_keyboard() -> Keyboard {
    Keyboard::Inline(vec![vec![button("🛍 View cart", &Callback::ViewCart)]])
}

/// Admin review buttons under a freshly submitted order.
#[must_use]
pub fn order_confirmation_keyboard(order: OrderId) -> Keyboard {
    Keyboard::Inline(vec![
        vec![
            button("✅ Confirm", &Callback::ConfirmOrder(order)),
            button("❌ Reject", &Callback::RejectOrder(order)),
        ],
        vec![button("✏️ Edit items", &Callback::EditOrder(order))],
    ])
}

/// Per-item removal view for a pending order under review.
#[must_use]
pub fn order_items_removal_keyboard(order: OrderId, items: &[LineItem]) -> Keyboard {
    let mut rows: Vec<Vec<InlineButton>> = items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            vec![button(
                format!("❌ Remove: {} - {}", item.product, item.pack),
                &Callback::RemoveItem { order, index },
            )]
        })
        .collect();

    rows.push(vec![button(
        "✅ Confirm with changes",
        &Callback::ConfirmModified(order),
    )]);
    rows.push(vec![button("🗑 Reject entire order", &Callback::RejectFull(order))]);
    rows.push(vec![button("🔙 Back", &Callback::BackToOrder(order))]);
    Keyboard::Inline(rows)
}

/// Admin review buttons under an uploaded payment receipt.
#[must_use]
pub fn payment_confirmation_keyboard(order: OrderId) -> Keyboard {
    Keyboard::Inline(vec![vec![
        button("✅ Approve receipt", &Callback::ConfirmPayment(order)),
        button("❌ Reject receipt", &Callback::RejectPayment(order)),
    ]])
}

/// Management buttons under a product in the admin list.
#[must_use]
pub fn product_management_keyboard(product: ProductId) -> Keyboard {
    Keyboard::Inline(vec![
        vec![button("➕ Add pack", &Callback::AddPack(product))],
        vec![button("👁 View packs", &Callback::ViewPacks(product))],
        vec![button("📤 Publish to channel", &Callback::PublishProduct(product))],
        vec![button("🗑 Delete product", &Callback::DeleteProduct(product))],
    ])
}

/// Pack list with per-pack delete buttons.
#[must_use]
pub fn pack_management_keyboard(packs: &[Pack]) -> Keyboard {
    Keyboard::Inline(
        packs
            .iter()
            .map(|pack| vec![button(format!("🗑 Delete {}", pack.name), &Callback::DeletePack(pack.id))])
            .collect(),
    )
}

/// Shipping method selection during checkout.
#[must_use]
pub fn shipping_method_keyboard() -> Keyboard {
    Keyboard::Inline(
        ShippingMethod::ALL
            .iter()
            .map(|method| vec![button(method.label(), &Callback::Ship(*method))])
            .collect(),
    )
}

/// Final invoice preview: submit or go edit the details.
#[must_use]
pub fn final_confirmation_keyboard() -> Keyboard {
    Keyboard::Inline(vec![
        vec![button("✅ Confirm and submit", &Callback::FinalConfirm)],
        vec![button("✏️ Edit details", &Callback::FinalEdit)],
    ])
}

/// "Is this information correct?" prompt after the collector completes.
#[must_use]
pub fn confirm_info_keyboard() -> Keyboard {
    Keyboard::Inline(vec![
        vec![button("✅ Yes, it is correct", &Callback::ConfirmUserInfo)],
        vec![button("✏️ No, edit my details", &Callback::EditUserInfo)],
    ])
}

/// Edit button under the saved-address view.
#[must_use]
pub fn edit_address_keyboard() -> Keyboard {
    Keyboard::Inline(vec![vec![button("✏️ Edit address", &Callback::EditAddress)]])
}
