//! Order status and shipping method enums.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a stored status or shipping string is unrecognized.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unrecognized {kind} value: {value}")]
pub struct StatusParseError {
    /// Which enum failed to parse ("order status" or "shipping method").
    pub kind: &'static str,
    /// The offending input.
    pub value: String,
}

/// Lifecycle state of an order.
///
/// ```text
/// pending ──confirm──▶ waiting_payment ──receipt──▶ receipt_sent ──approve──▶ confirmed
///    │                        ▲                          │
///    └──reject──▶ rejected    └──────payment rejected────┘
/// ```
///
/// `confirmed` and `rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Created from a cart snapshot, awaiting admin triage.
    #[default]
    Pending,
    /// Contents approved; customer must pay and upload a receipt.
    WaitingPayment,
    /// Customer uploaded a payment receipt, awaiting admin review.
    ReceiptSent,
    /// Payment approved; order fulfilled. Terminal.
    Confirmed,
    /// Order or payment rejected outright. Terminal.
    Rejected,
}

impl OrderStatus {
    /// The stored string form of this status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::WaitingPayment => "waiting_payment",
            Self::ReceiptSent => "receipt_sent",
            Self::Confirmed => "confirmed",
            Self::Rejected => "rejected",
        }
    }

    /// Whether no further transition is possible from this status.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Rejected)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "waiting_payment" => Ok(Self::WaitingPayment),
            "receipt_sent" => Ok(Self::ReceiptSent),
            "confirmed" => Ok(Self::Confirmed),
            "rejected" => Ok(Self::Rejected),
            _ => Err(StatusParseError {
                kind: "order status",
                value: s.to_owned(),
            }),
        }
    }
}

/// How a confirmed order leaves the shop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShippingMethod {
    /// Intercity bus terminal pickup.
    Terminal,
    /// Freight / cargo company.
    Cargo,
    /// Express parcel service.
    Express,
    /// Bicycle/motorbike courier.
    Courier,
}

impl ShippingMethod {
    /// All selectable methods, in menu order.
    pub const ALL: [Self; 4] = [Self::Terminal, Self::Cargo, Self::Express, Self::Courier];

    /// The stored string form of this method.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Terminal => "terminal",
            Self::Cargo => "cargo",
            Self::Express => "express",
            Self::Courier => "courier",
        }
    }

    /// Human-readable button label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Terminal => "🚌 Terminal",
            Self::Cargo => "🚚 Cargo",
            Self::Express => "📦 Express",
            Self::Courier => "🏃 Courier",
        }
    }
}

impl fmt::Display for ShippingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShippingMethod {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "terminal" => Ok(Self::Terminal),
            "cargo" => Ok(Self::Cargo),
            "express" => Ok(Self::Express),
            "courier" => Ok(Self::Courier),
            _ => Err(StatusParseError {
                kind: "shipping method",
                value: s.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_str() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::WaitingPayment,
            OrderStatus::ReceiptSent,
            OrderStatus::Confirmed,
            OrderStatus::Rejected,
        ] {
            assert_eq!(status.as_str().parse::<OrderStatus>(), Ok(status));
        }
        assert!("shipped".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn terminal_states() {
        assert!(OrderStatus::Confirmed.is_terminal());
        assert!(OrderStatus::Rejected.is_terminal());
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(!OrderStatus::WaitingPayment.is_terminal());
        assert!(!OrderStatus::ReceiptSent.is_terminal());
    }

    #[test]
    fn shipping_round_trips_through_str() {
        for method in ShippingMethod::ALL {
            assert_eq!(method.as_str().parse::<ShippingMethod>(), Ok(method));
        }
        assert!("pigeon".parse::<ShippingMethod>().is_err());
    }
}
