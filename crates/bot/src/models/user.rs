//! User domain types.

use chrono::{DateTime, Utc};

use packshop_core::UserId;

/// A chat user and their shipping profile.
///
/// Created on first contact with only the transport-provided identity;
/// profile fields arrive later through the conversation collector and are
/// never reset to `None` once filled.
#[derive(Debug, Clone)]
pub struct User {
    /// Transport-assigned chat ID.
    pub id: UserId,
    /// Transport username, if any.
    pub username: Option<String>,
    /// Transport first name, if any.
    pub first_name: Option<String>,
    /// Full name as entered during checkout.
    pub full_name: Option<String>,
    /// Mobile phone number.
    pub phone: Option<String>,
    /// Landline phone number.
    pub landline_phone: Option<String>,
    /// Shipping address.
    pub address: Option<String>,
    /// Shop name (wholesale customers).
    pub shop_name: Option<String>,
    /// When the user first contacted the bot.
    pub created_at: DateTime<Utc>,
}

/// A partial profile update.
///
/// Only fields set to a non-empty value are written; everything else keeps
/// its stored value. Empty strings are treated as absent so a profile field
/// can never be blanked by accident.
#[derive(Debug, Clone, Default)]
pub struct ProfilePatch {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub landline_phone: Option<String>,
    pub address: Option<String>,
    pub shop_name: Option<String>,
}

impl ProfilePatch {
    /// Normalize a field for binding: empty or whitespace-only counts as
    /// absent.
    #[must_use]
    pub fn field(value: &Option<String>) -> Option<&str> {
        value.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_fields_count_as_absent() {
        assert_eq!(ProfilePatch::field(&None), None);
        assert_eq!(ProfilePatch::field(&Some(String::new())), None);
        assert_eq!(ProfilePatch::field(&Some("  ".to_owned())), None);
        assert_eq!(ProfilePatch::field(&Some(" Erfan ".to_owned())), Some("Erfan"));
    }
}
