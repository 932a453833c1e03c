//! The outbound transport boundary.
//!
//! The chat transport itself (polling loop, API client, webhook) is an
//! external collaborator. The core only produces [`OutboundMessage`] values;
//! an adapter implementing [`ChatTransport`] is responsible for actually
//! delivering them. All state mutations commit before delivery is attempted,
//! so a failed send can be logged and dropped without corrupting anything.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use packshop_core::{MediaRef, UserId};

/// Errors an adapter can report for a single delivery.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The transport could not deliver the message.
    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// Where a message goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatTarget {
    /// A private chat with one user.
    User(UserId),
    /// The public broadcast channel, by transport handle (e.g. `@shop`).
    Channel(String),
}

/// What a message carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageBody {
    /// Plain text.
    Text(String),
    /// A photo by media handle with a caption.
    Photo {
        /// Transport-hosted photo handle.
        media: MediaRef,
        /// Caption shown under the photo.
        caption: String,
    },
}

/// One inline button: a label and the callback data sent back on press.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineButton {
    /// Visible button text.
    pub label: String,
    /// Opaque callback data returned by the transport when pressed.
    pub data: String,
}

/// A button layout attached to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Keyboard {
    /// Inline buttons under the message; presses come back as callbacks.
    Inline(Vec<Vec<InlineButton>>),
    /// A persistent reply keyboard; presses come back as plain text.
    Reply(Vec<Vec<String>>),
}

/// A fully-rendered outbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    /// Delivery target.
    pub target: ChatTarget,
    /// Message content.
    pub body: MessageBody,
    /// Optional button layout.
    pub keyboard: Option<Keyboard>,
}

impl OutboundMessage {
    /// A plain text message to a user.
    #[must_use]
    pub fn text(user: UserId, text: impl Into<String>) -> Self {
        Self {
            target: ChatTarget::User(user),
            body: MessageBody::Text(text.into()),
            keyboard: None,
        }
    }

    /// A text message to a user with a keyboard attached.
    #[must_use]
    pub fn with_keyboard(user: UserId, text: impl Into<String>, keyboard: Keyboard) -> Self {
        Self {
            target: ChatTarget::User(user),
            body: MessageBody::Text(text.into()),
            keyboard: Some(keyboard),
        }
    }

    /// A photo message to a user.
    #[must_use]
    pub fn photo(
        user: UserId,
        media: MediaRef,
        caption: impl Into<String>,
        keyboard: Option<Keyboard>,
    ) -> Self {
        Self {
            target: ChatTarget::User(user),
            body: MessageBody::Photo {
                media,
                caption: caption.into(),
            },
            keyboard,
        }
    }

    /// A photo message to the public channel.
    #[must_use]
    pub fn channel_photo(
        channel: impl Into<String>,
        media: MediaRef,
        caption: impl Into<String>,
        keyboard: Option<Keyboard>,
    ) -> Self {
        Self {
            target: ChatTarget::Channel(channel.into()),
            body: MessageBody::Photo {
                media,
                caption: caption.into(),
            },
            keyboard,
        }
    }
}

/// The narrow interface a transport adapter implements.
pub trait ChatTransport {
    /// Deliver one message.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if delivery fails; the caller logs and
    /// continues, it never retries.
    fn deliver(
        &self,
        message: &OutboundMessage,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;
}
