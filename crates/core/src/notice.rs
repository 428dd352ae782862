//! User-facing notices derived from cart activity.
//!
//! The reducer itself stays silent; [`notice_for`] turns an action plus the
//! delta it produced into the message the UI shows, if any. Keeping this a
//! separate step means merges and remote loads can run without chattering at
//! the user.

use serde::{Deserialize, Serialize};

use crate::reducer::{CartAction, CartDelta, ClearSource};

/// Longest item name shown in a notice before clipping.
const MAX_NAME_LEN: usize = 18;

/// Severity of a [`Notice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

/// A short message surfaced to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    /// Severity, used by the UI to pick presentation.
    pub level: NoticeLevel,
    /// The message text.
    pub message: String,
}

impl Notice {
    /// A success notice.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    /// An informational notice.
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    /// An error notice.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// The notice a reduction should surface, if any.
///
/// - adding an item announces it by name,
/// - removing announces only when a unit actually came off,
/// - a user-initiated clear announces; order placement and sign-out clear
///   silently,
/// - replacing the list (merges, remote loads) is always silent.
#[must_use]
pub fn notice_for(action: &CartAction, delta: &CartDelta) -> Option<Notice> {
    match (action, delta) {
        (CartAction::AddItem { item }, CartDelta::Added { .. }) => {
            let name = clip_name(&item.name);
            Some(Notice::success(format!("'{name}' added to cart!")))
        }
        (
            CartAction::RemoveItem { name, .. },
            CartDelta::Decremented { .. } | CartDelta::Removed { .. },
        ) => {
            let name = clip_name(name);
            Some(Notice::info(format!("'{name}' removed from cart!")))
        }
        (
            CartAction::ClearCart { .. },
            CartDelta::Cleared {
                source: ClearSource::User,
            },
        ) => Some(Notice::info("Cart cleared!")),
        _ => None,
    }
}

/// Clip a product name for display in a notice.
#[must_use]
pub fn clip_name(name: &str) -> String {
    if name.chars().count() <= MAX_NAME_LEN {
        name.to_owned()
    } else {
        let kept: String = name.chars().take(MAX_NAME_LEN).collect();
        format!("{kept}...")
    }
}
