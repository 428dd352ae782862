//! Sync status for the cart's remote reconciliation.

use serde::{Deserialize, Serialize};

/// Where the cart stands relative to its server-side copy.
///
/// This is deliberately a tri-state rather than a success flag: the sticky
/// [`Error`](Self::Error) state carries a behavioral rule. Sign-out cleanup
/// is skipped while it is set, so an unreliable sync never discards a cart
/// the server may not have seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// Local and remote carts agreed as of the last completed exchange.
    #[default]
    Synced,
    /// A local change has not yet been confirmed by the remote store.
    Pending,
    /// The sign-in fetch failed; cleanup on sign-out is suppressed until a
    /// later sync succeeds.
    Error,
}

impl SyncStatus {
    /// Whether the sticky error state is set.
    #[must_use]
    pub const fn is_error(self) -> bool {
        matches!(self, Self::Error)
    }
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Synced => write!(f, "synced"),
            Self::Pending => write!(f, "pending"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for SyncStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "synced" => Ok(Self::Synced),
            "pending" => Ok(Self::Pending),
            "error" => Ok(Self::Error),
            _ => Err(format!("invalid sync status: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_synced() {
        assert_eq!(SyncStatus::default(), SyncStatus::Synced);
    }

    #[test]
    fn test_display_from_str_roundtrip() {
        for status in [SyncStatus::Synced, SyncStatus::Pending, SyncStatus::Error] {
            let parsed: SyncStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        assert!("failed".parse::<SyncStatus>().is_err());
    }

    #[test]
    fn test_only_error_is_error() {
        assert!(SyncStatus::Error.is_error());
        assert!(!SyncStatus::Synced.is_error());
        assert!(!SyncStatus::Pending.is_error());
    }
}
