//! Transient status notices.
//!
//! Every operation outcome is turned into a short-lived notice for the
//! caller to display. Nothing here is fatal.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AmmError;

use super::config::AmmConfig;

/// Notice severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeStatus {
    /// Operation in flight.
    Pending,
    /// Operation succeeded.
    Success,
    /// Operation failed.
    Error,
}

/// A status message that dismisses itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusNotice {
    /// Severity.
    pub status: NoticeStatus,
    /// User-facing text.
    pub message: String,
    /// Auto-dismiss delay; `None` stays until replaced.
    pub dismiss_after: Option<Duration>,
}

impl StatusNotice {
    /// In-flight notice; stays until replaced.
    pub fn pending(message: impl Into<String>) -> Self {
        Self {
            status: NoticeStatus::Pending,
            message: message.into(),
            dismiss_after: None,
        }
    }

    /// Success notice.
    pub fn success(message: impl Into<String>, config: &AmmConfig) -> Self {
        Self {
            status: NoticeStatus::Success,
            message: message.into(),
            dismiss_after: Some(config.success_notice),
        }
    }

    /// Error notice.
    pub fn error(message: impl Into<String>, config: &AmmConfig) -> Self {
        Self {
            status: NoticeStatus::Error,
            message: message.into(),
            dismiss_after: Some(config.error_notice),
        }
    }

    /// Notice describing a failure.
    pub fn from_error(err: &AmmError, config: &AmmConfig) -> Self {
        let message = match err {
            AmmError::WalletNotConnected => "Please connect wallet first".to_string(),
            AmmError::UserDeclinedSignature => "Transaction rejected by user".to_string(),
            AmmError::StoreUnavailable(_) => "Failed to load data".to_string(),
            AmmError::CorruptSnapshot(_) => "Stored pool data is unreadable".to_string(),
            AmmError::SnapshotEncoding(_) => "Could not save pool data".to_string(),
            AmmError::SnapshotConflict { .. } => {
                "Pools changed in another session, refresh and retry".to_string()
            }
            AmmError::MalformedToken(_) => "Encrypted value is malformed".to_string(),
            AmmError::ValidationFailed(reason) => format!("Invalid pool: {}", reason),
            AmmError::SignatureMismatch(_) => "Signature does not match wallet".to_string(),
            AmmError::StaleChallenge | AmmError::ChallengeExpired => {
                "Decryption session expired, sign again".to_string()
            }
            AmmError::PoolNotFound(id) => format!("Pool #{} not found", id),
            AmmError::Wallet(reason) => format!("Submission failed: {}", reason),
        };
        Self::error(message, config)
    }

    /// Whether the notice goes away on its own.
    pub fn auto_dismisses(&self) -> bool {
        self.dismiss_after.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let config = AmmConfig::default();

        let notice = StatusNotice::from_error(&AmmError::WalletNotConnected, &config);
        assert_eq!(notice.status, NoticeStatus::Error);
        assert_eq!(notice.message, "Please connect wallet first");
        assert_eq!(notice.dismiss_after, Some(Duration::from_millis(3000)));

        let declined = StatusNotice::from_error(&AmmError::UserDeclinedSignature, &config);
        assert_eq!(declined.message, "Transaction rejected by user");
    }

    #[test]
    fn test_malformed_and_signature_messages_differ() {
        let config = AmmConfig::default();
        let malformed = StatusNotice::from_error(&AmmError::MalformedToken("x".into()), &config);
        let mismatch = StatusNotice::from_error(&AmmError::SignatureMismatch("x".into()), &config);
        assert_ne!(malformed.message, mismatch.message);
    }

    #[test]
    fn test_encode_failure_not_reported_as_corrupt_store() {
        let config = AmmConfig::default();
        let encode = StatusNotice::from_error(&AmmError::SnapshotEncoding("x".into()), &config);
        let corrupt = StatusNotice::from_error(&AmmError::CorruptSnapshot("x".into()), &config);
        assert_eq!(encode.message, "Could not save pool data");
        assert_ne!(encode.message, corrupt.message);
    }

    #[test]
    fn test_dismissal() {
        let config = AmmConfig::default();
        assert!(!StatusNotice::pending("Creating pool...").auto_dismisses());
        let ok = StatusNotice::success("Pool created successfully!", &config);
        assert_eq!(ok.dismiss_after, Some(Duration::from_millis(2000)));
    }
}
