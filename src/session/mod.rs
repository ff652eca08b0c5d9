//! Session Layer
//!
//! Sequences the core for one user session and turns outcomes into
//! status notices. Rendering stays with the caller.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  config.rs  - Client configuration (env overrides)          │
//! │  client.rs  - ConfidentialAmm facade                        │
//! │  notice.rs  - Auto-dismissing status notices                │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod client;
pub mod config;
pub mod notice;

pub use client::ConfidentialAmm;
pub use config::{AmmConfig, DEFAULT_VALIDITY_DAYS};
pub use notice::{NoticeStatus, StatusNotice};
