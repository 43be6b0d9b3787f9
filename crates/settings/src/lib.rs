//! # Draftsman Settings
//!
//! The editor's settings document: defaults, merging of partial updates,
//! persistence as a PHP array file, and synchronization with `.env`.
//!
//! ## Modules
//!
//! - [`document`]: the ordered four-section document and its defaults
//! - [`namespace`]: expanding short model names to fully-qualified classes
//! - [`merge`]: deep merge and normalization
//! - [`render`] / [`parse`]: the on-disk PHP array form
//! - [`env`]: `DRAFTSMAN_` variables in the `.env` file
//! - [`store`]: atomic writes and post-write hooks
//! - [`action`]: the read and update operations
//!
//! ## Example
//!
//! ```rust,ignore
//! use draftsman_settings::{AppPaths, SettingsManager, SettingsStore};
//!
//! let manager = SettingsManager::new(
//!     SettingsStore::new("storage/draftsman/config.php"),
//!     ".env",
//!     AppPaths::new("."),
//! );
//! let outcome = manager.update_config(&serde_json::json!({
//!     "presentation": {"User": {"icon": "user"}}
//! }))?;
//! ```

pub mod action;
pub mod document;
pub mod env;
pub mod merge;
pub mod namespace;
pub mod parse;
pub mod render;
pub mod store;

pub use action::{SettingsManager, UPDATE_SUCCESS_MESSAGE, UpdateOutcome};
pub use document::{SECTIONS, SettingsDocument};
pub use env::{EnvChanges, EnvFile, build_env_map, is_sensitive, quote_value, sync_env};
pub use merge::{ALLOWED_PRESENTATION_KEYS, deep_merge, merge_settings, models_namespace, normalize};
pub use namespace::{AppPaths, ModelNamespace};
pub use parse::parse;
pub use render::{FormatContext, render};
pub use store::{CommandHook, PostWriteHook, SettingsStore, write_atomic};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
