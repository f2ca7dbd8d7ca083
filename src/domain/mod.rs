//! Domain models and types for Strata.
//!
//! This module contains the core domain models shared by the processing
//! pipeline and the persistence layer:
//!
//! - **Documents** ([`RawResource`], [`ResourceType`]) - input resources as
//!   received, tagged with the expected resource type
//! - **Flat records** ([`ProcessedRecord`], [`FieldValue`]) - the mapping
//!   phase's scalar-only output
//! - **Warnings** ([`ValidationWarning`], [`WarningReason`]) - observational
//!   validation findings counted against the quality gate
//! - **Errors** ([`StrataError`], [`StoreError`]) and the [`Result`] alias
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, StrataError>`]:
//!
//! ```rust
//! use strata::domain::{Result, StrataError};
//!
//! fn example() -> Result<()> {
//!     let config = strata::config::load_config("strata.toml")?;
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod record;
pub mod resource;
pub mod result;
pub mod warning;

// Re-export commonly used types for convenience
pub use errors::{StoreError, StrataError};
pub use record::{FieldValue, ProcessedRecord};
pub use resource::{RawResource, ResourceType};
pub use result::Result;
pub use warning::{ValidationWarning, WarningReason};
