//! # Domain Types
//!
//! Validated identifiers shared by the subsystem clients.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`ResourceName`] | Name of an onboardable design-time resource |
//! | [`TopicName`] | Message router topic |
//!
//! Both validate at construction, so a value that exists is safe to embed
//! in a request path or body:
//!
//! ```rust
//! use ferronap_core::{ResourceName, ValidationError};
//!
//! let name = ResourceName::parse("  vFW vendor ").expect("valid");
//! assert_eq!(name.as_str(), "vFW vendor");
//! assert!(matches!(ResourceName::parse(""), Err(ValidationError::EmptyName)));
//! ```

mod name;
mod topic;

pub use name::ResourceName;
pub use topic::TopicName;
