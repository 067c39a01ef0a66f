//! # Ferronap Core
//!
//! Client library for the REST APIs of an ONAP platform: service design,
//! inventory, messaging and event collection.
//!
//! ## Overview
//!
//! - **Resource lifecycle driver** moving vendors, software products, VFs
//!   and services from creation to certification, idempotently and
//!   resumably
//! - **Inventory** cloud regions, complexes and their relationships
//! - **Messaging** topic listing, publishing and a background consumer
//! - **Event collection** VES event construction and submission
//! - **Transport** pluggable HTTP client with capped retry
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`aai`] | Inventory client (cloud regions, complexes, relationships) |
//! | [`api`] | Per-subsystem API client over the shared transport |
//! | [`config`] | Typed settings with defaults and JSON overrides |
//! | [`dmaap`] | Message router client and topic consumer |
//! | [`domain`] | Validated names |
//! | [`error`] | Error types |
//! | [`http_client`] | HTTP client abstraction |
//! | [`lifecycle`] | Status machine and lifecycle driver |
//! | [`onap`] | All clients behind one handle |
//! | [`retry`] | Backoff and retrying transport |
//! | [`sdc`] | Onboardable service design resources |
//! | [`ves`] | VES collector client |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ferronap_core::{Onap, ResourceName, Settings, Vendor};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let onap = Onap::connect(Settings::from_env()?)?;
//!
//!     let mut vendor = Vendor::new(onap.sdc().clone(), ResourceName::parse("vFW vendor")?);
//!     vendor.load().await?;
//!     vendor.onboard().await?;
//!     println!("{} is {}", vendor.name(), vendor.status());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Every operation returns [`OnapError`]; [`OnapError::kind`] classifies it:
//!
//! ```rust
//! use ferronap_core::{OnapError, OnapErrorKind};
//!
//! fn handle_error(error: &OnapError) {
//!     match error.kind() {
//!         OnapErrorKind::NotFound => {
//!             // Create it first
//!         }
//!         OnapErrorKind::Api if error.retryable() => {
//!             // Try again later
//!         }
//!         _ => {}
//!     }
//! }
//! ```
//!
//! Skipped lifecycle actions are not errors: they log a warning and return
//! [`StepOutcome::Skipped`].

pub mod aai;
pub mod api;
pub mod config;
pub mod dmaap;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod lifecycle;
pub mod onap;
pub mod retry;
pub mod sdc;
pub mod ves;

// Inventory
pub use aai::{AaiClient, CloudRegion, Complex, Relationship, RelationshipData};

// Transport
pub use api::ApiClient;
pub use http_client::{
    HttpAuth, HttpClient, HttpError, HttpErrorKind, HttpMethod, HttpRequest, HttpResponse,
    MultipartFile, NoopHttpClient, ReqwestHttpClient, ScriptedHttpClient,
};
pub use retry::{Backoff, RetryConfig, RetryingHttpClient};

// Settings
pub use config::{Settings, SettingsError, SETTINGS_ENV_VAR};

// Messaging
pub use dmaap::{ConsumerHandle, DmaapClient, FetchOptions, PublishReceipt, TopicConsumer};

// Domain types
pub use domain::{ResourceName, TopicName};

// Error types
pub use error::{OnapError, OnapErrorKind, ValidationError};

// Lifecycle
pub use lifecycle::{
    LifecycleAction, LifecycleStatus, Onboardable, RemoteSnapshot, RemoteState, ResourceKind,
    SkipReason, StepOutcome, Transition,
};

pub use onap::Onap;

// Service design
pub use sdc::{SdcClient, Service, Vendor, Vf, Vsp, VspPackage};

// Event collection
pub use ves::{VesClient, VesDomain, VesEvent, VesPriority};
