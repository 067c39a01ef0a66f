//! # Service Design (SDC)
//!
//! Onboardable design-time resources and the client they share.
//!
//! | Type | API | Path |
//! |------|-----|------|
//! | [`Vendor`] | onboarding | create, submit |
//! | [`Vsp`] | onboarding | create, upload_package, validate, commit, submit |
//! | [`Vf`] | catalog | create, certify |
//! | [`Service`] | catalog | create, certify |
//!
//! ```rust,ignore
//! let sdc = SdcClient::new(http, &settings);
//! let mut vendor = Vendor::new(sdc.clone(), ResourceName::parse("vFW vendor")?);
//! vendor.load().await?;
//! vendor.onboard().await?;
//!
//! let mut vsp = Vsp::new(sdc.clone(), ResourceName::parse("vFW vsp")?)
//!     .with_vendor(&vendor)
//!     .with_package(VspPackage::new("vfw.zip", bytes));
//! vsp.onboard().await?;
//! ```

mod catalog;
mod service;
mod vendor;
mod vf;
mod vsp;

use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;

use crate::api::ApiClient;
use crate::config::Settings;
use crate::domain::ResourceName;
use crate::error::OnapError;
use crate::http_client::{HttpAuth, HttpClient, HttpMethod};

pub use service::Service;
pub use vendor::Vendor;
pub use vf::Vf;
pub use vsp::{Vsp, VspPackage};

pub const ONBOARDING_API_PATH: &str = "/sdc1/feProxy/onboarding-api/v1.0";
pub const CATALOG_API_PATH: &str = "/sdc2/rest/v1/catalog";

/// Onboarding and catalog API clients with the SDC header set.
#[derive(Debug, Clone)]
pub struct SdcClient {
    onboarding: ApiClient,
    catalog: ApiClient,
    user_id: String,
}

impl SdcClient {
    pub fn new(http: Arc<dyn HttpClient>, settings: &Settings) -> Self {
        let auth = HttpAuth::basic(&settings.sdc_username, &settings.sdc_password);
        let build = |base: &str, path: &str| {
            ApiClient::new(http.clone(), format!("{}{}", base.trim_end_matches('/'), path))
                .with_auth(auth.clone())
                .with_header("USER_ID", settings.sdc_user_id.as_str())
                .with_header("X-ECOMP-InstanceID", settings.instance_id.as_str())
                .with_timeout_ms(settings.default_timeout_ms)
        };

        Self {
            onboarding: build(&settings.sdc_be_onboarding_url, ONBOARDING_API_PATH),
            catalog: build(&settings.sdc_be_url, CATALOG_API_PATH),
            user_id: settings.sdc_user_id.clone(),
        }
    }

    pub fn onboarding(&self) -> &ApiClient {
        &self.onboarding
    }

    pub fn catalog(&self) -> &ApiClient {
        &self.catalog
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Latest version of the onboarding item of `item_type` named `name`.
    pub(crate) async fn find_item(
        &self,
        operation: &'static str,
        item_type: &str,
        name: &ResourceName,
    ) -> Result<Option<(ItemSummary, ItemVersion)>, OnapError> {
        let items: ItemList = self
            .onboarding
            .get_json(operation, &format!("items?itemType={item_type}"))
            .await?;
        let Some(item) = items
            .results
            .into_iter()
            .find(|item| item.name == name.as_str())
        else {
            return Ok(None);
        };

        let versions: VersionList = self
            .onboarding
            .get_json(operation, &format!("items/{}/versions", item.id))
            .await?;
        Ok(versions
            .results
            .into_iter()
            .max_by_key(|version| version_key(&version.name))
            .map(|version| (item, version)))
    }

    /// Item and item version, `None` if either is unknown to the server.
    pub(crate) async fn item_details(
        &self,
        operation: &'static str,
        item_id: &str,
        version_id: &str,
    ) -> Result<Option<(ItemSummary, ItemVersion)>, OnapError> {
        let Some(item) = self
            .onboarding
            .get_json_optional::<ItemSummary>(operation, &format!("items/{item_id}"))
            .await?
        else {
            return Ok(None);
        };
        let version = self
            .onboarding
            .get_json_optional::<ItemVersion>(
                operation,
                &format!("items/{item_id}/versions/{version_id}"),
            )
            .await?;
        Ok(version.map(|version| (item, version)))
    }

    pub(crate) async fn archive_item(
        &self,
        operation: &'static str,
        item_id: &str,
    ) -> Result<(), OnapError> {
        self.onboarding
            .send_json(
                operation,
                HttpMethod::Put,
                &format!("items/{item_id}/actions"),
                &json!({ "action": "ARCHIVE" }),
            )
            .await?;
        Ok(())
    }
}

/// Response of an onboarding item creation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreatedItem {
    pub item_id: String,
    pub version: CreatedVersion,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CreatedVersion {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ItemList {
    #[serde(default)]
    pub results: Vec<ItemSummary>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ItemSummary {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
}

impl ItemSummary {
    pub fn is_archived(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|status| status.eq_ignore_ascii_case("ARCHIVED"))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct VersionList {
    #[serde(default)]
    pub results: Vec<ItemVersion>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ItemVersion {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub state: Option<VersionState>,
}

impl ItemVersion {
    pub fn is_certified(&self) -> bool {
        self.status.eq_ignore_ascii_case("Certified")
    }

    pub fn is_dirty(&self) -> bool {
        self.state.as_ref().is_some_and(|state| state.dirty)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct VersionState {
    #[serde(default)]
    pub dirty: bool,
}

/// Sort key for dotted versions such as `1.0` or `0.12`.
pub(crate) fn version_key(version: &str) -> (u32, u32) {
    let mut parts = version.split('.').map(|part| part.parse::<u32>().unwrap_or(0));
    (parts.next().unwrap_or(0), parts.next().unwrap_or(0))
}
