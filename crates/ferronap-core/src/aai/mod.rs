//! # Active and Available Inventory (A&AI)
//!
//! Cloud regions, complexes and the typed relationships that link them.
//! Inventory objects carry a `resource-version` token that the server
//! requires on delete; relationships are only created by explicit calls.

mod cloud_region;
mod complex;
mod relationship;

use std::sync::Arc;

use crate::api::ApiClient;
use crate::config::Settings;
use crate::http_client::{HttpAuth, HttpClient};

pub use cloud_region::{CloudRegion, CloudRegionList};
pub use complex::{Complex, ComplexList};
pub use relationship::{RelatedToProperty, Relationship, RelationshipData, RelationshipList};

pub const FROM_APP_ID_HEADER: &str = "X-FromAppId";
pub const TRANSACTION_ID_HEADER: &str = "X-TransactionId";

/// Inventory API client rooted at `{AAI_URL}/aai/{AAI_API_VERSION}`.
#[derive(Debug, Clone)]
pub struct AaiClient {
    api: ApiClient,
}

impl AaiClient {
    pub fn new(http: Arc<dyn HttpClient>, settings: &Settings) -> Self {
        let base_url = format!(
            "{}/aai/{}",
            settings.aai_url.trim_end_matches('/'),
            settings.aai_api_version
        );
        let api = ApiClient::new(http, base_url)
            .with_auth(HttpAuth::basic(&settings.aai_username, &settings.aai_password))
            .with_header(FROM_APP_ID_HEADER, settings.instance_id.as_str())
            .with_transaction_header(TRANSACTION_ID_HEADER)
            .with_timeout_ms(settings.default_timeout_ms);
        Self { api }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }
}

/// Percent-encode one path segment of an inventory key.
pub(crate) fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::{HttpMethod, ScriptedHttpClient};

    #[test]
    fn base_url_includes_api_version() {
        let settings = Settings {
            aai_url: String::from("https://aai.test:30233/"),
            aai_api_version: String::from("v19"),
            ..Settings::default()
        };
        let aai = AaiClient::new(Arc::new(ScriptedHttpClient::new()), &settings);

        assert_eq!(aai.api().base_url(), "https://aai.test:30233/aai/v19");
        let request = aai.api().request(HttpMethod::Get, "cloud-infrastructure/complexes");
        assert_eq!(
            request.headers.get("x-fromappid").map(String::as_str),
            Some("ferronap")
        );
        assert!(request.headers.contains_key("x-transactionid"));
    }

    #[test]
    fn key_segments_are_percent_encoded() {
        assert_eq!(segment("Region One/a"), "Region%20One%2Fa");
    }
}
