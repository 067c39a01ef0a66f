//! Catalog API calls shared by VFs and services.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::parse_json;
use crate::domain::ResourceName;
use crate::error::OnapError;
use crate::http_client::HttpMethod;
use crate::lifecycle::{LifecycleStatus, RemoteSnapshot};
use crate::sdc::{version_key, SdcClient};

/// Catalog component as returned by create, lifecycle and list calls.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CatalogComponent {
    pub unique_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub lifecycle_state: Option<String>,
    #[serde(default)]
    pub archived: bool,
}

impl CatalogComponent {
    pub fn status(&self) -> LifecycleStatus {
        if self.archived {
            return LifecycleStatus::Archived;
        }
        match self.lifecycle_state.as_deref() {
            Some("CERTIFIED") => LifecycleStatus::Certified,
            _ => LifecycleStatus::Draft,
        }
    }

    pub fn into_snapshot(self) -> RemoteSnapshot {
        let status = self.status();
        RemoteSnapshot {
            identifier: self.unique_id,
            version: self.version,
            status,
        }
    }
}

#[derive(Debug, Deserialize)]
struct FilteredData {
    metadata: CatalogComponent,
}

/// Catalog endpoints for one component segment (`resources` or `services`).
#[derive(Debug, Clone, Copy)]
pub(crate) struct CatalogCalls<'a> {
    client: &'a SdcClient,
    segment: &'static str,
}

impl<'a> CatalogCalls<'a> {
    pub fn new(client: &'a SdcClient, segment: &'static str) -> Self {
        Self { client, segment }
    }

    pub async fn create(
        self,
        operation: &'static str,
        body: &Value,
    ) -> Result<CatalogComponent, OnapError> {
        let response = self
            .client
            .catalog()
            .send_json(operation, HttpMethod::Post, self.segment, body)
            .await?;
        parse_json(operation, &response.body)
    }

    /// Check the component in, then certify it; returns the certified
    /// component, whose unique id differs from the draft's.
    pub async fn certify(
        self,
        operation: &'static str,
        unique_id: &str,
    ) -> Result<CatalogComponent, OnapError> {
        let checked_in = self.change_state(operation, unique_id, "checkin").await?;
        self.change_state(operation, &checked_in.unique_id, "certify")
            .await
    }

    pub async fn archive(self, operation: &'static str, unique_id: &str) -> Result<(), OnapError> {
        let request = self.client.catalog().request(
            HttpMethod::Post,
            &format!("{}/{unique_id}/archive", self.segment),
        );
        self.client.catalog().send(operation, request).await?;
        Ok(())
    }

    pub async fn details(
        self,
        operation: &'static str,
        unique_id: &str,
    ) -> Result<Option<RemoteSnapshot>, OnapError> {
        let data: Option<FilteredData> = self
            .client
            .catalog()
            .get_json_optional(
                operation,
                &format!(
                    "{}/{unique_id}/filteredDataByParams?include=metadata",
                    self.segment
                ),
            )
            .await?;
        Ok(data.map(|data| data.metadata.into_snapshot()))
    }

    /// Highest version of the component named `name`.
    pub async fn probe(
        self,
        operation: &'static str,
        name: &ResourceName,
    ) -> Result<Option<RemoteSnapshot>, OnapError> {
        let components: Vec<CatalogComponent> = self
            .client
            .catalog()
            .get_json(operation, self.segment)
            .await?;
        Ok(components
            .into_iter()
            .filter(|component| component.name == name.as_str())
            .max_by_key(|component| version_key(component.version.as_deref().unwrap_or("0.0")))
            .map(CatalogComponent::into_snapshot))
    }

    async fn change_state(
        self,
        operation: &'static str,
        unique_id: &str,
        state: &str,
    ) -> Result<CatalogComponent, OnapError> {
        let response = self
            .client
            .catalog()
            .send_json(
                operation,
                HttpMethod::Post,
                &format!("{}/{unique_id}/lifecycleState/{state}", self.segment),
                &json!({ "userRemarks": state }),
            )
            .await?;
        parse_json(operation, &response.body)
    }
}
