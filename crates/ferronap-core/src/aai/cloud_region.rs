use serde::{Deserialize, Serialize};
use tracing::info;

use crate::aai::{segment, AaiClient, Complex, Relationship, RelationshipList};
use crate::error::{OnapError, ValidationError};
use crate::http_client::HttpMethod;

const CLOUD_REGIONS_PATH: &str = "cloud-infrastructure/cloud-regions";
const LOCATED_IN: &str = "org.onap.relationships.inventory.LocatedIn";

/// Cloud region keyed by owner and region id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CloudRegion {
    pub cloud_owner: String,
    pub cloud_region_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_defined_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_region_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_zone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complex_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_url: Option<String>,
    #[serde(default)]
    pub orchestration_disabled: bool,
    #[serde(default)]
    pub in_maint: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CloudRegionList {
    #[serde(default, rename = "cloud-region")]
    pub cloud_region: Vec<CloudRegion>,
}

impl CloudRegion {
    pub fn new(cloud_owner: impl Into<String>, cloud_region_id: impl Into<String>) -> Self {
        Self {
            cloud_owner: cloud_owner.into(),
            cloud_region_id: cloud_region_id.into(),
            ..Self::default()
        }
    }

    pub fn with_cloud_type(mut self, cloud_type: impl Into<String>) -> Self {
        self.cloud_type = Some(cloud_type.into());
        self
    }

    pub fn with_complex_name(mut self, complex_name: impl Into<String>) -> Self {
        self.complex_name = Some(complex_name.into());
        self
    }

    fn path(cloud_owner: &str, cloud_region_id: &str) -> String {
        format!(
            "{CLOUD_REGIONS_PATH}/cloud-region/{}/{}",
            segment(cloud_owner),
            segment(cloud_region_id)
        )
    }

    fn own_path(&self) -> String {
        Self::path(&self.cloud_owner, &self.cloud_region_id)
    }

    fn key(&self) -> String {
        format!("{}/{}", self.cloud_owner, self.cloud_region_id)
    }
}

impl AaiClient {
    pub async fn cloud_regions(&self) -> Result<Vec<CloudRegion>, OnapError> {
        let list: Option<CloudRegionList> = self
            .api()
            .get_json_optional("cloud_region.list", CLOUD_REGIONS_PATH)
            .await?;
        Ok(list.map(|list| list.cloud_region).unwrap_or_default())
    }

    pub async fn cloud_region(
        &self,
        cloud_owner: &str,
        cloud_region_id: &str,
    ) -> Result<CloudRegion, OnapError> {
        self.api()
            .get_json_optional(
                "cloud_region.get",
                &CloudRegion::path(cloud_owner, cloud_region_id),
            )
            .await?
            .ok_or_else(|| OnapError::NotFound {
                resource: "cloud region",
                name: format!("{cloud_owner}/{cloud_region_id}"),
            })
    }

    /// Create (or replace) `region` and return it as stored.
    pub async fn create_cloud_region(&self, region: &CloudRegion) -> Result<CloudRegion, OnapError> {
        if region.cloud_owner.trim().is_empty() {
            return Err(ValidationError::EmptyField { field: "cloud-owner" }.into());
        }
        if region.cloud_region_id.trim().is_empty() {
            return Err(ValidationError::EmptyField {
                field: "cloud-region-id",
            }
            .into());
        }
        self.api()
            .send_json(
                "cloud_region.create",
                HttpMethod::Put,
                &region.own_path(),
                region,
            )
            .await?;
        info!(cloud_region = %region.key(), "cloud region created");
        self.cloud_region(&region.cloud_owner, &region.cloud_region_id)
            .await
    }

    pub async fn delete_cloud_region(&self, region: &CloudRegion) -> Result<(), OnapError> {
        let resource_version = region
            .resource_version
            .as_deref()
            .ok_or(ValidationError::EmptyField {
                field: "resource-version",
            })?;
        let path = format!(
            "{}?resource-version={}",
            region.own_path(),
            segment(resource_version)
        );
        let request = self.api().request(HttpMethod::Delete, &path);
        self.api().send("cloud_region.delete", request).await?;
        info!(cloud_region = %region.key(), "cloud region deleted");
        Ok(())
    }

    pub async fn cloud_region_relationships(
        &self,
        region: &CloudRegion,
    ) -> Result<Vec<Relationship>, OnapError> {
        let list: Option<RelationshipList> = self
            .api()
            .get_json_optional(
                "cloud_region.relationships",
                &format!("{}/relationship-list", region.own_path()),
            )
            .await?;
        Ok(list.map(|list| list.relationship).unwrap_or_default())
    }

    pub async fn add_cloud_region_relationship(
        &self,
        region: &CloudRegion,
        relationship: &Relationship,
    ) -> Result<(), OnapError> {
        self.api()
            .send_json(
                "cloud_region.add_relationship",
                HttpMethod::Put,
                &format!("{}/relationship-list/relationship", region.own_path()),
                relationship,
            )
            .await?;
        info!(
            cloud_region = %region.key(),
            related_to = %relationship.related_to,
            "relationship added"
        );
        Ok(())
    }

    /// Relationship placing a cloud region in `complex`.
    pub fn complex_relationship(&self, complex: &Complex) -> Relationship {
        Relationship::new(
            "complex",
            self.api().url(&Complex::path(&complex.physical_location_id)),
        )
        .with_label(LOCATED_IN)
        .with_data(
            "complex.physical-location-id",
            complex.physical_location_id.as_str(),
        )
    }

    pub async fn link_cloud_region_to_complex(
        &self,
        region: &CloudRegion,
        complex: &Complex,
    ) -> Result<(), OnapError> {
        let relationship = self.complex_relationship(complex);
        self.add_cloud_region_relationship(region, &relationship)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::error::OnapErrorKind;
    use crate::http_client::{HttpResponse, ScriptedHttpClient};
    use std::sync::Arc;

    fn aai(scripted: Arc<ScriptedHttpClient>) -> AaiClient {
        AaiClient::new(scripted, &Settings::default())
    }

    #[tokio::test]
    async fn lists_regions_from_wrapper() {
        let scripted = Arc::new(ScriptedHttpClient::new().on(
            HttpMethod::Get,
            "/cloud-infrastructure/cloud-regions",
            HttpResponse::ok_json(
                r#"{"cloud-region":[{"cloud-owner":"OWN","cloud-region-id":"r1","orchestration-disabled":true,"in-maint":false}]}"#,
            ),
        ));

        let regions = aai(scripted).cloud_regions().await.expect("list");

        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].cloud_region_id, "r1");
        assert!(regions[0].orchestration_disabled);
    }

    #[tokio::test]
    async fn unknown_region_is_not_found() {
        let scripted = Arc::new(ScriptedHttpClient::new().on(
            HttpMethod::Get,
            "/cloud-region/OWN/r9",
            HttpResponse::not_found(),
        ));

        let error = aai(scripted)
            .cloud_region("OWN", "r9")
            .await
            .expect_err("absent");
        assert_eq!(error.kind(), OnapErrorKind::NotFound);
        assert_eq!(error.to_string(), "cloud region 'OWN/r9' not found");
    }

    #[tokio::test]
    async fn link_to_complex_puts_located_in_relationship() {
        let scripted = Arc::new(ScriptedHttpClient::new().on(
            HttpMethod::Put,
            "/cloud-region/OWN/r1/relationship-list/relationship",
            HttpResponse::ok_json(""),
        ));
        let aai = aai(scripted.clone());

        aai.link_cloud_region_to_complex(&CloudRegion::new("OWN", "r1"), &Complex::new("dc-1"))
            .await
            .expect("link");

        let body = scripted.recorded_requests()[0].body.clone().expect("body");
        let relationship: Relationship = serde_json::from_str(&body).expect("relationship");
        assert_eq!(relationship.related_to, "complex");
        assert_eq!(relationship.relationship_label.as_deref(), Some(LOCATED_IN));
        assert!(relationship
            .related_link
            .ends_with("/aai/v16/cloud-infrastructure/complexes/complex/dc-1"));
        assert_eq!(relationship.data("complex.physical-location-id"), Some("dc-1"));
    }

    #[tokio::test]
    async fn create_puts_region_body_and_reads_it_back() {
        let scripted = Arc::new(
            ScriptedHttpClient::new()
                .on(HttpMethod::Put, "/cloud-region/OWN/r1", HttpResponse::new(201, ""))
                .on(
                    HttpMethod::Get,
                    "/cloud-region/OWN/r1",
                    HttpResponse::ok_json(
                        r#"{"cloud-owner":"OWN","cloud-region-id":"r1","complex-name":"dc-1","resource-version":"3"}"#,
                    ),
                ),
        );
        let region = CloudRegion::new("OWN", "r1")
            .with_cloud_type("openstack")
            .with_complex_name("dc-1");

        let stored = aai(scripted.clone())
            .create_cloud_region(&region)
            .await
            .expect("create");

        let body = scripted.recorded_requests()[0].body.clone().expect("body");
        let sent: serde_json::Value = serde_json::from_str(&body).expect("json");
        assert_eq!(sent["complex-name"], "dc-1");
        assert_eq!(sent["cloud-type"], "openstack");
        assert!(sent.get("resource-version").is_none());
        assert_eq!(stored.resource_version.as_deref(), Some("3"));
    }

    #[tokio::test]
    async fn create_rejects_blank_key_without_requests() {
        let scripted = Arc::new(ScriptedHttpClient::new());

        let error = aai(scripted.clone())
            .create_cloud_region(&CloudRegion::new("OWN", " "))
            .await
            .expect_err("blank id");

        assert_eq!(error.kind(), OnapErrorKind::Validation);
        assert_eq!(scripted.request_count(), 0);
    }
}
