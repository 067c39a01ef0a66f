use std::future::Future;
use std::pin::Pin;

use serde_json::json;

use crate::api::parse_json;
use crate::domain::ResourceName;
use crate::error::{OnapError, ValidationError};
use crate::http_client::HttpMethod;
use crate::lifecycle::{
    self, LifecycleAction, LifecycleStatus, Onboardable, RemoteSnapshot, RemoteState,
    ResourceKind, StepOutcome,
};
use crate::sdc::{CreatedItem, ItemSummary, ItemVersion, SdcClient};

/// Vendor license model.
#[derive(Debug, Clone)]
pub struct Vendor {
    client: SdcClient,
    name: ResourceName,
    remote: RemoteState,
}

impl Vendor {
    pub fn new(client: SdcClient, name: ResourceName) -> Self {
        Self {
            client,
            name,
            remote: RemoteState::default(),
        }
    }

    pub fn name(&self) -> &ResourceName {
        &self.name
    }

    pub fn identifier(&self) -> Option<&str> {
        self.remote.identifier()
    }

    pub fn status(&self) -> LifecycleStatus {
        self.remote.status()
    }

    pub async fn create(&mut self) -> Result<StepOutcome, OnapError> {
        lifecycle::step(self, LifecycleAction::Create).await
    }

    pub async fn submit(&mut self) -> Result<StepOutcome, OnapError> {
        lifecycle::step(self, LifecycleAction::Submit).await
    }

    pub async fn archive(&mut self) -> Result<StepOutcome, OnapError> {
        lifecycle::step(self, LifecycleAction::Archive).await
    }

    pub async fn onboard(&mut self) -> Result<Vec<LifecycleAction>, OnapError> {
        lifecycle::onboard(self).await
    }

    pub async fn load(&mut self) -> Result<LifecycleStatus, OnapError> {
        lifecycle::load(self).await
    }

    async fn create_remote(&mut self) -> Result<(), OnapError> {
        let body = json!({
            "vendorName": self.name.as_str(),
            "description": "vendor",
            "iconRef": "icon",
        });
        let response = self
            .client
            .onboarding()
            .send_json("vendor.create", HttpMethod::Post, "vendor-license-models", &body)
            .await?;
        let created: CreatedItem = parse_json("vendor.create", &response.body)?;
        self.remote
            .set_identity(created.item_id, Some(created.version.id));
        Ok(())
    }

    async fn submit_remote(&self) -> Result<(), OnapError> {
        let (id, version) = self.identity()?;
        self.client
            .onboarding()
            .send_json(
                "vendor.submit",
                HttpMethod::Put,
                &format!("vendor-license-models/{id}/versions/{version}/actions"),
                &json!({ "action": "Submit" }),
            )
            .await?;
        Ok(())
    }

    fn identity(&self) -> Result<(&str, &str), ValidationError> {
        self.remote
            .identifier()
            .zip(self.remote.version())
            .ok_or_else(|| ValidationError::MissingIdentifier {
                resource: "vendor",
                name: self.name.to_string(),
            })
    }
}

fn snapshot(item: ItemSummary, version: ItemVersion) -> RemoteSnapshot {
    let status = if item.is_archived() {
        LifecycleStatus::Archived
    } else if version.is_certified() {
        LifecycleStatus::Certified
    } else {
        LifecycleStatus::Draft
    };
    RemoteSnapshot {
        identifier: item.id,
        version: Some(version.id),
        status,
    }
}

impl Onboardable for Vendor {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Vendor
    }

    fn name(&self) -> &ResourceName {
        &self.name
    }

    fn remote(&self) -> &RemoteState {
        &self.remote
    }

    fn remote_mut(&mut self) -> &mut RemoteState {
        &mut self.remote
    }

    fn perform<'a>(
        &'a mut self,
        action: LifecycleAction,
    ) -> Pin<Box<dyn Future<Output = Result<(), OnapError>> + Send + 'a>> {
        Box::pin(async move {
            match action {
                LifecycleAction::Create => self.create_remote().await,
                LifecycleAction::Submit => self.submit_remote().await,
                LifecycleAction::Archive => {
                    let (id, _) = self.identity()?;
                    self.client.archive_item("vendor.archive", id).await
                }
                other => Err(ValidationError::UnsupportedAction {
                    kind: "vendor",
                    action: other.as_str(),
                }
                .into()),
            }
        })
    }

    fn fetch_details<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<Option<RemoteSnapshot>, OnapError>> + Send + 'a>> {
        Box::pin(async move {
            let Ok((id, version)) = self.identity() else {
                return Ok(None);
            };
            let details = self.client.item_details("vendor.details", id, version).await?;
            Ok(details.map(|(item, version)| snapshot(item, version)))
        })
    }

    fn probe_existence<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<Option<RemoteSnapshot>, OnapError>> + Send + 'a>> {
        Box::pin(async move {
            let found = self
                .client
                .find_item("vendor.probe", "vlm", &self.name)
                .await?;
            Ok(found.map(|(item, version)| snapshot(item, version)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::http_client::{HttpResponse, ScriptedHttpClient};
    use crate::lifecycle::SkipReason;
    use std::sync::Arc;

    fn vendor(scripted: Arc<ScriptedHttpClient>) -> Vendor {
        let sdc = SdcClient::new(scripted, &Settings::default());
        Vendor::new(sdc, ResourceName::parse("test").expect("valid name"))
    }

    fn onboarding_api() -> ScriptedHttpClient {
        ScriptedHttpClient::new()
            .on(
                HttpMethod::Post,
                "/vendor-license-models",
                HttpResponse::ok_json(r#"{"itemId":"vlm-1","version":{"id":"ver-1"}}"#),
            )
            .on(
                HttpMethod::Put,
                "/vendor-license-models/vlm-1/versions/ver-1/actions",
                HttpResponse::ok_json("{}"),
            )
    }

    #[tokio::test]
    async fn create_records_identity_and_body() {
        let scripted = Arc::new(onboarding_api());
        let mut vendor = vendor(scripted.clone());

        let outcome = vendor.create().await.expect("create");

        assert!(outcome.is_advanced());
        assert_eq!(vendor.identifier(), Some("vlm-1"));
        assert_eq!(vendor.status(), LifecycleStatus::Draft);
        let body = scripted.recorded_requests()[0]
            .body
            .clone()
            .expect("json body");
        let body: serde_json::Value = serde_json::from_str(&body).expect("valid json");
        assert_eq!(body["vendorName"], "test");
    }

    #[tokio::test]
    async fn submit_before_create_is_skipped_without_requests() {
        let scripted = Arc::new(onboarding_api());
        let mut vendor = vendor(scripted.clone());

        let outcome = vendor.submit().await.expect("skip is not an error");

        assert_eq!(outcome, StepOutcome::Skipped(SkipReason::NotCreated));
        assert_eq!(scripted.request_count(), 0);
    }

    #[tokio::test]
    async fn load_reads_archived_item_status() {
        let scripted = Arc::new(
            ScriptedHttpClient::new()
                .on(
                    HttpMethod::Get,
                    "/items?itemType=vlm",
                    HttpResponse::ok_json(
                        r#"{"results":[{"id":"vlm-1","name":"test","status":"ARCHIVED"}]}"#,
                    ),
                )
                .on(
                    HttpMethod::Get,
                    "/items/vlm-1/versions",
                    HttpResponse::ok_json(
                        r#"{"results":[{"id":"ver-1","name":"1.0","status":"Certified"}]}"#,
                    ),
                ),
        );
        let mut vendor = vendor(scripted);

        let status = vendor.load().await.expect("load");
        assert_eq!(status, LifecycleStatus::Archived);
        assert_eq!(vendor.identifier(), Some("vlm-1"));
    }
}
