use std::future::Future;
use std::pin::Pin;

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::api::parse_json;
use crate::domain::ResourceName;
use crate::error::{OnapError, ValidationError};
use crate::http_client::{HttpMethod, MultipartFile};
use crate::lifecycle::{
    self, LifecycleAction, LifecycleStatus, Onboardable, RemoteSnapshot, RemoteState,
    ResourceKind, StepOutcome,
};
use crate::sdc::{CreatedItem, ItemSummary, ItemVersion, SdcClient, Vendor};

/// Onboarding package (a CSAR or zipped heat template set).
#[derive(Clone, PartialEq, Eq)]
pub struct VspPackage {
    file_name: String,
    bytes: Vec<u8>,
}

impl VspPackage {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl std::fmt::Debug for VspPackage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VspPackage")
            .field("file_name", &self.file_name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct VendorRef {
    name: ResourceName,
    identifier: Option<String>,
}

/// Vendor software product.
#[derive(Debug, Clone)]
pub struct Vsp {
    client: SdcClient,
    name: ResourceName,
    remote: RemoteState,
    vendor: Option<VendorRef>,
    package: Option<VspPackage>,
}

/// Fields of the software product version that reveal upload progress.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VspVersionDetails {
    #[serde(default)]
    network_package_name: Option<String>,
    #[serde(default)]
    validation_data: Option<Value>,
}

impl Vsp {
    pub fn new(client: SdcClient, name: ResourceName) -> Self {
        Self {
            client,
            name,
            remote: RemoteState::default(),
            vendor: None,
            package: None,
        }
    }

    /// Owning vendor. One not yet created here is looked up by name on create.
    pub fn with_vendor(mut self, vendor: &Vendor) -> Self {
        self.vendor = Some(VendorRef {
            name: vendor.name().clone(),
            identifier: vendor.identifier().map(str::to_owned),
        });
        self
    }

    pub fn with_package(mut self, package: VspPackage) -> Self {
        self.package = Some(package);
        self
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

    pub fn vendor_name(&self) -> Option<&str> {
        self.vendor.as_ref().map(|vendor| vendor.name.as_str())
    }

    pub async fn create(&mut self) -> Result<StepOutcome, OnapError> {
        lifecycle::step(self, LifecycleAction::Create).await
    }

    pub async fn upload_package(&mut self) -> Result<StepOutcome, OnapError> {
        lifecycle::step(self, LifecycleAction::UploadPackage).await
    }

    pub async fn validate(&mut self) -> Result<StepOutcome, OnapError> {
        lifecycle::step(self, LifecycleAction::Validate).await
    }

    pub async fn commit(&mut self) -> Result<StepOutcome, OnapError> {
        lifecycle::step(self, LifecycleAction::Commit).await
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

    fn identity(&self) -> Result<(&str, &str), ValidationError> {
        self.remote
            .identifier()
            .zip(self.remote.version())
            .ok_or_else(|| ValidationError::MissingIdentifier {
                resource: "vsp",
                name: self.name.to_string(),
            })
    }

    fn version_path(&self, suffix: &str) -> Result<String, ValidationError> {
        let (id, version) = self.identity()?;
        Ok(format!("vendor-software-products/{id}/versions/{version}{suffix}"))
    }

    async fn resolve_vendor(&mut self) -> Result<(String, String), OnapError> {
        let missing = || ValidationError::MissingReference {
            resource: "vsp",
            reference: "vendor",
        };
        let vendor = self.vendor.as_mut().ok_or_else(missing)?;
        if vendor.identifier.is_none() {
            let (item, _) = self
                .client
                .find_item("vsp.resolve_vendor", "vlm", &vendor.name)
                .await?
                .ok_or_else(missing)?;
            debug!(vendor = %vendor.name, id = %item.id, "vendor resolved by name");
            vendor.identifier = Some(item.id);
        }
        let id = vendor.identifier.clone().ok_or_else(missing)?;
        Ok((vendor.name.to_string(), id))
    }

    async fn create_remote(&mut self) -> Result<(), OnapError> {
        let (vendor_name, vendor_id) = self.resolve_vendor().await?;

        let body = json!({
            "name": self.name.as_str(),
            "description": "vsp",
            "icon": "icon",
            "category": "resourceNewCategory.generic",
            "subCategory": "resourceNewCategory.generic.abstract",
            "vendorName": vendor_name,
            "vendorId": vendor_id,
            "licensingData": {},
            "onboardingMethod": "NetworkPackage",
        });
        let response = self
            .client
            .onboarding()
            .send_json("vsp.create", HttpMethod::Post, "vendor-software-products", &body)
            .await?;
        let created: CreatedItem = parse_json("vsp.create", &response.body)?;
        self.remote
            .set_identity(created.item_id, Some(created.version.id));
        Ok(())
    }

    async fn upload_remote(&self) -> Result<(), OnapError> {
        let package = self
            .package
            .as_ref()
            .ok_or_else(|| ValidationError::MissingPackage {
                resource: "vsp",
                name: self.name.to_string(),
            })?;
        let path = self.version_path("/orchestration-template-candidate")?;
        let request = self
            .client
            .onboarding()
            .request(HttpMethod::Post, &path)
            .with_multipart(MultipartFile {
                field: String::from("upload"),
                file_name: package.file_name.clone(),
                mime: String::from("application/zip"),
                bytes: package.bytes.clone(),
            });
        self.client
            .onboarding()
            .send("vsp.upload_package", request)
            .await?;
        Ok(())
    }

    async fn validate_remote(&self) -> Result<(), OnapError> {
        let path = self.version_path("/orchestration-template-candidate/process")?;
        let request = self.client.onboarding().request(HttpMethod::Put, &path);
        self.client.onboarding().send("vsp.validate", request).await?;
        Ok(())
    }

    async fn commit_remote(&self) -> Result<(), OnapError> {
        let (id, version) = self.identity()?;
        let body = json!({
            "action": "Commit",
            "commitRequest": { "message": "ok" },
        });
        self.client
            .onboarding()
            .send_json(
                "vsp.commit",
                HttpMethod::Put,
                &format!("items/{id}/versions/{version}/actions"),
                &body,
            )
            .await?;
        Ok(())
    }

    async fn submit_remote(&self) -> Result<(), OnapError> {
        let path = self.version_path("/actions")?;
        let onboarding = self.client.onboarding();
        onboarding
            .send_json("vsp.submit", HttpMethod::Put, &path, &json!({ "action": "Submit" }))
            .await?;
        onboarding
            .send_json(
                "vsp.create_package",
                HttpMethod::Put,
                &path,
                &json!({ "action": "Create_Package" }),
            )
            .await?;
        Ok(())
    }

    async fn snapshot(
        &self,
        operation: &'static str,
        item: ItemSummary,
        version: ItemVersion,
    ) -> Result<RemoteSnapshot, OnapError> {
        let details = self
            .client
            .onboarding()
            .get_json_optional::<VspVersionDetails>(
                operation,
                &format!("vendor-software-products/{}/versions/{}", item.id, version.id),
            )
            .await?
            .unwrap_or_default();

        let status = if item.is_archived() {
            LifecycleStatus::Archived
        } else if version.is_certified() {
            LifecycleStatus::Certified
        } else if details.validation_data.is_some() && !version.is_dirty() {
            LifecycleStatus::Committed
        } else if details.validation_data.is_some() {
            LifecycleStatus::Validated
        } else if details.network_package_name.is_some() {
            LifecycleStatus::Uploaded
        } else {
            LifecycleStatus::Draft
        };

        Ok(RemoteSnapshot {
            identifier: item.id,
            version: Some(version.id),
            status,
        })
    }
}

impl Onboardable for Vsp {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Vsp
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
                LifecycleAction::UploadPackage => self.upload_remote().await,
                LifecycleAction::Validate => self.validate_remote().await,
                LifecycleAction::Commit => self.commit_remote().await,
                LifecycleAction::Submit => self.submit_remote().await,
                LifecycleAction::Archive => {
                    let (id, _) = self.identity()?;
                    self.client.archive_item("vsp.archive", id).await
                }
                LifecycleAction::Certify => Err(ValidationError::UnsupportedAction {
                    kind: "vsp",
                    action: action.as_str(),
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
            match self.client.item_details("vsp.details", id, version).await? {
                Some((item, version)) => self.snapshot("vsp.details", item, version).await.map(Some),
                None => Ok(None),
            }
        })
    }

    fn probe_existence<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<Option<RemoteSnapshot>, OnapError>> + Send + 'a>> {
        Box::pin(async move {
            match self.client.find_item("vsp.probe", "vsp", &self.name).await? {
                Some((item, version)) => self.snapshot("vsp.probe", item, version).await.map(Some),
                None => Ok(None),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::error::OnapErrorKind;
    use crate::http_client::{HttpResponse, ScriptedHttpClient};
    use std::sync::Arc;

    fn sdc(scripted: Arc<ScriptedHttpClient>) -> SdcClient {
        SdcClient::new(scripted, &Settings::default())
    }

    #[tokio::test]
    async fn create_with_unknown_vendor_fails_before_any_write() {
        let scripted = Arc::new(ScriptedHttpClient::new().on(
            HttpMethod::Get,
            "/items?itemType=vlm",
            HttpResponse::ok_json(r#"{"results":[]}"#),
        ));
        let client = sdc(scripted.clone());
        let vendor = Vendor::new(client.clone(), ResourceName::parse("acme").expect("valid"));
        let mut vsp = Vsp::new(client, ResourceName::parse("fw").expect("valid")).with_vendor(&vendor);

        let error = vsp.create().await.expect_err("vendor not created");

        assert_eq!(error.kind(), OnapErrorKind::Validation);
        assert_eq!(vsp.status(), LifecycleStatus::Uncreated);
        assert_eq!(scripted.mutating_count(), 0);
    }

    #[tokio::test]
    async fn create_without_vendor_sends_nothing() {
        let scripted = Arc::new(ScriptedHttpClient::new());
        let mut vsp = Vsp::new(sdc(scripted.clone()), ResourceName::parse("fw").expect("valid"));

        let error = vsp.create().await.expect_err("no vendor");

        assert!(matches!(
            error,
            OnapError::Validation(ValidationError::MissingReference { reference: "vendor", .. })
        ));
        assert_eq!(scripted.request_count(), 0);
    }

    #[tokio::test]
    async fn vendor_created_after_composition_is_resolved_by_name() {
        let scripted = Arc::new(
            ScriptedHttpClient::new()
                .on(
                    HttpMethod::Post,
                    "/vendor-license-models",
                    HttpResponse::ok_json(r#"{"itemId":"vlm-1","version":{"id":"vlm-ver-1"}}"#),
                )
                .on(
                    HttpMethod::Get,
                    "/items?itemType=vlm",
                    HttpResponse::ok_json(r#"{"results":[{"id":"vlm-1","name":"acme"}]}"#),
                )
                .on(
                    HttpMethod::Get,
                    "/items/vlm-1/versions",
                    HttpResponse::ok_json(r#"{"results":[{"id":"vlm-ver-1","name":"1.0","status":"Draft"}]}"#),
                )
                .on(
                    HttpMethod::Post,
                    "/vendor-software-products",
                    HttpResponse::ok_json(r#"{"itemId":"vsp-1","version":{"id":"ver-1"}}"#),
                ),
        );
        let client = sdc(scripted.clone());
        let mut vendor = Vendor::new(client.clone(), ResourceName::parse("acme").expect("valid"));
        let mut vsp = Vsp::new(client, ResourceName::parse("fw").expect("valid")).with_vendor(&vendor);
        vendor.create().await.expect("vendor create");

        vsp.create().await.expect("vsp create");

        let body = scripted
            .recorded_requests()
            .into_iter()
            .find(|request| request.url.ends_with("/vendor-software-products"))
            .and_then(|request| request.body)
            .expect("create body");
        let body: serde_json::Value = serde_json::from_str(&body).expect("json");
        assert_eq!(body["vendorId"], "vlm-1");
        assert_eq!(body["vendorName"], "acme");
        assert_eq!(vsp.status(), LifecycleStatus::Draft);
    }

    #[tokio::test]
    async fn upload_sends_package_as_multipart() {
        let scripted = Arc::new(
            ScriptedHttpClient::new()
                .on(
                    HttpMethod::Post,
                    "/vendor-software-products",
                    HttpResponse::ok_json(r#"{"itemId":"vsp-1","version":{"id":"ver-1"}}"#),
                )
                .on(
                    HttpMethod::Post,
                    "/orchestration-template-candidate",
                    HttpResponse::ok_json(r#"{"status":"Success"}"#),
                ),
        );
        let client = sdc(scripted.clone());
        let mut vendor = Vendor::new(client.clone(), ResourceName::parse("acme").expect("valid"));
        vendor
            .remote_mut()
            .set_identity("vlm-1", Some(String::from("ver-0")));
        let mut vsp = Vsp::new(client, ResourceName::parse("fw").expect("valid"))
            .with_vendor(&vendor)
            .with_package(VspPackage::new("fw.zip", vec![0x50, 0x4b, 0x03, 0x04]));

        vsp.create().await.expect("create");
        vsp.upload_package().await.expect("upload");

        let upload = scripted
            .recorded_requests()
            .into_iter()
            .find(|request| request.url.ends_with("/orchestration-template-candidate"))
            .expect("upload request");
        assert!(upload
            .url
            .contains("/vendor-software-products/vsp-1/versions/ver-1/"));
        let part = upload.multipart.expect("multipart part");
        assert_eq!(part.field, "upload");
        assert_eq!(part.file_name, "fw.zip");
        assert_eq!(vsp.status(), LifecycleStatus::Uploaded);
    }

    #[tokio::test]
    async fn upload_without_package_is_rejected() {
        let scripted = Arc::new(ScriptedHttpClient::new());
        let mut vsp = Vsp::new(sdc(scripted.clone()), ResourceName::parse("fw").expect("valid"));
        vsp.remote_mut()
            .set_identity("vsp-1", Some(String::from("ver-1")));
        vsp.remote_mut().set_status(LifecycleStatus::Draft);

        let error = vsp.upload_package().await.expect_err("no package");
        assert!(matches!(
            error,
            OnapError::Validation(ValidationError::MissingPackage { .. })
        ));
        assert_eq!(vsp.status(), LifecycleStatus::Draft);
        assert_eq!(scripted.request_count(), 0);
    }

    #[tokio::test]
    async fn details_derive_validated_and_committed() {
        let item = r#"{"id":"vsp-1","name":"fw","status":"ACTIVE"}"#;
        let details = r#"{"networkPackageName":"fw.zip","validationData":{"importStructure":{}}}"#;
        for (dirty, expected) in [
            (true, LifecycleStatus::Validated),
            (false, LifecycleStatus::Committed),
        ] {
            let version = format!(
                r#"{{"id":"ver-1","name":"1.0","status":"Draft","state":{{"dirty":{dirty}}}}}"#
            );
            let scripted = Arc::new(
                ScriptedHttpClient::new()
                    .on(HttpMethod::Get, "/items/vsp-1", HttpResponse::ok_json(item))
                    .on(
                        HttpMethod::Get,
                        "/items/vsp-1/versions/ver-1",
                        HttpResponse::ok_json(version),
                    )
                    .on(
                        HttpMethod::Get,
                        "/vendor-software-products/vsp-1/versions/ver-1",
                        HttpResponse::ok_json(details),
                    ),
            );
            let mut vsp = Vsp::new(sdc(scripted), ResourceName::parse("fw").expect("valid"));
            vsp.remote_mut()
                .set_identity("vsp-1", Some(String::from("ver-1")));

            assert_eq!(vsp.load().await.expect("load"), expected);
        }
    }
}
