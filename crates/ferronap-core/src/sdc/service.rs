use std::future::Future;
use std::pin::Pin;

use serde_json::json;
use tracing::debug;

use crate::domain::ResourceName;
use crate::error::{OnapError, ValidationError};
use crate::http_client::HttpMethod;
use crate::lifecycle::{
    self, LifecycleAction, LifecycleStatus, Onboardable, RemoteSnapshot, RemoteState,
    ResourceKind, StepOutcome,
};
use crate::sdc::catalog::CatalogCalls;
use crate::sdc::{SdcClient, Vf};

const SEGMENT: &str = "services";

#[derive(Debug, Clone, PartialEq, Eq)]
struct ResourceRef {
    name: ResourceName,
    identifier: Option<String>,
    version: Option<String>,
    attached: bool,
}

/// Service model composed of VF instances.
#[derive(Debug, Clone)]
pub struct Service {
    client: SdcClient,
    name: ResourceName,
    remote: RemoteState,
    resources: Vec<ResourceRef>,
}

impl Service {
    pub fn new(client: SdcClient, name: ResourceName) -> Self {
        Self {
            client,
            name,
            remote: RemoteState::default(),
            resources: Vec::new(),
        }
    }

    /// Compose an instance of `vf` into the service.
    ///
    /// A VF not yet created at this point is looked up by name when the
    /// service is created. Instances are attached during certification.
    pub fn with_resource(mut self, vf: &Vf) -> Self {
        self.resources.push(ResourceRef {
            name: vf.name().clone(),
            identifier: vf.identifier().map(str::to_owned),
            version: vf.version().map(str::to_owned),
            attached: false,
        });
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

    pub async fn create(&mut self) -> Result<StepOutcome, OnapError> {
        lifecycle::step(self, LifecycleAction::Create).await
    }

    pub async fn certify(&mut self) -> Result<StepOutcome, OnapError> {
        lifecycle::step(self, LifecycleAction::Certify).await
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

    fn calls(&self) -> CatalogCalls<'_> {
        CatalogCalls::new(&self.client, SEGMENT)
    }

    fn unique_id(&self) -> Result<&str, ValidationError> {
        self.remote
            .identifier()
            .ok_or_else(|| ValidationError::MissingIdentifier {
                resource: "service",
                name: self.name.to_string(),
            })
    }

    async fn resolve_resources(&mut self) -> Result<(), OnapError> {
        let resources = CatalogCalls::new(&self.client, "resources");
        for resource in self
            .resources
            .iter_mut()
            .filter(|resource| resource.identifier.is_none())
        {
            let Some(found) = resources.probe("service.resolve_vf", &resource.name).await? else {
                return Err(ValidationError::MissingReference {
                    resource: "service",
                    reference: "vf",
                }
                .into());
            };
            debug!(resource = %resource.name, id = %found.identifier, "vf resolved by name");
            resource.identifier = Some(found.identifier);
            resource.version = found.version;
        }
        Ok(())
    }

    async fn create_remote(&mut self) -> Result<(), OnapError> {
        self.resolve_resources().await?;

        let body = json!({
            "name": self.name.as_str(),
            "description": "service",
            "componentType": "SERVICE",
            "contactId": self.client.user_id(),
            "icon": "network_l_1-3",
            "tags": [self.name.as_str()],
            "categories": [{
                "name": "Network L1-3",
                "normalizedName": "network l1-3",
                "uniqueId": "serviceNewCategory.network l1-3",
            }],
            "environmentContext": "General_Revenue-Bearing",
            "instantiationType": "A-la-carte",
            "ecompGeneratedNaming": true,
            "projectCode": "123456",
        });
        let created = self.calls().create("service.create", &body).await?;
        self.remote.set_identity(created.unique_id, created.version);
        Ok(())
    }

    /// Attach every instance not yet attached. Progress survives a failure.
    async fn add_resource_instances(&mut self) -> Result<(), OnapError> {
        self.resolve_resources().await?;
        let unique_id = self.unique_id()?.to_owned();
        for (index, resource) in self.resources.iter_mut().enumerate() {
            if resource.attached {
                continue;
            }
            let body = json!({
                "name": resource.name.as_str(),
                "componentVersion": resource.version.as_deref().unwrap_or("1.0"),
                "posX": 300,
                "posY": 100 + 100 * index,
                "uniqueId": resource.identifier,
                "componentUid": resource.identifier,
                "originType": "VF",
                "icon": "defaulticon",
            });
            self.client
                .catalog()
                .send_json(
                    "service.add_resource",
                    HttpMethod::Post,
                    &format!("{SEGMENT}/{unique_id}/resourceInstance"),
                    &body,
                )
                .await?;
            resource.attached = true;
            debug!(service = %self.name, resource = %resource.name, "resource instance added");
        }
        Ok(())
    }

    async fn certify_remote(&mut self) -> Result<(), OnapError> {
        self.add_resource_instances().await?;
        let certified = self
            .calls()
            .certify("service.certify", self.unique_id()?)
            .await?;
        self.remote.set_identity(certified.unique_id, certified.version);
        Ok(())
    }
}

impl Onboardable for Service {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Service
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
                LifecycleAction::Certify => self.certify_remote().await,
                LifecycleAction::Archive => {
                    self.calls()
                        .archive("service.archive", self.unique_id()?)
                        .await
                }
                other => Err(ValidationError::UnsupportedAction {
                    kind: "service",
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
            let Ok(unique_id) = self.unique_id() else {
                return Ok(None);
            };
            self.calls().details("service.details", unique_id).await
        })
    }

    fn probe_existence<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<Option<RemoteSnapshot>, OnapError>> + Send + 'a>> {
        Box::pin(async move { self.calls().probe("service.probe", &self.name).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::http_client::{HttpResponse, ScriptedHttpClient};
    use std::sync::Arc;

    fn certified_vf(sdc: &SdcClient) -> Vf {
        let mut vf = Vf::new(sdc.clone(), ResourceName::parse("fw").expect("valid"));
        vf.remote_mut()
            .set_identity("vf-3", Some(String::from("1.0")));
        vf.remote_mut().set_status(LifecycleStatus::Certified);
        vf
    }

    fn certifiable_service_api(attach_replies: Vec<HttpResponse>) -> ScriptedHttpClient {
        attach_replies
            .into_iter()
            .fold(ScriptedHttpClient::new(), |client, reply| {
                client.on(HttpMethod::Post, "/services/svc-1/resourceInstance", reply)
            })
            .on(
                HttpMethod::Post,
                "/catalog/services",
                HttpResponse::ok_json(r#"{"uniqueId":"svc-1","version":"0.1"}"#),
            )
            .on(
                HttpMethod::Post,
                "/services/svc-1/lifecycleState/checkin",
                HttpResponse::ok_json(r#"{"uniqueId":"svc-2","version":"0.1"}"#),
            )
            .on(
                HttpMethod::Post,
                "/services/svc-2/lifecycleState/certify",
                HttpResponse::ok_json(
                    r#"{"uniqueId":"svc-3","version":"1.0","lifecycleState":"CERTIFIED"}"#,
                ),
            )
    }

    #[tokio::test]
    async fn certify_adds_one_instance_per_resource_before_checkin() {
        let scripted = Arc::new(certifiable_service_api(vec![HttpResponse::ok_json("{}")]));
        let sdc = SdcClient::new(scripted.clone(), &Settings::default());
        let vf = certified_vf(&sdc);
        let mut service = Service::new(sdc, ResourceName::parse("svc").expect("valid"))
            .with_resource(&vf);

        service.create().await.expect("create");
        assert_eq!(service.status(), LifecycleStatus::Draft);
        assert_eq!(scripted.request_count(), 1);

        service.certify().await.expect("certify");

        assert_eq!(service.status(), LifecycleStatus::Certified);
        assert_eq!(service.identifier(), Some("svc-3"));
        let requests = scripted.recorded_requests();
        assert!(requests[1].url.ends_with("/services/svc-1/resourceInstance"));
        assert!(requests[2].url.ends_with("/lifecycleState/checkin"));
        let instance: serde_json::Value =
            serde_json::from_str(requests[1].body.as_deref().expect("instance body"))
                .expect("json");
        assert_eq!(instance["componentUid"], "vf-3");
        assert_eq!(instance["componentVersion"], "1.0");
    }

    #[tokio::test]
    async fn failed_attach_is_resumed_without_recreating() {
        let scripted = Arc::new(certifiable_service_api(vec![
            HttpResponse::new(500, "busy"),
            HttpResponse::ok_json("{}"),
        ]));
        let sdc = SdcClient::new(scripted.clone(), &Settings::default());
        let vf = certified_vf(&sdc);
        let mut service = Service::new(sdc, ResourceName::parse("svc").expect("valid"))
            .with_resource(&vf);

        service.onboard().await.expect_err("attach fails");
        assert_eq!(service.status(), LifecycleStatus::Draft);
        assert_eq!(service.identifier(), Some("svc-1"));

        let executed = service.onboard().await.expect("resumed onboard");

        assert_eq!(executed, vec![LifecycleAction::Certify]);
        assert_eq!(service.status(), LifecycleStatus::Certified);
        assert_eq!(scripted.count_matching(HttpMethod::Post, "/catalog/services"), 1);
    }

    #[tokio::test]
    async fn vf_created_after_composition_is_resolved_by_name() {
        let scripted = Arc::new(certifiable_service_api(vec![HttpResponse::ok_json("{}")]).on(
            HttpMethod::Get,
            "/catalog/resources",
            HttpResponse::ok_json(
                r#"[{"uniqueId":"vf-9","name":"fw","version":"1.0","lifecycleState":"CERTIFIED"}]"#,
            ),
        ));
        let sdc = SdcClient::new(scripted.clone(), &Settings::default());
        let vf = Vf::new(sdc.clone(), ResourceName::parse("fw").expect("valid"));
        let mut service =
            Service::new(sdc, ResourceName::parse("svc").expect("valid")).with_resource(&vf);

        service.onboard().await.expect("onboard");

        let instance = scripted
            .recorded_requests()
            .into_iter()
            .find(|request| request.url.ends_with("/resourceInstance"))
            .and_then(|request| request.body)
            .expect("instance body");
        let instance: serde_json::Value = serde_json::from_str(&instance).expect("json");
        assert_eq!(instance["componentUid"], "vf-9");
    }

    #[tokio::test]
    async fn unknown_resource_blocks_service_creation() {
        let scripted = Arc::new(ScriptedHttpClient::new().on(
            HttpMethod::Get,
            "/catalog/resources",
            HttpResponse::ok_json("[]"),
        ));
        let sdc = SdcClient::new(scripted.clone(), &Settings::default());
        let vf = Vf::new(sdc.clone(), ResourceName::parse("fw").expect("valid"));
        let mut service =
            Service::new(sdc, ResourceName::parse("svc").expect("valid")).with_resource(&vf);

        let error = service.create().await.expect_err("vf not created");

        assert!(matches!(
            error,
            OnapError::Validation(ValidationError::MissingReference { reference: "vf", .. })
        ));
        assert_eq!(service.status(), LifecycleStatus::Uncreated);
        assert_eq!(scripted.mutating_count(), 0);
    }

    #[tokio::test]
    async fn load_reads_archived_flag() {
        let scripted = Arc::new(ScriptedHttpClient::new().on(
            HttpMethod::Get,
            "/services/svc-1/filteredDataByParams",
            HttpResponse::ok_json(
                r#"{"metadata":{"uniqueId":"svc-1","name":"svc","version":"1.0","lifecycleState":"CERTIFIED","archived":true}}"#,
            ),
        ));
        let sdc = SdcClient::new(scripted, &Settings::default());
        let mut service = Service::new(sdc, ResourceName::parse("svc").expect("valid"));
        service
            .remote_mut()
            .set_identity("svc-1", Some(String::from("1.0")));

        assert_eq!(service.load().await.expect("load"), LifecycleStatus::Archived);
    }
}
