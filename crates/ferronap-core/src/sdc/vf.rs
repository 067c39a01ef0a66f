use std::future::Future;
use std::pin::Pin;

use serde_json::json;
use tracing::debug;

use crate::domain::ResourceName;
use crate::error::{OnapError, ValidationError};
use crate::lifecycle::{
    self, LifecycleAction, LifecycleStatus, Onboardable, RemoteSnapshot, RemoteState,
    ResourceKind, StepOutcome,
};
use crate::sdc::catalog::CatalogCalls;
use crate::sdc::{SdcClient, Vsp};

const SEGMENT: &str = "resources";

#[derive(Debug, Clone, PartialEq, Eq)]
struct VspRef {
    name: ResourceName,
    identifier: Option<String>,
    vendor_name: Option<String>,
}

/// Virtual function resource built from a software product.
#[derive(Debug, Clone)]
pub struct Vf {
    client: SdcClient,
    name: ResourceName,
    remote: RemoteState,
    vsp: Option<VspRef>,
}

impl Vf {
    pub fn new(client: SdcClient, name: ResourceName) -> Self {
        Self {
            client,
            name,
            remote: RemoteState::default(),
            vsp: None,
        }
    }

    /// Source software product. One not yet created here is looked up by
    /// name on create.
    pub fn with_vsp(mut self, vsp: &Vsp) -> Self {
        self.vsp = Some(VspRef {
            name: vsp.name().clone(),
            identifier: vsp.identifier().map(str::to_owned),
            vendor_name: vsp.vendor_name().map(str::to_owned),
        });
        self
    }

    pub fn name(&self) -> &ResourceName {
        &self.name
    }

    pub fn identifier(&self) -> Option<&str> {
        self.remote.identifier()
    }

    pub fn version(&self) -> Option<&str> {
        self.remote.version()
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
                resource: "vf",
                name: self.name.to_string(),
            })
    }

    async fn resolve_vsp(&mut self) -> Result<(String, Option<String>), OnapError> {
        let missing = || ValidationError::MissingReference {
            resource: "vf",
            reference: "vsp",
        };
        let vsp = self.vsp.as_mut().ok_or_else(missing)?;
        if vsp.identifier.is_none() {
            let (item, _) = self
                .client
                .find_item("vf.resolve_vsp", "vsp", &vsp.name)
                .await?
                .ok_or_else(missing)?;
            debug!(vsp = %vsp.name, id = %item.id, "vsp resolved by name");
            vsp.identifier = Some(item.id);
        }
        let id = vsp.identifier.clone().ok_or_else(missing)?;
        Ok((id, vsp.vendor_name.clone()))
    }

    async fn create_remote(&mut self) -> Result<(), OnapError> {
        let (vsp_id, vendor_name) = self.resolve_vsp().await?;

        let body = json!({
            "name": self.name.as_str(),
            "description": "VF",
            "componentType": "RESOURCE",
            "resourceType": "VF",
            "contactId": self.client.user_id(),
            "csarUUID": vsp_id,
            "csarVersion": "1.0",
            "vendorName": vendor_name.as_deref().unwrap_or_default(),
            "vendorRelease": "1.0",
            "icon": "defaulticon",
            "tags": [self.name.as_str()],
            "categories": [{
                "name": "Generic",
                "normalizedName": "generic",
                "uniqueId": "resourceNewCategory.generic",
                "subcategories": [{
                    "name": "Abstract",
                    "normalizedName": "abstract",
                    "uniqueId": "resourceNewCategory.generic.abstract",
                }],
            }],
        });
        let created = self.calls().create("vf.create", &body).await?;
        self.remote.set_identity(created.unique_id, created.version);
        Ok(())
    }

    async fn certify_remote(&mut self) -> Result<(), OnapError> {
        let certified = self
            .calls()
            .certify("vf.certify", self.unique_id()?)
            .await?;
        self.remote.set_identity(certified.unique_id, certified.version);
        Ok(())
    }
}

impl Onboardable for Vf {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Vf
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
                    self.calls().archive("vf.archive", self.unique_id()?).await
                }
                other => Err(ValidationError::UnsupportedAction {
                    kind: "vf",
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
            self.calls().details("vf.details", unique_id).await
        })
    }

    fn probe_existence<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<Option<RemoteSnapshot>, OnapError>> + Send + 'a>> {
        Box::pin(async move { self.calls().probe("vf.probe", &self.name).await })
    }
}
