use ferronap_core::{
    LifecycleStatus, Onap, OnapError, Onboardable, ResourceName, Service, Vendor, Vf, Vsp,
    VspPackage,
};
use serde_json::{json, Value};

use crate::cli::{OnboardCommand, ServiceArgs, VendorArgs, VfArgs, VspArgs};
use crate::error::CliError;

pub async fn run(command: &OnboardCommand, onap: &Onap) -> Result<Value, CliError> {
    match command {
        OnboardCommand::Vendor(args) => vendor(args, onap).await,
        OnboardCommand::Vsp(args) => vsp(args, onap).await,
        OnboardCommand::Vf(args) => vf(args, onap).await,
        OnboardCommand::Service(args) => service(args, onap).await,
    }
}

async fn vendor(args: &VendorArgs, onap: &Onap) -> Result<Value, CliError> {
    let vendor = Vendor::new(onap.sdc().clone(), ResourceName::parse(&args.name)?);
    drive(vendor).await
}

async fn vsp(args: &VspArgs, onap: &Onap) -> Result<Value, CliError> {
    let vendor = existing(Vendor::new(
        onap.sdc().clone(),
        ResourceName::parse(&args.vendor)?,
    ))
    .await?;
    let file_name = args
        .package
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| CliError::Command(format!("invalid package path {}", args.package.display())))?
        .to_owned();
    let bytes = tokio::fs::read(&args.package).await?;

    let vsp = Vsp::new(onap.sdc().clone(), ResourceName::parse(&args.name)?)
        .with_vendor(&vendor)
        .with_package(VspPackage::new(file_name, bytes));
    drive(vsp).await
}

async fn vf(args: &VfArgs, onap: &Onap) -> Result<Value, CliError> {
    let vendor = existing(Vendor::new(
        onap.sdc().clone(),
        ResourceName::parse(&args.vendor)?,
    ))
    .await?;
    let vsp = existing(
        Vsp::new(onap.sdc().clone(), ResourceName::parse(&args.vsp)?).with_vendor(&vendor),
    )
    .await?;

    let vf = Vf::new(onap.sdc().clone(), ResourceName::parse(&args.name)?).with_vsp(&vsp);
    drive(vf).await
}

async fn service(args: &ServiceArgs, onap: &Onap) -> Result<Value, CliError> {
    let mut service = Service::new(onap.sdc().clone(), ResourceName::parse(&args.name)?);
    for vf_name in &args.vfs {
        let vf = existing(Vf::new(onap.sdc().clone(), ResourceName::parse(vf_name)?)).await?;
        service = service.with_resource(&vf);
    }
    drive(service).await
}

/// Reconcile with the server, then onboard from wherever the resource is.
async fn drive<R: Onboardable>(mut resource: R) -> Result<Value, CliError> {
    let before = ferronap_core::lifecycle::load(&mut resource).await?;
    let executed = ferronap_core::lifecycle::onboard(&mut resource).await?;
    Ok(json!({
        "kind": resource.kind(),
        "name": resource.name(),
        "identifier": resource.remote().identifier(),
        "from": before,
        "status": resource.remote().status(),
        "executed": executed,
    }))
}

/// Load a prerequisite resource, failing if the server does not have it.
async fn existing<R: Onboardable>(mut resource: R) -> Result<R, CliError> {
    let status = ferronap_core::lifecycle::load(&mut resource).await?;
    if status == LifecycleStatus::Uncreated {
        return Err(OnapError::NotFound {
            resource: resource.kind().as_str(),
            name: resource.name().to_string(),
        }
        .into());
    }
    Ok(resource)
}
