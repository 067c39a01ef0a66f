use ferronap_core::{
    LifecycleStatus, Onap, Onboardable, ResourceName, Service, Vendor, Vf, Vsp,
};
use serde_json::{json, Value};

use crate::cli::{KindArg, StatusArgs};
use crate::error::CliError;

pub async fn run(args: &StatusArgs, onap: &Onap) -> Result<Value, CliError> {
    let name = ResourceName::parse(&args.name)?;
    let sdc = onap.sdc().clone();

    let report = match args.kind {
        KindArg::Vendor => load(Vendor::new(sdc, name)).await?,
        KindArg::Vsp => load(Vsp::new(sdc, name)).await?,
        KindArg::Vf => load(Vf::new(sdc, name)).await?,
        KindArg::Service => load(Service::new(sdc, name)).await?,
    };
    Ok(report)
}

async fn load<R: Onboardable>(mut resource: R) -> Result<Value, CliError> {
    let status: LifecycleStatus = ferronap_core::lifecycle::load(&mut resource).await?;
    Ok(json!({
        "kind": resource.kind(),
        "name": resource.name(),
        "identifier": resource.remote().identifier(),
        "version": resource.remote().version(),
        "status": status,
    }))
}
