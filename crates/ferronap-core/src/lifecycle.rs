//! # Resource Lifecycle Driver
//!
//! Design-time resources move through an ordered set of statuses on the
//! service design side:
//!
//! ```text
//! UNCREATED ─create→ DRAFT ─upload_package→ UPLOADED ─validate→ VALIDATED
//!           ─commit→ COMMITTED ─submit/certify→ CERTIFIED ─archive→ ARCHIVED
//! ```
//!
//! Each [`ResourceKind`] walks its own subset of that sequence, given by an
//! explicit transition table (current status, action, next status):
//!
//! | Kind | Onboarding path |
//! |------|-----------------|
//! | Vendor | create, submit |
//! | Vsp | create, upload_package, validate, commit, submit |
//! | Vf, Service | create, certify |
//!
//! `archive` (CERTIFIED → ARCHIVED) is available to every kind but is never
//! taken by [`onboard`].
//!
//! ## Rules
//!
//! - [`step`] runs an action only from its exact predecessor status and then
//!   advances the local status by one. From any other status it issues no
//!   request and logs a warning, so re-running a sequence is harmless.
//! - [`onboard`] chains the next legal step until CERTIFIED, resuming from
//!   whatever status the resource is in. It stops with
//!   [`OnapError::Stalled`] after as many steps as the path is long.
//! - [`load`] is the only way the local status moves backwards: it asks the
//!   server for item details and falls back to an existence probe by name.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::domain::ResourceName;
use crate::error::{OnapError, ValidationError};

/// Authoritative lifecycle status of a design-time resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleStatus {
    #[default]
    Uncreated,
    Draft,
    Uploaded,
    Validated,
    Committed,
    Certified,
    Archived,
}

impl LifecycleStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Uncreated => "UNCREATED",
            Self::Draft => "DRAFT",
            Self::Uploaded => "UPLOADED",
            Self::Validated => "VALIDATED",
            Self::Committed => "COMMITTED",
            Self::Certified => "CERTIFIED",
            Self::Archived => "ARCHIVED",
        }
    }

    /// Position in the status order; ARCHIVED sorts after CERTIFIED.
    pub const fn rank(self) -> u8 {
        match self {
            Self::Uncreated => 0,
            Self::Draft => 1,
            Self::Uploaded => 2,
            Self::Validated => 3,
            Self::Committed => 4,
            Self::Certified => 5,
            Self::Archived => 6,
        }
    }

    /// Whether onboarding has nothing left to do.
    pub const fn is_terminal(self) -> bool {
        self.rank() >= Self::Certified.rank()
    }
}

impl Display for LifecycleStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Remote action that moves a resource one status forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleAction {
    Create,
    UploadPackage,
    Validate,
    Commit,
    Submit,
    Certify,
    Archive,
}

impl LifecycleAction {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::UploadPackage => "upload_package",
            Self::Validate => "validate",
            Self::Commit => "commit",
            Self::Submit => "submit",
            Self::Certify => "certify",
            Self::Archive => "archive",
        }
    }
}

impl Display for LifecycleAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of a transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: LifecycleStatus,
    pub action: LifecycleAction,
    pub to: LifecycleStatus,
}

impl Transition {
    const fn new(from: LifecycleStatus, action: LifecycleAction, to: LifecycleStatus) -> Self {
        Self { from, action, to }
    }

    /// Whether the transition can run from `status`, and why not otherwise.
    pub fn check(self, status: LifecycleStatus) -> Result<(), SkipReason> {
        if status == self.from {
            Ok(())
        } else if status == LifecycleStatus::Uncreated {
            Err(SkipReason::NotCreated)
        } else if status.rank() >= self.to.rank() {
            Err(SkipReason::AlreadyReached)
        } else {
            Err(SkipReason::OutOfOrder)
        }
    }
}

use LifecycleAction as A;
use LifecycleStatus as S;

const VENDOR_PATH: [Transition; 2] = [
    Transition::new(S::Uncreated, A::Create, S::Draft),
    Transition::new(S::Draft, A::Submit, S::Certified),
];

const VSP_PATH: [Transition; 5] = [
    Transition::new(S::Uncreated, A::Create, S::Draft),
    Transition::new(S::Draft, A::UploadPackage, S::Uploaded),
    Transition::new(S::Uploaded, A::Validate, S::Validated),
    Transition::new(S::Validated, A::Commit, S::Committed),
    Transition::new(S::Committed, A::Submit, S::Certified),
];

const CATALOG_PATH: [Transition; 2] = [
    Transition::new(S::Uncreated, A::Create, S::Draft),
    Transition::new(S::Draft, A::Certify, S::Certified),
];

const ARCHIVE: Transition = Transition::new(S::Certified, A::Archive, S::Archived);

/// Kind of onboardable resource, selecting its transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Vendor,
    Vsp,
    Vf,
    Service,
}

impl ResourceKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Vendor => "vendor",
            Self::Vsp => "vsp",
            Self::Vf => "vf",
            Self::Service => "service",
        }
    }

    /// Transitions `onboard` takes, in order.
    pub const fn onboarding_path(self) -> &'static [Transition] {
        match self {
            Self::Vendor => &VENDOR_PATH,
            Self::Vsp => &VSP_PATH,
            Self::Vf | Self::Service => &CATALOG_PATH,
        }
    }

    pub fn transition_for(self, action: LifecycleAction) -> Option<Transition> {
        if action == LifecycleAction::Archive {
            return Some(ARCHIVE);
        }
        self.onboarding_path()
            .iter()
            .copied()
            .find(|transition| transition.action == action)
    }

    /// The onboarding transition leaving `status`, if `status` is on the path.
    pub fn next_transition(self, status: LifecycleStatus) -> Option<Transition> {
        self.onboarding_path()
            .iter()
            .copied()
            .find(|transition| transition.from == status)
    }
}

impl Display for ResourceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Remote identity and status of a resource as last observed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RemoteState {
    identifier: Option<String>,
    version: Option<String>,
    status: LifecycleStatus,
}

impl RemoteState {
    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub const fn status(&self) -> LifecycleStatus {
        self.status
    }

    pub(crate) fn set_identity(&mut self, identifier: impl Into<String>, version: Option<String>) {
        self.identifier = Some(identifier.into());
        self.version = version;
    }

    pub(crate) fn set_status(&mut self, status: LifecycleStatus) {
        self.status = status;
    }

    fn observe(&mut self, snapshot: RemoteSnapshot) {
        self.identifier = Some(snapshot.identifier);
        self.version = snapshot.version;
        self.status = snapshot.status;
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// What the server reports about a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSnapshot {
    pub identifier: String,
    pub version: Option<String>,
    pub status: LifecycleStatus,
}

/// Why [`step`] issued no request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The resource does not exist remotely yet.
    NotCreated,
    /// The resource is already at or past the action's target status.
    AlreadyReached,
    /// The action's predecessor status has not been reached.
    OutOfOrder,
}

impl SkipReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotCreated => "resource not created",
            Self::AlreadyReached => "target status already reached",
            Self::OutOfOrder => "predecessor status not reached",
        }
    }
}

impl Display for SkipReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Advanced {
        from: LifecycleStatus,
        to: LifecycleStatus,
    },
    Skipped(SkipReason),
}

impl StepOutcome {
    pub const fn is_advanced(self) -> bool {
        matches!(self, Self::Advanced { .. })
    }
}

/// Contract between the driver and a concrete resource.
///
/// Implementors own the remote calls; the driver owns the status.
pub trait Onboardable: Send {
    fn kind(&self) -> ResourceKind;

    fn name(&self) -> &ResourceName;

    fn remote(&self) -> &RemoteState;

    fn remote_mut(&mut self) -> &mut RemoteState;

    /// Issue the remote call(s) behind `action`.
    ///
    /// Called only when the action is legal from the current status. Must
    /// record any identifier or version the server assigns, and must not
    /// touch the status.
    fn perform<'a>(
        &'a mut self,
        action: LifecycleAction,
    ) -> Pin<Box<dyn Future<Output = Result<(), OnapError>> + Send + 'a>>;

    /// Item details for the current identifier; `None` if the server has no
    /// such item.
    fn fetch_details<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<Option<RemoteSnapshot>, OnapError>> + Send + 'a>>;

    /// Look the resource up by name.
    fn probe_existence<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<Option<RemoteSnapshot>, OnapError>> + Send + 'a>>;
}

/// Run `action` if it is legal from the resource's current status.
///
/// # Errors
///
/// Returns [`ValidationError::UnsupportedAction`] if the kind has no such
/// action, or the error of the failed remote call. The status is unchanged
/// on error.
pub async fn step<R>(resource: &mut R, action: LifecycleAction) -> Result<StepOutcome, OnapError>
where
    R: Onboardable + ?Sized,
{
    let kind = resource.kind();
    let transition = kind
        .transition_for(action)
        .ok_or(ValidationError::UnsupportedAction {
            kind: kind.as_str(),
            action: action.as_str(),
        })?;
    let from = resource.remote().status();

    if let Err(reason) = transition.check(from) {
        warn!(
            kind = %kind,
            name = %resource.name(),
            action = %action,
            status = %from,
            reason = %reason,
            "skipping lifecycle action"
        );
        return Ok(StepOutcome::Skipped(reason));
    }

    resource.perform(action).await?;
    resource.remote_mut().set_status(transition.to);
    info!(
        kind = %kind,
        name = %resource.name(),
        action = %action,
        from = %from,
        to = %transition.to,
        "lifecycle action completed"
    );

    Ok(StepOutcome::Advanced {
        from,
        to: transition.to,
    })
}

/// Drive the resource to CERTIFIED, returning the actions executed.
///
/// A resource already CERTIFIED (or ARCHIVED) issues no request.
pub async fn onboard<R>(resource: &mut R) -> Result<Vec<LifecycleAction>, OnapError>
where
    R: Onboardable + ?Sized,
{
    let kind = resource.kind();
    let max_steps = kind.onboarding_path().len();
    let mut executed = Vec::with_capacity(max_steps);

    loop {
        let status = resource.remote().status();
        if status.is_terminal() {
            return Ok(executed);
        }

        let next = kind
            .next_transition(status)
            .filter(|_| executed.len() < max_steps);
        let Some(transition) = next else {
            return Err(stalled(resource, status));
        };

        match step(resource, transition.action).await? {
            StepOutcome::Advanced { .. } => executed.push(transition.action),
            StepOutcome::Skipped(_) => return Err(stalled(resource, status)),
        }
    }
}

/// Reconcile the local status with the server and return it.
///
/// Without a local identifier, or when the server no longer knows the
/// identifier, the resource is looked up by name. Not finding it resets the
/// resource to UNCREATED.
pub async fn load<R>(resource: &mut R) -> Result<LifecycleStatus, OnapError>
where
    R: Onboardable + ?Sized,
{
    let before = resource.remote().status();

    let details = if resource.remote().identifier().is_some() {
        resource.fetch_details().await?
    } else {
        None
    };
    let snapshot = match details {
        Some(snapshot) => Some(snapshot),
        None => {
            debug!(
                kind = %resource.kind(),
                name = %resource.name(),
                "no item details; probing by name"
            );
            resource.probe_existence().await?
        }
    };

    match snapshot {
        Some(snapshot) => resource.remote_mut().observe(snapshot),
        None => resource.remote_mut().reset(),
    }

    let after = resource.remote().status();
    if after != before {
        info!(
            kind = %resource.kind(),
            name = %resource.name(),
            from = %before,
            to = %after,
            "status reconciled with server"
        );
    }
    Ok(after)
}

fn stalled<R: Onboardable + ?Sized>(resource: &R, status: LifecycleStatus) -> OnapError {
    OnapError::Stalled {
        kind: resource.kind().as_str(),
        name: resource.name().to_string(),
        status: status.as_str(),
    }
}
