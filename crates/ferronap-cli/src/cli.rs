//! CLI argument definitions for ferronap.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `settings` | Print the effective settings, credentials redacted |
//! | `onboard` | Drive a vendor, VSP, VF or service to CERTIFIED |
//! | `status` | Reconcile a resource with the server and print its status |
//! | `topics` | List message router topics or consume one for a while |
//!
//! # Examples
//!
//! ```bash
//! ferronap onboard vendor --name "vFW vendor"
//! ferronap onboard vsp --name "vFW vsp" --vendor "vFW vendor" --package vfw.zip
//! ferronap status vsp --name "vFW vsp" --pretty
//! ferronap topics consume --topic unauthenticated.SEC_FAULT_OUTPUT --seconds 10
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Command-line client for an ONAP platform.
#[derive(Debug, Parser)]
#[command(name = "ferronap", author, version, about = "ONAP platform client")]
pub struct Cli {
    /// JSON settings file; overrides FERRONAP_SETTINGS.
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    /// Pretty-print JSON output.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Log requests and responses at debug level.
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the effective settings.
    Settings,
    /// Onboard a design-time resource.
    #[command(subcommand)]
    Onboard(OnboardCommand),
    /// Show the server-side status of a resource.
    Status(StatusArgs),
    /// Message router topics.
    #[command(subcommand)]
    Topics(TopicsCommand),
}

#[derive(Debug, Subcommand)]
pub enum OnboardCommand {
    Vendor(VendorArgs),
    Vsp(VspArgs),
    Vf(VfArgs),
    Service(ServiceArgs),
}

#[derive(Debug, Args)]
pub struct VendorArgs {
    #[arg(long)]
    pub name: String,
}

#[derive(Debug, Args)]
pub struct VspArgs {
    #[arg(long)]
    pub name: String,
    /// Owning vendor; must already exist.
    #[arg(long)]
    pub vendor: String,
    /// Onboarding package (zip or CSAR).
    #[arg(long)]
    pub package: PathBuf,
}

#[derive(Debug, Args)]
pub struct VfArgs {
    #[arg(long)]
    pub name: String,
    /// Source software product; must already exist.
    #[arg(long)]
    pub vsp: String,
    /// Vendor of the software product.
    #[arg(long)]
    pub vendor: String,
}

#[derive(Debug, Args)]
pub struct ServiceArgs {
    #[arg(long)]
    pub name: String,
    /// VF to instantiate in the service; repeatable.
    #[arg(long = "vf")]
    pub vfs: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Vendor,
    Vsp,
    Vf,
    Service,
}

#[derive(Debug, Args)]
pub struct StatusArgs {
    #[arg(value_enum)]
    pub kind: KindArg,
    #[arg(long)]
    pub name: String,
}

#[derive(Debug, Subcommand)]
pub enum TopicsCommand {
    /// List topics.
    List,
    /// Consume a topic for a fixed time and print the messages.
    Consume(ConsumeArgs),
}

#[derive(Debug, Args)]
pub struct ConsumeArgs {
    #[arg(long)]
    pub topic: String,
    #[arg(long, default_value = "ferronap")]
    pub group: String,
    #[arg(long, default_value = "cli")]
    pub consumer_id: String,
    #[arg(long, default_value_t = 10)]
    pub seconds: u64,
}
