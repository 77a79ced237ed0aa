//! Command dispatch: bridges CLI args -> engine calls -> output formatting.

pub mod config_cmd;
pub mod devices;
pub mod groups;
pub mod interfaces;
pub mod run;
pub mod sync;
pub mod tables;
pub mod util;

use crate::cli::{Command, GlobalOpts};
use crate::config::Context;
use crate::error::CliError;

/// Dispatch an inventory-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Devices(args) => devices::handle(ctx, args, global).await,
        Command::Sync(args) => sync::handle(ctx, args, global).await,
        Command::Interfaces(args) => interfaces::handle(ctx, args, global).await,
        Command::Macs(args) => tables::macs(ctx, args, global),
        Command::Arps(args) => tables::arps(ctx, args, global),
        Command::IpInterfaces(args) => tables::ip_interfaces(ctx, args, global),
        Command::Groups(args) => groups::handle(ctx, args, global),
        Command::Run(args) => run::handle(ctx, args, global).await,
        // Handled before an inventory is opened
        Command::Config(_) | Command::Completions(_) => Err(CliError::Validation {
            field: "command".into(),
            reason: "not an inventory command".into(),
        }),
    }
}
