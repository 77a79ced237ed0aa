//! Group command handlers.

use std::sync::Arc;

use serde::Serialize;
use tabled::Tabled;

use switchsync_core::{AddGroupRequest, Group};

use crate::cli::{GlobalOpts, GroupsArgs, GroupsCommand};
use crate::config::Context;
use crate::error::CliError;
use crate::output;

use super::util;

/// A group plus its current member count.
#[derive(Serialize)]
struct GroupView {
    #[serde(flatten)]
    group: Arc<Group>,
    members: usize,
}

#[derive(Tabled)]
struct GroupRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Site")]
    site: String,
    #[tabled(rename = "Devices")]
    members: usize,
    #[tabled(rename = "Description")]
    description: String,
}

impl From<&GroupView> for GroupRow {
    fn from(v: &GroupView) -> Self {
        Self {
            name: v.group.name.clone(),
            site: util::or_dash(v.group.site.as_deref()).to_owned(),
            members: v.members,
            description: v.group.description.clone().unwrap_or_default(),
        }
    }
}

fn detail(g: &Group) -> String {
    [
        format!("ID:          {}", g.id),
        format!("Name:        {}", g.name),
        format!("Site:        {}", util::or_dash(g.site.as_deref())),
        format!("Description: {}", util::or_dash(g.description.as_deref())),
    ]
    .join("\n")
}

pub fn handle(ctx: &Context, args: GroupsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        GroupsCommand::List => {
            let devices = ctx.engine.devices();
            let views: Vec<GroupView> = ctx
                .engine
                .groups()
                .iter()
                .map(|g| GroupView {
                    group: Arc::clone(g),
                    members: devices.iter().filter(|d| d.in_group(&g.name)).count(),
                })
                .collect();
            let out = output::render_list(
                &global.output,
                &views,
                |v| GroupRow::from(v),
                |v| v.group.name.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        GroupsCommand::Add {
            name,
            description,
            site,
        } => {
            let group = ctx.engine.add_group(AddGroupRequest {
                name,
                description,
                site,
            })?;
            ctx.save()?;
            let out = output::render_single(&global.output, &group, detail, |g| g.name.clone());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        GroupsCommand::Remove { name } => {
            let prompt = format!("Remove group {name}? Member devices are kept.");
            if !util::confirm(&prompt, global.yes)? {
                return Ok(());
            }
            ctx.engine.remove_group(&name)?;
            ctx.save()?;
            if !global.quiet {
                eprintln!("Removed group {name}");
            }
            Ok(())
        }
    }
}
