//! Clap derive structures for the `switchsync` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.
//! Only depends on clap so build.rs can include it for man pages.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// switchsync -- keep a switch inventory in sync with the network
#[derive(Debug, Parser)]
#[command(
    name = "switchsync",
    version,
    about = "Sync switch interfaces, MAC and ARP tables into a local inventory",
    long_about = "Collects interface, MAC, ARP and IP data from Cisco IOS, NX-OS and\n\
        Junos switches through a device-automation gateway, reconciles it into a\n\
        local inventory, and pushes interface changes back to the devices.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file to use instead of the platform default
    #[arg(long, env = "SWITCHSYNC_CONFIG_FILE", global = true)]
    pub config_file: Option<PathBuf>,

    /// Inventory file (overrides the config file)
    #[arg(long, short = 'i', env = "SWITCHSYNC_INVENTORY_FILE", global = true)]
    pub inventory: Option<PathBuf>,

    /// Gateway base URL (overrides the config file)
    #[arg(long, short = 'g', env = "SWITCHSYNC_GATEWAY_URL", global = true)]
    pub gateway: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "SWITCHSYNC_OUTPUT_FORMAT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed gateway TLS certificates
    #[arg(long, short = 'k', global = true)]
    pub insecure: bool,

    /// Gateway request timeout in seconds (overrides the config file)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Domain Enums ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PlatformArg {
    /// Cisco IOS / IOS-XE
    Ios,
    /// Cisco NX-OS
    Nxos,
    /// Juniper Junos
    Junos,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PortModeArg {
    Access,
    Trunk,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage inventory devices
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Sync one or more devices into the inventory
    Sync(SyncArgs),

    /// View and change switch interfaces
    #[command(alias = "if")]
    Interfaces(InterfacesArgs),

    /// View a device's MAC address table
    Macs(MacsArgs),

    /// View a device's ARP table
    Arps(ArpsArgs),

    /// View a device's IPv4 interface addresses
    IpInterfaces(IpInterfacesArgs),

    /// Manage device groups
    #[command(alias = "grp")]
    Groups(GroupsArgs),

    /// Run a command or push config on every device in a group
    Run(RunArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

impl Command {
    /// Whether the command opens device sessions through the gateway.
    pub fn needs_sessions(&self) -> bool {
        match self {
            Self::Sync(_) | Self::Run(_) => true,
            Self::Devices(args) => matches!(args.command, DevicesCommand::Sync { .. }),
            Self::Interfaces(args) => matches!(args.command, InterfacesCommand::Set { .. }),
            _ => false,
        }
    }
}

// ── Devices ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List inventory devices
    #[command(alias = "ls")]
    List {
        /// Only devices in this group
        #[arg(long)]
        group: Option<String>,
    },

    /// Show one device (hostname or id)
    Get { device: String },

    /// Add a device to the inventory
    Add {
        hostname: String,

        /// Management address (IP or DNS name)
        #[arg(long, short = 'a')]
        address: String,

        #[arg(long, short = 'P', value_enum)]
        platform: PlatformArg,

        /// Hardware model; selects the Junos vocabulary (EX vs others)
        #[arg(long)]
        model: Option<String>,

        /// Management port, if not the platform default
        #[arg(long)]
        port: Option<u16>,

        /// Named credential from the config file
        #[arg(long)]
        credential: Option<String>,

        /// Group membership (repeatable)
        #[arg(long = "group")]
        groups: Vec<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        device_type: Option<String>,
    },

    /// Update a device's connection details or labels
    Update {
        device: String,

        #[arg(long, short = 'a')]
        address: Option<String>,

        #[arg(long, short = 'P', value_enum)]
        platform: Option<PlatformArg>,

        #[arg(long)]
        model: Option<String>,

        #[arg(long)]
        port: Option<u16>,

        #[arg(long)]
        credential: Option<String>,

        /// Replace group membership (repeatable)
        #[arg(long = "group")]
        groups: Option<Vec<String>>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        device_type: Option<String>,
    },

    /// Remove a device and everything collected from it
    #[command(alias = "rm")]
    Remove { device: String },

    /// Sync one device now
    Sync { device: String },
}

// ── Sync ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SyncArgs {
    /// Devices to sync (hostname or id)
    #[arg(required_unless_present = "all", conflicts_with = "all")]
    pub devices: Vec<String>,

    /// Sync every device in the inventory
    #[arg(long)]
    pub all: bool,

    /// Keep re-syncing every N seconds until interrupted (requires --all)
    #[arg(long, requires = "all", value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: Option<u64>,
}

// ── Interfaces ───────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct InterfacesArgs {
    #[command(subcommand)]
    pub command: InterfacesCommand,
}

#[derive(Debug, Subcommand)]
pub enum InterfacesCommand {
    /// List a device's interfaces
    #[command(alias = "ls")]
    List {
        device: String,

        /// Only interfaces whose link is up
        #[arg(long)]
        up: bool,
    },

    /// Show one interface
    Get { device: String, port: String },

    /// Change an interface's mode, VLANs and description on the device
    Set {
        device: String,

        /// Port name; abbreviations like Gi1/0/1 are expanded
        port: String,

        #[arg(long, short = 'm', value_enum)]
        mode: PortModeArg,

        /// Access VLAN (access mode)
        #[arg(long)]
        vlan: Option<u16>,

        /// Native VLAN (trunk mode)
        #[arg(long)]
        native_vlan: Option<u16>,

        /// Allowed VLANs, comma separated (trunk mode)
        #[arg(long, value_delimiter = ',')]
        allowed_vlans: Vec<u16>,

        /// Interface description; omit to keep the current one, "" clears it
        #[arg(long, short = 'd')]
        description: Option<String>,
    },
}

// ── Forwarding tables ────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct MacsArgs {
    #[command(subcommand)]
    pub command: MacsCommand,
}

#[derive(Debug, Subcommand)]
pub enum MacsCommand {
    /// List MAC table entries learned on a device
    #[command(alias = "ls")]
    List {
        device: String,

        /// Only entries in this VLAN
        #[arg(long)]
        vlan: Option<i64>,

        /// Only entries learned on this interface
        #[arg(long)]
        interface: Option<String>,
    },
}

#[derive(Debug, Args)]
pub struct ArpsArgs {
    #[command(subcommand)]
    pub command: ArpsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ArpsCommand {
    /// List ARP entries seen by a device
    #[command(alias = "ls")]
    List { device: String },
}

#[derive(Debug, Args)]
pub struct IpInterfacesArgs {
    #[command(subcommand)]
    pub command: IpInterfacesCommand,
}

#[derive(Debug, Subcommand)]
pub enum IpInterfacesCommand {
    /// List interfaces with IPv4 addresses
    #[command(alias = "ls")]
    List { device: String },
}

// ── Groups ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GroupsArgs {
    #[command(subcommand)]
    pub command: GroupsCommand,
}

#[derive(Debug, Subcommand)]
pub enum GroupsCommand {
    /// List groups
    #[command(alias = "ls")]
    List,

    /// Create a group
    Add {
        name: String,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        site: Option<String>,
    },

    /// Delete a group; member devices stay in the inventory
    #[command(alias = "rm")]
    Remove { name: String },
}

// ── Run ──────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Target group
    #[arg(long, short = 'G')]
    pub group: String,

    /// Treat the arguments as configuration lines (committed where needed)
    #[arg(long)]
    pub config: bool,

    /// Command text, or config lines with --config
    #[arg(required = true, num_args = 1..)]
    pub commands: Vec<String>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive configuration wizard
    Init,

    /// Show the effective configuration (secrets redacted)
    Show,

    /// Print the config file path
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn set_description(args: &[&str]) -> Option<String> {
        let base = ["switchsync", "interfaces", "set", "sw1", "Eth1/1", "-m", "access"];
        let cli = Cli::try_parse_from(base.iter().chain(args).copied()).unwrap();
        match cli.command {
            Command::Interfaces(InterfacesArgs {
                command: InterfacesCommand::Set { description, .. },
            }) => description,
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn set_without_description_leaves_it_unspecified() {
        assert_eq!(set_description(&[]), None);
        assert_eq!(set_description(&["-d", ""]), Some(String::new()));
        assert_eq!(set_description(&["--description", "uplink"]), Some("uplink".into()));
    }
}
