// ── Dialect table ──
//
// Static strategy table keyed by platform family and, for Junos, by model
// family. Each entry carries everything vendor-specific the parser and the
// command generator need. Adding a dialect means adding one entry here.

use crate::command::requests::InterfaceChangeRequest;
use crate::command::{junos_lines, switchport_lines};
use crate::error::CommandGenError;
use crate::model::Platform;
use crate::normalize::{
    ARP_TABLE_GETTER, FACTS_GETTER, INTERFACES_IP_GETTER, MAC_TABLE_GETTER,
};

/// Getters every dialect runs during a sync.
const BASE_GETTERS: &[&str] = &[
    FACTS_GETTER,
    MAC_TABLE_GETTER,
    ARP_TABLE_GETTER,
    INTERFACES_IP_GETTER,
];

/// Getter that supplies interface up/down state where the CLI can't.
pub const INTERFACES_GETTER: &str = "get_interfaces";

/// Generates the ordered config lines for one interface change.
pub type GenerateFn =
    fn(&DialectSpec, &str, &InterfaceChangeRequest) -> Result<Vec<String>, CommandGenError>;

/// CLI dialect of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    CiscoIos,
    CiscoNxos,
    /// Junos with `port-mode` switching vocabulary (EX family).
    JunosPortMode,
    /// Junos with `interface-mode` switching vocabulary.
    JunosInterfaceMode,
}

/// How interface stanzas are laid out in running-config text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StanzaShape {
    /// `interface <name>` header followed by body lines indented by
    /// exactly `indent` spaces.
    Indented { indent: usize },
    /// Junos curly-brace hierarchy, one top-level block per interface.
    Braced,
}

/// Configuration vocabulary of a dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vocabulary {
    /// Cisco `switchport mode` / `switchport trunk` statements.
    Switchport,
    /// Junos `ethernet-switching` statements.
    Junos {
        /// `port-mode` or `interface-mode`.
        mode_keyword: &'static str,
        /// Path under `set interfaces <port>` holding the native VLAN id.
        native_vlan_path: &'static str,
    },
}

/// One row of the dialect table.
pub struct DialectSpec {
    pub dialect: Dialect,
    pub platform: Platform,
    /// Tabular status listing. `None` where the CLI has no usable one.
    pub status_command: Option<&'static str>,
    pub running_config_command: &'static str,
    pub stanza: StanzaShape,
    pub vocabulary: Vocabulary,
    /// Short prefix -> canonical long prefix.
    pub abbreviations: &'static [(&'static str, &'static str)],
    pub generate: GenerateFn,
    /// Config changes only take effect after an explicit commit.
    pub requires_commit: bool,
    /// Operational status comes from `get_interfaces` rather than CLI text.
    pub status_from_getter: bool,
}

const NXOS_ABBREVIATIONS: &[(&str, &str)] = &[
    ("Eth", "Ethernet"),
    ("Po", "port-channel"),
    ("Lo", "loopback"),
];

const IOS_ABBREVIATIONS: &[(&str, &str)] = &[
    ("Gi", "GigabitEthernet"),
    ("Te", "TenGigabitEthernet"),
    ("Fa", "FastEthernet"),
    ("Tw", "TwoGigabitEthernet"),
    ("Twe", "TwentyFiveGigE"),
    ("Fo", "FortyGigabitEthernet"),
    ("Hu", "HundredGigE"),
    ("Po", "Port-channel"),
    ("Vl", "Vlan"),
    ("Lo", "Loopback"),
];

static DIALECTS: [DialectSpec; 4] = [
    DialectSpec {
        dialect: Dialect::CiscoIos,
        platform: Platform::Ios,
        status_command: Some("show interfaces status"),
        running_config_command: "show running-config | section interface",
        stanza: StanzaShape::Indented { indent: 1 },
        vocabulary: Vocabulary::Switchport,
        abbreviations: IOS_ABBREVIATIONS,
        generate: switchport_lines,
        requires_commit: false,
        status_from_getter: false,
    },
    DialectSpec {
        dialect: Dialect::CiscoNxos,
        platform: Platform::Nxos,
        status_command: Some("show interface status"),
        running_config_command: "show running-config interface",
        stanza: StanzaShape::Indented { indent: 2 },
        vocabulary: Vocabulary::Switchport,
        abbreviations: NXOS_ABBREVIATIONS,
        generate: switchport_lines,
        requires_commit: false,
        status_from_getter: false,
    },
    DialectSpec {
        dialect: Dialect::JunosPortMode,
        platform: Platform::Junos,
        status_command: None,
        running_config_command: "show configuration interfaces",
        stanza: StanzaShape::Braced,
        vocabulary: Vocabulary::Junos {
            mode_keyword: "port-mode",
            native_vlan_path: "unit 0 family ethernet-switching native-vlan-id",
        },
        abbreviations: &[],
        generate: junos_lines,
        requires_commit: true,
        status_from_getter: true,
    },
    DialectSpec {
        dialect: Dialect::JunosInterfaceMode,
        platform: Platform::Junos,
        status_command: None,
        running_config_command: "show configuration interfaces",
        stanza: StanzaShape::Braced,
        vocabulary: Vocabulary::Junos {
            mode_keyword: "interface-mode",
            native_vlan_path: "native-vlan-id",
        },
        abbreviations: &[],
        generate: junos_lines,
        requires_commit: true,
        status_from_getter: true,
    },
];

impl Dialect {
    /// Pick the dialect for a platform and (optional) hardware model.
    ///
    /// Junos EX models use the `port-mode` vocabulary; every other Junos
    /// model, including an unknown one, uses `interface-mode`.
    pub fn resolve(platform: Platform, model: Option<&str>) -> Self {
        match platform {
            Platform::Ios => Self::CiscoIos,
            Platform::Nxos => Self::CiscoNxos,
            Platform::Junos => {
                let is_ex = model.is_some_and(|m| m.trim().to_ascii_uppercase().starts_with("EX"));
                if is_ex {
                    Self::JunosPortMode
                } else {
                    Self::JunosInterfaceMode
                }
            }
        }
    }

    /// The table entry for this dialect.
    pub fn spec(self) -> &'static DialectSpec {
        let idx = match self {
            Self::CiscoIos => 0,
            Self::CiscoNxos => 1,
            Self::JunosPortMode => 2,
            Self::JunosInterfaceMode => 3,
        };
        &DIALECTS[idx]
    }
}

impl std::fmt::Debug for DialectSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialectSpec")
            .field("dialect", &self.dialect)
            .field("platform", &self.platform)
            .field("stanza", &self.stanza)
            .field("requires_commit", &self.requires_commit)
            .finish_non_exhaustive()
    }
}

impl DialectSpec {
    /// Getters to request during a sync.
    pub fn getters(&self) -> Vec<String> {
        let mut getters: Vec<String> = BASE_GETTERS.iter().map(|g| (*g).to_owned()).collect();
        if self.status_from_getter {
            getters.push(INTERFACES_GETTER.to_owned());
        }
        getters
    }

    /// CLI commands to capture during a sync, status table first.
    pub fn commands(&self) -> Vec<String> {
        self.status_command
            .into_iter()
            .chain(std::iter::once(self.running_config_command))
            .map(str::to_owned)
            .collect()
    }

    /// Expand a vendor short port prefix to its canonical long form.
    ///
    /// Only expands when the abbreviation is followed directly by a digit,
    /// so already-canonical names pass through untouched.
    pub fn normalize_port(&self, name: &str) -> String {
        let name = name.trim();
        for (short, long) in self.abbreviations {
            if let Some(rest) = name.strip_prefix(short) {
                if rest.starts_with(|c: char| c.is_ascii_digit()) {
                    return format!("{long}{rest}");
                }
            }
        }
        name.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_entries_match_their_keys() {
        for dialect in [
            Dialect::CiscoIos,
            Dialect::CiscoNxos,
            Dialect::JunosPortMode,
            Dialect::JunosInterfaceMode,
        ] {
            assert_eq!(dialect.spec().dialect, dialect);
        }
    }

    #[test]
    fn junos_model_family_selects_vocabulary() {
        assert_eq!(
            Dialect::resolve(Platform::Junos, Some("EX2200-48T-4G")),
            Dialect::JunosPortMode
        );
        assert_eq!(
            Dialect::resolve(Platform::Junos, Some("qfx5100-48s")),
            Dialect::JunosInterfaceMode
        );
        assert_eq!(
            Dialect::resolve(Platform::Junos, None),
            Dialect::JunosInterfaceMode
        );
        assert_eq!(
            Dialect::resolve(Platform::Nxos, Some("EX-looking-model")),
            Dialect::CiscoNxos
        );
    }

    #[test]
    fn nxos_expands_eth_prefix() {
        let spec = Dialect::CiscoNxos.spec();
        assert_eq!(spec.normalize_port("Eth1/1"), "Ethernet1/1");
        assert_eq!(spec.normalize_port("Ethernet1/1"), "Ethernet1/1");
        assert_eq!(spec.normalize_port("Po10"), "port-channel10");
        assert_eq!(spec.normalize_port("mgmt0"), "mgmt0");
    }

    #[test]
    fn ios_distinguishes_tw_and_twe() {
        let spec = Dialect::CiscoIos.spec();
        assert_eq!(spec.normalize_port("Gi1/0/1"), "GigabitEthernet1/0/1");
        assert_eq!(spec.normalize_port("Tw1/0/2"), "TwoGigabitEthernet1/0/2");
        assert_eq!(spec.normalize_port("Twe1/0/3"), "TwentyFiveGigE1/0/3");
        assert_eq!(spec.normalize_port("Te1/1/1"), "TenGigabitEthernet1/1/1");
    }

    #[test]
    fn junos_fetches_interface_getter_and_has_no_status_table() {
        let spec = Dialect::JunosPortMode.spec();
        assert!(spec.getters().iter().any(|g| g == INTERFACES_GETTER));
        assert_eq!(spec.commands(), vec!["show configuration interfaces"]);
        assert!(spec.requires_commit);

        let nxos = Dialect::CiscoNxos.spec();
        assert!(!nxos.getters().iter().any(|g| g == INTERFACES_GETTER));
        assert_eq!(nxos.commands().len(), 2);
    }
}
