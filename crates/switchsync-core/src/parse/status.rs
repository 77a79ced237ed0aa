// ── Interface status table ──
//
// Rows look like
//   Eth1/1   srv-web   connected  10  full  1000  10Gbase-SR
// where the description may hold any number of words. The status keyword
// anchors the row: everything before it (after the port) is description,
// everything after it is positional.

use crate::dialect::DialectSpec;
use crate::model::LinkStatus;

use super::{ParseReport, PartialInterfaceRecord};

/// Known status keywords, in match priority order.
const STATUS_KEYWORDS: &[(&str, LinkStatus)] = &[
    ("connected", LinkStatus::Up),
    ("notconnect", LinkStatus::Down),
    ("notconnec", LinkStatus::Down),
    ("disabled", LinkStatus::Down),
    ("xcvrAbsen", LinkStatus::Down),
    ("err-disabled", LinkStatus::Down),
    ("sfpAbsent", LinkStatus::Down),
    ("suspnd", LinkStatus::Down),
    ("inactive", LinkStatus::Down),
    ("monitoring", LinkStatus::Up),
    ("down", LinkStatus::Down),
];

/// A row is an interface row only if some token carries one of these.
const DUPLEX_MARKERS: &[&str] = &["full", "half", "auto"];

/// Parse an interface-status listing, one line per element.
///
/// Rows without a duplex token (headers, separators, footers) are skipped.
/// Rows with no recognized status keyword are reported as errors.
pub fn parse_status_table<S: AsRef<str>>(lines: &[S], spec: &DialectSpec) -> ParseReport {
    let mut report = ParseReport::default();

    for (idx, raw) in lines.iter().enumerate() {
        let line = raw.as_ref();
        let tokens: Vec<&str> = line.split_whitespace().collect();

        let is_interface_row = tokens
            .iter()
            .any(|t| DUPLEX_MARKERS.iter().any(|m| t.contains(m)));
        if !is_interface_row {
            continue;
        }

        match parse_row(&tokens, spec) {
            Ok(record) => report.records.push(record),
            Err(reason) => report.error(idx + 1, line, reason),
        }
    }

    report
}

fn parse_row(tokens: &[&str], spec: &DialectSpec) -> Result<PartialInterfaceRecord, &'static str> {
    let Some((port, after_port)) = tokens.split_first() else {
        return Err("empty row");
    };

    let (status_pos, keyword, status) = STATUS_KEYWORDS
        .iter()
        .find_map(|(kw, st)| {
            after_port
                .iter()
                .position(|t| t == kw)
                .map(|pos| (pos, *kw, *st))
        })
        .ok_or("unexpected interface status")?;

    let description = after_port[..status_pos].join(" ");
    let [vlan, duplex, speed, media @ ..] = &after_port[status_pos + 1..] else {
        return Err("row ends before vlan/duplex/speed columns");
    };

    let (duplex, speed) = if status.is_up() {
        (normalize_duplex(duplex), normalize_speed(speed))
    } else {
        ("n/a".to_owned(), "n/a".to_owned())
    };

    let transceiver = if media.is_empty() {
        "n/a".to_owned()
    } else {
        media.join(" ")
    };

    Ok(PartialInterfaceRecord {
        port: spec.normalize_port(port),
        description: Some(description),
        status: Some(status),
        status_raw: Some(keyword.to_owned()),
        vlan: Some((*vlan).to_owned()),
        duplex: Some(duplex),
        speed: Some(speed),
        transceiver: Some(transceiver),
        ..PartialInterfaceRecord::default()
    })
}

fn normalize_duplex(raw: &str) -> String {
    if raw.contains("full") {
        "full".into()
    } else if raw.contains("half") {
        "half".into()
    } else {
        "auto".into()
    }
}

/// `1000` / `a-1000` -> `1 Gbps`, `10G` -> `10 Gbps`, `100` -> `100 Mbps`.
/// Anything unrecognized is kept verbatim.
fn normalize_speed(raw: &str) -> String {
    let bare = raw.trim_start_matches("a-");
    if let Some(gig) = bare.strip_suffix(['G', 'g']) {
        if gig.parse::<u32>().is_ok() {
            return format!("{gig} Gbps");
        }
    }
    match bare.parse::<u32>() {
        Ok(mbps) if mbps >= 1000 && mbps % 1000 == 0 => format!("{} Gbps", mbps / 1000),
        Ok(mbps) => format!("{mbps} Mbps"),
        Err(_) => bare.to_owned(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;
    use crate::model::LinkStatus;
    use pretty_assertions::assert_eq;

    const NXOS_STATUS: &str = "\
--------------------------------------------------------------------------------
Port          Name               Status    Vlan      Duplex  Speed   Type
--------------------------------------------------------------------------------
Eth1/1        srv-web            connected 10        full    1000    10Gbase-SR
Eth1/2        uplink to core sw  connected trunk     full    10G     QSFP-40G-SR BD
Eth1/3        --                 notconnec 1         auto    auto    --
Eth1/4        spare              xcvrAbsen 1         auto    auto
mgmt0         --                 connected routed    full    1000    --
";

    fn nxos_lines() -> Vec<&'static str> {
        NXOS_STATUS.lines().collect()
    }

    #[test]
    fn parses_nxos_table_and_skips_headers() {
        let report = parse_status_table(&nxos_lines(), Dialect::CiscoNxos.spec());
        assert!(report.errors.is_empty(), "{:?}", report.errors);
        let ports: Vec<&str> = report.records.iter().map(|r| r.port.as_str()).collect();
        assert_eq!(
            ports,
            vec!["Ethernet1/1", "Ethernet1/2", "Ethernet1/3", "Ethernet1/4", "mgmt0"]
        );
    }

    #[test]
    fn description_is_tokens_between_port_and_status() {
        let report = parse_status_table(&nxos_lines(), Dialect::CiscoNxos.spec());
        let descriptions: Vec<&str> = report
            .records
            .iter()
            .map(|r| r.description.as_deref().unwrap())
            .collect();
        assert_eq!(
            descriptions,
            vec!["srv-web", "uplink to core sw", "--", "spare", "--"]
        );
    }

    #[test]
    fn up_row_fields() {
        let report = parse_status_table(&nxos_lines(), Dialect::CiscoNxos.spec());
        let eth1 = &report.records[0];
        assert_eq!(eth1.status, Some(LinkStatus::Up));
        assert_eq!(eth1.status_raw.as_deref(), Some("connected"));
        assert_eq!(eth1.vlan.as_deref(), Some("10"));
        assert_eq!(eth1.duplex.as_deref(), Some("full"));
        assert_eq!(eth1.speed.as_deref(), Some("1 Gbps"));
        assert_eq!(eth1.transceiver.as_deref(), Some("10Gbase-SR"));

        let eth2 = &report.records[1];
        assert_eq!(eth2.speed.as_deref(), Some("10 Gbps"));
        assert_eq!(eth2.transceiver.as_deref(), Some("QSFP-40G-SR BD"));
    }

    #[test]
    fn down_rows_report_na_duplex_and_speed() {
        let report = parse_status_table(&nxos_lines(), Dialect::CiscoNxos.spec());
        let eth3 = &report.records[2];
        assert_eq!(eth3.status, Some(LinkStatus::Down));
        assert_eq!(eth3.duplex.as_deref(), Some("n/a"));
        assert_eq!(eth3.speed.as_deref(), Some("n/a"));

        let eth4 = &report.records[3];
        assert_eq!(eth4.status_raw.as_deref(), Some("xcvrAbsen"));
        assert_eq!(eth4.transceiver.as_deref(), Some("n/a"));
    }

    #[test]
    fn row_without_duplex_token_is_skipped() {
        let lines = ["Eth1/9   parked   connected  10", "Port Name Status Vlan"];
        let report = parse_status_table(&lines, Dialect::CiscoNxos.spec());
        assert!(report.records.is_empty());
        assert!(report.errors.is_empty());

        // Same input twice: still nothing.
        let again = parse_status_table(&lines, Dialect::CiscoNxos.spec());
        assert_eq!(report, again);
    }

    #[test]
    fn unknown_status_is_reported_and_row_skipped() {
        let lines = [
            "Eth1/1   a   connected  10  full  1000  --",
            "Eth1/2   b   flapping   10  full  1000  --",
            "Eth1/3   c   notconnect 1   auto  auto  --",
        ];
        let report = parse_status_table(&lines, Dialect::CiscoNxos.spec());
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].line, 2);
        assert_eq!(report.errors[0].reason, "unexpected interface status");
    }

    #[test]
    fn truncated_row_is_an_error() {
        let lines = ["Eth1/1   fullname-server   connected"];
        let report = parse_status_table(&lines, Dialect::CiscoNxos.spec());
        assert!(report.records.is_empty());
        assert_eq!(report.errors.len(), 1);
    }

    #[test]
    fn ios_auto_negotiated_columns() {
        let lines = [
            "Port      Name               Status       Vlan       Duplex  Speed Type",
            "Gi1/0/1   access point 3     connected    20         a-full  a-1000 10/100/1000BaseTX",
            "Gi1/0/2                      notconnect   1            auto   auto 10/100/1000BaseTX",
        ];
        let report = parse_status_table(&lines, Dialect::CiscoIos.spec());
        assert!(report.errors.is_empty());
        let gi1 = &report.records[0];
        assert_eq!(gi1.port, "GigabitEthernet1/0/1");
        assert_eq!(gi1.description.as_deref(), Some("access point 3"));
        assert_eq!(gi1.duplex.as_deref(), Some("full"));
        assert_eq!(gi1.speed.as_deref(), Some("1 Gbps"));

        let gi2 = &report.records[1];
        assert_eq!(gi2.description.as_deref(), Some(""));
        assert_eq!(gi2.status, Some(LinkStatus::Down));
    }

    #[test]
    fn speed_normalization() {
        assert_eq!(normalize_speed("10"), "10 Mbps");
        assert_eq!(normalize_speed("a-100"), "100 Mbps");
        assert_eq!(normalize_speed("10000"), "10 Gbps");
        assert_eq!(normalize_speed("25G"), "25 Gbps");
        assert_eq!(normalize_speed("auto"), "auto");
    }
}
