//! Local interface/address inventory, for report context.
//!
//! Tries `ip` first, falls back to `ifconfig`. IPv4 only; loopback is
//! skipped.

use super::ProbeError;
use std::time::Duration;

const TOOL_TIMEOUT: Duration = Duration::from_secs(5);

pub async fn local_addresses() -> Result<Vec<String>, ProbeError> {
    let candidates = [
        (
            "ip",
            vec![
                "-o".to_string(),
                "-4".to_string(),
                "addr".to_string(),
                "show".to_string(),
            ],
        ),
        ("ifconfig", vec![]),
    ];

    let output = super::run_first_available(&candidates, TOOL_TIMEOUT).await?;

    let addrs = match output.tool.as_str() {
        "ip" => parse_ip_output(&output.stdout),
        _ => parse_ifconfig_output(&output.stdout),
    };

    if addrs.is_empty() {
        return Err(ProbeError::NoResponse(format!(
            "no addresses parsed from {} output",
            output.tool
        )));
    }
    Ok(addrs)
}

/// `ip -o -4 addr show`: "2: eth0    inet 192.168.1.5/24 brd ..."
fn parse_ip_output(output: &str) -> Vec<String> {
    let mut addrs = Vec::new();
    for line in output.lines() {
        let mut tokens = line.split_whitespace();
        while let Some(tok) = tokens.next() {
            if tok == "inet" {
                if let Some(cidr) = tokens.next() {
                    let addr = cidr.split('/').next().unwrap_or(cidr);
                    if !addr.starts_with("127.") {
                        addrs.push(addr.to_string());
                    }
                }
                break;
            }
        }
    }
    addrs
}

/// ifconfig: "inet 192.168.1.5 netmask ..." or the older
/// "inet addr:192.168.1.5" spelling.
fn parse_ifconfig_output(output: &str) -> Vec<String> {
    let mut addrs = Vec::new();
    for line in output.lines() {
        let line = line.trim();
        let Some(rest) = line.strip_prefix("inet ") else {
            continue;
        };
        let Some(token) = rest.split_whitespace().next() else {
            continue;
        };
        let addr = token.strip_prefix("addr:").unwrap_or(token);
        if addr.parse::<std::net::Ipv4Addr>().is_ok() && !addr.starts_with("127.") {
            addrs.push(addr.to_string());
        }
    }
    addrs
}
