// Fabric network rules (macOS networksetup)

use serde::{Deserialize, Serialize};

use super::error::{DomainError, Result};

/// Oldest macOS release supported for fabricnet automation (Tahoe 26.2)
pub const MIN_FABRIC_MACOS: (u32, u32) = (26, 2);

/// IPv4 configuration mode of the fabric network service
///
/// - `Manual`: macOS UI "Manually"
/// - `DhcpWithManualAddress`: macOS UI "Using DHCP with Manual Address"
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ipv4Mode {
    #[default]
    Manual,
    DhcpWithManualAddress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MacosVersion {
    pub major: u32,
    pub minor: u32,
}

impl MacosVersion {
    /// Parse `sw_vers -productVersion` output ("26.2", "26.2.1", "27")
    pub fn parse(node: &str, raw: &str) -> Result<Self> {
        let text = raw.trim();
        if text.is_empty() {
            return Err(DomainError::EmptyVersion {
                node: node.to_string(),
            });
        }

        let invalid = || DomainError::InvalidVersion {
            node: node.to_string(),
            raw: text.to_string(),
        };

        let mut parts = text.split('.');
        let major = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(invalid)?;
        let minor = match parts.next() {
            Some(p) => p.parse().map_err(|_| invalid())?,
            None => 0,
        };

        Ok(Self { major, minor })
    }

    pub fn supports_fabricnet(&self) -> bool {
        (self.major, self.minor) >= MIN_FABRIC_MACOS
    }
}

/// Parse and gate the remote macOS version in one step
pub fn require_fabric_support(node: &str, raw: &str) -> Result<MacosVersion> {
    let version = MacosVersion::parse(node, raw)?;
    if !version.supports_fabricnet() {
        return Err(DomainError::UnsupportedVersion {
            node: node.to_string(),
            raw: raw.trim().to_string(),
        });
    }
    Ok(version)
}

/// Service names from `networksetup -listallnetworkservices`
///
/// Disabled services carry a leading `*`; the explanatory header line is dropped.
pub fn parse_network_services(stdout: &str) -> Vec<String> {
    let mut services: Vec<String> = stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.trim_start_matches('*').trim().to_string())
        .collect();

    if services
        .first()
        .is_some_and(|first| first.to_lowercase().starts_with("an asterisk"))
    {
        services.remove(0);
    }
    services
}

/// IPv4 address from `networksetup -getinfo <service>` ("IP address: 169.254.10.1")
pub fn parse_service_ipv4(stdout: &str) -> Option<String> {
    stdout.lines().find_map(|line| {
        let value = line.trim().strip_prefix("IP address:")?.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("none") {
            None
        } else {
            Some(value.to_string())
        }
    })
}

/// Single-quote a value for a POSIX shell
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Command that assigns the fabric address to the named service
pub fn networksetup_command(
    mode: Ipv4Mode,
    service_name: &str,
    address: &str,
    netmask: &str,
    router: &str,
) -> String {
    let router = if router.is_empty() { "0.0.0.0" } else { router };
    let flag = match mode {
        Ipv4Mode::Manual => "-setmanual",
        Ipv4Mode::DhcpWithManualAddress => "-setmanualwithdhcprouter",
    };
    format!(
        "networksetup {} {} {} {} {}",
        flag,
        shell_quote(service_name),
        address,
        netmask,
        router
    )
}

/// Command that reads back the service configuration
pub fn getinfo_command(service_name: &str) -> String {
    format!("networksetup -getinfo {}", shell_quote(service_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parsing() {
        assert_eq!(
            MacosVersion::parse("n", "26.2.1\n").unwrap(),
            MacosVersion { major: 26, minor: 2 }
        );
        assert_eq!(
            MacosVersion::parse("n", "27").unwrap(),
            MacosVersion { major: 27, minor: 0 }
        );
        assert!(matches!(
            MacosVersion::parse("n", "  "),
            Err(DomainError::EmptyVersion { .. })
        ));
        assert!(matches!(
            MacosVersion::parse("n", "Tahoe"),
            Err(DomainError::InvalidVersion { .. })
        ));
    }

    #[test]
    fn test_version_gate() {
        assert!(require_fabric_support("n", "26.2").is_ok());
        assert!(require_fabric_support("n", "27.0").is_ok());
        assert!(matches!(
            require_fabric_support("n", "26.1"),
            Err(DomainError::UnsupportedVersion { .. })
        ));
        assert!(matches!(
            require_fabric_support("n", "15.6.1"),
            Err(DomainError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn test_network_services_parsing() {
        let out = "An asterisk (*) denotes that a network service is disabled.\n\
                   Ethernet\n\
                   *Wi-Fi\n\
                   \n\
                   Thunderbolt Bridge\n";
        assert_eq!(
            parse_network_services(out),
            vec!["Ethernet", "Wi-Fi", "Thunderbolt Bridge"]
        );
        assert!(parse_network_services("").is_empty());
    }

    #[test]
    fn test_service_ipv4_parsing() {
        let out = "Manual Configuration\nIP address: 169.254.10.1\nSubnet mask: 255.255.255.252\n";
        assert_eq!(parse_service_ipv4(out).as_deref(), Some("169.254.10.1"));
        assert_eq!(parse_service_ipv4("IP address: none\n"), None);
        assert_eq!(parse_service_ipv4("DHCP Configuration\n"), None);
    }

    #[test]
    fn test_networksetup_command() {
        assert_eq!(
            networksetup_command(
                Ipv4Mode::Manual,
                "Thunderbolt Bridge",
                "172.16.10.2",
                "255.255.255.252",
                ""
            ),
            "networksetup -setmanual 'Thunderbolt Bridge' 172.16.10.2 255.255.255.252 0.0.0.0"
        );
        assert_eq!(
            networksetup_command(
                Ipv4Mode::DhcpWithManualAddress,
                "TB",
                "169.254.10.1",
                "255.255.0.0",
                "169.254.10.2"
            ),
            "networksetup -setmanualwithdhcprouter 'TB' 169.254.10.1 255.255.0.0 169.254.10.2"
        );
    }

    #[test]
    fn test_shell_quote_escapes_single_quotes() {
        assert_eq!(shell_quote("Bob's Bridge"), r"'Bob'\''s Bridge'");
    }
}
