use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, SocketAddrV4, SocketAddrV6};
use std::time::Duration;

use serde::{Deserialize, Deserializer};

/// Which address family the resolver favours when both are available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AddressFamily {
    #[default]
    V4,
    V6,
}

impl AddressFamily {
    pub fn matches(self, ip: &IpAddr) -> bool {
        match self {
            AddressFamily::V4 => ip.is_ipv4(),
            AddressFamily::V6 => ip.is_ipv6(),
        }
    }

    pub fn loopback(self) -> IpAddr {
        match self {
            AddressFamily::V4 => IpAddr::V4(Ipv4Addr::LOCALHOST),
            AddressFamily::V6 => IpAddr::V6(Ipv6Addr::LOCALHOST),
        }
    }
}

/// Tuning for connectable-address discovery.
///
/// Every field has a default, so a host application can embed this in its own
/// config file and set only what it needs.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Upper bound for the interface query, in milliseconds. Must be non-zero.
    #[serde(deserialize_with = "non_zero_millis")]
    pub timeout_ms: u64,
    pub preferred_family: AddressFamily,
    /// Drop IPv6 candidates entirely.
    pub ipv4_only: bool,
    /// Interface name prefixes that are never reachable from other machines.
    pub excluded_interface_prefixes: Vec<String>,
    /// Targets used to ask the kernel which source address the default route
    /// would pick. Nothing is sent to them.
    pub route_probe_v4: SocketAddr,
    pub route_probe_v6: SocketAddr,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 2_000,
            preferred_family: AddressFamily::V4,
            ipv4_only: false,
            excluded_interface_prefixes: ["docker", "veth", "br-", "virbr"]
                .iter()
                .map(|prefix| prefix.to_string())
                .collect(),
            // TEST-NET-1 and the IPv6 documentation prefix: routed by any
            // default route, never answered.
            route_probe_v4: SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::new(192, 0, 2, 1), 9)),
            route_probe_v6: SocketAddr::V6(SocketAddrV6::new(
                Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 1),
                9,
                0,
                0,
            )),
        }
    }
}

impl ResolverConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Rounded up to whole milliseconds, at least one.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        let millis = timeout.as_nanos().div_ceil(1_000_000).max(1);
        self.timeout_ms = u64::try_from(millis).unwrap_or(u64::MAX);
        self
    }

    pub fn with_preferred_family(mut self, family: AddressFamily) -> Self {
        self.preferred_family = family;
        self
    }

    pub fn ipv4_only(mut self) -> Self {
        self.ipv4_only = true;
        self.preferred_family = AddressFamily::V4;
        self
    }

    pub fn exclude_interface_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.excluded_interface_prefixes.push(prefix.into());
        self
    }

    pub fn is_excluded_interface(&self, name: &str) -> bool {
        self.excluded_interface_prefixes
            .iter()
            .any(|prefix| name.starts_with(prefix.as_str()))
    }
}

fn non_zero_millis<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let millis = u64::deserialize(deserializer)?;
    if millis == 0 {
        return Err(serde::de::Error::custom("timeout_ms must be greater than zero"));
    }
    Ok(millis)
}
