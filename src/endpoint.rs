use std::fmt;
use std::net::{IpAddr, Ipv6Addr, SocketAddr};
use std::str::FromStr;

use crate::error::{Error, Result};

/// Host part of a proxy endpoint. Names are kept verbatim and never resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Host {
    Ip(IpAddr),
    Name(String),
}

impl Host {
    pub fn is_name(&self) -> bool {
        matches!(self, Host::Name(_))
    }

    fn validate(&self) -> Result<()> {
        match self {
            Host::Ip(_) => Ok(()),
            Host::Name(name) if name.is_empty() => Err(Error::invalid_endpoint("host is empty")),
            Host::Name(name) if name.chars().any(is_malformed_host_char) => {
                Err(Error::invalid_endpoint(format!("host name '{}' is malformed", name)))
            }
            Host::Name(_) => Ok(()),
        }
    }
}

fn is_malformed_host_char(c: char) -> bool {
    c.is_whitespace() || matches!(c, ':' | '/' | '[' | ']')
}

impl From<IpAddr> for Host {
    fn from(ip: IpAddr) -> Self {
        Host::Ip(ip)
    }
}

impl From<&str> for Host {
    fn from(text: &str) -> Self {
        if let Ok(ip) = text.parse::<IpAddr>() {
            return Host::Ip(ip);
        }
        let unbracketed = text
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .and_then(|inner| inner.parse::<Ipv6Addr>().ok());
        match unbracketed {
            Some(v6) => Host::Ip(IpAddr::V6(v6)),
            None => Host::Name(text.to_string()),
        }
    }
}

impl From<String> for Host {
    fn from(text: String) -> Self {
        Host::from(text.as_str())
    }
}

/// IPv6 literals are bracketed so the trailing `:port` stays unambiguous.
impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Host::Ip(IpAddr::V6(v6)) => write!(f, "[{}]", v6),
            Host::Ip(IpAddr::V4(v4)) => write!(f, "{}", v4),
            Host::Name(name) => f.write_str(name),
        }
    }
}

/// A host and port a browser uses to reach the proxy. The host may be an
/// unresolved name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NetworkEndpoint {
    host: Host,
    port: u16,
}

impl NetworkEndpoint {
    pub fn new(host: impl Into<Host>, port: u16) -> Result<Self> {
        let host = host.into();
        host.validate()?;
        if port == 0 {
            return Err(Error::invalid_endpoint("port must be in 1-65535, got 0"));
        }
        Ok(Self { host, port })
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl fmt::Display for NetworkEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl TryFrom<SocketAddr> for NetworkEndpoint {
    type Error = Error;

    fn try_from(addr: SocketAddr) -> Result<Self> {
        Self::new(addr.ip(), addr.port())
    }
}

/// Parses `host:port`, `a.b.c.d:port` or `[v6]:port`. The port is required.
impl FromStr for NetworkEndpoint {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self> {
        let (host, port) = text
            .rsplit_once(':')
            .ok_or_else(|| Error::invalid_endpoint(format!("'{}' has no port", text)))?;

        // An unbracketed v6 literal would have been split inside the address.
        if host.contains(':') && !host.starts_with('[') {
            return Err(Error::invalid_endpoint(format!(
                "IPv6 address in '{}' must be bracketed",
                text
            )));
        }

        // `u32::from_str` would also take a leading '+'.
        if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::invalid_endpoint(format!(
                "port '{}' is not a number",
                port
            )));
        }
        let port = port.parse::<u16>().map_err(|_| {
            Error::invalid_endpoint(format!("port must be in 1-65535, got {}", port))
        })?;

        Self::new(host, port)
    }
}
