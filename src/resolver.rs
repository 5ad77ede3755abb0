//! Best-effort discovery of an address other machines can use to reach a
//! proxy listening on this host.
//!
//! The heuristic enumerates interface addresses, drops the ones a remote peer
//! cannot reach (loopback, link-local, multicast, container bridges) and ranks
//! the rest: the address the default route would use first, then the preferred
//! address family, then private before public. With no usable candidate the
//! loopback address is returned, which is right for the common case of a
//! browser on the same machine. Callers that need a specific address should
//! build the endpoint themselves.

use std::io;
use std::net::{IpAddr, Ipv6Addr, SocketAddr};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;

use log::{debug, trace, warn};
use socket2::{Domain, Protocol, SockAddr, Socket, Type};

use crate::config::ResolverConfig;
use crate::error::ResolutionError;

/// Source of a default host address for proxy descriptors.
pub trait AddressResolver {
    fn resolve_connectable_address(&self) -> Result<IpAddr, ResolutionError>;
}

impl<F> AddressResolver for F
where
    F: Fn() -> Result<IpAddr, ResolutionError>,
{
    fn resolve_connectable_address(&self) -> Result<IpAddr, ResolutionError> {
        self()
    }
}

/// One address bound to a named interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceAddress {
    pub name: String,
    pub ip: IpAddr,
}

impl InterfaceAddress {
    pub fn new(name: impl Into<String>, ip: IpAddr) -> Self {
        Self {
            name: name.into(),
            ip,
        }
    }
}

/// Read-only view of the host network configuration.
pub trait InterfaceSource: Send + Sync + 'static {
    fn addresses(&self) -> Result<Vec<InterfaceAddress>, ResolutionError>;

    /// Local address the kernel would use to reach `probe`, if there is a
    /// route to it.
    fn default_route_address(&self, probe: SocketAddr) -> Option<IpAddr>;
}

/// The operating system's interfaces and routing table.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsInterfaces;

impl InterfaceSource for OsInterfaces {
    fn addresses(&self) -> Result<Vec<InterfaceAddress>, ResolutionError> {
        let netifas =
            local_ip_address::list_afinet_netifas().map_err(ResolutionError::Enumeration)?;
        Ok(netifas
            .into_iter()
            .map(|(name, ip)| InterfaceAddress { name, ip })
            .collect())
    }

    fn default_route_address(&self, probe: SocketAddr) -> Option<IpAddr> {
        match probe_route(probe) {
            Ok(ip) => Some(ip),
            Err(e) => {
                trace!("no default route towards {}: {}", probe, e);
                None
            }
        }
    }
}

/// Connecting a UDP socket only selects a route and a source address; no
/// datagram leaves the host.
pub(crate) fn probe_route(target: SocketAddr) -> io::Result<IpAddr> {
    let socket = Socket::new(Domain::for_address(target), Type::DGRAM, Some(Protocol::UDP))?;
    socket.connect(&SockAddr::from(target))?;
    let local = socket.local_addr()?;

    local
        .as_socket()
        .map(|addr| addr.ip())
        .filter(|ip| !ip.is_unspecified())
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                "kernel did not assign a source address",
            )
        })
}

/// Addresses and default-route sources captured in one query.
#[derive(Debug, Clone, Default)]
struct HostSnapshot {
    addresses: Vec<InterfaceAddress>,
    default_routes: Vec<IpAddr>,
}

fn snapshot<S: InterfaceSource + ?Sized>(
    source: &S,
    config: &ResolverConfig,
) -> Result<HostSnapshot, ResolutionError> {
    let addresses = source.addresses()?;
    if addresses.is_empty() {
        return Err(ResolutionError::NoInterfaces);
    }

    let mut default_routes = Vec::new();
    default_routes.extend(source.default_route_address(config.route_probe_v4));
    if !config.ipv4_only {
        default_routes.extend(source.default_route_address(config.route_probe_v6));
    }

    Ok(HostSnapshot {
        addresses,
        default_routes,
    })
}

fn connectable_from<S: InterfaceSource + ?Sized>(
    source: &S,
    config: &ResolverConfig,
) -> Result<IpAddr, ResolutionError> {
    let snapshot = snapshot(source, config)?;
    Ok(select_connectable(&snapshot.addresses, &snapshot.default_routes, config))
}

/// Whether a remote peer could plausibly reach `ip`.
pub fn is_externally_reachable(ip: &IpAddr) -> bool {
    if ip.is_loopback() || ip.is_unspecified() || ip.is_multicast() {
        return false;
    }
    match ip {
        IpAddr::V4(v4) => !v4.is_link_local() && !v4.is_broadcast(),
        IpAddr::V6(v6) => !is_unicast_link_local(v6),
    }
}

fn is_unicast_link_local(v6: &Ipv6Addr) -> bool {
    (v6.segments()[0] & 0xffc0) == 0xfe80
}

fn is_private(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_private(),
        // fc00::/7 unique local
        IpAddr::V6(v6) => (v6.segments()[0] & 0xfe00) == 0xfc00,
    }
}

/// Ranks candidate addresses and returns the best one, or loopback of the
/// preferred family when nothing qualifies.
pub fn select_connectable(
    addresses: &[InterfaceAddress],
    default_routes: &[IpAddr],
    config: &ResolverConfig,
) -> IpAddr {
    let best = addresses
        .iter()
        .enumerate()
        .filter(|(_, candidate)| {
            if config.ipv4_only && candidate.ip.is_ipv6() {
                return false;
            }
            if config.is_excluded_interface(&candidate.name) {
                trace!("skipping {} on excluded interface {}", candidate.ip, candidate.name);
                return false;
            }
            if !is_externally_reachable(&candidate.ip) {
                trace!(
                    "skipping {} on {}: not reachable from other hosts",
                    candidate.ip,
                    candidate.name
                );
                return false;
            }
            true
        })
        .min_by_key(|(index, candidate)| {
            (
                !default_routes.contains(&candidate.ip),
                !config.preferred_family.matches(&candidate.ip),
                !is_private(&candidate.ip),
                *index,
            )
        })
        .map(|(_, candidate)| candidate);

    match best {
        Some(candidate) => {
            debug!(
                "connectable address {} on interface {}",
                candidate.ip, candidate.name
            );
            candidate.ip
        }
        None => {
            let loopback = config.preferred_family.loopback();
            warn!(
                "no externally reachable interface among {} addresses; falling back to {}",
                addresses.len(),
                loopback
            );
            loopback
        }
    }
}

/// Resolver backed by the host's interfaces, bounded by
/// [`ResolverConfig::timeout`].
#[derive(Debug, Clone)]
pub struct SystemAddressResolver<S = OsInterfaces> {
    source: Arc<S>,
    config: ResolverConfig,
}

impl SystemAddressResolver<OsInterfaces> {
    pub fn new() -> Self {
        Self::with_config(ResolverConfig::default())
    }

    pub fn with_config(config: ResolverConfig) -> Self {
        Self::with_source(OsInterfaces, config)
    }
}

impl Default for SystemAddressResolver<OsInterfaces> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: InterfaceSource> SystemAddressResolver<S> {
    pub fn with_source(source: S, config: ResolverConfig) -> Self {
        Self {
            source: Arc::new(source),
            config,
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Async counterpart of [`AddressResolver::resolve_connectable_address`];
    /// the query runs on the blocking pool.
    #[cfg(feature = "tokio")]
    pub async fn resolve_connectable_address_async(&self) -> Result<IpAddr, ResolutionError> {
        let source = Arc::clone(&self.source);
        let config = self.config.clone();
        let timeout = config.timeout();

        let query = tokio::task::spawn_blocking(move || connectable_from(&*source, &config));
        match tokio::time::timeout(timeout, query).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(ResolutionError::WorkerLost),
            Err(_) => Err(ResolutionError::Timeout(timeout)),
        }
    }
}

impl<S: InterfaceSource> AddressResolver for SystemAddressResolver<S> {
    fn resolve_connectable_address(&self) -> Result<IpAddr, ResolutionError> {
        let source = Arc::clone(&self.source);
        let config = self.config.clone();
        let timeout = config.timeout();

        // The worker is left to finish on its own if it overruns the timeout.
        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("connectable-address".to_string())
            .spawn(move || {
                let _ = tx.send(connectable_from(&*source, &config));
            })
            .map_err(ResolutionError::Spawn)?;

        match rx.recv_timeout(timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(ResolutionError::Timeout(timeout)),
            Err(RecvTimeoutError::Disconnected) => Err(ResolutionError::WorkerLost),
        }
    }
}

/// Resolves with the default configuration against the live host.
pub fn resolve_connectable_address() -> Result<IpAddr, ResolutionError> {
    SystemAddressResolver::new().resolve_connectable_address()
}
