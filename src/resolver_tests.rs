#[cfg(test)]
mod resolver_tests {
    use std::net::{IpAddr, SocketAddr};
    use std::thread;
    use std::time::Duration;

    use crate::config::{AddressFamily, ResolverConfig};
    use crate::error::ResolutionError;
    use crate::resolver::*;

    // Fake host network configuration
    struct FakeInterfaces {
        addresses: Vec<InterfaceAddress>,
        routes: Vec<IpAddr>,
        delay: Duration,
        broken: bool,
    }

    impl FakeInterfaces {
        fn new(addresses: &[(&str, &str)]) -> Self {
            Self {
                addresses: addresses
                    .iter()
                    .map(|(name, ip)| InterfaceAddress::new(*name, ip.parse().unwrap()))
                    .collect(),
                routes: Vec::new(),
                delay: Duration::ZERO,
                broken: false,
            }
        }

        fn with_route(mut self, ip: &str) -> Self {
            self.routes.push(ip.parse().unwrap());
            self
        }
    }

    impl InterfaceSource for FakeInterfaces {
        fn addresses(&self) -> Result<Vec<InterfaceAddress>, ResolutionError> {
            if !self.delay.is_zero() {
                thread::sleep(self.delay);
            }
            if self.broken {
                return Err(ResolutionError::Enumeration(
                    local_ip_address::Error::LocalIpAddressNotFound,
                ));
            }
            Ok(self.addresses.clone())
        }

        fn default_route_address(&self, probe: SocketAddr) -> Option<IpAddr> {
            self.routes
                .iter()
                .copied()
                .find(|ip| ip.is_ipv4() == probe.is_ipv4())
        }
    }

    fn ip(text: &str) -> IpAddr {
        text.parse().unwrap()
    }

    fn resolve(source: FakeInterfaces, config: ResolverConfig) -> Result<IpAddr, ResolutionError> {
        SystemAddressResolver::with_source(source, config).resolve_connectable_address()
    }

    #[test]
    fn test_loopback_and_link_local_excluded() {
        let source = FakeInterfaces::new(&[
            ("lo", "127.0.0.1"),
            ("lo", "::1"),
            ("eth0", "169.254.10.20"),
            ("eth0", "fe80::1"),
            ("eth1", "192.168.1.5"),
        ]);

        assert_eq!(resolve(source, ResolverConfig::default()).unwrap(), ip("192.168.1.5"));
    }

    #[test]
    fn test_default_route_interface_preferred() {
        let source = FakeInterfaces::new(&[
            ("wlan0", "192.168.1.5"),
            ("eth0", "10.20.30.40"),
        ])
        .with_route("10.20.30.40");

        assert_eq!(resolve(source, ResolverConfig::default()).unwrap(), ip("10.20.30.40"));
    }

    #[test]
    fn test_private_preferred_over_public_without_route() {
        let source = FakeInterfaces::new(&[
            ("eth0", "203.0.113.9"),
            ("eth1", "172.16.4.2"),
        ]);

        assert_eq!(resolve(source, ResolverConfig::default()).unwrap(), ip("172.16.4.2"));
    }

    #[test]
    fn test_container_bridges_excluded() {
        let source = FakeInterfaces::new(&[
            ("docker0", "172.17.0.1"),
            ("br-5f2a", "172.18.0.1"),
            ("eth0", "203.0.113.9"),
        ]);

        assert_eq!(resolve(source, ResolverConfig::default()).unwrap(), ip("203.0.113.9"));
    }

    #[test]
    fn test_family_preference() {
        let addresses = [("eth0", "fd00::5"), ("eth0", "192.168.1.5")];

        let v4 = resolve(FakeInterfaces::new(&addresses), ResolverConfig::default()).unwrap();
        assert_eq!(v4, ip("192.168.1.5"));

        let config = ResolverConfig::default().with_preferred_family(AddressFamily::V6);
        let v6 = resolve(FakeInterfaces::new(&addresses), config).unwrap();
        assert_eq!(v6, ip("fd00::5"));
    }

    #[test]
    fn test_ipv4_only_drops_v6_candidates() {
        let source = FakeInterfaces::new(&[("eth0", "2001:db8::5")]).with_route("2001:db8::5");

        let resolved = resolve(source, ResolverConfig::default().ipv4_only()).unwrap();

        assert_eq!(resolved, ip("127.0.0.1"));
    }

    #[test]
    fn test_loopback_fallback_when_nothing_qualifies() {
        let source = FakeInterfaces::new(&[("lo", "127.0.0.1"), ("lo", "::1")]);
        assert_eq!(resolve(source, ResolverConfig::default()).unwrap(), ip("127.0.0.1"));

        let source = FakeInterfaces::new(&[("lo", "::1")]);
        let config = ResolverConfig::default().with_preferred_family(AddressFamily::V6);
        assert_eq!(resolve(source, config).unwrap(), ip("::1"));
    }

    #[test]
    fn test_no_interfaces_is_an_error() {
        let source = FakeInterfaces::new(&[]);

        assert!(matches!(
            resolve(source, ResolverConfig::default()),
            Err(ResolutionError::NoInterfaces)
        ));
    }

    #[test]
    fn test_enumeration_failure_is_an_error() {
        let mut source = FakeInterfaces::new(&[("eth0", "192.168.1.5")]);
        source.broken = true;

        assert!(matches!(
            resolve(source, ResolverConfig::default()),
            Err(ResolutionError::Enumeration(_))
        ));
    }

    #[test]
    fn test_slow_query_times_out() {
        let mut source = FakeInterfaces::new(&[("eth0", "192.168.1.5")]);
        source.delay = Duration::from_millis(500);
        let config = ResolverConfig::default().with_timeout(Duration::from_millis(20));

        assert!(matches!(
            resolve(source, config),
            Err(ResolutionError::Timeout(_))
        ));
    }

    #[cfg(feature = "tokio")]
    #[tokio::test]
    async fn test_async_resolution() {
        let source = FakeInterfaces::new(&[("lo", "127.0.0.1"), ("eth0", "10.0.0.3")]);
        let resolver = SystemAddressResolver::with_source(source, ResolverConfig::default());

        let resolved = resolver.resolve_connectable_address_async().await.unwrap();
        assert_eq!(resolved, ip("10.0.0.3"));
    }

    #[test]
    fn test_reachability_rules() {
        assert!(!is_externally_reachable(&ip("0.0.0.0")));
        assert!(!is_externally_reachable(&ip("255.255.255.255")));
        assert!(!is_externally_reachable(&ip("224.0.0.1")));
        assert!(!is_externally_reachable(&ip("fe80::abcd")));
        assert!(is_externally_reachable(&ip("10.1.2.3")));
        assert!(is_externally_reachable(&ip("2001:db8::1")));
    }

    #[test]
    fn test_config_from_partial_document() {
        let document = r#"{
            "timeout_ms": 250,
            "preferred_family": "v6",
            "excluded_interface_prefixes": ["tun"]
        }"#;
        let config: ResolverConfig = serde_json::from_str(document).unwrap();

        assert_eq!(config.timeout(), Duration::from_millis(250));
        assert_eq!(config.preferred_family, AddressFamily::V6);
        assert!(config.is_excluded_interface("tun0"));
        assert!(!config.is_excluded_interface("docker0"));
        assert!(!config.ipv4_only);
        assert_eq!(config.route_probe_v4, ResolverConfig::default().route_probe_v4);
    }

    #[test]
    fn test_zero_timeout_rejected_in_config() {
        let result = serde_json::from_str::<ResolverConfig>(r#"{ "timeout_ms": 0 }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_sub_millisecond_timeout_rounds_up() {
        let config = ResolverConfig::default().with_timeout(Duration::from_micros(300));
        assert_eq!(config.timeout(), Duration::from_millis(1));

        let config = ResolverConfig::default().with_timeout(Duration::from_micros(1500));
        assert_eq!(config.timeout(), Duration::from_millis(2));

        let config = ResolverConfig::default().with_timeout(Duration::ZERO);
        assert_eq!(config.timeout(), Duration::from_millis(1));
    }

    #[test]
    fn test_spawn_failure_keeps_cause() {
        use std::error::Error as _;

        let cause = std::io::Error::new(std::io::ErrorKind::WouldBlock, "thread limit");
        let err = ResolutionError::Spawn(cause);

        assert!(err.source().is_some());
        assert!(err.to_string().contains("thread limit"));
    }

    // Live host checks: any machine running the suite has a loopback interface.
    #[test]
    fn test_route_to_loopback_uses_loopback_source() {
        let source = probe_route("127.0.0.1:9".parse().unwrap()).unwrap();
        assert_eq!(source, ip("127.0.0.1"));

        let through_source = OsInterfaces.default_route_address("127.0.0.1:9".parse().unwrap());
        assert_eq!(through_source, Some(ip("127.0.0.1")));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_unroutable_probe_means_no_default_route() {
        // Linux refuses to connect a UDP socket to the broadcast address
        // without SO_BROADCAST.
        let probe: SocketAddr = "255.255.255.255:9".parse().unwrap();

        assert!(probe_route(probe).is_err());
        assert_eq!(OsInterfaces.default_route_address(probe), None);
    }

    #[test]
    fn test_os_interfaces_are_listed() {
        let addresses = OsInterfaces.addresses().unwrap();
        assert!(!addresses.is_empty());
    }

    #[test]
    fn test_live_host_resolution() {
        let resolved = resolve_connectable_address();
        assert!(resolved.is_ok(), "{:?}", resolved);
    }
}
