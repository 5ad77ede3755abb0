use log::debug;
use serde::Serialize;

use crate::endpoint::{Host, NetworkEndpoint};
use crate::error::{Error, Result};
use crate::proxy::RunningProxy;
use crate::resolver::{AddressResolver, SystemAddressResolver};

/// How the browser is told to find its proxy. Only explicit assignment is
/// supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProxyType {
    Manual,
}

/// Manual proxy settings for a browser-automation client.
///
/// One proxy serves both schemes, so the HTTP and SSL endpoints are always the
/// same `host:port` string. Serializes to the WebDriver `proxy` capability.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyDescriptor {
    proxy_type: ProxyType,
    http_proxy: String,
    ssl_proxy: String,
}

impl ProxyDescriptor {
    /// Formats `endpoint` as-is. A host name stays a name.
    pub fn manual(endpoint: &NetworkEndpoint) -> Self {
        let proxy = endpoint.to_string();
        Self {
            proxy_type: ProxyType::Manual,
            http_proxy: proxy.clone(),
            ssl_proxy: proxy,
        }
    }

    pub fn proxy_type(&self) -> ProxyType {
        self.proxy_type
    }

    pub fn http_proxy_endpoint(&self) -> &str {
        &self.http_proxy
    }

    pub fn ssl_proxy_endpoint(&self) -> &str {
        &self.ssl_proxy
    }

    /// Proxies for an HTTP client that should route through the same
    /// intercepting proxy as the browser: one for `http`, one for `https`.
    pub fn reqwest_proxies(&self) -> Result<Vec<reqwest::Proxy>> {
        let http = reqwest::Proxy::http(format!("http://{}", self.http_proxy))?;
        let https = reqwest::Proxy::https(format!("http://{}", self.ssl_proxy))?;
        Ok(vec![http, https])
    }
}

/// Builds [`ProxyDescriptor`]s from endpoints or running proxies.
///
/// The resolver is consulted only when a descriptor is built from a running
/// proxy without an explicit address.
#[derive(Debug, Clone, Default)]
pub struct ProxyDescriptorBuilder<R = SystemAddressResolver> {
    resolver: R,
}

impl ProxyDescriptorBuilder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<R: AddressResolver> ProxyDescriptorBuilder<R> {
    pub fn with_resolver(resolver: R) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    pub fn build(&self, endpoint: &NetworkEndpoint) -> ProxyDescriptor {
        let descriptor = ProxyDescriptor::manual(endpoint);
        debug!("manual proxy descriptor for {}", endpoint);
        descriptor
    }

    /// Describes `proxy` at the address the resolver picks for this host.
    pub fn build_for_proxy<P: RunningProxy + ?Sized>(&self, proxy: &P) -> Result<ProxyDescriptor> {
        let port = started_port(proxy)?;
        let address = self.resolver.resolve_connectable_address()?;
        self.build_at(address, port)
    }

    /// Describes `proxy` at `address`. The resolver is not used.
    pub fn build_for_proxy_at<P: RunningProxy + ?Sized>(
        &self,
        proxy: &P,
        address: impl Into<Host>,
    ) -> Result<ProxyDescriptor> {
        let port = started_port(proxy)?;
        self.build_at(address, port)
    }

    fn build_at(&self, host: impl Into<Host>, port: u16) -> Result<ProxyDescriptor> {
        let endpoint = NetworkEndpoint::new(host, port)?;
        Ok(self.build(&endpoint))
    }
}

fn started_port<P: RunningProxy + ?Sized>(proxy: &P) -> Result<u16> {
    if !proxy.is_started() {
        return Err(Error::NotStarted);
    }
    match proxy.port() {
        0 => Err(Error::invalid_endpoint("started proxy reported port 0")),
        port => Ok(port),
    }
}

/// [`ProxyDescriptorBuilder::build_for_proxy`] with the default system resolver.
pub fn descriptor_for_proxy<P: RunningProxy + ?Sized>(proxy: &P) -> Result<ProxyDescriptor> {
    ProxyDescriptorBuilder::new().build_for_proxy(proxy)
}

/// [`ProxyDescriptorBuilder::build_for_proxy_at`] with the default system resolver.
pub fn descriptor_for_proxy_at<P: RunningProxy + ?Sized>(
    proxy: &P,
    address: impl Into<Host>,
) -> Result<ProxyDescriptor> {
    ProxyDescriptorBuilder::new().build_for_proxy_at(proxy, address)
}
