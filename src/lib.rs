//! Point a browser-automation client at a locally running intercepting proxy.
//!
//! [`ProxyDescriptorBuilder`] turns an explicit [`NetworkEndpoint`] or a
//! [`RunningProxy`] into a manual [`ProxyDescriptor`]. When no address is
//! given, a [`SystemAddressResolver`] guesses which local address other
//! machines can use to reach this host.
//!
//! ```no_run
//! use std::net::TcpListener;
//! use browser_proxy_bridge::{ProxyDescriptorBuilder, NetworkEndpoint};
//!
//! let listener = TcpListener::bind("0.0.0.0:0")?;
//! let builder = ProxyDescriptorBuilder::new();
//!
//! let local = builder.build_for_proxy_at(&listener, "127.0.0.1")?;
//! let lan = builder.build_for_proxy(&listener)?;
//! let fixed = builder.build(&NetworkEndpoint::new("proxy.internal", 3128)?);
//! # let _ = (local, lan, fixed);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod descriptor;
pub mod endpoint;
pub mod error;
pub mod proxy;
pub mod resolver;

#[cfg(test)]
mod resolver_tests;

pub use config::{AddressFamily, ResolverConfig};
pub use descriptor::{
    descriptor_for_proxy, descriptor_for_proxy_at, ProxyDescriptor, ProxyDescriptorBuilder,
    ProxyType,
};
pub use endpoint::{Host, NetworkEndpoint};
pub use error::{Error, ResolutionError, Result};
pub use proxy::{ProxyStatus, RunningProxy};
pub use resolver::{
    resolve_connectable_address, AddressResolver, InterfaceAddress, InterfaceSource, OsInterfaces,
    SystemAddressResolver,
};
