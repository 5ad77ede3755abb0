use std::net::TcpListener;

/// A proxy server this crate can describe. Only its bound port and whether it
/// has been started are read; its lifecycle belongs to the caller.
pub trait RunningProxy {
    fn is_started(&self) -> bool;

    /// Bound port. Only meaningful once [`is_started`](Self::is_started) is true.
    fn port(&self) -> u16;
}

impl<P: RunningProxy + ?Sized> RunningProxy for &P {
    fn is_started(&self) -> bool {
        (**self).is_started()
    }

    fn port(&self) -> u16 {
        (**self).port()
    }
}

/// Status of a proxy that runs somewhere this process does not own, such as
/// another process whose port is read from its config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProxyStatus {
    port: Option<u16>,
}

impl ProxyStatus {
    pub fn started(port: u16) -> Self {
        Self { port: Some(port) }
    }

    pub fn stopped() -> Self {
        Self { port: None }
    }
}

impl RunningProxy for ProxyStatus {
    fn is_started(&self) -> bool {
        self.port.is_some()
    }

    fn port(&self) -> u16 {
        self.port.unwrap_or(0)
    }
}

/// A bound listener is a started proxy.
impl RunningProxy for TcpListener {
    fn is_started(&self) -> bool {
        self.local_addr().is_ok()
    }

    fn port(&self) -> u16 {
        self.local_addr().map(|addr| addr.port()).unwrap_or(0)
    }
}

#[cfg(feature = "tokio")]
impl RunningProxy for tokio::net::TcpListener {
    fn is_started(&self) -> bool {
        self.local_addr().is_ok()
    }

    fn port(&self) -> u16 {
        self.local_addr().map(|addr| addr.port()).unwrap_or(0)
    }
}
