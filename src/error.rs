use std::io;
use std::time::Duration;

/// Errors surfaced by descriptor construction.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The proxy handle was asked for its port before it was started.
    #[error("proxy has not been started; no port is bound")]
    NotStarted,

    #[error("invalid proxy endpoint: {reason}")]
    InvalidEndpoint { reason: String },

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error("HTTP client rejected proxy endpoint: {0}")]
    HttpClient(#[from] reqwest::Error),
}

impl Error {
    pub(crate) fn invalid_endpoint(reason: impl Into<String>) -> Self {
        Error::InvalidEndpoint {
            reason: reason.into(),
        }
    }
}

/// Failure to query the host's network configuration.
#[derive(Debug, thiserror::Error)]
pub enum ResolutionError {
    #[error("network interfaces could not be enumerated: {0}")]
    Enumeration(#[source] local_ip_address::Error),

    #[error("host reported no network interfaces")]
    NoInterfaces,

    #[error("network interface query did not finish within {0:?}")]
    Timeout(Duration),

    #[error("network interface query worker could not be started: {0}")]
    Spawn(#[source] io::Error),

    #[error("network interface query worker exited without a result")]
    WorkerLost,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
