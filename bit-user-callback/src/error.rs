use crate::config::ConfigError;
use crate::discovery::ScanError;
use crate::wol::WolError;
use std::time::Duration;

/// Fatal conditions of a callback run. Each one aborts the run with a
/// non-zero exit status after being logged.
#[derive(Debug, thiserror::Error)]
pub enum CallbackError {
    #[error("failed to read config: {0}")]
    Config(#[from] ConfigError),
    #[error("unexpected number of arguments: want >=3, got {0}")]
    Usage(usize),
    #[error("could not list wireless networks: {0}")]
    PresenceCheckFailed(#[source] ScanError),
    #[error("could not parse {role} {addr:?} as a valid UDP address: {source}")]
    InvalidEndpoint {
        role: &'static str,
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("error attempting to wake {mac}: {source}")]
    WakeSendFailed {
        mac: String,
        #[source]
        source: WolError,
    },
    #[error("could not set up HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
    #[error("timed out waiting for {server} after {elapsed:?}")]
    TimedOut { server: String, elapsed: Duration },
}
