//! Controller notifier.
//!
//! Pushes a species' setpoints to the incubator controller with a single
//! HTTP GET:
//!
//! ```text
//! GET http://{address}/config?dias=21&temp_min=37.5&temp_max=38&umid_min=55&umid_max=65
//! ```
//!
//! A push is one attempt. There is no retry and no acknowledgement beyond the
//! HTTP status; the caller only learns whether it worked.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use incubator_types::Species;

/// Default controller address on the local network.
pub const DEFAULT_ADDRESS: &str = "192.168.1.125";

/// Default bound on a single push.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Setpoints sent to the controller, taken from a species.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ControllerConfig {
    #[serde(rename = "dias")]
    pub duration_days: u32,
    pub temp_min: f32,
    pub temp_max: f32,
    #[serde(rename = "umid_min")]
    pub humidity_min: f32,
    #[serde(rename = "umid_max")]
    pub humidity_max: f32,
}

impl From<&Species> for ControllerConfig {
    fn from(species: &Species) -> Self {
        Self {
            duration_days: species.incubation_days,
            temp_min: species.temp_min,
            temp_max: species.temp_max,
            humidity_min: species.humidity_min,
            humidity_max: species.humidity_max,
        }
    }
}

/// Why a push did not succeed.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PushError {
    /// The controller could not be reached.
    #[error("Controller not reachable at {address}: {source}")]
    Unreachable {
        address: String,
        #[source]
        source: reqwest::Error,
    },

    /// The controller did not answer in time.
    #[error("Controller at {address} did not answer within {timeout:?}")]
    Timeout { address: String, timeout: Duration },

    /// The controller answered with something other than 200.
    #[error("Controller rejected the configuration with HTTP {status}")]
    Rejected { status: u16 },
}

/// Sends setpoints to a controller.
///
/// Implemented by [`HttpNotifier`] for real hardware and by
/// [`MockNotifier`](crate::mock::MockNotifier) for tests.
#[async_trait]
pub trait DeviceNotifier: Send + Sync {
    /// Push `config` once. Returns `true` only if the controller accepted it.
    async fn push_config(&self, config: &ControllerConfig) -> bool;
}

/// Notifier that talks to the controller over HTTP.
#[derive(Debug, Clone)]
pub struct HttpNotifier {
    client: Client,
    address: String,
    timeout: Duration,
}

impl HttpNotifier {
    /// Create a notifier for the controller at `address` (host or host:port).
    pub fn new(address: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(address, timeout, client))
    }

    /// Create a notifier with a custom reqwest Client.
    pub fn with_client(address: impl Into<String>, timeout: Duration, client: Client) -> Self {
        let address = address.into();
        let address = address
            .trim()
            .trim_start_matches("http://")
            .trim_end_matches('/')
            .to_string();
        Self {
            client,
            address,
            timeout,
        }
    }

    /// The controller address this notifier targets.
    pub fn address(&self) -> &str {
        &self.address
    }

    fn url(&self) -> String {
        format!("http://{}/config", self.address)
    }

    /// Push `config` once and report exactly what went wrong.
    pub async fn try_push(&self, config: &ControllerConfig) -> Result<(), PushError> {
        let url = self.url();
        debug!("GET {} {:?}", url, config);

        let response = self
            .client
            .get(&url)
            .query(config)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PushError::Timeout {
                        address: self.address.clone(),
                        timeout: self.timeout,
                    }
                } else {
                    PushError::Unreachable {
                        address: self.address.clone(),
                        source: e,
                    }
                }
            })?;

        let status = response.status();
        if status == StatusCode::OK {
            Ok(())
        } else {
            Err(PushError::Rejected {
                status: status.as_u16(),
            })
        }
    }
}

#[async_trait]
impl DeviceNotifier for HttpNotifier {
    async fn push_config(&self, config: &ControllerConfig) -> bool {
        match self.try_push(config).await {
            Ok(()) => {
                info!("Controller at {} accepted the configuration", self.address);
                true
            }
            Err(e) => {
                warn!("Configuration push failed: {}", e);
                false
            }
        }
    }
}
