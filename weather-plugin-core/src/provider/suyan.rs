use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument, warn};

use crate::model::RawWeather;

use super::{FetchError, WeatherSource};

const ENDPOINT: &str = "https://api.suyanw.cn/api/xztq.php";
const CITY_PARAM: &str = "msg";
const TIMEOUT: Duration = Duration::from_secs(10);

/// Where and how long to ask. The defaults are the only production values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetcherConfig {
    pub endpoint: String,
    pub city_param: String,
    pub timeout: Duration,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            endpoint: ENDPOINT.to_string(),
            city_param: CITY_PARAM.to_string(),
            timeout: TIMEOUT,
        }
    }
}

/// Client for the suyanw.cn plain-text weather endpoint.
#[derive(Debug, Clone)]
pub struct SuyanClient {
    config: FetcherConfig,
    http: Client,
}

impl SuyanClient {
    pub fn new(config: FetcherConfig) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| FetchError::Unknown(e.to_string()))?;

        Ok(Self { config, http })
    }

    pub fn with_defaults() -> Result<Self, FetchError> {
        Self::new(FetcherConfig::default())
    }

    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    async fn get(&self, city: &str) -> Result<RawWeather, FetchError> {
        debug!(endpoint = %self.config.endpoint, "requesting weather text");
        let res = self
            .http
            .get(&self.config.endpoint)
            .query(&[(self.config.city_param.as_str(), city)])
            .send()
            .await?;

        let status = res.status();
        if status != StatusCode::OK {
            return Err(FetchError::from_status(status.as_u16()));
        }

        let body = res.text().await?;
        debug!(bytes = body.len(), "received weather text");

        Ok(RawWeather { body, status: status.as_u16() })
    }
}

#[async_trait]
impl WeatherSource for SuyanClient {
    #[instrument(skip(self))]
    async fn fetch(&self, city: &str) -> Result<RawWeather, FetchError> {
        let result = self.get(city).await;
        if let Err(err) = &result {
            warn!(status = ?err.status_code(), error = %err, "weather fetch failed");
        }
        result
    }
}
