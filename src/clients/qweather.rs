//! qweather.rs — free-text weather provider behind JWT bearer auth.
//!
//! Tokens are EdDSA-signed with the project's Ed25519 private key and cached
//! until shortly before expiry. The `iat` claim is backdated 30 seconds to
//! absorb clock skew between us and the API gateway.

use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::normalize::{
    normalize_text_current, normalize_text_day, ForecastDay, TextCurrentPayload, TextDailyPayload,
};
use crate::observation::WeatherObservation;

use super::WeatherProvider;

const TOKEN_TTL_SECS: u64 = 7200;
/// Refresh the cached token this long before it would expire.
const TOKEN_REFRESH_MARGIN_SECS: u64 = 300;

#[derive(Debug, Serialize)]
struct Claims {
    sub: String,
    iat: u64,
    exp: u64,
}

pub struct QWeatherClient {
    client: reqwest::Client,
    api_host: String,
    project_id: String,
    credential_id: String,
    encoding_key: EncodingKey,
    /// (token, expiry unix seconds)
    cached_token: Mutex<Option<(String, u64)>>,
}

#[derive(Debug, Deserialize)]
struct NowResponse {
    code: String,
    now: Option<TextCurrentPayload>,
}

#[derive(Debug, Deserialize)]
struct DailyResponse {
    code: String,
    daily: Option<Vec<TextDailyPayload>>,
}

impl QWeatherClient {
    pub fn new(
        user_agent: &str,
        api_host: &str,
        project_id: &str,
        credential_id: &str,
        private_key_pem: &str,
    ) -> Result<Self> {
        let encoding_key = EncodingKey::from_ed_pem(private_key_pem.as_bytes())
            .context("reading Ed25519 private key")?;
        Ok(Self {
            client: reqwest::Client::builder()
                .user_agent(user_agent.to_string())
                .timeout(std::time::Duration::from_secs(10))
                .build()?,
            api_host: api_host.trim_end_matches('/').to_string(),
            project_id: project_id.to_string(),
            credential_id: credential_id.to_string(),
            encoding_key,
            cached_token: Mutex::new(None),
        })
    }

    fn bearer_token(&self) -> Result<String> {
        let now = chrono::Utc::now().timestamp() as u64;
        let mut cached = self.cached_token.lock().expect("token mutex poisoned");
        if let Some((token, exp)) = cached.as_ref() {
            if now + TOKEN_REFRESH_MARGIN_SECS < *exp {
                return Ok(token.clone());
            }
        }

        let claims = Claims {
            sub: self.project_id.clone(),
            iat: now - 30,
            exp: now + TOKEN_TTL_SECS,
        };
        let mut header = Header::new(Algorithm::EdDSA);
        header.kid = Some(self.credential_id.clone());
        let token = encode(&header, &claims, &self.encoding_key).context("signing API token")?;
        *cached = Some((token.clone(), claims.exp));
        Ok(token)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let token = self.bearer_token()?;
        let url = format!("{}{path}", self.api_host);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .with_context(|| format!("parsing response from {path}"))?;
        Ok(resp)
    }
}

#[async_trait]
impl WeatherProvider for QWeatherClient {
    async fn current(&self, lat: f64, lon: f64) -> Result<WeatherObservation> {
        // The API wants "lon,lat" with at most two decimals.
        let resp: NowResponse = self
            .get_json(&format!("/v7/weather/now?location={lon:.2},{lat:.2}"))
            .await?;
        if resp.code != "200" {
            return Err(anyhow!("weather API returned code {}", resp.code));
        }
        let now = resp.now.ok_or_else(|| anyhow!("weather API response missing now block"))?;
        normalize_text_current(&now).context("normalizing current conditions")
    }

    async fn forecast(&self, lat: f64, lon: f64) -> Result<Vec<ForecastDay>> {
        let resp: DailyResponse = self
            .get_json(&format!("/v7/weather/7d?location={lon:.2},{lat:.2}"))
            .await?;
        if resp.code != "200" {
            return Err(anyhow!("weather API returned code {}", resp.code));
        }
        let daily = resp
            .daily
            .ok_or_else(|| anyhow!("weather API response missing daily block"))?;
        daily
            .iter()
            .map(|d| {
                normalize_text_day(d)
                    .with_context(|| format!("normalizing forecast day {}", d.fx_date))
            })
            .collect()
    }
}
