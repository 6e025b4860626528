//! reqwest implementation of [`DashboardApi`]

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::api::DashboardApi;
use crate::error::FetchError;
use crate::models::{
    AddTickerRequest, ChartPoint, MarketOverview, SignalEntry, SignupRequest, SignupResponse,
    Tier, VerifyRequest, VerifyResponse, WatchlistItem,
};

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<Value>,
}

/// Human-readable text of an error `detail`: either a plain string or a list of
/// validation errors (`[{"loc": .., "msg": ..}]`), of which the first `msg` is used.
fn detail_message(detail: Value) -> Option<String> {
    match detail {
        Value::String(message) => Some(message),
        Value::Array(errors) => errors.iter().find_map(|error| {
            error
                .get("msg")
                .and_then(Value::as_str)
                .map(str::to_string)
        }),
        _ => None,
    }
}

#[derive(Clone)]
pub struct HttpDashboardApi {
    base_url: Url,
    client: Client,
}

impl HttpDashboardApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(concat!("finsight/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Self::with_client(base_url, client)
    }

    pub fn with_client(base_url: &str, client: Client) -> Result<Self, FetchError> {
        // Joining relative paths drops the last segment unless it ends with '/'
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        Ok(Self {
            base_url: Url::parse(&normalized)?,
            client,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json")
    }

    async fn send(&self, builder: RequestBuilder, url: &Url) -> Result<Response, FetchError> {
        let response = builder.send().await?;
        let status = response.status();
        debug!(url = %url, status = status.as_u16(), "API response");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.detail)
            .and_then(detail_message);

        Err(FetchError::Status {
            status: status.as_u16(),
            url: url.to_string(),
            detail,
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response, url: &Url) -> Result<T, FetchError> {
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| FetchError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
        let response = self.send(self.request(Method::GET, url.clone()), &url).await?;
        Self::decode(response, &url).await
    }

    async fn post_json<B, T>(&self, url: Url, body: &B) -> Result<T, FetchError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let builder = self.request(Method::POST, url.clone()).json(body);
        let response = self.send(builder, &url).await?;
        Self::decode(response, &url).await
    }
}

#[async_trait]
impl DashboardApi for HttpDashboardApi {
    async fn fetch_signals(
        &self,
        plan: Tier,
        limit: usize,
    ) -> Result<Vec<SignalEntry>, FetchError> {
        let mut url = self.endpoint(&["api", "signals"])?;
        url.query_pairs_mut()
            .append_pair("plan", plan.as_str())
            .append_pair("limit", &limit.to_string());

        let entries: Vec<SignalEntry> = self.get_json(url.clone()).await?;
        for entry in &entries {
            entry.validate().map_err(|message| FetchError::Decode {
                url: url.to_string(),
                message,
            })?;
        }
        Ok(entries)
    }

    async fn fetch_watchlist(&self) -> Result<Vec<WatchlistItem>, FetchError> {
        self.get_json(self.endpoint(&["api", "watchlist"])?).await
    }

    async fn add_to_watchlist(&self, ticker: &str, name: &str) -> Result<(), FetchError> {
        let url = self.endpoint(&["api", "watchlist"])?;
        let body = AddTickerRequest {
            ticker: ticker.to_string(),
            name: name.to_string(),
        };
        // The response body is not used; the store reloads afterwards
        self.send(self.request(Method::POST, url.clone()).json(&body), &url)
            .await?;
        Ok(())
    }

    async fn remove_from_watchlist(&self, ticker: &str) -> Result<(), FetchError> {
        let url = self.endpoint(&["api", "watchlist", ticker])?;
        self.send(self.request(Method::DELETE, url.clone()), &url)
            .await?;
        Ok(())
    }

    async fn fetch_market_overview(&self) -> Result<MarketOverview, FetchError> {
        self.get_json(self.endpoint(&["api", "markets", "overview"])?)
            .await
    }

    async fn fetch_chart_data(&self) -> Result<Vec<ChartPoint>, FetchError> {
        self.get_json(self.endpoint(&["api", "chart-data"])?).await
    }

    async fn beta_signup(&self, request: &SignupRequest) -> Result<SignupResponse, FetchError> {
        self.post_json(self.endpoint(&["api", "beta-signup"])?, request)
            .await
    }

    async fn beta_verify(&self, request: &VerifyRequest) -> Result<VerifyResponse, FetchError> {
        self.post_json(self.endpoint(&["api", "beta-verify"])?, request)
            .await
    }
}
