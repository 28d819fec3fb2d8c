use crate::fetch::client::HttpClient;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderValue, InvalidHeaderValue, USER_AGENT};

/// Default identifier sent to the upstream API.
pub const DEFAULT_USER_AGENT: &str = concat!("train-dashboard/", env!("CARGO_PKG_VERSION"));

/// An [`HttpClient`] wrapper that declares `Accept: application/json` and an
/// informative `User-Agent` on every request.
pub struct Identified<C> {
    inner: C,
    user_agent: HeaderValue,
}

impl<C> Identified<C> {
    pub fn new(inner: C, user_agent: &str) -> Result<Self, InvalidHeaderValue> {
        Ok(Self {
            inner,
            user_agent: HeaderValue::from_str(user_agent)?,
        })
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for Identified<C> {
    async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        let headers = req.headers_mut();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, self.user_agent.clone());
        self.inner.execute(req).await
    }
}
