mod basic;
mod client;
mod error;
mod identify;

pub use basic::BasicClient;
pub use client::HttpClient;
pub use error::{FetchError, TransportError};
pub use identify::{DEFAULT_USER_AGENT, Identified};

use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

/// GETs `url` and decodes the JSON body into `T`.
///
/// Resolves to [`FetchError::Cancelled`] as soon as `cancel` fires, whether
/// the request is still in flight or the body is still streaming.
pub async fn fetch_json<C, T>(
    client: &C,
    url: reqwest::Url,
    cancel: &CancellationToken,
) -> Result<T, FetchError>
where
    C: HttpClient + ?Sized,
    T: DeserializeOwned,
{
    if cancel.is_cancelled() {
        return Err(FetchError::Cancelled);
    }

    let call = async {
        let req = reqwest::Request::new(reqwest::Method::GET, url);
        let resp = client.execute(req).await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(TransportError::Status(status).into());
        }

        let body = resp.bytes().await?;
        Ok::<T, FetchError>(serde_json::from_slice(&body)?)
    };

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(FetchError::Cancelled),
        result = call => result,
    }
}
