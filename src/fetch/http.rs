// src/fetch/http.rs

use reqwest::{
    blocking::{Client, ClientBuilder, Response},
    header::{HeaderMap, HeaderValue, REFERER, USER_AGENT},
};
use tracing::debug;
use url::Url;

use crate::config::Config;
use crate::error::{FetchError, Result};

/// Blocking client carrying the run's timeout and browser-like user agent.
pub fn build_client(config: &Config) -> anyhow::Result<Client> {
    Ok(client_builder(config)?.build()?)
}

pub(crate) fn client_builder(config: &Config) -> anyhow::Result<ClientBuilder> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_str(&config.user_agent)?);

    Ok(Client::builder()
        .default_headers(headers)
        .timeout(config.timeout))
}

/// Single GET; no retry. Non-2xx responses become [`FetchError::Status`].
/// The body is decoded to text using the response charset.
pub fn get_text(client: &Client, url: &Url, referer: Option<&Url>) -> Result<String> {
    send(client, url, referer)?
        .text()
        .map_err(|source| http_error(url, source))
}

/// Like [`get_text`], but hands back the body exactly as received.
pub fn get_bytes(client: &Client, url: &Url, referer: Option<&Url>) -> Result<Vec<u8>> {
    let body = send(client, url, referer)?
        .bytes()
        .map_err(|source| http_error(url, source))?;
    Ok(body.to_vec())
}

fn send(client: &Client, url: &Url, referer: Option<&Url>) -> Result<Response> {
    debug!(%url, "GET");
    let mut request = client.get(url.clone());
    if let Some(referer) = referer {
        request = request.header(REFERER, referer.as_str());
    }

    let response = request.send().map_err(|source| http_error(url, source))?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status,
        });
    }
    Ok(response)
}

fn http_error(url: &Url, source: reqwest::Error) -> FetchError {
    FetchError::Http {
        url: url.to_string(),
        source,
    }
}
