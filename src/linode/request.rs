// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Low-level HTTP plumbing for the Linode API.
//!
//! Every call is issued exactly once. Retries belong to the caller, which
//! re-runs the whole reconciliation instead.

use super::types::{ApiErrorBody, Page};
use super::LinodeError;
use crate::constants::{LINODE_FILTER_HEADER, LINODE_LIST_PAGE_SIZE};
use reqwest::{Client as HttpClient, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error};

/// Build the API base URL from a configured endpoint.
///
/// Converts "api.linode.com" or "https://api.linode.com/" to
/// `<https://api.linode.com>`. Endpoints without a scheme default to https.
pub(crate) fn build_api_url(endpoint: &str) -> String {
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        endpoint.trim_end_matches('/').to_string()
    } else {
        format!("https://{}", endpoint.trim_end_matches('/'))
    }
}

/// Execute a single request against the Linode API and return the raw body.
///
/// # Arguments
/// * `client` - HTTP client
/// * `token` - Personal access token sent as a bearer token
/// * `method` - HTTP method
/// * `url` - Full URL of the endpoint
/// * `filter` - Optional `X-Filter` JSON document
/// * `body` - Optional JSON body
///
/// # Errors
///
/// Returns `LinodeError::Transport` if the request cannot be sent and
/// `LinodeError::Api` for any non-2xx status.
pub(crate) async fn linode_request<B: Serialize + ?Sized>(
    client: &HttpClient,
    token: &str,
    method: Method,
    url: &str,
    filter: Option<&str>,
    body: Option<&B>,
) -> Result<String, LinodeError> {
    // Bodies may carry TLS private keys, so only the request line is logged.
    debug!(method = %method, url = %url, filter = ?filter, "Linode API request");

    let mut request = client.request(method.clone(), url).bearer_auth(token);
    if let Some(filter) = filter {
        request = request.header(LINODE_FILTER_HEADER, filter);
    }
    if let Some(body) = body {
        request = request.json(body);
    }

    let response = request
        .send()
        .await
        .map_err(|source| LinodeError::Transport {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|source| LinodeError::Transport {
            url: url.to_string(),
            source,
        })?;

    if !status.is_success() {
        let message = serde_json::from_str::<ApiErrorBody>(&text)
            .map(|parsed| parsed.message())
            .ok()
            .filter(|m| !m.is_empty())
            .unwrap_or(text);
        error!(
            method = %method,
            url = %url,
            status = %status,
            error = %message,
            "Linode API request failed"
        );
        return Err(LinodeError::Api {
            status: status.as_u16(),
            method: method.to_string(),
            url: url.to_string(),
            message,
        });
    }

    debug!(
        method = %method,
        url = %url,
        status = %status,
        response_len = text.len(),
        "Linode API request successful"
    );

    Ok(text)
}

/// Decode a JSON response body.
pub(crate) fn decode<T: DeserializeOwned>(url: &str, text: &str) -> Result<T, LinodeError> {
    serde_json::from_str(text).map_err(|source| LinodeError::Decode {
        url: url.to_string(),
        source,
    })
}

/// Issue a request and decode its JSON response.
pub(crate) async fn linode_json<T, B>(
    client: &HttpClient,
    token: &str,
    method: Method,
    url: &str,
    body: Option<&B>,
) -> Result<T, LinodeError>
where
    T: DeserializeOwned,
    B: Serialize + ?Sized,
{
    let text = linode_request(client, token, method, url, None, body).await?;
    decode(url, &text)
}

/// Fetch every page of a list endpoint.
///
/// # Errors
///
/// Returns the first error encountered; pages fetched before it are discarded.
pub(crate) async fn list_all<T: DeserializeOwned>(
    client: &HttpClient,
    token: &str,
    url: &str,
    filter: Option<&str>,
) -> Result<Vec<T>, LinodeError> {
    let mut items = Vec::new();
    let mut page = 1;

    loop {
        let page_url = format!("{url}?page={page}&page_size={LINODE_LIST_PAGE_SIZE}");
        let text =
            linode_request(client, token, Method::GET, &page_url, filter, None::<&()>).await?;
        let result: Page<T> = decode(&page_url, &text)?;
        items.extend(result.data);

        if result.page >= result.pages {
            break;
        }
        page = result.page + 1;
    }

    debug!(url = %url, total_items = items.len(), "Completed paginated list");

    Ok(items)
}
