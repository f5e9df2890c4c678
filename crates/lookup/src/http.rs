use std::time::Duration;

use metrics::counter;
use petcare_domain::lookup::LookupError;
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::warn;

/// Shared client settings for every lookup service.
pub fn build_http_client(timeout: Duration) -> Result<Client, LookupError> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .user_agent(concat!("petcare/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|err| LookupError::Unreachable(err.to_string()))
}

/// Appends `segments` to `base`, percent-encoding each one so caller input
/// can never add query strings or extra path levels. `.` and `..` segments
/// are dropped by `Url`, so callers reject them beforehand.
pub(crate) fn endpoint(base: &str, segments: &[&str]) -> Result<Url, LookupError> {
    let mut url = Url::parse(base.trim())
        .map_err(|err| LookupError::Unreachable(format!("invalid base url `{base}`: {err}")))?;
    url.path_segments_mut()
        .map_err(|()| LookupError::Unreachable(format!("base url `{base}` cannot carry a path")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Sends a GET and decodes the JSON body. `missing` names the subject in
/// `NotFound` errors when the service answers with one of `absent_statuses`.
pub(crate) async fn get_json<T>(
    client: &Client,
    service: &'static str,
    url: Url,
    missing: &str,
    absent_statuses: &[StatusCode],
) -> Result<T, LookupError>
where
    T: DeserializeOwned,
{
    let response = client
        .get(url)
        .header(reqwest::header::ACCEPT, "application/json")
        .send()
        .await
        .map_err(|err| LookupError::Unreachable(err.to_string()))?;

    let response = check_status(response, missing, absent_statuses)?;
    let body = response
        .bytes()
        .await
        .map_err(|err| LookupError::Unreachable(format!("{service}: {err}")))?;
    serde_json::from_slice(&body)
        .map_err(|err| LookupError::InvalidResponse(format!("{service}: {err}")))
}

fn check_status(
    response: Response,
    missing: &str,
    absent_statuses: &[StatusCode],
) -> Result<Response, LookupError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if absent_statuses.contains(&status) {
        return Err(LookupError::NotFound(missing.to_string()));
    }
    Err(LookupError::Unreachable(format!(
        "{} answered with status {status}",
        response.url()
    )))
}

/// Counts the outcome of one remote call and logs failures other than a
/// plain miss.
pub(crate) fn record_outcome<T>(
    service: &'static str,
    outcome: &Result<T, LookupError>,
) {
    let result = match outcome {
        Ok(_) => "ok",
        Err(LookupError::NotFound(_)) => "not_found",
        Err(LookupError::Unreachable(_)) => "unreachable",
        Err(LookupError::InvalidResponse(_)) => "invalid_response",
    };
    counter!("lookup_requests_total", "service" => service, "result" => result).increment(1);

    if let Err(err @ (LookupError::Unreachable(_) | LookupError::InvalidResponse(_))) = outcome {
        warn!(service, %err, "lookup request failed");
    }
}
