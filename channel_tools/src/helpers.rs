use std::time::Duration;

use log::trace;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use stock_sync_engine::{
    db_types::{ChannelId, Sku},
    traits::ChannelError,
};

use crate::ConnectorError;

/// Every outbound call carries a fixed timeout. A timed-out call is a retryable transient failure.
pub(crate) const REQUEST_TIMEOUT_SECS: u64 = 30;

pub(crate) fn build_client() -> Result<Client, ConnectorError> {
    Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
        .map_err(|e| ConnectorError::Initialization(e.to_string()))
}

/// Classifies an HTTP response status into the engine's failure taxonomy.
///
/// 401/403 mean our credentials are no good: a human has to re-authorize, so this is never retried. 429 and 5xx
/// are worth another attempt. Anything else is a malformed request and retrying it would only repeat the mistake.
pub(crate) fn error_from_status(channel: &ChannelId, status: StatusCode, body: &str) -> ChannelError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ChannelError::authentication_required(channel, format!("{status}: {body}"))
        },
        StatusCode::TOO_MANY_REQUESTS => ChannelError::Transient(format!("Rate limited by {channel}: {body}")),
        s if s.is_server_error() => ChannelError::Transient(format!("{channel} answered {status}: {body}")),
        _ => ChannelError::Validation(format!("{channel} rejected the request with {status}: {body}")),
    }
}

pub(crate) fn transport_error(channel: &ChannelId, e: reqwest::Error) -> ChannelError {
    if e.is_timeout() || e.is_connect() {
        ChannelError::Transient(format!("Could not reach {channel}: {e}"))
    } else {
        ChannelError::Protocol(format!("Request to {channel} failed: {e}"))
    }
}

/// Sends the request and deserializes a JSON response body, mapping every failure mode into the taxonomy.
pub(crate) async fn send_json<T: DeserializeOwned>(channel: &ChannelId, req: RequestBuilder) -> Result<T, ChannelError> {
    let response = req.send().await.map_err(|e| transport_error(channel, e))?;
    let status = response.status();
    if status.is_success() {
        trace!("🛒️ {channel} query successful: {status}");
        response.json::<T>().await.map_err(|e| ChannelError::Protocol(format!("Could not deserialize JSON: {e}")))
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(error_from_status(channel, status, &body))
    }
}

/// Sends a request against a listing endpoint and only checks the status. A 404 means the SKU has no listing on
/// the channel, which callers treat differently from a generic validation failure.
pub(crate) async fn send_listing_request(
    channel: &ChannelId,
    sku: &Sku,
    req: RequestBuilder,
) -> Result<(), ChannelError> {
    let response = req.send().await.map_err(|e| transport_error(channel, e))?;
    let status = response.status();
    if status.is_success() {
        trace!("🛒️ {channel} query successful: {status}");
        return Ok(());
    }
    if status == StatusCode::NOT_FOUND {
        return Err(ChannelError::ListingNotFound(sku.clone()));
    }
    let body = response.text().await.unwrap_or_default();
    Err(error_from_status(channel, status, &body))
}

/// The refresh-token grant shared by the OAuth marketplaces.
///
/// The auth servers report a dead refresh token as `400 invalid_grant` rather than 401; that case maps to
/// [`ChannelError::AuthenticationRequired`] so the engine invalidates the stored credential instead of retrying.
pub(crate) async fn refresh_oauth_token(
    channel: &ChannelId,
    client: &Client,
    auth_url: &str,
    client_id: &str,
    client_secret: &str,
    refresh_token: &str,
) -> Result<crate::data_objects::OAuthTokenResponse, ChannelError> {
    let url = format!("{auth_url}/token");
    let req = client
        .post(url)
        .basic_auth(client_id, Some(client_secret))
        .form(&[("grant_type", "refresh_token"), ("refresh_token", refresh_token)]);
    let response = req.send().await.map_err(|e| transport_error(channel, e))?;
    let status = response.status();
    if status.is_success() {
        return response
            .json()
            .await
            .map_err(|e| ChannelError::Protocol(format!("Could not deserialize token response: {e}")));
    }
    let body = response.text().await.unwrap_or_default();
    if status == StatusCode::BAD_REQUEST && body.contains("invalid_grant") {
        return Err(ChannelError::authentication_required(channel, "refresh token rejected (invalid_grant)"));
    }
    Err(error_from_status(channel, status, &body))
}

#[cfg(test)]
mod test {
    use super::*;

    fn channel() -> ChannelId {
        ChannelId::from("allegro-main")
    }

    #[test]
    fn auth_statuses_require_reauthorization() {
        let e = error_from_status(&channel(), StatusCode::UNAUTHORIZED, "token expired");
        assert!(e.is_authentication_required());
        let e = error_from_status(&channel(), StatusCode::FORBIDDEN, "no scope");
        assert!(e.is_authentication_required());
    }

    #[test]
    fn rate_limits_and_server_errors_are_transient() {
        assert!(matches!(
            error_from_status(&channel(), StatusCode::TOO_MANY_REQUESTS, ""),
            ChannelError::Transient(_)
        ));
        assert!(matches!(
            error_from_status(&channel(), StatusCode::BAD_GATEWAY, ""),
            ChannelError::Transient(_)
        ));
    }

    #[test]
    fn other_client_errors_are_validation() {
        assert!(matches!(
            error_from_status(&channel(), StatusCode::UNPROCESSABLE_ENTITY, "bad quantity"),
            ChannelError::Validation(_)
        ));
    }
}
