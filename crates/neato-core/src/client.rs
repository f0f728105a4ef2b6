//! HTTP client for the Neato cloud.
//!
//! Two services are involved:
//!
//! - **Beehive** (account service): robot roster and maps, authenticated with
//!   the account token (`Authorization: Token token=<token>`).
//! - **Nucleo** (robot messaging): robot state, authenticated per request with
//!   an HMAC-SHA256 signature keyed by the robot's secret.
//!
//! # Example
//!
//! ```no_run
//! use neato_core::{CloudClient, RobotApi};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = CloudClient::new("https://beehive.neatocloud.com", "token")?;
//! for robot in client.robots().await? {
//!     let maps = client.maps(&robot).await?;
//!     println!("{} has {} map(s)", robot.name, maps.len());
//! }
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, DATE};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use sha2::Sha256;
use time::OffsetDateTime;
use tracing::debug;

use neato_types::{MapSummary, Robot, RobotState};

use crate::error::{Error, Result};
use crate::traits::RobotApi;

/// Default Beehive endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://beehive.neatocloud.com";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Media type expected by both Beehive and Nucleo.
const NEATO_ACCEPT: &str = "application/vnd.neato.nucleo.v1";

/// Body of the robot state request. Signed byte-for-byte.
const GET_ROBOT_STATE: &str = r#"{"reqId":"1","cmd":"getRobotState"}"#;

type HmacSha256 = Hmac<Sha256>;

/// Authenticated client for the Neato cloud.
#[derive(Clone)]
pub struct CloudClient {
    client: Client,
    endpoint: String,
    auth_header: String,
}

impl std::fmt::Debug for CloudClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudClient")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
struct MapsResponse {
    #[serde(default)]
    maps: Vec<MapSummary>,
}

impl CloudClient {
    /// Create a client with the default request timeout.
    pub fn new(endpoint: &str, token: &str) -> Result<Self> {
        Self::with_timeout(endpoint, token, DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom request timeout.
    pub fn with_timeout(endpoint: &str, token: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Self::with_client(endpoint, token, client)
    }

    /// Create a client around an existing reqwest Client.
    pub fn with_client(endpoint: &str, token: &str, client: Client) -> Result<Self> {
        let endpoint = endpoint.trim_end_matches('/').to_string();

        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(Error::InvalidConfig(format!(
                "endpoint must start with http:// or https://, got: {}",
                endpoint
            )));
        }
        if token.is_empty() {
            return Err(Error::InvalidConfig(
                "authorization token cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            client,
            endpoint,
            auth_header: format!("Token token={}", token),
        })
    }

    /// The Beehive endpoint this client talks to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, what: &'static str) -> Result<T> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, &self.auth_header)
            .header(ACCEPT, NEATO_ACCEPT)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        decode_body(status, &body, what)
    }
}

#[async_trait]
impl RobotApi for CloudClient {
    async fn robots(&self) -> Result<Vec<Robot>> {
        let url = format!("{}/users/me/robots", self.endpoint);
        self.get_json(&url, "robot list").await
    }

    async fn state(&self, robot: &Robot) -> Result<RobotState> {
        let url = format!(
            "{}/vendors/neato/robots/{}/messages",
            robot.nucleo_url().trim_end_matches('/'),
            robot.serial
        );
        let date = http_date(OffsetDateTime::now_utc())?;
        let signature = sign_message(&robot.secret_key, &robot.serial, &date, GET_ROBOT_STATE)?;

        debug!("POST {}", url);
        let response = self
            .client
            .post(&url)
            .header(ACCEPT, NEATO_ACCEPT)
            .header(CONTENT_TYPE, "application/json")
            .header(DATE, &date)
            .header(AUTHORIZATION, format!("NEATOAPP {}", signature))
            .body(GET_ROBOT_STATE)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        let state: RobotState = decode_body(status, &body, "robot state")?;
        state.check_result()?;
        Ok(state)
    }

    async fn maps(&self, robot: &Robot) -> Result<Vec<MapSummary>> {
        let url = format!("{}/users/me/robots/{}/maps", self.endpoint, robot.serial);
        let response: MapsResponse = self.get_json(&url, "robot maps").await?;
        Ok(response.maps)
    }
}

/// Turn a status code and body into a decoded value or an error.
fn decode_body<T: DeserializeOwned>(status: u16, body: &str, what: &'static str) -> Result<T> {
    if !(200..300).contains(&status) {
        return Err(Error::Api {
            status,
            message: body.trim().to_string(),
        });
    }
    serde_json::from_str(body).map_err(|source| Error::Decode { what, source })
}

/// Compute the Nucleo request signature.
///
/// The signed string is the lowercased serial, the `Date` header value,
/// and the request body, joined by newlines.
pub fn sign_message(secret_key: &str, serial: &str, date: &str, body: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret_key.as_bytes())
        .map_err(|e| Error::InvalidConfig(format!("invalid robot secret: {}", e)))?;
    let message = format!("{}\n{}\n{}", serial.to_lowercase(), date, body);
    mac.update(message.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Format a timestamp as an HTTP date (`Thu, 01 Jan 1970 00:00:00 GMT`).
pub fn http_date(at: OffsetDateTime) -> Result<String> {
    let format = time::format_description::parse(
        "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT",
    )
    .map_err(|e| Error::InvalidConfig(format!("date format: {}", e)))?;
    at.to_offset(time::UtcOffset::UTC)
        .format(&format)
        .map_err(|e| Error::InvalidConfig(format!("date format: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_bad_endpoint() {
        let err = CloudClient::new("beehive.neatocloud.com", "token").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_new_rejects_empty_token() {
        let err = CloudClient::new(DEFAULT_ENDPOINT, "").unwrap_err();
        assert!(err.to_string().contains("token"));
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        let client = CloudClient::new("https://beehive.neatocloud.com/", "token").unwrap();
        assert_eq!(client.endpoint(), DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_debug_hides_token() {
        let client = CloudClient::new(DEFAULT_ENDPOINT, "top-secret").unwrap();
        let debug = format!("{:?}", client);
        assert!(debug.contains("beehive"));
        assert!(!debug.contains("top-secret"));
    }

    #[test]
    fn test_http_date_format() {
        let epoch = OffsetDateTime::from_unix_timestamp(0).unwrap();
        assert_eq!(http_date(epoch).unwrap(), "Thu, 01 Jan 1970 00:00:00 GMT");

        let later = OffsetDateTime::from_unix_timestamp(1_791_969_600).unwrap();
        let formatted = http_date(later).unwrap();
        assert!(formatted.ends_with(" GMT"));
        assert_eq!(formatted.len(), "Thu, 01 Jan 1970 00:00:00 GMT".len());
    }

    #[test]
    fn test_sign_message_shape() {
        let date = "Thu, 01 Jan 1970 00:00:00 GMT";
        let sig = sign_message("secret", "SN1", date, GET_ROBOT_STATE).unwrap();
        assert_eq!(sig.len(), 64);
        assert!(sig.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_sign_message_lowercases_serial() {
        let date = "Thu, 01 Jan 1970 00:00:00 GMT";
        let upper = sign_message("secret", "OPS01234-ABCDEF", date, GET_ROBOT_STATE).unwrap();
        let lower = sign_message("secret", "ops01234-abcdef", date, GET_ROBOT_STATE).unwrap();
        assert_eq!(upper, lower);
    }

    #[test]
    fn test_sign_message_depends_on_key_and_body() {
        let date = "Thu, 01 Jan 1970 00:00:00 GMT";
        let a = sign_message("secret-a", "SN1", date, GET_ROBOT_STATE).unwrap();
        let b = sign_message("secret-b", "SN1", date, GET_ROBOT_STATE).unwrap();
        let c = sign_message("secret-a", "SN1", date, "{}").unwrap();
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, sign_message("secret-a", "SN1", date, GET_ROBOT_STATE).unwrap());
    }

    #[test]
    fn test_decode_body_error_status() {
        let err = decode_body::<Vec<Robot>>(401, "{\"message\":\"Unauthorized\"}\n", "robot list")
            .unwrap_err();
        match err {
            Error::Api { status, message } => {
                assert_eq!(status, 401);
                assert!(message.contains("Unauthorized"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_decode_body_invalid_json() {
        let err = decode_body::<Vec<Robot>>(200, "<html>", "robot list").unwrap_err();
        assert!(matches!(err, Error::Decode { what: "robot list", .. }));
    }

    #[test]
    fn test_decode_robot_list() {
        let body = r#"[
            {"serial": "SN1", "name": "Kitchen", "model": "BotVacD7Connected", "secret_key": "k1"},
            {
                "serial": "SN2",
                "name": "Upstairs",
                "mac_address": "40:bd:32:00:00:02",
                "secret_key": "k2"
            }
        ]"#;
        let robots: Vec<Robot> = decode_body(200, body, "robot list").unwrap();
        assert_eq!(robots.len(), 2);
        assert_eq!(robots[0].name, "Kitchen");
        assert_eq!(robots[1].firmware_label(), "unknown");
    }

    #[test]
    fn test_decode_maps_response() {
        let body = r#"{
            "stats": {},
            "maps": [
                {"id": "m2", "cleaned_area": 37.25, "start_at": "2026-10-13T08:00:00Z"},
                {"id": "m1", "cleaned_area": null}
            ]
        }"#;
        let response: MapsResponse = decode_body(200, body, "robot maps").unwrap();
        assert_eq!(response.maps.len(), 2);
        assert_eq!(response.maps[0].cleaned_area, Some(37.25));

        let empty: MapsResponse = decode_body(200, "{}", "robot maps").unwrap();
        assert!(empty.maps.is_empty());
    }
}
