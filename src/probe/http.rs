//! HTTP probe implementation.

use std::time::Duration;
use super::{CheckMethod, ProbeError, USER_AGENT};

/// Build the client shared by all probes.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, ProbeError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| ProbeError::Network(e.to_string()))
}

/// Send one check request and return the response status code.
///
/// The body is never read: `HttpStatus` issues a HEAD request, and `Ping`
/// stops once the GET response headers arrive.
pub async fn send_check(
    client: &reqwest::Client,
    method: CheckMethod,
    url: &str,
    timeout: Duration,
) -> Result<u16, ProbeError> {
    let request = match method {
        CheckMethod::HttpStatus => client.head(url),
        CheckMethod::Ping => client.get(url),
    };

    let response = request.send().await.map_err(|e| {
        if e.is_timeout() {
            ProbeError::Timeout(timeout)
        } else {
            ProbeError::Network(e.to_string())
        }
    })?;

    Ok(response.status().as_u16())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_http_probe_invalid_url() {
        let client = build_client(Duration::from_millis(100)).unwrap();
        let result = send_check(&client, CheckMethod::Ping, "not a url", Duration::from_millis(100)).await;
        assert!(matches!(result, Err(ProbeError::Network(_))));
    }
}
