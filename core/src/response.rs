//! Response wrapper and decoders.
//!
//! Decoders take the `HttpResponse` by value, so the body stream is dropped,
//! and with it closed, on every return path.

use serde::de::DeserializeOwned;

use crate::download::{self, DownloadedFile, SaveError};
use crate::error::{ApiError, Result, TransportError};
use crate::http::{Headers, HttpResponse};

/// Status, headers and decoded value of a successful call.
#[derive(Debug)]
pub struct ApiResponse<T> {
    status_code: u16,
    headers: Headers,
    data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(status_code: u16, headers: Headers, data: T) -> Self {
        Self {
            status_code,
            headers,
            data,
        }
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn into_data(self) -> T {
        self.data
    }
}

/// Turn a non-2xx response into `ApiError::Status`, draining the body.
pub fn status_error(operation: &'static str, response: HttpResponse) -> ApiError {
    let HttpResponse {
        status,
        headers,
        body,
    } = response;
    let body = body.and_then(|mut body| match body.read_to_string_lossy() {
        Ok(text) => Some(text),
        Err(err) => {
            tracing::debug!(operation, error = %err, "failed to read error body");
            None
        }
    });
    let shown = match body.as_deref() {
        Some(text) if !text.is_empty() => text,
        _ => "[no body]",
    };
    let message = format!("{operation} call failed with: {status} - {shown}");
    tracing::warn!(operation, status, "request failed");
    ApiError::Status {
        status,
        message,
        headers,
        body,
    }
}

/// Decode a 2xx JSON response. A missing or blank body decodes to `None`.
pub fn decode_json<T: DeserializeOwned>(
    operation: &'static str,
    response: HttpResponse,
) -> Result<ApiResponse<Option<T>>> {
    let HttpResponse {
        status,
        headers,
        body,
    } = response;
    let Some(mut body) = body else {
        return Ok(ApiResponse::new(status, headers, None));
    };
    let text = body
        .read_to_string_lossy()
        .map_err(|err| ApiError::Transport {
            operation,
            source: TransportError::from(err),
        })?;
    if text.trim().is_empty() {
        return Ok(ApiResponse::new(status, headers, None));
    }
    let value = serde_json::from_str(&text).map_err(|source| ApiError::Decode { operation, source })?;
    Ok(ApiResponse::new(status, headers, Some(value)))
}

/// Save a 2xx binary response to a temporary file. A missing body decodes
/// to `None`.
pub fn decode_file(
    operation: &'static str,
    response: HttpResponse,
) -> Result<ApiResponse<Option<DownloadedFile>>> {
    let HttpResponse {
        status,
        headers,
        body,
    } = response;
    let Some(mut body) = body else {
        return Ok(ApiResponse::new(status, headers, None));
    };
    let file = download::download_to_temp(&headers, &mut body).map_err(|err| match err {
        SaveError::Body(err) => ApiError::Transport {
            operation,
            source: TransportError::from(err),
        },
        SaveError::File(source) => ApiError::Download { operation, source },
    })?;
    Ok(ApiResponse::new(status, headers, Some(file)))
}

/// Discard the body of a 2xx response that carries no result.
pub fn decode_empty(operation: &'static str, response: HttpResponse) -> Result<ApiResponse<()>> {
    let HttpResponse {
        status,
        headers,
        body,
    } = response;
    if let Some(mut body) = body {
        std::io::copy(&mut body, &mut std::io::sink()).map_err(|err| ApiError::Transport {
            operation,
            source: TransportError::from(err),
        })?;
    }
    Ok(ApiResponse::new(status, headers, ()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::ResponseBody;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        #[serde(rename = "Name")]
        name: String,
    }

    fn response(status: u16, body: Option<&str>) -> HttpResponse {
        let mut headers = Headers::new();
        headers.insert("content-type".to_string(), vec!["application/json".to_string()]);
        HttpResponse::new(status, headers, body.map(|b| ResponseBody::from_bytes(b.as_bytes())))
    }

    #[test]
    fn json_body_is_decoded() {
        let decoded = decode_json::<Item>("getItem", response(200, Some(r#"{"Name":"Heat"}"#))).unwrap();
        assert_eq!(decoded.status_code(), 200);
        assert_eq!(decoded.data().as_ref().unwrap().name, "Heat");
        assert_eq!(
            decoded.headers()["content-type"],
            vec!["application/json".to_string()]
        );
    }

    #[test]
    fn empty_or_blank_body_is_none() {
        for body in [None, Some(""), Some("  \n")] {
            let decoded = decode_json::<Item>("getItem", response(200, body)).unwrap();
            assert!(decoded.into_data().is_none());
        }
    }

    #[test]
    fn malformed_json_is_a_decode_error() {
        let err = decode_json::<Item>("getItem", response(200, Some("{\"Name\":"))).unwrap_err();
        assert!(matches!(err, ApiError::Decode { operation: "getItem", .. }));
    }

    #[test]
    fn status_error_embeds_operation_status_and_body() {
        let err = status_error("getTrailers", response(500, Some("database locked")));
        assert_eq!(
            err.to_string(),
            "getTrailers call failed with: 500 - database locked"
        );
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.body(), Some("database locked"));
        assert!(err.headers().unwrap().contains_key("content-type"));
    }

    #[test]
    fn status_error_without_body_says_so() {
        for body in [None, Some("")] {
            let err = status_error("getVideoStream", response(404, body));
            assert_eq!(
                err.to_string(),
                "getVideoStream call failed with: 404 - [no body]"
            );
        }
    }

    #[test]
    fn file_without_body_is_none() {
        let decoded = decode_file("headVideoStream", response(200, None)).unwrap();
        assert!(decoded.data().is_none());
    }

    /// Body that fails the way ureq reports a timeout mid-stream.
    struct TimedOutBody;

    impl std::io::Read for TimedOutBody {
        fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other(ureq::Error::Timeout(ureq::Timeout::RecvBody)))
        }
    }

    fn timed_out(status: u16) -> HttpResponse {
        HttpResponse::new(status, Headers::new(), Some(ResponseBody::from_reader(TimedOutBody)))
    }

    #[test]
    fn json_body_timeout_is_a_transport_timeout() {
        let err = decode_json::<Item>("getTrailers", timed_out(200)).unwrap_err();
        assert!(err.is_timeout(), "unexpected error: {err:?}");
    }

    #[test]
    fn file_body_timeout_is_a_transport_timeout() {
        let err = decode_file("getVideoStream", timed_out(200)).unwrap_err();
        assert!(err.is_timeout(), "unexpected error: {err:?}");
        assert!(matches!(
            err,
            ApiError::Transport {
                operation: "getVideoStream",
                ..
            }
        ));
    }

    #[test]
    fn empty_body_timeout_is_a_transport_timeout() {
        let err = decode_empty("mergeVersions", timed_out(204)).unwrap_err();
        assert!(err.is_timeout(), "unexpected error: {err:?}");
    }

    #[test]
    fn empty_result_drains_body() {
        let decoded = decode_empty("mergeVersions", response(204, Some("ignored"))).unwrap();
        assert_eq!(decoded.status_code(), 204);
    }
}
