//! Shared client: request assembly, sending, and dispatch to the decoders.
//!
//! # Design
//! `ApiClient` holds read-only configuration and an `Arc<dyn Transport>`;
//! cloning it is cheap and concurrent calls share no mutable state. A call
//! runs `build_request -> Transport::send -> response interceptor -> status
//! check -> decode` exactly once, with no retries.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::auth::MediaBrowserAuth;
use crate::config::ClientConfig;
use crate::download::DownloadedFile;
use crate::error::{ApiError, ConfigError, Result};
use crate::http::{HttpRequest, HttpResponse};
use crate::operation::Call;
use crate::params::{expand_path, join_query};
use crate::response::{self, ApiResponse};
use crate::transport::{Transport, UreqTransport};

/// Runs last on every built request; may change anything.
pub type RequestInterceptor = Arc<dyn Fn(&mut HttpRequest) + Send + Sync>;

/// Sees every received response before it is classified.
pub type ResponseInterceptor = Arc<dyn Fn(&HttpResponse) + Send + Sync>;

#[derive(Clone)]
pub struct ApiClient {
    base_uri: String,
    read_timeout: Option<Duration>,
    default_headers: Vec<(String, String)>,
    transport: Arc<dyn Transport>,
    request_interceptor: Option<RequestInterceptor>,
    response_interceptor: Option<ResponseInterceptor>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_uri", &self.base_uri)
            .field("read_timeout", &self.read_timeout)
            .field("default_headers", &self.default_headers)
            .field("request_interceptor", &self.request_interceptor.is_some())
            .field("response_interceptor", &self.response_interceptor.is_some())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Client with the default `ureq` transport.
    pub fn new(config: ClientConfig) -> std::result::Result<Self, ConfigError> {
        Self::builder(config).build()
    }

    pub fn builder(config: ClientConfig) -> ApiClientBuilder {
        ApiClientBuilder {
            config,
            transport: None,
            request_interceptor: None,
            response_interceptor: None,
        }
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout
    }

    /// Assemble the request for `call` without sending it.
    ///
    /// Validation comes first: a missing required parameter or a path
    /// template mismatch fails here, before the transport is involved.
    pub fn build_request(&self, call: &Call) -> Result<HttpRequest> {
        let operation = call.operation();
        if let Some(param) = call.missing_parameter() {
            return Err(ApiError::MissingParameter {
                operation: operation.name,
                param,
            });
        }

        let path = expand_path(operation.path, call.path_params()).map_err(|source| {
            ApiError::Template {
                operation: operation.name,
                source,
            }
        })?;
        let mut url = format!("{}{}", self.base_uri, path);
        if !call.query_pairs().is_empty() {
            url.push('?');
            url.push_str(&join_query(call.query_pairs()));
        }

        let mut request = HttpRequest::new(operation.method, url);
        request.set_header("Accept", operation.accept);
        request.timeout = self.read_timeout;
        for (name, value) in &self.default_headers {
            request.set_header(name.as_str(), value.as_str());
        }
        for (name, value) in call.extra_headers() {
            request.set_header(name.as_str(), value.as_str());
        }
        request.body = call.request_body().map(<[u8]>::to_vec);

        if let Some(interceptor) = &self.request_interceptor {
            interceptor(&mut request);
        }
        Ok(request)
    }

    /// Build, send and status-check `call`. Returns the raw 2xx response.
    pub fn execute(&self, call: &Call) -> Result<HttpResponse> {
        let operation = call.operation().name;
        let request = self.build_request(call)?;
        tracing::debug!(operation, method = %request.method, url = %request.url, "sending request");

        let response = self
            .transport
            .send(request)
            .map_err(|source| ApiError::Transport { operation, source })?;
        tracing::debug!(operation, status = response.status, "response received");

        if let Some(interceptor) = &self.response_interceptor {
            tracing::trace!(operation, "running response interceptor");
            interceptor(&response);
        }

        if !response.is_success() {
            return Err(response::status_error(operation, response));
        }
        Ok(response)
    }

    /// Run `call` and decode its JSON body as `T`.
    #[tracing::instrument(level = "debug", skip(self, call), fields(operation = call.operation().name))]
    pub fn invoke_json<T: DeserializeOwned>(&self, call: Call) -> Result<ApiResponse<Option<T>>> {
        let response = self.execute(&call)?;
        response::decode_json(call.operation().name, response)
    }

    /// Run `call` and save its body to a temporary file.
    #[tracing::instrument(level = "debug", skip(self, call), fields(operation = call.operation().name))]
    pub fn invoke_file(&self, call: Call) -> Result<ApiResponse<Option<DownloadedFile>>> {
        let response = self.execute(&call)?;
        response::decode_file(call.operation().name, response)
    }

    /// Run `call` for its side effect only.
    #[tracing::instrument(level = "debug", skip(self, call), fields(operation = call.operation().name))]
    pub fn invoke_empty(&self, call: Call) -> Result<ApiResponse<()>> {
        let response = self.execute(&call)?;
        response::decode_empty(call.operation().name, response)
    }
}

pub struct ApiClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
    request_interceptor: Option<RequestInterceptor>,
    response_interceptor: Option<ResponseInterceptor>,
}

impl ApiClientBuilder {
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Runs after the configured authorization header is applied, so it can
    /// still override it.
    pub fn request_interceptor(
        mut self,
        interceptor: impl Fn(&mut HttpRequest) + Send + Sync + 'static,
    ) -> Self {
        self.request_interceptor = Some(Arc::new(interceptor));
        self
    }

    pub fn response_interceptor(
        mut self,
        interceptor: impl Fn(&HttpResponse) + Send + Sync + 'static,
    ) -> Self {
        self.response_interceptor = Some(Arc::new(interceptor));
        self
    }

    pub fn build(self) -> std::result::Result<ApiClient, ConfigError> {
        let config = self.config;
        config.validate()?;

        let mut default_headers = Vec::new();
        if let Some(user_agent) = &config.user_agent {
            default_headers.push(("User-Agent".to_string(), user_agent.clone()));
        }
        default_headers.extend(
            config
                .default_headers
                .iter()
                .map(|(name, value)| (name.clone(), value.clone())),
        );

        let auth = config
            .auth
            .as_ref()
            .map(|auth| MediaBrowserAuth::from(auth).into_interceptor());
        let request_interceptor = match (auth, self.request_interceptor) {
            (Some(auth), Some(custom)) => {
                let chained: RequestInterceptor = Arc::new(move |request: &mut HttpRequest| {
                    auth(request);
                    custom(request);
                });
                Some(chained)
            }
            (auth, custom) => custom.or(auth),
        };

        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(UreqTransport::new()));

        tracing::debug!(base_uri = %config.normalized_base_uri(), "creating ApiClient");
        Ok(ApiClient {
            base_uri: config.normalized_base_uri().to_string(),
            read_timeout: config.read_timeout(),
            default_headers,
            transport,
            request_interceptor,
            response_interceptor: self.response_interceptor,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::config::AuthConfig;
    use crate::error::TransportError;
    use crate::http::HttpMethod;
    use crate::operation::{Operation, ACCEPT_BINARY, ACCEPT_JSON};
    use crate::params::CollectionFormat;
    use crate::transport::testing::{MockReply, MockTransport};
    use serde::Deserialize;
    use uuid::Uuid;

    const GET_ITEM_MIX: Operation = Operation::new(
        "getInstantMixFromItem",
        HttpMethod::Get,
        "/Items/{itemId}/InstantMix",
        ACCEPT_JSON,
    );
    const GET_ATTACHMENT: Operation = Operation::new(
        "getAttachment",
        HttpMethod::Get,
        "/Videos/{videoId}/{mediaSourceId}/Attachments/{index}",
        ACCEPT_BINARY,
    );
    const DELETE_SOURCES: Operation = Operation::new(
        "deleteAlternateSources",
        HttpMethod::Delete,
        "/Videos/{itemId}/AlternateSources",
        ACCEPT_JSON,
    );

    #[derive(Debug, Deserialize)]
    struct Count {
        #[serde(rename = "TotalRecordCount")]
        total: u32,
    }

    fn client_with(mock: &Arc<MockTransport>, config: ClientConfig) -> ApiClient {
        ApiClient::builder(config)
            .transport(mock.clone())
            .build()
            .unwrap()
    }

    fn client(mock: &Arc<MockTransport>) -> ApiClient {
        client_with(mock, ClientConfig::new("http://nas:8096/"))
    }

    #[test]
    fn builds_url_headers_and_timeout() {
        let mock = Arc::new(MockTransport::default());
        let config = ClientConfig {
            read_timeout_ms: Some(750),
            user_agent: Some("panel/1.0".to_string()),
            ..ClientConfig::new("http://nas:8096/")
        };
        let id = Uuid::nil();
        let call = GET_ITEM_MIX
            .call()
            .path("itemId", Some(&id))
            .query("limit", Some(&5))
            .query_list("fields", &["Genres", "Overview"], CollectionFormat::Multi);

        let request = client_with(&mock, config).build_request(&call).unwrap();
        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(
            request.url,
            "http://nas:8096/Items/00000000-0000-0000-0000-000000000000/InstantMix?limit=5&fields=Genres&fields=Overview"
        );
        assert_eq!(request.header("Accept"), Some(ACCEPT_JSON));
        assert_eq!(request.header("User-Agent"), Some("panel/1.0"));
        assert_eq!(request.timeout, Some(Duration::from_millis(750)));
        assert!(request.body.is_none());
    }

    #[test]
    fn no_query_string_without_query_parameters() {
        let mock = Arc::new(MockTransport::default());
        let id = Uuid::nil();
        let call = DELETE_SOURCES.call().path("itemId", Some(&id));
        let request = client(&mock).build_request(&call).unwrap();
        assert_eq!(
            request.url,
            "http://nas:8096/Videos/00000000-0000-0000-0000-000000000000/AlternateSources"
        );
        assert_eq!(request.timeout, None);
    }

    #[test]
    fn building_is_deterministic() {
        let mock = Arc::new(MockTransport::default());
        let client = client(&mock);
        let id = Uuid::new_v4();
        let make = || {
            GET_ITEM_MIX
                .call()
                .path("itemId", Some(&id))
                .query("userId", Some(&id))
                .query_list("enableImageTypes", &["Primary", "Backdrop"], CollectionFormat::Multi)
                .headers([("X-One", "1"), ("X-Two", "2")])
        };
        let first = client.build_request(&make()).unwrap();
        let second = client.build_request(&make()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn header_precedence_defaults_then_call_then_interceptor() {
        let mock = Arc::new(MockTransport::default());
        let mut config = ClientConfig::new("http://nas:8096");
        config
            .default_headers
            .insert("X-Source".to_string(), "config".to_string());
        config.auth = Some(AuthConfig {
            token: Some("secret".to_string()),
            ..AuthConfig::default()
        });
        let client = ApiClient::builder(config)
            .transport(mock.clone())
            .request_interceptor(|request: &mut HttpRequest| {
                request.set_header("X-Intercepted", "yes");
                request.set_header("Accept", "application/json");
            })
            .build()
            .unwrap();

        let id = Uuid::nil();
        let call = GET_ITEM_MIX
            .call()
            .path("itemId", Some(&id))
            .headers([("x-source", "call"), ("Accept", "text/plain")]);
        let request = client.build_request(&call).unwrap();

        assert_eq!(request.header("X-Source"), Some("call"));
        assert_eq!(request.header("X-Intercepted"), Some("yes"));
        assert_eq!(request.header("Accept"), Some("application/json"));
        assert!(request
            .header("Authorization")
            .unwrap()
            .contains(r#"Token="secret""#));
    }

    #[test]
    fn missing_required_parameter_never_reaches_transport() {
        let mock = Arc::new(MockTransport::new(vec![MockReply::json("{}")]));
        let call = GET_ITEM_MIX.call().path::<Uuid>("itemId", None);

        let err = client(&mock).invoke_json::<Count>(call).unwrap_err();
        assert!(matches!(
            err,
            ApiError::MissingParameter {
                operation: "getInstantMixFromItem",
                param: "itemId"
            }
        ));
        assert_eq!(err.status(), Some(400));
        assert_eq!(mock.calls(), 0);
    }

    #[test]
    fn unresolved_placeholder_never_reaches_transport() {
        let mock = Arc::new(MockTransport::default());
        let id = Uuid::nil();
        let call = GET_ATTACHMENT
            .call()
            .path("videoId", Some(&id))
            .path("index", Some(&0));

        let err = client(&mock).invoke_file(call).unwrap_err();
        assert!(matches!(err, ApiError::Template { .. }));
        assert!(err.to_string().contains("mediaSourceId"));
        assert_eq!(mock.calls(), 0);
    }

    #[test]
    fn json_success_and_empty_body() {
        let mock = Arc::new(MockTransport::new(vec![
            MockReply::json(r#"{"TotalRecordCount":3}"#),
            MockReply::json(""),
            MockReply::no_body(200),
        ]));
        let client = client(&mock);
        let id = Uuid::nil();
        let call = GET_ITEM_MIX.call().path("itemId", Some(&id));

        let first = client.invoke_json::<Count>(call.clone()).unwrap();
        assert_eq!(first.data().as_ref().unwrap().total, 3);
        assert!(client.invoke_json::<Count>(call.clone()).unwrap().into_data().is_none());
        assert!(client.invoke_json::<Count>(call).unwrap().into_data().is_none());
        assert_eq!(mock.calls(), 3);
    }

    #[test]
    fn non_success_status_becomes_api_error() {
        let mock = Arc::new(MockTransport::new(vec![MockReply::status(404, "")]));
        let id = Uuid::nil();
        let call = DELETE_SOURCES.call().path("itemId", Some(&id));

        let err = client(&mock).invoke_empty(call).unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(
            err.to_string(),
            "deleteAlternateSources call failed with: 404 - [no body]"
        );
    }

    #[test]
    fn transport_failure_is_reported_once() {
        let mock = Arc::new(MockTransport::new(vec![MockReply::Timeout]));
        let id = Uuid::nil();
        let call = GET_ITEM_MIX.call().path("itemId", Some(&id));

        let err = client(&mock).invoke_json::<Count>(call).unwrap_err();
        assert!(err.is_timeout());
        assert!(matches!(
            err,
            ApiError::Transport {
                source: TransportError::Timeout,
                ..
            }
        ));
        assert_eq!(mock.calls(), 1);
    }

    #[test]
    fn response_interceptor_sees_every_response() {
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        let mock = Arc::new(MockTransport::new(vec![
            MockReply::json(r#"{"TotalRecordCount":1}"#),
            MockReply::status(500, "boom"),
        ]));
        let client = ApiClient::builder(ClientConfig::new("http://nas:8096"))
            .transport(mock.clone())
            .response_interceptor(move |response: &HttpResponse| {
                counter.fetch_add(response.status as usize, Ordering::SeqCst);
            })
            .build()
            .unwrap();
        let id = Uuid::nil();
        let call = GET_ITEM_MIX.call().path("itemId", Some(&id));

        let ok = client.invoke_json::<Count>(call.clone()).unwrap();
        assert_eq!(ok.data().as_ref().unwrap().total, 1);
        assert!(client.invoke_json::<Count>(call).is_err());
        assert_eq!(seen.load(Ordering::SeqCst), 700);
    }

    #[test]
    fn binary_response_is_saved() {
        let mock = Arc::new(MockTransport::new(vec![MockReply::bytes(
            vec![("content-disposition", "attachment; filename=\"font.ttf\"")],
            b"\x00\x01\x00\x00",
        )]));
        let id = Uuid::nil();
        let call = GET_ATTACHMENT
            .call()
            .path("videoId", Some(&id))
            .path("mediaSourceId", Some("abc"))
            .path("index", Some(&2));

        let response = client(&mock).invoke_file(call).unwrap();
        let file = response.data().as_ref().unwrap();
        assert_eq!(file.file_name(), Some("font.ttf"));
        assert_eq!(std::fs::read(file.path()).unwrap(), b"\x00\x01\x00\x00");
        assert_eq!(
            mock.requests()[0].url,
            "http://nas:8096/Videos/00000000-0000-0000-0000-000000000000/abc/Attachments/2"
        );
    }

    #[test]
    fn invalid_base_uri_is_rejected() {
        let err = ApiClient::new(ClientConfig::new("nas:8096")).unwrap_err();
        assert!(matches!(err, ConfigError::BaseUri(_)));
    }
}
