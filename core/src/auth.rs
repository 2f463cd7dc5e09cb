//! `MediaBrowser` authorization header, applied through the request
//! interceptor.

use std::sync::Arc;

use crate::client::RequestInterceptor;
use crate::config::AuthConfig;
use crate::http::HttpRequest;
use crate::params::url_encode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaBrowserAuth {
    client: String,
    device: String,
    device_id: String,
    version: String,
    token: Option<String>,
}

impl MediaBrowserAuth {
    pub fn new(
        client: impl Into<String>,
        device: impl Into<String>,
        device_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            client: client.into(),
            device: device.into(),
            device_id: device_id.into(),
            version: version.into(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Value of the `Authorization` header. Field values are percent-encoded
    /// so quotes and commas cannot break the header syntax.
    pub fn header_value(&self) -> String {
        let mut value = format!(
            "MediaBrowser Client=\"{}\", Device=\"{}\", DeviceId=\"{}\", Version=\"{}\"",
            url_encode(&self.client),
            url_encode(&self.device),
            url_encode(&self.device_id),
            url_encode(&self.version),
        );
        if let Some(token) = &self.token {
            value.push_str(&format!(", Token=\"{}\"", url_encode(token)));
        }
        value
    }

    pub fn into_interceptor(self) -> RequestInterceptor {
        let value = self.header_value();
        Arc::new(move |request: &mut HttpRequest| request.set_header("Authorization", value.clone()))
    }
}

impl From<&AuthConfig> for MediaBrowserAuth {
    fn from(config: &AuthConfig) -> Self {
        let auth = MediaBrowserAuth::new(
            config.client.clone(),
            config.device.clone(),
            config.device_id.clone(),
            config.version.clone(),
        );
        match &config.token {
            Some(token) => auth.with_token(token.clone()),
            None => auth,
        }
    }
}
