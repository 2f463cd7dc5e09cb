//! Operation descriptors and per-call parameter collection.
//!
//! # Design
//! An `Operation` is static data: name, method, path template and the
//! `Accept` value matching its response kind. A `Call` gathers the encoded
//! parameters for one invocation. Required parameters that turn out to be
//! absent are remembered rather than reported immediately, and
//! `ApiClient::build_request` refuses the call before anything is sent.

use crate::http::HttpMethod;
use crate::params::{collection_pairs, scalar_pairs, CollectionFormat, ParamValue, QueryPair};

/// Content negotiation for typed JSON results.
pub const ACCEPT_JSON: &str =
    "application/json, application/json; profile=CamelCase, application/json; profile=PascalCase, text/html";
/// Content negotiation for video streams.
pub const ACCEPT_VIDEO: &str = "video/*, text/html";
/// Content negotiation for arbitrary binary payloads.
pub const ACCEPT_BINARY: &str = "application/octet-stream, text/html";

/// Static description of one API operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    pub name: &'static str,
    pub method: HttpMethod,
    pub path: &'static str,
    pub accept: &'static str,
}

impl Operation {
    pub const fn new(
        name: &'static str,
        method: HttpMethod,
        path: &'static str,
        accept: &'static str,
    ) -> Self {
        Self {
            name,
            method,
            path,
            accept,
        }
    }

    pub fn call(&self) -> Call {
        Call::new(*self)
    }
}

/// Parameters and headers for one invocation of an `Operation`.
#[derive(Debug, Clone)]
pub struct Call {
    operation: Operation,
    path_params: Vec<(&'static str, String)>,
    query: Vec<QueryPair>,
    headers: Vec<(String, String)>,
    body: Option<Vec<u8>>,
    missing: Option<&'static str>,
}

impl Call {
    pub fn new(operation: Operation) -> Self {
        Self {
            operation,
            path_params: Vec::new(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
            missing: None,
        }
    }

    fn mark_missing(&mut self, name: &'static str) {
        self.missing.get_or_insert(name);
    }

    /// A path parameter. Path parameters are always required.
    pub fn path<T: ParamValue + ?Sized>(mut self, name: &'static str, value: Option<&T>) -> Self {
        match value {
            Some(value) => self.path_params.push((name, value.to_param())),
            None => self.mark_missing(name),
        }
        self
    }

    /// An optional query parameter.
    pub fn query<T: ParamValue + ?Sized>(mut self, name: &'static str, value: Option<&T>) -> Self {
        self.query.extend(scalar_pairs(name, value));
        self
    }

    pub fn required_query<T: ParamValue + ?Sized>(
        mut self,
        name: &'static str,
        value: Option<&T>,
    ) -> Self {
        if value.is_none() {
            self.mark_missing(name);
        }
        self.query(name, value)
    }

    /// An optional list parameter laid out with `format`.
    pub fn query_list<T: ParamValue>(
        mut self,
        name: &'static str,
        values: &[T],
        format: CollectionFormat,
    ) -> Self {
        self.query.extend(collection_pairs(name, values, format));
        self
    }

    /// A required list parameter. An empty list counts as absent.
    pub fn required_query_list<T: ParamValue>(
        mut self,
        name: &'static str,
        values: &[T],
        format: CollectionFormat,
    ) -> Self {
        if values.is_empty() {
            self.mark_missing(name);
        }
        self.query_list(name, values, format)
    }

    /// Extra headers for this call only. They override configured defaults.
    pub fn headers<K, V>(mut self, headers: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    pub fn path_params(&self) -> &[(&'static str, String)] {
        &self.path_params
    }

    pub fn query_pairs(&self) -> &[QueryPair] {
        &self.query
    }

    pub fn extra_headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn request_body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// The first required parameter that was not supplied.
    pub fn missing_parameter(&self) -> Option<&'static str> {
        self.missing
    }
}
