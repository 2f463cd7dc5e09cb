//! Blocking client core for the Jellyfin media-server REST API.
//!
//! # Overview
//! Every operation runs through one pipeline: parameters are encoded by
//! `params`, collected into an `operation::Call`, turned into an
//! `HttpRequest` by `ApiClient::build_request`, sent through a `Transport`,
//! and decoded into an `ApiResponse` (JSON, temporary file, or nothing).
//! Failures of any stage come back as a single `ApiError`.
//!
//! # Design
//! - `ApiClient` is immutable after construction and cheap to clone; the
//!   transport and interceptors are injected through `ApiClientBuilder`.
//! - Validation happens before I/O: a missing required parameter never
//!   reaches the transport.
//! - Typed operations in `api` are thin descriptors over the shared
//!   pipeline, so adding an endpoint means adding an `Operation` constant
//!   and its parameter list.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod download;
pub mod error;
pub mod http;
pub mod operation;
pub mod params;
pub mod response;
pub mod transport;
pub mod types;

pub use auth::MediaBrowserAuth;
pub use client::{ApiClient, ApiClientBuilder, RequestInterceptor, ResponseInterceptor};
pub use config::{AuthConfig, ClientConfig};
pub use download::{sweep_orphans, DownloadedFile, SaveError};
pub use error::{ApiError, ConfigError, Result, TransportError};
pub use http::{Headers, HttpMethod, HttpRequest, HttpResponse};
pub use operation::{Call, Operation};
pub use params::{CollectionFormat, ParamValue};
pub use response::ApiResponse;
pub use transport::{Transport, UreqTransport};
