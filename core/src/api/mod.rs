//! Typed operations, grouped the way the server groups its endpoints.
//!
//! Each operation is an `Operation` constant plus thin methods that collect
//! parameters into a `Call` and hand it to `ApiClient`. Every operation has
//! three entry points: `foo` returns the decoded value, `foo_with_headers`
//! also takes per-call headers, and `foo_with_http_info` returns the full
//! `ApiResponse` with status and headers.

/// Generates the plain and header-taking entry points from a
/// `*_with_http_info` method on the same type.
macro_rules! overloads {
    (
        $(#[$meta:meta])*
        $name:ident, $with_headers:ident => $with_http_info:ident($($arg:ident: $ty:ty),*) -> $out:ty
    ) => {
        $(#[$meta])*
        pub fn $name(&self, $($arg: $ty),*) -> $crate::error::Result<$out> {
            self.$with_headers($($arg,)* &[])
        }

        $(#[$meta])*
        pub fn $with_headers(
            &self,
            $($arg: $ty,)*
            headers: &[(&str, &str)],
        ) -> $crate::error::Result<$out> {
            Ok(self.$with_http_info($($arg,)* headers)?.into_data())
        }
    };
}

pub mod instant_mix;
pub mod trailers;
pub mod video_attachments;
pub mod videos;

pub use instant_mix::{InstantMixApi, InstantMixOptions};
pub use trailers::{TrailersApi, TrailersOptions};
pub use video_attachments::VideoAttachmentsApi;
pub use videos::{VideoStreamOptions, VideosApi};

use crate::client::ApiClient;

impl ApiClient {
    pub fn instant_mix(&self) -> InstantMixApi<'_> {
        InstantMixApi::new(self)
    }

    pub fn trailers(&self) -> TrailersApi<'_> {
        TrailersApi::new(self)
    }

    pub fn video_attachments(&self) -> VideoAttachmentsApi<'_> {
        VideoAttachmentsApi::new(self)
    }

    pub fn videos(&self) -> VideosApi<'_> {
        VideosApi::new(self)
    }
}
