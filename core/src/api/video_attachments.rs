//! Attachments embedded in a media source (fonts and similar).

use uuid::Uuid;

use crate::client::ApiClient;
use crate::download::DownloadedFile;
use crate::error::Result;
use crate::http::HttpMethod;
use crate::operation::{Operation, ACCEPT_BINARY};
use crate::response::ApiResponse;

pub const GET_ATTACHMENT: Operation = Operation::new(
    "getAttachment",
    HttpMethod::Get,
    "/Videos/{videoId}/{mediaSourceId}/Attachments/{index}",
    ACCEPT_BINARY,
);

pub struct VideoAttachmentsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> VideoAttachmentsApi<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    overloads! {
        /// Download attachment `index` of a media source into a temporary file.
        get_attachment, get_attachment_with_headers
            => get_attachment_with_http_info(video_id: Uuid, media_source_id: &str, index: i32) -> Option<DownloadedFile>
    }

    pub fn get_attachment_with_http_info(
        &self,
        video_id: Uuid,
        media_source_id: &str,
        index: i32,
        headers: &[(&str, &str)],
    ) -> Result<ApiResponse<Option<DownloadedFile>>> {
        let call = GET_ATTACHMENT
            .call()
            .path("videoId", Some(&video_id))
            .path("mediaSourceId", Some(media_source_id))
            .path("index", Some(&index))
            .headers(headers.iter().copied());
        self.client.invoke_file(call)
    }
}
