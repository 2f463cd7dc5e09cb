//! Video streams, versions and additional parts.

use uuid::Uuid;

use crate::client::ApiClient;
use crate::download::DownloadedFile;
use crate::error::Result;
use crate::http::HttpMethod;
use crate::operation::{Call, Operation, ACCEPT_JSON, ACCEPT_VIDEO};
use crate::params::CollectionFormat;
use crate::response::ApiResponse;
use crate::types::{BaseItemDtoQueryResult, EncodingContext, SubtitleDeliveryMethod};

pub const DELETE_ALTERNATE_SOURCES: Operation = Operation::new(
    "deleteAlternateSources",
    HttpMethod::Delete,
    "/Videos/{itemId}/AlternateSources",
    ACCEPT_JSON,
);
pub const GET_ADDITIONAL_PART: Operation = Operation::new(
    "getAdditionalPart",
    HttpMethod::Get,
    "/Videos/{itemId}/AdditionalParts",
    ACCEPT_JSON,
);
pub const GET_VIDEO_STREAM: Operation = Operation::new(
    "getVideoStream",
    HttpMethod::Get,
    "/Videos/{itemId}/stream",
    ACCEPT_VIDEO,
);
pub const GET_VIDEO_STREAM_BY_CONTAINER: Operation = Operation::new(
    "getVideoStreamByContainer",
    HttpMethod::Get,
    "/Videos/{itemId}/stream.{container}",
    ACCEPT_VIDEO,
);
pub const HEAD_VIDEO_STREAM: Operation = Operation::new(
    "headVideoStream",
    HttpMethod::Head,
    "/Videos/{itemId}/stream",
    ACCEPT_VIDEO,
);
pub const MERGE_VERSIONS: Operation = Operation::new(
    "mergeVersions",
    HttpMethod::Post,
    "/Videos/MergeVersions",
    ACCEPT_JSON,
);

/// Transcoding and delivery options for the stream endpoints.
///
/// `container` is only sent by the operations that take it as a query
/// parameter; `get_video_stream_by_container` puts it in the path instead.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoStreamOptions {
    pub container: Option<String>,
    /// Serve the file as stored, without transcoding.
    pub r#static: Option<bool>,
    pub params: Option<String>,
    pub tag: Option<String>,
    pub device_profile_id: Option<String>,
    pub play_session_id: Option<String>,
    pub segment_container: Option<String>,
    pub segment_length: Option<i32>,
    pub min_segments: Option<i32>,
    pub media_source_id: Option<String>,
    pub device_id: Option<String>,
    pub audio_codec: Option<String>,
    pub enable_auto_stream_copy: Option<bool>,
    pub allow_video_stream_copy: Option<bool>,
    pub allow_audio_stream_copy: Option<bool>,
    pub break_on_non_key_frames: Option<bool>,
    pub audio_sample_rate: Option<i32>,
    pub max_audio_bit_depth: Option<i32>,
    pub audio_bit_rate: Option<i32>,
    pub audio_channels: Option<i32>,
    pub max_audio_channels: Option<i32>,
    pub profile: Option<String>,
    pub level: Option<String>,
    pub framerate: Option<f32>,
    pub max_framerate: Option<f32>,
    pub copy_timestamps: Option<bool>,
    pub start_time_ticks: Option<i64>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub max_width: Option<i32>,
    pub max_height: Option<i32>,
    pub video_bit_rate: Option<i32>,
    pub subtitle_stream_index: Option<i32>,
    pub subtitle_method: Option<SubtitleDeliveryMethod>,
    pub max_ref_frames: Option<i32>,
    pub max_video_bit_depth: Option<i32>,
    pub require_avc: Option<bool>,
    pub de_interlace: Option<bool>,
    pub require_non_anamorphic: Option<bool>,
    pub transcoding_max_audio_channels: Option<i32>,
    pub cpu_core_limit: Option<i32>,
    pub live_stream_id: Option<String>,
    pub enable_mpegts_m2ts_mode: Option<bool>,
    pub video_codec: Option<String>,
    pub subtitle_codec: Option<String>,
    pub transcode_reasons: Option<String>,
    pub audio_stream_index: Option<i32>,
    pub video_stream_index: Option<i32>,
    pub context: Option<EncodingContext>,
    pub enable_audio_vbr_encoding: Option<bool>,
}

impl VideoStreamOptions {
    fn apply(&self, call: Call, with_container: bool) -> Call {
        let call = if with_container {
            call.query("container", self.container.as_ref())
        } else {
            call
        };
        call.query("static", self.r#static.as_ref())
            .query("params", self.params.as_ref())
            .query("tag", self.tag.as_ref())
            .query("deviceProfileId", self.device_profile_id.as_ref())
            .query("playSessionId", self.play_session_id.as_ref())
            .query("segmentContainer", self.segment_container.as_ref())
            .query("segmentLength", self.segment_length.as_ref())
            .query("minSegments", self.min_segments.as_ref())
            .query("mediaSourceId", self.media_source_id.as_ref())
            .query("deviceId", self.device_id.as_ref())
            .query("audioCodec", self.audio_codec.as_ref())
            .query("enableAutoStreamCopy", self.enable_auto_stream_copy.as_ref())
            .query("allowVideoStreamCopy", self.allow_video_stream_copy.as_ref())
            .query("allowAudioStreamCopy", self.allow_audio_stream_copy.as_ref())
            .query("breakOnNonKeyFrames", self.break_on_non_key_frames.as_ref())
            .query("audioSampleRate", self.audio_sample_rate.as_ref())
            .query("maxAudioBitDepth", self.max_audio_bit_depth.as_ref())
            .query("audioBitRate", self.audio_bit_rate.as_ref())
            .query("audioChannels", self.audio_channels.as_ref())
            .query("maxAudioChannels", self.max_audio_channels.as_ref())
            .query("profile", self.profile.as_ref())
            .query("level", self.level.as_ref())
            .query("framerate", self.framerate.as_ref())
            .query("maxFramerate", self.max_framerate.as_ref())
            .query("copyTimestamps", self.copy_timestamps.as_ref())
            .query("startTimeTicks", self.start_time_ticks.as_ref())
            .query("width", self.width.as_ref())
            .query("height", self.height.as_ref())
            .query("maxWidth", self.max_width.as_ref())
            .query("maxHeight", self.max_height.as_ref())
            .query("videoBitRate", self.video_bit_rate.as_ref())
            .query("subtitleStreamIndex", self.subtitle_stream_index.as_ref())
            .query("subtitleMethod", self.subtitle_method.as_ref())
            .query("maxRefFrames", self.max_ref_frames.as_ref())
            .query("maxVideoBitDepth", self.max_video_bit_depth.as_ref())
            .query("requireAvc", self.require_avc.as_ref())
            .query("deInterlace", self.de_interlace.as_ref())
            .query("requireNonAnamorphic", self.require_non_anamorphic.as_ref())
            .query(
                "transcodingMaxAudioChannels",
                self.transcoding_max_audio_channels.as_ref(),
            )
            .query("cpuCoreLimit", self.cpu_core_limit.as_ref())
            .query("liveStreamId", self.live_stream_id.as_ref())
            .query("enableMpegtsM2TsMode", self.enable_mpegts_m2ts_mode.as_ref())
            .query("videoCodec", self.video_codec.as_ref())
            .query("subtitleCodec", self.subtitle_codec.as_ref())
            .query("transcodeReasons", self.transcode_reasons.as_ref())
            .query("audioStreamIndex", self.audio_stream_index.as_ref())
            .query("videoStreamIndex", self.video_stream_index.as_ref())
            .query("context", self.context.as_ref())
            .query("enableAudioVbrEncoding", self.enable_audio_vbr_encoding.as_ref())
    }
}

pub struct VideosApi<'a> {
    client: &'a ApiClient,
}

impl<'a> VideosApi<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    overloads! {
        /// Remove alternate video sources linked to `item_id`.
        delete_alternate_sources, delete_alternate_sources_with_headers
            => delete_alternate_sources_with_http_info(item_id: Uuid) -> ()
    }

    pub fn delete_alternate_sources_with_http_info(
        &self,
        item_id: Uuid,
        headers: &[(&str, &str)],
    ) -> Result<ApiResponse<()>> {
        let call = DELETE_ALTERNATE_SOURCES
            .call()
            .path("itemId", Some(&item_id))
            .headers(headers.iter().copied());
        self.client.invoke_empty(call)
    }

    overloads! {
        /// Additional parts of a multi-part video.
        get_additional_part, get_additional_part_with_headers
            => get_additional_part_with_http_info(item_id: Uuid, user_id: Option<Uuid>) -> Option<BaseItemDtoQueryResult>
    }

    pub fn get_additional_part_with_http_info(
        &self,
        item_id: Uuid,
        user_id: Option<Uuid>,
        headers: &[(&str, &str)],
    ) -> Result<ApiResponse<Option<BaseItemDtoQueryResult>>> {
        let call = GET_ADDITIONAL_PART
            .call()
            .path("itemId", Some(&item_id))
            .query("userId", user_id.as_ref())
            .headers(headers.iter().copied());
        self.client.invoke_json(call)
    }

    overloads! {
        /// Download the video stream into a temporary file.
        get_video_stream, get_video_stream_with_headers
            => get_video_stream_with_http_info(item_id: Uuid, options: &VideoStreamOptions) -> Option<DownloadedFile>
    }

    pub fn get_video_stream_with_http_info(
        &self,
        item_id: Uuid,
        options: &VideoStreamOptions,
        headers: &[(&str, &str)],
    ) -> Result<ApiResponse<Option<DownloadedFile>>> {
        let call = GET_VIDEO_STREAM.call().path("itemId", Some(&item_id));
        let call = options.apply(call, true).headers(headers.iter().copied());
        self.client.invoke_file(call)
    }

    overloads! {
        /// Download the video stream remuxed into `container`.
        get_video_stream_by_container, get_video_stream_by_container_with_headers
            => get_video_stream_by_container_with_http_info(item_id: Uuid, container: &str, options: &VideoStreamOptions) -> Option<DownloadedFile>
    }

    pub fn get_video_stream_by_container_with_http_info(
        &self,
        item_id: Uuid,
        container: &str,
        options: &VideoStreamOptions,
        headers: &[(&str, &str)],
    ) -> Result<ApiResponse<Option<DownloadedFile>>> {
        let call = GET_VIDEO_STREAM_BY_CONTAINER
            .call()
            .path("itemId", Some(&item_id))
            .path("container", Some(container));
        let call = options.apply(call, false).headers(headers.iter().copied());
        self.client.invoke_file(call)
    }

    overloads! {
        /// Probe the video stream. HEAD responses carry no body, so the value
        /// is `None` on success; status and headers are on the http-info form.
        head_video_stream, head_video_stream_with_headers
            => head_video_stream_with_http_info(item_id: Uuid, options: &VideoStreamOptions) -> Option<DownloadedFile>
    }

    pub fn head_video_stream_with_http_info(
        &self,
        item_id: Uuid,
        options: &VideoStreamOptions,
        headers: &[(&str, &str)],
    ) -> Result<ApiResponse<Option<DownloadedFile>>> {
        let call = HEAD_VIDEO_STREAM.call().path("itemId", Some(&item_id));
        let call = options.apply(call, true).headers(headers.iter().copied());
        self.client.invoke_file(call)
    }

    overloads! {
        /// Merge the given items into one item with multiple versions.
        merge_versions, merge_versions_with_headers
            => merge_versions_with_http_info(ids: &[Uuid]) -> ()
    }

    pub fn merge_versions_with_http_info(
        &self,
        ids: &[Uuid],
        headers: &[(&str, &str)],
    ) -> Result<ApiResponse<()>> {
        let call = MERGE_VERSIONS
            .call()
            .required_query_list("ids", ids, CollectionFormat::Multi)
            .headers(headers.iter().copied());
        self.client.invoke_empty(call)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::ClientConfig;
    use crate::error::ApiError;
    use crate::transport::testing::{MockReply, MockTransport};

    fn client(mock: &Arc<MockTransport>) -> ApiClient {
        ApiClient::builder(ClientConfig::new("http://nas:8096"))
            .transport(mock.clone())
            .build()
            .unwrap()
    }

    #[test]
    fn stream_is_saved_under_server_name() {
        let mock = Arc::new(MockTransport::new(vec![MockReply::bytes(
            vec![
                ("content-type", "video/mp4"),
                ("content-disposition", "attachment; filename=\"clip.mp4\""),
            ],
            b"\x00\x00\x00\x18ftypmp42",
        )]));
        let options = VideoStreamOptions {
            container: Some("mp4".to_string()),
            r#static: Some(true),
            context: Some(EncodingContext::Static),
            subtitle_method: Some(SubtitleDeliveryMethod::External),
            ..VideoStreamOptions::default()
        };

        let response = client(&mock)
            .videos()
            .get_video_stream_with_http_info(Uuid::nil(), &options, &[])
            .unwrap();
        assert_eq!(response.status_code(), 200);
        let file = response.into_data().unwrap();
        assert_eq!(file.file_name(), Some("clip.mp4"));
        assert_eq!(std::fs::read(file.path()).unwrap(), b"\x00\x00\x00\x18ftypmp42");

        let request = &mock.requests()[0];
        assert_eq!(
            request.url,
            "http://nas:8096/Videos/00000000-0000-0000-0000-000000000000/stream\
             ?container=mp4&static=true&subtitleMethod=External&context=Static"
        );
        assert_eq!(request.header("Accept"), Some(ACCEPT_VIDEO));
    }

    #[test]
    fn container_goes_into_path_for_by_container() {
        let mock = Arc::new(MockTransport::new(vec![MockReply::bytes(Vec::new(), b"x")]));
        let options = VideoStreamOptions {
            container: Some("ignored".to_string()),
            ..VideoStreamOptions::default()
        };
        client(&mock)
            .videos()
            .get_video_stream_by_container(Uuid::nil(), "mkv", &options)
            .unwrap();
        assert_eq!(
            mock.requests()[0].url,
            "http://nas:8096/Videos/00000000-0000-0000-0000-000000000000/stream.mkv"
        );
    }

    #[test]
    fn head_has_no_value() {
        let mock = Arc::new(MockTransport::new(vec![MockReply::no_body(200)]));
        let result = client(&mock)
            .videos()
            .head_video_stream(Uuid::nil(), &VideoStreamOptions::default())
            .unwrap();
        assert!(result.is_none());
        assert_eq!(mock.requests()[0].method, HttpMethod::Head);
    }

    #[test]
    fn merge_versions_repeats_ids() {
        let mock = Arc::new(MockTransport::new(vec![MockReply::no_body(204)]));
        let a = Uuid::parse_str("aaaaaaaa-0000-0000-0000-000000000001").unwrap();
        let b = Uuid::parse_str("bbbbbbbb-0000-0000-0000-000000000002").unwrap();
        client(&mock).videos().merge_versions(&[a, b]).unwrap();

        let request = &mock.requests()[0];
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(
            request.url,
            "http://nas:8096/Videos/MergeVersions\
             ?ids=aaaaaaaa-0000-0000-0000-000000000001&ids=bbbbbbbb-0000-0000-0000-000000000002"
        );
    }

    #[test]
    fn merge_versions_without_ids_is_rejected_locally() {
        let mock = Arc::new(MockTransport::default());
        let err = client(&mock).videos().merge_versions(&[]).unwrap_err();
        assert!(matches!(
            err,
            ApiError::MissingParameter {
                operation: "mergeVersions",
                param: "ids"
            }
        ));
        assert_eq!(
            err.to_string(),
            "Missing the required parameter 'ids' when calling mergeVersions"
        );
        assert_eq!(mock.calls(), 0);
    }

    #[test]
    fn delete_alternate_sources_discards_body() {
        let mock = Arc::new(MockTransport::new(vec![MockReply::json("{\"ignored\":true}")]));
        let response = client(&mock)
            .videos()
            .delete_alternate_sources_with_http_info(Uuid::nil(), &[("X-Reason", "dedupe")])
            .unwrap();
        assert_eq!(response.status_code(), 200);
        let request = &mock.requests()[0];
        assert_eq!(request.method, HttpMethod::Delete);
        assert_eq!(request.header("x-reason"), Some("dedupe"));
    }

    #[test]
    fn additional_parts_decode() {
        let mock = Arc::new(MockTransport::new(vec![MockReply::json(
            r#"{"Items":[{"Id":"00000000-0000-0000-0000-000000000007","Name":"Part 2"}],"TotalRecordCount":1}"#,
        )]));
        let parts = client(&mock)
            .videos()
            .get_additional_part(Uuid::nil(), None)
            .unwrap()
            .unwrap();
        assert_eq!(parts.items[0].name.as_deref(), Some("Part 2"));
        assert_eq!(
            mock.requests()[0].url,
            "http://nas:8096/Videos/00000000-0000-0000-0000-000000000000/AdditionalParts"
        );
    }
}
