//! Instant mixes: playlists generated from a seed item.

use uuid::Uuid;

use crate::client::ApiClient;
use crate::error::Result;
use crate::http::HttpMethod;
use crate::operation::{Call, Operation, ACCEPT_JSON};
use crate::params::CollectionFormat;
use crate::response::ApiResponse;
use crate::types::{BaseItemDtoQueryResult, ImageType, ItemFields};

pub const GET_INSTANT_MIX_FROM_ALBUM: Operation = Operation::new(
    "getInstantMixFromAlbum",
    HttpMethod::Get,
    "/Albums/{itemId}/InstantMix",
    ACCEPT_JSON,
);
pub const GET_INSTANT_MIX_FROM_ARTISTS: Operation = Operation::new(
    "getInstantMixFromArtists",
    HttpMethod::Get,
    "/Artists/{itemId}/InstantMix",
    ACCEPT_JSON,
);
pub const GET_INSTANT_MIX_FROM_ARTISTS2: Operation = Operation::new(
    "getInstantMixFromArtists2",
    HttpMethod::Get,
    "/Artists/InstantMix",
    ACCEPT_JSON,
);
pub const GET_INSTANT_MIX_FROM_ITEM: Operation = Operation::new(
    "getInstantMixFromItem",
    HttpMethod::Get,
    "/Items/{itemId}/InstantMix",
    ACCEPT_JSON,
);
pub const GET_INSTANT_MIX_FROM_MUSIC_GENRE_BY_ID: Operation = Operation::new(
    "getInstantMixFromMusicGenreById",
    HttpMethod::Get,
    "/MusicGenres/InstantMix",
    ACCEPT_JSON,
);
pub const GET_INSTANT_MIX_FROM_MUSIC_GENRE_BY_NAME: Operation = Operation::new(
    "getInstantMixFromMusicGenreByName",
    HttpMethod::Get,
    "/MusicGenres/{name}/InstantMix",
    ACCEPT_JSON,
);
pub const GET_INSTANT_MIX_FROM_PLAYLIST: Operation = Operation::new(
    "getInstantMixFromPlaylist",
    HttpMethod::Get,
    "/Playlists/{itemId}/InstantMix",
    ACCEPT_JSON,
);
pub const GET_INSTANT_MIX_FROM_SONG: Operation = Operation::new(
    "getInstantMixFromSong",
    HttpMethod::Get,
    "/Songs/{itemId}/InstantMix",
    ACCEPT_JSON,
);

/// Optional filters shared by every instant-mix operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstantMixOptions {
    pub user_id: Option<Uuid>,
    pub limit: Option<i32>,
    pub fields: Vec<ItemFields>,
    pub enable_images: Option<bool>,
    pub enable_user_data: Option<bool>,
    pub image_type_limit: Option<i32>,
    pub enable_image_types: Vec<ImageType>,
}

impl InstantMixOptions {
    fn apply(&self, call: Call) -> Call {
        call.query("userId", self.user_id.as_ref())
            .query("limit", self.limit.as_ref())
            .query_list("fields", &self.fields, CollectionFormat::Multi)
            .query("enableImages", self.enable_images.as_ref())
            .query("enableUserData", self.enable_user_data.as_ref())
            .query("imageTypeLimit", self.image_type_limit.as_ref())
            .query_list("enableImageTypes", &self.enable_image_types, CollectionFormat::Multi)
    }
}

type MixResult = Option<BaseItemDtoQueryResult>;

pub struct InstantMixApi<'a> {
    client: &'a ApiClient,
}

impl<'a> InstantMixApi<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    fn send(
        &self,
        call: Call,
        options: &InstantMixOptions,
        headers: &[(&str, &str)],
    ) -> Result<ApiResponse<MixResult>> {
        let call = options.apply(call).headers(headers.iter().copied());
        self.client.invoke_json(call)
    }

    overloads! {
        /// Mix seeded by an album.
        get_instant_mix_from_album, get_instant_mix_from_album_with_headers
            => get_instant_mix_from_album_with_http_info(item_id: Uuid, options: &InstantMixOptions) -> MixResult
    }

    pub fn get_instant_mix_from_album_with_http_info(
        &self,
        item_id: Uuid,
        options: &InstantMixOptions,
        headers: &[(&str, &str)],
    ) -> Result<ApiResponse<MixResult>> {
        let call = GET_INSTANT_MIX_FROM_ALBUM.call().path("itemId", Some(&item_id));
        self.send(call, options, headers)
    }

    overloads! {
        /// Mix seeded by an artist.
        get_instant_mix_from_artists, get_instant_mix_from_artists_with_headers
            => get_instant_mix_from_artists_with_http_info(item_id: Uuid, options: &InstantMixOptions) -> MixResult
    }

    pub fn get_instant_mix_from_artists_with_http_info(
        &self,
        item_id: Uuid,
        options: &InstantMixOptions,
        headers: &[(&str, &str)],
    ) -> Result<ApiResponse<MixResult>> {
        let call = GET_INSTANT_MIX_FROM_ARTISTS.call().path("itemId", Some(&item_id));
        self.send(call, options, headers)
    }

    overloads! {
        /// Mix seeded by an artist, with the id passed as a query parameter.
        get_instant_mix_from_artists2, get_instant_mix_from_artists2_with_headers
            => get_instant_mix_from_artists2_with_http_info(id: Uuid, options: &InstantMixOptions) -> MixResult
    }

    pub fn get_instant_mix_from_artists2_with_http_info(
        &self,
        id: Uuid,
        options: &InstantMixOptions,
        headers: &[(&str, &str)],
    ) -> Result<ApiResponse<MixResult>> {
        let call = GET_INSTANT_MIX_FROM_ARTISTS2.call().required_query("id", Some(&id));
        self.send(call, options, headers)
    }

    overloads! {
        /// Mix seeded by any library item.
        get_instant_mix_from_item, get_instant_mix_from_item_with_headers
            => get_instant_mix_from_item_with_http_info(item_id: Uuid, options: &InstantMixOptions) -> MixResult
    }

    pub fn get_instant_mix_from_item_with_http_info(
        &self,
        item_id: Uuid,
        options: &InstantMixOptions,
        headers: &[(&str, &str)],
    ) -> Result<ApiResponse<MixResult>> {
        let call = GET_INSTANT_MIX_FROM_ITEM.call().path("itemId", Some(&item_id));
        self.send(call, options, headers)
    }

    overloads! {
        get_instant_mix_from_music_genre_by_id, get_instant_mix_from_music_genre_by_id_with_headers
            => get_instant_mix_from_music_genre_by_id_with_http_info(id: Uuid, options: &InstantMixOptions) -> MixResult
    }

    pub fn get_instant_mix_from_music_genre_by_id_with_http_info(
        &self,
        id: Uuid,
        options: &InstantMixOptions,
        headers: &[(&str, &str)],
    ) -> Result<ApiResponse<MixResult>> {
        let call = GET_INSTANT_MIX_FROM_MUSIC_GENRE_BY_ID
            .call()
            .required_query("id", Some(&id));
        self.send(call, options, headers)
    }

    overloads! {
        /// Mix seeded by a genre name. The name is percent-encoded into the path.
        get_instant_mix_from_music_genre_by_name, get_instant_mix_from_music_genre_by_name_with_headers
            => get_instant_mix_from_music_genre_by_name_with_http_info(name: &str, options: &InstantMixOptions) -> MixResult
    }

    pub fn get_instant_mix_from_music_genre_by_name_with_http_info(
        &self,
        name: &str,
        options: &InstantMixOptions,
        headers: &[(&str, &str)],
    ) -> Result<ApiResponse<MixResult>> {
        let call = GET_INSTANT_MIX_FROM_MUSIC_GENRE_BY_NAME
            .call()
            .path("name", Some(name));
        self.send(call, options, headers)
    }

    overloads! {
        get_instant_mix_from_playlist, get_instant_mix_from_playlist_with_headers
            => get_instant_mix_from_playlist_with_http_info(item_id: Uuid, options: &InstantMixOptions) -> MixResult
    }

    pub fn get_instant_mix_from_playlist_with_http_info(
        &self,
        item_id: Uuid,
        options: &InstantMixOptions,
        headers: &[(&str, &str)],
    ) -> Result<ApiResponse<MixResult>> {
        let call = GET_INSTANT_MIX_FROM_PLAYLIST.call().path("itemId", Some(&item_id));
        self.send(call, options, headers)
    }

    overloads! {
        get_instant_mix_from_song, get_instant_mix_from_song_with_headers
            => get_instant_mix_from_song_with_http_info(item_id: Uuid, options: &InstantMixOptions) -> MixResult
    }

    pub fn get_instant_mix_from_song_with_http_info(
        &self,
        item_id: Uuid,
        options: &InstantMixOptions,
        headers: &[(&str, &str)],
    ) -> Result<ApiResponse<MixResult>> {
        let call = GET_INSTANT_MIX_FROM_SONG.call().path("itemId", Some(&item_id));
        self.send(call, options, headers)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::ClientConfig;
    use crate::transport::testing::{MockReply, MockTransport};

    fn client(mock: &Arc<MockTransport>) -> ApiClient {
        ApiClient::builder(ClientConfig::new("http://nas:8096"))
            .transport(mock.clone())
            .build()
            .unwrap()
    }

    #[test]
    fn album_mix_encodes_options_in_declared_order() {
        let mock = Arc::new(MockTransport::new(vec![MockReply::json(
            r#"{"Items":[],"TotalRecordCount":0,"StartIndex":0}"#,
        )]));
        let user = Uuid::parse_str("0f8fad5b-d9cb-469f-a165-70867728950e").unwrap();
        let options = InstantMixOptions {
            user_id: Some(user),
            limit: Some(20),
            fields: vec![ItemFields::Genres, ItemFields::IsHd],
            enable_image_types: vec![ImageType::Primary],
            ..InstantMixOptions::default()
        };

        let result = client(&mock)
            .instant_mix()
            .get_instant_mix_from_album(Uuid::nil(), &options)
            .unwrap();
        assert_eq!(result, Some(BaseItemDtoQueryResult::default()));

        let sent = mock.requests();
        assert_eq!(
            sent[0].url,
            "http://nas:8096/Albums/00000000-0000-0000-0000-000000000000/InstantMix\
             ?userId=0f8fad5b-d9cb-469f-a165-70867728950e&limit=20\
             &fields=Genres&fields=IsHD&enableImageTypes=Primary"
        );
        assert_eq!(sent[0].header("Accept"), Some(ACCEPT_JSON));
    }

    #[test]
    fn genre_name_is_encoded_into_path() {
        let mock = Arc::new(MockTransport::new(vec![MockReply::json("{}")]));
        client(&mock)
            .instant_mix()
            .get_instant_mix_from_music_genre_by_name_with_headers(
                "Rock & Roll",
                &InstantMixOptions::default(),
                &[("X-Trace", "1")],
            )
            .unwrap();

        let sent = mock.requests();
        assert_eq!(
            sent[0].url,
            "http://nas:8096/MusicGenres/Rock%20%26%20Roll/InstantMix"
        );
        assert_eq!(sent[0].header("X-Trace"), Some("1"));
    }

    #[test]
    fn genre_id_goes_into_query() {
        let mock = Arc::new(MockTransport::new(vec![MockReply::json("{}")]));
        let id = Uuid::nil();
        let response = client(&mock)
            .instant_mix()
            .get_instant_mix_from_music_genre_by_id_with_http_info(
                id,
                &InstantMixOptions::default(),
                &[],
            )
            .unwrap();
        assert_eq!(response.status_code(), 200);
        assert_eq!(
            mock.requests()[0].url,
            "http://nas:8096/MusicGenres/InstantMix?id=00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn error_status_names_the_operation() {
        let mock = Arc::new(MockTransport::new(vec![MockReply::status(404, "Item not found")]));
        let err = client(&mock)
            .instant_mix()
            .get_instant_mix_from_song(Uuid::nil(), &InstantMixOptions::default())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "getInstantMixFromSong call failed with: 404 - Item not found"
        );
        assert_eq!(err.body(), Some("Item not found"));
    }
}
