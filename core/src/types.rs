//! Media-server DTOs and the enums used as query parameters.
//!
//! # Design
//! Only the fields the typed operations need are modelled. Unknown JSON
//! fields are ignored, so newer servers keep decoding. The mock-server crate
//! defines its own copies of these shapes; integration tests catch drift.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::params::ParamValue;

/// Declares a fieldless enum whose serde form and query form are the same
/// wire name.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($variant:ident => $wire:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ParamValue for $name {
            fn to_param(&self) -> String {
                self.as_str().to_string()
            }
        }
    };
}

wire_enum! {
    /// Extra fields the server should include on returned items.
    pub enum ItemFields {
        AirTime => "AirTime",
        CanDelete => "CanDelete",
        CanDownload => "CanDownload",
        ChannelInfo => "ChannelInfo",
        Chapters => "Chapters",
        Trickplay => "Trickplay",
        ChildCount => "ChildCount",
        CumulativeRunTimeTicks => "CumulativeRunTimeTicks",
        CustomRating => "CustomRating",
        DateCreated => "DateCreated",
        DateLastMediaAdded => "DateLastMediaAdded",
        DisplayPreferencesId => "DisplayPreferencesId",
        Etag => "Etag",
        ExternalUrls => "ExternalUrls",
        Genres => "Genres",
        ItemCounts => "ItemCounts",
        MediaSourceCount => "MediaSourceCount",
        MediaSources => "MediaSources",
        OriginalTitle => "OriginalTitle",
        Overview => "Overview",
        ParentId => "ParentId",
        Path => "Path",
        People => "People",
        PlayAccess => "PlayAccess",
        ProductionLocations => "ProductionLocations",
        ProviderIds => "ProviderIds",
        PrimaryImageAspectRatio => "PrimaryImageAspectRatio",
        RecursiveItemCount => "RecursiveItemCount",
        Settings => "Settings",
        SeriesStudio => "SeriesStudio",
        SortName => "SortName",
        SpecialEpisodeNumbers => "SpecialEpisodeNumbers",
        Studios => "Studios",
        Taglines => "Taglines",
        Tags => "Tags",
        RemoteTrailers => "RemoteTrailers",
        MediaStreams => "MediaStreams",
        SeasonUserData => "SeasonUserData",
        DateLastRefreshed => "DateLastRefreshed",
        DateLastSaved => "DateLastSaved",
        RefreshState => "RefreshState",
        ChannelImage => "ChannelImage",
        EnableMediaSourceDisplay => "EnableMediaSourceDisplay",
        Width => "Width",
        Height => "Height",
        ExtraIds => "ExtraIds",
        LocalTrailerCount => "LocalTrailerCount",
        IsHd => "IsHD",
        SpecialFeatureCount => "SpecialFeatureCount",
    }
}

wire_enum! {
    pub enum ImageType {
        Primary => "Primary",
        Art => "Art",
        Backdrop => "Backdrop",
        Banner => "Banner",
        Logo => "Logo",
        Thumb => "Thumb",
        Disc => "Disc",
        Box => "Box",
        Screenshot => "Screenshot",
        Menu => "Menu",
        Chapter => "Chapter",
        BoxRear => "BoxRear",
        Profile => "Profile",
    }
}

wire_enum! {
    pub enum SortOrder {
        Ascending => "Ascending",
        Descending => "Descending",
    }
}

wire_enum! {
    pub enum ItemSortBy {
        Default => "Default",
        Album => "Album",
        AlbumArtist => "AlbumArtist",
        Artist => "Artist",
        CommunityRating => "CommunityRating",
        CriticRating => "CriticRating",
        DateCreated => "DateCreated",
        DatePlayed => "DatePlayed",
        IsFavoriteOrLiked => "IsFavoriteOrLiked",
        Name => "Name",
        OfficialRating => "OfficialRating",
        PlayCount => "PlayCount",
        PremiereDate => "PremiereDate",
        ProductionYear => "ProductionYear",
        Random => "Random",
        Runtime => "Runtime",
        SortName => "SortName",
    }
}

wire_enum! {
    pub enum ItemFilter {
        IsFolder => "IsFolder",
        IsNotFolder => "IsNotFolder",
        IsUnplayed => "IsUnplayed",
        IsPlayed => "IsPlayed",
        IsFavorite => "IsFavorite",
        IsResumable => "IsResumable",
        Likes => "Likes",
        Dislikes => "Dislikes",
        IsFavoriteOrLikes => "IsFavoriteOrLikes",
    }
}

wire_enum! {
    pub enum LocationType {
        FileSystem => "FileSystem",
        Remote => "Remote",
        Virtual => "Virtual",
        Offline => "Offline",
    }
}

wire_enum! {
    /// Server-side item kind, sent as the `Type` field.
    pub enum BaseItemKind {
        AggregateFolder => "AggregateFolder",
        Audio => "Audio",
        AudioBook => "AudioBook",
        BoxSet => "BoxSet",
        Book => "Book",
        Channel => "Channel",
        CollectionFolder => "CollectionFolder",
        Episode => "Episode",
        Folder => "Folder",
        Genre => "Genre",
        LiveTvChannel => "LiveTvChannel",
        LiveTvProgram => "LiveTvProgram",
        Movie => "Movie",
        MusicAlbum => "MusicAlbum",
        MusicArtist => "MusicArtist",
        MusicGenre => "MusicGenre",
        MusicVideo => "MusicVideo",
        Person => "Person",
        Photo => "Photo",
        PhotoAlbum => "PhotoAlbum",
        Playlist => "Playlist",
        Season => "Season",
        Series => "Series",
        Studio => "Studio",
        Trailer => "Trailer",
        UserView => "UserView",
        Video => "Video",
        Year => "Year",
    }
}

wire_enum! {
    pub enum EncodingContext {
        Streaming => "Streaming",
        Static => "Static",
    }
}

wire_enum! {
    pub enum SubtitleDeliveryMethod {
        Encode => "Encode",
        Embed => "Embed",
        External => "External",
        Hls => "Hls",
        Drop => "Drop",
    }
}

/// A library item as returned by listing endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct BaseItemDto {
    pub id: Uuid,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub server_id: Option<String>,
    #[serde(rename = "Type", default)]
    pub item_type: Option<BaseItemKind>,
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub run_time_ticks: Option<i64>,
    #[serde(default)]
    pub production_year: Option<i32>,
    #[serde(default)]
    pub premiere_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_folder: Option<bool>,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    #[serde(default)]
    pub album: Option<String>,
    #[serde(default)]
    pub artists: Vec<String>,
    #[serde(default)]
    pub overview: Option<String>,
}

/// One page of items.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct BaseItemDtoQueryResult {
    #[serde(default)]
    pub items: Vec<BaseItemDto>,
    #[serde(default)]
    pub total_record_count: i32,
    #[serde(default)]
    pub start_index: i32,
}
