//! Trailer listing.
//!
//! `/Trailers` accepts the server's full item filter set. `TrailersOptions`
//! carries the commonly used part of it; parameters are sent in the order
//! the server documents them.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::client::ApiClient;
use crate::error::Result;
use crate::http::HttpMethod;
use crate::operation::{Call, Operation, ACCEPT_JSON};
use crate::params::CollectionFormat;
use crate::response::ApiResponse;
use crate::types::{
    BaseItemDtoQueryResult, BaseItemKind, ImageType, ItemFields, ItemFilter, ItemSortBy,
    LocationType, SortOrder,
};

pub const GET_TRAILERS: Operation =
    Operation::new("getTrailers", HttpMethod::Get, "/Trailers", ACCEPT_JSON);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrailersOptions {
    pub user_id: Option<Uuid>,
    pub max_official_rating: Option<String>,
    pub has_theme_song: Option<bool>,
    pub has_theme_video: Option<bool>,
    pub has_subtitles: Option<bool>,
    pub has_special_feature: Option<bool>,
    pub has_trailer: Option<bool>,
    pub adjacent_to: Option<String>,
    pub parent_index_number: Option<i32>,
    pub has_parental_rating: Option<bool>,
    pub is_hd: Option<bool>,
    pub is_4k: Option<bool>,
    pub location_types: Vec<LocationType>,
    pub exclude_location_types: Vec<LocationType>,
    pub is_missing: Option<bool>,
    pub is_unaired: Option<bool>,
    pub min_community_rating: Option<f64>,
    pub min_critic_rating: Option<f64>,
    pub min_premiere_date: Option<DateTime<Utc>>,
    pub min_date_last_saved: Option<DateTime<Utc>>,
    pub max_premiere_date: Option<DateTime<Utc>>,
    pub has_overview: Option<bool>,
    pub is_movie: Option<bool>,
    pub is_series: Option<bool>,
    pub exclude_item_ids: Vec<Uuid>,
    pub start_index: Option<i32>,
    pub limit: Option<i32>,
    pub recursive: Option<bool>,
    pub search_term: Option<String>,
    pub sort_order: Vec<SortOrder>,
    pub parent_id: Option<Uuid>,
    pub fields: Vec<ItemFields>,
    pub exclude_item_types: Vec<BaseItemKind>,
    pub filters: Vec<ItemFilter>,
    pub is_favorite: Option<bool>,
    pub image_types: Vec<ImageType>,
    pub sort_by: Vec<ItemSortBy>,
    pub is_played: Option<bool>,
    pub genres: Vec<String>,
    pub official_ratings: Vec<String>,
    pub tags: Vec<String>,
    pub years: Vec<i32>,
    pub enable_user_data: Option<bool>,
    pub image_type_limit: Option<i32>,
    pub enable_image_types: Vec<ImageType>,
    pub person: Option<String>,
    pub studios: Vec<String>,
    pub artists: Vec<String>,
    pub ids: Vec<Uuid>,
    pub name_starts_with: Option<String>,
    pub genre_ids: Vec<Uuid>,
    pub enable_total_record_count: Option<bool>,
    pub enable_images: Option<bool>,
}

impl TrailersOptions {
    fn apply(&self, call: Call) -> Call {
        use CollectionFormat::Multi;

        call.query("userId", self.user_id.as_ref())
            .query("maxOfficialRating", self.max_official_rating.as_ref())
            .query("hasThemeSong", self.has_theme_song.as_ref())
            .query("hasThemeVideo", self.has_theme_video.as_ref())
            .query("hasSubtitles", self.has_subtitles.as_ref())
            .query("hasSpecialFeature", self.has_special_feature.as_ref())
            .query("hasTrailer", self.has_trailer.as_ref())
            .query("adjacentTo", self.adjacent_to.as_ref())
            .query("parentIndexNumber", self.parent_index_number.as_ref())
            .query("hasParentalRating", self.has_parental_rating.as_ref())
            .query("isHd", self.is_hd.as_ref())
            .query("is4K", self.is_4k.as_ref())
            .query_list("locationTypes", &self.location_types, Multi)
            .query_list("excludeLocationTypes", &self.exclude_location_types, Multi)
            .query("isMissing", self.is_missing.as_ref())
            .query("isUnaired", self.is_unaired.as_ref())
            .query("minCommunityRating", self.min_community_rating.as_ref())
            .query("minCriticRating", self.min_critic_rating.as_ref())
            .query("minPremiereDate", self.min_premiere_date.as_ref())
            .query("minDateLastSaved", self.min_date_last_saved.as_ref())
            .query("maxPremiereDate", self.max_premiere_date.as_ref())
            .query("hasOverview", self.has_overview.as_ref())
            .query("isMovie", self.is_movie.as_ref())
            .query("isSeries", self.is_series.as_ref())
            .query_list("excludeItemIds", &self.exclude_item_ids, Multi)
            .query("startIndex", self.start_index.as_ref())
            .query("limit", self.limit.as_ref())
            .query("recursive", self.recursive.as_ref())
            .query("searchTerm", self.search_term.as_ref())
            .query_list("sortOrder", &self.sort_order, Multi)
            .query("parentId", self.parent_id.as_ref())
            .query_list("fields", &self.fields, Multi)
            .query_list("excludeItemTypes", &self.exclude_item_types, Multi)
            .query_list("filters", &self.filters, Multi)
            .query("isFavorite", self.is_favorite.as_ref())
            .query_list("imageTypes", &self.image_types, Multi)
            .query_list("sortBy", &self.sort_by, Multi)
            .query("isPlayed", self.is_played.as_ref())
            .query_list("genres", &self.genres, Multi)
            .query_list("officialRatings", &self.official_ratings, Multi)
            .query_list("tags", &self.tags, Multi)
            .query_list("years", &self.years, Multi)
            .query("enableUserData", self.enable_user_data.as_ref())
            .query("imageTypeLimit", self.image_type_limit.as_ref())
            .query_list("enableImageTypes", &self.enable_image_types, Multi)
            .query("person", self.person.as_ref())
            .query_list("studios", &self.studios, Multi)
            .query_list("artists", &self.artists, Multi)
            .query_list("ids", &self.ids, Multi)
            .query("nameStartsWith", self.name_starts_with.as_ref())
            .query_list("genreIds", &self.genre_ids, Multi)
            .query("enableTotalRecordCount", self.enable_total_record_count.as_ref())
            .query("enableImages", self.enable_images.as_ref())
    }
}

pub struct TrailersApi<'a> {
    client: &'a ApiClient,
}

impl<'a> TrailersApi<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    overloads! {
        /// Trailers matching `options`.
        get_trailers, get_trailers_with_headers
            => get_trailers_with_http_info(options: &TrailersOptions) -> Option<BaseItemDtoQueryResult>
    }

    pub fn get_trailers_with_http_info(
        &self,
        options: &TrailersOptions,
        headers: &[(&str, &str)],
    ) -> Result<ApiResponse<Option<BaseItemDtoQueryResult>>> {
        let call = options
            .apply(GET_TRAILERS.call())
            .headers(headers.iter().copied());
        self.client.invoke_json(call)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::TimeZone;

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
    fn no_options_means_no_query_string() {
        let mock = Arc::new(MockTransport::new(vec![MockReply::json("")]));
        let result = client(&mock)
            .trailers()
            .get_trailers(&TrailersOptions::default())
            .unwrap();
        assert!(result.is_none());
        assert_eq!(mock.requests()[0].url, "http://nas:8096/Trailers");
    }

    #[test]
    fn mixed_filters_are_encoded() {
        let mock = Arc::new(MockTransport::new(vec![MockReply::json("{}")]));
        let first = Uuid::parse_str("11111111-2222-3333-4444-555555555555").unwrap();
        let options = TrailersOptions {
            is_4k: Some(true),
            min_premiere_date: Some(Utc.with_ymd_and_hms(2020, 5, 1, 8, 30, 0).unwrap()),
            search_term: Some("star wars".to_string()),
            sort_order: vec![SortOrder::Descending],
            sort_by: vec![ItemSortBy::PremiereDate, ItemSortBy::SortName],
            genres: vec!["Sci-Fi".to_string(), "Action & Adventure".to_string()],
            years: vec![1977, 1980],
            ids: vec![first, Uuid::nil()],
            enable_images: Some(false),
            ..TrailersOptions::default()
        };
        client(&mock).trailers().get_trailers(&options).unwrap();

        let url = &mock.requests()[0].url;
        let query = url.split_once('?').unwrap().1;
        assert_eq!(
            query.split('&').collect::<Vec<_>>(),
            vec![
                "is4K=true",
                "minPremiereDate=2020-05-01T08%3A30%3A00.000Z",
                "searchTerm=star%20wars",
                "sortOrder=Descending",
                "sortBy=PremiereDate",
                "sortBy=SortName",
                "genres=Sci-Fi",
                "genres=Action%20%26%20Adventure",
                "years=1977",
                "years=1980",
                "ids=11111111-2222-3333-4444-555555555555",
                "ids=00000000-0000-0000-0000-000000000000",
                "enableImages=false",
            ]
        );
    }

    #[test]
    fn server_failure_keeps_body() {
        let mock = Arc::new(MockTransport::new(vec![MockReply::status(500, "boom")]));
        let err = client(&mock)
            .trailers()
            .get_trailers_with_http_info(&TrailersOptions::default(), &[])
            .unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.to_string(), "getTrailers call failed with: 500 - boom");
    }
}
