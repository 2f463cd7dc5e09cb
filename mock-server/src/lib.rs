use std::{collections::HashMap, sync::Arc, time::Duration};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

pub const ALBUM_ID: Uuid = Uuid::from_u128(0x0a1b_0000_0000_4000_8000_0000_0000_0001);
pub const SONG_ID: Uuid = Uuid::from_u128(0x0a1b_0000_0000_4000_8000_0000_0000_0002);
pub const SECOND_SONG_ID: Uuid = Uuid::from_u128(0x0a1b_0000_0000_4000_8000_0000_0000_0003);
pub const MOVIE_ID: Uuid = Uuid::from_u128(0x0a1b_0000_0000_4000_8000_0000_0000_0010);
pub const MOVIE_PART_ID: Uuid = Uuid::from_u128(0x0a1b_0000_0000_4000_8000_0000_0000_0011);
pub const TRAILER_ID: Uuid = Uuid::from_u128(0x0a1b_0000_0000_4000_8000_0000_0000_0020);
pub const SECOND_TRAILER_ID: Uuid = Uuid::from_u128(0x0a1b_0000_0000_4000_8000_0000_0000_0021);
pub const GENRE_ID: Uuid = Uuid::from_u128(0x0a1b_0000_0000_4000_8000_0000_0000_0030);

/// Body of every video stream.
pub const CLIP_BYTES: &[u8] = b"\x00\x00\x00\x18ftypmp42\x00\x00\x00\x00mp42isom mock clip";
/// Body of every attachment.
pub const ATTACHMENT_BYTES: &[u8] = b"OTTO\x00\x0b\x00\x80\x00\x03mock font";

/// Search term that makes `/Trailers` fail with a 500.
pub const FAILING_SEARCH_TERM: &str = "fail";

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Item {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "Type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(default)]
    pub artists: Vec<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub production_year: Option<i32>,
    #[serde(skip)]
    pub parts: Vec<Uuid>,
    #[serde(skip)]
    pub alternate_sources: Vec<Uuid>,
}

impl Item {
    fn new(id: Uuid, name: &str, kind: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            kind: kind.to_string(),
            album: None,
            artists: Vec::new(),
            genres: Vec::new(),
            production_year: None,
            parts: Vec::new(),
            alternate_sources: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QueryResult {
    pub items: Vec<Item>,
    pub total_record_count: i32,
    pub start_index: i32,
}

impl QueryResult {
    fn page(items: Vec<Item>, start_index: usize, limit: Option<usize>) -> Self {
        let total = items.len() as i32;
        let items = items
            .into_iter()
            .skip(start_index)
            .take(limit.unwrap_or(usize::MAX))
            .collect();
        Self {
            items,
            total_record_count: total,
            start_index: start_index as i32,
        }
    }
}

pub type Library = Arc<RwLock<HashMap<Uuid, Item>>>;

/// A small fixed library: one album with two songs, a two-part movie and
/// two trailers.
pub fn seed_library() -> HashMap<Uuid, Item> {
    let mut album = Item::new(ALBUM_ID, "Kind of Blue", "MusicAlbum");
    album.artists = vec!["Miles Davis".to_string()];
    album.genres = vec!["Jazz".to_string()];
    album.production_year = Some(1959);

    let mut song = Item::new(SONG_ID, "So What", "Audio");
    song.album = Some("Kind of Blue".to_string());
    song.artists = vec!["Miles Davis".to_string()];
    song.genres = vec!["Jazz".to_string()];

    let mut second_song = Item::new(SECOND_SONG_ID, "Blue in Green", "Audio");
    second_song.album = Some("Kind of Blue".to_string());
    second_song.artists = vec!["Miles Davis".to_string(), "Bill Evans".to_string()];
    second_song.genres = vec!["Jazz".to_string()];

    let mut movie = Item::new(MOVIE_ID, "Night Shift", "Movie");
    movie.production_year = Some(2021);
    movie.parts = vec![MOVIE_PART_ID];
    let movie_part = Item::new(MOVIE_PART_ID, "Night Shift - Part 2", "Movie");

    let mut trailer = Item::new(TRAILER_ID, "Night Shift (Teaser)", "Trailer");
    trailer.genres = vec!["Thriller".to_string()];
    let mut second_trailer = Item::new(SECOND_TRAILER_ID, "Night Shift (Final)", "Trailer");
    second_trailer.genres = vec!["Thriller".to_string()];

    [album, song, second_song, movie, movie_part, trailer, second_trailer]
        .into_iter()
        .map(|item| (item.id, item))
        .collect()
}

pub fn app() -> Router {
    let library: Library = Arc::new(RwLock::new(seed_library()));
    Router::new()
        .route("/Albums/{itemId}/InstantMix", get(instant_mix_from_item))
        .route("/Artists/{itemId}/InstantMix", get(instant_mix_from_item))
        .route("/Items/{itemId}/InstantMix", get(instant_mix_from_item))
        .route("/Playlists/{itemId}/InstantMix", get(instant_mix_from_item))
        .route("/Songs/{itemId}/InstantMix", get(instant_mix_from_item))
        .route("/Artists/InstantMix", get(instant_mix_from_id))
        .route("/MusicGenres/InstantMix", get(instant_mix_from_id))
        .route("/MusicGenres/{name}/InstantMix", get(instant_mix_from_genre))
        .route("/Trailers", get(trailers))
        .route("/Videos/MergeVersions", post(merge_versions))
        .route(
            "/Videos/{itemId}/{part}",
            get(video_resource).delete(delete_video_resource),
        )
        .route("/Videos/{itemId}/{part}/Attachments/{index}", get(attachment))
        .route("/Users/Me", get(current_session))
        .route("/Slow", get(slow))
        .layer(TraceLayer::new_for_http())
        .with_state(library)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MixQuery {
    pub id: Option<Uuid>,
    pub limit: Option<usize>,
}

fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Item not found")
}

/// Every other item sharing a genre with `seed`, ordered by name.
fn mix_for(items: &HashMap<Uuid, Item>, seed: &Item, limit: Option<usize>) -> QueryResult {
    let mut mix: Vec<Item> = items
        .values()
        .filter(|item| item.id != seed.id)
        .filter(|item| item.genres.iter().any(|genre| seed.genres.contains(genre)))
        .cloned()
        .collect();
    mix.sort_by(|a, b| a.name.cmp(&b.name));
    QueryResult::page(mix, 0, limit)
}

async fn instant_mix_from_item(
    State(library): State<Library>,
    Path(item_id): Path<Uuid>,
    Query(query): Query<MixQuery>,
) -> Result<Json<QueryResult>, (StatusCode, &'static str)> {
    let items = library.read().await;
    let seed = items.get(&item_id).ok_or_else(not_found)?;
    Ok(Json(mix_for(&items, seed, query.limit)))
}

async fn instant_mix_from_id(
    State(library): State<Library>,
    Query(query): Query<MixQuery>,
) -> Result<Json<QueryResult>, (StatusCode, &'static str)> {
    let id = query
        .id
        .ok_or((StatusCode::BAD_REQUEST, "The id field is required."))?;
    if id == GENRE_ID {
        let items = library.read().await;
        let mut seed = Item::new(GENRE_ID, "Jazz", "MusicGenre");
        seed.genres = vec!["Jazz".to_string()];
        return Ok(Json(mix_for(&items, &seed, query.limit)));
    }
    instant_mix_from_item(State(library), Path(id), Query(query)).await
}

async fn instant_mix_from_genre(
    State(library): State<Library>,
    Path(name): Path<String>,
    Query(query): Query<MixQuery>,
) -> Json<QueryResult> {
    let items = library.read().await;
    let mut seed = Item::new(Uuid::nil(), &name, "MusicGenre");
    seed.genres = vec![name];
    Json(mix_for(&items, &seed, query.limit))
}

fn query_values<'a>(pairs: &'a [(String, String)], key: &str) -> Vec<&'a str> {
    pairs
        .iter()
        .filter(|(name, _)| name == key)
        .map(|(_, value)| value.as_str())
        .collect()
}

/// `/Trailers` takes repeated keys (`ids=a&ids=b`), so the query is read
/// as raw pairs.
async fn trailers(
    State(library): State<Library>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    let values = |key| query_values(&pairs, key);

    if values("searchTerm").contains(&FAILING_SEARCH_TERM) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
    }

    let ids: Vec<Uuid> = values("ids")
        .into_iter()
        .filter_map(|value| value.parse().ok())
        .collect();
    let genres = values("genres");
    let start_index = values("startIndex")
        .first()
        .and_then(|value| value.parse().ok())
        .unwrap_or(0);
    let limit = values("limit").first().and_then(|value| value.parse().ok());

    let items = library.read().await;
    let mut trailers: Vec<Item> = items
        .values()
        .filter(|item| item.kind == "Trailer")
        .filter(|item| ids.is_empty() || ids.contains(&item.id))
        .filter(|item| genres.is_empty() || item.genres.iter().any(|g| genres.contains(&g.as_str())))
        .cloned()
        .collect();
    trailers.sort_by(|a, b| a.name.cmp(&b.name));
    Json(QueryResult::page(trailers, start_index, limit)).into_response()
}

async fn merge_versions(
    State(library): State<Library>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<StatusCode, (StatusCode, &'static str)> {
    let ids: Vec<Uuid> = query_values(&pairs, "ids")
        .into_iter()
        .filter_map(|value| value.parse().ok())
        .collect();
    if ids.len() < 2 {
        return Err((
            StatusCode::BAD_REQUEST,
            "Please supply at least two videos to merge.",
        ));
    }

    let mut items = library.write().await;
    if ids.iter().any(|id| !items.contains_key(id)) {
        return Err(not_found());
    }
    let (primary, rest) = ids.split_at(1);
    if let Some(item) = items.get_mut(&primary[0]) {
        item.alternate_sources.extend_from_slice(rest);
    }
    Ok(StatusCode::NO_CONTENT)
}

/// `/Videos/{itemId}/stream`, `/Videos/{itemId}/stream.{container}` and
/// `/Videos/{itemId}/AdditionalParts` share one route.
async fn video_resource(
    State(library): State<Library>,
    Path((item_id, part)): Path<(Uuid, String)>,
) -> Response {
    let items = library.read().await;
    let Some(item) = items.get(&item_id) else {
        return not_found().into_response();
    };

    if part == "stream" {
        return (
            [
                (header::CONTENT_TYPE, "video/mp4"),
                (header::CONTENT_DISPOSITION, "attachment; filename=\"clip.mp4\""),
            ],
            CLIP_BYTES,
        )
            .into_response();
    }
    if let Some(container) = part.strip_prefix("stream.") {
        let content_type = format!("video/{container}");
        return ([(header::CONTENT_TYPE, content_type)], CLIP_BYTES).into_response();
    }
    if part == "AdditionalParts" {
        let parts: Vec<Item> = item
            .parts
            .iter()
            .filter_map(|id| items.get(id).cloned())
            .collect();
        return Json(QueryResult::page(parts, 0, None)).into_response();
    }
    StatusCode::NOT_FOUND.into_response()
}

async fn delete_video_resource(
    State(library): State<Library>,
    Path((item_id, part)): Path<(Uuid, String)>,
) -> Result<StatusCode, (StatusCode, &'static str)> {
    if part != "AlternateSources" {
        return Err((StatusCode::METHOD_NOT_ALLOWED, "Method not allowed"));
    }
    let mut items = library.write().await;
    let item = items.get_mut(&item_id).ok_or_else(not_found)?;
    item.alternate_sources.clear();
    Ok(StatusCode::NO_CONTENT)
}

async fn attachment(
    State(library): State<Library>,
    Path((video_id, _media_source_id, index)): Path<(Uuid, String, u32)>,
) -> Response {
    if !library.read().await.contains_key(&video_id) {
        return not_found().into_response();
    }
    if index > 0 {
        return (StatusCode::NOT_FOUND, "Attachment not found").into_response();
    }
    (
        [(header::CONTENT_TYPE, "application/octet-stream")],
        ATTACHMENT_BYTES,
    )
        .into_response()
}

/// Fields parsed from an `Authorization: MediaBrowser k="v", ...` header.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Session {
    pub client: String,
    pub device_id: String,
    pub token: String,
}

pub fn parse_media_browser(value: &str) -> Option<Session> {
    let fields = value.strip_prefix("MediaBrowser ")?;
    let mut session = Session::default();
    for field in fields.split(',') {
        let Some((key, raw)) = field.trim().split_once('=') else {
            continue;
        };
        let raw = raw.trim_matches('"').to_string();
        match key {
            "Client" => session.client = raw,
            "DeviceId" => session.device_id = raw,
            "Token" => session.token = raw,
            _ => {}
        }
    }
    (!session.token.is_empty()).then_some(session)
}

/// Echoes the caller's session; 401 without a token-bearing header.
async fn current_session(headers: HeaderMap) -> Result<Json<Session>, (StatusCode, &'static str)> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_media_browser)
        .map(Json)
        .ok_or((StatusCode::UNAUTHORIZED, "Authentication required"))
}

/// Answers after two seconds; used to exercise client read timeouts.
async fn slow() -> &'static str {
    tokio::time::sleep(Duration::from_secs(2)).await;
    "finally"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_serializes_with_server_casing() {
        let item = Item::new(Uuid::nil(), "Test", "Audio");
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["Id"], "00000000-0000-0000-0000-000000000000");
        assert_eq!(json["Name"], "Test");
        assert_eq!(json["Type"], "Audio");
        assert!(json.get("Album").is_none());
        assert!(json.get("Parts").is_none());
    }

    #[test]
    fn seeded_library_is_linked() {
        let library = seed_library();
        assert_eq!(library.len(), 7);
        assert_eq!(library[&MOVIE_ID].parts, vec![MOVIE_PART_ID]);
        assert!(library.contains_key(&MOVIE_PART_ID));
    }

    #[test]
    fn mix_excludes_seed_and_other_genres() {
        let library = seed_library();
        let mix = mix_for(&library, &library[&ALBUM_ID], None);
        let names: Vec<&str> = mix.items.iter().map(|item| item.name.as_str()).collect();
        assert_eq!(names, vec!["Blue in Green", "So What"]);
        assert_eq!(mix.total_record_count, 2);
    }

    #[test]
    fn media_browser_header_needs_token() {
        let session = parse_media_browser(
            r#"MediaBrowser Client="Home", Device="tv", DeviceId="dev-1", Version="1", Token="abc""#,
        )
        .unwrap();
        assert_eq!(session.client, "Home");
        assert_eq!(session.device_id, "dev-1");
        assert_eq!(session.token, "abc");

        assert!(parse_media_browser(r#"MediaBrowser Client="Home""#).is_none());
        assert!(parse_media_browser(r#"Bearer Token="abc""#).is_none());
    }

    #[test]
    fn page_applies_start_and_limit() {
        let library = seed_library();
        let items: Vec<Item> = library.values().cloned().collect();
        let page = QueryResult::page(items, 2, Some(3));
        assert_eq!(page.items.len(), 3);
        assert_eq!(page.total_record_count, 7);
        assert_eq!(page.start_index, 2);
    }
}
