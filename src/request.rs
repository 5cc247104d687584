//! Request building for both API surfaces.
//!
//! Read calls become a fully qualified GET URL; write calls become a
//! [`WriteEnvelope`] holding the `{"method", "params"}` document and an
//! optional file attachment. Nothing here touches the network.

use crate::codec;
use crate::error::{ErrorKind, MediaError, Notice, Result};
use crate::params::{wire_value, ParamInput, Params};
use crate::registry::MethodAlias;
use crate::time::{coerce_epoch_minutes, reference_id_now};
use chrono::Utc;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use url::Url;

const FROM_DATE: &str = "from_date";
const GET_ITEM_COUNT: &str = "get_item_count";

/// Containers the service cannot transcode into multiple renditions.
const VP6_EXTENSIONS: &[&str] = &["f4a", "f4b", "f4v", "f4p", "flv"];

/// Apply the read normalization rules to a caller's arguments.
///
/// In order: `from_date` is coerced to epoch minutes, `get_item_count=TRUE`
/// is injected when the alias asks for it and the caller did not set it
/// (promoting a bare scalar into a bag keyed by the default parameter).
pub fn normalize(alias: &MethodAlias, input: ParamInput) -> Result<ParamInput> {
    let mut input = input;

    let date_is_default = alias.default_param == Some(FROM_DATE);
    match input {
        ParamInput::Bare(ref mut value) if date_is_default => {
            *value = Value::String(coerce_epoch_minutes(&wire_value(value)));
        }
        ParamInput::Bag(ref mut params) => {
            if let Some(value) = params.get_mut(FROM_DATE) {
                *value = Value::String(coerce_epoch_minutes(&wire_value(value)));
            }
        }
        _ => {}
    }

    if alias.request_item_count && input.get(GET_ITEM_COUNT).is_none() {
        let mut params = match input {
            ParamInput::None => Params::new(),
            ParamInput::Bag(params) => params,
            ParamInput::Bare(value) => {
                let mut params = Params::new();
                params.insert(bare_param(alias)?.to_string(), value);
                params
            }
        };
        params.insert(GET_ITEM_COUNT.to_string(), Value::String("TRUE".to_string()));
        input = ParamInput::Bag(params);
    }

    Ok(input)
}

fn bare_param(alias: &MethodAlias) -> Result<&'static str> {
    alias.default_param.ok_or_else(|| {
        MediaError::IdentifierNotProvided(format!(
            "{} takes named parameters only",
            alias.wire_command
        ))
    })
}

/// Build the GET URL for an already-normalized read call.
pub fn read_url(base: &Url, token: &str, alias: &MethodAlias, input: &ParamInput) -> Result<Url> {
    let mut url = base.clone();
    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("token", token)
            .append_pair("command", alias.wire_command);

        match input {
            ParamInput::None => {}
            ParamInput::Bare(value) => {
                query.append_pair(bare_param(alias)?, &wire_value(value));
            }
            ParamInput::Bag(params) => {
                for (key, value) in params {
                    query.append_pair(key, &wire_value(value));
                }
            }
        }
    }
    Ok(url)
}

/// Normalize and build a read URL in one step.
pub fn build_read_request(
    base: &Url,
    token: &str,
    alias: &MethodAlias,
    input: ParamInput,
) -> Result<Url> {
    let input = normalize(alias, input)?;
    read_url(base, token, alias, &input)
}

/// A write call ready to be posted.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteEnvelope {
    /// Write command, e.g. `create_video`
    pub method: String,
    /// Command parameters, including the write token
    pub params: Map<String, Value>,
    /// File sent as the `file` multipart field
    pub file: Option<PathBuf>,
    /// Non-fatal conditions found while building
    pub notices: Vec<Notice>,
}

#[derive(Serialize)]
struct EnvelopeBody<'a> {
    method: &'a str,
    params: &'a Map<String, Value>,
}

impl WriteEnvelope {
    fn new(method: &str, token: &str) -> Self {
        let mut params = Map::new();
        params.insert("token".to_string(), Value::String(token.to_string()));
        WriteEnvelope {
            method: method.to_string(),
            params,
            file: None,
            notices: Vec::new(),
        }
    }

    fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    /// Get a parameter by key
    pub fn param(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    /// The `json` multipart field: the envelope document plus a newline.
    pub fn json_field(&self) -> Result<String> {
        let body = EnvelopeBody {
            method: &self.method,
            params: &self.params,
        };
        let mut json = codec::encode(&body)
            .map_err(|e| MediaError::write_failed("could not encode request", Some(Box::new(e))))?;
        json.push('\n');
        Ok(json)
    }
}

/// Item family addressed by update and delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemType {
    Video,
    Playlist,
}

impl ItemType {
    fn noun(self) -> &'static str {
        match self {
            ItemType::Video => "video",
            ItemType::Playlist => "playlist",
        }
    }
}

impl FromStr for ItemType {
    type Err = MediaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "video" => Ok(ItemType::Video),
            "playlist" => Ok(ItemType::Playlist),
            _ => Err(MediaError::ItemTypeNotSpecified(s.to_string())),
        }
    }
}

/// How an existing item is addressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemRef {
    Id(String),
    Reference(String),
}

impl ItemRef {
    /// Pick the identifier to use: an explicit id wins, then a reference id.
    /// Empty strings count as absent.
    pub fn pick(id: Option<&str>, reference_id: Option<&str>) -> Result<Self> {
        fn present(s: Option<&str>) -> Option<&str> {
            s.map(str::trim).filter(|s| !s.is_empty())
        }

        if let Some(id) = present(id) {
            Ok(ItemRef::Id(id.to_string()))
        } else if let Some(reference_id) = present(reference_id) {
            Ok(ItemRef::Reference(reference_id.to_string()))
        } else {
            Err(MediaError::IdentifierNotProvided(
                "neither an id nor a reference id was given".to_string(),
            ))
        }
    }

    fn apply(&self, envelope: WriteEnvelope, id_key: &str) -> WriteEnvelope {
        match self {
            ItemRef::Id(id) => envelope.with(id_key, id.as_str()),
            ItemRef::Reference(reference_id) => envelope.with("reference_id", reference_id.as_str()),
        }
    }
}

/// Target format for server-side transcoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EncodeTo {
    Mp4,
    Flv,
}

/// Processing options for video creation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadOptions {
    pub create_multiple_renditions: Option<bool>,
    pub encode_to: Option<EncodeTo>,
    pub preserve_source_rendition: Option<bool>,
    /// Upload an H.264 source as-is, without re-processing
    pub h264_no_processing: Option<bool>,
}

impl UploadOptions {
    /// Request multiple renditions.
    pub fn multiple_renditions() -> Self {
        UploadOptions {
            create_multiple_renditions: Some(true),
            ..Default::default()
        }
    }
}

fn is_vp6_container(file: &Path) -> bool {
    file.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| VP6_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Correct upload options the service would reject.
///
/// Returns the corrected options and an `InvalidUploadOption` notice for
/// each correction that dropped something the caller asked for.
pub fn validate_upload_options(
    file: Option<&Path>,
    mut options: UploadOptions,
) -> (UploadOptions, Vec<Notice>) {
    let mut notices = Vec::new();

    if let Some(file) = file.filter(|f| is_vp6_container(f)) {
        let requested = options.create_multiple_renditions == Some(true)
            || options.encode_to.is_some()
            || options.preserve_source_rendition == Some(true);
        options.create_multiple_renditions = Some(false);
        options.encode_to = None;
        options.preserve_source_rendition = None;
        if requested {
            notices.push(Notice::new(
                ErrorKind::InvalidUploadOption,
                format!("{} cannot be encoded to multiple renditions", file.display()),
            ));
        }
    }

    if options.create_multiple_renditions == Some(true) && options.h264_no_processing == Some(true) {
        options.h264_no_processing = None;
        notices.push(Notice::new(
            ErrorKind::InvalidUploadOption,
            "H264NoProcessing dropped because multiple renditions were requested",
        ));
    }

    (options, notices)
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        _ => false,
    }
}

fn fill_blank(meta: &mut Map<String, Value>, key: &str, value: impl FnOnce() -> String) {
    if is_blank(meta.get(key)) {
        meta.insert(key.to_string(), Value::String(value()));
    }
}

fn into_map(meta: Params) -> Map<String, Value> {
    meta.into_iter().collect()
}

/// `create_video`: upload a new video, optionally with its source file.
pub fn build_create_video(
    token: &str,
    file: Option<&Path>,
    meta: Params,
    options: UploadOptions,
) -> Result<WriteEnvelope> {
    let mut video = into_map(meta);
    fill_blank(&mut video, "referenceId", reference_id_now);
    let stamp = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();
    fill_blank(&mut video, "name", || format!("Video {}", stamp));
    fill_blank(&mut video, "shortDescription", || format!("Uploaded {}", stamp));

    let (options, notices) = validate_upload_options(file, options);

    let mut envelope = WriteEnvelope::new("create_video", token)
        .with("video", video)
        .with(
            "create_multiple_renditions",
            options.create_multiple_renditions.unwrap_or(false),
        );
    if let Some(encode_to) = options.encode_to {
        let encode_to = serde_json::to_value(encode_to)
            .map_err(|e| MediaError::write_failed("could not encode request", Some(Box::new(e))))?;
        envelope = envelope.with("encode_to", encode_to);
    }
    if let Some(preserve) = options.preserve_source_rendition {
        envelope = envelope.with("preserve_source_rendition", preserve);
    }
    if let Some(no_processing) = options.h264_no_processing {
        envelope = envelope.with("H264NoProcessing", no_processing);
    }

    envelope.file = file.map(Path::to_path_buf);
    envelope.notices = notices;
    Ok(envelope)
}

/// `add_image`: attach an image asset to a video.
pub fn build_create_image(
    token: &str,
    file: Option<&Path>,
    meta: Params,
    video_id: Option<&str>,
    resize: bool,
) -> Result<WriteEnvelope> {
    let video_id = video_id
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| MediaError::IdentifierNotProvided("images need a video id".to_string()))?;

    let mut image = into_map(meta);
    fill_blank(&mut image, "referenceId", reference_id_now);

    let mut envelope = WriteEnvelope::new("add_image", token)
        .with("image", image)
        .with("video_id", video_id)
        .with("resize", if resize { "TRUE" } else { "FALSE" });
    envelope.file = file.map(Path::to_path_buf);
    Ok(envelope)
}

fn coerce_video_id(value: &Value) -> Result<Value> {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => Ok(value.clone()),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(id) = s.parse::<i64>() {
                Ok(Value::from(id))
            } else if let Ok(id) = s.parse::<u64>() {
                Ok(Value::from(id))
            } else {
                Err(MediaError::IdentifierNotProvided(format!(
                    "videoIds entry {:?} is not a numeric id",
                    s
                )))
            }
        }
        other => Err(MediaError::IdentifierNotProvided(format!(
            "videoIds entry {} is not a numeric id",
            other
        ))),
    }
}

/// `create_playlist`: create a playlist.
///
/// Unless the playlist is explicit, `videoIds` entries are sent as integers.
pub fn build_create_playlist(token: &str, meta: Params) -> Result<WriteEnvelope> {
    let mut playlist = into_map(meta);
    fill_blank(&mut playlist, "referenceId", reference_id_now);

    let explicit = playlist
        .get("playlistType")
        .and_then(Value::as_str)
        .map(|t| t.eq_ignore_ascii_case("explicit"))
        .unwrap_or(false);

    if !explicit {
        if let Some(Value::Array(ids)) = playlist.get_mut("videoIds") {
            for id in ids.iter_mut() {
                *id = coerce_video_id(id)?;
            }
        }
    }

    Ok(WriteEnvelope::new("create_playlist", token).with("playlist", playlist))
}

/// `update_video` / `update_playlist`: replace fields of an existing item.
pub fn build_update(token: &str, item_type: ItemType, meta: Params) -> WriteEnvelope {
    let noun = item_type.noun();
    WriteEnvelope::new(&format!("update_{}", noun), token).with(noun, into_map(meta))
}

/// `delete_video` / `delete_playlist`.
pub fn build_delete(token: &str, item_type: ItemType, item: &ItemRef, cascade: bool) -> WriteEnvelope {
    let noun = item_type.noun();
    let envelope = WriteEnvelope::new(&format!("delete_{}", noun), token).with("cascade", cascade);
    item.apply(envelope, &format!("{}_id", noun))
}

/// `get_upload_status` for a video.
pub fn build_upload_status(token: &str, item: &ItemRef) -> WriteEnvelope {
    item.apply(WriteEnvelope::new("get_upload_status", token), "video_id")
}

/// `share_video`: share a video with other accounts.
pub fn build_share_video(
    token: &str,
    video_id: &str,
    account_ids: &[&str],
    auto_accept: bool,
) -> Result<WriteEnvelope> {
    let video_id = video_id.trim();
    if video_id.is_empty() {
        return Err(MediaError::IdentifierNotProvided(
            "share_video needs a video id".to_string(),
        ));
    }
    Ok(WriteEnvelope::new("share_video", token)
        .with("video_id", video_id)
        .with("sharee_account_ids", account_ids.to_vec())
        .with("auto_accept", if auto_accept { "TRUE" } else { "FALSE" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params;
    use crate::registry::resolve;
    use serde_json::json;

    fn base() -> Url {
        Url::parse("http://api.example.com/services/library").unwrap()
    }

    fn query(url: &Url, key: &str) -> Option<String> {
        url.query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    #[test]
    fn test_bare_scalar_uses_default_param() {
        let alias = resolve("video_by_id").unwrap();
        let url = build_read_request(&base(), "tok", alias, "12345".into()).unwrap();
        assert_eq!(
            url.as_str(),
            "http://api.example.com/services/library?token=tok&command=find_video_by_id&video_id=12345"
        );
    }

    #[test]
    fn test_from_date_millis_become_minutes() {
        let alias = resolve("modified_videos").unwrap();
        let url = build_read_request(&base(), "tok", alias, "1356998400000".into()).unwrap();
        assert_eq!(query(&url, "from_date").as_deref(), Some("22616640"));
        assert_eq!(query(&url, "get_item_count").as_deref(), Some("TRUE"));
    }

    #[test]
    fn test_from_date_minutes_pass_through() {
        let alias = resolve("modified_videos").unwrap();
        let input = params! { "from_date" => "22616640" };
        let url = build_read_request(&base(), "tok", alias, input.into()).unwrap();
        assert_eq!(query(&url, "from_date").as_deref(), Some("22616640"));
    }

    #[test]
    fn test_from_date_in_bag_of_other_alias() {
        let alias = resolve("all_videos").unwrap();
        let input = params! { "from_date" => 1356998400000i64 };
        let normalized = normalize(alias, input.into()).unwrap();
        assert_eq!(normalized.get("from_date"), Some(&json!("22616640")));
    }

    #[test]
    fn test_item_count_injected() {
        let alias = resolve("all_videos").unwrap();
        let url = build_read_request(&base(), "tok", alias, ParamInput::None).unwrap();
        assert!(url.as_str().contains("get_item_count=TRUE"));
    }

    #[test]
    fn test_item_count_respects_caller() {
        let alias = resolve("all_videos").unwrap();
        let input = params! { "get_item_count" => "FALSE" };
        let url = build_read_request(&base(), "tok", alias, input.into()).unwrap();
        assert_eq!(query(&url, "get_item_count").as_deref(), Some("FALSE"));
        assert!(!url.as_str().contains("get_item_count=TRUE"));
    }

    #[test]
    fn test_bare_scalar_promoted_with_item_count() {
        let alias = resolve("videos_by_text").unwrap();
        let url = build_read_request(&base(), "tok", alias, "my clip".into()).unwrap();
        assert!(url.as_str().ends_with("&text=my+clip&get_item_count=TRUE"));
    }

    #[test]
    fn test_bare_scalar_without_default_param() {
        let alias = resolve("all_playlists").unwrap();
        let err = build_read_request(&base(), "tok", alias, "oops".into()).unwrap_err();
        assert!(matches!(err, MediaError::IdentifierNotProvided(_)));
    }

    #[test]
    fn test_list_values_are_comma_joined() {
        let alias = resolve("videos_by_ids").unwrap();
        let url = build_read_request(&base(), "tok", alias, vec!["1", "2"].into()).unwrap();
        assert_eq!(query(&url, "video_ids").as_deref(), Some("1,2"));
    }

    #[test]
    fn test_flv_strips_multiple_renditions() {
        let file = Path::new("/tmp/clip.flv");
        let envelope = build_create_video(
            "wtok",
            Some(file),
            params! { "name" => "Clip" },
            UploadOptions::multiple_renditions(),
        )
        .unwrap();
        assert_eq!(envelope.param("create_multiple_renditions"), Some(&json!(false)));
        assert_eq!(envelope.notices.len(), 1);
        assert_eq!(envelope.notices[0].kind, ErrorKind::InvalidUploadOption);
        assert_eq!(envelope.file.as_deref(), Some(file));
    }

    #[test]
    fn test_flv_without_requested_options_has_no_notice() {
        let (options, notices) =
            validate_upload_options(Some(Path::new("clip.FLV")), UploadOptions::default());
        assert_eq!(options.create_multiple_renditions, Some(false));
        assert!(notices.is_empty());
    }

    #[test]
    fn test_flv_drops_encode_and_preserve() {
        let options = UploadOptions {
            encode_to: Some(EncodeTo::Mp4),
            preserve_source_rendition: Some(true),
            ..Default::default()
        };
        let (options, notices) = validate_upload_options(Some(Path::new("a.f4v")), options);
        assert_eq!(options.encode_to, None);
        assert_eq!(options.preserve_source_rendition, None);
        assert_eq!(notices.len(), 1);
    }

    #[test]
    fn test_no_processing_dropped_with_multiple_renditions() {
        let options = UploadOptions {
            create_multiple_renditions: Some(true),
            h264_no_processing: Some(true),
            ..Default::default()
        };
        let (options, notices) = validate_upload_options(Some(Path::new("a.mp4")), options);
        assert_eq!(options.create_multiple_renditions, Some(true));
        assert_eq!(options.h264_no_processing, None);
        assert_eq!(notices[0].kind, ErrorKind::InvalidUploadOption);
    }

    #[test]
    fn test_create_video_fills_placeholders() {
        let envelope = build_create_video("wtok", None, Params::new(), UploadOptions::default()).unwrap();
        let video = envelope.param("video").unwrap();
        assert!(video["referenceId"].as_str().is_some_and(|s| !s.is_empty()));
        assert!(video["name"].as_str().is_some_and(|s| s.starts_with("Video ")));
        assert!(video["shortDescription"].as_str().is_some());
        assert_eq!(envelope.param("token"), Some(&json!("wtok")));
        assert!(envelope.file.is_none());
    }

    #[test]
    fn test_json_field_envelope() {
        let envelope = build_create_video(
            "wtok",
            None,
            params! { "name" => "n", "shortDescription" => "d", "referenceId" => "r1" },
            UploadOptions::default(),
        )
        .unwrap();
        let field = envelope.json_field().unwrap();
        assert!(field.ends_with('\n'));
        let doc: Value = serde_json::from_str(field.trim_end()).unwrap();
        assert_eq!(doc["method"], json!("create_video"));
        assert_eq!(doc["params"]["video"]["referenceId"], json!("r1"));
        assert_eq!(doc["params"]["create_multiple_renditions"], json!(false));
    }

    #[test]
    fn test_playlist_ids_coerced() {
        let meta = params! { "name" => "p", "playlistType" => "OLDEST_TO_NEWEST", "videoIds" => ["10", "20"] };
        let envelope = build_create_playlist("wtok", meta).unwrap();
        assert_eq!(envelope.param("playlist").unwrap()["videoIds"], json!([10, 20]));
    }

    #[test]
    fn test_explicit_playlist_ids_untouched() {
        let meta = params! { "playlistType" => "EXPLICIT", "videoIds" => ["10", "20"] };
        let envelope = build_create_playlist("wtok", meta).unwrap();
        assert_eq!(envelope.param("playlist").unwrap()["videoIds"], json!(["10", "20"]));
    }

    #[test]
    fn test_playlist_bad_id() {
        let meta = params! { "videoIds" => ["ten"] };
        let err = build_create_playlist("wtok", meta).unwrap_err();
        assert!(matches!(err, MediaError::IdentifierNotProvided(_)));
    }

    #[test]
    fn test_item_type_parse() {
        assert_eq!("Video".parse::<ItemType>().unwrap(), ItemType::Video);
        assert_eq!(" PLAYLIST ".parse::<ItemType>().unwrap(), ItemType::Playlist);
        assert!(matches!(
            "image".parse::<ItemType>(),
            Err(MediaError::ItemTypeNotSpecified(_))
        ));
    }

    #[test]
    fn test_item_ref_precedence() {
        assert_eq!(ItemRef::pick(Some("1"), Some("r")).unwrap(), ItemRef::Id("1".to_string()));
        assert_eq!(
            ItemRef::pick(Some(""), Some("r")).unwrap(),
            ItemRef::Reference("r".to_string())
        );
        assert!(ItemRef::pick(None, None).is_err());
    }

    #[test]
    fn test_delete_envelope() {
        let item = ItemRef::pick(None, Some("ref-9")).unwrap();
        let envelope = build_delete("wtok", ItemType::Playlist, &item, true);
        assert_eq!(envelope.method, "delete_playlist");
        assert_eq!(envelope.param("reference_id"), Some(&json!("ref-9")));
        assert_eq!(envelope.param("cascade"), Some(&json!(true)));
        assert!(envelope.param("playlist_id").is_none());
    }

    #[test]
    fn test_create_image_requires_video() {
        let err = build_create_image("wtok", None, Params::new(), None, true).unwrap_err();
        assert!(matches!(err, MediaError::IdentifierNotProvided(_)));

        let envelope = build_create_image("wtok", None, Params::new(), Some("55"), false).unwrap();
        assert_eq!(envelope.method, "add_image");
        assert_eq!(envelope.param("resize"), Some(&json!("FALSE")));
    }

    #[test]
    fn test_share_video() {
        let envelope = build_share_video("wtok", "77", &["a1", "a2"], true).unwrap();
        assert_eq!(envelope.param("sharee_account_ids"), Some(&json!(["a1", "a2"])));
        assert_eq!(envelope.param("auto_accept"), Some(&json!("TRUE")));
        assert!(build_share_video("wtok", " ", &[], false).is_err());
    }
}
