use crate::error::{MediaError, Result};

/// A read verb resolved to its wire command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodAlias {
    /// Normalized caller-facing verb, e.g. `videobyid`
    pub verb: &'static str,
    /// Command name sent as `command=` on the read URL
    pub wire_command: &'static str,
    /// Parameter a bare scalar argument binds to
    pub default_param: Option<&'static str>,
    /// Whether `get_item_count=TRUE` is requested unless the caller overrides it
    pub request_item_count: bool,
}

const fn alias(
    verb: &'static str,
    wire_command: &'static str,
    default_param: Option<&'static str>,
    request_item_count: bool,
) -> MethodAlias {
    MethodAlias {
        verb,
        wire_command,
        default_param,
        request_item_count,
    }
}

/// Every read command the client knows about.
pub static METHODS: &[MethodAlias] = &[
    // videos
    alias("allvideos", "find_all_videos", None, true),
    alias("videobyid", "find_video_by_id", Some("video_id"), false),
    alias("relatedvideos", "find_related_videos", Some("video_id"), true),
    alias("videosbyids", "find_videos_by_ids", Some("video_ids"), false),
    alias("videobyreferenceid", "find_video_by_reference_id", Some("reference_id"), false),
    alias("videosbyreferenceids", "find_videos_by_reference_ids", Some("reference_ids"), false),
    alias("videosbyuserid", "find_videos_by_user_id", Some("user_id"), true),
    alias("videosbycampaignid", "find_videos_by_campaign_id", Some("campaign_id"), true),
    alias("videosbytext", "find_videos_by_text", Some("text"), true),
    alias("videosbytags", "find_videos_by_tags", Some("or_tags"), true),
    alias("modifiedvideos", "find_modified_videos", Some("from_date"), true),
    // playlists
    alias("allplaylists", "find_all_playlists", None, true),
    alias("playlistbyid", "find_playlist_by_id", Some("playlist_id"), false),
    alias("playlistsbyids", "find_playlists_by_ids", Some("playlist_ids"), false),
    alias("playlistbyreferenceid", "find_playlist_by_reference_id", Some("reference_id"), false),
    alias("playlistsbyreferenceids", "find_playlists_by_reference_ids", Some("reference_ids"), false),
    alias("playlistsforplayerid", "find_playlists_for_player_id", Some("player_id"), true),
];

/// Fold a caller-supplied verb to its table key.
///
/// Underscores and the substring `find` are dropped and the result is
/// lowercased, so `find_video_by_id`, `FindVideoById` and `videobyid` agree.
pub fn normalize_verb(verb: &str) -> String {
    verb.replace('_', "").to_lowercase().replace("find", "")
}

/// Look up the alias for a verb.
pub fn resolve(verb: &str) -> Result<&'static MethodAlias> {
    let key = normalize_verb(verb);
    METHODS
        .iter()
        .find(|alias| alias.verb == key)
        .ok_or_else(|| MediaError::UnknownMethod(verb.to_string()))
}

/// The alias used by the pagination driver.
pub(crate) fn all_videos() -> &'static MethodAlias {
    &METHODS[0]
}
