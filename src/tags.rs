use indexmap::IndexMap;
use serde_json::Value;

/// Video tags split into plain tags and `key=value` groups.
///
/// `["hd", "genre=drama", "genre = crime"]` parses to the plain tag `hd` and
/// the group `genre => [drama, crime]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    pub plain: Vec<String>,
    pub groups: IndexMap<String, Vec<String>>,
}

impl TagSet {
    pub fn parse<S: AsRef<str>>(tags: &[S]) -> Self {
        let mut set = TagSet::default();
        for tag in tags {
            let tag = tag.as_ref();
            match tag.split_once('=') {
                Some((key, value)) => set
                    .groups
                    .entry(key.trim().to_string())
                    .or_default()
                    .push(value.trim().to_string()),
                None => set.plain.push(tag.to_string()),
            }
        }
        set
    }

    /// Parse the `tags` array of a video object
    pub fn from_video(video: &Value) -> Self {
        let tags: Vec<&str> = video_tags(video).collect();
        TagSet::parse(&tags)
    }

    /// First value of a group
    pub fn get(&self, key: &str) -> Option<&str> {
        self.groups.get(key).and_then(|values| values.first()).map(String::as_str)
    }
}

fn video_tags(video: &Value) -> impl Iterator<Item = &str> {
    video
        .get("tags")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
}

/// Keep the videos carrying at least one of the comma-separated `tags`.
pub fn filter_by_tags(videos: &[Value], tags: &str) -> Vec<Value> {
    let wanted: Vec<&str> = tags.split(',').map(str::trim).filter(|t| !t.is_empty()).collect();
    videos
        .iter()
        .filter(|video| video_tags(video).any(|tag| wanted.contains(&tag)))
        .cloned()
        .collect()
}
