/// Host serving progressive-download copies of streamed assets.
pub const DOWNLOAD_HOST: &str = "http://brightcove.vo.llnwd.net/";

/// Streaming farm markers and the download prefix each maps to.
const FARMS: &[(&str, &str)] = &[("/d5/", "pd5"), ("/o2/", "pd2"), ("/d6/", "pd6"), ("/d7/", "pd7")];

/// Rewrite a streaming (RTMP) asset URL to its HTTP download URL.
///
/// The last directory before the filename is kept as the media segment, the
/// filename is cut at the first `&`, and `.mp4`/`.flv` is appended when it
/// has no extension. Returns `None` for URLs on an unknown farm.
pub fn download_url(stream_url: &str) -> Option<String> {
    let (_, prefix) = FARMS.iter().find(|(marker, _)| stream_url.contains(marker))?;

    let (dir, file) = stream_url.rsplit_once('/')?;
    let segment = dir.rsplit('/').next().filter(|s| !s.is_empty())?;
    let mut filename = file.split('&').next().unwrap_or_default().to_string();
    if filename.is_empty() {
        return None;
    }
    if !filename.contains('.') {
        filename.push_str(if stream_url.contains("mp4") { ".mp4" } else { ".flv" });
    }

    Some(format!("{}{}/media/{}/{}", DOWNLOAD_HOST, prefix, segment, filename))
}

/// Make a title safe for URLs: punctuation is dropped and whitespace becomes
/// `-`.
pub fn sef(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .map(|c| if c.is_whitespace() { '-' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_url_mp4() {
        let url = "rtmp://cp1.edgefcs.net/ondemand/d5/&mp4:media/1234567/1234567_890.mp4&1250000";
        assert_eq!(
            download_url(url).as_deref(),
            Some("http://brightcove.vo.llnwd.net/pd5/media/1234567/1234567_890.mp4")
        );
    }

    #[test]
    fn test_download_url_adds_flv() {
        let url = "rtmp://cp1.edgefcs.net/ondemand/o2/media/555/555_12&v=1";
        assert_eq!(
            download_url(url).as_deref(),
            Some("http://brightcove.vo.llnwd.net/pd2/media/555/555_12.flv")
        );
    }

    #[test]
    fn test_download_url_unknown_farm() {
        assert_eq!(download_url("rtmp://host/x9/media/1/2.flv"), None);
    }

    #[test]
    fn test_sef() {
        assert_eq!(sef("Hello, World! 2009"), "Hello-World-2009");
    }
}
