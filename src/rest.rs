use crate::client::Config;
use crate::error::{report, ErrorKind, MediaError, Notice, Result};
use crate::params::{ParamInput, Params};
use crate::registry;
use crate::request::{self, ItemRef, ItemType, UploadOptions, WriteEnvelope};
use crate::response::{decode_read, decode_write, ApiResponse, PageMeta};
use crate::transport::{HttpTransport, Transport};
use serde_json::Value;
use std::path::Path;
use std::time::Instant;
use url::Url;

/// Per-client state updated by completed calls
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientSession {
    /// Pagination metadata of the last read call
    pub last_page: PageMeta,
    /// Number of completed round trips
    pub api_calls: u64,
    /// Notices raised by the last write call
    pub notices: Vec<Notice>,
}

/// Client for the media API read and write surfaces.
///
/// Calls take `&mut self`: one instance serves one caller at a time, and the
/// session reflects the last completed call.
pub struct MediaClient<T: Transport = HttpTransport> {
    transport: T,
    config: Config,
    read_token: String,
    write_token: Option<String>,
    read_url: Url,
    write_url: Url,
    session: ClientSession,
}

impl MediaClient<HttpTransport> {
    /// Create a client over HTTP with default configuration
    pub fn new(read_token: impl Into<String>) -> Result<Self> {
        Self::with_config(read_token, Config::default())
    }

    /// Create a client over HTTP with custom configuration
    pub fn with_config(read_token: impl Into<String>, config: Config) -> Result<Self> {
        Self::with_transport(read_token, config, HttpTransport::new()?)
    }
}

impl<T: Transport> MediaClient<T> {
    /// Create a client over any transport
    pub fn with_transport(read_token: impl Into<String>, config: Config, transport: T) -> Result<Self> {
        let read_token = read_token.into();
        if read_token.trim().is_empty() {
            report(config.show_notices, ErrorKind::ReadTokenMissing, &"client construction");
            return Err(MediaError::ReadTokenMissing);
        }
        Ok(MediaClient {
            read_url: config.read_url()?,
            write_url: config.write_url()?,
            transport,
            config,
            read_token,
            write_token: None,
            session: ClientSession::default(),
        })
    }

    /// Set the write token
    pub fn with_write_token(mut self, token: impl Into<String>) -> Self {
        self.write_token = Some(token.into()).filter(|t| !t.trim().is_empty());
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session(&self) -> &ClientSession {
        &self.session
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn page_number(&self) -> Option<i64> {
        self.session.last_page.page_number
    }

    pub fn page_size(&self) -> Option<i64> {
        self.session.last_page.page_size
    }

    pub fn total_count(&self) -> Option<i64> {
        self.session.last_page.total_count
    }

    pub fn api_calls(&self) -> u64 {
        self.session.api_calls
    }

    pub(crate) fn fail<R>(&self, err: MediaError) -> Result<R> {
        if let Some(kind) = err.kind() {
            report(self.config.show_notices, kind, &err);
        }
        Err(err)
    }

    /// Run a read verb.
    ///
    /// `verb` is matched loosely (`find_video_by_id`, `VideoById`); `params`
    /// may be a bag, a bare scalar bound to the verb's default parameter, or
    /// nothing.
    ///
    /// ```no_run
    /// use mediacove::{MediaClient, ApiResponse};
    ///
    /// let mut client = MediaClient::new("read-token")?;
    /// let video = client.find("find_video_by_id", "1234567890123")?;
    /// if let ApiResponse::Single(video) = video {
    ///     println!("{}", video["name"]);
    /// }
    /// # Ok::<(), mediacove::MediaError>(())
    /// ```
    pub fn find(&mut self, verb: &str, params: impl Into<ParamInput>) -> Result<ApiResponse> {
        let result = registry::resolve(verb).and_then(|alias| {
            let url = request::build_read_request(&self.read_url, &self.read_token, alias, params.into())?;
            self.read(&url, alias.wire_command)
        });
        result.or_else(|e| self.fail(e))
    }

    /// Execute one read round trip and record its metadata.
    pub(crate) fn read(&mut self, url: &Url, command: &str) -> Result<ApiResponse> {
        let start = Instant::now();
        let body = self.transport.get(url)?;
        self.session.api_calls += 1;
        log::debug!(
            "[read] {} => {:?} ({} bytes, call #{})",
            command,
            start.elapsed(),
            body.len(),
            self.session.api_calls
        );

        let (response, meta) = decode_read(&body)?;
        self.session.last_page = meta;
        Ok(response)
    }

    pub(crate) fn read_base(&self) -> &Url {
        &self.read_url
    }

    pub(crate) fn read_token(&self) -> &str {
        &self.read_token
    }

    fn write_token(&self) -> Result<String> {
        match self.write_token {
            Some(ref token) => Ok(token.clone()),
            None => self.fail(MediaError::WriteTokenMissing),
        }
    }

    /// Post a built envelope and decode the `result` field.
    fn write(&mut self, envelope: WriteEnvelope, require_result: bool) -> Result<Value> {
        for notice in &envelope.notices {
            report(self.config.show_notices, notice.kind, notice);
        }

        let start = Instant::now();
        let body = match self.transport.post(&self.write_url, &envelope) {
            Ok(body) => body,
            Err(e) => return self.fail(e),
        };
        self.session.api_calls += 1;
        self.session.notices = envelope.notices;
        log::debug!(
            "[write] {} => {:?} (call #{})",
            envelope.method,
            start.elapsed(),
            self.session.api_calls
        );

        decode_write(&body, require_result).or_else(|e| self.fail(e))
    }

    fn build<R>(&self, built: Result<R>) -> Result<R> {
        built.or_else(|e| self.fail(e))
    }

    /// Create a video, uploading `file` when given.
    ///
    /// Returns the new video id. Options the service cannot honour for the
    /// file's container are corrected and recorded in
    /// [`ClientSession::notices`].
    pub fn create_video(
        &mut self,
        file: Option<&Path>,
        meta: Params,
        options: UploadOptions,
    ) -> Result<Value> {
        let token = self.write_token()?;
        let envelope = self.build(request::build_create_video(&token, file, meta, options))?;
        self.write(envelope, true)
    }

    /// Add an image to a video; returns the image asset id.
    pub fn create_image(
        &mut self,
        file: Option<&Path>,
        meta: Params,
        video_id: Option<&str>,
        resize: bool,
    ) -> Result<Value> {
        let token = self.write_token()?;
        let envelope = self.build(request::build_create_image(&token, file, meta, video_id, resize))?;
        let result = self.write(envelope, true)?;
        Ok(result.get("id").cloned().unwrap_or(result))
    }

    /// Create a playlist; returns the new playlist id.
    pub fn create_playlist(&mut self, meta: Params) -> Result<Value> {
        let token = self.write_token()?;
        let envelope = self.build(request::build_create_playlist(&token, meta))?;
        self.write(envelope, true)
    }

    /// Update a video or playlist; returns the updated item.
    pub fn update(&mut self, item_type: ItemType, meta: Params) -> Result<Value> {
        let token = self.write_token()?;
        self.write(request::build_update(&token, item_type, meta), false)
    }

    /// Delete a video or playlist by id, falling back to its reference id.
    pub fn delete(
        &mut self,
        item_type: ItemType,
        id: Option<&str>,
        reference_id: Option<&str>,
        cascade: bool,
    ) -> Result<()> {
        let token = self.write_token()?;
        let item = self.build(ItemRef::pick(id, reference_id))?;
        self.write(request::build_delete(&token, item_type, &item, cascade), false)?;
        Ok(())
    }

    /// Upload status of a video, addressed by id or reference id.
    pub fn get_upload_status(&mut self, id: Option<&str>, reference_id: Option<&str>) -> Result<String> {
        let token = self.write_token()?;
        let item = self.build(ItemRef::pick(id, reference_id))?;
        let result = self.write(request::build_upload_status(&token, &item), true)?;
        Ok(match result {
            Value::String(status) => status,
            other => other.to_string(),
        })
    }

    /// Share a video with other accounts; returns the ids of the new copies.
    pub fn share_video(&mut self, video_id: &str, account_ids: &[&str], auto_accept: bool) -> Result<Value> {
        let token = self.write_token()?;
        let envelope = self.build(request::build_share_video(&token, video_id, account_ids, auto_accept))?;
        self.write(envelope, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Canned {
        body: String,
        seen: RefCell<Vec<String>>,
    }

    impl Transport for Canned {
        fn get(&self, url: &Url) -> Result<String> {
            self.seen.borrow_mut().push(url.to_string());
            Ok(self.body.clone())
        }

        fn post(&self, _url: &Url, envelope: &WriteEnvelope) -> Result<String> {
            self.seen.borrow_mut().push(envelope.method.clone());
            Ok(self.body.clone())
        }
    }

    fn canned(body: &str) -> Canned {
        Canned {
            body: body.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_read_token_required() {
        let err = MediaClient::with_transport(" ", Config::default(), canned("")).err().unwrap();
        assert!(matches!(err, MediaError::ReadTokenMissing));
    }

    #[test]
    fn test_session_tracks_calls_and_pages() {
        let body = r#"{"items":[{"id":1}],"page_number":0,"page_size":100,"total_count":1}"#;
        let mut client = MediaClient::with_transport("rt", Config::default(), canned(body)).unwrap();
        client.find("all_videos", ParamInput::None).unwrap();
        assert_eq!(client.api_calls(), 1);
        assert_eq!(client.total_count(), Some(1));
        assert_eq!(client.page_size(), Some(100));
    }

    #[test]
    fn test_unknown_verb_makes_no_request() {
        let mut client = MediaClient::with_transport("rt", Config::default(), canned("NULL")).unwrap();
        let err = client.find("totallyUnknown", ParamInput::None).unwrap_err();
        assert!(matches!(err, MediaError::UnknownMethod(_)));
        assert!(client.transport().seen.borrow().is_empty());
        assert_eq!(client.api_calls(), 0);
    }

    #[test]
    fn test_write_token_checked_before_io() {
        let mut client = MediaClient::with_transport("rt", Config::default(), canned("{}")).unwrap();
        let err = client.create_playlist(Params::new()).unwrap_err();
        assert!(matches!(err, MediaError::WriteTokenMissing));
        assert!(client.transport().seen.borrow().is_empty());
    }
}
