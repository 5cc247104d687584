use crate::client::{create_read_client, create_upload_client};
use crate::error::{MediaError, Result};
use crate::request::WriteEnvelope;
use reqwest::blocking::{multipart, Client, Response};
use url::Url;

/// Executes the actual HTTP round trips.
///
/// Implementations return the raw response body or a read/write transaction
/// failure. They never retry.
pub trait Transport {
    /// Perform a GET against a fully built read URL
    fn get(&self, url: &Url) -> Result<String>;

    /// POST an envelope as a multipart form to the write endpoint
    fn post(&self, url: &Url, envelope: &WriteEnvelope) -> Result<String>;
}

/// Transport over reqwest's blocking client
#[derive(Debug, Clone)]
pub struct HttpTransport {
    read: Client,
    write: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        Ok(HttpTransport {
            read: create_read_client()?,
            write: create_upload_client()?,
        })
    }
}

// Returns the body, or the status and body when the server did not answer 2xx.
fn read_body(response: Response) -> std::result::Result<String, (String, Option<reqwest::Error>)> {
    let status = response.status();
    match response.text() {
        Ok(body) if status.is_success() => Ok(body),
        Ok(body) => Err((format!("HTTP error {}: {}", status.as_u16(), body), None)),
        Err(e) => Err((format!("could not read body (status {})", status.as_u16()), Some(e))),
    }
}

fn boxed(e: Option<reqwest::Error>) -> Option<Box<dyn std::error::Error + Send + Sync>> {
    e.map(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)
}

impl Transport for HttpTransport {
    fn get(&self, url: &Url) -> Result<String> {
        let response = self
            .read
            .get(url.as_str())
            .send()
            .map_err(|e| MediaError::read_failed(e.to_string(), Some(Box::new(e))))?;
        read_body(response).map_err(|(detail, e)| MediaError::read_failed(detail, boxed(e)))
    }

    fn post(&self, url: &Url, envelope: &WriteEnvelope) -> Result<String> {
        let mut form = multipart::Form::new().text("json", envelope.json_field()?);
        if let Some(ref file) = envelope.file {
            form = form.file("file", file).map_err(|e| {
                MediaError::write_failed(format!("could not open {}", file.display()), Some(Box::new(e)))
            })?;
        }

        let response = self
            .write
            .post(url.as_str())
            .multipart(form)
            .send()
            .map_err(|e| MediaError::write_failed(e.to_string(), Some(Box::new(e))))?;
        read_body(response).map_err(|(detail, e)| MediaError::write_failed(detail, boxed(e)))
    }
}
