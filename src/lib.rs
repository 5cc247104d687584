//! # mediacove - client for a media-management REST API
//!
//! A blocking Rust client for a video platform exposing a GET-based read API
//! and a POST-based write API. Callers use short verbs and parameter bags;
//! the library builds the query strings and multipart envelopes, walks
//! paginated listings and decodes responses.
//!
//! ## Features
//!
//! - Loose verb lookup: `find_video_by_id`, `VideoById` and `videobyid` are
//!   the same call
//! - Parameter normalization (epoch-minute dates, item-count requests, bare
//!   arguments bound to the verb's default parameter)
//! - Whole-catalog listing that follows pagination
//! - Large numeric ids decoded as strings so they never lose precision
//! - Write calls with file upload and upload-option validation
//!
//! ## Basic Usage
//!
//! ```no_run
//! use mediacove::{params, ApiResponse, MediaClient};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = MediaClient::new("read-token")?;
//!
//!     // Bare argument: bound to `video_id`
//!     if let ApiResponse::Single(video) = client.find("find_video_by_id", "1234567890123")? {
//!         println!("{}", video["name"]);
//!     }
//!
//!     // Parameter bag
//!     let page = client.find("videos_by_tags", params! { "or_tags" => "news", "page_size" => 10 })?;
//!     println!("{} of {:?}", page.items().len(), client.total_count());
//!
//!     // Everything, across pages
//!     let all = client.find_all_videos(None)?;
//!     println!("{} videos", all.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Writing
//!
//! ```no_run
//! use mediacove::{params, Config, MediaClient, UploadOptions};
//! use std::path::Path;
//!
//! let mut client = MediaClient::with_config("read-token", Config::default().with_secure(true))?
//!     .with_write_token("write-token");
//!
//! let id = client.create_video(
//!     Some(Path::new("clip.mp4")),
//!     params! { "name" => "Launch", "shortDescription" => "Launch day" },
//!     UploadOptions::multiple_renditions(),
//! )?;
//! println!("created {}", id);
//! # Ok::<(), mediacove::MediaError>(())
//! ```

pub mod client;
pub mod codec;
pub mod error;
pub mod format;
pub mod pager;
pub mod params;
pub mod registry;
pub mod request;
pub mod response;
pub mod rest;
pub mod tags;
pub mod time;
pub mod transport;

// Re-export main types for convenience
pub use client::Config;
pub use error::{ErrorKind, MediaError, Notice, Result, Severity};
pub use format::{download_url, sef};
pub use params::{ParamInput, Params};
pub use registry::{resolve, MethodAlias};
pub use request::{EncodeTo, ItemRef, ItemType, UploadOptions, WriteEnvelope};
pub use response::{ApiResponse, PageMeta};
pub use rest::{ClientSession, MediaClient};
pub use tags::{filter_by_tags, TagSet};
pub use time::VideoLength;
pub use transport::{HttpTransport, Transport};

// Re-export serde_json for convenience
pub use serde_json::json;
