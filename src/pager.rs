use crate::error::{MediaError, Result};
use crate::params::{ParamInput, Params};
use crate::registry;
use crate::request;
use crate::rest::MediaClient;
use crate::transport::Transport;
use serde_json::Value;

/// Page size used when walking the whole catalog.
pub const PAGE_SIZE: i64 = 100;

/// Number of pages needed for `total_count` items, or `None` when the count
/// is too large to page through.
pub fn total_pages(total_count: i64) -> Option<i64> {
    if total_count <= 0 {
        return Some(0);
    }
    total_count
        .checked_add(PAGE_SIZE - 1)
        .map(|count| count / PAGE_SIZE)
}

impl<T: Transport> MediaClient<T> {
    /// Fetch every video in the account, page by page.
    ///
    /// `get_item_count`, `page_size` and `page_number` are overridden and
    /// `from_date` is coerced to epoch minutes as for `find`. The page count
    /// is fixed by the first response's `total_count`. Any failing page
    /// aborts the walk and nothing gathered so far is returned.
    pub fn find_all_videos(&mut self, params: Option<Params>) -> Result<Vec<Value>> {
        let result = self.walk_all_videos(params);
        result.or_else(|e| self.fail(e))
    }

    fn walk_all_videos(&mut self, params: Option<Params>) -> Result<Vec<Value>> {
        let alias = registry::all_videos();
        let input = ParamInput::Bag(params.unwrap_or_default());
        let mut params = match request::normalize(alias, input)? {
            ParamInput::Bag(params) => params,
            _ => Params::new(),
        };
        params.insert("get_item_count".to_string(), Value::from("TRUE"));
        params.insert("page_size".to_string(), Value::from(PAGE_SIZE));
        params.insert("page_number".to_string(), Value::from(0));

        let mut videos = Vec::new();
        let mut page_number = 0;
        let mut pages: Option<i64> = None;

        while pages.map_or(true, |pages| page_number < pages) {
            params.insert("page_number".to_string(), Value::from(page_number));
            let input = ParamInput::Bag(params.clone());
            let url = request::read_url(self.read_base(), self.read_token(), alias, &input)?;

            let page = self.read(&url, alias.wire_command)?;
            if pages.is_none() {
                let total = self.total_count().unwrap_or(0);
                let count = total_pages(total).ok_or_else(|| {
                    MediaError::read_failed(format!("total_count {} out of range", total), None)
                })?;
                log::debug!("[pager] {} videos in {} pages", total, count);
                pages = Some(count);
            }
            videos.extend(page.into_items());
            page_number += 1;
        }

        Ok(videos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(-1), Some(0));
        assert_eq!(total_pages(0), Some(0));
        assert_eq!(total_pages(1), Some(1));
        assert_eq!(total_pages(100), Some(1));
        assert_eq!(total_pages(101), Some(2));
        assert_eq!(total_pages(250), Some(3));
    }

    #[test]
    fn test_total_pages_near_max() {
        let largest = i64::MAX - (PAGE_SIZE - 1);
        assert_eq!(total_pages(largest), Some(i64::MAX / PAGE_SIZE));
        assert_eq!(total_pages(largest + 1), None);
        assert_eq!(total_pages(i64::MAX), None);
    }
}
