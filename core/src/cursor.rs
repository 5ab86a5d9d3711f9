//! Cursor-based pagination.
//!
//! # Design
//! List-valued endpoints answer with an envelope: an array under a
//! resource-specific key (`"ids"`, `"users"`) plus `next_cursor` /
//! `previous_cursor` integers. [`CursorPage`] decodes one envelope;
//! [`CursorPager`] holds the current page together with the request it came
//! from and re-issues that request with an updated `cursor` parameter to
//! advance. A pager is single-owner and sequential — it mutates in place
//! and is not meant to be shared across concurrent callers.

use serde_json::Value;
use tracing::debug;

use crate::client::Client;
use crate::error::ApiError;
use crate::http::Transport;
use crate::request::RequestSpec;

/// Initial cursor value for a fresh traversal. Never a terminal state.
pub const FIRST_CURSOR: i64 = -1;

/// A cursor value of zero signals no further pages.
const LAST_CURSOR: i64 = 0;

/// One decoded page of a cursor-paginated resource.
#[derive(Debug, Clone)]
pub struct CursorPage {
    items: Vec<Value>,
    item_key: String,
    pub next_cursor: i64,
    pub previous_cursor: i64,
}

impl CursorPage {
    /// Decode a response envelope, extracting the item array under
    /// `item_key` and both cursor fields.
    pub fn from_envelope(envelope: Value, item_key: &str) -> Result<Self, ApiError> {
        let items = envelope
            .get(item_key)
            .and_then(Value::as_array)
            .cloned()
            .ok_or_else(|| ApiError::Decode(format!("envelope missing `{item_key}` array")))?;
        let next_cursor = cursor_field(&envelope, "next_cursor")?;
        let previous_cursor = cursor_field(&envelope, "previous_cursor")?;
        Ok(Self {
            items,
            item_key: item_key.to_string(),
            next_cursor,
            previous_cursor,
        })
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    /// True when this is the final page of the traversal.
    pub fn is_last(&self) -> bool {
        self.next_cursor == LAST_CURSOR
    }

    fn take_items(&mut self) -> Vec<Value> {
        std::mem::take(&mut self.items)
    }
}

fn cursor_field(envelope: &Value, name: &str) -> Result<i64, ApiError> {
    envelope
        .get(name)
        .and_then(Value::as_i64)
        .ok_or_else(|| ApiError::Decode(format!("envelope missing integer `{name}`")))
}

/// Continuable traversal over a cursor-paginated resource.
///
/// Holds the current [`CursorPage`] and the request template it came from.
/// [`advance`](Self::advance) fetches the next page; once the held page's
/// `next_cursor` is zero the pager becomes exhausted and further calls are
/// no-ops.
pub struct CursorPager<'a, T: Transport> {
    client: &'a Client<T>,
    template: RequestSpec,
    page: CursorPage,
    exhausted: bool,
}

impl<'a, T: Transport> CursorPager<'a, T> {
    pub(crate) fn new(client: &'a Client<T>, template: RequestSpec, page: CursorPage) -> Self {
        Self {
            client,
            template,
            page,
            exhausted: false,
        }
    }

    /// Items of the currently held page.
    pub fn items(&self) -> &[Value] {
        self.page.items()
    }

    pub fn next_cursor(&self) -> i64 {
        self.page.next_cursor
    }

    pub fn previous_cursor(&self) -> i64 {
        self.page.previous_cursor
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Fetch the next page, replacing the held one, and return its items.
    ///
    /// When the held page was the last, the pager transitions to exhausted
    /// and yields no items; on an already-exhausted pager this is an
    /// idempotent no-op — it never errors.
    pub fn advance(&mut self) -> Result<&[Value], ApiError> {
        if self.exhausted {
            return Ok(&[]);
        }
        if self.page.is_last() {
            debug!(item_key = %self.page.item_key, "pager exhausted");
            self.exhausted = true;
            return Ok(&[]);
        }
        let mut spec = self.template.clone();
        spec.params
            .insert("cursor".to_string(), self.page.next_cursor.to_string());
        debug!(cursor = self.page.next_cursor, path = %spec.path, "fetching next page");
        let envelope = self.client.execute_json(&spec)?;
        self.page = CursorPage::from_envelope(envelope, &self.page.item_key)?;
        Ok(self.page.items())
    }

    /// Consume the pager into a lazy iterator over all items of all pages.
    ///
    /// Forward-only and non-restartable: each page is fetched only once the
    /// previous page's items have been consumed, and fetched pages are not
    /// retained for replay. A fetch failure is yielded once as an `Err`,
    /// after which the iterator is done.
    pub fn into_items(self) -> Items<'a, T> {
        let mut pager = self;
        let current = pager.page.take_items().into_iter();
        Items { pager, current }
    }
}

/// Lazy traversal over every item of every page. See
/// [`CursorPager::into_items`].
pub struct Items<'a, T: Transport> {
    pager: CursorPager<'a, T>,
    current: std::vec::IntoIter<Value>,
}

impl<T: Transport> Iterator for Items<'_, T> {
    type Item = Result<Value, ApiError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.current.next() {
                return Some(Ok(item));
            }
            if self.pager.is_exhausted() {
                return None;
            }
            match self.pager.advance() {
                Ok(_) => {
                    if self.pager.is_exhausted() {
                        return None;
                    }
                    self.current = self.pager.page.take_items().into_iter();
                }
                Err(e) => {
                    self.pager.exhausted = true;
                    return Some(Err(e));
                }
            }
        }
    }
}
