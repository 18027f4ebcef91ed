//! Object listing iterator
//!
//! Yields listing entries one at a time, fetching the next page from the
//! [`GcsApi`] only when the buffered page is exhausted.

use std::collections::VecDeque;

use gos_core::{Context, ContextError};
use thiserror::Error;

use crate::api::{GcsApi, GcsApiError, ObjectAttrs};

/// Why the iterator stopped before exhaustion
#[derive(Error, Debug)]
pub enum IterError {
    #[error(transparent)]
    Context(#[from] ContextError),

    #[error(transparent)]
    Api(#[from] GcsApiError),
}

/// Iterator over every object under a prefix
pub struct ObjectIterator<'a> {
    api: &'a dyn GcsApi,
    prefix: String,
    buffer: VecDeque<ObjectAttrs>,
    page_token: Option<String>,
    done: bool,
}

impl<'a> ObjectIterator<'a> {
    pub fn new(api: &'a dyn GcsApi, prefix: impl Into<String>) -> Self {
        Self {
            api,
            prefix: prefix.into(),
            buffer: VecDeque::new(),
            page_token: None,
            done: false,
        }
    }

    /// Next object, or `Ok(None)` once the listing is exhausted
    ///
    /// An error ends the iteration.
    pub async fn next(&mut self, ctx: &Context) -> Result<Option<ObjectAttrs>, IterError> {
        loop {
            if let Some(attrs) = self.buffer.pop_front() {
                return Ok(Some(attrs));
            }
            if self.done {
                return Ok(None);
            }

            let page = match ctx
                .run(self.api.list_objects(&self.prefix, self.page_token.clone()))
                .await
            {
                Ok(Ok(page)) => page,
                Ok(Err(e)) => {
                    self.done = true;
                    return Err(e.into());
                }
                Err(e) => {
                    self.done = true;
                    return Err(e.into());
                }
            };

            self.buffer.extend(page.items);
            match page.next_page_token {
                Some(token) if !token.is_empty() => self.page_token = Some(token),
                _ => self.done = true,
            }
        }
    }
}
