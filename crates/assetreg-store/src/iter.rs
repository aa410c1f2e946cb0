use std::fmt;
use std::iter::Fuse;

use crate::error::StoreResult;

type Release<'a> = Box<dyn FnOnce() + 'a>;

/// Lazy, finite, non-restartable query results with scoped release.
///
/// Backends attach a release action when they hand out an iterator. The
/// action runs exactly once: on [`close`](Self::close) or when the iterator
/// is dropped, including when the consumer bails out early with `?`.
pub struct ResultsIterator<'a, T> {
    inner: Fuse<Box<dyn Iterator<Item = StoreResult<T>> + 'a>>,
    release: Option<Release<'a>>,
}

impl<'a, T> ResultsIterator<'a, T> {
    pub fn new<I>(inner: I) -> Self
    where
        I: Iterator<Item = StoreResult<T>> + 'a,
    {
        let boxed: Box<dyn Iterator<Item = StoreResult<T>> + 'a> = Box::new(inner);
        Self {
            inner: boxed.fuse(),
            release: None,
        }
    }

    /// Attach the action that frees the backend resource behind this iterator.
    pub fn on_release<F>(mut self, release: F) -> Self
    where
        F: FnOnce() + 'a,
    {
        self.release = Some(Box::new(release));
        self
    }

    /// Release the iterator explicitly.
    pub fn close(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl<T> Iterator for ResultsIterator<'_, T> {
    type Item = StoreResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

impl<T> Drop for ResultsIterator<'_, T> {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl<T> fmt::Debug for ResultsIterator<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultsIterator")
            .field("releasable", &self.release.is_some())
            .finish()
    }
}
