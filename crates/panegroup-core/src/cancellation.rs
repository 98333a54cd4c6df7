#![forbid(unsafe_code)]

//! Cooperative cancellation for multi-frame work.
//!
//! A [`CancellationSource`] hands out [`CancellationToken`]s. Frame callbacks
//! poll their token and stop (return `false`) once the source has been
//! cancelled. Dropping a source does **not** cancel its tokens.
//!
//! ```
//! use panegroup_core::cancellation::CancellationSource;
//!
//! let source = CancellationSource::new();
//! let token = source.token();
//! assert!(!token.is_cancelled());
//! source.cancel();
//! assert!(token.is_cancelled());
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cloneable view of a cancellation signal.
#[derive(Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

/// Control handle that raises the cancellation signal.
pub struct CancellationSource {
    cancelled: Arc<AtomicBool>,
}

impl CancellationSource {
    #[must_use]
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Token observing this source.
    #[must_use]
    pub fn token(&self) -> CancellationToken {
        CancellationToken {
            cancelled: Arc::clone(&self.cancelled),
        }
    }

    /// Raise the signal. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Default for CancellationSource {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CancellationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancellationSource")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

impl CancellationToken {
    /// A token that can never be cancelled.
    #[must_use]
    pub fn never() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_tokens_observe_cancel() {
        let source = CancellationSource::new();
        let first = source.token();
        let second = first.clone();
        source.cancel();
        assert!(first.is_cancelled());
        assert!(second.is_cancelled());
        assert!(source.is_cancelled());
    }

    #[test]
    fn dropping_source_does_not_cancel() {
        let token = {
            let source = CancellationSource::new();
            source.token()
        };
        assert!(!token.is_cancelled());
    }

    #[test]
    fn never_token_stays_live() {
        assert!(!CancellationToken::never().is_cancelled());
    }

    #[test]
    fn cancel_is_idempotent() {
        let source = CancellationSource::default();
        source.cancel();
        source.cancel();
        assert!(source.token().is_cancelled());
    }
}
