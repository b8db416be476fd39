//! Per-call ambient context: cancellation, pagination and the total count
//! side channel.

use std::sync::OnceLock;

use tokio_util::sync::CancellationToken;

use crate::repository::Pagination;

#[derive(Debug, Default)]
pub struct CallContext {
    cancel: CancellationToken,
    pagination: Option<Pagination>,
    total: OnceLock<u64>,
}

impl CallContext {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Request a page of results. A zero limit disables pagination.
    #[must_use]
    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = (pagination.limit != 0).then_some(pagination);
        self
    }

    pub fn pagination(&self) -> Option<Pagination> {
        self.pagination
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Total number of matching rows reported by the last list call.
    pub fn total(&self) -> Option<u64> {
        self.total.get().copied()
    }

    /// Record the total; the first value recorded wins.
    pub(crate) fn set_total(&self, total: u64) {
        let _ = self.total.set(total);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_limit_disables_pagination() {
        let ctx = CallContext::new().with_pagination(Pagination {
            offset: 5,
            limit: 0,
        });
        assert_eq!(ctx.pagination(), None);
    }

    #[test]
    fn first_total_wins() {
        let ctx = CallContext::new();
        assert_eq!(ctx.total(), None);
        ctx.set_total(42);
        ctx.set_total(3);
        assert_eq!(ctx.total(), Some(42));
    }

    #[test]
    fn cancellation_is_observed() {
        let token = CancellationToken::new();
        let ctx = CallContext::new().with_cancellation(token.clone());
        assert!(!ctx.is_cancelled());
        token.cancel();
        assert!(ctx.is_cancelled());
    }
}
