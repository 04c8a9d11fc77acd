//! Employee collection manager.
//!
//! Keeps a local copy of `GET /employees` plus loading/error status. Every
//! refresh replaces the list wholesale; there is no incremental merge.
//!
//! Refreshes are sequenced: each one takes the next number, and a response
//! that arrives after a newer refresh was issued is dropped, so overlapping
//! refreshes always settle on the newest request's outcome.

use crate::store::{Readable, Store};
use hrdesk_client::EmployeeApi;
use hrdesk_core::EmployeeState;
use std::sync::atomic::{AtomicU64, Ordering};

/// How a single `refresh()` call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// New items published.
    Applied,
    /// Error published; items left as they were.
    Failed,
    /// A newer refresh was issued while this one was in flight; its result
    /// was discarded.
    Superseded,
}

pub struct EmployeeCollection {
    api: EmployeeApi,
    state: Store<EmployeeState>,
    issued: AtomicU64,
}

impl EmployeeCollection {
    pub fn new(api: EmployeeApi) -> Self {
        Self {
            api,
            state: Store::new(EmployeeState::default()),
            issued: AtomicU64::new(0),
        }
    }

    pub fn state(&self) -> Readable<EmployeeState> {
        self.state.readable()
    }

    /// Reloads the list. Failures end up in `state().error`, never as a
    /// returned error.
    pub async fn refresh(&self) -> RefreshOutcome {
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.update(|s| EmployeeState {
            items: s.items.clone(),
            loading: true,
            error: None,
        });

        let abandoned = AbandonGuard {
            collection: self,
            seq,
            armed: true,
        };
        let result = self.api.list().await;
        abandoned.disarm();

        let is_latest = || self.issued.load(Ordering::SeqCst) == seq;
        let outcome = match result {
            Ok(items) => {
                let count = items.len();
                let applied = self.state.try_update(|_| {
                    is_latest().then(|| EmployeeState {
                        items,
                        loading: false,
                        error: None,
                    })
                });
                if applied {
                    tracing::info!(seq, count, "employee list refreshed");
                    RefreshOutcome::Applied
                } else {
                    RefreshOutcome::Superseded
                }
            }
            Err(e) => {
                let message = e.message();
                let applied = self.state.try_update(|s| {
                    is_latest().then(|| EmployeeState {
                        items: s.items.clone(),
                        loading: false,
                        error: Some(message.clone()),
                    })
                });
                if applied {
                    tracing::warn!(seq, error = %message, "employee refresh failed");
                    RefreshOutcome::Failed
                } else {
                    RefreshOutcome::Superseded
                }
            }
        };

        if outcome == RefreshOutcome::Superseded {
            tracing::debug!(seq, latest = self.issued.load(Ordering::SeqCst), "discarded superseded refresh");
        }
        outcome
    }
}

/// Clears `loading` if the newest refresh is dropped before its response
/// arrives; older in-flight refreshes would otherwise leave it set.
struct AbandonGuard<'a> {
    collection: &'a EmployeeCollection,
    seq: u64,
    armed: bool,
}

impl AbandonGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for AbandonGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let collection = self.collection;
        let seq = self.seq;
        let cleared = collection.state.try_update(|s| {
            (s.loading && collection.issued.load(Ordering::SeqCst) == seq).then(|| EmployeeState {
                items: s.items.clone(),
                loading: false,
                error: s.error.clone(),
            })
        });
        if cleared {
            tracing::debug!(seq, "newest refresh abandoned");
        }
    }
}
