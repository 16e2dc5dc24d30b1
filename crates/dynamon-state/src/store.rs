//! Observable state store.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::watch;

use crate::action::Message;
use crate::reducer::reduce;
use crate::state::DynamonState;

/// Holds the current snapshot and notifies subscribers on change.
#[derive(Debug)]
pub struct Store {
    state: RwLock<Arc<DynamonState>>,
    tx: watch::Sender<Arc<DynamonState>>,
}

impl Store {
    /// A store starting from `initial`.
    #[must_use]
    pub fn new(initial: DynamonState) -> Self {
        let initial = Arc::new(initial);
        let (tx, _rx) = watch::channel(Arc::clone(&initial));
        Self {
            state: RwLock::new(initial),
            tx,
        }
    }

    /// The current snapshot.
    #[must_use]
    pub fn state(&self) -> Arc<DynamonState> {
        Arc::clone(&self.state.read())
    }

    /// Fold a message and return the resulting snapshot.
    ///
    /// Subscribers are notified only when the snapshot changed.
    pub fn dispatch(&self, message: &Message) -> Arc<DynamonState> {
        let mut guard = self.state.write();
        let next = reduce(&guard, message);
        if !Arc::ptr_eq(&guard, &next) {
            *guard = Arc::clone(&next);
            self.tx.send_replace(Arc::clone(&next));
        }
        next
    }

    /// Receive every changed snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<DynamonState>> {
        self.tx.subscribe()
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new(DynamonState::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{Action, actions};

    #[tokio::test]
    async fn test_should_notify_subscribers_on_change() {
        let store = Store::default();
        let mut rx = store.subscribe();

        store.dispatch(&actions::read_endpoints().into());

        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().loading_endpoints);
    }

    #[test]
    fn test_should_not_notify_for_ignored_message() {
        let store = Store::default();
        let rx = store.subscribe();
        let before = store.state();

        let after = store.dispatch(
            &Action {
                action_type: "@@INIT".to_owned(),
                payload: None,
                universal: false,
            }
            .into(),
        );

        assert!(Arc::ptr_eq(&before, &after));
        assert!(!rx.has_changed().unwrap());
    }
}
