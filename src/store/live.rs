//! Live query subscriptions. A subscription owns a background task that
//! re-runs its query whenever the watched collection changes and pushes the
//! fresh snapshot to the holder. Releasing (or dropping) the handle aborts
//! the task, so no callback can fire after release.

use crate::common::models::Match;
use crate::store::database::{Collection, Store};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Cancellable handle on a live `matches` query.
#[derive(Debug)]
pub struct MatchSubscription {
    rx: mpsc::UnboundedReceiver<Vec<Match>>,
    bg: JoinHandle<()>,
}

impl MatchSubscription {
    /// Next snapshot, if the subscription is still live.
    pub async fn recv(&mut self) -> Option<Vec<Match>> {
        self.rx.recv().await
    }

    /// Non-blocking variant used by event loops that poll between inputs.
    pub fn try_recv(&mut self) -> Option<Vec<Match>> {
        self.rx.try_recv().ok()
    }

    pub fn release(self) {
        self.bg.abort();
    }
}

impl Drop for MatchSubscription {
    fn drop(&mut self) {
        self.bg.abort();
    }
}

impl Store {
    /// Subscribes to all matches whose pair contains `user_id`. An initial
    /// snapshot is delivered immediately, then one per matches-collection
    /// change until the handle is released.
    pub fn watch_matches(&self, user_id: &str) -> MatchSubscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let store = self.clone();
        let user_id = user_id.to_string();
        let mut changes = self.change_feed();

        let bg = tokio::spawn(async move {
            match store.matches_for(&user_id).await {
                Ok(snapshot) => {
                    if tx.send(snapshot).is_err() {
                        return;
                    }
                }
                Err(e) => log::warn!("match subscription: initial query failed: {}", e),
            }

            loop {
                match changes.recv().await {
                    Ok(Collection::Matches) => match store.matches_for(&user_id).await {
                        Ok(snapshot) => {
                            if tx.send(snapshot).is_err() {
                                break;
                            }
                        }
                        // A failed refresh drops this update, not the
                        // subscription.
                        Err(e) => log::warn!("match subscription: query failed: {}", e),
                    },
                    Ok(_) => {}
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        log::warn!("match subscription lagged, skipped {} changes", skipped);
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        MatchSubscription { rx, bg }
    }
}
