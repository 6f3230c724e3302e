//! The single-slot holder for the latest completed run.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use medintel_insights::DashboardRun;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Issued when a run starts. Only the newest ticket may publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunTicket(u64);

/// A completed run as currently shown to clients.
#[derive(Debug)]
pub struct PublishedRun {
    pub run_id: Uuid,
    pub run: DashboardRun,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct SlotState {
    latest_ticket: u64,
    current: Option<Arc<PublishedRun>>,
}

/// Holds at most one published run, replaced whole on each publish.
#[derive(Debug, Default)]
pub struct DashboardSlot {
    state: RwLock<SlotState>,
}

impl DashboardSlot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a run, superseding every ticket handed out before.
    pub async fn begin_run(&self) -> RunTicket {
        let mut state = self.state.write().await;
        state.latest_ticket += 1;
        RunTicket(state.latest_ticket)
    }

    /// Publishes `run` if `ticket` is still the newest.
    ///
    /// Returns the published run, or `None` when a newer run has started
    /// since and the result was discarded.
    pub async fn publish(&self, ticket: RunTicket, run: DashboardRun) -> Option<Arc<PublishedRun>> {
        let mut state = self.state.write().await;
        if ticket.0 != state.latest_ticket {
            tracing::info!(
                ticket = ticket.0,
                latest = state.latest_ticket,
                "discarding stale run"
            );
            return None;
        }

        let published = Arc::new(PublishedRun {
            run_id: Uuid::new_v4(),
            run,
            completed_at: Utc::now(),
        });
        state.current = Some(Arc::clone(&published));
        Some(published)
    }

    /// Clears the slot after a failed run, unless a newer run has started.
    pub async fn clear(&self, ticket: RunTicket) -> bool {
        let mut state = self.state.write().await;
        if ticket.0 != state.latest_ticket {
            return false;
        }
        state.current = None;
        true
    }

    pub async fn current(&self) -> Option<Arc<PublishedRun>> {
        self.state.read().await.current.clone()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use medintel_insights::{process_dataset, NoopProvider};
    use medintel_pipeline::sample_dataset;

    use super::*;

    async fn sample_run() -> DashboardRun {
        process_dataset(sample_dataset(), &NoopProvider, Duration::from_secs(1))
            .await
            .expect("sample dataset processes")
    }

    #[tokio::test]
    async fn empty_slot_has_no_current_run() {
        let slot = DashboardSlot::new();
        assert!(slot.current().await.is_none());
    }

    #[tokio::test]
    async fn newest_ticket_publishes() {
        let slot = DashboardSlot::new();
        let ticket = slot.begin_run().await;
        let published = slot.publish(ticket, sample_run().await).await;

        assert!(published.is_some());
        let current = slot.current().await.expect("run published");
        assert_eq!(current.run.dashboard.record_count, 7);
    }

    #[tokio::test]
    async fn stale_ticket_never_overwrites_newer_run() {
        let slot = DashboardSlot::new();
        let older = slot.begin_run().await;
        let newer = slot.begin_run().await;

        let newer_id = slot
            .publish(newer, sample_run().await)
            .await
            .expect("newest publishes")
            .run_id;
        assert!(slot.publish(older, sample_run().await).await.is_none());

        let current = slot.current().await.expect("newer run stays");
        assert_eq!(current.run_id, newer_id);
    }

    #[tokio::test]
    async fn stale_ticket_cannot_clear() {
        let slot = DashboardSlot::new();
        let older = slot.begin_run().await;
        let newer = slot.begin_run().await;
        slot.publish(newer, sample_run().await).await;

        assert!(!slot.clear(older).await);
        assert!(slot.current().await.is_some());
    }

    #[tokio::test]
    async fn failed_newest_run_clears_slot() {
        let slot = DashboardSlot::new();
        let first = slot.begin_run().await;
        slot.publish(first, sample_run().await).await;

        let second = slot.begin_run().await;
        assert!(slot.clear(second).await);
        assert!(slot.current().await.is_none());
    }
}
