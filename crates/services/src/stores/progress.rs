use chrono::NaiveDate;
use prep_core::model::{Percent, ProgressState, Subject};
use storage::repository::Record;
use tokio::sync::{Mutex, watch};
use tracing::info;

use crate::Clock;
use crate::error::StoreError;

/// Durable streak and mastery bookkeeping.
///
/// Loaded once, mutated through `update_progress` or `increment_streak`, and
/// written back in full on every mutation. Subscribers only ever observe
/// states that were persisted.
pub struct ProgressService {
    clock: Clock,
    record: Record<ProgressState>,
    state: watch::Sender<ProgressState>,
    write_lock: Mutex<()>,
}

impl ProgressService {
    /// Load persisted progress, starting from zeroed defaults when absent.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the record cannot be read or decoded.
    pub async fn load(clock: Clock, record: Record<ProgressState>) -> Result<Self, StoreError> {
        let initial = record.load().await?.unwrap_or_default();
        let (state, _) = watch::channel(initial);
        Ok(Self {
            clock,
            record,
            state,
            write_lock: Mutex::new(()),
        })
    }

    #[must_use]
    pub fn get(&self) -> ProgressState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ProgressState> {
        self.state.subscribe()
    }

    /// Record one completed test dated by the service clock.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the new state cannot be persisted; the
    /// in-memory state is left unchanged in that case.
    pub async fn update_progress(
        &self,
        subject: Subject,
        score: Percent,
        questions_count: u32,
    ) -> Result<ProgressState, StoreError> {
        self.update_progress_on(self.clock.today(), subject, score, questions_count)
            .await
    }

    /// Same as `update_progress` with an explicit calendar day.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the new state cannot be persisted.
    pub async fn update_progress_on(
        &self,
        today: NaiveDate,
        subject: Subject,
        score: Percent,
        questions_count: u32,
    ) -> Result<ProgressState, StoreError> {
        let next = self
            .apply(|state| state.record_completion(today, subject, score, questions_count))
            .await?;
        info!(
            %subject,
            score = score.value(),
            questions_count,
            streak = next.streak(),
            "progress updated"
        );
        Ok(next)
    }

    /// Manual streak bump.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the new state cannot be persisted.
    pub async fn increment_streak(&self) -> Result<ProgressState, StoreError> {
        self.apply(ProgressState::increment_streak).await
    }

    async fn apply(
        &self,
        mutate: impl FnOnce(&mut ProgressState),
    ) -> Result<ProgressState, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut next = self.get();
        mutate(&mut next);
        self.record.save(&next).await?;
        self.state.send_replace(next.clone());
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use prep_core::time::{fixed_clock, fixed_now};
    use storage::repository::{Storage, StorageError};

    use crate::stores::test_support::read_only_storage;

    fn pct(value: u32) -> Percent {
        Percent::new(value).unwrap()
    }

    #[tokio::test]
    async fn starts_from_defaults() {
        let storage = Storage::in_memory();
        let service = ProgressService::load(fixed_clock(), storage.progress.clone())
            .await
            .unwrap();
        assert_eq!(service.get(), ProgressState::default());
        // Nothing is written until the first mutation.
        assert!(storage.progress.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_persists_and_publishes() {
        let storage = Storage::in_memory();
        let service = ProgressService::load(fixed_clock(), storage.progress.clone())
            .await
            .unwrap();
        let mut rx = service.subscribe();

        let state = service
            .update_progress(Subject::Mathematics, pct(100), 10)
            .await
            .unwrap();

        assert_eq!(state.streak(), 1);
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), state);
        assert_eq!(storage.progress.load().await.unwrap(), Some(state));
    }

    #[tokio::test]
    async fn next_day_reload_extends_streak() {
        let storage = Storage::in_memory();
        let first = ProgressService::load(fixed_clock(), storage.progress.clone())
            .await
            .unwrap();
        first
            .update_progress(Subject::English, pct(70), 5)
            .await
            .unwrap();

        let tomorrow = Clock::fixed(fixed_now() + Duration::days(1));
        let second = ProgressService::load(tomorrow, storage.progress.clone())
            .await
            .unwrap();
        let state = second
            .update_progress(Subject::English, pct(70), 5)
            .await
            .unwrap();
        assert_eq!(state.streak(), 2);
        assert_eq!(state.total_questions_solved(), 10);

        let later = Clock::fixed(fixed_now() + Duration::days(4));
        let third = ProgressService::load(later, storage.progress.clone())
            .await
            .unwrap();
        let state = third
            .update_progress(Subject::English, pct(70), 5)
            .await
            .unwrap();
        assert_eq!(state.streak(), 1);
    }

    #[tokio::test]
    async fn increment_streak_is_persisted() {
        let storage = Storage::in_memory();
        let service = ProgressService::load(fixed_clock(), storage.progress.clone())
            .await
            .unwrap();
        service.increment_streak().await.unwrap();
        service.increment_streak().await.unwrap();
        let stored = storage.progress.load().await.unwrap().unwrap();
        assert_eq!(stored.streak(), 2);
        assert_eq!(stored.last_practice_date(), None);
    }

    #[tokio::test]
    async fn failed_write_keeps_previous_state() {
        let storage = read_only_storage();
        let service = ProgressService::load(fixed_clock(), storage.progress.clone())
            .await
            .unwrap();
        let mut rx = service.subscribe();

        let err = service
            .update_progress(Subject::Mathematics, pct(90), 10)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Storage(StorageError::Connection(_))
        ));
        assert_eq!(service.get(), ProgressState::default());
        assert!(!rx.has_changed().unwrap());

        assert!(service.increment_streak().await.is_err());
        assert_eq!(service.get().streak(), 0);
        assert!(!rx.has_changed().unwrap());
    }
}
