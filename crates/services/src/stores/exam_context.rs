use prep_core::model::ExamSelection;
use storage::repository::Record;
use tokio::sync::{Mutex, watch};
use tracing::info;

use crate::error::StoreError;

/// The persisted exam-standard selection other views branch on.
pub struct ExamContextService {
    record: Record<ExamSelection>,
    state: watch::Sender<ExamSelection>,
    write_lock: Mutex<()>,
}

impl ExamContextService {
    /// # Errors
    ///
    /// Returns `StoreError` if the record cannot be read or decoded.
    pub async fn load(record: Record<ExamSelection>) -> Result<Self, StoreError> {
        let initial = record.load().await?.unwrap_or_default();
        let (state, _) = watch::channel(initial);
        Ok(Self {
            record,
            state,
            write_lock: Mutex::new(()),
        })
    }

    #[must_use]
    pub fn current(&self) -> ExamSelection {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ExamSelection> {
        self.state.subscribe()
    }

    /// Store the id, name and color together.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the selection cannot be persisted.
    pub async fn set_exam(&self, id: &str, name: &str, color: &str) -> Result<(), StoreError> {
        let mut next = ExamSelection::default();
        next.set(id, name, color);
        self.replace(next).await?;
        info!(exam_id = id, "exam selected");
        Ok(())
    }

    /// Return to exam selection.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the cleared selection cannot be persisted.
    pub async fn clear_exam(&self) -> Result<(), StoreError> {
        self.replace(ExamSelection::default()).await?;
        info!("exam selection cleared");
        Ok(())
    }

    async fn replace(&self, next: ExamSelection) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        self.record.save(&next).await?;
        self.state.send_replace(next);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::repository::{Storage, StorageError};

    use crate::stores::test_support::read_only_storage;

    #[tokio::test]
    async fn set_and_clear_are_persisted() {
        let storage = Storage::in_memory();
        let service = ExamContextService::load(storage.exam_selection.clone())
            .await
            .unwrap();
        assert!(!service.current().is_selected());

        service.set_exam("cbse", "CBSE", "purple").await.unwrap();
        let reloaded = ExamContextService::load(storage.exam_selection.clone())
            .await
            .unwrap();
        assert_eq!(reloaded.current().exam_id(), Some("cbse"));
        assert_eq!(reloaded.current().exam_color(), Some("purple"));

        service.clear_exam().await.unwrap();
        let stored = storage.exam_selection.load().await.unwrap().unwrap();
        assert!(!stored.is_selected());
        assert!(!service.current().is_selected());
    }

    #[tokio::test]
    async fn subscribers_see_selection_changes() {
        let service = ExamContextService::load(Storage::in_memory().exam_selection)
            .await
            .unwrap();
        let mut rx = service.subscribe();
        service.set_exam("act", "ACT", "rose").await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().exam_name(), Some("ACT"));
    }

    #[tokio::test]
    async fn failed_write_keeps_previous_selection() {
        let service = ExamContextService::load(read_only_storage().exam_selection)
            .await
            .unwrap();
        let mut rx = service.subscribe();

        let err = service.set_exam("cbse", "CBSE", "purple").await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Storage(StorageError::Connection(_))
        ));
        assert!(!service.current().is_selected());
        assert!(!rx.has_changed().unwrap());

        assert!(service.clear_exam().await.is_err());
        assert!(!rx.has_changed().unwrap());
    }
}
