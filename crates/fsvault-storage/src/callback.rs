//! Error-first callback calling convention over the async operations.
//!
//! With a callback, the callback is the error channel: it sees every outcome
//! exactly once and the returned future never fails. Without one, the
//! operation's own `Result` is returned untouched.

use std::future::Future;

use fsvault_core::StorageError;

use crate::FileStorage;

/// Run `operation`, report its outcome to `callback`, and resolve to the value
/// on success or `None` once a failure has been handed to the callback.
pub async fn with_callback<T, Fut, F>(operation: Fut, callback: F) -> Option<T>
where
    T: Clone,
    Fut: Future<Output = Result<T, StorageError>>,
    F: FnOnce(Result<T, StorageError>) + Send,
{
    match operation.await {
        Ok(value) => {
            callback(Ok(value.clone()));
            Some(value)
        }
        Err(err) => {
            callback(Err(err));
            None
        }
    }
}

/// Dispatch on an optional callback: with one, behave as [`with_callback`];
/// without one, resolve to the operation's result.
pub async fn settle<T, Fut, F>(
    operation: Fut,
    callback: Option<F>,
) -> Result<Option<T>, StorageError>
where
    T: Clone,
    Fut: Future<Output = Result<T, StorageError>>,
    F: FnOnce(Result<T, StorageError>) + Send,
{
    match callback {
        Some(callback) => Ok(with_callback(operation, callback).await),
        None => operation.await.map(Some),
    }
}

/// Callback-style view of a [`FileStorage`], see [`FileStorage::callbacks`].
///
/// Every operation takes an optional callback and follows [`settle`].
pub struct CallbackStorage<'a> {
    storage: &'a FileStorage,
}

impl<'a> CallbackStorage<'a> {
    pub fn new(storage: &'a FileStorage) -> Self {
        Self { storage }
    }

    pub async fn set_item<F>(
        &self,
        key: &str,
        value: &str,
        callback: Option<F>,
    ) -> Result<Option<()>, StorageError>
    where
        F: FnOnce(Result<(), StorageError>) + Send,
    {
        settle(self.storage.set_item(key, value), callback).await
    }

    pub async fn get_item<F>(
        &self,
        key: &str,
        callback: Option<F>,
    ) -> Result<Option<Option<String>>, StorageError>
    where
        F: FnOnce(Result<Option<String>, StorageError>) + Send,
    {
        settle(self.storage.get_item(key), callback).await
    }

    pub async fn remove_item<F>(
        &self,
        key: &str,
        callback: Option<F>,
    ) -> Result<Option<()>, StorageError>
    where
        F: FnOnce(Result<(), StorageError>) + Send,
    {
        settle(self.storage.remove_item(key), callback).await
    }

    pub async fn get_all_keys<F>(
        &self,
        callback: Option<F>,
    ) -> Result<Option<Vec<String>>, StorageError>
    where
        F: FnOnce(Result<Vec<String>, StorageError>) + Send,
    {
        settle(self.storage.get_all_keys(), callback).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use fsvault_core::fs::FsError;

    use super::*;
    use crate::StorageContext;

    type Calls<T> = Arc<Mutex<Vec<Result<T, String>>>>;

    fn recorder<T: Send + 'static>() -> (Calls<T>, impl FnOnce(Result<T, StorageError>) + Send) {
        let calls: Calls<T> = Arc::new(Mutex::new(Vec::new()));
        let sink = calls.clone();
        let callback = move |outcome: Result<T, StorageError>| {
            sink.lock()
                .expect("lock")
                .push(outcome.map_err(|e| e.to_string()));
        };
        (calls, callback)
    }

    fn failing() -> Result<u32, StorageError> {
        Err(FsError::NotFound {
            path: "/gone".into(),
        }
        .into())
    }

    fn storage() -> FileStorage {
        FileStorage::new(Arc::new(StorageContext::in_memory()), Some("/docs"), None)
            .expect("storage")
    }

    #[tokio::test]
    async fn success_reaches_callback_and_result() {
        let (calls, callback) = recorder::<u32>();
        let resolved = settle(async { Ok(7) }, Some(callback)).await.expect("ok");

        assert_eq!(resolved, Some(7));
        assert_eq!(*calls.lock().expect("lock"), vec![Ok(7)]);
    }

    #[tokio::test]
    async fn failure_goes_only_to_callback() {
        let (calls, callback) = recorder::<u32>();
        let resolved = settle(async { failing() }, Some(callback))
            .await
            .expect("callback path never fails");

        assert_eq!(resolved, None);
        let calls = calls.lock().expect("lock");
        assert_eq!(calls.len(), 1);
        assert!(calls[0].is_err());
    }

    #[tokio::test]
    async fn without_callback_the_error_is_returned() {
        let err = settle(async { failing() }, None::<fn(Result<u32, StorageError>)>)
            .await
            .expect_err("plain path fails");
        assert!(matches!(err, StorageError::Io(FsError::NotFound { .. })));
    }

    type NoCallback<T> = Option<fn(Result<T, StorageError>)>;

    async fn undecryptable_storage() -> FileStorage {
        let ctx = Arc::new(StorageContext::in_memory());
        let broken = FileStorage::new(ctx.clone(), Some("/docs"), None).expect("storage");
        ctx.filesystem()
            .mkdir(broken.base_folder(), true)
            .await
            .expect("mkdir");
        ctx.filesystem()
            .write(&broken.path_for_key("k"), "not ciphertext")
            .await
            .expect("write");
        broken
    }

    #[tokio::test]
    async fn storage_operations_through_callbacks() {
        let storage = storage();
        let view = storage.callbacks();

        let (set_calls, on_set) = recorder::<()>();
        let set = view.set_item("count", "1", Some(on_set)).await;
        assert_eq!(set.expect("set"), Some(()));
        assert_eq!(*set_calls.lock().expect("lock"), vec![Ok(())]);

        let (get_calls, on_get) = recorder::<Option<String>>();
        let got = view.get_item("count", Some(on_get)).await.expect("get");
        assert_eq!(got, Some(Some("1".to_string())));
        assert_eq!(
            *get_calls.lock().expect("lock"),
            vec![Ok(Some("1".to_string()))]
        );

        let (keys_calls, on_keys) = recorder::<Vec<String>>();
        let keys = view.get_all_keys(Some(on_keys)).await.expect("keys");
        assert_eq!(keys, Some(vec!["count".to_string()]));
        assert_eq!(keys_calls.lock().expect("lock").len(), 1);

        let (remove_calls, on_remove) = recorder::<()>();
        let removed = view.remove_item("count", Some(on_remove)).await;
        assert_eq!(removed.expect("remove"), Some(()));
        assert_eq!(remove_calls.lock().expect("lock").len(), 1);
    }

    #[tokio::test]
    async fn storage_operations_without_callbacks_return_results() {
        let storage = storage();
        let view = storage.callbacks();

        view.set_item("count", "2", NoCallback::<()>::None)
            .await
            .expect("set");
        let got = view
            .get_item("count", NoCallback::<Option<String>>::None)
            .await
            .expect("get");
        assert_eq!(got, Some(Some("2".to_string())));
        let keys = view
            .get_all_keys(NoCallback::<Vec<String>>::None)
            .await
            .expect("keys");
        assert_eq!(keys, Some(vec!["count".to_string()]));
        view.remove_item("count", NoCallback::<()>::None)
            .await
            .expect("remove");
        assert_eq!(storage.get_item("count").await.expect("get"), None);
    }

    #[tokio::test]
    async fn storage_failure_without_callback_is_returned() {
        let broken = undecryptable_storage().await;
        let err = broken
            .callbacks()
            .get_item("k", NoCallback::<Option<String>>::None)
            .await
            .expect_err("decrypt failure");
        assert!(err.is_decrypt());
        assert!(err
            .to_string()
            .starts_with("Error getting item: Could not decrypt state:"));
    }

    #[tokio::test]
    async fn storage_failure_is_reported_once_through_callback() {
        let broken = undecryptable_storage().await;

        let (calls, callback) = recorder::<Option<String>>();
        let resolved = broken
            .callbacks()
            .get_item("k", Some(callback))
            .await
            .expect("callback path never fails");

        assert_eq!(resolved, None);
        let calls = calls.lock().expect("lock");
        assert_eq!(calls.len(), 1);
        let message = calls[0].as_ref().expect_err("decrypt failure");
        assert!(message.starts_with("Error getting item: Could not decrypt state:"));
    }
}
