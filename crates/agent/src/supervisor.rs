use std::future::Future;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use synapse_core::Result;

/// Spawn a background task under a cancellation token.
///
/// The returned handle resolves once the task finishes, fails or is
/// cancelled. Outcomes are logged with the task name; a panic inside the
/// task is contained here and never tears down the caller.
pub fn spawn_supervised<F>(name: &str, token: CancellationToken, fut: F) -> JoinHandle<()>
where
    F: Future<Output = Result<()>> + Send + 'static,
{
    let name = name.to_string();
    tokio::spawn(async move {
        let mut inner = tokio::spawn(fut);
        tokio::select! {
            _ = token.cancelled() => {
                inner.abort();
                debug!(task = %name, "background task cancelled");
            }
            joined = &mut inner => match joined {
                Ok(Ok(())) => debug!(task = %name, "background task finished"),
                Ok(Err(err)) => warn!(task = %name, error = %err, "background task failed"),
                Err(join_err) if join_err.is_panic() => {
                    error!(task = %name, "background task panicked");
                }
                Err(_) => debug!(task = %name, "background task aborted"),
            },
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use synapse_core::Error;

    #[tokio::test]
    async fn test_task_runs_to_completion() {
        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();
        let handle = spawn_supervised("worker", CancellationToken::new(), async move {
            flag.store(true, Ordering::SeqCst);
            Ok(())
        });
        handle.await.unwrap();
        assert!(ran.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_cancellation_stops_task() {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = finished.clone();
        let token = CancellationToken::new();
        let handle = spawn_supervised("worker", token.clone(), async move {
            tokio::time::sleep(Duration::from_secs(60)).await;
            flag.store(true, Ordering::SeqCst);
            Ok(())
        });

        token.cancel();
        handle.await.unwrap();
        assert!(!finished.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_error_is_contained() {
        let handle = spawn_supervised("worker", CancellationToken::new(), async {
            Err(Error::Task("boom".to_string()))
        });
        // The supervisor resolves cleanly even though the task failed.
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_panic_is_contained() {
        let handle = spawn_supervised("worker", CancellationToken::new(), async {
            panic!("boom")
        });
        handle.await.unwrap();
    }
}
