use std::future::Future;
use std::time::Duration;

use tokio_retry::{
    strategy::{jitter, ExponentialBackoff},
    RetryIf,
};
use tracing::debug;

use crate::error::AppError;

/// Timeout and retry applied around each provider call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CallPolicy {
    pub timeout: Option<Duration>,
    pub max_retries: usize,
}

impl CallPolicy {
    /// A single attempt with no deadline.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new(timeout: Duration, max_retries: usize) -> Self {
        Self {
            timeout: Some(timeout),
            max_retries,
        }
    }

    pub async fn run<T, F, Fut>(&self, label: &'static str, mut call: F) -> Result<T, AppError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, AppError>>,
    {
        let timeout = self.timeout;
        // 100ms, 200ms, 400ms, ... capped at 5s
        let strategy = ExponentialBackoff::from_millis(2)
            .factor(50)
            .max_delay(Duration::from_secs(5))
            .map(jitter)
            .take(self.max_retries);

        RetryIf::spawn(
            strategy,
            || {
                let attempt = call();
                async move {
                    match timeout {
                        Some(limit) => match tokio::time::timeout(limit, attempt).await {
                            Ok(result) => result,
                            Err(_) => Err(AppError::Timeout(format!("{label} after {limit:?}"))),
                        },
                        None => attempt.await,
                    }
                }
            },
            |e: &AppError| {
                let retry = e.is_transient();
                if retry {
                    debug!(call = label, error = %e, "Retrying provider call");
                }
                retry
            },
        )
        .await
    }
}
