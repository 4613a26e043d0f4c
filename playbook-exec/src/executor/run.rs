use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::Stream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::executor::events::ExecutorStep;
use crate::executor::result::{Cancelled, RunError};

/// Producer side of the trace.
#[derive(Clone)]
pub(crate) struct StepSender {
    tx: mpsc::Sender<ExecutorStep>,
}

impl StepSender {
    /// Waits until the consumer has room; fails once the handle is gone.
    pub(crate) async fn emit(&self, step: ExecutorStep) -> Result<(), Cancelled> {
        tracing::debug!(event = step.name(), "step");
        self.tx.send(step).await.map_err(|_| Cancelled)
    }
}

/// Handle to a spawned run.
///
/// Events are produced one at a time: the channel holds a single event, so the
/// run suspends until the previous one is consumed. Dropping the handle (or
/// calling [`PlaybookRun::cancel`]) aborts the run at its next suspension point.
pub struct PlaybookRun<T> {
    rx: mpsc::Receiver<ExecutorStep>,
    task: Option<JoinHandle<Option<T>>>,
}

impl<T: Send + 'static> PlaybookRun<T> {
    pub(crate) fn spawn<F, Fut>(run_id: uuid::Uuid, f: F) -> Self
    where
        F: FnOnce(StepSender) -> Fut,
        Fut: Future<Output = Result<T, Cancelled>> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(1);
        let fut = f(StepSender { tx });
        let span = tracing::info_span!("playbook_run", run_id = %run_id);
        let task = tokio::spawn(async move { fut.await.ok() }.instrument(span));
        Self {
            rx,
            task: Some(task),
        }
    }

    pub async fn next(&mut self) -> Option<ExecutorStep> {
        self.rx.recv().await
    }

    /// Drains remaining events and returns the run's final value.
    pub async fn finish(mut self) -> Result<T, RunError> {
        while self.rx.recv().await.is_some() {}
        self.join().await
    }

    /// Collects every event along with the final value.
    pub async fn collect_steps(mut self) -> Result<(Vec<ExecutorStep>, T), RunError> {
        let mut steps = Vec::new();
        while let Some(step) = self.rx.recv().await {
            steps.push(step);
        }
        let value = self.join().await?;
        Ok((steps, value))
    }

    pub fn cancel(mut self) {
        self.abort();
    }

    async fn join(&mut self) -> Result<T, RunError> {
        let Some(task) = self.task.take() else {
            return Err(RunError::Cancelled);
        };
        match task.await {
            Ok(Some(value)) => Ok(value),
            Ok(None) => Err(RunError::Cancelled),
            Err(e) if e.is_cancelled() => Err(RunError::Cancelled),
            Err(e) => Err(RunError::Join(e.to_string())),
        }
    }
}

impl<T> PlaybookRun<T> {
    fn abort(&mut self) {
        self.rx.close();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl<T> Drop for PlaybookRun<T> {
    fn drop(&mut self) {
        self.abort();
    }
}

impl<T> Stream for PlaybookRun<T> {
    type Item = ExecutorStep;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().rx.poll_recv(cx)
    }
}
