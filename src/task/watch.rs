/// Status polling and log tailing for a launched task.
///
/// One tick per interval: read the task status, report a change, and while the
/// task is producing output fetch the next page of log events. The loop ends
/// when the status reaches [`TERMINAL_STATUS`].
use std::time::Duration;

use super::errors::TaskError;
use super::service::{LogEvent, LogSource, TaskService};
use super::target::LogTarget;

/// Status after which a task never changes again.
pub const TERMINAL_STATUS: &str = "STOPPED";

/// Time between ticks.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Consecutive polls without the task before giving up on it.
pub const MAX_UNSEEN_POLLS: u32 = 60;

/// Statuses during which the log stream is read.
const LOG_STATUSES: [&str; 2] = ["RUNNING", "DEPROVISIONING"];

/// Things the watcher reports to the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchEvent<'a> {
    /// The task moved to a new status.
    StatusChanged(&'a str),
    /// The task stopped, with the reason the API gave.
    StoppedReason(&'a str),
    /// A new log line.
    Log(&'a LogEvent),
}

/// Log tailing state.
struct Tail<'a> {
    source: &'a dyn LogSource,
    target: LogTarget,
    token: Option<String>,
}

/// Poll loop over one task.
pub struct Watcher<'a> {
    tasks: &'a dyn TaskService,
    cluster: String,
    task_id: String,
    tail: Option<Tail<'a>>,
    interval: Duration,
    last_status: Option<String>,
    unseen: u32,
}

impl<'a> Watcher<'a> {
    #[must_use]
    pub fn new(tasks: &'a dyn TaskService, cluster: &str, task_id: &str) -> Self {
        Self {
            tasks,
            cluster: cluster.to_owned(),
            task_id: task_id.to_owned(),
            tail: None,
            interval: POLL_INTERVAL,
            last_status: None,
            unseen: 0,
        }
    }

    /// Tail `target` through `source` while the task runs.
    #[must_use]
    pub fn with_logs(mut self, source: &'a dyn LogSource, target: LogTarget) -> Self {
        self.tail = Some(Tail {
            source,
            target,
            token: None,
        });
        self
    }

    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Last status seen, if any.
    #[must_use]
    pub fn last_status(&self) -> Option<&str> {
        self.last_status.as_deref()
    }

    /// Run ticks until the task stops, then drain the remaining log events.
    ///
    /// # Errors
    ///
    /// Propagates task and log API errors (a missing log stream is not an error).
    pub async fn run(&mut self, sink: &mut dyn FnMut(WatchEvent<'_>)) -> Result<(), TaskError> {
        loop {
            if self.tick(sink).await? {
                self.drain_logs(sink).await?;
                return Ok(());
            }
            tokio::time::sleep(self.interval).await;
        }
    }

    /// One iteration. Returns `true` once the task reached the terminal status.
    ///
    /// # Errors
    ///
    /// See [`Watcher::run`].
    pub async fn tick(&mut self, sink: &mut dyn FnMut(WatchEvent<'_>)) -> Result<bool, TaskError> {
        let Some(state) = self.tasks.describe_task(&self.cluster, &self.task_id).await? else {
            self.unseen += 1;
            tracing::debug!(task_id = %self.task_id, polls = self.unseen, "task not visible");
            if self.unseen >= MAX_UNSEEN_POLLS {
                return Err(TaskError::TaskNotFound {
                    cluster: self.cluster.clone(),
                    task_id: self.task_id.clone(),
                    polls: self.unseen,
                });
            }
            return Ok(false);
        };
        self.unseen = 0;

        if self.last_status.as_deref() != Some(state.last_status.as_str()) {
            sink(WatchEvent::StatusChanged(&state.last_status));
            self.last_status = Some(state.last_status.clone());
            if state.last_status == TERMINAL_STATUS {
                if let Some(reason) = state.stopped_reason.as_deref() {
                    sink(WatchEvent::StoppedReason(reason));
                }
                return Ok(true);
            }
        }

        if LOG_STATUSES.contains(&state.last_status.as_str()) {
            self.fetch_logs(sink).await?;
        }
        Ok(false)
    }

    /// Read pages until the stream has nothing new.
    async fn drain_logs(&mut self, sink: &mut dyn FnMut(WatchEvent<'_>)) -> Result<(), TaskError> {
        while self.fetch_logs(sink).await? > 0 {}
        Ok(())
    }

    /// Fetch one page, print it, and advance the token. Returns the event count.
    async fn fetch_logs(&mut self, sink: &mut dyn FnMut(WatchEvent<'_>)) -> Result<usize, TaskError> {
        let Some(tail) = self.tail.as_mut() else {
            return Ok(0);
        };
        let page = tail
            .source
            .fetch(&tail.target.group, &tail.target.stream, tail.token.clone())
            .await?;
        let Some(page) = page else {
            // The stream is created on the first write.
            return Ok(0);
        };
        for event in &page.events {
            sink(WatchEvent::Log(event));
        }
        if page.next_forward_token.is_some() {
            tail.token = page.next_forward_token;
        }
        Ok(page.events.len())
    }
}
