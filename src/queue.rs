//! FIFO task queue with lifecycle events.
//!
//! Tasks run one at a time, in enqueue order, and only when the consumer
//! pulls from [`TaskQueue::process`]. Each successfully completed task is
//! handed back to the consumer, which is how the driver reads generation
//! results. Failed tasks are reported through events and never yielded.
//!
//! ## Events
//!
//! When an event channel is attached, the queue reports:
//!
//! ```text
//! TaskEnqueued(t)                 on every enqueue
//! BeforeAll                       first pull of a process() run
//!   BeforeEach(t)                 before t runs
//!   TaskError(t, e)               t failed
//!   AfterEach(t)                  t finished, successfully or not
//! AfterAll                        backlog drained, halted, or iterator dropped
//! ```
//!
//! `AfterEach` for a task that was yielded is sent when the consumer comes
//! back for the next task (or drops the iterator), so consumer-side work on
//! the yielded task happens between the two. A failed task whose
//! stop-on-error policy is set ends the run with `AfterAll`. The policy
//! defaults to [`Task::stop_on_error`](crate::task::Task::stop_on_error) and
//! can be chosen per entry with [`TaskQueue::enqueue_with_policy`]. The
//! remaining backlog stays queued and a later `process()` call picks it up.

use crate::task::{Task, TaskKind, Toolbox};
use std::collections::VecDeque;
use std::sync::mpsc::Sender;
use tracing::{debug, warn};

/// Identity of a task in events, detached from the task itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSummary {
    /// Position in enqueue order, starting at 1.
    pub seq: usize,
    pub kind: TaskKind,
    pub label: String,
}

impl TaskSummary {
    fn of(seq: usize, task: &Task) -> Self {
        Self {
            seq,
            kind: task.kind(),
            label: task.label(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueEvent {
    TaskEnqueued(TaskSummary),
    BeforeAll,
    BeforeEach(TaskSummary),
    AfterEach(TaskSummary),
    TaskError { task: TaskSummary, error: String },
    AfterAll,
}

/// A queued task with its position and failure policy.
#[derive(Debug)]
struct Entry {
    seq: usize,
    task: Task,
    stop_on_error: bool,
}

#[derive(Debug, Default)]
pub struct TaskQueue {
    backlog: VecDeque<Entry>,
    enqueued: usize,
    events: Option<Sender<QueueEvent>>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an event channel. A disconnected receiver is ignored.
    pub fn with_events(mut self, events: Sender<QueueEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Queue `task` with the default policy of its kind.
    pub fn enqueue(&mut self, task: impl Into<Task>) {
        let task = task.into();
        let stop_on_error = task.stop_on_error();
        self.enqueue_with_policy(task, stop_on_error);
    }

    /// Queue `task`, choosing whether its failure halts the run.
    pub fn enqueue_with_policy(&mut self, task: impl Into<Task>, stop_on_error: bool) {
        let task = task.into();
        self.enqueued += 1;
        let seq = self.enqueued;
        self.emit(QueueEvent::TaskEnqueued(TaskSummary::of(seq, &task)));
        self.backlog.push_back(Entry {
            seq,
            task,
            stop_on_error,
        });
    }

    pub fn len(&self) -> usize {
        self.backlog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backlog.is_empty()
    }

    /// Pending tasks in execution order.
    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.backlog.iter().map(|entry| &entry.task)
    }

    /// Summaries of the pending tasks, in execution order.
    pub fn summaries(&self) -> Vec<TaskSummary> {
        self.backlog
            .iter()
            .map(|entry| TaskSummary::of(entry.seq, &entry.task))
            .collect()
    }

    /// Start draining the backlog. Nothing runs until the returned iterator
    /// is pulled.
    pub fn process<'q, 't>(&'q mut self, tools: Toolbox<'t>) -> Process<'q, 't> {
        Process {
            queue: self,
            tools,
            started: false,
            finished: false,
            pending_after: None,
            failed: 0,
            halted: false,
        }
    }

    fn emit(&self, event: QueueEvent) {
        if let Some(events) = &self.events {
            events.send(event).ok();
        }
    }
}

/// Lazy run over a [`TaskQueue`], yielding each task that completed
/// successfully.
pub struct Process<'q, 't> {
    queue: &'q mut TaskQueue,
    tools: Toolbox<'t>,
    started: bool,
    finished: bool,
    pending_after: Option<TaskSummary>,
    failed: usize,
    halted: bool,
}

impl Process<'_, '_> {
    /// Number of tasks that failed so far.
    pub fn failed(&self) -> usize {
        self.failed
    }

    /// Whether a stop-on-error failure ended the run early.
    pub fn halted(&self) -> bool {
        self.halted
    }

    fn flush_after_each(&mut self) {
        if let Some(summary) = self.pending_after.take() {
            self.queue.emit(QueueEvent::AfterEach(summary));
        }
    }

    fn finish(&mut self) {
        if self.started && !self.finished {
            self.flush_after_each();
            self.queue.emit(QueueEvent::AfterAll);
        }
        self.finished = true;
    }
}

impl Iterator for Process<'_, '_> {
    type Item = Task;

    fn next(&mut self) -> Option<Task> {
        if self.finished {
            return None;
        }
        if !self.started {
            self.started = true;
            self.queue.emit(QueueEvent::BeforeAll);
        }
        self.flush_after_each();

        loop {
            let Some(Entry {
                seq,
                mut task,
                stop_on_error,
            }) = self.queue.backlog.pop_front()
            else {
                self.finish();
                return None;
            };
            let summary = TaskSummary::of(seq, &task);
            self.queue.emit(QueueEvent::BeforeEach(summary.clone()));
            debug!(seq, kind = %summary.kind, label = %summary.label, "running task");

            match task.run(&self.tools) {
                Ok(()) => {
                    self.pending_after = Some(summary);
                    return Some(task);
                }
                Err(e) => {
                    warn!(seq, kind = %summary.kind, error = %e, "task failed");
                    self.failed += 1;
                    self.queue.emit(QueueEvent::TaskError {
                        task: summary.clone(),
                        error: e.to_string(),
                    });
                    self.queue.emit(QueueEvent::AfterEach(summary));
                    if stop_on_error {
                        self.halted = true;
                        self.finish();
                        return None;
                    }
                }
            }
        }
    }
}

impl Drop for Process<'_, '_> {
    fn drop(&mut self) {
        self.finish();
    }
}
