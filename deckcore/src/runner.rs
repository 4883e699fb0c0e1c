//! Serial task runner
//!
//! A FIFO of pending tasks and at most one worker thread. The queue and the
//! running flag are only ever touched by the owner (the controller thread).
//! Workers get nothing but the action to run and a sender for their
//! completion; the owner drains completions and decides what runs next.

use crate::action::ActionRef;
use crate::error::ActionError;
use crate::safety::catch_panic;
use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::Duration;

/// Called from the worker thread after its completion has been sent, so
/// the owner can wake up and drain it.
pub type Waker = Arc<dyn Fn() + Send + Sync>;

/// One queued invocation of an action.
#[derive(Clone)]
pub struct Task {
    pub seq: u64,
    /// Display name, also the color key.
    pub name: String,
    pub action: ActionRef,
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("seq", &self.seq)
            .field("name", &self.name)
            .finish()
    }
}

/// What a worker reports back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub seq: u64,
    pub name: String,
    pub result: Result<(), ActionError>,
}

/// Outcome of trying to start the head of the queue.
#[derive(Debug)]
pub enum Dispatch {
    /// Nothing queued, or a task is already running.
    Idle,
    Started(Task),
    /// The worker thread could not be spawned. The task is consumed and
    /// the runner is idle again.
    SpawnFailed(Task, String),
}

pub struct Runner {
    queue: VecDeque<Task>,
    running: Option<u64>,
    next_seq: u64,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
    waker: Waker,
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

impl Runner {
    pub fn new() -> Self {
        Self::with_waker(Arc::new(|| {}))
    }

    pub fn with_waker(waker: Waker) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            queue: VecDeque::new(),
            running: None,
            next_seq: 0,
            tx,
            rx,
            waker,
        }
    }

    pub fn set_waker(&mut self, waker: Waker) {
        self.waker = waker;
    }

    /// Append a task. Does not start it; see [`Runner::dispatch_next`].
    pub fn push(&mut self, name: impl Into<String>, action: ActionRef) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push_back(Task { seq, name: name.into(), action });
        seq
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_idle(&self) -> bool {
        self.running.is_none() && self.queue.is_empty()
    }

    /// Start the head of the queue on a fresh worker thread, unless a task
    /// is already running or the queue is empty.
    pub fn dispatch_next(&mut self) -> Dispatch {
        if self.running.is_some() {
            return Dispatch::Idle;
        }
        let Some(task) = self.queue.pop_front() else {
            return Dispatch::Idle;
        };

        self.running = Some(task.seq);

        let tx = self.tx.clone();
        let waker = Arc::clone(&self.waker);
        let worker_task = task.clone();
        let spawned = std::thread::Builder::new()
            .name(format!("deck-task-{}", task.seq))
            .spawn(move || {
                let result = catch_panic(|| worker_task.action.run())
                    .unwrap_or_else(|panic| Err(ActionError::new(panic)));
                // The receiver only goes away with the runner itself.
                let _ = tx.send(Completion {
                    seq: worker_task.seq,
                    name: worker_task.name,
                    result,
                });
                waker();
            });

        match spawned {
            Ok(_) => {
                tracing::debug!(seq = task.seq, name = %task.name, "worker started");
                Dispatch::Started(task)
            }
            Err(e) => {
                self.running = None;
                Dispatch::SpawnFailed(task, e.to_string())
            }
        }
    }

    /// Take a completion if one is waiting. The task stays running until
    /// [`Runner::finish`] is called with it.
    pub fn try_complete(&mut self) -> Option<Completion> {
        self.rx.try_recv().ok()
    }

    /// Block up to `timeout` for a completion.
    pub fn wait_complete(&mut self, timeout: Duration) -> Option<Completion> {
        match self.rx.recv_timeout(timeout) {
            Ok(done) => Some(done),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Mark `done` as finished. Returns `false`, changing nothing, when it
    /// is not the running task (stale or repeated).
    pub fn finish(&mut self, done: &Completion) -> bool {
        if self.running != Some(done.seq) {
            tracing::warn!(seq = done.seq, running = ?self.running, "completion for a task that is not running");
            return false;
        }
        self.running = None;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::FnAction;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const WAIT: Duration = Duration::from_secs(5);

    #[test]
    fn test_dispatch_empty_is_idle() {
        let mut runner = Runner::new();
        assert!(matches!(runner.dispatch_next(), Dispatch::Idle));
        assert!(runner.is_idle());
    }

    #[test]
    fn test_only_one_dispatch_while_running() {
        let mut runner = Runner::new();
        let gate = Arc::new(std::sync::Barrier::new(2));
        let g = Arc::clone(&gate);
        runner.push("SLOW", FnAction::shared("slow", move || {
            g.wait();
            Ok(())
        }));
        runner.push("NEXT", FnAction::shared("next", || Ok(())));

        assert!(matches!(runner.dispatch_next(), Dispatch::Started(_)));
        assert!(runner.is_running());
        assert!(matches!(runner.dispatch_next(), Dispatch::Idle));
        assert_eq!(runner.pending(), 1);

        gate.wait();
        let done = runner.wait_complete(WAIT).unwrap();
        assert_eq!(done.name, "SLOW");
        assert!(done.result.is_ok());
        assert!(runner.is_running());
        assert!(runner.finish(&done));
        assert!(!runner.is_running());
        assert!(!runner.finish(&done));
    }

    #[test]
    fn test_panic_becomes_error_completion() {
        let mut runner = Runner::new();
        runner.push("PANICS", FnAction::shared("panics", || panic!("kaput")));
        runner.dispatch_next();

        let done = runner.wait_complete(WAIT).unwrap();
        assert_eq!(done.result, Err(ActionError::new("panicked: kaput")));
        assert!(runner.finish(&done));
        assert!(runner.is_idle());
    }

    #[test]
    fn test_waker_called_after_each_completion() {
        let wakes = Arc::new(AtomicUsize::new(0));
        let w = Arc::clone(&wakes);
        let mut runner = Runner::with_waker(Arc::new(move || {
            w.fetch_add(1, Ordering::SeqCst);
        }));

        for _ in 0..3 {
            runner.push("STEP", FnAction::shared("step", || Ok(())));
        }
        while let Dispatch::Started(_) = runner.dispatch_next() {
            let done = runner.wait_complete(WAIT).unwrap();
            runner.finish(&done);
        }

        // The waker runs just after the send, so give the last worker a moment.
        let deadline = std::time::Instant::now() + WAIT;
        while wakes.load(Ordering::SeqCst) < 3 && std::time::Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(wakes.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_sequence_numbers_increase() {
        let mut runner = Runner::new();
        let a = runner.push("A", FnAction::shared("a", || Ok(())));
        let b = runner.push("B", FnAction::shared("b", || Ok(())));
        assert!(b > a);
    }
}
