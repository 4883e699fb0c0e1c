//! Deck controller
//!
//! Single owner of all mutable deck state. Button clicks, timer ticks and
//! worker completions all arrive as [`Message`]s and are handled here on
//! the UI thread, in arrival order. Nothing else mutates the queue or the
//! running flag.

use crate::action::{Action, ActionRef};
use crate::log::{LogKind, LogView};
use crate::palette::{ButtonStyle, ColorBook};
use crate::pool::AnimationPool;
use crate::registry::Registry;
use crate::runner::{Completion, Dispatch, Runner, Waker};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

#[derive(Debug)]
pub enum Message {
    /// The button at this registry index was clicked.
    Enqueue(usize),
    /// A worker reported back. Only the completion of the running task
    /// has any effect.
    TaskFinished(Completion),
    /// The background swap timer fired.
    SwapAnimation,
    /// The button recolor timer fired.
    Recolor,
}

pub struct Controller {
    registry: Registry,
    runner: Runner,
    colors: ColorBook,
    log: LogView,
    pool: AnimationPool<PathBuf>,
    background: Option<PathBuf>,
    button_style: ButtonStyle,
    rng: StdRng,
}

impl Controller {
    pub fn new(registry: Registry, animations: Vec<PathBuf>) -> Self {
        Self::with_rng(registry, animations, StdRng::from_entropy())
    }

    /// Deterministic colors and shuffles, for tests.
    pub fn with_seed(registry: Registry, animations: Vec<PathBuf>, seed: u64) -> Self {
        Self::with_rng(registry, animations, StdRng::seed_from_u64(seed))
    }

    fn with_rng(registry: Registry, animations: Vec<PathBuf>, mut rng: StdRng) -> Self {
        let mut pool = AnimationPool::new(animations, &mut rng);
        let background = pool.next(&mut rng);
        tracing::info!(
            actions = registry.len(),
            animations = pool.len(),
            "controller ready"
        );
        Self {
            registry,
            runner: Runner::new(),
            colors: ColorBook::new(),
            log: LogView::new(),
            pool,
            background,
            button_style: ButtonStyle::default(),
            rng,
        }
    }

    /// Hook called from worker threads once a completion is waiting.
    pub fn set_waker(&mut self, waker: Waker) {
        self.runner.set_waker(waker);
    }

    pub fn handle(&mut self, message: Message) {
        match message {
            Message::Enqueue(index) => match self.registry.get(index).cloned() {
                Some(action) => {
                    let name = action.display_name();
                    self.enqueue(name, action);
                }
                None => tracing::warn!(index, "click on unknown action index"),
            },
            Message::TaskFinished(done) => self.on_finished(done),
            Message::SwapAnimation => {
                if let Some(next) = self.pool.next(&mut self.rng) {
                    tracing::debug!(path = %next.display(), "swapping background");
                    self.background = Some(next);
                }
            }
            Message::Recolor => {
                self.button_style = ButtonStyle::random(&mut self.rng);
            }
        }
    }

    /// Queue an action under `name`. Starts it right away when idle.
    pub fn enqueue(&mut self, name: impl Into<String>, action: ActionRef) {
        let name = name.into();
        self.colors.assign(&name, &mut self.rng);
        let seq = self.runner.push(name.clone(), action);
        tracing::debug!(seq, name = %name, pending = self.runner.pending(), "enqueued");
        if !self.runner.is_running() {
            self.dispatch_next();
        }
    }

    /// Start the head of the queue if nothing is running.
    pub fn dispatch_next(&mut self) {
        loop {
            match self.runner.dispatch_next() {
                Dispatch::Idle => return,
                Dispatch::Started(task) => {
                    self.log.push(
                        format!("Executing {}...", task.name),
                        LogKind::Info,
                        Some(task.name.as_str()),
                        &self.colors,
                    );
                    return;
                }
                Dispatch::SpawnFailed(task, err) => {
                    self.log.push(
                        format!("Error in {}: could not start worker: {}", task.name, err),
                        LogKind::Error,
                        Some(task.name.as_str()),
                        &self.colors,
                    );
                }
            }
        }
    }

    fn on_finished(&mut self, done: Completion) {
        if !self.runner.finish(&done) {
            return;
        }
        match &done.result {
            Ok(()) => self.log.push(
                format!("{} finished successfully.", done.name),
                LogKind::Success,
                Some(done.name.as_str()),
                &self.colors,
            ),
            Err(e) => self.log.push(
                format!("Error in {}: {}", done.name, e),
                LogKind::Error,
                Some(done.name.as_str()),
                &self.colors,
            ),
        }
        self.dispatch_next();
    }

    /// Handle every completion already waiting. Never blocks.
    /// Returns how many were handled.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Some(done) = self.runner.try_complete() {
            self.handle(Message::TaskFinished(done));
            handled += 1;
        }
        handled
    }

    /// Block until the queue has drained or `timeout` passes. Returns
    /// whether the deck went idle.
    pub fn run_until_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while !self.runner.is_idle() {
            let left = deadline.saturating_duration_since(Instant::now());
            if left.is_zero() {
                return false;
            }
            match self.runner.wait_complete(left) {
                Some(done) => self.handle(Message::TaskFinished(done)),
                None => return self.runner.is_idle(),
            }
        }
        true
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn log(&self) -> &LogView {
        &self.log
    }

    pub fn colors(&self) -> &ColorBook {
        &self.colors
    }

    pub fn background(&self) -> Option<&Path> {
        self.background.as_deref()
    }

    pub fn button_style(&self) -> ButtonStyle {
        self.button_style
    }

    pub fn is_running(&self) -> bool {
        self.runner.is_running()
    }

    pub fn pending(&self) -> usize {
        self.runner.pending()
    }
}
