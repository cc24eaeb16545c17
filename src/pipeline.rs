// ABOUTME: Render job protocol for the big-deck engine
// ABOUTME: Job kinds, progress tracking, cancellation polling and cooperative checkpoints

use crate::canvas::Canvas;
use crate::deck::Mode;
use crate::renderer::Renderer;
use log::{debug, info};
use std::time::Instant;

/// The jobs a renderer runs against the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    Display,
    Print,
    ImageExport,
    CacheAll,
}

/// How a job ended. Cancellation is a normal outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Completed,
    Cancelled,
}

impl JobOutcome {
    pub fn from_cancelled(cancelled: bool) -> Self {
        if cancelled {
            JobOutcome::Cancelled
        } else {
            JobOutcome::Completed
        }
    }

    pub fn is_cancelled(&self) -> bool {
        *self == JobOutcome::Cancelled
    }
}

/// Canvas values a running job polls at every step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub surface: (u32, u32),
    pub mode: Mode,
    pub generation: u64,
    pub theme_epoch: u64,
    pub quit: bool,
    pub applying: bool,
}

/// Progress of a sized job
#[derive(Debug, Clone)]
pub struct Progress {
    kind: JobKind,
    total: usize,
    done: usize,
    started: Instant,
}

impl Progress {
    fn start(kind: JobKind, total: usize) -> Self {
        info!("{:?} job started: {} pages", kind, total);
        Self {
            kind,
            total,
            done: 0,
            started: Instant::now(),
        }
    }

    /// Record that page `index` is done. Reporting the same index twice is
    /// harmless.
    fn update(&mut self, index: usize) {
        self.done = self.done.max(index + 1).min(self.total);
    }

    fn end(&self, cancelled: bool) {
        info!(
            "{:?} job {} after {}/{} pages in {:.2} seconds",
            self.kind,
            if cancelled { "cancelled" } else { "complete" },
            self.done,
            self.total,
            self.started.elapsed().as_secs_f64()
        );
    }

    pub fn kind(&self) -> JobKind {
        self.kind
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn done(&self) -> usize {
        self.done
    }

    /// Completed share in `0.0..=1.0`
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.done as f64 / self.total as f64
        }
    }
}

/// State captured when a job starts and compared at each step
#[derive(Debug)]
pub struct JobState {
    kind: JobKind,
    start: Snapshot,
    progress: Option<Progress>,
}

impl JobState {
    pub fn start(kind: JobKind, size: Option<usize>, start: Snapshot) -> Self {
        Self {
            kind,
            start,
            progress: size.map(|total| Progress::start(kind, total)),
        }
    }

    pub fn kind(&self) -> JobKind {
        self.kind
    }

    pub fn progress(&self) -> Option<&Progress> {
        self.progress.as_ref()
    }

    pub(crate) fn update_progress(&mut self, index: usize) {
        if let Some(progress) = self.progress.as_mut() {
            progress.update(index);
        }
    }

    pub(crate) fn end_progress(&mut self, cancelled: bool) {
        if let Some(progress) = self.progress.take() {
            progress.end(cancelled);
        }
    }

    /// Why the job has to stop, if it has to
    pub fn cancel_reason(&self, live: &Snapshot) -> Option<&'static str> {
        if live.quit {
            return Some("canvas quit");
        }
        match self.kind {
            JobKind::Display | JobKind::Print => None,
            JobKind::ImageExport | JobKind::CacheAll => {
                if live.surface != self.start.surface {
                    Some("surface resized")
                } else if live.mode != self.start.mode {
                    Some("overview mode toggled")
                } else if live.applying || live.theme_epoch != self.start.theme_epoch {
                    Some("theme applied")
                } else if live.generation != self.start.generation {
                    Some("deck reloaded")
                } else {
                    None
                }
            }
        }
    }

    pub fn should_continue(&self, live: &Snapshot) -> bool {
        match self.cancel_reason(live) {
            Some(reason) => {
                debug!("{:?} job stopping: {}", self.kind, reason);
                false
            }
            None => true,
        }
    }
}

/// Point between job steps where pending UI work gets to run
pub trait Checkpoint<R: Renderer> {
    fn yield_now(&mut self, canvas: &mut Canvas<R>);
}

impl<R, F> Checkpoint<R> for F
where
    R: Renderer,
    F: FnMut(&mut Canvas<R>),
{
    fn yield_now(&mut self, canvas: &mut Canvas<R>) {
        self(canvas)
    }
}

/// Checkpoint for non-interactive runs: never yields
#[derive(Debug, Default, Clone, Copy)]
pub struct Headless;

impl<R: Renderer> Checkpoint<R> for Headless {
    fn yield_now(&mut self, _canvas: &mut Canvas<R>) {}
}
