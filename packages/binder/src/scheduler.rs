//! Render Scheduler
//!
//! Collects changed keys between flushes and decides when a flush runs.
//! Throttling has both edges: the first change in a quiet period flushes
//! immediately, changes during the cooldown are coalesced into a single
//! trailing flush at the window boundary.
//!
//! The scheduler never runs anything itself. Its owner asks it whether to
//! flush now ([`RenderScheduler::notify`]) and polls for a due trailing
//! flush ([`RenderScheduler::is_due`]).

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use indexmap::IndexSet;

/// Time source
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    elapsed: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        ManualClock {
            origin: Instant::now(),
            elapsed: Rc::new(Cell::new(Duration::ZERO)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.elapsed.set(self.elapsed.get() + by);
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed.get()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed.get()
    }
}

pub struct RenderScheduler {
    interval: Duration,
    clock: Rc<dyn Clock>,
    pending: IndexSet<String>,
    last_flush: Option<Instant>,
    deadline: Option<Instant>,
    flushing: bool,
}

impl RenderScheduler {
    pub fn new(interval: Duration, clock: Rc<dyn Clock>) -> Self {
        RenderScheduler {
            interval,
            clock,
            pending: IndexSet::new(),
            last_flush: None,
            deadline: None,
            flushing: false,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Record a changed key. Returns true when the caller should flush now.
    ///
    /// While a flush runs the key is only queued; [`end_flush`](Self::end_flush)
    /// schedules the trailing flush that picks it up.
    pub fn notify(&mut self, key: &str) -> bool {
        self.pending.insert(key.to_string());
        if self.flushing {
            return false;
        }
        if self.is_quiet() {
            return true;
        }
        self.schedule_trailing();
        false
    }

    /// Queue a flush for the next poll instead of running it now
    pub fn defer(&mut self) {
        let now = self.clock.now();
        self.deadline = Some(self.deadline.map_or(now, |d| d.min(now)));
    }

    fn is_quiet(&self) -> bool {
        match self.last_flush {
            None => true,
            Some(last) => self.clock.now() >= last + self.interval,
        }
    }

    fn schedule_trailing(&mut self) {
        if self.deadline.is_none() {
            let base = self.last_flush.unwrap_or_else(|| self.clock.now());
            self.deadline = Some(base + self.interval);
        }
    }

    /// With nothing pending a flush has no work and must not start a
    /// cooldown. Drops any scheduled deadline and reports whether idle.
    pub fn settle_if_idle(&mut self) -> bool {
        if !self.pending.is_empty() {
            return false;
        }
        self.deadline = None;
        true
    }

    /// Enter a flush, taking every pending key
    pub fn begin_flush(&mut self) -> IndexSet<String> {
        self.flushing = true;
        self.last_flush = Some(self.clock.now());
        self.deadline = None;
        std::mem::take(&mut self.pending)
    }

    /// Enter the bind-time render. Unlike a flush it does not start a
    /// cooldown, so the first change after binding flushes immediately.
    pub fn begin_initial_render(&mut self) {
        self.flushing = true;
    }

    /// Leave a flush. Keys queued meanwhile get a trailing flush.
    pub fn end_flush(&mut self) {
        self.flushing = false;
        if !self.pending.is_empty() {
            self.schedule_trailing();
        }
    }

    pub fn is_flushing(&self) -> bool {
        self.flushing
    }

    /// Whether a trailing flush is scheduled and its time has come
    pub fn is_due(&self) -> bool {
        self.deadline
            .map(|deadline| self.clock.now() >= deadline)
            .unwrap_or(false)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn pending(&self) -> &IndexSet<String> {
        &self.pending
    }
}
