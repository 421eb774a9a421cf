//! Counters and timing segments.
//!
//! All counters are relaxed atomics written by the engine thread and read
//! by the signal thread, so a statistics snapshot can be taken at any
//! moment without locks. The single running-timer register (a bucket tag
//! plus a start instant) lets the snapshot charge an interrupted call to
//! the `unknown` bucket.

use serde::Serialize;
use std::io::Write;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::OnceLock;
use std::time::Instant;

static PROCESS_START: OnceLock<Instant> = OnceLock::new();

/// Seconds since the first statistics activity of the process.
#[must_use]
pub fn process_time() -> f64 {
    PROCESS_START.get_or_init(Instant::now).elapsed().as_secs_f64()
}

/// What a running timer charges to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// A main-oracle solve; charged to `sat`/`unsat` on completion and to
    /// `unknown` when interrupted.
    Solve,
    /// The flip probe.
    Flip,
    /// A checker solve.
    Check,
}

impl TimerKind {
    fn tag(self) -> u8 {
        match self {
            Self::Solve => 1,
            Self::Flip => 2,
            Self::Check => 3,
        }
    }

    fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(Self::Solve),
            2 => Some(Self::Flip),
            3 => Some(Self::Check),
            _ => None,
        }
    }
}

/// The statistics block shared between the engine and the signal thread.
#[derive(Debug, Default)]
pub struct Stats {
    pub(crate) backbones: AtomicU64,
    pub(crate) dropped: AtomicU64,
    pub(crate) filtered: AtomicU64,
    pub(crate) flipped: AtomicU64,
    pub(crate) fixed_hits: AtomicU64,
    pub(crate) checked: AtomicU64,

    pub(crate) calls_total: AtomicU64,
    pub(crate) calls_sat: AtomicU64,
    pub(crate) calls_unsat: AtomicU64,
    pub(crate) calls_unknown: AtomicU64,
    pub(crate) checker_sat: AtomicU64,
    pub(crate) checker_unsat: AtomicU64,

    // Times in seconds, stored as f64 bit patterns.
    time_first: AtomicU64,
    time_sat: AtomicU64,
    time_unsat: AtomicU64,
    time_satmax: AtomicU64,
    time_unsatmax: AtomicU64,
    time_unknown: AtomicU64,
    time_solving: AtomicU64,
    time_flip: AtomicU64,
    time_check: AtomicU64,

    /// Tag of the running timer; zero when none.
    timer_kind: AtomicU8,
    /// Start of the running timer's current segment, seconds.
    timer_started: AtomicU64,
}

fn load_f64(cell: &AtomicU64) -> f64 {
    f64::from_bits(cell.load(Ordering::Relaxed))
}

fn store_f64(cell: &AtomicU64, value: f64) {
    cell.store(value.to_bits(), Ordering::Relaxed);
}

fn add_f64(cell: &AtomicU64, delta: f64) {
    store_f64(cell, load_f64(cell) + delta);
}

fn max_f64(cell: &AtomicU64, value: f64) {
    if value > load_f64(cell) {
        store_f64(cell, value);
    }
}

impl Stats {
    /// Creates a zeroed statistics block.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn inc(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn get(counter: &AtomicU64) -> u64 {
        counter.load(Ordering::Relaxed)
    }

    /// Registers the start of a main-oracle call.
    pub(crate) fn begin_call(&self) {
        Self::inc(&self.calls_total);
    }

    /// Charges a completed main-oracle call to its buckets.
    pub(crate) fn record_solve(&self, delta: f64, sat: bool) {
        if Self::get(&self.calls_total) == 1 {
            store_f64(&self.time_first, delta);
        }
        if sat {
            Self::inc(&self.calls_sat);
            add_f64(&self.time_sat, delta);
            max_f64(&self.time_satmax, delta);
        } else {
            Self::inc(&self.calls_unsat);
            add_f64(&self.time_unsat, delta);
            max_f64(&self.time_unsatmax, delta);
        }
        add_f64(&self.time_solving, delta);
    }

    pub(crate) fn charge_flip(&self, delta: f64) {
        add_f64(&self.time_flip, delta);
    }

    pub(crate) fn charge_check(&self, delta: f64) {
        add_f64(&self.time_check, delta);
    }

    fn set_running(&self, kind: TimerKind, started: f64) {
        store_f64(&self.timer_started, started);
        self.timer_kind.store(kind.tag(), Ordering::Relaxed);
    }

    fn clear_running(&self) {
        self.timer_kind.store(0, Ordering::Relaxed);
    }

    /// Takes a coherent snapshot. A still-running solve timer is charged to
    /// the `unknown` bucket, a running probe timer to its own bucket.
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        let mut snap = StatsSnapshot {
            backbones: Self::get(&self.backbones),
            dropped: Self::get(&self.dropped),
            filtered: Self::get(&self.filtered),
            flipped: Self::get(&self.flipped),
            fixed_hits: Self::get(&self.fixed_hits),
            checked: Self::get(&self.checked),
            calls_total: Self::get(&self.calls_total),
            calls_sat: Self::get(&self.calls_sat),
            calls_unsat: Self::get(&self.calls_unsat),
            calls_unknown: Self::get(&self.calls_unknown),
            checker_sat: Self::get(&self.checker_sat),
            checker_unsat: Self::get(&self.checker_unsat),
            time_first: load_f64(&self.time_first),
            time_sat: load_f64(&self.time_sat),
            time_unsat: load_f64(&self.time_unsat),
            time_satmax: load_f64(&self.time_satmax),
            time_unsatmax: load_f64(&self.time_unsatmax),
            time_unknown: load_f64(&self.time_unknown),
            time_solving: load_f64(&self.time_solving),
            time_flip: load_f64(&self.time_flip),
            time_check: load_f64(&self.time_check),
        };
        if let Some(kind) = TimerKind::from_tag(self.timer_kind.load(Ordering::Relaxed)) {
            let delta = process_time() - load_f64(&self.timer_started);
            match kind {
                TimerKind::Solve => {
                    snap.calls_unknown += 1;
                    snap.time_unknown += delta;
                    snap.time_solving += delta;
                }
                TimerKind::Flip => snap.time_flip += delta,
                TimerKind::Check => snap.time_check += delta,
            }
        }
        snap
    }
}

/// The timer stack: one running timer, outer timers paused.
#[derive(Debug, Default)]
pub struct Profiler {
    /// Entries are `(kind, segment start, accumulated before pauses)`.
    stack: Vec<(TimerKind, f64, f64)>,
}

impl Profiler {
    /// Creates an empty profiler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a timer, pausing the enclosing one.
    pub fn start(&mut self, stats: &Stats, kind: TimerKind) {
        let now = process_time();
        if let Some((_, started, accumulated)) = self.stack.last_mut() {
            *accumulated += now - *started;
        }
        self.stack.push((kind, now, 0.0));
        stats.set_running(kind, now);
    }

    /// Stops the innermost timer and returns its total elapsed seconds.
    /// Flip and check time is charged here; a solve's share is charged by
    /// the caller, which knows the verdict.
    pub fn stop(&mut self, stats: &Stats) -> f64 {
        let now = process_time();
        let (kind, started, accumulated) = self
            .stack
            .pop()
            .expect("stop called with a running timer");
        let delta = accumulated + (now - started);
        match kind {
            TimerKind::Flip => stats.charge_flip(delta),
            TimerKind::Check => stats.charge_check(delta),
            TimerKind::Solve => {}
        }
        if let Some((outer, started, _)) = self.stack.last_mut() {
            *started = now;
            stats.set_running(*outer, now);
        } else {
            stats.clear_running();
        }
        delta
    }
}

fn average(a: f64, b: f64) -> f64 {
    if b != 0.0 {
        a / b
    } else {
        0.0
    }
}

fn percent(a: f64, b: f64) -> f64 {
    average(100.0 * a, b)
}

/// A point-in-time copy of the statistics block.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StatsSnapshot {
    pub backbones: u64,
    pub dropped: u64,
    pub filtered: u64,
    pub flipped: u64,
    pub fixed_hits: u64,
    pub checked: u64,
    pub calls_total: u64,
    pub calls_sat: u64,
    pub calls_unsat: u64,
    pub calls_unknown: u64,
    pub checker_sat: u64,
    pub checker_unsat: u64,
    pub time_first: f64,
    pub time_sat: f64,
    pub time_unsat: f64,
    pub time_satmax: f64,
    pub time_unsatmax: f64,
    pub time_unknown: f64,
    pub time_solving: f64,
    pub time_flip: f64,
    pub time_check: f64,
}

impl StatsSnapshot {
    /// Prints the statistics table as `c` comment lines.
    ///
    /// With `verbose` set, zero time buckets are printed too.
    pub fn print<W: Write>(&self, out: &mut W, verbose: bool) -> std::io::Result<()> {
        writeln!(out, "c")?;
        writeln!(
            out,
            "c --- [ backbone statistics ] ------------------------------------------------"
        )?;
        writeln!(out, "c")?;
        writeln!(
            out,
            "c found {} backbones ({} dropped)",
            self.backbones, self.dropped
        )?;
        writeln!(
            out,
            "c filtered {}, flipped {}, fixed {}, checked {}",
            self.filtered, self.flipped, self.fixed_hits, self.checked
        )?;
        writeln!(
            out,
            "c called SAT oracle {} times ({} SAT, {} UNSAT, {} unknown)",
            self.calls_total, self.calls_sat, self.calls_unsat, self.calls_unknown
        )?;
        if self.checker_sat + self.checker_unsat > 0 {
            writeln!(
                out,
                "c checker solved {} times ({} SAT, {} UNSAT)",
                self.checker_sat + self.checker_unsat,
                self.checker_sat,
                self.checker_unsat
            )?;
        }
        writeln!(out, "c")?;
        let solving = self.time_solving;
        let mut bucket = |out: &mut W, time: f64, name: &str| -> std::io::Result<()> {
            if verbose || time != 0.0 {
                writeln!(
                    out,
                    "c   {:10.2} {:6.2} % {}",
                    time,
                    percent(time, solving),
                    name
                )?;
            }
            Ok(())
        };
        bucket(out, self.time_first, "first")?;
        bucket(out, self.time_sat, "sat")?;
        bucket(out, self.time_satmax, "satmax")?;
        bucket(out, self.time_unsat, "unsat")?;
        bucket(out, self.time_unsatmax, "unsatmax")?;
        bucket(out, self.time_unknown, "unknown")?;
        bucket(out, self.time_flip, "flip")?;
        bucket(out, self.time_check, "check")?;
        writeln!(out, "c ---------------------------------")?;
        writeln!(out, "c   {:10.2} 100.00 % solving", solving)?;
        writeln!(out, "c")?;
        out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_consistency() {
        let stats = Stats::new();
        let mut profiler = Profiler::new();
        for sat in [true, false, true] {
            stats.begin_call();
            profiler.start(&stats, TimerKind::Solve);
            let delta = profiler.stop(&stats);
            stats.record_solve(delta, sat);
        }
        let snap = stats.snapshot();
        assert_eq!(snap.calls_total, 3);
        assert_eq!(
            snap.calls_total,
            snap.calls_sat + snap.calls_unsat + snap.calls_unknown
        );
        let sum = snap.time_sat + snap.time_unsat + snap.time_unknown;
        assert!((snap.time_solving - sum).abs() < 1e-9);
    }

    #[test]
    fn test_running_solve_charged_to_unknown() {
        let stats = Stats::new();
        let mut profiler = Profiler::new();
        stats.begin_call();
        profiler.start(&stats, TimerKind::Solve);
        let snap = stats.snapshot();
        assert_eq!(snap.calls_unknown, 1);
        assert!(snap.time_unknown >= 0.0);
        profiler.stop(&stats);
        let snap = stats.snapshot();
        assert_eq!(snap.calls_unknown, 0);
    }

    #[test]
    fn test_nested_timer_pauses_outer() {
        let stats = Stats::new();
        let mut profiler = Profiler::new();
        profiler.start(&stats, TimerKind::Flip);
        profiler.start(&stats, TimerKind::Check);
        let inner = profiler.stop(&stats);
        let outer = profiler.stop(&stats);
        assert!(inner >= 0.0);
        assert!(outer >= 0.0);
        let snap = stats.snapshot();
        assert!((snap.time_check - inner).abs() < 1e-9);
        assert!((snap.time_flip - outer).abs() < 1e-9);
    }

    #[test]
    fn test_snapshot_prints() {
        let stats = Stats::new();
        let mut out = Vec::new();
        stats.snapshot().print(&mut out, true).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("backbone statistics"));
        assert!(text.contains("100.00 % solving"));
        assert!(text.lines().all(|l| l.starts_with('c')));
    }
}
