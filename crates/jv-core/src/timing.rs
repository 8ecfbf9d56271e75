//! EOS call counters.
//!
//! Table lookups dominate the cost of a relaxation, so the EOS service counts
//! calls, points and wall time in process-wide counters the CLI can print.
//! Counting is off unless switched on with [`enable_timing`] or `JV_TIMING`.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;

static ENABLED: AtomicBool = AtomicBool::new(false);

pub fn enable_timing() {
    ENABLED.store(true, Ordering::Relaxed);
}

pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed) || std::env::var_os("JV_TIMING").is_some()
}

/// An open measurement. `None` inside when counting was off at start.
pub struct Timer(Option<Instant>);

impl Timer {
    pub fn start() -> Self {
        Self(is_enabled().then(Instant::now))
    }

    /// Close the span and charge it to `counter` as one call over `points`.
    pub fn record_into(self, counter: &CallCounter, points: u64) {
        if let Some(started) = self.0 {
            counter.add(started.elapsed().as_nanos() as u64, points);
        }
    }
}

/// Lock-free totals for one kind of EOS call.
#[derive(Debug, Default)]
pub struct CallCounter {
    calls: AtomicU64,
    points: AtomicU64,
    nanos: AtomicU64,
}

impl CallCounter {
    pub const fn new() -> Self {
        Self {
            calls: AtomicU64::new(0),
            points: AtomicU64::new(0),
            nanos: AtomicU64::new(0),
        }
    }

    pub fn add(&self, nanos: u64, points: u64) {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.points.fetch_add(points, Ordering::Relaxed);
        self.nanos.fetch_add(nanos, Ordering::Relaxed);
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    pub fn points(&self) -> u64 {
        self.points.load(Ordering::Relaxed)
    }

    pub fn seconds(&self) -> f64 {
        self.nanos.load(Ordering::Relaxed) as f64 * 1e-9
    }

    pub fn clear(&self) {
        for a in [&self.calls, &self.points, &self.nanos] {
            a.store(0, Ordering::Relaxed);
        }
    }
}

pub mod eos_timing {
    use super::CallCounter;

    /// Hydrogen-helium lookups
    pub static HHE_CALLS: CallCounter = CallCounter::new();
    /// Heavy-element lookups, two per point for the ice/rock blend
    pub static Z_CALLS: CallCounter = CallCounter::new();

    pub fn reset_all() {
        HHE_CALLS.clear();
        Z_CALLS.clear();
    }

    /// One line per counter that saw a call.
    pub fn summary() -> Option<String> {
        let lines: Vec<String> = [("H-He", &HHE_CALLS), ("heavy", &Z_CALLS)]
            .into_iter()
            .filter(|(_, c)| c.calls() > 0)
            .map(|(label, c)| {
                format!(
                    "{label:>6} eos: {} calls, {} points, {:.3}s",
                    c.calls(),
                    c.points(),
                    c.seconds()
                )
            })
            .collect();
        (!lines.is_empty()).then(|| lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_accumulates_and_clears() {
        let c = CallCounter::new();
        c.add(500_000_000, 10);
        c.add(250_000_000, 6);
        assert_eq!(c.calls(), 2);
        assert_eq!(c.points(), 16);
        assert!((c.seconds() - 0.75).abs() < 1e-9);
        c.clear();
        assert_eq!(c.calls(), 0);
        assert_eq!(c.seconds(), 0.0);
    }

    #[test]
    fn disabled_timer_records_nothing() {
        let c = CallCounter::new();
        Timer(None).record_into(&c, 42);
        assert_eq!(c.calls(), 0);
    }
}
