//! Per-point timing for the debug colocator.
//!
//! Components
//! -----------------
//! * [`IterTimer`] – measures laps between [`IterTimer::start`] and [`IterTimer::tick`],
//!   keeping both a smoothed **exponential moving average** (EMA) and the plain mean.
//! * [`fmt_dur`] – formats a [`Duration`] as `"253µs"`, `"42ms"` or `"3.14s"` depending on
//!   the scale.
//!
//! The EMA update rule is `ema ← α·dt + (1–α)·ema` with `α ∈ (0,1]`; the first lap
//! initializes the average.
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct IterTimer {
    last: Instant,
    ema_ns: f64,
    total: Duration,
    alpha: f64,
    count: u64,
}

impl IterTimer {
    pub fn new(alpha: f64) -> Self {
        Self {
            last: Instant::now(),
            ema_ns: 0.0,
            total: Duration::ZERO,
            alpha,
            count: 0,
        }
    }

    /// Begin a lap without recording anything.
    #[inline]
    pub fn start(&mut self) {
        self.last = Instant::now();
    }

    /// End the current lap and start the next one.
    #[inline]
    pub fn tick(&mut self) -> Duration {
        let now = Instant::now();
        let dt = now.duration_since(self.last);
        self.last = now;
        self.count += 1;
        self.total += dt;

        let dt_ns = dt.as_nanos() as f64;
        self.ema_ns = if self.count == 1 {
            dt_ns
        } else {
            self.alpha * dt_ns + (1.0 - self.alpha) * self.ema_ns
        };

        dt
    }

    #[inline]
    pub fn avg(&self) -> Duration {
        if self.count == 0 {
            Duration::ZERO
        } else {
            Duration::from_nanos(self.ema_ns as u64)
        }
    }

    /// Arithmetic mean of all laps.
    #[inline]
    pub fn mean(&self) -> Duration {
        if self.count == 0 {
            Duration::ZERO
        } else {
            self.total.div_f64(self.count as f64)
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }
}

#[inline]
pub fn fmt_dur(d: Duration) -> String {
    let us = d.as_micros();
    if us < 1_000 {
        format!("{us}µs")
    } else {
        let ms = d.as_millis();
        if ms < 1_000 {
            format!("{ms}ms")
        } else {
            let s = d.as_secs_f32();
            format!("{s:.2}s")
        }
    }
}
