//! Rolling percentage price movement over a trailing time window

use chrono::{DateTime, Duration, Utc};
use std::collections::VecDeque;

/// Samples kept before the oldest is evicted
pub const DEFAULT_CAPACITY: usize = 500;

/// Largest range accepted from configuration (one year)
pub const MAX_RANGE_MINUTES: i64 = 365 * 24 * 60;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceSample {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}

/// Bounded price history answering "how much did price move over the last
/// `range_minutes`?"
///
/// Samples are kept in insertion order and the movement is measured between
/// the first and last sample inside the window, so callers must add samples
/// in non-decreasing timestamp order. Not synchronised; wrap it in a lock or
/// keep it inside one task when several producers feed it.
#[derive(Debug, Clone)]
pub struct TimeBasedMovement {
    samples: VecDeque<PriceSample>,
    range: Duration,
    capacity: usize,
}

impl TimeBasedMovement {
    pub fn new(range_minutes: i64) -> Self {
        Self::with_capacity(range_minutes, DEFAULT_CAPACITY)
    }

    /// A negative range is treated as zero; one too large for `Duration`
    /// saturates and covers every sample
    pub fn with_capacity(range_minutes: i64, capacity: usize) -> Self {
        let range = Duration::try_minutes(range_minutes.max(0)).unwrap_or(Duration::MAX);
        Self {
            samples: VecDeque::with_capacity(capacity),
            range,
            capacity,
        }
    }

    pub fn add(&mut self, timestamp: DateTime<Utc>, price: f64) {
        self.samples.push_back(PriceSample { timestamp, price });

        // Maintain buffer size
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Percentage change between the first and last sample strictly newer
    /// than `latest - range`; 0.0 when there is nothing to compare
    pub fn calc(&self) -> f64 {
        if self.samples.len() < 2 {
            return 0.0;
        }

        let Some(latest) = self.samples.back() else {
            return 0.0;
        };
        // No representable cutoff means the window reaches back past every sample
        let cutoff = latest.timestamp.checked_sub_signed(self.range);

        let mut in_window = self
            .samples
            .iter()
            .filter(|s| cutoff.map_or(true, |cutoff| s.timestamp > cutoff));
        let Some(first) = in_window.next() else {
            return 0.0;
        };
        let last = in_window.last().unwrap_or(first);

        if first.price == 0.0 {
            return 0.0;
        }

        (last.price - first.price) / first.price * 100.0
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn range_minutes(&self) -> i64 {
        self.range.num_minutes()
    }

    pub fn samples(&self) -> impl Iterator<Item = &PriceSample> {
        self.samples.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

/// Label a movement; `None` when flat
pub fn updown(delta: f64) -> Option<Direction> {
    if delta > 0.0 {
        Some(Direction::Up)
    } else if delta < 0.0 {
        Some(Direction::Down)
    } else {
        None
    }
}
