//! Current date and wall-clock time in the reference timezone.
//!
//! Readings are produced by converting `Utc::now()` through chrono-tz, so DST
//! transitions are handled by the timezone database rather than by manual
//! offset arithmetic. Seconds are dropped; the display is minute-granular.

use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, warn};

use crate::age::CalendarDate;

/// "Horário de Brasília".
pub const REFERENCE_TIMEZONE: Tz = chrono_tz::America::Sao_Paulo;

/// Once a minute matches the display granularity.
pub const DEFAULT_REFRESH: Duration = Duration::from_secs(60);

/// Local calendar fields of one instant in the reference timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct ClockReading {
    pub date: CalendarDate,
    pub hour: u32,
    pub minute: u32,
}

impl ClockReading {
    /// Fields of `instant` as seen in `tz`. `None` for years before 0.
    pub fn at<T: TimeZone>(instant: DateTime<Utc>, tz: &T) -> Option<Self> {
        let local = instant.with_timezone(tz);
        let date = CalendarDate::new(local.year(), local.month(), local.day()).ok()?;
        Some(Self {
            date,
            hour: local.hour(),
            minute: local.minute(),
        })
    }

    /// `HH:MM`, zero padded.
    pub fn clock_label(&self) -> String {
        format!("{:02}:{:02}", self.hour, self.minute)
    }
}

/// Source of "now". Implementations must return an independent reading on
/// every call.
pub trait Clock: Send + Sync {
    fn now(&self) -> ClockReading;
}

#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    tz: Tz,
}

impl SystemClock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    pub fn brasilia() -> Self {
        Self::new(REFERENCE_TIMEZONE)
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::brasilia()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> ClockReading {
        let now = Utc::now();
        ClockReading::at(now, &self.tz).unwrap_or_else(|| {
            // Only reachable with a system clock set before year 0.
            warn!(%now, "system clock outside calendar range, using epoch");
            ClockReading {
                date: CalendarDate::EPOCH,
                hour: 0,
                minute: 0,
            }
        })
    }
}

/// Always returns the same reading.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    reading: ClockReading,
}

impl FixedClock {
    pub fn new(reading: ClockReading) -> Self {
        Self { reading }
    }

    pub fn at(date: CalendarDate, hour: u32, minute: u32) -> Self {
        Self::new(ClockReading { date, hour, minute })
    }
}

impl Clock for FixedClock {
    fn now(&self) -> ClockReading {
        self.reading
    }
}

/// Repeating refresh task publishing a fresh [`ClockReading`] on a watch
/// channel.
///
/// The first reading is published immediately. Ticks never overlap: a late
/// tick is skipped rather than replayed. After [`ClockTicker::stop`] (or drop)
/// no further reading is published.
pub struct ClockTicker {
    handle: Option<JoinHandle<()>>,
    rx: watch::Receiver<ClockReading>,
}

impl ClockTicker {
    /// Must be called from within a tokio runtime.
    pub fn start(clock: Arc<dyn Clock>, period: Duration) -> Self {
        let (tx, rx) = watch::channel(clock.now());

        let handle = tokio::spawn(async move {
            let mut ticks = interval(period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately; the initial reading is
            // already in the channel.
            ticks.tick().await;

            loop {
                ticks.tick().await;
                let reading = clock.now();
                debug!(clock = %reading.clock_label(), date = %reading.date, "clock tick");
                if tx.send(reading).is_err() {
                    // Every receiver is gone.
                    break;
                }
            }
        });

        Self {
            handle: Some(handle),
            rx,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ClockReading> {
        self.rx.clone()
    }

    pub fn latest(&self) -> ClockReading {
        *self.rx.borrow()
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Cancel the refresh task. Idempotent.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!("clock ticker stopped");
        }
    }
}

impl Drop for ClockTicker {
    fn drop(&mut self) {
        self.stop();
    }
}
