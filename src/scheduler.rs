use std::time::Duration;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

/// Fixed-period trigger. The first tick fires one full period after
/// construction, never immediately.
pub struct Scheduler {
    interval: Interval,
    period: Duration,
}

impl Scheduler {
    pub fn new(period: Duration) -> Self {
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval, period }
    }

    pub async fn tick(&mut self) -> Instant {
        self.interval.tick().await
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}
