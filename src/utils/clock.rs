use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::time::Instant;

/// Represents an entity responsible for providing dates across application. Timer and notes never
/// read the system time directly, so tests can move time forward by hand.
#[async_trait]
pub trait Clock: Sync + Send + 'static {
    fn time(&self) -> DateTime<Utc>;

    fn instant(&self) -> Instant;

    async fn sleep_until(&self, instant: Instant);
}

pub struct DefaultClock;

#[async_trait]
impl Clock for DefaultClock {
    fn time(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn instant(&self) -> Instant {
        Instant::now()
    }

    async fn sleep_until(&self, instant: Instant) {
        tokio::time::sleep_until(instant).await;
    }
}

/// Returns the next tick point after `previous` that is not in the past. Ticks that were missed
/// while the loop was busy are skipped instead of firing in a burst.
pub fn next_tick(previous: Instant, now: Instant, period: Duration) -> Instant {
    let mut next = previous + period;
    while next <= now {
        next += period;
    }
    next
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::Instant;

    use super::next_tick;

    #[test]
    fn next_tick_skips_missed_ticks() {
        let start = Instant::now();
        let period = Duration::from_millis(250);

        assert_eq!(next_tick(start, start, period), start + period);
        assert_eq!(
            next_tick(start, start + Duration::from_millis(600), period),
            start + Duration::from_millis(750)
        );
    }
}
