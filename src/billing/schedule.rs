use std::time::Duration;

use time::{Date, OffsetDateTime};
use tokio::time::MissedTickBehavior;
use tracing::info;

use super::BillingEngine;

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// True when `date` is the final calendar day of its month, whatever the
/// month's length. Not a day-number comparison; billing fires in February
/// and the 30-day months too.
pub fn is_last_day_of_month(date: Date) -> bool {
    match date.next_day() {
        Some(next) => next.month() != date.month(),
        None => true,
    }
}

/// Once-daily tick that runs the shared billing cycle on the last day of the
/// month. A tick that lands twice on the same day is harmless; the cycle is
/// idempotent.
pub async fn run_daily(engine: BillingEngine) {
    let mut tick = tokio::time::interval(DAY);
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        tick.tick().await;
        let today = OffsetDateTime::now_utc().date();
        if !is_last_day_of_month(today) {
            continue;
        }
        info!(%today, "last day of month, running billing cycle");
        let outcome = engine.run_cycle().await;
        info!(
            success = outcome.success,
            processed = outcome.processed_count,
            errors = outcome.error_count,
            total = outcome.total_houses,
            "scheduled billing cycle finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn fires_on_the_last_day_of_every_month_length() {
        assert!(is_last_day_of_month(date!(2025 - 02 - 28)));
        assert!(is_last_day_of_month(date!(2024 - 02 - 29)));
        assert!(is_last_day_of_month(date!(2025 - 04 - 30)));
        assert!(is_last_day_of_month(date!(2025 - 12 - 31)));
        assert!(is_last_day_of_month(date!(2025 - 01 - 31)));
    }

    #[test]
    fn stays_quiet_on_every_other_day() {
        assert!(!is_last_day_of_month(date!(2024 - 02 - 28)));
        assert!(!is_last_day_of_month(date!(2025 - 04 - 29)));
        assert!(!is_last_day_of_month(date!(2025 - 12 - 01)));
        assert!(!is_last_day_of_month(date!(2025 - 07 - 15)));
        // Day 30 of a 31-day month is not the last day.
        assert!(!is_last_day_of_month(date!(2025 - 01 - 30)));
    }
}
