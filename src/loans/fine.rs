//! Overdue fine computation. Pure, so a fine is reproducible from the two
//! dates and the configured rate alone.

use time::{Duration, OffsetDateTime};

/// Days the return is late, rounded up; zero for on-time or early returns.
pub fn days_overdue(due_date: OffsetDateTime, return_date: OffsetDateTime) -> i64 {
    let overdue = return_date - due_date;
    if overdue <= Duration::ZERO {
        return 0;
    }
    let whole = overdue.whole_days();
    if overdue > Duration::days(whole) {
        whole + 1
    } else {
        whole
    }
}

/// Fine in whole currency units: overdue days times the per-day rate.
pub fn compute_fine(due_date: OffsetDateTime, return_date: OffsetDateTime, per_day_rate: i64) -> i64 {
    days_overdue(due_date, return_date) * per_day_rate
}
