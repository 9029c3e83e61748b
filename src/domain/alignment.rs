//! Alignment of an event timestamp to the closes that bracket it.

use chrono::{DateTime, Duration, Utc};

use crate::domain::event::PriceObservation;

/// How far past the event a post-event close may be taken from.
pub const POST_WINDOW_DAYS: i64 = 2;

/// Closes bracketing an event. Either side may be missing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AlignedCloses {
    pub pre_close: Option<f64>,
    pub post_close: Option<f64>,
}

impl AlignedCloses {
    pub fn is_complete(&self) -> bool {
        self.pre_close.is_some() && self.post_close.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.pre_close.is_none() && self.post_close.is_none()
    }
}

/// Find the pre-event and post-event closes for `event_time`.
///
/// `pre_close` is the latest observation at or before the event (the last of
/// several sharing a timestamp). `post_close` is the earliest observation
/// strictly after the event and no later than [`POST_WINDOW_DAYS`] after it
/// (the first of several sharing a timestamp). `series` must be ascending.
pub fn align(series: &[PriceObservation], event_time: DateTime<Utc>) -> AlignedCloses {
    let horizon = event_time + Duration::days(POST_WINDOW_DAYS);

    // First index with timestamp > event_time.
    let split = series.partition_point(|obs| obs.timestamp <= event_time);

    let pre_close = split.checked_sub(1).map(|i| series[i].close);
    let post_close = series
        .get(split)
        .filter(|obs| obs.timestamp <= horizon)
        .map(|obs| obs.close);

    AlignedCloses {
        pre_close,
        post_close,
    }
}
