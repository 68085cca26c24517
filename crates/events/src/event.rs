use chrono::{DateTime, Utc};

/// A domain-agnostic event.
///
/// Events are **immutable** facts, designed to be **append-only**.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// When the event occurred (business time).
    fn occurred_at(&self) -> DateTime<Utc>;
}

/// Events at or after `cutoff`, in their original order.
pub fn occurred_since<'a, E: Event>(
    events: impl IntoIterator<Item = &'a E>,
    cutoff: DateTime<Utc>,
) -> impl Iterator<Item = &'a E> {
    events.into_iter().filter(move |e| e.occurred_at() >= cutoff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[derive(Debug, Clone)]
    struct Tick(DateTime<Utc>);

    impl Event for Tick {
        fn occurred_at(&self) -> DateTime<Utc> {
            self.0
        }
    }

    #[test]
    fn cutoff_is_inclusive_and_order_is_kept() {
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let ticks = vec![
            Tick(base + Duration::hours(2)),
            Tick(base - Duration::seconds(1)),
            Tick(base),
        ];

        let kept: Vec<_> = occurred_since(&ticks, base).map(|t| t.0).collect();
        assert_eq!(kept, vec![base + Duration::hours(2), base]);
    }
}
