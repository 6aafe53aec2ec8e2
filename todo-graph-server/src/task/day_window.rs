use chrono::{DateTime, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Timelike, Utc};

/// Local hour at which a new "day" of completed tasks begins.
pub const DAY_START_HOUR: u32 = 7;

/// Bound on any UTC offset, in hours, used to bracket a skipped wall-clock time.
const MAX_OFFSET_HOURS: i64 = 15;

/// The 07:00-to-07:00 local interval that "today's" completed tasks fall into.
///
/// Bounds are half-open: `start` is inside the window, `end` is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl DayWindow {
    /// Returns the window that `now` belongs to, anchored in the time zone of `now`.
    ///
    /// Before 07:00 local time the window started at 07:00 the previous day,
    /// otherwise it starts at 07:00 today.
    pub fn containing<Tz: TimeZone>(now: &DateTime<Tz>) -> Self {
        let local = now.naive_local();
        let today_start =
            local.date().and_time(NaiveTime::MIN) + TimeDelta::hours(DAY_START_HOUR.into());
        let start = if local.hour() < DAY_START_HOUR {
            today_start - TimeDelta::days(1)
        } else {
            today_start
        };
        let end = start + TimeDelta::days(1);

        let tz = now.timezone();
        Self {
            start: resolve_local(&tz, start),
            end: resolve_local(&tz, end),
        }
    }

    /// Returns the start of the window.
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Returns the end of the window.
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Returns `true` if `instant` falls inside the window.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

/// Maps a local wall-clock time in `tz` onto UTC.
///
/// A wall-clock time skipped by a forward DST transition resolves to the
/// transition instant, the first instant whose local time is at or after it.
fn resolve_local<Tz: TimeZone>(tz: &Tz, local: NaiveDateTime) -> DateTime<Utc> {
    if let Some(resolved) = tz.from_local_datetime(&local).earliest() {
        return resolved.with_timezone(&Utc);
    }

    // Invariant: `before` is earlier than `local` on the wall clock, `after` is not.
    let mut before = local.and_utc() - TimeDelta::hours(MAX_OFFSET_HOURS);
    let mut after = local.and_utc() + TimeDelta::hours(MAX_OFFSET_HOURS);
    while after - before > TimeDelta::seconds(1) {
        let middle = before + (after - before) / 2;
        if tz.from_utc_datetime(&middle.naive_utc()).naive_local() >= local {
            after = middle;
        } else {
            before = middle;
        }
    }
    after
}
