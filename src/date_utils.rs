use time::{macros::format_description, Date, OffsetDateTime, UtcOffset};

const SECONDS_PER_DAY: f64 = 86_400.0;

time::serde::format_description!(pub iso_date, Date, "[year]-[month]-[day]");

/// Current instant at the given offset from UTC (in whole hours).
///
/// Out-of-range offsets fall back to UTC.
pub fn local_now(offset_hours: i8) -> OffsetDateTime {
    let offset = UtcOffset::from_hms(offset_hours, 0, 0).unwrap_or(UtcOffset::UTC);
    OffsetDateTime::now_utc().to_offset(offset)
}

/// Whole days from `from` to `to`; negative when `to` is earlier.
pub fn days_between(from: Date, to: Date) -> i64 {
    (to - from).whole_days()
}

/// Days left until the start of `target`, rounded up.
///
/// `target` is interpreted as local midnight at the offset of `now`, so a
/// date two days ahead seen at noon today gives `ceil(1.5) = 2`.
pub fn days_until(target: Date, now: OffsetDateTime) -> i64 {
    let start = target.midnight().assume_offset(now.offset());
    let seconds = (start - now).as_seconds_f64();
    (seconds / SECONDS_PER_DAY).ceil() as i64
}

/// `dd/mm/yyyy`, the way dates are shown to users.
pub fn format_br(date: Date) -> String {
    date.format(format_description!("[day]/[month]/[year]"))
        .unwrap_or_else(|_| date.to_string())
}
