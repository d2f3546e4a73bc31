use time::{format_description::well_known::Rfc3339, OffsetDateTime, PrimitiveDateTime};

/// Current instant as a naive UTC timestamp, matching the `timestamp` columns.
pub(crate) fn primitive_now_utc() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_utc();
    PrimitiveDateTime::new(now.date(), now.time())
}

pub(crate) fn format_primitive(value: PrimitiveDateTime) -> String {
    value.assume_utc().format(&Rfc3339).unwrap_or_else(|_| value.assume_utc().to_string())
}

/// Whole seconds from `earlier` to `later`, clamped at zero when the clock runs backwards.
pub(crate) fn elapsed_seconds(earlier: PrimitiveDateTime, later: PrimitiveDateTime) -> i64 {
    (later - earlier).whole_seconds().max(0)
}
