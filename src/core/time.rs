use time::{format_description::well_known::Rfc3339, OffsetDateTime, PrimitiveDateTime};

/// Timestamps are stored as `TIMESTAMP` (no zone) and always mean UTC.
pub(crate) fn primitive_now_utc() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_utc();
    PrimitiveDateTime::new(now.date(), now.time())
}

pub(crate) fn format_primitive(value: PrimitiveDateTime) -> String {
    value.assume_utc().format(&Rfc3339).unwrap_or_else(|_| value.assume_utc().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{Date, Time};

    #[test]
    fn format_primitive_outputs_utc_z() {
        let date = Date::from_calendar_date(2024, time::Month::September, 2).unwrap();
        let time = Time::from_hms(8, 15, 0).unwrap();
        let value = PrimitiveDateTime::new(date, time);
        assert_eq!(format_primitive(value), "2024-09-02T08:15:00Z");
    }

    #[test]
    fn primitive_now_is_close_to_offset_now() {
        let before = OffsetDateTime::now_utc();
        let now = primitive_now_utc().assume_utc();
        assert!(now >= before - time::Duration::seconds(1));
    }
}
