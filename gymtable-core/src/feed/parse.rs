//! ICS feed parsing using the icalendar crate's parser.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use icalendar::{
    DatePerhapsTime,
    parser::{Component, read_calendar, unfold},
};

use crate::error::{GymTableError, GymTableResult};

/// One event lifted out of a feed, before gym resolution and name
/// normalization.
#[derive(Debug, Clone)]
pub struct FeedEvent {
    pub summary: String,
    pub location: String,
    pub start: FeedTime,
    pub end: FeedTime,
}

/// Feed timestamps arrive either as UTC instants or as timezone-naive local
/// times; naive times are resolved against the owning gym's timezone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeedTime {
    Utc(DateTime<Utc>),
    Floating(NaiveDateTime),
}

impl FeedTime {
    /// Resolve to UTC, interpreting floating times in `tz`.
    pub fn to_utc(self, tz: Tz) -> DateTime<Utc> {
        match self {
            FeedTime::Utc(dt) => dt,
            FeedTime::Floating(naive) => tz
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc))
                // Nonexistent local times (DST spring-forward gap) fall back
                // to reading the naive time as UTC.
                .unwrap_or_else(|| naive.and_utc()),
        }
    }
}

/// Parse a whole feed document into its events.
///
/// Events missing a title, start or end are skipped; a document that does
/// not parse at all is an error.
pub fn parse_feed(content: &str) -> GymTableResult<Vec<FeedEvent>> {
    let unfolded = unfold(content);
    let calendar =
        read_calendar(&unfolded).map_err(|e| GymTableError::IcsParse(e.to_string()))?;

    Ok(calendar
        .components
        .iter()
        .filter(|component| component.name == "VEVENT")
        .filter_map(parse_event)
        .collect())
}

fn parse_event(vevent: &Component<'_>) -> Option<FeedEvent> {
    let summary = vevent.find_prop("SUMMARY")?.val.to_string();
    let location = vevent
        .find_prop("LOCATION")
        .map(|p| p.val.to_string())
        .unwrap_or_default();
    let start = to_feed_time(DatePerhapsTime::try_from(vevent.find_prop("DTSTART")?).ok()?)?;
    let end = to_feed_time(DatePerhapsTime::try_from(vevent.find_prop("DTEND")?).ok()?)?;

    Some(FeedEvent {
        summary,
        location,
        start,
        end,
    })
}

/// Convert icalendar's DatePerhapsTime to a FeedTime. Times carrying their
/// own TZID resolve through it; all-day dates are not class sessions.
fn to_feed_time(dpt: DatePerhapsTime) -> Option<FeedTime> {
    match dpt {
        DatePerhapsTime::Date(_) => None,
        DatePerhapsTime::DateTime(cal_dt) => match cal_dt {
            icalendar::CalendarDateTime::Utc(dt) => Some(FeedTime::Utc(dt)),
            icalendar::CalendarDateTime::Floating(naive) => Some(FeedTime::Floating(naive)),
            icalendar::CalendarDateTime::WithTimezone { date_time, tzid } => {
                match tzid.parse::<Tz>() {
                    Ok(tz) => Some(FeedTime::Utc(
                        tz.from_local_datetime(&date_time)
                            .earliest()?
                            .with_timezone(&Utc),
                    )),
                    // Unknown TZID: treat as floating and let the gym's
                    // timezone decide.
                    Err(_) => Some(FeedTime::Floating(date_time)),
                }
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    #[test]
    fn parses_every_event_in_a_feed() {
        let ics = r#"BEGIN:VCALENDAR
VERSION:2.0
PRODID:TEST
BEGIN:VEVENT
UID:class-1
SUMMARY:BODYPUMP 45 with Jane
LOCATION:Studio 1
DTSTART:20240610T061500
DTEND:20240610T070000
END:VEVENT
BEGIN:VEVENT
UID:class-2
SUMMARY:RPM 30
LOCATION:Cycle Studio
DTSTART:20240610T170000Z
DTEND:20240610T173000Z
END:VEVENT
END:VCALENDAR"#;

        let events = parse_feed(ics).unwrap();
        assert_eq!(events.len(), 2);

        assert_eq!(events[0].summary, "BODYPUMP 45 with Jane");
        assert_eq!(events[0].location, "Studio 1");
        let expected = NaiveDate::from_ymd_opt(2024, 6, 10)
            .unwrap()
            .and_hms_opt(6, 15, 0)
            .unwrap();
        assert_eq!(events[0].start, FeedTime::Floating(expected));

        assert_eq!(
            events[1].start,
            FeedTime::Utc(Utc.with_ymd_and_hms(2024, 6, 10, 17, 0, 0).unwrap())
        );
    }

    #[test]
    fn skips_events_without_usable_times() {
        let ics = r#"BEGIN:VCALENDAR
VERSION:2.0
PRODID:TEST
BEGIN:VEVENT
UID:all-day
SUMMARY:Gym closed
DTSTART;VALUE=DATE:20240610
DTEND;VALUE=DATE:20240611
END:VEVENT
BEGIN:VEVENT
UID:no-summary
LOCATION:Studio 1
DTSTART:20240610T061500
DTEND:20240610T070000
END:VEVENT
BEGIN:VEVENT
UID:ok
SUMMARY:YOGA
DTSTART:20240610T080000
DTEND:20240610T090000
END:VEVENT
END:VCALENDAR"#;

        let events = parse_feed(ics).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].summary, "YOGA");
    }

    #[test]
    fn garbage_is_a_parse_error() {
        assert!(matches!(
            parse_feed("this is not a calendar"),
            Err(GymTableError::IcsParse(_))
        ));
    }

    #[test]
    fn floating_times_resolve_through_the_gym_timezone() {
        // June is NZST (UTC+12): 06:15 local is 18:15 the previous day UTC
        let naive = NaiveDate::from_ymd_opt(2024, 6, 10)
            .unwrap()
            .and_hms_opt(6, 15, 0)
            .unwrap();
        let resolved = FeedTime::Floating(naive).to_utc(chrono_tz::Pacific::Auckland);
        assert_eq!(
            resolved,
            Utc.with_ymd_and_hms(2024, 6, 9, 18, 15, 0).unwrap()
        );

        // UTC instants are independent of the gym timezone
        let instant = Utc.with_ymd_and_hms(2024, 6, 10, 17, 0, 0).unwrap();
        assert_eq!(
            FeedTime::Utc(instant).to_utc(chrono_tz::Pacific::Auckland),
            instant
        );
    }
}
