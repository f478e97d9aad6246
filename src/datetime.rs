//! Time and date values and their register bursts.
//!
//! The RX-8025 keeps the time in three consecutive registers (seconds,
//! minutes, hours) followed by four calendar registers (weekday, day, month,
//! year). [`Time`] and [`Date`] are the validated host-side values; the
//! `RX8025*` structs are the raw BCD bursts read from or written to the chip.
//!
//! # Error Handling
//!
//! Out-of-range host values are reported via [`RX8025DateTimeError`] before
//! anything is written to the device. Values read back from the device are
//! trusted and decoded without validation, except when converting to chrono
//! types, which cannot represent impossible dates.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::codec::weekday_of;
use crate::{Day, Hours, Minutes, Month, Seconds, Weekday, Year};

/// Errors that can occur during RX-8025 date/time conversion or validation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RX8025DateTimeError {
    /// Hours, minutes or seconds out of range
    InvalidTime,
    /// Year, month, day or weekday out of range
    InvalidDate,
    /// The registers do not hold a representable date and time
    InvalidDateTime,
    /// The year is not before 2100 (the RX-8025 only keeps two year digits)
    YearNotBefore2100,
    /// The year is not after 1999
    YearNotAfter1999,
}

/// Time of day in 24-hour format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Time {
    /// Hours (0-23)
    pub hours: u8,
    /// Minutes (0-59)
    pub minutes: u8,
    /// Seconds (0-59)
    pub seconds: u8,
}

impl Time {
    /// Creates a validated time.
    ///
    /// # Errors
    ///
    /// Returns [`RX8025DateTimeError::InvalidTime`] if any field is out of range.
    pub fn new(hours: u8, minutes: u8, seconds: u8) -> Result<Self, RX8025DateTimeError> {
        if hours > 23 || minutes > 59 || seconds > 59 {
            error!("invalid time {}:{}:{}", hours, minutes, seconds);
            return Err(RX8025DateTimeError::InvalidTime);
        }
        Ok(Self {
            hours,
            minutes,
            seconds,
        })
    }
}

/// Calendar date with a two digit year (2000-2099).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Date {
    /// Year within the century (0-99)
    pub year: u8,
    /// Month (1-12)
    pub month: u8,
    /// Day of month (1-31)
    pub day: u8,
    /// Day of week (0 = Sunday .. 6 = Saturday)
    pub weekday: u8,
}

impl Date {
    /// Creates a date, computing the weekday from the calendar.
    ///
    /// # Errors
    ///
    /// Returns [`RX8025DateTimeError::InvalidDate`] if any field is out of range.
    pub fn new(year: u8, month: u8, day: u8) -> Result<Self, RX8025DateTimeError> {
        Self::check(year, month, day)?;
        Ok(Self {
            year,
            month,
            day,
            weekday: weekday_of(year, month, day),
        })
    }

    /// Creates a date with an explicit weekday, stored as given.
    ///
    /// # Errors
    ///
    /// Returns [`RX8025DateTimeError::InvalidDate`] if any field is out of range.
    pub fn with_weekday(
        year: u8,
        month: u8,
        day: u8,
        weekday: u8,
    ) -> Result<Self, RX8025DateTimeError> {
        Self::check(year, month, day)?;
        if weekday > 6 {
            error!("invalid weekday {}", weekday);
            return Err(RX8025DateTimeError::InvalidDate);
        }
        Ok(Self {
            year,
            month,
            day,
            weekday,
        })
    }

    fn check(year: u8, month: u8, day: u8) -> Result<(), RX8025DateTimeError> {
        if year > 99 || !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            error!("invalid date {}-{}-{}", year, month, day);
            return Err(RX8025DateTimeError::InvalidDate);
        }
        Ok(())
    }
}

impl TryFrom<NaiveTime> for Time {
    type Error = RX8025DateTimeError;

    // chrono keeps hour < 24, minute < 60, second < 60 (leap seconds live in the nanos)
    fn try_from(time: NaiveTime) -> Result<Self, Self::Error> {
        Time::new(time.hour() as u8, time.minute() as u8, time.second() as u8)
    }
}

impl TryFrom<Time> for NaiveTime {
    type Error = RX8025DateTimeError;

    fn try_from(time: Time) -> Result<Self, Self::Error> {
        NaiveTime::from_hms_opt(
            u32::from(time.hours),
            u32::from(time.minutes),
            u32::from(time.seconds),
        )
        .ok_or(RX8025DateTimeError::InvalidTime)
    }
}

impl TryFrom<NaiveDate> for Date {
    type Error = RX8025DateTimeError;

    /// The weekday is computed from the calendar. The year must be 2000-2099.
    fn try_from(date: NaiveDate) -> Result<Self, Self::Error> {
        let year = date.year();
        if year > 2099 {
            error!("Year {} is too late! must be before 2100", year);
            return Err(RX8025DateTimeError::YearNotBefore2100);
        }
        if year < 2000 {
            error!("Year {} is too early! must be greater than 1999", year);
            return Err(RX8025DateTimeError::YearNotAfter1999);
        }
        let year = u8::try_from(year - 2000).map_err(|_| RX8025DateTimeError::InvalidDate)?;
        Date::new(year, date.month() as u8, date.day() as u8)
    }
}

impl TryFrom<Date> for NaiveDate {
    type Error = RX8025DateTimeError;

    /// The stored weekday is not checked against the calendar.
    fn try_from(date: Date) -> Result<Self, Self::Error> {
        if date.year > 99 {
            return Err(RX8025DateTimeError::InvalidDate);
        }
        NaiveDate::from_ymd_opt(
            2000 + i32::from(date.year),
            u32::from(date.month),
            u32::from(date.day),
        )
        .ok_or(RX8025DateTimeError::InvalidDate)
    }
}

/// Raw seconds, minutes and hours registers.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub(crate) struct RX8025Time {
    seconds: Seconds,
    minutes: Minutes,
    hours: Hours,
}

impl RX8025Time {
    pub(crate) fn from_time(time: &Time) -> Self {
        let mut seconds = Seconds::default();
        seconds.set_value(time.seconds);
        let mut minutes = Minutes::default();
        minutes.set_value(time.minutes);
        let mut hours = Hours::default();
        hours.set_value(time.hours);
        Self {
            seconds,
            minutes,
            hours,
        }
    }

    pub(crate) fn into_time(self) -> Time {
        Time {
            hours: self.hours.value(),
            minutes: self.minutes.value(),
            seconds: self.seconds.value(),
        }
    }
}

impl From<[u8; 3]> for RX8025Time {
    fn from(data: [u8; 3]) -> Self {
        RX8025Time {
            seconds: Seconds::from(data[0]),
            minutes: Minutes::from(data[1]),
            hours: Hours::from(data[2]),
        }
    }
}

impl From<&RX8025Time> for [u8; 3] {
    fn from(t: &RX8025Time) -> [u8; 3] {
        [t.seconds.into(), t.minutes.into(), t.hours.into()]
    }
}

/// Raw weekday, day, month and year registers.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub(crate) struct RX8025Date {
    weekday: Weekday,
    day: Day,
    month: Month,
    year: Year,
}

impl RX8025Date {
    pub(crate) fn from_date(date: &Date) -> Self {
        let mut weekday = Weekday::default();
        weekday.set_weekday(date.weekday);
        let mut day = Day::default();
        day.set_value(date.day);
        let mut month = Month::default();
        month.set_value(date.month);
        let mut year = Year::default();
        year.set_value(date.year);
        Self {
            weekday,
            day,
            month,
            year,
        }
    }

    pub(crate) fn into_date(self) -> Date {
        Date {
            year: self.year.value(),
            month: self.month.value(),
            day: self.day.value(),
            weekday: self.weekday.weekday(),
        }
    }
}

impl From<[u8; 4]> for RX8025Date {
    fn from(data: [u8; 4]) -> Self {
        RX8025Date {
            weekday: Weekday::from(data[0]),
            day: Day::from(data[1]),
            month: Month::from(data[2]),
            year: Year::from(data[3]),
        }
    }
}

impl From<&RX8025Date> for [u8; 4] {
    fn from(d: &RX8025Date) -> [u8; 4] {
        [d.weekday.into(), d.day.into(), d.month.into(), d.year.into()]
    }
}

/// The full seven register time and calendar burst.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub(crate) struct RX8025DateTime {
    time: RX8025Time,
    date: RX8025Date,
}

impl RX8025DateTime {
    pub(crate) fn from_datetime(datetime: &NaiveDateTime) -> Result<Self, RX8025DateTimeError> {
        let time = Time::try_from(datetime.time())?;
        let date = Date::try_from(datetime.date())?;

        let raw = RX8025DateTime {
            time: RX8025Time::from_time(&time),
            date: RX8025Date::from_date(&date),
        };
        debug!("raw={:?}", raw);
        Ok(raw)
    }

    pub(crate) fn into_datetime(self) -> Result<NaiveDateTime, RX8025DateTimeError> {
        let time = self.time.into_time();
        let date = self.date.into_date();
        debug!("time={:?} date={:?}", time, date);
        let date = NaiveDate::try_from(date)
            .map_err(|_| RX8025DateTimeError::InvalidDateTime)?;
        let time = NaiveTime::try_from(time)
            .map_err(|_| RX8025DateTimeError::InvalidDateTime)?;
        Ok(NaiveDateTime::new(date, time))
    }
}

impl From<[u8; 7]> for RX8025DateTime {
    fn from(data: [u8; 7]) -> Self {
        RX8025DateTime {
            time: RX8025Time::from([data[0], data[1], data[2]]),
            date: RX8025Date::from([data[3], data[4], data[5], data[6]]),
        }
    }
}

impl From<&RX8025DateTime> for [u8; 7] {
    fn from(dt: &RX8025DateTime) -> [u8; 7] {
        let [s, m, h]: [u8; 3] = (&dt.time).into();
        let [w, d, mo, y]: [u8; 4] = (&dt.date).into();
        [s, m, h, w, d, mo, y]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_validation() {
        assert!(Time::new(0, 0, 0).is_ok());
        assert!(Time::new(23, 59, 59).is_ok());
        assert_eq!(Time::new(24, 0, 0), Err(RX8025DateTimeError::InvalidTime));
        assert_eq!(Time::new(0, 60, 0), Err(RX8025DateTimeError::InvalidTime));
        assert_eq!(Time::new(0, 0, 60), Err(RX8025DateTimeError::InvalidTime));
    }

    #[test]
    fn test_date_computes_weekday() {
        assert_eq!(Date::new(0, 1, 1).unwrap().weekday, 6);
        assert_eq!(Date::new(24, 1, 1).unwrap().weekday, 1);
        assert_eq!(Date::new(24, 3, 14).unwrap().weekday, 4);
    }

    #[test]
    fn test_date_validation() {
        assert_eq!(Date::new(100, 1, 1), Err(RX8025DateTimeError::InvalidDate));
        assert_eq!(Date::new(24, 0, 1), Err(RX8025DateTimeError::InvalidDate));
        assert_eq!(Date::new(24, 13, 1), Err(RX8025DateTimeError::InvalidDate));
        assert_eq!(Date::new(24, 1, 0), Err(RX8025DateTimeError::InvalidDate));
        assert_eq!(Date::new(24, 1, 32), Err(RX8025DateTimeError::InvalidDate));
        assert_eq!(
            Date::with_weekday(24, 1, 1, 7),
            Err(RX8025DateTimeError::InvalidDate)
        );
    }

    #[test]
    fn test_date_with_weekday_is_stored_as_given() {
        let date = Date::with_weekday(24, 1, 1, 3).unwrap();
        assert_eq!(date.weekday, 3);
        let raw = RX8025Date::from_date(&date);
        assert_eq!(<[u8; 4]>::from(&raw), [0x03, 0x01, 0x01, 0x24]);
    }

    #[test]
    fn test_time_registers() {
        let time = Time::new(15, 30, 7).unwrap();
        let raw = RX8025Time::from_time(&time);
        assert_eq!(<[u8; 3]>::from(&raw), [0x07, 0x30, 0x15]);
        assert_eq!(raw.into_time(), time);
    }

    #[test]
    fn test_time_round_trip_full_range() {
        for hours in 0..24 {
            for minutes in 0..60 {
                for seconds in 0..60 {
                    let time = Time::new(hours, minutes, seconds).unwrap();
                    let bytes: [u8; 3] = (&RX8025Time::from_time(&time)).into();
                    assert_eq!(RX8025Time::from(bytes).into_time(), time);
                }
            }
        }
    }

    #[test]
    fn test_time_decode_masks_flag_bits() {
        // 12h/PM bits of the hour byte and bit 7 of seconds/minutes are ignored
        let raw = RX8025Time::from([0x80 | 0x12, 0x80 | 0x34, 0xC0 | 0x21]);
        assert_eq!(raw.into_time(), Time::new(21, 34, 12).unwrap());
    }

    #[test]
    fn test_date_decode_masks() {
        let raw = RX8025Date::from([0xF8 | 0x02, 0xC0 | 0x29, 0xE0 | 0x02, 0x24]);
        assert_eq!(
            raw.into_date(),
            Date {
                year: 24,
                month: 2,
                day: 29,
                weekday: 2,
            }
        );
    }

    #[test]
    fn test_from_datetime_and_into_datetime_roundtrip() {
        let dt = NaiveDate::from_ymd_opt(2024, 3, 14)
            .unwrap()
            .and_hms_opt(15, 30, 0)
            .unwrap();
        let raw = RX8025DateTime::from_datetime(&dt).unwrap();
        let arr: [u8; 7] = (&raw).into();
        assert_eq!(arr, [0x00, 0x30, 0x15, 0x04, 0x14, 0x03, 0x24]);
        let dt2 = RX8025DateTime::from(arr).into_datetime().unwrap();
        assert_eq!(dt, dt2);
    }

    #[test]
    fn test_from_datetime_year_range() {
        let dt = NaiveDate::from_ymd_opt(1999, 12, 31)
            .unwrap()
            .and_hms_opt(23, 59, 59)
            .unwrap();
        assert_eq!(
            RX8025DateTime::from_datetime(&dt),
            Err(RX8025DateTimeError::YearNotAfter1999)
        );

        let dt = NaiveDate::from_ymd_opt(2100, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(
            RX8025DateTime::from_datetime(&dt),
            Err(RX8025DateTimeError::YearNotBefore2100)
        );
    }

    #[test]
    fn test_valid_edge_cases() {
        for dt in [
            NaiveDate::from_ymd_opt(2000, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            NaiveDate::from_ymd_opt(2099, 12, 31)
                .unwrap()
                .and_hms_opt(23, 59, 59)
                .unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
        ] {
            let raw = RX8025DateTime::from_datetime(&dt).unwrap();
            assert_eq!(raw.into_datetime().unwrap(), dt);
        }
    }

    #[test]
    fn test_time_chrono_conversions() {
        let naive = NaiveTime::from_hms_opt(7, 8, 9).unwrap();
        let time = Time::try_from(naive).unwrap();
        assert_eq!(time, Time::new(7, 8, 9).unwrap());
        assert_eq!(NaiveTime::try_from(time).unwrap(), naive);

        let invalid = Time {
            hours: 24,
            minutes: 0,
            seconds: 0,
        };
        assert_eq!(
            NaiveTime::try_from(invalid),
            Err(RX8025DateTimeError::InvalidTime)
        );
    }

    #[test]
    fn test_date_chrono_conversions() {
        let naive = NaiveDate::from_ymd_opt(2024, 3, 14).unwrap();
        let date = Date::try_from(naive).unwrap();
        assert_eq!((date.year, date.month, date.day), (24, 3, 14));
        assert_eq!(date.weekday, weekday_of(24, 3, 14));
        assert_eq!(date.weekday, 4);
        assert_eq!(NaiveDate::try_from(date).unwrap(), naive);

        assert_eq!(
            Date::try_from(NaiveDate::from_ymd_opt(2100, 1, 1).unwrap()),
            Err(RX8025DateTimeError::YearNotBefore2100)
        );
        assert_eq!(
            Date::try_from(NaiveDate::from_ymd_opt(1999, 12, 31).unwrap()),
            Err(RX8025DateTimeError::YearNotAfter1999)
        );

        let february_30 = Date::with_weekday(24, 2, 30, 5).unwrap();
        assert_eq!(
            NaiveDate::try_from(february_30),
            Err(RX8025DateTimeError::InvalidDate)
        );
        let three_digit_year = Date {
            year: 100,
            month: 1,
            day: 1,
            weekday: 5,
        };
        assert_eq!(
            NaiveDate::try_from(three_digit_year),
            Err(RX8025DateTimeError::InvalidDate)
        );
    }

    #[test]
    fn test_invalid_registers_to_datetime() {
        // February 30th
        let raw = RX8025DateTime::from([0x00, 0x00, 0x00, 0x01, 0x30, 0x02, 0x24]);
        assert_eq!(
            raw.into_datetime(),
            Err(RX8025DateTimeError::InvalidDateTime)
        );
    }
}
