//! Alarm configuration utilities for the RX-8025 RTC.
//!
//! The RX-8025 has two alarms with fixed behavior:
//!
//! - Alarm D (daily) fires every day when hours and minutes match. It drives
//!   the /INTA output and latches DAFG in Control 2.
//! - Alarm W (weekly) fires when hours and minutes match on any weekday
//!   selected in its [`WeekdayMask`]. It drives /INTB and latches WAFG.
//!
//! [`DailyAlarm`] and [`WeeklyAlarm`] describe what to program;
//! [`RX8025AlarmD`] and [`RX8025AlarmW`] are the register images.

use crate::{AlarmHours, AlarmMinutes, WeekdayMask};

/// Error type for alarm configuration operations.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmError {
    /// Invalid time component value
    InvalidTime(&'static str),
    /// Weekday mask with bit 7 set
    InvalidWeekdayMask,
}

/// Daily alarm, hour and minute in 24-hour format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DailyAlarm {
    /// Hours value (0-23)
    pub hours: u8,
    /// Minutes value (0-59)
    pub minutes: u8,
}

/// Weekly alarm, hour and minute in 24-hour format on the selected days.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WeeklyAlarm {
    /// Hours value (0-23)
    pub hours: u8,
    /// Minutes value (0-59)
    pub minutes: u8,
    /// Days the alarm fires on
    pub weekdays: WeekdayMask,
}

fn validate_time(hours: u8, minutes: u8) -> Result<(), AlarmError> {
    if hours > 23 {
        return Err(AlarmError::InvalidTime("hours must be 0-23"));
    }
    if minutes > 59 {
        return Err(AlarmError::InvalidTime("minutes must be 0-59"));
    }
    Ok(())
}

impl DailyAlarm {
    /// Validates the alarm configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if hours or minutes are out of range.
    pub fn validate(&self) -> Result<(), AlarmError> {
        validate_time(self.hours, self.minutes)
    }
}

impl WeeklyAlarm {
    /// A weekly alarm that fires every day of the week.
    #[must_use]
    pub fn every_day(hours: u8, minutes: u8) -> Self {
        Self {
            hours,
            minutes,
            weekdays: WeekdayMask::default(),
        }
    }

    /// Validates the alarm configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if hours or minutes are out of range or the weekday
    /// mask uses bit 7.
    pub fn validate(&self) -> Result<(), AlarmError> {
        validate_time(self.hours, self.minutes)?;
        if u8::from(self.weekdays) & 0x80 != 0 {
            return Err(AlarmError::InvalidWeekdayMask);
        }
        Ok(())
    }
}

// Minutes then hours, bit 7 of both left clear so each field takes part in
// the match.
fn time_registers(hours: u8, minutes: u8) -> (AlarmMinutes, AlarmHours) {
    let mut m = AlarmMinutes::default();
    m.set_value(minutes);
    let mut h = AlarmHours::default();
    h.set_value(hours);
    (m, h)
}

/// Register image of Alarm D (minutes, hours).
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RX8025AlarmD {
    minutes: AlarmMinutes,
    hours: AlarmHours,
}

impl RX8025AlarmD {
    /// Creates the Alarm D registers from a `DailyAlarm`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn from_config(config: &DailyAlarm) -> Result<Self, AlarmError> {
        config.validate()?;
        let (minutes, hours) = time_registers(config.hours, config.minutes);
        Ok(Self { minutes, hours })
    }

    /// Decodes the registers back into a `DailyAlarm`.
    #[must_use]
    pub fn to_config(&self) -> DailyAlarm {
        DailyAlarm {
            hours: self.hours.value(),
            minutes: self.minutes.value(),
        }
    }

    /// Gets the alarm minutes register
    #[must_use]
    pub fn minutes(&self) -> AlarmMinutes {
        self.minutes
    }

    /// Gets the alarm hours register
    #[must_use]
    pub fn hours(&self) -> AlarmHours {
        self.hours
    }
}

impl From<[u8; 2]> for RX8025AlarmD {
    fn from(data: [u8; 2]) -> Self {
        Self {
            minutes: AlarmMinutes::from(data[0]),
            hours: AlarmHours::from(data[1]),
        }
    }
}

impl From<&RX8025AlarmD> for [u8; 2] {
    fn from(alarm: &RX8025AlarmD) -> [u8; 2] {
        [alarm.minutes.into(), alarm.hours.into()]
    }
}

/// Register image of Alarm W (minutes, hours, weekday mask).
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RX8025AlarmW {
    minutes: AlarmMinutes,
    hours: AlarmHours,
    weekdays: WeekdayMask,
}

impl RX8025AlarmW {
    /// Creates the Alarm W registers from a `WeeklyAlarm`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn from_config(config: &WeeklyAlarm) -> Result<Self, AlarmError> {
        config.validate()?;
        let (minutes, hours) = time_registers(config.hours, config.minutes);
        Ok(Self {
            minutes,
            hours,
            weekdays: config.weekdays,
        })
    }

    /// Decodes the registers back into a `WeeklyAlarm`.
    #[must_use]
    pub fn to_config(&self) -> WeeklyAlarm {
        WeeklyAlarm {
            hours: self.hours.value(),
            minutes: self.minutes.value(),
            weekdays: WeekdayMask::from(u8::from(self.weekdays) & 0x7F),
        }
    }

    /// Gets the alarm minutes register
    #[must_use]
    pub fn minutes(&self) -> AlarmMinutes {
        self.minutes
    }

    /// Gets the alarm hours register
    #[must_use]
    pub fn hours(&self) -> AlarmHours {
        self.hours
    }

    /// Gets the alarm weekday mask register
    #[must_use]
    pub fn weekdays(&self) -> WeekdayMask {
        self.weekdays
    }
}

impl From<[u8; 3]> for RX8025AlarmW {
    fn from(data: [u8; 3]) -> Self {
        Self {
            minutes: AlarmMinutes::from(data[0]),
            hours: AlarmHours::from(data[1]),
            weekdays: WeekdayMask::from(data[2]),
        }
    }
}

impl From<&RX8025AlarmW> for [u8; 3] {
    fn from(alarm: &RX8025AlarmW) -> [u8; 3] {
        [
            alarm.minutes.into(),
            alarm.hours.into(),
            alarm.weekdays.into(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daily_alarm_registers() {
        let alarm = RX8025AlarmD::from_config(&DailyAlarm {
            hours: 7,
            minutes: 30,
        })
        .unwrap();
        assert_eq!(<[u8; 2]>::from(&alarm), [0x30, 0x07]);
        assert!(!alarm.minutes().field_disable());
        assert!(!alarm.hours().field_disable());
    }

    #[test]
    fn test_daily_alarm_to_config_round_trip() {
        for config in [
            DailyAlarm {
                hours: 0,
                minutes: 0,
            },
            DailyAlarm {
                hours: 12,
                minutes: 45,
            },
            DailyAlarm {
                hours: 23,
                minutes: 59,
            },
        ] {
            let alarm = RX8025AlarmD::from_config(&config).unwrap();
            assert_eq!(alarm.to_config(), config);
        }
    }

    #[test]
    fn test_weekly_alarm_registers() {
        let alarm = RX8025AlarmW::from_config(&WeeklyAlarm {
            hours: 18,
            minutes: 5,
            weekdays: WeekdayMask::WEEKDAYS,
        })
        .unwrap();
        assert_eq!(<[u8; 3]>::from(&alarm), [0x05, 0x18, 0x3E]);
        assert_eq!(alarm.weekdays(), WeekdayMask::WEEKDAYS);
        assert_eq!(alarm.to_config().weekdays, WeekdayMask::WEEKDAYS);
    }

    #[test]
    fn test_weekly_alarm_every_day() {
        let config = WeeklyAlarm::every_day(6, 0);
        assert_eq!(config.weekdays, WeekdayMask::ALL);
        let alarm = RX8025AlarmW::from_config(&config).unwrap();
        assert_eq!(<[u8; 3]>::from(&alarm), [0x00, 0x06, 0x7F]);
    }

    #[test]
    fn test_decode_ignores_disable_bits() {
        let alarm = RX8025AlarmD::from([0x80 | 0x15, 0x80 | 0x09]);
        assert_eq!(
            alarm.to_config(),
            DailyAlarm {
                hours: 9,
                minutes: 15
            }
        );

        let alarm = RX8025AlarmW::from([0x59, 0x23, 0xFF]);
        assert_eq!(alarm.to_config().weekdays, WeekdayMask::ALL);
    }

    #[test]
    fn test_validation_errors() {
        assert_eq!(
            DailyAlarm {
                hours: 24,
                minutes: 0
            }
            .validate(),
            Err(AlarmError::InvalidTime("hours must be 0-23"))
        );
        assert_eq!(
            DailyAlarm {
                hours: 0,
                minutes: 60
            }
            .validate(),
            Err(AlarmError::InvalidTime("minutes must be 0-59"))
        );
        assert_eq!(
            WeeklyAlarm {
                hours: 1,
                minutes: 1,
                weekdays: WeekdayMask::from(0x80),
            }
            .validate(),
            Err(AlarmError::InvalidWeekdayMask)
        );
        assert!(RX8025AlarmW::from_config(&WeeklyAlarm::every_day(24, 0)).is_err());
    }
}
