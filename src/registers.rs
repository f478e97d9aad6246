//! Register definitions and bitfield structures for the RX-8025 RTC.
//!
//! This module contains all register addresses, bitfield definitions, and
//! related types for interacting with the RX-8025 Real-Time Clock registers.
//!
//! Addresses are listed as the datasheet numbers them. Use [`RegAddr::command`]
//! to get the byte actually sent on the bus.

use bitfield::bitfield;

use crate::codec::{decode_bcd, encode_bcd, swap_address_nibbles};

/// Register addresses for the RX-8025 RTC.
#[allow(unused)]
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegAddr {
    /// Seconds register (0-59)
    Seconds = 0x00,
    /// Minutes register (0-59)
    Minutes = 0x01,
    /// Hours register (0-23)
    Hours = 0x02,
    /// Weekday register (0-6, 0 = Sunday)
    Weekday = 0x03,
    /// Day of month register (1-31)
    Day = 0x04,
    /// Month register (1-12)
    Month = 0x05,
    /// Year register (0-99)
    Year = 0x06,
    /// Digital offset (clock adjust) register
    DigitalOffset = 0x07,
    /// Weekly alarm minutes register
    AlarmWMinutes = 0x08,
    /// Weekly alarm hours register
    AlarmWHours = 0x09,
    /// Weekly alarm weekday mask register
    AlarmWWeekday = 0x0A,
    /// Daily alarm minutes register
    AlarmDMinutes = 0x0B,
    /// Daily alarm hours register
    AlarmDHours = 0x0C,
    /// Control 1 register
    Control1 = 0x0E,
    /// Control 2 register
    Control2 = 0x0F,
    /// Extension digital offset register (mode 1)
    ExtDigitalOffset = 0x10,
    /// Extension control 1 register (mode 1)
    ExtControl1 = 0x1E,
    /// Extension control 2 register (mode 1)
    ExtControl2 = 0x1F,
}

impl RegAddr {
    /// The command byte that selects this register on the bus.
    #[must_use]
    pub const fn command(self) -> u8 {
        swap_address_nibbles(self as u8)
    }
}

/// Hour format selected by bit 5 of Control 1.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeRepresentation {
    /// 24-hour format (0-23)
    TwentyFourHour = 0,
    /// 12-hour format (1-12 + AM/PM)
    TwelveHour = 1,
}
impl From<u8> for TimeRepresentation {
    /// Creates a `TimeRepresentation` from a raw register value.
    ///
    /// # Panics
    /// Panics if the value is not 0 or 1.
    fn from(v: u8) -> Self {
        match v {
            0 => TimeRepresentation::TwentyFourHour,
            1 => TimeRepresentation::TwelveHour,
            _ => panic!("Invalid value for TimeRepresentation: {}", v),
        }
    }
}
impl From<TimeRepresentation> for u8 {
    fn from(v: TimeRepresentation) -> Self {
        v as u8
    }
}

/// Periodic interrupt cycle, the CT2-CT0 field of Control 1.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CyclePeriod {
    /// Output off (Hi-Z)
    Off = 0b000,
    /// Output fixed low
    FixedLow = 0b001,
    /// 2 Hz pulse, 50% duty
    Pulse2Hz = 0b010,
    /// 1 Hz pulse, 50% duty
    Pulse1Hz = 0b011,
    /// Once per second, level mode
    Level1Second = 0b100,
    /// Once per minute, level mode
    Level1Minute = 0b101,
    /// Once per hour, level mode
    Level1Hour = 0b110,
    /// Once per month, level mode
    Level1Month = 0b111,
}
impl From<u8> for CyclePeriod {
    /// Creates a `CyclePeriod` from the 3-bit cycle field.
    ///
    /// # Panics
    /// Panics if the value does not fit in 3 bits.
    fn from(v: u8) -> Self {
        match v {
            0b000 => CyclePeriod::Off,
            0b001 => CyclePeriod::FixedLow,
            0b010 => CyclePeriod::Pulse2Hz,
            0b011 => CyclePeriod::Pulse1Hz,
            0b100 => CyclePeriod::Level1Second,
            0b101 => CyclePeriod::Level1Minute,
            0b110 => CyclePeriod::Level1Hour,
            0b111 => CyclePeriod::Level1Month,
            _ => panic!("Invalid value for CyclePeriod: {}", v),
        }
    }
}
impl From<CyclePeriod> for u8 {
    fn from(v: CyclePeriod) -> Self {
        v as u8
    }
}

// This macro generates the From<u8> and Into<u8> implementations for the
// register type
macro_rules! from_register_u8 {
    ($typ:ty) => {
        impl From<u8> for $typ {
            fn from(v: u8) -> Self {
                paste::paste!([< $typ >](v))
            }
        }
        impl From<$typ> for u8 {
            fn from(v: $typ) -> Self {
                v.0
            }
        }
    };
}

// Decimal access to the BCD digits of a register. Bits outside the mask
// (flags sharing the byte) are left alone on write and ignored on read.
macro_rules! bcd_register {
    ($typ:ty, $mask:expr) => {
        impl $typ {
            /// Bits of the register that hold the BCD value.
            pub const VALUE_MASK: u8 = $mask;

            /// Decimal value of the BCD digits.
            #[must_use]
            pub fn value(&self) -> u8 {
                decode_bcd(self.0 & Self::VALUE_MASK)
            }

            /// Stores `value` as BCD without touching bits outside the value mask.
            pub fn set_value(&mut self, value: u8) {
                self.0 = (self.0 & !Self::VALUE_MASK) | (encode_bcd(value) & Self::VALUE_MASK);
            }
        }
    };
}

bitfield! {
    #[derive(Clone, Copy, Default, PartialEq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct Seconds(u8);
    impl Debug;
    pub ten_seconds, set_ten_seconds: 6, 4;
    pub seconds, set_seconds: 3, 0;
}
from_register_u8!(Seconds);
bcd_register!(Seconds, 0x7F);

bitfield! {
    #[derive(Clone, Copy, Default, PartialEq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct Minutes(u8);
    impl Debug;
    pub ten_minutes, set_ten_minutes: 6, 4;
    pub minutes, set_minutes: 3, 0;
}
from_register_u8!(Minutes);
bcd_register!(Minutes, 0x7F);

bitfield! {
    #[derive(Clone, Copy, Default, PartialEq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct Hours(u8);
    impl Debug;
    pub ten_hours, set_ten_hours: 5, 4;
    pub hours, set_hours: 3, 0;
}
from_register_u8!(Hours);
bcd_register!(Hours, 0x3F);

bitfield! {
    #[derive(Clone, Copy, Default, PartialEq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct Weekday(u8);
    impl Debug;
    pub weekday, set_weekday: 2, 0;
}
from_register_u8!(Weekday);

bitfield! {
    #[derive(Clone, Copy, Default, PartialEq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct Day(u8);
    impl Debug;
    pub ten_day, set_ten_day: 5, 4;
    pub day, set_day: 3, 0;
}
from_register_u8!(Day);
bcd_register!(Day, 0x3F);

bitfield! {
    #[derive(Clone, Copy, Default, PartialEq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct Month(u8);
    impl Debug;
    pub ten_month, set_ten_month: 4, 4;
    pub month, set_month: 3, 0;
}
from_register_u8!(Month);
bcd_register!(Month, 0x1F);

bitfield! {
    #[derive(Clone, Copy, Default, PartialEq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct Year(u8);
    impl Debug;
    pub ten_year, set_ten_year: 7, 4;
    pub year, set_year: 3, 0;
}
from_register_u8!(Year);
bcd_register!(Year, 0xFF);

bitfield! {
    #[derive(Clone, Copy, Default, PartialEq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct DigitalOffset(u8);
    impl Debug;
    pub offset, set_offset: 6, 0;
}
from_register_u8!(DigitalOffset);

bitfield! {
    #[derive(Clone, Copy, Default, PartialEq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct AlarmMinutes(u8);
    impl Debug;
    pub field_disable, set_field_disable: 7;
    pub ten_minutes, set_ten_minutes: 6, 4;
    pub minutes, set_minutes: 3, 0;
}
from_register_u8!(AlarmMinutes);
bcd_register!(AlarmMinutes, 0x7F);

bitfield! {
    #[derive(Clone, Copy, Default, PartialEq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct AlarmHours(u8);
    impl Debug;
    pub field_disable, set_field_disable: 7;
    pub ten_hours, set_ten_hours: 5, 4;
    pub hours, set_hours: 3, 0;
}
from_register_u8!(AlarmHours);
bcd_register!(AlarmHours, 0x3F);

bitfield! {
    /// Days on which the weekly alarm fires, one bit per weekday.
    ///
    /// The default mask selects every day.
    #[derive(Clone, Copy, PartialEq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct WeekdayMask(u8);
    impl Debug;
    pub sunday, set_sunday: 0;
    pub monday, set_monday: 1;
    pub tuesday, set_tuesday: 2;
    pub wednesday, set_wednesday: 3;
    pub thursday, set_thursday: 4;
    pub friday, set_friday: 5;
    pub saturday, set_saturday: 6;
}
from_register_u8!(WeekdayMask);

impl WeekdayMask {
    /// No day selected.
    pub const NONE: WeekdayMask = WeekdayMask(0x00);
    /// Monday through Friday.
    pub const WEEKDAYS: WeekdayMask = WeekdayMask(0x3E);
    /// Saturday and Sunday.
    pub const WEEKEND: WeekdayMask = WeekdayMask(0x41);
    /// Every day of the week.
    pub const ALL: WeekdayMask = WeekdayMask(0x7F);

    /// Whether the mask selects `weekday` (0 = Sunday .. 6 = Saturday).
    #[must_use]
    pub fn contains(&self, weekday: u8) -> bool {
        weekday < 7 && self.0 & (1 << weekday) != 0
    }

    /// Adds `weekday` (0 = Sunday .. 6 = Saturday) to the mask.
    /// Values above 6 are ignored.
    #[must_use]
    pub fn with(self, weekday: u8) -> Self {
        if weekday < 7 {
            WeekdayMask(self.0 | (1 << weekday))
        } else {
            self
        }
    }
}

impl Default for WeekdayMask {
    fn default() -> Self {
        WeekdayMask::ALL
    }
}

impl From<chrono::Weekday> for WeekdayMask {
    fn from(day: chrono::Weekday) -> Self {
        // num_days_from_sunday is 0..=6
        WeekdayMask::NONE.with(day.num_days_from_sunday() as u8)
    }
}

impl core::ops::BitOr for WeekdayMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        WeekdayMask(self.0 | rhs.0)
    }
}

bitfield! {
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Control1(u8);
    impl Debug;
    pub weekly_alarm_enable, set_weekly_alarm_enable: 7;
    pub daily_alarm_enable, set_daily_alarm_enable: 6;
    pub from into TimeRepresentation, time_representation, set_time_representation: 5, 5;
    pub from into CyclePeriod, cycle_period, set_cycle_period: 2, 0;
}
from_register_u8!(Control1);

#[cfg(feature = "defmt")]
impl defmt::Format for Control1 {
    fn format(&self, f: defmt::Formatter) {
        match self.time_representation() {
            TimeRepresentation::TwentyFourHour => defmt::write!(f, "24h"),
            TimeRepresentation::TwelveHour => defmt::write!(f, "12h"),
        }
        if self.weekly_alarm_enable() {
            defmt::write!(f, ", WALE");
        }
        if self.daily_alarm_enable() {
            defmt::write!(f, ", DALE");
        }
        defmt::write!(f, ", cycle {}", self.cycle_period());
    }
}

bitfield! {
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Control2(u8);
    impl Debug;
    pub voltage_low, set_voltage_low: 7;
    pub cycle_timer_enable, set_cycle_timer_enable: 6;
    pub cycle_timer_flag, set_cycle_timer_flag: 2;
    pub weekly_alarm_flag, set_weekly_alarm_flag: 1;
    pub daily_alarm_flag, set_daily_alarm_flag: 0;
}
from_register_u8!(Control2);

#[cfg(feature = "defmt")]
impl defmt::Format for Control2 {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Control2(");
        let mut first = true;
        for (set, name) in [
            (self.voltage_low(), "VDET"),
            (self.cycle_timer_enable(), "CTE"),
            (self.cycle_timer_flag(), "CTFG"),
            (self.weekly_alarm_flag(), "WAFG"),
            (self.daily_alarm_flag(), "DAFG"),
        ] {
            if set {
                if !first {
                    defmt::write!(f, ", ");
                }
                defmt::write!(f, "{}", name);
                first = false;
            }
        }
        if first {
            defmt::write!(f, "clear");
        }
        defmt::write!(f, ")");
    }
}
