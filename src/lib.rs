//! A platform-agnostic driver for the Epson RX-8025 SA/NB real-time clock.
//!
//! The driver talks to the chip through any [`embedded_hal::i2c::I2c`] bus
//! (or `embedded_hal_async::i2c::I2c` with the `async` feature) and exposes:
//!
//! - time and calendar read/write, as raw fields or chrono values
//! - Alarm D (daily) and Alarm W (weekly, with a weekday mask)
//! - the periodic interrupt generator
//! - the sticky status flags of Control 2
//!
//! Every change to Control 1 or Control 2 is a read-modify-write that only
//! touches the bits belonging to the operation. The two transactions are not
//! atomic: share one driver per device and serialize access externally if
//! several contexts use it.
//!
//! # Example
//!
//! ```rust,ignore
//! use rx8025::{CyclePeriod, RX8025, DEFAULT_ADDRESS};
//!
//! let mut rtc = RX8025::new(i2c, DEFAULT_ADDRESS);
//! rtc.initialize()?;
//! rtc.set_date(24, 3, 14)?;
//! rtc.set_time(15, 30, 0)?;
//!
//! rtc.set_alarm_d(7, 30)?;
//! rtc.enable_alarm_d(true)?;
//! rtc.set_cycle_timer(CyclePeriod::Level1Minute)?;
//!
//! if rtc.alarm_d_flag()? {
//!     rtc.clear_alarm_d_flag()?;
//! }
//! ```
//!
//! # Features
//!
//! - `async`: async driver in [`asynch`]
//! - `log`: logging through the `log` crate
//! - `defmt`: logging and `defmt::Format` impls through `defmt`
#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod alarm;
#[cfg(feature = "async")]
pub mod asynch;
pub mod codec;
pub mod datetime;
mod registers;

use chrono::NaiveDateTime;
use embedded_hal::i2c::I2c;

pub use crate::alarm::{AlarmError, DailyAlarm, RX8025AlarmD, RX8025AlarmW, WeeklyAlarm};
pub use crate::datetime::{Date, RX8025DateTimeError, Time};
pub use crate::registers::*;

use crate::datetime::{RX8025Date, RX8025DateTime, RX8025Time};

/// Default I2C address of the RX-8025.
pub const DEFAULT_ADDRESS: u8 = 0x32;

/// Interrupt and alarm configuration applied by `configure`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    pub cycle_period: CyclePeriod,
    pub cycle_timer_enable: bool,
    pub daily_alarm_enable: bool,
    pub weekly_alarm_enable: bool,
}

/// Errors returned by the driver.
#[derive(Debug)]
pub enum RX8025Error<I2CE> {
    /// The bus transaction did not complete
    I2c(I2CE),
    /// Date or time value out of range, or registers holding an impossible date
    DateTime(RX8025DateTimeError),
    /// Alarm configuration out of range
    Alarm(AlarmError),
}

impl<I2CE> From<I2CE> for RX8025Error<I2CE> {
    fn from(e: I2CE) -> Self {
        RX8025Error::I2c(e)
    }
}

macro_rules! set_and_get_register {
    ($(($name:ident, $regaddr:expr, $typ:ty)),+) => {
        $(
            paste::item! {
                #[doc = concat!("Writes the ", stringify!($name), " register.")]
                pub fn [< set_ $name >](&mut self, value: $typ) -> Result<(), RX8025Error<I2C::Error>> {
                    self.i2c.write(
                        self.address,
                        &[$regaddr.command(), value.into()],
                        )?;
                    Ok(())
                }
            }

            #[doc = concat!("Reads the ", stringify!($name), " register.")]
            pub fn $name(&mut self) -> Result<$typ, RX8025Error<I2C::Error>> {
                let mut data = [0];
                self.i2c
                    .write_read(self.address, &[$regaddr.command()], &mut data)?;
                Ok(<$typ>::from(data[0]))
            }
        )+
    }
}

/// RX-8025 Real-Time Clock driver.
pub struct RX8025<I2C: I2c> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> RX8025<I2C> {
    /// Creates a driver for the device at `address` (normally [`DEFAULT_ADDRESS`]).
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Releases the bus.
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Forces 24-hour mode and checks that the time can be read.
    ///
    /// Switching to 24-hour mode is best effort: a failed read or write of
    /// Control 1 is logged and skipped. The result is that of the time read.
    pub fn initialize(&mut self) -> Result<(), RX8025Error<I2C::Error>> {
        match self.control1() {
            Ok(mut control) => {
                control.set_time_representation(TimeRepresentation::TwentyFourHour);
                debug!("RX8025: writing control1: {:?}", control);
                if self.set_control1(control).is_err() {
                    warn!("RX8025: control1 write failed, hour mode unchanged");
                }
            }
            Err(_) => warn!("RX8025: control1 read failed, hour mode unchanged"),
        }
        let time = self.time()?;
        debug!("RX8025: initialized at {:?}", time);
        Ok(())
    }

    /// Applies the cycle timer and alarm enables in `config`, keeping 24-hour mode.
    pub fn configure(&mut self, config: &Config) -> Result<(), RX8025Error<I2C::Error>> {
        self.update_control1(|control| {
            control.set_time_representation(TimeRepresentation::TwentyFourHour);
            control.set_cycle_period(config.cycle_period);
            control.set_daily_alarm_enable(config.daily_alarm_enable);
            control.set_weekly_alarm_enable(config.weekly_alarm_enable);
        })?;
        self.update_control2(|control| control.set_cycle_timer_enable(config.cycle_timer_enable))?;
        Ok(())
    }

    // At most 7 data bytes; the longest burst is the full time and calendar block.
    fn write_registers(
        &mut self,
        reg: RegAddr,
        data: &[u8],
    ) -> Result<(), RX8025Error<I2C::Error>> {
        let mut buffer = [0u8; 8];
        buffer[0] = reg.command();
        buffer[1..=data.len()].copy_from_slice(data);
        trace!("RX8025: write {:?} {:?}", reg, data);
        self.i2c.write(self.address, &buffer[..=data.len()])?;
        Ok(())
    }

    fn read_registers(
        &mut self,
        reg: RegAddr,
        buffer: &mut [u8],
    ) -> Result<(), RX8025Error<I2C::Error>> {
        self.i2c.write_read(self.address, &[reg.command()], buffer)?;
        trace!("RX8025: read {:?} {:?}", reg, &*buffer);
        Ok(())
    }

    fn update_control1<F>(&mut self, f: F) -> Result<Control1, RX8025Error<I2C::Error>>
    where
        F: FnOnce(&mut Control1),
    {
        let mut control = self.control1()?;
        f(&mut control);
        debug!("RX8025: writing control1: {:?}", control);
        self.set_control1(control)?;
        Ok(control)
    }

    fn update_control2<F>(&mut self, f: F) -> Result<Control2, RX8025Error<I2C::Error>>
    where
        F: FnOnce(&mut Control2),
    {
        let mut control = self.control2()?;
        f(&mut control);
        debug!("RX8025: writing control2: {:?}", control);
        self.set_control2(control)?;
        Ok(control)
    }

    /// Sets the time (24-hour format) in one burst.
    pub fn set_time(
        &mut self,
        hours: u8,
        minutes: u8,
        seconds: u8,
    ) -> Result<(), RX8025Error<I2C::Error>> {
        let time = Time::new(hours, minutes, seconds).map_err(RX8025Error::DateTime)?;
        let data: [u8; 3] = (&RX8025Time::from_time(&time)).into();
        self.write_registers(RegAddr::Seconds, &data)
    }

    /// Reads the time.
    pub fn time(&mut self) -> Result<Time, RX8025Error<I2C::Error>> {
        let mut data = [0; 3];
        self.read_registers(RegAddr::Seconds, &mut data)?;
        Ok(RX8025Time::from(data).into_time())
    }

    /// Sets the date, computing the weekday from it.
    pub fn set_date(&mut self, year: u8, month: u8, day: u8) -> Result<(), RX8025Error<I2C::Error>> {
        let date = Date::new(year, month, day).map_err(RX8025Error::DateTime)?;
        self.write_date(&date)
    }

    /// Sets the date with an explicit weekday (0 = Sunday).
    pub fn set_date_with_weekday(
        &mut self,
        year: u8,
        month: u8,
        day: u8,
        weekday: u8,
    ) -> Result<(), RX8025Error<I2C::Error>> {
        let date = Date::with_weekday(year, month, day, weekday).map_err(RX8025Error::DateTime)?;
        self.write_date(&date)
    }

    fn write_date(&mut self, date: &Date) -> Result<(), RX8025Error<I2C::Error>> {
        let data: [u8; 4] = (&RX8025Date::from_date(date)).into();
        self.write_registers(RegAddr::Weekday, &data)
    }

    /// Reads the date, including the weekday.
    pub fn date(&mut self) -> Result<Date, RX8025Error<I2C::Error>> {
        let mut data = [0; 4];
        self.read_registers(RegAddr::Weekday, &mut data)?;
        Ok(RX8025Date::from(data).into_date())
    }

    /// Reads time and date in a single burst.
    pub fn datetime(&mut self) -> Result<NaiveDateTime, RX8025Error<I2C::Error>> {
        let mut data = [0; 7];
        self.read_registers(RegAddr::Seconds, &mut data)?;
        RX8025DateTime::from(data)
            .into_datetime()
            .map_err(RX8025Error::DateTime)
    }

    /// Writes time and date in a single burst. The year must be 2000-2099.
    pub fn set_datetime(
        &mut self,
        datetime: &NaiveDateTime,
    ) -> Result<(), RX8025Error<I2C::Error>> {
        let raw = RX8025DateTime::from_datetime(datetime).map_err(RX8025Error::DateTime)?;
        let data: [u8; 7] = (&raw).into();
        self.write_registers(RegAddr::Seconds, &data)
    }

    /// Programs Alarm D. It fires once enabled with `enable_alarm_d`.
    pub fn set_alarm_d(&mut self, hours: u8, minutes: u8) -> Result<(), RX8025Error<I2C::Error>> {
        let alarm = RX8025AlarmD::from_config(&DailyAlarm { hours, minutes })
            .map_err(RX8025Error::Alarm)?;
        let data: [u8; 2] = (&alarm).into();
        self.write_registers(RegAddr::AlarmDMinutes, &data)
    }

    /// Reads back the programmed Alarm D.
    pub fn alarm_d(&mut self) -> Result<DailyAlarm, RX8025Error<I2C::Error>> {
        let mut data = [0; 2];
        self.read_registers(RegAddr::AlarmDMinutes, &mut data)?;
        Ok(RX8025AlarmD::from(data).to_config())
    }

    /// Sets or clears DALE in Control 1.
    pub fn enable_alarm_d(&mut self, enable: bool) -> Result<(), RX8025Error<I2C::Error>> {
        self.update_control1(|control| control.set_daily_alarm_enable(enable))?;
        Ok(())
    }

    /// Whether Alarm D has fired since its flag was last cleared.
    pub fn alarm_d_flag(&mut self) -> Result<bool, RX8025Error<I2C::Error>> {
        Ok(self.control2()?.daily_alarm_flag())
    }

    /// Clears the Alarm D flag, leaving the other flags as they are.
    pub fn clear_alarm_d_flag(&mut self) -> Result<(), RX8025Error<I2C::Error>> {
        self.update_control2(|control| control.set_daily_alarm_flag(false))?;
        Ok(())
    }

    /// Programs Alarm W for the days in `weekdays`.
    ///
    /// `WeekdayMask::default()` selects every day.
    pub fn set_alarm_w(
        &mut self,
        hours: u8,
        minutes: u8,
        weekdays: WeekdayMask,
    ) -> Result<(), RX8025Error<I2C::Error>> {
        let alarm = RX8025AlarmW::from_config(&WeeklyAlarm {
            hours,
            minutes,
            weekdays,
        })
        .map_err(RX8025Error::Alarm)?;
        let data: [u8; 3] = (&alarm).into();
        self.write_registers(RegAddr::AlarmWMinutes, &data)
    }

    /// Reads back the programmed Alarm W.
    pub fn alarm_w(&mut self) -> Result<WeeklyAlarm, RX8025Error<I2C::Error>> {
        let mut data = [0; 3];
        self.read_registers(RegAddr::AlarmWMinutes, &mut data)?;
        Ok(RX8025AlarmW::from(data).to_config())
    }

    /// Sets or clears WALE in Control 1.
    pub fn enable_alarm_w(&mut self, enable: bool) -> Result<(), RX8025Error<I2C::Error>> {
        self.update_control1(|control| control.set_weekly_alarm_enable(enable))?;
        Ok(())
    }

    /// Whether Alarm W has fired since its flag was last cleared.
    pub fn alarm_w_flag(&mut self) -> Result<bool, RX8025Error<I2C::Error>> {
        Ok(self.control2()?.weekly_alarm_flag())
    }

    /// Clears the Alarm W flag, leaving the other flags as they are.
    pub fn clear_alarm_w_flag(&mut self) -> Result<(), RX8025Error<I2C::Error>> {
        self.update_control2(|control| control.set_weekly_alarm_flag(false))?;
        Ok(())
    }

    /// Selects the periodic interrupt cycle.
    pub fn set_cycle_timer(&mut self, period: CyclePeriod) -> Result<(), RX8025Error<I2C::Error>> {
        self.update_control1(|control| control.set_cycle_period(period))?;
        Ok(())
    }

    /// Reads the selected periodic interrupt cycle.
    pub fn cycle_timer(&mut self) -> Result<CyclePeriod, RX8025Error<I2C::Error>> {
        Ok(self.control1()?.cycle_period())
    }

    /// Sets or clears the periodic timer enable bit in Control 2.
    pub fn enable_cycle_timer(&mut self, enable: bool) -> Result<(), RX8025Error<I2C::Error>> {
        self.update_control2(|control| control.set_cycle_timer_enable(enable))?;
        Ok(())
    }

    /// Whether the periodic timer has fired since its flag was last cleared.
    pub fn cycle_timer_flag(&mut self) -> Result<bool, RX8025Error<I2C::Error>> {
        Ok(self.control2()?.cycle_timer_flag())
    }

    /// Clears the periodic timer flag, leaving the other flags as they are.
    pub fn clear_cycle_timer_flag(&mut self) -> Result<(), RX8025Error<I2C::Error>> {
        self.update_control2(|control| control.set_cycle_timer_flag(false))?;
        Ok(())
    }

    /// Whether the supply dropped below the detection threshold since the
    /// flag was last cleared. When set, the stored time may be wrong.
    pub fn voltage_low(&mut self) -> Result<bool, RX8025Error<I2C::Error>> {
        Ok(self.control2()?.voltage_low())
    }

    /// Clears the voltage low flag, leaving the other flags as they are.
    pub fn clear_voltage_low(&mut self) -> Result<(), RX8025Error<I2C::Error>> {
        self.update_control2(|control| control.set_voltage_low(false))?;
        Ok(())
    }

    /// Raw Control 1 byte.
    pub fn read_status1(&mut self) -> Result<u8, RX8025Error<I2C::Error>> {
        Ok(self.control1()?.into())
    }

    /// Raw Control 2 byte.
    pub fn read_status2(&mut self) -> Result<u8, RX8025Error<I2C::Error>> {
        Ok(self.control2()?.into())
    }

    set_and_get_register!(
        (second, RegAddr::Seconds, Seconds),
        (minute, RegAddr::Minutes, Minutes),
        (hour, RegAddr::Hours, Hours),
        (weekday, RegAddr::Weekday, Weekday),
        (day, RegAddr::Day, Day),
        (month, RegAddr::Month, Month),
        (year, RegAddr::Year, Year),
        (digital_offset, RegAddr::DigitalOffset, DigitalOffset),
        (control1, RegAddr::Control1, Control1),
        (control2, RegAddr::Control2, Control2)
    );
}

#[cfg(test)]
pub(crate) mod testing {
    //! A register-level model of the chip for driver tests.

    use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, Operation};

    use crate::codec::swap_address_nibbles;

    /// Simulated RX-8025: 32 registers, auto-incrementing pointer, optional
    /// injected failures.
    pub struct FakeRtc {
        pub regs: [u8; 32],
        pub fail_writes: bool,
        pub fail_reads: bool,
        pointer: usize,
    }

    impl FakeRtc {
        pub fn new() -> Self {
            Self {
                regs: [0; 32],
                fail_writes: false,
                fail_reads: false,
                pointer: 0,
            }
        }
    }

    impl ErrorType for FakeRtc {
        type Error = ErrorKind;
    }

    impl I2c for FakeRtc {
        fn transaction(
            &mut self,
            _address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            for op in operations.iter_mut() {
                match op {
                    Operation::Write(bytes) => {
                        let Some((command, data)) = bytes.split_first() else {
                            continue;
                        };
                        if self.fail_writes && !data.is_empty() {
                            return Err(ErrorKind::Other);
                        }
                        self.pointer = usize::from(swap_address_nibbles(*command) & 0x1F);
                        for b in data {
                            self.regs[self.pointer] = *b;
                            self.pointer = (self.pointer + 1) & 0x1F;
                        }
                    }
                    Operation::Read(buffer) => {
                        if self.fail_reads {
                            return Err(ErrorKind::Other);
                        }
                        for b in buffer.iter_mut() {
                            *b = self.regs[self.pointer];
                            self.pointer = (self.pointer + 1) & 0x1F;
                        }
                    }
                }
            }
            Ok(())
        }
    }
}
