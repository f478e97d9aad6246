//! Async implementation of the RX-8025 driver.
//!
//! This module provides an async interface to the RX-8025 RTC device using
//! `embedded-hal-async` traits. It is only available when the `async` feature
//! is enabled.
//!
//! # Example
//!
//! ```rust,ignore
//! use rx8025::asynch::RX8025;
//!
//! let mut rtc = RX8025::new(i2c, rx8025::DEFAULT_ADDRESS);
//! rtc.initialize().await?;
//! let time = rtc.time().await?;
//! ```

use chrono::NaiveDateTime;
use embedded_hal_async::i2c::I2c;
use paste::paste;

use crate::datetime::{RX8025Date, RX8025DateTime, RX8025Time};
use crate::{
    Config, Control1, Control2, CyclePeriod, DailyAlarm, Date, Day, DigitalOffset, Hours,
    Minutes, Month, RX8025AlarmD, RX8025AlarmW, RX8025Error, RegAddr, Seconds, Time,
    TimeRepresentation, Weekday, WeekdayMask, WeeklyAlarm, Year,
};

/// RX-8025 Real-Time Clock async driver.
///
/// Same operations as the blocking [`crate::RX8025`], over `embedded-hal-async`.
pub struct RX8025<I2C: I2c> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> RX8025<I2C> {
    /// Creates a new RX-8025 async driver instance.
    ///
    /// # Arguments
    /// * `i2c` - The async I2C bus implementation
    /// * `address` - The I2C address of the device (typically 0x32)
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
    pub async fn initialize(&mut self) -> Result<(), RX8025Error<I2C::Error>> {
        match self.control1().await {
            Ok(mut control) => {
                control.set_time_representation(TimeRepresentation::TwentyFourHour);
                debug!("RX8025: writing control1: {:?}", control);
                if self.set_control1(control).await.is_err() {
                    warn!("RX8025: control1 write failed, hour mode unchanged");
                }
            }
            Err(_) => warn!("RX8025: control1 read failed, hour mode unchanged"),
        }
        let time = self.time().await?;
        debug!("RX8025: initialized at {:?}", time);
        Ok(())
    }

    /// Applies the cycle timer and alarm enables in `config`, keeping 24-hour mode.
    pub async fn configure(&mut self, config: &Config) -> Result<(), RX8025Error<I2C::Error>> {
        self.update_control1(|control| {
            control.set_time_representation(TimeRepresentation::TwentyFourHour);
            control.set_cycle_period(config.cycle_period);
            control.set_daily_alarm_enable(config.daily_alarm_enable);
            control.set_weekly_alarm_enable(config.weekly_alarm_enable);
        })
        .await?;
        self.update_control2(|control| control.set_cycle_timer_enable(config.cycle_timer_enable))
            .await?;
        Ok(())
    }

    // At most 7 data bytes.
    async fn write_registers(
        &mut self,
        reg: RegAddr,
        data: &[u8],
    ) -> Result<(), RX8025Error<I2C::Error>> {
        let mut buffer = [0u8; 8];
        buffer[0] = reg.command();
        buffer[1..=data.len()].copy_from_slice(data);
        trace!("RX8025: write {:?} {:?}", reg, data);
        self.i2c.write(self.address, &buffer[..=data.len()]).await?;
        Ok(())
    }

    async fn read_registers(
        &mut self,
        reg: RegAddr,
        buffer: &mut [u8],
    ) -> Result<(), RX8025Error<I2C::Error>> {
        self.i2c
            .write_read(self.address, &[reg.command()], buffer)
            .await?;
        trace!("RX8025: read {:?} {:?}", reg, &*buffer);
        Ok(())
    }

    async fn update_control1<F>(&mut self, f: F) -> Result<Control1, RX8025Error<I2C::Error>>
    where
        F: FnOnce(&mut Control1),
    {
        let mut control = self.control1().await?;
        f(&mut control);
        debug!("RX8025: writing control1: {:?}", control);
        self.set_control1(control).await?;
        Ok(control)
    }

    async fn update_control2<F>(&mut self, f: F) -> Result<Control2, RX8025Error<I2C::Error>>
    where
        F: FnOnce(&mut Control2),
    {
        let mut control = self.control2().await?;
        f(&mut control);
        debug!("RX8025: writing control2: {:?}", control);
        self.set_control2(control).await?;
        Ok(control)
    }

    /// Sets the time (24-hour format) in one burst.
    pub async fn set_time(
        &mut self,
        hours: u8,
        minutes: u8,
        seconds: u8,
    ) -> Result<(), RX8025Error<I2C::Error>> {
        let time = Time::new(hours, minutes, seconds).map_err(RX8025Error::DateTime)?;
        let data: [u8; 3] = (&RX8025Time::from_time(&time)).into();
        self.write_registers(RegAddr::Seconds, &data).await
    }

    /// Reads the time.
    pub async fn time(&mut self) -> Result<Time, RX8025Error<I2C::Error>> {
        let mut data = [0; 3];
        self.read_registers(RegAddr::Seconds, &mut data).await?;
        Ok(RX8025Time::from(data).into_time())
    }

    /// Sets the date, computing the weekday from it.
    pub async fn set_date(
        &mut self,
        year: u8,
        month: u8,
        day: u8,
    ) -> Result<(), RX8025Error<I2C::Error>> {
        let date = Date::new(year, month, day).map_err(RX8025Error::DateTime)?;
        self.write_date(&date).await
    }

    /// Sets the date with an explicit weekday (0 = Sunday).
    pub async fn set_date_with_weekday(
        &mut self,
        year: u8,
        month: u8,
        day: u8,
        weekday: u8,
    ) -> Result<(), RX8025Error<I2C::Error>> {
        let date = Date::with_weekday(year, month, day, weekday).map_err(RX8025Error::DateTime)?;
        self.write_date(&date).await
    }

    async fn write_date(&mut self, date: &Date) -> Result<(), RX8025Error<I2C::Error>> {
        let data: [u8; 4] = (&RX8025Date::from_date(date)).into();
        self.write_registers(RegAddr::Weekday, &data).await
    }

    /// Reads the date, including the weekday.
    pub async fn date(&mut self) -> Result<Date, RX8025Error<I2C::Error>> {
        let mut data = [0; 4];
        self.read_registers(RegAddr::Weekday, &mut data).await?;
        Ok(RX8025Date::from(data).into_date())
    }

    /// Reads time and date in a single burst.
    pub async fn datetime(&mut self) -> Result<NaiveDateTime, RX8025Error<I2C::Error>> {
        let mut data = [0; 7];
        self.read_registers(RegAddr::Seconds, &mut data).await?;
        RX8025DateTime::from(data)
            .into_datetime()
            .map_err(RX8025Error::DateTime)
    }

    /// Writes time and date in a single burst. The year must be 2000-2099.
    pub async fn set_datetime(
        &mut self,
        datetime: &NaiveDateTime,
    ) -> Result<(), RX8025Error<I2C::Error>> {
        let raw = RX8025DateTime::from_datetime(datetime).map_err(RX8025Error::DateTime)?;
        let data: [u8; 7] = (&raw).into();
        self.write_registers(RegAddr::Seconds, &data).await
    }

    /// Programs Alarm D. It fires once enabled with `enable_alarm_d`.
    pub async fn set_alarm_d(
        &mut self,
        hours: u8,
        minutes: u8,
    ) -> Result<(), RX8025Error<I2C::Error>> {
        let alarm = RX8025AlarmD::from_config(&DailyAlarm { hours, minutes })
            .map_err(RX8025Error::Alarm)?;
        let data: [u8; 2] = (&alarm).into();
        self.write_registers(RegAddr::AlarmDMinutes, &data).await
    }

    /// Reads back the programmed Alarm D.
    pub async fn alarm_d(&mut self) -> Result<DailyAlarm, RX8025Error<I2C::Error>> {
        let mut data = [0; 2];
        self.read_registers(RegAddr::AlarmDMinutes, &mut data).await?;
        Ok(RX8025AlarmD::from(data).to_config())
    }

    /// Sets or clears DALE in Control 1.
    pub async fn enable_alarm_d(&mut self, enable: bool) -> Result<(), RX8025Error<I2C::Error>> {
        self.update_control1(|control| control.set_daily_alarm_enable(enable))
            .await?;
        Ok(())
    }

    /// Whether Alarm D has fired since its flag was last cleared.
    pub async fn alarm_d_flag(&mut self) -> Result<bool, RX8025Error<I2C::Error>> {
        Ok(self.control2().await?.daily_alarm_flag())
    }

    /// Clears the Alarm D flag, leaving the other flags as they are.
    pub async fn clear_alarm_d_flag(&mut self) -> Result<(), RX8025Error<I2C::Error>> {
        self.update_control2(|control| control.set_daily_alarm_flag(false))
            .await?;
        Ok(())
    }

    /// Programs Alarm W for the days in `weekdays`.
    ///
    /// `WeekdayMask::default()` selects every day.
    pub async fn set_alarm_w(
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
        self.write_registers(RegAddr::AlarmWMinutes, &data).await
    }

    /// Reads back the programmed Alarm W.
    pub async fn alarm_w(&mut self) -> Result<WeeklyAlarm, RX8025Error<I2C::Error>> {
        let mut data = [0; 3];
        self.read_registers(RegAddr::AlarmWMinutes, &mut data).await?;
        Ok(RX8025AlarmW::from(data).to_config())
    }

    /// Sets or clears WALE in Control 1.
    pub async fn enable_alarm_w(&mut self, enable: bool) -> Result<(), RX8025Error<I2C::Error>> {
        self.update_control1(|control| control.set_weekly_alarm_enable(enable))
            .await?;
        Ok(())
    }

    /// Whether Alarm W has fired since its flag was last cleared.
    pub async fn alarm_w_flag(&mut self) -> Result<bool, RX8025Error<I2C::Error>> {
        Ok(self.control2().await?.weekly_alarm_flag())
    }

    /// Clears the Alarm W flag, leaving the other flags as they are.
    pub async fn clear_alarm_w_flag(&mut self) -> Result<(), RX8025Error<I2C::Error>> {
        self.update_control2(|control| control.set_weekly_alarm_flag(false))
            .await?;
        Ok(())
    }

    /// Selects the periodic interrupt cycle.
    pub async fn set_cycle_timer(
        &mut self,
        period: CyclePeriod,
    ) -> Result<(), RX8025Error<I2C::Error>> {
        self.update_control1(|control| control.set_cycle_period(period))
            .await?;
        Ok(())
    }

    /// Reads the selected periodic interrupt cycle.
    pub async fn cycle_timer(&mut self) -> Result<CyclePeriod, RX8025Error<I2C::Error>> {
        Ok(self.control1().await?.cycle_period())
    }

    /// Sets or clears the periodic timer enable bit in Control 2.
    pub async fn enable_cycle_timer(
        &mut self,
        enable: bool,
    ) -> Result<(), RX8025Error<I2C::Error>> {
        self.update_control2(|control| control.set_cycle_timer_enable(enable))
            .await?;
        Ok(())
    }

    /// Whether the periodic timer has fired since its flag was last cleared.
    pub async fn cycle_timer_flag(&mut self) -> Result<bool, RX8025Error<I2C::Error>> {
        Ok(self.control2().await?.cycle_timer_flag())
    }

    /// Clears the periodic timer flag, leaving the other flags as they are.
    pub async fn clear_cycle_timer_flag(&mut self) -> Result<(), RX8025Error<I2C::Error>> {
        self.update_control2(|control| control.set_cycle_timer_flag(false))
            .await?;
        Ok(())
    }

    /// Whether the supply dropped below the detection threshold since the
    /// flag was last cleared.
    pub async fn voltage_low(&mut self) -> Result<bool, RX8025Error<I2C::Error>> {
        Ok(self.control2().await?.voltage_low())
    }

    /// Clears the voltage low flag, leaving the other flags as they are.
    pub async fn clear_voltage_low(&mut self) -> Result<(), RX8025Error<I2C::Error>> {
        self.update_control2(|control| control.set_voltage_low(false))
            .await?;
        Ok(())
    }

    /// Raw Control 1 byte.
    pub async fn read_status1(&mut self) -> Result<u8, RX8025Error<I2C::Error>> {
        Ok(self.control1().await?.into())
    }

    /// Raw Control 2 byte.
    pub async fn read_status2(&mut self) -> Result<u8, RX8025Error<I2C::Error>> {
        Ok(self.control2().await?.into())
    }
}

// Register access implementations
macro_rules! impl_register_access {
    ($(($name:ident, $regaddr:expr, $typ:ty)),+) => {
        impl<I2C: I2c> RX8025<I2C> {
            $(
                paste! {
                    #[doc = concat!("Gets the value of the ", stringify!($name), " register.")]
                    pub async fn $name(&mut self) -> Result<$typ, RX8025Error<I2C::Error>> {
                        let mut data = [0];
                        self.i2c
                            .write_read(self.address, &[$regaddr.command()], &mut data)
                            .await?;
                        Ok(<$typ>::from(data[0]))
                    }

                    #[doc = concat!("Sets the value of the ", stringify!($name), " register.")]
                    pub async fn [<set_ $name>](&mut self, value: $typ) -> Result<(), RX8025Error<I2C::Error>> {
                        self.i2c.write(
                            self.address,
                            &[$regaddr.command(), value.into()],
                        ).await?;
                        Ok(())
                    }
                }
            )+
        }
    }
}

impl_register_access!(
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

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, NaiveDate, Timelike};
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTrans};

    const DEVICE_ADDRESS: u8 = crate::DEFAULT_ADDRESS;

    fn setup_mock(expectations: &[I2cTrans]) -> I2cMock {
        I2cMock::new(expectations)
    }

    #[tokio::test]
    async fn test_async_initialize() {
        let mock = setup_mock(&[
            I2cTrans::write_read(DEVICE_ADDRESS, vec![0xE0], vec![0x20]),
            I2cTrans::write(DEVICE_ADDRESS, vec![0xE0, 0x00]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![0x00], vec![0x00, 0x00, 0x12]),
        ]);
        let mut dev = RX8025::new(mock, DEVICE_ADDRESS);
        dev.initialize().await.unwrap();
        dev.i2c.done();
    }

    #[tokio::test]
    async fn test_async_initialize_skips_mode_on_write_failure() {
        let mock = setup_mock(&[
            I2cTrans::write_read(DEVICE_ADDRESS, vec![0xE0], vec![0x20]),
            I2cTrans::write(DEVICE_ADDRESS, vec![0xE0, 0x00]).with_error(ErrorKind::Other),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![0x00], vec![0x00, 0x30, 0x15]),
        ]);
        let mut dev = RX8025::new(mock, DEVICE_ADDRESS);
        assert!(dev.initialize().await.is_ok());
        dev.i2c.done();
    }

    #[tokio::test]
    async fn test_async_time_and_date() {
        let mock = setup_mock(&[
            I2cTrans::write(DEVICE_ADDRESS, vec![0x00, 0x45, 0x59, 0x23]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![0x00], vec![0x45, 0x59, 0x23]),
            I2cTrans::write(DEVICE_ADDRESS, vec![0x30, 0x01, 0x01, 0x01, 0x24]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![0x30], vec![0x01, 0x01, 0x01, 0x24]),
        ]);
        let mut dev = RX8025::new(mock, DEVICE_ADDRESS);
        dev.set_time(23, 59, 45).await.unwrap();
        assert_eq!(dev.time().await.unwrap(), Time::new(23, 59, 45).unwrap());
        dev.set_date(24, 1, 1).await.unwrap();
        let date = dev.date().await.unwrap();
        assert_eq!(date.weekday, 1);
        assert_eq!((date.year, date.month, date.day), (24, 1, 1));
        dev.i2c.done();
    }

    #[tokio::test]
    async fn test_async_datetime() {
        let dt = NaiveDate::from_ymd_opt(2024, 3, 14)
            .unwrap()
            .and_hms_opt(15, 30, 0)
            .unwrap();
        let registers = vec![0x00, 0x30, 0x15, 0x04, 0x14, 0x03, 0x24];
        let mut write = vec![0x00];
        write.extend_from_slice(&registers);
        let mock = setup_mock(&[
            I2cTrans::write(DEVICE_ADDRESS, write),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![0x00], registers),
        ]);
        let mut dev = RX8025::new(mock, DEVICE_ADDRESS);
        dev.set_datetime(&dt).await.unwrap();
        let read = dev.datetime().await.unwrap();
        assert_eq!(read.year(), 2024);
        assert_eq!(read.hour(), 15);
        assert_eq!(read, dt);
        dev.i2c.done();
    }

    #[tokio::test]
    async fn test_async_alarms() {
        let mock = setup_mock(&[
            I2cTrans::write(DEVICE_ADDRESS, vec![0xB0, 0x00, 0x08]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![0xE0], vec![0x05]),
            I2cTrans::write(DEVICE_ADDRESS, vec![0xE0, 0x45]),
            I2cTrans::write(DEVICE_ADDRESS, vec![0x80, 0x30, 0x09, 0x3E]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![0x80], vec![0x30, 0x09, 0x3E]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![0xE0], vec![0x45]),
            I2cTrans::write(DEVICE_ADDRESS, vec![0xE0, 0xC5]),
        ]);
        let mut dev = RX8025::new(mock, DEVICE_ADDRESS);
        dev.set_alarm_d(8, 0).await.unwrap();
        dev.enable_alarm_d(true).await.unwrap();
        dev.set_alarm_w(9, 30, WeekdayMask::WEEKDAYS).await.unwrap();
        let alarm = dev.alarm_w().await.unwrap();
        assert_eq!(alarm.weekdays, WeekdayMask::WEEKDAYS);
        dev.enable_alarm_w(true).await.unwrap();
        dev.i2c.done();
    }

    #[tokio::test]
    async fn test_async_flags() {
        let mock = setup_mock(&[
            I2cTrans::write_read(DEVICE_ADDRESS, vec![0xF0], vec![0x07]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![0xF0], vec![0x07]),
            I2cTrans::write(DEVICE_ADDRESS, vec![0xF0, 0x05]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![0xF0], vec![0x05]),
        ]);
        let mut dev = RX8025::new(mock, DEVICE_ADDRESS);
        assert!(dev.alarm_w_flag().await.unwrap());
        dev.clear_alarm_w_flag().await.unwrap();
        assert!(!dev.voltage_low().await.unwrap());
        dev.i2c.done();
    }

    #[tokio::test]
    async fn test_async_cycle_timer() {
        let mock = setup_mock(&[
            I2cTrans::write_read(DEVICE_ADDRESS, vec![0xE0], vec![0xC0]),
            I2cTrans::write(DEVICE_ADDRESS, vec![0xE0, 0xC2]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![0xF0], vec![0x00]),
            I2cTrans::write(DEVICE_ADDRESS, vec![0xF0, 0x40]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![0xE0], vec![0xC2]),
        ]);
        let mut dev = RX8025::new(mock, DEVICE_ADDRESS);
        dev.set_cycle_timer(CyclePeriod::Pulse2Hz).await.unwrap();
        dev.enable_cycle_timer(true).await.unwrap();
        assert_eq!(dev.cycle_timer().await.unwrap(), CyclePeriod::Pulse2Hz);
        dev.i2c.done();
    }

    #[tokio::test]
    async fn test_async_write_failure_is_reported() {
        let mock = setup_mock(&[
            I2cTrans::write_read(DEVICE_ADDRESS, vec![0xE0], vec![0x05]),
            I2cTrans::write(DEVICE_ADDRESS, vec![0xE0, 0x85]).with_error(ErrorKind::Other),
        ]);
        let mut dev = RX8025::new(mock, DEVICE_ADDRESS);
        assert!(matches!(
            dev.enable_alarm_w(true).await,
            Err(RX8025Error::I2c(ErrorKind::Other))
        ));
        dev.i2c.done();
    }

    #[tokio::test]
    async fn test_async_configure() {
        let config = Config {
            cycle_period: CyclePeriod::Level1Second,
            cycle_timer_enable: false,
            daily_alarm_enable: false,
            weekly_alarm_enable: true,
        };
        let mock = setup_mock(&[
            I2cTrans::write_read(DEVICE_ADDRESS, vec![0xE0], vec![0x60]),
            I2cTrans::write(DEVICE_ADDRESS, vec![0xE0, 0x84]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![0xF0], vec![0x41]),
            I2cTrans::write(DEVICE_ADDRESS, vec![0xF0, 0x01]),
        ]);
        let mut dev = RX8025::new(mock, DEVICE_ADDRESS);
        dev.configure(&config).await.unwrap();
        dev.i2c.done();
    }
}
