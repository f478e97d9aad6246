//! # RX-8025 Alarm Example for ESP32
//!
//! Sets the clock, arms Alarm D one minute ahead and a weekday-only Alarm W,
//! then prints the time whenever it changes together with the alarm flags
//! and the /INTA pin level.
//!
//! ## Hardware Connections
//! - **SDA**: GPIO23 (I2C Data)
//! - **SCL**: GPIO15 (I2C Clock)
//! - **/INTA**: GPIO22 (Alarm D interrupt, open drain, external pull-up)
//!
//! ## Operation
//! 1. Forces 24-hour mode and turns the periodic interrupt off
//! 2. Sets the time to 2024-12-20 14:30:00 (a Friday)
//! 3. Arms Alarm D for 14:31 and Alarm W for 07:00 on weekdays
//! 4. Every 100ms prints the time when it, a flag or the pin level changes
//! 5. Clears the Alarm D flag once it is seen, which releases /INTA
//!
//! ## Expected Output
//! ```
//! Time: 2024-12-20 14:30:59 | AlarmD: clear | AlarmW: clear | /INTA: HIGH
//! Time: 2024-12-20 14:31:00 | AlarmD: TRIGGERED | AlarmW: clear | /INTA: LOW
//! ALARM D TRIGGERED! Clearing flag...
//! ```

#![no_std]
#![no_main]

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use esp_backtrace as _;
use esp_hal::time::Rate;
use esp_hal::{
    clock::CpuClock,
    gpio::Input,
    i2c::master::{Config as I2cConfig, I2c},
    main,
    time::{Duration, Instant},
};
use log::info;
use rx8025::{Config, CyclePeriod, WeekdayMask, DEFAULT_ADDRESS, RX8025};

#[main]
fn main() -> ! {
    esp_println::logger::init_logger_from_env();

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    info!("RX-8025 Alarm Example Starting...");

    let sda = peripherals.GPIO23;
    let scl = peripherals.GPIO15;

    // /INTA is open drain, fit an external pull-up
    let inta_pin = Input::new(peripherals.GPIO22, Default::default());

    let i2c_config = I2cConfig::default().with_frequency(Rate::from_khz(100));
    let i2c = I2c::new(peripherals.I2C0, i2c_config)
        .unwrap()
        .with_sda(sda)
        .with_scl(scl);

    let mut rtc = RX8025::new(i2c, DEFAULT_ADDRESS);

    if let Err(e) = rtc.initialize() {
        info!("Failed to initialize RX-8025: {:?}", e);
        panic!("RX-8025 initialization failed");
    }

    match rtc.voltage_low() {
        Ok(true) => {
            info!("Supply dropped since the last run, time may be invalid");
            if let Err(e) = rtc.clear_voltage_low() {
                info!("Failed to clear voltage low flag: {:?}", e);
            }
        }
        Ok(false) => {}
        Err(e) => info!("Failed to read voltage low flag: {:?}", e),
    }

    let rtc_config = Config {
        cycle_period: CyclePeriod::Off,
        cycle_timer_enable: false,
        daily_alarm_enable: false,
        weekly_alarm_enable: false,
    };
    match rtc.configure(&rtc_config) {
        Ok(_) => info!("RX-8025 configured successfully"),
        Err(e) => {
            info!("Failed to configure RX-8025: {:?}", e);
            panic!("RX-8025 configuration failed");
        }
    }

    let initial_datetime = NaiveDate::from_ymd_opt(2024, 12, 20)
        .unwrap()
        .and_hms_opt(14, 30, 0)
        .unwrap();
    match rtc.set_datetime(&initial_datetime) {
        Ok(_) => info!(
            "Initial time set to: {}-{:02}-{:02} {:02}:{:02}:{:02}",
            initial_datetime.year(),
            initial_datetime.month(),
            initial_datetime.day(),
            initial_datetime.hour(),
            initial_datetime.minute(),
            initial_datetime.second()
        ),
        Err(e) => {
            info!("Failed to set initial time: {:?}", e);
            panic!("Failed to set initial time");
        }
    }

    match rtc.set_alarm_d(14, 31) {
        Ok(_) => info!("Alarm D set for 14:31"),
        Err(e) => {
            info!("Failed to set Alarm D: {:?}", e);
            panic!("Failed to set Alarm D");
        }
    }
    match rtc.set_alarm_w(7, 0, WeekdayMask::WEEKDAYS) {
        Ok(_) => info!("Alarm W set for 07:00 Monday to Friday"),
        Err(e) => info!("Failed to set Alarm W: {:?}", e),
    }

    // Clear stale flags before enabling, otherwise /INTA may already be low
    if let Err(e) = rtc
        .clear_alarm_d_flag()
        .and_then(|_| rtc.clear_alarm_w_flag())
    {
        info!("Failed to clear alarm flags: {:?}", e);
    }
    if let Err(e) = rtc
        .enable_alarm_d(true)
        .and_then(|_| rtc.enable_alarm_w(true))
    {
        info!("Failed to enable alarms: {:?}", e);
    }

    info!("Starting time monitoring...");

    let mut last_datetime: Option<NaiveDateTime> = None;
    let mut last_alarm_d = false;
    let mut last_pin_level = inta_pin.is_high();

    loop {
        let loop_start = Instant::now();

        match rtc.datetime() {
            Ok(current_time) => {
                let alarm_d = rtc.alarm_d_flag().unwrap_or(false);
                let alarm_w = rtc.alarm_w_flag().unwrap_or(false);
                let pin_level = inta_pin.is_high();

                let changed = last_datetime != Some(current_time)
                    || last_alarm_d != alarm_d
                    || last_pin_level != pin_level;

                if changed {
                    info!(
                        "Time: {}-{:02}-{:02} {:02}:{:02}:{:02} | AlarmD: {} | AlarmW: {} | /INTA: {}",
                        current_time.year(),
                        current_time.month(),
                        current_time.day(),
                        current_time.hour(),
                        current_time.minute(),
                        current_time.second(),
                        if alarm_d { "TRIGGERED" } else { "clear" },
                        if alarm_w { "TRIGGERED" } else { "clear" },
                        if pin_level { "HIGH" } else { "LOW" }
                    );

                    if alarm_d && !last_alarm_d {
                        info!("ALARM D TRIGGERED! Clearing flag...");
                        match rtc.clear_alarm_d_flag() {
                            Ok(_) => info!("Alarm D flag cleared"),
                            Err(e) => info!("Failed to clear Alarm D flag: {:?}", e),
                        }
                    }

                    last_datetime = Some(current_time);
                    last_alarm_d = alarm_d;
                    last_pin_level = pin_level;
                }
            }
            Err(e) => {
                info!("Failed to read time: {:?}", e);
            }
        }

        while loop_start.elapsed() < Duration::from_millis(100) {
            // Busy wait
        }
    }
}
