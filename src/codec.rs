//! Pure register encoding helpers for the RX-8025.
//!
//! Nothing in here touches the bus. The driver builds every command byte and
//! every time, date and alarm field through these functions.

/// Packs a decimal value (0-99) into a BCD byte: tens in the high nibble,
/// units in the low nibble.
///
/// Values above 99 are not representable; callers validate the field range
/// before encoding.
#[must_use]
pub const fn encode_bcd(value: u8) -> u8 {
    ((value / 10) << 4) | (value % 10)
}

/// Unpacks a BCD byte into its decimal value.
///
/// Flag bits sharing the byte (the 12/24h bits of the hours register, for
/// instance) must be masked off by the caller. Nibbles above 9 are not
/// checked; the device never produces them.
#[must_use]
pub const fn decode_bcd(value: u8) -> u8 {
    (value >> 4) * 10 + (value & 0x0F)
}

/// Builds the command byte that starts every transaction.
///
/// The RX-8025 expects the register address in the upper nibble and the
/// transfer mode in the lower nibble, so the two nibbles of the address are
/// exchanged on the wire.
#[must_use]
pub const fn swap_address_nibbles(address: u8) -> u8 {
    ((address & 0x0F) << 4) | ((address & 0xF0) >> 4)
}

/// Day of week (0 = Sunday .. 6 = Saturday) of `2000 + year`-`month`-`day`.
///
/// January and February count as months 13 and 14 of the previous year.
#[must_use]
pub fn weekday_of(year: u8, month: u8, day: u8) -> u8 {
    let mut y = 2000 + u32::from(year);
    let mut m = u32::from(month);
    let d = u32::from(day);
    if m < 3 {
        y -= 1;
        m += 12;
    }
    let w = (y + y / 4 - y / 100 + y / 400 + (13 * m + 8) / 5 + d) % 7;
    // w < 7
    w as u8
}
