// src/common/timing.rs

use core::time::Duration;

// Modbus over Serial Line v1.02, Sec 2.5.1.1. At 9600 baud 8N1 a character
// is 10 bits. Above 19200 baud the inter-frame delay is fixed.

/// Default serial speed of the soil sensors.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Bits per character on the wire (start + 8 data + stop).
pub const BITS_PER_CHARACTER: u32 = 10;

/// Fixed t3.5 used above 19200 baud.
pub const FIXED_INTER_FRAME_DELAY: Duration = Duration::from_micros(1750);

/// Time DE must be held before the first start bit. The sensors' reference
/// wiring (MAX485 module) needs about 10 ms.
pub const DEFAULT_TRANSMIT_SETTLE: Duration = Duration::from_millis(10);

/// How long a slave gets to answer once the request is on the wire.
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_millis(500);

/// How often the receive buffer is polled while waiting.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_micros(100);

/// Bound on waiting for the transmit buffer to drain.
pub const FLUSH_TIMEOUT: Duration = Duration::from_millis(20);

/// Duration of one character at `baud_rate`.
pub const fn character_duration(baud_rate: u32) -> Duration {
    let baud = nonzero_baud(baud_rate);
    Duration::from_micros((BITS_PER_CHARACTER as u64 * 1_000_000).div_ceil(baud))
}

/// Modbus t3.5 inter-frame silence at `baud_rate`.
pub const fn inter_frame_delay(baud_rate: u32) -> Duration {
    if baud_rate > 19_200 {
        FIXED_INTER_FRAME_DELAY
    } else {
        // 3.5 characters, rounded up
        let baud = nonzero_baud(baud_rate);
        Duration::from_micros((7 * BITS_PER_CHARACTER as u64 * 1_000_000).div_ceil(2 * baud))
    }
}

/// Time the request frame occupies the wire.
pub const fn frame_duration(baud_rate: u32, frame_len: usize) -> Duration {
    let baud = nonzero_baud(baud_rate);
    Duration::from_micros((frame_len as u64 * BITS_PER_CHARACTER as u64 * 1_000_000).div_ceil(baud))
}

/// `duration` in whole microseconds, saturating at `u32::MAX` for delay calls.
pub fn delay_micros(duration: Duration) -> u32 {
    u32::try_from(duration.as_micros()).unwrap_or(u32::MAX)
}

const fn nonzero_baud(baud_rate: u32) -> u64 {
    if baud_rate == 0 { 1 } else { baud_rate as u64 }
}
