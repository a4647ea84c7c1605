// src/common/hal_traits.rs

use super::transceiver::{Direction, TransceiverError};
use core::fmt::Debug;
use core::ops::{Add, Sub};
use core::time::Duration;

/// A monotonic timestamp from an [`RtuTimer`].
pub trait RtuInstant:
    Copy + Ord + Add<Duration, Output = Self> + Sub<Self, Output = Duration>
{
}

impl<T> RtuInstant for T where
    T: Copy + Ord + Add<Duration, Output = T> + Sub<T, Output = Duration>
{
}

/// Clock and delay source used to bound waits on the link.
pub trait RtuTimer {
    type Instant: RtuInstant;

    /// Current time. Must not go backwards.
    fn now(&self) -> Self::Instant;

    /// Delay for at least the specified number of microseconds.
    fn delay_us(&mut self, us: u32);

    /// Delay for at least the specified number of milliseconds.
    fn delay_ms(&mut self, ms: u32);
}

/// Byte-oriented serial link to the RS485 transceiver.
///
/// Port setup (baud rate, 8N1) is done by the caller before the link is
/// handed over.
pub trait RtuSerial {
    /// Associated error type for communication errors.
    type Error: Debug;

    /// Queues `bytes` for transmission, returning how many were accepted.
    ///
    /// Accepting fewer than `bytes.len()` is not retried by the caller; it is
    /// reported as a short write.
    fn write(&mut self, bytes: &[u8]) -> Result<usize, Self::Error>;

    /// Moves whatever has been received into `buf`, returning the count.
    ///
    /// Returns `Err(nb::Error::WouldBlock)` if nothing is available yet.
    fn read_available(&mut self, buf: &mut [u8]) -> nb::Result<usize, Self::Error>;

    /// Waits for queued bytes to leave the shift register.
    ///
    /// Returns `Err(nb::Error::WouldBlock)` while transmission is still in progress.
    fn flush(&mut self) -> nb::Result<(), Self::Error>;
}

/// Switches a half-duplex link between driving and listening.
///
/// [`Transceiver`](super::transceiver::Transceiver) implements this for the
/// usual DE / RE pin pair; boards with auto-direction transceivers can provide
/// their own.
pub trait DirectionControl {
    /// Takes the bus. Returns only after the line is stably driven.
    fn enter_transmit(&mut self) -> Result<(), TransceiverError>;

    /// Releases the bus and listens.
    fn enter_receive(&mut self) -> Result<(), TransceiverError>;

    /// The direction the link is currently in.
    fn direction(&self) -> Direction;
}
