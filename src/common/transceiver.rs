// src/common/transceiver.rs

//! RS485 driver direction control (DE / RE lines).

use core::time::Duration;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{Error as _, ErrorKind, OutputPin};

use super::hal_traits::DirectionControl;
use super::timing;

/// Direction of the half-duplex link.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Direction {
    Transmit,
    Receive,
}

/// Which control line failed.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ControlLine {
    /// Driver enable, active high.
    DriverEnable,
    /// Receiver enable, active low.
    ReceiverEnable,
}

/// A control line could not be driven.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
#[error("failed to drive {line:?} line: {kind:?}")]
pub struct TransceiverError {
    pub line: ControlLine,
    pub kind: ErrorKind,
}

/// Transceiver timing.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransceiverConfig {
    /// Time the driver needs after DE goes high before the first bit.
    pub settle: Duration,
}

impl TransceiverConfig {
    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }
}

impl Default for TransceiverConfig {
    fn default() -> Self {
        TransceiverConfig { settle: timing::DEFAULT_TRANSMIT_SETTLE }
    }
}

/// Drives a MAX485-style transceiver through its DE and /RE pins.
///
/// Transmit raises both lines (driver on, receiver off); receive lowers both.
/// [`direction`](DirectionControl::direction) reports the last switch that
/// completed. A transmit switch that fails part-way drops DE again, so the
/// lines are left in the receive state.
#[derive(Debug)]
pub struct Transceiver<DE, RE, D> {
    de: DE,
    re: RE,
    delay: D,
    config: TransceiverConfig,
    direction: Direction,
}

impl<DE, RE, D> Transceiver<DE, RE, D>
where
    DE: OutputPin,
    RE: OutputPin,
    D: DelayNs,
{
    /// Takes ownership of the lines and puts the link into receive.
    pub fn new(de: DE, re: RE, delay: D, config: TransceiverConfig) -> Result<Self, TransceiverError> {
        let mut transceiver = Transceiver {
            de,
            re,
            delay,
            config,
            direction: Direction::Receive,
        };
        transceiver.drive_receive()?;
        Ok(transceiver)
    }

    pub fn config(&self) -> &TransceiverConfig {
        &self.config
    }

    /// Gives the pins and delay back.
    pub fn release(self) -> (DE, RE, D) {
        (self.de, self.re, self.delay)
    }

    fn drive_receive(&mut self) -> Result<(), TransceiverError> {
        self.de.set_low().map_err(|e| TransceiverError {
            line: ControlLine::DriverEnable,
            kind: e.kind(),
        })?;
        self.re.set_low().map_err(|e| TransceiverError {
            line: ControlLine::ReceiverEnable,
            kind: e.kind(),
        })?;
        self.direction = Direction::Receive;
        Ok(())
    }
}

impl<DE, RE, D> DirectionControl for Transceiver<DE, RE, D>
where
    DE: OutputPin,
    RE: OutputPin,
    D: DelayNs,
{
    fn enter_transmit(&mut self) -> Result<(), TransceiverError> {
        self.de.set_high().map_err(|e| TransceiverError {
            line: ControlLine::DriverEnable,
            kind: e.kind(),
        })?;
        if let Err(e) = self.re.set_high() {
            // Put DE back so the lines still match the reported direction.
            let _ = self.de.set_low();
            return Err(TransceiverError {
                line: ControlLine::ReceiverEnable,
                kind: e.kind(),
            });
        }
        self.direction = Direction::Transmit;
        self.delay.delay_us(timing::delay_micros(self.config.settle));
        Ok(())
    }

    fn enter_receive(&mut self) -> Result<(), TransceiverError> {
        self.drive_receive()
    }

    fn direction(&self) -> Direction {
        self.direction
    }
}
