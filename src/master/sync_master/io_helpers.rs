// src/master/sync_master/io_helpers.rs

use super::RtuMaster;
use crate::common::{
    error::ModbusError,
    frame::{function_code, Request, EXCEPTION_RESPONSE_LEN, MAX_RESPONSE_LEN},
    hal_traits::{DirectionControl, RtuSerial, RtuTimer},
    timing,
};
use core::fmt::Debug;
use core::time::Duration;
use nb::Result as NbResult;

/// Upper bound on reads spent draining the receive buffer before a request.
const MAX_DISCARD_READS: usize = 64;

impl<IF, DIR> RtuMaster<IF, DIR>
where
    IF: RtuSerial + RtuTimer,
    IF::Error: Debug,
    DIR: DirectionControl,
{
    /// Executes a non-blocking I/O operation (`f`) repeatedly until it
    /// stops returning `WouldBlock`, returning the final result or a timeout error.
    pub(super) fn execute_blocking_io_with_timeout<FN, T>(
        &mut self,
        timeout: Duration,
        mut f: FN,
    ) -> Result<T, ModbusError<IF::Error>>
    where
        FN: FnMut(&mut IF) -> NbResult<T, IF::Error>,
    {
        let deadline = self.interface.now() + timeout;
        let poll_us = timing::delay_micros(self.config.poll_interval);

        loop {
            match f(&mut self.interface) {
                Ok(result) => return Ok(result),
                Err(nb::Error::WouldBlock) => {
                    if self.interface.now() >= deadline {
                        return Err(ModbusError::Timeout);
                    }
                    self.interface.delay_us(poll_us);
                }
                Err(nb::Error::Other(e)) => return Err(ModbusError::Io(e)),
            }
        }
    }

    /// Holds off until the bus has been quiet for a full frame silence since
    /// the previous transaction ended.
    pub(super) fn wait_for_bus_idle(&mut self) {
        if let Some(last_time) = self.last_activity_time {
            let elapsed = self.interface.now() - last_time;
            if elapsed < self.config.frame_silence {
                let remaining = self.config.frame_silence - elapsed;
                self.interface.delay_us(timing::delay_micros(remaining));
            }
        }
    }

    /// Drops anything already sitting in the receive buffer, such as a late
    /// answer to a request that timed out.
    pub(super) fn discard_stale_input(&mut self) -> Result<(), ModbusError<IF::Error>> {
        let mut scratch = [0u8; MAX_RESPONSE_LEN];
        for _ in 0..MAX_DISCARD_READS {
            match self.interface.read_available(&mut scratch) {
                Ok(0) | Err(nb::Error::WouldBlock) => return Ok(()),
                Ok(_) => {}
                Err(nb::Error::Other(e)) => return Err(ModbusError::Io(e)),
            }
        }
        Ok(())
    }

    /// Writes a complete frame and waits for it to leave the transmitter.
    pub(super) fn send_frame(&mut self, frame: &[u8]) -> Result<(), ModbusError<IF::Error>> {
        let written = self.interface.write(frame).map_err(ModbusError::Io)?;
        if written != frame.len() {
            return Err(ModbusError::ShortWrite { written, expected: frame.len() });
        }

        let flush_timeout = timing::frame_duration(self.config.baud_rate, frame.len()) + timing::FLUSH_TIMEOUT;
        self.execute_blocking_io_with_timeout(flush_timeout, |iface| iface.flush())
    }

    /// Collects one response frame into `buffer`, returning its length.
    ///
    /// A frame ends when the expected number of bytes is in or a complete
    /// exception response is in. Anything less by the response deadline is a
    /// timeout, however far the frame got.
    ///
    /// With `end_of_frame_silence` configured, a partial frame followed by
    /// that much silence also ends the read and goes to the parser, which
    /// reports it as short.
    pub(super) fn read_response_frame(
        &mut self,
        request: &Request,
        buffer: &mut [u8],
    ) -> Result<usize, ModbusError<IF::Error>> {
        let expected_len = request.expected_response_len().min(buffer.len());
        let exception_function = request.function_code() | function_code::EXCEPTION_FLAG;
        let deadline = self.interface.now() + self.config.response_timeout;
        let poll_us = timing::delay_micros(self.config.poll_interval);

        let mut received = 0;
        let mut last_byte_time = None;
        loop {
            match self.interface.read_available(&mut buffer[received..expected_len]) {
                Ok(0) | Err(nb::Error::WouldBlock) => {}
                Ok(n) => {
                    received += n;
                    last_byte_time = Some(self.interface.now());

                    if received >= expected_len {
                        return Ok(received);
                    }
                    if received >= EXCEPTION_RESPONSE_LEN && buffer[1] == exception_function {
                        return Ok(received);
                    }
                }
                Err(nb::Error::Other(e)) => return Err(ModbusError::Io(e)),
            }

            let now = self.interface.now();
            if let (Some(silence), Some(last)) = (self.config.end_of_frame_silence, last_byte_time) {
                if now - last >= silence {
                    return Ok(received);
                }
            }
            if now >= deadline {
                return Err(ModbusError::Timeout);
            }
            self.interface.delay_us(poll_us);
        }
    }
}
