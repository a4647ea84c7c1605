// src/master/sync_master/mod.rs

mod io_helpers;
#[cfg(test)]
pub(crate) mod mock;

use crate::common::{
    error::ModbusError,
    frame::{build_request, parse_response, Request, Response, MAX_RESPONSE_LEN},
    hal_traits::{DirectionControl, RtuSerial, RtuTimer},
    timing,
};
use core::time::Duration;

/// Timing of one transaction.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RtuMasterConfig {
    /// Line speed the port was opened with; used for frame timing only.
    pub baud_rate: u32,
    /// Upper bound on the wait for a complete response after the request is sent.
    pub response_timeout: Duration,
    /// Bus silence kept between transactions (t3.5).
    pub frame_silence: Duration,
    /// When set, a partial response followed by this much silence is handed
    /// to the parser as a finished frame instead of waiting out the timeout.
    /// Off by default; host-side USB adapters can deliver bytes in bursts
    /// far more than t3.5 apart.
    pub end_of_frame_silence: Option<Duration>,
    /// Pause between polls of the receive buffer.
    pub poll_interval: Duration,
}

impl RtuMasterConfig {
    pub fn for_baud_rate(baud_rate: u32) -> Self {
        RtuMasterConfig {
            baud_rate,
            frame_silence: timing::inter_frame_delay(baud_rate),
            ..Self::default()
        }
    }

    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    pub fn with_frame_silence(mut self, silence: Duration) -> Self {
        self.frame_silence = silence;
        self
    }

    pub fn with_end_of_frame_silence(mut self, silence: Option<Duration>) -> Self {
        self.end_of_frame_silence = silence;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

impl Default for RtuMasterConfig {
    fn default() -> Self {
        RtuMasterConfig {
            baud_rate: timing::DEFAULT_BAUD_RATE,
            response_timeout: timing::DEFAULT_RESPONSE_TIMEOUT,
            frame_silence: timing::inter_frame_delay(timing::DEFAULT_BAUD_RATE),
            end_of_frame_silence: None,
            poll_interval: timing::DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Where the master is in its current (or last) transaction.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TransactionState {
    Idle,
    Transmitting,
    AwaitingResponse,
    Parsing,
    Complete,
    Failed,
}

/// A Modbus RTU master for SYNCHRONOUS (blocking) transactions.
///
/// Owns the serial link and the transceiver for its whole lifetime, so
/// `execute` taking `&mut self` is what keeps one transaction on the bus at
/// a time. No retries are made; a failed transaction is returned as-is.
#[derive(Debug)]
pub struct RtuMaster<IF, DIR>
where
    IF: RtuSerial + RtuTimer,
    IF::Error: core::fmt::Debug,
    DIR: DirectionControl,
{
    interface: IF,
    transceiver: DIR,
    config: RtuMasterConfig,
    state: TransactionState,
    last_activity_time: Option<IF::Instant>,
}

impl<IF, DIR> RtuMaster<IF, DIR>
where
    IF: RtuSerial + RtuTimer,
    IF::Error: core::fmt::Debug,
    DIR: DirectionControl,
{
    pub fn new(interface: IF, transceiver: DIR, config: RtuMasterConfig) -> Self {
        RtuMaster {
            interface,
            transceiver,
            config,
            state: TransactionState::Idle,
            last_activity_time: None,
        }
    }

    pub fn config(&self) -> &RtuMasterConfig {
        &self.config
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    pub fn transceiver(&self) -> &DIR {
        &self.transceiver
    }

    /// Gives the link and the transceiver back.
    pub fn release(self) -> (IF, DIR) {
        (self.interface, self.transceiver)
    }

    /// Runs one request/response exchange.
    pub fn execute(&mut self, request: &Request) -> Result<Response, ModbusError<IF::Error>> {
        let result = self.execute_transaction(request);
        self.state = if result.is_ok() {
            TransactionState::Complete
        } else {
            TransactionState::Failed
        };
        self.last_activity_time = Some(self.interface.now());
        result
    }

    fn execute_transaction(&mut self, request: &Request) -> Result<Response, ModbusError<IF::Error>> {
        // 1. Quiet bus, empty receive buffer
        self.wait_for_bus_idle();
        self.discard_stale_input()?;

        // 2. Take the bus and send
        self.state = TransactionState::Transmitting;
        if let Err(e) = self.transceiver.enter_transmit() {
            // The driver may be half-enabled. Releasing it is best effort;
            // only the transmit switch error is returned.
            let _ = self.transceiver.enter_receive();
            return Err(e.into());
        }
        let frame = build_request(request);
        let sent = self.send_frame(frame.as_bytes());

        // 3. Release the bus whether or not the send went through
        let released = self.transceiver.enter_receive();
        sent?;
        released?;

        // 4. Collect the answer
        self.state = TransactionState::AwaitingResponse;
        let mut buffer = [0u8; MAX_RESPONSE_LEN];
        let len = self.read_response_frame(request, &mut buffer)?;

        // 5. Validate
        self.state = TransactionState::Parsing;
        parse_response(
            &buffer[..len],
            request.slave().as_u8(),
            request.function_code(),
            request.register_count(),
        )
    }
}
