// src/master/sync_master/mock.rs

//! Simulated RS485 bus for the master's unit tests.
//!
//! One shared `World` holds a virtual clock, the event log and the bytes in
//! flight. The link, both control pins and the settle delay all look at the
//! same world, so the order and timing of everything the master does can be
//! checked after the fact.

use core::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorKind, ErrorType, OutputPin};

use super::{RtuMaster, RtuMasterConfig};
use crate::common::{
    address::SlaveAddr,
    frame::Request,
    hal_traits::{RtuSerial, RtuTimer},
    timing,
    transceiver::{Transceiver, TransceiverConfig},
};

/// Slave turnaround used by [`Reply::immediate`].
const TURNAROUND_US: u64 = 5_000;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct MockCommError;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Event {
    /// DE line driven, with the time.
    DriverEnable(bool, u64),
    /// /RE line driven, with the time.
    ReceiverDisable(bool, u64),
    /// Settle delay finished.
    Settled(u64),
    /// Frame handed to the link.
    Write(u64),
    /// Receive poll that returned bytes.
    Read(u64),
}

/// A scripted slave answer, sent after the next complete request frame.
#[derive(Debug, Clone)]
pub(crate) struct Reply {
    delay_us: u64,
    gap_us: u64,
    bytes: Vec<u8>,
}

impl Reply {
    pub(crate) fn immediate(bytes: &[u8]) -> Self {
        Self::after_us(TURNAROUND_US, bytes)
    }

    pub(crate) fn after_us(delay_us: u64, bytes: &[u8]) -> Self {
        let gap_us = timing::character_duration(timing::DEFAULT_BAUD_RATE).as_micros() as u64;
        Reply { delay_us, gap_us, bytes: bytes.to_vec() }
    }

    /// Answer whose characters are `gap_us` apart.
    pub(crate) fn with_gap(delay_us: u64, gap_us: u64, bytes: &[u8]) -> Self {
        Reply { delay_us, gap_us, bytes: bytes.to_vec() }
    }
}

#[derive(Default)]
struct World {
    now_us: u64,
    events: Vec<Event>,
    incoming: VecDeque<(u64, u8)>,
    script: VecDeque<Reply>,
    written: Vec<u8>,
    write_limit: Option<usize>,
    fail_writes: bool,
    fail_transmit: bool,
    flush_busy_polls: u32,
}

#[derive(Clone)]
pub(crate) struct Bus(Rc<RefCell<World>>);

impl Bus {
    pub(crate) fn new() -> Self {
        Bus(Rc::new(RefCell::new(World::default())))
    }

    /// Master wired to this bus with a real [`Transceiver`] on mock pins.
    pub(crate) fn master(&self, config: RtuMasterConfig) -> RtuMaster<MockLink, Transceiver<MockPin, MockPin, MockDelay>> {
        let transceiver = Transceiver::new(
            MockPin { bus: self.clone(), is_de: true },
            MockPin { bus: self.clone(), is_de: false },
            MockDelay { bus: self.clone() },
            TransceiverConfig::default(),
        )
        .unwrap();
        self.0.borrow_mut().events.clear();
        RtuMaster::new(MockLink { bus: self.clone() }, transceiver, config)
    }

    pub(crate) fn script(&self, reply: Reply) {
        self.0.borrow_mut().script.push_back(reply);
    }

    /// Bytes that are already sitting in the receive buffer.
    pub(crate) fn push_incoming(&self, bytes: &[u8]) {
        let mut w = self.0.borrow_mut();
        let now = w.now_us;
        w.incoming.extend(bytes.iter().map(|b| (now, *b)));
    }

    pub(crate) fn limit_write(&self, n: usize) {
        self.0.borrow_mut().write_limit = Some(n);
    }

    pub(crate) fn fail_writes(&self) {
        self.0.borrow_mut().fail_writes = true;
    }

    pub(crate) fn fail_transmit_switch(&self) {
        self.0.borrow_mut().fail_transmit = true;
    }

    pub(crate) fn flush_busy_for(&self, polls: u32) {
        self.0.borrow_mut().flush_busy_polls = polls;
    }

    pub(crate) fn advance_us(&self, us: u64) {
        self.0.borrow_mut().now_us += us;
    }

    pub(crate) fn now_us(&self) -> u64 {
        self.0.borrow().now_us
    }

    pub(crate) fn written(&self) -> Vec<u8> {
        self.0.borrow().written.clone()
    }

    pub(crate) fn events(&self) -> Vec<Event> {
        self.0.borrow().events.clone()
    }

    pub(crate) fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.0.borrow().events.iter().filter(|e| pred(*e)).count()
    }

    pub(crate) fn pending_incoming(&self) -> usize {
        self.0.borrow().incoming.len()
    }
}

// --- Mock Instant ---
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct MockInstant(u64);
impl core::ops::Add<core::time::Duration> for MockInstant {
    type Output = Self;
    fn add(self, rhs: core::time::Duration) -> Self {
        MockInstant(self.0.saturating_add(rhs.as_micros() as u64))
    }
}
impl core::ops::Sub<MockInstant> for MockInstant {
    type Output = core::time::Duration;
    fn sub(self, rhs: MockInstant) -> core::time::Duration {
        core::time::Duration::from_micros(self.0.saturating_sub(rhs.0))
    }
}

// --- Mock Link ---
pub(crate) struct MockLink {
    bus: Bus,
}

impl RtuTimer for MockLink {
    type Instant = MockInstant;
    fn now(&self) -> Self::Instant {
        MockInstant(self.bus.now_us())
    }
    fn delay_us(&mut self, us: u32) {
        self.bus.advance_us(us as u64);
    }
    fn delay_ms(&mut self, ms: u32) {
        self.bus.advance_us(ms as u64 * 1_000);
    }
}

impl RtuSerial for MockLink {
    type Error = MockCommError;

    fn write(&mut self, bytes: &[u8]) -> Result<usize, Self::Error> {
        let mut w = self.bus.0.borrow_mut();
        if w.fail_writes {
            return Err(MockCommError);
        }
        let now = w.now_us;
        w.events.push(Event::Write(now));
        let accepted = w.write_limit.map_or(bytes.len(), |l| l.min(bytes.len()));
        w.written.extend_from_slice(&bytes[..accepted]);

        // Only a complete request gets an answer.
        if accepted == bytes.len() {
            if let Some(reply) = w.script.pop_front() {
                let on_wire = timing::frame_duration(timing::DEFAULT_BAUD_RATE, bytes.len()).as_micros() as u64;
                let first = now + on_wire + reply.delay_us;
                for (i, b) in reply.bytes.iter().enumerate() {
                    w.incoming.push_back((first + i as u64 * reply.gap_us, *b));
                }
            }
        }
        Ok(accepted)
    }

    fn read_available(&mut self, buf: &mut [u8]) -> nb::Result<usize, Self::Error> {
        let mut w = self.bus.0.borrow_mut();
        let now = w.now_us;
        let mut n = 0;
        while n < buf.len() {
            let ready = matches!(w.incoming.front(), Some(&(at, _)) if at <= now);
            if !ready {
                break;
            }
            if let Some((_, b)) = w.incoming.pop_front() {
                buf[n] = b;
                n += 1;
            }
        }
        if n == 0 {
            return Err(nb::Error::WouldBlock);
        }
        w.events.push(Event::Read(now));
        Ok(n)
    }

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        let mut w = self.bus.0.borrow_mut();
        if w.flush_busy_polls > 0 {
            w.flush_busy_polls -= 1;
            return Err(nb::Error::WouldBlock);
        }
        Ok(())
    }
}

// --- Mock Pins ---
pub(crate) struct MockPin {
    bus: Bus,
    is_de: bool,
}

#[derive(Debug)]
pub(crate) struct MockPinError;
impl embedded_hal::digital::Error for MockPinError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

impl ErrorType for MockPin {
    type Error = MockPinError;
}

impl MockPin {
    fn drive(&mut self, high: bool) -> Result<(), MockPinError> {
        let mut w = self.bus.0.borrow_mut();
        if high && self.is_de && w.fail_transmit {
            return Err(MockPinError);
        }
        let now = w.now_us;
        let ev = if self.is_de {
            Event::DriverEnable(high, now)
        } else {
            Event::ReceiverDisable(high, now)
        };
        w.events.push(ev);
        Ok(())
    }
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.drive(false)
    }
    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.drive(true)
    }
}

// --- Mock Delay ---
pub(crate) struct MockDelay {
    bus: Bus,
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.delay_us(ns.div_ceil(1_000));
    }
    fn delay_us(&mut self, us: u32) {
        let mut w = self.bus.0.borrow_mut();
        w.now_us += us as u64;
        let now = w.now_us;
        w.events.push(Event::Settled(now));
    }
}

pub(crate) fn addr(a: u8) -> SlaveAddr {
    SlaveAddr::new(a).unwrap()
}

pub(crate) fn request(slave: u8, start: u16, count: u16) -> Request {
    Request::read_holding_registers(addr(slave), start, count).unwrap()
}
