// src/probe/mod.rs

//! Per-parameter polling on top of an [`RtuMaster`].

use core::fmt::Debug;
use tracing::{debug, warn};

use crate::common::{
    address::SlaveAddr,
    error::{ErrorKind, ExceptionCode, ModbusError},
    frame::Request,
    hal_traits::{DirectionControl, RtuSerial, RtuTimer},
    scaling::ParameterTable,
    types::{ParameterId, Reading},
};
use crate::master::RtuMaster;

/// One soil probe on the bus.
///
/// Every call is a single transaction. Failures are folded into the returned
/// [`Reading`] and never retried, so a scheduler above can decide what a
/// missed poll means.
pub struct SoilProbe<IF, DIR>
where
    IF: RtuSerial + RtuTimer,
    IF::Error: Debug,
    DIR: DirectionControl,
{
    master: RtuMaster<IF, DIR>,
    slave: SlaveAddr,
    table: ParameterTable,
}

impl<IF, DIR> SoilProbe<IF, DIR>
where
    IF: RtuSerial + RtuTimer,
    IF::Error: Debug,
    DIR: DirectionControl,
{
    pub fn new(master: RtuMaster<IF, DIR>, slave: SlaveAddr, table: ParameterTable) -> Self {
        SoilProbe { master, slave, table }
    }

    pub fn slave(&self) -> SlaveAddr {
        self.slave
    }

    pub fn table(&self) -> &ParameterTable {
        &self.table
    }

    /// Gives the master back.
    pub fn release(self) -> RtuMaster<IF, DIR> {
        self.master
    }

    /// Polls one parameter.
    pub fn read(&mut self, parameter: ParameterId) -> Reading {
        let spec = *self.table.spec(parameter);

        let request = match Request::read_holding_registers(self.slave, spec.start_register, spec.register_count) {
            Ok(request) => request,
            Err(e) => {
                warn!(slave = self.slave.as_u8(), %parameter, error = %e, "invalid register map entry");
                return Reading::failed(parameter, e.kind());
            }
        };

        match self.master.execute(&request) {
            Ok(response) => {
                let value = spec.apply(response.registers());
                debug!(
                    slave = self.slave.as_u8(),
                    %parameter,
                    raw = ?response.registers(),
                    value,
                    unit = spec.unit,
                    "reading"
                );
                Reading::ok(parameter, response.registers(), value)
            }
            Err(ModbusError::SlaveException(code)) => {
                let exception = ExceptionCode::from(code);
                warn!(slave = self.slave.as_u8(), %parameter, code, %exception, "slave exception");
                Reading::failed(parameter, ErrorKind::SlaveException(code))
            }
            Err(e) => {
                warn!(slave = self.slave.as_u8(), %parameter, error = ?e, "poll failed");
                Reading::failed(parameter, e.kind())
            }
        }
    }

    /// Polls every parameter in [`ParameterId::ALL`] order, one transaction each.
    pub fn read_all(&mut self) -> [Reading; 6] {
        ParameterId::ALL.map(|parameter| self.read(parameter))
    }
}
