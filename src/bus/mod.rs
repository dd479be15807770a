//! The bus handle and master transaction engine. This provides the [`Bus`]
//! type which owns one physical two-wire bus and drives it through the
//! START / address / data / STOP phases of master-mode transactions.

use config::BusConfig;
use hal::blocking::i2c;
use interface::BusInterface;
use mutex::BusMutex;
use registers::{BusStatus, Control};

use bus::shared::SharedBus;

pub mod device;
pub mod shared;

/// Data direction of a transaction, encoded into the low bit of the
/// address-phase byte.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Direction {
    Write,
    Read,
}

/// A 7-bit device address. It is a newtype around `u8` that prevents
/// out-of-range addresses from reaching the address phase, where their top
/// bit would silently land in the direction slot.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct SlaveAddress(u8);

impl SlaveAddress {
    /// Wrap a 7-bit address. Panics if `address` does not fit in 7 bits.
    pub fn new(address: u8) -> SlaveAddress {
        match address {
            0..=0x7F => SlaveAddress(address),
            _ => panic!("bus address {} does not fit in 7 bits", address),
        }
    }

    /// The address-phase byte for a transaction in `direction`.
    pub fn frame(self, direction: Direction) -> u8 {
        (self.0 << 1)
            | match direction {
                Direction::Write => 0,
                Direction::Read => 1,
            }
    }
}

impl From<SlaveAddress> for u8 {
    fn from(address: SlaveAddress) -> u8 {
        address.0
    }
}

/// A fault observed at one phase of a transaction. Variants carry the status
/// code the controller actually latched, for diagnostics.
///
/// A fault aborts the remaining phases of its transaction, but the bus must
/// still be released: the composite transaction methods assert STOP on every
/// path, and callers of the phase-level primitives must call
/// [`Bus::stop`] themselves after a fault.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum BusFault {
    /// The controller did not report a START condition after one was
    /// asserted.
    StartFailed(BusStatus),
    /// No device acknowledged the address phase.
    AddressNack(BusStatus),
    /// The device rejected a written data byte.
    DataNack(BusStatus),
    /// Unexpected status while clocking a byte in.
    ReadError(BusStatus),
    /// Bus arbitration was lost to another master.
    ArbitrationLost,
}

/// Where the engine is within a transaction.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum BusState {
    /// The bus is released; a transaction may be started.
    Idle,
    /// A START condition has been asserted but no address sent.
    Started,
    /// The address phase was acknowledged.
    AddressSent,
    /// At least one data byte has been transferred.
    DataPhase,
    /// A phase observed an unexpected status. The only valid exit is
    /// [`Bus::stop`].
    Faulted,
}

/// Exclusive ownership of one physical two-wire bus.
///
/// The engine is fully synchronous and non-reentrant: no transaction may be
/// interleaved with another, and the single blocking point is the interface's
/// wait for phase completion. For access from multiple owners, convert the
/// bus into a [`SharedBus`] with [`into_shared`](Bus::into_shared).
pub struct Bus<BI: BusInterface> {
    iface: BI,
    state: BusState,
    tx_byte: u8,
    rx_byte: u8,
}

impl<BI: BusInterface> Bus<BI> {
    /// Create a bus handle over `iface`. The hardware is not touched until
    /// [`initialize`](Bus::initialize) is called.
    pub fn new(iface: BI) -> Self {
        Bus {
            iface,
            state: BusState::Idle,
            tx_byte: 0,
            rx_byte: 0,
        }
    }

    /// Program the standard-mode 100 kHz clock and enable the controller.
    /// Idempotent; call once before the first transaction.
    pub fn initialize(&mut self) {
        self.initialize_with(BusConfig::default());
    }

    /// Program the clock from `config` and enable the controller.
    pub fn initialize_with(&mut self, config: BusConfig) {
        self.iface.configure(config);
        self.iface.assert_control(Control::Enable);
    }

    /// The engine's current position in the transaction state machine.
    pub fn state(&self) -> BusState {
        self.state
    }

    /// Begin a transaction: assert START, then send the address phase for
    /// `direction` and check its acknowledgment.
    ///
    /// On `Ok` the addressed device is ready for data phases. On `Err` the
    /// transaction is faulted and the caller must still call
    /// [`stop`](Bus::stop) to release the bus. A repeated START (another
    /// master's STOP never seen) is accepted as a successful start.
    pub fn start(&mut self, address: SlaveAddress, direction: Direction) -> Result<(), BusFault> {
        match self.state {
            BusState::Idle => {}
            _ => panic!("start of a transaction while one is in flight"),
        }

        self.iface.assert_control(Control::Start);
        let status = self.iface.await_completion();
        match status {
            BusStatus::StartSent | BusStatus::RepeatedStartSent => {
                self.state = BusState::Started;
            }
            BusStatus::ArbitrationLost => return self.fault(BusFault::ArbitrationLost),
            other => return self.fault(BusFault::StartFailed(other)),
        }

        self.tx_byte = address.frame(direction);
        self.iface.write_data(self.tx_byte);
        self.iface.assert_control(Control::ClockByte);
        let status = self.iface.await_completion();
        let expected = match direction {
            Direction::Write => BusStatus::AddressWriteAcked,
            Direction::Read => BusStatus::AddressReadAcked,
        };
        if status == expected {
            self.state = BusState::AddressSent;
            Ok(())
        } else if status == BusStatus::ArbitrationLost {
            self.fault(BusFault::ArbitrationLost)
        } else {
            self.fault(BusFault::AddressNack(status))
        }
    }

    /// Clock one data byte out and check its acknowledgment. Requires an
    /// acknowledged address phase in the `Write` direction.
    pub fn write_byte(&mut self, data: u8) -> Result<(), BusFault> {
        self.expect_data_phase();
        self.tx_byte = data;
        self.iface.write_data(self.tx_byte);
        self.iface.assert_control(Control::ClockByte);
        match self.iface.await_completion() {
            BusStatus::DataWriteAcked => {
                self.state = BusState::DataPhase;
                Ok(())
            }
            BusStatus::ArbitrationLost => self.fault(BusFault::ArbitrationLost),
            other => self.fault(BusFault::DataNack(other)),
        }
    }

    /// Clock one data byte in, answering ACK so the device keeps
    /// transmitting. Requires an acknowledged address phase in the `Read`
    /// direction.
    pub fn read_byte(&mut self) -> Result<u8, BusFault> {
        self.clock_byte_in(Control::ClockByteAck, BusStatus::DataReadAcked)
    }

    /// Clock the final data byte of a read in, answering NACK so the device
    /// releases the data line for the STOP condition.
    pub fn read_last_byte(&mut self) -> Result<u8, BusFault> {
        self.clock_byte_in(Control::ClockByte, BusStatus::DataReadNacked)
    }

    /// Assert the STOP condition and release the bus. Fire-and-forget: the
    /// controller completes the condition on its own and no status is
    /// checked. Valid in every state, including after a fault.
    pub fn stop(&mut self) {
        self.iface.assert_control(Control::Stop);
        self.state = BusState::Idle;
    }

    /// Single-byte write transaction: START, address, one data byte, STOP.
    /// STOP is asserted exactly once whether or not a phase faults.
    pub fn write_transaction(&mut self, address: SlaveAddress, data: u8) -> Result<(), BusFault> {
        let result = self
            .start(address, Direction::Write)
            .and_then(|_| self.write_byte(data));
        self.stop();
        result
    }

    /// Single-byte read transaction: START, address, one data byte in, STOP.
    /// STOP is asserted exactly once whether or not a phase faults.
    pub fn read_transaction(&mut self, address: SlaveAddress) -> Result<u8, BusFault> {
        let result = self
            .start(address, Direction::Read)
            .and_then(|_| self.read_byte());
        self.stop();
        result
    }

    /// Write every byte of `data` to `address` in one transaction.
    pub fn write_bytes(&mut self, address: SlaveAddress, data: &[u8]) -> Result<(), BusFault> {
        let result = self
            .start(address, Direction::Write)
            .and_then(|_| data.iter().try_for_each(|&byte| self.write_byte(byte)));
        self.stop();
        result
    }

    /// Fill `buffer` from `address` in one transaction, acknowledging every
    /// byte but the last.
    pub fn read_bytes(&mut self, address: SlaveAddress, buffer: &mut [u8]) -> Result<(), BusFault> {
        let count = buffer.len();
        let result = self.start(address, Direction::Read).and_then(|_| {
            for (index, slot) in buffer.iter_mut().enumerate() {
                *slot = if index + 1 == count {
                    self.read_last_byte()?
                } else {
                    self.read_byte()?
                };
            }
            Ok(())
        });
        self.stop();
        result
    }

    /// Convert this bus into a [`SharedBus`], which arbitrates access from
    /// multiple device handles through a mutual-exclusion primitive.
    pub fn into_shared<M: BusMutex<Bus<BI>>>(self) -> SharedBus<M, BI>
    where
        BI: Send,
    {
        SharedBus::new(self)
    }

    fn clock_byte_in(&mut self, control: Control, expected: BusStatus) -> Result<u8, BusFault> {
        self.expect_data_phase();
        // Null placeholder; the controller clocks the incoming byte over it.
        self.iface.write_data(0x00);
        self.iface.assert_control(control);
        let status = self.iface.await_completion();
        if status == expected {
            self.state = BusState::DataPhase;
            self.rx_byte = self.iface.read_data();
            Ok(self.rx_byte)
        } else if status == BusStatus::ArbitrationLost {
            self.fault(BusFault::ArbitrationLost)
        } else {
            self.fault(BusFault::ReadError(status))
        }
    }

    fn expect_data_phase(&self) {
        match self.state {
            BusState::AddressSent | BusState::DataPhase => {}
            _ => panic!("data phase before an acknowledged address phase"),
        }
    }

    fn fault<T>(&mut self, fault: BusFault) -> Result<T, BusFault> {
        self.state = BusState::Faulted;
        Err(fault)
    }
}

impl<BI: BusInterface> i2c::Write for Bus<BI> {
    type Error = BusFault;

    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), BusFault> {
        self.write_bytes(SlaveAddress::new(address), bytes)
    }
}

impl<BI: BusInterface> i2c::Read for Bus<BI> {
    type Error = BusFault;

    fn read(&mut self, address: u8, buffer: &mut [u8]) -> Result<(), BusFault> {
        self.read_bytes(SlaveAddress::new(address), buffer)
    }
}
