//! APIs for talking to individual devices that live at fixed bus addresses.

use bus::{BusFault, SlaveAddress};

/// An indirection between per-device handles and whatever arbitrates the bus
/// behind them. Every operation is one whole transaction; the implementor is
/// responsible for holding its lock from start through stop.
pub trait DeviceAccess {
    /// Run a single-byte write transaction against `address`.
    fn device_write(&self, address: SlaveAddress, data: u8) -> Result<(), BusFault>;

    /// Run a single-byte read transaction against `address`.
    fn device_read(&self, address: SlaveAddress) -> Result<u8, BusFault>;

    /// Run a write transaction that sends an internal register index
    /// followed by the value for it.
    fn device_write_register(
        &self,
        address: SlaveAddress,
        register: u8,
        value: u8,
    ) -> Result<(), BusFault>;
}

/// A handle to one device on the bus, bound to its address. Handles can be
/// owned by independent parts of an application; each operation is a whole
/// transaction arbitrated by the adapter the handle was issued from.
pub struct Device<'bus, A: DeviceAccess> {
    access: &'bus A,
    address: SlaveAddress,
}

impl<'bus, A: DeviceAccess> Device<'bus, A> {
    pub(crate) fn new(access: &'bus A, address: SlaveAddress) -> Self {
        Device { access, address }
    }

    /// The bus address this handle is bound to.
    pub fn address(&self) -> SlaveAddress {
        self.address
    }

    /// Write one byte to the device.
    pub fn write(&self, data: u8) -> Result<(), BusFault> {
        self.access.device_write(self.address, data)
    }

    /// Read one byte from the device.
    pub fn read(&self) -> Result<u8, BusFault> {
        self.access.device_read(self.address)
    }

    /// Write `value` into the device's internal register `register`. This is
    /// the register-then-data convention used by register-file peripherals
    /// such as displays and I/O expanders; devices that take bare data
    /// bytes want [`write`](Device::write) instead.
    pub fn write_register(&self, register: u8, value: u8) -> Result<(), BusFault> {
        self.access.device_write_register(self.address, register, value)
    }
}
