//! Mutex-guarded shared access to the bus.

use core::marker::PhantomData;

use bus::device::{Device, DeviceAccess};
use bus::{Bus, BusFault, SlaveAddress};
use interface::BusInterface;
use mutex::BusMutex;

/// This adapter captures the [`Bus`] behind a mutual-exclusion primitive and
/// provides a factory for generating [`Device`] handles bound to individual
/// bus addresses. The lock is held for the full start-through-stop extent of
/// every transaction, so handle owners can transact concurrently without
/// interleaving phases on the wire.
pub struct SharedBus<M, BI>(M, PhantomData<BI>)
where
    M: BusMutex<Bus<BI>>,
    BI: BusInterface + Send;

impl<M, BI> SharedBus<M, BI>
where
    M: BusMutex<Bus<BI>>,
    BI: BusInterface + Send,
{
    pub(crate) fn new(bus: Bus<BI>) -> Self {
        SharedBus(M::new(bus), PhantomData)
    }

    /// Create a [`Device`] handle bound to `address`. Panics if `address`
    /// does not fit in 7 bits.
    pub fn device<'bus>(&'bus self, address: u8) -> Device<'bus, Self> {
        Device::new(self, SlaveAddress::new(address))
    }

    /// Run a single-byte write transaction under the lock.
    pub fn write(&self, address: SlaveAddress, data: u8) -> Result<(), BusFault> {
        self.0.lock(|bus| bus.write_transaction(address, data))
    }

    /// Run a single-byte read transaction under the lock.
    pub fn read(&self, address: SlaveAddress) -> Result<u8, BusFault> {
        self.0.lock(|bus| bus.read_transaction(address))
    }

    /// Run `f` with exclusive use of the bus, for transaction shapes the
    /// fixed methods don't cover (multi-byte transfers, phase-level
    /// sequencing). `f` must leave the bus released: every started
    /// transaction ends in [`Bus::stop`] before it returns.
    pub fn transaction<R, F: FnOnce(&mut Bus<BI>) -> R>(&self, f: F) -> R {
        self.0.lock(f)
    }
}

impl<M, BI> DeviceAccess for SharedBus<M, BI>
where
    M: BusMutex<Bus<BI>>,
    BI: BusInterface + Send,
{
    fn device_write(&self, address: SlaveAddress, data: u8) -> Result<(), BusFault> {
        self.0.lock(|bus| bus.write_transaction(address, data))
    }

    fn device_read(&self, address: SlaveAddress) -> Result<u8, BusFault> {
        self.0.lock(|bus| bus.read_transaction(address))
    }

    fn device_write_register(
        &self,
        address: SlaveAddress,
        register: u8,
        value: u8,
    ) -> Result<(), BusFault> {
        self.0.lock(|bus| bus.write_bytes(address, &[register, value]))
    }
}

#[cfg(test)]
mod tests {
    use bus::{Bus, BusFault, BusState, SlaveAddress};
    use interface::test_spy::{SlaveBehavior, TestSpyInterface, WireEvent};
    use mutex::DefaultMutex;
    use policy::Retry;
    use registers::BusStatus;

    #[test]
    fn handles_for_two_devices_share_one_bus() {
        let mut ei = TestSpyInterface::new();
        ei.set_read_value(0x81);
        let mut bus = Bus::new(ei.split());
        bus.initialize();
        let shared = bus.into_shared::<DefaultMutex<_>>();

        let display = shared.device(0x27);
        let expander = shared.device(0x08);

        assert_eq!(display.write(0x0F), Ok(()));
        assert_eq!(expander.read(), Ok(0x81));
        assert_eq!(
            ei.events(),
            vec![
                WireEvent::Start,
                WireEvent::Byte(0x4E),
                WireEvent::Byte(0x0F),
                WireEvent::Stop,
                WireEvent::Start,
                WireEvent::Byte(0x11),
                WireEvent::ReadByte(0x81, true),
                WireEvent::Stop,
            ]
        );
    }

    #[test]
    fn register_write_is_one_two_byte_transaction() {
        let ei = TestSpyInterface::new();
        let mut bus = Bus::new(ei.split());
        bus.initialize();
        let shared = bus.into_shared::<DefaultMutex<_>>();

        assert_eq!(shared.device(0x3C).write_register(0x00, 0xAF), Ok(()));
        assert_eq!(
            ei.events(),
            vec![
                WireEvent::Start,
                WireEvent::Byte(0x78),
                WireEvent::Byte(0x00),
                WireEvent::Byte(0xAF),
                WireEvent::Stop,
            ]
        );
    }

    #[test]
    fn transaction_closure_gets_the_locked_bus() {
        let mut ei = TestSpyInterface::new();
        ei.set_read_value(0x55);
        let mut bus = Bus::new(ei.split());
        bus.initialize();
        let shared = bus.into_shared::<DefaultMutex<_>>();

        let mut buffer = [0u8; 2];
        let result = shared.transaction(|bus| bus.read_bytes(SlaveAddress::new(0x08), &mut buffer));
        assert_eq!(result, Ok(()));
        assert_eq!(buffer, [0x55, 0x55]);
        assert_eq!(shared.transaction(|bus| bus.state()), BusState::Idle);
    }

    #[test]
    fn retry_policy_recovers_a_busy_device() {
        let ei = TestSpyInterface::with_behavior(SlaveBehavior::NackAddressOnce);
        let mut bus = Bus::new(ei.split());
        bus.initialize();
        let shared = bus.into_shared::<DefaultMutex<_>>();
        let target = SlaveAddress::new(0x50);

        assert_eq!(Retry::new(3).run(|| shared.write(target, 0x19)), Ok(()));
        let events = ei.events();
        let starts = events.iter().filter(|e| **e == WireEvent::Start).count();
        assert_eq!(starts, 2);
    }

    #[test]
    fn retry_policy_reports_the_last_fault() {
        let ei = TestSpyInterface::with_behavior(SlaveBehavior::NackAddress);
        let mut bus = Bus::new(ei.split());
        bus.initialize();
        let shared = bus.into_shared::<DefaultMutex<_>>();

        assert_eq!(
            Retry::new(2).run(|| shared.read(SlaveAddress::new(0x50))),
            Err(BusFault::AddressNack(BusStatus::AddressReadNacked))
        );
    }
}
