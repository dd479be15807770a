//! This module provides the seam between the transaction engine and the TWI
//! controller hardware. The engine drives the bus exclusively through the
//! [`BusInterface`] trait, so the same state machine runs against the real
//! memory-mapped register block or against a simulated device in unit tests.

use config::BusConfig;
use registers::{BusStatus, Control};

/// The register-level capabilities the transaction engine needs from a TWI
/// controller. One implementor exists per physical bus; handing the same
/// register block to two implementors corrupts bus framing.
pub trait BusInterface {
    /// Program the bus clock from `config`. Called once at driver
    /// initialization; all subsequent bus timing derives from it.
    fn configure(&mut self, config: BusConfig);

    /// Write the control word for `control`, triggering the hardware action
    /// and letting the controller proceed autonomously.
    fn assert_control(&mut self, control: Control);

    /// Block until the controller signals completion of the most recently
    /// asserted action, then return the status code latched in the status
    /// register. This is the engine's sole suspension point.
    fn await_completion(&mut self) -> BusStatus;

    /// Load the next byte to clock out into the data register.
    fn write_data(&mut self, byte: u8);

    /// Read the last received byte out of the data register.
    fn read_data(&mut self) -> u8;
}

// This is here (and has to be pub) for doctests only. It's useless otherwise.
#[doc(hidden)]
pub mod noop {
    use super::BusInterface;
    use config::BusConfig;
    use registers::{BusStatus, Control};

    /// An interface whose imaginary device acknowledges every phase and
    /// answers every read with zero.
    pub struct NoopInterface {
        read_mode: bool,
        address_pending: bool,
        pending: BusStatus,
    }

    impl NoopInterface {
        pub fn new() -> Self {
            NoopInterface {
                read_mode: false,
                address_pending: false,
                pending: BusStatus::NoInfo,
            }
        }
    }

    impl BusInterface for NoopInterface {
        fn configure(&mut self, _config: BusConfig) {}

        fn assert_control(&mut self, control: Control) {
            self.pending = match control {
                Control::Enable | Control::Stop => BusStatus::NoInfo,
                Control::Start => {
                    self.address_pending = true;
                    BusStatus::StartSent
                }
                Control::ClockByte | Control::ClockByteAck => {
                    if self.address_pending {
                        self.address_pending = false;
                        if self.read_mode {
                            BusStatus::AddressReadAcked
                        } else {
                            BusStatus::AddressWriteAcked
                        }
                    } else if !self.read_mode {
                        BusStatus::DataWriteAcked
                    } else if control == Control::ClockByteAck {
                        BusStatus::DataReadAcked
                    } else {
                        BusStatus::DataReadNacked
                    }
                }
            };
        }

        fn await_completion(&mut self) -> BusStatus {
            self.pending
        }

        fn write_data(&mut self, byte: u8) {
            if self.address_pending {
                self.read_mode = byte & 0x01 != 0;
            }
        }

        fn read_data(&mut self) -> u8 {
            0
        }
    }
}

#[cfg(feature = "atmega328p")]
pub mod atmega328p {
    //! The memory-mapped TWI register block of the ATmega328P (shared by the
    //! other megaAVR parts that place TWI at 0xB8).

    use super::BusInterface;
    use config::BusConfig;
    use registers::{BusStatus, Control, ControlWord, TWINT};

    const TWBR: *mut u8 = 0x00B8 as *mut u8;
    const TWSR: *mut u8 = 0x00B9 as *mut u8;
    const TWDR: *mut u8 = 0x00BB as *mut u8;
    const TWCR: *mut u8 = 0x00BC as *mut u8;

    /// A `BusInterface` over the part's real TWI registers.
    ///
    /// The wait for the interrupt flag is an unbounded busy-poll by default,
    /// matching the hardware's own behavior: an absent device cannot stall a
    /// correctly wired bus, but a held-low clock line can. A spin limit turns
    /// that stall into a reportable fault instead.
    pub struct TwiInterface {
        spin_limit: Option<u32>,
    }

    impl TwiInterface {
        /// An interface that polls the interrupt flag indefinitely.
        pub const fn new() -> Self {
            TwiInterface { spin_limit: None }
        }

        /// An interface that gives up after `limit` polls of the interrupt
        /// flag. An exhausted wait yields [`BusStatus::NoInfo`], which the
        /// engine rejects at whatever phase was in flight.
        pub const fn with_spin_limit(limit: u32) -> Self {
            TwiInterface {
                spin_limit: Some(limit),
            }
        }
    }

    impl BusInterface for TwiInterface {
        fn configure(&mut self, config: BusConfig) {
            unsafe {
                TWSR.write_volatile(u8::from(config.prescaler()));
                TWBR.write_volatile(config.bit_rate());
            }
        }

        fn assert_control(&mut self, control: Control) {
            unsafe {
                TWCR.write_volatile(u8::from(ControlWord::from(control)));
            }
        }

        fn await_completion(&mut self) -> BusStatus {
            let mut polls = 0u32;
            while unsafe { TWCR.read_volatile() } & TWINT == 0 {
                polls += 1;
                match self.spin_limit {
                    Some(limit) if polls >= limit => return BusStatus::NoInfo,
                    _ => {}
                }
            }
            BusStatus::from_raw(unsafe { TWSR.read_volatile() })
        }

        fn write_data(&mut self, byte: u8) {
            unsafe {
                TWDR.write_volatile(byte);
            }
        }

        fn read_data(&mut self) -> u8 {
            unsafe { TWDR.read_volatile() }
        }
    }
}
