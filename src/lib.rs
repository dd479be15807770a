//! Driver library for the two-wire serial interface (TWI) of the megaAVR
//! parts, operated in master mode.
//!
//! The TWI peripheral is an I2C-compatible bus controller. Software drives it
//! by writing control words that trigger one bus action at a time (assert a
//! START condition, clock one byte, assert a STOP condition) and then reading
//! back a status code describing how the action ended: whether the addressed
//! device acknowledged, whether arbitration was lost, whether the framing was
//! legal. This driver packages that status-code handshake into whole
//! transactions with typed faults.
//!
//! The hardware is reached exclusively through the [`BusInterface`] trait, so
//! the same transaction engine runs against the memory-mapped register block
//! of a real part or against a simulated device on a development host.
//!
//! # Construction
//!
//! To set up the driver:
//!
//! - Construct a [`BusInterface`] (on hardware, the `TwiInterface` from
//!   `interface::atmega328p`) which knows how to reach the controller's
//!   registers.
//! - Construct a [`Bus`], which takes ownership of the interface, and
//!   initialize it to program the bus clock.
//!
//! ```ignore
//! let bi = avr_twi::interface::atmega328p::TwiInterface::new();
//! let mut bus = avr_twi::Bus::new(bi);
//! bus.initialize(); // standard-mode 100 kHz
//! ```
//!
//! A non-default clock comes from [`BusConfig`]:
//!
//! ```
//! # let bi = avr_twi::interface::noop::NoopInterface::new();
//! let mut bus = avr_twi::Bus::new(bi);
//! bus.initialize_with(avr_twi::BusConfig::from_frequencies(8_000_000, 100_000));
//! ```
//!
//! # Transactions
//!
//! With an initialized bus, whole transactions are one call each. A fault at
//! any phase aborts the rest of the transaction, and the STOP condition that
//! releases the bus is asserted on every path:
//!
//! ```
//! # fn main() -> Result<(), avr_twi::BusFault> {
//! # let bi = avr_twi::interface::noop::NoopInterface::new();
//! # let mut bus = avr_twi::Bus::new(bi);
//! # bus.initialize();
//! let display = avr_twi::SlaveAddress::new(0x27);
//! let expander = avr_twi::SlaveAddress::new(0x08);
//!
//! bus.write_transaction(display, 0b0100_1111)?;
//! let pins = bus.read_transaction(expander)?;
//! # Ok(())
//! # }
//! ```
//!
//! Multi-byte transfers work the same way through
//! [`write_bytes`](Bus::write_bytes) and [`read_bytes`](Bus::read_bytes),
//! which also back the blocking `embedded_hal::blocking::i2c::Write` and
//! `Read` impls, so device drivers written against those traits run over
//! this bus unmodified.
//!
//! # Phase-level transfers
//!
//! For transaction shapes the composites don't cover, the phase primitives
//! are public. Every started transaction must end in [`stop`](Bus::stop),
//! including after a fault. Capture the result, then release the bus:
//!
//! ```
//! # fn main() -> Result<(), avr_twi::BusFault> {
//! # let bi = avr_twi::interface::noop::NoopInterface::new();
//! # let mut bus = avr_twi::Bus::new(bi);
//! # bus.initialize();
//! let target = avr_twi::SlaveAddress::new(0x50);
//! let result = bus
//!     .start(target, avr_twi::Direction::Write)
//!     .and_then(|_| bus.write_byte(0x00))
//!     .and_then(|_| bus.write_byte(0xA5));
//! bus.stop();
//! # result
//! # }
//! ```
//!
//! # Shared access
//!
//! A bus usually carries more than one device, owned by different parts of
//! an application. [`Bus::into_shared`] wraps the bus in a mutual-exclusion
//! primitive and hands out [`Device`] handles bound to individual addresses;
//! the lock is held for the whole of each transaction, so handle owners can
//! never interleave phases on the wire:
//!
//! ```
//! # fn main() -> Result<(), avr_twi::BusFault> {
//! # let bi = avr_twi::interface::noop::NoopInterface::new();
//! # let mut bus = avr_twi::Bus::new(bi);
//! # bus.initialize();
//! let shared = bus.into_shared::<avr_twi::DefaultMutex<_>>();
//!
//! let display = shared.device(0x27);
//! let expander = shared.device(0x08);
//!
//! display.write_register(0x00, 0x3F)?;
//! let pins = expander.read()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Fault handling
//!
//! Every acknowledgment point is checked. A device that fails to answer, or
//! answers NACK, surfaces as a [`BusFault`] naming the phase and carrying the
//! status code the controller actually latched. The engine never retries on
//! its own; wrap a transaction in a [`Retry`] policy where re-attempting is
//! meaningful:
//!
//! ```
//! # let bi = avr_twi::interface::noop::NoopInterface::new();
//! # let mut bus = avr_twi::Bus::new(bi);
//! # bus.initialize();
//! # let shared = bus.into_shared::<avr_twi::DefaultMutex<_>>();
//! # let eeprom = avr_twi::SlaveAddress::new(0x50);
//! let written = avr_twi::Retry::new(5).run(|| shared.write(eeprom, 0x19));
//! ```
//!
//! # Mutual exclusion
//!
//! The shared adapter requires a mutual-exclusion primitive implementing the
//! [`BusMutex`] trait. In a `std` environment you may enable the `std` Cargo
//! feature, and [`DefaultMutex<T>`] will be a type alias to
//! `std::sync::Mutex<T>` with a provided impl. For AVR targets, enabling the
//! `atmega328p` feature instead aliases `DefaultMutex<T>` to
//! `avr_device::interrupt::Mutex<core::cell::RefCell<T>>`, which locks by
//! masking interrupts for the duration of the transaction. This arrangement
//! should allow you to just specify `DefaultMutex` as in the examples, and
//! have the correct thing happen based on the build environment.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate core;
#[cfg(test)]
extern crate proptest;

#[cfg(feature = "atmega328p")]
extern crate avr_device;
extern crate embedded_hal as hal;

pub mod bus;
pub mod config;
pub mod interface;
pub mod mutex;
pub mod policy;
pub mod registers;

pub use bus::device::{Device, DeviceAccess};
pub use bus::shared::SharedBus;
pub use bus::{Bus, BusFault, BusState, Direction, SlaveAddress};
pub use config::{BusConfig, Prescaler};
pub use interface::BusInterface;
#[cfg(any(feature = "std", feature = "atmega328p"))]
pub use mutex::DefaultMutex;
pub use mutex::BusMutex;
pub use policy::Retry;
pub use registers::{BusStatus, Control, ControlWord};
