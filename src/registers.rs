//! The control and status encodings of the TWI controller's register interface.

pub(crate) const TWINT: u8 = 1 << 7;
pub(crate) const TWEA: u8 = 1 << 6;
pub(crate) const TWSTA: u8 = 1 << 5;
pub(crate) const TWSTO: u8 = 1 << 4;
pub(crate) const TWEN: u8 = 1 << 2;

/// Only the upper five bits of the status register carry the transaction
/// status; the low three are the prescaler field and a reserved bit.
pub const STATUS_MASK: u8 = 0xF8;

/// An encoded control word ready to be written to the controller's control
/// register. These are created by conversion from [`Control`]. It is a newtype
/// around `u8` that prevents arbitrary words from being forged and handed to
/// `BusInterface` implementations, which could wedge the controller.
#[derive(PartialEq, Clone, Copy)]
pub struct ControlWord(pub(crate) u8);

impl From<ControlWord> for u8 {
    /// Convert a `ControlWord` into the `u8` written to the control register.
    fn from(word: ControlWord) -> u8 {
        word.0
    }
}

/// A hardware action the controller can be told to perform. Writing the
/// corresponding control word clears the interrupt flag and lets the
/// controller proceed autonomously; completion is signalled back through the
/// status register.
#[derive(PartialEq, Clone, Copy, Debug)]
pub enum Control {
    /// Enable the controller and acknowledgment generation without triggering
    /// any bus activity. Asserted once at initialization.
    Enable,

    /// Assert a START condition and take ownership of the bus.
    Start,

    /// Assert a STOP condition and release the bus.
    Stop,

    /// Clock one byte across the bus. For a transmit phase this sends the
    /// byte in the data register; for a receive phase the incoming byte is
    /// answered with NACK, ending the read.
    ClockByte,

    /// Clock one byte in and answer it with ACK, so the device keeps
    /// transmitting. Only meaningful during a receive phase.
    ClockByteAck,
}

impl From<Control> for ControlWord {
    /// Convert a `Control` action into its control-register encoding.
    fn from(control: Control) -> ControlWord {
        use self::Control::*;
        match control {
            Enable => ControlWord(TWINT | TWEN | TWEA),
            Start => ControlWord(TWINT | TWSTA | TWEN),
            Stop => ControlWord(TWINT | TWSTO | TWEN | TWEA),
            ClockByte => ControlWord(TWINT | TWEN),
            ClockByteAck => ControlWord(TWINT | TWEN | TWEA),
        }
    }
}

/// The status code latched by the controller after each completed bus
/// operation. This is the sole feedback signal the transaction engine acts
/// on; every phase compares the latched code against the one it expects.
///
/// Only the master-mode codes are enumerated. Slave-mode codes surface as
/// [`Other`](BusStatus::Other) carrying the masked raw value, since this
/// driver never places the controller in slave mode.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum BusStatus {
    /// A START condition has been asserted on an idle bus.
    StartSent,
    /// A repeated START condition has been asserted on a bus this controller
    /// already owned.
    RepeatedStartSent,
    /// Address sent with the write bit; the device answered ACK.
    AddressWriteAcked,
    /// Address sent with the write bit; no device answered, or it answered
    /// NACK.
    AddressWriteNacked,
    /// A data byte was transmitted and the device answered ACK.
    DataWriteAcked,
    /// A data byte was transmitted and the device answered NACK.
    DataWriteNacked,
    /// Bus arbitration was lost to another master.
    ArbitrationLost,
    /// Address sent with the read bit; the device answered ACK.
    AddressReadAcked,
    /// Address sent with the read bit; no device answered, or it answered
    /// NACK.
    AddressReadNacked,
    /// A data byte was received and answered with ACK.
    DataReadAcked,
    /// A data byte was received and answered with NACK.
    DataReadNacked,
    /// Illegal START or STOP framing was detected on the bus.
    BusError,
    /// No operation has completed since the interrupt flag was last cleared.
    NoInfo,
    /// Any other (slave-mode) code, kept raw.
    Other(u8),
}

impl BusStatus {
    /// Decode a raw status-register value, masking off the prescaler field.
    pub fn from_raw(raw: u8) -> BusStatus {
        use self::BusStatus::*;
        match raw & STATUS_MASK {
            0x00 => BusError,
            0x08 => StartSent,
            0x10 => RepeatedStartSent,
            0x18 => AddressWriteAcked,
            0x20 => AddressWriteNacked,
            0x28 => DataWriteAcked,
            0x30 => DataWriteNacked,
            0x38 => ArbitrationLost,
            0x40 => AddressReadAcked,
            0x48 => AddressReadNacked,
            0x50 => DataReadAcked,
            0x58 => DataReadNacked,
            0xF8 => NoInfo,
            other => Other(other),
        }
    }

    /// The masked wire value of this status code.
    pub fn raw(self) -> u8 {
        use self::BusStatus::*;
        match self {
            BusError => 0x00,
            StartSent => 0x08,
            RepeatedStartSent => 0x10,
            AddressWriteAcked => 0x18,
            AddressWriteNacked => 0x20,
            DataWriteAcked => 0x28,
            DataWriteNacked => 0x30,
            ArbitrationLost => 0x38,
            AddressReadAcked => 0x40,
            AddressReadNacked => 0x48,
            DataReadAcked => 0x50,
            DataReadNacked => 0x58,
            NoInfo => 0xF8,
            Other(raw) => raw,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_word_start() {
        assert!(ControlWord::from(Control::Start) == ControlWord(0b10100100));
    }

    #[test]
    fn control_word_stop_reenables_acknowledge() {
        assert!(ControlWord::from(Control::Stop) == ControlWord(0b11010100));
    }

    #[test]
    fn control_word_clock_variants_differ_by_ack() {
        let plain = u8::from(ControlWord::from(Control::ClockByte));
        let acked = u8::from(ControlWord::from(Control::ClockByteAck));
        assert_eq!(acked & !plain, TWEA);
    }

    #[test]
    fn status_decode_masks_prescaler_bits() {
        assert_eq!(BusStatus::from_raw(0x5B), BusStatus::DataReadNacked);
        assert_eq!(BusStatus::from_raw(0x1F), BusStatus::AddressWriteAcked);
    }

    #[test]
    fn status_decode_keeps_unknown_codes_raw() {
        assert_eq!(BusStatus::from_raw(0xA8), BusStatus::Other(0xA8));
    }

    #[test]
    fn status_raw_inverts_decode() {
        for code in [0x00u8, 0x08, 0x10, 0x18, 0x20, 0x28, 0x30, 0x38, 0x40, 0x48, 0x50, 0x58, 0xF8]
            .iter()
        {
            assert_eq!(BusStatus::from_raw(*code).raw(), *code);
        }
    }
}
