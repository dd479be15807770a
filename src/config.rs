//! Bus clock configuration.

/// The standard-mode bus clock rate, 100 kHz.
pub const STANDARD_MODE_HZ: u32 = 100_000;

/// The reference CPU clock used by [`BusConfig::default`], a 16 MHz part.
pub const DEFAULT_CPU_HZ: u32 = 16_000_000;

/// The clock prescaler field of the status register. Together with the
/// bit-rate divisor it sets the SCL frequency:
/// `cpu_hz / (16 + 2 * bit_rate * prescaler)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Prescaler {
    Div1,
    Div4,
    Div16,
    Div64,
}

impl Prescaler {
    fn divisor(self) -> u32 {
        use self::Prescaler::*;
        match self {
            Div1 => 1,
            Div4 => 4,
            Div16 => 16,
            Div64 => 64,
        }
    }
}

impl From<Prescaler> for u8 {
    /// Convert a `Prescaler` into its status-register field encoding.
    fn from(prescaler: Prescaler) -> u8 {
        use self::Prescaler::*;
        match prescaler {
            Div1 => 0b00,
            Div4 => 0b01,
            Div16 => 0b10,
            Div64 => 0b11,
        }
    }
}

/// The bus clock configuration programmed once at initialization. All bus
/// timing derives from the bit-rate divisor and prescaler chosen here.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BusConfig {
    bit_rate: u8,
    prescaler: Prescaler,
}

impl Default for BusConfig {
    /// Standard-mode 100 kHz on the reference 16 MHz part.
    fn default() -> Self {
        BusConfig::from_frequencies(DEFAULT_CPU_HZ, STANDARD_MODE_HZ)
    }
}

impl BusConfig {
    /// Build a configuration from a raw bit-rate divisor and prescaler.
    pub const fn new(bit_rate: u8, prescaler: Prescaler) -> Self {
        BusConfig {
            bit_rate,
            prescaler,
        }
    }

    /// Derive the divisor for a target `bus_hz` SCL rate on a part clocked at
    /// `cpu_hz`, preferring the smallest prescaler that brings the divisor in
    /// range. Panics if no prescaler can reach the requested rate.
    pub fn from_frequencies(cpu_hz: u32, bus_hz: u32) -> Self {
        use self::Prescaler::*;
        let cycles = (cpu_hz / bus_hz).saturating_sub(16);
        for prescaler in [Div1, Div4, Div16, Div64].iter() {
            let bit_rate = cycles / (2 * prescaler.divisor());
            if bit_rate <= 0xFF {
                return BusConfig::new(bit_rate as u8, *prescaler);
            }
        }
        panic!("{} Hz is not reachable from a {} Hz clock", bus_hz, cpu_hz);
    }

    /// The bit-rate divisor programmed into the bit-rate register.
    pub fn bit_rate(&self) -> u8 {
        self.bit_rate
    }

    /// The prescaler programmed into the status register's prescaler field.
    pub fn prescaler(&self) -> Prescaler {
        self.prescaler
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_mode_on_reference_part() {
        let config = BusConfig::default();
        assert_eq!(config.bit_rate(), 72);
        assert_eq!(config.prescaler(), Prescaler::Div1);
    }

    #[test]
    fn fast_mode_on_reference_part() {
        let config = BusConfig::from_frequencies(16_000_000, 400_000);
        assert_eq!(config.bit_rate(), 12);
        assert_eq!(config.prescaler(), Prescaler::Div1);
    }

    #[test]
    fn slow_bus_escalates_prescaler() {
        let config = BusConfig::from_frequencies(16_000_000, 10_000);
        assert_eq!(config.prescaler(), Prescaler::Div4);
        assert_eq!(config.bit_rate(), 198);
    }

    #[test]
    #[should_panic]
    fn unreachable_rate_panics() {
        BusConfig::from_frequencies(16_000_000, 100);
    }

    #[test]
    fn prescaler_field_encoding() {
        assert_eq!(u8::from(Prescaler::Div1), 0b00);
        assert_eq!(u8::from(Prescaler::Div64), 0b11);
    }
}
