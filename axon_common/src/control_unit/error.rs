//! Hardware presence bitflags.
//!
//! The fault monitor polls three units on the I2C bus. A set bit in
//! [`MissingUnits`] means the unit did not answer on the last poll.

use bitflags::bitflags;

use super::state::FaultCode;

bitflags! {
    /// Units that failed the last presence poll.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
    pub struct MissingUnits: u8 {
        /// Left ADC (0x48: LX, LY, LZ, R2).
        const ADS_LEFT  = 0x01;
        /// Right ADC (0x49: X, Y, Z, R1).
        const ADS_RIGHT = 0x02;
        /// PWM driver. **CRITICAL: blocks mode override.**
        const PWM       = 0x04;
    }
}

impl MissingUnits {
    /// Both ADC units.
    pub const ADS_MASK: Self =
        Self::from_bits_truncate(Self::ADS_LEFT.bits() | Self::ADS_RIGHT.bits());

    /// Fault code derived from presence alone.
    ///
    /// None missing → `None`; one → its unit code; two or more → `I2cGeneral`.
    pub fn fault_code(self) -> FaultCode {
        match self.bits().count_ones() {
            0 => FaultCode::None,
            1 if self.contains(Self::ADS_LEFT) => FaultCode::AdsLeft,
            1 if self.contains(Self::ADS_RIGHT) => FaultCode::AdsRight,
            1 => FaultCode::Pca,
            _ => FaultCode::I2cGeneral,
        }
    }

    /// Single-unit codes of the missing units, in display order.
    pub fn unit_codes(self) -> heapless::Vec<FaultCode, 3> {
        let mut codes = heapless::Vec::new();
        for (flag, code) in [
            (Self::ADS_RIGHT, FaultCode::AdsRight),
            (Self::ADS_LEFT, FaultCode::AdsLeft),
            (Self::PWM, FaultCode::Pca),
        ] {
            if self.contains(flag) {
                // capacity equals the number of flags
                let _ = codes.push(code);
            }
        }
        codes
    }

    /// Exactly one ADC absent and the PWM driver present.
    #[inline]
    pub fn is_single_ads_loss(self) -> bool {
        !self.contains(Self::PWM) && self.intersection(Self::ADS_MASK).bits().count_ones() == 1
    }
}

impl Default for MissingUnits {
    fn default() -> Self {
        Self::empty()
    }
}
