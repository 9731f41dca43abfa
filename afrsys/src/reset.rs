// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// MCUCSR power-on reset flag.
pub const PORF: u8 = 1 << 0;
/// MCUCSR external reset flag.
pub const EXTRF: u8 = 1 << 1;
/// MCUCSR brown-out reset flag.
pub const BORF: u8 = 1 << 2;
/// MCUCSR watchdog reset flag.
pub const WDRF: u8 = 1 << 3;

/// Source of the last CPU reset.
#[derive(Copy, Clone, PartialEq, Eq, Debug, derive_more::Display)]
pub enum ResetCause {
    #[display("Power-on Reset")]
    PowerOn,
    #[display("External Reset")]
    External,
    #[display("Brown-Out Reset")]
    BrownOut,
    #[display("Watchdog Reset")]
    Watchdog,
    #[display("UNKNOWN RESET")]
    Unknown,
}

impl ResetCause {
    /// Decode the MCUCSR flags.
    ///
    /// More than one flag may be set. The first one of
    /// power-on, external, brown-out and watchdog wins.
    pub const fn from_mcucsr(mcucsr: u8) -> Self {
        if mcucsr & PORF != 0 {
            Self::PowerOn
        } else if mcucsr & EXTRF != 0 {
            Self::External
        } else if mcucsr & BORF != 0 {
            Self::BrownOut
        } else if mcucsr & WDRF != 0 {
            Self::Watchdog
        } else {
            Self::Unknown
        }
    }

    /// All reset flags of MCUCSR.
    pub const MASK: u8 = PORF | EXTRF | BORF | WDRF;
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_from_mcucsr() {
        assert_eq!(ResetCause::from_mcucsr(PORF), ResetCause::PowerOn);
        assert_eq!(ResetCause::from_mcucsr(EXTRF), ResetCause::External);
        assert_eq!(ResetCause::from_mcucsr(BORF), ResetCause::BrownOut);
        assert_eq!(ResetCause::from_mcucsr(WDRF), ResetCause::Watchdog);
        assert_eq!(ResetCause::from_mcucsr(0), ResetCause::Unknown);
        // JTRF and unrelated bits
        assert_eq!(ResetCause::from_mcucsr(0xF0), ResetCause::Unknown);

        // Priority
        assert_eq!(ResetCause::from_mcucsr(PORF | BORF), ResetCause::PowerOn);
        assert_eq!(ResetCause::from_mcucsr(EXTRF | WDRF), ResetCause::External);
        assert_eq!(ResetCause::from_mcucsr(BORF | WDRF), ResetCause::BrownOut);
        assert_eq!(ResetCause::from_mcucsr(ResetCause::MASK), ResetCause::PowerOn);
    }

    #[test]
    fn test_display() {
        assert_eq!(std::format!("{}", ResetCause::PowerOn), "Power-on Reset");
        assert_eq!(std::format!("{}", ResetCause::Watchdog), "Watchdog Reset");
        assert_eq!(std::format!("{}", ResetCause::Unknown), "UNKNOWN RESET");
    }
}

// vim: ts=4 sw=4 expandtab
