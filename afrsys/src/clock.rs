// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Timer and baud rate arithmetic.
//!
//! Everything here is `const`, so that the firmware can compute
//! its register values at compile time.

use crate::error::ConfigError;

/// Timer clock prescaler.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Prescaler {
    Div1,
    Div8,
    Div64,
    Div256,
    Div1024,
}

impl Prescaler {
    pub const fn divisor(&self) -> u32 {
        match self {
            Self::Div1 => 1,
            Self::Div8 => 8,
            Self::Div64 => 64,
            Self::Div256 => 256,
            Self::Div1024 => 1024,
        }
    }
}

/// Counter preload value for an 8 bit overflow timer.
///
/// After loading the counter with the returned value,
/// it overflows after exactly `period_us` microseconds.
pub const fn timer8_reload(
    f_cpu: u32,
    prescaler: Prescaler,
    period_us: u32,
) -> Result<u8, ConfigError> {
    let num = f_cpu as u64 * period_us as u64;
    let den = prescaler.divisor() as u64 * 1_000_000;
    if num % den != 0 {
        return Err(ConfigError::TimerRange);
    }
    let counts = num / den;
    if counts == 0 || counts > 256 {
        return Err(ConfigError::TimerRange);
    }
    Ok((256 - counts) as u8)
}

/// UBRR value for double speed (U2X) asynchronous UART operation.
pub const fn ubrr_double_speed(f_cpu: u32, baud: u32) -> Result<u16, ConfigError> {
    if baud == 0 {
        return Err(ConfigError::BaudRange);
    }
    let div = f_cpu / (8 * baud);
    if div == 0 || div > 0x1000 {
        return Err(ConfigError::BaudRange);
    }
    Ok((div - 1) as u16)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_timer8_reload() {
        // 1 MHz, clk/8, 1 ms -> 125 counts.
        assert_eq!(timer8_reload(1_000_000, Prescaler::Div8, 1000), Ok(131));
        // 16 MHz, clk/64, 1 ms -> 250 counts.
        assert_eq!(timer8_reload(16_000_000, Prescaler::Div64, 1000), Ok(6));
        // Full range.
        assert_eq!(timer8_reload(1_000_000, Prescaler::Div1, 256), Ok(0));
        assert_eq!(timer8_reload(1_000_000, Prescaler::Div1, 1), Ok(255));

        assert_eq!(
            timer8_reload(1_000_000, Prescaler::Div1, 257),
            Err(ConfigError::TimerRange)
        );
        assert_eq!(
            timer8_reload(1_000_000, Prescaler::Div1024, 1),
            Err(ConfigError::TimerRange)
        );
        // 1 MHz, clk/64, 1 ms -> 15.625 counts
        assert_eq!(
            timer8_reload(1_000_000, Prescaler::Div64, 1000),
            Err(ConfigError::TimerRange)
        );
    }

    #[test]
    fn test_ubrr() {
        assert_eq!(ubrr_double_speed(1_000_000, 9600), Ok(12));
        assert_eq!(ubrr_double_speed(16_000_000, 19_200), Ok(103));
        assert_eq!(ubrr_double_speed(1_000_000, 0), Err(ConfigError::BaudRange));
        assert_eq!(
            ubrr_double_speed(1_000_000, 1_000_000),
            Err(ConfigError::BaudRange)
        );
    }

    #[test]
    fn test_prescaler() {
        assert_eq!(Prescaler::Div1.divisor(), 1);
        assert_eq!(Prescaler::Div1024.divisor(), 1024);
    }
}

// vim: ts=4 sw=4 expandtab
