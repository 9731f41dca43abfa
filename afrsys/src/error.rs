// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// Invalid static configuration.
///
/// All of these are detected before the scheduler is armed.
/// Const constructors turn them into compile time errors.
#[derive(Copy, Clone, PartialEq, Eq, Debug, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    /// A task period of zero ticks.
    #[display("task period must not be zero")]
    ZeroPeriod,
    /// The least common multiple of all task periods does not fit into the tick counter.
    #[display("task table hyperperiod overflows the tick counter")]
    HyperperiodOverflow,
    /// The requested timer period can't be produced by the 8 bit timer.
    #[display("timer period out of range")]
    TimerRange,
    /// The requested baud rate can't be produced by the UART.
    #[display("baud rate out of range")]
    BaudRange,
}

impl ConfigError {
    /// Abort const evaluation with this error.
    ///
    /// Used by the `const` constructors, so that invalid configuration
    /// in a `static` or `const` item fails the build.
    pub const fn const_panic(self) -> ! {
        match self {
            Self::ZeroPeriod => panic!("task period must not be zero"),
            Self::HyperperiodOverflow => panic!("task table hyperperiod overflows the tick counter"),
            Self::TimerRange => panic!("timer period out of range"),
            Self::BaudRange => panic!("baud rate out of range"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    #[should_panic(expected = "timer period out of range")]
    fn test_const_panic() {
        ConfigError::TimerRange.const_panic();
    }

    #[test]
    fn test_display() {
        assert_eq!(
            std::format!("{}", ConfigError::ZeroPeriod),
            "task period must not be zero"
        );
        assert_eq!(
            std::format!("{}", ConfigError::BaudRange),
            "baud rate out of range"
        );
    }
}

// vim: ts=4 sw=4 expandtab
