// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

use avr_context::MainCtx;
use core::fmt;

/// Log one line to the UART.
///
/// Compiled out without the `debug` feature.
macro_rules! info {
    ($m:expr, $($arg:tt)*) => {
        $crate::log::log_line($m, format_args!($($arg)*))
    };
}
pub(crate) use info;

#[cfg(feature = "debug")]
struct UartSink;

#[cfg(feature = "debug")]
impl afrsys::log::ByteSink for UartSink {
    #[inline]
    fn write_byte(&mut self, byte: u8) {
        crate::uart::send_byte(byte);
    }
}

/// Write one line. Only from main context, because this blocks until
/// the line is sent.
#[cfg(feature = "debug")]
#[inline(never)]
pub fn log_line(_m: &MainCtx<'_>, args: fmt::Arguments<'_>) {
    afrsys::log::write_line(UartSink, args);
}

#[cfg(not(feature = "debug"))]
#[inline(always)]
pub fn log_line(_m: &MainCtx<'_>, _args: fmt::Arguments<'_>) {}

// vim: ts=4 sw=4 expandtab
