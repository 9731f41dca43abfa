// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Line oriented text output to a byte stream.

use core::fmt;

/// Maximum number of payload bytes per line.
/// Everything beyond is dropped.
pub const MSG_MAX: usize = 99;

/// Byte oriented output device such as a UART.
pub trait ByteSink {
    fn write_byte(&mut self, byte: u8);
}

/// Formatter target that writes one line to a [ByteSink].
///
/// Each `\n` is sent as `\r\n`. The line is terminated by [Self::finish].
pub struct LineWriter<S: ByteSink> {
    sink: S,
    count: usize,
    truncated: bool,
}

impl<S: ByteSink> LineWriter<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            count: 0,
            truncated: false,
        }
    }

    /// Whether payload bytes were dropped.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Terminate the line and return the sink.
    pub fn finish(mut self) -> S {
        self.sink.write_byte(b'\r');
        self.sink.write_byte(b'\n');
        self.sink
    }
}

impl<S: ByteSink> fmt::Write for LineWriter<S> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for &byte in s.as_bytes() {
            if self.count >= MSG_MAX {
                self.truncated = true;
                break;
            }
            if byte == b'\n' {
                self.sink.write_byte(b'\r');
            }
            self.sink.write_byte(byte);
            self.count += 1;
        }
        Ok(())
    }
}

/// Write one formatted line.
pub fn write_line<S: ByteSink>(sink: S, args: fmt::Arguments<'_>) -> S {
    let mut w = LineWriter::new(sink);
    // Only a failing Display impl returns an error. The line ends early then.
    let _ = fmt::write(&mut w, args);
    w.finish()
}


// vim: ts=4 sw=4 expandtab
