// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::{CriticalSection, cell::MutexCell};

/// Fixed size FIFO queue between interrupt and main context.
///
/// `SIZE` must be a power of two and at most 128.
pub struct Ring<T, const SIZE: usize> {
    buf: [MutexCell<T>; SIZE],
    wr: MutexCell<u8>,
    rd: MutexCell<u8>,
}

impl<T, const SIZE: usize> Ring<T, SIZE> {
    const MASK: u8 = {
        assert!(SIZE.is_power_of_two() && SIZE <= 128);
        (SIZE - 1) as u8
    };

    pub const fn new(buf: [MutexCell<T>; SIZE]) -> Self {
        let _ = Self::MASK;
        Self {
            buf,
            wr: MutexCell::new(0),
            rd: MutexCell::new(0),
        }
    }
}

impl<T: Copy, const SIZE: usize> Ring<T, SIZE> {
    /// Number of queued elements.
    pub fn len(&self, cs: CriticalSection<'_>) -> usize {
        self.wr.get(cs).wrapping_sub(self.rd.get(cs)) as usize
    }

    pub fn is_empty(&self, cs: CriticalSection<'_>) -> bool {
        self.len(cs) == 0
    }

    pub fn is_full(&self, cs: CriticalSection<'_>) -> bool {
        self.len(cs) >= SIZE
    }

    /// Queue a value. Returns `false`, if the queue is full.
    pub fn insert(&self, cs: CriticalSection<'_>, value: T) -> bool {
        if self.is_full(cs) {
            return false;
        }
        let wr = self.wr.get(cs);
        self.buf[(wr & Self::MASK) as usize].set(cs, value);
        self.wr.set(cs, wr.wrapping_add(1));
        true
    }

    /// Dequeue the oldest value.
    pub fn get(&self, cs: CriticalSection<'_>) -> Option<T> {
        if self.is_empty(cs) {
            return None;
        }
        let rd = self.rd.get(cs);
        let value = self.buf[(rd & Self::MASK) as usize].get(cs);
        self.rd.set(cs, rd.wrapping_add(1));
        Some(value)
    }

    /// Drop all queued values.
    pub fn clear(&self, cs: CriticalSection<'_>) {
        self.rd.set(cs, self.wr.get(cs));
    }
}

#[cfg(test)]
#[allow(clippy::undocumented_unsafe_blocks)]
mod test {
    use super::*;

    fn new_ring() -> Ring<u8, 4> {
        Ring::new([const { MutexCell::new(0) }; 4])
    }

    #[test]
    fn test_fifo() {
        let cs = unsafe { CriticalSection::new() };
        let ring = new_ring();

        assert!(ring.is_empty(cs));
        assert_eq!(ring.get(cs), None);

        for b in 1..=4 {
            assert!(ring.insert(cs, b));
        }
        assert!(ring.is_full(cs));
        assert!(!ring.insert(cs, 5));
        assert_eq!(ring.len(cs), 4);

        assert_eq!(ring.get(cs), Some(1));
        assert!(ring.insert(cs, 5));
        for b in 2..=5 {
            assert_eq!(ring.get(cs), Some(b));
        }
        assert_eq!(ring.get(cs), None);
    }

    #[test]
    fn test_index_wrap() {
        let cs = unsafe { CriticalSection::new() };
        let ring = new_ring();

        // Run the u8 indices around a few times.
        for i in 0..1000_u32 {
            assert!(ring.insert(cs, i as u8));
            assert!(ring.insert(cs, (i + 1) as u8));
            assert_eq!(ring.get(cs), Some(i as u8));
            assert_eq!(ring.get(cs), Some((i + 1) as u8));
        }
        assert!(ring.is_empty(cs));
    }

    #[test]
    fn test_clear() {
        let cs = unsafe { CriticalSection::new() };
        let ring = new_ring();

        ring.insert(cs, 1);
        ring.insert(cs, 2);
        ring.clear(cs);
        assert!(ring.is_empty(cs));
        assert_eq!(ring.get(cs), None);
        assert!(ring.insert(cs, 3));
        assert_eq!(ring.get(cs), Some(3));
    }
}

// vim: ts=4 sw=4 expandtab
