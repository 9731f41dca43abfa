// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::{CriticalSection, Mutex};
use core::cell::{Cell, OnceCell};

/// A [Cell] that can only be accessed inside of a critical section.
///
/// This is the storage type for everything that is shared between
/// interrupt context and main context.
pub struct MutexCell<T> {
    inner: Mutex<Cell<T>>,
}

impl<T> MutexCell<T> {
    #[inline]
    pub const fn new(inner: T) -> Self {
        Self {
            inner: Mutex::new(Cell::new(inner)),
        }
    }

    #[inline]
    pub fn replace(&self, cs: CriticalSection<'_>, inner: T) -> T {
        self.inner.borrow(cs).replace(inner)
    }
}

impl<T: Copy> MutexCell<T> {
    #[inline]
    pub fn get(&self, cs: CriticalSection<'_>) -> T {
        self.inner.borrow(cs).get()
    }

    #[inline]
    pub fn set(&self, cs: CriticalSection<'_>, inner: T) {
        self.inner.borrow(cs).set(inner);
    }
}

/// Write-once storage that can only be accessed inside of a critical section.
///
/// Holds peripherals that are handed out during startup and used from
/// both interrupt and main context afterwards.
pub struct MutexOnce<T> {
    inner: Mutex<OnceCell<T>>,
}

impl<T> MutexOnce<T> {
    #[inline]
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(OnceCell::new()),
        }
    }

    /// Store the value.
    ///
    /// Returns the value back, if the cell is already set.
    #[inline]
    pub fn set(&self, cs: CriticalSection<'_>, inner: T) -> Result<(), T> {
        self.inner.borrow(cs).set(inner)
    }

    #[inline]
    pub fn get<'cs>(&'cs self, cs: CriticalSection<'cs>) -> Option<&'cs T> {
        self.inner.borrow(cs).get()
    }
}

impl<T> Default for MutexOnce<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::undocumented_unsafe_blocks)]
mod test {
    use super::*;

    #[test]
    fn test_get_set_replace() {
        let cs = unsafe { CriticalSection::new() };

        let a: MutexCell<u16> = MutexCell::new(42);
        assert_eq!(a.get(cs), 42);

        a.set(cs, 43);
        assert_eq!(a.get(cs), 43);

        assert_eq!(a.replace(cs, 44), 43);
        assert_eq!(a.get(cs), 44);
    }

    #[test]
    fn test_flag_take() {
        let cs = unsafe { CriticalSection::new() };

        let flag = MutexCell::new(false);
        flag.set(cs, true);
        assert!(flag.replace(cs, false));
        assert!(!flag.replace(cs, false));
    }

    #[test]
    fn test_once() {
        let cs = unsafe { CriticalSection::new() };

        let a: MutexOnce<u16> = MutexOnce::new();
        assert_eq!(a.get(cs), None);
        assert_eq!(a.set(cs, 1), Ok(()));
        assert_eq!(a.set(cs, 2), Err(2));
        assert_eq!(a.get(cs), Some(&1));
    }
}

// vim: ts=4 sw=4 expandtab
