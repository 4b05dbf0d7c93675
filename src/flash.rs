// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Page-granular flash access contract used by the updater.
//!
//! The updater drives whatever flash driver the target provides through
//! this trait. The model matches STM32-style embedded flash: one global
//! write-protection lock, page-granular erase, aligned double-word
//! programming, and reads that are legal in any lock state.
//!
//! Two kinds of failure are distinguished. Conditions the updater handles
//! (a worn page refusing to erase, a programming fault, a not-erased
//! target) are reported through `bool` returns. Misuse of the contract
//! itself — double lock/unlock, erasing or programming while locked,
//! addressing outside the managed region — is a caller bug, and
//! implementations panic rather than report it.

use crate::layout::FlashGeometry;

/// Page-granular flash behind a global write-protection lock.
pub trait FlashPages {
    /// Shape of the region this driver manages.
    fn geometry(&self) -> FlashGeometry;

    /// Enable erase/program access.
    ///
    /// Unlocking an already-unlocked device is a caller bug and panics.
    fn unlock(&mut self);

    /// Restore write protection.
    ///
    /// Locking an already-locked device is a caller bug and panics. Pages
    /// erased while unlocked lose their programmable status once the device
    /// is locked again.
    fn lock(&mut self);

    /// Erase `count` pages starting at `first_page`, leaving each page
    /// programmable until the next [`lock`](Self::lock).
    ///
    /// Requires the device to be unlocked (panics otherwise). Returns
    /// `false` if the range does not fit the managed region or the erase
    /// operation fails.
    fn erase(&mut self, first_page: usize, count: usize) -> bool;

    /// Program one double word at `offset` bytes from the base of flash.
    ///
    /// Requires the device to be unlocked and `offset` to lie inside the
    /// managed region (panics otherwise). Returns `false` if `offset` is
    /// not aligned to the program word size, if the target page has not
    /// been erased since the last lock, or if programming fails.
    fn program(&mut self, offset: usize, word: u64) -> bool;

    /// Read committed bytes at `offset` into `buf`.
    fn read(&self, offset: usize, buf: &mut [u8]);
}
