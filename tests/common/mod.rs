// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! RAM-backed flash double with fault injection for updater tests.

#![allow(dead_code)]

use molt::{FlashGeometry, FlashPages, FLASH_PAGE_SIZE, PROGRAM_WORD_SIZE};

/// Total pages in the simulated part (the bootloader region is a prefix).
pub const SIM_PAGES: usize = 64;

/// Fill byte standing in for the resident old bootloader.
pub const OLD_BOOTLOADER_FILL: u8 = 0xA5;

/// In-memory flash mimicking an STM32L4-class part: 64 pages of 2 KiB,
/// aligned 8-byte program words behind a global write lock.
///
/// Erase and program calls are counted (1-based) so tests can make a
/// specific call fail, simulating an interruption at that exact point, or
/// silently corrupt one stored word, simulating a write defect.
pub struct SimFlash {
    memory: Vec<u8>,
    erased: [bool; SIM_PAGES],
    locked: bool,
    pub erase_calls: u32,
    pub program_calls: u32,
    pub unlock_count: u32,
    /// Fail the erase call with this 1-based ordinal.
    pub fail_erase_at: Option<u32>,
    /// Fail the program call with this 1-based ordinal.
    pub fail_program_at: Option<u32>,
    /// Flip the low bit of the word stored at this byte offset; the write
    /// itself still reports success.
    pub corrupt_at: Option<usize>,
}

impl SimFlash {
    pub fn new() -> Self {
        Self {
            memory: vec![OLD_BOOTLOADER_FILL; SIM_PAGES * FLASH_PAGE_SIZE],
            erased: [false; SIM_PAGES],
            locked: true,
            erase_calls: 0,
            program_calls: 0,
            unlock_count: 0,
            fail_erase_at: None,
            fail_program_at: None,
            corrupt_at: None,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn total_size(&self) -> usize {
        self.memory.len()
    }

    /// Copy of `len` committed bytes starting at `offset`.
    pub fn bytes(&self, offset: usize, len: usize) -> Vec<u8> {
        self.memory[offset..offset + len].to_vec()
    }
}

impl FlashPages for SimFlash {
    fn geometry(&self) -> FlashGeometry {
        FlashGeometry::default_new()
    }

    fn unlock(&mut self) {
        assert!(self.locked, "unlock while already unlocked");
        self.locked = false;
        self.unlock_count += 1;
    }

    fn lock(&mut self) {
        assert!(!self.locked, "lock while already locked");
        self.locked = true;
        // Programmable status does not survive relocking.
        self.erased = [false; SIM_PAGES];
    }

    fn erase(&mut self, first_page: usize, count: usize) -> bool {
        assert!(!self.locked, "erase while locked");
        self.erase_calls += 1;
        if self.fail_erase_at == Some(self.erase_calls) {
            return false;
        }
        if first_page + count > SIM_PAGES {
            return false;
        }
        for page in first_page..first_page + count {
            self.erased[page] = true;
            let start = page * FLASH_PAGE_SIZE;
            self.memory[start..start + FLASH_PAGE_SIZE].fill(0xFF);
        }
        true
    }

    fn program(&mut self, offset: usize, word: u64) -> bool {
        assert!(!self.locked, "program while locked");
        assert!(
            offset + PROGRAM_WORD_SIZE <= self.memory.len(),
            "program out of range"
        );
        self.program_calls += 1;
        if self.fail_program_at == Some(self.program_calls) {
            return false;
        }
        if offset % PROGRAM_WORD_SIZE != 0 {
            return false;
        }
        if !self.erased[offset / FLASH_PAGE_SIZE] {
            return false;
        }
        let stored = if self.corrupt_at == Some(offset) {
            word ^ 1
        } else {
            word
        };
        self.memory[offset..offset + PROGRAM_WORD_SIZE].copy_from_slice(&stored.to_le_bytes());
        true
    }

    fn read(&self, offset: usize, buf: &mut [u8]) {
        buf.copy_from_slice(&self.memory[offset..offset + buf.len()]);
    }
}

impl Default for SimFlash {
    fn default() -> Self {
        Self::new()
    }
}

/// Deterministic candidate image of `len` bytes.
pub fn make_image(len: usize) -> Vec<u8> {
    (0..len)
        .map(|i| (i.wrapping_mul(31) ^ (i >> 8)) as u8)
        .collect()
}
