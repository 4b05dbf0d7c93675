// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Fallback vector table parked at the start of page 0 during an update.
//!
//! While the old bootloader is erased and the new one is not yet complete,
//! page 0 holds this minimal table instead of a real vector table. Its
//! reset vector points into the resident application, so a device that
//! loses power mid-update comes back up in application code — able to
//! retry the update — instead of fetching a reset vector from blank flash.

use crate::layout::{
    APP_HARD_FAULT_HANDLER, APP_NMI_HANDLER, APP_RESET_HANDLER, APP_STACK_TOP,
};

/// Cortex-M vector table prefix: initial stack pointer plus the first three
/// exception vectors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BootVector {
    pub stack_pointer: u32,
    pub reset_handler: u32,
    pub nmi_handler: u32,
    pub hard_fault_handler: u32,
}

impl BootVector {
    /// Table redirecting execution into the resident application.
    pub const fn application() -> Self {
        Self {
            stack_pointer: APP_STACK_TOP,
            reset_handler: APP_RESET_HANDLER,
            nmi_handler: APP_NMI_HANDLER,
            hard_fault_handler: APP_HARD_FAULT_HANDLER,
        }
    }

    /// The four vector words in table order.
    pub const fn words(&self) -> [u32; 4] {
        [
            self.stack_pointer,
            self.reset_handler,
            self.nmi_handler,
            self.hard_fault_handler,
        ]
    }

    /// The table packed into the two double words programmed into flash.
    pub const fn program_words(&self) -> [u64; 2] {
        let w = self.words();
        [
            (w[0] as u64) | ((w[1] as u64) << 32),
            (w[2] as u64) | ((w[3] as u64) << 32),
        ]
    }

    /// Byte image of the table as it appears at the start of page 0.
    pub fn as_bytes(&self) -> [u8; 16] {
        let mut bytes = [0u8; 16];
        for (chunk, word) in bytes.chunks_exact_mut(4).zip(self.words()) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        bytes
    }
}
