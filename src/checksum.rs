// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! CRC-32 matching the STM32 hardware CRC peripheral at reset defaults.
//!
//! Polynomial `0x04C11DB7`, initial value `0xFFFFFFFF`, MSB-first with no
//! input/output reflection and no final XOR — the `CRC_32_MPEG_2` algorithm.
//! Because this variant is unreflected with a zero final XOR, the running
//! CRC value *is* the internal state, so a session can be suspended and
//! resumed around flash readback chunks of any size.
//!
//! Verification spans buffers in RAM followed by flash readback, so a
//! streaming session is provided alongside the one-shot helper. Like the
//! hardware unit, at most one session can be open per engine at a time.

use crc::{Crc, CRC_32_MPEG_2};

const CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_MPEG_2);

/// Compute the CRC-32 of a whole buffer in one pass.
pub fn crc32(data: &[u8]) -> u32 {
    CRC32.checksum(data)
}

/// Streaming CRC-32 sessions over discontiguous input.
///
/// Opening a second session, or feeding/closing a session that was never
/// started, is a caller bug and panics; it is never reported as a data
/// error.
#[derive(Clone, Copy, Debug, Default)]
pub struct ChecksumEngine {
    session: Option<u32>,
}

impl ChecksumEngine {
    pub const fn new() -> Self {
        Self { session: None }
    }

    /// One-shot CRC-32 of `data`, independent of any open session.
    pub fn one_shot(&self, data: &[u8]) -> u32 {
        crc32(data)
    }

    /// Open a session seeded with `data`; returns the running value.
    ///
    /// # Panics
    /// Panics if a session is already open.
    pub fn start(&mut self, data: &[u8]) -> u32 {
        assert!(self.session.is_none(), "checksum session already open");
        let current = crc32(data);
        self.session = Some(current);
        current
    }

    /// Feed more bytes into the open session; returns the running value.
    ///
    /// # Panics
    /// Panics if no session is open.
    pub fn accumulate(&mut self, data: &[u8]) -> u32 {
        let current = self.session.expect("checksum session not open");
        let mut digest = CRC32.digest_with_initial(current);
        digest.update(data);
        let current = digest.finalize();
        self.session = Some(current);
        current
    }

    /// Close the open session.
    ///
    /// # Panics
    /// Panics if no session is open.
    pub fn finish(&mut self) {
        assert!(self.session.is_some(), "checksum session not open");
        self.session = None;
    }
}
