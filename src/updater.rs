// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Staged bootloader replacement, driven from application code.
//!
//! The resident bootloader occupies pages `[0, n)` at the base of flash.
//! Overwriting it is the one operation that can brick the device, so the
//! region is committed in a fixed order:
//!
//! 1. validate the candidate in RAM, before flash is touched
//! 2. erase the region and immediately park the fallback vector table at
//!    the start of page 0
//! 3. program pages `1..n` with the candidate body
//! 4. verify the programmed body against the candidate checksum
//! 5. erase page 0 again and commit the candidate's real first page
//! 6. audit the whole committed region
//!
//! Until step 5 the fallback table keeps the device bootable: a reset lands
//! in the resident application instead of a half-written bootloader. Only
//! step 5 opens a window without a valid entry point, and it is entered
//! only after the rest of the image has verified clean — one page is the
//! smallest exposure this flash allows.

use crate::bootvec::BootVector;
use crate::checksum::ChecksumEngine;
use crate::flash::FlashPages;
use crate::layout::PROGRAM_WORD_SIZE;

/// Bytes of flash read back per chunk while verifying.
const READBACK_CHUNK: usize = 256;

/// Why a bootloader update was rejected or abandoned.
///
/// Validation failures (`CrcMismatch` before any unlock, `LengthInvalid`)
/// leave flash untouched; retry with a corrected image. Erase and program
/// failures abandon the update with the fallback vector table still parked
/// in page 0, so the device stays bootable while the update is retried from
/// scratch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UpdateError {
    /// The candidate image or the committed region failed its CRC-32 check.
    CrcMismatch,
    /// The candidate image is empty or does not fit the bootloader region.
    LengthInvalid,
    /// The flash driver reported an erase failure.
    EraseFailed,
    /// The flash driver reported a programming failure.
    WriteFailed,
}

impl UpdateError {
    /// Stable diagnostic text, one fixed string per failure.
    pub const fn message(&self) -> &'static str {
        match self {
            Self::CrcMismatch => "Firmware CRC32 failed",
            Self::LengthInvalid => "Firmware image length is incorrect",
            Self::EraseFailed => "Erasing Flash failed",
            Self::WriteFailed => "Writing to Flash failed",
        }
    }
}

impl core::fmt::Display for UpdateError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.message())
    }
}

#[cfg(feature = "std")]
impl std::error::Error for UpdateError {}

/// Scoped unlock: flash is relocked when the guard drops, on success and on
/// every early return alike.
struct UnlockedFlash<'a, F: FlashPages> {
    flash: &'a mut F,
}

impl<'a, F: FlashPages> UnlockedFlash<'a, F> {
    fn new(flash: &'a mut F) -> Self {
        flash.unlock();
        Self { flash }
    }

    fn erase(&mut self, first_page: usize, count: usize) -> Result<(), UpdateError> {
        if self.flash.erase(first_page, count) {
            Ok(())
        } else {
            Err(UpdateError::EraseFailed)
        }
    }

    fn program(&mut self, offset: usize, word: u64) -> Result<(), UpdateError> {
        if self.flash.program(offset, word) {
            Ok(())
        } else {
            Err(UpdateError::WriteFailed)
        }
    }
}

impl<F: FlashPages> Drop for UnlockedFlash<'_, F> {
    fn drop(&mut self) {
        self.flash.lock();
    }
}

/// Program `image[start..end]` into flash at the same byte offsets, one
/// double word at a time. A trailing partial word is padded with `0xFF`,
/// the erased state.
fn program_range<F: FlashPages>(
    flash: &mut UnlockedFlash<'_, F>,
    image: &[u8],
    start: usize,
    end: usize,
) -> Result<(), UpdateError> {
    let mut offset = start;
    for chunk in image[start..end].chunks(PROGRAM_WORD_SIZE) {
        let mut word = [0xFFu8; PROGRAM_WORD_SIZE];
        word[..chunk.len()].copy_from_slice(chunk);
        flash.program(offset, u64::from_le_bytes(word))?;
        offset += PROGRAM_WORD_SIZE;
    }
    Ok(())
}

/// CRC-32 spanning `head` (from RAM) followed by `len` bytes of flash
/// readback starting at `offset`.
fn committed_crc<F: FlashPages>(
    engine: &mut ChecksumEngine,
    flash: &F,
    head: &[u8],
    mut offset: usize,
    mut len: usize,
) -> u32 {
    let mut crc = engine.start(head);
    let mut chunk = [0u8; READBACK_CHUNK];
    while len > 0 {
        let n = len.min(READBACK_CHUNK);
        flash.read(offset, &mut chunk[..n]);
        crc = engine.accumulate(&chunk[..n]);
        offset += n;
        len -= n;
    }
    engine.finish();
    crc
}

/// Replace the resident bootloader with `image`, whose CRC-32 must equal
/// `expected_crc`.
///
/// Runs synchronously to completion. Flash must be locked on entry and is
/// locked again on every return path. On `Err` the flash contents depend on
/// how far the update got (see [`UpdateError`]), but outside the final
/// page 0 commit the device keeps a valid entry point throughout.
pub fn update_bootloader<F: FlashPages>(
    flash: &mut F,
    engine: &mut ChecksumEngine,
    image: &[u8],
    expected_crc: u32,
) -> Result<(), UpdateError> {
    let geometry = flash.geometry();
    let page_size = geometry.page_size;

    // Validate the candidate before any flash is touched.
    if engine.one_shot(image) != expected_crc {
        #[cfg(feature = "defmt")]
        defmt::warn!("update rejected: candidate CRC32 mismatch");
        return Err(UpdateError::CrcMismatch);
    }

    let pages = geometry.pages_for(image.len());
    if pages == 0 || pages > geometry.bootloader_pages {
        #[cfg(feature = "defmt")]
        defmt::warn!("update rejected: {} bytes for {} pages", image.len(), geometry.bootloader_pages);
        return Err(UpdateError::LengthInvalid);
    }

    let head_len = page_size.min(image.len());

    // Erase the whole region, then park the fallback table at the start of
    // page 0 so an interrupted update still resets into the application.
    // The body follows; page 0's real contents are withheld until last.
    {
        let mut unlocked = UnlockedFlash::new(flash);
        unlocked.erase(0, pages)?;

        let fallback = BootVector::application();
        for (i, word) in fallback.program_words().iter().enumerate() {
            unlocked.program(i * PROGRAM_WORD_SIZE, *word)?;
        }

        program_range(&mut unlocked, image, head_len, image.len())?;
    }

    // Verify what reached flash: the candidate's first page from RAM,
    // everything after it read back from the device.
    let tail_len = image.len() - head_len;
    let crc = committed_crc(engine, flash, &image[..head_len], page_size, tail_len);
    if crc != expected_crc {
        #[cfg(feature = "defmt")]
        defmt::warn!("update abandoned: programmed body failed CRC32");
        return Err(UpdateError::CrcMismatch);
    }

    // Commit page 0 with the real first page, retiring the fallback table.
    {
        let mut unlocked = UnlockedFlash::new(flash);
        unlocked.erase(0, 1)?;
        program_range(&mut unlocked, image, 0, head_len)?;
    }

    // Final audit over the committed region.
    let crc = committed_crc(engine, flash, &[], 0, image.len());
    if crc != expected_crc {
        #[cfg(feature = "defmt")]
        defmt::error!("committed bootloader failed final CRC32 audit");
        return Err(UpdateError::CrcMismatch);
    }

    Ok(())
}
