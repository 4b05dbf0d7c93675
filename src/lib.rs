// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Crash-safe bootloader self-update for STM32-class MCUs.
//!
//! The resident bootloader at the base of flash is replaced from running
//! application code. An interruption at any point — power loss, reset,
//! fault — must not leave the device unbootable, so the region is committed
//! in stages:
//!
//! - the candidate image is validated in RAM before flash is touched
//! - a minimal fallback vector table is parked at the start of page 0 first,
//!   so a half-written bootloader can never capture the reset vector
//! - the body of the image is programmed and verified before page 0 is
//!   committed with the real vector table, last
//!
//! The flash driver is supplied by the target through the
//! [`FlashPages`](flash::FlashPages) trait; checksums use the STM32 hardware
//! CRC variant (see [`checksum`]).
//!
//! This crate supports both `no_std` (embedded) and `std` (host) environments:
//! - Default: `no_std` mode for embedded targets
//! - `std` feature: implements `std::error::Error` for error types
//! - `defmt` feature: derives `defmt::Format` on public types and logs at
//!   protocol decision points

#![cfg_attr(not(feature = "std"), no_std)]

pub mod bootvec;
pub mod checksum;
pub mod flash;
pub mod layout;
pub mod updater;

// Re-export commonly used types
pub use bootvec::BootVector;
pub use checksum::{crc32, ChecksumEngine};
pub use flash::FlashPages;
pub use layout::{FlashGeometry, FLASH_PAGE_SIZE, MAX_BOOTLOADER_PAGES, PROGRAM_WORD_SIZE};
pub use updater::{update_bootloader, UpdateError};
