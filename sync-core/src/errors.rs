// audio-sync
// Copyright (c) 2026 The audio-sync Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `errors` module defines the crate-wide error type.
//!
//! Per the recovery policy in the design notes, most of the parsing and
//! synchronization engine never surfaces these as hard failures: a bad
//! header is dropped as debris and the scanner resyncs. `SyncError` exists
//! for the handful of entry points where a `Result` is the natural shape
//! (trie deserialization, SPDIF wrap constraint failures, and programmer
//! misuse of the parser/buffer state machines).

use core::fmt;
use core::result;

/// `SyncError` enumerates every way the synchronization and framing engine
/// can fail to make progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// Input was exhausted before a decision could be made. The caller
    /// should supply more bytes and retry. Not counted as an error by
    /// `StreamBuffer`'s diagnostics.
    NotEnoughData,
    /// In-sync state was dropped because a downstream frame failed
    /// `compare_headers` or `parse_header`.
    SyncLost,
    /// Bytes at the current position do not form a valid header of the
    /// active format.
    InvalidHeader(&'static str),
    /// No registered parser accepts the current header.
    UnsupportedFormat(&'static str),
    /// A caller-supplied frame-size expectation could not be honored (e.g.
    /// `SpdifWrapper` passthrough with no mode/size/conversion that fits).
    BufferTooSmall,
    /// A downstream decoder reported CRC or internal-structure failure.
    CorruptFrame(&'static str),
    /// The API was misused, e.g. `next_frame` called before `first_frame`.
    Misuse(&'static str),
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::NotEnoughData => write!(f, "not enough data"),
            SyncError::SyncLost => write!(f, "synchronization lost"),
            SyncError::InvalidHeader(msg) => write!(f, "invalid header: {}", msg),
            SyncError::UnsupportedFormat(msg) => write!(f, "unsupported format: {}", msg),
            SyncError::BufferTooSmall => write!(f, "buffer too small for frame"),
            SyncError::CorruptFrame(msg) => write!(f, "corrupt frame: {}", msg),
            SyncError::Misuse(msg) => write!(f, "api misuse: {}", msg),
        }
    }
}

impl std::error::Error for SyncError {}

pub type Result<T> = result::Result<T, SyncError>;

/// Convenience function to create a not-enough-data error.
pub fn not_enough_data_error<T>() -> Result<T> {
    Err(SyncError::NotEnoughData)
}

/// Convenience function to create a sync-lost error.
pub fn sync_lost_error<T>() -> Result<T> {
    Err(SyncError::SyncLost)
}

/// Convenience function to create an invalid-header error.
pub fn invalid_header_error<T>(desc: &'static str) -> Result<T> {
    Err(SyncError::InvalidHeader(desc))
}

/// Convenience function to create an unsupported-format error.
pub fn unsupported_format_error<T>(desc: &'static str) -> Result<T> {
    Err(SyncError::UnsupportedFormat(desc))
}

/// Convenience function to create a buffer-too-small error.
pub fn buffer_too_small_error<T>() -> Result<T> {
    Err(SyncError::BufferTooSmall)
}

/// Convenience function to create a corrupt-frame error.
pub fn corrupt_frame_error<T>(desc: &'static str) -> Result<T> {
    Err(SyncError::CorruptFrame(desc))
}

/// Convenience function to create a misuse error.
pub fn misuse_error<T>(desc: &'static str) -> Result<T> {
    Err(SyncError::Misuse(desc))
}
