// audio-sync
// Copyright (c) 2026 The audio-sync Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `sync-core` is the format-agnostic engine behind `audio-sync`: a
//! syncword trie and scanner, MSB-first bitstream I/O, the bitstream-kind
//! packing conversions, the `FrameParser` trait every codec crate
//! implements, `MultiFrameParser` for auto-detecting among several
//! formats, and `StreamBuffer`, the 3-point synchronization state machine
//! that turns arbitrary byte chunks into frames and debris.
//!
//! Per-format parsers live in their own crates (`sync-codec-ac3`,
//! `sync-codec-dts`, `sync-codec-mpa`, `sync-codec-aac`,
//! `sync-format-spdif`); `audio-sync` re-exports everything behind Cargo
//! features.

pub mod buffer;
pub mod errors;
pub mod io;
pub mod multi;
pub mod parser;
pub mod sync;
pub mod types;

pub use buffer::StreamBuffer;
pub use errors::{Result, SyncError};
pub use io::{BitReader, BitWriter, ByteOrder};
pub use multi::MultiFrameParser;
pub use parser::FrameParser;
pub use sync::{SyncScan, SyncTrie, SyncTrieParseError};
pub use types::{
    BitstreamKind, ChannelRelation, FormatAux, FormatTag, FrameInfo, SpeakerLayout, Speakers, SyncInfo,
};
