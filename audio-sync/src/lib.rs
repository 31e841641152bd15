// audio-sync
// Copyright (c) 2026 The audio-sync Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

//! # audio-sync
//!
//! `audio-sync` finds, validates, and frames compressed audio bitstreams
//! embedded in a raw byte stream, and wraps/unwraps them for transport over
//! S/PDIF (IEC 61937).
//!
//! By default all supported formats are enabled. Disable default features
//! and pick individual ones to cut dependencies:
//!
//! | Format                  | Feature Flag | Default |
//! |--------------------------|--------------|---------|
//! | AC-3 / Enhanced AC-3     | `ac3`        | Yes     |
//! | DTS (incl. 14/16-bit, MA) | `dts`       | Yes     |
//! | MPEG-1/2/2.5 Audio       | `mpa`        | Yes     |
//! | AAC (ADTS)               | `aac`        | Yes     |
//! | S/PDIF (IEC 61937)       | `spdif`      | Yes     |
//!
//! # Usage
//!
//! 1. Pick a [`sync_core::FrameParser`] implementation for the format you
//!    expect (e.g. [`codecs::Ac3FrameParser`]), or use
//!    [`sync_core::MultiFrameParser`] to probe among several at once.
//! 2. Feed raw bytes into a [`sync_core::StreamBuffer`] bound to that
//!    parser; it locates sync, validates consecutive headers, and yields
//!    framed data plus any unrecognized debris.
//! 3. To carry a frame over S/PDIF, hand its bytes and [`sync_core::FrameInfo`]
//!    to [`formats::spdif::SpdifWrapper::wrap`]; to recover one from a
//!    captured S/PDIF packet, use [`formats::spdif::SpdifUnwrapper::unwrap`].

pub use sync_core::{
    BitReader, BitWriter, ByteOrder, BitstreamKind, ChannelRelation, FormatAux, FormatTag, FrameInfo,
    FrameParser, MultiFrameParser, Result, SpeakerLayout, Speakers, StreamBuffer, SyncError, SyncInfo,
    SyncScan, SyncTrie, SyncTrieParseError,
};

pub mod codecs {
    //! Re-exports of all enabled per-format `FrameParser` implementations.

    #[cfg(feature = "ac3")]
    pub use sync_codec_ac3::{Ac3FrameParser, Eac3FrameParser};
    #[cfg(feature = "aac")]
    pub use sync_codec_aac::AdtsFrameParser;
    #[cfg(feature = "dts")]
    pub use sync_codec_dts::DtsFrameParser;
    #[cfg(feature = "mpa")]
    pub use sync_codec_mpa::MpaFrameParser;
}

#[cfg(feature = "spdif")]
pub mod formats {
    //! Re-exports of container/transport-level support built atop the
    //! per-format codec crates.

    pub mod spdif {
        //! IEC 61937 (S/PDIF) carrier detection and wrap/unwrap.
        pub use sync_format_spdif::{DtsConv, DtsMode, SpdifFrameParser, SpdifUnwrapper, SpdifWrapper, SpdifWrapperConfig};
    }
}
