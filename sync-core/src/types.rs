// audio-sync
// Copyright (c) 2026 The audio-sync Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared value types attached to recognized frames: speaker layouts,
//! per-frame metadata, and the sync hints a `FrameParser` advertises.

use bitflags::bitflags;

use crate::sync::trie::SyncTrie;

bitflags! {
    /// A channel mask over the named speaker positions a format can encode.
    ///
    /// Named the way AC3/DTS/WAVEFORMATEXTENSIBLE speaker masks are named;
    /// bit order is otherwise arbitrary since callers always go through
    /// `SpeakerLayout`, never the raw bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Speakers: u16 {
        const L   = 0x0001;
        const C   = 0x0002;
        const R   = 0x0004;
        const SL  = 0x0008;
        const SR  = 0x0010;
        const BL  = 0x0020;
        const BR  = 0x0040;
        const LFE = 0x0080;
        const CL  = 0x0100;
        const CR  = 0x0200;
        const BC  = 0x0400;
    }
}

/// Relation between the channels of a layout beyond a plain independent mix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChannelRelation {
    #[default]
    None,
    /// Dolby Surround-encoded Lt/Rt pair.
    DolbySurround,
    /// Sum/difference (MS) stereo coding.
    SumDiff,
}

/// Format-specific auxiliary data a `SpeakerLayout` carries without the
/// generic engine needing to understand it (e.g. DTS `amode`/`lff` codes or
/// MPEG mode-extension bits), used only for equality and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FormatAux(pub u32);

/// Identifies which compressed format (if any) a `SpeakerLayout`/`FrameInfo`
/// pair describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FormatTag {
    #[default]
    Unknown,
    Ac3,
    Eac3,
    Dts,
    Mpa,
    Adts,
    Spdif,
}

/// A complete description of a frame's channel layout and sample rate.
///
/// Two layouts compare equal iff every field matches. The distinguished
/// [`SpeakerLayout::unknown`] value is the only layout for which
/// [`SpeakerLayout::is_unknown`] is true.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpeakerLayout {
    pub mask: Speakers,
    pub sample_rate: u32,
    pub format: FormatTag,
    pub relation: ChannelRelation,
    pub aux: FormatAux,
}

impl SpeakerLayout {
    /// The distinguished unknown layout.
    pub const fn unknown() -> Self {
        SpeakerLayout {
            mask: Speakers::empty(),
            sample_rate: 0,
            format: FormatTag::Unknown,
            relation: ChannelRelation::None,
            aux: FormatAux(0),
        }
    }

    pub fn new(mask: Speakers, sample_rate: u32, format: FormatTag) -> Self {
        SpeakerLayout { mask, sample_rate, format, relation: ChannelRelation::None, aux: FormatAux(0) }
    }

    pub fn with_relation(mut self, relation: ChannelRelation) -> Self {
        self.relation = relation;
        self
    }

    pub fn with_aux(mut self, aux: u32) -> Self {
        self.aux = FormatAux(aux);
        self
    }

    pub fn is_unknown(&self) -> bool {
        *self == Self::unknown()
    }

    pub fn channel_count(&self) -> u32 {
        self.mask.bits().count_ones()
    }
}

impl Default for SpeakerLayout {
    fn default() -> Self {
        Self::unknown()
    }
}

/// How multibyte words of a compressed bitstream are packed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BitstreamKind {
    #[default]
    None,
    /// Plain 8-bit byte stream.
    Be8,
    /// 16-bit little-endian words.
    Le16,
    /// 16-bit big-endian words.
    Be16,
    /// 14-bit little-endian packed words (4 words per 7 bytes).
    Le14,
    /// 14-bit big-endian packed words.
    Be14,
    /// Linear PCM, not a compressed bitstream.
    Pcm,
}

/// Immutable-after-construction record attached to a recognized frame.
///
/// Invariant: when `frame_size > 0` and `nsamples > 0`,
/// `bitrate = frame_size * 8 * sample_rate / nsamples`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FrameInfo {
    pub spk: SpeakerLayout,
    /// Byte length of this frame, or 0 if unknown from the header alone.
    pub frame_size: usize,
    /// Number of audio samples this frame encodes.
    pub nsamples: u32,
    pub bitstream_kind: BitstreamKind,
    /// IEC 61937 Pc burst-info data-type code, or 0 if not SPDIF-transportable.
    pub spdif_type: u16,
}

impl FrameInfo {
    /// Computes the bitrate implied by `frame_size`/`nsamples`/`sample_rate`,
    /// or `None` when either is unknown (per the invariant in §3).
    pub fn bitrate(&self) -> Option<u64> {
        if self.frame_size == 0 || self.nsamples == 0 {
            return None;
        }
        Some(
            (self.frame_size as u64)
                .saturating_mul(8)
                .saturating_mul(self.spk.sample_rate as u64)
                / self.nsamples as u64,
        )
    }
}

/// The widest sync hint a `FrameParser` advertises: the set of syncwords it
/// accepts plus the frame-size range those syncwords can imply.
///
/// `min_frame_size == max_frame_size` is the "constant frame size" hint the
/// scanner uses to skip the second-point search.
#[derive(Debug, Clone)]
pub struct SyncInfo {
    pub trie: SyncTrie,
    pub min_frame_size: usize,
    pub max_frame_size: usize,
}

impl SyncInfo {
    pub fn new(trie: SyncTrie, min_frame_size: usize, max_frame_size: usize) -> Self {
        SyncInfo { trie, min_frame_size, max_frame_size }
    }

    /// A `SyncInfo` that never matches anything; the identity for union.
    pub fn none() -> Self {
        SyncInfo { trie: SyncTrie::deny(), min_frame_size: 0, max_frame_size: 0 }
    }

    pub fn is_valid(&self) -> bool {
        !self.trie.is_empty() && self.min_frame_size > 0 && self.min_frame_size <= self.max_frame_size
    }

    /// True when every accepted frame of this format has exactly the same
    /// size (the scanner's fast-path hint).
    pub fn is_constant_frame_size(&self) -> bool {
        self.min_frame_size == self.max_frame_size
    }

    /// Unions two sync hints: the combined trie plus the widened size range.
    pub fn union(self, other: SyncInfo) -> SyncInfo {
        if !self.is_valid() {
            return other;
        }
        if !other.is_valid() {
            return self;
        }
        SyncInfo {
            trie: self.trie | other.trie,
            min_frame_size: self.min_frame_size.min(other.min_frame_size),
            max_frame_size: self.max_frame_size.max(other.max_frame_size),
        }
    }
}
