// audio-sync
// Copyright (c) 2026 The audio-sync Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Packs raw AC-3/MPA/DTS frames into fixed-size IEC 61937 packets.

use sync_core::io::convert::convert;
use sync_core::{BitstreamKind, FormatTag, FrameInfo};

use crate::header;

const MAX_SPDIF_FRAME_SIZE: usize = 8192;

/// How a DTS frame is packaged into its `4 * nsamples`-byte SPDIF packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DtsMode {
    /// Prefer [`DtsMode::Wrapped`], fall back to [`DtsMode::Padded`], then
    /// to passthrough.
    #[default]
    Auto,
    /// Always emit the 16-byte burst header; requires the (possibly
    /// converted) payload to fit in `4 * nsamples - 16` bytes.
    Wrapped,
    /// Never emit a burst header; requires the payload to fit in
    /// `4 * nsamples` bytes.
    Padded,
}

/// Whether (and how) a DTS frame's bitstream packing is converted before
/// wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DtsConv {
    /// Keep the frame's incoming bitstream kind.
    #[default]
    None,
    /// Repack 14-bit to dense 16-bit little-endian (payload shrinks).
    To16,
    /// Repack dense 16-bit to 14-bit little-endian (payload grows).
    To14,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SpdifWrapperConfig {
    pub dts_mode: DtsMode,
    pub dts_conv: DtsConv,
}

/// The shape of packet [`SpdifWrapper::wrap`] produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WrappedFrame {
    /// A full burst-preamble packet, `4 * nsamples` bytes.
    Wrapped(Vec<u8>),
    /// A zero-padded packet with no burst header, `4 * nsamples` bytes.
    Padded(Vec<u8>),
    /// The input frame, unchanged: it didn't fit any SPDIF packaging, or
    /// its format carries no IEC 61937 burst-info code at all.
    Passthrough(Vec<u8>),
}

impl WrappedFrame {
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            WrappedFrame::Wrapped(b) | WrappedFrame::Padded(b) | WrappedFrame::Passthrough(b) => b,
        }
    }

    pub fn is_passthrough(&self) -> bool {
        matches!(self, WrappedFrame::Passthrough(_))
    }
}

/// Packs raw compressed frames into IEC 61937 SPDIF packets.
#[derive(Debug, Clone, Default)]
pub struct SpdifWrapper {
    config: SpdifWrapperConfig,
}

impl SpdifWrapper {
    pub fn new(config: SpdifWrapperConfig) -> Self {
        Self { config }
    }

    /// Wraps one raw compressed frame, given the [`FrameInfo`] its own
    /// `FrameParser` produced for it.
    pub fn wrap(&self, frame: &[u8], info: &FrameInfo) -> WrappedFrame {
        let packet_size = 4 * info.nsamples as usize;
        if info.spdif_type == 0 || packet_size == 0 || packet_size > MAX_SPDIF_FRAME_SIZE {
            return WrappedFrame::Passthrough(frame.to_vec());
        }

        if info.spk.format == FormatTag::Dts {
            return self.wrap_dts(frame, info, packet_size);
        }

        let payload = convert(frame, info.bitstream_kind, BitstreamKind::Le16);
        if payload.len() > packet_size - header::HEADER_SIZE {
            return WrappedFrame::Passthrough(frame.to_vec());
        }
        WrappedFrame::Wrapped(build_wrapped(info.spdif_type, &payload, packet_size))
    }

    fn wrap_dts(&self, frame: &[u8], info: &FrameInfo, packet_size: usize) -> WrappedFrame {
        let (target_kind, mut payload) = match self.config.dts_conv {
            DtsConv::None => (info.bitstream_kind, frame.to_vec()),
            DtsConv::To16 => (BitstreamKind::Le16, convert(frame, info.bitstream_kind, BitstreamKind::Le16)),
            DtsConv::To14 => (BitstreamKind::Le14, convert(frame, info.bitstream_kind, BitstreamKind::Le14)),
        };
        // Repacking the bit depth leaves the syncword's bitstream-kind
        // byte stale; rewrite it to the canonical value so downstream
        // detectors see the new kind.
        if !matches!(self.config.dts_conv, DtsConv::None) {
            match target_kind {
                BitstreamKind::Le14 => payload[3] = 0xe8,
                BitstreamKind::Be14 => payload[2] = 0xe8,
                _ => {}
            }
        }

        let fits_wrapped = payload.len() <= packet_size.saturating_sub(header::HEADER_SIZE);
        let fits_padded = payload.len() <= packet_size;

        let use_wrapped = match self.config.dts_mode {
            DtsMode::Wrapped => fits_wrapped,
            DtsMode::Padded => false,
            DtsMode::Auto => fits_wrapped,
        };
        if use_wrapped {
            return WrappedFrame::Wrapped(build_wrapped(info.spdif_type, &payload, packet_size));
        }

        let use_padded = match self.config.dts_mode {
            DtsMode::Wrapped => false,
            DtsMode::Padded | DtsMode::Auto => fits_padded,
        };
        if use_padded {
            return WrappedFrame::Padded(build_padded(&payload, packet_size));
        }

        WrappedFrame::Passthrough(frame.to_vec())
    }
}

fn build_wrapped(spdif_type: u16, payload: &[u8], packet_size: usize) -> Vec<u8> {
    let mut out = vec![0u8; packet_size];
    header::write_header(&mut out[..header::HEADER_SIZE], spdif_type, (payload.len() * 8) as u16);
    out[header::HEADER_SIZE..header::HEADER_SIZE + payload.len()].copy_from_slice(payload);
    out
}

fn build_padded(payload: &[u8], packet_size: usize) -> Vec<u8> {
    let mut out = vec![0u8; packet_size];
    out[..payload.len()].copy_from_slice(payload);
    out
}
