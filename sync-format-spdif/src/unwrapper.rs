// audio-sync
// Copyright (c) 2026 The audio-sync Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reverses [`crate::SpdifWrapper`]: strips the IEC 61937 burst header (or
//! recognizes the headerless padded-DTS shape) and hands back the raw
//! inner frame, byte-swabbed to big-endian for downstream consumption.

use sync_core::io::convert::swab16;
use sync_core::{BitstreamKind, FrameInfo, FrameParser};

use sync_codec_ac3::Ac3FrameParser;
use sync_codec_dts::DtsFrameParser;
use sync_codec_mpa::MpaFrameParser;

use crate::header;

/// One frame recovered from an SPDIF packet.
#[derive(Debug, Clone, PartialEq)]
pub struct UnwrappedFrame {
    /// The inner frame's bytes, byte-swabbed to big-endian where the
    /// packet carried it 16-bit little-endian.
    pub data: Vec<u8>,
    pub info: FrameInfo,
    /// True when this packet's inner format/Pc code differs from the
    /// previous successfully unwrapped packet's.
    pub format_changed: bool,
}

/// Strips IEC 61937 burst-preamble and padded-DTS SPDIF packaging.
#[derive(Debug, Default)]
pub struct SpdifUnwrapper {
    last_pc: Option<u16>,
}

impl SpdifUnwrapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.last_pc = None;
    }

    /// Recovers the inner frame from one SPDIF packet. Returns `None` if
    /// `packet` isn't a recognizable IEC 61937 carrier.
    pub fn unwrap(&mut self, packet: &[u8]) -> Option<UnwrappedFrame> {
        if header::has_preamble(packet) {
            self.unwrap_burst(packet)
        }
        else {
            self.unwrap_padded(packet)
        }
    }

    fn unwrap_burst(&mut self, packet: &[u8]) -> Option<UnwrappedFrame> {
        let (pc, pd) = header::read_pc_pd(packet);
        let inner = header::inner_for_pc(pc)?;
        let payload_len = usize::from(pd).div_ceil(8);
        let start = header::HEADER_SIZE;
        if packet.len() < start + payload_len {
            return None;
        }
        let payload = &packet[start..start + payload_len];

        let mut info = FrameInfo::default();
        let ok = match inner {
            header::Inner::Ac3 => Ac3FrameParser::new().parse_header(payload, Some(&mut info)),
            header::Inner::Mpa => MpaFrameParser::new().parse_header(payload, Some(&mut info)),
            header::Inner::Dts => DtsFrameParser::new().parse_header(payload, Some(&mut info)),
        };
        if !ok {
            return None;
        }

        let mut data = payload.to_vec();
        if info.bitstream_kind == BitstreamKind::Le16 {
            swab16(&mut data);
            info.bitstream_kind = BitstreamKind::Be16;
        }

        let format_changed = self.last_pc != Some(pc);
        self.last_pc = Some(pc);
        Some(UnwrappedFrame { data, info, format_changed })
    }

    fn unwrap_padded(&mut self, packet: &[u8]) -> Option<UnwrappedFrame> {
        let dts = DtsFrameParser::new();
        let mut info = FrameInfo::default();
        if !dts.parse_header(packet, Some(&mut info)) {
            return None;
        }
        if !matches!(info.bitstream_kind, BitstreamKind::Le16 | BitstreamKind::Le14) {
            return None;
        }
        let frame_size = 4 * info.nsamples as usize;
        if packet.len() < frame_size {
            return None;
        }

        let mut data = packet[..frame_size].to_vec();
        if info.bitstream_kind == BitstreamKind::Le16 {
            swab16(&mut data);
            info.bitstream_kind = BitstreamKind::Be16;
        }

        // No Pc byte exists in this shape; use spdif_type as its stand-in
        // for format-change detection.
        let pc_stand_in = info.spdif_type;
        let format_changed = self.last_pc != Some(pc_stand_in);
        self.last_pc = Some(pc_stand_in);
        Some(UnwrappedFrame { data, info, format_changed })
    }
}
