// audio-sync
// Copyright (c) 2026 The audio-sync Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MPEG-1/2/2.5 Audio header parsing, Layer I/II/III.

use sync_core::{BitstreamKind, FormatTag, FrameInfo, FrameParser, SpeakerLayout, SyncInfo, SyncTrie};

use crate::modes::{MODE_MONO, MODE_STEREO};

const HEADER_SIZE: usize = 4;

const MIN_FRAME_SIZE: usize = 32;
const MAX_FRAME_SIZE: usize = 1728;

// Indexed [version][layer][bitrate_index]; version 2 (reserved) and the
// all-zero rows are never read since `decode` rejects them by sample rate.
const BITRATE_TBL: [[[u32; 15]; 3]; 4] = [
    // MPEG1
    [
        [0, 32, 64, 96, 128, 160, 192, 224, 256, 288, 320, 352, 384, 416, 448],
        [0, 32, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320, 384],
        [0, 32, 40, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320],
    ],
    // MPEG2 LSF
    [
        [0, 32, 48, 56, 64, 80, 96, 112, 128, 144, 160, 176, 192, 224, 256],
        [0, 8, 16, 24, 32, 40, 48, 56, 64, 80, 96, 112, 128, 144, 160],
        [0, 8, 16, 24, 32, 40, 48, 56, 64, 80, 96, 112, 128, 144, 160],
    ],
    // Reserved
    [[0; 15]; 3],
    // MPEG2.5 LSF
    [
        [0, 32, 48, 56, 64, 80, 96, 112, 128, 144, 160, 176, 192, 224, 256],
        [0, 8, 16, 24, 32, 40, 48, 56, 64, 80, 96, 112, 128, 144, 160],
        [0, 8, 16, 24, 32, 40, 48, 56, 64, 80, 96, 112, 128, 144, 160],
    ],
];

// Indexed [version][sampling_frequency].
const FREQ_TBL: [[u32; 3]; 4] = [
    [44100, 48000, 32000], // MPEG1
    [22050, 24000, 16000], // MPEG2 LSF
    [0, 0, 0],             // Reserved
    [11025, 12000, 8000],  // MPEG2.5 LSF
];

// Indexed [version][layer]; number of bitrate "slots" per frame.
const SLOTS_TBL: [[usize; 3]; 4] = [
    [12, 144, 144], // MPEG1
    [12, 144, 72],  // MPEG2 LSF
    [0, 0, 0],      // Reserved
    [12, 144, 72],  // MPEG2.5 LSF
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SyncKind {
    /// Plain 8-bit stream order; MPEG2.5 is distinguishable.
    Be8,
    /// 16-bit word-swapped stream order; MPEG2.5 is not distinguishable
    /// from MPEG2 (the version field collides with the reserved code),
    /// matching the reference parser's own limitation.
    Le16,
}

// Byte-pair-swapped indexing for the `Le16` stream order, same convention
// `sync_core::io::bit::ByteOrder::Le16` uses.
fn be_byte(hdr: &[u8], kind: SyncKind, i: usize) -> u8 {
    match kind {
        SyncKind::Be8 => hdr[i],
        SyncKind::Le16 => hdr[i ^ 1],
    }
}

fn detect_kind(hdr: &[u8]) -> Option<SyncKind> {
    if hdr[0] == 0xff
        && (hdr[1] & 0xe0) == 0xe0 // sync
        && (hdr[1] & 0x18) != 0x08 // version != reserved
        && (hdr[1] & 0x06) != 0x00 // layer != reserved
        && (hdr[2] & 0xf0) != 0xf0 // bitrate index != 15
        && (hdr[2] & 0x0c) != 0x0c
    // sample rate != reserved
    {
        Some(SyncKind::Be8)
    }
    else if hdr[1] == 0xff
        && (hdr[0] & 0xf0) == 0xf0 // sync
        && (hdr[0] & 0x06) != 0x00 // layer != reserved
        && (hdr[3] & 0xf0) != 0xf0 // bitrate index != 15
        && (hdr[3] & 0x0c) != 0x0c
    // sample rate != reserved
    {
        Some(SyncKind::Le16)
    }
    else {
        None
    }
}

/// MPEG-1/2/2.5 Audio frame header parser.
#[derive(Debug, Default)]
pub struct MpaFrameParser {
    locked: bool,
    header: [u8; HEADER_SIZE],
    info: FrameInfo,
    // Free-format streams (`bitrate_index == 0`) carry no frame size in the
    // header; once locked onto one, the observed frame byte length is the
    // only frame size the stream will ever produce, so sync narrows to it.
    locked_frame_size: Option<usize>,
}

impl MpaFrameParser {
    pub fn new() -> Self {
        Self::default()
    }
}

fn decode(hdr: &[u8], want_info: bool) -> Option<Option<FrameInfo>> {
    let kind = detect_kind(hdr)?;
    if !want_info {
        return Some(None);
    }

    let b1 = be_byte(hdr, kind, 1);
    let b2 = be_byte(hdr, kind, 2);
    let b3 = be_byte(hdr, kind, 3);

    let version_raw = ((b1 & 0x18) >> 3) as usize;
    let layer_raw = ((b1 & 0x06) >> 1) as usize;
    let bitrate_index = ((b2 & 0xf0) >> 4) as usize;
    let sampling_frequency = ((b2 & 0x0c) >> 2) as usize;
    let padding = (b2 & 0x02) != 0;
    let mode = (b3 & 0xc0) >> 6;

    let ver = 3 - version_raw;
    let layer = 3 - layer_raw;

    let sample_rate = FREQ_TBL[ver][sampling_frequency];
    if sample_rate == 0 {
        return None;
    }
    let bitrate = BITRATE_TBL[ver][layer][bitrate_index] * 1000;

    let mask = if mode == 3 { MODE_MONO } else { MODE_STEREO };
    let spk = SpeakerLayout::new(mask, sample_rate, FormatTag::Mpa);

    let mut frame_size = if bitrate > 0 {
        (bitrate as usize * SLOTS_TBL[ver][layer]) / sample_rate as usize + padding as usize
    }
    else {
        // Free format: frame size isn't derivable from the header alone.
        0
    };
    if layer == 0 && frame_size > 0 {
        frame_size *= 4;
    }

    let nsamples = if layer == 0 { 384 } else { 1152 };

    // IEC 61937 Pc burst-info data-type code. MPEG2.5 (ver == 3) has no
    // assigned code.
    let spdif_type = match (ver, layer) {
        (0, 0) => 4, // MPEG1 Layer I
        (0, _) => 5, // MPEG1 Layer II/III
        (1, 0) => 8, // MPEG2 LSF Layer I
        (1, _) => 9, // MPEG2 LSF Layer II/III
        _ => 0,
    };

    let bitstream_kind = match kind {
        SyncKind::Be8 => BitstreamKind::Be8,
        SyncKind::Le16 => BitstreamKind::Le16,
    };

    Some(Some(FrameInfo { spk, frame_size, nsamples, bitstream_kind, spdif_type }))
}

impl FrameParser for MpaFrameParser {
    fn sync_info(&self) -> SyncInfo {
        // 11 bits of true syncword, then either:
        //  - 5 wildcard bits (version/layer/protection) in `Be8` order, or
        //  - 4 wildcard bits sandwiched between the syncword's low nibble
        //    and the second byte, in `Le16` order.
        let be8 = SyncTrie::value(0xff, 8) + SyncTrie::value(0x7, 3) + SyncTrie::wildcard(5);
        let le16 = SyncTrie::value(0xf, 4) + SyncTrie::wildcard(4) + SyncTrie::value(0xff, 8);
        let trie = be8 | le16;

        match self.locked_frame_size {
            Some(size) => SyncInfo::new(trie, size, size),
            None => SyncInfo::new(trie, MIN_FRAME_SIZE, MAX_FRAME_SIZE),
        }
    }

    fn header_size(&self) -> usize {
        HEADER_SIZE
    }

    fn parse_header(&self, hdr: &[u8], out: Option<&mut FrameInfo>) -> bool {
        if hdr.len() < HEADER_SIZE {
            return false;
        }
        match decode(&hdr[..HEADER_SIZE], out.is_some()) {
            Some(Some(info)) => {
                if let Some(o) = out {
                    *o = info;
                }
                true
            }
            Some(None) => true,
            None => false,
        }
    }

    fn compare_headers(&self, a: &[u8], b: &[u8]) -> bool {
        if a.len() < HEADER_SIZE || b.len() < HEADER_SIZE {
            return false;
        }
        let Some(kind) = detect_kind(a)
        else {
            return false;
        };
        if detect_kind(b) != Some(kind) {
            return false;
        }

        // Same layer, same protection bit, same sample rate, same
        // mono-vs-not; bitrate is allowed to vary frame to frame.
        const NCH: [u32; 4] = [2, 2, 2, 1];
        let mode_a = be_byte(a, kind, 3) >> 6;
        let mode_b = be_byte(b, kind, 3) >> 6;

        be_byte(a, kind, 1) == be_byte(b, kind, 1)
            && (be_byte(a, kind, 2) & 0x0c) == (be_byte(b, kind, 2) & 0x0c)
            && NCH[mode_a as usize] == NCH[mode_b as usize]
    }

    fn first_frame(&mut self, buf: &[u8], size: usize) -> bool {
        if buf.len() < HEADER_SIZE {
            return false;
        }
        let mut info = FrameInfo::default();
        if !self.parse_header(buf, Some(&mut info)) {
            return false;
        }
        self.header.copy_from_slice(&buf[..HEADER_SIZE]);
        self.locked_frame_size = (info.frame_size == 0).then_some(size);
        self.info = info;
        self.locked = true;
        true
    }

    fn next_frame(&mut self, buf: &[u8], size: usize) -> bool {
        if !self.locked || buf.len() < HEADER_SIZE {
            return false;
        }
        let mut info = FrameInfo::default();
        if !self.parse_header(buf, Some(&mut info)) || !self.compare_headers(&self.header, &buf[..HEADER_SIZE]) {
            return false;
        }
        self.header.copy_from_slice(&buf[..HEADER_SIZE]);
        self.locked_frame_size = (info.frame_size == 0).then_some(size);
        self.info = info;
        true
    }

    fn reset(&mut self) {
        self.locked = false;
        self.locked_frame_size = None;
    }

    fn in_sync(&self) -> bool {
        self.locked
    }

    fn frame_info(&self) -> FrameInfo {
        self.info
    }

    fn stream_info(&self) -> String {
        if self.locked {
            format!(
                "MPEG Audio {} Hz, {} channels, {} byte frames",
                self.info.spk.sample_rate,
                self.info.spk.channel_count(),
                self.info.frame_size
            )
        }
        else {
            "MPEG Audio (not locked)".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // MPEG1 Layer II, 48 kHz, 192 kbps, stereo, no padding.
    fn sample_be_header(version_raw: u8, layer_raw: u8, bitrate_index: u8, sampling_frequency: u8, mode: u8) -> [u8; HEADER_SIZE] {
        let mut hdr = [0u8; HEADER_SIZE];
        hdr[0] = 0xff;
        hdr[1] = 0xe0 | (version_raw << 3) | (layer_raw << 1) | 1; // protection bit set (no CRC)
        hdr[2] = (bitrate_index << 4) | (sampling_frequency << 2);
        hdr[3] = mode << 6;
        hdr
    }

    #[test]
    fn parses_mpeg1_layer2_stereo_48khz() {
        let hdr = sample_be_header(3, 2, 9, 1, 0);
        let parser = MpaFrameParser::new();
        let mut info = FrameInfo::default();
        assert!(parser.parse_header(&hdr, Some(&mut info)));
        assert_eq!(info.spk.sample_rate, 48000);
        assert_eq!(info.spk.mask, MODE_STEREO);
        assert_eq!(info.nsamples, 1152);
        assert_eq!(info.spdif_type, 5);
        assert_eq!(info.frame_size, 160 * 1000 * 144 / 48000);
    }

    #[test]
    fn mono_layer1_has_4x_multiplied_frame_size_and_384_samples() {
        let hdr = sample_be_header(3, 3, 5, 1, 3);
        let parser = MpaFrameParser::new();
        let mut info = FrameInfo::default();
        assert!(parser.parse_header(&hdr, Some(&mut info)));
        assert_eq!(info.spk.mask, MODE_MONO);
        assert_eq!(info.nsamples, 384);
        assert_eq!(info.spdif_type, 4);
    }

    #[test]
    fn rejects_reserved_version_layer_and_sample_rate() {
        let parser = MpaFrameParser::new();
        assert!(!parser.parse_header(&sample_be_header(1, 2, 9, 1, 0), None)); // reserved version
        assert!(!parser.parse_header(&sample_be_header(3, 0, 9, 1, 0), None)); // reserved layer
        assert!(!parser.parse_header(&sample_be_header(3, 2, 9, 3, 0), None)); // reserved sample rate
    }

    #[test]
    fn free_format_frame_size_is_zero_until_locked() {
        let hdr = sample_be_header(3, 2, 0, 1, 0);
        let parser = MpaFrameParser::new();
        let mut info = FrameInfo::default();
        assert!(parser.parse_header(&hdr, Some(&mut info)));
        assert_eq!(info.frame_size, 0);
    }

    #[test]
    fn le16_and_be8_decode_to_the_same_frame_info() {
        let be = sample_be_header(3, 2, 9, 1, 0);
        let mut le = [0u8; HEADER_SIZE];
        le[0] = be[1];
        le[1] = be[0];
        le[2] = be[3];
        le[3] = be[2];

        let parser = MpaFrameParser::new();
        let mut be_info = FrameInfo::default();
        let mut le_info = FrameInfo::default();
        assert!(parser.parse_header(&be, Some(&mut be_info)));
        assert!(parser.parse_header(&le, Some(&mut le_info)));
        assert_eq!(be_info.frame_size, le_info.frame_size);
        assert_eq!(be_info.spk.mask, le_info.spk.mask);
    }

    #[test]
    fn compare_headers_allows_bitrate_to_vary() {
        let parser = MpaFrameParser::new();
        let a = sample_be_header(3, 2, 9, 1, 0);
        let b = sample_be_header(3, 2, 3, 1, 0);
        assert!(parser.compare_headers(&a, &b));
    }

    #[test]
    fn compare_headers_rejects_channel_count_change() {
        let parser = MpaFrameParser::new();
        let a = sample_be_header(3, 2, 9, 1, 0);
        let b = sample_be_header(3, 2, 9, 1, 3);
        assert!(!parser.compare_headers(&a, &b));
    }

    #[test]
    fn locks_to_observed_size_for_free_format_streams() {
        let hdr = sample_be_header(3, 2, 0, 1, 0);
        let mut parser = MpaFrameParser::new();
        assert!(parser.first_frame(&hdr, 417));
        assert_eq!(parser.sync_info().min_frame_size, 417);
        assert_eq!(parser.sync_info().max_frame_size, 417);
    }
}
