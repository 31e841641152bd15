// audio-sync
// Copyright (c) 2026 The audio-sync Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Enhanced AC-3 (`10 < bsid <= 16`) header parsing. Same syncword family
//! as classic AC-3 but an incompatible header layout past byte 1, so it is
//! a distinct [`sync_core::FrameParser`] rather than a branch of
//! [`crate::ac3::Ac3FrameParser`].

use sync_core::{BitstreamKind, FormatTag, FrameInfo, FrameParser, SpeakerLayout, Speakers, SyncInfo, SyncTrie};

use crate::modes::{MODE_1_0, MODE_2_0, MODE_2_1, MODE_2_2, MODE_3_0, MODE_3_1, MODE_3_2};

const HEADER_SIZE: usize = 8;

// frame_size = 2 * frmsiz + 2 where frmsiz is an 11-bit field.
const MIN_FRAME_SIZE: usize = 2;
const MAX_FRAME_SIZE: usize = 2 * 0x7ff + 2;

const SRATE_TBL: [u32; 16] =
    [48000, 48000, 48000, 48000, 44100, 44100, 44100, 44100, 32000, 32000, 32000, 32000, 24000, 22050, 16000, 0];

const NSAMPLES_TBL: [u32; 16] = [256, 512, 768, 1536, 256, 512, 768, 1536, 256, 512, 768, 1536, 1536, 1536, 1536, 1536];

const MASK_TBL: [Speakers; 16] = [
    MODE_2_0,
    MODE_2_0.union(Speakers::LFE),
    MODE_1_0,
    MODE_1_0.union(Speakers::LFE),
    MODE_2_0,
    MODE_2_0.union(Speakers::LFE),
    MODE_3_0,
    MODE_3_0.union(Speakers::LFE),
    MODE_2_1,
    MODE_2_1.union(Speakers::LFE),
    MODE_3_1,
    MODE_3_1.union(Speakers::LFE),
    MODE_2_2,
    MODE_2_2.union(Speakers::LFE),
    MODE_3_2,
    MODE_3_2.union(Speakers::LFE),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SyncKind {
    Be8,
    Le16,
}

fn detect_kind(hdr: &[u8]) -> Option<SyncKind> {
    if hdr[0] == 0x0b && hdr[1] == 0x77 {
        Some(SyncKind::Be8)
    }
    else if hdr[0] == 0x77 && hdr[1] == 0x0b {
        Some(SyncKind::Le16)
    }
    else {
        None
    }
}

fn bsid_ok(hdr: &[u8], kind: SyncKind) -> bool {
    let strmtyp_byte = match kind {
        SyncKind::Be8 => hdr[4],
        SyncKind::Le16 => hdr[5],
    };
    if strmtyp_byte >> 4 == 0xf {
        return false;
    }
    let bsid_byte = match kind {
        SyncKind::Be8 => hdr[5],
        SyncKind::Le16 => hdr[4],
    };
    let bsid = (bsid_byte >> 3) as u32;
    (11..=16).contains(&bsid)
}

fn decode(hdr: &[u8], want_info: bool) -> Option<Option<FrameInfo>> {
    let kind = detect_kind(hdr)?;
    if !bsid_ok(hdr, kind) {
        return None;
    }
    if !want_info {
        return Some(None);
    }

    let (size_hi, size_lo, rate_idx_byte) = match kind {
        SyncKind::Be8 => (hdr[2], hdr[3], hdr[4]),
        SyncKind::Le16 => (hdr[3], hdr[2], hdr[5]),
    };
    let frame_size = ((((size_hi & 7) as usize) << 8) | size_lo as usize) * 2 + 2;
    let idx = (rate_idx_byte >> 4) as usize;
    let sample_rate = SRATE_TBL[idx];
    let nsamples = NSAMPLES_TBL[idx];
    let mode_idx = (rate_idx_byte & 0xf) as usize;

    let spk = SpeakerLayout::new(MASK_TBL[mode_idx], sample_rate, FormatTag::Eac3);
    let bitstream_kind = match kind {
        SyncKind::Be8 => BitstreamKind::Be8,
        SyncKind::Le16 => BitstreamKind::Le16,
    };
    Some(Some(FrameInfo { spk, frame_size, nsamples, bitstream_kind, spdif_type: 0 }))
}

/// Enhanced AC-3 (`10 < bsid <= 16`) frame header parser.
#[derive(Debug, Default)]
pub struct Eac3FrameParser {
    locked: bool,
    header: [u8; HEADER_SIZE],
    info: FrameInfo,
}

impl Eac3FrameParser {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameParser for Eac3FrameParser {
    fn sync_info(&self) -> SyncInfo {
        let trie = SyncTrie::value(0x0b77, 16) | SyncTrie::value(0x770b, 16);
        SyncInfo::new(trie, MIN_FRAME_SIZE, MAX_FRAME_SIZE)
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
        let Some(kind) = detect_kind(a) else { return false };
        if !bsid_ok(a, kind) || detect_kind(b) != Some(kind) {
            return false;
        }
        match kind {
            SyncKind::Be8 => {
                a[0] == b[0]
                    && a[1] == b[1]
                    && a[2] == b[2]
                    && a[3] == b[3]
                    && a[4] == b[4]
                    && (a[5] & 0xf8) == (b[5] & 0xf8)
            }
            SyncKind::Le16 => {
                a[1] == b[1]
                    && a[0] == b[0]
                    && a[3] == b[3]
                    && a[2] == b[2]
                    && a[5] == b[5]
                    && (a[4] & 0xf8) == (b[4] & 0xf8)
            }
        }
    }

    fn first_frame(&mut self, buf: &[u8], _size: usize) -> bool {
        if buf.len() < HEADER_SIZE {
            return false;
        }
        let mut info = FrameInfo::default();
        if !self.parse_header(buf, Some(&mut info)) {
            return false;
        }
        self.header.copy_from_slice(&buf[..HEADER_SIZE]);
        self.info = info;
        self.locked = true;
        true
    }

    fn next_frame(&mut self, buf: &[u8], _size: usize) -> bool {
        if !self.locked || buf.len() < HEADER_SIZE {
            return false;
        }
        let mut info = FrameInfo::default();
        if !self.parse_header(buf, Some(&mut info)) || !self.compare_headers(&self.header, &buf[..HEADER_SIZE]) {
            return false;
        }
        self.header.copy_from_slice(&buf[..HEADER_SIZE]);
        self.info = info;
        true
    }

    fn reset(&mut self) {
        self.locked = false;
    }

    fn in_sync(&self) -> bool {
        self.locked
    }

    fn frame_info(&self) -> FrameInfo {
        self.info
    }

    fn stream_info(&self) -> String {
        if self.locked {
            format!("E-AC-3 {} Hz, {} channels", self.info.spk.sample_rate, self.info.spk.channel_count())
        }
        else {
            "E-AC-3 (not locked)".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_be_header(frmsiz: u16, rate_idx: u8, mode_idx: u8, bsid: u8) -> [u8; HEADER_SIZE] {
        let mut hdr = [0u8; HEADER_SIZE];
        hdr[0] = 0x0b;
        hdr[1] = 0x77;
        hdr[2] = (frmsiz >> 8) as u8 & 0x07;
        hdr[3] = frmsiz as u8;
        hdr[4] = (rate_idx << 4) | mode_idx;
        hdr[5] = bsid << 3;
        hdr
    }

    #[test]
    fn parses_frame_size_and_sample_rate() {
        let hdr = sample_be_header(100, 0, 6, 16);
        let parser = Eac3FrameParser::new();
        let mut info = FrameInfo::default();
        assert!(parser.parse_header(&hdr, Some(&mut info)));
        assert_eq!(info.frame_size, 100 * 2 + 2);
        assert_eq!(info.spk.sample_rate, 48000);
        assert_eq!(info.nsamples, 256);
        assert_eq!(info.spk.mask, MODE_3_0);
    }

    #[test]
    fn rejects_classic_ac3_bsid() {
        let hdr = sample_be_header(100, 0, 0, 8);
        let parser = Eac3FrameParser::new();
        assert!(!parser.parse_header(&hdr, None));
    }

    #[test]
    fn continuation_ignores_bsmod_tail() {
        let mut hdr1 = sample_be_header(100, 0, 6, 16);
        let mut hdr2 = hdr1;
        hdr1[5] |= 0x07;
        hdr2[5] &= !0x07;
        let parser = Eac3FrameParser::new();
        assert!(parser.compare_headers(&hdr1, &hdr2));
    }
}
