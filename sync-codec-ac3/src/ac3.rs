// audio-sync
// Copyright (c) 2026 The audio-sync Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Classic AC-3 (`bsid <= 10`) header parsing.

use sync_core::{
    BitstreamKind, ChannelRelation, FormatTag, FrameInfo, FrameParser, SpeakerLayout, SyncInfo, SyncTrie,
};

use crate::modes::{MODE_1_0, MODE_2_0, MODE_2_1, MODE_2_2, MODE_3_0, MODE_3_1, MODE_3_2};
use sync_core::Speakers;

const HEADER_SIZE: usize = 8;

// frame_size ranges over fscod in {0,1,2} and frmsizecod in [0, 0x25]; the
// widest span across all three is [128, 3840] bytes.
const MIN_FRAME_SIZE: usize = 128;
const MAX_FRAME_SIZE: usize = 3840;

const HALFRATE_TBL: [u32; 12] = [0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 2, 3];

// Position of the `lfeon` bit within the acmod-dependent tail of the
// header's channel byte; varies because `cmixlev`/`surmixlev`/`dsurmod`
// occupy a different number of bits depending on the channel count.
const LFE_MASK: [u8; 8] = [16, 16, 4, 4, 4, 1, 4, 1];

const BITRATE_TBL: [u32; 19] =
    [32, 40, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320, 384, 448, 512, 576, 640];

const ACMOD2MASK: [Speakers; 16] = [
    MODE_2_0,
    MODE_1_0,
    MODE_2_0,
    MODE_3_0,
    MODE_2_1,
    MODE_3_1,
    MODE_2_2,
    MODE_3_2,
    MODE_2_0.union(Speakers::LFE),
    MODE_1_0.union(Speakers::LFE),
    MODE_2_0.union(Speakers::LFE),
    MODE_3_0.union(Speakers::LFE),
    MODE_2_1.union(Speakers::LFE),
    MODE_3_1.union(Speakers::LFE),
    MODE_2_2.union(Speakers::LFE),
    MODE_3_2.union(Speakers::LFE),
];

// Mask applied to the trailing header byte before a continuation compare,
// excluding `compre`/`compr` (present only for some acmod values).
const ACMOD2COMPARE_MASK: [u8; 8] = [0x80, 0x80, 0xe0, 0xe0, 0xe0, 0xf8, 0xe0, 0xf8];

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

/// AC-3 (classic, `bsid <= 10`) frame header parser.
#[derive(Debug, Default)]
pub struct Ac3FrameParser {
    locked: bool,
    header: [u8; HEADER_SIZE],
    info: FrameInfo,
}

impl Ac3FrameParser {
    pub fn new() -> Self {
        Self::default()
    }
}

fn decode(hdr: &[u8], want_info: bool) -> Option<Option<FrameInfo>> {
    let kind = detect_kind(hdr)?;
    let (bsid_byte, size_byte, acmod_byte) = match kind {
        SyncKind::Be8 => (hdr[5], hdr[4], hdr[6]),
        SyncKind::Le16 => (hdr[4], hdr[5], hdr[7]),
    };

    if bsid_byte >= 0x60 {
        return None;
    }
    if (size_byte & 0x3f) > 0x25 {
        return None;
    }
    if (size_byte & 0xc0) > 0x80 {
        return None;
    }
    if !want_info {
        return Some(None);
    }

    let fscod = size_byte >> 6;
    let frmsizecod = size_byte & 0x3f;
    let mut acmod = (acmod_byte >> 5) as usize;

    let mut relation = ChannelRelation::None;
    if acmod == 2 && (acmod_byte & 0x18) == 0x10 {
        relation = ChannelRelation::DolbySurround;
    }
    if acmod_byte & LFE_MASK[acmod] != 0 {
        acmod |= 8;
    }

    let halfrate = HALFRATE_TBL[(bsid_byte >> 3) as usize];
    let bitrate = BITRATE_TBL[(frmsizecod >> 1) as usize];

    let (frame_size, sample_rate) = match fscod {
        0 => (4 * bitrate as usize, 48000u32 >> halfrate),
        1 => (2 * (320 * bitrate as usize / 147 + (frmsizecod as usize & 1)), 44100u32 >> halfrate),
        2 => (6 * bitrate as usize, 32000u32 >> halfrate),
        _ => return None,
    };

    let spk = SpeakerLayout::new(ACMOD2MASK[acmod], sample_rate, FormatTag::Ac3).with_relation(relation);
    let bitstream_kind = match kind {
        SyncKind::Be8 => BitstreamKind::Be8,
        SyncKind::Le16 => BitstreamKind::Le16,
    };
    let info = FrameInfo { spk, frame_size, nsamples: 1536, bitstream_kind, spdif_type: 1 };
    Some(Some(info))
}

impl FrameParser for Ac3FrameParser {
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
        if a.len() < HEADER_SIZE || b.len() < HEADER_SIZE || !self.parse_header(a, None) || !self.parse_header(b, None)
        {
            return false;
        }
        let Some(kind) = detect_kind(a) else { return false };
        if detect_kind(b) != Some(kind) {
            return false;
        }
        match kind {
            SyncKind::Be8 => {
                let mask = ACMOD2COMPARE_MASK[(a[6] >> 5) as usize];
                a[0] == b[0]
                    && a[1] == b[1]
                    && (a[4] & 0xfe) == (b[4] & 0xfe)
                    && a[5] == b[5]
                    && a[6] == b[6]
                    && (a[7] & mask) == (b[7] & mask)
            }
            SyncKind::Le16 => {
                let mask = ACMOD2COMPARE_MASK[(a[7] >> 5) as usize];
                a[1] == b[1]
                    && a[0] == b[0]
                    && (a[5] & 0xfe) == (b[5] & 0xfe)
                    && a[4] == b[4]
                    && a[7] == b[7]
                    && (a[6] & mask) == (b[6] & mask)
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
            format!(
                "AC-3 {} Hz, {} channels",
                self.info.spk.sample_rate,
                self.info.spk.channel_count()
            )
        }
        else {
            "AC-3 (not locked)".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_be_header(fscod: u8, frmsizecod: u8, acmod: u8, lfeon: bool) -> [u8; HEADER_SIZE] {
        let mut hdr = [0u8; HEADER_SIZE];
        hdr[0] = 0x0b;
        hdr[1] = 0x77;
        hdr[4] = (fscod << 6) | frmsizecod;
        hdr[5] = 0x08; // bsid = 1, bsmod = 0
        hdr[6] = acmod << 5;
        if lfeon {
            hdr[6] |= LFE_MASK[acmod as usize];
        }
        hdr
    }

    #[test]
    fn parses_3_2_lfe_48khz() {
        let hdr = sample_be_header(0, 0x20, 7, true);
        let parser = Ac3FrameParser::new();
        let mut info = FrameInfo::default();
        assert!(parser.parse_header(&hdr, Some(&mut info)));
        assert_eq!(info.spk.sample_rate, 48000);
        assert_eq!(info.spk.mask, MODE_3_2 | Speakers::LFE);
        assert_eq!(info.nsamples, 1536);
        assert_eq!(info.spdif_type, 1);
    }

    #[test]
    fn rejects_out_of_range_bsid() {
        let mut hdr = sample_be_header(0, 0, 0, false);
        hdr[5] = 0xf8; // bsid = 31
        let parser = Ac3FrameParser::new();
        assert!(!parser.parse_header(&hdr, None));
    }

    #[test]
    fn le16_and_be8_decode_to_the_same_frame_info() {
        let be = sample_be_header(0, 0x10, 1, false);
        let mut le = [0u8; HEADER_SIZE];
        le[0] = be[1];
        le[1] = be[0];
        le[4] = be[5];
        le[5] = be[4];
        le[6] = be[7];
        le[7] = be[6];

        let parser = Ac3FrameParser::new();
        let mut be_info = FrameInfo::default();
        let mut le_info = FrameInfo::default();
        assert!(parser.parse_header(&be, Some(&mut be_info)));
        assert!(parser.parse_header(&le, Some(&mut le_info)));
        assert_eq!(be_info.frame_size, le_info.frame_size);
        assert_eq!(be_info.spk.mask, le_info.spk.mask);
    }

    #[test]
    fn continuation_ignores_crc_and_compre_bits() {
        let mut hdr1 = sample_be_header(0, 0x20, 7, true);
        let mut hdr2 = hdr1;
        hdr1[2] = 0xAA;
        hdr1[3] = 0x55;
        hdr2[2] = 0x00;
        hdr2[3] = 0xff;
        let parser = Ac3FrameParser::new();
        assert!(parser.compare_headers(&hdr1, &hdr2));
    }
}
