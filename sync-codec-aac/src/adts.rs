// audio-sync
// Copyright (c) 2026 The audio-sync Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! AAC-ADTS (raw AAC wrapped in an ADTS frame header) header parsing.

use sync_core::{BitstreamKind, FormatTag, FrameInfo, FrameParser, SpeakerLayout, Speakers, SyncInfo, SyncTrie};

use crate::modes::{MODE_3_0, MODE_3_1, MODE_3_2, MODE_3_2_LFE, MODE_5_2_LFE, MODE_MONO, MODE_STEREO};

const HEADER_SIZE: usize = 7;

// `aac_frame_length` is a 13-bit field; the header itself is the floor.
const MIN_FRAME_SIZE: usize = HEADER_SIZE;
const MAX_FRAME_SIZE: usize = (1 << 13) - 1;

const SAMPLE_RATES: [u32; 16] =
    [96000, 88200, 64000, 48000, 44100, 32000, 24000, 22050, 16000, 12000, 11025, 8000, 7350, 0, 0, 0];

// Indexed by `channel_configuration`; index 0 ("defined by a
// program_config_element") has no layout and is rejected.
const CHANNEL_CONFIG2MASK: [Option<Speakers>; 8] = [
    None,
    Some(MODE_MONO),
    Some(MODE_STEREO),
    Some(MODE_3_0),
    Some(MODE_3_1),
    Some(MODE_3_2),
    Some(MODE_3_2_LFE),
    Some(MODE_5_2_LFE),
];

fn sync_ok(hdr: &[u8]) -> bool {
    hdr[0] == 0xff
        && (hdr[1] & 0xf0) == 0xf0 // syncword
        && (hdr[1] & 0x06) == 0x00 // layer == 0
}

fn decode(hdr: &[u8], want_info: bool) -> Option<Option<FrameInfo>> {
    if !sync_ok(hdr) {
        return None;
    }

    let sample_rate_idx = ((hdr[2] >> 2) & 0x0f) as usize;
    if sample_rate_idx >= 13 {
        return None;
    }
    let channel_config = (((hdr[2] & 0x01) << 2) | (hdr[3] >> 6)) as usize;
    let Some(mask) = CHANNEL_CONFIG2MASK[channel_config]
    else {
        return None;
    };

    let frame_length = (((hdr[3] & 0x03) as usize) << 11) | ((hdr[4] as usize) << 3) | ((hdr[5] >> 5) as usize);
    if frame_length < HEADER_SIZE {
        return None;
    }
    let num_raw_data_blocks = hdr[6] & 0x03;
    if num_raw_data_blocks != 0 {
        // Multiple raw data blocks per ADTS frame aren't followed here;
        // reported as out of sync rather than misparsed.
        return None;
    }

    if !want_info {
        return Some(None);
    }

    let sample_rate = SAMPLE_RATES[sample_rate_idx];
    let spk = SpeakerLayout::new(mask, sample_rate, FormatTag::Adts);
    let info = FrameInfo {
        spk,
        frame_size: frame_length,
        nsamples: 1024,
        bitstream_kind: BitstreamKind::Be8,
        // AAC raw frames have no IEC 61937 Pc burst-info assignment;
        // transport over SPDIF needs LATM/LOAS wrapping this parser
        // doesn't produce.
        spdif_type: 0,
    };
    Some(Some(info))
}

/// AAC-ADTS frame header parser.
#[derive(Debug, Default)]
pub struct AdtsFrameParser {
    locked: bool,
    header: [u8; HEADER_SIZE],
    info: FrameInfo,
}

impl AdtsFrameParser {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameParser for AdtsFrameParser {
    fn sync_info(&self) -> SyncInfo {
        // 12-bit syncword, 2 fixed "layer" bits, and the MPEG version /
        // CRC-protection bits left as wildcards since both occur in the
        // wild.
        let trie = SyncTrie::value(0xff, 8)
            + SyncTrie::value(0xf, 4)
            + SyncTrie::wildcard(1)
            + SyncTrie::value(0x0, 2)
            + SyncTrie::wildcard(1);
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
        if a.len() < HEADER_SIZE
            || b.len() < HEADER_SIZE
            || !self.parse_header(a, None)
            || !self.parse_header(b, None)
        {
            return false;
        }
        // Profile, sample rate, private bit and channel configuration all
        // live in the first 28 bits; frame length, buffer fullness and the
        // raw-data-block count are allowed to vary frame to frame.
        a[0] == b[0] && a[1] == b[1] && a[2] == b[2] && (a[3] & 0xfc) == (b[3] & 0xfc)
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
                "AAC-ADTS {} Hz, {} channels, {} byte frames",
                self.info.spk.sample_rate,
                self.info.spk.channel_count(),
                self.info.frame_size
            )
        }
        else {
            "AAC-ADTS (not locked)".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_header(sample_rate_idx: u8, channel_config: u8, frame_length: u16) -> [u8; HEADER_SIZE] {
        let mut hdr = [0u8; HEADER_SIZE];
        hdr[0] = 0xff;
        hdr[1] = 0xf1; // MPEG-4, layer 0, no CRC
        hdr[2] = (1 << 6) | (sample_rate_idx << 2) | ((channel_config >> 2) & 0x01);
        hdr[3] = ((channel_config & 0x03) << 6) | ((frame_length >> 11) as u8 & 0x03);
        hdr[4] = (frame_length >> 3) as u8;
        hdr[5] = ((frame_length & 0x07) as u8) << 5;
        hdr[6] = 0;
        hdr
    }

    #[test]
    fn parses_stereo_44k1_frame() {
        let hdr = sample_header(4, 2, 300);
        let parser = AdtsFrameParser::new();
        let mut info = FrameInfo::default();
        assert!(parser.parse_header(&hdr, Some(&mut info)));
        assert_eq!(info.spk.sample_rate, 44100);
        assert_eq!(info.spk.mask, MODE_STEREO);
        assert_eq!(info.frame_size, 300);
        assert_eq!(info.nsamples, 1024);
        assert_eq!(info.spdif_type, 0);
    }

    #[test]
    fn rejects_pce_defined_channel_config() {
        let hdr = sample_header(4, 0, 300);
        let parser = AdtsFrameParser::new();
        assert!(!parser.parse_header(&hdr, None));
    }

    #[test]
    fn rejects_reserved_sample_rate_and_short_frame_length() {
        let parser = AdtsFrameParser::new();
        assert!(!parser.parse_header(&sample_header(13, 2, 300), None));
        assert!(!parser.parse_header(&sample_header(4, 2, 3), None));
    }

    #[test]
    fn rejects_multiple_raw_data_blocks() {
        let mut hdr = sample_header(4, 2, 300);
        hdr[6] |= 0x01;
        let parser = AdtsFrameParser::new();
        assert!(!parser.parse_header(&hdr, None));
    }

    #[test]
    fn compare_headers_allows_frame_length_to_vary() {
        let parser = AdtsFrameParser::new();
        let a = sample_header(4, 2, 300);
        let b = sample_header(4, 2, 320);
        assert!(parser.compare_headers(&a, &b));
    }

    #[test]
    fn compare_headers_rejects_sample_rate_change() {
        let parser = AdtsFrameParser::new();
        let a = sample_header(4, 2, 300);
        let b = sample_header(5, 2, 300);
        assert!(!parser.compare_headers(&a, &b));
    }

    #[test]
    fn seven_one_channel_config_maps_to_5_2_lfe() {
        let hdr = sample_header(3, 7, 400);
        let parser = AdtsFrameParser::new();
        let mut info = FrameInfo::default();
        assert!(parser.parse_header(&hdr, Some(&mut info)));
        assert_eq!(info.spk.mask, MODE_5_2_LFE);
    }
}
