// audio-sync
// Copyright (c) 2026 The audio-sync Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Recognizes an IEC 61937 carrier: either a full burst preamble wrapping
//! AC-3/MPA/DTS (dispatched by Pc), or a bare 16-bit/14-bit little-endian
//! DTS frame padded to packet size with no preamble at all.

use sync_core::{BitstreamKind, FormatTag, FrameInfo, FrameParser, SyncInfo, SyncTrie};

use sync_codec_ac3::Ac3FrameParser;
use sync_codec_dts::DtsFrameParser;
use sync_codec_mpa::MpaFrameParser;

use crate::header;

// The burst header (16 bytes) plus the widest inner header (DTS, 16
// bytes): enough for `parse_header` to see both without re-reading past
// its declared size.
const HEADER_SIZE: usize = header::HEADER_SIZE + 16;

// `4 * nsamples` across every carried nsamples value named in the spec
// (`{384, 576, 1152, 1536, 512, 1024, 2048}`).
const MIN_FRAME_SIZE: usize = 4 * 384;
const MAX_FRAME_SIZE: usize = 4 * 2048;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Wrapped(header::Inner),
    Padded,
}

fn classify(hdr: &[u8], info: &mut FrameInfo) -> Option<Shape> {
    if header::has_preamble(hdr) {
        let (pc, _pd) = header::read_pc_pd(hdr);
        let inner = header::inner_for_pc(pc)?;
        if hdr.len() < HEADER_SIZE {
            return None;
        }
        let payload = &hdr[header::HEADER_SIZE..];
        let ok = match inner {
            header::Inner::Ac3 => Ac3FrameParser::new().parse_header(payload, Some(info)),
            header::Inner::Mpa => MpaFrameParser::new().parse_header(payload, Some(info)),
            header::Inner::Dts => DtsFrameParser::new().parse_header(payload, Some(info)),
        };
        ok.then_some(Shape::Wrapped(inner))
    }
    else {
        let ok = DtsFrameParser::new().parse_header(hdr, Some(info));
        if ok && matches!(info.bitstream_kind, BitstreamKind::Le16 | BitstreamKind::Le14) {
            Some(Shape::Padded)
        }
        else {
            None
        }
    }
}

fn decode(hdr: &[u8], want_info: bool) -> Option<Option<FrameInfo>> {
    let mut info = FrameInfo::default();
    let shape = classify(hdr, &mut info)?;
    if !want_info {
        return Some(None);
    }

    match shape {
        Shape::Wrapped(_) => {
            info.spk.format = FormatTag::Spdif;
            info.bitstream_kind = BitstreamKind::Le16;
        }
        Shape::Padded => {
            // Tag stays DTS; only the packet stride changes.
        }
    }
    info.frame_size = 4 * info.nsamples as usize;
    Some(Some(info))
}

/// Recognizes IEC 61937 burst-wrapped and padded-DTS SPDIF carriers.
#[derive(Debug, Default)]
pub struct SpdifFrameParser {
    locked: bool,
    header: [u8; HEADER_SIZE],
    info: FrameInfo,
}

impl SpdifFrameParser {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameParser for SpdifFrameParser {
    fn sync_info(&self) -> SyncInfo {
        // 8 zero bytes + the 4-byte Pa/Pb sync, unioned with every native
        // DTS syncword (the padded shapes carry no burst header at all).
        let preamble = SyncTrie::value(0, 64) + SyncTrie::value(0x72f8_1f4e, 32);
        let trie = preamble | DtsFrameParser::new().sync_info().trie;
        SyncInfo::new(trie, MIN_FRAME_SIZE, MAX_FRAME_SIZE)
    }

    fn header_size(&self) -> usize {
        HEADER_SIZE
    }

    fn parse_header(&self, hdr: &[u8], out: Option<&mut FrameInfo>) -> bool {
        if hdr.len() < HEADER_SIZE {
            return false;
        }
        match decode(hdr, out.is_some()) {
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
        let mut ia = FrameInfo::default();
        let mut ib = FrameInfo::default();
        let (Some(sa), Some(sb)) = (classify(a, &mut ia), classify(b, &mut ib))
        else {
            return false;
        };
        match (sa, sb) {
            (Shape::Wrapped(inner_a), Shape::Wrapped(inner_b)) if inner_a == inner_b => {
                let payload_a = &a[header::HEADER_SIZE..];
                let payload_b = &b[header::HEADER_SIZE..];
                match inner_a {
                    header::Inner::Ac3 => Ac3FrameParser::new().compare_headers(payload_a, payload_b),
                    header::Inner::Mpa => MpaFrameParser::new().compare_headers(payload_a, payload_b),
                    header::Inner::Dts => DtsFrameParser::new().compare_headers(payload_a, payload_b),
                }
            }
            (Shape::Padded, Shape::Padded) => DtsFrameParser::new().compare_headers(a, b),
            _ => false,
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
            format!("SPDIF {} byte packets, inner {:?}", self.info.frame_size, self.info.spk.format)
        }
        else {
            "SPDIF (not locked)".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ac3_payload() -> [u8; 8] {
        // fscod=0 (48kHz), frmsizecod=0x20, bsid=1, acmod=7 (3/2), no LFE.
        let mut hdr = [0u8; 8];
        hdr[0] = 0x0b;
        hdr[1] = 0x77;
        hdr[4] = 0x20;
        hdr[5] = 0x08;
        hdr[6] = 7 << 5;
        hdr
    }

    fn wrapped_ac3_header() -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        header::write_header(&mut buf, 1, 0);
        buf[header::HEADER_SIZE..header::HEADER_SIZE + 8].copy_from_slice(&ac3_payload());
        buf
    }

    #[test]
    fn recognizes_wrapped_ac3_and_retags_spdif() {
        let hdr = wrapped_ac3_header();
        let parser = SpdifFrameParser::new();
        let mut info = FrameInfo::default();
        assert!(parser.parse_header(&hdr, Some(&mut info)));
        assert_eq!(info.spk.format, FormatTag::Spdif);
        assert_eq!(info.frame_size, 4 * 1536);
        assert_eq!(info.bitstream_kind, BitstreamKind::Le16);
    }

    #[test]
    fn rejects_unknown_pc_code() {
        let mut buf = [0u8; HEADER_SIZE];
        header::write_header(&mut buf, 31, 0);
        let parser = SpdifFrameParser::new();
        assert!(!parser.parse_header(&buf, None));
    }

    // Builds a DTS core header per sync-codec-dts's BE16 field formulas,
    // then byte-pair-swaps it into the Le16 wire form used by the padded
    // (no-SPDIF-header) carrier shape.
    fn sample_dts_le16_header(nblks: u8, amode: u8, sfreq: u8, lff: u8) -> [u8; HEADER_SIZE] {
        let mut be = [0u8; 16];
        be[0] = 0x7f;
        be[1] = 0xfe;
        be[2] = 0x80;
        be[3] = 0x01;

        let nblks_field = u32::from(nblks - 1);
        let word2 = (nblks_field & 0x7f) << 2;
        be[4] = (word2 >> 8) as u8;
        be[5] = word2 as u8;

        let a = u32::from(amode);
        let word3 = (a >> 2) & 0x03;
        be[6] = (word3 >> 8) as u8;
        be[7] = word3 as u8;

        let word4 = (((a & 0x01) << 14) | (((a >> 1) & 0x01) << 15)) | ((u32::from(sfreq) & 0x0f) << 10);
        be[8] = (word4 >> 8) as u8;
        be[9] = word4 as u8;

        let word5 = (u32::from(lff) & 0x03) << 9;
        be[10] = (word5 >> 8) as u8;
        be[11] = word5 as u8;

        for i in 0..8 {
            be.swap(2 * i, 2 * i + 1);
        }
        let mut out = [0u8; HEADER_SIZE];
        out[..16].copy_from_slice(&be);
        out
    }

    #[test]
    fn recognizes_padded_dts_le16_without_preamble() {
        let buf = sample_dts_le16_header(16, 9, 13, 1);
        let parser = SpdifFrameParser::new();
        let mut info = FrameInfo::default();
        assert!(parser.parse_header(&buf, Some(&mut info)));
        assert_eq!(info.spk.format, FormatTag::Dts);
        assert_eq!(info.bitstream_kind, BitstreamKind::Le16);
        assert_eq!(info.frame_size, 4 * info.nsamples as usize);
    }

    #[test]
    fn does_not_recognize_a_be16_padded_dts_header() {
        // The padded carrier shape is LE-only; a BE16 DTS header with no
        // preamble isn't a valid SPDIF carrier even though it's perfectly
        // valid DTS on its own (sync-codec-dts decodes it fine).
        let le = sample_dts_le16_header(16, 9, 13, 1);
        let mut be = [0u8; HEADER_SIZE];
        be[..16].copy_from_slice(&le[..16]);
        for i in 0..8 {
            be.swap(2 * i, 2 * i + 1);
        }
        assert!(DtsFrameParser::new().parse_header(&be, None));

        let parser = SpdifFrameParser::new();
        assert!(!parser.parse_header(&be, None));
    }
}
