// audio-sync
// Copyright (c) 2026 The audio-sync Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `StreamBuffer` turns arbitrary byte chunks into a sequence of frames and
//! debris using 3-point syncpoint confirmation (§4.7). It owns exactly one
//! [`FrameParser`] at a time and is itself generic over which one, so a
//! single-format pipeline gets static dispatch and a
//! [`crate::multi::MultiFrameParser`] consumer gets the same API for free.

use log::{debug, trace, warn};

use crate::parser::FrameParser;
use crate::sync::SyncScan;
use crate::types::FrameInfo;

/// Frame sizes above this are treated as corrupt rather than searched for,
/// so a misbehaving parser that reports an absurd `frame_size` can never
/// make `StreamBuffer` stall (§8 S6).
const SANE_FRAME_CAP: usize = 1 << 20;

/// Bounded-memory state machine that consumes arbitrary byte chunks,
/// performs 3-point synchronization, and emits frames and debris.
pub struct StreamBuffer<P: FrameParser> {
    parser: P,
    scanner: SyncScan,
    buf: Vec<u8>,
    header_cache: Vec<u8>,
    in_sync: bool,
    new_stream: bool,
    last_info: FrameInfo,
    frame_interval: usize,
    frame_count: u64,
    sync_count: u64,
    error_count: u64,
    debris: Option<(usize, usize)>,
    frame: Option<(usize, usize)>,
}

impl<P: FrameParser> StreamBuffer<P> {
    pub fn new(parser: P) -> Self {
        let scanner = SyncScan::new(parser.sync_info().trie);
        StreamBuffer {
            parser,
            scanner,
            buf: Vec::new(),
            header_cache: Vec::new(),
            in_sync: false,
            new_stream: false,
            last_info: FrameInfo::default(),
            frame_interval: 0,
            frame_count: 0,
            sync_count: 0,
            error_count: 0,
            debris: None,
            frame: None,
        }
    }

    /// Like [`StreamBuffer::new`], but pre-allocates the load window for
    /// `max_frame_size`-sized frames, per §4.7's sizing guidance (two
    /// maximum-size frames plus one header lookahead).
    pub fn with_capacity(parser: P, max_frame_size: usize, header_size: usize) -> Self {
        let mut sb = Self::new(parser);
        sb.buf.reserve(2 * max_frame_size + 2 * header_size);
        sb
    }

    /// Resets to the freshly-constructed state: drops any locked-on stream,
    /// discards buffered bytes, and clears counters associated with the
    /// discarded state. Idempotent.
    pub fn reset(&mut self) {
        self.parser.reset();
        self.buf.clear();
        self.header_cache.clear();
        self.in_sync = false;
        self.new_stream = false;
        self.last_info = FrameInfo::default();
        self.frame_interval = 0;
        self.debris = None;
        self.frame = None;
        self.scanner = SyncScan::new(self.parser.sync_info().trie);
    }

    pub fn is_in_sync(&self) -> bool {
        self.in_sync
    }

    pub fn is_new_stream(&self) -> bool {
        self.new_stream
    }

    pub fn has_frame(&self) -> bool {
        self.frame.is_some()
    }

    pub fn has_debris(&self) -> bool {
        self.debris.is_some()
    }

    /// True when buffered bytes remain that a `flush()` call would act on.
    pub fn need_flushing(&self) -> bool {
        !self.buf.is_empty()
    }

    pub fn frame_info(&self) -> FrameInfo {
        self.last_info
    }

    /// Number of frames emitted since construction or the last `reset()`.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Number of times `is_new_stream` fired (initial lock plus every
    /// stream transition).
    pub fn sync_count(&self) -> u64 {
        self.sync_count
    }

    /// Number of `SyncLost`/`CorruptFrame` conditions observed.
    pub fn error_count(&self) -> u64 {
        self.error_count
    }

    /// The debris emitted by the most recent `load()`/`flush()` call, if
    /// any. Valid until the next mutating call.
    pub fn debris(&self) -> &[u8] {
        match self.debris {
            Some((start, len)) => &self.buf[start..start + len],
            None => &[],
        }
    }

    /// The frame emitted by the most recent `load()`/`flush()` call, if
    /// any. Valid until the next mutating call.
    pub fn frame(&self) -> &[u8] {
        match self.frame {
            Some((start, len)) => &self.buf[start..start + len],
            None => &[],
        }
    }

    pub fn stream_info(&self) -> String {
        self.parser.stream_info()
    }

    /// Consumes the emission produced by the previous call, now that the
    /// caller has had a full call's worth of access to it (per §4.7/§6's
    /// "valid until the next mutating call" contract).
    fn drain_previous_emission(&mut self) {
        let consumed = match (self.debris, self.frame) {
            (None, None) => 0,
            (Some((s, l)), None) => s + l,
            (None, Some((s, l))) => s + l,
            (Some((ds, dl)), Some((fs, fl))) => (ds + dl).max(fs + fl),
        };
        if consumed > 0 {
            self.buf.drain(0..consumed);
        }
        self.debris = None;
        self.frame = None;
    }

    /// Feeds `chunk` to the buffer and advances the state machine by at
    /// most one frame and/or one debris span.
    pub fn load(&mut self, chunk: &[u8]) {
        self.drain_previous_emission();
        self.buf.extend_from_slice(chunk);
        self.new_stream = false;

        if self.in_sync {
            self.try_steady_state();
        }
        else {
            self.try_sync();
        }
    }

    /// Drops the locked-on parser state and rebuilds the scanner from its
    /// now-widened `sync_info` (§3: "transitions out of sync clear this
    /// refinement").
    fn lose_sync(&mut self) {
        self.parser.reset();
        self.in_sync = false;
        self.error_count += 1;
        self.scanner = SyncScan::new(self.parser.sync_info().trie);
        debug!("stream buffer: sync lost, resynchronizing");
    }

    /// §4.7 steps 1-4: 3-point syncpoint confirmation from scratch.
    fn try_sync(&mut self) {
        let header_size = self.parser.header_size();
        let sync_info = self.parser.sync_info();
        let min_frame = sync_info.min_frame_size.max(1);
        let max_frame = sync_info.max_frame_size.max(min_frame);

        let mut p1 = 0usize;
        while p1 + header_size <= self.buf.len() {
            let found = self.scanner.scan_pos(&self.buf[p1..], 0);
            let sync_size = self.scanner.trie().sync_size().max(1);
            if found + sync_size > self.buf.len() - p1 {
                // Not enough trailing bytes to decide; wait for more data.
                return;
            }
            let candidate = p1 + found;
            if candidate + header_size > self.buf.len() {
                return;
            }

            if !self.parser.parse_header(&self.buf[candidate..candidate + header_size], None) {
                p1 = candidate + 1;
                continue;
            }

            let mut info = FrameInfo::default();
            self.parser
                .parse_header(&self.buf[candidate..candidate + header_size], Some(&mut info));

            if info.frame_size > SANE_FRAME_CAP {
                p1 = candidate + 1;
                continue;
            }

            let (p2_lo, p2_hi) = if info.frame_size > 0 {
                (candidate + info.frame_size, candidate + info.frame_size.max(max_frame))
            }
            else {
                (candidate + min_frame, candidate + max_frame)
            };

            let mut p2_found = None;
            let mut p2 = p2_lo;
            while p2 <= p2_hi {
                if p2 + header_size > self.buf.len() {
                    if p2 == p2_lo {
                        return; // can't even try the first candidate yet
                    }
                    break;
                }
                let a_start = candidate;
                let ok = self.parser.parse_header(&self.buf[p2..p2 + header_size], None)
                    && self
                        .parser
                        .compare_headers(&self.buf[a_start..a_start + header_size], &self.buf[p2..p2 + header_size]);
                if ok {
                    p2_found = Some(p2);
                    break;
                }
                p2 += 1;
            }

            let p2 = match p2_found {
                Some(p2) => p2,
                None => {
                    if p2_hi + header_size > self.buf.len() {
                        return; // range not fully decidable yet
                    }
                    p1 = candidate + 1;
                    continue;
                }
            };

            let frame_interval = p2 - candidate;
            let p3 = p2 + frame_interval;
            if p3 + header_size > self.buf.len() {
                return;
            }

            let p3_ok = self.parser.parse_header(&self.buf[p3..p3 + header_size], None)
                && self.parser.compare_headers(&self.buf[p2..p2 + header_size], &self.buf[p3..p3 + header_size]);
            if !p3_ok {
                p1 = candidate + 1;
                continue;
            }

            let frame_size = if info.frame_size > 0 { info.frame_size } else { frame_interval };
            if !self.parser.first_frame(&self.buf[candidate..], frame_size) {
                p1 = candidate + 1;
                continue;
            }

            self.header_cache = self.buf[candidate..candidate + header_size].to_vec();
            self.last_info = self.parser.frame_info();
            if self.last_info.frame_size == 0 {
                self.last_info.frame_size = frame_size;
            }
            self.frame_interval = frame_interval;
            self.in_sync = true;
            self.new_stream = true;
            self.sync_count += 1;
            self.frame_count += 1;
            self.debris = if candidate > 0 { Some((0, candidate)) } else { None };
            self.frame = Some((candidate, frame_size));
            trace!("stream buffer: synchronized at offset {candidate}, frame_size={frame_size}");
            return;
        }
    }

    /// Steady-state advance: the next header is expected `frame_interval`
    /// bytes past the end of the previous frame's payload, with any gap
    /// (padding not counted inside `frame_size`, e.g. SPDIF zero-fill)
    /// emitted as debris ahead of it.
    fn try_steady_state(&mut self) {
        let header_size = self.parser.header_size();
        let debris_len = self.frame_interval.saturating_sub(self.last_info.frame_size);
        let header_start = debris_len;

        if header_start + header_size > self.buf.len() {
            return;
        }

        let header_ok = self.parser.parse_header(&self.buf[header_start..header_start + header_size], None)
            && self
                .parser
                .compare_headers(&self.header_cache, &self.buf[header_start..header_start + header_size]);
        if !header_ok {
            self.lose_sync();
            self.try_sync();
            return;
        }

        let mut info = FrameInfo::default();
        self.parser
            .parse_header(&self.buf[header_start..header_start + header_size], Some(&mut info));

        let tentative_size = if info.frame_size > 0 { info.frame_size } else { self.frame_interval };
        if header_start + tentative_size > self.buf.len() {
            return; // wait for the whole frame to arrive
        }

        if !self.parser.next_frame(&self.buf[header_start..], tentative_size) {
            self.lose_sync();
            self.try_sync();
            return;
        }

        self.header_cache = self.buf[header_start..header_start + header_size].to_vec();
        self.last_info = self.parser.frame_info();
        if self.last_info.frame_size == 0 {
            self.last_info.frame_size = tentative_size;
        }
        self.frame_interval = tentative_size;
        self.frame_count += 1;
        self.debris = if debris_len > 0 { Some((0, debris_len)) } else { None };
        self.frame = Some((header_start, tentative_size));
    }

    /// Best-effort release of any buffered whole frame whose terminating
    /// header has not yet been confirmed. `is_in_sync` becomes false
    /// afterwards. The final frame of an unknown-inter-frame-size stream
    /// (e.g. the trailing zero-padded SPDIF frame) cannot reliably be
    /// recovered here — its padding is only observable given the following
    /// header, which will never arrive.
    pub fn flush(&mut self) {
        self.drain_previous_emission();

        if self.buf.is_empty() {
            self.in_sync = false;
            return;
        }

        if self.in_sync {
            let header_size = self.parser.header_size();
            if self.buf.len() >= header_size
                && self.parser.parse_header(&self.buf[0..header_size], None)
            {
                let mut info = FrameInfo::default();
                self.parser.parse_header(&self.buf[0..header_size], Some(&mut info));
                let size =
                    if info.frame_size > 0 { info.frame_size } else { self.frame_interval.max(header_size) };
                let size = size.min(self.buf.len());
                if size > 0 {
                    self.frame = Some((0, size));
                }
                else {
                    self.debris = Some((0, self.buf.len()));
                }
            }
            else {
                warn!("stream buffer: flush could not confirm a trailing frame, emitting debris");
                self.debris = Some((0, self.buf.len()));
            }
        }
        else {
            self.debris = Some((0, self.buf.len()));
        }

        self.in_sync = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::SyncTrie;
    use crate::types::SyncInfo;

    /// Fixed-size single-byte-tag test format: header is `[tag, seq]`,
    /// frames are always `frame_size` bytes, same-stream iff `tag` matches.
    struct FixedParser {
        frame_size: usize,
        tag: Option<u8>,
    }

    impl FixedParser {
        fn new(frame_size: usize) -> Self {
            FixedParser { frame_size, tag: None }
        }
    }

    impl FrameParser for FixedParser {
        fn sync_info(&self) -> SyncInfo {
            SyncInfo::new(SyncTrie::wildcard(8), self.frame_size, self.frame_size)
        }

        fn header_size(&self) -> usize {
            2
        }

        fn parse_header(&self, hdr: &[u8], out: Option<&mut FrameInfo>) -> bool {
            if hdr.len() < 2 {
                return false;
            }
            if let Some(info) = out {
                info.frame_size = self.frame_size;
                info.nsamples = 1;
            }
            true
        }

        fn compare_headers(&self, a: &[u8], b: &[u8]) -> bool {
            a.first() == b.first()
        }

        fn first_frame(&mut self, buf: &[u8], _size: usize) -> bool {
            if buf.len() < 2 {
                return false;
            }
            self.tag = Some(buf[0]);
            true
        }

        fn next_frame(&mut self, buf: &[u8], _size: usize) -> bool {
            self.tag.is_some() && buf.first() == self.tag.as_ref()
        }

        fn reset(&mut self) {
            self.tag = None;
        }

        fn in_sync(&self) -> bool {
            self.tag.is_some()
        }

        fn frame_info(&self) -> FrameInfo {
            let mut info = FrameInfo::default();
            info.frame_size = self.frame_size;
            info.nsamples = 1;
            info
        }

        fn stream_info(&self) -> String {
            "fixed test stream".to_string()
        }
    }

    fn frame(tag: u8, seq: u8, size: usize) -> Vec<u8> {
        let mut v = vec![tag, seq];
        v.resize(size, 0);
        v
    }

    #[test]
    fn locks_on_after_three_matching_headers() {
        let mut sb = StreamBuffer::new(FixedParser::new(4));
        let mut stream = Vec::new();
        for i in 0..3u8 {
            stream.extend(frame(0xAA, i, 4));
        }
        sb.load(&stream);
        assert!(sb.is_in_sync());
        assert!(sb.is_new_stream());
        assert!(sb.has_frame());
        assert_eq!(sb.frame(), &frame(0xAA, 0, 4)[..]);
        assert!(!sb.has_debris());
    }

    #[test]
    fn emits_leading_debris_before_the_locked_stream() {
        let mut sb = StreamBuffer::new(FixedParser::new(4));
        let mut stream = vec![0xFF, 0xFF, 0xFF];
        for i in 0..3u8 {
            stream.extend(frame(0xAA, i, 4));
        }
        sb.load(&stream);
        assert!(sb.is_in_sync());
        assert!(sb.has_debris());
        assert_eq!(sb.debris().len(), 3);
    }

    #[test]
    fn steady_state_advances_one_frame_per_load() {
        let mut sb = StreamBuffer::new(FixedParser::new(4));
        let mut stream = Vec::new();
        for i in 0..3u8 {
            stream.extend(frame(0xAA, i, 4));
        }
        sb.load(&stream);
        assert!(sb.is_in_sync());
        assert_eq!(sb.frame_count(), 1);
        assert_eq!(sb.frame(), &frame(0xAA, 0, 4)[..]);

        // Each subsequent load() commits exactly the next buffered frame,
        // not the one just appended, since the latter only serves as this
        // step's confirmation point.
        sb.load(&frame(0xAA, 3, 4));
        assert!(sb.is_in_sync());
        assert!(!sb.is_new_stream());
        assert_eq!(sb.frame(), &frame(0xAA, 1, 4)[..]);
        assert_eq!(sb.frame_count(), 2);
    }

    #[test]
    fn flush_releases_a_trailing_buffered_frame() {
        let mut sb = StreamBuffer::new(FixedParser::new(4));
        let mut stream = Vec::new();
        for i in 0..3u8 {
            stream.extend(frame(0xAA, i, 4));
        }
        sb.load(&stream);
        assert!(sb.is_in_sync());
        sb.flush();
        assert!(!sb.is_in_sync());
        assert!(sb.has_frame());
        assert_eq!(sb.frame().len(), 4);
        assert_eq!(sb.frame()[0], 0xAA);
    }

    #[test]
    fn bad_frame_parser_cannot_stall_the_buffer() {
        struct AbsurdParser;
        impl FrameParser for AbsurdParser {
            fn sync_info(&self) -> SyncInfo {
                SyncInfo::new(SyncTrie::wildcard(8), 1, usize::MAX)
            }
            fn header_size(&self) -> usize {
                1
            }
            fn parse_header(&self, _hdr: &[u8], out: Option<&mut FrameInfo>) -> bool {
                if let Some(info) = out {
                    info.frame_size = usize::MAX / 2;
                }
                true
            }
            fn compare_headers(&self, _a: &[u8], _b: &[u8]) -> bool {
                true
            }
            fn first_frame(&mut self, _buf: &[u8], _size: usize) -> bool {
                true
            }
            fn next_frame(&mut self, _buf: &[u8], _size: usize) -> bool {
                true
            }
            fn reset(&mut self) {}
            fn in_sync(&self) -> bool {
                true
            }
            fn frame_info(&self) -> FrameInfo {
                FrameInfo::default()
            }
            fn stream_info(&self) -> String {
                String::new()
            }
        }

        let mut sb = StreamBuffer::new(AbsurdParser);
        // Must return promptly rather than attempting to scan up to
        // `usize::MAX` bytes ahead.
        sb.load(&[0u8; 64]);
        assert!(!sb.is_in_sync());
        assert!(!sb.has_frame());
    }

    #[test]
    fn reset_clears_locked_stream_and_counters_state() {
        let mut sb = StreamBuffer::new(FixedParser::new(4));
        let mut stream = Vec::new();
        for i in 0..3u8 {
            stream.extend(frame(0xAA, i, 4));
        }
        sb.load(&stream);
        assert!(sb.is_in_sync());
        sb.reset();
        assert!(!sb.is_in_sync());
        assert!(!sb.has_frame());
        assert!(!sb.has_debris());
        assert!(!sb.need_flushing());
    }
}
