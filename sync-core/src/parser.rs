// audio-sync
// Copyright (c) 2026 The audio-sync Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `FrameParser` trait every format (AC-3, E-AC-3, DTS, MPA, ADTS,
//! SPDIF) implements, and the contract [`super::buffer::StreamBuffer`] and
//! [`super::multi::MultiFrameParser`] are built against.
//!
//! Implementations are plain structs so the hot `parse_header`/
//! `compare_headers` path can be statically dispatched when a caller only
//! ever needs one format; [`super::multi::MultiFrameParser`] is where
//! dynamic dispatch (`Box<dyn FrameParser>`) earns its keep, since the set
//! of candidate formats is only known at configuration time.

use crate::types::{FrameInfo, SyncInfo};

/// A per-format frame header parser and per-stream state machine.
///
/// `parse_header`/`compare_headers` are pure functions of the bytes given
/// to them; `first_frame`/`next_frame`/`reset` additionally carry the
/// parser's own notion of "the stream I'm currently locked to" (a header
/// byte copy, and any refined [`SyncInfo`] learned once in sync).
pub trait FrameParser {
    /// The widest [`SyncInfo`] this format ever accepts, used to build the
    /// scanner and to size buffers before any stream-specific refinement.
    fn sync_info(&self) -> SyncInfo;

    /// Minimum number of bytes `parse_header` needs to make a decision.
    fn header_size(&self) -> usize;

    /// Returns true iff the leading `header_size()` bytes of `hdr` form a
    /// valid header of this format. Must not read past `header_size()`
    /// bytes. When `out` is given, populates it on success.
    fn parse_header(&self, hdr: &[u8], out: Option<&mut FrameInfo>) -> bool;

    /// Returns true iff `a` and `b` are both valid headers of this format
    /// *and* belong to the same stream (matching sample rate, channel
    /// layout, layer/profile, bitstream kind, per the format's own rules).
    fn compare_headers(&self, a: &[u8], b: &[u8]) -> bool;

    /// Called with a candidate full frame. Validates it and, on success,
    /// locks onto its stream: stores a header copy and refines the
    /// parser's own `sync_info` (e.g. fixing a previously-wildcard
    /// bitstream kind or constraining the frame-size range).
    fn first_frame(&mut self, buf: &[u8], size: usize) -> bool;

    /// Called with a subsequent candidate frame; must share the stream
    /// locked by the prior `first_frame`/`next_frame` call.
    fn next_frame(&mut self, buf: &[u8], size: usize) -> bool;

    /// Drops any locked-on stream state. Idempotent.
    fn reset(&mut self);

    /// True after a successful `first_frame`/`next_frame`, cleared by
    /// `reset` or by a failed `next_frame`.
    fn in_sync(&self) -> bool;

    /// The `FrameInfo` of the most recently accepted frame. Unspecified
    /// (but not unsafe to call) before the first successful
    /// `first_frame`.
    fn frame_info(&self) -> FrameInfo;

    /// A one-line diagnostic summary of the locked stream, for logging.
    fn stream_info(&self) -> String;
}

impl<P: FrameParser + ?Sized> FrameParser for Box<P> {
    fn sync_info(&self) -> SyncInfo {
        (**self).sync_info()
    }

    fn header_size(&self) -> usize {
        (**self).header_size()
    }

    fn parse_header(&self, hdr: &[u8], out: Option<&mut FrameInfo>) -> bool {
        (**self).parse_header(hdr, out)
    }

    fn compare_headers(&self, a: &[u8], b: &[u8]) -> bool {
        (**self).compare_headers(a, b)
    }

    fn first_frame(&mut self, buf: &[u8], size: usize) -> bool {
        (**self).first_frame(buf, size)
    }

    fn next_frame(&mut self, buf: &[u8], size: usize) -> bool {
        (**self).next_frame(buf, size)
    }

    fn reset(&mut self) {
        (**self).reset()
    }

    fn in_sync(&self) -> bool {
        (**self).in_sync()
    }

    fn frame_info(&self) -> FrameInfo {
        (**self).frame_info()
    }

    fn stream_info(&self) -> String {
        (**self).stream_info()
    }
}
