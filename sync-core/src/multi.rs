// audio-sync
// Copyright (c) 2026 The audio-sync Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `MultiFrameParser` composes several [`FrameParser`]s into one, so a
//! single [`super::buffer::StreamBuffer`] can auto-detect and follow
//! format changes within a stream — the AC-3 → DTS → MPA transitions
//! typical of SPDIF captures.

use crate::parser::FrameParser;
use crate::types::{FrameInfo, SyncInfo};

/// A union of child [`FrameParser`]s presenting a single `FrameParser`
/// whose `sync_info` is the union of its children's and whose
/// `parse_header`/`compare_headers` dispatch to whichever child owns the
/// header at hand.
pub struct MultiFrameParser {
    children: Vec<Box<dyn FrameParser>>,
    active: Option<usize>,
}

impl MultiFrameParser {
    pub fn new(children: Vec<Box<dyn FrameParser>>) -> Self {
        MultiFrameParser { children, active: None }
    }

    /// The currently active child's index, if any frame has been locked on.
    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    fn find_owner(&self, hdr: &[u8]) -> Option<usize> {
        self.children.iter().position(|c| c.parse_header(hdr, None))
    }
}

impl FrameParser for MultiFrameParser {
    fn sync_info(&self) -> SyncInfo {
        self.children.iter().fold(SyncInfo::none(), |acc, c| acc.union(c.sync_info()))
    }

    fn header_size(&self) -> usize {
        self.children.iter().map(|c| c.header_size()).max().unwrap_or(0)
    }

    fn parse_header(&self, hdr: &[u8], out: Option<&mut FrameInfo>) -> bool {
        match self.find_owner(hdr) {
            Some(i) => self.children[i].parse_header(hdr, out),
            None => false,
        }
    }

    fn compare_headers(&self, a: &[u8], b: &[u8]) -> bool {
        match self.find_owner(a) {
            Some(i) => self.children[i].compare_headers(a, b),
            None => false,
        }
    }

    fn first_frame(&mut self, buf: &[u8], size: usize) -> bool {
        for (i, child) in self.children.iter_mut().enumerate() {
            if child.first_frame(buf, size) {
                self.active = Some(i);
                return true;
            }
        }
        false
    }

    fn next_frame(&mut self, buf: &[u8], size: usize) -> bool {
        if let Some(i) = self.active {
            if self.children[i].next_frame(buf, size) {
                return true;
            }
            // The active child's stream ended; reset it and probe the
            // others for a format switch before giving up.
            self.children[i].reset();
            self.active = None;
        }

        for (i, child) in self.children.iter_mut().enumerate() {
            if child.first_frame(buf, size) {
                self.active = Some(i);
                return true;
            }
        }
        false
    }

    fn reset(&mut self) {
        if let Some(i) = self.active.take() {
            self.children[i].reset();
        }
    }

    fn in_sync(&self) -> bool {
        self.active.map(|i| self.children[i].in_sync()).unwrap_or(false)
    }

    fn frame_info(&self) -> FrameInfo {
        self.active.map(|i| self.children[i].frame_info()).unwrap_or_default()
    }

    fn stream_info(&self) -> String {
        match self.active {
            Some(i) => self.children[i].stream_info(),
            None => "no active stream".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::SyncTrie;

    /// A trivial test format: single-byte header, value `tag`, fixed
    /// frame size, same-stream iff the tag matches.
    struct TagParser {
        tag: u8,
        frame_size: usize,
        locked: Option<u8>,
    }

    impl TagParser {
        fn new(tag: u8, frame_size: usize) -> Self {
            TagParser { tag, frame_size, locked: None }
        }
    }

    impl FrameParser for TagParser {
        fn sync_info(&self) -> SyncInfo {
            SyncInfo::new(SyncTrie::value(self.tag as u64, 8), self.frame_size, self.frame_size)
        }

        fn header_size(&self) -> usize {
            1
        }

        fn parse_header(&self, hdr: &[u8], out: Option<&mut FrameInfo>) -> bool {
            if hdr.first() != Some(&self.tag) {
                return false;
            }
            if let Some(info) = out {
                info.frame_size = self.frame_size;
                info.nsamples = 1;
            }
            true
        }

        fn compare_headers(&self, a: &[u8], b: &[u8]) -> bool {
            a.first() == Some(&self.tag) && b.first() == Some(&self.tag)
        }

        fn first_frame(&mut self, buf: &[u8], _size: usize) -> bool {
            if self.parse_header(buf, None) {
                self.locked = Some(self.tag);
                true
            }
            else {
                false
            }
        }

        fn next_frame(&mut self, buf: &[u8], _size: usize) -> bool {
            self.locked.is_some() && self.parse_header(buf, None)
        }

        fn reset(&mut self) {
            self.locked = None;
        }

        fn in_sync(&self) -> bool {
            self.locked.is_some()
        }

        fn frame_info(&self) -> FrameInfo {
            let mut info = FrameInfo::default();
            self.parse_header(&[self.tag], Some(&mut info));
            info
        }

        fn stream_info(&self) -> String {
            format!("tag {}", self.tag)
        }
    }

    fn make_multi() -> MultiFrameParser {
        MultiFrameParser::new(vec![
            Box::new(TagParser::new(0xAA, 4)),
            Box::new(TagParser::new(0xBB, 2)),
        ])
    }

    #[test]
    fn dispatches_to_owning_child() {
        let multi = make_multi();
        assert!(multi.parse_header(&[0xAA], None));
        assert!(multi.parse_header(&[0xBB], None));
        assert!(!multi.parse_header(&[0xCC], None));
    }

    #[test]
    fn follows_a_format_switch_across_next_frame() {
        let mut multi = make_multi();
        assert!(multi.first_frame(&[0xAA], 4));
        assert_eq!(multi.active_index(), Some(0));
        assert!(multi.next_frame(&[0xAA], 4));

        // Stream switches to the other child; next_frame must detect it.
        assert!(multi.next_frame(&[0xBB], 2));
        assert_eq!(multi.active_index(), Some(1));
    }

    #[test]
    fn next_frame_fails_closed_on_unrecognized_bytes() {
        let mut multi = make_multi();
        assert!(multi.first_frame(&[0xAA], 4));
        assert!(!multi.next_frame(&[0xCC], 4));
    }
}
