// audio-sync
// Copyright (c) 2026 The audio-sync Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `SyncScan` turns a [`SyncTrie`] into a fast leftmost-match scanner by
//! precomputing a 65536-bit (8 KiB) lookup table over 16-bit window
//! prefixes. The table rejects most non-matching windows in roughly one
//! bit-test; the trie itself is only consulted, for exactness, on a
//! booster hit.

use super::trie::SyncTrie;

const BOOSTER_WORDS: usize = 65_536 / 64;

/// A scanner compiled from an (optimized) [`SyncTrie`].
pub struct SyncScan {
    trie: SyncTrie,
    booster: Box<[u64; BOOSTER_WORDS]>,
}

fn set_range(booster: &mut [u64; BOOSTER_WORDS], from: u32, to_exclusive: u32) {
    for idx in from..to_exclusive {
        booster[(idx / 64) as usize] |= 1u64 << (idx % 64);
    }
}

/// Floods the 16-bit prefix table from the trie, recursing at most 16
/// levels deep. `prefix`/`depth` track the bits fixed so far.
fn flood(trie: &SyncTrie, booster: &mut [u64; BOOSTER_WORDS], prefix: u16, depth: u32) {
    if depth == 16 {
        // Undecided beyond the booster's horizon: mark as a possible match
        // so the caller falls through to full trie verification.
        set_range(booster, prefix as u32, prefix as u32 + 1);
        return;
    }

    let remaining = 16 - depth;
    // Probe both completions of the next bit using the trie itself: since
    // SyncTrie exposes no node-walking API beyond `is_sync`, probe with the
    // two candidate next-bit values extended to a full byte-aligned buffer
    // and let `is_sync` tell us whether that bit leads to Allow, Deny, or
    // needs more bits than we've supplied (treated conservatively as "more
    // bits needed").
    for bit in 0u16..2 {
        let next_prefix = (prefix << 1) | bit;
        let extended_depth = depth + 1;

        if trie_accepts_prefix(trie, next_prefix, extended_depth) {
            set_range(booster, (next_prefix as u32) << remaining.saturating_sub(1), (next_prefix as u32 + 1) << remaining.saturating_sub(1));
        }
        else if trie_rejects_prefix(trie, next_prefix, extended_depth) {
            // Entire subtree is Deny: leave its range unmarked (zero).
        }
        else {
            flood(trie, booster, next_prefix, extended_depth);
        }
    }
}

/// True iff every completion of `prefix` (`depth` bits, MSB-first) is
/// accepted by `trie` at or before `depth` bits (an `Allow` is reached
/// using only the given prefix bits).
fn trie_accepts_prefix(trie: &SyncTrie, prefix: u16, depth: u32) -> bool {
    let bytes = prefix_to_bytes(prefix, depth);
    trie.is_sync(&bytes) && trie.depth() <= depth
}

/// True iff `prefix` is definitely not the start of any accepted sequence,
/// i.e. extending it with `trie.depth()` more zero bits still does not
/// accept, and extending with ones does not either. A conservative
/// approximation is used: if the trie's own depth is within `depth` bits
/// and it still does not accept, the prefix leads nowhere.
fn trie_rejects_prefix(trie: &SyncTrie, prefix: u16, depth: u32) -> bool {
    if trie.depth() > depth {
        return false;
    }
    let bytes = prefix_to_bytes(prefix, depth);
    !trie.is_sync(&bytes)
}

fn prefix_to_bytes(prefix: u16, depth: u32) -> [u8; 2] {
    let shifted = (prefix as u32) << (16 - depth);
    [(shifted >> 8) as u8, shifted as u8]
}

impl SyncScan {
    /// Compiles a scanner from `trie`. The trie is optimized first so the
    /// booster-construction flood fill runs over canonical form.
    pub fn new(trie: SyncTrie) -> Self {
        let trie = trie.optimize();
        let mut booster = Box::new([0u64; BOOSTER_WORDS]);
        flood(&trie, &mut booster, 0, 0);
        SyncScan { trie, booster }
    }

    /// The compiled trie this scanner was built from.
    pub fn trie(&self) -> &SyncTrie {
        &self.trie
    }

    #[inline]
    fn booster_hit(&self, prefix16: u16) -> bool {
        let idx = prefix16 as usize;
        (self.booster[idx / 64] >> (idx % 64)) & 1 != 0
    }

    /// Returns the leftmost position at or after `start` where `buf`
    /// contains an accepted syncword, or `buf.len() - sync_size + 1` if no
    /// position with enough trailing bytes to fully decide was found (the
    /// caller should keep the last `sync_size - 1` bytes in case more data
    /// arrives). Never reports a false positive.
    pub fn scan_pos(&self, buf: &[u8], start: usize) -> usize {
        let sync_size = self.trie.sync_size().max(1);
        let size = buf.len();
        let limit = size.saturating_sub(sync_size);

        let mut pos = start;
        while pos <= limit && pos < size {
            let hit = if pos + 2 <= size {
                let prefix = ((buf[pos] as u16) << 8) | buf[pos + 1] as u16;
                self.booster_hit(prefix)
            }
            else {
                // Fewer than 16 bits available for the booster window;
                // fall straight through to the trie.
                true
            };

            if hit && self.trie.is_sync(&buf[pos..]) {
                return pos;
            }
            pos += 1;
        }
        size.saturating_sub(sync_size) + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_leftmost_occurrence() {
        let scan = SyncScan::new(SyncTrie::value(0x0B77, 16));
        let buf = [0x00, 0x11, 0x0B, 0x77, 0xFF, 0x0B, 0x77];
        assert_eq!(scan.scan_pos(&buf, 0), 2);
        assert_eq!(scan.scan_pos(&buf, 3), 5);
    }

    #[test]
    fn reports_sentinel_when_no_full_match_possible() {
        let scan = SyncScan::new(SyncTrie::value(0x0B77, 16));
        let buf = [0x00, 0x11, 0x22];
        assert_eq!(scan.scan_pos(&buf, 0), buf.len() - 2 + 1);
    }

    #[test]
    fn idempotent_across_repeated_calls() {
        let scan = SyncScan::new(SyncTrie::value(0x7FFE, 16));
        let buf = [0x00, 0x7F, 0xFE, 0x11, 0x7F, 0xFE];
        let a = scan.scan_pos(&buf, 0);
        let b = scan.scan_pos(&buf, 0);
        assert_eq!(a, b);
    }

    #[test]
    fn never_false_positives_on_random_noise() {
        use rand::rngs::SmallRng;
        use rand::{Rng, SeedableRng};

        let scan = SyncScan::new(SyncTrie::value(0x64582025, 32));
        let mut rng = SmallRng::seed_from_u64(0xA17_5EED);
        let mut hits = 0usize;
        for _ in 0..64 {
            let buf: Vec<u8> = (0..4096).map(|_| rng.gen::<u8>()).collect();
            let mut pos = 0;
            while pos < buf.len() {
                let found = scan.scan_pos(&buf, pos);
                if found + 4 > buf.len() {
                    break;
                }
                assert!(scan.trie().is_sync(&buf[found..]));
                hits += 1;
                pos = found + 1;
            }
        }
        // A 32-bit marker essentially never collides in 256 KiB of noise.
        assert_eq!(hits, 0);
    }
}
