// audio-sync
// Copyright (c) 2026 The audio-sync Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `SyncTrie` is a compact, immutable, structurally-shared bit-trie over
//! syncword languages. It is the boolean-predicate building block every
//! `FrameParser::sync_info` is expressed in terms of, and the input
//! [`super::scan::SyncScan`] compiles its 16-bit lookup booster from.
//!
//! A trie is a DAG of interior nodes with two branches (`zero`, `one`) whose
//! leaves are one of two sentinel terminals, `Allow` or `Deny`. Depth is
//! defined as the length of the longest root-to-`Allow` path — this is what
//! bounds how many bytes a decision requires (`sync_size`).

use std::fmt;
use std::rc::Rc;

/// A node's branch: either a decided terminal, or a further subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Link {
    Allow,
    Deny,
    Node(Rc<TrieNode>),
}

#[derive(Debug, PartialEq, Eq)]
struct TrieNode {
    zero: Link,
    one: Link,
}

/// Error returned by [`SyncTrie::deserialize`] when the input is not a valid
/// postorder symbolic trie encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncTrieParseError {
    /// Character offset of the symbol that could not be interpreted, or of
    /// the end of input if the stack did not reduce to a single root.
    pub offset: usize,
}

impl fmt::Display for SyncTrieParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed sync trie encoding at offset {}", self.offset)
    }
}

impl std::error::Error for SyncTrieParseError {}

/// A compact prefix trie accepting a set of fixed-length bit patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncTrie {
    root: Link,
    depth: u32,
}

/// The longest root-to-`Allow` path in bits, or `None` if no path through
/// this subtree ever reaches `Allow`.
fn accepting_depth(link: &Link) -> Option<u32> {
    match link {
        Link::Allow => Some(0),
        Link::Deny => None,
        Link::Node(n) => match (accepting_depth(&n.zero), accepting_depth(&n.one)) {
            (None, None) => None,
            (Some(a), None) => Some(1 + a),
            (None, Some(b)) => Some(1 + b),
            (Some(a), Some(b)) => Some(1 + a.max(b)),
        },
    }
}

fn value_link(value: u64, bits: u32) -> Link {
    if bits == 0 {
        return Link::Allow;
    }
    let bit = (value >> (bits - 1)) & 1;
    let rest = value_link(value, bits - 1);
    if bit == 0 {
        Link::Node(Rc::new(TrieNode { zero: rest, one: Link::Deny }))
    }
    else {
        Link::Node(Rc::new(TrieNode { zero: Link::Deny, one: rest }))
    }
}

fn wildcard_link(bits: u32) -> Link {
    if bits == 0 {
        return Link::Allow;
    }
    let rest = wildcard_link(bits - 1);
    Link::Node(Rc::new(TrieNode { zero: rest.clone(), one: rest }))
}

fn merge_link(a: &Link, b: &Link) -> Link {
    match (a, b) {
        (Link::Allow, _) | (_, Link::Allow) => Link::Allow,
        (Link::Deny, _) => b.clone(),
        (_, Link::Deny) => a.clone(),
        (Link::Node(na), Link::Node(nb)) => {
            let zero = merge_link(&na.zero, &nb.zero);
            let one = merge_link(&na.one, &nb.one);
            Link::Node(Rc::new(TrieNode { zero, one }))
        }
    }
}

fn append_link(a: &Link, other_root: &Link) -> Link {
    match a {
        Link::Allow => other_root.clone(),
        Link::Deny => Link::Deny,
        Link::Node(n) => Link::Node(Rc::new(TrieNode {
            zero: append_link(&n.zero, other_root),
            one: append_link(&n.one, other_root),
        })),
    }
}

fn invert_link(a: &Link) -> Link {
    match a {
        Link::Allow => Link::Deny,
        Link::Deny => Link::Allow,
        Link::Node(n) => {
            Link::Node(Rc::new(TrieNode { zero: invert_link(&n.zero), one: invert_link(&n.one) }))
        }
    }
}

/// Bottom-up: collapse a node whose children are the same terminal into
/// that terminal, and share (rather than duplicate) identical non-terminal
/// sibling subtrees so the DAG stays bounded in size.
fn optimize_link(link: &Link) -> Link {
    match link {
        Link::Allow => Link::Allow,
        Link::Deny => Link::Deny,
        Link::Node(n) => {
            let zero = optimize_link(&n.zero);
            let one = optimize_link(&n.one);
            match (&zero, &one) {
                (Link::Allow, Link::Allow) => Link::Allow,
                (Link::Deny, Link::Deny) => Link::Deny,
                _ => {
                    if zero == one {
                        Link::Node(Rc::new(TrieNode { zero: zero.clone(), one: zero }))
                    }
                    else {
                        Link::Node(Rc::new(TrieNode { zero, one }))
                    }
                }
            }
        }
    }
}

fn serialize_rec(link: &Link, out: &mut String) {
    let n = match link {
        Link::Node(n) => n,
        _ => unreachable!("serialize_rec is only called on interior nodes"),
    };
    match (&n.zero, &n.one) {
        (Link::Allow, Link::Allow) => out.push('A'),
        (Link::Deny, Link::Deny) => out.push('D'),
        (Link::Allow, Link::Deny) => out.push('O'),
        (Link::Deny, Link::Allow) => out.push('I'),
        (Link::Allow, one @ Link::Node(_)) => {
            serialize_rec(one, out);
            out.push('L');
        }
        (zero @ Link::Node(_), Link::Allow) => {
            serialize_rec(zero, out);
            out.push('R');
        }
        (Link::Deny, one @ Link::Node(_)) => {
            serialize_rec(one, out);
            out.push('o');
        }
        (zero @ Link::Node(_), Link::Deny) => {
            serialize_rec(zero, out);
            out.push('i');
        }
        (zero, one) if zero == one => {
            serialize_rec(zero, out);
            out.push('x');
        }
        (zero, one) => {
            serialize_rec(zero, out);
            serialize_rec(one, out);
            out.push('*');
        }
    }
}

impl SyncTrie {
    fn from_root(root: Link) -> Self {
        let depth = accepting_depth(&root).unwrap_or(0);
        SyncTrie { root, depth }
    }

    /// The universal-deny trie: accepts nothing, depth 0.
    pub fn deny() -> Self {
        SyncTrie { root: Link::Deny, depth: 0 }
    }

    /// The universal-allow trie: accepts the empty bit string, depth 0.
    pub fn allow() -> Self {
        SyncTrie { root: Link::Allow, depth: 0 }
    }

    /// Accepts exactly the `bits`-bit big-endian encoding of `value`.
    pub fn value(value: u64, bits: u32) -> Self {
        assert!(bits <= 64, "sync patterns wider than 64 bits are not supported");
        Self::from_root(value_link(value, bits))
    }

    /// Accepts any `bits`-bit value (a wildcard field).
    pub fn wildcard(bits: u32) -> Self {
        assert!(bits <= 64, "sync patterns wider than 64 bits are not supported");
        Self::from_root(wildcard_link(bits))
    }

    /// True iff this trie accepts nothing (the universal-deny language).
    pub fn is_empty(&self) -> bool {
        matches!(self.root, Link::Deny)
    }

    /// Length, in bits, of the longest accepting path.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Number of bytes needed to decide acceptance: `ceil(depth / 8)`.
    pub fn sync_size(&self) -> usize {
        ((self.depth as usize) + 7) / 8
    }

    /// Walks `buf` bit-by-bit, MSB-first, and returns true at the first
    /// `Allow` terminal reached. Returns false if a `Deny` terminal is
    /// reached, or if `buf` runs out before a decision can be made (never a
    /// false positive, per the component contract in §4.1).
    pub fn is_sync(&self, buf: &[u8]) -> bool {
        let mut link = &self.root;
        let mut bit_pos = 0usize;
        loop {
            match link {
                Link::Allow => return true,
                Link::Deny => return false,
                Link::Node(n) => {
                    let byte_idx = bit_pos / 8;
                    if byte_idx >= buf.len() {
                        return false;
                    }
                    let bit = (buf[byte_idx] >> (7 - (bit_pos % 8))) & 1;
                    link = if bit == 0 { &n.zero } else { &n.one };
                    bit_pos += 1;
                }
            }
        }
    }

    /// Swaps `Allow` and `Deny` terminals throughout, producing the
    /// complement language over strings of length `depth()`.
    pub fn invert(&self) -> Self {
        Self::from_root(invert_link(&self.root))
    }

    /// Canonicalizes the trie: collapses uniform subtrees to their terminal
    /// and shares identical sibling subgraphs.
    pub fn optimize(&self) -> Self {
        Self::from_root(optimize_link(&self.root))
    }

    /// Serializes the trie to the postorder symbolic form described in §3:
    /// `A`/`D` for both-terminal nodes, `O`/`I` for mixed-terminal nodes,
    /// `L`/`R`/`o`/`i` for one-terminal-one-recursing nodes, `x` for
    /// identical children, `*` for two distinct recursing children. A bare
    /// universal `Allow`/`Deny` trie serializes to the single character
    /// `"A"`/`"D"`.
    pub fn serialize(&self) -> String {
        match &self.root {
            Link::Allow => "A".to_string(),
            Link::Deny => "D".to_string(),
            node @ Link::Node(_) => {
                let mut out = String::new();
                serialize_rec(node, &mut out);
                out
            }
        }
    }

    /// Inverse of [`SyncTrie::serialize`]. Returns the offset of the first
    /// unrecognized symbol, or of the end of input if the stack did not
    /// reduce to exactly one root, on malformed input.
    pub fn deserialize(s: &str) -> Result<Self, SyncTrieParseError> {
        if s == "A" {
            return Ok(Self::allow());
        }
        if s == "D" {
            return Ok(Self::deny());
        }

        let mut stack: Vec<Link> = Vec::new();
        for (offset, ch) in s.char_indices() {
            let pop = |stack: &mut Vec<Link>| stack.pop().ok_or(SyncTrieParseError { offset });
            let link = match ch {
                'A' => Link::Node(Rc::new(TrieNode { zero: Link::Allow, one: Link::Allow })),
                'D' => Link::Node(Rc::new(TrieNode { zero: Link::Deny, one: Link::Deny })),
                'O' => Link::Node(Rc::new(TrieNode { zero: Link::Allow, one: Link::Deny })),
                'I' => Link::Node(Rc::new(TrieNode { zero: Link::Deny, one: Link::Allow })),
                'L' => {
                    let one = pop(&mut stack)?;
                    Link::Node(Rc::new(TrieNode { zero: Link::Allow, one }))
                }
                'o' => {
                    let one = pop(&mut stack)?;
                    Link::Node(Rc::new(TrieNode { zero: Link::Deny, one }))
                }
                'R' => {
                    let zero = pop(&mut stack)?;
                    Link::Node(Rc::new(TrieNode { zero, one: Link::Allow }))
                }
                'i' => {
                    let zero = pop(&mut stack)?;
                    Link::Node(Rc::new(TrieNode { zero, one: Link::Deny }))
                }
                'x' => {
                    let shared = pop(&mut stack)?;
                    Link::Node(Rc::new(TrieNode { zero: shared.clone(), one: shared }))
                }
                '*' => {
                    let one = pop(&mut stack)?;
                    let zero = pop(&mut stack)?;
                    Link::Node(Rc::new(TrieNode { zero, one }))
                }
                _ => return Err(SyncTrieParseError { offset }),
            };
            stack.push(link);
        }

        if stack.len() != 1 {
            return Err(SyncTrieParseError { offset: s.len() });
        }
        Ok(Self::from_root(stack.pop().unwrap()))
    }
}

impl std::ops::BitOr for SyncTrie {
    type Output = SyncTrie;
    /// Union: accepts `{s : self(s) || rhs(s)}`.
    fn bitor(self, rhs: SyncTrie) -> SyncTrie {
        SyncTrie::from_root(merge_link(&self.root, &rhs.root))
    }
}

impl std::ops::BitOrAssign for SyncTrie {
    fn bitor_assign(&mut self, rhs: SyncTrie) {
        *self = SyncTrie::from_root(merge_link(&self.root, &rhs.root));
    }
}

impl std::ops::Add for SyncTrie {
    type Output = SyncTrie;
    /// Concatenation: accepts `{xy : self(x) && rhs(y)}`.
    fn add(self, rhs: SyncTrie) -> SyncTrie {
        SyncTrie::from_root(append_link(&self.root, &rhs.root))
    }
}

impl std::ops::AddAssign for SyncTrie {
    fn add_assign(&mut self, rhs: SyncTrie) {
        *self = SyncTrie::from_root(append_link(&self.root, &rhs.root));
    }
}

impl std::ops::Not for SyncTrie {
    type Output = SyncTrie;
    fn not(self) -> SyncTrie {
        self.invert()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_trie_is_universal_deny() {
        let t = SyncTrie::deny();
        assert!(t.is_empty());
        assert_eq!(t.depth(), 0);
        assert!(!t.is_sync(&[0xff, 0xff, 0xff, 0xff]));
    }

    #[test]
    fn value_trie_accepts_exact_pattern_only() {
        // 0x0B77, the AC-3 syncword, as a 16-bit pattern.
        let t = SyncTrie::value(0x0B77, 16);
        assert_eq!(t.depth(), 16);
        assert_eq!(t.sync_size(), 2);
        assert!(t.is_sync(&[0x0B, 0x77, 0x00]));
        assert!(!t.is_sync(&[0x0B, 0x78]));
        assert!(!t.is_sync(&[0x0A, 0x77]));
    }

    #[test]
    fn wildcard_trie_accepts_everything_of_given_width() {
        let t = SyncTrie::wildcard(8);
        for b in 0u16..=255 {
            assert!(t.is_sync(&[b as u8]));
        }
    }

    #[test]
    fn union_accepts_either_operand() {
        let a = SyncTrie::value(0x0B77, 16);
        let b = SyncTrie::value(0x770B, 16);
        let u = a | b;
        assert!(u.is_sync(&[0x0B, 0x77]));
        assert!(u.is_sync(&[0x77, 0x0B]));
        assert!(!u.is_sync(&[0x12, 0x34]));
        assert_eq!(u.depth(), 16);
    }

    #[test]
    fn append_concatenates_languages() {
        let a = SyncTrie::value(0xFF, 8);
        let b = SyncTrie::value(0x00, 8);
        let c = a + b;
        assert_eq!(c.depth(), 16);
        assert!(c.is_sync(&[0xFF, 0x00]));
        assert!(!c.is_sync(&[0xFF, 0x01]));
        assert!(!c.is_sync(&[0xFE, 0x00]));
    }

    #[test]
    fn append_onto_empty_yields_argument() {
        let empty = SyncTrie::allow();
        let b = SyncTrie::value(0xAB, 8);
        let c = empty + b.clone();
        assert_eq!(c.depth(), b.depth());
        assert!(c.is_sync(&[0xAB]));
        assert!(!c.is_sync(&[0xAC]));
    }

    #[test]
    fn invert_complements_over_fixed_width() {
        let a = SyncTrie::value(0b10, 2);
        let inv = a.invert();
        assert!(!inv.is_sync(&[0b10 << 6]));
        assert!(inv.is_sync(&[0b00 << 6]));
        assert!(inv.is_sync(&[0b01 << 6]));
        assert!(inv.is_sync(&[0b11 << 6]));
    }

    #[test]
    fn invert_of_empty_is_universal_allow() {
        let inv = SyncTrie::deny().invert();
        assert_eq!(inv.depth(), 0);
        assert!(inv.is_sync(&[]));
        assert!(inv.is_sync(&[0xAA]));
    }

    #[test]
    fn optimize_preserves_language() {
        let a = SyncTrie::value(0x0B77, 16);
        let b = SyncTrie::value(0x770B, 16);
        let u = (a | b).optimize();
        assert!(u.is_sync(&[0x0B, 0x77]));
        assert!(u.is_sync(&[0x77, 0x0B]));
        assert!(!u.is_sync(&[0x00, 0x00]));
    }

    #[test]
    fn serialize_round_trips_through_deserialize() {
        let cases = [
            SyncTrie::allow(),
            SyncTrie::deny(),
            SyncTrie::value(0x0B77, 16),
            (SyncTrie::value(0x0B77, 16) | SyncTrie::value(0x770B, 16)).optimize(),
            SyncTrie::wildcard(11),
        ];
        for t in cases {
            let s = t.serialize();
            let back = SyncTrie::deserialize(&s).expect("valid encoding must parse");
            assert_eq!(back.depth(), t.depth());
            // Probe every byte-aligned pattern up to depth to confirm the
            // languages match exactly, not just the depth.
            let width = t.sync_size().max(1);
            for v in 0u64..(1u64 << t.depth().min(16)) {
                let mut buf = vec![0u8; width];
                let shift = width * 8 - t.depth() as usize;
                let shifted = v << shift;
                for (i, byte) in buf.iter_mut().enumerate() {
                    *byte = (shifted >> (8 * (width - 1 - i))) as u8;
                }
                assert_eq!(t.is_sync(&buf), back.is_sync(&buf), "pattern {:#x} mismatched", v);
            }
        }
    }

    #[test]
    fn deserialize_reports_offset_of_bad_symbol() {
        let err = SyncTrie::deserialize("AQ").unwrap_err();
        assert_eq!(err.offset, 1);
    }

    #[test]
    fn deserialize_reports_offset_when_stack_unbalanced() {
        // '*' needs two operands on the stack; only one is available.
        let err = SyncTrie::deserialize("A*").unwrap_err();
        assert_eq!(err.offset, 2);
    }
}
