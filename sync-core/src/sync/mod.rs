// audio-sync
// Copyright (c) 2026 The audio-sync Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Syncword trie and scanner: the format-agnostic primitives every
//! `FrameParser`'s `sync_info()` is built from.

pub mod scan;
pub mod trie;

pub use scan::SyncScan;
pub use trie::{SyncTrie, SyncTrieParseError};
