// audio-sync
// Copyright (c) 2026 The audio-sync Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The two speaker layouts a plain MPEG Audio header distinguishes.
//!
//! The header's `mode` field only ever tells us mono-vs-not; joint
//! stereo/dual-channel/plain-stereo are all reported as a generic L/R
//! pair since nothing downstream needs to tell them apart.

use sync_core::Speakers;

pub const MODE_MONO: Speakers = Speakers::C;
pub const MODE_STEREO: Speakers = Speakers::L.union(Speakers::R);
