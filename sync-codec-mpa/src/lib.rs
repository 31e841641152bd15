// audio-sync
// Copyright (c) 2026 The audio-sync Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MPEG-1/2/2.5 Audio (Layer I/II/III) [`sync_core::FrameParser`]
//! implementation.

mod modes;
mod mpa;

pub use mpa::MpaFrameParser;
