// audio-sync
// Copyright (c) 2026 The audio-sync Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! AAC-ADTS (Audio Data Transport Stream) [`sync_core::FrameParser`]
//! implementation.

mod adts;
mod modes;

pub use adts::AdtsFrameParser;
