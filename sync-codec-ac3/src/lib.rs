// audio-sync
// Copyright (c) 2026 The audio-sync Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! AC-3 and Enhanced AC-3 [`sync_core::FrameParser`] implementations.

mod ac3;
mod eac3;
mod modes;

pub use ac3::Ac3FrameParser;
pub use eac3::Eac3FrameParser;
