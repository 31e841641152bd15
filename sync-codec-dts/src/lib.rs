// audio-sync
// Copyright (c) 2026 The audio-sync Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! DTS [`sync_core::FrameParser`] implementation, including DTS-HD Master
//! Audio extension detection.

mod dts;
mod modes;

pub use dts::DtsFrameParser;
