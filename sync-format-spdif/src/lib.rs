// audio-sync
// Copyright (c) 2026 The audio-sync Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IEC 61937 (consumer S/PDIF) carrier support: [`SpdifFrameParser`]
//! recognizes the burst-preamble and padded-DTS carrier shapes for
//! [`sync_core::FrameParser`]-driven scanning, [`SpdifWrapper`] packs raw
//! AC-3/MPA/DTS frames into SPDIF packets, and [`SpdifUnwrapper`] reverses
//! the transform.

mod header;
mod parser;
mod unwrapper;
mod wrapper;

pub use parser::SpdifFrameParser;
pub use unwrapper::SpdifUnwrapper;
pub use wrapper::{DtsConv, DtsMode, SpdifWrapper, SpdifWrapperConfig};
