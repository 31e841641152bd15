// audio-sync
// Copyright (c) 2026 The audio-sync Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bitstream I/O: MSB-first unaligned bit reading/writing and the
//! 8/16/14-bit packing conversions.

pub mod bit;
pub mod convert;

pub use bit::{BitReader, BitWriter, ByteOrder};
