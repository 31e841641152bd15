// audio-sync
// Copyright (c) 2026 The audio-sync Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The ten DTS `amode` channel configurations.

use sync_core::Speakers;

pub const MODE_MONO: Speakers = Speakers::C;
pub const MODE_STEREO: Speakers = Speakers::L.union(Speakers::R);
pub const MODE_3_0: Speakers = Speakers::L.union(Speakers::C).union(Speakers::R);
pub const MODE_2_1: Speakers = Speakers::L.union(Speakers::R).union(Speakers::BC);
pub const MODE_3_1: Speakers = Speakers::L.union(Speakers::C).union(Speakers::R).union(Speakers::BC);
pub const MODE_2_2: Speakers = Speakers::L.union(Speakers::R).union(Speakers::SL).union(Speakers::SR);
pub const MODE_3_2: Speakers =
    Speakers::L.union(Speakers::C).union(Speakers::R).union(Speakers::SL).union(Speakers::SR);
