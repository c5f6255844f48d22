// Copyright 2026 the Flowtext Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

mod asserts;
mod env;

pub(crate) use asserts::{assert_close, assert_layout_invariants, cursor_anchors, line_texts};
pub(crate) use env::TestEnv;
