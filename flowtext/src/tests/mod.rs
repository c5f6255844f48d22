// Copyright 2026 the Flowtext Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

mod test_cursor;
mod test_itemize;
mod test_wrap;
mod utils;
