// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Exact quantiles over a sliding window of the most recent observations.
//!
//! [`RollingQuantile`] keeps the last `window_size` values in a
//! [`SortedWindow`] and answers the `q`-th quantile by linear interpolation
//! between the two order statistics around rank `q * (len - 1)`. Unlike the
//! [P² estimator](crate::p2), the answer is exact for the current window.
//!
//! # Usage
//!
//! ```rust
//! # use runstats::rolling::RollingQuantile;
//! let mut rolling = RollingQuantile::new(0.5, 101).unwrap();
//! for i in 0..=1000 {
//!     rolling.update(i as f64);
//! }
//! assert_eq!(rolling.get(), Some(950.0));
//! ```

mod rank;
mod serialization;
mod sketch;
mod sorted_window;

pub(crate) use self::rank::RankIndices;
pub use self::sketch::RollingQuantile;
pub use self::sorted_window::SortedWindow;
pub use self::sorted_window::WindowItem;

/// Largest window a [`RollingQuantile`] accepts, so that its snapshot can
/// record the retained count in 32 bits.
pub const MAX_WINDOW_SIZE: usize = u32::MAX as usize;
