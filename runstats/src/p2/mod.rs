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

//! P² (piecewise-parabolic) estimator for a single running quantile.
//!
//! The estimator keeps five markers: the minimum, the maximum, the target
//! quantile and two points halfway between it and the extremes. Each
//! observation shifts the marker ranks and, when a marker drifts at least one
//! rank away from where it should sit, moves its height with a parabolic
//! prediction (or a linear one if the parabola leaves the neighboring
//! markers). Memory use is constant no matter how long the stream is.
//!
//! The first five observations are stored verbatim. Until the sixth arrives
//! the estimate is read directly off those values.
//!
//! # References
//!
//! - Raj Jain, Imrich Chlamtac, "The P² Algorithm for Dynamic Calculation of
//!   Quantiles and Histograms Without Storing Observations", CACM 1985.
//! - LiveStats, <https://github.com/cxxr/LiveStats>.
//!
//! # Usage
//!
//! ```rust
//! # use runstats::p2::Quantile;
//! let mut median = Quantile::new(0.5).unwrap();
//! assert_eq!(median.get(), None);
//! for x in 1..=20 {
//!     median.update(x as f64);
//! }
//! assert_eq!(median.get(), Some(10.0));
//! ```

mod serialization;
mod sketch;

pub use self::sketch::Quantile;

/// Default target quantile (the median).
pub const DEFAULT_Q: f64 = 0.5;
/// Number of markers tracked by the estimator.
pub const NUM_MARKERS: usize = 5;
