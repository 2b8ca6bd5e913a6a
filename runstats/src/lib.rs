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

//! Running quantiles over data streams.
//!
//! Two estimators answer "what is the current `q`-th quantile" after every
//! observation without keeping the whole history:
//!
//! - [`p2::Quantile`]: the P² algorithm, an approximation in constant memory.
//! - [`rolling::RollingQuantile`]: an exact quantile over the last N
//!   observations, in memory proportional to N.
//!
//! [`iqr`] builds interquartile ranges on top of both.
//!
//! Estimators are single-writer: `update` takes `&mut self` and `get` is a
//! pure read. NaN and infinite observations are ignored.
//!
//! ```rust
//! use runstats::p2::Quantile;
//! use runstats::rolling::RollingQuantile;
//!
//! let mut p90 = Quantile::new(0.9).unwrap();
//! let mut windowed = RollingQuantile::new(0.9, 50).unwrap();
//! for i in 0..1000 {
//!     let x = (i % 100) as f64;
//!     p90.update(x);
//!     windowed.update(x);
//! }
//! assert!((p90.get().unwrap() - 90.0).abs() < 2.0);
//! assert_eq!(windowed.get(), Some(94.1));
//! ```

mod codec;
pub mod error;
pub mod iqr;
pub mod p2;
pub mod rolling;
