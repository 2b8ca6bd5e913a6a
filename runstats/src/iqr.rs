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

//! Interquartile range built on the quantile estimators.
//!
//! [`Iqr`] runs two [P² estimators](crate::p2::Quantile) side by side;
//! [`RollingIqr`] reads two quantiles off one shared [`SortedWindow`].
//!
//! # Usage
//!
//! ```rust
//! # use runstats::iqr::RollingIqr;
//! let mut iqr = RollingIqr::new(0.25, 0.75, 101).unwrap();
//! for i in 0..=1000 {
//!     iqr.update(i as f64);
//! }
//! assert_eq!(iqr.get(), Some(50.0));
//! ```

use crate::error::Error;
use crate::p2::Quantile;
use crate::rolling::RankIndices;
use crate::rolling::SortedWindow;

/// Default lower quantile of the range.
pub const DEFAULT_Q_INF: f64 = 0.25;
/// Default upper quantile of the range.
pub const DEFAULT_Q_SUP: f64 = 0.75;

/// Running interquartile range estimated with the P² algorithm.
#[derive(Debug, Clone, PartialEq)]
pub struct Iqr {
    inf: Quantile,
    sup: Quantile,
}

impl Default for Iqr {
    fn default() -> Self {
        Self {
            inf: Quantile::make(DEFAULT_Q_INF),
            sup: Quantile::make(DEFAULT_Q_SUP),
        }
    }
}

impl Iqr {
    /// Creates an estimator of the range between the `q_inf`-th and the
    /// `q_sup`-th quantiles.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidParameter`](crate::error::ErrorKind::InvalidParameter)
    /// unless `0 < q_inf < q_sup < 1`.
    pub fn new(q_inf: f64, q_sup: f64) -> Result<Self, Error> {
        check_order(q_inf, q_sup)?;
        Ok(Self {
            inf: Quantile::new(q_inf)?,
            sup: Quantile::new(q_sup)?,
        })
    }

    pub fn q_inf(&self) -> f64 {
        self.inf.q()
    }

    pub fn q_sup(&self) -> f64 {
        self.sup.q()
    }

    pub fn is_empty(&self) -> bool {
        self.inf.is_empty()
    }

    /// Feeds one observation to both estimators. Non-finite values are ignored.
    pub fn update(&mut self, value: f64) -> &mut Self {
        self.inf.update(value);
        self.sup.update(value);
        self
    }

    /// Returns the current range, or `None` if nothing has been observed.
    pub fn get(&self) -> Option<f64> {
        Some(self.sup.get()? - self.inf.get()?)
    }

    pub fn clear(&mut self) {
        self.inf.clear();
        self.sup.clear();
    }
}

/// Exact interquartile range over the last `window_size` observations.
#[derive(Debug, Clone, PartialEq)]
pub struct RollingIqr {
    q_inf: f64,
    q_sup: f64,
    window: SortedWindow<f64>,
    full_inf: RankIndices,
    full_sup: RankIndices,
}

impl RollingIqr {
    /// Creates an estimator of the range between the `q_inf`-th and the
    /// `q_sup`-th quantiles of the last `window_size` observations.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidParameter`](crate::error::ErrorKind::InvalidParameter)
    /// unless `0 <= q_inf < q_sup <= 1` and `window_size` is positive.
    pub fn new(q_inf: f64, q_sup: f64, window_size: usize) -> Result<Self, Error> {
        if !(0. ..=1.).contains(&q_inf) || !(0. ..=1.).contains(&q_sup) {
            return Err(
                Error::invalid_parameter("quantiles must be in the closed interval [0, 1]")
                    .with_context("q_inf", q_inf)
                    .with_context("q_sup", q_sup),
            );
        }
        check_order(q_inf, q_sup)?;
        let window = SortedWindow::new(window_size)?;
        let (Some(full_inf), Some(full_sup)) = (
            RankIndices::new(q_inf, window_size),
            RankIndices::new(q_sup, window_size),
        ) else {
            return Err(Error::invalid_parameter("window size must be positive"));
        };
        Ok(Self {
            q_inf,
            q_sup,
            window,
            full_inf,
            full_sup,
        })
    }

    pub fn q_inf(&self) -> f64 {
        self.q_inf
    }

    pub fn q_sup(&self) -> f64 {
        self.q_sup
    }

    pub fn window_size(&self) -> usize {
        self.window.capacity()
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// Feeds one observation, evicting the oldest one if the window is full.
    ///
    /// NaN and infinite values are ignored.
    pub fn update(&mut self, value: f64) -> &mut Self {
        self.window.push_observation(value, "rolling_iqr");
        self
    }

    /// Returns the range over the window, or `None` if it is empty.
    pub fn get(&self) -> Option<f64> {
        let (inf, sup) = if self.window.is_full() {
            (self.full_inf, self.full_sup)
        } else {
            let len = self.window.len();
            (
                RankIndices::new(self.q_inf, len)?,
                RankIndices::new(self.q_sup, len)?,
            )
        };
        let sorted = self.window.as_slice();
        Some(sup.interpolate(sorted) - inf.interpolate(sorted))
    }

    pub fn clear(&mut self) {
        self.window.clear();
    }
}

fn check_order(q_inf: f64, q_sup: f64) -> Result<(), Error> {
    if q_inf < q_sup {
        Ok(())
    } else {
        Err(Error::invalid_parameter("q_inf must be smaller than q_sup")
            .with_context("q_inf", q_inf)
            .with_context("q_sup", q_sup))
    }
}
