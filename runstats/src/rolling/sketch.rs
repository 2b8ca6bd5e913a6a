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

use super::MAX_WINDOW_SIZE;
use super::RankIndices;
use super::SortedWindow;
use super::serialization::FLAG_EMPTY;
use super::serialization::PREAMBLE_BYTES;
use super::serialization::SERIAL_VERSION;
use crate::codec::SketchBytes;
use crate::codec::SketchSlice;
use crate::codec::family::Family;
use crate::error::Error;

/// Exact running quantile over the last `window_size` observations.
///
/// See the [rolling module level documentation](crate::rolling) for more.
#[derive(Debug, Clone, PartialEq)]
pub struct RollingQuantile {
    q: f64,
    window: SortedWindow<f64>,
    /// Rank indices for a full window, which never change once computed.
    full_rank: RankIndices,
}

impl RollingQuantile {
    /// Creates an estimator for the `q`-th quantile of the last `window_size`
    /// observations.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidParameter`](crate::error::ErrorKind::InvalidParameter)
    /// if `q` is outside `[0, 1]`, `window_size` is zero or `window_size`
    /// exceeds [`MAX_WINDOW_SIZE`](crate::rolling::MAX_WINDOW_SIZE).
    ///
    /// # Examples
    ///
    /// ```
    /// # use runstats::rolling::RollingQuantile;
    /// assert!(RollingQuantile::new(1.0, 10).is_ok());
    /// assert!(RollingQuantile::new(0.5, 0).is_err());
    /// ```
    pub fn new(q: f64, window_size: usize) -> Result<Self, Error> {
        if !(0. ..=1.).contains(&q) {
            return Err(
                Error::invalid_parameter("q must be in the closed interval [0, 1]")
                    .with_context("q", q),
            );
        }
        if window_size > MAX_WINDOW_SIZE {
            return Err(Error::invalid_parameter("window size is too large")
                .with_context("window_size", window_size)
                .with_context("max", MAX_WINDOW_SIZE));
        }
        let window = SortedWindow::new(window_size)?;
        let full_rank = RankIndices::new(q, window_size)
            .ok_or_else(|| Error::invalid_parameter("window size must be positive"))?;
        Ok(Self {
            q,
            window,
            full_rank,
        })
    }

    /// Returns the quantile this estimator tracks.
    pub fn q(&self) -> f64 {
        self.q
    }

    /// Returns the maximum number of observations the window holds.
    pub fn window_size(&self) -> usize {
        self.window.capacity()
    }

    /// Returns the number of observations currently in the window.
    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// Returns the underlying window.
    pub fn window(&self) -> &SortedWindow<f64> {
        &self.window
    }

    /// Feeds one observation, evicting the oldest one if the window is full.
    ///
    /// NaN and infinite values are ignored.
    pub fn update(&mut self, value: f64) -> &mut Self {
        self.window.push_observation(value, "rolling");
        self
    }

    /// Returns the `q`-th quantile of the window, or `None` if it is empty.
    pub fn get(&self) -> Option<f64> {
        let rank = if self.window.is_full() {
            self.full_rank
        } else {
            RankIndices::new(self.q, self.window.len())?
        };
        Some(rank.interpolate(self.window.as_slice()))
    }

    /// Empties the window.
    pub fn clear(&mut self) {
        self.window.clear();
    }

    /// Serializes the estimator state to bytes.
    pub fn serialize(&self) -> Vec<u8> {
        let family = Family::ROLLING_QUANTILE;
        let mut bytes = SketchBytes::with_capacity(PREAMBLE_BYTES + self.len() * 8);
        bytes.write_u8(family.pre_longs);
        bytes.write_u8(SERIAL_VERSION);
        bytes.write_u8(family.id);
        bytes.write_u8(if self.is_empty() { FLAG_EMPTY } else { 0 });
        // new() caps the window at MAX_WINDOW_SIZE, so the count fits.
        bytes.write_u32_le(self.len() as u32);
        bytes.write_f64_le(self.q);
        bytes.write_u64_le(self.window_size() as u64);
        for value in self.window.iter_arrival() {
            bytes.write_f64_le(*value);
        }
        bytes.into_bytes()
    }

    /// Deserializes an estimator from bytes produced by
    /// [`RollingQuantile::serialize`].
    pub fn deserialize(bytes: &[u8]) -> Result<RollingQuantile, Error> {
        fn make_error(tag: &'static str) -> impl FnOnce(std::io::Error) -> Error {
            move |err| Error::insufficient_data(tag).set_source(err)
        }

        let family = Family::ROLLING_QUANTILE;
        let mut cursor = SketchSlice::new(bytes);
        let pre_longs = cursor.read_u8().map_err(make_error("preamble_longs"))?;
        let serial_version = cursor.read_u8().map_err(make_error("serial_version"))?;
        let family_id = cursor.read_u8().map_err(make_error("family_id"))?;
        let flags = cursor.read_u8().map_err(make_error("flags"))?;
        let retained = cursor.read_u32_le().map_err(make_error("retained"))? as usize;
        let q = cursor.read_f64_le().map_err(make_error("q"))?;
        let window_size = cursor.read_u64_le().map_err(make_error("window_size"))?;

        family.validate_id(family_id)?;
        family.validate_pre_longs(pre_longs)?;
        if serial_version != SERIAL_VERSION {
            return Err(Error::deserial(format!(
                "invalid serial version: expected {SERIAL_VERSION}, got {serial_version}"
            )));
        }
        let window_size = usize::try_from(window_size).map_err(|err| {
            Error::deserial("window size does not fit in memory")
                .with_context("window_size", window_size)
                .set_source(err)
        })?;
        if retained > window_size || (flags & FLAG_EMPTY != 0) != (retained == 0) {
            return Err(Error::deserial("inconsistent retained count")
                .with_context("retained", retained)
                .with_context("window_size", window_size));
        }
        // Each retained value occupies 8 bytes; refuse before allocating.
        if cursor.remaining() < retained.saturating_mul(8) {
            return Err(Error::insufficient_data("values"));
        }

        let mut sketch = RollingQuantile::new(q, window_size)
            .map_err(|err| Error::deserial(err.message()).with_context("q", q))?;
        for _ in 0..retained {
            let value = cursor.read_f64_le().map_err(make_error("values"))?;
            if !value.is_finite() {
                return Err(Error::deserial("window values must be finite"));
            }
            sketch.window.push(value);
        }
        Ok(sketch)
    }
}
