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

use super::DEFAULT_Q;
use super::NUM_MARKERS;
use super::serialization::FLAG_EMPTY;
use super::serialization::FLAG_STEADY;
use super::serialization::PREAMBLE_BYTES;
use super::serialization::SERIAL_VERSION;
use crate::codec::SketchBytes;
use crate::codec::SketchSlice;
use crate::codec::family::Family;
use crate::error::Error;

/// Running quantile estimator based on the P² algorithm.
///
/// See the [p2 module level documentation](crate::p2) for more.
#[derive(Debug, Clone, PartialEq)]
pub struct Quantile {
    q: f64,
    /// Amount added to each ideal marker position per observation.
    increments: [f64; NUM_MARKERS],
    n: u64,
    state: State,
}

#[derive(Debug, Clone, PartialEq)]
enum State {
    /// Fewer than six observations: values are kept as they arrived.
    Warming {
        values: [f64; NUM_MARKERS],
        len: usize,
    },
    Steady(Markers),
}

#[derive(Debug, Clone, PartialEq)]
struct Markers {
    heights: [f64; NUM_MARKERS],
    /// Actual 1-based rank of each marker, strictly increasing.
    positions: [u64; NUM_MARKERS],
    /// Ideal, possibly fractional, rank of each marker.
    desired: [f64; NUM_MARKERS],
}

impl Default for Quantile {
    fn default() -> Self {
        Self::make(DEFAULT_Q)
    }
}

impl Quantile {
    /// Creates an estimator for the `q`-th quantile.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidParameter`](crate::error::ErrorKind::InvalidParameter)
    /// unless `0 < q < 1`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use runstats::p2::Quantile;
    /// assert!(Quantile::new(0.99).is_ok());
    /// assert!(Quantile::new(1.0).is_err());
    /// ```
    pub fn new(q: f64) -> Result<Self, Error> {
        check_q(q)?;
        Ok(Self::make(q))
    }

    /// Builds an estimator for an already validated `q`.
    pub(crate) fn make(q: f64) -> Self {
        Self {
            q,
            increments: [0., q / 2., q, (1. + q) / 2., 1.],
            n: 0,
            state: State::Warming {
                values: [0.; NUM_MARKERS],
                len: 0,
            },
        }
    }

    /// Returns the quantile this estimator tracks.
    pub fn q(&self) -> f64 {
        self.q
    }

    /// Returns the number of observations consumed.
    pub fn n(&self) -> u64 {
        self.n
    }

    /// Returns true if no observation has been consumed.
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Returns true while the estimator still stores raw observations.
    pub fn is_warming_up(&self) -> bool {
        matches!(self.state, State::Warming { .. })
    }

    /// Returns the `(position, height)` pair of each marker, or `None` during
    /// warm-up.
    pub fn markers(&self) -> Option<[(u64, f64); NUM_MARKERS]> {
        match &self.state {
            State::Warming { .. } => None,
            State::Steady(markers) => Some(std::array::from_fn(|i| {
                (markers.positions[i], markers.heights[i])
            })),
        }
    }

    /// Feeds one observation into the estimator.
    ///
    /// NaN and infinite values are ignored.
    pub fn update(&mut self, value: f64) -> &mut Self {
        if !value.is_finite() {
            tracing::trace!(value, estimator = "p2", "dropping non-finite observation");
            return self;
        }
        self.n += 1;

        let warmed = match &mut self.state {
            State::Warming { values, len } if *len < NUM_MARKERS => {
                values[*len] = value;
                *len += 1;
                None
            }
            State::Warming { values, .. } => {
                let mut heights = *values;
                heights.sort_by(f64::total_cmp);
                tracing::trace!(q = self.q, ?heights, "p2 estimator left warm-up");
                Some(Markers::new(heights, self.q))
            }
            State::Steady(markers) => {
                markers.insert(value, &self.increments);
                None
            }
        };

        if let Some(mut markers) = warmed {
            markers.insert(value, &self.increments);
            self.state = State::Steady(markers);
        }
        self
    }

    /// Returns the current estimate, or `None` if nothing has been observed.
    pub fn get(&self) -> Option<f64> {
        match &self.state {
            State::Warming { len: 0, .. } => None,
            State::Warming { values, len } => {
                let mut sorted = *values;
                let sorted = &mut sorted[..*len];
                sorted.sort_by(f64::total_cmp);
                let index = ((*len as f64 * self.q) as usize).min(len - 1);
                Some(sorted[index])
            }
            State::Steady(markers) => Some(markers.heights[2]),
        }
    }

    /// Resets the estimator to its freshly constructed state.
    pub fn clear(&mut self) {
        *self = Self::make(self.q);
    }

    /// Serializes the estimator state to bytes.
    pub fn serialize(&self) -> Vec<u8> {
        let (flags, num_heights) = match &self.state {
            State::Warming { len, .. } if *len == 0 => (FLAG_EMPTY, 0),
            State::Warming { len, .. } => (0, *len),
            State::Steady(_) => (FLAG_STEADY, NUM_MARKERS),
        };
        let body = match &self.state {
            State::Warming { .. } => num_heights * 8,
            State::Steady(_) => NUM_MARKERS * 24,
        };

        let family = Family::P2_QUANTILE;
        let mut bytes = SketchBytes::with_capacity(PREAMBLE_BYTES + body);
        bytes.write_u8(family.pre_longs);
        bytes.write_u8(SERIAL_VERSION);
        bytes.write_u8(family.id);
        bytes.write_u8(flags);
        bytes.write_u8(num_heights as u8);
        bytes.write(&[0; 3]);
        bytes.write_f64_le(self.q);
        bytes.write_u64_le(self.n);

        match &self.state {
            State::Warming { values, len } => {
                for value in &values[..*len] {
                    bytes.write_f64_le(*value);
                }
            }
            State::Steady(markers) => {
                for height in markers.heights {
                    bytes.write_f64_le(height);
                }
                for position in markers.positions {
                    bytes.write_u64_le(position);
                }
                for desired in markers.desired {
                    bytes.write_f64_le(desired);
                }
            }
        }
        bytes.into_bytes()
    }

    /// Deserializes an estimator from bytes produced by [`Quantile::serialize`].
    pub fn deserialize(bytes: &[u8]) -> Result<Quantile, Error> {
        fn make_error(tag: &'static str) -> impl FnOnce(std::io::Error) -> Error {
            move |err| Error::insufficient_data(tag).set_source(err)
        }

        let family = Family::P2_QUANTILE;
        let mut cursor = SketchSlice::new(bytes);
        let pre_longs = cursor.read_u8().map_err(make_error("preamble_longs"))?;
        let serial_version = cursor.read_u8().map_err(make_error("serial_version"))?;
        let family_id = cursor.read_u8().map_err(make_error("family_id"))?;
        let flags = cursor.read_u8().map_err(make_error("flags"))?;
        let num_heights = cursor.read_u8().map_err(make_error("num_heights"))? as usize;
        for _ in 0..3 {
            cursor.read_u8().map_err(make_error("unused"))?;
        }
        let q = cursor.read_f64_le().map_err(make_error("q"))?;
        let n = cursor.read_u64_le().map_err(make_error("n"))?;

        family.validate_id(family_id)?;
        family.validate_pre_longs(pre_longs)?;
        if serial_version != SERIAL_VERSION {
            return Err(Error::deserial(format!(
                "invalid serial version: expected {SERIAL_VERSION}, got {serial_version}"
            )));
        }
        check_q(q).map_err(|err| Error::deserial(err.message()).with_context("q", q))?;

        let mut sketch = Self::make(q);
        if flags & FLAG_EMPTY != 0 {
            if n != 0 || num_heights != 0 {
                return Err(Error::deserial("empty snapshot carries observations")
                    .with_context("n", n)
                    .with_context("num_heights", num_heights));
            }
            return Ok(sketch);
        }

        if flags & FLAG_STEADY == 0 {
            if num_heights == 0 || num_heights > NUM_MARKERS || n != num_heights as u64 {
                return Err(Error::deserial("inconsistent warm-up snapshot")
                    .with_context("n", n)
                    .with_context("num_heights", num_heights));
            }
            let mut values = [0.; NUM_MARKERS];
            for value in values.iter_mut().take(num_heights) {
                *value = cursor.read_f64_le().map_err(make_error("values"))?;
            }
            if values[..num_heights].iter().any(|v| !v.is_finite()) {
                return Err(Error::deserial("warm-up values must be finite"));
            }
            sketch.n = n;
            sketch.state = State::Warming {
                values,
                len: num_heights,
            };
            return Ok(sketch);
        }

        if num_heights != NUM_MARKERS || n <= NUM_MARKERS as u64 {
            return Err(Error::deserial("inconsistent steady-state snapshot")
                .with_context("n", n)
                .with_context("num_heights", num_heights));
        }
        let mut heights = [0.; NUM_MARKERS];
        for height in heights.iter_mut() {
            *height = cursor.read_f64_le().map_err(make_error("heights"))?;
        }
        let mut positions = [0u64; NUM_MARKERS];
        for position in positions.iter_mut() {
            *position = cursor.read_u64_le().map_err(make_error("positions"))?;
        }
        let mut desired = [0.; NUM_MARKERS];
        for value in desired.iter_mut() {
            *value = cursor.read_f64_le().map_err(make_error("desired_positions"))?;
        }

        let markers = Markers {
            heights,
            positions,
            desired,
        };
        markers.validate(n)?;
        sketch.n = n;
        sketch.state = State::Steady(markers);
        Ok(sketch)
    }
}

fn check_q(q: f64) -> Result<(), Error> {
    if q > 0. && q < 1. {
        Ok(())
    } else {
        Err(Error::invalid_parameter("q must be in the open interval (0, 1)").with_context("q", q))
    }
}

impl Markers {
    /// Markers for the first five observations, `heights` sorted ascending.
    fn new(heights: [f64; NUM_MARKERS], q: f64) -> Self {
        Self {
            heights,
            positions: [1, 2, 3, 4, 5],
            desired: [1., 1. + 2. * q, 1. + 4. * q, 3. + 2. * q, 5.],
        }
    }

    fn insert(&mut self, value: f64, increments: &[f64; NUM_MARKERS]) {
        let k = self.locate(value);
        for position in &mut self.positions[k..] {
            *position += 1;
        }
        for (desired, increment) in self.desired.iter_mut().zip(increments) {
            *desired += increment;
        }
        self.adjust();
    }

    /// Finds the cell `k` holding `value`, widening the extremes if needed.
    fn locate(&mut self, value: f64) -> usize {
        if value < self.heights[0] {
            self.heights[0] = value;
            return 1;
        }
        for i in 1..NUM_MARKERS {
            if self.heights[i - 1] <= value && value < self.heights[i] {
                return i;
            }
        }
        let last = NUM_MARKERS - 1;
        if self.heights[last] < value {
            self.heights[last] = value;
        }
        last
    }

    /// Moves the three interior markers towards their ideal positions.
    fn adjust(&mut self) {
        for i in 1..NUM_MARKERS - 1 {
            let position = self.positions[i];
            let drift = self.desired[i] - position as f64;

            let up = drift >= 1. && self.positions[i + 1] - position > 1;
            let down = drift <= -1. && position - self.positions[i - 1] > 1;
            if !up && !down {
                continue;
            }

            let (d, neighbor) = if up { (1., i + 1) } else { (-1., i - 1) };
            let (prev, next) = (self.heights[i - 1], self.heights[i + 1]);
            self.heights[i] = match parabolic(
                d,
                [prev, self.heights[i], next],
                [self.positions[i - 1], position, self.positions[i + 1]],
            ) {
                Some(candidate) if prev < candidate && candidate < next => candidate,
                _ => linear(
                    d,
                    self.heights[i],
                    self.heights[neighbor],
                    position,
                    self.positions[neighbor],
                )
                .max(prev)
                .min(next),
            };

            if up {
                self.positions[i] += 1;
            } else {
                self.positions[i] -= 1;
            }
        }
    }

    fn validate(&self, n: u64) -> Result<(), Error> {
        if self.heights.iter().any(|h| !h.is_finite())
            || self.desired.iter().any(|d| !d.is_finite())
        {
            return Err(Error::deserial("marker values must be finite"));
        }
        if self.heights.windows(2).any(|w| w[0] > w[1]) {
            return Err(Error::deserial("marker heights must be non-decreasing"));
        }
        if self.positions.windows(2).any(|w| w[0] >= w[1]) {
            return Err(Error::deserial("marker positions must be strictly increasing"));
        }
        if self.positions[0] != 1 || self.positions[NUM_MARKERS - 1] != n {
            return Err(Error::deserial("extreme markers must sit at ranks 1 and n")
                .with_context("first", self.positions[0])
                .with_context("last", self.positions[NUM_MARKERS - 1])
                .with_context("n", n));
        }
        Ok(())
    }
}

/// Piecewise-parabolic prediction of a marker height after moving it by `d`
/// (±1) ranks. `heights` and `positions` are (previous, current, next).
///
/// Returns `None` when two of the markers share a rank or when the
/// prediction overflows.
fn parabolic(d: f64, heights: [f64; 3], positions: [u64; 3]) -> Option<f64> {
    let [qm1, q, qp1] = heights;
    let [nm1, n, np1] = positions;
    if nm1 == n || n == np1 {
        return None;
    }
    let (nm1, n, np1) = (nm1 as f64, n as f64, np1 as f64);

    let outer = d / (np1 - nm1);
    let inner_left = (n - nm1 + d) * (qp1 - q) / (np1 - n);
    let inner_right = (np1 - n - d) * (q - qm1) / (n - nm1);
    let candidate = q + outer * (inner_left + inner_right);
    candidate.is_finite().then_some(candidate)
}

/// Linear prediction towards the neighbor in direction `d`.
///
/// The result lies between `height` and `neighbor_height` even when their
/// difference is not representable.
fn linear(d: f64, height: f64, neighbor_height: f64, position: u64, neighbor_position: u64) -> f64 {
    if position == neighbor_position {
        return height;
    }
    let step = neighbor_position as f64 - position as f64;
    let predicted = height + d * (neighbor_height - height) / step;
    if predicted.is_finite() {
        return predicted;
    }
    // d / step is 1 / |step|, the share of the gap to cover.
    let weight = d / step;
    height * (1. - weight) + neighbor_height * weight
}
