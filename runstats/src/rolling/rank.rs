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

/// Order statistics bracketing the `q`-th quantile of a sorted sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct RankIndices {
    lower: usize,
    higher: usize,
    frac: f64,
}

impl RankIndices {
    /// Indices for a sequence of `len` items, `None` if it is empty.
    pub fn new(q: f64, len: usize) -> Option<Self> {
        if len == 0 {
            return None;
        }
        let last = len - 1;
        let index = q * last as f64;
        let lower = (index.floor() as usize).min(last);
        let higher = (lower + 1).min(last);
        Some(Self {
            lower,
            higher,
            frac: index - lower as f64,
        })
    }

    /// Linear interpolation between the two bracketing order statistics.
    pub fn interpolate(&self, sorted: &[f64]) -> f64 {
        let (lower, higher) = (sorted[self.lower], sorted[self.higher]);
        if self.frac == 0. || self.lower == self.higher {
            return lower;
        }
        let interpolated = lower + (higher - lower) * self.frac;
        if interpolated.is_finite() {
            return interpolated;
        }
        // The spread overflowed; weigh the endpoints instead.
        lower * (1. - self.frac) + higher * self.frac
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        assert_eq!(RankIndices::new(0.5, 0), None);
    }

    #[test]
    fn test_indices() {
        let rank = RankIndices::new(0.5, 101).unwrap();
        assert_eq!((rank.lower, rank.higher, rank.frac), (50, 51, 0.));

        let rank = RankIndices::new(0.25, 4).unwrap();
        assert_eq!((rank.lower, rank.higher, rank.frac), (0, 1, 0.75));

        let rank = RankIndices::new(1., 4).unwrap();
        assert_eq!((rank.lower, rank.higher, rank.frac), (3, 3, 0.));

        let rank = RankIndices::new(0., 1).unwrap();
        assert_eq!((rank.lower, rank.higher, rank.frac), (0, 0, 0.));
    }

    #[test]
    fn test_interpolate() {
        let rank = RankIndices::new(0.25, 4).unwrap();
        assert_eq!(rank.interpolate(&[0., 4., 8., 12.]), 3.);
    }

    #[test]
    fn test_interpolate_near_the_float_limits() {
        let extremes = [-f64::MAX, f64::MAX];
        assert_eq!(RankIndices::new(0., 2).unwrap().interpolate(&extremes), -f64::MAX);
        assert_eq!(RankIndices::new(1., 2).unwrap().interpolate(&extremes), f64::MAX);
        assert_eq!(RankIndices::new(0.5, 2).unwrap().interpolate(&extremes), 0.);
        let quarter = RankIndices::new(0.25, 2).unwrap().interpolate(&extremes);
        assert!(quarter.is_finite() && quarter < 0., "{quarter}");
    }
}
