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

use std::cmp::Ordering;
use std::collections::VecDeque;

use crate::error::Error;

/// Trait implemented by item types that can be held in a [`SortedWindow`].
pub trait WindowItem: Copy {
    /// Total order used to keep the window sorted.
    fn cmp(a: &Self, b: &Self) -> Ordering;
}

impl WindowItem for f64 {
    fn cmp(a: &Self, b: &Self) -> Ordering {
        a.total_cmp(b)
    }
}

impl WindowItem for f32 {
    fn cmp(a: &Self, b: &Self) -> Ordering {
        a.total_cmp(b)
    }
}

impl WindowItem for i64 {
    fn cmp(a: &Self, b: &Self) -> Ordering {
        Ord::cmp(a, b)
    }
}

impl WindowItem for u64 {
    fn cmp(a: &Self, b: &Self) -> Ordering {
        Ord::cmp(a, b)
    }
}

/// The last `capacity` items of a stream, kept in ascending order.
///
/// Arrival order is tracked separately so that the oldest item, not the
/// smallest or largest, is the one evicted when the window is full.
///
/// # Examples
///
/// ```
/// # use runstats::rolling::SortedWindow;
/// let mut window = SortedWindow::<f64>::new(3).unwrap();
/// for x in [3.0, 1.0, 2.0] {
///     assert_eq!(window.push(x), None);
/// }
/// assert_eq!(window.push(0.0), Some(3.0));
/// assert_eq!(window.as_slice(), &[0.0, 1.0, 2.0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SortedWindow<T: WindowItem> {
    capacity: usize,
    arrivals: VecDeque<T>,
    sorted: Vec<T>,
}

impl<T: WindowItem> SortedWindow<T> {
    /// Creates an empty window holding at most `capacity` items.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidParameter`](crate::error::ErrorKind::InvalidParameter)
    /// if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self, Error> {
        if capacity == 0 {
            return Err(Error::invalid_parameter("window size must be positive")
                .with_context("window_size", capacity));
        }
        Ok(Self {
            capacity,
            arrivals: VecDeque::new(),
            sorted: Vec::new(),
        })
    }

    /// Maximum number of items held.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of items currently held.
    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.sorted.len() == self.capacity
    }

    /// Items in ascending order.
    pub fn as_slice(&self) -> &[T] {
        &self.sorted
    }

    /// Items in arrival order, oldest first.
    pub fn iter_arrival(&self) -> impl Iterator<Item = &T> {
        self.arrivals.iter()
    }

    /// Inserts `item`, returning the evicted oldest item if the window was
    /// full.
    pub fn push(&mut self, item: T) -> Option<T> {
        let evicted = if self.is_full() {
            self.arrivals.pop_front()
        } else {
            None
        };
        if let Some(oldest) = &evicted {
            let index = self
                .sorted
                .partition_point(|v| T::cmp(v, oldest) == Ordering::Less);
            debug_assert!(
                self.sorted
                    .get(index)
                    .is_some_and(|v| T::cmp(v, oldest) == Ordering::Equal),
                "evicted item must be present in the sorted view"
            );
            self.sorted.remove(index);
        }

        let index = self
            .sorted
            .partition_point(|v| T::cmp(v, &item) != Ordering::Greater);
        self.sorted.insert(index, item);
        self.arrivals.push_back(item);
        evicted
    }

    /// Removes every item.
    pub fn clear(&mut self) {
        self.arrivals.clear();
        self.sorted.clear();
    }
}

impl SortedWindow<f64> {
    /// Pushes a finite observation on behalf of `estimator`, dropping NaN and
    /// infinities.
    pub(crate) fn push_observation(&mut self, value: f64, estimator: &'static str) {
        if !value.is_finite() {
            tracing::trace!(value, estimator, "dropping non-finite observation");
            return;
        }
        let was_full = self.is_full();
        self.push(value);
        if !was_full && self.is_full() {
            tracing::trace!(window_size = self.capacity, estimator, "rolling window is full");
        }
    }
}
