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

mod common;

use common::uniform_sample;
use googletest::assert_that;
use googletest::prelude::contains_substring;
use runstats::error::ErrorKind;
use runstats::p2::Quantile;
use runstats::rolling::RollingQuantile;

fn p2_after(q: f64, count: usize) -> Quantile {
    let mut quantile = Quantile::new(q).unwrap();
    for x in uniform_sample(77, count) {
        quantile.update(x);
    }
    quantile
}

#[test]
fn test_p2_snapshot_restores_every_phase() {
    for count in [0, 3, 5, 6, 1000] {
        let quantile = p2_after(0.3, count);
        let bytes = quantile.serialize();
        let restored = Quantile::deserialize(&bytes).unwrap();
        assert_eq!(restored, quantile, "count = {count}");
        assert_eq!(restored.serialize(), bytes);
    }
}

#[test]
fn test_p2_restored_estimator_keeps_tracking() {
    let mut original = p2_after(0.9, 400);
    let mut restored = Quantile::deserialize(&original.serialize()).unwrap();
    for x in uniform_sample(3, 400) {
        original.update(x);
        restored.update(x);
        assert_eq!(restored.get(), original.get());
    }
    assert_eq!(restored.n(), 800);
}

#[test]
fn test_p2_empty_snapshot_size() {
    let bytes = Quantile::new(0.5).unwrap().serialize();
    assert_eq!(bytes.len(), 24);
    assert_eq!(&bytes[..5], &[3, 1, 30, 1, 0]);
}

#[test]
fn test_p2_truncated_snapshot() {
    let bytes = p2_after(0.5, 100).serialize();
    for len in [0, 2, 10, 23, 24, 60, bytes.len() - 1] {
        let err = Quantile::deserialize(&bytes[..len]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedDeserializeData);
        assert_that!(err.message(), contains_substring("insufficient data"));
    }
}

#[test]
fn test_p2_rejects_other_family() {
    let mut rolling = RollingQuantile::new(0.5, 10).unwrap();
    rolling.update(1.0);
    let err = Quantile::deserialize(&rolling.serialize()).unwrap_err();
    assert_that!(err.message(), contains_substring("invalid family"));
}

#[test]
fn test_p2_rejects_invalid_q() {
    let mut bytes = p2_after(0.5, 3).serialize();
    bytes[8..16].copy_from_slice(&1.5f64.to_le_bytes());
    let err = Quantile::deserialize(&bytes).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedDeserializeData);
    assert_that!(err.message(), contains_substring("(0, 1)"));
}

#[test]
fn test_p2_rejects_broken_marker_invariants() {
    // Positions start after the preamble and five f64 heights.
    let bytes = p2_after(0.5, 100).serialize();
    let mut duplicated = bytes.clone();
    let second = duplicated[72..80].to_vec();
    duplicated[80..88].copy_from_slice(&second);
    let err = Quantile::deserialize(&duplicated).unwrap_err();
    assert_that!(err.message(), contains_substring("strictly increasing"));

    let mut unsorted = bytes.clone();
    unsorted[24..32].copy_from_slice(&2.0f64.to_le_bytes());
    let err = Quantile::deserialize(&unsorted).unwrap_err();
    assert_that!(err.message(), contains_substring("non-decreasing"));

    let mut wrong_n = bytes;
    wrong_n[16..24].copy_from_slice(&101u64.to_le_bytes());
    let err = Quantile::deserialize(&wrong_n).unwrap_err();
    assert_that!(err.message(), contains_substring("ranks 1 and n"));
}

#[test]
fn test_p2_rejects_inconsistent_warm_up() {
    let mut bytes = p2_after(0.5, 3).serialize();
    bytes[16..24].copy_from_slice(&4u64.to_le_bytes());
    let err = Quantile::deserialize(&bytes).unwrap_err();
    assert_that!(err.message(), contains_substring("warm-up"));
}

#[test]
fn test_rolling_snapshot_preserves_arrival_order() {
    let mut original = RollingQuantile::new(0.4, 8).unwrap();
    for x in uniform_sample(9, 20) {
        original.update(x);
    }
    let bytes = original.serialize();
    assert_eq!(bytes.len(), 24 + 8 * 8);
    let mut restored = RollingQuantile::deserialize(&bytes).unwrap();
    assert_eq!(restored, original);

    // Evictions after restoring must follow the original arrival order.
    for x in uniform_sample(10, 20) {
        original.update(x);
        restored.update(x);
        assert_eq!(restored.get(), original.get());
    }
}

#[test]
fn test_rolling_empty_snapshot() {
    let original = RollingQuantile::new(1.0, 3).unwrap();
    let restored = RollingQuantile::deserialize(&original.serialize()).unwrap();
    assert!(restored.is_empty());
    assert_eq!(restored.q(), 1.0);
    assert_eq!(restored.window_size(), 3);
}

#[test]
fn test_rolling_rejects_overfull_window() {
    let mut rolling = RollingQuantile::new(0.5, 4).unwrap();
    rolling.update(1.0).update(2.0).update(3.0);
    let mut bytes = rolling.serialize();
    bytes[16..24].copy_from_slice(&2u64.to_le_bytes());
    let err = RollingQuantile::deserialize(&bytes).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedDeserializeData);
    assert_that!(err.message(), contains_substring("retained"));
}

#[test]
fn test_rolling_truncated_snapshot() {
    let mut rolling = RollingQuantile::new(0.5, 4).unwrap();
    rolling.update(1.0).update(2.0);
    let bytes = rolling.serialize();
    for len in [0, 7, 23, bytes.len() - 1] {
        let err = RollingQuantile::deserialize(&bytes[..len]).unwrap_err();
        assert_that!(err.message(), contains_substring("insufficient data"));
    }
}
