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

use runstats::p2::Quantile;

fn main() {
    let mut p95 = Quantile::new(0.95).unwrap();
    for i in 0..10_000u64 {
        // Cheap deterministic scramble of 0..1000.
        p95.update((i.wrapping_mul(7919) % 1000) as f64);
    }
    println!("p95 estimate after {} values: {:?}", p95.n(), p95.get());

    let bytes = p95.serialize();
    println!("snapshot: {} bytes", bytes.len());

    let mut restored = Quantile::deserialize(&bytes).unwrap();
    restored.update(999.0);
    println!("restored and updated once: {:?}", restored.get());
}
