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

//! Binary snapshot layout for P² estimators.
//!
//! ```text
//! byte 0     preamble longs (3)
//! byte 1     serial version
//! byte 2     family id
//! byte 3     flags
//! byte 4     number of stored heights (warm-up values or 5 markers)
//! bytes 5-7  unused
//! bytes 8-15  q (f64)
//! bytes 16-23 n (u64)
//! ```
//!
//! Warm-up snapshots continue with the raw values in arrival order. Steady
//! snapshots continue with 5 heights, 5 positions and 5 ideal positions.

pub const SERIAL_VERSION: u8 = 1;

pub const FLAG_EMPTY: u8 = 1 << 0;
pub const FLAG_STEADY: u8 = 1 << 1;

/// Size of the preamble in bytes.
pub const PREAMBLE_BYTES: usize = 24;
