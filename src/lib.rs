// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Lesson and payment bookkeeping for freelance tutors.
//!
//! The core (`models`, `period`, `calc`, `grouping`, `registry`, `ledger`)
//! is pure and storage-agnostic; `db`, `cli` and `commands` form the shell
//! around it.

pub mod calc;
pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod errors;
pub mod grouping;
pub mod ledger;
pub mod logging;
pub mod models;
pub mod period;
pub mod registry;
pub mod utils;

pub use errors::{Entity, LedgerError, LedgerResult};
pub use ledger::{CategoryChoice, Ledger, NewLesson, NewPayment};
