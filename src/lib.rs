// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod budget;
pub mod categorize;
pub mod cli;
pub mod commands;
pub mod db;
pub mod forecast;
pub mod goals;
pub mod import;
pub mod models;
pub mod plans;
pub mod positions;
pub mod recurrence;
pub mod store;
pub mod styles;
pub mod utils;
