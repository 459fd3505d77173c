// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod categories;
pub mod transactions;
pub mod budgets;
pub mod portfolio;
pub mod importer;
pub mod exporter;
pub mod tasks;
pub mod goals;
pub mod forecast;
pub mod plan;
pub mod config;
