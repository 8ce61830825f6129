// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod ai;
pub mod calendar;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod insights;
pub mod models;
pub mod projection;
pub mod quotes;
pub mod store;
pub mod tags;
pub mod utils;
pub mod wishlist;
pub mod writer;
