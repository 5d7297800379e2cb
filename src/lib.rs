// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod actions;
pub mod cli;
pub mod clock;
pub mod commands;
pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod logging;
pub mod models;
pub mod month;
pub mod session;
pub mod store;
pub mod utils;

pub use error::{Error, Result};
