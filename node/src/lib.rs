// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
pub mod config;
pub mod errors;
pub mod flash;
pub mod board;
pub mod server;
pub mod telemetry;
