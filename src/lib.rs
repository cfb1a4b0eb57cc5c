// Copyright 2026 Vahan Lookup Contributors
// SPDX-License-Identifier: Apache-2.0

//! Vehicle registration lookup service.
//!
//! Fetches the vahanx.in RC-search page for a registration number,
//! extracts its labeled sections into a structured record, and serves
//! the result over a small JSON API.

pub mod extract;
pub mod fetch;
pub mod rest;
