// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! CLI commands.

mod convert;

pub use convert::ConvertArgs;
