// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

pub mod analyzers;
pub mod cache;
pub mod fetcher;
pub mod html;
pub mod logging;
pub mod scoring;
pub mod site_check;
