// SPDX-License-Identifier: GPL-3.0-only
mod backend;
mod manager;
mod session;

pub use backend::RequestedIndex;
pub use manager::MonitorManager;
