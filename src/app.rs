// SPDX-License-Identifier: GPL-3.0-only
//! Request dispatch
//!
//! Turns a parsed invocation into exactly one [`Envelope`]. Nothing here
//! returns early without one.

use crate::cli::{Invocation, Request};
use crate::envelope::Envelope;
use crate::error::Result;
use crate::monitor::MonitorManager;
use crate::protocols::MonitorSource;

fn execute<S: MonitorSource>(manager: &MonitorManager<S>, request: Request) -> Result<Envelope> {
    debug!(request = ?request, "Dispatching");
    match request {
        Request::MonitorInfo => Envelope::success(manager.get_monitor_info()),
        Request::SetBrightness { index, value } => Envelope::success(manager.set_brightness(index, value)?),
        Request::SetInput { index, source } => Envelope::success(manager.set_input(index, &source)?),
        Request::SetPower { index, mode } => Envelope::success(manager.set_power(index, mode)?),
        Request::GetSupportedFeatures { index } => {
            Envelope::success(manager.get_supported_features(index))
        }
        Request::GetVcp { index, code } => Envelope::success(manager.get_vcp(index, code)?),
        Request::SetVcp { index, code, value } => Envelope::success(manager.set_vcp(index, code, value)?),
        Request::GetCapabilities { index } => Envelope::success(manager.get_capabilities(index)?),
    }
}

/// Run a parsed command line against `manager`
pub fn handle<S: MonitorSource>(manager: &MonitorManager<S>, invocation: Result<Invocation>) -> Envelope {
    let result = invocation.and_then(|invocation| match invocation {
        Invocation::Run(request) => execute(manager, request),
        Invocation::Unrecognized => Ok(Envelope::unrecognized()),
    });

    result.unwrap_or_else(|err| {
        error!("{err}");
        Envelope::error(err.to_string())
    })
}
