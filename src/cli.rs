// SPDX-License-Identifier: GPL-3.0-only
//! Command-line surface
//!
//! Commands are positional (`set_brightness 0 50`). Structural problems,
//! such as an unknown command or a missing argument, are reported as
//! [`Invocation::Unrecognized`]; arguments that are not integers at all are
//! [`AppError::InvalidArgument`] so their text can reach the caller. Range
//! checks on integers belong to the command that uses them.

use std::ffi::OsString;
use std::str::FromStr;

use clap::{Arg, ArgMatches, Command};

use crate::error::{AppError, Result};
use crate::monitor::RequestedIndex;
use crate::vcp::InputSource;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    MonitorInfo,
    SetBrightness { index: RequestedIndex, value: i64 },
    SetInput { index: RequestedIndex, source: InputSource },
    SetPower { index: RequestedIndex, mode: i64 },
    GetSupportedFeatures { index: RequestedIndex },
    GetVcp { index: RequestedIndex, code: u8 },
    SetVcp { index: RequestedIndex, code: u8, value: i64 },
    GetCapabilities { index: RequestedIndex },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Run(Request),
    Unrecognized,
}

fn positional(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .help(help)
        .required(true)
        .allow_hyphen_values(true)
}

/// Extra trailing arguments are accepted and ignored
fn rest() -> Arg {
    Arg::new("rest")
        .num_args(0..)
        .trailing_var_arg(true)
        .allow_hyphen_values(true)
        .hide(true)
}

fn index_arg() -> Arg {
    positional("index", "Monitor position in the enumeration, from 0")
}

pub fn command() -> Command {
    Command::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .disable_help_subcommand(true)
        .subcommand(
            Command::new("set_brightness")
                .about("Set luminance (VCP 0x10)")
                .arg(index_arg())
                .arg(positional("value", "Luminance value"))
                .arg(rest()),
        )
        .subcommand(
            Command::new("set_input")
                .about("Switch input source")
                .arg(index_arg())
                .arg(positional("source", "HDMI1, HDMI2, DP1, TYPE-C or a numeric input code"))
                .arg(rest()),
        )
        .subcommand(
            Command::new("set_power")
                .about("Set power mode (1 On, 4 Standby, 5 Off)")
                .arg(index_arg())
                .arg(positional("mode", "Power mode"))
                .arg(rest()),
        )
        .subcommand(
            Command::new("get_supported_features")
                .about("List supported VCP codes")
                .arg(index_arg())
                .arg(rest()),
        )
        .subcommand(
            Command::new("get_vcp")
                .about("Read one VCP feature")
                .arg(index_arg())
                .arg(positional("code", "VCP code, decimal or 0x-prefixed hex"))
                .arg(rest()),
        )
        .subcommand(
            Command::new("set_vcp")
                .about("Write one VCP feature")
                .arg(index_arg())
                .arg(positional("code", "VCP code, decimal or 0x-prefixed hex"))
                .arg(positional("value", "Feature value"))
                .arg(rest()),
        )
        .subcommand(
            Command::new("get_capabilities")
                .about("Report the parsed capability string")
                .arg(index_arg())
                .arg(rest()),
        )
}

fn raw<'a>(matches: &'a ArgMatches, name: &'static str) -> &'a str {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .unwrap_or_default()
}

fn integer<T>(matches: &ArgMatches, name: &'static str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let value = raw(matches, name);
    value.trim().parse().map_err(|e: T::Err| AppError::InvalidArgument {
        name,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn vcp_code(matches: &ArgMatches) -> Result<u8> {
    let value = raw(matches, "code").trim();
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => value.parse(),
    };
    parsed.map_err(|e| AppError::InvalidArgument {
        name: "code",
        value: value.to_string(),
        reason: e.to_string(),
    })
}

pub fn parse<I, T>(args: I) -> Result<Invocation>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = match command().try_get_matches_from(args) {
        Ok(matches) => matches,
        Err(err) => {
            debug!(kind = ?err.kind(), "Unrecognized invocation");
            return Ok(Invocation::Unrecognized);
        }
    };

    let request = match matches.subcommand() {
        None => Request::MonitorInfo,
        Some(("set_brightness", m)) => Request::SetBrightness {
            index: integer(m, "index")?,
            value: integer(m, "value")?,
        },
        Some(("set_input", m)) => Request::SetInput {
            index: integer(m, "index")?,
            source: InputSource::parse(raw(m, "source")),
        },
        Some(("set_power", m)) => Request::SetPower {
            index: integer(m, "index")?,
            mode: integer(m, "mode")?,
        },
        Some(("get_supported_features", m)) => Request::GetSupportedFeatures {
            index: integer(m, "index")?,
        },
        Some(("get_vcp", m)) => Request::GetVcp {
            index: integer(m, "index")?,
            code: vcp_code(m)?,
        },
        Some(("set_vcp", m)) => Request::SetVcp {
            index: integer(m, "index")?,
            code: vcp_code(m)?,
            value: integer(m, "value")?,
        },
        Some(("get_capabilities", m)) => Request::GetCapabilities {
            index: integer(m, "index")?,
        },
        Some(_) => return Ok(Invocation::Unrecognized),
    };

    Ok(Invocation::Run(request))
}
