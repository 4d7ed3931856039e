// SPDX-License-Identifier: GPL-3.0-only
//! Friendly display names from the Windows display configuration

use std::{mem, ptr};

use anyhow::{Context, Result, anyhow};
use windows::Win32::Devices::Display::{
    DISPLAYCONFIG_DEVICE_INFO_GET_TARGET_NAME, DISPLAYCONFIG_MODE_INFO, DISPLAYCONFIG_PATH_INFO,
    DISPLAYCONFIG_TARGET_DEVICE_NAME, DisplayConfigGetDeviceInfo, GetDisplayConfigBufferSizes,
    QDC_ONLY_ACTIVE_PATHS, QueryDisplayConfig,
};

use super::{NameSource, decode_friendly_name};

/// Reads `monitorFriendlyDeviceName` for every active display path
#[derive(Debug, Default, Clone, Copy)]
pub struct DisplayConfigNames;

impl NameSource for DisplayConfigNames {
    fn friendly_names(&self) -> Result<Vec<Option<String>>> {
        let paths = active_paths()?;
        let mut names = Vec::with_capacity(paths.len());

        for path in &paths {
            let mut target = DISPLAYCONFIG_TARGET_DEVICE_NAME::default();
            target.header.adapterId = path.targetInfo.adapterId;
            target.header.id = path.targetInfo.id;
            target.header.r#type = DISPLAYCONFIG_DEVICE_INFO_GET_TARGET_NAME;
            target.header.size = mem::size_of_val(&target) as u32;

            let status = unsafe { DisplayConfigGetDeviceInfo(ptr::addr_of_mut!(target.header)) };
            if status != 0 {
                debug!(status, "DisplayConfigGetDeviceInfo failed for a display path");
                names.push(None);
                continue;
            }

            names.push(decode_friendly_name(&target.monitorFriendlyDeviceName));
        }

        Ok(names)
    }
}

fn active_paths() -> Result<Vec<DISPLAYCONFIG_PATH_INFO>> {
    let mut num_paths: u32 = 0;
    let mut num_modes: u32 = 0;

    unsafe {
        GetDisplayConfigBufferSizes(
            QDC_ONLY_ACTIVE_PATHS,
            ptr::addr_of_mut!(num_paths),
            ptr::addr_of_mut!(num_modes),
        )
        .ok()
        .context("failed to get buffer sizes for QueryDisplayConfig")?;
    }

    let mut paths = vec![DISPLAYCONFIG_PATH_INFO::default(); num_paths as usize];
    let mut modes = vec![DISPLAYCONFIG_MODE_INFO::default(); num_modes as usize];

    unsafe {
        QueryDisplayConfig(
            QDC_ONLY_ACTIVE_PATHS,
            ptr::addr_of_mut!(num_paths),
            paths.as_mut_ptr(),
            ptr::addr_of_mut!(num_modes),
            modes.as_mut_ptr(),
            None,
        )
        .ok()
        .context("failed to get display path information")?;
    }

    if num_paths as usize > paths.len() {
        return Err(anyhow!("display configuration changed during query"));
    }
    paths.truncate(num_paths as usize);
    Ok(paths)
}
