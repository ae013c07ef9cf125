/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use log::Level;

pub const FTP_DEBUG_LOG_LEVEL: Level = Level::Debug;
pub const FTP_DEBUG_LOG_TARGET: &str = "ezftp::raw";

#[cfg(feature = "log-raw-io")]
pub(crate) fn log_cmd(cmd: &str) {
    // never leak the password into the log
    let cmd = if cmd.starts_with("PASS ") {
        "PASS ****"
    } else {
        cmd
    };
    log::log!(
        target: FTP_DEBUG_LOG_TARGET,
        FTP_DEBUG_LOG_LEVEL,
        "> {}",
        cmd
    );
}

#[cfg(feature = "log-raw-io")]
pub(crate) fn log_rsp(rsp: &[u8]) {
    log::log!(
        target: FTP_DEBUG_LOG_TARGET,
        FTP_DEBUG_LOG_LEVEL,
        "< {}",
        String::from_utf8_lossy(rsp).trim_end()
    );
}
