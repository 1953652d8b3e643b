/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::time::Duration;

#[cfg(feature = "yaml")]
mod yaml;

const DEFAULT_MAX_LINE_LEN: usize = 8096;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FtpControlConfig {
    /// the size of the reply line buffer, including the trailing CRLF
    pub max_line_len: usize,
    /// the max length of a framed command, including the trailing CRLF
    pub max_cmd_len: usize,
    pub max_multi_lines: usize,
}

impl Default for FtpControlConfig {
    fn default() -> Self {
        FtpControlConfig {
            max_line_len: DEFAULT_MAX_LINE_LEN,
            max_cmd_len: DEFAULT_MAX_LINE_LEN,
            max_multi_lines: 128,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FtpClientConfig {
    pub control: FtpControlConfig,
    pub connect_timeout: Duration,
    /// read / write timeout set on every socket, no timeout if not set
    pub io_timeout: Option<Duration>,
    /// connect to the control peer ip instead of the one in the PASV reply
    pub pasv_use_control_host: bool,
}

impl Default for FtpClientConfig {
    fn default() -> Self {
        FtpClientConfig {
            control: FtpControlConfig::default(),
            connect_timeout: Duration::from_secs(30),
            io_timeout: None,
            pasv_use_control_host: false,
        }
    }
}
