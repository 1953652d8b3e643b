/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

//! Blocking FTP client using passive mode data connections.
//!
//! Commands and replies on the control channel strictly alternate, and at
//! most one [`FtpDataChannel`] can be open on a control channel at a time.
//! Multi-line replies are supported.

mod config;
pub use config::{FtpClientConfig, FtpControlConfig};

mod connection;
pub use connection::{FtpConnectionProvider, FtpStream, TcpConnectionProvider};

mod control;
pub use control::{FtpCommand, FtpControlChannel, FtpResponse, parse_quoted_path};

mod debug;
pub use debug::{FTP_DEBUG_LOG_LEVEL, FTP_DEBUG_LOG_TARGET};

mod error;
pub use error::{
    FtpCommandError, FtpConnectError, FtpFileTransferError, FtpRawResponseError,
    FtpSessionOpenError, FtpTransferEndError, FtpTransferSetupError,
};

mod transfer;
pub use transfer::{FtpDataChannel, FtpTransferType};

mod client;
pub use client::FtpClient;

#[cfg(test)]
mod mock;
