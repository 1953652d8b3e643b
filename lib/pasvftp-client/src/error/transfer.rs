/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;

use thiserror::Error;

use super::{FtpCommandError, FtpRawResponseError};

#[derive(Debug, Error)]
pub enum FtpTransferSetupError {
    #[error("command error: {0}")]
    CommandError(#[from] FtpCommandError),
    /// The server still owes a reply for the transfer command. The control
    /// channel refuses new commands until it is read by
    /// [`FtpControlChannel::read_response`](crate::FtpControlChannel::read_response),
    /// see [`FtpClient::control_channel`](crate::FtpClient::control_channel).
    #[error("unable to connect to data address: {0:?}")]
    DataConnectFailed(io::Error),
}

impl FtpTransferSetupError {
    pub fn reply_code(&self) -> Option<u16> {
        match self {
            FtpTransferSetupError::CommandError(e) => e.reply_code(),
            FtpTransferSetupError::DataConnectFailed(_) => None,
        }
    }
}

/// Errors surfaced when a data channel is closed.
///
/// The completion reply is always read, so a failure to read it wins over
/// a failure to shutdown the data connection.
#[derive(Debug, Error)]
pub enum FtpTransferEndError {
    #[error("data connection shutdown failed: {0:?}")]
    ShutdownFailed(io::Error),
    #[error("unable to recv transfer end reply: {0}")]
    RecvFailed(#[from] FtpRawResponseError),
    #[error("unexpected transfer end reply code {code}: {message}")]
    UnexpectedReplyCode { code: u16, message: String },
}

#[derive(Debug, Error)]
pub enum FtpFileTransferError {
    #[error("transfer setup failed: {0}")]
    SetupFailed(#[from] FtpTransferSetupError),
    #[error("local io failed: {0:?}")]
    LocalIoFailed(io::Error),
    #[error("transfer end failed: {0}")]
    EndFailed(#[from] FtpTransferEndError),
}
