/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;

use thiserror::Error;

use super::FtpRawResponseError;
use crate::control::FtpCommand;

#[derive(Debug, Error)]
pub enum FtpCommandError {
    #[error("unable to send command: {0:?}")]
    SendFailed(io::Error),
    #[error("command is too long ({0} bytes)")]
    CommandTooLong(usize),
    #[error("parameter for command {0} contains line break")]
    InvalidParameter(FtpCommand),
    #[error("command {0} sent while the previous reply is still pending")]
    OutOfSequence(FtpCommand),
    #[error("unable to recv reply: {0}")]
    RecvFailed(#[from] FtpRawResponseError),
    #[error("unexpected reply code ({cmd} -> {code}): {message}")]
    UnexpectedReplyCode {
        cmd: FtpCommand,
        code: u16,
        message: String,
    },
    #[error("invalid reply to command {cmd}: {reason}: {message}")]
    InvalidReplySyntax {
        cmd: FtpCommand,
        reason: &'static str,
        message: String,
    },
}

impl FtpCommandError {
    pub(crate) fn unexpected(cmd: FtpCommand, code: u16, message: String) -> Self {
        FtpCommandError::UnexpectedReplyCode { cmd, code, message }
    }

    /// The reply code if the server answered with something we did not ask for.
    pub fn reply_code(&self) -> Option<u16> {
        match self {
            FtpCommandError::UnexpectedReplyCode { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn is_service_not_available(&self) -> bool {
        self.reply_code() == Some(421)
    }
}
