/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;

use thiserror::Error;

use crate::error::FtpCommandError;

#[derive(Debug, Error)]
pub enum FtpConnectError {
    #[error("connect failed: {0:?}")]
    ConnectFailed(io::Error),
    #[error("greeting failed: {0}")]
    GreetingFailed(FtpCommandError),
    #[error("service not available: {0}")]
    ServiceNotAvailable(String),
}

impl From<FtpCommandError> for FtpConnectError {
    fn from(e: FtpCommandError) -> Self {
        match e {
            FtpCommandError::UnexpectedReplyCode {
                code: 421, message, ..
            } => FtpConnectError::ServiceNotAvailable(message),
            _ => FtpConnectError::GreetingFailed(e),
        }
    }
}
