/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FtpRawResponseError {
    #[error("read failed: {0:?}")]
    ReadFailed(io::Error),
    #[error("connection closed")]
    ConnectionClosed,
    #[error("response too long")]
    LineTooLong,
    #[error("response too short")]
    LineTooShort,
    #[error("invalid reply code {0:?}")]
    InvalidReplyCode(String),
    #[error("too many lines")]
    TooManyLines,
}

impl FtpRawResponseError {
    /// The line was dropped, the channel can still be used.
    pub fn is_frame_error(&self) -> bool {
        matches!(self, FtpRawResponseError::LineTooLong)
    }

    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            FtpRawResponseError::LineTooShort | FtpRawResponseError::InvalidReplyCode(_)
        )
    }
}
