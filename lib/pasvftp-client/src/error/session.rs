/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use thiserror::Error;

use super::command::FtpCommandError;

pub(crate) enum FtpAuthStatus {
    NotLoggedIn(String),
    LoggedIn,
    NeedPassword(String),
    NeedAccount,
}

#[derive(Debug, Error)]
pub enum FtpSessionOpenError {
    #[error("raw command error: {0}")]
    RawCommandError(#[from] FtpCommandError),
    #[error("not logged in: {0}")]
    NotLoggedIn(String),
    #[error("extra account is needed")]
    AccountIsNeeded,
}
