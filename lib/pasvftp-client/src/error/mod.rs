/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod command;
mod connect;
mod response;
mod session;
mod transfer;

pub use command::FtpCommandError;
pub use connect::FtpConnectError;
pub use response::FtpRawResponseError;
pub use session::FtpSessionOpenError;
pub use transfer::{FtpFileTransferError, FtpTransferEndError, FtpTransferSetupError};

pub(crate) use session::FtpAuthStatus;
