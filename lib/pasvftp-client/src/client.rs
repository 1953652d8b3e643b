/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io::{self, Read, Write};
use std::net::SocketAddr;

use log::debug;

use crate::FtpClientConfig;
use crate::connection::{FtpConnectionProvider, FtpStream};
use crate::control::{FtpCommand, FtpControlChannel, parse_quoted_path};
use crate::error::{
    FtpAuthStatus, FtpCommandError, FtpConnectError, FtpFileTransferError, FtpSessionOpenError,
    FtpTransferEndError, FtpTransferSetupError,
};
use crate::transfer::{FtpDataChannel, FtpTransferType};

const ANONYMOUS_USER: &str = "anonymous";
const ANONYMOUS_PASS: &str = "anonymous@";

/// A logged in session over one control connection.
///
/// Only one transfer may be in progress at a time. Use more clients if
/// concurrent transfers are needed.
pub struct FtpClient<CP, S>
where
    CP: FtpConnectionProvider<S>,
    S: FtpStream,
{
    conn_provider: CP,
    control: FtpControlChannel<S>,
}

impl<CP, S> FtpClient<CP, S>
where
    CP: FtpConnectionProvider<S>,
    S: FtpStream,
{
    /// Open the control connection and wait for the greeting.
    pub fn connect_to(
        host: &str,
        port: u16,
        mut conn_provider: CP,
        config: &FtpClientConfig,
    ) -> Result<Self, FtpConnectError> {
        let stream = conn_provider
            .new_control_connection(host, port)
            .map_err(FtpConnectError::ConnectFailed)?;

        let mut control = FtpControlChannel::new(stream, &config.control);
        if let Err(e) = control.wait_greetings() {
            let _ = control.close();
            return Err(e.into());
        }

        Ok(FtpClient {
            conn_provider,
            control,
        })
    }

    /// Login with the given credentials, anonymous if no user is given.
    pub fn new_user_session(
        &mut self,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Result<(), FtpSessionOpenError> {
        let username = username.unwrap_or(ANONYMOUS_USER);
        match self.control.send_username(username)? {
            FtpAuthStatus::LoggedIn => return Ok(()),
            FtpAuthStatus::NeedPassword(_) => {}
            FtpAuthStatus::NeedAccount => return Err(FtpSessionOpenError::AccountIsNeeded),
            FtpAuthStatus::NotLoggedIn(msg) => return Err(FtpSessionOpenError::NotLoggedIn(msg)),
        }

        let password = password.unwrap_or(ANONYMOUS_PASS);
        match self.control.send_password(password)? {
            FtpAuthStatus::LoggedIn => {
                debug!("logged in as {username}");
                Ok(())
            }
            FtpAuthStatus::NeedAccount => Err(FtpSessionOpenError::AccountIsNeeded),
            FtpAuthStatus::NotLoggedIn(msg) => Err(FtpSessionOpenError::NotLoggedIn(msg)),
            FtpAuthStatus::NeedPassword(msg) => {
                Err(FtpCommandError::unexpected(FtpCommand::PASS, 331, msg).into())
            }
        }
    }

    /// Send QUIT and close the control connection.
    ///
    /// The connection is closed even if QUIT fails.
    pub fn quit_and_close(mut self) -> Result<(), FtpCommandError> {
        let r = self.control.send_quit();
        if let Err(e) = self.control.close() {
            debug!("error when closing control connection: {e}");
        }
        r
    }

    pub fn control_channel(&mut self) -> &mut FtpControlChannel<S> {
        &mut self.control
    }

    /// Get the current directory from the 257 reply.
    ///
    /// The raw message is returned if there is no quoted path in it.
    pub fn current_dir(&mut self) -> Result<String, FtpCommandError> {
        let msg = self.control.print_working_dir()?;
        match parse_quoted_path(&msg) {
            Some(path) => Ok(path),
            None => Ok(msg),
        }
    }

    pub fn change_dir(&mut self, path: &str) -> Result<String, FtpCommandError> {
        self.control.change_working_dir(path)
    }

    pub fn make_dir(&mut self, path: &str) -> Result<String, FtpCommandError> {
        self.control.make_dir(path)
    }

    pub fn remove_dir(&mut self, path: &str) -> Result<String, FtpCommandError> {
        self.control.remove_dir(path)
    }

    pub fn delete_file(&mut self, path: &str) -> Result<String, FtpCommandError> {
        self.control.delete_file(path)
    }

    pub fn file_size(&mut self, path: &str) -> Result<u64, FtpCommandError> {
        self.control.request_size(path)
    }

    fn start_transfer(
        &mut self,
        ty: FtpTransferType,
        cmd: FtpCommand,
        path: &str,
    ) -> Result<FtpDataChannel<'_, S>, FtpTransferSetupError> {
        self.control.set_transfer_type(ty)?;
        let addr = self.control.request_pasv_addr()?;

        let param = if path.is_empty() { None } else { Some(path) };
        let reply = self.control.execute(cmd, param)?;
        if reply.code() != 150 {
            return Err(
                FtpCommandError::unexpected(cmd, reply.code(), reply.into_message()).into(),
            );
        }

        let stream = match self.conn_provider.new_data_connection(SocketAddr::V4(addr)) {
            Ok(stream) => stream,
            Err(e) => {
                // the server will still send a transfer end reply
                self.control.expect_response(cmd);
                return Err(FtpTransferSetupError::DataConnectFailed(e));
            }
        };
        debug!("data connection opened for {cmd} {path}");
        Ok(FtpDataChannel::new(&mut self.control, stream))
    }

    /// Start a LIST transfer in ASCII mode, an empty path for the current directory.
    pub fn list(&mut self, path: &str) -> Result<FtpDataChannel<'_, S>, FtpTransferSetupError> {
        self.start_transfer(FtpTransferType::Ascii, FtpCommand::LIST, path)
    }

    pub fn retrieve(
        &mut self,
        path: &str,
    ) -> Result<FtpDataChannel<'_, S>, FtpTransferSetupError> {
        self.start_transfer(FtpTransferType::Binary, FtpCommand::RETR, path)
    }

    pub fn store(&mut self, path: &str) -> Result<FtpDataChannel<'_, S>, FtpTransferSetupError> {
        self.start_transfer(FtpTransferType::Binary, FtpCommand::STOR, path)
    }

    /// Download the remote file into `writer`, returns the number of bytes copied.
    pub fn retrieve_to<W: Write>(
        &mut self,
        path: &str,
        writer: &mut W,
    ) -> Result<u64, FtpFileTransferError> {
        let mut data = self.retrieve(path)?;
        let copied = io::copy(&mut data, writer);
        finish_copy(data, copied)
    }

    /// Upload everything from `reader`, returns the number of bytes copied.
    pub fn store_from<R: Read>(
        &mut self,
        path: &str,
        reader: &mut R,
    ) -> Result<u64, FtpFileTransferError> {
        let mut data = self.store(path)?;
        let copied = io::copy(reader, &mut data).and_then(|n| data.flush().map(|_| n));
        finish_copy(data, copied)
    }
}

fn finish_copy<S: FtpStream>(
    data: FtpDataChannel<'_, S>,
    copied: io::Result<u64>,
) -> Result<u64, FtpFileTransferError> {
    let end: Result<(), FtpTransferEndError> = data.close();
    let n = copied.map_err(FtpFileTransferError::LocalIoFailed)?;
    end?;
    Ok(n)
}
