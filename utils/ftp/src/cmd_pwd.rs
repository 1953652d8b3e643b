/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use clap::{ArgMatches, Command};

use pasvftp_client::{FtpClient, FtpConnectionProvider, FtpStream};

pub(super) const COMMAND: &str = "pwd";

pub(super) fn command() -> Command {
    Command::new(COMMAND).about("Print the current directory")
}

pub(super) fn run<CP, S>(client: &mut FtpClient<CP, S>, _args: &ArgMatches) -> anyhow::Result<()>
where
    CP: FtpConnectionProvider<S>,
    S: FtpStream,
{
    let dir = client.current_dir()?;
    println!("{dir}");
    Ok(())
}
