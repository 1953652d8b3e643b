/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, anyhow};
use clap::{Arg, ArgMatches, Command, value_parser};
use log::info;

use pasvftp_client::{FtpClient, FtpConnectionProvider, FtpStream};

pub(super) const COMMAND: &str = "put";

const COMMAND_ARG_LOCAL: &str = "local";
const COMMAND_ARG_REMOTE: &str = "remote";

pub(super) fn command() -> Command {
    Command::new(COMMAND)
        .about("Upload file")
        .arg(
            Arg::new(COMMAND_ARG_LOCAL)
                .value_name("LOCAL FILE")
                .value_parser(value_parser!(PathBuf))
                .num_args(1)
                .required(true),
        )
        .arg(
            Arg::new(COMMAND_ARG_REMOTE)
                .value_name("REMOTE PATH")
                .num_args(1)
                .required(true),
        )
}

pub(super) fn run<CP, S>(client: &mut FtpClient<CP, S>, args: &ArgMatches) -> anyhow::Result<()>
where
    CP: FtpConnectionProvider<S>,
    S: FtpStream,
{
    let Some(local) = args.get_one::<PathBuf>(COMMAND_ARG_LOCAL) else {
        return Err(anyhow!("no local file set"));
    };
    let Some(remote) = args.get_one::<String>(COMMAND_ARG_REMOTE) else {
        return Err(anyhow!("no remote path set"));
    };

    let mut file =
        File::open(local).context(format!("failed to open local file {}", local.display()))?;
    let n = client.store_from(remote, &mut file)?;
    info!("{n} bytes sent");
    Ok(())
}
