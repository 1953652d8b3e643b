/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fs::File;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, anyhow};
use clap::{Arg, ArgMatches, Command, value_parser};
use log::info;

use pasvftp_client::{FtpClient, FtpConnectionProvider, FtpStream};

pub(super) const COMMAND: &str = "get";

const COMMAND_ARG_REMOTE: &str = "remote";
const COMMAND_ARG_LOCAL: &str = "local";

pub(super) fn command() -> Command {
    Command::new(COMMAND)
        .about("Download file, to stdout if no local file is given")
        .arg(
            Arg::new(COMMAND_ARG_REMOTE)
                .value_name("REMOTE PATH")
                .num_args(1)
                .required(true),
        )
        .arg(
            Arg::new(COMMAND_ARG_LOCAL)
                .value_name("LOCAL FILE")
                .value_parser(value_parser!(PathBuf))
                .num_args(1),
        )
}

pub(super) fn run<CP, S>(client: &mut FtpClient<CP, S>, args: &ArgMatches) -> anyhow::Result<()>
where
    CP: FtpConnectionProvider<S>,
    S: FtpStream,
{
    let Some(remote) = args.get_one::<String>(COMMAND_ARG_REMOTE) else {
        return Err(anyhow!("no remote path set"));
    };

    let n = match args.get_one::<PathBuf>(COMMAND_ARG_LOCAL) {
        Some(local) => {
            let mut file = File::create(local)
                .context(format!("failed to create local file {}", local.display()))?;
            client.retrieve_to(remote, &mut file)?
        }
        None => client.retrieve_to(remote, &mut io::stdout().lock())?,
    };
    info!("{n} bytes received");
    Ok(())
}
