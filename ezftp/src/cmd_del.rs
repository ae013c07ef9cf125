/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use anyhow::anyhow;
use clap::{Arg, ArgMatches, Command};

use super::CliSession;

pub(super) const COMMAND: &str = "del";

const COMMAND_ARG_REMOTE_DIR: &str = "remote-dir";
const COMMAND_ARG_REMOTE_NAME: &str = "remote-name";

pub(super) fn command() -> Command {
    Command::new(COMMAND)
        .about("Delete a remote file")
        .arg(
            Arg::new(COMMAND_ARG_REMOTE_DIR)
                .value_name("REMOTE DIR")
                .num_args(1)
                .required(true),
        )
        .arg(
            Arg::new(COMMAND_ARG_REMOTE_NAME)
                .value_name("FILE NAME")
                .num_args(1)
                .required(true),
        )
}

pub(super) async fn run(session: &mut CliSession, args: &ArgMatches) -> anyhow::Result<()> {
    let remote_dir = args
        .get_one::<String>(COMMAND_ARG_REMOTE_DIR)
        .ok_or_else(|| anyhow!("no remote dir set"))?;
    let remote_name = args
        .get_one::<String>(COMMAND_ARG_REMOTE_NAME)
        .ok_or_else(|| anyhow!("no file name set"))?;

    session.delete_file(remote_name, remote_dir).await?;
    Ok(())
}
