/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use anyhow::anyhow;
use clap::{Arg, ArgMatches, Command};

use super::CliSession;

pub(super) const COMMAND: &str = "rmd";

const COMMAND_ARG_REMOTE_DIR: &str = "remote-dir";

pub(super) fn command() -> Command {
    Command::new(COMMAND)
        .about("Delete the files of a remote directory, then the directory")
        .arg(
            Arg::new(COMMAND_ARG_REMOTE_DIR)
                .value_name("REMOTE DIR")
                .num_args(1)
                .required(true),
        )
}

pub(super) async fn run(session: &mut CliSession, args: &ArgMatches) -> anyhow::Result<()> {
    let remote_dir = args
        .get_one::<String>(COMMAND_ARG_REMOTE_DIR)
        .ok_or_else(|| anyhow!("no remote dir set"))?;

    session.delete_directory(remote_dir).await?;
    Ok(())
}
