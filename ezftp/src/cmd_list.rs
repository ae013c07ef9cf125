/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use clap::{Arg, ArgMatches, Command};
use tokio::io::AsyncWriteExt;

use super::CliSession;

pub(super) const COMMAND: &str = "list";

const COMMAND_ARG_PATH: &str = "path";

pub(super) fn command() -> Command {
    Command::new(COMMAND).about("List remote directory").arg(
        Arg::new(COMMAND_ARG_PATH)
            .value_name("REMOTE DIR")
            .num_args(1)
            .default_value("/"),
    )
}

pub(super) async fn run(session: &mut CliSession, args: &ArgMatches) -> anyhow::Result<()> {
    let path = args
        .get_one::<String>(COMMAND_ARG_PATH)
        .map(|s| s.as_str())
        .unwrap_or("/");

    let entries = session.list_directory(path).await?;

    let mut stdout = tokio::io::stdout();
    for entry in entries {
        let size = entry.size.map(|n| n.to_string()).unwrap_or_default();
        let line = format!("{:<4} {size:>12} {}\n", entry.kind, entry.name);
        stdout.write_all(line.as_bytes()).await?;
    }
    stdout.flush().await?;
    Ok(())
}
