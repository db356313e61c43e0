// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use lessonbook::{cli, commands, db, logging};

fn main() -> Result<()> {
    logging::init();
    let cli = cli::build_cli();
    let matches = cli.get_matches();
    let today = commands::today(&matches)?;

    let mut conn = db::open_or_init()?;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", db::db_path()?.display());
        }
        Some(("teacher", sub)) => commands::teachers::handle(&mut conn, sub, today)?,
        Some(("lesson", sub)) => commands::lessons::handle(&mut conn, sub, today)?,
        Some(("payment", sub)) => commands::payments::handle(&mut conn, sub, today)?,
        Some(("type", sub)) => commands::types::handle(&mut conn, sub)?,
        Some(("report", sub)) => commands::reports::handle(&conn, sub, today)?,
        Some(("export", sub)) => commands::exporter::handle(&conn, sub)?,
        Some(("config", sub)) => commands::settings::handle(&conn, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
