// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;

use crate::config::get_currency;
use crate::db::{Store, load_ledger};
use crate::utils::{fmt_money, maybe_print_json, parse_decimal, pretty_table, resolve_lesson_type};

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap();
            let rate = parse_decimal(sub.get_one::<String>("rate").unwrap())?;
            let mut ledger = load_ledger(conn)?;
            let added = ledger.add_lesson_type(name, rate)?.clone();
            conn.save_types(ledger.types().as_slice())?;
            println!(
                "Added lesson type '{}' at {} ({})",
                added.name(),
                added.default_rate(),
                added.id()
            );
        }
        Some(("edit", sub)) => {
            let key = sub.get_one::<String>("type").unwrap();
            let name = sub.get_one::<String>("name").map(|s| s.as_str());
            let rate = sub
                .get_one::<String>("rate")
                .map(|s| parse_decimal(s))
                .transpose()?;
            let mut ledger = load_ledger(conn)?;
            let id = resolve_lesson_type(&ledger, key)?.id();
            ledger.edit_lesson_type(id, name, rate)?;
            conn.save_types(ledger.types().as_slice())?;
            println!("Updated lesson type {}; existing lessons keep their rate", id);
        }
        Some(("list", sub)) => {
            let ccy = get_currency(conn)?;
            let ledger = load_ledger(conn)?;
            let sorted = ledger.types().sorted_by_name();
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &sorted)? {
                let rows = sorted
                    .iter()
                    .map(|t| {
                        vec![
                            t.name().to_string(),
                            fmt_money(&t.default_rate(), &ccy),
                            t.id().to_string(),
                        ]
                    })
                    .collect();
                println!("{}", pretty_table(&["Name", "Default rate", "Id"], rows));
            }
        }
        Some(("rm", sub)) => {
            let key = sub.get_one::<String>("type").unwrap();
            let mut ledger = load_ledger(conn)?;
            let id = resolve_lesson_type(&ledger, key)?.id();
            let removed = ledger.remove_lesson_type(id)?;
            conn.save_types(ledger.types().as_slice())?;
            println!("Removed lesson type '{}'", removed.name());
        }
        _ => {}
    }
    Ok(())
}
