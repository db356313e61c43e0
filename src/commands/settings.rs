// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;

use crate::config::{Config, get_currency, get_setting, set_setting, KEY_CURRENCY};
use crate::utils::{maybe_print_json, pretty_table};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => {
            let cfg = Config::load(conn)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &cfg)? {
                println!(
                    "{}",
                    pretty_table(
                        &["Setting", "Value"],
                        vec![
                            vec!["database".into(), cfg.db_path.display().to_string()],
                            vec![KEY_CURRENCY.into(), cfg.currency],
                            vec![
                                "log filter".into(),
                                cfg.log_filter.unwrap_or_else(|| "(default)".into()),
                            ],
                        ],
                    )
                );
            }
        }
        Some(("get", sub)) => {
            let key = sub.get_one::<String>("key").unwrap().trim();
            let value = if key == KEY_CURRENCY {
                Some(get_currency(conn)?)
            } else {
                get_setting(conn, key)?
            };
            match value {
                Some(v) => println!("{}", v),
                None => println!("{} is not set", key),
            }
        }
        Some(("set", sub)) => {
            let key = sub.get_one::<String>("key").unwrap().trim();
            let value = sub.get_one::<String>("value").unwrap();
            set_setting(conn, key, value)?;
            println!("Set {}", key);
        }
        _ => {}
    }
    Ok(())
}
