// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, crate_version};

fn json_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print as JSON lines"),
    )
}

fn teacher_arg(required: bool) -> Arg {
    Arg::new("teacher")
        .long("teacher")
        .short('t')
        .required(required)
        .help("Teacher name or id")
}

fn id_arg() -> Arg {
    Arg::new("id").long("id").required(true).help("Record id")
}

fn month_arg() -> Arg {
    Arg::new("month")
        .long("month")
        .help("Calendar month YYYY-MM (defaults to the current month)")
}

fn export_format_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("format")
            .long("format")
            .default_value("csv")
            .help("csv|json"),
    )
    .arg(Arg::new("out").long("out").required(true).help("Output file"))
}

pub fn build_cli() -> Command {
    Command::new("lessonbook")
        .version(crate_version!())
        .about("Track lessons, payments and balances per teacher")
        .arg(
            Arg::new("today")
                .long("today")
                .global(true)
                .help("Treat this date (YYYY-MM-DD) as today"),
        )
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(
            Command::new("teacher")
                .about("Manage teachers")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true)),
                )
                .subcommand(json_args(Command::new("list")))
                .subcommand(
                    Command::new("rename")
                        .arg(teacher_arg(true))
                        .arg(Arg::new("name").long("name").required(true)),
                )
                .subcommand(
                    Command::new("rm")
                        .about("Delete a teacher with all lessons and payments")
                        .arg(teacher_arg(true)),
                )
                .subcommand(json_args(
                    Command::new("show")
                        .arg(teacher_arg(true))
                        .arg(month_arg()),
                )),
        )
        .subcommand(
            Command::new("lesson")
                .about("Log and edit lessons")
                .subcommand(
                    Command::new("add")
                        .arg(teacher_arg(true))
                        .arg(Arg::new("date").long("date").help("YYYY-MM-DD, defaults to today"))
                        .arg(Arg::new("hours").long("hours").required(true))
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .help("Lesson type name or id; pre-fills the rate"),
                        )
                        .arg(
                            Arg::new("label")
                                .long("label")
                                .conflicts_with("type")
                                .help("Free-text lesson label"),
                        )
                        .arg(Arg::new("rate").long("rate").help("Hourly rate override"))
                        .arg(Arg::new("paid").long("paid").action(ArgAction::SetTrue)),
                )
                .subcommand(
                    Command::new("edit")
                        .arg(id_arg())
                        .arg(Arg::new("date").long("date"))
                        .arg(Arg::new("hours").long("hours"))
                        .arg(Arg::new("type").long("type"))
                        .arg(Arg::new("label").long("label").conflicts_with("type"))
                        .arg(Arg::new("rate").long("rate"))
                        .arg(Arg::new("paid").long("paid").help("true|false")),
                )
                .subcommand(Command::new("rm").arg(id_arg()))
                .subcommand(json_args(
                    Command::new("list")
                        .arg(teacher_arg(false))
                        .arg(month_arg())
                        .arg(
                            Arg::new("unpaid")
                                .long("unpaid")
                                .action(ArgAction::SetTrue)
                                .help("Only lessons not yet paid"),
                        ),
                ))
                .subcommand(
                    Command::new("paid")
                        .about("Set the paid flag of one lesson")
                        .arg(id_arg())
                        .arg(
                            Arg::new("undo")
                                .long("undo")
                                .action(ArgAction::SetTrue)
                                .help("Mark as unpaid instead"),
                        ),
                )
                .subcommand(
                    Command::new("mark-prev-month")
                        .about("Mark every unpaid lesson of last month as paid")
                        .arg(teacher_arg(true)),
                ),
        )
        .subcommand(
            Command::new("payment")
                .about("Record payments received")
                .subcommand(
                    Command::new("add")
                        .arg(teacher_arg(true))
                        .arg(Arg::new("date").long("date"))
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(
                            Arg::new("method")
                                .long("method")
                                .default_value("cash")
                                .help("card|cash|other"),
                        )
                        .arg(Arg::new("note").long("note")),
                )
                .subcommand(
                    Command::new("edit")
                        .arg(id_arg())
                        .arg(Arg::new("date").long("date"))
                        .arg(Arg::new("amount").long("amount"))
                        .arg(Arg::new("method").long("method"))
                        .arg(Arg::new("note").long("note").help("Empty string clears the note")),
                )
                .subcommand(Command::new("rm").arg(id_arg()))
                .subcommand(json_args(
                    Command::new("list")
                        .arg(teacher_arg(false))
                        .arg(month_arg()),
                )),
        )
        .subcommand(
            Command::new("type")
                .about("Manage lesson types")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("rate").long("rate").required(true)),
                )
                .subcommand(
                    Command::new("edit")
                        .arg(Arg::new("type").long("type").required(true))
                        .arg(Arg::new("name").long("name"))
                        .arg(Arg::new("rate").long("rate")),
                )
                .subcommand(json_args(Command::new("list")))
                .subcommand(
                    Command::new("rm").arg(Arg::new("type").long("type").required(true)),
                ),
        )
        .subcommand(
            Command::new("report")
                .about("Balances and statistics")
                .subcommand(json_args(Command::new("balance")))
                .subcommand(json_args(
                    Command::new("month")
                        .arg(teacher_arg(true))
                        .arg(month_arg()),
                ))
                .subcommand(json_args(
                    Command::new("stats")
                        .arg(teacher_arg(true))
                        .arg(month_arg().conflicts_with_all(["from", "to"]))
                        .arg(Arg::new("from").long("from").requires("to"))
                        .arg(Arg::new("to").long("to").requires("from")),
                ))
                .subcommand(json_args(Command::new("history")))
                .subcommand(json_args(Command::new("unpaid").arg(teacher_arg(true))))
                .subcommand(json_args(Command::new("monthly-lessons").arg(month_arg()))),
        )
        .subcommand(
            Command::new("export")
                .about("Export lessons or payments")
                .subcommand(export_format_args(Command::new("lessons")))
                .subcommand(export_format_args(Command::new("payments"))),
        )
        .subcommand(
            Command::new("config")
                .about("Show or change settings")
                .subcommand(json_args(Command::new("show")))
                .subcommand(Command::new("get").arg(Arg::new("key").long("key").required(true)))
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("key").long("key").required(true))
                        .arg(Arg::new("value").long("value").required(true)),
                ),
        )
}
