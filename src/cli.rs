// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, arg, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(arg!(--json "Print JSON"))
        .arg(arg!(--jsonl "Print one JSON object per line").conflicts_with("json"))
}

fn kind_arg() -> Arg {
    Arg::new("type")
        .long("type")
        .value_name("TYPE")
        .help("income or expense (receita/despesa also accepted)")
}

fn locale_arg() -> Arg {
    arg!(--locale <LOCALE> "Amount separators: auto, comma (1.234,56) or dot (1,234.56)")
}

fn format_arg() -> Arg {
    arg!(--format <FORMAT> "csv or json").value_parser(["csv", "json"])
}

fn import_format_arg() -> Arg {
    arg!(--format <FORMAT> "csv, json or xlsx; guessed from the extension")
        .value_parser(["csv", "json", "xlsx"])
}

fn trade_cmd(name: &'static str, about: &'static str) -> Command {
    Command::new(name)
        .about(about)
        .arg(arg!(--date <DATE> "YYYY-MM-DD").required(true))
        .arg(arg!(--ticker <TICKER>).required(true))
        .arg(arg!(--quantity <QTY>).required(true))
        .arg(arg!(--price <PRICE>).required(true))
        .arg(arg!(--fees <FEES>))
        .arg(arg!(--name <NAME> "Asset name"))
        .arg(
            Arg::new("asset-type")
                .long("asset-type")
                .value_name("TYPE")
                .help("STOCK, FII, ETF, ..."),
        )
        .arg(arg!(--note <NOTE>))
}

pub fn build_cli() -> Command {
    Command::new("organiza")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Personal finance organizer: cash flow, budgets, investments and scheduled bills")
        .subcommand(Command::new("init").about("Create the local database"))
        .subcommand(
            Command::new("category")
                .about("User categories with auto-categorization keywords")
                .subcommand(
                    Command::new("add")
                        .arg(arg!(--name <NAME>).required(true))
                        .arg(kind_arg().default_value("expense"))
                        .arg(arg!(--keywords <KEYWORDS> "Comma separated, tried in order"))
                        .arg(arg!(--icon <ICON>))
                        .arg(arg!(--color <COLOR>)),
                )
                .subcommand(json_flags(Command::new("list")))
                .subcommand(
                    Command::new("rm")
                        .arg(arg!(--name <NAME>).required(true))
                        .arg(kind_arg().default_value("expense")),
                ),
        )
        .subcommand(
            Command::new("tx")
                .about("Cash transactions")
                .subcommand(
                    Command::new("add")
                        .arg(arg!(--date <DATE> "YYYY-MM-DD").required(true))
                        .arg(
                            arg!(--amount <AMOUNT> "Sign is ignored, --type sets the direction")
                                .required(true)
                                .allow_hyphen_values(true),
                        )
                        .arg(arg!(--description <TEXT>))
                        .arg(arg!(--category <CATEGORY> "Auto-categorized when omitted"))
                        .arg(kind_arg().default_value("expense"))
                        .arg(arg!(--group <GROUP>)),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .arg(arg!(--month <MONTH> "YYYY-MM"))
                        .arg(arg!(--category <CATEGORY>))
                        .arg(arg!(--scope <SCOPE> "all, personal or group:<id>"))
                        .arg(arg!(--limit <N>).value_parser(value_parser!(usize))),
                ))
                .subcommand(
                    Command::new("import")
                        .about("Import a spreadsheet (CSV, JSON rows or an Excel workbook)")
                        .arg(arg!(--path <PATH>).required(true))
                        .arg(import_format_arg())
                        .arg(locale_arg())
                        .arg(arg!(--group <GROUP>))
                        .arg(arg!(--"dry-run" "Report what would be imported")),
                )
                .subcommand(
                    Command::new("export")
                        .arg(format_arg().default_value("csv"))
                        .arg(arg!(--out <PATH>).required(true))
                        .arg(arg!(--month <MONTH> "YYYY-MM"))
                        .arg(arg!(--scope <SCOPE> "all, personal or group:<id>")),
                ),
        )
        .subcommand(
            Command::new("budget").about("Percentage-of-income buckets").subcommand(json_flags(
                Command::new("report").arg(arg!(--month <MONTH> "YYYY-MM").required(true)),
            )),
        )
        .subcommand(
            Command::new("portfolio")
                .about("Investment transactions and positions")
                .subcommand(trade_cmd("buy", "Record a purchase"))
                .subcommand(trade_cmd("sell", "Record a sale"))
                .subcommand(json_flags(Command::new("positions")))
                .subcommand(
                    Command::new("import")
                        .arg(arg!(--path <PATH>).required(true))
                        .arg(import_format_arg())
                        .arg(locale_arg())
                        .arg(arg!(--"dry-run" "Report what would be imported")),
                )
                .subcommand(
                    Command::new("quantity-at")
                        .about("Quantity held at the end of a day")
                        .arg(arg!(--ticker <TICKER>).required(true))
                        .arg(arg!(--date <DATE> "YYYY-MM-DD").required(true)),
                ),
        )
        .subcommand(
            Command::new("tasks")
                .about("Scheduled bills, income and reminders")
                .subcommand(
                    Command::new("add")
                        .arg(arg!(--title <TITLE>).required(true))
                        .arg(arg!(--at <WHEN> "YYYY-MM-DD[ HH:MM[:SS]]").required(true))
                        .arg(
                            arg!(--value <AMOUNT> "Positive for income, negative for expense")
                                .allow_hyphen_values(true),
                        )
                        .arg(arg!(--category <CATEGORY>))
                        .arg(arg!(--description <TEXT>))
                        .arg(arg!(--repeat <PATTERN> "daily, weekly, monthly or yearly"))
                        .arg(
                            arg!(--every <N> "Repeat interval")
                                .value_parser(value_parser!(u32))
                                .requires("repeat"),
                        )
                        .arg(arg!(--until <DATE> "Last allowed date, YYYY-MM-DD").requires("repeat"))
                        .arg(arg!(--group <GROUP>)),
                )
                .subcommand(json_flags(
                    Command::new("list").arg(
                        Arg::new("all")
                            .long("all")
                            .action(ArgAction::SetTrue)
                            .help("Include completed tasks"),
                    ),
                ))
                .subcommand(
                    Command::new("done")
                        .about("Complete a task; recurring tasks spawn their next occurrence")
                        .arg(arg!(--id <ID>).required(true).value_parser(value_parser!(i64))),
                )
                .subcommand(
                    Command::new("undo")
                        .arg(arg!(--id <ID>).required(true).value_parser(value_parser!(i64))),
                )
                .subcommand(
                    Command::new("rm")
                        .arg(arg!(--id <ID>).required(true).value_parser(value_parser!(i64))),
                ),
        )
        .subcommand(
            Command::new("goals")
                .about("Savings goals and their contributions")
                .subcommand(
                    Command::new("add")
                        .arg(arg!(--title <TITLE>).required(true))
                        .arg(arg!(--target <AMOUNT> "Amount to reach").required(true))
                        .arg(arg!(--current <AMOUNT> "Already saved, defaults to 0"))
                        .arg(arg!(--deadline <DATE> "YYYY-MM-DD"))
                        .arg(arg!(--category <CATEGORY>))
                        .arg(arg!(--description <TEXT>))
                        .arg(arg!(--icon <ICON>))
                        .arg(arg!(--color <COLOR>))
                        .arg(arg!(--group <GROUP>)),
                )
                .subcommand(json_flags(Command::new("list")))
                .subcommand(
                    Command::new("contribute")
                        .about("Add money to a goal; recorded as a 'Metas' expense")
                        .arg(arg!(--id <ID>).required(true).value_parser(value_parser!(i64)))
                        .arg(arg!(--amount <AMOUNT>).required(true))
                        .arg(arg!(--date <DATE> "YYYY-MM-DD, defaults to today")),
                )
                .subcommand(json_flags(
                    Command::new("history")
                        .about("Contributions with their running total")
                        .arg(arg!(--id <ID>).required(true).value_parser(value_parser!(i64))),
                ))
                .subcommand(
                    Command::new("rm")
                        .arg(arg!(--id <ID>).required(true).value_parser(value_parser!(i64))),
                ),
        )
        .subcommand(json_flags(
            Command::new("forecast")
                .about("Project income and expense month by month from scheduled tasks and recent averages")
                .arg(
                    arg!(--months <N>)
                        .value_parser(value_parser!(u32))
                        .default_value("3"),
                )
                .arg(arg!(--from <MONTH> "YYYY-MM, defaults to the current month"))
                .arg(arg!(--opening <AMOUNT> "Opening balance").allow_hyphen_values(true)),
        ))
        .subcommand(
            Command::new("plan")
                .about("Subscription plan and its limits")
                .subcommand(json_flags(Command::new("show")))
                .subcommand(
                    Command::new("set").arg(
                        arg!(--plan <PLAN> "free, basic or advanced").required(true),
                    ),
                ),
        )
        .subcommand(
            Command::new("config")
                .about("Stored settings (plan, number_locale)")
                .subcommand(Command::new("get").arg(arg!(--key <KEY>)))
                .subcommand(
                    Command::new("set")
                        .arg(arg!(--key <KEY>).required(true))
                        .arg(arg!(--value <VALUE>).required(true)),
                ),
        )
}
