// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn json_flags(cmd: Command) -> Command {
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
            .help("Print one JSON object per line"),
    )
}

/// Fields shared by `tx add` and `tx edit`; `add` marks shop and amount required.
fn tx_fields(cmd: Command, required: bool) -> Command {
    cmd.arg(
        Arg::new("shop")
            .long("shop")
            .required(required)
            .help("Shop or service name"),
    )
    .arg(
        Arg::new("amount")
            .long("amount")
            .required(required)
            .help("Grand total (divided across installments)"),
    )
    .arg(Arg::new("date").long("date").help("Purchase date YYYY-MM-DD (default: today)"))
    .arg(
        Arg::new("type")
            .long("type")
            .value_parser(["purchase", "subscription", "service"])
            .help("Transaction type"),
    )
    .arg(
        Arg::new("installments")
            .long("installments")
            .short('n')
            .value_parser(value_parser!(u32))
            .help("Number of monthly installments (purchases only)"),
    )
    .arg(
        Arg::new("recurring")
            .long("recurring")
            .action(ArgAction::SetTrue)
            .help("Repeats monthly until --end-date"),
    )
    .arg(
        Arg::new("once")
            .long("once")
            .action(ArgAction::SetTrue)
            .conflicts_with("recurring")
            .help("Not recurring"),
    )
    .arg(Arg::new("payment-date").long("payment-date").help("Due date YYYY-MM-DD"))
    .arg(Arg::new("end-date").long("end-date").help("Recurrence end date YYYY-MM-DD"))
    .arg(Arg::new("debt-to").long("debt-to").help("Creditor; marks the purchase as a debt"))
    .arg(
        Arg::new("tag")
            .long("tag")
            .action(ArgAction::Append)
            .help("Tag name or id (repeatable)"),
    )
    .arg(
        Arg::new("item")
            .long("item")
            .action(ArgAction::Append)
            .help("Line item as name:price[:qty] (repeatable)"),
    )
}

fn wish_fields(cmd: Command) -> Command {
    cmd.arg(Arg::new("link").long("link"))
        .arg(Arg::new("image").long("image").help("Image URL"))
        .arg(Arg::new("notes").long("notes"))
        .arg(
            Arg::new("priority")
                .long("priority")
                .value_parser(value_parser!(i64)),
        )
        .arg(Arg::new("tag").long("tag").action(ArgAction::Append))
}

fn month_arg() -> Arg {
    Arg::new("month")
        .long("month")
        .help("Month as YYYY-MM (default: current month)")
}

pub fn build_cli() -> Command {
    Command::new("cuoti")
        .about("Personal finance tracker with installment plans and monthly projections")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(
            Command::new("tx")
                .about("Transactions")
                .subcommand(tx_fields(Command::new("add").about("Record a transaction"), true).arg(
                    Arg::new("group").long("group").help("Attach to an existing group id"),
                ))
                .subcommand(tx_fields(
                    Command::new("edit")
                        .about("Edit one row (other installments are untouched)")
                        .arg(
                            Arg::new("id")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        ),
                    false,
                ))
                .subcommand(json_flags(
                    Command::new("list")
                        .about("Projected view of a month, or every stored row with --all")
                        .arg(month_arg())
                        .arg(
                            Arg::new("all")
                                .long("all")
                                .action(ArgAction::SetTrue)
                                .conflicts_with("month"),
                        )
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        ),
                ))
                .subcommand(json_flags(
                    Command::new("group")
                        .about("Rows of one installment or recurrence group")
                        .arg(Arg::new("group_id").required(true)),
                ))
                .subcommand(
                    Command::new("toggle")
                        .about("Flip paid state; virtual occurrences become paid rows")
                        .arg(
                            Arg::new("id")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(month_arg()),
                )
                .subcommand(
                    Command::new("rm")
                        .about("Delete a transaction")
                        .arg(
                            Arg::new("id")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(
                            Arg::new("group")
                                .long("group")
                                .action(ArgAction::SetTrue)
                                .help("Delete every row of the transaction's group"),
                        ),
                ),
        )
        .subcommand(
            Command::new("tag")
                .about("Tags")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").required(true))
                        .arg(
                            Arg::new("color")
                                .long("color")
                                .default_value("#6366f1")
                                .help("Hex color #rrggbb"),
                        ),
                )
                .subcommand(json_flags(Command::new("list")))
                .subcommand(
                    Command::new("rm").arg(
                        Arg::new("id")
                            .required(true)
                            .value_parser(value_parser!(i64)),
                    ),
                ),
        )
        .subcommand(
            Command::new("wish")
                .about("Wishlist")
                .subcommand(wish_fields(
                    Command::new("add")
                        .arg(Arg::new("name").required(true))
                        .arg(Arg::new("price").long("price").required(true)),
                ))
                .subcommand(wish_fields(
                    Command::new("edit")
                        .arg(
                            Arg::new("id")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(Arg::new("name").long("name"))
                        .arg(Arg::new("price").long("price"))
                        .arg(
                            Arg::new("clear-tags")
                                .long("clear-tags")
                                .action(ArgAction::SetTrue)
                                .conflicts_with("tag"),
                        ),
                ))
                .subcommand(json_flags(Command::new("list")))
                .subcommand(
                    Command::new("rm").arg(
                        Arg::new("id")
                            .required(true)
                            .value_parser(value_parser!(i64)),
                    ),
                )
                .subcommand(
                    Command::new("option-add")
                        .about("Add a financing option to an item")
                        .arg(
                            Arg::new("item_id")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(
                            Arg::new("installments")
                                .long("installments")
                                .short('n')
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(
                            Arg::new("rate")
                                .long("rate")
                                .default_value("0")
                                .help("Interest rate in percent"),
                        ),
                )
                .subcommand(
                    Command::new("option-rm").arg(
                        Arg::new("id")
                            .required(true)
                            .value_parser(value_parser!(i64)),
                    ),
                ),
        )
        .subcommand(json_flags(
            Command::new("dashboard").about("This month at a glance"),
        ))
        .subcommand(json_flags(
            Command::new("report")
                .about("Yearly or monthly spending report")
                .arg(
                    Arg::new("year")
                        .long("year")
                        .value_parser(value_parser!(i32)),
                )
                .arg(
                    Arg::new("month")
                        .long("month")
                        .value_parser(value_parser!(u32).range(1..=12)),
                ),
        ))
        .subcommand(json_flags(
            Command::new("context")
                .about("Monthly digests and the assistant context block")
                .arg(
                    Arg::new("months")
                        .long("months")
                        .value_parser(value_parser!(u32).range(1..)),
                )
                .arg(month_arg().help("First month as YYYY-MM (default: current month)")),
        ))
        .subcommand(
            Command::new("chat")
                .about("Ask the local assistant; without a message, starts a session on stdin")
                .arg(Arg::new("message").num_args(1..))
                .arg(
                    Arg::new("models")
                        .long("models")
                        .action(ArgAction::SetTrue)
                        .conflicts_with("message")
                        .help("List the models installed in Ollama"),
                ),
        )
        .subcommand(
            Command::new("smart")
                .about("Record a purchase from a free-text description")
                .arg(Arg::new("text").required(true).num_args(1..))
                .arg(Arg::new("model").long("model"))
                .arg(
                    Arg::new("dry-run")
                        .long("dry-run")
                        .action(ArgAction::SetTrue)
                        .help("Show the parsed entry without saving it"),
                ),
        )
        .subcommand(
            Command::new("dolar")
                .about("Dollar and USDC quotes in ARS")
                .subcommand(json_flags(Command::new("quotes")))
                .subcommand(json_flags(
                    Command::new("history").arg(
                        Arg::new("days")
                            .long("days")
                            .default_value("30")
                            .value_parser(value_parser!(u32).range(1..)),
                    ),
                ))
                .subcommand(
                    Command::new("convert")
                        .arg(Arg::new("amount").required(true).help("Amount, e.g. 1.234,5"))
                        .arg(
                            Arg::new("direction")
                                .long("direction")
                                .short('d')
                                .default_value("usdc-to-ars")
                                .help("usd-to-ars|usdc-to-ars|ars-to-usd|ars-to-usdc"),
                        ),
                ),
        )
        .subcommand(
            Command::new("export").subcommand(
                Command::new("transactions")
                    .arg(
                        Arg::new("format")
                            .long("format")
                            .required(true)
                            .help("csv|json"),
                    )
                    .arg(Arg::new("out").long("out").required(true)),
            ),
        )
        .subcommand(Command::new("doctor").about("Check data consistency"))
        .subcommand(
            Command::new("config")
                .about("Settings")
                .subcommand(Command::new("get").arg(Arg::new("key")))
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("key").required(true))
                        .arg(Arg::new("value").required(true)),
                ),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_well_formed() {
        build_cli().debug_assert();
    }
}
