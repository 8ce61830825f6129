// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use tracing::error;
use tracing_subscriber::EnvFilter;

use cuoti::{cli, commands, db};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run() -> Result<()> {
    let matches = cli::build_cli().get_matches();

    let mut conn = db::open_or_init()?;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", db::db_path()?.display());
        }
        Some(("tx", sub)) => commands::transactions::handle(&mut conn, sub)?,
        Some(("tag", sub)) => commands::tags::handle(&conn, sub)?,
        Some(("wish", sub)) => commands::wishlist::handle(&mut conn, sub)?,
        Some(("dashboard", sub)) => commands::reports::dashboard(&conn, sub)?,
        Some(("report", sub)) => commands::reports::handle(&conn, sub)?,
        Some(("context", sub)) => commands::assistant::context(&conn, sub)?,
        Some(("chat", sub)) => commands::assistant::chat(&conn, sub)?,
        Some(("smart", sub)) => commands::assistant::smart(&mut conn, sub)?,
        Some(("dolar", sub)) => commands::dolar::handle(sub)?,
        Some(("export", sub)) => commands::exporter::handle(&conn, sub)?,
        Some(("doctor", _)) => commands::doctor::handle(&conn)?,
        Some(("config", sub)) => commands::settings::handle(&conn, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}

fn main() {
    init_logging();
    if let Err(err) = run() {
        error!(error = %err, "command failed");
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
