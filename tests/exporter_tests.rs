// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use cuoti::models::{NewTransaction, TransactionType};
use cuoti::{cli, commands::exporter, db, tags, writer};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde_json::json;
use tempfile::tempdir;

fn seeded() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    let tag = tags::add_tag(&conn, "Hogar", "#22c55e").unwrap();
    let mut intent = NewTransaction::simple(
        TransactionType::Purchase,
        "Easy",
        NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
        Decimal::new(1234, 2),
    );
    intent.tag_ids = vec![tag.id];
    intent.group_id = Some("g-easy".into());
    writer::create(&mut conn, &intent).unwrap();
    conn
}

fn run_export(conn: &Connection, format: &str, out: &str) -> anyhow::Result<()> {
    let matches = cli::build_cli().get_matches_from([
        "cuoti",
        "export",
        "transactions",
        "--format",
        format,
        "--out",
        out,
    ]);
    match matches.subcommand() {
        Some(("export", export_m)) => exporter::handle(conn, export_m),
        _ => panic!("no export subcommand"),
    }
}

#[test]
fn export_transactions_writes_pretty_json() {
    let conn = seeded();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.json");
    run_export(&conn, "json", &out_path.to_string_lossy()).unwrap();

    let contents = std::fs::read_to_string(&out_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(
        parsed,
        json!([
            {
                "id": 1,
                "date": "2025-01-02",
                "payment_date": null,
                "shop_name": "Easy",
                "total_amount": "12.34",
                "currency": "ARS",
                "type": "purchase",
                "status": "pending",
                "is_debt": false,
                "debt_to": null,
                "is_recurring": false,
                "group_id": "g-easy",
                "recurrence_end_date": null,
                "tags": ["Hogar"],
                "items": [{"name": "Easy", "price": "12.34", "quantity": 1}]
            }
        ])
    );
}

#[test]
fn export_transactions_writes_csv() {
    let conn = seeded();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.csv");
    run_export(&conn, "CSV", &out_path.to_string_lossy()).unwrap();

    let mut rdr = csv::Reader::from_path(&out_path).unwrap();
    let headers = rdr.headers().unwrap().clone();
    assert_eq!(&headers[0], "id");
    assert_eq!(&headers[13], "tags");
    let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 1);
    assert_eq!(&rows[0][3], "Easy");
    assert_eq!(&rows[0][4], "12.34");
    assert_eq!(&rows[0][11], "g-easy");
    assert_eq!(&rows[0][13], "Hogar");
}

#[test]
fn export_transactions_rejects_unknown_format() {
    let conn = seeded();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.unknown");
    assert!(run_export(&conn, "xml", &out_path.to_string_lossy()).is_err());
    assert!(!out_path.exists());
}
