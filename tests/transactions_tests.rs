// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use cuoti::calendar::YearMonth;
use cuoti::commands::transactions;
use cuoti::{cli, db, store, tags};
use rusqlite::Connection;
use rust_decimal::Decimal;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

fn run_tx(conn: &mut Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["cuoti", "tx"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    match matches.subcommand() {
        Some(("tx", tx_m)) => transactions::handle(conn, tx_m),
        _ => panic!("no tx subcommand"),
    }
}

#[test]
fn add_splits_installments_with_tags_and_items() {
    let mut conn = setup();
    tags::add_tag(&conn, "Tecno", "#0ea5e9").unwrap();
    run_tx(
        &mut conn,
        &[
            "add", "--shop", "Fravega", "--amount", "90000", "--date", "2024-03-31",
            "--installments", "3", "--tag", "tecno", "--item", "Licuadora:90000",
        ],
    )
    .unwrap();

    let mut rows = store::load_transactions(&conn).unwrap();
    rows.sort_by_key(|t| t.date);
    let names: Vec<&str> = rows.iter().map(|t| t.shop_name.as_str()).collect();
    assert_eq!(names, vec!["Fravega (1/3)", "Fravega (2/3)", "Fravega (3/3)"]);
    assert_eq!(rows[1].date.to_string(), "2024-04-30");
    assert!(rows.iter().all(|t| t.total_amount == Decimal::from(30000)));
    assert!(rows.iter().all(|t| t.tag_ids.len() == 1));
    assert_eq!(rows[0].items[0].name, "Licuadora");
    let group = rows[0].group_id.clone().unwrap();
    assert!(rows.iter().all(|t| t.group_id.as_deref() == Some(group.as_str())));
}

#[test]
fn add_rejects_unknown_tag_without_writing() {
    let mut conn = setup();
    let err = run_tx(
        &mut conn,
        &["add", "--shop", "Coto", "--amount", "100", "--tag", "fantasma"],
    )
    .unwrap_err();
    assert!(err.to_string().contains("not found"));
    assert!(store::load_transactions(&conn).unwrap().is_empty());
}

#[test]
fn edit_changes_only_the_target_row() {
    let mut conn = setup();
    run_tx(
        &mut conn,
        &["add", "--shop", "Gym", "--amount", "600", "--date", "2024-01-05", "-n", "2"],
    )
    .unwrap();
    let first = store::load_transactions(&conn)
        .unwrap()
        .into_iter()
        .find(|t| t.shop_name == "Gym (1/2)")
        .unwrap();
    run_tx(&mut conn, &["edit", &first.id.to_string(), "--amount", "350"]).unwrap();

    let edited = store::load_transaction(&conn, first.id).unwrap().unwrap();
    assert_eq!(edited.total_amount, Decimal::from(350));
    assert_eq!(edited.items[0].price, Decimal::from(350));
    let others: Vec<Decimal> = store::load_transactions(&conn)
        .unwrap()
        .into_iter()
        .filter(|t| t.id != first.id)
        .map(|t| t.total_amount)
        .collect();
    assert_eq!(others, vec![Decimal::from(300)]);
}

#[test]
fn month_listing_marks_projected_rows() {
    let mut conn = setup();
    run_tx(
        &mut conn,
        &[
            "add", "--shop", "Spotify", "--amount", "2500", "--date", "2024-01-12",
            "--type", "subscription",
        ],
    )
    .unwrap();
    let source = store::load_transactions(&conn).unwrap()[0].id;
    let all = store::load_transactions(&conn).unwrap();

    let march = YearMonth::new(2024, 3).unwrap();
    let rows = transactions::month_rows(&all, march);
    assert_eq!(rows.len(), 1);
    assert!(rows[0].is_virtual);
    assert_eq!(rows[0].key, format!("v{}-2024-03", source));
    assert_eq!(rows[0].date, "2024-03-12");
    assert_eq!(rows[0].source_id, Some(source));

    run_tx(&mut conn, &["toggle", &source.to_string(), "--month", "2024-03"]).unwrap();
    let all = store::load_transactions(&conn).unwrap();
    assert_eq!(all.len(), 2);
    let rows = transactions::month_rows(&all, march);
    assert_eq!(rows.len(), 1);
    assert!(!rows[0].is_virtual);
    assert_eq!(rows[0].status, "completed");
}

#[test]
fn remove_with_group_deletes_every_installment() {
    let mut conn = setup();
    run_tx(
        &mut conn,
        &["add", "--shop", "Heladera", "--amount", "1000", "-n", "4"],
    )
    .unwrap();
    run_tx(&mut conn, &["add", "--shop", "Pan", "--amount", "10"]).unwrap();
    let id = store::load_transactions(&conn)
        .unwrap()
        .into_iter()
        .find(|t| t.shop_name.starts_with("Heladera"))
        .unwrap()
        .id;
    run_tx(&mut conn, &["rm", &id.to_string(), "--group"]).unwrap();
    let left = store::load_transactions(&conn).unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].shop_name, "Pan");
    assert!(run_tx(&mut conn, &["group", "no-such-group"]).is_err());
}

#[test]
fn add_rejects_absurd_installment_counts() {
    let mut conn = setup();
    let err = run_tx(
        &mut conn,
        &["add", "--shop", "Autoplan", "--amount", "1000", "-n", "4000000000"],
    )
    .unwrap_err();
    assert!(err.to_string().contains("between 1 and 120"), "{}", err);
    assert!(store::load_transactions(&conn).unwrap().is_empty());
}
