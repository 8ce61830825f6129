// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use cuoti::calendar::YearMonth;
use cuoti::context::{active_subscriptions, assistant_context, summarize, summarize_from_today};
use cuoti::models::{NewTransaction, Status, TransactionType};
use cuoti::{db, store, tags, writer};
use rusqlite::Connection;
use rust_decimal::Decimal;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// Netflix 1000/month from Jan 10, a TV in 6 cuotas of 200 from Jan 15 and
/// a paid 350 kiosk purchase on Jan 20.
fn seeded() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    let netflix = NewTransaction::simple(
        TransactionType::Subscription,
        "Netflix",
        d(2024, 1, 10),
        Decimal::from(1000),
    )
    .normalized();
    writer::create(&mut conn, &netflix).unwrap();

    let mut tv = NewTransaction::simple(
        TransactionType::Purchase,
        "TV",
        d(2024, 1, 15),
        Decimal::from(1200),
    );
    tv.installments = 6;
    writer::create(&mut conn, &tv).unwrap();

    let kiosco = NewTransaction::simple(
        TransactionType::Purchase,
        "Kiosco",
        d(2024, 1, 20),
        Decimal::from(350),
    );
    let id = writer::create(&mut conn, &kiosco).unwrap()[0];
    writer::set_status(&conn, id, Status::Completed).unwrap();
    conn
}

#[test]
fn digests_cover_consecutive_months() {
    let conn = seeded();
    let all = store::load_transactions(&conn).unwrap();
    let digests = summarize(&all, YearMonth::new(2024, 1).unwrap(), 3);
    assert_eq!(digests.len(), 3);

    let jan = &digests[0];
    assert_eq!(jan.label, "enero de 2024");
    assert_eq!(jan.total, Decimal::from(1550));
    assert_eq!(jan.pending, Decimal::from(1200));
    assert_eq!(jan.top_expenses, "Netflix: $1000, Kiosco: $350, TV (1/6): $200");

    let feb = &digests[1];
    assert_eq!(feb.month, YearMonth::new(2024, 2).unwrap());
    assert_eq!(feb.total, Decimal::from(1200));
    assert_eq!(feb.pending, Decimal::from(1200));
    assert_eq!(feb.top_expenses, "Netflix: $1000, TV (2/6): $200");

    assert_eq!(digests[2].label, "marzo de 2024");
}

#[test]
fn digests_from_today_start_at_the_current_month() {
    let conn = seeded();
    let all = store::load_transactions(&conn).unwrap();
    let digests = summarize_from_today(&all, d(2024, 2, 20), 2);
    assert_eq!(digests.len(), 2);
    assert_eq!(digests[0].label, "febrero de 2024");
    assert_eq!(digests[0].total, Decimal::from(1200));
    assert_eq!(digests[1].month, YearMonth::new(2024, 3).unwrap());
}

#[test]
fn empty_month_has_empty_top_list() {
    let conn = seeded();
    let all = store::load_transactions(&conn).unwrap();
    let digests = summarize(&all, YearMonth::new(2023, 11).unwrap(), 1);
    assert_eq!(digests[0].total, Decimal::ZERO);
    assert_eq!(digests[0].top_expenses, "");
}

#[test]
fn tagged_rows_count_as_subscriptions() {
    let mut conn = seeded();
    let tag = tags::add_tag(&conn, "Suscripciones", "#a855f7").unwrap();
    let mut disney = NewTransaction::simple(
        TransactionType::Purchase,
        "Disney+",
        d(2024, 1, 2),
        Decimal::from(800),
    );
    disney.tag_ids = vec![tag.id];
    writer::create(&mut conn, &disney).unwrap();

    let all = store::load_transactions(&conn).unwrap();
    let tags = store::load_tags(&conn).unwrap();
    let subs = active_subscriptions(&all, &tags);
    let names: Vec<&str> = subs.iter().map(|t| t.shop_name.as_str()).collect();
    assert_eq!(names, vec!["Netflix", "Disney+"]);
}

#[test]
fn context_block_formats_pesos() {
    let conn = seeded();
    let all = store::load_transactions(&conn).unwrap();
    let tags = store::load_tags(&conn).unwrap();
    let digests = summarize(&all, YearMonth::new(2024, 1).unwrap(), 2);
    let text = assistant_context(&all, &tags, &digests);

    assert!(text.contains("- Netflix: $1.000,00 por mes"), "{}", text);
    assert!(text.contains("Total mensual en suscripciones: $1.000,00"));
    assert!(text.contains("- enero de 2024: total $1.550,00 (pendiente $1.200,00)"));
    assert!(text.contains("- febrero de 2024: total $1.200,00"));
    assert!(text.contains("Pendiente de pago (registros reales): $2.200,00"));
    assert!(text.contains("Deuda acumulada: $0,00"));
}
