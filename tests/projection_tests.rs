// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use cuoti::calendar::YearMonth;
use cuoti::models::{NewTransaction, Origin, Status, TransactionType};
use cuoti::projection::project;
use cuoti::{db, store, writer};
use rusqlite::Connection;
use rust_decimal::Decimal;

fn conn() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn ym(y: i32, m: u32) -> YearMonth {
    YearMonth::new(y, m).unwrap()
}

fn subscription(shop: &str, date: NaiveDate, amount: i64) -> NewTransaction {
    NewTransaction::simple(
        TransactionType::Subscription,
        shop,
        date,
        Decimal::from(amount),
    )
    .normalized()
}

fn group_of(conn: &Connection, id: i64) -> String {
    store::load_transaction(conn, id)
        .unwrap()
        .unwrap()
        .group_id
        .unwrap()
}

#[test]
fn open_subscription_projects_virtual_instance() {
    let mut conn = conn();
    let ids = writer::create(&mut conn, &subscription("Netflix", d(2024, 1, 10), 1000)).unwrap();
    let all = store::load_transactions(&conn).unwrap();

    let march = project(&all, ym(2024, 3));
    assert_eq!(march.len(), 1);
    let p = &march[0];
    assert_eq!(p.origin, Origin::Virtual { source_id: ids[0] });
    assert!(p.is_virtual());
    assert_eq!(p.transaction.date, d(2024, 3, 10));
    assert_eq!(p.transaction.status, Status::Pending);
    assert_eq!(p.transaction.total_amount, Decimal::from(1000));
}

#[test]
fn real_row_in_month_suppresses_virtual() {
    let mut conn = conn();
    let ids = writer::create(&mut conn, &subscription("Netflix", d(2024, 1, 10), 1000)).unwrap();
    let group = group_of(&conn, ids[0]);

    let mut renegotiated = subscription("Netflix", d(2024, 3, 25), 1100);
    renegotiated.group_id = Some(group.clone());
    renegotiated.is_recurring = false;
    let real_id = writer::create(&mut conn, &renegotiated).unwrap()[0];

    let all = store::load_transactions(&conn).unwrap();
    let march = project(&all, ym(2024, 3));
    assert_eq!(march.len(), 1);
    assert_eq!(march[0].origin, Origin::Real);
    assert_eq!(march[0].transaction.id, real_id);
    assert_eq!(march[0].transaction.total_amount, Decimal::from(1100));
    assert_eq!(march[0].transaction.group_id.as_deref(), Some(group.as_str()));
}

#[test]
fn newest_recurring_row_sets_the_future_price() {
    let mut conn = conn();
    let ids = writer::create(&mut conn, &subscription("Netflix", d(2024, 1, 10), 1000)).unwrap();
    let mut renegotiated = subscription("Netflix", d(2024, 3, 25), 1100);
    renegotiated.group_id = Some(group_of(&conn, ids[0]));
    let newer = writer::create(&mut conn, &renegotiated).unwrap()[0];

    let all = store::load_transactions(&conn).unwrap();
    let april = project(&all, ym(2024, 4));
    assert_eq!(april.len(), 1);
    assert_eq!(april[0].origin, Origin::Virtual { source_id: newer });
    assert_eq!(april[0].transaction.date, d(2024, 4, 25));
    assert_eq!(april[0].transaction.total_amount, Decimal::from(1100));
}

#[test]
fn end_date_stops_projection() {
    let mut conn = conn();
    let mut intent = subscription("Spotify", d(2024, 1, 10), 1000);
    intent.recurrence_end_date = Some(d(2024, 2, 28));
    writer::create(&mut conn, &intent).unwrap();
    let all = store::load_transactions(&conn).unwrap();

    assert_eq!(project(&all, ym(2024, 2)).len(), 1);
    assert!(project(&all, ym(2024, 3)).is_empty());
    assert!(project(&all, ym(2024, 4)).is_empty());
}

#[test]
fn end_date_inside_month_still_projects_that_month() {
    let mut conn = conn();
    let mut intent = subscription("Spotify", d(2024, 1, 20), 1000);
    intent.recurrence_end_date = Some(d(2024, 3, 1));
    writer::create(&mut conn, &intent).unwrap();
    let all = store::load_transactions(&conn).unwrap();

    let march = project(&all, ym(2024, 3));
    assert_eq!(march.len(), 1);
    assert_eq!(march[0].transaction.date, d(2024, 3, 20));
}

#[test]
fn open_recurrence_yields_one_instance_per_month_from_start() {
    let mut conn = conn();
    writer::create(&mut conn, &subscription("Gym", d(2024, 3, 31), 500)).unwrap();
    let all = store::load_transactions(&conn).unwrap();

    let mut month = ym(2023, 10);
    for _ in 0..24 {
        let out = project(&all, month);
        if month < ym(2024, 3) {
            assert!(out.is_empty(), "nothing before the start, got {:?} in {}", out, month);
        } else {
            assert_eq!(out.len(), 1, "exactly one instance in {}", month);
            assert_eq!(out[0].transaction.date, month.shift(d(2024, 3, 31)));
        }
        month = month.add_months(1);
    }
}

#[test]
fn plain_rows_appear_only_in_their_month() {
    let mut conn = conn();
    let mut intent = NewTransaction::simple(
        TransactionType::Purchase,
        "Kiosco",
        d(2024, 5, 31),
        Decimal::from(350),
    );
    intent.payment_date = Some(d(2024, 6, 2));
    let id = writer::create(&mut conn, &intent).unwrap()[0];
    let all = store::load_transactions(&conn).unwrap();

    assert!(project(&all, ym(2024, 5)).is_empty());
    let june = project(&all, ym(2024, 6));
    assert_eq!(june.len(), 1);
    assert_eq!(june[0].origin, Origin::Real);
    assert_eq!(june[0].transaction.id, id);
    assert!(project(&all, ym(2024, 7)).is_empty());
}

#[test]
fn installment_rows_are_real_and_never_duplicated() {
    let mut conn = conn();
    let mut intent = NewTransaction::simple(
        TransactionType::Purchase,
        "TV",
        d(2024, 1, 15),
        Decimal::from(1200),
    );
    intent.installments = 6;
    writer::create(&mut conn, &intent).unwrap();
    let all = store::load_transactions(&conn).unwrap();

    for m in 1..=6 {
        let out = project(&all, ym(2024, m));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].origin, Origin::Real);
        assert_eq!(out[0].transaction.shop_name, format!("TV ({}/6)", m));
    }
    assert!(project(&all, ym(2024, 7)).is_empty());
}

#[test]
fn projection_is_idempotent() {
    let mut conn = conn();
    writer::create(&mut conn, &subscription("Netflix", d(2024, 1, 10), 1000)).unwrap();
    let mut cuotas = NewTransaction::simple(
        TransactionType::Purchase,
        "Heladera",
        d(2024, 2, 1),
        Decimal::from(900),
    );
    cuotas.installments = 3;
    writer::create(&mut conn, &cuotas).unwrap();
    let all = store::load_transactions(&conn).unwrap();

    let first = project(&all, ym(2024, 3));
    let second = project(&all, ym(2024, 3));
    assert_eq!(first.len(), 2);
    assert_eq!(first, second);
}

#[test]
fn recurring_row_without_group_is_not_projected() {
    let conn = conn();
    conn.execute(
        "INSERT INTO transactions(date, shop_name, total_amount, type, is_recurring, status)
         VALUES ('2024-01-05', 'Huérfano', '100', 'service', 1, 'pending')",
        [],
    )
    .unwrap();
    let all = store::load_transactions(&conn).unwrap();
    assert_eq!(project(&all, ym(2024, 1)).len(), 1);
    assert!(project(&all, ym(2024, 2)).is_empty());
}

#[test]
fn generator_with_due_date_projects_on_the_due_day() {
    let mut conn = conn();
    let mut intent = subscription("Internet", d(2024, 1, 31), 9000);
    intent.payment_date = Some(d(2024, 2, 10));
    let id = writer::create(&mut conn, &intent).unwrap()[0];
    let all = store::load_transactions(&conn).unwrap();

    assert!(project(&all, ym(2024, 1)).is_empty());
    let april = project(&all, ym(2024, 4));
    assert_eq!(april.len(), 1);
    assert_eq!(april[0].origin, Origin::Virtual { source_id: id });
    assert_eq!(april[0].transaction.date, d(2024, 4, 10));
    assert_eq!(april[0].transaction.payment_date, Some(d(2024, 4, 10)));

    let feb = project(&all, ym(2024, 2));
    assert_eq!(feb[0].origin, Origin::Real);
    assert_eq!(feb[0].transaction.date, d(2024, 1, 31));
}
