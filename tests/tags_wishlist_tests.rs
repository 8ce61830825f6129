// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use cuoti::error::{CuotiError, ValidationError};
use cuoti::models::{NewTransaction, TransactionType};
use cuoti::wishlist::{self, NewWish, WishPatch};
use cuoti::{db, store, tags, writer};
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::str::FromStr;

fn conn() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

#[test]
fn tag_validation() {
    let conn = conn();
    let err = tags::add_tag(&conn, "  ", "#ffffff").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ValidationError>(),
        Some(ValidationError::MissingTagName)
    ));
    assert!(tags::add_tag(&conn, "Ropa", "red").is_err());
    assert!(tags::add_tag(&conn, "Ropa", "#12345").is_err());
    let tag = tags::add_tag(&conn, " Ropa ", "#ABCDEF").unwrap();
    assert_eq!(tag.name, "Ropa");
    assert_eq!(tag.color, "#abcdef");
}

#[test]
fn resolve_accepts_names_and_ids() {
    let conn = conn();
    let a = tags::add_tag(&conn, "Comida", "#111111").unwrap();
    let b = tags::add_tag(&conn, "Viajes", "#222222").unwrap();
    let ids = tags::resolve(
        &conn,
        &["comida".to_string(), b.id.to_string(), "COMIDA".to_string()],
    )
    .unwrap();
    assert_eq!(ids, vec![a.id, b.id]);

    let err = tags::resolve(&conn, &["inexistente".to_string()]).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CuotiError>(),
        Some(CuotiError::NotFound(..))
    ));
}

#[test]
fn deleting_a_tag_removes_its_links() {
    let mut conn = conn();
    let tag = tags::add_tag(&conn, "Regalos", "#f43f5e").unwrap();
    let mut intent = NewTransaction::simple(
        TransactionType::Purchase,
        "Perfume",
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        Decimal::from(30000),
    );
    intent.tag_ids = vec![tag.id];
    let tx_id = writer::create(&mut conn, &intent).unwrap()[0];
    let wish_id = wishlist::add_item(
        &mut conn,
        &NewWish {
            name: "Reloj".into(),
            price: Decimal::from(90000),
            tag_ids: vec![tag.id],
            ..Default::default()
        },
    )
    .unwrap();

    tags::delete_tag(&conn, tag.id).unwrap();
    assert!(store::load_transaction(&conn, tx_id).unwrap().unwrap().tag_ids.is_empty());
    let wishes = wishlist::load_wishlist(&conn).unwrap();
    assert_eq!(wishes[0].id, wish_id);
    assert!(wishes[0].tag_ids.is_empty());
    assert!(store::load_tags(&conn).unwrap().is_empty());
    assert!(tags::delete_tag(&conn, tag.id).is_err());
}

#[test]
fn wishlist_options_compute_financed_totals() {
    let mut conn = conn();
    let id = wishlist::add_item(
        &mut conn,
        &NewWish {
            name: "Bici".into(),
            price: Decimal::from(100000),
            priority: 2,
            ..Default::default()
        },
    )
    .unwrap();

    let free = wishlist::add_option(&conn, id, 3, Decimal::ZERO).unwrap();
    assert_eq!(free.total_amount, Decimal::from(100000));
    assert_eq!(free.description.as_deref(), Some("Sin interés"));

    let financed = wishlist::add_option(&conn, id, 12, dec("35.5")).unwrap();
    assert_eq!(financed.total_amount, Decimal::from(135500));
    assert_eq!(financed.description.as_deref(), Some("Con interés"));

    assert!(wishlist::add_option(&conn, id, 0, Decimal::ZERO).is_err());
    assert!(wishlist::add_option(&conn, id + 100, 3, Decimal::ZERO).is_err());

    let items = wishlist::load_wishlist(&conn).unwrap();
    let item = &items[0];
    assert_eq!(item.priority, 2);
    assert_eq!(item.options.len(), 2);
    assert_eq!(item.options[0].installments, 3);

    let cmp = wishlist::compare(item, &item.options[1]);
    assert_eq!(cmp.surcharge, Decimal::from(35500));
    assert_eq!(cmp.surcharge_pct, dec("35.5"));
    assert_eq!(cmp.monthly.round_dp(2), dec("11291.67"));

    wishlist::delete_option(&conn, free.id).unwrap();
    assert_eq!(wishlist::load_wishlist(&conn).unwrap()[0].options.len(), 1);
    assert!(wishlist::delete_option(&conn, free.id).is_err());
}

#[test]
fn wishlist_patch_keeps_unset_fields() {
    let mut conn = conn();
    let tag = tags::add_tag(&conn, "Tecno", "#0ea5e9").unwrap();
    let id = wishlist::add_item(
        &mut conn,
        &NewWish {
            name: "Auriculares".into(),
            price: Decimal::from(50000),
            link: Some("https://tienda.example/auris".into()),
            notes: Some("esperar Hot Sale".into()),
            tag_ids: vec![tag.id],
            ..Default::default()
        },
    )
    .unwrap();

    wishlist::update_item(
        &mut conn,
        id,
        &WishPatch {
            price: Some(Decimal::from(45000)),
            ..Default::default()
        },
    )
    .unwrap();
    let item = wishlist::load_wishlist(&conn).unwrap().remove(0);
    assert_eq!(item.name, "Auriculares");
    assert_eq!(item.price, Decimal::from(45000));
    assert_eq!(item.link.as_deref(), Some("https://tienda.example/auris"));
    assert_eq!(item.notes.as_deref(), Some("esperar Hot Sale"));
    assert_eq!(item.tag_ids, vec![tag.id]);

    wishlist::update_item(
        &mut conn,
        id,
        &WishPatch {
            tag_ids: Some(vec![]),
            ..Default::default()
        },
    )
    .unwrap();
    assert!(wishlist::load_wishlist(&conn).unwrap()[0].tag_ids.is_empty());

    assert!(wishlist::update_item(&mut conn, id + 1, &WishPatch::default()).is_err());
}

#[test]
fn deleting_wishlist_item_cascades() {
    let mut conn = conn();
    let id = wishlist::add_item(
        &mut conn,
        &NewWish {
            name: "Silla".into(),
            price: Decimal::from(70000),
            ..Default::default()
        },
    )
    .unwrap();
    wishlist::add_option(&conn, id, 6, Decimal::from(10)).unwrap();
    wishlist::delete_item(&mut conn, id).unwrap();
    assert!(wishlist::load_wishlist(&conn).unwrap().is_empty());
    let options: i64 = conn
        .query_row("SELECT COUNT(*) FROM wishlist_options", [], |r| r.get(0))
        .unwrap();
    assert_eq!(options, 0);
    assert!(wishlist::add_item(
        &mut conn,
        &NewWish {
            name: "Gratis".into(),
            price: Decimal::from(-1),
            ..Default::default()
        }
    )
    .is_err());
}
