//! Tests for datagrid-model types.

use datagrid_model::{Column, ColumnKind, Getter, MetaMap, Value, ValueKind};
use rust_decimal::Decimal;

#[test]
fn column_spec_deserializes_from_json() {
    let column: Column = serde_json::from_str(
        r#"{
            "name": "price",
            "type": "decimal",
            "value": "unit_price",
            "precision": 4,
            "prefix": "$",
            "currency": "USD"
        }"#,
    )
    .expect("deserialize column");

    assert_eq!(column.name, "price");
    assert_eq!(column.kind, Some(ColumnKind::Decimal));
    assert_eq!(column.value, Getter::Path("unit_price".into()));
    assert_eq!(column.precision, Some(4));
    assert_eq!(column.prefix.as_deref(), Some("$"));
    // Unknown keys land in the open metadata map.
    assert_eq!(column.extra.get("currency"), &Value::Text("USD".into()));
}

#[test]
fn getter_strings_are_paths_and_other_values_are_literals() {
    let path: Getter = serde_json::from_str(r#""a.b.c""#).expect("path getter");
    assert_eq!(path, Getter::Path("a.b.c".into()));

    let literal: Getter = serde_json::from_str("42").expect("literal getter");
    assert_eq!(literal, Getter::Literal(Value::Int(42)));

    let null_literal: Getter = serde_json::from_str("null").expect("null getter");
    assert_eq!(null_literal, Getter::Literal(Value::Null));
}

#[test]
fn unset_column_fields_have_workable_defaults() {
    let column: Column = serde_json::from_str(r#"{"name": "blank"}"#).expect("minimal column");
    assert_eq!(column.kind, None);
    assert_eq!(column.value, Getter::Literal(Value::Null));
    assert!(column.total_value.is_none());
    assert!(column.value_args.is_empty());
}

#[test]
fn column_kind_parses_aliases() {
    assert_eq!("string".parse::<ColumnKind>().unwrap(), ColumnKind::Text);
    assert_eq!("text".parse::<ColumnKind>().unwrap(), ColumnKind::Text);
    assert_eq!("integer".parse::<ColumnKind>().unwrap(), ColumnKind::Int);
    assert_eq!(
        "long-integer".parse::<ColumnKind>().unwrap(),
        ColumnKind::Long
    );
    assert_eq!("Boolean".parse::<ColumnKind>().unwrap(), ColumnKind::Bool);
    assert_eq!("DATETIME".parse::<ColumnKind>().unwrap(), ColumnKind::DateTime);
    assert!("grid".parse::<ColumnKind>().is_err());
}

#[test]
fn column_kind_round_trips_through_display() {
    for kind in [
        ColumnKind::Text,
        ColumnKind::Int,
        ColumnKind::Long,
        ColumnKind::Decimal,
        ColumnKind::Bool,
        ColumnKind::Date,
        ColumnKind::DateTime,
        ColumnKind::Null,
    ] {
        assert_eq!(kind.to_string().parse::<ColumnKind>().unwrap(), kind);
    }
}

#[test]
fn value_trees_deserialize_with_nested_metamaps() {
    let value: Value = serde_json::from_str(
        r#"{"order": {"count": 3, "price": 9.5}, "tags": ["a", "b"], "big": 5000000000}"#,
    )
    .expect("deserialize tree");

    let map = value.as_map().expect("top-level map");
    let order = map.get("order").as_map().expect("nested map");
    assert_eq!(order.get("count"), &Value::Int(3));
    assert_eq!(order.get("price"), &Value::Float(9.5));
    assert_eq!(map.get("big"), &Value::Long(5_000_000_000));
    assert_eq!(
        map.get("tags"),
        &Value::List(vec![Value::Text("a".into()), Value::Text("b".into())])
    );
}

#[test]
fn value_serializes_back_to_json() {
    let value = Value::Map(MetaMap::from_iter([
        ("n", Value::Int(1)),
        ("d", Value::Decimal(Decimal::new(995, 2))),
        ("t", Value::Text("x".into())),
        ("none", Value::Null),
    ]));
    let json = serde_json::to_string(&value).expect("serialize");
    assert_eq!(json, r#"{"n":1,"d":"9.95","t":"x","none":null}"#);
}

#[test]
fn lazy_values_do_not_serialize() {
    let value = Value::lazy(|| Value::Int(1));
    assert!(serde_json::to_string(&value).is_err());
}

#[test]
fn cell_kind_names_match_declared_kinds() {
    assert_eq!(ValueKind::Text.as_str(), "string");
    assert_eq!(ValueKind::DateTime.as_str(), "datetime");
    assert_eq!(ValueKind::Decimal.as_str(), "decimal");
    assert_eq!(ValueKind::Null.as_str(), "null");
}

#[test]
fn total_getter_falls_back_to_value() {
    let plain = Column::new("qty").with_value("count");
    assert_eq!(plain.total_getter(), &Getter::Path("count".into()));

    let with_total = Column::new("qty")
        .with_value("count")
        .with_total_value("summary.count");
    assert_eq!(with_total.total_getter(), &Getter::Path("summary.count".into()));
}
