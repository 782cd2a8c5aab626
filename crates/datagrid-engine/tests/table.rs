//! End-to-end tests for table construction.

use chrono::NaiveDate;
use datagrid_engine::{
    Column, ColumnKind, EngineError, Getter, MetaMap, Record, Table, TableOptions, Value,
    ValueKind,
};
use rust_decimal::Decimal;
use serde_json::json;

/// Build a record value-tree from JSON.
fn record(json: serde_json::Value) -> Value {
    serde_json::from_value(json).expect("record value")
}

fn qty_price_columns() -> Vec<Column> {
    vec![
        Column::new("qty").with_kind(ColumnKind::Int).with_value("count"),
        Column::new("price")
            .with_kind(ColumnKind::Decimal)
            .with_value("unit_price")
            .with_precision(2),
    ]
}

#[test]
fn end_to_end_quantities_and_prices() {
    let records = vec![
        record(json!({"count": 3, "unit_price": "9.995"})),
        record(json!({"count": 0, "unit_price": null})),
    ];
    let table = Table::new(records, qty_price_columns()).expect("build table");

    let row0 = &table.rows()[0];
    assert_eq!(row0.cells()[0].value(), &Value::Int(3));
    assert_eq!(
        row0.cells()[1].value(),
        &Value::Decimal("9.995".parse().unwrap())
    );

    // Falsy sources take the kind defaults: zero count stays zero, the
    // missing price becomes decimal zero.
    let row1 = &table.rows()[1];
    assert_eq!(row1.cells()[0].value(), &Value::Int(0));
    assert_eq!(row1.cells()[1].value(), &Value::Decimal(Decimal::ZERO));
}

#[test]
fn every_row_has_one_cell_per_column_sharing_the_table_columns() {
    let table = Table::builder(qty_price_columns())
        .records(vec![
            record(json!({"count": 1, "unit_price": "1.00"})),
            record(json!({"count": 2, "unit_price": "2.00"})),
        ])
        .total_record(record(json!({"count": 3, "unit_price": "3.00"})))
        .build()
        .expect("build table");

    for row in table.all_rows() {
        assert_eq!(row.cells().len(), table.column_count());
        for (position, cell) in row.cells().iter().enumerate() {
            assert_eq!(cell.position(), position);
            let column = table.column(position).expect("column at position");
            assert!(std::ptr::eq(cell.column(), column));
        }
    }
}

#[test]
fn dotted_paths_traverse_nested_maps() {
    let columns = vec![Column::new("leaf").with_value("a.b")];
    let table = Table::new(vec![record(json!({"a": {"b": 5}}))], columns).unwrap();
    assert_eq!(table.rows()[0].cells()[0].value(), &Value::Int(5));
}

#[test]
fn dotted_paths_fall_back_to_field_lookup() {
    #[derive(Debug)]
    struct Order {
        details: Value,
    }

    impl Record for Order {
        fn by_key(&self, _segment: &str) -> Option<Value> {
            None
        }

        fn by_field(&self, segment: &str) -> Option<Value> {
            (segment == "details").then(|| self.details.clone())
        }
    }

    let columns = vec![Column::new("leaf").with_value("details.b")];
    let table = Table::builder(columns)
        .record(Order {
            details: record(json!({"b": 5})),
        })
        .build()
        .unwrap();
    assert_eq!(table.rows()[0].cells()[0].value(), &Value::Int(5));
}

#[test]
fn lazy_accessors_are_traversed_transparently() {
    let rec = Value::Map(MetaMap::from_iter([(
        "a",
        Value::lazy(|| record(json!({"b": 7}))),
    )]));
    let columns = vec![Column::new("leaf").with_kind(ColumnKind::Int).with_value("a.b")];
    let table = Table::new(vec![rec], columns).unwrap();
    assert_eq!(table.rows()[0].cells()[0].value(), &Value::Int(7));
}

#[test]
fn unresolvable_paths_degrade_to_the_literal_path_text() {
    // The declared kind does not matter: the fallback is a static value and
    // static values are never coerced.
    let columns = vec![Column::new("leaf").with_kind(ColumnKind::Int).with_value("missing.path")];
    let table = Table::new(vec![record(json!({"a": 1}))], columns).unwrap();
    assert_eq!(
        table.rows()[0].cells()[0].value(),
        &Value::Text("missing.path".into())
    );
}

#[test]
fn strict_mode_turns_path_misses_into_errors() {
    let columns = vec![Column::new("leaf").with_value("missing.path")];
    let result = Table::builder(columns)
        .record(record(json!({"a": 1})))
        .options(TableOptions::new().with_strict_paths(true))
        .build();
    match result {
        Err(EngineError::PathResolution { column, path }) => {
            assert_eq!(column, "leaf");
            assert_eq!(path, "missing.path");
        }
        other => panic!("expected a path resolution error, got {other:?}"),
    }
}

#[test]
fn column_and_table_defaults_substitute_for_falsy_values() {
    let columns = vec![
        Column::new("plain").with_kind(ColumnKind::Int).with_value("missing_field"),
        Column::new("with_default")
            .with_kind(ColumnKind::Int)
            .with_value("missing_field")
            .with_default_value(42),
    ];
    // "missing_field" resolves through the single-segment path against a
    // record that has the key with a null value.
    let table = Table::builder(columns)
        .records(vec![record(json!({"missing_field": null}))])
        .build()
        .unwrap();
    assert_eq!(table.rows()[0].cells()[0].value(), &Value::Int(0));
    assert_eq!(table.rows()[0].cells()[1].value(), &Value::Int(42));

    let meta = MetaMap::from_iter([("default_value", Value::Text("n/a".into()))]);
    let table = Table::builder(vec![
        Column::new("metered").with_kind(ColumnKind::Int).with_value("missing_field"),
    ])
    .records(vec![record(json!({"missing_field": null}))])
    .table_meta(meta)
    .build()
    .unwrap();
    assert_eq!(
        table.rows()[0].cells()[0].value(),
        &Value::Text("n/a".into())
    );
}

#[test]
fn declared_kinds_round_trip_to_cell_kinds() {
    let cases = vec![
        (ColumnKind::Text, json!("hello"), ValueKind::Text),
        (ColumnKind::Int, json!(3), ValueKind::Int),
        (ColumnKind::Long, json!(5_000_000_000i64), ValueKind::Long),
        (ColumnKind::Decimal, json!("9.995"), ValueKind::Decimal),
        (ColumnKind::Bool, json!(true), ValueKind::Bool),
        (ColumnKind::Date, json!("2024-03-09"), ValueKind::Date),
        (
            ColumnKind::DateTime,
            json!("2024-03-09 13:45:30.000000"),
            ValueKind::DateTime,
        ),
        (ColumnKind::Null, json!("anything"), ValueKind::Null),
    ];

    for (kind, input, expected) in cases {
        let columns = vec![Column::new("field").with_kind(kind).with_value("source")];
        let table = Table::new(vec![record(json!({"source": input}))], columns).unwrap();
        let cell = &table.rows()[0].cells()[0];
        assert_eq!(
            cell.kind().expect("recognized cell kind"),
            expected,
            "declared {kind} should produce a {expected} cell"
        );
        assert_eq!(kind.as_str(), expected.as_str());
    }
}

#[test]
fn total_row_uses_the_total_strategy() {
    let columns = vec![
        Column::new("qty")
            .with_kind(ColumnKind::Int)
            .with_value("count")
            .with_total_value("count_sum"),
        // No total_value: the total row falls back to the ordinary getter.
        Column::new("price")
            .with_kind(ColumnKind::Decimal)
            .with_value("unit_price"),
    ];
    let table = Table::builder(columns)
        .records(vec![record(json!({"count": 1, "unit_price": "1.50"}))])
        .total_record(record(json!({
            "count": 999,
            "count_sum": 10,
            "unit_price": "25.00"
        })))
        .build()
        .unwrap();

    let total = table.total_row().expect("total row");
    assert!(table.total_record().is_some());
    assert_eq!(total.cells()[0].value(), &Value::Int(10));
    assert_eq!(
        total.cells()[1].value(),
        &Value::Decimal("25.00".parse().unwrap())
    );

    // all_rows is data rows followed by the total row.
    let positions: Vec<usize> = table.all_rows().map(|row| row.position()).collect();
    assert_eq!(positions, vec![0, 1]);
}

#[test]
fn omitting_the_total_record_leaves_no_total_row() {
    let table = Table::new(
        vec![record(json!({"count": 1, "unit_price": "1.00"}))],
        qty_price_columns(),
    )
    .unwrap();
    assert!(table.total_row().is_none());
    assert_eq!(table.all_rows().count(), table.rows().len());
}

#[test]
fn callback_getters_receive_the_record_and_value_args() {
    let column = Column::new("scaled")
        .with_kind(ColumnKind::Int)
        .with_func(|rec, args| {
            let base = rec.by_key("count").and_then(|v| v.as_i64()).unwrap_or(0);
            let factor = args.get("factor").as_i64().unwrap_or(1);
            Ok(Value::Long(base * factor))
        })
        .with_value_args(MetaMap::from_iter([("factor", 10)]));

    let table = Table::new(vec![record(json!({"count": 4}))], vec![column]).unwrap();
    assert_eq!(table.rows()[0].cells()[0].value(), &Value::Int(40));
}

#[test]
fn callback_failures_are_hard_errors() {
    let column = Column::new("boom").with_func(|_rec, _args| Err("callback exploded".into()));
    let result = Table::new(vec![record(json!({}))], vec![column]);
    match result {
        Err(EngineError::Callback { column, .. }) => assert_eq!(column, "boom"),
        other => panic!("expected a callback error, got {other:?}"),
    }
}

#[test]
fn custom_coercion_overrides_the_builtin_rules() {
    let column = Column::new("tagged")
        .with_kind(ColumnKind::Int)
        .with_value("count")
        .with_coercion(|value| Ok(Value::Text(format!("#{value}"))));
    let table = Table::new(vec![record(json!({"count": 7}))], vec![column]).unwrap();
    assert_eq!(
        table.rows()[0].cells()[0].value(),
        &Value::Text("#7".into())
    );
}

#[test]
fn literal_strategies_bypass_coercion() {
    let columns = vec![
        Column::new("text").with_kind(ColumnKind::Int).with_value(Getter::literal("static")),
        Column::new("number").with_kind(ColumnKind::Decimal).with_value(Getter::literal(5)),
    ];
    let table = Table::new(vec![record(json!({}))], columns).unwrap();
    assert_eq!(
        table.rows()[0].cells()[0].value(),
        &Value::Text("static".into())
    );
    assert_eq!(table.rows()[0].cells()[1].value(), &Value::Int(5));
}

#[test]
fn columns_without_a_strategy_produce_null_cells() {
    let table = Table::new(vec![record(json!({"a": 1}))], vec![Column::new("empty")]).unwrap();
    assert_eq!(table.rows()[0].cells()[0].value(), &Value::Null);
}

#[test]
fn date_columns_get_a_default_output_format_at_build_time() {
    let columns = vec![
        Column::new("on").with_kind(ColumnKind::Date).with_value("on"),
        Column::new("at").with_kind(ColumnKind::DateTime).with_value("at"),
        Column::new("custom")
            .with_kind(ColumnKind::Date)
            .with_value("on")
            .with_output_format("Y-m-d"),
        Column::new("qty").with_kind(ColumnKind::Int).with_value("qty"),
    ];
    let table = Table::new(
        vec![record(json!({"on": "2024-03-09", "at": "2024-03-09 08:00:00.0", "qty": 1}))],
        columns,
    )
    .unwrap();

    assert_eq!(table.column(0).unwrap().output_format.as_deref(), Some("m/d/Y"));
    assert_eq!(
        table.column(1).unwrap().output_format.as_deref(),
        Some("m/d/Y h:i A")
    );
    assert_eq!(table.column(2).unwrap().output_format.as_deref(), Some("Y-m-d"));
    assert_eq!(table.column(3).unwrap().output_format, None);
}

#[test]
fn name_lookup_skips_unnamed_columns_and_keeps_the_last_duplicate() {
    let columns = vec![
        Column::new("dup").with_value(Getter::literal(1)),
        Column::new("").with_value(Getter::literal(2)),
        Column::new("dup").with_value(Getter::literal(3)),
    ];
    let table = Table::new(vec![record(json!({}))], columns).unwrap();
    assert_eq!(table.column_position("dup"), Some(2));
    assert_eq!(table.column_position(""), None);
    assert!(table.column_by_name("dup").is_some());

    let named: Vec<&str> = table.columns_by_name().map(|(name, _)| name).collect();
    assert_eq!(named, vec!["dup"]);
}

#[test]
fn column_cells_pair_each_row_with_its_cell() {
    let table = Table::builder(qty_price_columns())
        .records(vec![
            record(json!({"count": 1, "unit_price": "1.00"})),
            record(json!({"count": 2, "unit_price": "2.00"})),
        ])
        .build()
        .unwrap();

    let quantities: Vec<&Value> = table
        .column_cells(0)
        .map(|(_row, cell)| cell.value())
        .collect();
    assert_eq!(quantities, vec![&Value::Int(1), &Value::Int(2)]);
    assert_eq!(table.column_cells(9).count(), 0);
}

#[test]
fn iteration_is_row_major_and_len_counts_data_rows_only() {
    let table = Table::builder(qty_price_columns())
        .records(vec![
            record(json!({"count": 1, "unit_price": "1.00"})),
            record(json!({"count": 2, "unit_price": "2.00"})),
        ])
        .total_record(record(json!({"count": 3, "unit_price": "3.00"})))
        .build()
        .unwrap();

    assert_eq!(table.len(), 2);
    assert!(!table.is_empty());

    let visited: Vec<(usize, String)> = table
        .iter()
        .map(|(row, column, _cell)| (row.position(), column.name.clone()))
        .collect();
    assert_eq!(
        visited,
        vec![
            (0, "qty".to_string()),
            (0, "price".to_string()),
            (1, "qty".to_string()),
            (1, "price".to_string()),
        ]
    );

    assert_eq!(table.cells().count(), 4);
    let flattened: Vec<&Value> = table.cells().map(|cell| cell.value()).collect();
    let iterated: Vec<&Value> = table.iter().map(|(_, _, cell)| cell.value()).collect();
    assert_eq!(flattened, iterated);
}

#[test]
fn rows_expose_their_first_date_cell() {
    let columns = vec![
        Column::new("qty").with_kind(ColumnKind::Int).with_value("count"),
        Column::new("on").with_kind(ColumnKind::Date).with_value("on"),
    ];
    let table = Table::new(
        vec![record(json!({"count": 1, "on": "2024-03-09"}))],
        columns,
    )
    .unwrap();

    let row = &table.rows()[0];
    let date_cell = row.date_cell().expect("date cell");
    assert_eq!(date_cell.position(), 1);
    assert_eq!(
        date_cell.value(),
        &Value::Date(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap())
    );
}

#[test]
fn cell_display_metadata_falls_back_to_the_column() {
    let columns = vec![
        Column::new("price")
            .with_kind(ColumnKind::Decimal)
            .with_value("unit_price")
            .with_prefix("$")
            .with_suffix(" USD")
            .with_precision(3),
        Column::new("bare").with_value(Getter::literal(1)),
    ];
    let table = Table::new(vec![record(json!({"unit_price": "2.5"}))], columns).unwrap();

    let priced = &table.rows()[0].cells()[0];
    assert_eq!(priced.prefix(), "$");
    assert_eq!(priced.suffix(), " USD");
    assert_eq!(priced.precision(), 3);

    let bare = &table.rows()[0].cells()[1];
    assert_eq!(bare.prefix(), "");
    assert_eq!(bare.suffix(), "");
    assert_eq!(bare.precision(), 2);
}

#[test]
fn row_and_cell_metadata_are_copied_onto_every_row_and_cell() {
    let table = Table::builder(qty_price_columns())
        .records(vec![record(json!({"count": 1, "unit_price": "1.00"}))])
        .row_meta(MetaMap::from_iter([("section", Value::Text("body".into()))]))
        .cell_meta(MetaMap::from_iter([("align", Value::Text("right".into()))]))
        .build()
        .unwrap();

    let row = &table.rows()[0];
    assert_eq!(row.meta().get("section"), &Value::Text("body".into()));
    for cell in row.cells() {
        assert_eq!(cell.meta().get("align"), &Value::Text("right".into()));
    }
}

#[test]
fn composite_cell_values_are_a_modeling_error() {
    // No declared kind: the nested map passes through coercion untouched,
    // and asking for its cell kind must fail loudly.
    let columns = vec![Column::new("raw").with_value("nested")];
    let table = Table::new(vec![record(json!({"nested": {"a": 1}}))], columns).unwrap();
    assert!(table.rows()[0].cells()[0].kind().is_err());
}

#[test]
fn unparseable_numeric_text_fails_construction() {
    let columns = vec![Column::new("qty").with_kind(ColumnKind::Int).with_value("count")];
    let result = Table::new(vec![record(json!({"count": "twelve"}))], columns);
    assert!(matches!(result, Err(EngineError::NumberParse { .. })));
}

#[test]
fn timestamps_coerce_for_date_and_datetime_columns() {
    let columns = vec![
        Column::new("at").with_kind(ColumnKind::DateTime).with_value("ts"),
        Column::new("on").with_kind(ColumnKind::Date).with_value("ts"),
    ];
    let table = Table::new(vec![record(json!({"ts": 1_700_000_000i64}))], columns).unwrap();

    let row = &table.rows()[0];
    let Value::DateTime(datetime) = row.cells()[0].value() else {
        panic!("expected a datetime cell");
    };
    assert_eq!(datetime.and_utc().timestamp(), 1_700_000_000);
    assert_eq!(
        row.cells()[1].value(),
        &Value::Date(NaiveDate::from_ymd_opt(2023, 11, 14).unwrap())
    );
}

#[test]
fn custom_input_formats_drive_date_parsing() {
    let columns = vec![
        Column::new("on")
            .with_kind(ColumnKind::Date)
            .with_value("on")
            .with_input_format("%m/%d/%Y"),
    ];
    let table = Table::new(vec![record(json!({"on": "03/09/2024"}))], columns).unwrap();
    assert_eq!(
        table.rows()[0].cells()[0].value(),
        &Value::Date(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap())
    );
}

#[test]
fn column_specs_deserialize_and_build() {
    let columns: Vec<Column> = serde_json::from_str(
        r#"[
            {"name": "qty", "type": "int", "value": "count"},
            {"name": "price", "type": "decimal", "value": "unit_price", "precision": 2}
        ]"#,
    )
    .expect("column specs");
    let table = Table::new(
        vec![record(json!({"count": 3, "unit_price": "9.995"}))],
        columns,
    )
    .unwrap();
    assert_eq!(table.rows()[0].cells()[0].value(), &Value::Int(3));
    assert_eq!(
        table.rows()[0].cells()[1].value(),
        &Value::Decimal("9.995".parse().unwrap())
    );
}
