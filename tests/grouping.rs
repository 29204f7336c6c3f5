use rowgroup::engine::group::{ConstantCollector, IterCursor, custom, list};
use rowgroup::{
    Column, Group, GroupBy, GroupingError, MemoryRowSource, Projection, Row, RowSource,
    RowSourceError, Value,
};

fn order_rows() -> Vec<Row> {
    // customer, order_no, sku, (sku, qty)
    let raw: [(Option<&str>, i64, &str, i64); 6] = [
        (Some("acme"), 1, "bolt", 10),
        (Some("globex"), 2, "nut", 5),
        (Some("acme"), 3, "bolt", 7),
        (None, 4, "washer", 1),
        (Some("acme"), 5, "screw", 3),
        (Some("globex"), 6, "nut", 2),
    ];
    raw.into_iter()
        .map(|(customer, order_no, sku, qty)| {
            vec![
                Value::from(customer),
                Value::from(order_no),
                Value::from(sku),
                Value::pair(sku, qty),
            ]
        })
        .collect()
}

#[test]
fn groups_orders_by_customer() {
    let customer: Column<String> = Column::new("customer");
    let order_no: Column<i64> = Column::new("order_no");
    let sku: Column<String> = Column::new("sku");
    let qty: Column<i64> = Column::new("qty");

    let mut source = MemoryRowSource::new(order_rows());
    let results = GroupBy::new(&customer)
        .with_list(&order_no)
        .with_set(&sku)
        .with_map(&sku, &qty)
        .transform(&mut source)
        .unwrap();

    let keys: Vec<Option<String>> = results.keys().cloned().collect();
    assert_eq!(
        keys,
        vec![Some("acme".to_string()), Some("globex".to_string()), None]
    );

    let acme = &results[&Some("acme".to_string())];
    assert_eq!(acme.get_list(&order_no).unwrap(), vec![1, 3, 5]);
    let skus: Vec<String> = acme.get_set(&sku).unwrap().into_iter().collect();
    assert_eq!(skus, vec!["bolt", "screw"]);
    let last_qty: Vec<(String, i64)> = acme.get_map(&sku, &qty).unwrap().into_iter().collect();
    assert_eq!(
        last_qty,
        vec![("bolt".to_string(), 7), ("screw".to_string(), 3)]
    );

    let anonymous = &results[&None::<String>];
    assert_eq!(anonymous.get_one(&customer).unwrap(), None);
    assert_eq!(anonymous.get_list(&order_no).unwrap(), vec![4]);

    assert_eq!(source.close_count(), 1);
}

#[test]
fn positional_and_custom_columns_through_public_api() {
    let customer: Column<String> = Column::new("customer");
    let order_no: Column<i64> = Column::new("order_no");
    let orders = list(&order_no);
    let tag = custom(Projection::path("sku"), || {
        ConstantCollector::new("retail".to_string())
    });

    let rows: Vec<Row> = order_rows()
        .into_iter()
        .map(|mut row| {
            row.truncate(3);
            row
        })
        .collect();
    let results = GroupBy::new(&customer)
        .with_group(&orders)
        .with_group(&tag)
        .transform(&mut MemoryRowSource::new(rows))
        .unwrap();

    let globex: &Group = &results[&Some("globex".to_string())];
    assert_eq!(globex.get_by_definition(&orders).unwrap(), vec![2, 6]);
    assert_eq!(globex.get_by_definition(&tag).unwrap(), "retail");
    assert_eq!(
        globex.to_positional_array().unwrap(),
        vec![
            Value::from("globex"),
            Value::List(vec![Value::Int64(2), Value::Int64(6)]),
            Value::from("retail"),
        ]
    );
}

struct Truncated {
    rows: Vec<Row>,
}

impl RowSource for Truncated {
    type Cursor = IterCursor<std::vec::IntoIter<Result<Row, RowSourceError>>>;

    fn iterate(&mut self, _projections: &[Projection]) -> Result<Self::Cursor, RowSourceError> {
        let mut items: Vec<Result<Row, RowSourceError>> =
            self.rows.iter().cloned().map(Ok).collect();
        items.push(Err(RowSourceError::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "stream ended early",
        ))));
        Ok(IterCursor::new(items.into_iter()))
    }
}

#[test]
fn io_failure_mid_stream_returns_no_groups() {
    let customer: Column<String> = Column::new("customer");
    let order_no: Column<i64> = Column::new("order_no");
    let rows: Vec<Row> = order_rows()
        .into_iter()
        .map(|mut row| {
            row.truncate(2);
            row
        })
        .collect();

    let err = GroupBy::new(&customer)
        .with_list(&order_no)
        .transform(&mut Truncated { rows })
        .unwrap_err();

    match err {
        GroupingError::RowSourceFailure(RowSourceError::Io(e)) => {
            assert_eq!(e.kind(), std::io::ErrorKind::UnexpectedEof)
        }
        other => panic!("unexpected error: {other}"),
    }
}
