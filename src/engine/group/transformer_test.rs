use std::cell::Cell;

use indexmap::IndexSet;

use crate::engine::errors::{CollectorError, GroupingError};
use crate::engine::group::group::Group;
use crate::engine::group::group_by::GroupBy;
use crate::engine::group::projection::Column;
use crate::engine::group::row_source::{MemoryRowSource, Row};
use crate::engine::group::transformer::ResultTransformer;
use crate::engine::types::{Datum, Value, mismatch};
use crate::test_helpers::factories::{RowFactory, RowSourceFactory};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Comment {
    id: i64,
    text: String,
}

impl Comment {
    fn numbered(id: i64) -> Self {
        Self {
            id,
            text: format!("comment {}", id),
        }
    }
}

/// Rows carry a comment as an (id, text) pair.
impl Datum for Comment {
    fn from_value(value: Value) -> Result<Self, CollectorError> {
        match value {
            Value::Pair(id, text) => Ok(Comment {
                id: i64::from_value(*id)?,
                text: String::from_value(*text)?,
            }),
            other => Err(mismatch::<Self>(&other)),
        }
    }

    fn into_value(self) -> Value {
        Value::pair(self.id, self.text)
    }
}

#[derive(Debug)]
struct Post {
    id: Option<i64>,
    name: Option<String>,
    comments: IndexSet<Comment>,
}

fn post_id() -> Column<i64> {
    Column::new("post_id")
}

fn post_name() -> Column<String> {
    Column::new("post_name")
}

fn comment() -> Column<Comment> {
    Column::new("comment")
}

fn to_post(group: &Group) -> Result<Post, GroupingError> {
    Ok(Post {
        id: group.get_one(&post_id())?,
        name: group.get_one(&post_name())?,
        comments: group.get_set(&comment())?,
    })
}

#[test]
fn transform_results_into_user_type() {
    let mut source = MemoryRowSource::new(RowFactory::posts_with_comment_pairs());
    let results = GroupBy::new(&post_id())
        .with_one(&post_name())
        .with_set(&comment())
        .with_transformer(to_post)
        .transform(&mut source)
        .unwrap();

    let post = &results[&Some(1)];
    assert_eq!(post.id, Some(1));
    assert_eq!(post.name.as_deref(), Some("post 1"));
    assert_eq!(
        post.comments,
        IndexSet::from([Comment::numbered(1), Comment::numbered(2), Comment::numbered(3)])
    );

    let keys: Vec<Option<i64>> = results.keys().cloned().collect();
    assert_eq!(keys, vec![Some(1), Some(2), Some(3), None]);
    assert_eq!(results[&None::<i64>].name.as_deref(), Some("null post"));
    assert_eq!(source.close_count(), 1);
}

#[test]
fn mapping_error_aborts_without_partial_result() {
    let missing: Column<String> = Column::new("missing");
    let transformer = GroupBy::new(&post_id())
        .with_one(&post_name())
        .with_set(&comment())
        .with_transformer(move |group: &Group| group.get_one(&missing));

    let err = transformer
        .transform(&mut MemoryRowSource::new(RowFactory::posts_with_comment_pairs()))
        .unwrap_err();
    assert!(matches!(err, GroupingError::NoSuchColumn(_)));
}

#[test]
fn grouping_failure_skips_the_mapping() {
    let mut source = RowSourceFactory::new()
        .with_rows(RowFactory::posts_with_comment_pairs())
        .with_failure("boom")
        .create();
    let calls = Cell::new(0usize);
    let transformer = GroupBy::new(&post_id())
        .with_one(&post_name())
        .with_set(&comment())
        .with_transformer(|group: &Group| {
            calls.set(calls.get() + 1);
            to_post(group)
        });

    assert!(transformer.transform(&mut source).is_err());
    assert_eq!(calls.get(), 0);
    assert_eq!(source.close_count(), 1);
}

fn run<T: ResultTransformer>(transformer: &T, rows: Vec<Row>) -> T::Output {
    match transformer.transform(&mut MemoryRowSource::new(rows)) {
        Ok(out) => out,
        Err(e) => panic!("transform failed: {e}"),
    }
}

#[test]
fn both_stages_share_the_result_transformer_seam() {
    let group_by = GroupBy::new(&post_id()).with_one(&post_name()).with_set(&comment());
    let grouped = run(&group_by, RowFactory::posts_with_comment_pairs());
    assert_eq!(grouped.len(), 4);

    let names = group_by.with_transformer(|group: &Group| group.get_one(&post_name()));
    let mapped = run(&names, RowFactory::posts_with_comment_pairs());
    let values: Vec<Option<String>> = mapped.into_values().collect();
    assert_eq!(
        values,
        vec![
            Some("post 1".to_string()),
            Some("post 2".to_string()),
            Some("post 3".to_string()),
            Some("null post".to_string()),
        ]
    );
    assert_eq!(names.group_by().definitions().len(), 3);
}
