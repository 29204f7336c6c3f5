use crate::engine::group::Row;
use crate::engine::types::Value;

pub struct RowFactory {
    values: Vec<Value>,
}

impl RowFactory {
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    pub fn with(mut self, value: impl Into<Value>) -> Self {
        self.values.push(value.into());
        self
    }

    pub fn with_null(mut self) -> Self {
        self.values.push(Value::Null);
        self
    }

    pub fn with_pair(mut self, key: impl Into<Value>, value: impl Into<Value>) -> Self {
        self.values.push(Value::pair(key, value));
        self
    }

    pub fn create(self) -> Row {
        self.values
    }

    /// post_id, post_name, comment_id, comment_text; post 1 rows are spread
    /// across the stream and two rows carry a null post id.
    pub fn posts_with_comments() -> Vec<Row> {
        vec![
            post_row(Some(1), "post 1", 1),
            post_row(Some(2), "post 2", 4),
            post_row(Some(1), "post 1", 2),
            post_row(Some(2), "post 2", 5),
            post_row(Some(3), "post 3", 6),
            post_row(None, "null post", 7),
            post_row(None, "null post", 8),
            post_row(Some(1), "post 1", 3),
        ]
    }

    /// post_id, post_name, (comment_id, comment_text) pair.
    pub fn posts_with_comment_pairs() -> Vec<Row> {
        vec![
            pair_row(Some(1), "post 1", 1),
            pair_row(Some(1), "post 1", 2),
            pair_row(Some(2), "post 2", 5),
            pair_row(Some(3), "post 3", 6),
            pair_row(None, "null post", 7),
            pair_row(None, "null post", 8),
            pair_row(Some(1), "post 1", 3),
        ]
    }
}

fn post_row(post_id: Option<i64>, post_name: &str, comment_id: i64) -> Row {
    RowFactory::new()
        .with(post_id)
        .with(post_name)
        .with(comment_id)
        .with(format!("comment {}", comment_id))
        .create()
}

fn pair_row(post_id: Option<i64>, post_name: &str, comment_id: i64) -> Row {
    RowFactory::new()
        .with(post_id)
        .with(post_name)
        .with_pair(comment_id, format!("comment {}", comment_id))
        .create()
}
