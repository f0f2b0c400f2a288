use std::fmt;

use serde::Serialize;

/// 列の型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Integer,
}

/// 文字列として扱う列。ほかの列はすべて整数。
pub const TEXT_COLUMNS: [&str; 3] = ["KEY_CODE", "HTKSAKI", "GASSAN"];

impl FieldKind {
    pub fn of_column(name: &str) -> FieldKind {
        if TEXT_COLUMNS.contains(&name) {
            FieldKind::Text
        } else {
            FieldKind::Integer
        }
    }
}

/// 統計表の1つのセルの値。空欄と秘匿を表す `*` は [`Value::Null`] になる。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Integer(i64),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// 併合先の値を加える。`Null` に値を加えるとその値になり、`Null` を加えても変わらない。
    pub(crate) fn accumulate(&mut self, other: &Value) {
        match (&mut *self, other) {
            (Value::Integer(a), Value::Integer(b)) => *a = a.saturating_add(*b),
            (Value::Null, Value::Integer(b)) => *self = Value::Integer(*b),
            _ => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Integer(v) => write!(f, "{v}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}
