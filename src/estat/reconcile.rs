use geo::{BooleanOps, MultiPolygon};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    estat::{
        error::EstatError,
        reader::EstatTable,
        value::{FieldKind, Value},
    },
    geometry::bbox::BBox,
    grid_square,
};

/// 併合されたメッシュの数を入れる列
pub const NUM_GASSAN: &str = "NUM_GASSAN";

/// 秘匿処理に関わる列。併合の際に値を足し合わせない。
const MERGE_COLUMNS: [&str; 4] = ["KEY_CODE", "GASSAN", "HTKSYORI", "HTKSAKI"];

/// 秘匿処理の区分のうち、他のメッシュに合算されたことを表す値
const HTKSYORI_MERGED: i64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileOptions {
    /// 秘匿対象地域を併合する
    pub merge_suppressed: bool,
    /// 列名に日本語名を付ける（`T000847001_人口（総数）` など）
    pub label_columns: bool,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            merge_suppressed: true,
            label_columns: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub name: String,
    pub kind: FieldKind,
}

/// 出力する1行。ジオメトリはメッシュコードを復元できなかった場合 `None`。
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub attributes: Vec<Value>,
    pub geometry: Option<MultiPolygon<f64>>,
}

/// 併合処理の結果
#[derive(Debug, Clone, PartialEq)]
pub struct EstatLayer {
    pub fields: Vec<Field>,
    pub features: Vec<Feature>,
}

impl EstatLayer {
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// 読み込んだ統計表から出力する行とジオメトリを作る。
///
/// 併合を行う場合（HTKSYORI と GASSAN の列がある場合に限る）:
/// - HTKSYORI が `2` の行は、他の行に合算されているので出力しない。
/// - GASSAN に他の KEY_CODE が `;` 区切りで並んでいる行は、それらの行の数値を加え、
///   ジオメトリはそれらのメッシュとの和になる。GASSAN に挙げられた KEY_CODE が表に無ければエラー。
///
/// 加える値は常に読み込んだままの値で、他の行に加算した結果は使わない。
pub fn reconcile(table: &EstatTable, options: &ReconcileOptions) -> Result<EstatLayer, EstatError> {
    let htksyori = table.column_index("HTKSYORI");
    let gassan = table.column_index("GASSAN");
    let merging = options.merge_suppressed && htksyori.is_some() && gassan.is_some();

    let mut fields: Vec<Field> = table
        .columns()
        .iter()
        .zip(table.aliases())
        .zip(table.kinds())
        .map(|((column, alias), kind)| Field {
            name: if options.label_columns && !alias.is_empty() {
                format!("{column}_{alias}")
            } else {
                column.clone()
            },
            kind: *kind,
        })
        .collect();
    if gassan.is_some() {
        fields.push(Field {
            name: NUM_GASSAN.to_string(),
            kind: FieldKind::Integer,
        });
    }

    let value_columns: Vec<usize> = (0..table.columns().len())
        .filter(|&i| !MERGE_COLUMNS.contains(&table.columns()[i].as_str()))
        .collect();

    let mut features = Vec::with_capacity(table.len());
    let mut skipped = 0usize;
    for record in table.records() {
        let key = record[table.key_column()].as_str().unwrap_or_default();
        let mut attributes = record.clone();
        let mut codes = vec![key];

        if let (true, Some(htksyori), Some(gassan)) = (merging, htksyori, gassan) {
            if record[htksyori].as_i64() == Some(HTKSYORI_MERGED) {
                skipped += 1;
                continue;
            }
            for target in merge_targets(&record[gassan]) {
                let donor = table
                    .get(target)
                    .ok_or_else(|| EstatError::UnknownMergeTarget {
                        key: key.to_string(),
                        target: target.to_string(),
                    })?;
                for &i in &value_columns {
                    attributes[i].accumulate(&donor[i]);
                }
                codes.push(target);
            }
        }

        let boxes: Vec<_> = codes.iter().filter_map(|c| grid_square::decode(c)).collect();
        if gassan.is_some() {
            attributes.push(if merging {
                Value::Integer(boxes.len() as i64)
            } else {
                Value::Null
            });
        }
        features.push(Feature {
            attributes,
            geometry: union_boxes(boxes),
        });
    }

    debug!(
        features = features.len(),
        skipped, merging, "reconciled e-Stat table"
    );
    Ok(EstatLayer { fields, features })
}

fn merge_targets(value: &Value) -> impl Iterator<Item = &str> {
    value
        .as_str()
        .unwrap_or_default()
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// 矩形の和を取る。1つだけならそのまま、複数なら接する辺を消して1つの面にまとめる。
fn union_boxes(boxes: Vec<BBox>) -> Option<MultiPolygon<f64>> {
    let mut polygons = boxes.into_iter().map(|b| MultiPolygon::new(vec![b.to_polygon()]));
    let first = polygons.next()?;
    Some(polygons.fold(first, |acc, p| acc.union(&p)))
}
