//! e-Stat（政府統計の総合窓口）で公開されている地域メッシュ統計CSVの読み込み。
//!
//! 1行目に列名、2行目に列の日本語名が並び、3行目以降が KEY_CODE（地域メッシュコード）をキーとするデータ行になる。
//! ファイルは Shift_JIS で保存されている。

mod error;
mod reader;
mod reconcile;
mod value;

use std::path::Path;

use crate::crs::GeographicCrs;

pub use error::EstatError;
pub use reader::EstatTable;
pub use reconcile::{EstatLayer, Feature, Field, NUM_GASSAN, ReconcileOptions, reconcile};
pub use value::{FieldKind, TEXT_COLUMNS, Value};

/// 座標系を指定しなかったときに割り当てる地理座標系。e-Stat の統計は JGD2000 の経緯度で作成されている。
pub const DEFAULT_CRS: GeographicCrs = GeographicCrs::Jgd2000;

/// ファイルを読み込み、秘匿対象地域の併合まで行う。
pub fn load(path: impl AsRef<Path>, options: &ReconcileOptions) -> Result<EstatLayer, EstatError> {
    let table = EstatTable::read_path(path)?;
    reconcile(&table, options)
}
