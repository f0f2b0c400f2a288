/// 発生し得るエラーを`enum` 型として定義・集約。
mod error;

/// 矩形と固定小数点の区画計算。
pub mod geometry;

/// 階層の共通の性質と、要求された階層の集合。
mod level;

/// 列挙の要求と検証。
mod request;

/// 列挙された区画。
mod patch;

/// 進捗通知と中断に対応した駆動ループ。
pub mod progress;

/// 地域メッシュ (JIS X 0410)。
pub mod grid_square;

/// 国土基本図図郭。
pub mod legacy_grid;

/// 地域メッシュに割り当てる地理座標系。
mod crs;

/// e-Stat の地域メッシュ統計CSV。
pub mod estat;

pub use crs::GeographicCrs;
pub use error::Error;
pub use geometry::bbox::BBox;
pub use grid_square::GridLevel;
pub use legacy_grid::{Datum, LegacyLevel, PlaneZone};
pub use level::{Level, LevelSet};
pub use patch::Patch;
pub use progress::{Completion, Feedback, NoFeedback, drive};
pub use request::EnumerationRequest;
