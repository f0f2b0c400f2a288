//! 国土基本図図郭。
//!
//! 平面直角座標系（メートル）の上に固定の原点から切られた図郭で、系番号・英字・数字を組み合わせたコードを持つ。

mod codec;
mod enumerate;
mod estimate;
mod level;
mod plane;

pub use codec::{LegacyCodes, LegacySheet, decode, encode};
pub use enumerate::{LegacyPatches, patches};
pub use estimate::estimate_total_count;
pub use level::LegacyLevel;
pub use plane::{Datum, PlaneZone};
