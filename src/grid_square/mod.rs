//! 地域メッシュ (JIS X 0410)。
//!
//! コードと経緯度の相互変換、階層を指定した区画の列挙、列挙数の見積もりを提供する。
//! 内部では経緯度を [`constants::SCALE`] で整数に換算して扱うので、区画の境界に丸め誤差は入らない。

pub mod constants;
mod decode;
mod encode;
mod enumerate;
mod estimate;
mod level;

pub use constants::is_available_primary;
pub use decode::{decode, decode_as, level_of};
#[cfg(any(test, feature = "random"))]
pub use encode::random_point_using;
pub use encode::{GridSquareCodes, encode};
pub use enumerate::{GridSquarePatches, patches};
pub use estimate::estimate_total_count;
pub use level::GridLevel;
