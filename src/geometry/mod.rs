//! 区画の矩形を扱うための型やロジック。
//!
//! 実座標の矩形 [`bbox::BBox`] と、区画計算に使う整数座標の矩形 [`scaled::ScaledBox`] を提供する。

/// 実座標の矩形 `BBox` と交差判定。
pub mod bbox;

/// 浮動小数点誤差を避けるための整数座標系。
pub mod scaled;
