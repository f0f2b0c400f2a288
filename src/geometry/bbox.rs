use std::fmt;

use geo::{Polygon, Rect, coord};
use serde::{Deserialize, Serialize};

/// 軸に沿った矩形（Axis-Aligned Bounding Box）。
///
/// 地域メッシュでは `(経度0, 緯度0, 経度1, 緯度1)`、国土基本図図郭では
/// 平面直角座標の `(Y0, X0, Y1, X1)`（東西方向, 南北方向, メートル）を表す。
/// どちらの場合も `min_x <= max_x`, `min_y <= max_y` が成り立つ。
///
/// ```
/// # use japanese_grids::BBox;
/// let b = BBox::new(139.0, 35.0, 140.0, 36.0);
/// assert_eq!(b.width(), 1.0);
/// assert!(b.contains(139.5, 35.5));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "Corners")]
pub struct BBox {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

/// 読み込み用の表現。読み込んだ角は [`BBox::new`] で正規化する。
#[derive(Deserialize)]
struct Corners {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

impl From<Corners> for BBox {
    fn from(c: Corners) -> BBox {
        BBox::new(c.min_x, c.min_y, c.max_x, c.max_y)
    }
}

impl fmt::Display for BBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}, {})",
            self.min_x, self.min_y, self.max_x, self.max_y
        )
    }
}

impl BBox {
    /// 2つの角から [`BBox`] を作成する。角の順序は自動的に正規化される。
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> BBox {
        BBox {
            min_x: x0.min(x1),
            min_y: y0.min(y1),
            max_x: x0.max(x1),
            max_y: y0.max(y1),
        }
    }

    pub fn min_x(&self) -> f64 {
        self.min_x
    }

    pub fn min_y(&self) -> f64 {
        self.min_y
    }

    pub fn max_x(&self) -> f64 {
        self.max_x
    }

    pub fn max_y(&self) -> f64 {
        self.max_y
    }

    /// `(min_x, min_y, max_x, max_y)` のタプルとして返す。
    pub fn as_tuple(&self) -> (f64, f64, f64, f64) {
        (self.min_x, self.min_y, self.max_x, self.max_y)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// 中心点 `(x, y)`
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// 他の矩形と重なるか判定する。
    ///
    /// いずれかの軸で完全に離れている場合のみ `false` を返す。辺や角で接している場合は重なりとみなす。
    ///
    /// ```
    /// # use japanese_grids::BBox;
    /// let a = BBox::new(0.0, 0.0, 1.0, 1.0);
    /// assert!(a.intersects(&BBox::new(1.0, 1.0, 2.0, 2.0)));
    /// assert!(!a.intersects(&BBox::new(1.5, 0.0, 2.0, 1.0)));
    /// ```
    pub fn intersects(&self, other: &BBox) -> bool {
        !(self.max_x < other.min_x
            || self.min_x > other.max_x
            || self.max_y < other.min_y
            || self.min_y > other.max_y)
    }

    /// 点が矩形の内部（境界を含む）にあるか判定する。
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.min_x <= x && x <= self.max_x && self.min_y <= y && y <= self.max_y
    }

    /// 反時計回りの外周を持つ [`Polygon`] に変換する。
    pub fn to_polygon(&self) -> Polygon<f64> {
        Rect::new(
            coord! { x: self.min_x, y: self.min_y },
            coord! { x: self.max_x, y: self.max_y },
        )
        .to_polygon()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Area;

    #[test]
    fn new_normalizes_corners() {
        let b = BBox::new(2.0, 3.0, 1.0, -1.0);
        assert_eq!(b.as_tuple(), (1.0, -1.0, 2.0, 3.0));
    }

    #[test]
    fn deserialize_normalizes_corners() {
        let b: BBox = toml::from_str("min_x = 141.0\nmin_y = 36.0\nmax_x = 138.0\nmax_y = 34.0").unwrap();
        assert_eq!(b, BBox::new(138.0, 34.0, 141.0, 36.0));
        assert!(b.width() > 0.0);
    }

    #[test]
    fn intersects_is_symmetric() {
        let a = BBox::new(0.0, 0.0, 10.0, 10.0);
        let inner = BBox::new(2.0, 2.0, 3.0, 3.0);
        let above = BBox::new(0.0, 10.5, 10.0, 11.0);

        assert!(a.intersects(&inner));
        assert!(inner.intersects(&a));
        assert!(!a.intersects(&above));
        assert!(!above.intersects(&a));
    }

    #[test]
    fn polygon_has_same_area() {
        let b = BBox::new(139.0, 35.0, 139.5, 35.25);
        let polygon = b.to_polygon();
        assert!((polygon.unsigned_area() - b.area()).abs() < 1e-12);
    }
}
