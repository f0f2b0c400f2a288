use crate::geometry::bbox::BBox;

/// 実座標と内部整数座標の換算係数。
///
/// 内部座標は `実座標 × 係数` で表され、すべての区画境界が整数に乗るように係数を選ぶ。
/// 分割を重ねても浮動小数点の誤差が累積しないよう、区画の計算はすべて整数で行い、
/// パッチを出力する時点で一度だけ実座標に戻す。
///
/// ```
/// # use japanese_grids::geometry::scaled::{Scale, ScaledBox};
/// let scale = Scale::new(3200, 4800);
/// let b = scale.to_real(&ScaledBox::new(448000, 168000, 451200, 171200));
/// assert_eq!((b.min_x(), b.min_y(), b.max_x()), (140.0, 35.0, 141.0));
/// assert!((b.max_y() - (35.0 + 2.0 / 3.0)).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scale {
    x: i64,
    y: i64,
}

impl Scale {
    /// 係数 1（メートル単位の平面直角座標など、もともと整数に乗る座標系）
    pub const UNIT: Scale = Scale { x: 1, y: 1 };

    pub const fn new(x: i64, y: i64) -> Scale {
        Scale { x, y }
    }

    pub fn x(&self) -> i64 {
        self.x
    }

    pub fn y(&self) -> i64 {
        self.y
    }

    /// 内部座標の矩形を実座標に戻す。
    pub fn to_real(&self, b: &ScaledBox) -> BBox {
        let sx = self.x as f64;
        let sy = self.y as f64;
        BBox::new(
            b.x0 as f64 / sx,
            b.y0 as f64 / sy,
            b.x1 as f64 / sx,
            b.y1 as f64 / sy,
        )
    }

    /// 実座標の範囲を内部座標の尺度に拡大する（整数化はしない）。
    ///
    /// 抽出範囲との交差判定を内部座標のまま行うために使う。
    pub fn scale_extent(&self, extent: &BBox) -> BBox {
        let sx = self.x as f64;
        let sy = self.y as f64;
        BBox::new(
            extent.min_x() * sx,
            extent.min_y() * sy,
            extent.max_x() * sx,
            extent.max_y() * sy,
        )
    }

    /// 実座標の点を、その点を含む内部座標の格子点（切り捨て）に変換する。
    ///
    /// 有限でない値や `i64` に収まらない値は `None`。
    pub fn floor_point(&self, x: f64, y: f64) -> Option<(i64, i64)> {
        let sx = (x * self.x as f64).floor();
        let sy = (y * self.y as f64).floor();
        if !sx.is_finite() || !sy.is_finite() {
            return None;
        }
        if sx.abs() >= i64::MAX as f64 || sy.abs() >= i64::MAX as f64 {
            return None;
        }
        Some((sx as i64, sy as i64))
    }
}

/// 内部整数座標で表された矩形。
///
/// `x0 <= x1`, `y0 <= y1` を前提とする。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScaledBox {
    x0: i64,
    y0: i64,
    x1: i64,
    y1: i64,
}

impl ScaledBox {
    pub const fn new(x0: i64, y0: i64, x1: i64, y1: i64) -> ScaledBox {
        ScaledBox { x0, y0, x1, y1 }
    }

    /// 南西角と大きさから作成する。
    pub const fn from_origin(x0: i64, y0: i64, width: i64, height: i64) -> ScaledBox {
        ScaledBox {
            x0,
            y0,
            x1: x0 + width,
            y1: y0 + height,
        }
    }

    pub fn x0(&self) -> i64 {
        self.x0
    }

    pub fn y0(&self) -> i64 {
        self.y0
    }

    pub fn x1(&self) -> i64 {
        self.x1
    }

    pub fn y1(&self) -> i64 {
        self.y1
    }

    pub fn width(&self) -> i64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> i64 {
        self.y1 - self.y0
    }

    /// 矩形を `columns × rows` に等分したときの、西から `column` 番目・南から `row` 番目のセル。
    ///
    /// 幅と高さはそれぞれ `columns`, `rows` で割り切れる必要がある。
    ///
    /// ```
    /// # use japanese_grids::geometry::scaled::ScaledBox;
    /// let parent = ScaledBox::new(0, 0, 80, 40);
    /// assert_eq!(parent.cell(8, 8, 7, 0), ScaledBox::new(70, 0, 80, 5));
    /// ```
    pub fn cell(&self, columns: i64, rows: i64, column: i64, row: i64) -> ScaledBox {
        debug_assert!(self.width() % columns == 0 && self.height() % rows == 0);
        let w = self.width() / columns;
        let h = self.height() / rows;
        ScaledBox::from_origin(self.x0 + w * column, self.y0 + h * row, w, h)
    }

    /// 矩形を 2×2 に分けたときの象限。
    pub fn quadrant(&self, east: bool, north: bool) -> ScaledBox {
        self.cell(2, 2, east as i64, north as i64)
    }

    /// 内部座標の尺度に拡大済みの範囲と重なるか判定する。
    pub fn intersects(&self, scaled_extent: &BBox) -> bool {
        !((self.x1 as f64) < scaled_extent.min_x()
            || (self.x0 as f64) > scaled_extent.max_x()
            || (self.y1 as f64) < scaled_extent.min_y()
            || (self.y0 as f64) > scaled_extent.max_y())
    }

    /// 他の矩形を完全に含むか判定する。
    pub fn contains(&self, other: &ScaledBox) -> bool {
        self.x0 <= other.x0 && other.x1 <= self.x1 && self.y0 <= other.y0 && other.y1 <= self.y1
    }

    /// 内部座標の点が矩形に含まれるか（西・南の辺を含み、東・北の辺を含まない）。
    pub fn contains_point(&self, x: i64, y: i64) -> bool {
        self.x0 <= x && x < self.x1 && self.y0 <= y && y < self.y1
    }

    /// 面積（内部座標の単位）
    pub fn area(&self) -> i64 {
        self.width() * self.height()
    }
}
