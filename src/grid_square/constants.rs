use std::sync::LazyLock;

use roaring::RoaringBitmap;

use crate::{
    geometry::scaled::{Scale, ScaledBox},
    grid_square::level::GridLevel,
};

/// 経緯度を内部整数座標に換算する係数。
///
/// 経度は 1/3200 度、緯度は 1/4800 度を 1 単位とする。第1次地域区画（経度1度 × 緯度2/3度）は
/// 縦横ともに 3200 単位となり、8分の1地域メッシュ（5単位）や 100m メッシュ（4単位）の境界まで
/// すべて整数に乗る。
pub const SCALE: Scale = Scale::new(3200, 4800);

/// 第1次地域区画の一辺（内部座標の単位）
pub const PRIMARY_EDGE: i64 = 3200;

/// 第1次地域区画コードの下2桁に加える経度
pub const LNG_OFFSET: i64 = 100;

/// 日本の陸域・海域をカバーする第1次地域区画コードの一覧（昇順）。
///
/// コードは `緯度×1.5` の整数部2桁と `経度-100` の整数部2桁を並べたもの。
pub const PRIMARY_CODES: [u16; 176] = [
    3036, 3622, 3623, 3624, 3631, 3641, 3653, 3724, 3725, 3741, //
    3823, 3824, 3831, 3841, 3926, 3927, 3928, 3942, 4027, 4028, //
    4040, 4042, 4128, 4129, 4142, 4229, 4230, 4328, 4329, 4429, //
    4440, 4529, 4530, 4531, 4540, 4629, 4630, 4631, 4728, 4729, //
    4730, 4731, 4739, 4740, 4828, 4829, 4830, 4831, 4839, 4928, //
    4929, 4930, 4931, 4932, 4933, 4934, 4939, 5029, 5030, 5031, //
    5032, 5033, 5034, 5035, 5036, 5038, 5039, 5129, 5130, 5131, //
    5132, 5133, 5134, 5135, 5136, 5137, 5138, 5139, 5229, 5231, //
    5232, 5233, 5234, 5235, 5236, 5237, 5238, 5239, 5240, 5332, //
    5333, 5334, 5335, 5336, 5337, 5338, 5339, 5340, 5432, 5433, //
    5435, 5436, 5437, 5438, 5439, 5440, 5531, 5536, 5537, 5538, //
    5539, 5540, 5541, 5636, 5637, 5638, 5639, 5640, 5641, 5738, //
    5739, 5740, 5741, 5839, 5840, 5841, 5939, 5940, 5941, 5942, //
    6039, 6040, 6041, 6139, 6140, 6141, 6239, 6240, 6241, 6243, //
    6339, 6340, 6341, 6342, 6343, 6439, 6440, 6441, 6442, 6443, //
    6444, 6445, 6540, 6541, 6542, 6543, 6544, 6545, 6546, 6641, //
    6642, 6643, 6644, 6645, 6646, 6647, 6740, 6741, 6742, 6747, //
    6748, 6840, 6841, 6842, 6847, 6848,
];

static PRIMARY_SET: LazyLock<RoaringBitmap> =
    LazyLock::new(|| PRIMARY_CODES.iter().map(|&c| c as u32).collect());

/// 4桁の数値で表した第1次地域区画コードが、日本をカバーする区画に含まれるか判定する。
///
/// ```
/// # use japanese_grids::grid_square::is_available_primary;
/// assert!(is_available_primary(5339));
/// assert!(!is_available_primary(3630));
/// ```
pub fn is_available_primary(code: u16) -> bool {
    PRIMARY_SET.contains(code as u32)
}

/// 第1次地域区画コードの矩形（内部座標）
pub(crate) fn primary_rect(code: u16) -> ScaledBox {
    let lat = (code / 100) as i64;
    let lng = (code % 100) as i64 + LNG_OFFSET;
    ScaledBox::from_origin(
        lng * PRIMARY_EDGE,
        lat * PRIMARY_EDGE,
        PRIMARY_EDGE,
        PRIMARY_EDGE,
    )
}

/// 各階層の区画の一辺（内部座標の単位）。縦横とも同じ値になる。
pub fn edge(level: GridLevel) -> i64 {
    match level {
        GridLevel::Primary => PRIMARY_EDGE,
        GridLevel::Secondary => 400,
        GridLevel::Quintuple => 200,
        GridLevel::Double => 80,
        GridLevel::Standard => 40,
        GridLevel::Half => 20,
        GridLevel::Quarter => 10,
        GridLevel::Eighth => 5,
        GridLevel::HundredMeter => 4,
    }
}
