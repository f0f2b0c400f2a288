use serde::Serialize;

use crate::{
    geometry::{
        bbox::BBox,
        scaled::{Scale, ScaledBox},
    },
    legacy_grid::{level::LegacyLevel, plane::PlaneZone},
};

/// 地図情報レベル 50000 の図郭が並ぶ範囲（平面直角座標、メートル）。
///
/// 東西は原点から ±160km を 8 列、南北は北端 330km から 20 行に分ける。
/// 列は西から `A`〜`H`、行は北から `A`〜`T`。
pub(crate) const SHEETS: ScaledBox = ScaledBox::new(-160_000, -270_000, 160_000, 330_000);

/// 北から数えた行番号 `xi` と西から数えた列番号 `yi` で、親図郭の中の子図郭を求める。
///
/// 地図情報レベル 50000 の場合は `parent` に [`SHEETS`] を渡す。
pub(crate) fn child_rect(parent: &ScaledBox, level: LegacyLevel, xi: i64, yi: i64) -> ScaledBox {
    let (columns, rows) = level.fan_out();
    parent.cell(columns, rows, yi, rows - 1 - xi)
}

/// 子図郭のコードの接尾辞。地図情報レベル 2500 は [`lv2500_digit`] を使う。
pub(crate) fn child_suffix(level: LegacyLevel, xi: i64, yi: i64) -> String {
    match level {
        LegacyLevel::Lv50000 => format!("{}{}", letter(xi), letter(yi)),
        LegacyLevel::Lv1000 => format!("{xi}{}", letter(yi)),
        LegacyLevel::Lv5000 | LegacyLevel::Lv500 => format!("{xi}{yi}"),
        LegacyLevel::Lv2500 => String::new(),
    }
}

fn letter(index: i64) -> char {
    (b'A' + index as u8) as char
}

/// 地図情報レベル 2500 の象限番号。北西が `1`、北東が `2`、南西が `3`、南東が `4`。
pub(crate) fn lv2500_digit(east: bool, north: bool) -> u8 {
    match (east, north) {
        (false, true) => 1,
        (true, true) => 2,
        (false, false) => 3,
        (true, false) => 4,
    }
}

fn lv2500_quadrant(digit: u8) -> Option<(bool, bool)> {
    match digit {
        1 => Some((false, true)),
        2 => Some((true, true)),
        3 => Some((false, false)),
        4 => Some((true, false)),
        _ => None,
    }
}

/// 親図郭の中で点を含む子図郭の `(北からの行, 西からの列)`
fn locate(parent: &ScaledBox, level: LegacyLevel, x: i64, y: i64) -> (i64, i64) {
    let (w, h) = level.size();
    let yi = (x - parent.x0()) / w;
    let row = (y - parent.y0()) / h;
    let (_, rows) = level.fan_out();
    (rows - 1 - row, yi)
}

/// ある地点を含む、すべての地図情報レベルの図郭コード（系番号付き）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegacyCodes {
    pub lv50000: String,
    pub lv5000: String,
    pub lv2500: String,
    pub lv1000: String,
    pub lv500: String,
}

impl LegacyCodes {
    pub fn get(&self, level: LegacyLevel) -> &str {
        match level {
            LegacyLevel::Lv50000 => &self.lv50000,
            LegacyLevel::Lv5000 => &self.lv5000,
            LegacyLevel::Lv2500 => &self.lv2500,
            LegacyLevel::Lv1000 => &self.lv1000,
            LegacyLevel::Lv500 => &self.lv500,
        }
    }
}

/// 平面直角座標 `(東西方向 Y, 南北方向 X)` から、その地点を含む図郭のコードを求める。
///
/// 図郭の西端・南端の辺はその図郭に含まれる。図郭の並ぶ範囲の外では `None`。
///
/// ```
/// # use japanese_grids::legacy_grid::{PlaneZone, encode};
/// let zone = PlaneZone::new(9).unwrap();
/// let codes = encode(zone, 0.0, 0.0).unwrap();
/// assert_eq!(codes.lv50000, "09KE");
/// assert_eq!(codes.lv5000, "09KE90");
/// assert_eq!(codes.lv2500, "09KE903");
/// ```
pub fn encode(zone: PlaneZone, easting: f64, northing: f64) -> Option<LegacyCodes> {
    let (x, y) = Scale::UNIT.floor_point(easting, northing)?;
    if !SHEETS.contains_point(x, y) {
        return None;
    }
    let prefix = zone.prefix();

    let (xi, yi) = locate(&SHEETS, LegacyLevel::Lv50000, x, y);
    let sheet = child_rect(&SHEETS, LegacyLevel::Lv50000, xi, yi);
    let lv50000 = format!("{prefix}{}", child_suffix(LegacyLevel::Lv50000, xi, yi));

    let (xi, yi) = locate(&sheet, LegacyLevel::Lv5000, x, y);
    let sheet = child_rect(&sheet, LegacyLevel::Lv5000, xi, yi);
    let lv5000 = format!("{lv50000}{}", child_suffix(LegacyLevel::Lv5000, xi, yi));

    let (half_w, half_h) = LegacyLevel::Lv2500.size();
    let digit = lv2500_digit(x - sheet.x0() >= half_w, y - sheet.y0() >= half_h);
    let lv2500 = format!("{lv5000}{digit}");

    let [lv1000, lv500] = [LegacyLevel::Lv1000, LegacyLevel::Lv500].map(|level| {
        let (xi, yi) = locate(&sheet, level, x, y);
        format!("{lv5000}{}", child_suffix(level, xi, yi))
    });

    Some(LegacyCodes {
        lv50000,
        lv5000,
        lv2500,
        lv1000,
        lv500,
    })
}

/// 復元した図郭
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegacySheet {
    pub zone: PlaneZone,
    pub level: LegacyLevel,
    /// `(Y0, X0, Y1, X1)`（メートル）
    pub bbox: BBox,
}

/// 系番号付きの図郭コードを、系・地図情報レベル・矩形に変換する。
///
/// 文字数と末尾の文字の種類で地図情報レベルを判定する。形式が正しくないコードは `None`。
///
/// ```
/// # use japanese_grids::{BBox, LegacyLevel, legacy_grid::decode};
/// let sheet = decode("09KE").unwrap();
/// assert_eq!(sheet.zone.number(), 9);
/// assert_eq!(sheet.level, LegacyLevel::Lv50000);
/// assert_eq!(sheet.bbox, BBox::new(0.0, 0.0, 40000.0, 30000.0));
/// ```
pub fn decode(code: &str) -> Option<LegacySheet> {
    let code = code.trim();
    let zone: PlaneZone = code.get(..2)?.parse().ok()?;
    let body = code.get(2..)?.to_ascii_uppercase().into_bytes();

    let (level, rect) = decode_body(&body)?;
    Some(LegacySheet {
        zone,
        level,
        bbox: Scale::UNIT.to_real(&rect),
    })
}

fn decode_body(body: &[u8]) -> Option<(LegacyLevel, ScaledBox)> {
    let letter_index = |b: u8, count: u8| (b.is_ascii_uppercase() && b - b'A' < count).then(|| (b - b'A') as i64);
    let digit = |b: u8| b.is_ascii_digit().then(|| (b - b'0') as i64);

    if body.len() < 2 {
        return None;
    }
    let xi = letter_index(body[0], 20)?;
    let yi = letter_index(body[1], 8)?;
    let sheet = child_rect(&SHEETS, LegacyLevel::Lv50000, xi, yi);
    if body.len() == 2 {
        return Some((LegacyLevel::Lv50000, sheet));
    }

    if body.len() < 4 {
        return None;
    }
    let sheet = child_rect(&sheet, LegacyLevel::Lv5000, digit(body[2])?, digit(body[3])?);
    match body.len() {
        4 => Some((LegacyLevel::Lv5000, sheet)),
        5 => {
            let (east, north) = lv2500_quadrant(body[4].checked_sub(b'0')?)?;
            Some((LegacyLevel::Lv2500, sheet.quadrant(east, north)))
        }
        6 => {
            let xi = digit(body[4])?;
            if let Some(yi) = digit(body[5]) {
                Some((LegacyLevel::Lv500, child_rect(&sheet, LegacyLevel::Lv500, xi, yi)))
            } else {
                let yi = letter_index(body[5], 5)?;
                if xi >= 5 {
                    return None;
                }
                Some((LegacyLevel::Lv1000, child_rect(&sheet, LegacyLevel::Lv1000, xi, yi)))
            }
        }
        _ => None,
    }
}
