use crate::{
    geometry::{bbox::BBox, scaled::ScaledBox},
    grid_square::{
        constants::{LNG_OFFSET, PRIMARY_EDGE, SCALE},
        level::GridLevel,
    },
};

/// 地域メッシュコードを経緯度の矩形 `(経度0, 緯度0, 経度1, 緯度1)` に変換する。
///
/// 数字以外の文字（区切りのハイフンなど）は取り除いてから解釈し、桁数で階層を判定する。
/// 有効な桁数は 4, 6, 8, 9, 10, 11 で、それぞれ第1次地域区画〜8分の1地域メッシュに対応する。
/// 2分の1以下の階層では末尾の1桁が `1`(南西) `2`(南東) `3`(北西) `4`(北東) のいずれかでなければならない。
///
/// 形式が正しくないコードは `None` を返す。日本の区画として実在するかは検証しない。
///
/// ```
/// # use japanese_grids::grid_square::decode;
/// let b = decode("53394611").unwrap();
/// assert!((b.min_x() - 139.7625).abs() < 1e-9);
/// assert!((b.min_y() - 35.675).abs() < 1e-9);
/// assert!((b.width() - 0.0125).abs() < 1e-9);
///
/// assert!(decode("5339-46-11").is_some());
/// assert!(decode("5339461").is_none());
/// assert!(decode("533946115").is_none());
/// ```
pub fn decode(code: &str) -> Option<BBox> {
    let digits = digits_of(code);
    let level = GridLevel::from_code_len(digits.len())?;
    decode_digits(&digits, level).map(|b| SCALE.to_real(&b))
}

/// 階層を指定して地域メッシュコードを矩形に変換する。
///
/// 派生階層（2倍・5倍・100m）のコードは基本階層と桁数が重なるため、この関数で階層を明示して復元する。
///
/// * 5倍地域メッシュ: 第2次地域区画コード + 象限 `1`〜`4`（7桁）
/// * 2倍地域メッシュ: 第2次地域区画コード + 偶数の緯度方向番号 + 偶数の経度方向番号 + `5`（9桁）
/// * 100mメッシュ: 基準地域メッシュコード + 緯度方向番号 + 経度方向番号（10桁）
///
/// ```
/// # use japanese_grids::{GridLevel, grid_square::decode_as};
/// let b = decode_as("533946225", GridLevel::Double).unwrap();
/// assert!((b.width() - 0.025).abs() < 1e-9);
/// assert!(decode_as("533946215", GridLevel::Double).is_none());
/// ```
pub fn decode_as(code: &str, level: GridLevel) -> Option<BBox> {
    let digits = digits_of(code);
    if digits.len() != level.code_len() {
        return None;
    }
    decode_digits(&digits, level).map(|b| SCALE.to_real(&b))
}

/// 桁数から基本階層を判定する。派生階層は判定しない。
pub fn level_of(code: &str) -> Option<GridLevel> {
    GridLevel::from_code_len(digits_of(code).len())
}

/// 数字だけを取り出し、各桁の値の列にする。
fn digits_of(code: &str) -> Vec<u8> {
    code.chars()
        .filter_map(|c| c.to_digit(10))
        .map(|d| d as u8)
        .collect()
}

/// 象限番号を `(東側か, 北側か)` に変換する。
pub(crate) fn quadrant_of(digit: u8) -> Option<(bool, bool)> {
    match digit {
        1 => Some((false, false)),
        2 => Some((true, false)),
        3 => Some((false, true)),
        4 => Some((true, true)),
        _ => None,
    }
}

/// `(東側か, 北側か)` を象限番号に変換する。
pub(crate) fn quadrant_digit(east: bool, north: bool) -> u8 {
    1 + east as u8 + 2 * north as u8
}

/// 桁の列を内部座標の矩形に変換する。桁数は呼び出し側で検証済みであること。
pub(crate) fn decode_digits(d: &[u8], level: GridLevel) -> Option<ScaledBox> {
    let lat = (d[0] * 10 + d[1]) as i64;
    let lng = (d[2] * 10 + d[3]) as i64 + LNG_OFFSET;
    let primary = ScaledBox::from_origin(
        lng * PRIMARY_EDGE,
        lat * PRIMARY_EDGE,
        PRIMARY_EDGE,
        PRIMARY_EDGE,
    );
    if level == GridLevel::Primary {
        return Some(primary);
    }

    if d[4] > 7 || d[5] > 7 {
        return None;
    }
    let secondary = primary.cell(8, 8, d[5] as i64, d[4] as i64);

    match level {
        GridLevel::Secondary => return Some(secondary),
        GridLevel::Quintuple => {
            let (east, north) = quadrant_of(d[6])?;
            return Some(secondary.quadrant(east, north));
        }
        GridLevel::Double => {
            if d[6] % 2 != 0 || d[7] % 2 != 0 || d[8] != 5 {
                return None;
            }
            return Some(secondary.cell(5, 5, (d[7] / 2) as i64, (d[6] / 2) as i64));
        }
        _ => {}
    }

    let standard = secondary.cell(10, 10, d[7] as i64, d[6] as i64);
    match level {
        GridLevel::Standard => return Some(standard),
        GridLevel::HundredMeter => {
            return Some(standard.cell(10, 10, d[9] as i64, d[8] as i64));
        }
        _ => {}
    }

    //2分の1・4分の1・8分の1は象限の桁を順に適用する
    let depth = level.code_len() - GridLevel::Standard.code_len();
    let mut current = standard;
    for &digit in &d[8..8 + depth] {
        let (east, north) = quadrant_of(digit)?;
        current = current.quadrant(east, north);
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: BBox, expected: (f64, f64, f64, f64)) {
        let (a, b, c, d) = actual.as_tuple();
        let (e, f, g, h) = expected;
        for (x, y) in [(a, e), (b, f), (c, g), (d, h)] {
            assert!((x - y).abs() < 1e-9, "{actual} != {expected:?}");
        }
    }

    #[test]
    fn decode_primary() {
        let b = decode("5339").unwrap();
        assert_close(b, (139.0, 35.333333333333, 140.0, 36.0));
    }

    #[test]
    fn decode_secondary() {
        let b = decode("533946").unwrap();
        assert_close(b, (139.75, 35.666666666666, 139.875, 35.75));
    }

    #[test]
    fn decode_standard_extent() {
        let b = decode("36302700").unwrap();
        assert!((b.width() - 0.0125).abs() < 1e-12);
        assert!((b.height() - 0.0125 / 1.5).abs() < 1e-12);
        let lat0 = 24.0 + 2.0 / 12.0;
        assert_close(b, (130.875, lat0, 130.8875, lat0 + 0.0125 / 1.5));
    }

    #[test]
    fn decode_quadrants() {
        let standard = decode("53394611").unwrap();
        let (w, s, e, n) = standard.as_tuple();
        let (mx, my) = standard.center();

        assert_close(decode("533946111").unwrap(), (w, s, mx, my));
        assert_close(decode("533946112").unwrap(), (mx, s, e, my));
        assert_close(decode("533946113").unwrap(), (w, my, mx, n));
        assert_close(decode("533946114").unwrap(), (mx, my, e, n));

        let eighth = decode("53394611444").unwrap();
        assert!((eighth.width() - 0.0125 / 8.0).abs() < 1e-12);
        assert!((eighth.max_x() - e).abs() < 1e-9);
        assert!((eighth.max_y() - n).abs() < 1e-9);
    }

    #[test]
    fn malformed_codes_are_not_found() {
        assert!(decode("").is_none());
        assert!(decode("533").is_none());
        assert!(decode("53394").is_none());
        assert!(decode("533986").is_none()); // 第2次の番号は 0-7
        assert!(decode("533946110").is_none());
        assert!(decode("5339461115").is_none());
        assert!(decode("533946111234").is_none());
    }

    #[test]
    fn non_digits_are_stripped() {
        assert_eq!(decode("5339-4611-1-2-3"), decode("53394611123"));
        assert_eq!(decode("M5339"), decode("5339"));
    }

    #[test]
    fn composite_levels() {
        let secondary = decode("533946").unwrap();

        let q = decode_as("5339464", GridLevel::Quintuple).unwrap();
        assert_close(
            q,
            (
                secondary.center().0,
                secondary.center().1,
                secondary.max_x(),
                secondary.max_y(),
            ),
        );
        assert!(decode_as("5339465", GridLevel::Quintuple).is_none());

        let d = decode_as("533946005", GridLevel::Double).unwrap();
        let s1 = decode("53394600").unwrap();
        let s2 = decode("53394611").unwrap();
        assert_close(d, (s1.min_x(), s1.min_y(), s2.max_x(), s2.max_y()));

        let h = decode_as("5339461199", GridLevel::HundredMeter).unwrap();
        let standard = decode("53394611").unwrap();
        assert!((h.max_x() - standard.max_x()).abs() < 1e-9);
        assert!((h.width() - 0.00125).abs() < 1e-12);

        assert!(decode_as("53394611", GridLevel::HundredMeter).is_none());
    }

    #[test]
    fn level_of_base_codes() {
        assert_eq!(level_of("5339"), Some(GridLevel::Primary));
        assert_eq!(level_of("5339-46-11-4"), Some(GridLevel::Half));
        assert_eq!(level_of("5339461"), None);
    }
}
