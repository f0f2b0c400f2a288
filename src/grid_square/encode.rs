use std::fmt;

#[cfg(any(test, feature = "random"))]
use rand::Rng;
use serde::Serialize;

#[cfg(any(test, feature = "random"))]
use crate::grid_square::constants::PRIMARY_CODES;
use crate::grid_square::{
    constants::{LNG_OFFSET, PRIMARY_EDGE, SCALE, edge, is_available_primary},
    decode::quadrant_digit,
    level::GridLevel,
};

/// ある地点を含む、すべての階層の地域メッシュコード。
///
/// 各コードは一つ上の階層のコードを接頭辞として持つ（2倍・5倍は第2次地域区画、100m は基準地域メッシュが接頭辞）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridSquareCodes {
    pub primary: String,
    pub secondary: String,
    pub quintuple: String,
    pub double: String,
    pub standard: String,
    pub half: String,
    pub quarter: String,
    pub eighth: String,
    pub hundred_meter: String,
}

impl GridSquareCodes {
    /// 指定した階層のコードを返す。
    pub fn get(&self, level: GridLevel) -> &str {
        match level {
            GridLevel::Primary => &self.primary,
            GridLevel::Secondary => &self.secondary,
            GridLevel::Quintuple => &self.quintuple,
            GridLevel::Double => &self.double,
            GridLevel::Standard => &self.standard,
            GridLevel::Half => &self.half,
            GridLevel::Quarter => &self.quarter,
            GridLevel::Eighth => &self.eighth,
            GridLevel::HundredMeter => &self.hundred_meter,
        }
    }

    /// 8分の1地域メッシュのコードを `5339-4611-1-2-3` の形式で返す。
    ///
    /// 桁の足りないコードは、揃っている区切りまでを返す。
    pub fn hyphenated(&self) -> String {
        [0..4, 4..8, 8..9, 9..10, 10..11]
            .into_iter()
            .map_while(|range| self.eighth.get(range))
            .collect::<Vec<_>>()
            .join("-")
    }
}

impl fmt::Display for GridSquareCodes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hyphenated())
    }
}

/// 経緯度から、その地点を含む地域メッシュコードを求める。
///
/// 区画の西端・南端の辺はその区画に含まれ、東端・北端の辺は隣の区画に含まれる。
/// 日本をカバーする第1次地域区画の外にある地点は `None` を返す。
///
/// ```
/// # use japanese_grids::grid_square::encode;
/// let codes = encode(139.7671, 35.6812).unwrap();
/// assert_eq!(codes.primary, "5339");
/// assert_eq!(codes.standard, "53394611");
/// assert!(codes.eighth.starts_with(&codes.half));
///
/// assert!(encode(0.0, 0.0).is_none());
/// ```
pub fn encode(lng: f64, lat: f64) -> Option<GridSquareCodes> {
    let (x, y) = SCALE.floor_point(lng, lat)?;

    let lat_index = y.div_euclid(PRIMARY_EDGE);
    let lng_index = x.div_euclid(PRIMARY_EDGE) - LNG_OFFSET;
    if !(0..100).contains(&lat_index) || !(0..100).contains(&lng_index) {
        return None;
    }
    if !is_available_primary((lat_index * 100 + lng_index) as u16) {
        return None;
    }

    //第1次地域区画内での位置
    let rx = x.rem_euclid(PRIMARY_EDGE);
    let ry = y.rem_euclid(PRIMARY_EDGE);

    let primary = format!("{lat_index:02}{lng_index:02}");

    let secondary_edge = edge(GridLevel::Secondary);
    let secondary = format!(
        "{primary}{}{}",
        ry / secondary_edge,
        rx / secondary_edge
    );
    let (rx, ry) = (rx % secondary_edge, ry % secondary_edge);

    let quintuple_edge = edge(GridLevel::Quintuple);
    let quintuple = format!(
        "{secondary}{}",
        quadrant_digit(rx >= quintuple_edge, ry >= quintuple_edge)
    );

    //2倍地域メッシュの番号は偶数で表す
    let double_edge = edge(GridLevel::Double);
    let double = format!(
        "{secondary}{}{}5",
        (ry / double_edge) * 2,
        (rx / double_edge) * 2
    );

    let standard_edge = edge(GridLevel::Standard);
    let standard = format!(
        "{secondary}{}{}",
        ry / standard_edge,
        rx / standard_edge
    );
    let (rx, ry) = (rx % standard_edge, ry % standard_edge);

    let hundred_edge = edge(GridLevel::HundredMeter);
    let hundred_meter = format!("{standard}{}{}", ry / hundred_edge, rx / hundred_edge);

    let mut codes = [standard.clone(), String::new(), String::new(), String::new()];
    let (mut rx, mut ry) = (rx, ry);
    for (i, level) in [GridLevel::Half, GridLevel::Quarter, GridLevel::Eighth]
        .into_iter()
        .enumerate()
    {
        let half_edge = edge(level);
        let digit = quadrant_digit(rx >= half_edge, ry >= half_edge);
        codes[i + 1] = format!("{}{digit}", codes[i]);
        rx %= half_edge;
        ry %= half_edge;
    }
    let [_, half, quarter, eighth] = codes;

    Some(GridSquareCodes {
        primary,
        secondary,
        quintuple,
        double,
        standard,
        half,
        quarter,
        eighth,
        hundred_meter,
    })
}

/// 日本をカバーする第1次地域区画のいずれかに含まれる、ランダムな経緯度 `(経度, 緯度)` を返す。
#[cfg(any(test, feature = "random"))]
pub fn random_point_using<R: Rng + ?Sized>(rng: &mut R) -> (f64, f64) {
    let code = PRIMARY_CODES[rng.random_range(0..PRIMARY_CODES.len())];
    let lat0 = (code / 100) as f64 / 1.5;
    let lng0 = (code % 100) as f64 + LNG_OFFSET as f64;
    (
        lng0 + rng.random_range(0.0..1.0),
        lat0 + rng.random_range(0.0..1.0) / 1.5,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid_square::{decode, decode_as};
    use crate::level::Level;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn tokyo_station() {
        let codes = encode(139.7671, 35.6812).unwrap();
        assert_eq!(codes.primary, "5339");
        assert_eq!(codes.secondary, "533946");
        assert_eq!(codes.standard, "53394611");
        assert_eq!(codes.half.len(), 9);
        assert_eq!(codes.eighth.len(), 11);
        assert_eq!(codes.double, "533946005");
        assert_eq!(codes.quintuple, "5339461");
    }

    #[test]
    fn hyphenated_form() {
        let codes = encode(139.7671, 35.6812).unwrap();
        let h = codes.hyphenated();
        assert_eq!(h.len(), 15);
        assert_eq!(h.replace('-', ""), codes.eighth);
        assert!(h.starts_with("5339-4611-"));
    }

    #[test]
    fn hyphenated_form_of_short_code() {
        let mut codes = encode(139.7671, 35.6812).unwrap();
        codes.eighth = "5339461".into();
        assert_eq!(codes.hyphenated(), "5339");
        codes.eighth = String::new();
        assert_eq!(codes.hyphenated(), "");
        assert_eq!(codes.to_string(), "");
    }

    #[test]
    fn point_near_south_west_corner_belongs_to_tile() {
        let b = decode("53394611").unwrap();
        let codes = encode(b.min_x() + 1e-9, b.min_y() + 1e-9).unwrap();
        assert_eq!(codes.standard, "53394611");
        assert_eq!(codes.eighth, "53394611111");
    }

    #[test]
    fn outside_japan_is_not_found() {
        assert!(encode(-74.0, 40.7).is_none());
        assert!(encode(f64::NAN, 35.0).is_none());
        //3630 は海域のみで対象外
        assert!(encode(130.5, 24.1).is_none());
    }

    #[test]
    fn every_primary_round_trips_through_its_center() {
        for code in PRIMARY_CODES {
            let code = code.to_string();
            let (lng, lat) = decode(&code).unwrap().center();
            let codes = encode(lng, lat).unwrap();
            assert_eq!(codes.primary, code);
        }
    }

    #[test]
    fn random_points_lie_in_all_their_tiles() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..200 {
            let (lng, lat) = random_point_using(&mut rng);
            let codes = encode(lng, lat).unwrap();
            for level in GridLevel::ALL {
                let b = decode_as(codes.get(*level), *level).unwrap();
                assert!(b.contains(lng, lat), "{level} {} {b}", codes.get(*level));
            }
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]
        #[test]
        fn codes_extend_their_parent(lng in 122.0f64..154.0, lat in 20.0f64..46.0) {
            if let Some(codes) = encode(lng, lat) {
                for level in GridLevel::ALL {
                    if let Some(parent) = level.parent() {
                        prop_assert!(codes.get(*level).starts_with(codes.get(parent)));
                    }
                }
                let eighth = decode(&codes.eighth).unwrap();
                prop_assert!(eighth.contains(lng, lat));
            }
        }
    }
}
