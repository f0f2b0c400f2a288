use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// 平面直角座標系の測地系
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Datum {
    /// 日本測地系2011
    #[default]
    Jgd2011,
    /// 日本測地系2000
    Jgd2000,
    /// 日本測地系（旧日本測地系）
    Tokyo,
}

impl Datum {
    pub fn label(self) -> &'static str {
        match self {
            Datum::Jgd2011 => "日本測地系2011 (JGD2011)",
            Datum::Jgd2000 => "日本測地系2000 (JGD2000)",
            Datum::Tokyo => "日本測地系 (Tokyo Datum)",
        }
    }
}

impl FromStr for Datum {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jgd2011" => Ok(Datum::Jgd2011),
            "jgd2000" => Ok(Datum::Jgd2000),
            "tokyo" => Ok(Datum::Tokyo),
            _ => Err(Error::UnknownDatum {
                name: s.to_string(),
            }),
        }
    }
}

//各系の対象地域
const ZONE_LABELS: [&str; 19] = [
    "I (1) 系: 長崎, 鹿児島県の一部",
    "II (2) 系: 福岡, 佐賀, 熊本, 大分, 宮崎, 鹿児島県の一部",
    "III (3) 系: 山口, 島根, 広島",
    "IV (4) 系: 香川, 愛媛, 徳島, 高知",
    "V (5) 系: 兵庫, 鳥取, 岡山",
    "VI (6) 系: 京都, 大阪, 福井, 滋賀, 三重, 奈良 和歌山",
    "VII (7) 系: 石川, 富山, 岐阜, 愛知",
    "VIII (8) 系: 新潟, 長野, 山梨, 静岡",
    "IX (9) 系: 東京都 (小笠原村を除く), 福島, 栃木, 茨城, 埼玉, 千葉, 群馬, 神奈川",
    "X (10) 系: 青森, 秋田, 山形, 岩手, 宮城",
    "XI (11) 系: 北海道 西部",
    "XII (12) 系: 北海道 中央部",
    "XIII (13) 系: 北海道 東部",
    "XIV (14) 系: 東京都の一部 (聟島列島, 父島列島, 母島列島, 硫黄島)",
    "XV (15) 系: 沖縄県 中央部",
    "XVI (16) 系: 沖縄県 西部",
    "XVII (17) 系: 沖縄県 東部",
    "XVIII (18) 系: 東京都の一部 (沖ノ鳥島)",
    "XIX (19) 系: 東京都の一部 (南鳥島)",
];

/// 平面直角座標系の系（I〜XIX）。内部では系番号 1〜19 を保持する。
///
/// ```
/// # use japanese_grids::legacy_grid::{Datum, PlaneZone};
/// let zone: PlaneZone = "9".parse().unwrap();
/// assert_eq!(zone.prefix(), "09");
/// assert_eq!(zone.epsg(Datum::Jgd2011), 6677);
/// assert_eq!(zone.epsg(Datum::Tokyo), 30169);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct PlaneZone(u8);

impl PlaneZone {
    pub const COUNT: u8 = 19;

    pub fn new(number: u8) -> Result<PlaneZone, Error> {
        if (1..=Self::COUNT).contains(&number) {
            Ok(PlaneZone(number))
        } else {
            Err(Error::UnknownZone {
                zone: number.to_string(),
            })
        }
    }

    /// すべての系を番号順に返す。
    pub fn all() -> impl Iterator<Item = PlaneZone> {
        (1..=Self::COUNT).map(PlaneZone)
    }

    pub fn number(self) -> u8 {
        self.0
    }

    /// 図郭コードの先頭に付ける2桁の系番号
    pub fn prefix(self) -> String {
        format!("{:02}", self.0)
    }

    pub fn label(self) -> &'static str {
        ZONE_LABELS[(self.0 - 1) as usize]
    }

    /// 測地系ごとの EPSG コード
    pub fn epsg(self, datum: Datum) -> u32 {
        let offset = (self.0 - 1) as u32;
        match datum {
            Datum::Jgd2011 => 6669 + offset,
            Datum::Jgd2000 => 2443 + offset,
            Datum::Tokyo => 30161 + offset,
        }
    }
}

impl fmt::Display for PlaneZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.prefix())
    }
}

impl TryFrom<u8> for PlaneZone {
    type Error = Error;

    fn try_from(number: u8) -> Result<Self, Self::Error> {
        PlaneZone::new(number)
    }
}

impl From<PlaneZone> for u8 {
    fn from(zone: PlaneZone) -> u8 {
        zone.0
    }
}

impl FromStr for PlaneZone {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u8>()
            .map_err(|_| Error::UnknownZone {
                zone: s.to_string(),
            })
            .and_then(PlaneZone::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zone_range() {
        assert!(PlaneZone::new(0).is_err());
        assert!(PlaneZone::new(20).is_err());
        assert_eq!(PlaneZone::all().count(), 19);
        assert_eq!("01".parse::<PlaneZone>().unwrap().number(), 1);
        assert_eq!(
            "x".parse::<PlaneZone>(),
            Err(Error::UnknownZone { zone: "x".into() })
        );
    }

    #[test]
    fn epsg_codes_of_last_zone() {
        let zone = PlaneZone::new(19).unwrap();
        assert_eq!(zone.epsg(Datum::Jgd2011), 6687);
        assert_eq!(zone.epsg(Datum::Jgd2000), 2461);
        assert_eq!(zone.epsg(Datum::Tokyo), 30179);
        assert!(zone.label().starts_with("XIX (19)"));
    }

    #[test]
    fn datum_parsing() {
        assert_eq!("JGD2000".parse::<Datum>(), Ok(Datum::Jgd2000));
        assert!("wgs84".parse::<Datum>().is_err());
    }

    #[test]
    fn zone_serializes_as_number() {
        #[derive(Debug, PartialEq, Deserialize)]
        struct Wrapper {
            zone: PlaneZone,
            datum: Datum,
        }
        let w: Wrapper = toml::from_str("zone = 9\ndatum = \"tokyo\"").unwrap();
        assert_eq!(w.zone.number(), 9);
        assert_eq!(w.datum, Datum::Tokyo);
        assert!(toml::from_str::<Wrapper>("zone = 20\ndatum = \"tokyo\"").is_err());
    }
}
