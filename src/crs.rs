use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// 地域メッシュの出力に割り当てる地理座標系。
///
/// 地域メッシュは経緯度で定義されるので、どの測地系の経緯度として扱うかを選ぶだけで座標値は変わらない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeographicCrs {
    #[default]
    Jgd2011,
    Jgd2000,
    Wgs84,
    Tokyo,
}

impl GeographicCrs {
    pub const ALL: [GeographicCrs; 4] = [
        GeographicCrs::Jgd2011,
        GeographicCrs::Jgd2000,
        GeographicCrs::Wgs84,
        GeographicCrs::Tokyo,
    ];

    pub fn epsg(self) -> u32 {
        match self {
            GeographicCrs::Jgd2011 => 6668,
            GeographicCrs::Jgd2000 => 4612,
            GeographicCrs::Wgs84 => 4326,
            GeographicCrs::Tokyo => 4301,
        }
    }

    /// `jgd2011` などの識別名
    pub fn name(self) -> &'static str {
        match self {
            GeographicCrs::Jgd2011 => "jgd2011",
            GeographicCrs::Jgd2000 => "jgd2000",
            GeographicCrs::Wgs84 => "wgs84",
            GeographicCrs::Tokyo => "tokyo",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GeographicCrs::Jgd2011 => "日本測地系2011 (JGD2011)",
            GeographicCrs::Jgd2000 => "日本測地系2000 (JGD2000)",
            GeographicCrs::Wgs84 => "世界測地系1984 (WGS 84)",
            GeographicCrs::Tokyo => "日本測地系 (Tokyo Datum)",
        }
    }
}

impl FromStr for GeographicCrs {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        GeographicCrs::ALL
            .into_iter()
            .find(|crs| crs.name() == lower || lower == format!("epsg:{}", crs.epsg()))
            .ok_or_else(|| Error::UnknownDatum {
                name: s.to_string(),
            })
    }
}
