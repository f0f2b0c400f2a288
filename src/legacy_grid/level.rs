use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{error::Error, level::Level};

/// 国土基本図図郭の地図情報レベル。
///
/// 地図情報レベル 5000 の図郭を親として、2500・1000・500 はそれぞれ独立に分割する（互いに親子ではない）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegacyLevel {
    /// 30km × 40km
    Lv50000,
    /// 3km × 4km
    Lv5000,
    /// 1.5km × 2km
    Lv2500,
    /// 600m × 800m
    Lv1000,
    /// 300m × 400m
    Lv500,
}

impl LegacyLevel {
    /// 系番号を除いたコードの文字数
    pub fn code_len(self) -> usize {
        match self {
            LegacyLevel::Lv50000 => 2,
            LegacyLevel::Lv5000 => 4,
            LegacyLevel::Lv2500 => 5,
            LegacyLevel::Lv1000 | LegacyLevel::Lv500 => 6,
        }
    }

    /// 図郭の大きさ `(東西, 南北)`（メートル）
    pub fn size(self) -> (i64, i64) {
        match self {
            LegacyLevel::Lv50000 => (40_000, 30_000),
            LegacyLevel::Lv5000 => (4_000, 3_000),
            LegacyLevel::Lv2500 => (2_000, 1_500),
            LegacyLevel::Lv1000 => (800, 600),
            LegacyLevel::Lv500 => (400, 300),
        }
    }

    /// 親図郭あたりの分割数 `(東西, 南北)`。地図情報レベル 50000 は全体の行列数。
    pub fn fan_out(self) -> (i64, i64) {
        match self {
            LegacyLevel::Lv50000 => (8, 20),
            LegacyLevel::Lv5000 => (10, 10),
            LegacyLevel::Lv2500 => (2, 2),
            LegacyLevel::Lv1000 => (5, 5),
            LegacyLevel::Lv500 => (10, 10),
        }
    }

    /// 地図情報レベル 50000 の図郭1つあたりに含まれるこの階層の図郭数
    pub fn per_sheet(self) -> u64 {
        match self.parent() {
            Some(parent) => {
                let (x, y) = self.fan_out();
                parent.per_sheet() * (x * y) as u64
            }
            None => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LegacyLevel::Lv50000 => "地図情報レベル 50000",
            LegacyLevel::Lv5000 => "地図情報レベル 5000",
            LegacyLevel::Lv2500 => "地図情報レベル 2500",
            LegacyLevel::Lv1000 => "地図情報レベル 1000",
            LegacyLevel::Lv500 => "地図情報レベル 500",
        }
    }
}

impl Level for LegacyLevel {
    const ALL: &'static [LegacyLevel] = &[
        LegacyLevel::Lv50000,
        LegacyLevel::Lv5000,
        LegacyLevel::Lv2500,
        LegacyLevel::Lv1000,
        LegacyLevel::Lv500,
    ];

    fn index(self) -> usize {
        self as usize
    }

    fn parent(self) -> Option<LegacyLevel> {
        match self {
            LegacyLevel::Lv50000 => None,
            LegacyLevel::Lv5000 => Some(LegacyLevel::Lv50000),
            LegacyLevel::Lv2500 | LegacyLevel::Lv1000 | LegacyLevel::Lv500 => {
                Some(LegacyLevel::Lv5000)
            }
        }
    }

    fn requires_extent(self) -> bool {
        matches!(self, LegacyLevel::Lv1000 | LegacyLevel::Lv500)
    }

    fn tag(self) -> &'static str {
        match self {
            LegacyLevel::Lv50000 => "lv50000",
            LegacyLevel::Lv5000 => "lv5000",
            LegacyLevel::Lv2500 => "lv2500",
            LegacyLevel::Lv1000 => "lv1000",
            LegacyLevel::Lv500 => "lv500",
        }
    }
}

impl fmt::Display for LegacyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for LegacyLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LegacyLevel::ALL
            .iter()
            .copied()
            .find(|l| l.tag() == s)
            .ok_or_else(|| Error::UnknownLevel {
                name: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_sheet_counts() {
        assert_eq!(LegacyLevel::Lv50000.per_sheet(), 1);
        assert_eq!(LegacyLevel::Lv5000.per_sheet(), 100);
        assert_eq!(LegacyLevel::Lv2500.per_sheet(), 400);
        assert_eq!(LegacyLevel::Lv1000.per_sheet(), 2500);
        assert_eq!(LegacyLevel::Lv500.per_sheet(), 10000);
    }

    #[test]
    fn children_tile_their_parent() {
        for level in LegacyLevel::ALL {
            if let Some(parent) = level.parent() {
                let (w, h) = level.size();
                let (fx, fy) = level.fan_out();
                assert_eq!((w * fx, h * fy), parent.size(), "{level}");
            }
        }
    }

    #[test]
    fn parse_tags() {
        assert_eq!("lv2500".parse::<LegacyLevel>(), Ok(LegacyLevel::Lv2500));
        assert!("primary".parse::<LegacyLevel>().is_err());
    }
}
