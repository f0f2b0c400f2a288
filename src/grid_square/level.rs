use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{error::Error, level::Level};

/// 地域メッシュ (JIS X 0410) の階層。
///
/// 基本の6階層（第1次〜8分の1）はコードの桁数で一意に決まる。
/// 2倍・5倍・100m の各メッシュは基準地域メッシュを束ねたり細分したりして得られる派生階層で、
/// 桁数だけでは基本階層と区別できないため [`crate::grid_square::decode_as`] で明示的に指定して復元する。
///
/// ```
/// # use japanese_grids::GridLevel;
/// assert_eq!(GridLevel::Standard.code_len(), 8);
/// assert_eq!("half".parse::<GridLevel>().unwrap(), GridLevel::Half);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridLevel {
    /// 第1次地域区画（約80km）
    Primary,
    /// 第2次地域区画（約10km）
    Secondary,
    /// 5倍地域メッシュ（約5km）
    Quintuple,
    /// 2倍地域メッシュ（約2km）
    Double,
    /// 基準地域メッシュ・第3次地域区画（約1km）
    Standard,
    /// 2分の1地域メッシュ（約500m）
    Half,
    /// 4分の1地域メッシュ（約250m）
    Quarter,
    /// 8分の1地域メッシュ（約125m）
    Eighth,
    /// 100mメッシュ（基準地域メッシュの10分の1細分）
    HundredMeter,
}

impl GridLevel {
    /// コードの桁数
    pub fn code_len(self) -> usize {
        match self {
            GridLevel::Primary => 4,
            GridLevel::Secondary => 6,
            GridLevel::Quintuple => 7,
            GridLevel::Standard => 8,
            GridLevel::Double | GridLevel::Half => 9,
            GridLevel::Quarter | GridLevel::HundredMeter => 10,
            GridLevel::Eighth => 11,
        }
    }

    /// 桁数から基本階層を求める。派生階層は返さない。
    pub fn from_code_len(len: usize) -> Option<GridLevel> {
        match len {
            4 => Some(GridLevel::Primary),
            6 => Some(GridLevel::Secondary),
            8 => Some(GridLevel::Standard),
            9 => Some(GridLevel::Half),
            10 => Some(GridLevel::Quarter),
            11 => Some(GridLevel::Eighth),
            _ => None,
        }
    }

    /// 親区画あたりの子区画の分割数 `(東西, 南北)`
    pub fn fan_out(self) -> (i64, i64) {
        match self {
            GridLevel::Primary => (1, 1),
            GridLevel::Secondary => (8, 8),
            GridLevel::Quintuple => (2, 2),
            GridLevel::Double => (5, 5),
            GridLevel::Standard => (10, 10),
            GridLevel::Half | GridLevel::Quarter | GridLevel::Eighth => (2, 2),
            GridLevel::HundredMeter => (10, 10),
        }
    }

    /// 第1次地域区画1つあたりに含まれるこの階層の区画数
    pub fn per_primary(self) -> u64 {
        let (x, y) = self.fan_out();
        let own = (x * y) as u64;
        match self.parent() {
            Some(parent) => parent.per_primary() * own,
            None => own,
        }
    }

    /// 日本語の表示名
    pub fn label(self) -> &'static str {
        match self {
            GridLevel::Primary => "第1次地域区画",
            GridLevel::Secondary => "第2次地域区画",
            GridLevel::Quintuple => "5倍地域メッシュ",
            GridLevel::Double => "2倍地域メッシュ",
            GridLevel::Standard => "基準地域メッシュ（第3次地域区画）",
            GridLevel::Half => "2分の1地域メッシュ",
            GridLevel::Quarter => "4分の1地域メッシュ",
            GridLevel::Eighth => "8分の1地域メッシュ",
            GridLevel::HundredMeter => "100mメッシュ",
        }
    }
}

impl Level for GridLevel {
    const ALL: &'static [GridLevel] = &[
        GridLevel::Primary,
        GridLevel::Secondary,
        GridLevel::Quintuple,
        GridLevel::Double,
        GridLevel::Standard,
        GridLevel::Half,
        GridLevel::Quarter,
        GridLevel::Eighth,
        GridLevel::HundredMeter,
    ];

    fn index(self) -> usize {
        self as usize
    }

    fn parent(self) -> Option<GridLevel> {
        match self {
            GridLevel::Primary => None,
            GridLevel::Secondary => Some(GridLevel::Primary),
            GridLevel::Quintuple | GridLevel::Double | GridLevel::Standard => {
                Some(GridLevel::Secondary)
            }
            GridLevel::Half | GridLevel::HundredMeter => Some(GridLevel::Standard),
            GridLevel::Quarter => Some(GridLevel::Half),
            GridLevel::Eighth => Some(GridLevel::Quarter),
        }
    }

    //2分の1より細かい階層は範囲指定なしでは数千万区画になる
    fn requires_extent(self) -> bool {
        matches!(
            self,
            GridLevel::Quarter | GridLevel::Eighth | GridLevel::HundredMeter
        )
    }

    fn tag(self) -> &'static str {
        match self {
            GridLevel::Primary => "primary",
            GridLevel::Secondary => "secondary",
            GridLevel::Quintuple => "quintuple",
            GridLevel::Double => "double",
            GridLevel::Standard => "standard",
            GridLevel::Half => "half",
            GridLevel::Quarter => "quarter",
            GridLevel::Eighth => "eighth",
            GridLevel::HundredMeter => "hundred_meter",
        }
    }
}

impl fmt::Display for GridLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for GridLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GridLevel::ALL
            .iter()
            .copied()
            .find(|l| l.tag() == s)
            .ok_or_else(|| Error::UnknownLevel {
                name: s.to_string(),
            })
    }
}
