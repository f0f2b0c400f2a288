use serde::{Deserialize, Serialize};

use crate::{
    error::Error,
    geometry::bbox::BBox,
    level::{Level, LevelSet},
};

/// 区画の列挙要求。生成する階層の集合と、任意の抽出範囲からなる。
///
/// 抽出範囲は地域メッシュでは経緯度、国土基本図図郭では平面直角座標（メートル）で指定する。
///
/// ```
/// # use japanese_grids::{BBox, EnumerationRequest, Error, GridLevel};
/// let request = EnumerationRequest::new([GridLevel::Eighth], None);
/// assert_eq!(
///     request.validate(),
///     Err(Error::ExtentRequired { levels: vec!["eighth".into()] })
/// );
///
/// let request = EnumerationRequest::new(
///     [GridLevel::Eighth],
///     Some(BBox::new(139.7, 35.6, 139.8, 35.7)),
/// );
/// assert!(request.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumerationRequest<L: Level> {
    #[serde(default)]
    pub extent: Option<BBox>,
    pub levels: LevelSet<L>,
}

impl<L: Level> EnumerationRequest<L> {
    pub fn new(levels: impl IntoIterator<Item = L>, extent: Option<BBox>) -> Self {
        Self {
            extent,
            levels: levels.into_iter().collect(),
        }
    }

    /// 列挙を始める前に要求を検証する。
    ///
    /// # バリデーション
    /// - 階層が1つも指定されていない場合、[`Error::NoLevelSelected`] を返します。
    /// - 範囲の指定が必須な階層があるのに範囲が無い場合、[`Error::ExtentRequired`] を返します。
    pub fn validate(&self) -> Result<(), Error> {
        if self.levels.is_empty() {
            return Err(Error::NoLevelSelected);
        }
        if self.extent.is_none() {
            let required = self.levels.extent_required();
            if !required.is_empty() {
                return Err(Error::ExtentRequired {
                    levels: required.iter().map(|l| l.tag().to_string()).collect(),
                });
            }
        }
        Ok(())
    }
}
