use tracing::debug;

use crate::{
    error::Error,
    geometry::{
        bbox::BBox,
        scaled::{Scale, ScaledBox},
    },
    legacy_grid::{
        codec::{SHEETS, child_rect, child_suffix, lv2500_digit},
        level::LegacyLevel,
        plane::PlaneZone,
    },
    level::LevelSet,
    patch::Patch,
    request::EnumerationRequest,
};

struct Node {
    level: LegacyLevel,
    code: String,
    rect: ScaledBox,
}

/// 要求された地図情報レベルの図郭を順に返すイテレータ。
///
/// 地図情報レベル 50000 の図郭を北の行から順に（各行は西から東へ）たどり、深さ優先で子図郭を返す。
/// 地図情報レベル 5000 の図郭の下では 2500、1000、500 の順に出力し、
/// 2500 の象限は `3`(南西) `4`(南東) `1`(北西) `2`(北東) の順になる。
/// 出力するコードには系番号が前に付く。
pub struct LegacyPatches {
    levels: LevelSet<LegacyLevel>,
    extent: Option<BBox>,
    stack: Vec<Node>,
}

impl LegacyPatches {
    /// 検証済みの要求から列挙を始める。範囲は平面直角座標（メートル）で指定する。
    pub fn new(request: &EnumerationRequest<LegacyLevel>, zone: PlaneZone) -> Result<Self, Error> {
        request.validate()?;

        let mut patches = Self {
            levels: request.levels,
            extent: request.extent.map(|e| Scale::UNIT.scale_extent(&e)),
            stack: Vec::new(),
        };
        let root = Node {
            level: LegacyLevel::Lv50000,
            code: zone.prefix(),
            rect: SHEETS,
        };
        let mut sheets = Vec::new();
        patches.push_grid(&root, LegacyLevel::Lv50000, &mut sheets);
        debug!(zone = %zone, sheets = sheets.len(), "start legacy grid enumeration");
        patches.stack.extend(sheets.into_iter().rev());
        Ok(patches)
    }

    fn keep(&self, rect: &ScaledBox) -> bool {
        match &self.extent {
            Some(extent) => rect.intersects(extent),
            None => true,
        }
    }

    /// 北の行から順に、子図郭を `out` に追加する。
    fn push_grid(&self, parent: &Node, level: LegacyLevel, out: &mut Vec<Node>) {
        let (columns, rows) = level.fan_out();
        for xi in 0..rows {
            for yi in 0..columns {
                let rect = child_rect(&parent.rect, level, xi, yi);
                if self.keep(&rect) {
                    out.push(Node {
                        level,
                        code: format!("{}{}", parent.code, child_suffix(level, xi, yi)),
                        rect,
                    });
                }
            }
        }
    }

    fn push_quadrants(&self, parent: &Node, out: &mut Vec<Node>) {
        for (east, north) in [(false, false), (true, false), (false, true), (true, true)] {
            let rect = parent.rect.quadrant(east, north);
            if self.keep(&rect) {
                out.push(Node {
                    level: LegacyLevel::Lv2500,
                    code: format!("{}{}", parent.code, lv2500_digit(east, north)),
                    rect,
                });
            }
        }
    }

    fn expand(&mut self, node: &Node) {
        let mut children = Vec::new();
        match node.level {
            LegacyLevel::Lv50000 => {
                if self.levels.needs(LegacyLevel::Lv5000) {
                    self.push_grid(node, LegacyLevel::Lv5000, &mut children);
                }
            }
            LegacyLevel::Lv5000 => {
                if self.levels.contains(LegacyLevel::Lv2500) {
                    self.push_quadrants(node, &mut children);
                }
                for level in [LegacyLevel::Lv1000, LegacyLevel::Lv500] {
                    if self.levels.contains(level) {
                        self.push_grid(node, level, &mut children);
                    }
                }
            }
            LegacyLevel::Lv2500 | LegacyLevel::Lv1000 | LegacyLevel::Lv500 => {}
        }
        self.stack.extend(children.into_iter().rev());
    }
}

impl Iterator for LegacyPatches {
    type Item = Patch<LegacyLevel>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            self.expand(&node);
            if self.levels.contains(node.level) {
                let bbox = Scale::UNIT.to_real(&node.rect);
                return Some(Patch::new(node.level, node.code, bbox));
            }
        }
        None
    }
}

/// 要求を検証し、指定した系の図郭の列挙を始める。
pub fn patches(
    request: &EnumerationRequest<LegacyLevel>,
    zone: PlaneZone,
) -> Result<LegacyPatches, Error> {
    LegacyPatches::new(request, zone)
}
