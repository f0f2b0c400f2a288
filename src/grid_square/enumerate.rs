use tracing::debug;

use crate::{
    error::Error,
    geometry::{bbox::BBox, scaled::ScaledBox},
    grid_square::{
        constants::{PRIMARY_CODES, SCALE, primary_rect},
        decode::{quadrant_digit, quadrant_of},
        level::GridLevel,
    },
    level::LevelSet,
    patch::Patch,
    request::EnumerationRequest,
};

/// 展開待ちの区画
struct Node {
    level: GridLevel,
    code: String,
    rect: ScaledBox,
}

/// 要求された階層の地域メッシュを順に返すイテレータ。
///
/// 第1次地域区画から深さ優先でたどり、親区画は必ずその子区画より先に返す。
/// 兄弟区画は南の行から北へ、各行は西から東へ、象限は `1` `2` `3` `4` の順に並ぶ。
/// 範囲が指定されている場合、範囲と交わらない区画はどの階層でも出力も展開もしない。
///
/// 明示的なスタックで走査するので、取り出すのをやめればいつでも中断できる。
pub struct GridSquarePatches {
    levels: LevelSet<GridLevel>,
    extent: Option<BBox>,
    stack: Vec<Node>,
}

impl GridSquarePatches {
    /// 検証済みの要求から列挙を始める。
    pub fn new(request: &EnumerationRequest<GridLevel>) -> Result<Self, Error> {
        request.validate()?;
        Ok(Self::unchecked(request.levels, request.extent))
    }

    fn unchecked(levels: LevelSet<GridLevel>, extent: Option<BBox>) -> Self {
        let mut patches = Self {
            levels,
            extent: extent.map(|e| SCALE.scale_extent(&e)),
            stack: Vec::new(),
        };

        if levels.needs(GridLevel::Primary) {
            let primaries: Vec<Node> = PRIMARY_CODES
                .iter()
                .map(|&code| Node {
                    level: GridLevel::Primary,
                    code: format!("{code:04}"),
                    rect: primary_rect(code),
                })
                .filter(|node| patches.keep(&node.rect))
                .collect();
            debug!(primaries = primaries.len(), "start grid square enumeration");
            patches.stack.extend(primaries.into_iter().rev());
        }
        patches
    }

    fn keep(&self, rect: &ScaledBox) -> bool {
        match &self.extent {
            Some(extent) => rect.intersects(extent),
            None => true,
        }
    }

    /// `rows × columns` に等分した子区画を、コードを付けて `out` に追加する。
    fn push_grid(
        &self,
        parent: &Node,
        level: GridLevel,
        code: impl Fn(i64, i64) -> String,
        out: &mut Vec<Node>,
    ) {
        let (columns, rows) = level.fan_out();
        for row in 0..rows {
            for column in 0..columns {
                let rect = parent.rect.cell(columns, rows, column, row);
                if self.keep(&rect) {
                    out.push(Node {
                        level,
                        code: code(row, column),
                        rect,
                    });
                }
            }
        }
    }

    /// 4つの象限に分けた子区画を `out` に追加する。
    fn push_quadrants(&self, parent: &Node, level: GridLevel, out: &mut Vec<Node>) {
        for digit in 1..=4 {
            let Some((east, north)) = quadrant_of(digit) else {
                continue;
            };
            let rect = parent.rect.quadrant(east, north);
            if self.keep(&rect) {
                out.push(Node {
                    level,
                    code: format!("{}{}", parent.code, quadrant_digit(east, north)),
                    rect,
                });
            }
        }
    }

    /// 子区画を出力したい順に並べ、逆順にスタックへ積む。
    fn expand(&mut self, node: &Node) {
        let mut children = Vec::new();
        let p = &node.code;
        match node.level {
            GridLevel::Primary => {
                if self.levels.needs(GridLevel::Secondary) {
                    self.push_grid(
                        node,
                        GridLevel::Secondary,
                        |r, c| format!("{p}{r}{c}"),
                        &mut children,
                    );
                }
            }
            GridLevel::Secondary => {
                if self.levels.needs(GridLevel::Quintuple) {
                    self.push_quadrants(node, GridLevel::Quintuple, &mut children);
                }
                if self.levels.needs(GridLevel::Double) {
                    self.push_grid(
                        node,
                        GridLevel::Double,
                        |r, c| format!("{p}{}{}5", r * 2, c * 2),
                        &mut children,
                    );
                }
                if self.levels.needs(GridLevel::Standard) {
                    self.push_grid(
                        node,
                        GridLevel::Standard,
                        |r, c| format!("{p}{r}{c}"),
                        &mut children,
                    );
                }
            }
            GridLevel::Standard => {
                if self.levels.needs(GridLevel::Half) {
                    self.push_quadrants(node, GridLevel::Half, &mut children);
                }
                if self.levels.needs(GridLevel::HundredMeter) {
                    self.push_grid(
                        node,
                        GridLevel::HundredMeter,
                        |r, c| format!("{p}{r}{c}"),
                        &mut children,
                    );
                }
            }
            GridLevel::Half => {
                if self.levels.needs(GridLevel::Quarter) {
                    self.push_quadrants(node, GridLevel::Quarter, &mut children);
                }
            }
            GridLevel::Quarter => {
                if self.levels.needs(GridLevel::Eighth) {
                    self.push_quadrants(node, GridLevel::Eighth, &mut children);
                }
            }
            GridLevel::Quintuple | GridLevel::Double | GridLevel::Eighth | GridLevel::HundredMeter => {}
        }
        self.stack.extend(children.into_iter().rev());
    }
}

impl Iterator for GridSquarePatches {
    type Item = Patch<GridLevel>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            self.expand(&node);
            if self.levels.contains(node.level) {
                let bbox = SCALE.to_real(&node.rect);
                return Some(Patch::new(node.level, node.code, bbox));
            }
        }
        None
    }
}

/// 要求を検証し、地域メッシュの列挙を始める。
///
/// ```
/// # use japanese_grids::{EnumerationRequest, GridLevel, grid_square::patches};
/// let request = EnumerationRequest::new([GridLevel::Primary], None);
/// assert_eq!(patches(&request).unwrap().count(), 176);
/// ```
pub fn patches(request: &EnumerationRequest<GridLevel>) -> Result<GridSquarePatches, Error> {
    GridSquarePatches::new(request)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::grid_square::{decode, decode_as, estimate_total_count};
    use crate::level::Level;

    fn collect(levels: &[GridLevel], extent: Option<BBox>) -> Vec<Patch<GridLevel>> {
        let request = EnumerationRequest::new(levels.iter().copied(), extent);
        patches(&request).unwrap().collect()
    }

    fn tokyo() -> BBox {
        BBox::new(139.70, 35.65, 139.80, 35.72)
    }

    #[test]
    fn all_primaries_without_extent() {
        let all = collect(&[GridLevel::Primary], None);
        assert_eq!(all.len(), PRIMARY_CODES.len());
        assert_eq!(all[0].code(), "3036");
        assert!(all.iter().all(|p| p.level() == GridLevel::Primary));
    }

    #[test]
    fn invalid_request_is_rejected() {
        let request = EnumerationRequest::new([GridLevel::Eighth], None);
        assert!(matches!(
            patches(&request),
            Err(Error::ExtentRequired { .. })
        ));
    }

    #[test]
    fn codes_decode_to_their_boxes() {
        let all = collect(GridLevel::ALL, Some(tokyo()));
        assert!(!all.is_empty());
        for patch in &all {
            let decoded = decode_as(patch.code(), patch.level()).unwrap();
            let (a, b, c, d) = decoded.as_tuple();
            let (e, f, g, h) = patch.bbox().as_tuple();
            for (x, y) in [(a, e), (b, f), (c, g), (d, h)] {
                assert!((x - y).abs() < 1e-9, "{} {}", patch.code(), patch.bbox());
            }
        }
    }

    #[test]
    fn parents_come_before_children() {
        let all = collect(GridLevel::ALL, Some(tokyo()));
        let mut seen: HashMap<(GridLevel, String), usize> = HashMap::new();
        for (i, patch) in all.iter().enumerate() {
            if let Some(parent) = patch.level().parent() {
                let prefix = &patch.code()[..parent.code_len()];
                let at = seen
                    .get(&(parent, prefix.to_string()))
                    .unwrap_or_else(|| panic!("{} before its parent", patch.code()));
                assert!(*at < i);
            }
            seen.insert((patch.level(), patch.code().to_string()), i);
        }
    }

    #[test]
    fn every_emitted_patch_intersects_extent() {
        let extent = tokyo();
        for patch in collect(&[GridLevel::Standard, GridLevel::Eighth], Some(extent)) {
            assert!(patch.bbox().intersects(&extent), "{}", patch.code());
        }
    }

    #[test]
    fn children_partition_their_parent() {
        let standard = decode("53394600").unwrap();
        let inner = BBox::new(
            standard.min_x(),
            standard.min_y(),
            standard.max_x(),
            standard.max_y(),
        );
        for level in [GridLevel::Half, GridLevel::HundredMeter] {
            let children: Vec<_> = collect(&[level], Some(inner))
                .into_iter()
                .filter(|p| p.code().starts_with("53394600"))
                .collect();
            let area: f64 = children.iter().map(|p| p.bbox().area()).sum();
            assert!((area - standard.area()).abs() < 1e-12, "{level}");
            let (x, y) = level.fan_out();
            assert_eq!(children.len() as i64, x * y);
        }
    }

    #[test]
    fn sibling_order_within_secondary() {
        let secondary = decode("533946").unwrap();
        let extent = BBox::new(
            secondary.min_x() + 1e-6,
            secondary.min_y() + 1e-6,
            secondary.max_x() - 1e-6,
            secondary.max_y() - 1e-6,
        );
        let codes: Vec<_> = collect(
            &[GridLevel::Quintuple, GridLevel::Double, GridLevel::Standard],
            Some(extent),
        )
        .into_iter()
        .map(|p| p.code().to_string())
        .collect();
        assert_eq!(codes.len(), 4 + 25 + 100);
        assert_eq!(&codes[..4], ["5339461", "5339462", "5339463", "5339464"]);
        assert_eq!(codes[4], "533946005");
        assert_eq!(codes[5], "533946025");
        assert_eq!(codes[28], "533946885");
        assert_eq!(codes[29], "53394600");
        assert_eq!(codes[30], "53394601");
        assert_eq!(codes[128], "53394699");
    }

    #[test]
    fn quadrant_order_under_standard() {
        let standard = decode("53394611").unwrap();
        let extent = BBox::new(
            standard.min_x() + 1e-7,
            standard.min_y() + 1e-7,
            standard.max_x() - 1e-7,
            standard.max_y() - 1e-7,
        );
        let codes: Vec<_> = collect(&[GridLevel::Half, GridLevel::Quarter], Some(extent))
            .into_iter()
            .map(|p| p.code().to_string())
            .collect();
        assert_eq!(codes.len(), 4 + 16);
        assert_eq!(
            &codes[..6],
            ["533946111", "5339461111", "5339461112", "5339461113", "5339461114", "533946112"]
        );
    }

    #[test]
    fn count_matches_estimate_without_extent() {
        for level in [
            GridLevel::Primary,
            GridLevel::Secondary,
            GridLevel::Quintuple,
            GridLevel::Double,
            GridLevel::Standard,
            GridLevel::Half,
        ] {
            let request = EnumerationRequest::new([level], None);
            let count = patches(&request).unwrap().count() as u64;
            assert_eq!(count, estimate_total_count(&request), "{level}");
        }
        let half = EnumerationRequest::new([GridLevel::Half], None);
        assert_eq!(estimate_total_count(&half), 176 * 6400 * 4);
    }

    #[test]
    fn extent_outside_japan_yields_nothing() {
        let extent = BBox::new(-10.0, -10.0, 10.0, 10.0);
        assert!(collect(&[GridLevel::Primary, GridLevel::Eighth], Some(extent)).is_empty());
    }
}
