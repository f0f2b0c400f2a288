use crate::{
    geometry::scaled::Scale,
    legacy_grid::{
        codec::{SHEETS, child_rect},
        level::LegacyLevel,
    },
    request::EnumerationRequest,
};

/// 要求に対して出力される図郭数の上限の見積もり。
///
/// 範囲と交わる地図情報レベル 50000 の図郭の数に、各レベルの図郭あたりの数を掛けて合計する。
///
/// ```
/// # use japanese_grids::{EnumerationRequest, LegacyLevel, legacy_grid::estimate_total_count};
/// let request = EnumerationRequest::new([LegacyLevel::Lv50000, LegacyLevel::Lv2500], None);
/// assert_eq!(estimate_total_count(&request), 160 + 160 * 400);
/// ```
pub fn estimate_total_count(request: &EnumerationRequest<LegacyLevel>) -> u64 {
    let extent = request.extent.map(|e| Scale::UNIT.scale_extent(&e));
    let (columns, rows) = LegacyLevel::Lv50000.fan_out();
    let mut sheets = 0u64;
    for xi in 0..rows {
        for yi in 0..columns {
            let rect = child_rect(&SHEETS, LegacyLevel::Lv50000, xi, yi);
            if extent.as_ref().is_none_or(|e| rect.intersects(e)) {
                sheets += 1;
            }
        }
    }

    request
        .levels
        .iter()
        .map(|level| sheets * level.per_sheet())
        .sum()
}
