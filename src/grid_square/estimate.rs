use crate::{
    grid_square::{
        constants::{PRIMARY_CODES, SCALE, primary_rect},
        level::GridLevel,
    },
    request::EnumerationRequest,
};

/// 要求に対して出力される区画数の上限の見積もり。
///
/// 範囲と交わる第1次地域区画の数に、要求された各階層の第1次地域区画あたりの区画数を掛けて合計する。
/// 範囲が無い場合は正確な総数になる。進捗表示の分母に使う。
///
/// ```
/// # use japanese_grids::{EnumerationRequest, GridLevel, grid_square::estimate_total_count};
/// let request = EnumerationRequest::new([GridLevel::Primary, GridLevel::Secondary], None);
/// assert_eq!(estimate_total_count(&request), 176 * (1 + 64));
/// ```
pub fn estimate_total_count(request: &EnumerationRequest<GridLevel>) -> u64 {
    let extent = request.extent.map(|e| SCALE.scale_extent(&e));
    let primaries = PRIMARY_CODES
        .iter()
        .filter(|&&code| match &extent {
            Some(extent) => primary_rect(code).intersects(extent),
            None => true,
        })
        .count() as u64;

    request
        .levels
        .iter()
        .map(|level| primaries * level.per_primary())
        .sum()
}
