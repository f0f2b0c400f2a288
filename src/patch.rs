use serde::Serialize;

use crate::geometry::bbox::BBox;

/// 列挙された1つの区画。`(階層, コード, 矩形)` の組。
///
/// 列挙の途中で一時的に作られる値で、受け取った側が地物などに変換する。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Patch<L> {
    level: L,
    code: String,
    bbox: BBox,
}

impl<L: Copy> Patch<L> {
    pub fn new(level: L, code: String, bbox: BBox) -> Self {
        Self { level, code, bbox }
    }

    pub fn level(&self) -> L {
        self.level
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn bbox(&self) -> &BBox {
        &self.bbox
    }

    /// `(階層, コード, 矩形)` に分解する。
    pub fn into_parts(self) -> (L, String, BBox) {
        (self.level, self.code, self.bbox)
    }
}
