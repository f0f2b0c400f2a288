use std::{fmt, marker::PhantomData};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// 区画の階層（地域メッシュの次数や地図情報レベル）が備えるべき性質を定義するトレイト。
///
/// 階層は親子関係で木構造をなし、ある階層の区画は親階層の区画を隙間なく重なりなく分割する。
pub trait Level: Copy + Eq + fmt::Debug + fmt::Display + 'static {
    /// この体系のすべての階層。親は必ず子より前に並ぶ。
    const ALL: &'static [Self];

    /// [`Level::ALL`] の中での位置
    fn index(self) -> usize;

    /// 一つ上の階層。最上位の場合は `None`。
    fn parent(self) -> Option<Self>;

    /// 全域に対して生成すると区画数が膨大になるため、範囲の指定を必須とする階層か。
    fn requires_extent(self) -> bool;

    /// `primary` や `lv50000` のような識別名
    fn tag(self) -> &'static str;

    /// `self` が `other` 自身またはその祖先であるか判定する。
    fn is_self_or_ancestor_of(self, other: Self) -> bool {
        let mut current = Some(other);
        while let Some(level) = current {
            if level == self {
                return true;
            }
            current = level.parent();
        }
        false
    }
}

/// 生成を要求された階層の集合。
///
/// 階層の数は高々数種類なので、ビット列で保持する。
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct LevelSet<L: Level> {
    bits: u32,
    _marker: PhantomData<L>,
}

impl<L: Level> Default for LevelSet<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: Level> fmt::Debug for LevelSet<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<L: Level> LevelSet<L> {
    /// 空の集合を作成する。
    pub fn new() -> Self {
        Self {
            bits: 0,
            _marker: PhantomData,
        }
    }

    /// その体系のすべての階層を含む集合
    pub fn all() -> Self {
        L::ALL.iter().copied().collect()
    }

    pub fn insert(&mut self, level: L) {
        self.bits |= 1 << level.index();
    }

    pub fn remove(&mut self, level: L) {
        self.bits &= !(1 << level.index());
    }

    pub fn contains(&self, level: L) -> bool {
        self.bits & (1 << level.index()) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    pub fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    /// 含まれる階層を浅い順に返す。
    pub fn iter(&self) -> impl Iterator<Item = L> + '_ {
        L::ALL.iter().copied().filter(|l| self.contains(*l))
    }

    /// `level` の区画を生成または展開する必要があるか。
    ///
    /// `level` 自身か、その子孫の階層が要求されている場合に `true` となる。
    ///
    /// ```
    /// # use japanese_grids::{GridLevel, LevelSet};
    /// let set: LevelSet<GridLevel> = [GridLevel::Eighth].into_iter().collect();
    /// assert!(set.needs(GridLevel::Standard));
    /// assert!(!set.needs(GridLevel::Double));
    /// ```
    pub fn needs(&self, level: L) -> bool {
        self.iter().any(|requested| level.is_self_or_ancestor_of(requested))
    }

    /// 範囲の指定が必須なのに要求されている階層
    pub fn extent_required(&self) -> Vec<L> {
        self.iter().filter(|l| l.requires_extent()).collect()
    }
}

impl<L: Level> FromIterator<L> for LevelSet<L> {
    fn from_iter<I: IntoIterator<Item = L>>(iter: I) -> Self {
        let mut set = LevelSet::new();
        for level in iter {
            set.insert(level);
        }
        set
    }
}

impl<L: Level + Serialize> Serialize for LevelSet<L> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de, L: Level + Deserialize<'de>> Deserialize<'de> for LevelSet<L> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let levels = Vec::<L>::deserialize(deserializer)?;
        Ok(levels.into_iter().collect())
    }
}
