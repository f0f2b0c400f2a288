//! 列挙の進捗通知と中断。
//!
//! 列挙器そのものは遅延評価のイテレータなので、呼び出し側が取り出すのをやめればいつでも止まる。
//! [`drive`] はホストの進捗表示・中断ボタンと列挙器を結びつけるための薄い駆動ループ。

use tracing::{debug, info};

/// 進捗を何区画ごとに再計算するか
pub const PROGRESS_INTERVAL: u64 = 1000;

//完了前に通知する進捗の上限
const MAX_PARTIAL_PROGRESS: f64 = 0.99;

/// ホスト側の進捗表示と中断要求。
pub trait Feedback {
    /// 中断が要求されているか
    fn is_canceled(&self) -> bool;

    /// 進捗を `0.0..=1.0` で通知する。
    fn set_progress(&mut self, fraction: f64);
}

/// 進捗を捨て、中断もしない [`Feedback`]。
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFeedback;

impl Feedback for NoFeedback {
    fn is_canceled(&self) -> bool {
        false
    }

    fn set_progress(&mut self, _fraction: f64) {}
}

/// 駆動ループの終わり方
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// すべての区画を出力し終えた
    Finished { emitted: u64 },
    /// 中断要求を受けて途中で止めた
    Canceled { emitted: u64 },
}

impl Completion {
    pub fn emitted(&self) -> u64 {
        match self {
            Completion::Finished { emitted } | Completion::Canceled { emitted } => *emitted,
        }
    }

    pub fn is_canceled(&self) -> bool {
        matches!(self, Completion::Canceled { .. })
    }
}

/// `items` を順に `sink` へ渡す。
///
/// 次の区画を取り出す前に毎回中断要求を確認するので、N 区画目を出力した直後に中断されると
/// 出力はちょうど N 区画になる。進捗は [`PROGRESS_INTERVAL`] 区画ごとに `出力数 / total` で通知し、
/// 単調に増加し、正常に完了したときだけ `1.0` に達する。
///
/// `sink` がエラーを返した場合はそのエラーで打ち切る。
///
/// ```
/// # use japanese_grids::progress::{drive, Completion, NoFeedback};
/// let mut out = Vec::new();
/// let done = drive(1..=5, 5, &mut NoFeedback, |i| {
///     out.push(i);
///     Ok::<_, std::convert::Infallible>(())
/// })
/// .unwrap();
/// assert_eq!(done, Completion::Finished { emitted: 5 });
/// assert_eq!(out, vec![1, 2, 3, 4, 5]);
/// ```
pub fn drive<I, F, S, E>(items: I, total: u64, feedback: &mut F, mut sink: S) -> Result<Completion, E>
where
    I: IntoIterator,
    F: Feedback + ?Sized,
    S: FnMut(I::Item) -> Result<(), E>,
{
    let mut items = items.into_iter();
    let mut emitted = 0u64;
    let mut reported = 0.0f64;

    loop {
        if feedback.is_canceled() {
            info!(emitted, "enumeration canceled");
            return Ok(Completion::Canceled { emitted });
        }
        let Some(item) = items.next() else {
            break;
        };
        sink(item)?;
        emitted += 1;

        if emitted % PROGRESS_INTERVAL == 0 && total > 0 {
            let fraction = (emitted as f64 / total as f64).min(MAX_PARTIAL_PROGRESS);
            if fraction > reported {
                reported = fraction;
                feedback.set_progress(fraction);
            }
            debug!(emitted, total, "progress");
        }
    }

    feedback.set_progress(1.0);
    debug!(emitted, total, "enumeration finished");
    Ok(Completion::Finished { emitted })
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, convert::Infallible};

    use super::*;

    /// 通知された進捗を記録する。
    #[derive(Default)]
    struct Recorder {
        canceled: bool,
        progress: Vec<f64>,
    }

    impl Feedback for Recorder {
        fn is_canceled(&self) -> bool {
            self.canceled
        }

        fn set_progress(&mut self, fraction: f64) {
            self.progress.push(fraction);
        }
    }

    /// 出力数が上限に達したら中断を要求する。
    struct CancelAt<'a> {
        emitted: &'a Cell<u64>,
        limit: u64,
    }

    impl Feedback for CancelAt<'_> {
        fn is_canceled(&self) -> bool {
            self.emitted.get() >= self.limit
        }

        fn set_progress(&mut self, _fraction: f64) {}
    }

    #[test]
    fn cancellation_stops_before_next_item() {
        let count = Cell::new(0);
        let mut feedback = CancelAt {
            emitted: &count,
            limit: 2500,
        };
        let mut pulled = 0;
        let items = (0..10_000u64).inspect(|_| pulled += 1);
        let result = drive(items, 10_000, &mut feedback, |_| {
            count.set(count.get() + 1);
            Ok::<_, Infallible>(())
        });
        assert_eq!(result, Ok(Completion::Canceled { emitted: 2500 }));
        assert_eq!(count.get(), 2500);
        assert_eq!(pulled, 2500);
    }

    #[test]
    fn progress_is_monotone_and_reaches_one_only_at_the_end() {
        let mut feedback = Recorder::default();
        // 見積もりより多く出力されても途中で 1.0 に達しない
        let result = drive(0..5_000u64, 3_000, &mut feedback, |_| Ok::<_, Infallible>(()));
        assert_eq!(result, Ok(Completion::Finished { emitted: 5_000 }));

        let (last, partial) = feedback.progress.split_last().unwrap();
        assert_eq!(*last, 1.0);
        assert!(!partial.is_empty());
        assert!(partial.windows(2).all(|w| w[0] < w[1]));
        assert!(partial.iter().all(|p| *p < 1.0));
    }

    #[test]
    fn canceled_run_never_reports_completion() {
        let mut feedback = Recorder {
            canceled: true,
            ..Default::default()
        };
        let result = drive(0..5_000u64, 5_000, &mut feedback, |_| Ok::<_, Infallible>(()));
        assert_eq!(result, Ok(Completion::Canceled { emitted: 0 }));
        assert!(feedback.progress.is_empty());
    }

    #[test]
    fn sink_error_aborts() {
        let result = drive(0..10u32, 10, &mut NoFeedback, |i| {
            if i == 3 { Err("full") } else { Ok(()) }
        });
        assert_eq!(result, Err("full"));
    }
}
