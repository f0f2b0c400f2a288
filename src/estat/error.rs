use thiserror::Error;

/// 地域メッシュ統計CSVの読み込みと併合処理のエラー。
///
/// いずれも読み込み全体を失敗させる。併合には全行の表が揃っている必要があるため、途中までの結果は返さない。
#[derive(Debug, Error)]
pub enum EstatError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("The input is not Shift_JIS (cp932) text; e-Stat grid square statistics are distributed in Shift_JIS")]
    Encoding,

    #[error("The header rows (column names and aliases) are missing")]
    MissingHeader,

    #[error("The header has {names} columns but the alias row has {aliases}")]
    HeaderMismatch { names: usize, aliases: usize },

    #[error("Line {line}: expected {expected} fields, found {found}")]
    RowFieldCount {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("The KEY_CODE column is missing")]
    MissingKeyCodeColumn,

    #[error("Line {line}: KEY_CODE is empty")]
    MissingKeyCode { line: u64 },

    #[error("Line {line}: '{value}' in column {column} is not an integer")]
    InvalidInteger {
        line: u64,
        column: String,
        value: String,
    },

    #[error("{key}: merge target {target} is not in the table")]
    UnknownMergeTarget { key: String, target: String },
}
