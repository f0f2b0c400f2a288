use serde::{Deserialize, Serialize};
use thiserror::Error;
#[derive(Debug, Error, PartialEq, Eq, Serialize, Deserialize)]

pub enum Error {
    #[error("No output level is selected; select at least one level to generate")]
    NoLevelSelected,

    #[error("An extent is required to generate {levels:?}, to avoid generating an unexpectedly large number of tiles")]
    ExtentRequired { levels: Vec<String> },

    #[error("Unknown level '{name}'")]
    UnknownLevel { name: String },

    #[error("Unknown plane rectangular zone '{zone}' (valid: 1..=19)")]
    UnknownZone { zone: String },

    #[error("Unknown datum '{name}'")]
    UnknownDatum { name: String },
}
