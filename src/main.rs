//! 地域メッシュ・国土基本図図郭のコマンドライン。
//!
//! 区画を列挙して CSV か JSON Lines で出力するほか、コードと座標の相互変換、
//! e-Stat の地域メッシュ統計CSVの読み込みを行う。

use std::{
    cell::Cell,
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use geo::BoundingRect;
use japanese_grids::{
    BBox, Datum, EnumerationRequest, Feedback, GeographicCrs, GridLevel, LegacyLevel, Level,
    Patch, PlaneZone, drive,
    estat::{self, EstatLayer, ReconcileOptions},
    grid_square, legacy_grid,
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "japanese-grids")]
#[command(about = "Japanese grid squares (JIS X 0410) and Kokudo Kihon Zukaku tiles")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 地域メッシュを列挙する
    Grid {
        #[command(flatten)]
        common: EnumerateArgs,

        /// 出力する階層（primary, secondary, quintuple, double, standard, half, quarter, eighth, hundred_meter）
        #[arg(short, long = "level", value_delimiter = ',')]
        levels: Vec<GridLevel>,

        /// 地理座標系（jgd2011, jgd2000, wgs84, tokyo）
        #[arg(long, env = "JAPANESE_GRIDS_CRS")]
        crs: Option<GeographicCrs>,
    },

    /// 国土基本図図郭を列挙する
    Legacy {
        #[command(flatten)]
        common: EnumerateArgs,

        /// 出力する地図情報レベル（lv50000, lv5000, lv2500, lv1000, lv500）
        #[arg(short, long = "level", value_delimiter = ',')]
        levels: Vec<LegacyLevel>,

        /// 平面直角座標系の系番号 (1-19)
        #[arg(short, long)]
        zone: Option<PlaneZone>,

        /// 測地系（jgd2011, jgd2000, tokyo）
        #[arg(long)]
        datum: Option<Datum>,
    },

    /// コードを矩形に変換する
    Decode {
        code: String,

        /// 派生階層（double, quintuple, hundred_meter など）として解釈する
        #[arg(short, long)]
        level: Option<GridLevel>,

        /// 系番号付きの国土基本図図郭コードとして解釈する
        #[arg(long, conflicts_with = "level")]
        legacy: bool,
    },

    /// 座標からコードを求める
    Encode {
        /// 経度（`--zone` を指定した場合は平面直角座標の Y）
        #[arg(allow_negative_numbers = true)]
        x: f64,

        /// 緯度（`--zone` を指定した場合は平面直角座標の X）
        #[arg(allow_negative_numbers = true)]
        y: f64,

        /// 平面直角座標系の系番号。指定すると国土基本図図郭のコードを求める
        #[arg(short, long)]
        zone: Option<PlaneZone>,
    },

    /// e-Stat の地域メッシュ統計CSVを読み込む
    Estat {
        /// Shift_JIS の CSV ファイル
        input: PathBuf,

        /// 秘匿対象地域を併合しない
        #[arg(long)]
        no_merge: bool,

        /// 列名に日本語名を付けない
        #[arg(long)]
        no_label: bool,

        /// 地理座標系（jgd2011, jgd2000, wgs84, tokyo）。省略すると jgd2000
        #[arg(long)]
        crs: Option<GeographicCrs>,

        #[arg(short, long, value_enum, default_value_t = Format::Csv)]
        format: Format,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct EnumerateArgs {
    /// 要求を記述した TOML ファイル。コマンドラインの指定が優先される
    #[arg(short, long)]
    request: Option<PathBuf>,

    /// 範囲 `x0,y0,x1,y1`
    #[arg(short, long, value_parser = parse_extent, allow_hyphen_values = true)]
    extent: Option<BBox>,

    #[arg(short, long, value_enum, default_value_t = Format::Csv)]
    format: Format,

    /// 出力先。省略すると標準出力
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// 指定した数を出力したら打ち切る
    #[arg(long)]
    limit: Option<u64>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Csv,
    Json,
}

/// TOML の要求ファイル
#[derive(Deserialize, Debug)]
#[serde(bound(deserialize = "L: Deserialize<'de>"))]
struct RequestFile<L> {
    #[serde(default)]
    extent: Option<BBox>,
    #[serde(default = "Vec::new")]
    levels: Vec<L>,
    zone: Option<PlaneZone>,
    datum: Option<Datum>,
    crs: Option<GeographicCrs>,
}

impl<L> Default for RequestFile<L> {
    fn default() -> Self {
        Self {
            extent: None,
            levels: Vec::new(),
            zone: None,
            datum: None,
            crs: None,
        }
    }
}

fn parse_extent(s: &str) -> Result<BBox, String> {
    let values: Vec<f64> = s
        .split(',')
        .map(|v| v.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|e| format!("invalid extent '{s}': {e}"))?;
    match values.as_slice() {
        [x0, y0, x1, y1] => Ok(BBox::new(*x0, *y0, *x1, *y1)),
        _ => Err(format!("extent needs four numbers x0,y0,x1,y1, got '{s}'")),
    }
}

fn read_request_file<L: DeserializeOwned>(path: Option<&Path>) -> Result<RequestFile<L>> {
    let Some(path) = path else {
        return Ok(RequestFile::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read request file {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("Invalid request file {}", path.display()))
}

/// コマンドラインの指定を優先してファイルの指定と合わせる。
fn build_request<L: Level>(
    file: &RequestFile<L>,
    levels: &[L],
    extent: Option<BBox>,
) -> EnumerationRequest<L> {
    let levels = if levels.is_empty() {
        file.levels.as_slice()
    } else {
        levels
    };
    EnumerationRequest::new(levels.iter().copied(), extent.or(file.extent))
}

/// `--limit` で打ち切り、進捗をログに出す。
struct LimitFeedback<'a> {
    emitted: &'a Cell<u64>,
    limit: Option<u64>,
}

impl Feedback for LimitFeedback<'_> {
    fn is_canceled(&self) -> bool {
        self.limit.is_some_and(|limit| self.emitted.get() >= limit)
    }

    fn set_progress(&mut self, fraction: f64) {
        debug!(percent = fraction * 100.0, "progress");
    }
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}

enum PatchWriter {
    Csv(csv::Writer<Box<dyn Write>>),
    Json(Box<dyn Write>),
}

impl PatchWriter {
    fn new(format: Format, out: Box<dyn Write>) -> Result<Self> {
        Ok(match format {
            Format::Csv => {
                let mut writer = csv::Writer::from_writer(out);
                writer.write_record(["level", "code", "min_x", "min_y", "max_x", "max_y"])?;
                PatchWriter::Csv(writer)
            }
            Format::Json => PatchWriter::Json(out),
        })
    }

    fn write<L: Level + Serialize>(&mut self, patch: &Patch<L>) -> Result<()> {
        match self {
            PatchWriter::Csv(writer) => {
                let (x0, y0, x1, y1) = patch.bbox().as_tuple();
                writer.write_record([
                    patch.level().tag().to_string(),
                    patch.code().to_string(),
                    x0.to_string(),
                    y0.to_string(),
                    x1.to_string(),
                    y1.to_string(),
                ])?;
            }
            PatchWriter::Json(out) => {
                serde_json::to_writer(&mut *out, patch)?;
                out.write_all(b"\n")?;
            }
        }
        Ok(())
    }

    fn finish(self) -> Result<()> {
        match self {
            PatchWriter::Csv(mut writer) => writer.flush()?,
            PatchWriter::Json(mut out) => out.flush()?,
        }
        Ok(())
    }
}

/// 列挙した区画を出力する。
fn emit<L, I>(patches: I, total: u64, args: &EnumerateArgs) -> Result<()>
where
    L: Level + Serialize,
    I: Iterator<Item = Patch<L>>,
{
    let mut writer = PatchWriter::new(args.format, open_output(args.output.as_deref())?)?;
    let emitted = Cell::new(0);
    let mut feedback = LimitFeedback {
        emitted: &emitted,
        limit: args.limit,
    };
    let completion = drive(patches, total, &mut feedback, |patch| {
        writer.write(&patch)?;
        emitted.set(emitted.get() + 1);
        Ok::<_, anyhow::Error>(())
    })?;
    writer.finish()?;

    if completion.is_canceled() {
        info!(emitted = completion.emitted(), total, "stopped at the limit");
    } else {
        info!(emitted = completion.emitted(), total, "done");
    }
    Ok(())
}

fn run_grid(args: &EnumerateArgs, levels: &[GridLevel], crs: Option<GeographicCrs>) -> Result<()> {
    let file = read_request_file::<GridLevel>(args.request.as_deref())?;
    let request = build_request(&file, levels, args.extent);
    let crs = crs.or(file.crs).unwrap_or_default();

    let total = grid_square::estimate_total_count(&request);
    let patches = grid_square::patches(&request)?;
    info!(
        levels = ?request.levels,
        crs = crs.label(),
        epsg = crs.epsg(),
        total,
        "generating grid squares"
    );
    emit(patches, total, args)
}

fn run_legacy(
    args: &EnumerateArgs,
    levels: &[LegacyLevel],
    zone: Option<PlaneZone>,
    datum: Option<Datum>,
) -> Result<()> {
    let file = read_request_file::<LegacyLevel>(args.request.as_deref())?;
    let request = build_request(&file, levels, args.extent);
    let Some(zone) = zone.or(file.zone) else {
        bail!("A plane rectangular zone (--zone 1..19) is required");
    };
    let datum = datum.or(file.datum).unwrap_or_default();

    let total = legacy_grid::estimate_total_count(&request);
    let patches = legacy_grid::patches(&request, zone)?;
    info!(
        levels = ?request.levels,
        zone = zone.label(),
        datum = datum.label(),
        epsg = zone.epsg(datum),
        total,
        "generating legacy grid tiles"
    );
    emit(patches, total, args)
}

fn run_decode(code: &str, level: Option<GridLevel>, legacy: bool) -> Result<()> {
    let out = if legacy {
        let sheet = legacy_grid::decode(code)
            .with_context(|| format!("'{code}' is not a valid legacy grid code"))?;
        serde_json::json!({
            "zone": sheet.zone,
            "level": sheet.level,
            "bbox": sheet.bbox,
        })
    } else {
        let (level, bbox) = match level {
            Some(level) => (Some(level), grid_square::decode_as(code, level)),
            None => (grid_square::level_of(code), grid_square::decode(code)),
        };
        let bbox = bbox.with_context(|| format!("'{code}' is not a valid grid square code"))?;
        serde_json::json!({ "level": level, "bbox": bbox })
    };
    println!("{out}");
    Ok(())
}

fn run_encode(x: f64, y: f64, zone: Option<PlaneZone>) -> Result<()> {
    let out = match zone {
        Some(zone) => {
            let codes = legacy_grid::encode(zone, x, y)
                .with_context(|| format!("({x}, {y}) is outside the legacy grid"))?;
            serde_json::to_value(codes)?
        }
        None => {
            let codes = grid_square::encode(x, y)
                .with_context(|| format!("({x}, {y}) is outside the grid squares of Japan"))?;
            let mut value = serde_json::to_value(&codes)?;
            value["hyphenated"] = codes.hyphenated().into();
            value
        }
    };
    println!("{out}");
    Ok(())
}

fn write_layer(layer: &EstatLayer, format: Format, out: Box<dyn Write>) -> Result<()> {
    match format {
        Format::Csv => {
            let mut writer = csv::Writer::from_writer(out);
            let mut header: Vec<&str> = layer.fields.iter().map(|f| f.name.as_str()).collect();
            header.extend(["min_x", "min_y", "max_x", "max_y"]);
            writer.write_record(&header)?;
            for feature in &layer.features {
                let mut row: Vec<String> =
                    feature.attributes.iter().map(|v| v.to_string()).collect();
                match feature.geometry.as_ref().and_then(|g| g.bounding_rect()) {
                    Some(rect) => row.extend(
                        [rect.min().x, rect.min().y, rect.max().x, rect.max().y]
                            .map(|v| v.to_string()),
                    ),
                    None => row.extend(std::iter::repeat_n(String::new(), 4)),
                }
                writer.write_record(&row)?;
            }
            writer.flush()?;
        }
        Format::Json => {
            let mut out = out;
            for feature in &layer.features {
                let attributes: serde_json::Map<String, serde_json::Value> = layer
                    .fields
                    .iter()
                    .zip(&feature.attributes)
                    .map(|(field, value)| Ok((field.name.clone(), serde_json::to_value(value)?)))
                    .collect::<Result<_, serde_json::Error>>()?;
                let polygons: Vec<Vec<[f64; 2]>> = feature
                    .geometry
                    .iter()
                    .flat_map(|g| g.0.iter())
                    .map(|p| p.exterior().coords().map(|c| [c.x, c.y]).collect())
                    .collect();
                let line = serde_json::json!({ "attributes": attributes, "polygons": polygons });
                serde_json::to_writer(&mut out, &line)?;
                out.write_all(b"\n")?;
            }
            out.flush()?;
        }
    }
    Ok(())
}

fn run_estat(
    input: &Path,
    no_merge: bool,
    no_label: bool,
    crs: Option<GeographicCrs>,
    format: Format,
    output: Option<&Path>,
) -> Result<()> {
    let crs = crs.unwrap_or(estat::DEFAULT_CRS);
    let options = ReconcileOptions {
        merge_suppressed: !no_merge,
        label_columns: !no_label,
    };
    let layer = estat::load(input, &options)
        .with_context(|| format!("Failed to load {}", input.display()))?;
    info!(
        features = layer.features.len(),
        fields = layer.fields.len(),
        crs = crs.label(),
        epsg = crs.epsg(),
        "loaded e-Stat grid square statistics"
    );
    write_layer(&layer, format, open_output(output)?)
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "japanese_grids=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    match &cli.command {
        Command::Grid {
            common,
            levels,
            crs,
        } => run_grid(common, levels, *crs),
        Command::Legacy {
            common,
            levels,
            zone,
            datum,
        } => run_legacy(common, levels, *zone, *datum),
        Command::Decode {
            code,
            level,
            legacy,
        } => run_decode(code, *level, *legacy),
        Command::Encode { x, y, zone } => run_encode(*x, *y, *zone),
        Command::Estat {
            input,
            no_merge,
            no_label,
            crs,
            format,
            output,
        } => run_estat(input, *no_merge, *no_label, *crs, *format, output.as_deref()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extent_parsing() {
        assert_eq!(
            parse_extent("139.7, 35.6,139.8,35.7"),
            Ok(BBox::new(139.7, 35.6, 139.8, 35.7))
        );
        assert!(parse_extent("1,2,3").is_err());
        assert!(parse_extent("a,b,c,d").is_err());
    }

    #[test]
    fn flags_override_request_file() {
        let file: RequestFile<GridLevel> = toml::from_str(
            "levels = [\"primary\"]\nextent = { min_x = 139.0, min_y = 35.0, max_x = 140.0, max_y = 36.0 }",
        )
        .unwrap();
        let request = build_request(&file, &[], None);
        assert!(request.levels.contains(GridLevel::Primary));
        assert!(request.extent.is_some());

        let request = build_request(&file, &[GridLevel::Standard], Some(BBox::new(0.0, 0.0, 1.0, 1.0)));
        assert!(!request.levels.contains(GridLevel::Primary));
        assert_eq!(request.extent, Some(BBox::new(0.0, 0.0, 1.0, 1.0)));
    }

    #[test]
    fn cli_parses() {
        let cli = Cli::try_parse_from([
            "japanese-grids",
            "grid",
            "--level",
            "primary,standard",
            "--extent",
            "139,35,140,36",
            "--limit",
            "10",
        ])
        .unwrap();
        match cli.command {
            Command::Grid { levels, common, .. } => {
                assert_eq!(levels, vec![GridLevel::Primary, GridLevel::Standard]);
                assert_eq!(common.limit, Some(10));
            }
            other => panic!("unexpected {other:?}"),
        }

        let cli = Cli::try_parse_from(["japanese-grids", "encode", "-z", "9", "--", "-1200.5", "300"]).unwrap();
        assert!(matches!(cli.command, Command::Encode { zone: Some(_), .. }));

        let cli = Cli::try_parse_from(["japanese-grids", "estat", "in.csv"]).unwrap();
        assert!(matches!(cli.command, Command::Estat { crs: None, .. }));
        let cli = Cli::try_parse_from(["japanese-grids", "estat", "in.csv", "--crs", "wgs84"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Estat { crs: Some(GeographicCrs::Wgs84), .. }
        ));
    }
}
