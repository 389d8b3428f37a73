//! Loading of [Moving AI](https://movingai.com/benchmarks/grids.html) grid benchmarks: `.map`
//! files become a [BoolGrid] and `.scen` files become an ordered list of [Experiment]s.
use csv::{ReaderBuilder, Trim};
use grid_util::grid::ValueGrid;
use grid_util::point::Point;
use grid_util::BoolGrid;
use log::warn;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while reading scenario or map files.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("could not read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse scenario file {path}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("malformed map file {path}: {reason}")]
    MalformedMap { path: PathBuf, reason: String },
    #[error("could not find map file at {attempted} or at {fallback}")]
    MapNotFound {
        attempted: PathBuf,
        fallback: PathBuf,
    },
}

/// One line of a `.scen` file, in column order.
#[allow(unused)]
#[derive(Debug, Deserialize)]
struct ScenarioRecord {
    bucket: u32,
    map_file: String,
    map_width: u32,
    map_height: u32,
    start_x: i32,
    start_y: i32,
    goal_x: i32,
    goal_y: i32,
    optimal_length: f64,
}

/// A single benchmark query. Read-only once loaded.
#[derive(Clone, Debug, PartialEq)]
pub struct Experiment {
    pub bucket: u32,
    pub map_file: String,
    pub map_width: u32,
    pub map_height: u32,
    pub start_x: i32,
    pub start_y: i32,
    pub target_x: i32,
    pub target_y: i32,
    /// Reference cost recorded in the scenario file.
    pub upper_bound: f64,
}

impl Experiment {
    pub fn start(&self) -> Point {
        Point::new(self.start_x, self.start_y)
    }
    pub fn target(&self) -> Point {
        Point::new(self.target_x, self.target_y)
    }
}

impl From<ScenarioRecord> for Experiment {
    fn from(record: ScenarioRecord) -> Self {
        Experiment {
            bucket: record.bucket,
            map_file: record.map_file,
            map_width: record.map_width,
            map_height: record.map_height,
            start_x: record.start_x,
            start_y: record.start_y,
            target_x: record.goal_x,
            target_y: record.goal_y,
            upper_bound: record.optimal_length,
        }
    }
}

fn read_file(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses the contents of a `.scen` file. The optional `version` line is skipped and file order
/// is preserved.
pub fn parse_experiments(data: &str, path: &Path) -> Result<Vec<Experiment>, LoadError> {
    let mut lines = data.lines().peekable();
    if lines
        .peek()
        .is_some_and(|line| line.trim_start().starts_with("version"))
    {
        lines.next();
    }
    let remaining_data = lines
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    let mut csv_reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .trim(Trim::All)
        .from_reader(remaining_data.as_bytes());
    csv_reader
        .deserialize::<ScenarioRecord>()
        .map(|result| {
            result.map(Experiment::from).map_err(|source| LoadError::Csv {
                path: path.to_path_buf(),
                source,
            })
        })
        .collect()
}

/// Loads all experiments of a scenario file in file order.
pub fn load_experiments<P: AsRef<Path>>(path: P) -> Result<Vec<Experiment>, LoadError> {
    let path = path.as_ref();
    parse_experiments(&read_file(path)?, path)
}

/// Parses the contents of a `.map` file. Only `.`, `G` and `S` tiles are traversable, every other
/// tile is marked as blocked ([true]).
pub fn parse_map(data: &str, path: &Path) -> Result<BoolGrid, LoadError> {
    let malformed = |reason: String| LoadError::MalformedMap {
        path: path.to_path_buf(),
        reason,
    };
    let mut lines = data.lines();
    let mut width = None;
    let mut height = None;
    for line in lines.by_ref() {
        let line = line.trim();
        if line == "map" {
            break;
        }
        let Some((key, value)) = line.split_once(char::is_whitespace) else {
            continue;
        };
        let parse_value = || {
            value
                .trim()
                .parse::<usize>()
                .map_err(|e| malformed(format!("invalid {key} '{}': {e}", value.trim())))
        };
        match key {
            "width" => width = Some(parse_value()?),
            "height" => height = Some(parse_value()?),
            _ => {}
        }
    }
    let w = width.ok_or_else(|| malformed("missing width".to_owned()))?;
    let h = height.ok_or_else(|| malformed("missing height".to_owned()))?;

    let rows = lines.take(h).collect::<Vec<&str>>();
    if rows.len() != h {
        return Err(malformed(format!("expected {h} rows, found {}", rows.len())));
    }
    let mut bool_grid: BoolGrid = BoolGrid::new(w, h, false);
    for (y, row) in rows.iter().enumerate() {
        let row = row.trim_end_matches('\r').as_bytes();
        if row.len() != w {
            return Err(malformed(format!(
                "row {y} has {} tiles, expected {w}",
                row.len()
            )));
        }
        for (x, tile_val) in row.iter().enumerate() {
            let blocked = ![b'.', b'G', b'S'].contains(tile_val);
            bool_grid.set(x as i32, y as i32, blocked);
        }
    }
    Ok(bool_grid)
}

/// Loads a `.map` file into a [BoolGrid].
pub fn load_map<P: AsRef<Path>>(path: P) -> Result<BoolGrid, LoadError> {
    let path = path.as_ref();
    parse_map(&read_file(path)?, path)
}

/// Locates the map file named by a scenario. The path is tried as written first; scenario files
/// moved together with their maps are handled by retrying with the map's file name in the
/// directory containing the scenario file.
pub fn resolve_map_path(scenario_path: &Path, map_file: &str) -> Result<PathBuf, LoadError> {
    let attempted = PathBuf::from(map_file);
    if attempted.is_file() {
        return Ok(attempted);
    }
    warn!("Could not find map file at location: {}", attempted.display());
    let scenario_dir = scenario_path.parent().unwrap_or_else(|| Path::new(""));
    let fallback = match attempted.file_name() {
        Some(name) => scenario_dir.join(name),
        None => scenario_dir.join(map_file),
    };
    warn!("Trying alternative location: {}", fallback.display());
    if fallback.is_file() {
        Ok(fallback)
    } else {
        warn!("Could not find map file anywhere. Giving up");
        Err(LoadError::MapNotFound {
            attempted,
            fallback,
        })
    }
}
