//! Geospatial export of sub-point time series
//!
//! A `PositionTable` is written as one point feature per row, with the
//! timestamp in a `datetime` attribute, to FlatGeobuf (default) or GeoJSON.
//! Both readers are provided so a written file can be loaded back.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use flatgeobuf::{
    ColumnType, FallibleStreamingIterator, FgbCrs, FgbReader, FgbWriter, FgbWriterOptions,
    GeometryType,
};
use geo_types::{Geometry, Point};
use geozero::{ColumnValue, FeatureProperties, PropertyProcessor, ToGeo};
use thiserror::Error;

use crate::constants::EPSG_WGS84;
pub use crate::toposlib::SubPoint;

/// Name of the timestamp attribute
pub const DATETIME_COLUMN: &str = "datetime";

/// One instant in a series
pub type TimeSample = DateTime<Utc>;

/// Error type for export operations
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("FlatGeobuf error: {0}")]
    FlatGeobuf(String),

    #[error("GeoJSON error: {0}")]
    GeoJson(String),

    #[error("Unexpected geometry: {0}")]
    Geometry(String),

    #[error("Invalid timestamp {0:?}")]
    Timestamp(String),

    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),

    #[error("Timestamp {0} does not follow the previous row")]
    NotIncreasing(String),
}

/// Result type for export operations
pub type Result<T> = std::result::Result<T, ExportError>;

/// Timestamped sub-points in strictly increasing time order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositionTable {
    rows: Vec<(TimeSample, SubPoint)>,
}

impl PositionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            rows: Vec::with_capacity(capacity),
        }
    }

    /// Append a row; its timestamp must be later than the last one
    pub fn push(&mut self, time: TimeSample, point: SubPoint) -> Result<()> {
        if let Some((last, _)) = self.rows.last() {
            if time <= *last {
                return Err(ExportError::NotIncreasing(format_timestamp(&time)));
            }
        }
        self.rows.push((time, point));
        Ok(())
    }

    /// EPSG code of the coordinates
    pub fn crs(&self) -> i32 {
        EPSG_WGS84
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(TimeSample, SubPoint)> {
        self.rows.iter()
    }

    pub fn rows(&self) -> &[(TimeSample, SubPoint)] {
        &self.rows
    }
}

/// Supported output drivers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    FlatGeobuf,
    GeoJson,
}

impl OutputFormat {
    /// File extension without the dot
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::FlatGeobuf => "fgb",
            OutputFormat::GeoJson => "geojson",
        }
    }

    /// Driver name as used by GDAL/OGR
    pub fn driver_name(self) -> &'static str {
        match self {
            OutputFormat::FlatGeobuf => "FlatGeobuf",
            OutputFormat::GeoJson => "GeoJSON",
        }
    }

    /// Format implied by a file's extension
    pub fn from_path(path: &Path) -> Result<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| ExportError::UnsupportedFormat(path.display().to_string()))?
            .parse()
    }
}

impl FromStr for OutputFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "flatgeobuf" | "fgb" => Ok(OutputFormat::FlatGeobuf),
            "geojson" | "json" => Ok(OutputFormat::GeoJson),
            other => Err(ExportError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.driver_name())
    }
}

/// ISO-8601 UTC with a `Z` suffix and only as many fractional digits as needed
pub fn format_timestamp(time: &TimeSample) -> String {
    time.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parse a timestamp written by [`format_timestamp`] (any RFC 3339 offset)
pub fn parse_timestamp(text: &str) -> Result<TimeSample> {
    DateTime::parse_from_rfc3339(text.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ExportError::Timestamp(text.to_string()))
}

/// Write `table` to `<dir>/<name>.<ext>`, replacing any existing file
pub fn write(table: &PositionTable, name: &str, format: OutputFormat, dir: &Path) -> Result<PathBuf> {
    let path = dir.join(format!("{name}.{}", format.extension()));
    match format {
        OutputFormat::FlatGeobuf => write_flatgeobuf(table, name, &path)?,
        OutputFormat::GeoJson => write_geojson(table, &path)?,
    }
    log::info!(
        "Wrote {} features to {} ({})",
        table.len(),
        path.display(),
        format
    );
    Ok(path)
}

fn write_flatgeobuf(table: &PositionTable, name: &str, path: &Path) -> Result<()> {
    let options = FgbWriterOptions {
        crs: FgbCrs {
            code: table.crs(),
            ..Default::default()
        },
        ..Default::default()
    };
    let mut fgb = FgbWriter::create_with_options(name, GeometryType::Point, options)
        .map_err(|e| ExportError::FlatGeobuf(e.to_string()))?;
    fgb.add_column(DATETIME_COLUMN, ColumnType::DateTime, |_fbb, col| {
        col.nullable = false;
    });

    for (time, point) in table.iter() {
        let stamp = format_timestamp(time);
        let geometry = Geometry::Point(Point::new(point.longitude, point.latitude));
        let mut property_error = None;
        fgb.add_feature_geom(geometry, |feat| {
            if let Err(e) = feat.property(0, DATETIME_COLUMN, &ColumnValue::DateTime(&stamp)) {
                property_error = Some(e);
            }
        })
        .map_err(|e| ExportError::FlatGeobuf(e.to_string()))?;
        if let Some(e) = property_error {
            return Err(ExportError::FlatGeobuf(e.to_string()));
        }
    }

    let mut writer = BufWriter::new(File::create(path)?);
    fgb.write(&mut writer)
        .map_err(|e| ExportError::FlatGeobuf(e.to_string()))?;
    writer.flush()?;
    Ok(())
}

fn write_geojson(table: &PositionTable, path: &Path) -> Result<()> {
    let features = table
        .iter()
        .map(|(time, point)| {
            let mut properties = geojson::JsonObject::new();
            properties.insert(
                DATETIME_COLUMN.to_string(),
                geojson::JsonValue::String(format_timestamp(time)),
            );
            geojson::Feature {
                bbox: None,
                geometry: Some(geojson::Geometry::new(geojson::Value::Point(vec![
                    point.longitude,
                    point.latitude,
                ]))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    let collection = geojson::FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    };

    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, &collection)
        .map_err(|e| ExportError::GeoJson(e.to_string()))?;
    writer.flush()?;
    Ok(())
}

/// Load a table back from a file written by [`write`]
pub fn read_table(path: &Path) -> Result<PositionTable> {
    match OutputFormat::from_path(path)? {
        OutputFormat::FlatGeobuf => read_flatgeobuf(path),
        OutputFormat::GeoJson => read_geojson(path),
    }
}

fn read_flatgeobuf(path: &Path) -> Result<PositionTable> {
    let mut reader = BufReader::new(File::open(path)?);
    let fgb = FgbReader::open(&mut reader).map_err(|e| ExportError::FlatGeobuf(e.to_string()))?;

    let crs = fgb.header().crs().map(|c| c.code());
    if crs != Some(EPSG_WGS84) {
        return Err(ExportError::FlatGeobuf(format!(
            "Expected EPSG:{EPSG_WGS84}, found {crs:?}"
        )));
    }

    let mut features = fgb
        .select_all()
        .map_err(|e| ExportError::FlatGeobuf(e.to_string()))?;

    let mut table = PositionTable::new();
    while let Some(feature) = features
        .next()
        .map_err(|e| ExportError::FlatGeobuf(e.to_string()))?
    {
        let properties = feature
            .properties()
            .map_err(|e| ExportError::FlatGeobuf(e.to_string()))?;
        let stamp = properties
            .get(DATETIME_COLUMN)
            .ok_or_else(|| ExportError::Timestamp(String::new()))?;
        let geometry = feature
            .to_geo()
            .map_err(|e| ExportError::Geometry(e.to_string()))?;
        table.push(parse_timestamp(stamp)?, point_of(&geometry)?)?;
    }
    Ok(table)
}

fn point_of(geometry: &Geometry<f64>) -> Result<SubPoint> {
    match geometry {
        Geometry::Point(p) => Ok(SubPoint {
            longitude: p.x(),
            latitude: p.y(),
        }),
        other => Err(ExportError::Geometry(format!("{other:?}"))),
    }
}

fn read_geojson(path: &Path) -> Result<PositionTable> {
    let text = std::fs::read_to_string(path)?;
    let geojson: geojson::GeoJson = text
        .parse()
        .map_err(|e: geojson::Error| ExportError::GeoJson(e.to_string()))?;
    let collection = match geojson {
        geojson::GeoJson::FeatureCollection(fc) => fc,
        _ => {
            return Err(ExportError::GeoJson(
                "Expected a FeatureCollection".to_string(),
            ))
        }
    };

    let mut table = PositionTable::with_capacity(collection.features.len());
    for feature in &collection.features {
        let stamp = feature
            .property(DATETIME_COLUMN)
            .and_then(|v| v.as_str())
            .ok_or_else(|| ExportError::Timestamp(String::new()))?;
        let point = match feature.geometry.as_ref().map(|g| &g.value) {
            Some(geojson::Value::Point(coords)) if coords.len() >= 2 => SubPoint {
                longitude: coords[0],
                latitude: coords[1],
            },
            other => return Err(ExportError::Geometry(format!("{other:?}"))),
        };
        table.push(parse_timestamp(stamp)?, point)?;
    }
    Ok(table)
}
