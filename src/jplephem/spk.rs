//! Spacecraft Planet Kernel (SPK) format handling
//!
//! Reads the segment table of an SPK file and evaluates Chebyshev segments
//! (types 2 and 3) for positions in kilometres, relative to each segment's
//! center, in the ICRF.
//!
//! The SPK format is described in:
//! http://naif.jpl.nasa.gov/pub/naif/toolkit_docs/FORTRAN/req/spk.html

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

use nalgebra::Vector3;

use crate::constants::{DAY_S, J2000};
use crate::jplephem::calendar::format_date;
use crate::jplephem::chebyshev::{normalize_time, ChebyshevPolynomial};
use crate::jplephem::daf::{Summary, DAF};
use crate::jplephem::errors::{JplephemError, Result};
use crate::jplephem::names::display_name;

/// Convert TDB seconds since J2000 to a Julian date
pub fn seconds_to_jd(seconds: f64) -> f64 {
    J2000 + seconds / DAY_S
}

/// Convert a Julian date to TDB seconds since J2000
pub fn jd_to_seconds(jd: f64) -> f64 {
    (jd - J2000) * DAY_S
}

/// Spacecraft Planet Kernel (SPK) file reader
pub struct SPK {
    /// The underlying DAF file
    pub daf: DAF,
    /// Segments in file order
    pub segments: Vec<Segment>,
    /// Map of (center, target) pairs to the last segment covering them
    pairs: HashMap<(i32, i32), usize>,
}

/// A segment in an SPK file holding a Chebyshev series for one body
pub struct Segment {
    /// Segment name (e.g. "DE-0440LE-0440")
    pub source: String,
    /// Initial epoch in seconds since J2000
    pub start_second: f64,
    /// Final epoch in seconds since J2000
    pub end_second: f64,
    /// Target body ID
    pub target: i32,
    /// Center body ID
    pub center: i32,
    /// Reference frame ID
    pub frame: i32,
    /// Data type (2: position only, 3: position and velocity)
    pub data_type: i32,
    /// First word address of the segment data
    pub start_i: usize,
    /// Last word address of the segment data
    pub end_i: usize,
    /// Start Julian date
    pub start_jd: f64,
    /// End Julian date
    pub end_jd: f64,
    data: OnceLock<SegmentData>,
}

/// Decoded segment data
struct SegmentData {
    /// Initial epoch of the first record
    init: f64,
    /// Length of each record's interval in seconds
    intlen: f64,
    /// All records, directory excluded
    records: Vec<f64>,
    /// Record size in double-precision words
    record_size: usize,
    /// Number of records
    n_records: usize,
    /// Coefficients per coordinate
    n_coeffs: usize,
}

impl SPK {
    /// Open an SPK file at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let daf = DAF::open(path)?;
        if daf.nd != 2 || daf.ni != 6 {
            return Err(JplephemError::InvalidFormat(format!(
                "SPK summaries need ND=2 and NI=6, found ND={} NI={}",
                daf.nd, daf.ni
            )));
        }

        let segments: Vec<Segment> = daf
            .summaries()?
            .iter()
            .map(Segment::from_summary)
            .collect();

        let pairs = segments
            .iter()
            .enumerate()
            .map(|(i, seg)| ((seg.center, seg.target), i))
            .collect();

        log::debug!(
            "Loaded {} segments from {}",
            segments.len(),
            daf.path.display()
        );

        Ok(SPK {
            daf,
            segments,
            pairs,
        })
    }

    /// Return the segment for the given center and target body IDs
    pub fn get_segment(&self, center: i32, target: i32) -> Result<&Segment> {
        self.pairs
            .get(&(center, target))
            .map(|&idx| &self.segments[idx])
            .ok_or(JplephemError::BodyNotFound { center, target })
    }

    /// Position of `target` relative to `center` in km at TDB seconds past J2000
    pub fn compute(&self, center: i32, target: i32, tdb_seconds: f64) -> Result<Vector3<f64>> {
        self.get_segment(center, target)?
            .compute(&self.daf, tdb_seconds)
    }

    /// Read the comments from the SPK file
    pub fn comments(&self) -> Result<String> {
        self.daf.comments()
    }

    /// Earliest and latest Julian dates covered by any segment
    pub fn coverage(&self) -> Option<(f64, f64)> {
        self.segments.iter().fold(None, |acc, seg| match acc {
            None => Some((seg.start_jd, seg.end_jd)),
            Some((lo, hi)) => Some((lo.min(seg.start_jd), hi.max(seg.end_jd))),
        })
    }
}

impl fmt::Display for SPK {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "File type {} and format {} with {} segments:",
            self.daf.locidw,
            self.daf.format(),
            self.segments.len()
        )?;
        for segment in &self.segments {
            write!(f, "\n{segment}")?;
        }
        Ok(())
    }
}

impl Segment {
    fn from_summary(summary: &Summary) -> Self {
        let start_second = summary.doubles[0];
        let end_second = summary.doubles[1];
        let ints = &summary.integers;
        Segment {
            source: summary.name_str(),
            start_second,
            end_second,
            target: ints[0],
            center: ints[1],
            frame: ints[2],
            data_type: ints[3],
            start_i: ints[4].max(0) as usize,
            end_i: ints[5].max(0) as usize,
            start_jd: seconds_to_jd(start_second),
            end_jd: seconds_to_jd(end_second),
            data: OnceLock::new(),
        }
    }

    /// Compute position in km at TDB seconds past J2000
    pub fn compute(&self, daf: &DAF, et: f64) -> Result<Vector3<f64>> {
        if et < self.start_second || et > self.end_second {
            return Err(JplephemError::OutOfRangeError {
                jd: seconds_to_jd(et),
                start_jd: self.start_jd,
                end_jd: self.end_jd,
            });
        }

        let data = self.load_data(daf)?;
        let index = data.record_index(et);
        let record = &data.records[index * data.record_size..(index + 1) * data.record_size];
        let (mid, radius) = (record[0], record[1]);
        let x = normalize_time(et, mid, radius)?;

        // Position series come first in both type 2 and type 3 records
        let n = data.n_coeffs;
        let component = |k: usize| {
            ChebyshevPolynomial::new(&record[2 + k * n..2 + (k + 1) * n]).evaluate(x)
        };
        Ok(Vector3::new(component(0), component(1), component(2)))
    }

    fn load_data(&self, daf: &DAF) -> Result<&SegmentData> {
        if let Some(data) = self.data.get() {
            return Ok(data);
        }

        let components = match self.data_type {
            2 => 3,
            3 => 6,
            other => return Err(JplephemError::UnsupportedDataType(other)),
        };

        let array = daf.read_array(self.start_i, self.end_i)?;
        let data = SegmentData::from_array(array, components)?;
        log::trace!(
            "Loaded segment {} -> {}: {} records of {} words",
            self.center,
            self.target,
            data.n_records,
            data.record_size
        );

        // A concurrent loader may have won; either copy is identical.
        let _ = self.data.set(data);
        self.data
            .get()
            .ok_or_else(|| JplephemError::InvalidFormat("Segment data was not cached".into()))
    }

    /// Return a textual description of the segment
    pub fn describe(&self, verbose: bool) -> String {
        let mut text = format!(
            "{}..{}  Type {}  {} ({}) -> {} ({})",
            format_date(self.start_jd),
            format_date(self.end_jd),
            self.data_type,
            display_name(self.center),
            self.center,
            display_name(self.target),
            self.target
        );
        if verbose {
            text.push_str(&format!(
                "\n  frame={} source={}",
                self.frame,
                if self.source.is_empty() {
                    "Unknown"
                } else {
                    &self.source
                }
            ));
        }
        text
    }
}

impl SegmentData {
    fn from_array(mut array: Vec<f64>, components: usize) -> Result<Self> {
        // The last 4 words are the directory: init, intlen, rsize, n_rec
        if array.len() < 4 {
            return Err(JplephemError::InvalidFormat(
                "Segment data array too small for a directory".to_string(),
            ));
        }
        let n = array.len();
        let init = array[n - 4];
        let intlen = array[n - 3];
        let record_size = array[n - 2] as usize;
        let n_records = array[n - 1] as usize;

        if record_size < 2 + components || n_records == 0 || intlen <= 0.0 {
            return Err(JplephemError::InvalidFormat(format!(
                "Invalid segment directory: rsize={record_size} n_rec={n_records} intlen={intlen}"
            )));
        }
        let expected = n_records
            .checked_mul(record_size)
            .and_then(|words| words.checked_add(4));
        if expected != Some(n) {
            return Err(JplephemError::InvalidFormat(format!(
                "Inconsistent array size: {n_records} records of {record_size} words in {n}"
            )));
        }

        array.truncate(n - 4);
        Ok(SegmentData {
            init,
            intlen,
            records: array,
            record_size,
            n_records,
            n_coeffs: (record_size - 2) / components,
        })
    }

    fn record_index(&self, et: f64) -> usize {
        // The segment end equals the end of the last record, not a new one
        let index = ((et - self.init) / self.intlen).floor();
        if index < 0.0 {
            0
        } else {
            (index as usize).min(self.n_records - 1)
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe(false))
    }
}

impl fmt::Debug for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe(true))
    }
}
