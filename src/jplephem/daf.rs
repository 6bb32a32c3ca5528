//! Double Array File format module for reading SPICE DAF files
//!
//! This module provides functionality for reading NAIF's Double Array File (DAF)
//! format, the container underneath SPK ephemeris files. The whole file is
//! memory mapped and records are decoded on demand.

use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use memmap2::{Mmap, MmapOptions};

use crate::jplephem::errors::{io_err, JplephemError, Result};

/// Size of a DAF record (bytes)
pub const RECORD_SIZE: usize = 1024;
/// Size of a double-precision value (bytes)
const DOUBLE_SIZE: usize = 8;
/// Upper bound on ND and NI accepted while sniffing the byte order
const MAX_COMPONENTS: u32 = 125;

/// DAF file endianness
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Endian {
    Big,
    Little,
}

impl Endian {
    /// Name used in the DAF `LOCFMT` header field
    pub fn locfmt(self) -> &'static str {
        match self {
            Endian::Big => "BIG-IEEE",
            Endian::Little => "LTL-IEEE",
        }
    }
}

/// One summary entry: the raw name bytes plus ND doubles and NI integers
#[derive(Debug, Clone)]
pub struct Summary {
    /// Segment name as stored in the name record
    pub name: Vec<u8>,
    /// ND double-precision components
    pub doubles: Vec<f64>,
    /// NI integer components
    pub integers: Vec<i32>,
}

impl Summary {
    /// Segment name with trailing blanks and NULs removed
    pub fn name_str(&self) -> String {
        String::from_utf8_lossy(&self.name)
            .trim_end_matches(|c: char| c == '\0' || c.is_whitespace())
            .to_string()
    }
}

/// Double Array File (DAF) file reader
pub struct DAF {
    /// Path to the DAF file
    pub path: PathBuf,
    /// File ID word (e.g. "DAF/SPK")
    pub locidw: String,
    /// Number of double-precision components per summary
    pub nd: u32,
    /// Number of integer components per summary
    pub ni: u32,
    /// Internal file name
    pub ifname: String,
    /// Forward pointer to first summary record
    pub fward: u32,
    /// Backward pointer to last summary record
    pub bward: u32,
    /// First free address
    pub free: u32,
    /// Byte order (endianness)
    pub endian: Endian,
    /// Memory map of the whole file
    map: Mmap,
    /// Size of each summary entry in double-words
    summary_length: usize,
}

impl DAF {
    /// Open a DAF file at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_buf = path.as_ref().to_path_buf();
        let file = File::open(&path_buf).map_err(|e| io_err(&path_buf, e))?;
        let len = file
            .metadata()
            .map_err(|e| io_err(&path_buf, e))?
            .len() as usize;
        if len < RECORD_SIZE {
            return Err(JplephemError::InvalidFormat(format!(
                "{} is too short to be a DAF file ({len} bytes)",
                path_buf.display()
            )));
        }

        // Safety: the map is read-only and ephemeris files are not rewritten in place.
        let map = unsafe { MmapOptions::new().map(&file) }.map_err(|e| io_err(&path_buf, e))?;

        let header = &map[..RECORD_SIZE];
        let locidw = String::from_utf8_lossy(&header[0..8]).trim_end().to_string();
        if !locidw.starts_with("DAF/") && locidw != "NAIF/DAF" {
            return Err(JplephemError::InvalidFormat(format!(
                "Unrecognised file ID word {locidw:?}"
            )));
        }
        let endian = Self::detect_endian(header)?;

        // File record layout:
        //   0..8    LOCIDW
        //   8..12   ND
        //   12..16  NI
        //   16..76  LOCIFN
        //   76..80  FWARD
        //   80..84  BWARD
        //   84..88  FREE
        //   88..96  LOCFMT
        let read_u32 = |bytes: &[u8]| match endian {
            Endian::Little => LittleEndian::read_u32(bytes),
            Endian::Big => BigEndian::read_u32(bytes),
        };
        let nd = read_u32(&header[8..12]);
        let ni = read_u32(&header[12..16]);
        let ifname = String::from_utf8_lossy(&header[16..76]).trim_end().to_string();
        let fward = read_u32(&header[76..80]);
        let bward = read_u32(&header[80..84]);
        let free = read_u32(&header[84..88]);

        if fward == 0 || bward == 0 {
            return Err(JplephemError::InvalidFormat(format!(
                "Invalid DAF header: nd={nd}, ni={ni}, fward={fward}, bward={bward}"
            )));
        }

        let daf = DAF {
            path: path_buf,
            locidw,
            nd,
            ni,
            ifname,
            fward,
            bward,
            free,
            endian,
            map,
            summary_length: nd as usize + (ni as usize).div_ceil(2),
        };

        log::debug!(
            "Opened DAF {}: {} nd={} ni={} fward={} format={}",
            daf.path.display(),
            daf.locidw,
            daf.nd,
            daf.ni,
            daf.fward,
            daf.endian.locfmt()
        );

        Ok(daf)
    }

    /// Determine the byte order, preferring the explicit LOCFMT field
    fn detect_endian(header: &[u8]) -> Result<Endian> {
        match &header[88..96] {
            b"LTL-IEEE" => return Ok(Endian::Little),
            b"BIG-IEEE" => return Ok(Endian::Big),
            _ => {}
        }

        // Older files predate LOCFMT; ND and NI are always small.
        let plausible = |nd: u32, ni: u32| (1..MAX_COMPONENTS).contains(&nd) && (1..MAX_COMPONENTS).contains(&ni);
        let (nd_le, ni_le) = (
            LittleEndian::read_u32(&header[8..12]),
            LittleEndian::read_u32(&header[12..16]),
        );
        let (nd_be, ni_be) = (
            BigEndian::read_u32(&header[8..12]),
            BigEndian::read_u32(&header[12..16]),
        );

        if plausible(nd_le, ni_le) {
            Ok(Endian::Little)
        } else if plausible(nd_be, ni_be) {
            Ok(Endian::Big)
        } else {
            Err(JplephemError::InvalidFormat(format!(
                "Cannot determine endianness: LE({nd_le},{ni_le}) BE({nd_be},{ni_be})"
            )))
        }
    }

    /// Binary file format name ("LTL-IEEE" or "BIG-IEEE")
    pub fn format(&self) -> &'static str {
        self.endian.locfmt()
    }

    /// Size of the file in bytes
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// True when the mapped file is empty
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Borrow a record (1024 bytes) by record number (1-indexed)
    pub fn read_record(&self, record_number: usize) -> Result<&[u8]> {
        if record_number < 1 {
            return Err(JplephemError::InvalidFormat(format!(
                "Invalid record number: {record_number}"
            )));
        }
        let offset = (record_number - 1)
            .checked_mul(RECORD_SIZE)
            .filter(|&offset| offset < self.map.len());
        offset
            .and_then(|offset| self.map.get(offset..offset + RECORD_SIZE))
            .ok_or_else(|| {
                JplephemError::InvalidFormat(format!(
                    "Record {record_number} lies beyond the end of {}",
                    self.path.display()
                ))
            })
    }

    /// Number of whole records in the file
    pub fn record_count(&self) -> usize {
        self.map.len() / RECORD_SIZE
    }

    /// Validate a record pointer stored as a double in a control area
    fn record_pointer(&self, value: f64) -> Result<usize> {
        if value.fract() != 0.0 || !(0.0..=self.record_count() as f64).contains(&value) {
            return Err(JplephemError::InvalidFormat(format!(
                "Record pointer {value} is outside {} ({} records)",
                self.path.display(),
                self.record_count()
            )));
        }
        Ok(value as usize)
    }

    /// Read comments from the comment area (records 2..fward)
    pub fn comments(&self) -> Result<String> {
        let mut comments = String::new();
        for record_number in 2..self.fward as usize {
            // Only the first 1000 bytes of a comment record hold text.
            let record = &self.read_record(record_number)?[..1000];
            comments.push_str(&String::from_utf8_lossy(record).replace('\0', "\n"));
        }
        Ok(comments
            .trim_end_matches(|c: char| c == '\0' || c.is_whitespace())
            .to_string())
    }

    /// Read the summary records and return every segment summary
    pub fn summaries(&self) -> Result<Vec<Summary>> {
        let mut result = Vec::new();
        let mut visited = HashSet::new();
        let summary_bytes = self.summary_length * DOUBLE_SIZE;
        let max_summaries = (RECORD_SIZE - 3 * DOUBLE_SIZE) / summary_bytes.max(DOUBLE_SIZE);

        let mut record_number = self.fward as usize;
        while record_number > 0 {
            if !visited.insert(record_number) {
                return Err(JplephemError::InvalidFormat(format!(
                    "Cycle in summary records at record {record_number}"
                )));
            }

            let summary_data = self.read_record(record_number)?;
            // The name record follows its summary record
            let name_data = self.read_record(record_number.saturating_add(1))?;

            // Control area: NEXT, PREV, NSUM stored as doubles
            let next = self.record_pointer(self.read_f64(&summary_data[0..8]))?;
            let n_summaries = self.read_f64(&summary_data[16..24]) as usize;
            if n_summaries > max_summaries {
                return Err(JplephemError::InvalidFormat(format!(
                    "Too many summaries in record {record_number}: {n_summaries} > {max_summaries}"
                )));
            }

            for i in 0..n_summaries {
                let start = 3 * DOUBLE_SIZE + i * summary_bytes;
                let bytes = &summary_data[start..start + summary_bytes];

                let doubles = (0..self.nd as usize)
                    .map(|j| self.read_f64(&bytes[j * DOUBLE_SIZE..(j + 1) * DOUBLE_SIZE]))
                    .collect();

                // Integers are packed two to a double slot after the doubles
                let int_base = self.nd as usize * DOUBLE_SIZE;
                let integers = (0..self.ni as usize)
                    .map(|j| {
                        let pos = int_base + j * 4;
                        match self.endian {
                            Endian::Little => LittleEndian::read_i32(&bytes[pos..pos + 4]),
                            Endian::Big => BigEndian::read_i32(&bytes[pos..pos + 4]),
                        }
                    })
                    .collect();

                let name_start = i * summary_bytes;
                let name = name_data[name_start..name_start + summary_bytes].to_vec();

                result.push(Summary {
                    name,
                    doubles,
                    integers,
                });
            }

            record_number = next;
        }

        Ok(result)
    }

    /// Read an array of f64 values given 1-indexed word addresses (inclusive)
    pub fn read_array(&self, start: usize, end: usize) -> Result<Vec<f64>> {
        if start < 1 || end < start {
            return Err(JplephemError::InvalidFormat(format!(
                "Invalid array bounds: start={start}, end={end}"
            )));
        }

        let byte_start = (start - 1) * DOUBLE_SIZE;
        let byte_end = end * DOUBLE_SIZE;
        let bytes = self.map.get(byte_start..byte_end).ok_or_else(|| {
            JplephemError::InvalidFormat(format!(
                "Array {start}..{end} lies beyond the end of {}",
                self.path.display()
            ))
        })?;

        Ok(bytes.chunks_exact(DOUBLE_SIZE).map(|b| self.read_f64(b)).collect())
    }

    /// Read an f64 from a byte slice using the file's endianness
    fn read_f64(&self, bytes: &[u8]) -> f64 {
        match self.endian {
            Endian::Big => BigEndian::read_f64(bytes),
            Endian::Little => LittleEndian::read_f64(bytes),
        }
    }
}

impl std::fmt::Debug for DAF {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DAF")
            .field("path", &self.path)
            .field("locidw", &self.locidw)
            .field("nd", &self.nd)
            .field("ni", &self.ni)
            .field("ifname", &self.ifname)
            .field("endian", &self.endian)
            .finish()
    }
}
