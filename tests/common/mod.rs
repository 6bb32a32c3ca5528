//! Test helpers: a minimal DAF/SPK writer
//!
//! Produces single-record Chebyshev segments whose position moves linearly
//! in time, which is enough to exercise the reader, the segment chains and
//! the whole sampling pipeline without shipping a binary ephemeris.

#![allow(dead_code)]

use std::path::Path;

use byteorder::{BigEndian, ByteOrder, LittleEndian};

pub const RECORD: usize = 1024;
pub const AU_KM: f64 = 149_597_870.7;

/// Coverage used by the standard fixtures, seconds past J2000 (1968 to 2063)
pub const START: f64 = -1.0e9;
pub const END: f64 = 2.0e9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Order {
    Little,
    Big,
}

/// One segment: position at the segment midpoint plus a constant velocity
#[derive(Debug, Clone)]
pub struct FixtureSegment {
    pub center: i32,
    pub target: i32,
    pub data_type: i32,
    pub start: f64,
    pub end: f64,
    pub position: [f64; 3],
    pub velocity: [f64; 3],
}

impl FixtureSegment {
    /// A body parked at `position` (km) for the standard coverage
    pub fn fixed(center: i32, target: i32, position: [f64; 3]) -> Self {
        Self {
            center,
            target,
            data_type: 2,
            start: START,
            end: END,
            position,
            velocity: [0.0; 3],
        }
    }

    pub fn moving(mut self, velocity: [f64; 3]) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_type(mut self, data_type: i32) -> Self {
        self.data_type = data_type;
        self
    }

    pub fn midpoint(&self) -> f64 {
        0.5 * (self.start + self.end)
    }

    /// Expected position at `et`
    pub fn position_at(&self, et: f64) -> [f64; 3] {
        let dt = et - self.midpoint();
        [
            self.position[0] + self.velocity[0] * dt,
            self.position[1] + self.velocity[1] * dt,
            self.position[2] + self.velocity[2] * dt,
        ]
    }

    /// Segment data: one record then the four-word directory
    fn words(&self) -> Vec<f64> {
        let radius = 0.5 * (self.end - self.start);
        let mut words = vec![self.midpoint(), radius];
        // Two coefficients per component: T0 = value at mid, T1 = slope * radius
        for k in 0..3 {
            words.push(self.position[k]);
            words.push(self.velocity[k] * radius);
        }
        if self.data_type == 3 {
            for k in 0..3 {
                words.push(self.velocity[k]);
                words.push(0.0);
            }
        }
        let record_size = words.len() as f64;
        words.extend([self.start, self.end - self.start, record_size, 1.0]);
        words
    }
}

struct Buffer {
    bytes: Vec<u8>,
    order: Order,
}

impl Buffer {
    fn f64(&mut self, offset: usize, value: f64) {
        let slot = &mut self.bytes[offset..offset + 8];
        match self.order {
            Order::Little => LittleEndian::write_f64(slot, value),
            Order::Big => BigEndian::write_f64(slot, value),
        }
    }

    fn i32(&mut self, offset: usize, value: i32) {
        let slot = &mut self.bytes[offset..offset + 4];
        match self.order {
            Order::Little => LittleEndian::write_i32(slot, value),
            Order::Big => BigEndian::write_i32(slot, value),
        }
    }

    fn text(&mut self, offset: usize, text: &str) {
        self.bytes[offset..offset + text.len()].copy_from_slice(text.as_bytes());
    }
}

/// Write an SPK file holding `segments`, with an optional comment record
pub fn write_spk(path: &Path, segments: &[FixtureSegment], order: Order, comment: Option<&str>) {
    let comment_records = usize::from(comment.is_some());
    let summary_record = 2 + comment_records;
    let data_record = summary_record + 2;

    let arrays: Vec<Vec<f64>> = segments.iter().map(FixtureSegment::words).collect();
    let data_words: usize = arrays.iter().map(Vec::len).sum();
    let data_bytes = data_words * 8;
    let total = (data_record - 1) * RECORD + data_bytes.div_ceil(RECORD) * RECORD;

    let mut buf = Buffer {
        bytes: vec![0u8; total.max(data_record * RECORD)],
        order,
    };

    // File record
    buf.text(0, "DAF/SPK ");
    buf.i32(8, 2);
    buf.i32(12, 6);
    buf.text(16, &format!("{:<60}", "EARTHSUNMOON TEST FIXTURE"));
    buf.i32(76, summary_record as i32);
    buf.i32(80, summary_record as i32);
    let first_word = (data_record - 1) * 128 + 1;
    buf.i32(84, (first_word + data_words) as i32);
    buf.text(
        88,
        match order {
            Order::Little => "LTL-IEEE",
            Order::Big => "BIG-IEEE",
        },
    );

    if let Some(comment) = comment {
        buf.text(RECORD, &comment[..comment.len().min(1000)]);
    }

    // Summary and name records
    let summary_base = (summary_record - 1) * RECORD;
    let name_base = summary_record * RECORD;
    buf.f64(summary_base, 0.0);
    buf.f64(summary_base + 8, 0.0);
    buf.f64(summary_base + 16, segments.len() as f64);

    let mut address = first_word;
    let mut data_offset = (data_record - 1) * RECORD;
    for (i, (segment, words)) in segments.iter().zip(&arrays).enumerate() {
        let base = summary_base + 24 + i * 40;
        buf.f64(base, segment.start);
        buf.f64(base + 8, segment.end);
        let ints = [
            segment.target,
            segment.center,
            1,
            segment.data_type,
            address as i32,
            (address + words.len() - 1) as i32,
        ];
        for (j, value) in ints.iter().enumerate() {
            buf.i32(base + 16 + 4 * j, *value);
        }
        buf.text(name_base + i * 40, &format!("SEG {} {}", segment.center, segment.target));

        for &word in words {
            buf.f64(data_offset, word);
            data_offset += 8;
        }
        address += words.len();
    }

    std::fs::write(path, &buf.bytes).unwrap();
}

/// Sun on the +X axis and the Moon on +Z as seen from Earth
pub fn sun_moon_segments() -> Vec<FixtureSegment> {
    vec![
        FixtureSegment::fixed(0, 10, [AU_KM, 0.0, 0.0]),
        FixtureSegment::fixed(0, 3, [0.0, 0.0, 0.0]),
        FixtureSegment::fixed(3, 399, [0.0, 0.0, -4_670.0]),
        FixtureSegment::fixed(3, 301, [0.0, 0.0, 379_730.0]),
    ]
}

/// Write the standard fixture as `<dir>/<name>`
pub fn write_sun_moon(dir: &Path, name: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    write_spk(&path, &sun_moon_segments(), Order::Little, None);
    path
}

/// Overwrite the NEXT pointer of the first summary record in a little-endian
/// fixture written without a comment record
pub fn set_next_summary(path: &Path, next: f64) {
    let mut bytes = std::fs::read(path).unwrap();
    LittleEndian::write_f64(&mut bytes[RECORD..RECORD + 8], next);
    std::fs::write(path, bytes).unwrap();
}
