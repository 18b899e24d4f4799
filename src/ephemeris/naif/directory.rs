//! Directory footer of an SPK type 2 segment.
//!
//! The last four double-precision words of a segment are:
//!
//! * `init` : initial epoch of the first record (ET seconds from J2000 TDB),
//! * `intlen` : length of the time span covered by each record (seconds),
//! * `rsize` : record size in **double-precision words**,
//! * `n_records` : number of records in the segment.
//!
//! A DAF address counts 8-byte words starting at 1, so the footer of a segment ending at address
//! `end_addr` starts at byte `(end_addr - 4) * 8`.

use std::io::{Read, Seek, SeekFrom};

use hifitime::{Duration, Epoch};
use nom::{number::complete::le_f64, IResult};

use crate::skygeom_errors::SkyGeomError;

#[derive(Debug, PartialEq, Clone)]
pub struct DirectoryData {
    pub init: f64,
    pub intlen: f64,
    pub rsize: usize,
    pub n_records: usize,
}

fn parse_footer(input: &[u8]) -> IResult<&[u8], (f64, f64, f64, f64)> {
    let (input, init) = le_f64(input)?;
    let (input, intlen) = le_f64(input)?;
    let (input, rsize) = le_f64(input)?;
    let (input, n_records) = le_f64(input)?;
    Ok((input, (init, intlen, rsize, n_records)))
}

impl DirectoryData {
    /// Read the footer of the segment ending at `end_addr`.
    ///
    /// Arguments
    /// -----------------
    /// * `file`: seekable reader over the kernel.
    /// * `end_addr`: final address of the segment in **double-precision words** (1-based).
    ///
    /// Return
    /// ----------
    /// * the directory data, or [`SkyGeomError::InvalidDafFile`] when the footer is inconsistent
    ///   (record too small to hold three Chebyshev series, non-positive interval).
    pub fn parse<R: Read + Seek>(file: &mut R, end_addr: usize) -> Result<Self, SkyGeomError> {
        if end_addr < 4 {
            return Err(SkyGeomError::InvalidDafFile(format!(
                "segment final address {end_addr} too small for a directory"
            )));
        }

        let mut dir_buf = [0u8; 32];
        file.seek(SeekFrom::Start(((end_addr - 4) * 8) as u64))?;
        file.read_exact(&mut dir_buf)?;

        let (_, (init, intlen, rsize, n_records)) = parse_footer(&dir_buf)?;

        if intlen.is_nan() || intlen <= 0.0 || rsize < 5.0 || n_records < 1.0 {
            return Err(SkyGeomError::InvalidDafFile(format!(
                "invalid segment directory: intlen={intlen} rsize={rsize} n={n_records}"
            )));
        }

        Ok(DirectoryData {
            init,
            intlen,
            rsize: rsize as usize,
            n_records: n_records as usize,
        })
    }

    /// Number of Chebyshev coefficients per axis: `(rsize - 2) / 3`.
    pub fn n_coeffs(&self) -> usize {
        (self.rsize - 2) / 3
    }

    /// Index of the record covering `et_seconds`, clamped to the last record.
    pub fn record_index(&self, et_seconds: f64) -> usize {
        let idx = ((et_seconds - self.init) / self.intlen).floor();
        if idx <= 0.0 {
            0
        } else {
            (idx as usize).min(self.n_records - 1)
        }
    }
}

impl std::fmt::Display for DirectoryData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "init {} | intlen {} | rsize {} | n_records {}",
            Epoch::from_et_seconds(self.init),
            Duration::from_seconds(self.intlen),
            self.rsize,
            self.n_records
        )
    }
}

#[cfg(test)]
mod test_directory {
    use super::*;
    use std::io::Cursor;

    fn footer_bytes(words: [f64; 4]) -> Cursor<Vec<u8>> {
        // two padding words, the footer occupies addresses 3..=6
        let mut bytes = vec![0u8; 16];
        for w in words {
            bytes.extend_from_slice(&w.to_le_bytes());
        }
        Cursor::new(bytes)
    }

    #[test]
    fn test_directory_parse() {
        let mut file = footer_bytes([-14200747200.0, 1382400.0, 41.0, 25112.0]);
        let dir = DirectoryData::parse(&mut file, 6).unwrap();
        assert_eq!(
            dir,
            DirectoryData {
                init: -14200747200.0,
                intlen: 1382400.0,
                rsize: 41,
                n_records: 25112,
            }
        );
        assert_eq!(dir.n_coeffs(), 13);
        assert_eq!(
            dir.to_string(),
            "init 1549-12-31T00:00:00 ET | intlen 16 days | rsize 41 | n_records 25112"
        );
    }

    #[test]
    fn test_record_index() {
        let dir = DirectoryData {
            init: 0.0,
            intlen: 100.0,
            rsize: 11,
            n_records: 3,
        };
        assert_eq!(dir.record_index(-5.0), 0);
        assert_eq!(dir.record_index(150.0), 1);
        // the end of the segment belongs to the last record
        assert_eq!(dir.record_index(300.0), 2);
    }

    #[test]
    fn test_invalid_directory() {
        let mut file = footer_bytes([0.0, 0.0, 41.0, 10.0]);
        assert!(matches!(
            DirectoryData::parse(&mut file, 6),
            Err(SkyGeomError::InvalidDafFile(_))
        ));
    }
}
