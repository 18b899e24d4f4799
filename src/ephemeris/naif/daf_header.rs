//! DAF (Double Precision Array File) header parsing.
//!
//! The first 1024-byte record of a DAF container (an SPK kernel here) describes the layout of
//! the file: number of double and integer components of each array summary (`nd`, `ni`), record
//! numbers of the first and last summary records (`fward`, `bward`), first free address, and the
//! binary format tag (`locfmt`).
//!
//! # Layout of the file record
//!
//! ```text
//! offset  size  field
//!      0     8  idword      "DAF/SPK "
//!      8     4  nd          i32
//!     12     4  ni          i32
//!     16    60  ifname      internal file name
//!     76     4  fward       i32, 1-based record number
//!     80     4  bward       i32
//!     84     4  free        i32, 1-based DP-word address
//!     88     8  locfmt      "LTL-IEEE" / "BIG-IEEE"
//!     96   603  reserved
//!    699    28  ftpstr      FTP validation string
//! ```
//!
//! Only little-endian kernels (`LTL-IEEE`) are supported, which covers every planetary kernel
//! distributed by NAIF.

use std::fmt;

use nom::{bytes::complete::take, number::complete::le_i32, IResult};

use crate::skygeom_errors::SkyGeomError;

/// Size of one DAF record in bytes.
pub(crate) const DAF_RECORD_SIZE: usize = 1024;

/// In-memory representation of the DAF/SPK file record.
#[derive(Debug, PartialEq, Clone)]
pub struct DAFHeader {
    /// 8-byte identifier, typically `"DAF/SPK"`.
    pub idword: String,
    /// Internal kernel name.
    pub internal_filename: String,
    /// Number of double-precision components in each summary (ND).
    pub nd: i32,
    /// Number of integer components in each summary (NI).
    pub ni: i32,
    /// Record index of the first summary record (forward pointer).
    pub fward: i32,
    /// Record index of the last summary record (backward pointer).
    pub bward: i32,
    /// First free address (in double-precision words, 1-based).
    pub free: i32,
    /// Platform tag describing numeric representation (e.g. `"LTL-IEEE"`).
    pub locfmt: String,
}

fn trimmed(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_matches(|c: char| c.is_whitespace() || c == '\0')
        .to_string()
}

impl DAFHeader {
    /// Raw nom decoder for the file record, no validation.
    pub fn parse(input: &[u8]) -> IResult<&[u8], Self> {
        let (input, id_word) = take(8usize)(input)?;
        let (input, nd) = le_i32(input)?;
        let (input, ni) = le_i32(input)?;
        let (input, ifname) = take(60usize)(input)?;
        let (input, fward) = le_i32(input)?;
        let (input, bward) = le_i32(input)?;
        let (input, free) = le_i32(input)?;
        let (input, locfmt) = take(8usize)(input)?;
        let (input, _reserved) = take(603usize)(input)?;
        let (input, _ftpstr) = take(28usize)(input)?;
        Ok((
            input,
            DAFHeader {
                idword: trimmed(id_word),
                internal_filename: trimmed(ifname),
                nd,
                ni,
                fward,
                bward,
                free,
                locfmt: trimmed(locfmt),
            },
        ))
    }

    /// Decode and validate the file record of an SPK kernel.
    ///
    /// Arguments
    /// -----------------
    /// * `input`: the first 1024 bytes of the file.
    ///
    /// Return
    /// ----------
    /// * the header, or [`SkyGeomError::InvalidDafFile`] when the file is not a little-endian
    ///   DAF/SPK kernel or its summary layout is inconsistent.
    pub fn from_bytes(input: &[u8]) -> Result<Self, SkyGeomError> {
        let (_, header) = DAFHeader::parse(input)?;

        if header.idword != "DAF/SPK" {
            return Err(SkyGeomError::InvalidDafFile(format!(
                "unexpected identification word '{}'",
                header.idword
            )));
        }
        if header.locfmt != "LTL-IEEE" {
            return Err(SkyGeomError::InvalidDafFile(format!(
                "unsupported binary format '{}'",
                header.locfmt
            )));
        }
        if header.nd != 2 || header.ni != 6 || header.fward < 2 {
            return Err(SkyGeomError::InvalidDafFile(format!(
                "unexpected summary layout nd={} ni={} fward={}",
                header.nd, header.ni, header.fward
            )));
        }
        Ok(header)
    }

    /// Size of one array summary in double-precision words: `ND + ceil(NI / 2)`.
    pub fn summary_size(&self) -> usize {
        self.nd as usize + (self.ni as usize).div_ceil(2)
    }
}

impl fmt::Display for DAFHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = [
            ("ID Word", self.idword.clone()),
            ("Internal Name", self.internal_filename.clone()),
            ("ND (doubles)", self.nd.to_string()),
            ("NI (integers)", self.ni.to_string()),
            ("Forward Ptr", self.fward.to_string()),
            ("Backward Ptr", self.bward.to_string()),
            ("Free Addr", self.free.to_string()),
            ("Binary Format", self.locfmt.clone()),
        ];
        for (label, value) in rows {
            writeln!(f, "{label:<14}: {value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test_daf_header {
    use super::*;

    fn file_record(idword: &str, locfmt: &str) -> Vec<u8> {
        let mut buf = vec![0u8; DAF_RECORD_SIZE];
        buf[..8].copy_from_slice(format!("{idword:<8}").as_bytes());
        buf[8..12].copy_from_slice(&2i32.to_le_bytes());
        buf[12..16].copy_from_slice(&6i32.to_le_bytes());
        buf[16..76].copy_from_slice(format!("{:<60}", "SYNTHETIC").as_bytes());
        buf[76..80].copy_from_slice(&2i32.to_le_bytes());
        buf[80..84].copy_from_slice(&2i32.to_le_bytes());
        buf[84..88].copy_from_slice(&400i32.to_le_bytes());
        buf[88..96].copy_from_slice(format!("{locfmt:<8}").as_bytes());
        buf
    }

    #[test]
    fn test_parse_valid_header() {
        let header = DAFHeader::from_bytes(&file_record("DAF/SPK", "LTL-IEEE")).unwrap();
        assert_eq!(
            header,
            DAFHeader {
                idword: "DAF/SPK".into(),
                internal_filename: "SYNTHETIC".into(),
                nd: 2,
                ni: 6,
                fward: 2,
                bward: 2,
                free: 400,
                locfmt: "LTL-IEEE".into(),
            }
        );
        assert_eq!(header.summary_size(), 5);
    }

    #[test]
    fn test_reject_big_endian_and_foreign_files() {
        assert!(matches!(
            DAFHeader::from_bytes(&file_record("DAF/SPK", "BIG-IEEE")),
            Err(SkyGeomError::InvalidDafFile(_))
        ));
        assert!(matches!(
            DAFHeader::from_bytes(&file_record("DAF/PCK", "LTL-IEEE")),
            Err(SkyGeomError::InvalidDafFile(_))
        ));
    }

    #[test]
    fn test_truncated_record() {
        assert!(matches!(
            DAFHeader::from_bytes(&[0u8; 100]),
            Err(SkyGeomError::NomParsingError(_))
        ));
    }

    #[test]
    fn test_display() {
        let header = DAFHeader::from_bytes(&file_record("DAF/SPK", "LTL-IEEE")).unwrap();
        let output = format!("{header}");
        assert!(output.starts_with("ID Word       : DAF/SPK\n"));
        assert_eq!(output.lines().count(), 8);
    }
}
