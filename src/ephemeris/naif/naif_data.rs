//! High-level loader for NAIF/JPL SPK ephemerides.
//!
//! This module ties together the DAF file record, the summary records, the segment directories
//! and the Chebyshev records:
//!
//! 1. Reads the **DAF header** to discover the binary layout (`ND`, `NI`, pointers).
//! 2. Walks the doubly linked list of **summary records** starting at `fward`.
//! 3. For each type 2 segment, reads the **directory footer** (`rsize`, `n_records`).
//! 4. Loads the **ephemeris records** of the segment and caches them in memory.
//!
//! The resulting [`NaifData`] interpolates the state of any `(target, center)` pair present in
//! the kernel, and chains the two segments giving the Earth with respect to the solar system
//! barycenter.
//!
//! # Units & time scales
//! * Times are **ET/TDB seconds from J2000** (consistent with SPK).
//! * Positions are **kilometers**, velocities are **km/s**.
use camino::Utf8Path;
use hifitime::Epoch;
use log::debug;
use nom::{bytes::complete::take, number::complete::le_f64, IResult};
use std::{
    collections::HashMap,
    fs::File,
    io::{BufReader, Read, Seek, SeekFrom},
};

use crate::{ephemeris::StateVector, skygeom_errors::SkyGeomError};

use super::{
    daf_header::{DAFHeader, DAF_RECORD_SIZE},
    directory::DirectoryData,
    ephemeris_record::EphemerisRecord,
    naif_ids::NaifIds,
    summary_record::{Summary, SPK_CHEBYSHEV_POSITION},
};

/// One decoded SPK segment.
#[derive(Debug, Clone)]
pub struct Segment {
    pub summary: Summary,
    pub directory: DirectoryData,
    pub records: Vec<EphemerisRecord>,
}

impl Segment {
    fn interpolate(&self, et_seconds: f64) -> (nalgebra::Vector3<f64>, nalgebra::Vector3<f64>) {
        let idx = self.directory.record_index(et_seconds);
        self.records[idx].interpolate(et_seconds)
    }
}

// (target_id, center_id) -> segments, in file order
type DafRecords = HashMap<(i32, i32), Vec<Segment>>;

/// In-memory bundle of a loaded NAIF/JPL SPK kernel.
#[derive(Debug, Clone)]
pub struct NaifData {
    pub(crate) daf_header: DAFHeader,
    pub(crate) jpl_data: DafRecords,
}

/// Control words of a summary record: next record, previous record, number of summaries.
fn parse_summary_control(input: &[u8]) -> IResult<&[u8], (f64, f64, f64)> {
    let (input, next) = le_f64(input)?;
    let (input, prev) = le_f64(input)?;
    let (input, nsum) = le_f64(input)?;
    Ok((input, (next, prev, nsum)))
}

fn read_record<R: Read + Seek>(
    file: &mut R,
    record_number: usize,
) -> Result<[u8; DAF_RECORD_SIZE], SkyGeomError> {
    let mut buffer = [0u8; DAF_RECORD_SIZE];
    file.seek(SeekFrom::Start(
        ((record_number - 1) * DAF_RECORD_SIZE) as u64,
    ))?;
    file.read_exact(&mut buffer)?;
    Ok(buffer)
}

impl NaifData {
    /// Load and decode a NAIF/JPL SPK file.
    ///
    /// Arguments
    /// -----------------
    /// * `file_path`: filesystem location of the SPK kernel.
    ///
    /// Return
    /// ----------
    /// * a fully populated [`NaifData`] with all type 2 segments indexed by `(target, center)`
    /// * [`SkyGeomError::JPLFileNotFound`] if the file cannot be opened, or a parsing error
    pub fn read_naif_file(file_path: &Utf8Path) -> Result<Self, SkyGeomError> {
        let file = File::open(file_path)
            .map_err(|_| SkyGeomError::JPLFileNotFound(file_path.to_string()))?;
        debug!("reading NAIF kernel {file_path}");
        NaifData::from_reader(&mut BufReader::new(file))
    }

    /// Decode an SPK kernel from any seekable reader.
    pub fn from_reader<R: Read + Seek>(file: &mut R) -> Result<Self, SkyGeomError> {
        let header_record = read_record(file, 1)?;
        let daf_header = DAFHeader::from_bytes(&header_record)?;
        let summary_words = daf_header.summary_size();

        let mut jpl_data: DafRecords = HashMap::new();
        let mut next_record = daf_header.fward as usize;
        let mut visited = 0usize;

        while next_record != 0 {
            visited += 1;
            if visited > 10_000 {
                return Err(SkyGeomError::InvalidDafFile(
                    "summary record chain does not terminate".into(),
                ));
            }

            let buffer = read_record(file, next_record)?;
            let (summaries, (next, _prev, nsum)) = parse_summary_control(&buffer)?;
            let nsum = nsum as usize;
            if 24 + nsum * summary_words * 8 > DAF_RECORD_SIZE {
                return Err(SkyGeomError::InvalidDafFile(format!(
                    "summary record {next_record} announces {nsum} summaries"
                )));
            }

            let mut input = summaries;
            for _ in 0..nsum {
                let (_, summary) = Summary::parse(input)?;
                let (rest, _) = take::<_, _, nom::error::Error<&[u8]>>(summary_words * 8)(input)?;
                input = rest;

                if summary.data_type != SPK_CHEBYSHEV_POSITION {
                    debug!("skipping SPK segment of type {}", summary.data_type);
                    continue;
                }

                let directory = DirectoryData::parse(file, summary.final_addr as usize)?;
                let records = EphemerisRecord::parse(
                    file,
                    summary.initial_addr as usize,
                    directory.rsize,
                    directory.n_records,
                )?;
                debug!("loaded segment {summary} ({} records)", records.len());

                jpl_data
                    .entry((summary.target, summary.center))
                    .or_default()
                    .push(Segment {
                        summary,
                        directory,
                        records,
                    });
            }

            next_record = next as usize;
        }

        Ok(NaifData {
            daf_header,
            jpl_data,
        })
    }

    /// File record of the kernel.
    pub fn header(&self) -> &DAFHeader {
        &self.daf_header
    }

    /// All `(target, center)` pairs present in the kernel.
    pub fn pairs(&self) -> Vec<(i32, i32)> {
        let mut pairs: Vec<_> = self.jpl_data.keys().copied().collect();
        pairs.sort_unstable();
        pairs
    }

    /// Interpolate **position** and **velocity** for a `(target, center)` at an ET epoch.
    ///
    /// Arguments
    /// -----------------
    /// * `target`: NAIF ID of the target body.
    /// * `center`: NAIF ID of the center.
    /// * `et_seconds`: Epoch in **ET seconds from J2000**.
    ///
    /// Return
    /// ----------
    /// * the state in km and km/s,
    /// * [`SkyGeomError::EphemerisSegmentMissing`] when the pair is not in the kernel,
    /// * [`SkyGeomError::EphemerisEpochOutOfRange`] when no segment covers the epoch.
    pub fn ephemeris(
        &self,
        target: NaifIds,
        center: NaifIds,
        et_seconds: f64,
    ) -> Result<StateVector, SkyGeomError> {
        let segments = self
            .jpl_data
            .get(&(target.to_id(), center.to_id()))
            .ok_or(SkyGeomError::EphemerisSegmentMissing {
                target: target.to_id(),
                center: center.to_id(),
            })?;

        let segment = segments
            .iter()
            .rev()
            .find(|segment| segment.summary.covers(et_seconds))
            .ok_or_else(|| SkyGeomError::EphemerisEpochOutOfRange {
                epoch: format!("{}", Epoch::from_et_seconds(et_seconds)),
            })?;

        let (position, velocity) = segment.interpolate(et_seconds);
        Ok(StateVector { position, velocity })
    }

    /// Barycentric state of the Earth: (Earth-Moon barycenter wrt SSB) + (Earth wrt EMB).
    pub fn earth_barycentric(&self, et_seconds: f64) -> Result<StateVector, SkyGeomError> {
        let emb = self.ephemeris(
            NaifIds::EarthMoonBarycenter,
            NaifIds::SolarSystemBarycenter,
            et_seconds,
        )?;
        let earth = self.ephemeris(NaifIds::Earth, NaifIds::EarthMoonBarycenter, et_seconds)?;
        Ok(StateVector {
            position: emb.position + earth.position,
            velocity: emb.velocity + earth.velocity,
        })
    }
}
