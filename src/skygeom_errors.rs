use thiserror::Error;

use crate::constants::Degree;

#[derive(Error, Debug)]
pub enum SkyGeomError {
    #[error("Invalid ephemeris file source: {0}")]
    InvalidEphemFileSource(String),

    #[error("Invalid JPL ephemeris file version: {0}")]
    InvalidJPLEphemFileVersion(String),

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[cfg(feature = "jpl-download")]
    #[error("HTTP reqwest error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("Base dir creation error for JPL ephemeris file: {0}")]
    UnableToCreateBaseDir(String),

    #[error("UTF-8 Path error: {0}")]
    Utf8PathError(String),

    #[error("JPL File not found at: {0}")]
    JPLFileNotFound(String),

    #[error("Invalid DAF file: {0}")]
    InvalidDafFile(String),

    #[error("Error during the nom parsing: {0}")]
    NomParsingError(String),

    #[error("No ephemeris segment for target {target} with respect to center {center}")]
    EphemerisSegmentMissing { target: i32, center: i32 },

    #[error("Epoch {epoch} is outside the ephemeris coverage")]
    EphemerisEpochOutOfRange { epoch: String },

    #[error("Unknown observatory site '{name}' (known sites: {known})")]
    UnknownSite { name: String, known: String },

    #[error("Unable to read the observatory registry: {0}")]
    SiteRegistryError(String),

    #[error("Invalid observation time '{0}'")]
    InvalidObsTime(String),

    #[error("Invalid distance: {0} (must be positive and finite)")]
    InvalidDistance(f64),

    #[error("Invalid right ascension: {0} deg (must be finite)")]
    InvalidRightAscension(Degree),

    #[error("Invalid declination: {0} deg (must lie in [-90, 90])")]
    InvalidDeclination(Degree),

    #[error("Coordinate frame {found} does not match the expected frame {expected}")]
    FrameMismatch { expected: String, found: String },

    #[error("Invalid image shape {0:?}: every dimension must be at least 1")]
    InvalidImageShape([usize; 2]),

    #[error("Invalid field of view: {0} deg (must lie in (0, 180))")]
    InvalidFieldOfView(Degree),

    #[error("Sky position is not projectable on the tangent plane of the reference point")]
    NotProjectable,

    #[error("Field of view solver did not converge after {iterations} iterations (target {target} deg)")]
    FovSolverDidNotConverge { target: Degree, iterations: usize },

    #[error("ROOTS finding error: {0}")]
    RootFindingError(#[from] roots::SearchError),
}

impl PartialEq for SkyGeomError {
    fn eq(&self, other: &Self) -> bool {
        use SkyGeomError::*;
        match (self, other) {
            (InvalidEphemFileSource(a), InvalidEphemFileSource(b)) => a == b,
            (InvalidJPLEphemFileVersion(a), InvalidJPLEphemFileVersion(b)) => a == b,

            // not comparable: equal when the variant matches
            (IoError(_), IoError(_)) => true,
            #[cfg(feature = "jpl-download")]
            (ReqwestError(_), ReqwestError(_)) => true,

            (UnableToCreateBaseDir(a), UnableToCreateBaseDir(b)) => a == b,
            (Utf8PathError(a), Utf8PathError(b)) => a == b,
            (JPLFileNotFound(a), JPLFileNotFound(b)) => a == b,
            (InvalidDafFile(a), InvalidDafFile(b)) => a == b,
            (NomParsingError(a), NomParsingError(b)) => a == b,
            (
                EphemerisSegmentMissing {
                    target: t1,
                    center: c1,
                },
                EphemerisSegmentMissing {
                    target: t2,
                    center: c2,
                },
            ) => t1 == t2 && c1 == c2,
            (EphemerisEpochOutOfRange { epoch: a }, EphemerisEpochOutOfRange { epoch: b }) => {
                a == b
            }
            (UnknownSite { name: a, .. }, UnknownSite { name: b, .. }) => a == b,
            (SiteRegistryError(a), SiteRegistryError(b)) => a == b,
            (InvalidObsTime(a), InvalidObsTime(b)) => a == b,
            (InvalidDistance(a), InvalidDistance(b)) => a == b,
            (InvalidRightAscension(a), InvalidRightAscension(b)) => a == b,
            (InvalidDeclination(a), InvalidDeclination(b)) => a == b,
            (
                FrameMismatch {
                    expected: e1,
                    found: f1,
                },
                FrameMismatch {
                    expected: e2,
                    found: f2,
                },
            ) => e1 == e2 && f1 == f2,
            (InvalidImageShape(a), InvalidImageShape(b)) => a == b,
            (InvalidFieldOfView(a), InvalidFieldOfView(b)) => a == b,
            (
                FovSolverDidNotConverge {
                    target: t1,
                    iterations: i1,
                },
                FovSolverDidNotConverge {
                    target: t2,
                    iterations: i2,
                },
            ) => t1 == t2 && i1 == i2,
            (RootFindingError(a), RootFindingError(b)) => a == b,

            (NotProjectable, NotProjectable) => true,

            _ => false,
        }
    }
}

impl From<nom::Err<nom::error::Error<&[u8]>>> for SkyGeomError {
    fn from(err: nom::Err<nom::error::Error<&[u8]>>) -> Self {
        SkyGeomError::NomParsingError(format!("{:?}", err.map_input(|i| i.len())))
    }
}
