//! Ephemeris record decoding and Chebyshev interpolation (SPK type 2).
//!
//! A record stores, as little-endian `f64`:
//! 1. `mid` (ET seconds from J2000 TDB),
//! 2. `radius` (seconds),
//! 3. `ncoeff` Chebyshev coefficients for X (km),
//! 4. `ncoeff` for Y (km),
//! 5. `ncoeff` for Z (km).
//!
//! The normalized time is `τ = (et - mid) / radius`. Position is `Σ cₙ Tₙ(τ)` and velocity is
//! `Σ cₙ T'ₙ(τ) / radius`, in km and km/s.
use std::{
    fmt,
    io::{Read, Seek, SeekFrom},
};

use hifitime::{Duration, Epoch};
use nalgebra::Vector3;
use nom::{multi::count, number::complete::le_f64, IResult};

use crate::skygeom_errors::SkyGeomError;

#[derive(Debug, Clone, PartialEq)]
pub struct EphemerisRecord {
    /// Midpoint of the record time span (ET seconds from J2000 TDB).
    pub mid: f64,
    /// Half-width of the record interval (seconds).
    pub radius: f64,
    /// Chebyshev coefficients for X (km).
    pub x: Vec<f64>,
    /// Chebyshev coefficients for Y (km).
    pub y: Vec<f64>,
    /// Chebyshev coefficients for Z (km).
    pub z: Vec<f64>,
}

fn chebyshev_sum(coeffs: &[f64], basis: &[f64]) -> f64 {
    coeffs.iter().zip(basis).map(|(c, p)| c * p).sum()
}

impl EphemerisRecord {
    fn parse_record(input: &[u8], ncoeff: usize) -> IResult<&[u8], EphemerisRecord> {
        let (input, mid) = le_f64(input)?;
        let (input, radius) = le_f64(input)?;
        let (input, x) = count(le_f64, ncoeff)(input)?;
        let (input, y) = count(le_f64, ncoeff)(input)?;
        let (input, z) = count(le_f64, ncoeff)(input)?;

        Ok((
            input,
            EphemerisRecord {
                mid,
                radius,
                x,
                y,
                z,
            },
        ))
    }

    /// Read `n_records` contiguous records of `rsize` words starting at `segment_start_addr`.
    ///
    /// Arguments
    /// -----------------
    /// * `file`: seekable reader over the kernel.
    /// * `segment_start_addr`: start address of the segment in **DP-words** (1-based).
    /// * `rsize`: record size in **DP-words**.
    /// * `n_records`: number of records to read.
    ///
    /// Return
    /// ----------
    /// * the decoded records in order, or an I/O / parsing error.
    pub fn parse<R: Read + Seek>(
        file: &mut R,
        segment_start_addr: usize,
        rsize: usize,
        n_records: usize,
    ) -> Result<Vec<Self>, SkyGeomError> {
        if segment_start_addr == 0 {
            return Err(SkyGeomError::InvalidDafFile(
                "segment start address must be at least 1".into(),
            ));
        }

        let n_coeffs = (rsize - 2) / 3;
        let mut buf = vec![0u8; rsize * 8];
        file.seek(SeekFrom::Start(((segment_start_addr - 1) * 8) as u64))?;

        (0..n_records)
            .map(|_| {
                file.read_exact(&mut buf)?;
                let (_, record) = Self::parse_record(&buf, n_coeffs)?;
                if record.radius <= 0.0 {
                    return Err(SkyGeomError::InvalidDafFile(format!(
                        "record radius must be positive, got {}",
                        record.radius
                    )));
                }
                Ok(record)
            })
            .collect()
    }

    /// Interpolate Cartesian **position** (km) and **velocity** (km/s) at an ET epoch.
    ///
    /// The normalized time is clamped to `[-1, 1]`.
    pub fn interpolate(&self, ephem_time: f64) -> (Vector3<f64>, Vector3<f64>) {
        let t = ((ephem_time - self.mid) / self.radius).clamp(-1.0, 1.0);

        let n = self.x.len();
        let mut poly = vec![0.0; n];
        let mut deriv = vec![0.0; n];
        if n > 0 {
            poly[0] = 1.0;
        }
        if n > 1 {
            poly[1] = t;
            deriv[1] = 1.0;
        }
        // T_n = 2t T_{n-1} - T_{n-2}, T'_n = 2t T'_{n-1} + 2 T_{n-1} - T'_{n-2}
        for k in 2..n {
            poly[k] = 2.0 * t * poly[k - 1] - poly[k - 2];
            deriv[k] = 2.0 * t * deriv[k - 1] + 2.0 * poly[k - 1] - deriv[k - 2];
        }

        let position = Vector3::new(
            chebyshev_sum(&self.x, &poly),
            chebyshev_sum(&self.y, &poly),
            chebyshev_sum(&self.z, &poly),
        );
        let velocity = Vector3::new(
            chebyshev_sum(&self.x, &deriv),
            chebyshev_sum(&self.y, &deriv),
            chebyshev_sum(&self.z, &deriv),
        ) / self.radius;

        (position, velocity)
    }
}

impl fmt::Display for EphemerisRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "record mid {} radius {} ({} coefficients per axis)",
            Epoch::from_et_seconds(self.mid),
            Duration::from_seconds(self.radius),
            self.x.len()
        )?;
        for (axis, coeffs) in [("x", &self.x), ("y", &self.y), ("z", &self.z)] {
            let line = coeffs
                .iter()
                .map(|c| format!("{c:+.6e}"))
                .collect::<Vec<_>>()
                .join(" ");
            writeln!(f, "  {axis}: {line}")?;
        }
        Ok(())
    }
}
