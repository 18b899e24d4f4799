#![allow(dead_code)]

use approx::assert_abs_diff_eq;
use camino::Utf8PathBuf;
use nalgebra::Vector3;
use skygeom::{constants::AU, coordinates::SkyCoord};

const RECORD: usize = 1024;

pub fn scratch_dir(name: &str) -> Utf8PathBuf {
    let dir = Utf8PathBuf::from_path_buf(std::env::temp_dir())
        .unwrap()
        .join(format!("skygeom_it_{name}_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Type-2 segment with two constant records over `[-1e9, 1e9]` s past J2000 (1992 – 2031).
fn constant_segment(position_km: Vector3<f64>) -> Vec<f64> {
    let (start, intlen) = (-1e9, 1e9);
    let mut words = Vec::new();
    for k in 0..2 {
        let mid = start + intlen * (k as f64 + 0.5);
        words.extend([mid, intlen / 2.0]);
        for axis in 0..3 {
            words.extend([position_km[axis], 0.0]);
        }
    }
    words.extend([start, intlen, 8.0, 2.0]);
    words
}

/// Write a little-endian SPK kernel holding the Earth-Moon barycenter at a fixed barycentric
/// position (AU) and the Earth on the barycenter of the Earth-Moon system.
pub fn write_static_earth_kernel(name: &str, earth_au: Vector3<f64>) -> Utf8PathBuf {
    let segments = [
        (3, 0, constant_segment(earth_au * AU)),
        (399, 3, constant_segment(Vector3::zeros())),
    ];

    let mut file = vec![0u8; 3 * RECORD];
    file[..8].copy_from_slice(b"DAF/SPK ");
    file[8..12].copy_from_slice(&2i32.to_le_bytes());
    file[12..16].copy_from_slice(&6i32.to_le_bytes());
    file[76..80].copy_from_slice(&2i32.to_le_bytes());
    file[80..84].copy_from_slice(&2i32.to_le_bytes());
    file[88..96].copy_from_slice(b"LTL-IEEE");

    file[RECORD + 16..RECORD + 24].copy_from_slice(&(segments.len() as f64).to_le_bytes());
    for (i, (target, center, words)) in segments.iter().enumerate() {
        let initial = file.len() / 8 + 1;
        let final_addr = initial + words.len() - 1;
        for w in words {
            file.extend_from_slice(&w.to_le_bytes());
        }

        let mut summary = Vec::new();
        summary.extend_from_slice(&(-1e9f64).to_le_bytes());
        summary.extend_from_slice(&1e9f64.to_le_bytes());
        for v in [*target, *center, 1, 2, initial as i32, final_addr as i32] {
            summary.extend_from_slice(&v.to_le_bytes());
        }
        let at = RECORD + 24 + i * 40;
        file[at..at + 40].copy_from_slice(&summary);
    }

    let path = scratch_dir(name).join("static_earth.bsp");
    std::fs::write(&path, file).unwrap();
    path
}

pub fn assert_same_direction(actual: &SkyCoord, expected: &SkyCoord, epsilon_deg: f64) {
    assert_abs_diff_eq!(actual.separation(expected), 0.0, epsilon = epsilon_deg);
}
