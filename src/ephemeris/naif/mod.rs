//! Reader for NAIF SPK kernels (DAF container, type 2 Chebyshev segments).
pub mod daf_header;
pub mod directory;
pub mod ephemeris_record;
pub mod naif_data;
pub mod naif_ids;
pub mod naif_version;
pub mod summary_record;
