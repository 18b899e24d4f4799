//! # skygeom
//!
//! Sky-geometry helpers for synthetic observations:
//!
//! * [`distance_calc_helper`]: where a hypothetical object at a fixed barycentric distance
//!   appears from a ground-based observatory at a given time,
//! * [`wcs`]: gnomonic (TAN) projections of images with a requested field of view.
//!
//! Everything is computed through an explicit [`skygeom::SkyGeom`] context holding the
//! solar-system ephemeris, the observatory registry and the Earth-orientation environment.
pub mod constants;
pub mod coordinates;
pub mod distance_calc_helper;
pub mod env_state;
pub mod ephemeris;
pub mod observers;
pub mod ref_system;
pub mod skygeom;
pub mod skygeom_errors;
pub mod time;
pub mod wcs;
