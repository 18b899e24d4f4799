//! Registry of named observatories.
//!
//! The built-in sites are embedded in the binary as a small CSV table (`sites.csv`) and parsed
//! lazily on first lookup. Names and aliases are matched case-insensitively, ignoring leading and
//! trailing blanks. Custom sites can be registered on top of the built-in ones.
use std::collections::HashMap;

use itertools::Itertools;
use log::debug;
use once_cell::sync::OnceCell;
use serde::Deserialize;

use crate::constants::{Degree, Meter};
use crate::skygeom_errors::SkyGeomError;

use super::EarthLocation;

const BUILTIN_SITES: &str = include_str!("sites.csv");

/// One row of the embedded site table.
#[derive(Debug, Deserialize)]
struct SiteRecord {
    name: String,
    aliases: String,
    longitude: Degree,
    latitude: Degree,
    height: Meter,
    full_name: String,
}

/// Lookup table: canonical site key → location, plus alias → canonical key.
#[derive(Debug, Clone, Default)]
struct SiteTable {
    locations: HashMap<String, EarthLocation>,
    aliases: HashMap<String, String>,
}

#[derive(Debug, Clone, Default)]
pub struct SiteRegistry {
    builtin: OnceCell<SiteTable>,
    custom: HashMap<String, EarthLocation>,
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

impl SiteRegistry {
    pub fn new() -> Self {
        SiteRegistry::default()
    }

    fn builtin(&self) -> Result<&SiteTable, SkyGeomError> {
        self.builtin.get_or_try_init(|| {
            let table = parse_site_table(BUILTIN_SITES)?;
            debug!("loaded {} built-in observatory sites", table.locations.len());
            Ok(table)
        })
    }

    /// Register a custom site, shadowing any built-in site with the same name and its aliases.
    pub fn insert(&mut self, name: &str, location: EarthLocation) {
        self.custom.insert(normalize(name), location);
    }

    /// Resolve a site name (or alias) into its location.
    ///
    /// Arguments
    /// ---------
    /// * `name`: site name, case-insensitive (e.g. `"ctio"`, `"Cerro Tololo"`, `"LSST"`)
    ///
    /// Return
    /// ------
    /// * the site location, or [`SkyGeomError::UnknownSite`] listing the known names
    pub fn get(&self, name: &str) -> Result<&EarthLocation, SkyGeomError> {
        let key = normalize(name);
        if let Some(location) = self.custom.get(&key) {
            return Ok(location);
        }

        // a custom site shadows the aliases of the built-in site it replaces
        let table = self.builtin()?;
        let canonical = table.aliases.get(&key).unwrap_or(&key);
        self.custom
            .get(canonical)
            .or_else(|| table.locations.get(canonical))
            .ok_or_else(|| SkyGeomError::UnknownSite {
                name: name.to_string(),
                known: self.known_names().unwrap_or_default().join(", "),
            })
    }

    /// Sorted list of the canonical site names, built-in and custom.
    pub fn known_names(&self) -> Result<Vec<String>, SkyGeomError> {
        let table = self.builtin()?;
        Ok(table
            .locations
            .keys()
            .chain(self.custom.keys())
            .unique()
            .sorted()
            .cloned()
            .collect())
    }
}

fn parse_site_table(data: &str) -> Result<SiteTable, SkyGeomError> {
    let mut csv_reader = csv::Reader::from_reader(data.as_bytes());
    let mut table = SiteTable::default();

    for record in csv_reader.deserialize::<SiteRecord>() {
        let record = record.map_err(|err| SkyGeomError::SiteRegistryError(err.to_string()))?;
        let key = normalize(&record.name);
        let location =
            EarthLocation::from_geodetic(record.longitude, record.latitude, record.height)?
                .with_name(record.full_name);

        for alias in record
            .aliases
            .split('|')
            .map(normalize)
            .filter(|alias| !alias.is_empty())
        {
            table.aliases.insert(alias, key.clone());
        }
        table.locations.insert(key, location);
    }

    Ok(table)
}

#[cfg(test)]
mod sites_test {
    use super::*;

    #[test]
    fn test_builtin_ctio() {
        let registry = SiteRegistry::new();
        let ctio = registry.get("ctio").unwrap();
        assert_eq!(ctio.longitude, -70.815);
        assert_eq!(ctio.latitude, -30.16527778);
        assert_eq!(ctio.height, 2215.0);
        assert_eq!(
            ctio.name.as_deref(),
            Some("Cerro Tololo Interamerican Observatory")
        );
    }

    #[test]
    fn test_lookup_is_case_insensitive_with_aliases() {
        let registry = SiteRegistry::new();
        let rubin = registry.get("rubin").unwrap();
        assert_eq!(registry.get("  LSST ").unwrap(), rubin);
        assert_eq!(registry.get("Cerro Pachon").unwrap(), rubin);
        assert_eq!(registry.get("CTIO").unwrap(), registry.get("cerro tololo").unwrap());
    }

    #[test]
    fn test_unknown_site_lists_known_names() {
        let registry = SiteRegistry::new();
        let err = registry.get("atlantis").unwrap_err();
        match err {
            SkyGeomError::UnknownSite { name, known } => {
                assert_eq!(name, "atlantis");
                assert!(known.starts_with("cfht, ctio, greenwich"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_custom_site_shadows_builtin() {
        let mut registry = SiteRegistry::new();
        let home = EarthLocation::from_geodetic(2.35, 48.85, 35.0).unwrap();
        registry.insert("CTIO", home.clone());
        assert_eq!(registry.get("ctio").unwrap(), &home);
        assert_eq!(registry.get("Cerro Tololo").unwrap(), &home);
        assert_eq!(
            registry.get("cerro tololo interamerican observatory").unwrap(),
            &home
        );
        assert_eq!(registry.known_names().unwrap().len(), 10);

        // other built-in sites keep resolving through their aliases
        assert_eq!(registry.get("lsst").unwrap(), registry.get("rubin").unwrap());
        assert_ne!(registry.get("lsst").unwrap(), &home);
    }

    #[test]
    fn test_custom_site_named_like_an_alias() {
        let mut registry = SiteRegistry::new();
        let home = EarthLocation::from_geodetic(2.35, 48.85, 35.0).unwrap();
        registry.insert("kitt peak", home.clone());
        assert_eq!(registry.get("Kitt Peak").unwrap(), &home);
        assert_ne!(registry.get("kpno").unwrap(), &home);
    }

    #[test]
    fn test_malformed_table() {
        let err = parse_site_table("name,aliases,longitude,latitude,height,full_name\nx,,abc,0,0,X\n")
            .unwrap_err();
        assert!(matches!(err, SkyGeomError::SiteRegistryError(_)));
    }
}
