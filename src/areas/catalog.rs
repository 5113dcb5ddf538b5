//! Catalog of named administrative boundaries and the point-to-area lookup.

use crate::areas::error::CatalogError;
use crate::areas::resolved::ResolvedArea;
use log::warn;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

pub use crate::areas::geometry::ContainmentMode;
use crate::areas::geometry::Geometry;

/// Mapping applied to the nation name on a successful lookup.
///
/// County boundary catalogs and the nation-level catalogs used elsewhere in
/// the pipeline do not always agree on spelling ("Germany" vs "Deutschland"),
/// so the resolved nation is rewritten through this table. The mapping is
/// injectable; the default carries the one mismatch observed so far.
#[derive(Debug, Clone)]
pub struct NationTranslations(HashMap<String, String>);

impl Default for NationTranslations {
    fn default() -> Self {
        Self(HashMap::from([(
            "Germany".to_string(),
            "Deutschland".to_string(),
        )]))
    }
}

impl NationTranslations {
    /// A table that leaves every nation name untouched.
    pub fn empty() -> Self {
        Self(HashMap::new())
    }

    pub fn translate(&self, nation: &str) -> String {
        self.0
            .get(nation)
            .cloned()
            .unwrap_or_else(|| nation.to_string())
    }
}

impl FromIterator<(String, String)> for NationTranslations {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Deserialize)]
struct RawFeatureCollection {
    features: Vec<RawFeature>,
}

#[derive(Debug, Deserialize)]
struct RawFeature {
    #[serde(default)]
    geometry: Option<RawGeometry>,
    properties: RawProperties,
}

#[derive(Debug, Deserialize)]
struct RawGeometry {
    #[serde(default)]
    coordinates: Value,
}

#[derive(Debug, Deserialize)]
struct RawProperties {
    #[serde(rename = "NAME_0")]
    nation: String,
    #[serde(rename = "NAME_1")]
    state: String,
    #[serde(rename = "NAME_3")]
    county: String,
}

#[derive(Debug, Clone)]
struct AreaFeature {
    nation: String,
    state: String,
    county: String,
    /// `None` when the source coordinates could not be parsed; such a feature
    /// never contains any point.
    geometry: Option<Geometry>,
}

/// An ordered catalog of named administrative boundaries, queried by
/// coordinate.
///
/// Features are checked in catalog order and the first containing feature
/// wins; overlapping boundaries are not disambiguated further. The catalog is
/// immutable after load and safe to share across threads.
///
/// # Examples
///
/// ```
/// use klimastat::AreaCatalog;
/// use serde_json::json;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let catalog = AreaCatalog::from_geojson(&json!({
///     "features": [{
///         "geometry": {
///             "coordinates": [[[0.0, 0.0], [0.0, 10.0], [10.0, 10.0], [10.0, 0.0], [0.0, 0.0]]]
///         },
///         "properties": { "NAME_0": "Germany", "NAME_1": "Bavaria", "NAME_3": "Munich" }
///     }]
/// }))?;
///
/// let hit = catalog.resolve(5.0, 5.0);
/// assert_eq!(hit.nation.as_deref(), Some("Deutschland"));
/// assert_eq!(hit.county.as_deref(), Some("Munich"));
///
/// let miss = catalog.resolve(50.0, 50.0);
/// assert!(miss.is_unresolved());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct AreaCatalog {
    features: Vec<AreaFeature>,
    translations: NationTranslations,
    mode: ContainmentMode,
}

impl AreaCatalog {
    /// Builds a catalog from a parsed GeoJSON feature collection.
    ///
    /// Every feature must carry `NAME_0`/`NAME_1`/`NAME_3` properties; a
    /// missing name is a load error since downstream joins rely on them.
    /// Unparseable or absent geometry is tolerated: the catalog is externally
    /// sourced and occasionally irregular, so such a feature is kept (warned
    /// about) but can never contain a point.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Parse`] when the value is not a feature
    /// collection or a feature lacks its name properties.
    pub fn from_geojson(geojson: &Value) -> Result<Self, CatalogError> {
        let raw = RawFeatureCollection::deserialize(geojson)?;
        let features = raw
            .features
            .into_iter()
            .map(|feature| {
                let geometry = feature
                    .geometry
                    .as_ref()
                    .and_then(|g| Geometry::from_coordinates(&g.coordinates));
                if geometry.is_none() {
                    warn!(
                        "No usable boundary for feature {}/{}/{}; it will never match",
                        feature.properties.nation,
                        feature.properties.state,
                        feature.properties.county
                    );
                }
                AreaFeature {
                    nation: feature.properties.nation,
                    state: feature.properties.state,
                    county: feature.properties.county,
                    geometry,
                }
            })
            .collect();
        Ok(Self {
            features,
            translations: NationTranslations::default(),
            mode: ContainmentMode::default(),
        })
    }

    /// Builds a catalog from raw GeoJSON bytes.
    pub fn from_geojson_slice(bytes: &[u8]) -> Result<Self, CatalogError> {
        let value: Value = serde_json::from_slice(bytes)?;
        Self::from_geojson(&value)
    }

    /// Replaces the nation translation table.
    pub fn with_translations(mut self, translations: NationTranslations) -> Self {
        self.translations = translations;
        self
    }

    /// Selects how multi-part boundaries are tested; see [`ContainmentMode`].
    pub fn with_containment_mode(mut self, mode: ContainmentMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Returns the names of the first catalog feature containing the point
    /// `(lon, lat)` in degrees, with the nation name translated, or the
    /// all-null tuple when nothing contains it.
    ///
    /// Best effort by contract: non-finite coordinates and malformed
    /// boundaries resolve to "not contained" rather than failing.
    pub fn resolve(&self, lon: f64, lat: f64) -> ResolvedArea {
        if !lon.is_finite() || !lat.is_finite() {
            return ResolvedArea::unresolved();
        }
        let point = geo::Point::new(lon, lat);
        for feature in &self.features {
            let contained = feature
                .geometry
                .as_ref()
                .is_some_and(|geometry| geometry.contains(&point, self.mode));
            if contained {
                return ResolvedArea {
                    nation: Some(self.translations.translate(&feature.nation)),
                    state: Some(feature.state.clone()),
                    county: Some(feature.county.clone()),
                    source: crate::areas::resolved::AUTOMATED_SOURCE,
                };
            }
        }
        ResolvedArea::unresolved()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::areas::resolved::AUTOMATED_SOURCE;
    use serde_json::json;

    fn square_ring(x0: f64, y0: f64, size: f64) -> Value {
        json!([
            [x0, y0],
            [x0, y0 + size],
            [x0 + size, y0 + size],
            [x0 + size, y0],
            [x0, y0]
        ])
    }

    fn feature(nation: &str, state: &str, county: &str, coordinates: Value) -> Value {
        json!({
            "geometry": { "coordinates": coordinates },
            "properties": { "NAME_0": nation, "NAME_1": state, "NAME_3": county }
        })
    }

    fn munich_catalog() -> AreaCatalog {
        AreaCatalog::from_geojson(&json!({
            "features": [feature("Germany", "Bavaria", "Munich", json!([square_ring(0.0, 0.0, 10.0)]))]
        }))
        .unwrap()
    }

    #[test]
    fn resolves_with_nation_translation() {
        let resolved = munich_catalog().resolve(5.0, 5.0);
        assert_eq!(resolved.nation.as_deref(), Some("Deutschland"));
        assert_eq!(resolved.state.as_deref(), Some("Bavaria"));
        assert_eq!(resolved.county.as_deref(), Some("Munich"));
        assert_eq!(resolved.source, AUTOMATED_SOURCE);
    }

    #[test]
    fn miss_returns_all_null_with_source_tag() {
        let resolved = munich_catalog().resolve(50.0, 50.0);
        assert!(resolved.is_unresolved());
        assert_eq!(resolved.source, AUTOMATED_SOURCE);
    }

    #[test]
    fn non_finite_coordinates_do_not_resolve() {
        let catalog = munich_catalog();
        assert!(catalog.resolve(f64::NAN, 5.0).is_unresolved());
        assert!(catalog.resolve(5.0, f64::INFINITY).is_unresolved());
    }

    #[test]
    fn untranslated_nations_pass_through() {
        let catalog = AreaCatalog::from_geojson(&json!({
            "features": [feature("Austria", "Tyrol", "Innsbruck", json!([square_ring(0.0, 0.0, 10.0)]))]
        }))
        .unwrap();
        assert_eq!(
            catalog.resolve(5.0, 5.0).nation.as_deref(),
            Some("Austria")
        );
    }

    #[test]
    fn translation_table_is_injectable() {
        let catalog = munich_catalog().with_translations(NationTranslations::empty());
        assert_eq!(
            catalog.resolve(5.0, 5.0).nation.as_deref(),
            Some("Germany")
        );
    }

    #[test]
    fn first_match_in_catalog_order_wins() {
        let catalog = AreaCatalog::from_geojson(&json!({
            "features": [
                feature("Germany", "Bavaria", "Munich", json!([square_ring(0.0, 0.0, 10.0)])),
                feature("Germany", "Bavaria", "Freising", json!([square_ring(0.0, 0.0, 10.0)])),
            ]
        }))
        .unwrap();
        assert_eq!(
            catalog.resolve(5.0, 5.0).county.as_deref(),
            Some("Munich")
        );
    }

    #[test]
    fn containment_mode_controls_multi_polygon_lookups() {
        let geojson = json!({
            "features": [feature(
                "Germany",
                "Mecklenburg-Vorpommern",
                "Vorpommern-Rügen",
                json!([[square_ring(0.0, 0.0, 10.0)], [square_ring(100.0, 100.0, 10.0)]])
            )]
        });

        let corrected = AreaCatalog::from_geojson(&geojson).unwrap();
        assert!(!corrected.resolve(105.0, 105.0).is_unresolved());

        let literal = AreaCatalog::from_geojson(&geojson)
            .unwrap()
            .with_containment_mode(ContainmentMode::FirstPolygonOnly);
        assert!(literal.resolve(105.0, 105.0).is_unresolved());
        // The first part still matches in both modes.
        assert!(!literal.resolve(5.0, 5.0).is_unresolved());
    }

    #[test]
    fn malformed_geometry_degrades_to_not_contained() {
        let catalog = AreaCatalog::from_geojson(&json!({
            "features": [
                feature("Germany", "Bavaria", "Broken", json!("garbage")),
                feature("Germany", "Bavaria", "Munich", json!([square_ring(0.0, 0.0, 10.0)])),
            ]
        }))
        .unwrap();
        assert_eq!(catalog.len(), 2);
        // The broken feature is skipped, the later one still resolves.
        assert_eq!(
            catalog.resolve(5.0, 5.0).county.as_deref(),
            Some("Munich")
        );
    }

    #[test]
    fn missing_name_property_is_a_load_error() {
        let result = AreaCatalog::from_geojson(&json!({
            "features": [{
                "geometry": { "coordinates": [square_ring(0.0, 0.0, 10.0)] },
                "properties": { "NAME_0": "Germany", "NAME_1": "Bavaria" }
            }]
        }));
        assert!(matches!(result, Err(CatalogError::Parse(_))));
    }

    #[test]
    fn from_slice_parses_raw_bytes() {
        let bytes = serde_json::to_vec(&json!({
            "features": [feature("Germany", "Bavaria", "Munich", json!([square_ring(0.0, 0.0, 10.0)]))]
        }))
        .unwrap();
        let catalog = AreaCatalog::from_geojson_slice(&bytes).unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(!catalog.resolve(5.0, 5.0).is_unresolved());
    }
}
