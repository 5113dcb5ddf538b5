//! Boundary geometry for one catalog feature.
//!
//! GeoJSON coordinate arrays in the source catalogs nest to different depths:
//! some regions are a single polygon, some are multi-polygons, some wrap
//! multi-polygons in further lists. The structural probing happens exactly
//! once, at catalog load, and produces a tagged [`Geometry`]; containment
//! tests afterwards are plain `geo` predicate calls.

use geo::{Contains, Coord, LineString, MultiPolygon, Point, Polygon};
use serde_json::Value;

/// How multi-part geometries are tested for containment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContainmentMode {
    /// A multi-polygon contains a point when any of its parts does.
    #[default]
    AllPolygons,
    /// Only the first part found during the coordinate descent is tested.
    ///
    /// This reproduces the historic resolver behavior, which returned the
    /// first part's result immediately instead of checking the remaining
    /// parts. Kept selectable so existing resolutions can be replayed.
    FirstPolygonOnly,
}

/// A feature boundary, reduced at load time to its exterior rings.
///
/// Interior rings (holes) are not carried: containment against the first ring
/// of each part is treated as sufficient for this catalog.
#[derive(Debug, Clone)]
pub enum Geometry {
    Polygon(Polygon<f64>),
    MultiPolygon(MultiPolygon<f64>),
}

impl Geometry {
    /// Builds a geometry from a GeoJSON `coordinates` value of arbitrary
    /// nesting depth. Returns `None` when no well-formed ring is found;
    /// malformed rings inside an otherwise valid structure are skipped.
    pub fn from_coordinates(coordinates: &Value) -> Option<Geometry> {
        let mut parts = Vec::new();
        collect_polygons(coordinates, &mut parts);
        match parts.len() {
            0 => None,
            1 => Some(Geometry::Polygon(parts.pop().expect("len checked"))),
            _ => Some(Geometry::MultiPolygon(MultiPolygon(parts))),
        }
    }

    /// Tests whether the point lies within the boundary.
    pub fn contains(&self, point: &Point<f64>, mode: ContainmentMode) -> bool {
        match self {
            Geometry::Polygon(polygon) => polygon.contains(point),
            Geometry::MultiPolygon(parts) => match mode {
                ContainmentMode::AllPolygons => {
                    parts.0.iter().any(|polygon| polygon.contains(point))
                }
                ContainmentMode::FirstPolygonOnly => parts
                    .0
                    .first()
                    .is_some_and(|polygon| polygon.contains(point)),
            },
        }
    }
}

/// Descends the nested coordinate lists, pushing one polygon per ring list
/// found, in document order. A list whose first element is a coordinate pair
/// is treated as a ring; a list of rings contributes its first (exterior)
/// ring only.
fn collect_polygons(value: &Value, out: &mut Vec<Polygon<f64>>) {
    let Some(items) = value.as_array() else {
        return;
    };
    let Some(first) = items.first() else {
        return;
    };
    if is_ring(first) {
        if let Some(exterior) = parse_ring(first) {
            out.push(Polygon::new(exterior, Vec::new()));
        }
        return;
    }
    for item in items {
        collect_polygons(item, out);
    }
}

/// A ring is an array whose first element is a coordinate pair.
fn is_ring(value: &Value) -> bool {
    value
        .as_array()
        .and_then(|items| items.first())
        .is_some_and(is_pair)
}

/// A coordinate pair is an array starting with a number.
fn is_pair(value: &Value) -> bool {
    value
        .as_array()
        .and_then(|items| items.first())
        .is_some_and(Value::is_number)
}

fn parse_ring(value: &Value) -> Option<LineString<f64>> {
    let items = value.as_array()?;
    let mut coords = Vec::with_capacity(items.len());
    for item in items {
        let pair = item.as_array()?;
        let x = pair.first()?.as_f64()?;
        let y = pair.get(1)?.as_f64()?;
        coords.push(Coord { x, y });
    }
    if coords.len() < 3 {
        return None;
    }
    Some(LineString::from(coords))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn square(x0: f64, y0: f64, size: f64) -> Value {
        json!([
            [x0, y0],
            [x0, y0 + size],
            [x0 + size, y0 + size],
            [x0 + size, y0],
            [x0, y0]
        ])
    }

    #[test]
    fn polygon_containment_inside_and_outside() {
        let geometry = Geometry::from_coordinates(&json!([square(0.0, 0.0, 10.0)])).unwrap();
        assert!(matches!(geometry, Geometry::Polygon(_)));
        assert!(geometry.contains(&Point::new(5.0, 5.0), ContainmentMode::AllPolygons));
        assert!(!geometry.contains(&Point::new(50.0, 50.0), ContainmentMode::AllPolygons));
        // Boundary points are not strictly inside.
        assert!(!geometry.contains(&Point::new(0.0, 5.0), ContainmentMode::AllPolygons));
    }

    #[test]
    fn interior_rings_are_ignored() {
        // Second ring would be a hole around (5, 5); only the exterior counts.
        let geometry =
            Geometry::from_coordinates(&json!([square(0.0, 0.0, 10.0), square(4.0, 4.0, 2.0)]))
                .unwrap();
        assert!(matches!(geometry, Geometry::Polygon(_)));
        assert!(geometry.contains(&Point::new(5.0, 5.0), ContainmentMode::AllPolygons));
    }

    #[test]
    fn multi_polygon_modes_differ_on_later_parts() {
        let geometry = Geometry::from_coordinates(&json!([
            [square(0.0, 0.0, 10.0)],
            [square(100.0, 100.0, 10.0)]
        ]))
        .unwrap();
        assert!(matches!(geometry, Geometry::MultiPolygon(_)));

        let in_second = Point::new(105.0, 105.0);
        assert!(geometry.contains(&in_second, ContainmentMode::AllPolygons));
        assert!(!geometry.contains(&in_second, ContainmentMode::FirstPolygonOnly));

        // A point in the first part is found either way.
        let in_first = Point::new(5.0, 5.0);
        assert!(geometry.contains(&in_first, ContainmentMode::AllPolygons));
        assert!(geometry.contains(&in_first, ContainmentMode::FirstPolygonOnly));
    }

    #[test]
    fn deeper_nesting_is_flattened() {
        // A collection wrapping a multi-polygon one level deeper.
        let geometry = Geometry::from_coordinates(&json!([[
            [square(0.0, 0.0, 10.0)],
            [square(100.0, 100.0, 10.0)]
        ]]))
        .unwrap();
        assert!(geometry.contains(&Point::new(105.0, 105.0), ContainmentMode::AllPolygons));
    }

    #[test]
    fn malformed_coordinates_yield_no_geometry() {
        assert!(Geometry::from_coordinates(&json!("not coordinates")).is_none());
        assert!(Geometry::from_coordinates(&json!([])).is_none());
        assert!(Geometry::from_coordinates(&json!(42)).is_none());
        // A ring of non-numeric pairs parses to nothing.
        assert!(Geometry::from_coordinates(&json!([[["a", "b"], ["c", "d"], ["e", "f"]]])).is_none());
    }

    #[test]
    fn degenerate_ring_is_skipped() {
        // Two vertices cannot enclose anything.
        assert!(Geometry::from_coordinates(&json!([[[0.0, 0.0], [1.0, 1.0]]])).is_none());
    }
}
