use std::collections::HashSet;
use std::fmt;

use super::{Floor, RegistryError};
use crate::locate;

/// How far (in map units) a marker may sit outside its shape before we complain.
const MARKER_TOLERANCE: f64 = 12.0;

/// A problem that does not stop the building from loading.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// The place id's prefix does not name the floor it is declared on,
    /// so a scanned code for it resolves to the wrong (or no) floor.
    ForeignPrefix { place: String, floor: String },
    /// The marker center lies outside the place's outline.
    MarkerOutsideShape { place: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::ForeignPrefix { place, floor } => write!(
                f,
                "Place '{place}' is declared on floor '{floor}' but its id does not start with '{floor}-'"
            ),
            Warning::MarkerOutsideShape { place } => {
                write!(f, "Place '{place}' has its marker outside its shape")
            }
        }
    }
}

/// Check the shape of a building before it is indexed.
///
/// Structural problems (empty or duplicate ids, degenerate geometry) are errors;
/// convention violations are returned as warnings.
pub fn validate(floors: &[Floor]) -> Result<Vec<Warning>, RegistryError> {
    let mut warnings = Vec::new();
    let mut floor_ids = HashSet::new();
    let mut place_ids = HashSet::new();

    for (index, floor) in floors.iter().enumerate() {
        if floor.id.is_empty() {
            return Err(RegistryError::EmptyFloorId { index });
        }
        if !floor_ids.insert(floor.id.as_str()) {
            return Err(RegistryError::DuplicateFloor(floor.id.clone()));
        }
        if !floor.viewport.is_valid() {
            return Err(RegistryError::InvalidViewport {
                floor: floor.id.clone(),
            });
        }

        for place in &floor.places {
            if place.id.is_empty() {
                return Err(RegistryError::EmptyPlaceId {
                    floor: floor.id.clone(),
                });
            }
            if !place_ids.insert(place.id.as_str()) {
                return Err(RegistryError::DuplicatePlace(place.id.clone()));
            }
            if !place.shape.has_area() {
                return Err(RegistryError::InvalidShape {
                    place: place.id.clone(),
                });
            }

            if locate::floor_of(Some(&place.id)) != Some(floor.id.as_str()) {
                warnings.push(Warning::ForeignPrefix {
                    place: place.id.clone(),
                    floor: floor.id.clone(),
                });
            }
            if !place.shape.bounds().contains(place.marker, MARKER_TOLERANCE) {
                warnings.push(Warning::MarkerOutsideShape {
                    place: place.id.clone(),
                });
            }
        }
    }

    Ok(warnings)
}

#[cfg(test)]
mod tests {
    use super::super::Registry;
    use super::*;

    fn building(places: &str) -> String {
        format!("floors:\n  - id: 1F\n    places:\n{places}")
    }

    fn place(id: &str, x: f64, y: f64) -> String {
        format!(
            "      - id: {id}\n        name: {id}\n        marker: {{ x: {x}, y: {y} }}\n        \
             shape: {{ kind: rect, x: 0, y: 0, width: 100, height: 100 }}\n        \
             label: {{ x: 50, y: 50 }}\n"
        )
    }

    #[test]
    fn test_duplicate_place_is_error() {
        let yaml = building(&format!("{}{}", place("1F-1", 50.0, 50.0), place("1F-1", 60.0, 60.0)));
        let err = Registry::from_yaml(&yaml).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicatePlace(id) if id == "1F-1"));
    }

    #[test]
    fn test_duplicate_floor_is_error() {
        let yaml = "floors:\n  - id: 1F\n  - id: 1F\n";
        let err = Registry::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateFloor(id) if id == "1F"));
    }

    #[test]
    fn test_duplicate_place_across_floors_is_error() {
        let yaml = format!(
            "floors:\n  - id: 1F\n    places:\n{}  - id: 2F\n    places:\n{}",
            place("1F-1", 50.0, 50.0),
            place("1F-1", 50.0, 50.0)
        );
        assert!(matches!(
            Registry::from_yaml(&yaml).unwrap_err(),
            RegistryError::DuplicatePlace(_)
        ));
    }

    #[test]
    fn test_empty_floor_id_is_error() {
        let yaml = "floors:\n  - id: \"\"\n";
        assert!(matches!(
            Registry::from_yaml(yaml).unwrap_err(),
            RegistryError::EmptyFloorId { index: 0 }
        ));
    }

    #[test]
    fn test_zero_viewport_is_error() {
        let yaml = "floors:\n  - id: 1F\n    viewport: { width: 0, height: 300 }\n";
        assert!(matches!(
            Registry::from_yaml(yaml).unwrap_err(),
            RegistryError::InvalidViewport { .. }
        ));
    }

    #[test]
    fn test_zero_view_box_is_error() {
        let yaml = "floors:\n  - id: 1F\n    viewport: { view_box: \"0 0 0 300\" }\n";
        assert!(matches!(
            Registry::from_yaml(yaml).unwrap_err(),
            RegistryError::InvalidViewport { floor } if floor == "1F"
        ));
    }

    #[test]
    fn test_unparseable_view_box_is_error() {
        for view_box in ["not a box", "0 0 550", "0 0 550 300 1", "0 0 inf 300"] {
            let yaml = format!("floors:\n  - id: 1F\n    viewport: {{ view_box: \"{view_box}\" }}\n");
            assert!(
                matches!(
                    Registry::from_yaml(&yaml).unwrap_err(),
                    RegistryError::InvalidViewport { .. }
                ),
                "{view_box} should be rejected"
            );
        }
    }

    #[test]
    fn test_blank_view_box_uses_size() {
        let yaml = "floors:\n  - id: 1F\n    viewport: { width: 800, height: 400, view_box: \" \" }\n";
        let registry = Registry::from_yaml(yaml).unwrap();
        let viewport = &registry.floor("1F").unwrap().viewport;
        assert_eq!(viewport.view_box(), "0 0 800 400");
        assert_eq!(viewport.view_box_rect(), [0.0, 0.0, 800.0, 400.0]);
    }

    #[test]
    fn test_degenerate_shape_is_error() {
        let yaml = building(
            "      - id: 1F-1\n        name: x\n        marker: { x: 0, y: 0 }\n        \
             shape: { kind: circle, cx: 0, cy: 0, r: 0 }\n        label: { x: 0, y: 0 }\n",
        );
        assert!(matches!(
            Registry::from_yaml(&yaml).unwrap_err(),
            RegistryError::InvalidShape { .. }
        ));
    }

    #[test]
    fn test_foreign_prefix_is_warning() {
        let yaml = building(&place("2F-1", 50.0, 50.0));
        let registry = Registry::from_yaml(&yaml).unwrap();
        assert_eq!(
            registry.warnings(),
            &[Warning::ForeignPrefix {
                place: "2F-1".to_string(),
                floor: "1F".to_string(),
            }]
        );
    }

    #[test]
    fn test_marker_outside_shape_is_warning() {
        let yaml = building(&format!("{}{}", place("1F-1", 105.0, 50.0), place("1F-2", 300.0, 50.0)));
        let registry = Registry::from_yaml(&yaml).unwrap();
        // 105 is within tolerance of the 100-wide rect, 300 is not
        assert_eq!(
            registry.warnings(),
            &[Warning::MarkerOutsideShape {
                place: "1F-2".to_string(),
            }]
        );
    }
}
