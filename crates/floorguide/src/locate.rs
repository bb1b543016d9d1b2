//! Resolve scanned location codes to floors and places.
//!
//! A location id names a place and carries its floor as the token before the
//! first `-`: `"1F-2"` is place `1F-2` on floor `1F`. An id without a `-` is
//! taken to be a floor id on its own.

use crate::registry::{Floor, Place, Registry};

/// Separator between the floor token and the rest of a location id.
pub const DELIMITER: char = '-';

/// Extract the floor token from a location id.
///
/// Returns `None` for a missing id or an id whose first segment is empty
/// (`""`, `"-3"`). Never panics.
pub fn floor_of(loc_id: Option<&str>) -> Option<&str> {
    let first = loc_id?.split(DELIMITER).next()?;
    if first.is_empty() { None } else { Some(first) }
}

/// Find the place a location id names.
///
/// `None` when the id is missing, its floor is not registered, or the floor has
/// no place with exactly this id. The last case is common: the floor is still
/// shown, just without a marker.
pub fn place_of<'r>(registry: &'r Registry, loc_id: Option<&str>) -> Option<&'r Place> {
    let loc_id = loc_id?;
    let floor = registry.floor(floor_of(Some(loc_id))?)?;
    floor.place(loc_id)
}

/// A location id resolved as far as the registry allows.
#[derive(Debug, Clone, Copy)]
pub struct Resolved<'r> {
    pub floor: &'r Floor,
    pub place: Option<&'r Place>,
}

/// Resolve both the floor and the place of a location id.
///
/// `None` only when the floor itself cannot be found.
pub fn resolve<'r>(registry: &'r Registry, loc_id: Option<&str>) -> Option<Resolved<'r>> {
    let loc_id = loc_id?;
    let floor = registry.floor(floor_of(Some(loc_id))?)?;
    Some(Resolved {
        floor,
        place: floor.place(loc_id),
    })
}
