pub mod validate;

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use validate::Warning;

/// The building bundled with the binary.
const BUILTIN_YAML: &str = include_str!("../../data/building.yaml");

/// Viewport used when a floor specifies neither a view box nor a size.
const FALLBACK_WIDTH: f64 = 500.0;
const FALLBACK_HEIGHT: f64 = 250.0;

const DEFAULT_FILL: &str = "#d1d5db";
const DEFAULT_STROKE: &str = "#6b7280";
const DEFAULT_STROKE_WIDTH: f64 = 1.0;
const DEFAULT_TEXT_FILL: &str = "#1f2937";

/// A point in floor-map coordinates (the floor's view box space).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Axis-aligned bounds of a shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    /// Whether `p` lies inside the bounds grown by `tolerance` on every side.
    pub fn contains(&self, p: Point, tolerance: f64) -> bool {
        p.x >= self.min.x - tolerance
            && p.x <= self.max.x + tolerance
            && p.y >= self.min.y - tolerance
            && p.y <= self.max.y + tolerance
    }
}

/// Outline drawn for a place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Shape {
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
    },
}

impl Shape {
    pub fn bounds(&self) -> Bounds {
        match *self {
            Shape::Rect {
                x,
                y,
                width,
                height,
            } => Bounds {
                min: Point::new(x, y),
                max: Point::new(x + width, y + height),
            },
            Shape::Circle { cx, cy, r } => Bounds {
                min: Point::new(cx - r, cy - r),
                max: Point::new(cx + r, cy + r),
            },
        }
    }

    /// Whether every size component is strictly positive.
    pub fn has_area(&self) -> bool {
        match *self {
            Shape::Rect { width, height, .. } => width > 0.0 && height > 0.0,
            Shape::Circle { r, .. } => r > 0.0,
        }
    }
}

/// Paint attributes of a place. Unset values fall back to neutral grays.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaceStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_fill: Option<String>,
}

impl PlaceStyle {
    pub fn fill(&self) -> &str {
        self.fill.as_deref().unwrap_or(DEFAULT_FILL)
    }

    pub fn stroke(&self) -> &str {
        self.stroke.as_deref().unwrap_or(DEFAULT_STROKE)
    }

    pub fn stroke_width(&self) -> f64 {
        self.stroke_width.unwrap_or(DEFAULT_STROKE_WIDTH)
    }

    pub fn text_fill(&self) -> &str {
        self.text_fill.as_deref().unwrap_or(DEFAULT_TEXT_FILL)
    }
}

/// A named point of interest on a floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: String,
    pub name: String,

    /// Owning floor. Filled in from the enclosing floor when the registry is built.
    #[serde(skip)]
    pub floor_id: String,

    /// Center of the location marker.
    pub marker: Point,
    pub shape: Shape,

    #[serde(default)]
    pub style: PlaceStyle,

    /// Anchor of the (centered) name label.
    pub label: Point,
}

/// Drawing area of a floor map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_box: Option<String>,
}

impl Viewport {
    pub fn width(&self) -> f64 {
        self.width.unwrap_or(FALLBACK_WIDTH)
    }

    pub fn height(&self) -> f64 {
        self.height.unwrap_or(FALLBACK_HEIGHT)
    }

    /// The SVG `viewBox` string, derived from the size when not given explicitly.
    pub fn view_box(&self) -> String {
        match &self.view_box {
            Some(vb) if !vb.trim().is_empty() => vb.clone(),
            _ => format!("0 0 {} {}", self.width(), self.height()),
        }
    }

    /// The view box as `[min_x, min_y, width, height]`.
    ///
    /// Registry validation guarantees an explicit view box parses; the size
    /// fallback only applies to viewports built by hand.
    pub fn view_box_rect(&self) -> [f64; 4] {
        parse_view_box(&self.view_box())
            .unwrap_or([0.0, 0.0, self.width(), self.height()])
    }

    /// Whether the sizes and the view box describe a drawable area.
    pub fn is_valid(&self) -> bool {
        let sizes_ok = [self.width, self.height]
            .iter()
            .flatten()
            .all(|&v| v.is_finite() && v > 0.0);
        let view_box_ok = match &self.view_box {
            Some(vb) if !vb.trim().is_empty() => parse_view_box(vb).is_some(),
            _ => true,
        };
        sizes_ok && view_box_ok
    }
}

/// Parse an SVG `viewBox` (`"min_x min_y width height"`, comma or space separated).
///
/// `None` unless there are exactly four finite numbers with a positive width and height.
pub fn parse_view_box(value: &str) -> Option<[f64; 4]> {
    let parsed: Vec<f64> = value
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<f64>().ok().filter(|v| v.is_finite()))
        .collect::<Option<_>>()?;
    match parsed.as_slice() {
        &[x, y, w, h] if w > 0.0 && h > 0.0 => Some([x, y, w, h]),
        _ => None,
    }
}

/// A named collection of places sharing one map viewport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Floor {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub viewport: Viewport,

    #[serde(default)]
    pub places: Vec<Place>,
}

impl Floor {
    /// Name shown in menus, e.g. "Floor 1", or "1F map" for unnamed floors.
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => format!("{} map", self.id),
        }
    }

    pub fn place(&self, place_id: &str) -> Option<&Place> {
        self.places.iter().find(|p| p.id == place_id)
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Failed to parse building file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Floor #{index} has an empty id")]
    EmptyFloorId { index: usize },

    #[error("Floor '{floor}' contains a place with an empty id")]
    EmptyPlaceId { floor: String },

    #[error("Duplicate floor id '{0}'")]
    DuplicateFloor(String),

    #[error("Duplicate place id '{0}'")]
    DuplicatePlace(String),

    #[error("Floor '{floor}' has an invalid viewport (sizes and view box must be positive)")]
    InvalidViewport { floor: String },

    #[error("Place '{place}' has a shape without area")]
    InvalidShape { place: String },
}

#[derive(Debug, Deserialize)]
struct BuildingFile {
    floors: Vec<Floor>,
}

/// The static table of all floors and places.
///
/// Built once and never mutated; floors keep their declaration order.
#[derive(Debug)]
pub struct Registry {
    floors: Vec<Floor>,
    index: HashMap<String, usize>,
    warnings: Vec<Warning>,
}

impl Registry {
    /// The bundled demo building.
    pub fn builtin() -> &'static Registry {
        static BUILTIN: OnceLock<Registry> = OnceLock::new();
        BUILTIN.get_or_init(|| {
            Registry::from_yaml(BUILTIN_YAML).expect("bundled building.yaml is valid")
        })
    }

    pub fn from_yaml(contents: &str) -> Result<Self, RegistryError> {
        let file: BuildingFile = serde_yaml::from_str(contents)?;
        Self::from_floors(file.floors)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read building file {}", path.display()))?;
        let registry = Self::from_yaml(&contents)
            .with_context(|| format!("Invalid building file {}", path.display()))?;
        tracing::debug!(
            path = %path.display(),
            floors = registry.len(),
            "loaded building"
        );
        Ok(registry)
    }

    pub fn from_floors(mut floors: Vec<Floor>) -> Result<Self, RegistryError> {
        let warnings = validate::validate(&floors)?;
        for warning in &warnings {
            tracing::warn!("{warning}");
        }

        let mut index = HashMap::with_capacity(floors.len());
        for (i, floor) in floors.iter_mut().enumerate() {
            for place in &mut floor.places {
                place.floor_id = floor.id.clone();
            }
            index.insert(floor.id.clone(), i);
        }

        Ok(Self {
            floors,
            index,
            warnings,
        })
    }

    /// Look up a floor. Unknown ids mean "no map to display", not an error.
    pub fn floor(&self, floor_id: &str) -> Option<&Floor> {
        self.index.get(floor_id).map(|&i| &self.floors[i])
    }

    /// All floors in declaration order.
    pub fn floors(&self) -> impl Iterator<Item = &Floor> {
        self.floors.iter()
    }

    pub fn len(&self) -> usize {
        self.floors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.floors.is_empty()
    }

    /// Non-fatal problems found while loading.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }
}

/// Load the building for this process: `path` when given, the bundled one otherwise.
///
/// The first loaded file is fixed for the rest of the process. Asking for a
/// different file afterwards is an error.
pub fn load_global(path: Option<&Path>) -> anyhow::Result<&'static Registry> {
    static LOADED: OnceLock<(PathBuf, Registry)> = OnceLock::new();
    let Some(path) = path else {
        return Ok(Registry::builtin());
    };
    if LOADED.get().is_none() {
        let registry = Registry::load(path)?;
        let _ = LOADED.set((path.to_path_buf(), registry));
    }
    match LOADED.get() {
        Some((loaded, registry)) if loaded == path => Ok(registry),
        Some((loaded, _)) => anyhow::bail!(
            "Building {} is already loaded; cannot switch to {}",
            loaded.display(),
            path.display()
        ),
        None => anyhow::bail!("Failed to load building {}", path.display()),
    }
}
