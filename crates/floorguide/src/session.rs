//! Per-session navigation state.
//!
//! One `Session` is owned by whichever front end is driving (the desktop viewer
//! or a CLI command) and handed to renderers by reference.

use crate::locate;
use crate::query::NavParams;
use crate::registry::{Floor, Place, Registry};
use crate::route::{Route, RouteBuilder, RouteError, validate_request};

/// What is drawn on top of the floor plan.
#[derive(Debug, Clone, PartialEq)]
pub enum Overlay {
    NoHighlight,
    Highlighted(String),
    RouteActive(Route),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    MainMenu,
    FloorView { floor_id: String, overlay: Overlay },
}

/// A route request that passed validation, captured so it can be built elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRoute {
    pub floor_id: String,
    pub start_id: String,
    pub end_id: String,
}

pub struct Session<'r> {
    registry: &'r Registry,
    screen: Screen,
    current_loc: Option<String>,
    start: Option<String>,
    end: Option<String>,
    message: Option<String>,
}

impl<'r> Session<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            screen: Screen::MainMenu,
            current_loc: None,
            start: None,
            end: None,
            message: None,
        }
    }

    /// Initial state from navigation parameters. `loc` wins over `floor`.
    pub fn from_params(registry: &'r Registry, params: &NavParams) -> Self {
        let mut session = Self::new(registry);
        if let Some(loc) = params.loc.as_deref() {
            session.scan(loc);
        } else if let Some(floor) = params.floor.as_deref() {
            if registry.floor(floor).is_some() {
                session.show_floor(floor);
            }
        }
        tracing::debug!(screen = ?session.screen, "session started");
        session
    }

    pub fn from_query(registry: &'r Registry, query: &str) -> Self {
        Self::from_params(registry, &NavParams::parse(query))
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn current_loc(&self) -> Option<&str> {
        self.current_loc.as_deref()
    }

    pub fn start(&self) -> Option<&str> {
        self.start.as_deref()
    }

    pub fn end(&self) -> Option<&str> {
        self.end.as_deref()
    }

    /// Inline message from the last rejected or failed action.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn floor_id(&self) -> Option<&str> {
        match &self.screen {
            Screen::MainMenu => None,
            Screen::FloorView { floor_id, .. } => Some(floor_id),
        }
    }

    pub fn floor(&self) -> Option<&'r Floor> {
        self.registry.floor(self.floor_id()?)
    }

    pub fn route(&self) -> Option<&Route> {
        match &self.screen {
            Screen::FloorView {
                overlay: Overlay::RouteActive(route),
                ..
            } => Some(route),
            _ => None,
        }
    }

    /// The place to mark as "you are here", if it is on the displayed floor.
    pub fn marker_place(&self) -> Option<&'r Place> {
        let place = locate::place_of(self.registry, self.current_loc.as_deref())?;
        (Some(place.floor_id.as_str()) == self.floor_id()).then_some(place)
    }

    /// One-line description of what is on screen.
    pub fn status_line(&self) -> Option<String> {
        let floor = self.floor()?;
        Some(match self.marker_place() {
            Some(place) => format!(
                "Current location: {} ({})",
                place.name,
                floor.display_name()
            ),
            None => format!("Viewing {}", floor.display_name()),
        })
    }

    pub fn select_floor(&mut self, floor_id: &str) {
        if self.registry.floor(floor_id).is_none() {
            self.message = Some(format!("No map found for floor '{floor_id}'."));
            return;
        }
        self.current_loc = None;
        self.show_floor(floor_id);
    }

    /// Handle a scanned location code.
    ///
    /// An unknown floor sends the session back to the main menu.
    pub fn scan(&mut self, loc_id: &str) {
        let Some(resolved) = locate::resolve(self.registry, Some(loc_id)) else {
            tracing::info!(loc_id, "scanned location has no known floor");
            self.return_home();
            return;
        };
        if resolved.place.is_none() {
            tracing::debug!(loc_id, "scanned location is not a registered place");
        }
        let floor_id = resolved.floor.id.clone();
        self.current_loc = Some(loc_id.to_string());
        self.show_floor(&floor_id);
    }

    pub fn select_start(&mut self, place_id: Option<&str>) {
        if self.floor_id().is_some() {
            self.start = place_id.map(str::to_string);
        }
    }

    pub fn select_end(&mut self, place_id: Option<&str>) {
        if self.floor_id().is_some() {
            self.end = place_id.map(str::to_string);
        }
    }

    /// Validate the current selections. On rejection the message is set and
    /// nothing else changes.
    pub fn route_request(&mut self) -> Option<PendingRoute> {
        let floor_id = self.floor_id()?.to_string();
        match validate_request(self.start.as_deref(), self.end.as_deref()) {
            Ok((start, end)) => Some(PendingRoute {
                floor_id,
                start_id: start.to_string(),
                end_id: end.to_string(),
            }),
            Err(e) => {
                self.message = Some(e.to_string());
                None
            }
        }
    }

    /// Apply a finished route build. Results for a floor that is no longer
    /// displayed are dropped; failures leave the previous overlay in place.
    pub fn apply_route(&mut self, request: &PendingRoute, result: Result<Route, RouteError>) {
        let Screen::FloorView { floor_id, overlay } = &mut self.screen else {
            return;
        };
        if *floor_id != request.floor_id {
            tracing::debug!(?request, "dropping route for a floor no longer shown");
            return;
        }
        match result {
            Ok(route) => {
                *overlay = Overlay::RouteActive(route);
                self.message = None;
            }
            Err(e) => self.message = Some(e.to_string()),
        }
    }

    /// Validate, build synchronously and apply. Returns whether a route is now shown.
    pub fn find_route(&mut self, builder: &dyn RouteBuilder) -> bool {
        let Some(request) = self.route_request() else {
            return false;
        };
        let result = builder.build(&request.start_id, &request.end_id, &request.floor_id);
        let ok = result.is_ok();
        self.apply_route(&request, result);
        ok
    }

    /// Drop the route and selections, keeping the scanned location.
    pub fn reset(&mut self) {
        if let Some(floor_id) = self.floor_id().map(str::to_string) {
            self.show_floor(&floor_id);
        }
    }

    pub fn return_home(&mut self) {
        self.screen = Screen::MainMenu;
        self.current_loc = None;
        self.start = None;
        self.end = None;
        self.message = None;
    }

    pub fn dismiss_message(&mut self) {
        self.message = None;
    }

    fn show_floor(&mut self, floor_id: &str) {
        let on_this_floor = locate::floor_of(self.current_loc.as_deref()) == Some(floor_id);
        let overlay = match &self.current_loc {
            Some(loc) if on_this_floor => Overlay::Highlighted(loc.clone()),
            _ => Overlay::NoHighlight,
        };
        self.screen = Screen::FloorView {
            floor_id: floor_id.to_string(),
            overlay,
        };
        self.start = None;
        self.end = None;
        self.message = None;
    }
}
