//! SVG output for a floor view.

use std::fmt::Write;

use crate::registry::{Floor, Place, Point, Shape};
use crate::route::Route;
use crate::session::Session;

const MARKER_RADIUS: f64 = 12.0;
const MARKER_FILL: &str = "#fde047";
const MARKER_STROKE: &str = "#1e293b";
const ROUTE_STROKE: &str = "#ef4444";
const LABEL_FONT_SIZE: f64 = 20.0;
const CORNER_RADIUS: f64 = 5.0;

/// Render the floor the session is showing, or `None` on the main menu.
pub fn render_session(session: &Session<'_>) -> Option<String> {
    let floor = session.floor()?;
    Some(render_floor(floor, session.marker_place(), session.route()))
}

/// Render a floor plan with an optional "you are here" marker and route overlay.
pub fn render_floor(floor: &Floor, marker: Option<&Place>, route: Option<&Route>) -> String {
    let title = format!("{} indoor map", floor.display_name());
    let mut svg = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="{}" role="img">"#,
        floor.viewport.width(),
        floor.viewport.height(),
        escape(&floor.viewport.view_box())
    );
    let _ = writeln!(svg, "  <title>{}</title>", escape(&title));

    for place in &floor.places {
        write_place(&mut svg, place);
    }

    if let Some(route) = route {
        write_route(&mut svg, route);
    }

    if let Some(place) = marker {
        let _ = writeln!(
            svg,
            r#"  <circle class="marker" cx="{}" cy="{}" r="{MARKER_RADIUS}" fill="{MARKER_FILL}" stroke="{MARKER_STROKE}" stroke-width="2.5"/>"#,
            place.marker.x, place.marker.y
        );
    }

    svg.push_str("</svg>\n");
    svg
}

fn write_place(svg: &mut String, place: &Place) {
    let style = &place.style;
    let _ = writeln!(
        svg,
        r#"  <g role="listitem" aria-label="{}">"#,
        escape(&place.name)
    );
    match place.shape {
        Shape::Rect {
            x,
            y,
            width,
            height,
        } => {
            let _ = writeln!(
                svg,
                r#"    <rect x="{x}" y="{y}" width="{width}" height="{height}" rx="{CORNER_RADIUS}" fill="{}" stroke="{}" stroke-width="{}"/>"#,
                escape(style.fill()),
                escape(style.stroke()),
                style.stroke_width()
            );
        }
        Shape::Circle { cx, cy, r } => {
            let _ = writeln!(
                svg,
                r#"    <circle cx="{cx}" cy="{cy}" r="{r}" fill="{}" stroke="{}" stroke-width="{}"/>"#,
                escape(style.fill()),
                escape(style.stroke()),
                style.stroke_width()
            );
        }
    }
    let _ = writeln!(
        svg,
        r#"    <text x="{}" y="{}" font-size="{LABEL_FONT_SIZE}" fill="{}" text-anchor="middle">{}</text>"#,
        place.label.x,
        place.label.y,
        escape(style.text_fill()),
        escape(&place.name)
    );
    svg.push_str("  </g>\n");
}

fn write_route(svg: &mut String, route: &Route) {
    let points = route
        .points
        .iter()
        .map(|Point { x, y }| format!("{x},{y}"))
        .collect::<Vec<_>>()
        .join(" ");
    let _ = writeln!(
        svg,
        r#"  <polyline class="route" points="{points}" fill="none" stroke="{ROUTE_STROKE}" stroke-width="4" stroke-linecap="round" stroke-linejoin="round" stroke-dasharray="10 6"/>"#
    );
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
