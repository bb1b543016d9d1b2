use eframe::egui;
use std::path::Path;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Instant;

use crate::api::HttpPathService;
use crate::cli::RouteArgs;
use crate::commands::{self, RouteSettings, Router};
use crate::config::Config;
use crate::query::NavParams;
use crate::registry::{Floor, Place, Point, Shape};
use crate::route::{DelegatedPath, DirectSegment, Route, RouteBuilder, RouteError};
use crate::session::{PendingRoute, Screen, Session};
use crate::theme::{Theme, parse_css_color};

const MAP_MARGIN: f32 = 24.0;
const MARKER_RADIUS: f32 = 12.0;
const CORNER_RADIUS: f32 = 5.0;
const TOAST_SECONDS: f32 = 2.5;

/// How the viewer builds routes. Delegated builds run off the UI thread.
enum Backend {
    Direct,
    Delegated(Arc<DelegatedPath<HttpPathService>>),
}

/// Reply from a route worker, tagged with the generation it was started in.
struct RouteReply {
    generation: u64,
    request: PendingRoute,
    result: Result<Route, RouteError>,
}

struct Toast {
    message: String,
    start: Instant,
}

impl Toast {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            start: Instant::now(),
        }
    }

    fn opacity(&self) -> f32 {
        let elapsed = self.start.elapsed().as_secs_f32();
        let fade_start = TOAST_SECONDS - 0.5;
        if elapsed < fade_start {
            1.0
        } else {
            (1.0 - (elapsed - fade_start) / 0.5).max(0.0)
        }
    }

    fn is_expired(&self) -> bool {
        self.start.elapsed().as_secs_f32() >= TOAST_SECONDS
    }
}

struct WayfindingApp {
    session: Session<'static>,
    backend: Backend,
    theme: Theme,
    scan_input: String,
    toast: Option<Toast>,
    /// Bumped on every route request and every navigation; older replies are ignored.
    generation: u64,
    pending: bool,
    replies_tx: Sender<RouteReply>,
    replies_rx: Receiver<RouteReply>,
}

impl WayfindingApp {
    fn new(session: Session<'static>, backend: Backend, theme: Theme) -> Self {
        let (replies_tx, replies_rx) = mpsc::channel();
        Self {
            session,
            backend,
            theme,
            scan_input: String::new(),
            toast: None,
            generation: 0,
            pending: false,
            replies_tx,
            replies_rx,
        }
    }

    fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        self.toast = Some(Toast::new(format!("Theme: {}", self.theme.name)));
    }

    /// Forget any in-flight route build.
    fn invalidate_pending(&mut self) {
        self.generation += 1;
        self.pending = false;
    }

    fn select_floor(&mut self, floor_id: &str) {
        self.invalidate_pending();
        self.session.select_floor(floor_id);
    }

    fn scan(&mut self) {
        let loc = self.scan_input.trim().to_string();
        if loc.is_empty() {
            return;
        }
        self.invalidate_pending();
        self.session.scan(&loc);
        if self.session.floor().is_none() {
            self.toast = Some(Toast::new(format!("No map for location '{loc}'")));
        }
        self.scan_input.clear();
    }

    fn reset(&mut self) {
        self.invalidate_pending();
        self.session.reset();
    }

    fn return_home(&mut self) {
        self.invalidate_pending();
        self.session.return_home();
    }

    fn find_route(&mut self, ctx: &egui::Context) {
        let Some(request) = self.session.route_request() else {
            return;
        };
        self.generation += 1;
        match &self.backend {
            Backend::Direct => {
                let builder = DirectSegment::new(self.session.registry());
                let result = builder.build(&request.start_id, &request.end_id, &request.floor_id);
                self.session.apply_route(&request, result);
            }
            Backend::Delegated(path) => {
                let path = Arc::clone(path);
                let tx = self.replies_tx.clone();
                let ctx = ctx.clone();
                let generation = self.generation;
                self.pending = true;
                std::thread::spawn(move || {
                    let result =
                        path.build(&request.start_id, &request.end_id, &request.floor_id);
                    let _ = tx.send(RouteReply {
                        generation,
                        request,
                        result,
                    });
                    ctx.request_repaint();
                });
            }
        }
    }

    fn poll_replies(&mut self) {
        while let Ok(reply) = self.replies_rx.try_recv() {
            if reply.generation != self.generation {
                tracing::debug!(
                    reply = reply.generation,
                    current = self.generation,
                    "dropping stale route reply"
                );
                continue;
            }
            self.pending = false;
            self.session.apply_route(&reply.request, reply.result);
        }
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        let mut viewport_cmds: Vec<egui::ViewportCommand> = Vec::new();
        let mut toggle_theme = false;
        let mut go_home = false;
        let mut dismiss = false;

        ctx.input(|i| {
            if i.key_pressed(egui::Key::Q) {
                viewport_cmds.push(egui::ViewportCommand::Close);
                return;
            }
            if i.key_pressed(egui::Key::F) {
                viewport_cmds.push(egui::ViewportCommand::Fullscreen(
                    !i.viewport().fullscreen.unwrap_or(false),
                ));
            }
            toggle_theme = i.key_pressed(egui::Key::D);
            go_home = i.key_pressed(egui::Key::H);
            dismiss = i.key_pressed(egui::Key::Escape);
        });

        // Sending viewport commands inside ctx.input() deadlocks.
        for cmd in viewport_cmds {
            ctx.send_viewport_cmd(cmd);
        }
        if toggle_theme {
            self.toggle_theme();
        }
        if go_home {
            self.return_home();
        }
        if dismiss {
            self.session.dismiss_message();
        }
    }

    fn draw_top_bar(&mut self, ctx: &egui::Context) {
        let theme = self.theme.clone();
        egui::TopBottomPanel::top("top_bar")
            .frame(egui::Frame::new().fill(theme.panel).inner_margin(12.0))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(
                        egui::RichText::new("Indoor Map")
                            .size(theme.heading_size)
                            .color(theme.heading_color)
                            .strong(),
                    );
                    ui.add_space(16.0);
                    if let Some(status) = self.session.status_line() {
                        ui.label(
                            egui::RichText::new(status)
                                .size(theme.body_size)
                                .color(theme.foreground),
                        );
                    }
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if matches!(self.session.screen(), Screen::FloorView { .. })
                            && ui.button("Home").clicked()
                        {
                            self.return_home();
                        }
                        let label = if theme.name == "dark" { "Light" } else { "Dark" };
                        if ui.button(label).clicked() {
                            self.toggle_theme();
                        }
                    });
                });
                ui.add_space(6.0);
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new("Scan:").color(theme.foreground));
                    let response = ui.add(
                        egui::TextEdit::singleline(&mut self.scan_input)
                            .hint_text("location code, e.g. 1F-2")
                            .desired_width(220.0),
                    );
                    let submitted = response.lost_focus()
                        && ui.input(|i| i.key_pressed(egui::Key::Enter));
                    if ui.button("Go").clicked() || submitted {
                        self.scan();
                    }
                });
                if let Some(message) = self.session.message().map(str::to_string) {
                    ui.add_space(6.0);
                    ui.horizontal(|ui| {
                        ui.label(egui::RichText::new(message).color(theme.error));
                        if ui.small_button("Dismiss").clicked() {
                            self.session.dismiss_message();
                        }
                    });
                }
            });
    }

    fn draw_main_menu(&mut self, ui: &mut egui::Ui) {
        let registry = self.session.registry();
        let mut chosen: Option<&str> = None;

        ui.vertical_centered(|ui| {
            ui.add_space(40.0);
            ui.label(
                egui::RichText::new("Choose a floor")
                    .size(self.theme.heading_size)
                    .color(self.theme.heading_color),
            );
            ui.add_space(20.0);
            if registry.is_empty() {
                ui.label(egui::RichText::new("No floors available.").color(self.theme.error));
            }
            for floor in registry.floors() {
                let button = egui::Button::new(
                    egui::RichText::new(floor.display_name()).size(self.theme.body_size),
                )
                .min_size(egui::vec2(240.0, 44.0));
                if ui.add(button).clicked() {
                    chosen = Some(floor.id.as_str());
                }
                ui.add_space(8.0);
            }
        });

        if let Some(floor_id) = chosen {
            self.select_floor(floor_id);
        }
    }

    fn draw_route_controls(&mut self, ui: &mut egui::Ui, floor: &'static Floor) {
        let mut start = self.session.start().map(str::to_string);
        let mut end = self.session.end().map(str::to_string);

        ui.horizontal(|ui| {
            place_picker(ui, "start_picker", "From", floor, &mut start);
            ui.add_space(12.0);
            place_picker(ui, "end_picker", "To", floor, &mut end);
            ui.add_space(12.0);

            if ui
                .add_enabled(
                    !self.pending,
                    egui::Button::new(egui::RichText::new("Find route").color(self.theme.panel))
                        .fill(self.theme.accent),
                )
                .clicked()
            {
                self.session.select_start(start.as_deref());
                self.session.select_end(end.as_deref());
                self.find_route(ui.ctx());
            }
            if ui.button("Reset").clicked() {
                self.reset();
                start = None;
                end = None;
            }
            if self.pending {
                ui.spinner();
            }
        });

        if start.as_deref() != self.session.start() {
            self.session.select_start(start.as_deref());
        }
        if end.as_deref() != self.session.end() {
            self.session.select_end(end.as_deref());
        }
    }

    fn draw_floor(&mut self, ui: &mut egui::Ui) {
        let Some(floor) = self.session.floor() else {
            return;
        };

        ui.label(
            egui::RichText::new(floor.display_name())
                .size(self.theme.heading_size)
                .color(self.theme.heading_color),
        );
        ui.add_space(8.0);
        self.draw_route_controls(ui, floor);
        ui.add_space(8.0);

        let available = ui.available_rect_before_wrap().shrink(MAP_MARGIN);
        let map = MapTransform::fit(floor.viewport.view_box_rect(), available);
        let painter = ui.painter_at(available.expand(MAP_MARGIN));

        painter.rect_filled(map.rect, 8.0, self.theme.map_background);
        painter.rect_stroke(
            map.rect,
            8.0,
            egui::Stroke::new(1.0, self.theme.map_border),
            egui::StrokeKind::Outside,
        );

        for place in &floor.places {
            draw_place(&painter, &map, place, &self.theme);
        }
        if let Some(route) = self.session.route() {
            draw_route(&painter, &map, route, &self.theme);
        }
        if let Some(place) = self.session.marker_place() {
            painter.circle(
                map.to_screen(place.marker),
                MARKER_RADIUS * map.scale,
                self.theme.marker_fill,
                egui::Stroke::new(2.5 * map.scale, self.theme.marker_stroke),
            );
        }
    }

    fn draw_toast(&self, ctx: &egui::Context, screen: egui::Rect) {
        let Some(toast) = &self.toast else {
            return;
        };
        let opacity = toast.opacity();
        let painter = ctx.layer_painter(egui::LayerId::new(
            egui::Order::Foreground,
            egui::Id::new("toast"),
        ));
        let galley = painter.layout_no_wrap(
            toast.message.clone(),
            egui::FontId::proportional(self.theme.body_size),
            Theme::with_opacity(self.theme.foreground, opacity),
        );
        let size = galley.size() + egui::vec2(32.0, 16.0);
        let rect = egui::Rect::from_center_size(
            egui::pos2(screen.center().x, screen.bottom() - 48.0),
            size,
        );
        painter.rect_filled(rect, 8.0, Theme::with_opacity(self.theme.panel, 0.9 * opacity));
        painter.galley(
            rect.min + egui::vec2(16.0, 8.0),
            galley,
            self.theme.foreground,
        );
    }
}

impl eframe::App for WayfindingApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_replies();
        self.handle_keys(ctx);

        if self.toast.as_ref().is_some_and(Toast::is_expired) {
            self.toast = None;
        }

        self.draw_top_bar(ctx);

        let on_menu = matches!(self.session.screen(), Screen::MainMenu);
        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(self.theme.background).inner_margin(16.0))
            .show(ctx, |ui| {
                let rect = ui.max_rect();
                if on_menu {
                    self.draw_main_menu(ui);
                } else {
                    self.draw_floor(ui);
                }
                self.draw_toast(ui.ctx(), rect);
            });

        if self.toast.is_some() || self.pending {
            ctx.request_repaint();
        }
    }
}

/// Maps view-box coordinates into a screen rectangle, preserving aspect ratio.
struct MapTransform {
    origin: [f64; 2],
    rect: egui::Rect,
    scale: f32,
}

impl MapTransform {
    fn fit(view_box: [f64; 4], available: egui::Rect) -> Self {
        let [min_x, min_y, width, height] = view_box;
        let scale = (available.width() / width as f32)
            .min(available.height() / height as f32)
            .max(0.01);
        let size = egui::vec2(width as f32 * scale, height as f32 * scale);
        let rect = egui::Rect::from_center_size(available.center(), size);
        Self {
            origin: [min_x, min_y],
            rect,
            scale,
        }
    }

    fn to_screen(&self, p: Point) -> egui::Pos2 {
        self.rect.min
            + egui::vec2(
                (p.x - self.origin[0]) as f32 * self.scale,
                (p.y - self.origin[1]) as f32 * self.scale,
            )
    }
}

fn place_picker(
    ui: &mut egui::Ui,
    id: &str,
    label: &str,
    floor: &Floor,
    selected: &mut Option<String>,
) {
    let text = selected
        .as_deref()
        .and_then(|id| floor.place(id))
        .map(|p| p.name.clone())
        .unwrap_or_else(|| "Select...".to_string());
    ui.label(label);
    egui::ComboBox::from_id_salt(id)
        .selected_text(text)
        .show_ui(ui, |ui| {
            for place in &floor.places {
                ui.selectable_value(selected, Some(place.id.clone()), place.name.as_str());
            }
        });
}

fn draw_place(painter: &egui::Painter, map: &MapTransform, place: &Place, theme: &Theme) {
    let style = &place.style;
    let fill = parse_css_color(style.fill()).unwrap_or(theme.map_background);
    let stroke = egui::Stroke::new(
        style.stroke_width() as f32 * map.scale,
        parse_css_color(style.stroke()).unwrap_or(theme.map_border),
    );

    match place.shape {
        Shape::Rect {
            x,
            y,
            width,
            height,
        } => {
            let rect = egui::Rect::from_min_max(
                map.to_screen(Point::new(x, y)),
                map.to_screen(Point::new(x + width, y + height)),
            );
            let radius = CORNER_RADIUS * map.scale;
            painter.rect_filled(rect, radius, fill);
            painter.rect_stroke(rect, radius, stroke, egui::StrokeKind::Middle);
        }
        Shape::Circle { cx, cy, r } => {
            painter.circle(map.to_screen(Point::new(cx, cy)), r as f32 * map.scale, fill, stroke);
        }
    }

    painter.text(
        map.to_screen(place.label),
        egui::Align2::CENTER_BOTTOM,
        &place.name,
        egui::FontId::proportional(theme.label_size * map.scale),
        parse_css_color(style.text_fill()).unwrap_or(theme.foreground),
    );
}

fn draw_route(painter: &egui::Painter, map: &MapTransform, route: &Route, theme: &Theme) {
    let points: Vec<egui::Pos2> = route.points.iter().map(|p| map.to_screen(*p)).collect();
    let stroke = egui::Stroke::new(4.0 * map.scale, theme.route);
    painter.extend(egui::Shape::dashed_line(
        &points,
        stroke,
        10.0 * map.scale,
        6.0 * map.scale,
    ));
}

pub fn run(
    building: Option<&Path>,
    params: &NavParams,
    args: &RouteArgs,
    windowed: bool,
) -> anyhow::Result<()> {
    let config = Config::load_or_default();
    let registry = commands::load_registry(building, &config)?;
    let settings = RouteSettings::resolve(args, &config)?;

    // Fetch the node list before opening the window so a dead service fails fast.
    let backend = match Router::connect(registry, &settings)? {
        Router::Direct(_) => Backend::Direct,
        Router::Delegated(path) => Backend::Delegated(Arc::new(path)),
    };

    let session = Session::from_params(registry, params);
    let theme = Theme::from_name(config.theme());
    let title = "floorguide".to_string();

    let viewport = if windowed {
        egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 760.0])
            .with_title(&title)
    } else {
        egui::ViewportBuilder::default()
            .with_fullscreen(true)
            .with_title(&title)
    };

    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        &title,
        options,
        Box::new(move |_cc| Ok(Box::new(WayfindingApp::new(session, backend, theme)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;

    fn app_at(query: &str) -> WayfindingApp {
        WayfindingApp::new(
            Session::from_query(Registry::builtin(), query),
            Backend::Direct,
            Theme::dark(),
        )
    }

    #[test]
    fn test_transform_keeps_aspect_ratio() {
        let available = egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(1100.0, 1000.0));
        let map = MapTransform::fit([0.0, 0.0, 550.0, 300.0], available);
        assert_eq!(map.scale, 2.0);
        assert_eq!(map.rect.width(), 1100.0);
        assert_eq!(map.rect.height(), 600.0);
        assert_eq!(map.to_screen(Point::new(0.0, 0.0)), map.rect.min);
        assert_eq!(map.to_screen(Point::new(550.0, 300.0)), map.rect.max);
    }

    #[test]
    fn test_transform_honours_view_box_origin() {
        let available = egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(100.0, 100.0));
        let map = MapTransform::fit([50.0, 50.0, 100.0, 100.0], available);
        assert_eq!(map.to_screen(Point::new(50.0, 50.0)), egui::pos2(0.0, 0.0));
    }

    #[test]
    fn test_stale_reply_is_dropped() {
        let mut app = app_at("floor=1F");
        app.session.select_start(Some("1F-1"));
        app.session.select_end(Some("1F-2"));
        let request = app.session.route_request().unwrap();
        let route = DirectSegment::new(Registry::builtin())
            .build("1F-1", "1F-2", "1F")
            .unwrap();

        app.generation = 3;
        app.replies_tx
            .send(RouteReply {
                generation: 2,
                request: request.clone(),
                result: Ok(route.clone()),
            })
            .unwrap();
        app.poll_replies();
        assert!(app.session.route().is_none());

        app.replies_tx
            .send(RouteReply {
                generation: 3,
                request,
                result: Ok(route.clone()),
            })
            .unwrap();
        app.poll_replies();
        assert_eq!(app.session.route(), Some(&route));
    }

    #[test]
    fn test_navigation_invalidates_pending_build() {
        let mut app = app_at("loc=1F-1");
        app.pending = true;
        let before = app.generation;
        app.select_floor("2F");
        assert!(!app.pending);
        assert!(app.generation > before);
        assert_eq!(app.session.floor_id(), Some("2F"));
    }

    #[test]
    fn test_scan_unknown_floor_returns_home() {
        let mut app = app_at("floor=1F");
        app.scan_input = "9F-1".to_string();
        app.scan();
        assert_eq!(app.session.screen(), &Screen::MainMenu);
        assert!(app.toast.is_some());
        assert!(app.scan_input.is_empty());
    }

    #[test]
    fn test_direct_backend_builds_synchronously() {
        let mut app = app_at("floor=1F");
        app.session.select_start(Some("1F-1"));
        app.session.select_end(Some("1F-3"));
        app.find_route(&egui::Context::default());
        assert!(!app.pending);
        assert_eq!(app.session.route().map(|r| r.points.len()), Some(2));
    }
}
