//! Interactive 2D flocking viewer built with eframe/egui.
//!
//! This module defines [`Viewer`], which owns a [`Simulation`] and implements
//! [`eframe::App`] to render and control it through an egui UI.

use eframe::App;
use flock_core::{
    BehaviorParams, ConfigError, FlockConfig, Simulation,
    config::{FlockingParams, PredatorParams, PreyParams},
    types::Transform,
};
use glam::Vec2;
use tracing::{info, warn};

/// What a click in the central panel does.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerTool {
    /// Spawn one prey at the cursor.
    Spawn,
    /// One-frame repulsion pulse at the cursor.
    Repel,
    /// Toggle a persistent attraction point at the cursor.
    Attract,
}

/// Main application state for the interactive viewer.
///
/// The typical per-frame update is:
/// 1. Handle UI interactions / input.
/// 2. If `running` is `true` and enough time has passed, call [`Viewer::step_once`].
/// 3. Render agents, the optional quadtree overlay and the attraction point.
///
/// ### Fields
/// - `sim` - The simulation being shown.
/// - `config` - Configuration used by [`Viewer::reset`].
/// - `params` - Editable parameter snapshot, pushed on every change.
///
/// - `tool` - Active pointer tool.
/// - `show_quadtree` - Draw the quadtree rectangles.
///
/// - `running` - Whether the simulation is currently auto-advancing.
/// - `zoom` - Zoom factor for world-to-screen coordinate mapping.
/// - `pan` - Screen-space pan offset in pixels.
///
/// - `step_interval` - Target time step between automatic steps (seconds).
/// - `last_step_time` - Time stamp of the last step (egui time).
/// - `last_step_dt` - Actual time delta between the last two steps.
pub struct Viewer {
    sim: Simulation,
    config: FlockConfig,
    params: BehaviorParams,

    tool: PointerTool,
    show_quadtree: bool,

    running: bool,
    zoom: f32,
    pan: egui::Vec2,

    step_interval: f64,
    last_step_time: f64,
    last_step_dt: f64,
}

impl Viewer {
    /// Creates a viewer around a fresh simulation built from `config`.
    ///
    /// ### Errors
    /// Returns the validation error if `config` is rejected by [`Simulation::new`].
    pub fn new(config: FlockConfig) -> Result<Self, ConfigError> {
        let sim = Simulation::new(config)?;
        let params = *sim.params();

        Ok(Self {
            sim,
            config,
            params,
            tool: PointerTool::Spawn,
            show_quadtree: false,
            running: false,
            zoom: 4.0,
            pan: egui::vec2(0.0, 0.0),
            step_interval: 1.0 / 60.0,
            last_step_time: 0.0,
            last_step_dt: 0.0,
        })
    }

    /// Rebuilds the simulation from the stored configuration, keeping the
    /// edited parameters and the camera. Stops auto-running.
    fn reset(&mut self) {
        match Simulation::new(self.config) {
            Ok(sim) => {
                self.sim = sim;
                self.sim.set_params(self.params);
                info!("simulation reset");
            }
            Err(err) => warn!(%err, "reset skipped"),
        }
        self.running = false;
    }

    /// Advances the simulation by one frame of `step_interval` seconds.
    fn step_once(&mut self) {
        self.sim.step(self.step_interval as f32);
    }

    /// Turns a click at `world` into an interaction request for the next frame.
    fn apply_tool(&mut self, world: Vec2) {
        let interactions = self.sim.interactions_mut();
        match self.tool {
            PointerTool::Spawn => interactions.request_spawn(world),
            PointerTool::Repel => interactions.request_repulsion(world),
            PointerTool::Attract => {
                interactions.toggle_attraction(world);
            }
        }
    }

    /// Drops the attraction point, if any.
    fn release_attraction(&mut self) {
        self.sim.interactions_mut().clear_attraction();
    }

    /// Converts a world-space position to screen-space.
    ///
    /// World coordinates are scaled by `zoom`, offset by `pan`, and then
    /// centered inside the given `rect`. The y-axis is flipped so that
    /// positive y goes up in world space.
    fn world_to_screen(&self, p: Vec2, rect: egui::Rect) -> egui::Pos2 {
        let center = rect.center();
        egui::pos2(
            center.x + p.x * self.zoom + self.pan.x,
            center.y - p.y * self.zoom + self.pan.y,
        )
    }

    /// Inverse of [`Viewer::world_to_screen`].
    fn screen_to_world(&self, p: egui::Pos2, rect: egui::Rect) -> Vec2 {
        let center = rect.center();
        let x = (p.x - center.x - self.pan.x) / self.zoom;
        let y = (center.y - p.y + self.pan.y) / self.zoom;
        Vec2::new(x, y)
    }

    /// Labeled drag value over `0.0..=max`; returns `true` when edited.
    fn drag(ui: &mut egui::Ui, label: &str, value: &mut f32, max: f32) -> bool {
        ui.horizontal(|ui| {
            ui.label(label);
            let speed = f64::from(max) / 200.0;
            let response = ui.add(egui::DragValue::new(value).range(0.0..=max).speed(speed));
            response.changed()
        })
        .inner
    }

    fn flocking_editor(ui: &mut egui::Ui, name: &str, p: &mut FlockingParams) -> bool {
        let mut changed = false;
        egui::CollapsingHeader::new(name).show(ui, |ui| {
            changed |= Self::drag(ui, "radius:", &mut p.perception_radius, 50.0);
            changed |= Self::drag(ui, "angle:", &mut p.perception_angle, 360.0);
            changed |= Self::drag(ui, "min weight:", &mut p.min_distance_weight, 2.0);
            changed |= Self::drag(ui, "max weight:", &mut p.max_distance_weight, 2.0);
            changed |= Self::drag(ui, "desired:", &mut p.desired_magnitude, 50.0);
            changed |= Self::drag(ui, "max force:", &mut p.max_steering_force, 5.0);
            changed |= Self::drag(ui, "scale:", &mut p.scale_force, 5.0);
        });
        changed
    }

    fn prey_editor(ui: &mut egui::Ui, prey: &mut PreyParams) -> bool {
        let mut changed = false;

        ui.label("Movement");
        let m = &mut prey.movement;
        changed |= Self::drag(ui, "min speed:", &mut m.min_speed, 30.0);
        changed |= Self::drag(ui, "drag:", &mut m.drag_factor, 0.5);

        changed |= Self::flocking_editor(ui, "Alignment", &mut prey.alignment);
        changed |= Self::flocking_editor(ui, "Separation", &mut prey.separation);
        changed |= Self::flocking_editor(ui, "Cohesion", &mut prey.cohesion);

        let e = &mut prey.escape;
        egui::CollapsingHeader::new("Escape").show(ui, |ui| {
            changed |= Self::drag(ui, "radius:", &mut e.perception_radius, 100.0);
            changed |= Self::drag(ui, "speed:", &mut e.speed_factor, 50.0);
            changed |= Self::drag(ui, "max force:", &mut e.max_steering_force, 5.0);
        });

        let a = &mut prey.attraction;
        egui::CollapsingHeader::new("Attraction").show(ui, |ui| {
            changed |= Self::drag(ui, "radius:", &mut a.interaction_radius, 200.0);
            changed |= Self::drag(ui, "orbit:", &mut a.orbit_radius, 100.0);
            changed |= Self::drag(ui, "min force:", &mut a.min_steering_force, 5.0);
            changed |= Self::drag(ui, "max force:", &mut a.max_steering_force, 5.0);
        });

        let r = &mut prey.repulsion;
        egui::CollapsingHeader::new("Repulsion").show(ui, |ui| {
            changed |= Self::drag(ui, "radius:", &mut r.interaction_radius, 200.0);
            changed |= Self::drag(ui, "speed:", &mut r.speed_factor, 100.0);
            changed |= Self::drag(ui, "max force:", &mut r.max_steering_force, 20.0);
        });

        changed
    }

    fn predator_editor(ui: &mut egui::Ui, predator: &mut PredatorParams) -> bool {
        let mut changed = false;

        let m = &mut predator.movement;
        changed |= Self::drag(ui, "min speed:", &mut m.min_speed, 50.0);
        changed |= Self::drag(ui, "max speed:", &mut m.max_speed, 50.0);

        let w = &mut predator.wander;
        changed |= Self::drag(ui, "wander radius:", &mut w.wander_radius, 20.0);
        changed |= Self::drag(ui, "wander distance:", &mut w.wander_distance, 50.0);
        changed |= Self::drag(ui, "variation:", &mut w.variation_range, 3.2);
        changed |= Self::drag(ui, "max force:", &mut w.max_steering_force, 5.0);

        changed
    }

    /// Builds the top panel UI (run controls, stepping, zoom, overlays).
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui
                    .button(if self.running { "⏸ Pause" } else { "▶ Run" })
                    .clicked()
                {
                    self.running = !self.running;
                }

                ui.add(
                    egui::DragValue::new(&mut self.step_interval)
                        .prefix("dt target = ")
                        .range(0.005..=0.5)
                        .speed(0.001),
                );

                if ui.button("Step").clicked() {
                    let now = ctx.input(|i| i.time);
                    if self.last_step_time > 0.0 {
                        self.last_step_dt = now - self.last_step_time;
                    }
                    self.step_once();
                    self.last_step_time = now;
                }

                if ui.button("Reset").clicked() {
                    self.reset();
                }

                let attracting = self.sim.interactions().attraction().is_some();
                if ui
                    .add_enabled(attracting, egui::Button::new("Release"))
                    .clicked()
                {
                    self.release_attraction();
                }

                ui.separator();
                ui.checkbox(&mut self.show_quadtree, "Quadtree");
                ui.add(egui::Slider::new(&mut self.zoom, 0.5..=20.0).text("Zoom"));
            });
        });
    }

    /// Builds the bottom status bar (timing, agent counts, frame).
    fn ui_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("dt target = {:.3} s", self.step_interval));
                ui.label(format!("dt last = {:.3} s", self.last_step_dt));
                ui.separator();
                ui.label(format!("frame = {}", self.sim.frame()));
                ui.label(format!("prey = {}", self.sim.prey().len()));
                ui.label(format!("predators = {}", self.sim.predators().len()));
                ui.label(format!("quad nodes = {}", self.sim.quadtree().nodes.len()));
            });
        });
    }

    /// Builds the right-hand panel editing the behavior parameter snapshot.
    fn ui_config_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("config_panel")
            .resizable(true)
            .default_width(240.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    ui.heading("Prey");
                    let mut changed = Self::prey_editor(ui, &mut self.params.prey);

                    ui.separator();
                    ui.heading("Predators");
                    changed |= Self::predator_editor(ui, &mut self.params.predator);

                    ui.separator();
                    if ui.button("Reset params to config").clicked() {
                        self.params = self.config.behavior();
                        changed = true;
                    }

                    if changed {
                        self.sim.set_params(self.params);
                    }
                });
            });
    }

    /// Builds the floating toolbar for choosing the pointer tool.
    fn ui_toolbar(&mut self, ctx: &egui::Context) {
        egui::Area::new("toolbar".into())
            .anchor(egui::Align2::LEFT_TOP, egui::vec2(10.0, 100.0))
            .movable(false)
            .show(ctx, |ui| {
                egui::Frame::new()
                    .fill(egui::Color32::from_rgba_unmultiplied(0, 0, 0, 32))
                    .show(ui, |ui| {
                        ui.vertical(|ui| {
                            for (tool, label) in [
                                (PointerTool::Spawn, "+ Spawn"),
                                (PointerTool::Repel, "✸ Repel"),
                                (PointerTool::Attract, "◎ Attract"),
                            ] {
                                if ui.selectable_label(self.tool == tool, label).clicked() {
                                    self.tool = tool;
                                }
                            }
                        });
                    });
            });
    }

    /// Prey go from blue (alone) to orange (saturated crowd).
    fn intensity_color(t: f32) -> egui::Color32 {
        let t = t.clamp(0.0, 1.0);
        let lerp = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t) as u8;
        egui::Color32::from_rgb(lerp(90, 255), lerp(160, 150), lerp(255, 40))
    }

    /// Draws one agent as a triangle pointing along its heading.
    fn draw_agent(
        &self,
        painter: &egui::Painter,
        rect: egui::Rect,
        t: &Transform,
        len: f32,
        color: egui::Color32,
    ) {
        let pos = t.position;
        let dir = Vec2::from_angle(t.rotation);
        let side = dir.perp() * len * 0.35;
        let tip = self.world_to_screen(pos + dir * len, rect);
        let left = self.world_to_screen(pos - dir * len * 0.5 + side, rect);
        let right = self.world_to_screen(pos - dir * len * 0.5 - side, rect);
        painter.add(egui::Shape::convex_polygon(
            vec![tip, left, right],
            color,
            egui::Stroke::NONE,
        ));
    }

    /// Builds the central panel where agents are drawn and interacted with.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let response = ui.allocate_response(ui.available_size(), egui::Sense::click_and_drag());
            let rect = response.rect;
            let painter = ui.painter_at(rect);

            // Pan with drag.
            if response.dragged() {
                self.pan += response.drag_delta();
            }

            let hover_world = response.hover_pos().map(|p| self.screen_to_world(p, rect));

            if response.clicked()
                && let Some(world) = hover_world
            {
                self.apply_tool(world);
            }

            // Zoom around the mouse cursor.
            let scroll = ui.ctx().input(|i| i.raw_scroll_delta.y);
            if scroll != 0.0 {
                let pointer_screen = response.hover_pos().unwrap_or(rect.center());
                let world_before = self.screen_to_world(pointer_screen, rect);

                let factor = (1.0 + scroll * 0.001).clamp(0.5, 2.0);
                self.zoom = (self.zoom * factor).clamp(0.5, 20.0);

                let screen_after = self.world_to_screen(world_before, rect);
                self.pan += pointer_screen - screen_after;
            }

            // World bounds.
            let bounds = self.sim.config().world.bounds;
            let world_rect = egui::Rect::from_two_pos(
                self.world_to_screen(bounds.min, rect),
                self.world_to_screen(bounds.max, rect),
            );
            painter.rect_stroke(
                world_rect,
                0.0,
                egui::Stroke::new(1.0, egui::Color32::GRAY),
                egui::StrokeKind::Inside,
            );

            if self.show_quadtree {
                let stroke = egui::Stroke::new(0.5, egui::Color32::from_gray(70));
                for r in self.sim.quadtree().rects() {
                    let screen = egui::Rect::from_two_pos(
                        self.world_to_screen(r.min, rect),
                        self.world_to_screen(r.max, rect),
                    );
                    painter.rect_stroke(screen, 0.0, stroke, egui::StrokeKind::Inside);
                }
            }

            let prey = self.sim.prey();
            let intensity = self.sim.intensity();
            for (i, t) in prey.transforms.iter().enumerate() {
                let color = Self::intensity_color(intensity.get(i).copied().unwrap_or(0.0));
                self.draw_agent(&painter, rect, t, 0.8, color);
            }

            for t in &self.sim.predators().transforms {
                self.draw_agent(&painter, rect, t, 2.0, egui::Color32::RED);
            }

            if let Some(target) = self.sim.interactions().attraction() {
                let p = self.world_to_screen(target, rect);
                let orbit = self.params.prey.attraction.orbit_radius * self.zoom;
                painter.circle_stroke(p, orbit, egui::Stroke::new(1.0, egui::Color32::YELLOW));
                painter.circle_filled(p, 3.0, egui::Color32::YELLOW);
            }

            // Auto-run simulation if requested.
            if self.running {
                let now = ctx.input(|i| i.time);
                let elapsed = now - self.last_step_time;
                if elapsed >= self.step_interval {
                    if self.last_step_time > 0.0 {
                        self.last_step_dt = elapsed;
                    }
                    self.step_once();
                    self.last_step_time = now;
                }

                ctx.request_repaint();
            }
        });
    }
}

impl App for Viewer {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui_top_panel(ctx);
        self.ui_status_bar(ctx);
        self.ui_config_panel(ctx);
        self.ui_central_panel(ctx);
        self.ui_toolbar(ctx);
    }
}
