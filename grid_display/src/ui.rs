// ui.rs - Draws the grid and controls, forwards clicks to LifeApp

use eframe::egui;
use egui::{Color32, Rect, Stroke, Vec2};

use conway::PATTERNS;
use conway_coro::config::MAX_DIMENSION;

use crate::app::LifeApp;

const GRID_EXTENT: f32 = 760.0;   // Pixels available for the grid
const SPACING: f32 = 0.5;

impl eframe::App for LifeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let wake_after = self.pump();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Conway's Game of Life");

            // Controls
            ui.horizontal(|ui| {
                let button_text = if self.is_running { "⏸ Pause" } else { "▶ Start" };
                if ui.button(button_text).clicked() {
                    if self.is_running { self.pause() } else { self.start() }
                }

                let editable = self.is_editable();
                if ui.add_enabled(editable, egui::Button::new("⏭ Step")).clicked() {
                    self.step_once();
                }
                if ui.add_enabled(editable, egui::Button::new("⏹ Clear")).clicked() {
                    self.clear();
                }
                if ui.add_enabled(editable, egui::Button::new("🎲 Random")).clicked() {
                    self.randomize();
                }

                ui.separator();

                // Pattern dropdown
                ui.label("Pattern:");
                egui::ComboBox::from_id_source("pattern_selector")
                    .selected_text(PATTERNS[self.selected_pattern].name)
                    .show_ui(ui, |ui| {
                        for (i, pattern) in PATTERNS.iter().enumerate() {
                            ui.selectable_value(&mut self.selected_pattern, i, pattern.name);
                        }
                    });

                if ui.add_enabled(editable, egui::Button::new("Apply Pattern")).clicked() {
                    self.apply_selected_pattern();
                }

                ui.separator();

                ui.label(format!("Generation: {}", self.generation));
            });

            ui.separator();

            // Speed and colours
            ui.horizontal(|ui| {
                let mut changed = ui.checkbox(&mut self.limit_speed, "Limit speed").changed();
                changed |= ui
                    .add_enabled(
                        self.limit_speed,
                        egui::Slider::new(&mut self.speed, 0.5..=90.0).suffix(" gen/sec"),
                    )
                    .changed();
                if changed {
                    self.set_speed_limit();
                }

                ui.separator();

                ui.label("Live:");
                ui.color_edit_button_srgba(&mut self.live_color);
                ui.label("Dead:");
                ui.color_edit_button_srgba(&mut self.dead_color);
            });

            // Grid size
            ui.horizontal(|ui| {
                ui.label("Rows:");
                ui.add(egui::DragValue::new(&mut self.pending_rows).clamp_range(1..=MAX_DIMENSION));
                ui.label("Cols:");
                ui.add(egui::DragValue::new(&mut self.pending_cols).clamp_range(1..=MAX_DIMENSION));
                let resized = (self.pending_rows, self.pending_cols) != self.state.dimensions();
                if ui.add_enabled(resized, egui::Button::new("Resize")).clicked() {
                    self.resize();
                }
            });

            ui.separator();

            ui.label("Click cells to toggle them while paused. Generations are computed on a worker thread.");

            ui.separator();

            self.draw_grid(ui);

            ui.separator();

            // Statistics
            let total = self.state.rows() * self.state.cols();
            let live = self.state.live_count();
            ui.horizontal(|ui| {
                ui.label(format!("Live cells: {live}"));
                ui.label(format!("Dead cells: {}", total - live));
                ui.label(format!("Population: {:.1}%", live as f32 / total as f32 * 100.0));
                if let Some(elapsed) = self.last_elapsed {
                    ui.label(format!("Step: {:.2} ms", elapsed.as_secs_f64() * 1000.0));
                }
                ui.label(format!("Stale: {}", self.stale_discarded()));
            });

            if let Some(status) = &self.status {
                ui.colored_label(Color32::from_rgb(220, 160, 0), status.as_str());
            }
        });

        if let Some(delay) = wake_after {
            ctx.request_repaint_after(delay);
        }
    }
}

impl LifeApp {
    fn draw_grid(&mut self, ui: &mut egui::Ui) {
        let (rows, cols) = self.state.dimensions();
        let box_size = (GRID_EXTENT / rows.max(cols) as f32 - SPACING).clamp(1.0, 15.0);
        let pitch = box_size + SPACING;

        let start_pos = ui.cursor().min;
        let total_size = Vec2::new(pitch * cols as f32 - SPACING, pitch * rows as f32 - SPACING);

        let (response, painter) = ui.allocate_painter(total_size, egui::Sense::click());

        // Fill background
        painter.rect_filled(Rect::from_min_size(start_pos, total_size), 0.0, Color32::BLACK);

        let view = self.state.current_state();
        let outline = box_size >= 4.0;
        for row in 0..rows {
            for col in 0..cols {
                let rect = Rect::from_min_size(
                    egui::pos2(start_pos.x + col as f32 * pitch, start_pos.y + row as f32 * pitch),
                    Vec2::splat(box_size),
                );
                let cell_color = if view.get(row, col) == Some(true) { self.live_color } else { self.dead_color };
                painter.rect_filled(rect, 1.0, cell_color);
                if outline {
                    painter.rect_stroke(rect, 1.0, Stroke::new(0.2, Color32::from_gray(60)));
                }
            }
        }

        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                let offset = pos - start_pos;
                if offset.x >= 0.0 && offset.y >= 0.0 {
                    let row = (offset.y / pitch) as usize;
                    let col = (offset.x / pitch) as usize;
                    self.toggle(row, col);
                }
            }
        }
    }
}
