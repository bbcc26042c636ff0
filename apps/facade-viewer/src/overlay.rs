use egui::{Align2, Color32, Frame, Margin, RichText};

pub const HINT: &str = "Drag to rotate • Scroll to zoom • Right-click to pan";

const TEXT_COLOR: Color32 = Color32::from_rgb(0x33, 0x33, 0x33);
const TEXT_SIZE: f32 = 14.0;
const BOTTOM_OFFSET: f32 = 20.0;

/// Two-line caption pinned to the bottom center of the window.
pub fn draw_caption(ctx: &egui::Context, title: &str) {
    egui::Area::new(egui::Id::new("caption"))
        .anchor(Align2::CENTER_BOTTOM, egui::vec2(0.0, -BOTTOM_OFFSET))
        .interactable(false)
        .show(ctx, |ui| {
            Frame::new()
                .fill(Color32::from_rgba_unmultiplied(255, 255, 255, 204))
                .corner_radius(8)
                .inner_margin(Margin::symmetric(20, 10))
                .show(ui, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.label(
                            RichText::new(title)
                                .strong()
                                .size(TEXT_SIZE)
                                .color(TEXT_COLOR),
                        );
                        ui.label(RichText::new(HINT).size(TEXT_SIZE).color(TEXT_COLOR));
                    });
                });
        });
}
