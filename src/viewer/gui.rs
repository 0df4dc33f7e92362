use std::ops::RangeInclusive;

use egui::{Color32, RichText};

use crate::gfx::{Camera, DrawProperties};

/// The settings panel drawn over the scene.
#[derive(Debug, Clone, Default)]
pub struct Overlay {
    frame_time: f32,
}

impl Overlay {
    pub fn set_frame_time(&mut self, seconds: f32) {
        // Smoothed so the readout is legible
        self.frame_time = self.frame_time * 0.9 + seconds * 0.1;
    }

    /// Shows the panel and returns the properties with the user's edits applied.
    pub fn show(
        &mut self,
        ctx: &egui::Context,
        camera: &Camera,
        mut props: DrawProperties,
        model_names: &[String],
    ) -> DrawProperties {
        egui::Window::new("Settings")
            .default_pos([10.0, 10.0])
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(
                    RichText::new("Right mouse: look   WASD: move   Space / Ctrl: up / down   Esc: quit")
                        .small(),
                );
                ui.separator();

                egui::ComboBox::from_label("Model")
                    .selected_text(
                        model_names
                            .get(props.selected_model_index)
                            .map(String::as_str)
                            .unwrap_or("none"),
                    )
                    .show_ui(ui, |ui| {
                        for (i, name) in model_names.iter().enumerate() {
                            ui.selectable_value(&mut props.selected_model_index, i, name.as_str());
                        }
                    });

                ui.horizontal(|ui| {
                    ui.color_edit_button_rgb(&mut props.background_color);
                    ui.label("Background color");
                });
                ui.horizontal(|ui| {
                    ui.color_edit_button_rgb(&mut props.model_color);
                    ui.label("Model color");
                });

                ui.add(
                    egui::Slider::new(&mut props.fov, DrawProperties::FOV_RANGE)
                        .text("Field of view")
                        .suffix("°"),
                );

                ui.label("Model rotation");
                for (angle, axis) in props.model_rotation.iter_mut().zip(["X", "Y", "Z"]) {
                    ui.add(
                        egui::Slider::new(angle, RangeInclusive::new(-180.0, 180.0))
                            .text(axis)
                            .suffix("°"),
                    );
                }

                ui.label("Light direction");
                ui.horizontal(|ui| {
                    for component in props.light_direction.iter_mut() {
                        ui.add(egui::DragValue::new(component).speed(0.01).range(-1.0..=1.0));
                    }
                });

                ui.separator();
                ui.checkbox(&mut props.diffuse_enabled, "Diffuse lighting");
                ui.checkbox(&mut props.specular_enabled, "Specular lighting");
                ui.checkbox(&mut props.wireframe_mode_enabled, "Wireframe");
                ui.checkbox(&mut props.skybox_enabled, "Skybox");

                ui.separator();
                let pos = camera.position();
                ui.label(format!(
                    "Camera  x {:.2}  y {:.2}  z {:.2}   yaw {:.1}°  pitch {:.1}°",
                    pos.x,
                    pos.y,
                    pos.z,
                    camera.yaw(),
                    camera.pitch()
                ));
                if self.frame_time > 0.0 {
                    ui.colored_label(
                        Color32::GRAY,
                        format!(
                            "{:.2} ms / frame ({:.0} fps)",
                            self.frame_time * 1000.0,
                            1.0 / self.frame_time
                        ),
                    );
                }
            });

        props
    }
}
