//! Control Panel Widget
//! Left side panel: watchlist, data source, live toggle and export.

use candle_canvas::data::{PriceBar, MARKET_WATCHLIST};
use egui::{Color32, RichText, ScrollArea};

const UP_COLOR: Color32 = Color32::from_rgb(0, 200, 0);
const DOWN_COLOR: Color32 = Color32::from_rgb(255, 80, 80);

/// Left side control panel.
pub struct ControlPanel {
    pub selected_symbol: Option<usize>,
    pub live: bool,
    pub source_label: String,
    pub status: String,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            selected_symbol: Some(0),
            live: true,
            source_label: MARKET_WATCHLIST[0].symbol.to_string(),
            status: "Ready".to_string(),
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui, bars: &[PriceBar], busy: bool) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🕯 Candle Canvas")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
        });
        ui.add_space(10.0);
        ui.separator();

        // ===== Session Summary =====
        ui.label(RichText::new(&self.source_label).size(16.0).strong());
        if let (Some(first), Some(last)) = (bars.first(), bars.last()) {
            let change = last.close - first.open;
            let pct = if first.open != 0.0 {
                change / first.open * 100.0
            } else {
                0.0
            };
            let color = if change >= 0.0 { UP_COLOR } else { DOWN_COLOR };
            ui.horizontal(|ui| {
                ui.label(RichText::new(format!("₹{:.2}", last.close)).size(14.0).strong());
                ui.label(
                    RichText::new(format!("{change:+.2} ({pct:+.2}%)"))
                        .size(12.0)
                        .color(color),
                );
            });
            ui.label(
                RichText::new(format!("{} bars, last at {}", bars.len(), last.time))
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        }

        ui.add_space(10.0);
        ui.separator();

        // ===== Watchlist =====
        ui.label(RichText::new("📈 Watchlist").size(14.0).strong());
        ui.add_space(5.0);
        ScrollArea::vertical().max_height(260.0).show(ui, |ui| {
            for (i, entry) in MARKET_WATCHLIST.iter().enumerate() {
                let selected = self.selected_symbol == Some(i);
                let text = format!("{:<9} ₹{:>8.2}\n{}", entry.symbol, entry.price, entry.name);
                if ui
                    .selectable_label(selected, RichText::new(text).monospace())
                    .clicked()
                    && !selected
                {
                    action = ControlPanelAction::SelectSymbol(i);
                }
            }
        });

        ui.add_space(10.0);
        ui.separator();

        // ===== Data Source =====
        ui.add_enabled_ui(!busy, |ui| {
            if ui.button("📂 Open bars file…").clicked() {
                action = ControlPanelAction::OpenFile;
            }
        });
        ui.add_enabled_ui(self.selected_symbol.is_some(), |ui| {
            if ui.checkbox(&mut self.live, "Live updates").changed() {
                action = ControlPanelAction::LiveToggled;
            }
        });

        ui.add_space(8.0);
        ui.add_enabled_ui(!bars.is_empty(), |ui| {
            let button = egui::Button::new(RichText::new("💾 Export PNG").size(14.0))
                .min_size(egui::vec2(150.0, 30.0));
            if ui.add(button).clicked() {
                action = ControlPanelAction::ExportPng;
            }
        });

        ui.add_space(10.0);
        ui.separator();

        let status_color = if self.status.starts_with("Error") {
            Color32::from_rgb(220, 53, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    SelectSymbol(usize),
    OpenFile,
    LiveToggled,
    ExportPng,
}
