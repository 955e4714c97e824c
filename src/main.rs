mod config;
mod dataset;
mod error;
mod form;
mod hma;
mod record;
mod session;

use clap::Parser;
use config::{ConfigArgs, EditorConfig};
use eframe::egui::{self, Color32, RichText};
use error::EditorError;
use form::FormState;
use record::{aggregate_tier, stat_tier, Record, Stat, TextField, TextKind, Tier};
use session::{EditorSession, Vocabulary};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const KEEP_ORIGINAL: &str = "-- Keep Original --";
const NOT_APPLICABLE: &str = "N/A";

#[derive(Debug, Parser)]
#[command(author, version, about = "Desktop editor for creature stat records")]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Clone)]
struct StatusLine {
    message: String,
    success: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ExportFormat {
    Json,
    Csv,
    Hma,
}

enum Screen {
    Ready(Box<Editor>),
    Failed(String),
}

struct Editor {
    config: EditorConfig,
    session: EditorSession,
    selected: Option<String>,
    form: FormState,
    notice: Option<String>,
    status: Option<StatusLine>,
}

struct EditorApp {
    screen: Screen,
}

impl EditorApp {
    fn new(config: EditorConfig) -> Self {
        let screen = match dataset::load_dataset(&config.dataset_path) {
            Ok(records) => Screen::Ready(Box::new(Editor::new(config, records))),
            Err(err) => {
                tracing::error!("Failed to load dataset: {err}");
                Screen::Failed(err.to_string())
            }
        };
        Self { screen }
    }
}

impl Editor {
    fn new(config: EditorConfig, records: Vec<Record>) -> Self {
        let mut session = EditorSession::new(records);
        let mut status = None;
        if let Some(path) = config.overrides_path.clone() {
            status = Some(match dataset::load_overrides(&path) {
                Ok(records) => {
                    let imported = session.import_overrides(records);
                    StatusLine {
                        message: format!("Loaded {imported} custom records from {}", path.display()),
                        success: true,
                    }
                }
                Err(err) => {
                    tracing::warn!("Could not import overrides: {err}");
                    StatusLine {
                        message: err.to_string(),
                        success: false,
                    }
                }
            });
        }
        let selected = session.reconcile_selection(None);
        Self {
            config,
            session,
            selected,
            form: FormState::default(),
            notice: None,
            status,
        }
    }

    fn select(&mut self, name: Option<String>) {
        if name != self.selected {
            tracing::debug!(name = ?name, "Selection changed");
            self.selected = name;
            self.form.clear();
        }
    }

    fn commit(&mut self) {
        let Some(name) = self.selected.clone() else {
            return;
        };
        self.status = Some(match self.session.commit(&name, &self.form) {
            Ok(record) => StatusLine {
                message: format!("Committed {} (BST: {})", record.name, record.aggregate()),
                success: true,
            },
            Err(err) => StatusLine {
                message: err.to_string(),
                success: false,
            },
        });
        self.selected = self.session.reconcile_selection(Some(&name));
        self.form.clear();
    }

    fn export(&mut self, format: ExportFormat) {
        let dir = &self.config.export_dir;
        let outcome = match format {
            ExportFormat::Json => self.session.export_json(dir),
            ExportFormat::Csv => self.session.export_csv(dir),
            ExportFormat::Hma => self.session.export_hma_patch(
                &self.config.hma_stats_path,
                &self.config.hma_abilities_path,
                dir,
            ),
        };
        match outcome {
            Ok(path) => {
                self.status = Some(StatusLine {
                    message: format!("Saved {}", path.display()),
                    success: true,
                });
            }
            Err(EditorError::NothingToExport) => {
                self.notice = Some("No custom Pokémon to download!".to_string());
            }
            Err(err) => {
                tracing::error!("Export failed: {err}");
                self.status = Some(StatusLine {
                    message: err.to_string(),
                    success: false,
                });
            }
        }
    }

    fn show(&mut self, ctx: &egui::Context) {
        let blocked = self.notice.is_some();

        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            ui.add_enabled_ui(!blocked, |ui| {
                ui.horizontal(|ui| {
                    ui.label("Pokémon");
                    let mut choice = self.selected.clone();
                    egui::ComboBox::from_id_salt("record_select")
                        .width(220.0)
                        .selected_text(choice.as_deref().unwrap_or("None"))
                        .show_ui(ui, |ui| {
                            for name in self.session.selectable_names() {
                                ui.selectable_value(&mut choice, Some(name.clone()), name);
                            }
                        });
                    self.select(choice);
                    ui.separator();
                    if ui.button("Commit").clicked() {
                        self.commit();
                    }
                    if ui.button("Export JSON").clicked() {
                        self.export(ExportFormat::Json);
                    }
                    if ui.button("Export CSV").clicked() {
                        self.export(ExportFormat::Csv);
                    }
                    if ui.button("Export HMA").clicked() {
                        self.export(ExportFormat::Hma);
                    }
                });
            });
        });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| match &self.status {
            Some(status) => {
                let color = if status.success {
                    Color32::from_rgb(90, 180, 110)
                } else {
                    Color32::from_rgb(220, 90, 80)
                };
                ui.colored_label(color, status.message.as_str());
            }
            None => {
                ui.label(format!(
                    "{} records loaded from {}",
                    self.session.base().len(),
                    self.config.dataset_path.display()
                ));
            }
        });

        egui::SidePanel::right("edited")
            .resizable(true)
            .min_width(200.0)
            .show(ctx, |ui| {
                ui.heading("Edited");
                ui.separator();
                if self.session.overrides().is_empty() {
                    ui.label("Your custom Pokémon will appear here.");
                    return;
                }
                let mut clicked = None;
                egui::ScrollArea::vertical().show(ui, |ui| {
                    ui.add_enabled_ui(!blocked, |ui| {
                        for record in self.session.overrides() {
                            let is_selected = self.selected.as_deref() == Some(record.name.as_str());
                            let text = format!("{} (BST: {})", record.name, record.aggregate());
                            if ui.selectable_label(is_selected, text).clicked() {
                                clicked = Some(record.name.clone());
                            }
                        }
                    });
                });
                if clicked.is_some() {
                    self.select(clicked);
                }
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(name) = self.selected.clone() else {
                ui.label("The dataset is empty.");
                return;
            };
            let Some(record) = self.session.effective(&name) else {
                return;
            };
            ui.add_enabled_ui(!blocked, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    render_editor_grid(ui, record, self.session.vocabulary(), &mut self.form);
                });
            });
        });

        if let Some(message) = self.notice.clone() {
            egui::Window::new("Nothing to export")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.label(message);
                    if ui.button("OK").clicked() {
                        self.notice = None;
                    }
                });
        }
    }
}

impl eframe::App for EditorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        match &mut self.screen {
            Screen::Ready(editor) => editor.show(ctx),
            Screen::Failed(message) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.centered_and_justified(|ui| {
                        ui.label(
                            RichText::new(message.as_str())
                                .color(Color32::from_rgb(239, 68, 68))
                                .strong(),
                        );
                    });
                });
            }
        }
    }
}

fn render_editor_grid(
    ui: &mut egui::Ui,
    record: &Record,
    vocabulary: &Vocabulary,
    form: &mut FormState,
) {
    egui::Grid::new("editor_grid")
        .num_columns(3)
        .spacing([24.0, 8.0])
        .striped(true)
        .show(ui, |ui| {
            ui.label("Category");
            ui.heading("Original");
            ui.heading("Edited");
            ui.end_row();

            for field in TextField::ALL {
                ui.label(format!("{}:", field.label()));
                match (field.kind(), record.text(field)) {
                    (TextKind::Type, Some(value)) => {
                        ui.label(
                            RichText::new(format!(" {value} "))
                                .color(Color32::WHITE)
                                .background_color(type_color(value))
                                .strong(),
                        );
                    }
                    (_, value) => {
                        ui.label(value.unwrap_or(NOT_APPLICABLE));
                    }
                }
                choice_combo(
                    ui,
                    field,
                    vocabulary.options(field.kind()),
                    form.text_mut(field),
                );
                ui.end_row();
            }

            ui.separator();
            ui.separator();
            ui.separator();
            ui.end_row();

            for stat in Stat::ALL {
                let value = record.stats.get(stat);
                ui.label(format!("{}:", stat.label()));
                ui.label(tier_tag(value.to_string(), stat_tier(value)));
                ui.add(
                    egui::TextEdit::singleline(form.stat_mut(stat))
                        .hint_text("Original")
                        .desired_width(120.0),
                );
                ui.end_row();
            }

            ui.separator();
            ui.separator();
            ui.separator();
            ui.end_row();

            let original = record.aggregate();
            let live = form::preview_aggregate(record, form);
            let live_tier = aggregate_tier(live);
            ui.label("BST:");
            if original == 0 {
                ui.label(NOT_APPLICABLE);
            } else {
                ui.label(RichText::new(original.to_string()).strong());
            }
            ui.label(tier_tag(live.to_string(), live_tier))
                .on_hover_text(live_tier.aggregate_label());
            ui.end_row();
        });
}

fn choice_combo(ui: &mut egui::Ui, field: TextField, options: &[String], slot: &mut String) {
    let selected_text = if slot.is_empty() {
        KEEP_ORIGINAL.to_string()
    } else {
        slot.clone()
    };
    egui::ComboBox::from_id_salt(format!("edit_{}", field.label()))
        .width(200.0)
        .selected_text(selected_text)
        .show_ui(ui, |ui| {
            ui.selectable_value(slot, String::new(), KEEP_ORIGINAL);
            for option in options {
                ui.selectable_value(slot, option.clone(), option.as_str());
            }
        });
}

fn tier_tag(text: String, tier: Tier) -> RichText {
    RichText::new(format!(" {text} "))
        .color(Color32::from_gray(30))
        .background_color(tier_color(tier))
        .strong()
}

fn tier_color(tier: Tier) -> Color32 {
    match tier {
        Tier::I => Color32::from_rgb(0, 194, 184),
        Tier::II => Color32::from_rgb(35, 205, 94),
        Tier::III => Color32::from_rgb(160, 229, 21),
        Tier::IV => Color32::from_rgb(255, 221, 87),
        Tier::V => Color32::from_rgb(255, 127, 15),
        Tier::VI => Color32::from_rgb(243, 68, 68),
    }
}

fn type_color(type_name: &str) -> Color32 {
    match type_name.to_lowercase().as_str() {
        "normal" => Color32::from_rgb(168, 167, 122),
        "fire" => Color32::from_rgb(238, 129, 48),
        "water" => Color32::from_rgb(99, 144, 240),
        "electric" => Color32::from_rgb(247, 208, 44),
        "grass" => Color32::from_rgb(122, 199, 76),
        "ice" => Color32::from_rgb(150, 217, 214),
        "fighting" => Color32::from_rgb(194, 46, 40),
        "poison" => Color32::from_rgb(163, 62, 161),
        "ground" => Color32::from_rgb(226, 191, 101),
        "flying" => Color32::from_rgb(169, 143, 243),
        "psychic" => Color32::from_rgb(249, 85, 135),
        "bug" => Color32::from_rgb(166, 185, 26),
        "rock" => Color32::from_rgb(182, 161, 54),
        "ghost" => Color32::from_rgb(115, 87, 151),
        "dragon" => Color32::from_rgb(111, 53, 252),
        "dark" => Color32::from_rgb(112, 87, 70),
        "steel" => Color32::from_rgb(183, 183, 206),
        "fairy" => Color32::from_rgb(214, 133, 173),
        _ => Color32::from_gray(110),
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "creature_editor=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn main() -> eframe::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = EditorConfig::from(cli.config);

    let lacks_display = cfg!(target_family = "unix")
        && std::env::var("DISPLAY").is_err()
        && std::env::var("WAYLAND_DISPLAY").is_err();
    if lacks_display {
        tracing::warn!(
            "No GUI display detected (missing DISPLAY/WAYLAND_DISPLAY). \
             Use editor_cli for headless editing."
        );
        return Ok(());
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([980.0, 720.0])
            .with_min_inner_size([640.0, 420.0]),
        ..Default::default()
    };
    if let Err(err) = eframe::run_native(
        "Pokémon Editor",
        options,
        Box::new(move |_cc| Ok(Box::new(EditorApp::new(config)))),
    ) {
        tracing::error!("Failed to start GUI ({err}). Use editor_cli for headless editing.");
    }
    Ok(())
}
