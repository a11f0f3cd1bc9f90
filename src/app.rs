//! Main application state and UI coordination

use eframe::egui::{self, Color32, CornerRadius, Rect, RichText, UiBuilder};
use tokio::runtime::Handle;

use crate::core::audio::{AmbientAudio, ProcessPlayer};
use crate::core::config::{AppConfig, ViewMode};
use crate::core::document::{FontChoice, PageDocument};
use crate::core::file_ref::FileResolver;
use crate::ui::editor::{EditorOutput, EditorPanel};
use crate::ui::media::MediaCache;
use crate::ui::preview::PreviewPanel;
use crate::ui::preview_model::{PreviewAction, PreviewNav, PreviewView};

const PHONE_SIZE: egui::Vec2 = egui::vec2(375.0, 667.0);
const CANVAS: Color32 = Color32::from_rgb(226, 232, 240);
const ACCENT: Color32 = Color32::from_rgb(79, 70, 229);

/// Main application state
pub struct LinkBioApp {
    /// The page being edited; replaced wholesale on every edit
    pub document: PageDocument,
    /// Preview framing
    pub view_mode: ViewMode,
    /// Whether the editor panel is visible
    pub editor_open: bool,
    /// Home or service detail in the preview
    pub nav: PreviewNav,
    /// Application configuration
    pub config: AppConfig,
    files: FileResolver,
    audio: AmbientAudio<ProcessPlayer>,
    media: MediaCache,
}

impl LinkBioApp {
    /// Create a new application instance
    pub fn new(cc: &eframe::CreationContext<'_>, runtime: Handle, config: AppConfig) -> Self {
        Self::configure_fonts(&cc.egui_ctx);
        egui_extras::install_image_loaders(&cc.egui_ctx);

        let ctx = cc.egui_ctx.clone();
        let player = ProcessPlayer::new(
            config.audio.player_command.clone(),
            AppConfig::cache_dir(),
            runtime.clone(),
        );
        let files = FileResolver::new(runtime, move || ctx.request_repaint());

        Self {
            document: PageDocument::default(),
            view_mode: config.ui.view_mode,
            editor_open: config.ui.editor_open,
            nav: PreviewNav::default(),
            config,
            files,
            audio: AmbientAudio::new(player),
            media: MediaCache::new(),
        }
    }

    /// Register the page font families
    ///
    /// Each family falls back to the default proportional fonts; real font
    /// files can be inserted at the front of a family's list.
    fn configure_fonts(ctx: &egui::Context) {
        let mut fonts = egui::FontDefinitions::default();
        let proportional = fonts
            .families
            .get(&egui::FontFamily::Proportional)
            .cloned()
            .unwrap_or_default();

        for choice in FontChoice::ALL {
            fonts
                .families
                .insert(egui::FontFamily::Name(choice.family_name().into()), proportional.clone());
        }
        ctx.set_fonts(fonts);
    }

    /// Replace the document if the new revision differs
    ///
    /// The preview falls back to Home if the open service no longer exists.
    pub fn set_document(&mut self, next: PageDocument) {
        if next != self.document {
            tracing::debug!("Document updated");
            self.document = next;
            self.nav.reconcile(&self.document);
        }
    }

    /// Switch preview framing and remember it
    pub fn set_view_mode(&mut self, mode: ViewMode) {
        if mode == self.view_mode {
            return;
        }
        self.view_mode = mode;
        self.config.ui.view_mode = mode;
        if let Err(e) = self.config.save() {
            tracing::warn!("Failed to save config: {}", e);
        }
    }

    fn apply_editor_output(&mut self, output: EditorOutput) {
        for event in output.events {
            let next = event.apply(&self.document);
            self.set_document(next);
        }
        for (target, path) in output.file_picks {
            self.files.request(target, path);
        }
    }

    fn apply_resolved_files(&mut self) {
        for resolved in self.files.poll() {
            tracing::info!("Loaded {:?}", resolved.target);
            let next = self
                .document
                .replace_profile_field(resolved.target.into_edit(resolved.reference));
            self.set_document(next);
        }
    }

    fn handle_preview_action(&mut self, action: PreviewAction) {
        if let Some(url) = self.nav.dispatch(&self.document, action) {
            Self::open_external(&url);
        }
    }

    fn sync_audio(&mut self) {
        let source = if self.config.audio.enabled {
            self.document.profile.background_audio.as_ref()
        } else {
            None
        };
        self.audio.sync(source);
    }

    /// Open a URL in the system browser without waiting for it
    fn open_external(url: &str) {
        let url = url.trim();
        if url.is_empty() {
            return;
        }
        tracing::info!("Opening {}", url);
        if let Err(e) = open::that_detached(url) {
            tracing::warn!("Failed to open {}: {}", url, e);
        }
    }

    /// Render the top toolbar
    fn render_toolbar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui
                    .selectable_label(self.editor_open, "⚙ Edit")
                    .on_hover_text("Toggle editor (Ctrl+E)")
                    .clicked()
                {
                    self.editor_open = !self.editor_open;
                }

                ui.separator();
                ui.label(RichText::new("LinkBio").strong().size(18.0));
                ui.label(RichText::new("Pro").strong().size(18.0).color(ACCENT));
                ui.separator();

                let mut mode = self.view_mode;
                ui.selectable_value(&mut mode, ViewMode::Mobile, "📱 Mobile")
                    .on_hover_text("Mobile view");
                ui.selectable_value(&mut mode, ViewMode::Desktop, "🖥 Desktop")
                    .on_hover_text("Desktop full view");
                self.set_view_mode(mode);

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if self.audio.is_retry_armed() {
                        ui.label("🔇").on_hover_text("Background audio starts on your next click");
                    } else if self.audio.is_playing() {
                        ui.label("🔊").on_hover_text("Background audio playing");
                    }
                    if let Some(first) = self.document.links.first() {
                        if ui
                            .link("👁 Live test")
                            .on_hover_text(first.destination_url.as_str())
                            .clicked()
                        {
                            Self::open_external(&first.destination_url);
                        }
                    }
                });
            });
        });
    }

    /// Render the preview canvas in the current view mode
    fn show_canvas(
        ui: &mut egui::Ui,
        mode: ViewMode,
        view: &PreviewView,
        media: &mut MediaCache,
    ) -> Option<PreviewAction> {
        let available = ui.available_rect_before_wrap();

        match mode {
            ViewMode::Mobile => {
                let height = PHONE_SIZE.y.min(available.height() - 32.0).max(240.0);
                let screen = Rect::from_center_size(available.center(), egui::vec2(PHONE_SIZE.x, height));
                ui.painter().rect_filled(
                    screen.expand(8.0),
                    CornerRadius::same(48),
                    Color32::from_rgb(31, 41, 55),
                );

                let action = Self::preview_in(ui, screen, view, media);

                // Notch
                let notch = Rect::from_center_size(
                    egui::pos2(screen.center().x, screen.top() + 14.0),
                    egui::vec2(screen.width() / 3.0, 28.0),
                );
                ui.painter().rect_filled(
                    notch,
                    CornerRadius {
                        nw: 0,
                        ne: 0,
                        sw: 16,
                        se: 16,
                    },
                    Color32::BLACK,
                );
                action
            }
            ViewMode::Desktop => {
                let screen = available.shrink(24.0);
                ui.painter().rect_filled(
                    screen.expand(1.0),
                    CornerRadius::same(12),
                    Color32::from_rgb(209, 213, 219),
                );
                Self::preview_in(ui, screen, view, media)
            }
        }
    }

    fn preview_in(
        ui: &mut egui::Ui,
        screen: Rect,
        view: &PreviewView,
        media: &mut MediaCache,
    ) -> Option<PreviewAction> {
        let mut child = ui.new_child(UiBuilder::new().max_rect(screen).id_salt("page_preview"));
        child.set_clip_rect(screen);
        PreviewPanel::show(&mut child, view, media)
    }
}

impl eframe::App for LinkBioApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.apply_resolved_files();
        self.audio.poll();

        // Any press counts as the interaction that unlocks deferred audio
        let interacted = ctx.input(|i| {
            i.pointer.any_pressed()
                || i
                    .events
                    .iter()
                    .any(|e| matches!(e, egui::Event::Key { pressed: true, .. }))
        });
        if interacted {
            self.audio.on_user_interaction();
        }

        // Handle keyboard shortcuts
        ctx.input(|i| {
            if i.modifiers.command && i.key_pressed(egui::Key::E) {
                self.editor_open = !self.editor_open;
            }
        });

        self.render_toolbar(ctx);

        if self.editor_open {
            let output = egui::SidePanel::left("editor_panel")
                .resizable(true)
                .default_width(self.config.ui.editor_width)
                .min_width(320.0)
                .show(ctx, |ui| EditorPanel::show(ui, &self.document, &mut self.media))
                .inner;
            self.apply_editor_output(output);
        }

        let view = PreviewView::layout(&self.document, &self.nav);
        let action = egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(CANVAS))
            .show(ctx, |ui| Self::show_canvas(ui, self.view_mode, &view, &mut self.media))
            .inner;
        if let Some(action) = action {
            self.handle_preview_action(action);
        }

        self.sync_audio();
    }
}
