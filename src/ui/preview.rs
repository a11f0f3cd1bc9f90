//! Live page preview
//!
//! Paints a [`PreviewView`]: the background image with its darkening overlay,
//! the home view, and the service detail view sliding in from the right.

use egui::{
    Align, Color32, CornerRadius, FontFamily, FontId, Layout, Margin, Rect, RichText, ScrollArea,
    Sense, Ui, UiBuilder,
};

use super::link_card::render_link_card;
use super::media::MediaCache;
use super::preview_model::{DetailView, HomeView, PageStyle, PreviewAction, PreviewView};

const SLIDE_SECONDS: f32 = 0.5;
const BACKDROP: Color32 = Color32::from_rgb(17, 24, 39);
const ACCENT: Color32 = Color32::from_rgb(79, 70, 229);

/// Page preview panel
pub struct PreviewPanel;

impl PreviewPanel {
    /// Show the preview filling the available space
    pub fn show(ui: &mut Ui, view: &PreviewView, media: &mut MediaCache) -> Option<PreviewAction> {
        let size = ui.available_size();
        let (rect, _) = ui.allocate_exact_size(size, Sense::hover());
        let ctx = ui.ctx().clone();

        Self::paint_background(ui, rect, &view.style, media, &ctx);

        let slide = ctx.animate_bool_with_time(ui.id().with("detail_slide"), view.is_detail(), SLIDE_SECONDS);
        let width = rect.width();
        let mut action = None;

        if slide < 1.0 {
            let home_rect = rect.translate(egui::vec2(-slide * width, 0.0));
            let mut home_ui = Self::child(ui, "preview_home", home_rect, rect);
            if let Some(a) = Self::show_home(&mut home_ui, &view.home, &view.style, media, &ctx) {
                action = Some(a);
            }
        }

        if slide > 0.0 {
            let detail_rect = rect.translate(egui::vec2((1.0 - slide) * width, 0.0));
            let mut detail_ui = Self::child(ui, "preview_detail", detail_rect, rect);
            if let Some(a) = Self::show_detail(&mut detail_ui, view.detail.as_ref(), &view.style) {
                action = Some(a);
            }
        }

        action
    }

    /// Child ui laid out in `rect`, clipped to the preview area
    fn child(ui: &mut Ui, salt: &str, rect: Rect, clip: Rect) -> Ui {
        let mut child = ui.new_child(
            UiBuilder::new()
                .id_salt(salt)
                .max_rect(rect)
                .layout(Layout::top_down(Align::Center)),
        );
        child.set_clip_rect(clip);
        child
    }

    fn paint_background(ui: &Ui, rect: Rect, style: &PageStyle, media: &mut MediaCache, ctx: &egui::Context) {
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, BACKDROP);

        if let Some(source) = media.image_source(ctx, &style.background) {
            egui::Image::new(source).paint_at(ui, rect);
        }

        let alpha = (style.overlay.alpha() * 255.0).round() as u8;
        painter.rect_filled(rect, 0.0, Color32::from_black_alpha(alpha));
    }

    fn family(style: &PageStyle) -> FontFamily {
        FontFamily::Name(style.font_family.family_name().into())
    }

    /// Profile header and link cards
    fn show_home(
        ui: &mut Ui,
        home: &HomeView,
        style: &PageStyle,
        media: &mut MediaCache,
        ctx: &egui::Context,
    ) -> Option<PreviewAction> {
        let family = Self::family(style);
        let mut action = None;

        ScrollArea::vertical()
            .id_salt("preview_home_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                egui::Frame::new()
                    .inner_margin(Margin::symmetric(24, 0))
                    .show(ui, |ui| {
                        ui.vertical_centered(|ui| {
                            ui.add_space(56.0);

                            if let Some(source) = media.image_source(ctx, &home.avatar) {
                                ui.add(
                                    egui::Image::new(source)
                                        .fit_to_exact_size(egui::vec2(128.0, 128.0))
                                        .corner_radius(CornerRadius::same(64)),
                                );
                            }
                            ui.add_space(20.0);

                            ui.label(
                                RichText::new(&home.name)
                                    .font(FontId::new(30.0, family.clone()))
                                    .color(Color32::WHITE)
                                    .strong(),
                            );
                            ui.add_space(10.0);

                            egui::Frame::new()
                                .fill(Color32::from_black_alpha(50))
                                .corner_radius(CornerRadius::same(16))
                                .inner_margin(Margin::same(12))
                                .show(ui, |ui| {
                                    ui.add(
                                        egui::Label::new(
                                            RichText::new(&home.bio)
                                                .font(FontId::new(style.body_points(), family.clone()))
                                                .color(Color32::from_white_alpha(242)),
                                        )
                                        .wrap(),
                                    );
                                });
                            ui.add_space(36.0);
                        });

                        for card in &home.cards {
                            if let Some(a) = render_link_card(ui, card, style) {
                                action = Some(a);
                            }
                        }

                        ui.vertical_centered(|ui| {
                            ui.add_space(32.0);
                            ui.label(
                                RichText::new("LINKBIO PRO")
                                    .font(FontId::new(13.0, family.clone()))
                                    .color(Color32::from_white_alpha(153))
                                    .strong(),
                            );
                            ui.add_space(24.0);
                        });
                    });
            });

        action
    }

    /// Service detail page; `detail` is `None` while sliding back home
    fn show_detail(ui: &mut Ui, detail: Option<&DetailView>, style: &PageStyle) -> Option<PreviewAction> {
        let family = Self::family(style);
        let mut action = None;

        egui::Frame::new()
            .fill(Color32::from_black_alpha(50))
            .inner_margin(Margin::symmetric(20, 16))
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.horizontal(|ui| {
                    let back = egui::Button::new(RichText::new("⬅").size(22.0).color(Color32::WHITE))
                        .frame(false);
                    if ui.add(back).on_hover_text("Back").clicked() {
                        action = Some(PreviewAction::Back);
                    }
                    ui.label(
                        RichText::new("Details")
                            .font(FontId::new(20.0, family.clone()))
                            .color(Color32::WHITE)
                            .strong(),
                    );
                });
            });

        let Some(detail) = detail else {
            return action;
        };

        ScrollArea::vertical()
            .id_salt("preview_detail_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                egui::Frame::new().inner_margin(Margin::same(24)).show(ui, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add(
                            egui::Label::new(
                                RichText::new(&detail.title)
                                    .font(FontId::new(28.0, family.clone()))
                                    .color(Color32::WHITE)
                                    .strong(),
                            )
                            .wrap(),
                        );
                        ui.add_space(24.0);

                        ui.label(
                            RichText::new("🛡 DESCRIPTION")
                                .font(FontId::new(13.0, family.clone()))
                                .color(Color32::from_white_alpha(204))
                                .strong(),
                        );
                        ui.add_space(8.0);
                        ui.add(
                            egui::Label::new(
                                RichText::new(&detail.description)
                                    .font(FontId::new(style.body_points() + 2.0, family.clone()))
                                    .color(Color32::WHITE),
                            )
                            .wrap(),
                        );
                        ui.add_space(32.0);

                        let cta = egui::Button::new(
                            RichText::new(format!("{}  ↗", detail.button_label))
                                .font(FontId::new(20.0, family.clone()))
                                .color(Color32::WHITE)
                                .strong(),
                        )
                        .fill(ACCENT)
                        .corner_radius(CornerRadius::same(32))
                        .min_size(egui::vec2(ui.available_width(), 64.0));

                        if ui.add(cta).on_hover_text(detail.checkout_url.as_str()).clicked() {
                            action = Some(PreviewAction::Checkout);
                        }

                        ui.add_space(10.0);
                        ui.label(
                            RichText::new("SECURE PAYMENT")
                                .font(FontId::new(12.0, family.clone()))
                                .color(Color32::from_white_alpha(178))
                                .strong(),
                        );
                    });
                });
            });

        action
    }
}
