//! Link buttons on the preview's home view

use egui::{Color32, CornerRadius, FontFamily, FontId, RichText, Ui};

use super::preview_model::{CardView, PageStyle, PreviewAction};
use crate::core::document::LinkKind;

const CARD_HEIGHT: f32 = 56.0;

/// Render one link card; a click yields [`PreviewAction::Activate`]
pub fn render_link_card(ui: &mut Ui, card: &CardView, style: &PageStyle) -> Option<PreviewAction> {
    let family = FontFamily::Name(style.font_family.family_name().into());
    let icon = match card.kind {
        LinkKind::Service => "›",
        LinkKind::Direct => "↗",
    };

    let label = RichText::new(format!("{}   {}", card.title, icon))
        .font(FontId::new(style.card_points(), family))
        .color(Color32::from_rgb(31, 41, 55))
        .strong();

    let button = egui::Button::new(label)
        .fill(Color32::WHITE)
        .corner_radius(CornerRadius::same((CARD_HEIGHT / 2.0) as u8))
        .min_size(egui::vec2(ui.available_width(), CARD_HEIGHT))
        .truncate();

    let response = ui.add(button);
    let response = match card.kind {
        LinkKind::Direct => response.on_hover_text(card.url.as_str()),
        LinkKind::Service => response.on_hover_text("Open details"),
    };

    ui.add_space(12.0);

    response
        .clicked()
        .then(|| PreviewAction::Activate(card.id.clone()))
}
