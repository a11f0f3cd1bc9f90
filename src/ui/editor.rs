//! Page editor panel
//!
//! Every control change becomes one [`EditorEvent`]. The container applies
//! each event as soon as the panel returns, producing one new document per
//! change.

use std::path::PathBuf;

use eframe::egui::{self, Color32, RichText, Ui};

use super::media::MediaCache;
use crate::core::document::{
    FontChoice, FontSize, LinkEdit, LinkEntry, LinkId, LinkKind, MediaRef, MoveDirection,
    OverlayOpacity, PageDocument, ProfileEdit,
};
use crate::core::file_ref::FileTarget;

const ACCENT: Color32 = Color32::from_rgb(79, 70, 229);

/// A single change requested from the editor
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    Profile(ProfileEdit),
    Link { id: LinkId, edit: LinkEdit },
    AddLink(LinkKind),
    RemoveLink(LinkId),
    MoveLink { id: LinkId, direction: MoveDirection },
}

impl EditorEvent {
    /// Overlay opacity change from a raw control value, clamped into range
    pub fn overlay_opacity(raw: i64) -> Self {
        let opacity = OverlayOpacity::new(raw).unwrap_or_else(|e| {
            tracing::debug!("{}, clamping", e);
            OverlayOpacity::clamped(raw)
        });
        EditorEvent::Profile(ProfileEdit::OverlayOpacity(opacity))
    }

    /// The document that results from this change
    pub fn apply(self, doc: &PageDocument) -> PageDocument {
        match self {
            EditorEvent::Profile(edit) => doc.replace_profile_field(edit),
            EditorEvent::Link { id, edit } => doc.replace_link_field(&id, edit),
            EditorEvent::AddLink(kind) => doc.with_link_added(kind).0,
            EditorEvent::RemoveLink(id) => doc.with_link_removed(&id),
            EditorEvent::MoveLink { id, direction } => doc.with_link_moved(&id, direction),
        }
    }
}

/// What the editor produced this frame
#[derive(Debug, Default)]
pub struct EditorOutput {
    /// Document changes, in the order they happened
    pub events: Vec<EditorEvent>,
    /// Files picked for a profile media field, still to be resolved
    pub file_picks: Vec<(FileTarget, PathBuf)>,
}

/// Page editor panel
pub struct EditorPanel;

impl EditorPanel {
    /// Show the editor for `doc`
    pub fn show(ui: &mut Ui, doc: &PageDocument, media: &mut MediaCache) -> EditorOutput {
        let mut out = EditorOutput::default();

        egui::ScrollArea::vertical()
            .id_salt("editor_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.add_space(8.0);
                ui.heading(RichText::new("Editor Pro").strong());
                ui.label(RichText::new("Customise your page and services").weak());
                ui.add_space(12.0);

                Self::show_profile(ui, doc, &mut out);
                ui.separator();
                Self::show_typography(ui, doc, &mut out);
                ui.separator();
                Self::show_links(ui, doc, &mut out);
                ui.separator();
                Self::show_appearance(ui, doc, media, &mut out);
                ui.add_space(24.0);
            });

        out
    }

    fn section_header(ui: &mut Ui, icon: &str, title: &str) {
        ui.add_space(8.0);
        ui.label(RichText::new(format!("{} {}", icon, title.to_uppercase())).color(ACCENT).strong());
        ui.add_space(4.0);
    }

    fn show_profile(ui: &mut Ui, doc: &PageDocument, out: &mut EditorOutput) {
        Self::section_header(ui, "✏", "Profile details");

        ui.label("Display name");
        let mut name = doc.profile.name.clone();
        let response = ui.add(
            egui::TextEdit::singleline(&mut name)
                .hint_text("@username")
                .desired_width(f32::INFINITY),
        );
        if response.changed() {
            out.events.push(EditorEvent::Profile(ProfileEdit::Name(name)));
        }

        ui.label("Bio");
        let mut bio = doc.profile.bio.clone();
        let response = ui.add(
            egui::TextEdit::multiline(&mut bio)
                .hint_text("Tell your story...")
                .desired_rows(3)
                .desired_width(f32::INFINITY),
        );
        if response.changed() {
            out.events.push(EditorEvent::Profile(ProfileEdit::Bio(bio)));
        }
    }

    fn show_typography(ui: &mut Ui, doc: &PageDocument, out: &mut EditorOutput) {
        Self::section_header(ui, "🔤", "Typography");

        ui.label("Font");
        let current = doc.profile.font_family;
        egui::ComboBox::from_id_salt("font_family")
            .selected_text(current.label())
            .width(ui.available_width())
            .show_ui(ui, |ui| {
                for choice in FontChoice::ALL {
                    if ui.selectable_label(choice == current, choice.label()).clicked() && choice != current {
                        out.events.push(EditorEvent::Profile(ProfileEdit::FontFamily(choice)));
                    }
                }
            });

        ui.add_space(6.0);
        ui.label("General text size");
        if let Some(size) = Self::size_selector(ui, doc.profile.font_size) {
            out.events.push(EditorEvent::Profile(ProfileEdit::FontSize(size)));
        }

        ui.add_space(6.0);
        ui.label("Link text size");
        if let Some(size) = Self::size_selector(ui, doc.profile.link_font_size) {
            out.events.push(EditorEvent::Profile(ProfileEdit::LinkFontSize(size)));
        }
    }

    /// Segmented size picker; returns the newly selected size
    fn size_selector(ui: &mut Ui, current: FontSize) -> Option<FontSize> {
        let mut picked = None;
        ui.horizontal(|ui| {
            for size in FontSize::ALL {
                if ui.selectable_label(size == current, size.label()).clicked() && size != current {
                    picked = Some(size);
                }
            }
        });
        picked
    }

    fn show_links(ui: &mut Ui, doc: &PageDocument, out: &mut EditorOutput) {
        Self::section_header(ui, "🔗", "Link manager");

        let count = doc.links.len();
        for (index, link) in doc.links.iter().enumerate() {
            ui.push_id(link.id.as_str(), |ui| {
                Self::show_link(ui, index, count, link, out);
            });
            ui.add_space(8.0);
        }

        ui.horizontal(|ui| {
            if ui.button("+ Direct link").clicked() {
                out.events.push(EditorEvent::AddLink(LinkKind::Direct));
            }
            if ui.button("+ Service page").clicked() {
                out.events.push(EditorEvent::AddLink(LinkKind::Service));
            }
        });
    }

    fn show_link(ui: &mut Ui, index: usize, count: usize, link: &LinkEntry, out: &mut EditorOutput) {
        let id = &link.id;
        let mut edits = Vec::new();
        let mut structural = None;

        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.set_width(ui.available_width());

            ui.horizontal(|ui| {
                ui.label(RichText::new(format!("LINK #{}", index + 1)).color(ACCENT).strong());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.small_button("🗑").on_hover_text("Remove").clicked() {
                        structural = Some(EditorEvent::RemoveLink(id.clone()));
                    }
                    if index + 1 < count && ui.small_button("⏷").on_hover_text("Move down").clicked() {
                        structural = Some(EditorEvent::MoveLink {
                            id: id.clone(),
                            direction: MoveDirection::Down,
                        });
                    }
                    if index > 0 && ui.small_button("⏶").on_hover_text("Move up").clicked() {
                        structural = Some(EditorEvent::MoveLink {
                            id: id.clone(),
                            direction: MoveDirection::Up,
                        });
                    }
                });
            });

            ui.horizontal(|ui| {
                let direct = ui.selectable_label(link.kind == LinkKind::Direct, "🌐 Direct");
                if direct.clicked() && link.kind != LinkKind::Direct {
                    edits.push(LinkEdit::Kind(LinkKind::Direct));
                }
                let service = ui.selectable_label(link.kind == LinkKind::Service, "📄 Service page");
                if service.clicked() && link.kind != LinkKind::Service {
                    edits.push(LinkEdit::Kind(LinkKind::Service));
                }

                let mut active = link.is_active;
                if ui.checkbox(&mut active, "Visible").changed() {
                    edits.push(LinkEdit::IsActive(active));
                }
            });

            ui.label(RichText::new("Button title").small());
            let mut title = link.title.clone();
            if ui
                .add(egui::TextEdit::singleline(&mut title).desired_width(f32::INFINITY))
                .changed()
            {
                edits.push(LinkEdit::Title(title));
            }

            // Hidden, not cleared, while the link is direct
            if let Some(details) = link.service_details() {
                ui.label(RichText::new("Service description").small());
                let mut description = details.description.unwrap_or_default().to_string();
                if ui
                    .add(
                        egui::TextEdit::multiline(&mut description)
                            .hint_text("Describe what your service includes...")
                            .desired_rows(4)
                            .desired_width(f32::INFINITY),
                    )
                    .changed()
                {
                    edits.push(LinkEdit::Description(description));
                }

                ui.label(RichText::new("Payment button text").small());
                let mut button_text = details.button_text.unwrap_or_default().to_string();
                if ui
                    .add(
                        egui::TextEdit::singleline(&mut button_text)
                            .hint_text("e.g. Pay $20")
                            .desired_width(f32::INFINITY),
                    )
                    .changed()
                {
                    edits.push(LinkEdit::ButtonText(button_text));
                }
            }

            let url_label = match link.kind {
                LinkKind::Service => "💳 Payment URL (Stripe/PayPal)",
                LinkKind::Direct => "🌐 Destination URL",
            };
            ui.label(RichText::new(url_label).small());
            let mut url = link.destination_url.clone();
            if ui
                .add(
                    egui::TextEdit::singleline(&mut url)
                        .hint_text("https://...")
                        .code_editor()
                        .desired_width(f32::INFINITY),
                )
                .changed()
            {
                edits.push(LinkEdit::DestinationUrl(url));
            }
        });

        out.events.extend(edits.into_iter().map(|edit| EditorEvent::Link { id: id.clone(), edit }));
        out.events.extend(structural);
    }

    fn show_appearance(ui: &mut Ui, doc: &PageDocument, media: &mut MediaCache, out: &mut EditorOutput) {
        Self::section_header(ui, "🎨", "Appearance");
        let ctx = ui.ctx().clone();

        ui.label("Background image");
        ui.horizontal(|ui| {
            Self::thumbnail(ui, &ctx, media, &doc.profile.background_image, 64.0, 12);
            if ui.button("⬆ Upload new").clicked() {
                Self::pick_file(FileTarget::BackgroundImage, out);
            }
        });

        ui.add_space(6.0);
        ui.label("Background audio (invisible)");
        ui.horizontal(|ui| {
            ui.label(RichText::new("🎵").size(28.0));
            ui.vertical(|ui| {
                ui.horizontal(|ui| {
                    if ui.button("⬆ Upload song").clicked() {
                        Self::pick_file(FileTarget::BackgroundAudio, out);
                    }
                    if doc.profile.background_audio.is_some() && ui.small_button("Remove").clicked() {
                        out.events.push(EditorEvent::Profile(ProfileEdit::BackgroundAudio(None)));
                    }
                });
                if doc.profile.background_audio.is_some() {
                    ui.label(RichText::new("✓ Audio loaded").color(Color32::from_rgb(22, 163, 74)).small());
                }
            });
        });
        ui.label(
            RichText::new("Audio starts on the first interaction if playback cannot start right away.")
                .small()
                .weak(),
        );

        ui.add_space(6.0);
        ui.label("Profile photo");
        ui.horizontal(|ui| {
            Self::thumbnail(ui, &ctx, media, &doc.profile.avatar_image, 48.0, 24);
            if ui.link("Change photo").clicked() {
                Self::pick_file(FileTarget::AvatarImage, out);
            }
        });

        ui.add_space(6.0);
        ui.horizontal(|ui| {
            ui.label("Dark overlay intensity");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(RichText::new(format!("{}%", doc.profile.overlay_opacity.get())).color(ACCENT).strong());
            });
        });
        let mut opacity = i64::from(doc.profile.overlay_opacity.get());
        let slider = egui::Slider::new(&mut opacity, 0..=i64::from(OverlayOpacity::MAX)).show_value(false);
        if ui.add(slider).changed() {
            out.events.push(EditorEvent::overlay_opacity(opacity));
        }
    }

    fn thumbnail(
        ui: &mut Ui,
        ctx: &egui::Context,
        media: &mut MediaCache,
        reference: &MediaRef,
        size: f32,
        radius: u8,
    ) {
        match media.image_source(ctx, reference) {
            Some(source) => {
                ui.add(
                    egui::Image::new(source)
                        .fit_to_exact_size(egui::vec2(size, size))
                        .corner_radius(egui::CornerRadius::same(radius)),
                );
            }
            None => {
                ui.allocate_exact_size(egui::vec2(size, size), egui::Sense::hover());
            }
        }
    }

    /// Ask for a file; resolution happens in the background
    fn pick_file(target: FileTarget, out: &mut EditorOutput) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter(target.filter_name(), target.extensions())
            .pick_file()
        {
            out.file_picks.push((target, path));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opacity_is_clamped_at_the_boundary() {
        let doc = PageDocument::default();

        for (raw, stored) in [(-15, 0), (0, 0), (55, 55), (90, 90), (91, 90), (400, 90)] {
            let next = EditorEvent::overlay_opacity(raw).apply(&doc);
            assert_eq!(next.profile.overlay_opacity.get(), stored, "raw value {}", raw);
        }
    }

    #[test]
    fn test_each_event_produces_one_new_document() {
        let doc = PageDocument::default();
        let events = vec![
            EditorEvent::Profile(ProfileEdit::Name("@new".to_string())),
            EditorEvent::Link {
                id: "1".into(),
                edit: LinkEdit::Title("Shop".to_string()),
            },
            EditorEvent::MoveLink {
                id: "4".into(),
                direction: MoveDirection::Up,
            },
            EditorEvent::RemoveLink("3".into()),
            EditorEvent::AddLink(LinkKind::Service),
        ];

        let mut revisions = vec![doc];
        for event in events {
            let next = event.apply(revisions.last().unwrap());
            assert_ne!(&next, revisions.last().unwrap());
            revisions.push(next);
        }

        let last = revisions.last().unwrap();
        assert_eq!(last.profile.name, "@new");
        assert_eq!(last.links[0].title, "Shop");
        let ids: Vec<_> = last.links.iter().take(3).map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "4"]);
        assert_eq!(last.links[3].kind, LinkKind::Service);
        // the seed revision is untouched
        assert_eq!(revisions[0], PageDocument::default());
    }

    #[test]
    fn test_kind_toggle_through_editor_keeps_service_fields() {
        let doc = PageDocument::default();
        let id = LinkId::from("4");
        let to_direct = EditorEvent::Link {
            id: id.clone(),
            edit: LinkEdit::Kind(LinkKind::Direct),
        };
        let to_service = EditorEvent::Link {
            id: id.clone(),
            edit: LinkEdit::Kind(LinkKind::Service),
        };

        let round_trip = to_service.apply(&to_direct.apply(&doc));
        assert_eq!(round_trip.link(&id), doc.link(&id));
    }

    #[test]
    fn test_unknown_link_event_leaves_document_equal() {
        let doc = PageDocument::default();
        let event = EditorEvent::Link {
            id: "nonexistent-id".into(),
            edit: LinkEdit::Title("X".to_string()),
        };
        assert_eq!(event.apply(&doc), doc);
    }
}
