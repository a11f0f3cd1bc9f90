//! Preview navigation and layout
//!
//! The preview is laid out as a plain value from the document and the
//! navigation state, and only then painted. Layout is pure: the same document
//! and navigation state always give the same [`PreviewView`].

use crate::core::document::{
    FontChoice, FontSize, LinkEntry, LinkId, LinkKind, MediaRef, OverlayOpacity, PageDocument,
};

/// Shown in the detail view when a service has no description
pub const FALLBACK_DESCRIPTION: &str = "No description available.";
/// Call-to-action label when a service has no button text
pub const FALLBACK_BUTTON_TEXT: &str = "Proceed to payment";

/// Which view the preview shows
///
/// Home when `active_service` is `None`, otherwise the detail view of that
/// service. The id is resolved against the current document on every layout,
/// so edits made while the detail view is open show up immediately.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviewNav {
    active_service: Option<LinkId>,
}

/// User interaction inside the preview
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewAction {
    /// A link card was clicked
    Activate(LinkId),
    /// The detail view's call to action was clicked
    Checkout,
    /// The detail view's back control was clicked
    Back,
}

impl PreviewNav {
    pub fn active_service(&self) -> Option<&LinkId> {
        self.active_service.as_ref()
    }

    /// The service shown in detail, if it still is an active service
    pub fn resolve<'a>(&self, doc: &'a PageDocument) -> Option<&'a LinkEntry> {
        let id = self.active_service.as_ref()?;
        doc.link(id)
            .filter(|link| link.is_active && link.kind == LinkKind::Service)
    }

    /// Drop back to Home once the open service stops being an active service
    ///
    /// Must run after every document change so that Home always means no
    /// active service and only [`PreviewAction::Activate`] opens a detail view.
    pub fn reconcile(&mut self, doc: &PageDocument) {
        if self.active_service().is_some() && self.resolve(doc).is_none() {
            tracing::debug!("Open service is gone, returning to home");
            self.active_service = None;
        }
    }

    /// Apply an action; returns a URL to open externally, if any
    pub fn dispatch(&mut self, doc: &PageDocument, action: PreviewAction) -> Option<String> {
        match action {
            PreviewAction::Activate(id) => {
                let link = doc.link(&id).filter(|link| link.is_active)?;
                match link.kind {
                    LinkKind::Direct => Some(link.destination_url.clone()),
                    LinkKind::Service => {
                        tracing::debug!("Opening service {}", id);
                        self.active_service = Some(id);
                        None
                    }
                }
            }
            PreviewAction::Checkout => self.resolve(doc).map(|link| link.destination_url.clone()),
            PreviewAction::Back => {
                self.active_service = None;
                None
            }
        }
    }
}

/// Page-wide styling shared by both views
#[derive(Debug, Clone, PartialEq)]
pub struct PageStyle {
    pub background: MediaRef,
    pub overlay: OverlayOpacity,
    pub font_family: FontChoice,
    pub font_size: FontSize,
    pub link_font_size: FontSize,
}

impl PageStyle {
    /// Body text size in points
    pub fn body_points(&self) -> f32 {
        match self.font_size {
            FontSize::Small => 14.0,
            FontSize::Medium => 16.0,
            FontSize::Large => 18.0,
        }
    }

    /// Link card label size in points
    pub fn card_points(&self) -> f32 {
        match self.link_font_size {
            FontSize::Small => 16.0,
            FontSize::Medium => 18.0,
            FontSize::Large => 20.0,
        }
    }
}

/// One button in the home view
#[derive(Debug, Clone, PartialEq)]
pub struct CardView {
    pub id: LinkId,
    pub title: String,
    pub kind: LinkKind,
    /// Shown on hover for direct links
    pub url: String,
}

/// Profile header plus the active links
#[derive(Debug, Clone, PartialEq)]
pub struct HomeView {
    pub avatar: MediaRef,
    pub name: String,
    pub bio: String,
    pub cards: Vec<CardView>,
}

/// Detail page of a service link
#[derive(Debug, Clone, PartialEq)]
pub struct DetailView {
    pub title: String,
    pub description: String,
    pub button_label: String,
    pub checkout_url: String,
}

/// Everything the preview paints
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewView {
    pub style: PageStyle,
    /// Always laid out; the detail view slides over it
    pub home: HomeView,
    pub detail: Option<DetailView>,
}

fn non_empty(text: Option<&str>) -> Option<&str> {
    text.filter(|t| !t.is_empty())
}

impl PreviewView {
    pub fn layout(doc: &PageDocument, nav: &PreviewNav) -> Self {
        let profile = &doc.profile;

        let style = PageStyle {
            background: profile.background_image.clone(),
            overlay: profile.overlay_opacity,
            font_family: profile.font_family,
            font_size: profile.font_size,
            link_font_size: profile.link_font_size,
        };

        let cards = doc
            .active_links()
            .map(|link| CardView {
                id: link.id.clone(),
                title: link.title.clone(),
                kind: link.kind,
                url: link.destination_url.clone(),
            })
            .collect();

        let home = HomeView {
            avatar: profile.avatar_image.clone(),
            name: profile.name.clone(),
            bio: profile.bio.clone(),
            cards,
        };

        let detail = nav.resolve(doc).map(|link| {
            let details = link.service_details();
            let description = details.and_then(|d| non_empty(d.description));
            let button_text = details.and_then(|d| non_empty(d.button_text));
            DetailView {
                title: link.title.clone(),
                description: description.unwrap_or(FALLBACK_DESCRIPTION).to_string(),
                button_label: button_text.unwrap_or(FALLBACK_BUTTON_TEXT).to_string(),
                checkout_url: link.destination_url.clone(),
            }
        });

        Self { style, home, detail }
    }

    pub fn is_detail(&self) -> bool {
        self.detail.is_some()
    }
}
