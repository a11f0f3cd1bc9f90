//! Page document model: the profile and the ordered links a page shows
//!
//! A [`PageDocument`] is treated as an immutable value per revision. Every
//! edit goes through one of the `replace_*`/`with_*` operations, which return
//! a new document and leave the input untouched, so the container can decide
//! whether to re-render by comparing values.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

/// Errors raised when building document values from untrusted input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error("Overlay opacity {0} is outside 0..={max}", max = OverlayOpacity::MAX)]
    OpacityOutOfRange(i64),
}

/// Reference to an image or audio source: a URL, a path, or an embedded `data:` URL
///
/// Embedded media can be megabytes long, so the text is shared behind an
/// `Arc` and cloning a document never copies it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaRef(Arc<str>);

impl MediaRef {
    pub fn new(reference: impl Into<Arc<str>>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the media is carried inline as a `data:` URL
    pub fn is_embedded(&self) -> bool {
        self.0.starts_with("data:")
    }
}

impl From<&str> for MediaRef {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for MediaRef {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Darkening overlay drawn over the background image, in percent
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OverlayOpacity(u8);

impl OverlayOpacity {
    pub const MAX: u8 = 90;

    /// Accept a value only if it is within `0..=MAX`
    pub fn new(value: i64) -> Result<Self, DocumentError> {
        if (0..=i64::from(Self::MAX)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(DocumentError::OpacityOutOfRange(value))
        }
    }

    /// Clamp any integer into `0..=MAX`
    pub fn clamped(value: i64) -> Self {
        Self(value.clamp(0, i64::from(Self::MAX)) as u8)
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Overlay alpha in `0.0..=0.9`
    pub fn alpha(self) -> f32 {
        f32::from(self.0) / 100.0
    }
}

impl Default for OverlayOpacity {
    fn default() -> Self {
        Self(40)
    }
}

/// Fonts offered for the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontChoice {
    #[default]
    Inter,
    Montserrat,
    PlayfairDisplay,
    Lato,
    Oswald,
}

impl FontChoice {
    pub const ALL: [FontChoice; 5] = [
        FontChoice::Inter,
        FontChoice::Montserrat,
        FontChoice::PlayfairDisplay,
        FontChoice::Lato,
        FontChoice::Oswald,
    ];

    /// Family name used when registering and selecting the font
    pub fn family_name(self) -> &'static str {
        match self {
            FontChoice::Inter => "Inter",
            FontChoice::Montserrat => "Montserrat",
            FontChoice::PlayfairDisplay => "Playfair Display",
            FontChoice::Lato => "Lato",
            FontChoice::Oswald => "Oswald",
        }
    }

    /// Label shown in the font selector
    pub fn label(self) -> &'static str {
        match self {
            FontChoice::Inter => "Inter (Modern)",
            FontChoice::Montserrat => "Montserrat (Geometric)",
            FontChoice::PlayfairDisplay => "Playfair (Elegant)",
            FontChoice::Lato => "Lato (Clean)",
            FontChoice::Oswald => "Oswald (Bold)",
        }
    }
}

/// Relative text size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl FontSize {
    pub const ALL: [FontSize; 3] = [FontSize::Small, FontSize::Medium, FontSize::Large];

    pub fn label(self) -> &'static str {
        match self {
            FontSize::Small => "Small",
            FontSize::Medium => "Medium",
            FontSize::Large => "Large",
        }
    }
}

/// Profile shown at the top of the page
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub name: String,
    pub bio: String,
    pub avatar_image: MediaRef,
    pub background_image: MediaRef,
    /// Looping background sound; `None` plays nothing
    pub background_audio: Option<MediaRef>,
    pub overlay_opacity: OverlayOpacity,
    pub font_family: FontChoice,
    /// Size of the header and body text
    pub font_size: FontSize,
    /// Size of the link button labels
    pub link_font_size: FontSize,
}

/// Stable identifier of a link entry
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LinkId(Arc<str>);

impl LinkId {
    /// Fresh identifier for an entry created during the session
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string().into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for LinkId {
    fn from(value: &str) -> Self {
        Self(value.into())
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a link behaves when activated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LinkKind {
    /// Opens `destination_url` directly
    #[default]
    Direct,
    /// Opens an in-page detail view whose call to action opens `destination_url`
    Service,
}

/// Borrowed service fields of a [`LinkKind::Service`] entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceDetails<'a> {
    pub description: Option<&'a str>,
    pub button_text: Option<&'a str>,
}

/// One button on the page
#[derive(Debug, Clone, PartialEq)]
pub struct LinkEntry {
    pub id: LinkId,
    pub title: String,
    pub destination_url: String,
    /// Inactive entries are not rendered at all
    pub is_active: bool,
    pub kind: LinkKind,
    /// Kept across kind changes, only used while `kind` is `Service`
    pub description: Option<String>,
    /// Kept across kind changes, only used while `kind` is `Service`
    pub button_text: Option<String>,
}

impl LinkEntry {
    /// Create an active direct link
    pub fn direct(id: LinkId, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            destination_url: url.into(),
            is_active: true,
            kind: LinkKind::Direct,
            description: None,
            button_text: None,
        }
    }

    /// Create an active service link
    pub fn service(
        id: LinkId,
        title: impl Into<String>,
        checkout_url: impl Into<String>,
        description: impl Into<String>,
        button_text: impl Into<String>,
    ) -> Self {
        Self {
            kind: LinkKind::Service,
            description: Some(description.into()),
            button_text: Some(button_text.into()),
            ..Self::direct(id, title, checkout_url)
        }
    }

    /// Service fields, only for entries that currently are services
    pub fn service_details(&self) -> Option<ServiceDetails<'_>> {
        match self.kind {
            LinkKind::Service => Some(ServiceDetails {
                description: self.description.as_deref(),
                button_text: self.button_text.as_deref(),
            }),
            LinkKind::Direct => None,
        }
    }
}

/// A single profile field replacement, carrying a value of the field's type
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileEdit {
    Name(String),
    Bio(String),
    AvatarImage(MediaRef),
    BackgroundImage(MediaRef),
    BackgroundAudio(Option<MediaRef>),
    OverlayOpacity(OverlayOpacity),
    FontFamily(FontChoice),
    FontSize(FontSize),
    LinkFontSize(FontSize),
}

impl ProfileEdit {
    fn apply(self, profile: &mut Profile) {
        match self {
            ProfileEdit::Name(v) => profile.name = v,
            ProfileEdit::Bio(v) => profile.bio = v,
            ProfileEdit::AvatarImage(v) => profile.avatar_image = v,
            ProfileEdit::BackgroundImage(v) => profile.background_image = v,
            ProfileEdit::BackgroundAudio(v) => profile.background_audio = v,
            ProfileEdit::OverlayOpacity(v) => profile.overlay_opacity = v,
            ProfileEdit::FontFamily(v) => profile.font_family = v,
            ProfileEdit::FontSize(v) => profile.font_size = v,
            ProfileEdit::LinkFontSize(v) => profile.link_font_size = v,
        }
    }
}

/// A single link field replacement
#[derive(Debug, Clone, PartialEq)]
pub enum LinkEdit {
    Title(String),
    DestinationUrl(String),
    IsActive(bool),
    Kind(LinkKind),
    Description(String),
    ButtonText(String),
}

impl LinkEdit {
    fn apply(self, link: &mut LinkEntry) {
        match self {
            LinkEdit::Title(v) => link.title = v,
            LinkEdit::DestinationUrl(v) => link.destination_url = v,
            LinkEdit::IsActive(v) => link.is_active = v,
            LinkEdit::Kind(v) => link.kind = v,
            LinkEdit::Description(v) => link.description = Some(v),
            LinkEdit::ButtonText(v) => link.button_text = Some(v),
        }
    }
}

/// Direction for reordering a link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

/// The whole editable page: profile plus links in display order
#[derive(Debug, Clone, PartialEq)]
pub struct PageDocument {
    pub profile: Profile,
    pub links: Vec<LinkEntry>,
}

impl PageDocument {
    /// New document with one profile field replaced
    ///
    /// No validation happens here; values are well-typed by construction.
    pub fn replace_profile_field(&self, edit: ProfileEdit) -> Self {
        let mut next = self.clone();
        edit.apply(&mut next.profile);
        next
    }

    /// New document with one field of the link `id` replaced
    ///
    /// An unknown `id` yields an unchanged copy.
    pub fn replace_link_field(&self, id: &LinkId, edit: LinkEdit) -> Self {
        let mut next = self.clone();
        match next.links.iter_mut().find(|link| &link.id == id) {
            Some(link) => edit.apply(link),
            None => tracing::debug!("Ignoring edit for unknown link {}", id),
        }
        next
    }

    /// New document with a fresh active link appended
    pub fn with_link_added(&self, kind: LinkKind) -> (Self, LinkId) {
        let id = LinkId::generate();
        let mut link = LinkEntry::direct(id.clone(), "New link", "https://");
        link.kind = kind;

        let mut next = self.clone();
        next.links.push(link);
        (next, id)
    }

    /// New document without the link `id`; unknown ids are ignored
    pub fn with_link_removed(&self, id: &LinkId) -> Self {
        let mut next = self.clone();
        next.links.retain(|link| &link.id != id);
        next
    }

    /// New document with the link `id` swapped with its neighbour
    pub fn with_link_moved(&self, id: &LinkId, direction: MoveDirection) -> Self {
        let mut next = self.clone();
        let Some(index) = next.links.iter().position(|link| &link.id == id) else {
            return next;
        };
        let target = match direction {
            MoveDirection::Up => index.checked_sub(1),
            MoveDirection::Down => Some(index + 1).filter(|&i| i < next.links.len()),
        };
        if let Some(target) = target {
            next.links.swap(index, target);
        }
        next
    }

    /// Look up a link by id
    pub fn link(&self, id: &LinkId) -> Option<&LinkEntry> {
        self.links.iter().find(|link| &link.id == id)
    }

    /// Links that are rendered, in display order
    pub fn active_links(&self) -> impl Iterator<Item = &LinkEntry> {
        self.links.iter().filter(|link| link.is_active)
    }
}

impl Default for PageDocument {
    /// The demo page every session starts from
    fn default() -> Self {
        Self {
            profile: Profile {
                name: "@AlexCreador".to_string(),
                bio: "🎨 Artista Digital & Creador de Contenido. ¡Accede a mis recursos exclusivos aquí abajo!"
                    .to_string(),
                avatar_image: "https://picsum.photos/id/64/200/200".into(),
                background_image: "https://picsum.photos/id/193/800/1200".into(),
                background_audio: None,
                overlay_opacity: OverlayOpacity::default(),
                font_family: FontChoice::Inter,
                font_size: FontSize::Medium,
                link_font_size: FontSize::Medium,
            },
            links: vec![
                LinkEntry::direct("1".into(), "🛒 Comprar Pack de Presets", "https://stripe.com"),
                LinkEntry::service(
                    "2".into(),
                    "🎟️ Curso Exclusivo (Oferta)",
                    "https://youtube.com",
                    "Aprende a editar fotos como un profesional en este curso intensivo de 4 horas. \
                     Incluye material descargable, acceso a la comunidad privada y certificado de \
                     finalización. \n\n¡Precio especial por tiempo limitado!",
                    "Inscribirme por $29",
                ),
                LinkEntry::service(
                    "3".into(),
                    "☕ Asesoría 1:1",
                    "https://calendly.com",
                    "Reserva una sesión privada de 45 minutos conmigo. Revisaremos tu portafolio, \
                     te daré feedback personalizado y trazaremos un plan de acción para tu \
                     crecimiento en redes sociales.",
                    "Reservar Asesoría",
                ),
                LinkEntry::service(
                    "4".into(),
                    "🛍️ Mis Productos",
                    "https://shopify.com",
                    "Explora mi colección de merchandise oficial y productos digitales.\n\n\
                     • Camisetas de edición limitada\n• Ebooks de fotografía\n\
                     • Stickers y accesorios\n\nEnvíos a todo el mundo 🌍",
                    "Ver Tienda y Pagar",
                ),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn ids(doc: &PageDocument) -> Vec<LinkId> {
        doc.links.iter().map(|l| l.id.clone()).collect()
    }

    #[test]
    fn test_replace_profile_field_changes_only_that_field() {
        let doc = PageDocument::default();
        let next = doc.replace_profile_field(ProfileEdit::Name("@someone".to_string()));

        assert_eq!(next.profile.name, "@someone");
        assert_eq!(next.profile.bio, doc.profile.bio);
        assert_eq!(next.profile.font_size, doc.profile.font_size);
        assert_eq!(next.links, doc.links);
        // input untouched
        assert_eq!(doc.profile.name, "@AlexCreador");
    }

    #[test]
    fn test_every_profile_edit_lands_in_its_field() {
        let doc = PageDocument::default();
        let audio = MediaRef::from("https://example.com/song.mp3");

        let next = doc
            .replace_profile_field(ProfileEdit::Bio("bio".to_string()))
            .replace_profile_field(ProfileEdit::AvatarImage("a.png".into()))
            .replace_profile_field(ProfileEdit::BackgroundImage("b.png".into()))
            .replace_profile_field(ProfileEdit::BackgroundAudio(Some(audio.clone())))
            .replace_profile_field(ProfileEdit::OverlayOpacity(OverlayOpacity::clamped(75)))
            .replace_profile_field(ProfileEdit::FontFamily(FontChoice::Oswald))
            .replace_profile_field(ProfileEdit::LinkFontSize(FontSize::Large));

        assert_eq!(next.profile.bio, "bio");
        assert_eq!(next.profile.avatar_image.as_str(), "a.png");
        assert_eq!(next.profile.background_image.as_str(), "b.png");
        assert_eq!(next.profile.background_audio, Some(audio));
        assert_eq!(next.profile.overlay_opacity.get(), 75);
        assert_eq!(next.profile.font_family, FontChoice::Oswald);
        assert_eq!(next.profile.link_font_size, FontSize::Large);
        assert_eq!(next.profile.font_size, FontSize::Medium);
        assert_eq!(next.profile.name, doc.profile.name);
    }

    #[test]
    fn test_font_sizes_are_independent() {
        let doc = PageDocument::default();
        let next = doc.replace_profile_field(ProfileEdit::FontSize(FontSize::Small));
        assert_eq!(next.profile.font_size, FontSize::Small);
        assert_eq!(next.profile.link_font_size, FontSize::Medium);

        let next = next.replace_profile_field(ProfileEdit::LinkFontSize(FontSize::Large));
        assert_eq!(next.profile.font_size, FontSize::Small);
        assert_eq!(next.profile.link_font_size, FontSize::Large);
    }

    #[test]
    fn test_replace_link_field_keeps_order_and_other_entries() {
        let doc = PageDocument::default();
        for entry in &doc.links {
            let next = doc.replace_link_field(&entry.id, LinkEdit::Title("X".to_string()));

            assert_eq!(ids(&next), ids(&doc));
            for (before, after) in doc.links.iter().zip(&next.links) {
                if before.id == entry.id {
                    assert_eq!(after.title, "X");
                    assert_eq!(after.destination_url, before.destination_url);
                    assert_eq!(after.kind, before.kind);
                } else {
                    assert_eq!(after, before);
                }
            }
        }
    }

    #[test]
    fn test_replace_link_field_unknown_id_is_noop() {
        let doc = PageDocument::default();
        let next = doc.replace_link_field(&"nonexistent-id".into(), LinkEdit::Title("X".to_string()));
        assert_eq!(next, doc);
    }

    #[test]
    fn test_kind_round_trip_preserves_service_fields() {
        let doc = PageDocument::default();
        let id = LinkId::from("2");
        let original = doc.link(&id).unwrap().clone();

        let direct = doc.replace_link_field(&id, LinkEdit::Kind(LinkKind::Direct));
        assert!(direct.link(&id).unwrap().service_details().is_none());

        let service = direct.replace_link_field(&id, LinkEdit::Kind(LinkKind::Service));
        let restored = service.link(&id).unwrap();
        assert_eq!(restored.description, original.description);
        assert_eq!(restored.button_text, original.button_text);
        assert_eq!(restored, &original);
    }

    #[test]
    fn test_overlay_opacity_bounds() {
        assert!(OverlayOpacity::new(0).is_ok());
        assert_eq!(OverlayOpacity::new(90).map(OverlayOpacity::get), Ok(90));
        assert_eq!(OverlayOpacity::new(91), Err(DocumentError::OpacityOutOfRange(91)));
        assert_eq!(OverlayOpacity::new(-1), Err(DocumentError::OpacityOutOfRange(-1)));
        assert_eq!(OverlayOpacity::clamped(250).get(), 90);
        assert_eq!(OverlayOpacity::clamped(-20).get(), 0);
        assert!((OverlayOpacity::clamped(40).alpha() - 0.4).abs() < f32::EPSILON);
    }

    #[test]
    fn test_structural_edits_keep_ids_unique() {
        let doc = PageDocument::default();
        let (added, new_id) = doc.with_link_added(LinkKind::Service);
        let (added, other_id) = added.with_link_added(LinkKind::Direct);

        assert_ne!(new_id, other_id);
        assert_eq!(added.links.len(), doc.links.len() + 2);
        let unique: HashSet<_> = ids(&added).into_iter().collect();
        assert_eq!(unique.len(), added.links.len());
        assert_eq!(added.link(&new_id).unwrap().kind, LinkKind::Service);
        assert_eq!(&added.links[..doc.links.len()], &doc.links[..]);

        let removed = added.with_link_removed(&new_id);
        assert!(removed.link(&new_id).is_none());
        assert_eq!(removed.links.len(), doc.links.len() + 1);
        assert_eq!(removed.with_link_removed(&"missing".into()), removed);
    }

    #[test]
    fn test_move_link() {
        let doc = PageDocument::default();
        let moved = doc.with_link_moved(&"2".into(), MoveDirection::Up);
        assert_eq!(ids(&moved), ["2", "1", "3", "4"].map(LinkId::from).to_vec());

        assert_eq!(doc.with_link_moved(&"1".into(), MoveDirection::Up), doc);
        assert_eq!(doc.with_link_moved(&"4".into(), MoveDirection::Down), doc);
        assert_eq!(doc.with_link_moved(&"missing".into(), MoveDirection::Down), doc);

        let moved = doc.with_link_moved(&"3".into(), MoveDirection::Down);
        assert_eq!(ids(&moved), ["1", "2", "4", "3"].map(LinkId::from).to_vec());
    }

    #[test]
    fn test_active_links_skips_inactive() {
        let doc = PageDocument::default().replace_link_field(&"3".into(), LinkEdit::IsActive(false));
        let active: Vec<_> = doc.active_links().map(|l| l.id.as_str().to_string()).collect();
        assert_eq!(active, vec!["1", "2", "4"]);
    }

    #[test]
    fn test_media_ref_embedded() {
        assert!(MediaRef::from("data:image/png;base64,AAAA").is_embedded());
        assert!(!MediaRef::from("https://picsum.photos/1").is_embedded());
    }
}
