//! Localized labels and the presentation model for the placeholder popover.
//!
//! The view model is plain data. Hosts map it onto whatever widgets they use
//! (a status row with a delete affordance, an upload/link tab selector, a file
//! button and a link form).

use std::borrow::Cow;

use crate::controller::{ControllerState, Mode};
use crate::types::is_absolute_url;

/// Translation lookup. Missing keys resolve to a fallback, never an error.
pub trait Localizer {
    fn t<'a>(&'a self, key: &'a str) -> Cow<'a, str>;
}

/// Every label the placeholder uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelKey {
    Title,
    Uploading,
    UploadTab,
    LinkTab,
    LinkPlaceholder,
    Apply,
}

impl LabelKey {
    pub const ALL: [LabelKey; 6] = [
        LabelKey::Title,
        LabelKey::Uploading,
        LabelKey::UploadTab,
        LabelKey::LinkTab,
        LabelKey::LinkPlaceholder,
        LabelKey::Apply,
    ];

    pub fn key(self) -> &'static str {
        match self {
            LabelKey::Title => "editor.video.dialog.title",
            LabelKey::Uploading => "editor.video.dialog.uploading",
            LabelKey::UploadTab => "editor.video.dialog.tab.upload",
            LabelKey::LinkTab => "editor.video.dialog.link",
            LabelKey::LinkPlaceholder => "editor.video.dialog.placeholder",
            LabelKey::Apply => "editor.video.dialog.button.apply",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.key() == key)
    }

    fn english(self) -> &'static str {
        match self {
            LabelKey::Title => "Add a video",
            LabelKey::Uploading => "Uploading",
            LabelKey::UploadTab => "Upload",
            LabelKey::LinkTab => "Embed link",
            LabelKey::LinkPlaceholder => "Paste the video link...",
            LabelKey::Apply => "Apply",
        }
    }
}

/// Built-in English catalog. Unknown keys come back unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishLabels;

impl Localizer for EnglishLabels {
    fn t<'a>(&'a self, key: &'a str) -> Cow<'a, str> {
        match LabelKey::from_key(key) {
            Some(label) => Cow::Borrowed(label.english()),
            None => Cow::Borrowed(key),
        }
    }
}

fn label<L: Localizer + ?Sized>(localizer: &L, key: LabelKey) -> String {
    localizer.t(key.key()).into_owned()
}

/// Popover tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Upload,
    Link,
}

/// The row shown in place of the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusRow {
    /// Spinner plus "Uploading...".
    Uploading { label: String },
    /// Video icon, title and a delete affordance.
    Idle { title: String, deletable: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabView {
    pub tab: Tab,
    pub label: String,
    pub selected: bool,
}

/// Everything the host needs to draw the placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderView {
    pub status: StatusRow,
    pub tabs: Vec<TabView>,
    pub upload_button: String,
    pub link_value: String,
    pub link_placeholder: String,
    pub apply_button: String,
    /// Whether the apply button is enabled (the link is an absolute URL).
    pub link_submittable: bool,
}

impl PlaceholderView {
    pub fn from_state<L: Localizer + ?Sized>(state: &ControllerState, localizer: &L) -> Self {
        Self::with_tab(state, localizer, Tab::default())
    }

    pub fn with_tab<L: Localizer + ?Sized>(
        state: &ControllerState,
        localizer: &L,
        selected: Tab,
    ) -> Self {
        let status = match state.mode {
            Mode::Uploading { .. } => StatusRow::Uploading {
                label: format!("{}...", label(localizer, LabelKey::Uploading)),
            },
            Mode::AwaitingInput => StatusRow::Idle {
                title: label(localizer, LabelKey::Title),
                deletable: true,
            },
        };
        let tabs = [(Tab::Upload, LabelKey::UploadTab), (Tab::Link, LabelKey::LinkTab)]
            .into_iter()
            .map(|(tab, key)| TabView {
                tab,
                label: label(localizer, key),
                selected: tab == selected,
            })
            .collect();

        Self {
            status,
            tabs,
            upload_button: label(localizer, LabelKey::UploadTab),
            link_value: state.link_text.clone(),
            link_placeholder: label(localizer, LabelKey::LinkPlaceholder),
            apply_button: label(localizer, LabelKey::Apply),
            link_submittable: is_absolute_url(&state.link_text),
        }
    }

    pub fn is_uploading(&self) -> bool {
        matches!(self.status, StatusRow::Uploading { .. })
    }

    pub fn selected_tab(&self) -> Option<Tab> {
        self.tabs.iter().find(|t| t.selected).map(|t| t.tab)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    struct Catalog(HashMap<&'static str, &'static str>);

    impl Localizer for Catalog {
        fn t<'a>(&'a self, key: &'a str) -> Cow<'a, str> {
            Cow::Borrowed(self.0.get(key).copied().unwrap_or(key))
        }
    }

    #[test]
    fn test_keys_round_trip() {
        for key in LabelKey::ALL {
            assert_eq!(LabelKey::from_key(key.key()), Some(key));
        }
        assert_eq!(LabelKey::from_key("editor.image.dialog.title"), None);
    }

    #[test]
    fn test_unknown_key_falls_back_to_key() {
        assert_eq!(EnglishLabels.t("editor.unknown"), "editor.unknown");
    }

    #[test]
    fn test_idle_view() {
        let state = ControllerState {
            mode: Mode::AwaitingInput,
            link_text: "https://exa".into(),
        };
        let view = PlaceholderView::from_state(&state, &EnglishLabels);

        assert_eq!(
            view.status,
            StatusRow::Idle {
                title: "Add a video".into(),
                deletable: true,
            }
        );
        assert_eq!(view.selected_tab(), Some(Tab::Upload));
        assert_eq!(view.link_value, "https://exa");
        assert!(view.link_submittable);
        let labels: Vec<_> = view.tabs.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, ["Upload", "Embed link"]);
    }

    #[test]
    fn test_uploading_view() {
        let state = ControllerState {
            mode: Mode::Uploading { in_flight: 1 },
            link_text: String::new(),
        };
        let view = PlaceholderView::with_tab(&state, &EnglishLabels, Tab::Link);

        assert!(view.is_uploading());
        assert_eq!(
            view.status,
            StatusRow::Uploading {
                label: "Uploading...".into()
            }
        );
        assert_eq!(view.selected_tab(), Some(Tab::Link));
        assert!(!view.link_submittable);
    }

    #[test]
    fn test_custom_catalog() {
        let catalog = Catalog(HashMap::from([
            ("editor.video.dialog.title", "Vidéo"),
            ("editor.video.dialog.button.apply", "Appliquer"),
        ]));
        let view = PlaceholderView::from_state(&ControllerState::default(), &catalog);

        assert_eq!(view.apply_button, "Appliquer");
        assert_eq!(view.link_placeholder, "editor.video.dialog.placeholder");
        assert!(matches!(view.status, StatusRow::Idle { ref title, .. } if title == "Vidéo"));
    }
}
