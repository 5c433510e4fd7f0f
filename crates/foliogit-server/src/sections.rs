//! Allow-listed content sections and media folders
//!
//! The single source of truth for which named collections and folders the
//! admin surface will touch. Every validating endpoint consumes these
//! enums; nothing else in the crate carries its own list of valid names.

use serde::Serialize;

/// A named content collection, serialized as one JSON document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Section {
    Works,
    Artworks,
    Photographs,
    WorksHome,
    ArtworksHome,
    PhotographsHome,
    ShortsHome,
}

impl Section {
    /// All valid sections
    pub const ALL: [Section; 7] = [
        Section::Works,
        Section::Artworks,
        Section::Photographs,
        Section::WorksHome,
        Section::ArtworksHome,
        Section::PhotographsHome,
        Section::ShortsHome,
    ];

    /// Parse a request parameter against the allow-list
    pub fn from_param(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.as_str() == value)
    }

    /// The request-parameter spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Works => "works",
            Section::Artworks => "artworks",
            Section::Photographs => "photographs",
            Section::WorksHome => "works-home",
            Section::ArtworksHome => "artworks-home",
            Section::PhotographsHome => "photographs-home",
            Section::ShortsHome => "shorts-home",
        }
    }

    /// Deterministic repository path of this section's JSON document
    ///
    /// Home sections are stored with an underscore: `works-home` lives at
    /// `public/content/works_home.json`.
    pub fn content_path(&self) -> String {
        format!("public/content/{}.json", self.as_str().replace('-', "_"))
    }
}

/// A named media folder under `public/`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaFolder {
    Works,
    Artworks,
    Photographs,
    Images,
    Logos,
}

impl MediaFolder {
    /// All valid folders
    pub const ALL: [MediaFolder; 5] = [
        MediaFolder::Works,
        MediaFolder::Artworks,
        MediaFolder::Photographs,
        MediaFolder::Images,
        MediaFolder::Logos,
    ];

    /// Parse a request parameter against the allow-list
    pub fn from_param(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.as_str() == value)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaFolder::Works => "works",
            MediaFolder::Artworks => "artworks",
            MediaFolder::Photographs => "photographs",
            MediaFolder::Images => "images",
            MediaFolder::Logos => "logos",
        }
    }

    /// Repository prefix this folder's assets live under
    pub fn prefix(&self) -> String {
        format!("public/{}", self.as_str())
    }

    /// Repository path of one asset in this folder
    pub fn asset_path(&self, file_name: &str) -> String {
        format!("public/{}/{}", self.as_str(), file_name)
    }

    /// Browser-facing path of one asset
    pub fn public_path(&self, file_name: &str) -> String {
        format!("/{}/{}", self.as_str(), file_name)
    }
}

/// Reject file names that could escape their folder
pub fn valid_file_name(name: &str) -> bool {
    !name.is_empty() && !name.contains("..") && !name.contains('/') && !name.contains('\\')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_allow_list_round_trips() {
        for section in Section::ALL {
            assert_eq!(Section::from_param(section.as_str()), Some(section));
        }
        assert_eq!(Section::from_param("secrets"), None);
        assert_eq!(Section::from_param(""), None);
    }

    #[test]
    fn content_paths_use_underscores_for_home_sections() {
        assert_eq!(Section::Works.content_path(), "public/content/works.json");
        assert_eq!(
            Section::WorksHome.content_path(),
            "public/content/works_home.json"
        );
        assert_eq!(
            Section::ShortsHome.content_path(),
            "public/content/shorts_home.json"
        );
    }

    #[test]
    fn folder_allow_list_round_trips() {
        for folder in MediaFolder::ALL {
            assert_eq!(MediaFolder::from_param(folder.as_str()), Some(folder));
        }
        assert_eq!(MediaFolder::from_param("uploads"), None);
    }

    #[test]
    fn folder_paths() {
        assert_eq!(MediaFolder::Images.prefix(), "public/images");
        assert_eq!(
            MediaFolder::Logos.asset_path("mark.svg"),
            "public/logos/mark.svg"
        );
        assert_eq!(MediaFolder::Logos.public_path("mark.svg"), "/logos/mark.svg");
    }

    #[test]
    fn traversal_file_names_rejected() {
        assert!(valid_file_name("poster.jpg"));
        assert!(valid_file_name("still 01.png"));
        assert!(!valid_file_name(""));
        assert!(!valid_file_name("../escape.jpg"));
        assert!(!valid_file_name("a/b.jpg"));
        assert!(!valid_file_name("a\\b.jpg"));
        assert!(!valid_file_name(".."));
    }
}
