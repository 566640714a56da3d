//! Voice avatar listing and filtering.
//!
//! The avatar catalog is fetched in one call and filtered client-side.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::http::HttpClient;

/// Avatar catalog service.
pub struct AvatarService {
    http: Arc<HttpClient>,
}

impl AvatarService {
    pub(crate) fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    /// Fetches the full avatar catalog.
    pub async fn list(&self) -> Result<Vec<Avatar>> {
        let response: AvatarListResponse =
            self.http.request::<(), _>("GET", "/avatars", None).await?;
        Ok(response.avatars)
    }

    /// Fetches the catalog and applies a filter client-side.
    pub async fn list_filtered(&self, filter: &AvatarFilter) -> Result<Vec<Avatar>> {
        let avatars = self.list().await?;
        Ok(avatars
            .into_iter()
            .filter(|avatar| filter.matches(avatar))
            .collect())
    }

    /// Returns the set of characteristics across the catalog, usable
    /// as filter values.
    pub async fn characteristics(&self) -> Result<BTreeSet<String>> {
        let avatars = self.list().await?;
        Ok(avatars
            .into_iter()
            .flat_map(|avatar| avatar.characteristics)
            .collect())
    }

    /// Returns every filter criterion with its observed options.
    pub async fn criteria(&self) -> Result<Vec<AvatarCriterion>> {
        let avatars = self.list().await?;

        fn collect(avatars: &[Avatar], get: impl Fn(&Avatar) -> Option<&str>) -> Vec<String> {
            let set: BTreeSet<&str> = avatars.iter().filter_map(get).collect();
            set.into_iter().map(str::to_string).collect()
        }

        let characteristics: BTreeSet<&str> = avatars
            .iter()
            .flat_map(|a| a.characteristics.iter().map(String::as_str))
            .collect();

        Ok(vec![
            AvatarCriterion {
                name: "characteristic".to_string(),
                options: characteristics.into_iter().map(str::to_string).collect(),
            },
            AvatarCriterion {
                name: "gender".to_string(),
                options: collect(&avatars, |a| a.gender.as_deref()),
            },
            AvatarCriterion {
                name: "style".to_string(),
                options: collect(&avatars, |a| a.style.as_deref()),
            },
            AvatarCriterion {
                name: "accent_type".to_string(),
                options: collect(&avatars, |a| a.accent_type.as_deref()),
            },
            AvatarCriterion {
                name: "language".to_string(),
                options: collect(&avatars, |a| a.language.as_deref()),
            },
            AvatarCriterion {
                name: "language_variant".to_string(),
                options: collect(&avatars, |a| a.language_variant.as_deref()),
            },
            AvatarCriterion {
                name: "locale".to_string(),
                options: collect(&avatars, |a| a.locale.as_deref()),
            },
        ])
    }
}

// ==================== Types ====================

/// A voice avatar in the provider catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Avatar {
    /// Display name.
    pub name: String,
    /// Speaker ID used in synthesis requests.
    pub id: i64,
    /// Speaking style (e.g. narration, promotional).
    #[serde(default)]
    pub style: Option<String>,
    /// Voice gender.
    #[serde(default)]
    pub gender: Option<String>,
    /// Accent of the voice.
    #[serde(default)]
    pub accent_type: Option<String>,
    /// Descriptive characteristics.
    #[serde(default)]
    pub characteristics: Vec<String>,
    /// Additional tags.
    #[serde(default, rename = "otherTags")]
    pub other_tags: Vec<String>,
    /// Preview audio URL.
    #[serde(default)]
    pub preview_audio: Option<String>,
    /// Locale code (e.g. en_US).
    #[serde(default)]
    pub locale: Option<String>,
    /// Language name.
    #[serde(default)]
    pub language: Option<String>,
    /// Language variant (e.g. British).
    #[serde(default)]
    pub language_variant: Option<String>,
    /// Catalog source.
    #[serde(default)]
    pub source: Option<String>,
}

/// Client-side avatar filter; empty fields match everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AvatarFilter {
    #[serde(default)]
    pub gender: Option<String>,
    /// Matches avatars carrying any of these characteristics.
    #[serde(default)]
    pub characteristics: Vec<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub language_variant: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub accent_type: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
}

impl AvatarFilter {
    /// Returns true if the avatar passes every set criterion.
    pub fn matches(&self, avatar: &Avatar) -> bool {
        fn field_matches(wanted: &Option<String>, actual: &Option<String>) -> bool {
            match wanted {
                Some(wanted) if !wanted.is_empty() => actual.as_deref() == Some(wanted.as_str()),
                _ => true,
            }
        }

        if !field_matches(&self.gender, &avatar.gender)
            || !field_matches(&self.language, &avatar.language)
            || !field_matches(&self.language_variant, &avatar.language_variant)
            || !field_matches(&self.style, &avatar.style)
            || !field_matches(&self.accent_type, &avatar.accent_type)
            || !field_matches(&self.locale, &avatar.locale)
        {
            return false;
        }

        if !self.characteristics.is_empty() {
            let have: Vec<String> = avatar
                .characteristics
                .iter()
                .map(|c| c.to_lowercase())
                .collect();
            return self
                .characteristics
                .iter()
                .any(|wanted| have.contains(&wanted.to_lowercase()));
        }

        true
    }
}

/// One filter criterion with its available options.
#[derive(Debug, Clone, Serialize)]
pub struct AvatarCriterion {
    pub name: String,
    pub options: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct AvatarListResponse {
    #[serde(default)]
    avatars: Vec<Avatar>,
}
