use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{FolioError, Result};

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct SiteConfig {
    #[serde(default)]
    pub site: SiteMetadata,
    #[serde(default)]
    pub templates: TemplatesConfig,
    #[serde(default)]
    pub custom: CustomAssets,
    #[serde(default)]
    pub seo: SeoConfig,
    #[serde(default)]
    pub build: BuildConfig,

    /// The whole config document, addressable by `{{cfg:...}}` references
    #[serde(skip)]
    pub raw: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BuildConfig {
    /// Enable HTML and CSS minification
    #[serde(default = "default_true")]
    pub minify: bool,

    /// Prefix substituted for the `{{basePath}}` token, e.g. "/portfolio"
    #[serde(default)]
    pub base_path: String,

    /// Content documents, relative to the site root
    #[serde(default = "default_content_dir")]
    pub content_dir: PathBuf,

    /// Where the built site goes when no output is given on the command line
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_true() -> bool {
    true
}

fn default_content_dir() -> PathBuf {
    PathBuf::from("src/content")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("public")
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            minify: true,
            base_path: String::new(),
            content_dir: default_content_dir(),
            output_dir: default_output_dir(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SiteMetadata {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub branding: Branding,
    #[serde(default)]
    pub contact: Contact,
}

fn default_title() -> String {
    "My Static Site".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

impl Default for SiteMetadata {
    fn default() -> Self {
        Self {
            title: default_title(),
            description: String::new(),
            author: String::new(),
            keywords: Vec::new(),
            language: default_language(),
            branding: Branding::default(),
            contact: Contact::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Branding {
    #[serde(default = "default_favicon")]
    pub favicon: String,
    #[serde(default = "default_logo_src")]
    pub logo_src: String,
    pub logo_alt: Option<String>,
}

fn default_favicon() -> String {
    "assets/icons/favicon.svg".to_string()
}

fn default_logo_src() -> String {
    "assets/images/logo.svg".to_string()
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            favicon: default_favicon(),
            logo_src: default_logo_src(),
            logo_alt: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Contact {
    pub full_name: String,
    pub role: String,
    pub institution: String,
    pub department: String,
    pub postal_address: String,
    pub office: String,
    pub coordinates: Option<Coordinates>,
    pub phones: Vec<String>,
    pub emails: Emails,
    pub socials: Vec<Social>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Emails {
    pub institutional: String,
    pub personal: Vec<String>,
    pub professional: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Social {
    pub key: String,
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TemplatesConfig {
    #[serde(default = "default_template")]
    pub default: String,
}

fn default_template() -> String {
    "default".to_string()
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            default: default_template(),
        }
    }
}

/// Site-wide stylesheets and scripts added to every page
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CustomAssets {
    #[serde(default = "default_custom_styles")]
    pub styles: Vec<String>,
    #[serde(default = "default_custom_scripts")]
    pub scripts: Vec<ScriptEntry>,
}

fn default_custom_styles() -> Vec<String> {
    vec!["assets/css/custom.css".to_string()]
}

fn default_custom_scripts() -> Vec<ScriptEntry> {
    vec![ScriptEntry::Path("assets/js/custom.js".to_string())]
}

impl Default for CustomAssets {
    fn default() -> Self {
        Self {
            styles: default_custom_styles(),
            scripts: default_custom_scripts(),
        }
    }
}

/// A script reference: either a bare path or `{ src, module }`
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ScriptEntry {
    Path(String),
    Detailed {
        src: String,
        #[serde(default)]
        module: bool,
    },
}

impl ScriptEntry {
    pub fn src(&self) -> &str {
        match self {
            ScriptEntry::Path(src) => src,
            ScriptEntry::Detailed { src, .. } => src,
        }
    }

    pub fn is_module(&self) -> bool {
        matches!(self, ScriptEntry::Detailed { module: true, .. })
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SeoConfig {
    #[serde(default)]
    pub site_url: String,
    #[serde(default = "default_locale")]
    pub default_locale: String,
    #[serde(default = "default_type")]
    pub default_type: String,
    #[serde(default = "default_robots")]
    pub default_robots: String,
    #[serde(default)]
    pub default_image: String,
    #[serde(default)]
    pub twitter_handle: String,
    #[serde(default)]
    pub organization_name: String,
    #[serde(default)]
    pub same_as: Vec<String>,
}

fn default_locale() -> String {
    "en_US".to_string()
}

fn default_type() -> String {
    "website".to_string()
}

fn default_robots() -> String {
    "index,follow".to_string()
}

impl Default for SeoConfig {
    fn default() -> Self {
        Self {
            site_url: String::new(),
            default_locale: default_locale(),
            default_type: default_type(),
            default_robots: default_robots(),
            default_image: String::new(),
            twitter_handle: String::new(),
            organization_name: String::new(),
            same_as: Vec::new(),
        }
    }
}

impl SiteConfig {
    pub async fn load(site_path: &Path) -> Result<Self> {
        let config_path = site_path.join("config.toml");

        if !config_path.exists() {
            return Ok(SiteConfig::with_raw(SiteConfig::default()));
        }

        let content = tokio::fs::read_to_string(&config_path)
            .await
            .map_err(|e| FolioError::ConfigRead {
                path: (&config_path).into(),
                cause: e,
            })?;

        Self::parse(&config_path, &content)
    }

    pub fn parse(config_path: &Path, content: &str) -> Result<Self> {
        let config: SiteConfig = toml::from_str(content)
            .map_err(|e| FolioError::config_parse(config_path, content, e))?;
        let table: toml::Table = toml::from_str(content)
            .map_err(|e| FolioError::config_parse(config_path, content, e))?;

        let mut config = Self::with_raw(config);
        // Keys the user wrote win over defaults, and unknown keys stay addressable.
        if let Ok(serde_json::Value::Object(user)) = serde_json::to_value(table) {
            merge_json(&mut config.raw, serde_json::Value::Object(user));
        }
        Ok(config)
    }

    /// Fill `raw` from the typed config so defaults are addressable too
    fn with_raw(mut config: SiteConfig) -> Self {
        config.raw = serde_json::to_value(&config).unwrap_or(serde_json::Value::Null);
        config
    }

    pub fn logo_alt(&self) -> String {
        self.site
            .branding
            .logo_alt
            .as_deref()
            .map(str::trim)
            .filter(|alt| !alt.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("{} logo", self.site.title))
    }
}

fn merge_json(base: &mut serde_json::Value, overlay: serde_json::Value) {
    match (base, overlay) {
        (serde_json::Value::Object(base_map), serde_json::Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_json(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_empty() {
        let config = SiteConfig::parse(Path::new("config.toml"), "").unwrap();
        assert_eq!(config.site.title, "My Static Site");
        assert_eq!(config.templates.default, "default");
        assert_eq!(config.custom.styles, vec!["assets/css/custom.css"]);
        assert!(config.build.minify);
        assert_eq!(config.build.content_dir, PathBuf::from("src/content"));
        assert_eq!(config.seo.default_robots, "index,follow");
        assert_eq!(config.raw["site"]["title"], "My Static Site");
    }

    #[test]
    fn test_parse_contact_and_scripts() {
        let toml = r#"
[site]
title = "Dr. Ada"

[site.contact]
phones = ["+1 555 0100"]
socials = [{ key = "github", label = "GitHub", url = "https://github.com/ada" }]

[site.contact.emails]
institutional = "ada@uni.edu"

[custom]
scripts = ["assets/js/a.js", { src = "assets/js/b.js", module = true }]
"#;
        let config = SiteConfig::parse(Path::new("config.toml"), toml).unwrap();
        assert_eq!(config.site.title, "Dr. Ada");
        assert_eq!(config.site.contact.phones, vec!["+1 555 0100"]);
        assert_eq!(config.site.contact.emails.institutional, "ada@uni.edu");
        assert_eq!(config.custom.scripts.len(), 2);
        assert!(!config.custom.scripts[0].is_module());
        assert!(config.custom.scripts[1].is_module());
        assert_eq!(config.custom.scripts[1].src(), "assets/js/b.js");
        // Styles keep their default when only scripts are given
        assert_eq!(config.custom.styles, vec!["assets/css/custom.css"]);
    }

    #[test]
    fn test_raw_keeps_unknown_keys() {
        let toml = "[extra]\nmotto = \"Hello\"\n";
        let config = SiteConfig::parse(Path::new("config.toml"), toml).unwrap();
        assert_eq!(config.raw["extra"]["motto"], "Hello");
        assert_eq!(config.raw["site"]["title"], "My Static Site");
    }

    #[test]
    fn test_parse_error_has_span() {
        let err = SiteConfig::parse(Path::new("config.toml"), "[site\ntitle = 1").unwrap_err();
        assert!(matches!(err, FolioError::ConfigParse { .. }));
    }

    #[test]
    fn test_logo_alt_falls_back_to_title() {
        let config = SiteConfig::parse(Path::new("config.toml"), "[site]\ntitle = \"Ada\"").unwrap();
        assert_eq!(config.logo_alt(), "Ada logo");
    }
}
