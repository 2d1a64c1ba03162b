//! `orcid`: a researcher profile rendered from data fetched ahead of time.
//!
//! Nothing here touches the network. When `cachedData` is absent the block
//! renders its placeholder state.

use serde::Deserialize;
use serde_json::Value;

use crate::blocks::non_empty;
use crate::html::{block_classes, escape_html};
use crate::model::{Block, value_text};

/// Section keys in the order they render when a block doesn't list its own.
const DEFAULT_SECTIONS: &[&str] = &[
    "works",
    "education",
    "employment",
    "peer-review",
    "grants",
    "professional-activity",
];

const NEW_TAB: &str = " target=\"_blank\" rel=\"noopener noreferrer\"";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OrcidData {
    pub orcid_id: Option<String>,
    pub sections: Vec<String>,
    pub display_options: DisplayOptions,
    pub cached_data: CachedData,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DisplayOptions {
    pub show_title: Option<bool>,
    pub citation_style: Option<String>,
    pub work_metadata: WorkMetadataToggles,
    /// When non-empty, only these metadata keys are shown
    pub visible_work_metadata: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorkMetadataToggles {
    #[serde(rename = "type")]
    pub work_type: Option<bool>,
    pub publication_date: Option<bool>,
    pub journal_badge: Option<bool>,
    pub authors: Option<bool>,
    pub journal: Option<bool>,
    pub volume: Option<bool>,
    pub issue: Option<bool>,
    pub number: Option<bool>,
    pub pages: Option<bool>,
    pub description: Option<bool>,
    pub identifiers: Option<bool>,
    pub provided_citation: Option<bool>,
    pub generated_citation: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CachedData {
    pub sections: OrcidSections,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OrcidSections {
    pub works: Option<Vec<Work>>,
    pub education: Option<Vec<Education>>,
    pub employment: Option<Vec<Employment>>,
    pub peer_reviews: Option<Vec<PeerReview>>,
    pub grants: Option<Vec<Grant>>,
    pub professional_activities: Option<Vec<Activity>>,
}

impl OrcidSections {
    fn is_empty(&self) -> bool {
        self.works.is_none()
            && self.education.is_none()
            && self.employment.is_none()
            && self.peer_reviews.is_none()
            && self.grants.is_none()
            && self.professional_activities.is_none()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Wrapped {
    pub value: Option<Value>,
}

impl Wrapped {
    fn text(&self) -> Option<String> {
        self.value
            .as_ref()
            .map(value_text)
            .filter(|v| !v.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OrcidDate {
    pub year: Option<Wrapped>,
    pub month: Option<Wrapped>,
    pub day: Option<Wrapped>,
}

impl OrcidDate {
    fn part(part: &Option<Wrapped>) -> Option<String> {
        part.as_ref().and_then(Wrapped::text)
    }

    /// `YYYY`, `MM/YYYY` or `DD/MM/YYYY`, as far as the record goes.
    fn short(&self) -> String {
        let Some(year) = Self::part(&self.year) else {
            return String::new();
        };
        match (Self::part(&self.month), Self::part(&self.day)) {
            (None, _) => year,
            (Some(month), None) => format!("{month:0>2}/{year}"),
            (Some(month), Some(day)) => format!("{day:0>2}/{month:0>2}/{year}"),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Contributor {
    pub name: Option<String>,
    pub sequence: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExternalIds {
    pub external_identifier: Vec<ExternalIdentifier>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExternalIdentifier {
    pub external_identifier_type: Option<String>,
    pub external_identifier_id: Option<Wrapped>,
    pub external_identifier_url: Option<Wrapped>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Work {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    #[serde(rename = "type")]
    pub work_type: Option<String>,
    pub publication_date: Option<OrcidDate>,
    pub journal_title: Option<String>,
    pub volume: Option<String>,
    pub issue: Option<String>,
    pub number: Option<String>,
    pub pages: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub contributors: Vec<Contributor>,
    /// Either plain text or `{ "citation-type", "citation-value" }`
    pub citation: Option<Value>,
    pub citation_type: Option<String>,
    pub citation_text: Option<String>,
    pub external_ids: Option<ExternalIds>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Education {
    pub institution: Option<String>,
    pub degree: Option<String>,
    pub field: Option<String>,
    pub start_date: Option<OrcidDate>,
    pub end_date: Option<OrcidDate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Employment {
    pub organization: Option<String>,
    pub position: Option<String>,
    pub department: Option<String>,
    pub start_date: Option<OrcidDate>,
    pub end_date: Option<OrcidDate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PeerReview {
    pub review_type: Option<String>,
    pub organization: Option<String>,
    pub completion_date: Option<OrcidDate>,
    pub role: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub subject_name: Option<String>,
    pub subject_type: Option<String>,
    pub group_id: Option<Value>,
    pub review_journal: Option<Value>,
    pub subject_url: Option<String>,
    pub review_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Grant {
    pub title: Option<String>,
    pub organization: Option<String>,
    pub amount: Option<Value>,
    pub currency: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<OrcidDate>,
    pub end_date: Option<OrcidDate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Activity {
    pub role: Option<String>,
    pub organization: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<OrcidDate>,
    pub end_date: Option<OrcidDate>,
}

fn text(value: &Option<String>) -> Option<&str> {
    non_empty(value.as_deref())
}

fn esc(value: &Option<String>) -> String {
    escape_html(value.as_deref().unwrap_or(""))
}

pub fn render_orcid(block: &Block, data: &OrcidData) -> String {
    let orcid_id = text(&data.orcid_id).unwrap_or("unknown");
    let options = &data.display_options;
    let mut html = format!(
        "<section class=\"{}\">\n",
        block_classes(&["orcid-profile", "block-orcid"], &block.style)
    );

    if options.show_title != Some(false) {
        html.push_str(&format!(
            "<div class=\"orcid-header\"><p class=\"orcid-notice\">Data retrieved from \
             <a href=\"https://orcid.org/{}\"{NEW_TAB}>ORCID Profile</a></p></div>\n",
            escape_html(orcid_id)
        ));
    }

    let sections = &data.cached_data.sections;
    if sections.is_empty() {
        html.push_str("<p class=\"orcid-loading\">Loading ORCID data...</p>\n</section>\n");
        return html;
    }

    let requested: Vec<&str> = if data.sections.is_empty() {
        DEFAULT_SECTIONS.to_vec()
    } else {
        data.sections.iter().map(String::as_str).collect()
    };

    for key in requested {
        let rendered = match key {
            "works" => sections
                .works
                .as_deref()
                .map(|works| ("works-section", "Publications", render_works(works, options))),
            "education" => sections
                .education
                .as_deref()
                .map(|items| ("education-section", "Education", render_education(items))),
            "employment" => sections
                .employment
                .as_deref()
                .map(|items| ("employment-section", "Employment", render_employment(items))),
            "peer-review" => sections
                .peer_reviews
                .as_deref()
                .map(|items| ("peer-review-section", "Peer Reviews", render_peer_reviews(items))),
            "grants" => sections
                .grants
                .as_deref()
                .map(|items| ("grants-section", "Grants", render_grants(items))),
            "professional-activity" => sections.professional_activities.as_deref().map(|items| {
                (
                    "professional-activities-section",
                    "Professional Activities",
                    render_activities(items),
                )
            }),
            _ => None,
        };

        if let Some((class, heading, body)) = rendered {
            html.push_str(&format!(
                "<div class=\"orcid-section {class}\">\n<h2>{heading}</h2>\n{body}</div>\n"
            ));
        }
    }

    html.push_str("</section>\n");
    html
}

// === Works ===

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CitationStyle {
    Vancouver,
    Ieee,
}

impl CitationStyle {
    fn from_options(options: &DisplayOptions) -> Self {
        match text(&options.citation_style).map(str::to_lowercase).as_deref() {
            Some("ieee") => CitationStyle::Ieee,
            _ => CitationStyle::Vancouver,
        }
    }

    fn label(self) -> &'static str {
        match self {
            CitationStyle::Vancouver => "VANCOUVER",
            CitationStyle::Ieee => "IEEE",
        }
    }
}

/// Which parts of a work are shown. Everything is on unless toggled off,
/// and a non-empty `visibleWorkMetadata` list switches to allow-list mode.
#[derive(Debug, Clone, Copy)]
struct WorkFields {
    work_type: bool,
    publication_date: bool,
    journal_badge: bool,
    authors: bool,
    journal: bool,
    volume: bool,
    issue: bool,
    number: bool,
    pages: bool,
    description: bool,
    identifiers: bool,
    provided_citation: bool,
    generated_citation: bool,
}

impl WorkFields {
    fn from_options(options: &DisplayOptions) -> Self {
        let t = &options.work_metadata;
        let visible = &options.visible_work_metadata;
        let on = |key: &str, toggle: Option<bool>| {
            if visible.is_empty() {
                toggle.unwrap_or(true)
            } else {
                visible.iter().any(|v| v == key)
            }
        };
        WorkFields {
            work_type: on("type", t.work_type),
            publication_date: on("publicationDate", t.publication_date),
            journal_badge: on("journalBadge", t.journal_badge),
            authors: on("authors", t.authors),
            journal: on("journal", t.journal),
            volume: on("volume", t.volume),
            issue: on("issue", t.issue),
            number: on("number", t.number),
            pages: on("pages", t.pages),
            description: on("description", t.description),
            identifiers: on("identifiers", t.identifiers),
            provided_citation: on("providedCitation", t.provided_citation),
            generated_citation: on("generatedCitation", t.generated_citation),
        }
    }
}

fn work_type_label(work_type: Option<&str>) -> &'static str {
    match work_type.map(str::to_lowercase).as_deref() {
        Some("journal-article") => "Journal Article",
        Some("conference-paper") => "Conference Paper",
        Some("book") => "Book",
        Some("book-chapter") => "Book Chapter",
        Some("dissertation") => "Dissertation",
        Some("report") => "Report",
        Some("other") => "Other",
        _ => "Work",
    }
}

/// `journal-article` becomes `Journal Article`.
fn title_case(value: Option<&str>, fallback: &str) -> String {
    let Some(value) = value.filter(|v| !v.is_empty()) else {
        return fallback.to_string();
    };
    value
        .split(['-', '_'])
        .filter(|s| !s.is_empty())
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

struct Doi {
    doi: String,
    url: String,
}

fn doi_link(ids: Option<&ExternalIds>) -> Option<Doi> {
    static DOI_HOST: std::sync::LazyLock<regex::Regex> = std::sync::LazyLock::new(|| {
        regex::Regex::new(r"(?i)^https?://(dx\.)?doi\.org/").expect("valid doi regex")
    });

    ids?.external_identifier
        .iter()
        .find(|id| {
            id.external_identifier_type
                .as_deref()
                .is_some_and(|t| t.eq_ignore_ascii_case("doi"))
        })
        .map(|id| {
            let raw = id
                .external_identifier_id
                .as_ref()
                .and_then(Wrapped::text)
                .unwrap_or_default();
            let raw = raw.trim();
            let normalized = DOI_HOST.replace(raw, "");
            let doi = if normalized.is_empty() { raw.to_string() } else { normalized.into_owned() };
            Doi {
                url: format!("https://doi.org/{doi}"),
                doi,
            }
        })
}

/// Authors marked `first` lead; everyone else keeps their listed order.
fn author_names(contributors: &[Contributor]) -> Vec<String> {
    let mut named: Vec<&Contributor> = contributors
        .iter()
        .filter(|c| text(&c.name).is_some())
        .collect();
    named.sort_by_key(|c| c.sequence.as_deref() != Some("first"));
    named
        .into_iter()
        .filter_map(|c| text(&c.name).map(str::to_string))
        .collect()
}

fn split_name(full: &str) -> (Vec<&str>, Option<&str>) {
    let mut parts: Vec<&str> = full.split_whitespace().collect();
    let family = parts.pop();
    (parts, family)
}

fn vancouver_name(full: &str) -> String {
    let (given, family) = split_name(full);
    let Some(family) = family else {
        return String::new();
    };
    let initials: String = given
        .iter()
        .filter_map(|n| n.chars().next())
        .flat_map(char::to_uppercase)
        .collect();
    format!("{family} {initials}").trim().to_string()
}

fn ieee_name(full: &str) -> String {
    let (given, family) = split_name(full);
    let Some(family) = family else {
        return String::new();
    };
    let initials = given
        .iter()
        .filter_map(|n| n.chars().next())
        .map(|c| format!("{}.", c.to_uppercase()))
        .collect::<Vec<_>>()
        .join(" ");
    if initials.is_empty() {
        family.to_string()
    } else {
        format!("{initials} {family}")
    }
}

fn author_series(authors: &[String]) -> String {
    match authors {
        [] => String::new(),
        [one] => one.clone(),
        [a, b] => format!("{a} and {b}"),
        [rest @ .., last] => format!("{}, and {last}", rest.join(", ")),
    }
}

fn work_year(work: &Work) -> Option<String> {
    work.publication_date
        .as_ref()
        .and_then(|d| OrcidDate::part(&d.year))
}

fn vancouver_citation(work: &Work, doi: Option<&Doi>, index: usize) -> String {
    let names: Vec<String> = author_names(&work.contributors)
        .iter()
        .map(|n| vancouver_name(n))
        .filter(|n| !n.is_empty())
        .collect();
    let authors = author_series(&names);
    let year = work_year(work);

    let mut journal = text(&work.journal_title)
        .map(|j| format!("{j}. "))
        .unwrap_or_default();
    if let Some(volume) = text(&work.volume) {
        journal.push_str(&format!("{};{volume}", year.as_deref().unwrap_or("n.d.")));
        if let Some(issue) = text(&work.issue) {
            journal.push_str(&format!("({issue})"));
        }
        if let Some(pages) = text(&work.pages) {
            journal.push_str(&format!(":{pages}"));
        }
        journal.push('.');
    } else if let Some(year) = &year {
        journal.push_str(&format!("{year}."));
    }

    let mut citation = format!("{index}. ");
    if !authors.is_empty() {
        citation.push_str(&format!("{authors}. "));
    }
    citation.push_str(&format!("{}. ", text(&work.title).unwrap_or("Untitled work")));
    citation.push_str(&journal);
    if let Some(doi) = doi {
        citation.push_str(&format!(" doi:{}", doi.doi));
    }
    citation.trim().to_string()
}

fn ieee_citation(work: &Work, doi: Option<&Doi>, index: usize) -> String {
    let names: Vec<String> = author_names(&work.contributors)
        .iter()
        .map(|n| ieee_name(n))
        .filter(|n| !n.is_empty())
        .collect();
    let authors = author_series(&names);

    let mut segments: Vec<String> = Vec::new();
    if let Some(journal) = text(&work.journal_title) {
        segments.push(journal.to_string());
    }
    if let Some(volume) = text(&work.volume) {
        segments.push(format!("vol. {volume}"));
    }
    if let Some(issue) = text(&work.issue) {
        segments.push(format!("no. {issue}"));
    }
    if let Some(pages) = text(&work.pages) {
        segments.push(format!("pp. {pages}"));
    }
    if let Some(year) = work_year(work) {
        segments.push(year);
    }
    if let Some(doi) = doi {
        segments.push(format!("doi: {}", doi.doi));
    }

    let mut citation = format!("[{index}] ");
    if !authors.is_empty() {
        citation.push_str(&format!("{authors}, "));
    }
    citation.push_str(&format!("\"{},\"", text(&work.title).unwrap_or("Untitled work")));
    if !segments.is_empty() {
        citation.push_str(&format!(" {}.", segments.join(", ")));
    }
    citation.trim().to_string()
}

/// The citation recorded on ORCID itself, as `(type, text)`.
fn provided_citation(work: &Work) -> (String, String) {
    match &work.citation {
        Some(Value::String(s)) => ("plain-text".to_string(), s.clone()),
        Some(Value::Object(map)) => {
            let field = |a: &str, b: &str| {
                map.get(a)
                    .or_else(|| map.get(b))
                    .map(value_text)
                    .unwrap_or_default()
            };
            (
                field("citation-type", "citationType"),
                field("citation-value", "citationValue"),
            )
        }
        _ => (
            work.citation_type.clone().unwrap_or_default(),
            work.citation_text.clone().unwrap_or_default(),
        ),
    }
}

fn publication_date_label(work: &Work) -> String {
    let Some(date) = &work.publication_date else {
        return "N/A".to_string();
    };
    let year = OrcidDate::part(&date.year).unwrap_or_else(|| "N/A".to_string());
    let month = OrcidDate::part(&date.month)
        .and_then(|m| m.trim().parse::<u8>().ok())
        .and_then(|m| chrono::Month::try_from(m).ok());
    match (month, OrcidDate::part(&date.day)) {
        (None, _) => year,
        (Some(month), None) => format!("{} {year}", month.name()),
        (Some(month), Some(day)) => format!("{day} {} {year}", month.name()),
    }
}

fn render_work(work: &Work, fields: WorkFields, style: CitationStyle, index: usize) -> String {
    let doi = doi_link(work.external_ids.as_ref());
    let mut html = format!(
        "<article class=\"orcid-work\">\n<h4 class=\"work-title\">{}</h4>\n",
        esc(&work.title)
    );
    if let Some(subtitle) = text(&work.subtitle) {
        html.push_str(&format!("<p class=\"work-subtitle\">{}</p>\n", escape_html(subtitle)));
    }

    let mut badges = String::new();
    if fields.work_type {
        badges.push_str(&format!(
            "<span class=\"work-type\">{}</span>",
            work_type_label(work.work_type.as_deref())
        ));
    }
    if fields.publication_date {
        badges.push_str(&format!(
            "<span class=\"work-date\">{}</span>",
            escape_html(&publication_date_label(work))
        ));
    }
    if let Some(journal) = text(&work.journal_title).filter(|_| fields.journal_badge) {
        badges.push_str(&format!("<span class=\"work-journal\">{}</span>", escape_html(journal)));
    }
    if !badges.is_empty() {
        html.push_str(&format!("<div class=\"work-metadata\">{badges}</div>\n"));
    }

    let authors = author_names(&work.contributors);
    if fields.authors && !authors.is_empty() {
        html.push_str(&format!(
            "<div class=\"work-contributors\"><strong>Authors:</strong> <span class=\"author-list\">{}</span></div>\n",
            escape_html(&authors.join(", "))
        ));
    }

    let details: String = [
        ("Journal", fields.journal, &work.journal_title),
        ("Volume", fields.volume, &work.volume),
        ("Issue", fields.issue, &work.issue),
        ("Number", fields.number, &work.number),
        ("Pages", fields.pages, &work.pages),
    ]
    .into_iter()
    .filter(|(_, shown, _)| *shown)
    .filter_map(|(label, _, value)| text(value).map(|v| (label, v)))
    .map(|(label, value)| {
        format!(
            "<div class=\"work-detail-item\"><dt>{label}</dt><dd>{}</dd></div>",
            escape_html(value)
        )
    })
    .collect();
    if !details.is_empty() {
        html.push_str(&format!("<dl class=\"work-detail-grid\">{details}</dl>\n"));
    }

    if let Some(description) = text(&work.description).filter(|_| fields.description) {
        html.push_str(&format!(
            "<p class=\"work-description\">{}</p>\n",
            escape_html(description)
        ));
    }

    if fields.identifiers {
        let identifiers = identifier_items(work, doi.as_ref());
        if !identifiers.is_empty() {
            html.push_str(&format!("<div class=\"work-identifiers\">{identifiers}</div>\n"));
        }
    }

    let (citation_type, citation_text) = provided_citation(work);
    let generated = match style {
        CitationStyle::Vancouver => vancouver_citation(work, doi.as_ref(), index),
        CitationStyle::Ieee => ieee_citation(work, doi.as_ref(), index),
    };
    let mut citations = String::new();
    if fields.provided_citation && !citation_text.is_empty() {
        let kind = if citation_type.is_empty() {
            String::new()
        } else {
            format!(" ({})", escape_html(&citation_type.to_uppercase()))
        };
        citations.push_str(&format!(
            "<div class=\"work-citation\"><strong>Provided Citation{kind}</strong><p class=\"citation-text\">{}</p></div>",
            escape_html(&citation_text)
        ));
    }
    if fields.generated_citation && !generated.is_empty() {
        citations.push_str(&format!(
            "<div class=\"work-citation\"><strong>{} (generated)</strong><p class=\"citation-text\">{}</p></div>",
            style.label(),
            escape_html(&generated)
        ));
    }
    if !citations.is_empty() {
        html.push_str(&format!("<div class=\"work-citations\">{citations}</div>\n"));
    }

    let link = text(&work.url)
        .map(|url| {
            format!(
                "<a href=\"{}\"{NEW_TAB} class=\"btn-link\">View Publication</a>",
                escape_html(url)
            )
        })
        .unwrap_or_default();
    html.push_str(&format!("<div class=\"work-links\">{link}</div>\n</article>\n"));
    html
}

fn identifier_items(work: &Work, doi: Option<&Doi>) -> String {
    let mut items = String::new();
    if let Some(doi) = doi {
        items.push_str(&format!(
            "<span class=\"identifier doi\">DOI: <a href=\"{}\"{NEW_TAB}>{}</a></span>",
            escape_html(&doi.url),
            escape_html(&doi.doi)
        ));
    }
    let Some(ids) = &work.external_ids else {
        return items;
    };
    for id in &ids.external_identifier {
        let kind = text(&id.external_identifier_type)
            .unwrap_or("ID")
            .to_uppercase();
        if kind == "DOI" {
            continue;
        }
        let Some(value) = id.external_identifier_id.as_ref().and_then(Wrapped::text) else {
            continue;
        };
        let value = escape_html(&value);
        let label = escape_html(&kind);
        match id.external_identifier_url.as_ref().and_then(Wrapped::text) {
            Some(url) => items.push_str(&format!(
                "<span class=\"identifier\">{label}: <a href=\"{}\"{NEW_TAB}>{value}</a></span>",
                escape_html(&url)
            )),
            None => items.push_str(&format!("<span class=\"identifier\">{label}: {value}</span>")),
        }
    }
    items
}

fn render_works(works: &[Work], options: &DisplayOptions) -> String {
    if works.is_empty() {
        return "<p class=\"no-data\">No publications available.</p>\n".to_string();
    }

    // Group by type, keeping the order in which types first appear
    let mut groups: Vec<(String, Vec<&Work>)> = Vec::new();
    for work in works {
        let kind = text(&work.work_type).unwrap_or("other").to_string();
        match groups.iter_mut().find(|(k, _)| *k == kind) {
            Some((_, list)) => list.push(work),
            None => groups.push((kind, vec![work])),
        }
    }

    let fields = WorkFields::from_options(options);
    let style = CitationStyle::from_options(options);
    let mut index = 1;
    let mut html = String::from("<div class=\"orcid-works\">\n");
    for (kind, list) in groups {
        let mut items = String::new();
        for work in list {
            items.push_str(&render_work(work, fields, style, index));
            index += 1;
        }
        html.push_str(&format!(
            "<section class=\"work-group work-type-{}\">\n<h3>{}</h3>\n<div class=\"work-list\">\n{items}</div>\n</section>\n",
            escape_html(&kind),
            work_type_label(Some(&kind))
        ));
    }
    html.push_str("</div>\n");
    html
}

// === Timeline-shaped sections ===

struct TimelineEntry {
    period: String,
    title: String,
    /// Already-built HTML
    description: String,
}

fn period(start: Option<&OrcidDate>, end: Option<&OrcidDate>) -> String {
    let start = start.map(OrcidDate::short).unwrap_or_default();
    let end = match end {
        Some(end) => end.short(),
        None => "Present".to_string(),
    };
    if start.is_empty() || end.is_empty() {
        "Dates not specified".to_string()
    } else {
        format!("{start} - {end}")
    }
}

fn render_timeline(entries: Vec<TimelineEntry>) -> String {
    let items: String = entries
        .into_iter()
        .map(|entry| {
            let description = if entry.description.is_empty() {
                String::new()
            } else {
                format!("<div class=\"timeline-description\">{}</div>", entry.description)
            };
            format!(
                "<div class=\"timeline-item\"><div class=\"timeline-period\">{}</div>\
                 <div class=\"timeline-content\"><strong class=\"timeline-title\">{}</strong>{description}</div></div>\n",
                escape_html(&entry.period),
                escape_html(&entry.title)
            )
        })
        .collect();
    format!("<div class=\"timeline block-timeline\">\n{items}</div>\n")
}

fn no_data(what: &str) -> String {
    format!("<p class=\"no-data\">No {what} available.</p>\n")
}

fn optional_p(class: &str, value: &Option<String>) -> String {
    text(value)
        .map(|v| format!("<p class=\"{class}\">{}</p>", escape_html(v)))
        .unwrap_or_default()
}

fn render_education(items: &[Education]) -> String {
    if items.is_empty() {
        return no_data("education records");
    }
    render_timeline(
        items
            .iter()
            .map(|edu| TimelineEntry {
                period: period(edu.start_date.as_ref(), edu.end_date.as_ref()),
                title: text(&edu.degree)
                    .or(text(&edu.institution))
                    .unwrap_or("")
                    .to_string(),
                description: if text(&edu.institution).is_some() {
                    optional_p("institution", &edu.institution) + &optional_p("field", &edu.field)
                } else {
                    String::new()
                },
            })
            .collect(),
    )
}

fn render_employment(items: &[Employment]) -> String {
    if items.is_empty() {
        return no_data("employment records");
    }
    render_timeline(
        items
            .iter()
            .map(|emp| TimelineEntry {
                period: period(emp.start_date.as_ref(), emp.end_date.as_ref()),
                title: text(&emp.position)
                    .or(text(&emp.organization))
                    .unwrap_or("")
                    .to_string(),
                description: if text(&emp.organization).is_some() {
                    optional_p("organization", &emp.organization)
                        + &optional_p("department", &emp.department)
                } else {
                    String::new()
                },
            })
            .collect(),
    )
}

fn render_grants(items: &[Grant]) -> String {
    if items.is_empty() {
        return no_data("grants");
    }
    render_timeline(
        items
            .iter()
            .map(|grant| {
                let amount = grant
                    .amount
                    .as_ref()
                    .map(value_text)
                    .filter(|a| !a.is_empty())
                    .map(|a| {
                        format!(
                            "<p class=\"grant-amount\">{} {}</p>",
                            esc(&grant.currency),
                            escape_html(&a)
                        )
                    })
                    .unwrap_or_default();
                TimelineEntry {
                    period: period(grant.start_date.as_ref(), grant.end_date.as_ref()),
                    title: grant.title.clone().unwrap_or_default(),
                    description: format!(
                        "<p class=\"grant-org\">{}</p>{amount}{}",
                        esc(&grant.organization),
                        optional_p("grant-desc", &grant.description)
                    ),
                }
            })
            .collect(),
    )
}

fn render_activities(items: &[Activity]) -> String {
    if items.is_empty() {
        return no_data("professional activities");
    }
    render_timeline(
        items
            .iter()
            .map(|activity| TimelineEntry {
                period: period(activity.start_date.as_ref(), activity.end_date.as_ref()),
                title: activity.role.clone().unwrap_or_default(),
                description: format!(
                    "<p class=\"activity-org\">{}</p>{}",
                    esc(&activity.organization),
                    optional_p("activity-desc", &activity.description)
                ),
            })
            .collect(),
    )
}

fn render_peer_reviews(reviews: &[PeerReview]) -> String {
    if reviews.is_empty() {
        return no_data("peer review records");
    }

    let items: String = reviews
        .iter()
        .map(|review| {
            let date = review
                .completion_date
                .as_ref()
                .map(OrcidDate::short)
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| "Date not specified".to_string());

            let detail = |label: &str, value: Option<String>| {
                value
                    .filter(|v| !v.trim().is_empty())
                    .map(|v| {
                        format!(
                            "<div class=\"review-detail-item\"><dt>{label}</dt><dd>{}</dd></div>",
                            escape_html(&v)
                        )
                    })
                    .unwrap_or_default()
            };
            let details = [
                detail("Subject", review.subject_name.clone()),
                detail(
                    "Subject Type",
                    text(&review.subject_type).map(|t| title_case(Some(t), "")),
                ),
                detail("Group ID", review.group_id.as_ref().map(value_text)),
                detail("Journal", review.review_journal.as_ref().map(value_text)),
            ]
            .concat();

            let link = |url: &Option<String>, label: &str| {
                text(url)
                    .map(|u| {
                        format!(
                            "<a href=\"{}\"{NEW_TAB} class=\"review-link\">{label}</a>",
                            escape_html(u)
                        )
                    })
                    .unwrap_or_default()
            };

            format!(
                "<article class=\"peer-review\">\n\
                 <header class=\"review-header\"><div class=\"review-heading\">\
                 <h3 class=\"review-title\">{}</h3><p class=\"review-org\">{}</p></div>\
                 <span class=\"review-date\">{}</span></header>\n\
                 <div class=\"review-badges\"><span class=\"review-badge\">{}</span><span class=\"review-badge\">{}</span></div>\n\
                 <dl class=\"review-detail-grid\">{details}</dl>\n\
                 <div class=\"review-links\">{}{}</div>\n\
                 </article>\n",
                escape_html(&title_case(review.review_type.as_deref(), "Review")),
                escape_html(text(&review.organization).unwrap_or("Unknown organization")),
                escape_html(&date),
                escape_html(&title_case(review.role.as_deref(), "Reviewer")),
                escape_html(&title_case(review.kind.as_deref(), "Peer review")),
                link(&review.subject_url, "View Subject"),
                link(&review.review_url, "View Review Record"),
            )
        })
        .collect();

    format!("<div class=\"orcid-peer-reviews\">\n{items}</div>\n")
}
