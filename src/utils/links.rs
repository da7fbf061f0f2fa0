// Link templates - expand short link values (e.g. issue keys) into URLs

use crate::model::Link;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A template applied to a raw link value
#[derive(Clone)]
pub enum LinkTemplate {
    /// Literal text where `%s` is replaced by the value
    Pattern(String),
    Function(Arc<dyn Fn(&str) -> String + Send + Sync>),
}

impl LinkTemplate {
    pub fn function(f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        Self::Function(Arc::new(f))
    }

    pub fn apply(&self, value: &str) -> String {
        match self {
            Self::Pattern(pattern) => pattern.replacen("%s", value, 1),
            Self::Function(f) => f(value),
        }
    }
}

impl fmt::Debug for LinkTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pattern(pattern) => f.debug_tuple("Pattern").field(pattern).finish(),
            Self::Function(_) => f.write_str("Function(..)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LinkTypeConfig {
    pub url_template: LinkTemplate,
    pub name_template: Option<LinkTemplate>,
}

/// Link templates keyed by link type
pub type LinkConfig = HashMap<String, LinkTypeConfig>;

/// Serialized form of a link template, as found in configuration files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkTemplateConfig {
    pub url_template: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_template: Option<String>,
}

impl From<&LinkTemplateConfig> for LinkTypeConfig {
    fn from(config: &LinkTemplateConfig) -> Self {
        Self {
            url_template: LinkTemplate::Pattern(config.url_template.clone()),
            name_template: config.name_template.clone().map(LinkTemplate::Pattern),
        }
    }
}

pub fn is_url(value: &str) -> bool {
    url::Url::parse(value).is_ok()
}

/// Apply the template registered for the link's type. Links that already hold a URL
/// are returned untouched; an explicit name is never replaced.
pub fn format_link(config: &LinkConfig, link: &Link) -> Link {
    if is_url(&link.url) {
        return link.clone();
    }

    let Some(templates) = link.link_type.as_ref().and_then(|t| config.get(t)) else {
        return link.clone();
    };

    let mut formatted = link.clone();
    formatted.url = templates.url_template.apply(&link.url);
    if formatted.name.is_none() {
        formatted.name = templates
            .name_template
            .as_ref()
            .map(|template| template.apply(&link.url));
    }
    formatted
}

pub fn format_links(config: &LinkConfig, links: &[Link]) -> Vec<Link> {
    links.iter().map(|link| format_link(config, link)).collect()
}
