use crate::error::PruneError;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Element selectors that are always considered referenced.
pub const DEFAULT_ALWAYS_KEEP: &[&str] = &[
    "body", "html", "*", "a", "p", "h1", "h2", "h3", "h4", "h5", "h6", "div", "span", "ul", "li",
    "img", "button", "input", "form", "nav", "section", "article", "header", "footer", "main",
    "table", "tr", "td", "th", "thead", "tbody", "tfoot", "ol", "dl", "dt", "dd", "label", "select",
    "textarea", "svg", "path", "circle", "rect", "line", "polyline", "polygon", "ellipse", "time",
    "strong", "em", "b", "i", "u", "small", "sub", "sup", "code", "pre", "blockquote", "hr", "br",
];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTML files or glob patterns scanned for references.
    pub markup: Vec<String>,
    /// Script files or glob patterns scanned for references.
    pub scripts: Vec<String>,
    /// Stylesheets to prune.
    pub stylesheets: Vec<String>,
    pub always_keep: Vec<String>,
    /// Tokens whose presence in the usage set is reported before pruning.
    pub verify: Vec<String>,
    /// Write the original text next to each changed stylesheet.
    pub backup: bool,
    pub backup_suffix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            markup: Vec::new(),
            scripts: Vec::new(),
            stylesheets: Vec::new(),
            always_keep: DEFAULT_ALWAYS_KEEP.iter().map(|tag| tag.to_string()).collect(),
            verify: Vec::new(),
            backup: true,
            backup_suffix: default_backup_suffix(),
        }
    }
}

fn default_backup_suffix() -> String {
    ".backup".to_string()
}

pub fn load(path: &Path) -> Result<Config, PruneError> {
    let text = fs::read_to_string(path).map_err(|source| PruneError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&text).map_err(|source| PruneError::Config {
        path: path.to_path_buf(),
        source,
    })
}
