use crate::config::Config;
use crate::error::PruneError;
use crate::files::resolve_inputs;
use crate::style::css_matcher;
use crate::style::rewriter::{self, Rewrite};
use crate::style::stylesheet;
use crate::usage::{UsageSet, UsageSetBuilder};
use log::{info, warn};
use rayon::prelude::*;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Removes the rules of `css` that `usage` shows to be unreferenced.
pub fn prune_text(css: &str, usage: &UsageSet) -> Rewrite {
    let sheet = stylesheet::parse(css);
    let plan = css_matcher::plan(&sheet, usage);
    rewriter::rewrite(&sheet, &plan)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PruneOptions {
    pub backup: bool,
    pub backup_suffix: String,
    /// Compute the result without writing anything.
    pub dry_run: bool,
}

impl Default for PruneOptions {
    fn default() -> Self {
        Self {
            backup: true,
            backup_suffix: ".backup".to_string(),
            dry_run: false,
        }
    }
}

impl PruneOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            backup: config.backup,
            backup_suffix: config.backup_suffix.clone(),
            dry_run: false,
        }
    }
}

/// What happened to one stylesheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StylesheetReport {
    pub path: PathBuf,
    pub removed: usize,
    pub original_bytes: usize,
    pub new_bytes: usize,
    pub backup: Option<PathBuf>,
}

impl StylesheetReport {
    pub fn changed(&self) -> bool {
        self.removed > 0
    }

    pub fn reduction_percent(&self) -> f64 {
        if self.original_bytes == 0 {
            return 0.0;
        }
        (self.original_bytes - self.new_bytes) as f64 / self.original_bytes as f64 * 100.0
    }
}

/// Everything a full run produced.
#[derive(Debug)]
pub struct RunSummary {
    pub usage_tokens: usize,
    /// Requested verification tokens and whether each was found.
    pub verified: Vec<(String, bool)>,
    pub reports: Vec<Result<StylesheetReport, PruneError>>,
}

impl RunSummary {
    pub fn total_removed(&self) -> usize {
        self.reports
            .iter()
            .filter_map(|report| report.as_ref().ok())
            .map(|report| report.removed)
            .sum()
    }
}

/// Builds the usage set from markup and script files. Files that cannot be
/// read are skipped with a warning; invalid UTF-8 is replaced.
pub fn build_usage_set<S: AsRef<str>>(
    markup: &[PathBuf],
    scripts: &[PathBuf],
    always_keep: &[S],
) -> UsageSet {
    let mut builder = UsageSetBuilder::new(always_keep.iter().map(|token| token.as_ref()));

    for path in markup {
        if let Some(text) = read_lossy(path) {
            builder.add_markup(&text);
        }
    }
    for path in scripts {
        if let Some(text) = read_lossy(path) {
            builder.add_script(&text);
        }
    }

    let usage = builder.build();
    if usage.is_empty() {
        warn!("no used selectors found; every class or id rule will be removed");
    } else {
        info!("found {} used selectors", usage.len());
    }
    usage
}

fn read_lossy(path: &Path) -> Option<String> {
    match fs::read(path) {
        Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Err(err) => {
            warn!("skipping {}: {}", path.display(), err);
            None
        }
    }
}

/// Reports which of `tokens` the usage set contains.
pub fn verify_tokens<S: AsRef<str>>(usage: &UsageSet, tokens: &[S]) -> Vec<(String, bool)> {
    tokens
        .iter()
        .map(|token| {
            let token = token.as_ref();
            (token.to_string(), usage.contains(token))
        })
        .collect()
}

/// Prunes one stylesheet on disk.
///
/// The file must be valid UTF-8 so that every kept byte can be written back
/// unchanged. When something is removed the original is copied to
/// `<path><backup_suffix>` first (if enabled) and the file is overwritten,
/// unless this is a dry run.
pub fn prune_file(
    path: &Path,
    usage: &UsageSet,
    options: &PruneOptions,
) -> Result<StylesheetReport, PruneError> {
    let original = fs::read_to_string(path).map_err(|source| PruneError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let mut report = StylesheetReport {
        path: path.to_path_buf(),
        removed: 0,
        original_bytes: original.len(),
        new_bytes: original.len(),
        backup: None,
    };

    let Rewrite::Changed { text, removed } = prune_text(&original, usage) else {
        info!("{}: no unused rules", path.display());
        return Ok(report);
    };
    report.removed = removed;
    report.new_bytes = text.len();
    info!(
        "{}: removed {} unused rules ({} -> {} bytes)",
        path.display(),
        removed,
        report.original_bytes,
        report.new_bytes
    );

    if options.dry_run {
        return Ok(report);
    }

    if options.backup {
        let backup = backup_path(path, &options.backup_suffix);
        write_file(&backup, &original)?;
        report.backup = Some(backup);
    }
    write_file(path, &text)?;

    Ok(report)
}

/// Prunes stylesheets in parallel. Results keep the order of `paths`.
pub fn prune_files(
    paths: &[PathBuf],
    usage: &UsageSet,
    options: &PruneOptions,
) -> Vec<Result<StylesheetReport, PruneError>> {
    paths
        .par_iter()
        .map(|path| prune_file(path, usage, options))
        .collect()
}

/// Resolves every input of `config`, builds the usage set and prunes the
/// stylesheets.
pub fn run(config: &Config, options: &PruneOptions) -> Result<RunSummary, PruneError> {
    let stylesheets = resolve_inputs(&config.stylesheets)?;
    if stylesheets.is_empty() {
        return Err(PruneError::NoStylesheets);
    }
    let markup = resolve_inputs(&config.markup)?;
    let scripts = resolve_inputs(&config.scripts)?;

    let usage = build_usage_set(&markup, &scripts, &config.always_keep);
    let verified = verify_tokens(&usage, &config.verify);
    let reports = prune_files(&stylesheets, &usage, options);

    Ok(RunSummary {
        usage_tokens: usage.len(),
        verified,
        reports,
    })
}

fn backup_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

fn write_file(path: &Path, contents: &str) -> Result<(), PruneError> {
    fs::write(path, contents).map_err(|source| PruneError::Write {
        path: path.to_path_buf(),
        source,
    })
}
