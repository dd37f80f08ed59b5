//! Page enhancement: the load-time pass over a documentation page
//!
//! Applies the theme, marks active navigation links, fills the table of
//! contents and adds copy buttons in one set of edits, then re-reads the
//! result to build the search index and check same-page anchors.

use super::document::{Document, Edits, HtmlParser};
use super::search::SearchIndex;
use super::theme::{apply_theme, Theme};
use super::{copy, nav, scroll, toc, SiteError};
use crate::dashboard::{Capabilities, Target};
use globset::GlobSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct EnhanceOptions {
    /// URL path the page is served at, e.g. `/guide/`
    pub current_path: String,
    pub theme: Theme,
    /// Render with the mobile navigation expanded
    pub menu_open: bool,
}

impl Default for EnhanceOptions {
    fn default() -> Self {
        Self {
            current_path: "/".to_string(),
            theme: Theme::default(),
            menu_open: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EnhanceReport {
    pub html: String,
    /// Present when the page has both search widgets
    pub index: Option<SearchIndex>,
    pub active_links: usize,
    pub toc_entries: usize,
    pub copy_buttons: usize,
    pub unresolved_anchors: Vec<String>,
}

/// Run every page helper over `source`
pub fn enhance_page(source: &str, options: &EnhanceOptions) -> Result<EnhanceReport, SiteError> {
    let mut parser = HtmlParser::new()?;
    enhance_with(&mut parser, source, options)
}

fn enhance_with(
    parser: &mut HtmlParser,
    source: &str,
    options: &EnhanceOptions,
) -> Result<EnhanceReport, SiteError> {
    let doc = Document::parse_with(parser, source)?;
    let caps = Capabilities::from_ids(doc.elements().iter().filter_map(|e| e.id()));

    let mut edits = Edits::new();
    apply_theme(&doc, &mut edits, options.theme);
    let active_links = nav::mark_active_links(&doc, &mut edits, &options.current_path).len();
    if options.menu_open && !nav::is_menu_open(&doc) {
        nav::toggle_mobile_menu(&doc, &mut edits);
    }
    let toc_entries = toc::generate_toc(&doc, &mut edits);
    let copy_buttons = copy::add_copy_buttons(&doc, &mut edits);
    let html = edits.apply(source);

    let enhanced = Document::parse_with(parser, &html)?;
    let index = (caps.has(Target::SearchInput) && caps.has(Target::SearchResults))
        .then(|| SearchIndex::build(&enhanced));
    let unresolved_anchors = scroll::unresolved_anchors(&enhanced);

    Ok(EnhanceReport {
        html,
        index,
        active_links,
        toc_entries,
        copy_buttons,
        unresolved_anchors,
    })
}

/// URL path of `page` relative to the site `root`; `index.html` maps to its directory
pub fn current_path_for(root: &Path, page: &Path) -> String {
    let rel = page.strip_prefix(root).unwrap_or(page);
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    let joined = format!("/{}", parts.join("/"));
    match joined.strip_suffix("index.html") {
        Some(dir) => dir.to_string(),
        None => joined,
    }
}

/// Path of the search index written next to `page`
pub fn index_path_for(page: &Path) -> PathBuf {
    let stem = page
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "page".to_string());
    page.with_file_name(format!("{}.search.json", stem))
}

/// Enhance one file, writing the page to `output` and its search index beside it
pub fn enhance_file(
    input: &Path,
    output: &Path,
    options: &EnhanceOptions,
) -> Result<EnhanceReport, SiteError> {
    let mut parser = HtmlParser::new()?;
    enhance_file_with(&mut parser, input, output, options)
}

fn enhance_file_with(
    parser: &mut HtmlParser,
    input: &Path,
    output: &Path,
    options: &EnhanceOptions,
) -> Result<EnhanceReport, SiteError> {
    let source = fs::read_to_string(input).map_err(|e| SiteError::Read {
        path: input.to_path_buf(),
        source: e,
    })?;
    let report = enhance_with(parser, &source, options)?;

    let write = |path: &Path, content: &str| {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| SiteError::Write {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }
        fs::write(path, content).map_err(|e| SiteError::Write {
            path: path.to_path_buf(),
            source: e,
        })
    };

    write(output, &report.html)?;
    if let Some(index) = &report.index {
        write(&index_path_for(output), &index.to_json()?)?;
    }
    Ok(report)
}

/// HTML pages under `root`, sorted, minus ignored paths
pub fn collect_pages(root: &Path, ignore: Option<&GlobSet>) -> Vec<PathBuf> {
    let mut pages: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"))
        })
        .filter(|p| ignore.map_or(true, |set| !crate::config::is_ignored(p, set)))
        .collect();
    pages.sort();
    pages
}

/// Enhance every page under `root` in parallel.
///
/// Pages are written to the same relative path under `out_dir` (in place
/// when `out_dir` is `None`). Each page's current path is derived from its
/// location; `base` supplies the theme.
pub fn enhance_dir(
    root: &Path,
    out_dir: Option<&Path>,
    base: &EnhanceOptions,
    ignore: Option<&GlobSet>,
) -> Vec<(PathBuf, Result<EnhanceReport, SiteError>)> {
    use rayon::prelude::*;

    collect_pages(root, ignore)
        .into_par_iter()
        .map_init(HtmlParser::new, |parser, page| {
            let output = match out_dir {
                Some(out) => out.join(page.strip_prefix(root).unwrap_or(&page)),
                None => page.clone(),
            };
            let options = EnhanceOptions {
                current_path: current_path_for(root, &page),
                ..base.clone()
            };
            let result = match parser {
                Ok(parser) => enhance_file_with(parser, &page, &output, &options),
                Err(e) => Err(SiteError::Language(e.to_string())),
            };
            (page, result)
        })
        .collect()
}
