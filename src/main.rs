//! cefrl-site: PyCEFRL dashboard and documentation page CLI

use anyhow::{Context, Result};
use cefrl_site::config::{build_ignore_set, load_config, Config, CONFIG_FILENAME, DEFAULT_CONFIG};
use cefrl_site::dashboard::{render_page, Capabilities, Dashboard, DetailFilter, PageContext, Target};
use cefrl_site::export::{download_csv, export_csv, ExportError};
use cefrl_site::loader::{self, is_remote_available, DataSources, LoadOrigin, SourceLocation};
use cefrl_site::notify::{ConsoleNotifier, Notifier, RecordingNotifier, Tee};
use cefrl_site::site::document::decode_entities;
use cefrl_site::site::search::{SearchHit, SearchIndex, SearchOutcome, SearchPanel};
use cefrl_site::site::theme::{init_theme, set_theme, toggle_theme};
use cefrl_site::site::{enhance_dir, enhance_file, Document, EnhanceOptions, EnhanceReport, PreferenceStore, Theme};
use cefrl_site::state::DashboardState;
use cefrl_site::watcher::DataWatcher;
use cefrl_site::Level;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// cefrl-site: dashboard and page helpers for PyCEFRL analysis data
#[derive(Parser, Debug)]
#[command(name = "cefrl-site")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file (default: search .cefrlrc.json in current dir and parents)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Quiet mode (errors only)
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Verbose output
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render the dashboard page from the data sources
    Dashboard {
        /// Directory the data sources are resolved against
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// JSON file to load on top of the sources (summary, analysis or total data)
        #[arg(long)]
        upload: Option<PathBuf>,

        /// Only show files whose repository or name contains this text
        #[arg(long)]
        filter: Option<String>,

        /// Only show files with at least one element at this level
        #[arg(long)]
        level: Option<Level>,

        /// Output HTML file (default: <outDir>/dashboard.html)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Re-render whenever a data source changes
        #[arg(long)]
        watch: bool,
    },

    /// Write the summary as pycefrl-analysis.csv
    Export {
        /// Directory the data sources are resolved against
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// JSON file to load on top of the sources
        #[arg(long)]
        upload: Option<PathBuf>,

        /// Directory to write the CSV into
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },

    /// Search the headings and paragraphs of a page (or a saved .search.json index)
    Search {
        page: PathBuf,
        query: String,

        /// Print the results panel markup instead of plain lines
        #[arg(long)]
        html: bool,
    },

    /// Apply theme, navigation, table of contents, copy buttons and search index to pages
    Enhance {
        /// HTML file or directory of pages
        path: PathBuf,

        /// URL path of a single page (default: derived from its location, or "/")
        #[arg(long)]
        current_path: Option<String>,

        /// Output file or directory (default: rewrite in place)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Render pages with the mobile navigation menu expanded
        #[arg(long)]
        menu_open: bool,
    },

    /// Show or change the stored theme preference
    Theme {
        #[command(subcommand)]
        action: Option<ThemeAction>,
    },

    /// Create .cefrlrc.json with sensible defaults
    Init {
        /// Directory in which to create config (default: current)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum ThemeAction {
    /// Print the current theme
    Show,
    /// Switch between light and dark
    Toggle,
    /// Set the theme explicitly
    Set { theme: Theme },
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            ExitCode::from(2)
        }
    }
}

fn run() -> Result<ExitCode> {
    let args = Args::parse();
    let cwd = std::env::current_dir().context("Failed to get current directory")?;

    match &args.command {
        Commands::Init { dir } => run_init(dir.as_deref().unwrap_or(&cwd)),
        Commands::Dashboard {
            data_dir,
            upload,
            filter,
            level,
            output,
            watch,
        } => {
            let config = load_config(&cwd, args.config.as_deref())?.merge_with_cli(data_dir.clone(), None);
            let job = DashboardJob {
                upload: upload.clone(),
                filter: DetailFilter::new(filter.clone(), *level),
                output: output
                    .clone()
                    .unwrap_or_else(|| config.out_dir().join("dashboard.html")),
                config,
            };
            if *watch {
                run_watch(&args, &job)
            } else {
                job.run(&args)
            }
        }
        Commands::Export {
            data_dir,
            upload,
            out_dir,
        } => {
            let config = load_config(&cwd, args.config.as_deref())?
                .merge_with_cli(data_dir.clone(), out_dir.clone());
            run_export(&args, &config, upload.as_deref())
        }
        Commands::Search { page, query, html } => {
            let config = load_config(&cwd, args.config.as_deref())?;
            run_search(&args, &config, page, query, *html)
        }
        Commands::Enhance {
            path,
            current_path,
            output,
            menu_open,
        } => {
            let work_dir = if path.is_file() {
                path.parent().unwrap_or(Path::new("."))
            } else {
                path.as_path()
            };
            let config = load_config(work_dir, args.config.as_deref())?;
            run_enhance(&args, &config, path, current_path.clone(), *menu_open, output.as_deref())
        }
        Commands::Theme { action } => {
            let config = load_config(&cwd, args.config.as_deref())?;
            run_theme(&args, &config, action.unwrap_or(ThemeAction::Show))
        }
    }
}

/// Load the sources into a dashboard bound per the config, then apply an
/// optional upload through it. A disabled `file-upload` target ignores the upload.
fn load_dashboard(
    args: &Args,
    config: &Config,
    upload: Option<&Path>,
    notifier: &dyn Notifier,
) -> Result<Dashboard> {
    let sources = DataSources::from_config(config);
    if !is_remote_available() && !args.quiet {
        for source in [&sources.analysis, &sources.summary, &sources.total] {
            if let SourceLocation::Url(url) = source {
                eprintln!(
                    "{}: {} is a URL but this build has no `remote` feature; it will be skipped",
                    "Warning".yellow(),
                    url
                );
            }
        }
    }
    let outcome = loader::load(&sources);

    if args.verbose {
        for failure in &outcome.failures {
            eprintln!("{}: {}", "Info".blue(), failure);
        }
    }
    if outcome.origin == LoadOrigin::Demo && !args.quiet {
        eprintln!(
            "{}: No data sources could be loaded, using demo data",
            "Warning".yellow()
        );
    }

    let caps = Capabilities::from_config(config);
    let mut dashboard = Dashboard::new(outcome.state, caps, config.chart);
    if let Some(path) = upload {
        if !dashboard.capabilities().has(Target::FileUpload) {
            if args.verbose {
                eprintln!(
                    "{}: {} is disabled, ignoring {}",
                    "Info".blue(),
                    Target::FileUpload,
                    path.display()
                );
            }
            return Ok(dashboard);
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read upload: {}", path.display()))?;
        dashboard.upload(&text, notifier);
    }
    Ok(dashboard)
}

struct DashboardJob {
    config: Config,
    upload: Option<PathBuf>,
    filter: DetailFilter,
    output: PathBuf,
}

impl DashboardJob {
    fn run(&self, args: &Args) -> Result<ExitCode> {
        let console = ConsoleNotifier::new().quiet(args.quiet);
        let recorder = RecordingNotifier::new();
        let notifier = Tee(&console, &recorder);

        let dashboard = load_dashboard(args, &self.config, self.upload.as_deref(), &notifier)?
            .with_filter(self.filter.clone());
        let caps = dashboard.capabilities().clone();

        let out_dir = self.output.parent().unwrap_or(Path::new("."));
        let export_href = if caps.has(Target::ExportCsv) {
            self.write_export(dashboard.state(), out_dir)?
        } else {
            None
        };

        let prefs = PreferenceStore::open(self.config.preferences_file());
        let mut ctx = PageContext::new(caps, init_theme(&prefs));
        ctx.filter = self.filter.clone();
        ctx.export_href = export_href;
        ctx.notifications = recorder.notifications();

        let html = render_page(&dashboard.render(), &ctx);
        if !out_dir.as_os_str().is_empty() {
            std::fs::create_dir_all(out_dir)
                .with_context(|| format!("Failed to create {}", out_dir.display()))?;
        }
        std::fs::write(&self.output, html)
            .with_context(|| format!("Failed to write dashboard to {}", self.output.display()))?;

        if !args.quiet {
            eprintln!(
                "{}: Dashboard written to {}",
                "Done".green().bold(),
                self.output.display()
            );
        }

        if recorder.has_errors() {
            Ok(ExitCode::from(1))
        } else {
            Ok(ExitCode::SUCCESS)
        }
    }

    /// CSV next to the page so the export link works offline; no toast, the user did not ask
    fn write_export(&self, state: &DashboardState, out_dir: &Path) -> Result<Option<String>> {
        let csv = match export_csv(state) {
            Ok(csv) => csv,
            Err(_) => return Ok(None),
        };
        let filename = self.config.export_filename();
        let path = out_dir.join(filename);
        if !out_dir.as_os_str().is_empty() {
            std::fs::create_dir_all(out_dir)
                .with_context(|| format!("Failed to create {}", out_dir.display()))?;
        }
        std::fs::write(&path, csv).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(Some(filename.to_string()))
    }
}

fn run_watch(args: &Args, job: &DashboardJob) -> Result<ExitCode> {
    job.run(args)?;

    let sources = DataSources::from_config(&job.config);
    let mut watched = sources.paths();
    if let Some(upload) = &job.upload {
        watched.push(upload.clone());
    }
    let watcher = DataWatcher::watch(&watched).context("Failed to create file watcher")?;
    if watcher.watched_dirs().is_empty() {
        eprintln!(
            "{}: None of the data source directories exist; nothing to watch",
            "Warning".yellow()
        );
        return Ok(ExitCode::from(2));
    }
    eprintln!("{}: Watching for changes... (Ctrl+C to stop)", "Info".blue());

    loop {
        rerender_on_change(args, job, &watcher);
    }
}

/// Wait for one batch of source changes and render again. Returns whether a
/// tracked source changed; render errors are reported and watching goes on.
fn rerender_on_change(args: &Args, job: &DashboardJob, watcher: &DataWatcher) -> bool {
    let changed = watcher.next_changes();
    if changed.is_empty() {
        return false;
    }
    if args.verbose {
        for path in &changed {
            eprintln!("{}: Changed {}", "Info".blue(), path.display());
        }
    }
    if let Err(e) = job.run(args) {
        eprintln!("{}: {:#}", "Error".red(), e);
    }
    true
}

fn run_export(args: &Args, config: &Config, upload: Option<&Path>) -> Result<ExitCode> {
    let console = ConsoleNotifier::new().quiet(args.quiet);
    let recorder = RecordingNotifier::new();
    let notifier = Tee(&console, &recorder);

    let dashboard = load_dashboard(args, config, upload, &notifier)?;
    match download_csv(dashboard.state(), &config.out_dir(), config.export_filename(), &notifier) {
        Ok(path) => {
            if args.verbose {
                eprintln!("{}: Wrote {}", "Info".blue(), path.display());
            }
        }
        Err(ExportError::NoData) => return Ok(ExitCode::from(1)),
        Err(ExportError::Write { .. }) => return Ok(ExitCode::from(2)),
    }

    if recorder.has_errors() {
        Ok(ExitCode::from(1))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn run_search(args: &Args, config: &Config, page: &Path, query: &str, html: bool) -> Result<ExitCode> {
    let content = std::fs::read_to_string(page)
        .with_context(|| format!("Failed to read {}", page.display()))?;
    let is_index = page.extension().is_some_and(|e| e == "json");
    let index = if is_index {
        SearchIndex::from_json(&content)
            .with_context(|| format!("Invalid search index: {}", page.display()))?
    } else {
        let doc = Document::parse(&content).with_context(|| format!("Failed to parse {}", page.display()))?;
        SearchIndex::build(&doc)
    };

    let mut panel = SearchPanel::new();
    let outcome = panel.input(&index, query, config.search);
    if html {
        print!("{}", panel.html());
        return Ok(ExitCode::SUCCESS);
    }

    match outcome {
        SearchOutcome::Hidden => {
            if !args.quiet {
                eprintln!(
                    "{}: Query must be at least {} characters",
                    "Info".blue(),
                    config.search.min_query_length
                );
            }
        }
        SearchOutcome::NoResults => println!("No results found"),
        SearchOutcome::Hits(hits) => {
            for hit in &hits {
                println!("{}", format_hit(hit));
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// One terminal line per hit, matches highlighted
fn format_hit(hit: &SearchHit) -> String {
    let mut line = format!("{}: ", hit.kind.to_string().bold());
    for (i, part) in hit.snippet.split("<mark>").enumerate() {
        if i == 0 {
            line.push_str(&decode_entities(part));
            continue;
        }
        let (marked, rest) = part.split_once("</mark>").unwrap_or((part, ""));
        line.push_str(&decode_entities(marked).yellow().bold().to_string());
        line.push_str(&decode_entities(rest));
    }
    if let Some(anchor) = &hit.anchor {
        line.push_str(&format!(" {}", format!("#{}", anchor).dimmed()));
    }
    line
}

fn run_enhance(
    args: &Args,
    config: &Config,
    path: &Path,
    current_path: Option<String>,
    menu_open: bool,
    output: Option<&Path>,
) -> Result<ExitCode> {
    let prefs = PreferenceStore::open(config.preferences_file());
    let base = EnhanceOptions {
        current_path: current_path.unwrap_or_else(|| "/".to_string()),
        theme: init_theme(&prefs),
        menu_open,
    };

    let results = if path.is_file() {
        let out = output.unwrap_or(path);
        vec![(path.to_path_buf(), enhance_file(path, out, &base))]
    } else if path.is_dir() {
        let ignore_set = if config.ignore.is_empty() {
            None
        } else {
            Some(build_ignore_set(&config.ignore)?)
        };
        enhance_dir(path, output, &base, ignore_set.as_ref())
    } else {
        anyhow::bail!("Path does not exist: {}", path.display());
    };

    if results.is_empty() {
        eprintln!("{}: No HTML pages found", "Warning".yellow());
        return Ok(ExitCode::from(2));
    }

    let mut failed = 0;
    for (page, result) in &results {
        match result {
            Ok(report) => report_page(args, page, report),
            Err(e) => {
                failed += 1;
                eprintln!("{}: {}: {}", "Error".red(), page.display(), e);
            }
        }
    }

    if !args.quiet {
        eprintln!(
            "{}: Enhanced {} of {} page(s)",
            "Done".green().bold(),
            results.len() - failed,
            results.len()
        );
    }
    if failed > 0 {
        Ok(ExitCode::from(2))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn report_page(args: &Args, page: &Path, report: &EnhanceReport) {
    if args.quiet {
        return;
    }
    for anchor in &report.unresolved_anchors {
        eprintln!(
            "{}: {}: link to {} has no target",
            "Warning".yellow(),
            page.display(),
            anchor
        );
    }
    if args.verbose {
        eprintln!(
            "{}: {}: {} active link(s), {} toc entries, {} copy button(s), {} indexed",
            "Info".blue(),
            page.display(),
            report.active_links,
            report.toc_entries,
            report.copy_buttons,
            report.index.as_ref().map_or(0, |i| i.len())
        );
    }
}

fn run_theme(args: &Args, config: &Config, action: ThemeAction) -> Result<ExitCode> {
    let mut store = PreferenceStore::open(config.preferences_file());
    let theme = match action {
        ThemeAction::Show => init_theme(&store),
        ThemeAction::Toggle => toggle_theme(&mut store)
            .with_context(|| format!("Failed to save {}", store.path().display()))?,
        ThemeAction::Set { theme } => {
            set_theme(&mut store, theme)
                .with_context(|| format!("Failed to save {}", store.path().display()))?;
            theme
        }
    };
    println!("{}", theme);
    if args.verbose {
        eprintln!("{}: {} {}", "Info".blue(), theme.toggle_icon(), theme.toggle_label());
    }
    Ok(ExitCode::SUCCESS)
}

fn run_init(dir: &Path) -> Result<ExitCode> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() {
        eprintln!(
            "{}: {} already exists; use --dir to write elsewhere or remove it first",
            "Warning".yellow(),
            config_path.display()
        );
        return Ok(ExitCode::SUCCESS);
    }

    std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    std::fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

    eprintln!(
        "{}: Created {}",
        "Done".green().bold(),
        config_path.display()
    );
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cefrl_site::site::search::EntryKind;

    #[test]
    fn test_format_hit_decodes_and_keeps_text() {
        colored::control::set_override(false);
        let hit = SearchHit {
            kind: EntryKind::P,
            anchor: Some("intro".into()),
            snippet: "A &lt;b&gt; <mark>cat</mark>egory...".into(),
        };
        assert_eq!(format_hit(&hit), "p: A <b> category... #intro");
    }

    #[test]
    fn test_watch_rerenders_after_source_change() {
        let dir = tempfile::TempDir::new().unwrap();
        let data = dir.path().join("DATA_JSON");
        std::fs::create_dir_all(&data).unwrap();
        let summary = data.join("summary_data.json");
        std::fs::write(&summary, r#"{"Levels":{"A1":4}}"#).unwrap();

        let args = Args::try_parse_from(["cefrl-site", "--quiet", "dashboard"]).unwrap();
        let config = Config::default().merge_with_cli(Some(dir.path().to_path_buf()), None);
        let job = DashboardJob {
            config,
            upload: None,
            filter: DetailFilter::default(),
            output: dir.path().join("out/dashboard.html"),
        };
        job.run(&args).unwrap();
        let html = std::fs::read_to_string(&job.output).unwrap();
        assert!(html.contains("Level A1 (100.0%)"));

        let watcher = DataWatcher::watch(&DataSources::from_config(&job.config).paths()).unwrap();
        let writer = std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_millis(200));
            std::fs::write(&summary, r#"{"Levels":{"A1":1,"C2":3}}"#).unwrap();
        });
        let rerendered = (0..5).any(|_| rerender_on_change(&args, &job, &watcher));
        writer.join().unwrap();
        assert!(rerendered);

        let html = std::fs::read_to_string(&job.output).unwrap();
        assert!(html.contains("Level C2 (75.0%)"));
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from(["cefrl-site", "dashboard", "--level", "b1", "--filter", "flask"]).unwrap();
        match args.command {
            Commands::Dashboard { level, filter, .. } => {
                assert_eq!(level, Some(Level::B1));
                assert_eq!(filter.as_deref(), Some("flask"));
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert!(Args::try_parse_from(["cefrl-site", "dashboard", "--level", "D9"]).is_err());
        let args = Args::try_parse_from(["cefrl-site", "theme", "set", "dark", "--quiet"]).unwrap();
        assert!(args.quiet);
    }
}
