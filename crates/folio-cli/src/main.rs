mod prefs;
mod ui;

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use folio_core::actions::PortfolioAction;
use folio_core::actions::RuntimeAction;
use folio_core::actions::UserAction;
use folio_core::config::SiteConfig;
use folio_core::github::build_projects_document;
use folio_core::github::parse_repos;
use folio_core::reducer::reduce;
use folio_core::resume::build_resume_tiles;
use folio_core::resume::parse_resume;
use folio_core::resume::ResumeDetails;
use folio_core::resume::RESUME_DETAILS_FILE;
use folio_core::sources::load_site;
use folio_core::sources::SourceError;
use folio_core::sources::GITHUB_PROJECTS_FILE;
use folio_core::sources::RESUME_TILES_FILE;
use folio_core::sources::SITE_CONFIG_FILE;
use folio_core::state::LogLevel;
use folio_core::state::PortfolioState;
use folio_core::theme::ThemeMode;
use folio_render::measure::probe_images;
use folio_render::measure::static_layout;
use folio_render::measure::HeightModel;
use folio_render::page::DEFAULT_STYLESHEET;
use folio_render::page::STYLESHEET_FILE;
use folio_render::render_detail_page;
use folio_render::render_page;

use crate::prefs::Preferences;

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);
    let Some(command) = args.next() else {
        print_help();
        return Ok(());
    };

    match command.as_str() {
        "--help" | "-h" | "help" => {
            print_help();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("folio {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "build" => {
            let site = parse_site_args(args.collect(), ArgSet::Build)?;
            build(site, &Preferences::load_default()?)
        }
        "list" => {
            let site = parse_site_args(args.collect(), ArgSet::Filters)?;
            list(site, &Preferences::load_default()?)
        }
        "tags" => {
            let site = parse_site_args(args.collect(), ArgSet::DataOnly)?;
            tags(site, &Preferences::load_default()?)
        }
        "browse" => {
            let site = parse_site_args(args.collect(), ArgSet::Filters)?;
            browse(site, &Preferences::load_default()?)
        }
        "import-github" => {
            let import = parse_import_args(args.collect(), "import-github")?;
            import_github(import, &Preferences::load_default()?)
        }
        "import-resume" => {
            let import = parse_import_args(args.collect(), "import-resume")?;
            import_resume(import, &Preferences::load_default()?)
        }
        "theme" => theme(args.next()),
        _ => {
            print_help();
            Err(format!("unknown command: {command}").into())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArgSet {
    Build,
    Filters,
    DataOnly,
}

#[derive(Debug, Default, PartialEq, Eq)]
struct SiteArgs {
    data: Option<PathBuf>,
    out: Option<PathBuf>,
    tags: Vec<String>,
    search: Option<String>,
    sort: Option<String>,
}

fn parse_site_args(args: Vec<String>, set: ArgSet) -> Result<SiteArgs, Box<dyn std::error::Error>> {
    let mut site = SiteArgs::default();
    let filters = matches!(set, ArgSet::Build | ArgSet::Filters);
    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        let value = args.get(i + 1).cloned();
        match flag {
            "--data" => {
                let Some(value) = value else {
                    return Err("--data requires a directory".into());
                };
                site.data = Some(PathBuf::from(value));
            }
            "--out" if set == ArgSet::Build => {
                let Some(value) = value else {
                    return Err("--out requires a directory".into());
                };
                site.out = Some(PathBuf::from(value));
            }
            "--tag" if filters => {
                let Some(value) = value else {
                    return Err("--tag requires a value".into());
                };
                site.tags.push(value);
            }
            "--search" if filters => {
                let Some(value) = value else {
                    return Err("--search requires a query".into());
                };
                site.search = Some(value);
            }
            "--sort" if filters => {
                let Some(value) = value else {
                    return Err("--sort requires a key".into());
                };
                site.sort = Some(value);
            }
            other => {
                return Err(format!("unsupported argument: {other}").into());
            }
        }
        i += 2;
    }
    Ok(site)
}

#[derive(Debug, PartialEq, Eq)]
struct ImportArgs {
    input: PathBuf,
    root: Option<PathBuf>,
    data: Option<PathBuf>,
    out: Option<PathBuf>,
}

impl ImportArgs {
    /// `--data` wins, then the preferences file, then `<root>/_data`. The
    /// site root defaults to the parent of the data directory.
    fn dirs(&self, prefs: &Preferences) -> (PathBuf, PathBuf) {
        let data_dir = self
            .data
            .clone()
            .or_else(|| prefs.data_dir.clone())
            .or_else(|| self.root.as_ref().map(|root| root.join("_data")))
            .unwrap_or_else(|| prefs.data_dir());
        let root = self.root.clone().unwrap_or_else(|| site_root(&data_dir));
        (root, data_dir)
    }
}

fn parse_import_args(
    args: Vec<String>,
    command: &str,
) -> Result<ImportArgs, Box<dyn std::error::Error>> {
    let mut input = None;
    let mut root = None;
    let mut data = None;
    let mut out = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => {
                let Some(value) = args.get(i + 1) else {
                    return Err("--input requires a path".into());
                };
                input = Some(PathBuf::from(value));
                i += 2;
            }
            "--root" => {
                let Some(value) = args.get(i + 1) else {
                    return Err("--root requires a directory".into());
                };
                root = Some(PathBuf::from(value));
                i += 2;
            }
            "--data" => {
                let Some(value) = args.get(i + 1) else {
                    return Err("--data requires a directory".into());
                };
                data = Some(PathBuf::from(value));
                i += 2;
            }
            "--out" => {
                let Some(value) = args.get(i + 1) else {
                    return Err("--out requires a path".into());
                };
                out = Some(PathBuf::from(value));
                i += 2;
            }
            other => {
                return Err(format!("unsupported argument: {other}").into());
            }
        }
    }
    let Some(input) = input else {
        return Err(format!("{command} requires --input").into());
    };
    Ok(ImportArgs {
        input,
        root,
        data,
        out,
    })
}

/// Loads the data directory into a fresh session. A failed load still
/// returns the session, carrying the error banner, next to the error.
fn open_session(data_dir: &Path) -> (PortfolioState, Option<SourceError>) {
    let mut state = PortfolioState::new(SiteConfig::default(), ThemeMode::Auto);
    let failure = match load_site(data_dir) {
        Ok(site) => {
            reduce(
                &mut state,
                PortfolioAction::Runtime(RuntimeAction::TilesLoaded(site)),
            );
            None
        }
        Err(err) => {
            reduce(
                &mut state,
                PortfolioAction::Runtime(RuntimeAction::LoadFailed(err.to_string())),
            );
            Some(err)
        }
    };
    state.theme = initial_theme(&state.config);
    (state, failure)
}

fn initial_theme(config: &SiteConfig) -> ThemeMode {
    match prefs::open_theme_store() {
        Ok(store) => store.load_or(config.theme.default),
        Err(_) => config.theme.default,
    }
}

fn apply_filters(state: &mut PortfolioState, site: &SiteArgs) {
    if let Some(sort) = &site.sort {
        reduce(state, PortfolioAction::User(UserAction::SetSort(sort.clone())));
    }
    for tag in &site.tags {
        if !state.filters.is_tag_active(tag) {
            reduce(state, PortfolioAction::User(UserAction::ToggleTag(tag.clone())));
        }
    }
    if let Some(search) = &site.search {
        state.search_draft.clone_from(search);
        reduce(
            state,
            PortfolioAction::Runtime(RuntimeAction::CommitSearch(search.clone())),
        );
    }
}

/// Prints warnings and errors from the session log.
fn drain_logs(state: &PortfolioState) {
    for entry in state.logs.since(0, LogLevel::Warn) {
        match &entry.context {
            Some(context) => eprintln!(
                "{} [{}] {context}: {}",
                entry.level.label(),
                entry.source.label(),
                entry.message
            ),
            None => eprintln!(
                "{} [{}] {}",
                entry.level.label(),
                entry.source.label(),
                entry.message
            ),
        }
    }
}

fn site_root(data_dir: &Path) -> PathBuf {
    match data_dir.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn build(site: SiteArgs, prefs: &Preferences) -> Result<(), Box<dyn std::error::Error>> {
    let data_dir = site.data.clone().unwrap_or_else(|| prefs.data_dir());
    let out_dir = site.out.clone().unwrap_or_else(|| prefs.out_dir());
    let (mut state, failure) = open_session(&data_dir);
    apply_filters(&mut state, &site);

    let gate = probe_images(state.tiles.as_slice(), &site_root(&data_dir));
    for id in gate.failed() {
        eprintln!("warn [layout] image for `{id}` is missing; laid out without it");
    }
    let spans = static_layout(&state, &gate, &HeightModel::default(), &state.config.layout);
    let html = render_page(&state, &spans);

    fs::create_dir_all(&out_dir)?;
    fs::write(out_dir.join("index.html"), html)?;
    fs::write(out_dir.join(STYLESHEET_FILE), DEFAULT_STYLESHEET)?;
    if let Err(err) = write_detail_pages(&state, &data_dir, &out_dir) {
        eprintln!("warn [build] resume detail pages skipped: {err}");
    }
    drain_logs(&state);

    if let Some(err) = failure {
        return Err(err.into());
    }
    println!(
        "built {} tiles ({} visible) into {}",
        state.tiles.len(),
        state.view.order.len(),
        out_dir.display()
    );
    Ok(())
}

/// Writes one page per entry in `resume-details.yml`, where the resume tiles
/// link to. Nothing to do when the file is absent or resume data is off.
fn write_detail_pages(
    state: &PortfolioState,
    data_dir: &Path,
    out_dir: &Path,
) -> Result<usize, Box<dyn std::error::Error>> {
    let path = data_dir.join(RESUME_DETAILS_FILE);
    if !state.config.resume_enabled() || !path.is_file() {
        return Ok(0);
    }
    let text = fs::read_to_string(&path)?;
    let details = ResumeDetails::from_yaml_str(&text)?;
    for entry in &details.entries {
        let page = out_dir.join(entry.page_path());
        if let Some(parent) = page.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(
            page,
            render_detail_page(entry, &state.config.title, state.theme),
        )?;
    }
    Ok(details.entries.len())
}

fn list(site: SiteArgs, prefs: &Preferences) -> Result<(), Box<dyn std::error::Error>> {
    let data_dir = site.data.clone().unwrap_or_else(|| prefs.data_dir());
    let (mut state, failure) = open_session(&data_dir);
    drain_logs(&state);
    if let Some(err) = failure {
        return Err(err.into());
    }
    apply_filters(&mut state, &site);
    for tile in state.visible_tiles() {
        let tags = tile.merged_tags().join(",");
        println!(
            "{:>5}  {:<10} {:<32} {}",
            tile.priority,
            tile.kind.label(),
            tile.id,
            tags
        );
    }
    println!(
        "{} of {} tiles, sorted by {}",
        state.view.order.len(),
        state.tiles.len(),
        state.filters.sort.label()
    );
    Ok(())
}

fn tags(site: SiteArgs, prefs: &Preferences) -> Result<(), Box<dyn std::error::Error>> {
    let data_dir = site.data.unwrap_or_else(|| prefs.data_dir());
    let (state, failure) = open_session(&data_dir);
    drain_logs(&state);
    if let Some(err) = failure {
        return Err(err.into());
    }
    for option in &state.tag_options {
        let marker = if option.pinned { "*" } else { " " };
        if option.label == option.value {
            println!("{marker} {:<24} {}", option.value, option.count);
        } else {
            println!(
                "{marker} {:<24} {} ({})",
                option.value, option.count, option.label
            );
        }
    }
    Ok(())
}

fn browse(site: SiteArgs, prefs: &Preferences) -> Result<(), Box<dyn std::error::Error>> {
    let data_dir = site.data.clone().unwrap_or_else(|| prefs.data_dir());
    let theme_store = prefs::open_theme_store().ok();
    let stored_theme = theme_store
        .as_ref()
        .and_then(|store| store.load().ok().flatten());
    let launch = ui::Launch {
        data_dir,
        tags: site.tags,
        search: site.search,
        sort: site.sort,
        stored_theme,
        prefers_dark: prefs.prefers_dark(),
    };
    ui::run(launch, theme_store)
}

/// The site config next to the data files, or the defaults when there is none.
fn read_site_config(data_dir: &Path) -> Result<SiteConfig, Box<dyn std::error::Error>> {
    match fs::read_to_string(data_dir.join(SITE_CONFIG_FILE)) {
        Ok(text) => Ok(SiteConfig::from_yaml_str(&text)?),
        Err(_) => Ok(SiteConfig::default()),
    }
}

fn write_data_file(path: &Path, contents: String) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    Ok(())
}

fn import_github(import: ImportArgs, prefs: &Preferences) -> Result<(), Box<dyn std::error::Error>> {
    let json = fs::read_to_string(&import.input)
        .map_err(|err| format!("read {}: {err}", import.input.display()))?;
    let repos = parse_repos(&json)?;

    let (root, data_dir) = import.dirs(prefs);
    let curated = read_site_config(&data_dir)?.curated_repos;

    let listed = repos.len();
    let document = build_projects_document(repos, &curated, Some(&root), chrono::Utc::now());
    let out = import
        .out
        .unwrap_or_else(|| data_dir.join(GITHUB_PROJECTS_FILE));
    write_data_file(&out, document.to_yaml()?)?;
    println!(
        "wrote {} of {listed} repositories to {}",
        document.metadata.total_repos,
        out.display()
    );
    Ok(())
}

/// Existing resume files are left alone when the page yields no entries or
/// the site has resume data switched off.
fn import_resume(import: ImportArgs, prefs: &Preferences) -> Result<(), Box<dyn std::error::Error>> {
    let html = fs::read_to_string(&import.input)
        .map_err(|err| format!("read {}: {err}", import.input.display()))?;
    let (_, data_dir) = import.dirs(prefs);
    if !read_site_config(&data_dir)?.resume_enabled() {
        println!("resume data is disabled in {SITE_CONFIG_FILE}; nothing written");
        return Ok(());
    }

    let resume = parse_resume(&html)?;
    if resume.is_empty() {
        eprintln!(
            "warn [import] no experience or education entries in {}; keeping existing resume data",
            import.input.display()
        );
        return Ok(());
    }

    let now = chrono::Utc::now();
    let document = build_resume_tiles(&resume, now);
    let out = import
        .out
        .unwrap_or_else(|| data_dir.join(RESUME_TILES_FILE));
    let details = match out.parent() {
        Some(parent) => parent.join(RESUME_DETAILS_FILE),
        None => PathBuf::from(RESUME_DETAILS_FILE),
    };
    write_data_file(&out, document.to_yaml()?)?;
    write_data_file(&details, ResumeDetails::new(&resume, now).to_yaml()?)?;
    println!(
        "wrote {} resume tiles to {}",
        document.metadata.total_tiles,
        out.display()
    );
    Ok(())
}

fn theme(value: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let store = prefs::open_theme_store()?;
    match value {
        None => {
            let current = store.load()?;
            match current {
                Some(mode) => println!("{}", mode.label()),
                None => println!("{} (default)", ThemeMode::default().label()),
            }
            Ok(())
        }
        Some(value) => {
            let Some(mode) = ThemeMode::parse(&value) else {
                return Err(format!("unknown theme: {value} (expected light, dark or auto)").into());
            };
            store.save(mode)?;
            println!("theme set to {}", mode.label());
            Ok(())
        }
    }
}

fn print_help() {
    println!("folio {}", env!("CARGO_PKG_VERSION"));
    println!("Usage:");
    println!("  folio build [--data DIR] [--out DIR] [--tag TAG]... [--search QUERY] [--sort KEY]");
    println!("  folio list [--data DIR] [--tag TAG]... [--search QUERY] [--sort KEY]");
    println!("  folio tags [--data DIR]");
    println!("  folio browse [--data DIR] [--tag TAG]... [--search QUERY] [--sort KEY]");
    println!("  folio import-github --input FILE [--root DIR] [--data DIR] [--out FILE]");
    println!("  folio import-resume --input FILE [--root DIR] [--data DIR] [--out FILE]");
    println!("  folio theme [light|dark|auto]");
    println!("  folio --help");
    println!("  folio --version");
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn build_args_collect_repeated_tags() {
        let site = parse_site_args(
            args(&["--data", "d", "--tag", "rust", "--tag", "go", "--sort", "stars"]),
            ArgSet::Build,
        )
        .unwrap();
        assert_eq!(
            site,
            SiteArgs {
                data: Some(PathBuf::from("d")),
                out: None,
                tags: vec!["rust".to_string(), "go".to_string()],
                search: None,
                sort: Some("stars".to_string()),
            }
        );
    }

    #[test]
    fn tags_command_rejects_filter_flags() {
        let err = parse_site_args(args(&["--tag", "rust"]), ArgSet::DataOnly).unwrap_err();
        assert_eq!(err.to_string(), "unsupported argument: --tag");
    }

    #[test]
    fn out_is_only_for_build() {
        assert!(parse_site_args(args(&["--out", "x"]), ArgSet::Filters).is_err());
        assert!(parse_site_args(args(&["--out", "x"]), ArgSet::Build).is_ok());
    }

    #[test]
    fn missing_flag_value_is_reported() {
        let err = parse_site_args(args(&["--data"]), ArgSet::Filters).unwrap_err();
        assert_eq!(err.to_string(), "--data requires a directory");
    }

    #[test]
    fn import_requires_input() {
        let err = parse_import_args(args(&["--root", "."]), "import-github").unwrap_err();
        assert_eq!(err.to_string(), "import-github requires --input");
        let err = parse_import_args(Vec::new(), "import-resume").unwrap_err();
        assert_eq!(err.to_string(), "import-resume requires --input");
        let import = parse_import_args(args(&["--input", "repos.json"]), "import-github").unwrap();
        assert_eq!(import.root, None);
        assert_eq!(import.out, None);
    }

    #[test]
    fn import_dirs_follow_preferences() {
        let prefs = Preferences {
            data_dir: Some(PathBuf::from("site/content")),
            ..Preferences::default()
        };
        let import = parse_import_args(args(&["--input", "repos.json"]), "import-github").unwrap();
        assert_eq!(
            import.dirs(&prefs),
            (PathBuf::from("site"), PathBuf::from("site/content"))
        );

        let rooted =
            parse_import_args(args(&["--input", "repos.json", "--root", "web"]), "import-github")
                .unwrap();
        assert_eq!(
            rooted.dirs(&Preferences::default()),
            (PathBuf::from("web"), PathBuf::from("web/_data"))
        );
        assert_eq!(rooted.dirs(&prefs).1, PathBuf::from("site/content"));

        let explicit = parse_import_args(
            args(&["--input", "repos.json", "--data", "d"]),
            "import-github",
        )
        .unwrap();
        assert_eq!(explicit.dirs(&prefs), (PathBuf::from("."), PathBuf::from("d")));
    }

    #[test]
    fn github_import_writes_into_the_preferred_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("content");
        let input = dir.path().join("repos.json");
        fs::write(
            &input,
            r#"[{"name":"folio","html_url":"https://github.com/avery/folio","stargazers_count":1}]"#,
        )
        .unwrap();
        let prefs = Preferences {
            data_dir: Some(data_dir.clone()),
            ..Preferences::default()
        };
        let import = ImportArgs {
            input,
            root: None,
            data: None,
            out: None,
        };
        import_github(import, &prefs).unwrap();
        assert!(data_dir.join(GITHUB_PROJECTS_FILE).is_file());
    }

    const RESUME_PAGE: &str = r#"<section class="experience"><article class="job"><header class="job-header"><h3>Acme</h3><div class="job-title">Engineer</div></header><p>Shipped it.</p></article></section>"#;

    fn resume_import(dir: &Path, html: &str) -> ImportArgs {
        let input = dir.join("resume.html");
        fs::write(&input, html).unwrap();
        ImportArgs {
            input,
            root: None,
            data: Some(dir.join("_data")),
            out: None,
        }
    }

    #[test]
    fn resume_import_writes_tiles_and_details() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("_data");
        import_resume(resume_import(dir.path(), RESUME_PAGE), &Preferences::default()).unwrap();

        let tiles = fs::read_to_string(data_dir.join(RESUME_TILES_FILE)).unwrap();
        assert!(tiles.contains("id: experience-acme"));
        let details = ResumeDetails::from_yaml_str(
            &fs::read_to_string(data_dir.join(RESUME_DETAILS_FILE)).unwrap(),
        )
        .unwrap();
        assert_eq!(details.entries.len(), 1);
        assert_eq!(details.entries[0].description_html, "<p>Shipped it.</p>");
    }

    #[test]
    fn empty_resume_keeps_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("_data");
        fs::create_dir_all(&data_dir).unwrap();
        fs::write(data_dir.join(RESUME_TILES_FILE), "tiles: []\n").unwrap();

        import_resume(
            resume_import(dir.path(), "<html><body></body></html>"),
            &Preferences::default(),
        )
        .unwrap();
        assert_eq!(
            fs::read_to_string(data_dir.join(RESUME_TILES_FILE)).unwrap(),
            "tiles: []\n"
        );
        assert!(!data_dir.join(RESUME_DETAILS_FILE).exists());
    }

    #[test]
    fn disabled_resume_source_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("_data");
        fs::create_dir_all(&data_dir).unwrap();
        fs::write(data_dir.join(SITE_CONFIG_FILE), "resume_source_url: DISABLED\n").unwrap();

        import_resume(resume_import(dir.path(), RESUME_PAGE), &Preferences::default()).unwrap();
        assert!(!data_dir.join(RESUME_TILES_FILE).exists());
    }

    #[test]
    fn build_renders_resume_detail_pages() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("_data");
        let out_dir = dir.path().join("_site");
        fs::create_dir_all(&data_dir).unwrap();
        fs::write(data_dir.join(SITE_CONFIG_FILE), "title: Test\n").unwrap();
        fs::write(data_dir.join(GITHUB_PROJECTS_FILE), "projects: []\n").unwrap();
        import_resume(resume_import(dir.path(), RESUME_PAGE), &Preferences::default()).unwrap();

        let (state, failure) = open_session(&data_dir);
        assert!(failure.is_none());
        assert!(state.tiles.contains("experience-acme"));
        assert_eq!(write_detail_pages(&state, &data_dir, &out_dir).unwrap(), 1);
        let page = fs::read_to_string(out_dir.join("writing/experience/acme.html")).unwrap();
        assert!(page.contains("<p>Shipped it.</p>"));
    }

    #[test]
    fn site_root_is_the_data_parent() {
        assert_eq!(site_root(Path::new("_data")), PathBuf::from("."));
        assert_eq!(site_root(Path::new("site/_data")), PathBuf::from("site"));
    }

    #[test]
    fn filters_from_flags_go_through_the_reducer() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(SITE_CONFIG_FILE), "title: Test\n").unwrap();
        fs::write(
            dir.path().join(GITHUB_PROJECTS_FILE),
            "projects:\n  - id: alpha\n    type: project\n    title: Alpha\n    priority: 5\n    tags: [go]\n  - id: beta\n    type: project\n    title: Beta\n    priority: 10\n    tags: [rust]\n",
        )
        .unwrap();
        let (mut state, failure) = open_session(dir.path());
        assert!(failure.is_none());
        apply_filters(
            &mut state,
            &SiteArgs {
                tags: vec!["go".to_string()],
                ..SiteArgs::default()
            },
        );
        assert_eq!(state.view.order, vec!["alpha".to_string()]);
        assert_eq!(state.view.hidden, vec!["beta".to_string()]);
    }

    #[test]
    fn missing_required_source_keeps_a_banner_session() {
        let dir = tempfile::tempdir().unwrap();
        let (state, failure) = open_session(dir.path());
        assert!(failure.is_some());
        assert!(state.load.error_banner().is_some());
        assert!(state.tiles.is_empty());
    }
}
