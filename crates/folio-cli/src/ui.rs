use std::io;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Terminal;

use folio_core::actions::{PortfolioAction, RuntimeAction, UserAction};
use folio_core::config::{LayoutConfig, SiteConfig};
use folio_core::debounce::Debouncer;
use folio_core::masonry::layout;
use folio_core::reducer::{reduce, FolioEffect};
use folio_core::sources::{load_site, LoadedSite, SourceError};
use folio_core::state::{LoadStatus, LogEntry, LogLevel, LogSource, PortfolioState};
use folio_core::theme::{ResolvedTheme, ThemeMode, ThemeStore};
use folio_core::tile::{Tile, TileKind};
use folio_render::renderer::{project_badges, RESUME_META_KEYS};

const CARD_GAP: u16 = 1;
const MIN_COLUMN_WIDTH: u16 = 28;
const CONTENT_PREVIEW_ROWS: usize = 6;
const LOG_PANEL_HEIGHT: u16 = 8;
const SCROLL_STEP: u16 = 3;

struct TuiGuard;

impl Drop for TuiGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(
            io::stdout(),
            LeaveAlternateScreen,
            DisableMouseCapture,
            crossterm::cursor::Show
        );
    }
}

/// What `folio browse` was started with.
pub struct Launch {
    pub data_dir: PathBuf,
    pub tags: Vec<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub stored_theme: Option<ThemeMode>,
    pub prefers_dark: bool,
}

pub fn run(launch: Launch, theme_store: Option<ThemeStore>) -> Result<(), Box<dyn std::error::Error>> {
    let mut state = PortfolioState::new(
        SiteConfig::default(),
        launch.stored_theme.unwrap_or_default(),
    );
    let mut browser = Browser::new(launch, theme_store);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        crossterm::cursor::Hide
    )?;
    let _guard = TuiGuard;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    run_app(&mut terminal, &mut state, &mut browser).map_err(|e| e.into())
}

enum UiEvent {
    Loaded(Result<LoadedSite, SourceError>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Grid,
    Search,
    Tags,
    Help,
}

/// Filters given on the command line, applied once the first load lands.
#[derive(Debug, Default)]
struct InitialFilters {
    tags: Vec<String>,
    search: Option<String>,
    sort: Option<String>,
}

/// Terminal-only state. Everything the filters and layout decide lives in
/// `PortfolioState`; this holds focus, scrolling and the timers.
struct Browser {
    data_dir: PathBuf,
    stored_theme: Option<ThemeMode>,
    prefers_dark: bool,
    theme_store: Option<ThemeStore>,
    initial: Option<InitialFilters>,
    focus: Focus,
    tag_cursor: usize,
    show_logs: bool,
    reloading: bool,
    search: Debouncer<String>,
    resize: Debouncer<(u16, u16)>,
    masonry: Masonry,
    layout_dirty: bool,
    follow_selection: bool,
    scroll: u16,
    viewport_height: u16,
}

impl Browser {
    fn new(launch: Launch, theme_store: Option<ThemeStore>) -> Self {
        let defaults = SiteConfig::default();
        Self {
            data_dir: launch.data_dir,
            stored_theme: launch.stored_theme,
            prefers_dark: launch.prefers_dark,
            theme_store,
            initial: Some(InitialFilters {
                tags: launch.tags,
                search: launch.search,
                sort: launch.sort,
            }),
            focus: Focus::Grid,
            tag_cursor: 0,
            show_logs: false,
            reloading: false,
            search: Debouncer::new(defaults.search_debounce()),
            resize: Debouncer::new(defaults.resize_debounce()),
            masonry: Masonry::default(),
            layout_dirty: true,
            follow_selection: false,
            scroll: 0,
            viewport_height: 0,
        }
    }

    fn max_scroll(&self) -> u16 {
        self.masonry
            .content_height
            .saturating_sub(self.viewport_height)
    }

    fn scroll_by(&mut self, delta: i32) {
        let next = i32::from(self.scroll).saturating_add(delta).max(0);
        self.scroll = u16::try_from(next)
            .unwrap_or(u16::MAX)
            .min(self.max_scroll());
    }

    /// Scrolls the least amount that brings the selected card fully on
    /// screen.
    fn reveal_selection(&mut self, state: &PortfolioState) {
        let Some(selected) = state.selection.as_deref() else {
            self.scroll = 0;
            return;
        };
        let Some(card) = self.masonry.placement(selected) else {
            return;
        };
        let bottom = card.top.saturating_add(card.height);
        if card.top < self.scroll {
            self.scroll = card.top;
        } else if bottom > self.scroll.saturating_add(self.viewport_height) {
            self.scroll = bottom.saturating_sub(self.viewport_height).min(card.top);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Placement {
    id: String,
    column: u16,
    top: u16,
    height: u16,
}

/// Card positions in terminal rows. Spans come from the shared layout pass;
/// each card then drops into the currently shortest column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Masonry {
    columns: u16,
    column_width: u16,
    placements: Vec<Placement>,
    content_height: u16,
}

impl Masonry {
    fn placement(&self, id: &str) -> Option<&Placement> {
        self.placements.iter().find(|placement| placement.id == id)
    }
}

fn column_count(width: u16, configured: u16) -> u16 {
    let fit = (width.saturating_add(CARD_GAP) / (MIN_COLUMN_WIDTH + CARD_GAP)).max(1);
    configured.clamp(1, fit)
}

fn compute_masonry(state: &PortfolioState, width: u16) -> Masonry {
    let columns = column_count(width, state.config.layout.columns);
    let column_width = (width.saturating_sub(CARD_GAP * (columns - 1)) / columns).max(1);
    let inner_width = column_width.saturating_sub(2).max(1);
    let rows = LayoutConfig {
        row_quantum_px: 1.0,
        gap_px: f64::from(CARD_GAP),
        ..state.config.layout
    };

    let mut children = state.layout_children(|tile| card_rows(tile, inner_width).len() as f64 + 2.0);
    layout(children.as_mut_slice(), &rows);

    let mut heights = vec![0u16; usize::from(columns)];
    let mut placements = Vec::new();
    for child in children.iter().filter(|child| !child.hidden) {
        let (column, top) = heights
            .iter()
            .copied()
            .enumerate()
            .min_by_key(|(_, height)| *height)
            .unwrap_or((0, 0));
        let span = u16::try_from(child.span).unwrap_or(u16::MAX);
        placements.push(Placement {
            id: child.id.clone(),
            column: u16::try_from(column).unwrap_or(0),
            top,
            height: span.saturating_sub(CARD_GAP).max(1),
        });
        heights[column] = top.saturating_add(span);
    }

    Masonry {
        columns,
        column_width,
        placements,
        content_height: heights.into_iter().max().unwrap_or(0),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CardPart {
    Title,
    Body,
    Badges,
    Meta,
    Tags,
    Link,
}

/// Text rows of one card at `width` columns, wrapped ahead of time so the
/// measured height is exactly what gets drawn.
fn card_rows(tile: &Tile, width: u16) -> Vec<(CardPart, String)> {
    let width = usize::from(width.max(1));
    let mut rows = Vec::new();
    let mut push = |part: CardPart, text: &str| {
        for line in wrap_text(text, width) {
            rows.push((part, line));
        }
    };

    push(CardPart::Title, &tile.title);
    if !tile.description.trim().is_empty() {
        push(CardPart::Body, &tile.description);
    }
    match tile.kind {
        TileKind::Content | TileKind::Profile => {
            if let Some(markdown) = tile.content_markdown.as_deref() {
                let preview: Vec<&str> = markdown
                    .lines()
                    .filter(|line| !line.trim().is_empty())
                    .take(CONTENT_PREVIEW_ROWS)
                    .collect();
                push(CardPart::Body, &preview.join("\n"));
            }
        }
        TileKind::Widget => {
            let widget = tile.widget_id.as_deref().unwrap_or("widget");
            push(CardPart::Meta, &format!("[{widget}]"));
        }
        TileKind::Project => {
            let badges: Vec<String> = project_badges(tile)
                .iter()
                .map(|badge| badge.text_content())
                .collect();
            if !badges.is_empty() {
                push(CardPart::Badges, &badges.join("  "));
            }
        }
        TileKind::Experience | TileKind::Education => {
            let meta: Vec<&str> = RESUME_META_KEYS
                .iter()
                .filter_map(|key| tile.meta.get(*key))
                .map(String::as_str)
                .filter(|value| !value.trim().is_empty())
                .collect();
            if !meta.is_empty() {
                push(CardPart::Meta, &meta.join(" · "));
            }
        }
        TileKind::Link => {}
    }
    let tags = tile.merged_tags();
    if !tags.is_empty() {
        let joined: Vec<String> = tags.iter().map(|tag| format!("#{tag}")).collect();
        push(CardPart::Tags, &joined.join(" "));
    }
    if let Some(url) = tile.target_url() {
        rows.push((CardPart::Link, truncate(url, width)));
    }
    rows
}

/// Greedy word wrap by character count. Words longer than a line are split.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut line = String::new();
        let mut len = 0;
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > width {
                if len > 0 {
                    lines.push(std::mem::take(&mut line));
                    len = 0;
                }
                let rest = word.split_off(width);
                lines.push(word.into_iter().collect());
                word = rest;
            }
            if word.is_empty() {
                continue;
            }
            if len > 0 && len + 1 + word.len() > width {
                lines.push(std::mem::take(&mut line));
                len = 0;
            }
            if len > 0 {
                line.push(' ');
                len += 1;
            }
            len += word.len();
            line.extend(word);
        }
        if len > 0 {
            lines.push(line);
        }
    }
    lines
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[derive(Clone, Copy)]
struct UiPalette {
    accent: Color,
    accent_alt: Color,
    success: Color,
    warning: Color,
    danger: Color,
    muted: Color,
    border: Color,
    text: Color,
    panel_bg: Color,
    selected_bg: Color,
}

fn palette_for(theme: ResolvedTheme) -> UiPalette {
    match theme {
        ResolvedTheme::Dark => UiPalette {
            accent: Color::Cyan,
            accent_alt: Color::Magenta,
            success: Color::Green,
            warning: Color::Yellow,
            danger: Color::LightRed,
            muted: Color::DarkGray,
            border: Color::Gray,
            text: Color::White,
            panel_bg: Color::Black,
            selected_bg: Color::Rgb(40, 44, 52),
        },
        ResolvedTheme::Light => UiPalette {
            accent: Color::Blue,
            accent_alt: Color::Magenta,
            success: Color::Rgb(0, 128, 0),
            warning: Color::Rgb(176, 112, 0),
            danger: Color::Red,
            muted: Color::Gray,
            border: Color::DarkGray,
            text: Color::Black,
            panel_bg: Color::White,
            selected_bg: Color::Rgb(225, 232, 245),
        },
    }
}

enum KeyHandlerResult {
    Continue(Vec<FolioEffect>),
    Reload,
    Exit,
}

fn spawn_load(data_dir: PathBuf, tx: mpsc::Sender<UiEvent>) {
    thread::spawn(move || {
        let _ = tx.send(UiEvent::Loaded(load_site(&data_dir)));
    });
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    state: &mut PortfolioState,
    browser: &mut Browser,
) -> io::Result<()> {
    let (tx, rx) = mpsc::channel::<UiEvent>();
    spawn_load(browser.data_dir.clone(), tx.clone());

    loop {
        while let Ok(event) = rx.try_recv() {
            match event {
                UiEvent::Loaded(result) => {
                    let effects = on_loaded(state, browser, result);
                    apply_effects(effects, state, browser);
                }
            }
        }

        let now = Instant::now();
        if let Some(text) = browser.search.poll(now) {
            let effects = reduce(
                state,
                PortfolioAction::Runtime(RuntimeAction::CommitSearch(text)),
            );
            apply_effects(effects, state, browser);
        }
        if browser.resize.poll(now).is_some() {
            browser.layout_dirty = true;
        }

        let size = terminal.size()?;
        let screen = screen_areas(Rect::new(0, 0, size.width, size.height), state, browser);
        browser.viewport_height = screen.grid.height;
        if browser.layout_dirty {
            browser.masonry = compute_masonry(state, screen.grid.width);
            browser.layout_dirty = false;
            browser.scroll = browser.scroll.min(browser.max_scroll());
        }
        if browser.follow_selection {
            browser.reveal_selection(state);
            browser.follow_selection = false;
        }

        terminal.draw(|f| ui(f, state, browser))?;

        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    let before = state.selection.clone();
                    match handle_key(key, state, browser) {
                        KeyHandlerResult::Exit => return Ok(()),
                        KeyHandlerResult::Reload => {
                            browser.reloading = true;
                            spawn_load(browser.data_dir.clone(), tx.clone());
                        }
                        KeyHandlerResult::Continue(effects) => {
                            apply_effects(effects, state, browser)
                        }
                    }
                    if state.selection != before {
                        browser.follow_selection = true;
                    }
                }
                Event::Mouse(mouse) => match mouse.kind {
                    MouseEventKind::ScrollDown => browser.scroll_by(i32::from(SCROLL_STEP)),
                    MouseEventKind::ScrollUp => browser.scroll_by(-i32::from(SCROLL_STEP)),
                    _ => {}
                },
                Event::Resize(width, height) => {
                    browser.resize.schedule(Instant::now(), (width, height));
                }
                _ => {}
            }
        }
    }
}

fn on_loaded(
    state: &mut PortfolioState,
    browser: &mut Browser,
    result: Result<LoadedSite, SourceError>,
) -> Vec<FolioEffect> {
    browser.reloading = false;
    browser.search.cancel();
    let site = match result {
        Ok(site) => site,
        Err(err) => {
            return reduce(
                state,
                PortfolioAction::Runtime(RuntimeAction::LoadFailed(err.to_string())),
            );
        }
    };

    let mut effects = reduce(state, PortfolioAction::Runtime(RuntimeAction::TilesLoaded(site)));
    browser.search.set_delay(state.config.search_debounce());
    browser.resize.set_delay(state.config.resize_debounce());
    browser.tag_cursor = browser
        .tag_cursor
        .min(state.tag_options.len().saturating_sub(1));

    if let Some(initial) = browser.initial.take() {
        if browser.stored_theme.is_none() {
            state.theme = state.config.theme.default;
        }
        if let Some(sort) = initial.sort {
            effects.extend(reduce(state, PortfolioAction::User(UserAction::SetSort(sort))));
        }
        for tag in initial.tags {
            if !state.filters.is_tag_active(&tag) {
                effects.extend(reduce(state, PortfolioAction::User(UserAction::ToggleTag(tag))));
            }
        }
        if let Some(search) = initial.search {
            reduce(
                state,
                PortfolioAction::User(UserAction::SearchInput(search.clone())),
            );
            effects.extend(reduce(
                state,
                PortfolioAction::Runtime(RuntimeAction::CommitSearch(search)),
            ));
        }
    }
    effects
}

fn log_shell(state: &mut PortfolioState, level: LogLevel, message: impl Into<String>) {
    reduce(
        state,
        PortfolioAction::Runtime(RuntimeAction::AppendLog(LogEntry::new(
            level,
            LogSource::Shell,
            message,
        ))),
    );
}

fn apply_effects(effects: Vec<FolioEffect>, state: &mut PortfolioState, browser: &mut Browser) {
    for effect in effects {
        match effect {
            FolioEffect::RequestFrame => {}
            FolioEffect::RequestLayout => browser.layout_dirty = true,
            FolioEffect::ScheduleSearch { text, delay } => {
                browser.search.schedule_after(Instant::now(), delay, text);
            }
            FolioEffect::PersistTheme(theme) => {
                if let Some(store) = &browser.theme_store {
                    if let Err(err) = store.save(theme) {
                        log_shell(state, LogLevel::Warn, format!("theme not saved: {err}"));
                    }
                }
            }
            FolioEffect::CopyToClipboard(text) => {
                let copied = arboard::Clipboard::new()
                    .and_then(|mut clipboard| clipboard.set_text(text.clone()));
                match copied {
                    Ok(()) => log_shell(state, LogLevel::Info, format!("copied {text}")),
                    Err(err) => {
                        log_shell(state, LogLevel::Warn, format!("clipboard unavailable: {err}"))
                    }
                }
            }
        }
    }
}

fn handle_key(key: KeyEvent, state: &mut PortfolioState, browser: &mut Browser) -> KeyHandlerResult {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return KeyHandlerResult::Exit;
    }
    match browser.focus {
        Focus::Help => {
            browser.focus = Focus::Grid;
            KeyHandlerResult::Continue(Vec::new())
        }
        Focus::Search => handle_search_keys(key, state, browser),
        Focus::Tags => handle_tag_keys(key, state, browser),
        Focus::Grid => handle_global_keys(key, state, browser),
    }
}

fn handle_search_keys(
    key: KeyEvent,
    state: &mut PortfolioState,
    browser: &mut Browser,
) -> KeyHandlerResult {
    let mut effects = Vec::new();
    match key.code {
        KeyCode::Esc => browser.focus = Focus::Grid,
        KeyCode::Enter => {
            browser.focus = Focus::Grid;
            if let Some(text) = browser.search.flush() {
                effects.extend(reduce(
                    state,
                    PortfolioAction::Runtime(RuntimeAction::CommitSearch(text)),
                ));
            }
        }
        KeyCode::Backspace => {
            let mut draft = state.search_draft.clone();
            draft.pop();
            effects.extend(reduce(
                state,
                PortfolioAction::User(UserAction::SearchInput(draft)),
            ));
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            effects.extend(reduce(
                state,
                PortfolioAction::User(UserAction::SearchInput(String::new())),
            ));
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            let mut draft = state.search_draft.clone();
            draft.push(ch);
            effects.extend(reduce(
                state,
                PortfolioAction::User(UserAction::SearchInput(draft)),
            ));
        }
        _ => {}
    }
    KeyHandlerResult::Continue(effects)
}

fn handle_tag_keys(
    key: KeyEvent,
    state: &mut PortfolioState,
    browser: &mut Browser,
) -> KeyHandlerResult {
    let mut effects = Vec::new();
    let last = state.tag_options.len().saturating_sub(1);
    match key.code {
        KeyCode::Esc | KeyCode::Tab => browser.focus = Focus::Grid,
        KeyCode::Left | KeyCode::Char('h') => {
            browser.tag_cursor = browser.tag_cursor.saturating_sub(1);
        }
        KeyCode::Right | KeyCode::Char('l') => {
            browser.tag_cursor = (browser.tag_cursor + 1).min(last);
        }
        KeyCode::Home => browser.tag_cursor = 0,
        KeyCode::End => browser.tag_cursor = last,
        KeyCode::Enter | KeyCode::Char(' ') => {
            if let Some(option) = state.tag_options.get(browser.tag_cursor) {
                let value = option.value.clone();
                effects.extend(reduce(
                    state,
                    PortfolioAction::User(UserAction::ToggleTag(value)),
                ));
            }
        }
        KeyCode::Char('x') => {
            effects.extend(reduce(state, PortfolioAction::User(UserAction::ClearTags)));
        }
        _ => {}
    }
    KeyHandlerResult::Continue(effects)
}

fn handle_global_keys(
    key: KeyEvent,
    state: &mut PortfolioState,
    browser: &mut Browser,
) -> KeyHandlerResult {
    let mut effects = Vec::new();
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return KeyHandlerResult::Exit,
        KeyCode::Char('r') => return KeyHandlerResult::Reload,
        KeyCode::Char('j') | KeyCode::Down => {
            effects.extend(reduce(state, PortfolioAction::User(UserAction::SelectNext)));
        }
        KeyCode::Char('k') | KeyCode::Up => {
            effects.extend(reduce(state, PortfolioAction::User(UserAction::SelectPrev)));
        }
        KeyCode::Char('/') => browser.focus = Focus::Search,
        KeyCode::Tab => browser.focus = Focus::Tags,
        KeyCode::Char('?') => browser.focus = Focus::Help,
        KeyCode::Char(digit @ '1'..='9') => {
            let index = digit as usize - '1' as usize;
            if let Some(option) = state.tag_options.get(index) {
                let value = option.value.clone();
                browser.tag_cursor = index;
                effects.extend(reduce(
                    state,
                    PortfolioAction::User(UserAction::ToggleTag(value)),
                ));
            }
        }
        KeyCode::Char('s') => {
            effects.extend(reduce(state, PortfolioAction::User(UserAction::CycleSort)));
        }
        KeyCode::Char('t') => {
            effects.extend(reduce(state, PortfolioAction::User(UserAction::CycleTheme)));
        }
        KeyCode::Char('y') => {
            effects.extend(reduce(
                state,
                PortfolioAction::User(UserAction::CopySelectedUrl),
            ));
        }
        KeyCode::Char('x') => {
            effects.extend(reduce(state, PortfolioAction::User(UserAction::ClearTags)));
        }
        KeyCode::Char('c') => {
            browser.search.cancel();
            effects.extend(reduce(
                state,
                PortfolioAction::User(UserAction::ClearFilters),
            ));
        }
        KeyCode::Char('L') => {
            effects.extend(reduce(state, PortfolioAction::Runtime(RuntimeAction::ClearLogs)));
        }
        KeyCode::Char('g') => browser.show_logs = !browser.show_logs,
        KeyCode::PageDown => browser.scroll_by(i32::from(browser.viewport_height.max(1))),
        KeyCode::PageUp => browser.scroll_by(-i32::from(browser.viewport_height.max(1))),
        KeyCode::Home => browser.scroll = 0,
        _ => {}
    }
    KeyHandlerResult::Continue(effects)
}

struct ScreenAreas {
    header: Rect,
    tags: Rect,
    search: Rect,
    banner: Rect,
    grid: Rect,
    logs: Rect,
    footer: Rect,
}

fn screen_areas(area: Rect, state: &PortfolioState, browser: &Browser) -> ScreenAreas {
    let banner_h = if state.load.error_banner().is_some() { 3 } else { 0 };
    let logs_h = if browser.show_logs { LOG_PANEL_HEIGHT } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),        // Header
            Constraint::Length(1),        // Tags
            Constraint::Length(1),        // Search
            Constraint::Length(banner_h), // Error banner
            Constraint::Min(0),           // Grid
            Constraint::Length(logs_h),   // Logs
            Constraint::Length(1),        // Footer
        ])
        .split(area);
    ScreenAreas {
        header: chunks[0],
        tags: chunks[1],
        search: chunks[2],
        banner: chunks[3],
        grid: chunks[4],
        logs: chunks[5],
        footer: chunks[6],
    }
}

fn ui(f: &mut ratatui::Frame, state: &PortfolioState, browser: &Browser) {
    let palette = palette_for(state.theme.resolve(browser.prefers_dark));
    let area = f.area();
    f.render_widget(
        Block::default().style(Style::default().bg(palette.panel_bg).fg(palette.text)),
        area,
    );
    let screen = screen_areas(area, state, browser);

    draw_header(f, state, browser, palette, screen.header);
    draw_tag_bar(f, state, browser, palette, screen.tags);
    draw_search(f, state, browser, palette, screen.search);
    if let Some(message) = state.load.error_banner() {
        let banner = Paragraph::new(message.to_string())
            .style(Style::default().fg(palette.danger))
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(palette.danger))
                    .title(" load failed "),
            );
        f.render_widget(banner, screen.banner);
    }
    draw_grid(f, state, browser, palette, screen.grid);
    if browser.show_logs {
        draw_logs(f, state, palette, screen.logs);
    }
    draw_footer(f, browser, palette, screen.footer);

    if browser.focus == Focus::Help {
        draw_help(f, palette);
    }
}

fn draw_header(
    f: &mut ratatui::Frame,
    state: &PortfolioState,
    browser: &Browser,
    palette: UiPalette,
    area: Rect,
) {
    let resolved = state.theme.resolve(browser.prefers_dark);
    let theme = if state.theme == ThemeMode::Auto {
        format!("auto ({})", resolved.label())
    } else {
        state.theme.label().to_string()
    };
    let mut spans = vec![
        Span::styled(
            format!(" {} ", state.config.title),
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(
                " {} of {} tiles ",
                state.view.order.len(),
                state.tiles.len()
            ),
            Style::default().fg(palette.muted),
        ),
        Span::raw(format!(" sort: {} ", state.filters.sort.title())),
        Span::raw(format!(" theme: {theme} ")),
    ];
    if browser.reloading || state.load == LoadStatus::Loading {
        spans.push(Span::styled(
            " loading… ",
            Style::default().fg(palette.warning),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_tag_bar(
    f: &mut ratatui::Frame,
    state: &PortfolioState,
    browser: &Browser,
    palette: UiPalette,
    area: Rect,
) {
    let mut spans = vec![Span::styled(" tags ", Style::default().fg(palette.muted))];
    for (index, option) in state.tag_options.iter().enumerate() {
        let tag_color = option
            .color
            .as_deref()
            .and_then(|color| color.trim().parse::<Color>().ok())
            .unwrap_or(palette.accent_alt);
        let mut style = if state.filters.is_tag_active(&option.value) {
            Style::default()
                .fg(palette.panel_bg)
                .bg(tag_color)
                .add_modifier(Modifier::BOLD)
        } else if option.pinned {
            Style::default().fg(tag_color)
        } else {
            Style::default().fg(palette.text)
        };
        if browser.focus == Focus::Tags && index == browser.tag_cursor {
            style = style.add_modifier(Modifier::UNDERLINED | Modifier::REVERSED);
        }
        let label = if index < 9 {
            format!(" {}:{} {} ", index + 1, option.label, option.count)
        } else {
            format!(" {} {} ", option.label, option.count)
        };
        spans.push(Span::styled(label, style));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_search(
    f: &mut ratatui::Frame,
    state: &PortfolioState,
    browser: &Browser,
    palette: UiPalette,
    area: Rect,
) {
    let prompt_style = if browser.focus == Focus::Search {
        Style::default()
            .fg(palette.accent)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(palette.muted)
    };
    let mut spans = vec![
        Span::styled(" / ", prompt_style),
        Span::raw(state.search_draft.clone()),
    ];
    if browser.search.is_pending() {
        spans.push(Span::styled(" …", Style::default().fg(palette.muted)));
    } else if !state.filters.search.is_empty() {
        spans.push(Span::styled(
            format!("  matching \"{}\"", state.filters.search),
            Style::default().fg(palette.success),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
    if browser.focus == Focus::Search {
        let offset = u16::try_from(state.search_draft.chars().count()).unwrap_or(u16::MAX);
        f.set_cursor_position((
            area.x.saturating_add(3).saturating_add(offset),
            area.y,
        ));
    }
}

fn draw_grid(
    f: &mut ratatui::Frame,
    state: &PortfolioState,
    browser: &Browser,
    palette: UiPalette,
    area: Rect,
) {
    if area.height == 0 {
        return;
    }
    if state.load == LoadStatus::Loading {
        f.render_widget(
            Paragraph::new("Loading tiles…")
                .alignment(Alignment::Center)
                .style(Style::default().fg(palette.muted)),
            area,
        );
        return;
    }
    if state.view.order.is_empty() && state.load == LoadStatus::Ready {
        let message = if state.tiles.is_empty() {
            "No tiles in this site."
        } else {
            "No tiles match the current filters. Press c to clear them."
        };
        f.render_widget(
            Paragraph::new(message)
                .alignment(Alignment::Center)
                .style(Style::default().fg(palette.muted)),
            area,
        );
        return;
    }

    let masonry = &browser.masonry;
    let view_top = browser.scroll;
    let view_bottom = view_top.saturating_add(area.height);
    for card in &masonry.placements {
        let Some(tile) = state.tiles.get(&card.id) else {
            continue;
        };
        let top = card.top;
        let bottom = card.top.saturating_add(card.height);
        if bottom <= view_top || top >= view_bottom {
            continue;
        }
        let x = area.x.saturating_add(card.column * (masonry.column_width + CARD_GAP));
        let width = masonry
            .column_width
            .min(area.right().saturating_sub(x));
        if width < 3 {
            continue;
        }
        let visible_top = top.max(view_top);
        let visible_bottom = bottom.min(view_bottom);
        let rect = Rect::new(
            x,
            area.y + (visible_top - view_top),
            width,
            visible_bottom - visible_top,
        );

        let mut borders = Borders::ALL;
        let skipped = visible_top - top;
        if skipped > 0 {
            borders.remove(Borders::TOP);
        }
        if bottom > view_bottom {
            borders.remove(Borders::BOTTOM);
        }

        let selected = state.selection.as_deref() == Some(card.id.as_str());
        let border_color = if selected {
            palette.accent
        } else {
            tile.style
                .border_color
                .as_deref()
                .and_then(|color| color.trim().parse::<Color>().ok())
                .unwrap_or(if tile.featured {
                    palette.accent_alt
                } else {
                    palette.border
                })
        };
        let mut block = Block::default()
            .borders(borders)
            .border_style(Style::default().fg(border_color));
        if selected {
            block = block.style(Style::default().bg(palette.selected_bg));
        }

        let lines: Vec<Line> = card_rows(tile, masonry.column_width.saturating_sub(2))
            .into_iter()
            .map(|(part, text)| Line::from(Span::styled(text, part_style(part, palette))))
            .collect();
        let paragraph = Paragraph::new(lines)
            .block(block)
            .scroll((skipped.saturating_sub(1), 0));
        f.render_widget(Clear, rect);
        f.render_widget(paragraph, rect);
    }
}

fn part_style(part: CardPart, palette: UiPalette) -> Style {
    match part {
        CardPart::Title => Style::default()
            .fg(palette.text)
            .add_modifier(Modifier::BOLD),
        CardPart::Body => Style::default().fg(palette.text),
        CardPart::Badges => Style::default().fg(palette.warning),
        CardPart::Meta => Style::default().fg(palette.muted),
        CardPart::Tags => Style::default().fg(palette.accent_alt),
        CardPart::Link => Style::default()
            .fg(palette.accent)
            .add_modifier(Modifier::UNDERLINED),
    }
}

fn draw_logs(f: &mut ratatui::Frame, state: &PortfolioState, palette: UiPalette, area: Rect) {
    let rows = usize::from(area.height.saturating_sub(2));
    let entries: Vec<_> = state.logs.iter().collect();
    let start = entries.len().saturating_sub(rows);
    let lines: Vec<Line> = entries[start..]
        .iter()
        .map(|entry| {
            let color = match entry.level {
                LogLevel::Error => palette.danger,
                LogLevel::Warn => palette.warning,
                LogLevel::Info => palette.text,
                LogLevel::Debug | LogLevel::Trace => palette.muted,
            };
            let mut spans = vec![
                Span::styled(format!("{:>4} ", entry.seq), Style::default().fg(palette.muted)),
                Span::styled(format!("{:<5} ", entry.level.label()), Style::default().fg(color)),
                Span::styled(
                    format!("[{}] ", entry.source.label()),
                    Style::default().fg(palette.muted),
                ),
            ];
            if let Some(context) = &entry.context {
                spans.push(Span::raw(format!("{context}: ")));
            }
            spans.push(Span::raw(entry.message.clone()));
            Line::from(spans)
        })
        .collect();
    let panel = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.border))
            .title(" log "),
    );
    f.render_widget(panel, area);
}

fn draw_footer(f: &mut ratatui::Frame, browser: &Browser, palette: UiPalette, area: Rect) {
    let hints = match browser.focus {
        Focus::Grid => "j/k select  / search  tab tags  1-9 toggle  s sort  t theme  y copy  c clear  g log  ? help  q quit",
        Focus::Search => "type to filter  enter apply  esc back  ctrl+u clear",
        Focus::Tags => "h/l move  space toggle  x clear tags  esc back",
        Focus::Help => "any key to close",
    };
    f.render_widget(
        Paragraph::new(format!(" {hints}")).style(Style::default().fg(palette.muted)),
        area,
    );
}

fn draw_help(f: &mut ratatui::Frame, palette: UiPalette) {
    let area = centered_rect(60, 60, f.area());
    let rows = [
        ("j / k", "select next / previous tile"),
        ("/", "search titles, descriptions and tags"),
        ("tab", "move through the tag bar"),
        ("1-9", "toggle the numbered tag"),
        ("x", "clear tag filters"),
        ("c", "clear every filter"),
        ("s", "cycle sort order"),
        ("t", "cycle theme (light, dark, auto)"),
        ("y", "copy the selected tile's link"),
        ("r", "reload the data directory"),
        ("g / L", "show the log / clear it"),
        ("q", "quit"),
    ];
    let lines: Vec<Line> = rows
        .iter()
        .map(|(keys, action)| {
            Line::from(vec![
                Span::styled(
                    format!("{keys:>8}  "),
                    Style::default()
                        .fg(palette.accent)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(*action),
            ])
        })
        .collect();
    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.accent))
                .style(Style::default().bg(palette.panel_bg).fg(palette.text))
                .title(" keys "),
        ),
        area,
    );
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn tile(id: &str, priority: i64, tags: &[&str], description: &str) -> Tile {
        let mut tile = Tile::new(id, TileKind::Link, id.to_uppercase());
        tile.priority = priority;
        tile.tags = tags.iter().map(|tag| tag.to_string()).collect();
        tile.description = description.to_string();
        tile
    }

    fn browser() -> Browser {
        Browser::new(
            Launch {
                data_dir: PathBuf::from("_data"),
                tags: Vec::new(),
                search: None,
                sort: None,
                stored_theme: None,
                prefers_dark: true,
            },
            None,
        )
    }

    fn loaded(tiles: Vec<Tile>) -> (PortfolioState, Browser) {
        let mut state = PortfolioState::new(SiteConfig::default(), ThemeMode::Auto);
        let mut browser = browser();
        let site = LoadedSite {
            config: SiteConfig::default(),
            tiles,
            notices: Vec::new(),
        };
        let effects = on_loaded(&mut state, &mut browser, Ok(site));
        apply_effects(effects, &mut state, &mut browser);
        (state, browser)
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn wrap_breaks_on_words_and_splits_long_ones() {
        assert_eq!(
            wrap_text("the quick brown fox", 9),
            vec!["the quick".to_string(), "brown fox".to_string()]
        );
        assert_eq!(
            wrap_text("abcdefghij", 4),
            vec!["abcd".to_string(), "efgh".to_string(), "ij".to_string()]
        );
        assert!(wrap_text("   ", 10).is_empty());
    }

    #[test]
    fn column_count_respects_width_and_config() {
        assert_eq!(column_count(200, 3), 3);
        assert_eq!(column_count(60, 3), 2);
        assert_eq!(column_count(10, 3), 1);
        assert_eq!(column_count(200, 0), 1);
    }

    #[test]
    fn cards_fill_the_shortest_column_and_skip_hidden() {
        let (mut state, _) = loaded(vec![
            tile("tall", 30, &["rust"], &"word ".repeat(40)),
            tile("short", 20, &["rust"], ""),
            tile("third", 10, &["rust"], ""),
            tile("gone", 5, &["go"], ""),
        ]);
        reduce(
            &mut state,
            PortfolioAction::User(UserAction::ToggleTag("rust".to_string())),
        );
        let masonry = compute_masonry(&state, 60);
        assert_eq!(masonry.columns, 2);

        let ids: Vec<&str> = masonry.placements.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["tall", "short", "third"]);
        let tall = masonry.placement("tall").unwrap();
        let short = masonry.placement("short").unwrap();
        let third = masonry.placement("third").unwrap();
        assert_eq!((tall.column, tall.top), (0, 0));
        assert_eq!((short.column, short.top), (1, 0));
        assert_eq!(third.column, 1);
        assert_eq!(third.top, short.height + CARD_GAP);
        assert!(masonry.placement("gone").is_none());
    }

    #[test]
    fn typed_search_waits_for_the_debounce() {
        let (mut state, mut browser) = loaded(vec![
            tile("alpha", 5, &[], ""),
            tile("beta", 10, &[], ""),
        ]);
        browser.focus = Focus::Search;
        for ch in "lpha".chars() {
            if let KeyHandlerResult::Continue(effects) =
                handle_key(press(KeyCode::Char(ch)), &mut state, &mut browser)
            {
                apply_effects(effects, &mut state, &mut browser);
            }
        }
        assert_eq!(state.search_draft, "lpha");
        assert_eq!(state.view.order.len(), 2);
        assert!(browser.search.is_pending());

        if let KeyHandlerResult::Continue(effects) =
            handle_key(press(KeyCode::Enter), &mut state, &mut browser)
        {
            apply_effects(effects, &mut state, &mut browser);
        }
        assert_eq!(state.view.order, vec!["alpha".to_string()]);
        assert_eq!(browser.focus, Focus::Grid);
        assert!(browser.layout_dirty);
    }

    #[test]
    fn number_keys_toggle_tags_in_bar_order() {
        let (mut state, mut browser) = loaded(vec![
            tile("alpha", 5, &["go"], ""),
            tile("beta", 10, &["rust"], ""),
        ]);
        let first = state.tag_options[0].value.clone();
        handle_key(press(KeyCode::Char('1')), &mut state, &mut browser);
        assert!(state.filters.is_tag_active(&first));
        handle_key(press(KeyCode::Char('1')), &mut state, &mut browser);
        assert!(!state.filters.is_tag_active(&first));
    }

    #[test]
    fn command_line_filters_apply_after_first_load() {
        let mut state = PortfolioState::new(SiteConfig::default(), ThemeMode::Auto);
        let mut browser = Browser::new(
            Launch {
                data_dir: PathBuf::from("_data"),
                tags: vec!["go".to_string()],
                search: None,
                sort: Some("alphabetical".to_string()),
                stored_theme: Some(ThemeMode::Light),
                prefers_dark: true,
            },
            None,
        );
        let site = LoadedSite {
            config: SiteConfig::default(),
            tiles: vec![tile("alpha", 5, &["go"], ""), tile("beta", 10, &["rust"], "")],
            notices: Vec::new(),
        };
        on_loaded(&mut state, &mut browser, Ok(site));
        assert!(browser.initial.is_none());
        assert_eq!(state.view.order, vec!["alpha".to_string()]);
        assert_eq!(state.filters.sort.label(), "alphabetical");
        assert_eq!(state.theme, ThemeMode::Auto);
    }

    #[test]
    fn selection_scrolls_into_view() {
        let tiles: Vec<Tile> = (0..6)
            .map(|n| tile(&format!("t{n}"), 100 - n, &[], &"line ".repeat(20)))
            .collect();
        let (mut state, mut browser) = loaded(tiles);
        state.config.layout.columns = 1;
        browser.masonry = compute_masonry(&state, 40);
        browser.viewport_height = 10;
        for _ in 0..6 {
            handle_key(press(KeyCode::Char('j')), &mut state, &mut browser);
        }
        browser.reveal_selection(&state);
        let card = browser.masonry.placement("t5").unwrap().clone();
        assert!(browser.scroll <= card.top);
        assert!(card.top + card.height <= browser.scroll + browser.viewport_height);
    }

    #[test]
    fn load_failure_surfaces_as_banner() {
        let mut state = PortfolioState::new(SiteConfig::default(), ThemeMode::Auto);
        let mut browser = browser();
        let err = SourceError::Worker {
            name: "github-projects.yml",
        };
        on_loaded(&mut state, &mut browser, Err(err));
        assert!(state.load.error_banner().is_some());
        assert!(state.tiles.is_empty());
    }
}
