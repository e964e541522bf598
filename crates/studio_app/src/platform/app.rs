use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use engine_logging::{engine_info, engine_warn};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use studio_core::{update, AppState, Msg, SelectedFile};

use super::config::{self, BASE_URL_ENV};
use super::effects::EffectRunner;
use super::logging::{self, LogDestination};
use super::ui::{self, Focus, ScreenState};

const TICK_RATE: Duration = Duration::from_millis(100);
const INPUT_POLL: Duration = Duration::from_millis(20);

pub fn run_app() -> Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let loaded = config::load_config(&cwd);
    logging::initialize(if loaded.config.log_to_terminal {
        LogDestination::Both
    } else {
        LogDestination::File
    });
    if let Some(warning) = &loaded.warning {
        engine_warn!("{}", warning);
    }
    let config = loaded
        .config
        .with_base_url_override(std::env::var(BASE_URL_ENV).ok());

    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let runner = EffectRunner::new(&config, msg_tx).context("start engine")?;

    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).ok();
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    let mut session = Session::new();
    let res = session.event_loop(&mut terminal, &runner, &msg_rx);

    engine_info!("Shutting down");
    session.dispatch(Msg::Teardown, &runner);

    disable_raw_mode().ok();
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();
    res
}

enum KeyOutcome {
    Continue,
    Quit,
}

/// UI-thread state: the core model plus what only the screen needs.
struct Session {
    state: AppState,
    focus: Focus,
    file_input: String,
    selected: usize,
    redraw: bool,
}

impl Session {
    fn new() -> Self {
        Self {
            state: AppState::new(),
            focus: Focus::EnhanceInput,
            file_input: String::new(),
            selected: 0,
            redraw: true,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        runner: &EffectRunner,
        msg_rx: &mpsc::Receiver<Msg>,
    ) -> Result<()> {
        let mut last_draw = Instant::now();
        loop {
            for msg in runner.poll_events() {
                self.dispatch(msg, runner);
            }
            while let Ok(msg) = msg_rx.try_recv() {
                self.dispatch(msg, runner);
            }

            if self.redraw || last_draw.elapsed() >= TICK_RATE {
                let view = self.state.view();
                let screen = self.screen_state();
                terminal
                    .draw(|frame| ui::render::draw(frame, &view, &screen))
                    .context("draw frame")?;
                self.redraw = false;
                last_draw = Instant::now();
            }

            if event::poll(INPUT_POLL).unwrap_or(false) {
                if let Ok(Event::Key(key)) = event::read() {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    self.redraw = true;
                    if let KeyOutcome::Quit = self.handle_key(key, runner) {
                        return Ok(());
                    }
                }
            }
        }
    }

    fn dispatch(&mut self, msg: Msg, runner: &EffectRunner) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        if state.consume_dirty() {
            self.redraw = true;
        }
        self.state = state;
        self.clamp_selection();
        runner.enqueue(effects);
    }

    fn screen_state(&self) -> ScreenState {
        ScreenState {
            focus: self.focus,
            file_input: self.file_input.clone(),
            selected_url: self.state.downloadable_urls().get(self.selected).cloned(),
        }
    }

    fn clamp_selection(&mut self) {
        let count = self.state.downloadable_urls().len();
        self.selected = self.selected.min(count.saturating_sub(1));
    }

    fn handle_key(&mut self, key: KeyEvent, runner: &EffectRunner) -> KeyOutcome {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q')) {
            return KeyOutcome::Quit;
        }

        if self.state.view().alert.is_some() {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
                self.dispatch(Msg::AlertDismissed, runner);
            }
            return KeyOutcome::Continue;
        }

        match key.code {
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::BackTab => self.focus = self.focus.previous(),
            _ if self.focus == Focus::Results => self.handle_results_key(key.code, runner),
            KeyCode::Char('u') if ctrl => self.clear_input(runner),
            KeyCode::Enter => self.submit(runner),
            KeyCode::Backspace => self.edit_input(runner, |text| {
                text.pop();
            }),
            KeyCode::Char(c) if !ctrl => self.edit_input(runner, |text| text.push(c)),
            _ => {}
        }
        KeyOutcome::Continue
    }

    fn handle_results_key(&mut self, code: KeyCode, runner: &EffectRunner) {
        let urls = self.state.downloadable_urls();
        match code {
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down => {
                if self.selected + 1 < urls.len() {
                    self.selected += 1;
                }
            }
            KeyCode::Enter | KeyCode::Char('d') => {
                if let Some(url) = urls.get(self.selected) {
                    self.dispatch(Msg::DownloadClicked { url: url.clone() }, runner);
                }
            }
            KeyCode::Char('y') => self.dispatch(Msg::CopyEnhancedClicked, runner),
            KeyCode::Char('x') => self.dispatch(Msg::ExportClicked, runner),
            _ => {}
        }
    }

    fn edit_input(&mut self, runner: &EffectRunner, edit: impl FnOnce(&mut String)) {
        let view = self.state.view();
        match self.focus {
            Focus::EnhanceInput => {
                let mut text = view.prompt_input;
                edit(&mut text);
                self.dispatch(Msg::PromptChanged(text), runner);
            }
            Focus::ImageInput => {
                let mut text = view.image_prompt_input;
                edit(&mut text);
                self.dispatch(Msg::ImagePromptChanged(text), runner);
            }
            Focus::FileInput => edit(&mut self.file_input),
            Focus::Results => {}
        }
    }

    fn clear_input(&mut self, runner: &EffectRunner) {
        match self.focus {
            Focus::EnhanceInput => self.dispatch(Msg::PromptCleared, runner),
            Focus::ImageInput => self.dispatch(Msg::ImagePromptCleared, runner),
            Focus::FileInput => {
                self.file_input.clear();
                self.dispatch(Msg::FileSelected(None), runner);
            }
            Focus::Results => {}
        }
    }

    fn submit(&mut self, runner: &EffectRunner) {
        match self.focus {
            Focus::EnhanceInput => self.dispatch(Msg::EnhanceClicked, runner),
            Focus::ImageInput => self.dispatch(Msg::GenerateClicked, runner),
            Focus::FileInput => {
                let picked = select_file(Path::new(self.file_input.trim()));
                let picked_something = picked.is_some();
                self.dispatch(Msg::FileSelected(picked), runner);
                // A rejected file already raised its own alert.
                if !picked_something || self.state.selected_file().is_some() {
                    self.dispatch(Msg::RemoveBackgroundClicked, runner);
                }
            }
            Focus::Results => {}
        }
    }
}

/// Describes the file at `path`, or `None` when it cannot be read as a regular file.
fn select_file(path: &Path) -> Option<SelectedFile> {
    if path.as_os_str().is_empty() {
        return None;
    }
    let metadata = match std::fs::metadata(path) {
        Ok(metadata) if metadata.is_file() => metadata,
        Ok(_) => {
            engine_warn!("Not a regular file: {:?}", path);
            return None;
        }
        Err(err) => {
            engine_warn!("Cannot read {:?}: {}", path, err);
            return None;
        }
    };
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    Some(SelectedFile {
        path: path.to_path_buf(),
        name,
        mime_type: mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string(),
        size: metadata.len(),
    })
}
