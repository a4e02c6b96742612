//! TUI (Terminal User Interface) module for Hangman
//!
//! This module provides an interactive terminal interface using Ratatui.
//!
//! # State Machine
//! The UI follows these state transitions:
//! - `Selecting(Language)` → `Selecting(Category)` → `Loading` → `EnteringGuess`
//! - `EnteringGuess` ↔ `OfferingHint` after a run of wrong guesses
//! - `EnteringGuess` → `RoundOver` → back to `Selecting(Language)`

use crate::cli::spaced;
use crate::game_state::{GameInterface, MenuAction, RoundView, UserAction};
use crate::provider::{Catalog, Selection};
use crate::round::{GuessResult, RoundState, fold_letter};
use crate::{debug_log, info_log};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use std::io;

const EVENT_POLL_TIMEOUT_MS: u64 = 100;
const ASCII_CONTROL_CHAR_THRESHOLD: u32 = 32;
const GALLOWS_WIDTH: u16 = 18;

// Style constants for consistent UI
const HEADER_STYLE: Style = Style::new().fg(Color::Green).add_modifier(Modifier::BOLD);
const ERROR_STYLE: Style = Style::new().fg(Color::Red);
const SUCCESS_STYLE: Style = Style::new().fg(Color::Green).add_modifier(Modifier::BOLD);
const INFO_STYLE: Style = Style::new().fg(Color::Yellow).add_modifier(Modifier::BOLD);
const MESSAGE_STYLE: Style = Style::new().fg(Color::Cyan);
const DRAWING_STYLE: Style = Style::new().fg(Color::LightRed);
const WORD_STYLE: Style = Style::new().fg(Color::White).add_modifier(Modifier::BOLD);
const HIGHLIGHT_STYLE: Style = Style::new()
    .fg(Color::Black)
    .bg(Color::LightRed)
    .add_modifier(Modifier::BOLD);

#[derive(Clone, Debug, PartialEq)]
enum MenuStep {
    Language,
    Category { language: String },
}

#[derive(Debug)]
enum TuiState {
    Loading,
    Selecting { step: MenuStep, index: usize },
    EnteringGuess,
    OfferingHint,
    RoundOver,
}

/// Context for rendering the UI - groups related parameters to avoid too many function arguments.
struct RenderContext<'a> {
    state: &'a TuiState,
    options: &'a [String],
    view: Option<&'a RoundView>,
    message: &'a str,
    error_message: &'a str,
    status: &'a str,
}

/// Outcome of one key press on the selection screen.
enum MenuKey {
    Pending,
    Picked(Selection),
    Exit,
}

/// What the screen shows, kept apart from the terminal itself.
#[derive(Debug)]
struct TuiModel {
    state: TuiState,
    languages: Vec<String>,
    categories: Vec<String>,
    view: Option<RoundView>,
    message: String,
    error_message: String,
    status: String,
}

impl TuiModel {
    fn new() -> Self {
        Self {
            state: TuiState::Loading,
            languages: Vec::new(),
            categories: Vec::new(),
            view: None,
            message: String::new(),
            error_message: String::new(),
            status: "Starting".to_string(),
        }
    }

    /// Options shown by the current menu step.
    fn options(&self) -> &[String] {
        match &self.state {
            TuiState::Selecting {
                step: MenuStep::Language,
                ..
            } => &self.languages,
            TuiState::Selecting {
                step: MenuStep::Category { .. },
                ..
            } => &self.categories,
            _ => &[],
        }
    }

    fn render_context(&self) -> RenderContext<'_> {
        RenderContext {
            state: &self.state,
            options: self.options(),
            view: self.view.as_ref(),
            message: &self.message,
            error_message: &self.error_message,
            status: &self.status,
        }
    }

    fn handle_menu_input(&mut self, key: KeyEvent) -> MenuKey {
        let TuiState::Selecting { step, index } = &self.state else {
            return MenuKey::Pending;
        };
        let (step, index) = (step.clone(), *index);
        let len = self.options().len();

        match key.code {
            KeyCode::Esc => return MenuKey::Exit,
            _ if TuiInterface::is_interrupt(&key) => return MenuKey::Exit,
            KeyCode::Up | KeyCode::Char('k') if len > 0 => {
                self.state = TuiState::Selecting {
                    step,
                    index: (index + len - 1) % len,
                };
            }
            KeyCode::Down | KeyCode::Char('j') if len > 0 => {
                self.state = TuiState::Selecting {
                    step,
                    index: (index + 1) % len,
                };
            }
            KeyCode::Backspace if matches!(step, MenuStep::Category { .. }) => {
                self.state = TuiState::Selecting {
                    step: MenuStep::Language,
                    index: 0,
                };
            }
            KeyCode::Enter if index < len => {
                let choice = self.options()[index].clone();
                self.error_message.clear();
                match step {
                    MenuStep::Language => {
                        info_log!("handle_menu_input() - Language chosen: {}", choice);
                        self.state = TuiState::Selecting {
                            step: MenuStep::Category { language: choice },
                            index: 0,
                        };
                    }
                    MenuStep::Category { language } => {
                        info_log!("handle_menu_input() - Category chosen: {}", choice);
                        return MenuKey::Picked(Selection::new(language, choice));
                    }
                }
            }
            _ => {
                debug_log!("handle_menu_input() - Ignoring key: {:?}", key.code);
            }
        }
        MenuKey::Pending
    }

    fn handle_guess_input(&mut self, key: KeyEvent) -> Option<UserAction> {
        if TuiInterface::is_interrupt(&key) {
            return Some(UserAction::Exit);
        }
        match key.code {
            KeyCode::Esc => {
                info_log!("handle_guess_input() - ESC pressed, returning to menu");
                Some(UserAction::BackToMenu)
            }
            KeyCode::Char(_) if TuiInterface::has_modifier_keys(&key) => {
                debug_log!(
                    "handle_guess_input() - Ignoring character with modifier: {:?}",
                    key.modifiers
                );
                None
            }
            KeyCode::Char(c) if c.is_alphabetic() => {
                self.error_message.clear();
                Some(UserAction::Guess(fold_letter(c)))
            }
            KeyCode::Char(c) => {
                self.error_message = format!("Only letters are allowed! ('{c}' is not a letter)");
                None
            }
            _ => None,
        }
    }
}

/// Main TUI interface component.
///
/// Manages terminal rendering, input handling, and round display.
pub struct TuiInterface {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    model: TuiModel,
}

impl TuiInterface {
    pub fn new() -> Result<Self, io::Error> {
        info_log!("TuiInterface::new() - Initializing TUI");
        enable_raw_mode()?;
        let terminal = setup_or_restore(Self::enter_screen, restore_terminal)?;
        info_log!("Terminal setup complete: raw mode, alternate screen, cursor hidden");

        Ok(Self {
            terminal,
            model: TuiModel::new(),
        })
    }

    fn enter_screen() -> Result<Terminal<CrosstermBackend<io::Stdout>>, io::Error> {
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, cursor::Hide)?;
        Terminal::new(CrosstermBackend::new(stdout))
    }

    pub fn cleanup(&mut self) -> Result<(), io::Error> {
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            cursor::Show
        )?;
        Ok(())
    }

    /// Draw the current UI state to the terminal.
    ///
    /// Returns an error if rendering fails.
    fn draw(&mut self) -> Result<(), io::Error> {
        let ctx = self.model.render_context();
        self.terminal.draw(|f| {
            Self::render_static(f, &ctx);
        })?;
        Ok(())
    }

    /// Log and handle draw errors appropriately
    fn draw_or_log(&mut self) {
        if let Err(e) = self.draw() {
            debug_log!("Draw error: {}", e);
        }
    }

    /// Render the complete UI layout using the provided context.
    fn render_static(f: &mut Frame, ctx: &RenderContext) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),  // Title
                Constraint::Min(10),    // Menu or round
                Constraint::Length(5),  // Messages
                Constraint::Length(3),  // Status line
                Constraint::Length(3),  // Instructions
            ])
            .split(f.area());

        Self::render_title(f, chunks[0]);
        match ctx.state {
            TuiState::Selecting { step, index } => {
                Self::render_menu(f, chunks[1], step, ctx.options, *index);
            }
            TuiState::Loading if ctx.view.is_none() => {}
            _ => {
                if let Some(view) = ctx.view {
                    Self::render_round(f, chunks[1], view);
                }
            }
        }
        Self::render_info(f, chunks[2], ctx.message, ctx.error_message);
        Self::render_status(f, chunks[3], ctx.status);
        Self::render_instructions(f, chunks[4], ctx.state);
    }

    fn render_title(f: &mut Frame, area: Rect) {
        let title = Paragraph::new("HANGMAN")
            .style(HEADER_STYLE)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(title, area);
    }

    fn render_menu(f: &mut Frame, area: Rect, step: &MenuStep, options: &[String], index: usize) {
        let title = match step {
            MenuStep::Language => "Choose language".to_string(),
            MenuStep::Category { language } => format!("Choose your category ({language})"),
        };
        let items: Vec<ListItem> = options
            .iter()
            .map(|option| ListItem::new(format!("  {option}")))
            .collect();
        let list = List::new(items)
            .block(Block::default().title(title).borders(Borders::ALL))
            .highlight_style(HIGHLIGHT_STYLE)
            .highlight_symbol("> ");
        let mut list_state = ListState::default().with_selected(Some(index));
        f.render_stateful_widget(list, area, &mut list_state);
    }

    fn render_round(f: &mut Frame, area: Rect, view: &RoundView) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(GALLOWS_WIDTH), Constraint::Min(20)])
            .split(area);

        let gallows: Vec<Line> = view
            .stage
            .gallows()
            .into_iter()
            .map(|row| Line::from(Span::styled(row, DRAWING_STYLE)))
            .collect();
        f.render_widget(
            Paragraph::new(gallows).block(Block::default().title("Gallows").borders(Borders::ALL)),
            columns[0],
        );

        let guessed: String = if view.guessed_letters.is_empty() {
            "-".to_string()
        } else {
            spaced(&view.guessed_letters.iter().collect::<String>())
        };
        let mut lines = vec![
            Line::from(""),
            Line::from(Span::styled(spaced(&view.masked_word), WORD_STYLE)),
            Line::from(""),
            Line::from(vec![
                Span::raw("Lives Remaining: "),
                Span::styled(
                    format!("{}/{}", view.mistakes_remaining, view.lives),
                    Self::lives_style(view.mistakes_remaining, view.lives),
                ),
            ]),
            Line::from(format!("Guessed: {guessed}")),
        ];
        match view.state {
            RoundState::Won => {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled("Congrats! You WON!", SUCCESS_STYLE)));
            }
            RoundState::Lost => {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    format!(
                        "You LOST! The word was {}",
                        view.answer.as_deref().unwrap_or("")
                    ),
                    ERROR_STYLE,
                )));
            }
            RoundState::InProgress => {}
        }
        f.render_widget(
            Paragraph::new(lines)
                .alignment(Alignment::Center)
                .block(Block::default().title("Word").borders(Borders::ALL)),
            columns[1],
        );
    }

    fn lives_style(remaining: u32, lives: u32) -> Style {
        if remaining * 2 > lives {
            SUCCESS_STYLE
        } else if remaining > 1 {
            INFO_STYLE
        } else {
            ERROR_STYLE
        }
    }

    fn render_info(f: &mut Frame, area: Rect, message: &str, error_message: &str) {
        let mut lines = Vec::new();
        if !message.is_empty() {
            lines.push(Line::from(vec![Span::styled(message, MESSAGE_STYLE)]));
        }
        if !error_message.is_empty() {
            lines.push(Line::from(vec![Span::styled(error_message, ERROR_STYLE)]));
        }

        let paragraph = Paragraph::new(lines)
            .block(Block::default().title("Information").borders(Borders::ALL))
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    fn render_instructions(f: &mut Frame, area: Rect, state: &TuiState) {
        let text = match state {
            TuiState::Loading => "Please wait...",
            TuiState::Selecting {
                step: MenuStep::Language,
                ..
            } => "UP/DOWN: Move | ENTER: Choose | ESC: Quit",
            TuiState::Selecting { .. } => {
                "UP/DOWN: Move | ENTER: Play | BACKSPACE: Change language | ESC: Quit"
            }
            TuiState::EnteringGuess => "Type a letter to guess | ESC: Back to menu | CTRL-C: Quit",
            TuiState::OfferingHint => "Y: Take the hint | N: No thanks",
            TuiState::RoundOver => "N / ENTER: New Game | ESC: Quit",
        };

        let paragraph = Paragraph::new(text)
            .style(Style::default().fg(Color::Gray))
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }

    fn render_status(f: &mut Frame, area: Rect, status: &str) {
        let status_text = if status.is_empty() { "Ready" } else { status };
        let paragraph = Paragraph::new(status_text)
            .style(HEADER_STYLE)
            .block(Block::default().borders(Borders::ALL).title("Status"));
        f.render_widget(paragraph, area);
    }

    /// Wait briefly for the next key press.
    ///
    /// Returns `Ok(None)` when nothing relevant arrived within the poll window.
    fn next_key() -> Result<Option<KeyEvent>, io::Error> {
        if !event::poll(std::time::Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            return Ok(None);
        }

        let event = event::read()?;
        debug_log!("next_key() - Event received: {:?}", event);

        // Filter out non-key events (mouse, focus, etc.)
        let Event::Key(key) = event else {
            return Ok(None);
        };

        // Only process Press events, ignore Release and Repeat to avoid double input
        if key.kind != event::KeyEventKind::Press {
            return Ok(None);
        }

        // Filter out garbage from terminal focus escape sequences (alt-tab)
        if let KeyCode::Char(c) = key.code
            && (c == '\u{FFFD}' || (c as u32) < ASCII_CONTROL_CHAR_THRESHOLD)
        {
            debug_log!("next_key() - Ignoring invalid character: {:?}", c);
            return Ok(None);
        }

        Ok(Some(key))
    }

    /// Draw, then block until a key arrives. `None` means the terminal failed.
    fn wait_for_key(&mut self) -> Option<KeyEvent> {
        loop {
            if self.draw().is_err() {
                info_log!("wait_for_key() - Draw failed");
                return None;
            }
            match Self::next_key() {
                Ok(Some(key)) => return Some(key),
                Ok(None) => {}
                Err(_e) => {
                    info_log!("wait_for_key() - Error reading input: {}", _e);
                    return None;
                }
            }
        }
    }

    fn is_interrupt(key: &KeyEvent) -> bool {
        key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c')
    }

    fn has_modifier_keys(key: &KeyEvent) -> bool {
        key.modifiers.contains(KeyModifiers::ALT) || key.modifiers.contains(KeyModifiers::CONTROL)
    }

    fn handle_hint_input(key: KeyEvent) -> Option<bool> {
        match key.code {
            KeyCode::Char('y' | 'Y') => Some(true),
            KeyCode::Char('n' | 'N') | KeyCode::Esc => Some(false),
            _ => None,
        }
    }

    fn handle_round_over_input(key: KeyEvent) -> Option<UserAction> {
        if Self::is_interrupt(&key) {
            return Some(UserAction::Exit);
        }
        match key.code {
            KeyCode::Char('n' | 'N') | KeyCode::Enter => Some(UserAction::NewGame),
            KeyCode::Esc | KeyCode::Char('q' | 'Q') => Some(UserAction::Exit),
            _ => None,
        }
    }

    /// Transition to the `EnteringGuess` state
    fn transition_to_entering_guess(&mut self) {
        self.model.state = TuiState::EnteringGuess;
    }

    /// Transition to the `RoundOver` state
    fn transition_to_round_over(&mut self) {
        self.model.state = TuiState::RoundOver;
    }
}

/// Run `setup`, calling `restore` before handing back its error.
fn setup_or_restore<T>(
    setup: impl FnOnce() -> Result<T, io::Error>,
    restore: impl FnOnce(),
) -> Result<T, io::Error> {
    setup().inspect_err(|_e| {
        info_log!("Terminal setup failed, restoring: {}", _e);
        restore();
    })
}

fn restore_terminal() {
    let mut stdout = io::stdout();
    let _ = execute!(stdout, LeaveAlternateScreen, cursor::Show);
    let _ = disable_raw_mode();
}

impl GameInterface for TuiInterface {
    fn display_loading(&mut self, message: &str) {
        self.model.state = TuiState::Loading;
        self.model.status = message.to_string();
        self.draw_or_log();
    }

    fn display_error(&mut self, message: &str) {
        self.model.error_message = format!("Error! {message}");
        self.draw_or_log();
    }

    fn choose_selection(&mut self, catalog: &Catalog) -> Option<MenuAction> {
        self.model.languages = catalog.languages.iter().cloned().collect();
        self.model.categories = catalog.categories.iter().cloned().collect();
        self.model.view = None;
        self.model.message.clear();
        self.model.state = TuiState::Selecting {
            step: MenuStep::Language,
            index: 0,
        };
        self.model.status = "Pick a language and a category".to_string();

        loop {
            let Some(key) = self.wait_for_key() else {
                return Some(MenuAction::Exit);
            };
            match self.model.handle_menu_input(key) {
                MenuKey::Pending => {}
                MenuKey::Picked(selection) => return Some(MenuAction::Select(selection)),
                MenuKey::Exit => return Some(MenuAction::Exit),
            }
        }
    }

    fn display_round(&mut self, view: &RoundView) {
        if view.state == RoundState::InProgress {
            self.transition_to_entering_guess();
            self.model.status = format!("Word of {} characters", view.masked_word.chars().count());
        }
        self.model.view = Some(view.clone());
        self.draw_or_log();
    }

    fn read_guess(&mut self) -> Option<UserAction> {
        self.transition_to_entering_guess();
        loop {
            let Some(key) = self.wait_for_key() else {
                return Some(UserAction::Exit);
            };
            if let Some(action) = self.model.handle_guess_input(key) {
                info_log!("read_guess() - Action received: {:?}", action);
                return Some(action);
            }
        }
    }

    fn display_guess_result(&mut self, letter: char, result: GuessResult) {
        self.model.message = match result {
            GuessResult::Hit => format!("Yes! '{letter}' is in the word."),
            GuessResult::Miss => format!("No '{letter}' in the word."),
            GuessResult::AlreadyGuessed => format!("\"{letter}\" was already guessed."),
        };
        self.draw_or_log();
    }

    fn offer_hint(&mut self) -> bool {
        self.model.state = TuiState::OfferingHint;
        self.model.status = "Do you want a hint?".to_string();
        loop {
            let Some(key) = self.wait_for_key() else {
                return false;
            };
            if let Some(answer) = Self::handle_hint_input(key) {
                self.transition_to_entering_guess();
                return answer;
            }
        }
    }

    fn display_hint(&mut self, letter: char) {
        self.model.message = format!("Hint: the letter '{letter}' is in the word.");
        self.draw_or_log();
    }

    fn display_round_over(&mut self, view: &RoundView) {
        self.model.view = Some(view.clone());
        self.transition_to_round_over();
        self.model.status = match view.state {
            RoundState::Won => "Game Over - You won".to_string(),
            _ => "Game Over - You lost".to_string(),
        };
        self.draw_or_log();
    }

    fn read_round_over(&mut self) -> UserAction {
        self.transition_to_round_over();
        loop {
            let Some(key) = self.wait_for_key() else {
                return UserAction::Exit;
            };
            if let Some(action) = Self::handle_round_over_input(key) {
                return action;
            }
        }
    }

    fn display_exit_message(&mut self) {
        self.model.message = "Exiting...".to_string();
        self.model.status = "Exiting application...".to_string();
        self.draw_or_log();
    }
}

impl Drop for TuiInterface {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}
