use crate::game_state::{
    DEFAULT_HINT_AFTER, GameConfig, GameInterface, MenuAction, RoundView, UserAction,
};
use crate::provider::{Catalog, DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS, Selection};
use crate::round::{DEFAULT_LIVES, GuessResult, RoundState, fold_letter};
use clap::Parser;
use std::io::BufRead;
use std::path::PathBuf;
use std::time::Duration;

/// Hangman with words from the random words API
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Base URL of the word service
    #[arg(long = "api-url", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Wrong guesses allowed per round
    #[arg(
        short = 'l',
        long = "lives",
        default_value_t = DEFAULT_LIVES,
        value_parser = clap::value_parser!(u32).range(1..=26)
    )]
    pub lives: u32,

    /// Offer a hint after this many wrong guesses in a row (0 disables hints)
    #[arg(long = "hint-after", default_value_t = DEFAULT_HINT_AFTER)]
    pub hint_after: u32,

    /// HTTP request timeout in seconds
    #[arg(long = "timeout", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Use the line-based interface instead of the full-screen one
    #[arg(long = "plain")]
    pub plain: bool,

    /// Where to write the log (defaults to the user cache directory)
    #[arg(long = "log-file")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    #[must_use]
    pub fn game_config(&self) -> GameConfig {
        GameConfig {
            lives: self.lives,
            hint_after: self.hint_after,
        }
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[must_use]
pub fn parse_cli() -> Cli {
    Cli::parse()
}

// Input validation, shared with the TUI

/// Validate a typed guess: exactly one letter, surrounding whitespace ignored.
///
/// # Errors
/// Returns the message to show the user.
pub fn parse_guess(input: &str) -> Result<char, String> {
    let mut chars = input.trim().chars();
    match (chars.next(), chars.next()) {
        (None, _) => Err("You must enter a letter.".to_string()),
        (Some(c), None) if c.is_alphabetic() => Ok(fold_letter(c)),
        (Some(c), None) => Err(format!("'{c}' is not a letter.")),
        (Some(_), Some(_)) => Err("You must enter exactly one letter.".to_string()),
    }
}

/// Match a menu answer against `options`, by 1-based number or by name.
#[must_use]
pub fn parse_choice<'a>(input: &str, options: &'a [String]) -> Option<&'a String> {
    let input = input.trim();
    if let Ok(number) = input.parse::<usize>() {
        return number.checked_sub(1).and_then(|i| options.get(i));
    }
    options.iter().find(|option| option.eq_ignore_ascii_case(input))
}

fn is_exit(input: &str) -> bool {
    matches!(input.trim().to_lowercase().as_str(), "exit" | "quit")
}

fn is_back(input: &str) -> bool {
    matches!(input.trim().to_lowercase().as_str(), "back" | "menu")
}

fn is_yes(input: &str) -> bool {
    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}

fn is_no(input: &str) -> bool {
    matches!(input.trim().to_lowercase().as_str(), "n" | "no")
}

/// Spaced-out word for display, e.g. `A _ _ L E`.
#[must_use]
pub fn spaced(word: &str) -> String {
    word.chars()
        .map(String::from)
        .collect::<Vec<_>>()
        .join(" ")
}

fn letters_list(letters: &[char]) -> String {
    if letters.is_empty() {
        return "-".to_string();
    }
    letters
        .iter()
        .map(char::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

enum Choice {
    Picked(String),
    Invalid,
    Exit,
}

/// Line-based implementation of [`GameInterface`] over any reader.
pub struct CliInterface<R: BufRead> {
    reader: R,
}

impl<R: BufRead> CliInterface<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    // None on end of input or a read error
    fn read_line(&mut self) -> Option<String> {
        let mut input = String::new();
        match self.reader.read_line(&mut input) {
            Ok(0) => None,
            Ok(_) => Some(input.trim().to_string()),
            Err(e) => {
                log::error!("Could not read input: {e}");
                println!("Error! Could not read input ({e}), quitting.");
                None
            }
        }
    }

    fn choose_from(&mut self, title: &str, options: &[String]) -> Choice {
        println!("\n{title}:");
        for (i, option) in options.iter().enumerate() {
            println!("{:>3}. {option}", i + 1);
        }
        println!("Enter a number or name ('exit' to quit):");

        let Some(input) = self.read_line() else {
            return Choice::Exit;
        };
        if is_exit(&input) {
            return Choice::Exit;
        }
        match parse_choice(&input, options) {
            Some(choice) => Choice::Picked(choice.clone()),
            None => {
                println!("'{input}' is not one of the options.");
                Choice::Invalid
            }
        }
    }
}

impl<R: BufRead> GameInterface for CliInterface<R> {
    fn display_loading(&mut self, message: &str) {
        println!("{message}");
    }

    fn display_error(&mut self, message: &str) {
        println!("Error! {message}");
    }

    fn choose_selection(&mut self, catalog: &Catalog) -> Option<MenuAction> {
        let languages: Vec<String> = catalog.languages.iter().cloned().collect();
        let categories: Vec<String> = catalog.categories.iter().cloned().collect();

        let language = match self.choose_from("Choose language", &languages) {
            Choice::Picked(language) => language,
            Choice::Invalid => return None,
            Choice::Exit => return Some(MenuAction::Exit),
        };
        let category = match self.choose_from("Choose your category", &categories) {
            Choice::Picked(category) => category,
            Choice::Invalid => return None,
            Choice::Exit => return Some(MenuAction::Exit),
        };
        Some(MenuAction::Select(Selection::new(language, category)))
    }

    fn display_round(&mut self, view: &RoundView) {
        println!();
        for row in view.stage.gallows() {
            println!("{row}");
        }
        println!("\nWord: {}", spaced(&view.masked_word));
        println!("Lives remaining: {}/{}", view.mistakes_remaining, view.lives);
        println!("Guessed: {}", letters_list(&view.guessed_letters));
    }

    fn read_guess(&mut self) -> Option<UserAction> {
        println!("\nEnter a letter ('back' for the menu, 'exit' to quit):");
        let Some(input) = self.read_line() else {
            return Some(UserAction::Exit);
        };
        if is_exit(&input) {
            return Some(UserAction::Exit);
        }
        if is_back(&input) {
            return Some(UserAction::BackToMenu);
        }
        match parse_guess(&input) {
            Ok(letter) => Some(UserAction::Guess(letter)),
            Err(message) => {
                println!("{message}");
                None
            }
        }
    }

    fn display_guess_result(&mut self, letter: char, result: GuessResult) {
        match result {
            GuessResult::Hit => println!("Yes! '{letter}' is in the word."),
            GuessResult::Miss => println!("No '{letter}' in the word."),
            GuessResult::AlreadyGuessed => println!("\"{letter}\" was already guessed."),
        }
    }

    fn offer_hint(&mut self) -> bool {
        println!("Do you want a hint? (y/n)");
        self.read_line().is_some_and(|input| is_yes(&input))
    }

    fn display_hint(&mut self, letter: char) {
        println!("Hint: the letter '{letter}' is in the word.");
    }

    fn display_round_over(&mut self, view: &RoundView) {
        match view.state {
            RoundState::Won => println!("\nCongrats! You WON!"),
            RoundState::Lost => println!(
                "\nYou LOST! The word was {}",
                view.answer.as_deref().unwrap_or("")
            ),
            RoundState::InProgress => {}
        }
    }

    fn read_round_over(&mut self) -> UserAction {
        loop {
            println!("Play again? (y/n)");
            let Some(input) = self.read_line() else {
                return UserAction::Exit;
            };
            if is_yes(&input) {
                return UserAction::NewGame;
            }
            if is_no(&input) || is_exit(&input) {
                return UserAction::Exit;
            }
            println!("Please answer y or n.");
        }
    }

    fn display_exit_message(&mut self) {
        println!("Goodbye.");
    }
}
