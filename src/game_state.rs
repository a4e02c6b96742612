use crate::provider::{Catalog, ProviderError, Selection, WordProvider};
use crate::round::{DEFAULT_LIVES, GuessResult, Round, RoundState};
use crate::stages::Stage;
use crate::{debug_log, info_log};
use rand::Rng;

/// Consecutive misses before a hint is offered, unless configured otherwise.
pub const DEFAULT_HINT_AFTER: u32 = 3;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameConfig {
    pub lives: u32,
    /// Offer a hint after this many misses in a row; 0 never offers one.
    pub hint_after: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            lives: DEFAULT_LIVES,
            hint_after: DEFAULT_HINT_AFTER,
        }
    }
}

impl GameConfig {
    #[must_use]
    pub fn offers_hint(&self, consecutive_misses: u32) -> bool {
        self.hint_after > 0 && consecutive_misses > 0 && consecutive_misses % self.hint_after == 0
    }
}

/// What the user asked for on the selection screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MenuAction {
    Select(Selection),
    Exit,
}

/// What the user asked for while playing or after a round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UserAction {
    Guess(char),
    BackToMenu,
    NewGame,
    Exit,
}

/// Snapshot of a round for rendering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundView {
    pub masked_word: String,
    pub lives: u32,
    pub mistakes_remaining: u32,
    pub stage: Stage,
    pub guessed_letters: Vec<char>,
    pub state: RoundState,
    /// Only filled in once the round is over.
    pub answer: Option<String>,
}

impl From<&Round> for RoundView {
    fn from(round: &Round) -> Self {
        let state = round.state();
        Self {
            masked_word: round.masked_word(),
            lives: round.lives(),
            mistakes_remaining: round.mistakes_remaining(),
            stage: round.stage(),
            guessed_letters: round.guessed_letters(),
            state,
            answer: (state != RoundState::InProgress).then(|| round.answer()),
        }
    }
}

/// Totals for one session, returned when the user quits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub rounds_won: u32,
    pub rounds_lost: u32,
}

/// Front end the session loop talks to.
///
/// Read methods return `None` when the input was invalid; the loop then asks
/// again.
pub trait GameInterface {
    fn display_loading(&mut self, message: &str);
    fn display_error(&mut self, message: &str);
    fn choose_selection(&mut self, catalog: &Catalog) -> Option<MenuAction>;
    fn display_round(&mut self, view: &RoundView);
    fn read_guess(&mut self) -> Option<UserAction>;
    fn display_guess_result(&mut self, letter: char, result: GuessResult);
    /// Ask whether the user wants a hint; `true` accepts.
    fn offer_hint(&mut self) -> bool;
    fn display_hint(&mut self, letter: char);
    fn display_round_over(&mut self, view: &RoundView);
    /// Wait for `NewGame` or `Exit` after a round has ended.
    fn read_round_over(&mut self) -> UserAction;
    fn display_exit_message(&mut self);
}

enum RoundEnd {
    Finished(RoundState),
    BackToMenu,
    Exit,
}

/// Run a session until the user quits.
///
/// # Errors
/// Only a failure to load the catalog ends the session early; word fetch
/// failures are shown and the user picks again.
pub fn game_loop<P, I>(
    provider: &P,
    interface: &mut I,
    config: &GameConfig,
) -> Result<SessionSummary, ProviderError>
where
    P: WordProvider + ?Sized,
    I: GameInterface + ?Sized,
{
    interface.display_loading("Loading languages and categories...");
    let catalog = match provider.categories_and_languages() {
        Ok(catalog) => catalog,
        Err(e) => {
            log::error!("Could not load catalog: {e}");
            interface.display_error(&e.to_string());
            return Err(e);
        }
    };

    let mut rng = rand::thread_rng();
    let mut summary = SessionSummary::default();

    loop {
        let selection = match interface.choose_selection(&catalog) {
            Some(MenuAction::Select(selection)) => selection,
            Some(MenuAction::Exit) => break,
            None => continue,
        };

        let Some(round) = start_round(provider, interface, config, &selection) else {
            continue;
        };

        match play_round(round, interface, config, &mut rng) {
            RoundEnd::Finished(state) => {
                if state == RoundState::Won {
                    summary.rounds_won += 1;
                } else {
                    summary.rounds_lost += 1;
                }
                if interface.read_round_over() == UserAction::Exit {
                    break;
                }
            }
            RoundEnd::BackToMenu => {}
            RoundEnd::Exit => break,
        }
    }

    info_log!(
        "Session over: {} won, {} lost",
        summary.rounds_won,
        summary.rounds_lost
    );
    interface.display_exit_message();
    Ok(summary)
}

fn start_round<P, I>(
    provider: &P,
    interface: &mut I,
    config: &GameConfig,
    selection: &Selection,
) -> Option<Round>
where
    P: WordProvider + ?Sized,
    I: GameInterface + ?Sized,
{
    interface.display_loading(&format!(
        "Fetching a word ({}/{})...",
        selection.language, selection.category
    ));
    let word = match provider.random_word(&selection.language, &selection.category) {
        Ok(word) => word,
        Err(e) => {
            log::warn!("Word request failed: {e}");
            interface.display_error(&e.to_string());
            return None;
        }
    };

    match Round::new(&word, config.lives) {
        Ok(round) => {
            info_log!(
                "New round: {}/{}, {} letters, {} lives",
                selection.language,
                selection.category,
                word.chars().count(),
                config.lives
            );
            Some(round)
        }
        Err(e) => {
            // The word itself is never shown
            log::warn!("Unplayable word from service: {e}");
            interface.display_error("the service sent a word that cannot be played, try again");
            None
        }
    }
}

fn play_round<I, R>(mut round: Round, interface: &mut I, config: &GameConfig, rng: &mut R) -> RoundEnd
where
    I: GameInterface + ?Sized,
    R: Rng + ?Sized,
{
    interface.display_round(&RoundView::from(&round));

    loop {
        let letter = match interface.read_guess() {
            Some(UserAction::Guess(letter)) => letter,
            Some(UserAction::BackToMenu | UserAction::NewGame) => {
                info_log!("Round abandoned");
                return RoundEnd::BackToMenu;
            }
            Some(UserAction::Exit) => return RoundEnd::Exit,
            None => continue,
        };

        let result = match round.apply_guess(letter) {
            Ok(result) => result,
            Err(e) => {
                // The interface validates letters, so this is a contract slip
                log::warn!("Guess '{letter}' rejected by round: {e}");
                continue;
            }
        };
        debug_log!(
            "Guess '{}' -> {:?}, {} lives left",
            letter,
            result,
            round.mistakes_remaining()
        );
        interface.display_guess_result(letter, result);
        let mut view = RoundView::from(&round);
        interface.display_round(&view);

        if result == GuessResult::Miss
            && view.state == RoundState::InProgress
            && config.offers_hint(round.consecutive_misses())
            && offer_hint(&mut round, interface, rng)
        {
            view = RoundView::from(&round);
            interface.display_round(&view);
        }

        if view.state != RoundState::InProgress {
            info_log!("Round over: {:?}", view.state);
            interface.display_round_over(&view);
            return RoundEnd::Finished(view.state);
        }
    }
}

/// Returns `true` when a hint letter was applied to the round.
fn offer_hint<I, R>(round: &mut Round, interface: &mut I, rng: &mut R) -> bool
where
    I: GameInterface + ?Sized,
    R: Rng + ?Sized,
{
    if !interface.offer_hint() {
        debug_log!("Hint declined");
        return false;
    }
    let Some(letter) = round.hint_letter(rng) else {
        return false;
    };
    match round.apply_guess(letter) {
        Ok(_) => {
            info_log!("Hint revealed '{}'", letter);
            interface.display_hint(letter);
            true
        }
        Err(e) => {
            log::warn!("Hint '{letter}' could not be applied: {e}");
            false
        }
    }
}
