//! Hangman round engine.
//!
//! A [`Round`] owns the secret word, the letters tried so far and the remaining
//! lives. [`Round::apply_guess`] is the only operation that changes it; every
//! other method is a read-only query, so a round can be rendered as often as
//! needed. There is no I/O here.

use crate::stages::Stage;
use rand::Rng;
use rand::seq::IteratorRandom;
use std::collections::BTreeSet;
use thiserror::Error;

/// Placeholder shown for letters that have not been guessed yet.
pub const PLACEHOLDER: char = '_';

/// Lives given to a round unless configured otherwise.
pub const DEFAULT_LIVES: u32 = 6;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundState {
    InProgress,
    Won,
    Lost,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuessResult {
    Hit,
    Miss,
    /// The letter was tried before; nothing changed.
    AlreadyGuessed,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoundError {
    #[error("the round is already over")]
    RoundAlreadyOver,
    #[error("'{0}' is not a letter")]
    NotALetter(char),
    #[error("the word {0:?} has no letters to guess")]
    NoLetters(String),
    #[error("a round needs at least one life")]
    NoLives,
}

/// Fold a letter to the form used for comparisons.
#[must_use]
pub fn fold_letter(letter: char) -> char {
    letter.to_lowercase().next().unwrap_or(letter)
}

#[derive(Clone, Debug)]
pub struct Round {
    word: Vec<char>,
    guessed: BTreeSet<char>,
    lives: u32,
    mistakes_remaining: u32,
    consecutive_misses: u32,
    state: RoundState,
}

impl Round {
    /// Start a round for `word` with `lives` allowed mistakes.
    ///
    /// # Errors
    /// Returns [`RoundError::NoLetters`] when the word contains nothing to
    /// guess and [`RoundError::NoLives`] when `lives` is zero.
    pub fn new(word: &str, lives: u32) -> Result<Self, RoundError> {
        if lives == 0 {
            return Err(RoundError::NoLives);
        }
        let word: Vec<char> = word.trim().chars().collect();
        if !word.iter().any(|c| c.is_alphabetic()) {
            return Err(RoundError::NoLetters(word.into_iter().collect()));
        }
        Ok(Self {
            word,
            guessed: BTreeSet::new(),
            lives,
            mistakes_remaining: lives,
            consecutive_misses: 0,
            state: RoundState::InProgress,
        })
    }

    /// Apply one guessed letter and report what it did.
    ///
    /// # Errors
    /// Fails without touching the round if the round has already ended or if
    /// `letter` is not alphabetic.
    pub fn apply_guess(&mut self, letter: char) -> Result<GuessResult, RoundError> {
        if self.state != RoundState::InProgress {
            return Err(RoundError::RoundAlreadyOver);
        }
        if !letter.is_alphabetic() {
            return Err(RoundError::NotALetter(letter));
        }

        let letter = fold_letter(letter);
        if !self.guessed.insert(letter) {
            return Ok(GuessResult::AlreadyGuessed);
        }

        if self.contains(letter) {
            self.consecutive_misses = 0;
            if self.is_fully_revealed() {
                self.state = RoundState::Won;
            }
            Ok(GuessResult::Hit)
        } else {
            self.mistakes_remaining -= 1;
            self.consecutive_misses += 1;
            if self.mistakes_remaining == 0 {
                self.state = RoundState::Lost;
            }
            Ok(GuessResult::Miss)
        }
    }

    /// The secret word with every unguessed letter replaced by [`PLACEHOLDER`].
    #[must_use]
    pub fn masked_word(&self) -> String {
        self.word
            .iter()
            .map(|&c| {
                if self.is_revealed(c) {
                    c
                } else {
                    PLACEHOLDER
                }
            })
            .collect()
    }

    /// Pick a random letter of the word that has not been guessed yet.
    ///
    /// Every distinct hidden letter is equally likely, however often it
    /// occurs. Returns `None` once the round is over. Feeding the letter back
    /// through [`Round::apply_guess`] is always a hit.
    pub fn hint_letter<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<char> {
        if self.state != RoundState::InProgress {
            return None;
        }
        let hidden: BTreeSet<char> = self
            .word
            .iter()
            .filter(|&&c| !self.is_revealed(c))
            .map(|&c| fold_letter(c))
            .collect();
        hidden.into_iter().choose(rng)
    }

    #[must_use]
    pub fn state(&self) -> RoundState {
        self.state
    }

    #[must_use]
    pub fn lives(&self) -> u32 {
        self.lives
    }

    #[must_use]
    pub fn mistakes_remaining(&self) -> u32 {
        self.mistakes_remaining
    }

    #[must_use]
    pub fn mistakes_made(&self) -> u32 {
        self.lives - self.mistakes_remaining
    }

    #[must_use]
    pub fn consecutive_misses(&self) -> u32 {
        self.consecutive_misses
    }

    /// Letters tried so far, in alphabetical order.
    #[must_use]
    pub fn guessed_letters(&self) -> Vec<char> {
        self.guessed.iter().copied().collect()
    }

    #[must_use]
    pub fn answer(&self) -> String {
        self.word.iter().collect()
    }

    #[must_use]
    pub fn stage(&self) -> Stage {
        Stage::for_mistakes(self.mistakes_made(), self.lives)
    }

    fn contains(&self, folded: char) -> bool {
        self.word.iter().any(|&c| fold_letter(c) == folded)
    }

    // Non-letters are never hidden.
    fn is_revealed(&self, c: char) -> bool {
        !c.is_alphabetic() || self.guessed.contains(&fold_letter(c))
    }

    fn is_fully_revealed(&self) -> bool {
        self.word.iter().all(|&c| self.is_revealed(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn round(word: &str, lives: u32) -> Round {
        Round::new(word, lives).expect("valid round")
    }

    #[test]
    fn test_new_round_starts_in_progress() {
        let r = round("APPLE", 6);
        assert_eq!(r.state(), RoundState::InProgress);
        assert_eq!(r.mistakes_remaining(), 6);
        assert!(r.guessed_letters().is_empty());
        assert_eq!(r.masked_word(), "_____");
        assert_eq!(r.stage().index(), 0);
    }

    #[test]
    fn test_apple_scenario() {
        let mut r = round("APPLE", 6);

        assert_eq!(r.apply_guess('A'), Ok(GuessResult::Hit));
        assert_eq!(r.masked_word(), "A____");

        assert_eq!(r.apply_guess('Z'), Ok(GuessResult::Miss));
        assert_eq!(r.masked_word(), "A____");
        assert_eq!(r.mistakes_remaining(), 5);

        assert_eq!(r.apply_guess('P'), Ok(GuessResult::Hit));
        assert_eq!(r.masked_word(), "APP__");

        assert_eq!(r.apply_guess('L'), Ok(GuessResult::Hit));
        assert_eq!(r.masked_word(), "APPL_");

        assert_eq!(r.apply_guess('E'), Ok(GuessResult::Hit));
        assert_eq!(r.masked_word(), "APPLE");
        assert_eq!(r.state(), RoundState::Won);
        assert_eq!(r.mistakes_remaining(), 5);
    }

    #[test]
    fn test_cat_scenario_loses_with_one_life() {
        let mut r = round("CAT", 1);
        assert_eq!(r.apply_guess('Z'), Ok(GuessResult::Miss));
        assert_eq!(r.mistakes_remaining(), 0);
        assert_eq!(r.state(), RoundState::Lost);
        assert!(r.stage().is_final());

        assert_eq!(r.apply_guess('A'), Err(RoundError::RoundAlreadyOver));
        assert_eq!(r.guessed_letters(), vec!['z']);
        assert_eq!(r.masked_word(), "___");
    }

    #[test]
    fn test_guess_after_win_is_rejected() {
        let mut r = round("ox", 3);
        r.apply_guess('o').unwrap();
        r.apply_guess('x').unwrap();
        assert_eq!(r.state(), RoundState::Won);
        assert_eq!(r.apply_guess('q'), Err(RoundError::RoundAlreadyOver));
        assert_eq!(r.mistakes_remaining(), 3);
    }

    #[test]
    fn test_every_miss_costs_exactly_one_life() {
        let mut r = round("hangman", 6);
        for (i, letter) in ['b', 'c', 'd', 'e', 'f'].into_iter().enumerate() {
            let before = r.mistakes_remaining();
            assert_eq!(r.apply_guess(letter), Ok(GuessResult::Miss));
            assert_eq!(r.mistakes_remaining(), before - 1);
            assert_eq!(r.state(), RoundState::InProgress, "after miss {i}");
        }
        assert_eq!(r.apply_guess('i'), Ok(GuessResult::Miss));
        assert_eq!(r.mistakes_remaining(), 0);
        assert_eq!(r.state(), RoundState::Lost);
    }

    #[test]
    fn test_hit_keeps_lives_until_word_complete() {
        let mut r = round("banana", 6);
        assert_eq!(r.apply_guess('a'), Ok(GuessResult::Hit));
        assert_eq!(r.state(), RoundState::InProgress);
        assert_eq!(r.apply_guess('n'), Ok(GuessResult::Hit));
        assert_eq!(r.state(), RoundState::InProgress);
        assert_eq!(r.apply_guess('b'), Ok(GuessResult::Hit));
        assert_eq!(r.state(), RoundState::Won);
        assert_eq!(r.mistakes_remaining(), 6);
    }

    #[test]
    fn test_repeat_guess_changes_nothing() {
        let mut r = round("apple", 6);
        r.apply_guess('a').unwrap();
        r.apply_guess('z').unwrap();
        let guessed = r.guessed_letters();
        let lives = r.mistakes_remaining();

        assert_eq!(r.apply_guess('a'), Ok(GuessResult::AlreadyGuessed));
        assert_eq!(r.apply_guess('z'), Ok(GuessResult::AlreadyGuessed));
        assert_eq!(r.guessed_letters(), guessed);
        assert_eq!(r.mistakes_remaining(), lives);
        assert_eq!(r.state(), RoundState::InProgress);
    }

    #[test]
    fn test_guesses_ignore_case() {
        let mut r = round("Apple", 6);
        assert_eq!(r.apply_guess('a'), Ok(GuessResult::Hit));
        assert_eq!(r.apply_guess('A'), Ok(GuessResult::AlreadyGuessed));
        assert_eq!(r.apply_guess('P'), Ok(GuessResult::Hit));
        // Original casing is kept for display
        assert_eq!(r.masked_word(), "App__");
        assert_eq!(r.guessed_letters(), vec!['a', 'p']);
    }

    #[test]
    fn test_non_letters_are_visible_and_not_required() {
        let mut r = round("ice-cream cone", 6);
        assert_eq!(r.masked_word(), "___-_____ ____");
        for letter in ['i', 'c', 'e', 'r', 'a', 'm', 'o', 'n'] {
            r.apply_guess(letter).unwrap();
        }
        assert_eq!(r.masked_word(), "ice-cream cone");
        assert_eq!(r.state(), RoundState::Won);
    }

    #[test]
    fn test_accented_letters() {
        let mut r = round("Ñandú", 6);
        assert_eq!(r.apply_guess('ñ'), Ok(GuessResult::Hit));
        assert_eq!(r.apply_guess('Ú'), Ok(GuessResult::Hit));
        assert_eq!(r.masked_word(), "Ñ___ú");
    }

    #[test]
    fn test_non_letter_guess_is_rejected() {
        let mut r = round("cat", 6);
        assert_eq!(r.apply_guess('3'), Err(RoundError::NotALetter('3')));
        assert_eq!(r.apply_guess(' '), Err(RoundError::NotALetter(' ')));
        assert!(r.guessed_letters().is_empty());
        assert_eq!(r.mistakes_remaining(), 6);
    }

    #[test]
    fn test_masked_word_is_read_only() {
        let mut r = round("apple", 6);
        r.apply_guess('p').unwrap();
        let first = r.masked_word();
        for _ in 0..10 {
            assert_eq!(r.masked_word(), first);
        }
        assert_eq!(r.guessed_letters(), vec!['p']);
        assert_eq!(r.mistakes_remaining(), 6);
        assert_eq!(r.state(), RoundState::InProgress);
    }

    #[test]
    fn test_invalid_rounds() {
        assert_eq!(Round::new("cat", 0).unwrap_err(), RoundError::NoLives);
        assert!(matches!(
            Round::new("  ", 6),
            Err(RoundError::NoLetters(_))
        ));
        assert!(matches!(
            Round::new("1234", 6),
            Err(RoundError::NoLetters(_))
        ));
    }

    #[test]
    fn test_consecutive_misses_reset_on_hit() {
        let mut r = round("cat", 6);
        r.apply_guess('x').unwrap();
        r.apply_guess('y').unwrap();
        assert_eq!(r.consecutive_misses(), 2);
        r.apply_guess('y').unwrap();
        assert_eq!(r.consecutive_misses(), 2);
        r.apply_guess('c').unwrap();
        assert_eq!(r.consecutive_misses(), 0);
        r.apply_guess('z').unwrap();
        assert_eq!(r.consecutive_misses(), 1);
    }

    #[test]
    fn test_hint_letter_is_always_a_hit() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut r = round("mississippi", 6);
        r.apply_guess('s').unwrap();
        r.apply_guess('q').unwrap();

        while r.state() == RoundState::InProgress {
            let hint = r.hint_letter(&mut rng).expect("hidden letters remain");
            assert!(['m', 'i', 'p'].contains(&hint));
            assert_eq!(r.apply_guess(hint), Ok(GuessResult::Hit));
        }
        assert_eq!(r.state(), RoundState::Won);
        assert_eq!(r.mistakes_remaining(), 5);
        assert_eq!(r.hint_letter(&mut rng), None);
    }

    #[test]
    fn test_hint_ignores_how_often_a_letter_occurs() {
        let mut rng = StdRng::seed_from_u64(11);
        let r = round("aaaaaaaaab", 6);
        let b_count = (0..1000)
            .filter(|_| r.hint_letter(&mut rng) == Some('b'))
            .count();
        // Two distinct letters, so 'b' comes up about half the time
        assert!((400..=600).contains(&b_count), "b picked {b_count} times");
    }

    #[test]
    fn test_hint_does_not_mutate() {
        let mut rng = StdRng::seed_from_u64(1);
        let r = round("cat", 6);
        let _ = r.hint_letter(&mut rng);
        assert!(r.guessed_letters().is_empty());
        assert_eq!(r.masked_word(), "___");
    }

    #[test]
    fn test_hint_is_folded_for_uppercase_words() {
        let mut rng = StdRng::seed_from_u64(3);
        let r = round("CAT", 6);
        let hint = r.hint_letter(&mut rng).unwrap();
        assert!(['c', 'a', 't'].contains(&hint));
    }

    #[test]
    fn test_stage_follows_mistakes() {
        let mut r = round("cat", 6);
        r.apply_guess('x').unwrap();
        r.apply_guess('y').unwrap();
        assert_eq!(r.mistakes_made(), 2);
        assert_eq!(r.stage().index(), 2);
    }
}
