// Library interface for hangman
// This allows integration tests to access internal modules

pub mod cli;
pub mod game_state;
pub mod logging;
pub mod provider;
pub mod round;
pub mod stages;
pub mod tui;

// Re-export commonly used items for easier testing
pub use game_state::{GameConfig, GameInterface, RoundView, SessionSummary, game_loop};
pub use provider::{ApiWordProvider, Catalog, ProviderError, Selection, WordProvider};
pub use round::{GuessResult, Round, RoundError, RoundState};
pub use stages::Stage;
