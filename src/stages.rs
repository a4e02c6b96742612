/// Number of the last drawing stage; the full figure is shown when the round is lost.
pub const FINAL_STAGE: u8 = 6;

// Head, body and legs for each stage, indexed by stage number.
const FIGURES: [[&str; 3]; FINAL_STAGE as usize + 1] = [
    ["   ", "   ", "   "],
    [" o ", "   ", "   "],
    [" o ", " | ", "   "],
    [" o ", "/| ", "   "],
    [" o ", "/|\\", "   "],
    [" o ", "/|\\", "/  "],
    [" o ", "/|\\", "/ \\"],
];

/// A discrete state of the hangman drawing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Stage(u8);

impl Stage {
    /// Map mistakes made out of `lives` onto the stages.
    ///
    /// Zero mistakes is always stage 0 and running out of lives is always the
    /// final stage. With six lives every mistake adds exactly one stage.
    #[must_use]
    pub fn for_mistakes(mistakes: u32, lives: u32) -> Self {
        if lives == 0 || mistakes >= lives {
            return Self(FINAL_STAGE);
        }
        let scaled = (mistakes * u32::from(FINAL_STAGE)).div_ceil(lives);
        Self(u8::try_from(scaled).map_or(FINAL_STAGE, |stage| stage.min(FINAL_STAGE)))
    }

    #[must_use]
    pub fn index(self) -> u8 {
        self.0
    }

    #[must_use]
    pub fn is_final(self) -> bool {
        self.0 == FINAL_STAGE
    }

    #[must_use]
    pub fn figure(self) -> [&'static str; 3] {
        FIGURES[usize::from(self.0)]
    }

    /// The gallows with this stage's figure hanging from it, one string per row.
    #[must_use]
    pub fn gallows(self) -> Vec<String> {
        let [head, body, legs] = self.figure();
        vec![
            " +------+".to_string(),
            " |      |".to_string(),
            format!(" |     {head}"),
            format!(" |     {body}"),
            format!(" |     {legs}"),
            " |".to_string(),
            "_|_________".to_string(),
        ]
    }
}
