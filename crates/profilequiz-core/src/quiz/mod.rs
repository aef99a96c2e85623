mod engine;
mod navigation;
mod panel;

pub use engine::{
    Choice, ChoiceOption, Quiz, QuizContext, QuizResults, ResetOptions, Screen,
    COMPLETION_DELAY_MS,
};
pub use navigation::{Appearance, ChoiceOutcome, NavigationButtons, NavigationController, Transition};
pub use panel::{PanelState, SelectionChange};
