//! TUI widgets for the story wall

pub mod input;
pub mod story_card;

pub use input::InputWidget;
pub use story_card::StoryCardWidget;
