//! UI components module
//!
//! Reusable components for the Banter application.

pub mod conversation_panel;
pub mod input_bar;
pub mod mic_button;

pub use conversation_panel::ConversationPanel;
pub use input_bar::InputBar;
pub use mic_button::MicButton;
