//! Inline control menu

use crate::i18n::t;
use crate::telegram::{InlineKeyboardButton, InlineKeyboardMarkup};

/// Action behind a menu button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    PostNow,
    ViewSchedule,
    ResetUsed,
}

impl MenuAction {
    pub const ALL: [MenuAction; 3] = [Self::PostNow, Self::ViewSchedule, Self::ResetUsed];

    /// Callback data sent by the button
    pub fn callback_data(&self) -> &'static str {
        match self {
            Self::PostNow => "post_immediately",
            Self::ViewSchedule => "view_schedule",
            Self::ResetUsed => "reset_used_paragraphs",
        }
    }

    /// Parse callback data; unknown data yields `None`
    pub fn from_callback_data(data: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.callback_data() == data)
    }

    /// Localized button label
    pub fn label(&self) -> String {
        match self {
            Self::PostNow => t!("bot.menu.post_now").to_string(),
            Self::ViewSchedule => t!("bot.menu.view_schedule").to_string(),
            Self::ResetUsed => t!("bot.menu.reset_used").to_string(),
        }
    }

    fn button(self) -> InlineKeyboardButton {
        InlineKeyboardButton::callback(self.label(), self.callback_data())
    }
}

/// The `/start` keyboard: two buttons on the first row, reset below
pub fn main_menu() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup {
        inline_keyboard: vec![
            vec![MenuAction::PostNow.button(), MenuAction::ViewSchedule.button()],
            vec![MenuAction::ResetUsed.button()],
        ],
    }
}
