use ratatui::style::Color;

pub const APP_TITLE: &str = " Image Studio ";
pub const TITLE_ENHANCE: &str = " Prompt Enhancement ";
pub const TITLE_IMAGES: &str = " Image Generation ";
pub const TITLE_REMOVAL: &str = " Background Removal ";

pub const HINT_ENHANCE: &str = "[Enter] Enhance";
pub const HINT_GENERATE: &str = "[Enter] Generate";
pub const HINT_REMOVE: &str = "[Enter] Remove background";
pub const HINT_BUSY: &str = "working...";
pub const HINT_COPY: &str = "[y]";

pub const HELP_LINE: &str = "Tab focus | Enter submit | Ctrl-U clear | Up/Down select | \
d download | y copy | x export | Esc dismiss | Ctrl-Q quit";

pub const ACCENT: Color = Color::Cyan;
pub const MUTED: Color = Color::DarkGray;
pub const LOADING: Color = Color::Yellow;
pub const ERROR: Color = Color::Red;
pub const SUCCESS: Color = Color::Green;
