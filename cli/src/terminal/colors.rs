use colored::Color;

pub const PRIMARY: Color = Color::BrightGreen;
pub const ACCENT: Color = Color::BrightYellow;
pub const SEPARATOR: Color = Color::BrightBlack;
pub const TEXT_DEFAULT: Color = Color::White;

pub const PACKAGE: Color = Color::BrightCyan;
pub const VERSION: Color = Color::BrightBlue;
pub const SECTION: Color = Color::BrightMagenta;

pub const ERROR: Color = Color::BrightRed;
pub const WARNING: Color = Color::Yellow;
pub const OK: Color = Color::Green;
