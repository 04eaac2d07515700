use colored::Color;

pub const PRIMARY: Color = Color::TrueColor { r: 94, g: 196, b: 255 };
pub const ACCENT: Color = Color::TrueColor { r: 255, g: 200, b: 87 };
pub const SEPARATOR: Color = Color::BrightBlack;
pub const TEXT_DEFAULT: Color = Color::White;
pub const FINGERPRINT: Color = Color::TrueColor { r: 140, g: 230, b: 140 };
pub const STATUS_OK: Color = Color::Green;
pub const STATUS_OTHER: Color = Color::Yellow;
