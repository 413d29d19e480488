// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Help text styling.

use clap::builder::styling::Styles;

use crate::colors;

/// Clap styles matching the event output palette.
pub fn styles() -> Styles {
    if !colors::should_colorize() {
        return Styles::plain();
    }

    use anstyle::{Ansi256Color, Color, Style};

    let fg = |code| Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(code))));
    let header = fg(colors::codes::HEADER);
    let context = fg(colors::codes::CONTEXT);

    Styles::styled()
        .header(header)
        .usage(header)
        .literal(fg(colors::codes::LITERAL))
        .placeholder(context)
        .valid(context)
        .error(fg(colors::codes::BAD))
}

/// Examples block for `after_help`, colorized when the terminal allows.
pub fn examples(text: &str) -> String {
    colors::examples(text)
}
