// Terminal presentation for the wizard

pub mod input;
pub mod screens;

use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::terminal::{Clear, ClearType};
use std::io;
use termimad::MadSkin;
use termimad::crossterm::style::Color;

/// Markdown skin shared by every screen
pub fn create_markdown_skin() -> MadSkin {
    let mut skin = MadSkin::default();
    skin.headers[0].set_fg(Color::Magenta);
    skin.headers[1].set_fg(Color::Blue);
    skin.headers[2].set_fg(Color::Cyan);
    skin.bold.set_fg(Color::White);
    skin.italic.set_fg(Color::DarkGrey);
    skin.inline_code.set_fg(Color::Yellow);
    skin
}

/// Clear the terminal and print a screen
pub fn draw(skin: &MadSkin, markdown: &str) -> io::Result<()> {
    execute!(io::stdout(), Clear(ClearType::All), MoveTo(0, 0))?;
    skin.print_text(markdown);
    Ok(())
}
