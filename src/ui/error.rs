//! Full-screen error display for failures that end the editor.

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Paragraph, Wrap},
};
use std::io::{self, Stdout};
use std::time::Duration;

const ERROR_BG: Color = Color::Rgb(220, 53, 69);
const ERROR_FG: Color = Color::Rgb(255, 255, 255);

/// Red screen showing one message until a key is pressed.
pub struct ErrorScreen {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl ErrorScreen {
    /// # Errors
    /// - If the terminal cannot be switched to the alternate screen
    pub fn new() -> anyhow::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self { terminal })
    }

    /// Shows `message` and waits for a key press.
    ///
    /// # Errors
    /// - If drawing or reading input fails
    pub fn show_error(&mut self, message: &str) -> anyhow::Result<()> {
        loop {
            self.terminal.draw(|frame| render_error(frame, message))?;

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    /// # Errors
    /// - If terminal mode cannot be restored
    pub fn cleanup(&mut self) -> anyhow::Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for ErrorScreen {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

fn render_error(frame: &mut Frame, message: &str) {
    let area = frame.area();
    frame.render_widget(Block::default().style(Style::default().bg(ERROR_BG)), area);

    let [_, middle, _] = Layout::vertical([
        Constraint::Percentage(40),
        Constraint::Min(3),
        Constraint::Percentage(40),
    ])
    .areas(area);
    let [_, text_area, _] = Layout::horizontal([
        Constraint::Percentage(10),
        Constraint::Percentage(80),
        Constraint::Percentage(10),
    ])
    .areas(middle);

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let mut lines: Vec<Line> = message
        .lines()
        .map(|line| Line::from(Span::styled(line, bold)))
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from("Press any key to exit. Details are in `wavesculpt logs`."));
    let text = Text::from(lines);
    let paragraph = Paragraph::new(text)
        .style(Style::default().fg(ERROR_FG).bg(ERROR_BG))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, text_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;

    #[test]
    fn test_error_message_is_centered_on_screen() {
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal
            .draw(|frame| render_error(frame, "Renderer unreachable"))
            .unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(text.contains("Renderer unreachable"));
        assert!(text.contains("Press any key"));
    }
}
