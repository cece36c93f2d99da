use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use super::Hud;
use crate::game::{Outcome, Position, Snapshot};

pub struct Renderer {
    board_size: usize,
}

impl Renderer {
    pub fn new(board_size: usize) -> Self {
        Self { board_size }
    }

    /// Draw one frame: stats header, board (or game-over panel), footer
    pub fn render(&self, frame: &mut Frame, snapshot: &Snapshot, hud: &Hud, footer: &str) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1 + hud.lines.len() as u16), // Header
                Constraint::Min(0),                              // Board
                Constraint::Length(2),                           // Footer
            ])
            .split(frame.area());

        frame.render_widget(self.render_stats(hud), chunks[0]);

        let game_area = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(10),
                Constraint::Percentage(80),
                Constraint::Percentage(10),
            ])
            .split(chunks[1])[1];

        match hud.game_over {
            None => frame.render_widget(self.render_grid(snapshot, &hud.title), game_area),
            Some(outcome) => frame.render_widget(self.render_game_over(hud, outcome), game_area),
        }

        frame.render_widget(self.render_controls(footer), chunks[2]);
    }

    fn render_grid(&self, snapshot: &Snapshot, title: &str) -> Paragraph<'static> {
        let mut lines = Vec::with_capacity(self.board_size);

        for row in 0..self.board_size as i32 {
            let mut spans = Vec::with_capacity(self.board_size);

            for col in 0..self.board_size as i32 {
                let pos = Position::new(row, col);

                let cell = if !snapshot.is_empty() && pos == snapshot.head() {
                    Span::styled(
                        "■ ",
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    )
                } else if snapshot.is_snake(pos) {
                    Span::styled("□ ", Style::default().fg(Color::Blue))
                } else if snapshot.is_green(pos) {
                    Span::styled(
                        "● ",
                        Style::default()
                            .fg(Color::Green)
                            .add_modifier(Modifier::BOLD),
                    )
                } else if snapshot.is_red(pos) {
                    Span::styled(
                        "● ",
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    )
                } else {
                    Span::styled(". ", Style::default().fg(Color::DarkGray))
                };

                spans.push(cell);
            }

            lines.push(Line::from(spans));
        }

        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Double)
                    .border_style(Style::default().fg(Color::White))
                    .title(format!(" {title} ")),
            )
            .alignment(Alignment::Center)
    }

    fn render_stats(&self, hud: &Hud) -> Paragraph<'static> {
        let mut text = vec![Line::from(vec![
            Span::styled("Score: ", Style::default().fg(Color::Yellow)),
            Span::styled(
                hud.score.to_string(),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("    "),
            Span::styled("Moves: ", Style::default().fg(Color::Yellow)),
            Span::styled(hud.moves.to_string(), Style::default().fg(Color::White)),
        ])];

        text.extend(
            hud.lines
                .iter()
                .map(|line| Line::from(Span::styled(line.clone(), Style::default().fg(Color::Gray)))),
        );

        Paragraph::new(text).alignment(Alignment::Center)
    }

    fn render_game_over(&self, hud: &Hud, outcome: Outcome) -> Paragraph<'static> {
        let text = vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                "GAME OVER",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )]),
            Line::from(vec![Span::styled(
                format!("Hit: {}", outcome.as_str()),
                Style::default().fg(Color::Gray),
            )]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Final Score: ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    hud.score.to_string(),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
        ];

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
    }

    fn render_controls(&self, footer: &str) -> Paragraph<'static> {
        Paragraph::new(Line::from(Span::styled(
            footer.to_string(),
            Style::default().fg(Color::Cyan),
        )))
        .alignment(Alignment::Center)
    }
}
