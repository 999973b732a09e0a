use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::scores::HighScores;

const BANNER: &str = r#"
████████╗██╗  ██╗██████╗ ██╗   ██╗███████╗████████╗
╚══██╔══╝██║  ██║██╔══██╗██║   ██║██╔════╝╚══██╔══╝
   ██║   ███████║██████╔╝██║   ██║███████╗   ██║
   ██║   ██╔══██║██╔══██╗██║   ██║╚════██║   ██║
   ██║   ██║  ██║██║  ██║╚██████╔╝███████║   ██║
   ╚═╝   ╚═╝  ╚═╝╚═╝  ╚═╝ ╚═════╝ ╚══════╝   ╚═╝   "#;

const ACCENT: Color = Color::Rgb(255, 220, 80);
const KEY: Color = Color::Rgb(80, 200, 255);
const TEXT: Color = Color::Rgb(140, 140, 140);
const MEDALS: [Color; 3] = [
    Color::Rgb(255, 215, 0),   // Gold
    Color::Rgb(192, 192, 192), // Silver
    Color::Rgb(205, 127, 50),  // Bronze
];

fn control_line(keys: &'static str, action: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("    {:<18}", keys), Style::default().fg(KEY)),
        Span::styled(action, Style::default().fg(TEXT)),
    ])
}

fn controls() -> Vec<Line<'static>> {
    vec![
        Line::from(""),
        control_line("← → / a d", "Rotate"),
        control_line("↑ / w", "Thrust"),
        control_line("Shift+↑ / W / b", "Boost (takes off)"),
        control_line("Space", "Fire laser"),
        control_line("Esc / q", "Quit to menu"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "  Shoot every beacon. Land upright and slow",
            Style::default().fg(Color::Rgb(100, 100, 120)),
        )]),
        Line::from(vec![Span::styled(
            "  to refuel. Don't touch the rocks.",
            Style::default().fg(Color::Rgb(100, 100, 120)),
        )]),
    ]
}

fn high_score_lines(high_scores: &HighScores, last_score: Option<u32>) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from("")];
    let top = high_scores.top();
    if top.is_empty() {
        lines.push(Line::from(Span::styled(
            "    No scores yet",
            Style::default().fg(Color::Rgb(60, 60, 80)),
        )));
    }
    let mut highlighted = false;
    for (rank, &score) in top.iter().enumerate() {
        let mut style = Style::default().fg(MEDALS[rank]).add_modifier(Modifier::BOLD);
        // only the first matching entry is the game just played
        if !highlighted && last_score == Some(score) {
            style = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD | Modifier::REVERSED);
            highlighted = true;
        }
        lines.push(Line::from(vec![
            Span::styled(format!("    {}. ", rank + 1), Style::default().fg(TEXT)),
            Span::styled(format!("{:>8}", score), style),
        ]));
    }
    if let Some(score) = last_score {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("    Last game: ", Style::default().fg(TEXT)),
            Span::styled(
                score.to_string(),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        ]));
    }
    lines
}

pub fn render_menu(frame: &mut Frame, area: Rect, high_scores: &HighScores, last_score: Option<u32>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8),  // Banner
            Constraint::Length(2),  // Tagline
            Constraint::Min(10),    // Controls + scores
            Constraint::Length(1),  // Footer
        ])
        .split(area);

    let banner = Paragraph::new(BANNER)
        .style(Style::default().fg(Color::Rgb(255, 140, 60)).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center);
    frame.render_widget(banner, chunks[0]);

    let tagline = Paragraph::new(Line::from(vec![Span::styled(
        "Gravity is patient. Fuel is not.",
        Style::default().fg(Color::Rgb(120, 120, 150)).add_modifier(Modifier::ITALIC),
    )]))
    .alignment(Alignment::Center);
    frame.render_widget(tagline, chunks[1]);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[2]);

    let controls = Paragraph::new(controls()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Rgb(60, 150, 200)))
            .title(" ⌨ Controls ")
            .title_style(Style::default().fg(Color::Rgb(200, 120, 255)).add_modifier(Modifier::BOLD)),
    );
    frame.render_widget(controls, cols[0]);

    let scores = Paragraph::new(high_score_lines(high_scores, last_score)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Double)
            .border_style(Style::default().fg(Color::Rgb(255, 200, 80)))
            .title(" 🏆 High Scores ")
            .title_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
    );
    frame.render_widget(scores, cols[1]);

    let footer = Paragraph::new(Line::from(vec![
        Span::styled("Press ", Style::default().fg(Color::Rgb(100, 100, 130))),
        Span::styled("Enter", Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
        Span::styled(" to Start", Style::default().fg(Color::Rgb(100, 100, 130))),
        Span::styled("  │  ", Style::default().fg(Color::Rgb(40, 40, 60))),
        Span::styled("q", Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
        Span::styled(" Quit", Style::default().fg(Color::Rgb(100, 100, 130))),
    ]))
    .alignment(Alignment::Center);
    frame.render_widget(footer, chunks[3]);
}
