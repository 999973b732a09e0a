//! The play screen: the field drawn with braille dots, a status bar built
//! from the session's [`Hud`], and the between-lives / end-of-level banners.
//!
//! World coordinates are stretched onto whatever area the terminal gives us.
//! Each cell is a 2×4 braille block, so the drawable resolution is twice the
//! width and four times the height of the area in cells.

use std::collections::HashMap;

use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::config::Tuning;
use crate::sim::entities::EntitySet;
use crate::sim::player::Player;
use crate::sim::vec2::Vec2;
use crate::sim::{GameSession, GameState, Hud};

const BG: Color = Color::Rgb(5, 5, 15);
const GROUND: Color = Color::Rgb(70, 60, 50);
const SURFACE: Color = Color::Rgb(150, 130, 100);
const ROCK: Color = Color::Rgb(160, 140, 120);
const GEAR: Color = Color::Rgb(170, 170, 180);
const LASER: [u8; 3] = [255, 80, 80];
const FUEL_BAR_WIDTH: usize = 10;

/// Braille cell → bit pattern, keyed by cell position.
type DotMap = HashMap<(usize, usize), u8>;

fn braille_bit(sub_x: usize, sub_y: usize) -> u8 {
    match (sub_x, sub_y) {
        (0, 0) => 0x01,
        (0, 1) => 0x02,
        (0, 2) => 0x04,
        (0, 3) => 0x40,
        (1, 0) => 0x08,
        (1, 1) => 0x10,
        (1, 2) => 0x20,
        (1, 3) => 0x80,
        _ => 0,
    }
}

fn line_cells(x0: i32, y0: i32, x1: i32, y1: i32) -> Vec<(i32, i32)> {
    let mut cells = Vec::new();
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut cx, mut cy) = (x0, y0);
    loop {
        cells.push((cx, cy));
        if cx == x1 && cy == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            cx += sx;
        }
        if e2 <= dx {
            err += dx;
            cy += sy;
        }
    }
    cells
}

fn scale_color([r, g, b]: [u8; 3], factor: f64) -> Color {
    let f = factor.clamp(0.0, 1.0);
    Color::Rgb(
        (r as f64 * f) as u8,
        (g as f64 * f) as u8,
        (b as f64 * f) as u8,
    )
}

/// Shots dim as they travel, down to half brightness after a second.
fn laser_color(age_ms: f64) -> Color {
    scale_color(LASER, (1.0 - age_ms / 2000.0).max(0.5))
}

/// A character grid plus the world → braille-dot projection for one frame.
struct Canvas {
    grid: Vec<Vec<(char, Style)>>,
    w: usize,
    h: usize,
    bw: i32,
    bh: i32,
    sx: f64,
    sy: f64,
}

impl Canvas {
    fn new(w: usize, h: usize, tuning: &Tuning) -> Self {
        let bw = (w * 2) as i32;
        let bh = (h * 4) as i32;
        Self {
            grid: vec![vec![(' ', Style::default().bg(BG)); w]; h],
            w,
            h,
            bw,
            bh,
            sx: bw as f64 / tuning.field_width,
            sy: bh as f64 / tuning.field_height,
        }
    }

    fn to_dot(&self, p: Vec2) -> (i32, i32) {
        ((p.x * self.sx).floor() as i32, (p.y * self.sy).floor() as i32)
    }

    fn set_dot(&self, map: &mut DotMap, bx: i32, by: i32) {
        if bx < 0 || by < 0 || bx >= self.bw || by >= self.bh {
            return;
        }
        let (bx, by) = (bx as usize, by as usize);
        *map.entry((bx / 2, by / 4)).or_insert(0) |= braille_bit(bx % 2, by % 4);
    }

    fn plot(&self, map: &mut DotMap, p: Vec2) {
        let (bx, by) = self.to_dot(p);
        self.set_dot(map, bx, by);
    }

    /// A 2×2 dot block, visible even when the field is squeezed.
    fn plot_fat(&self, map: &mut DotMap, p: Vec2) {
        let (bx, by) = self.to_dot(p);
        for (dx, dy) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            self.set_dot(map, bx + dx, by + dy);
        }
    }

    fn plot_line(&self, map: &mut DotMap, a: Vec2, b: Vec2) {
        let (x0, y0) = self.to_dot(a);
        let (x1, y1) = self.to_dot(b);
        for (px, py) in line_cells(x0, y0, x1, y1) {
            self.set_dot(map, px, py);
        }
    }

    fn plot_circle(&self, map: &mut DotMap, center: Vec2, radius: f64) {
        let span = radius * self.sx.max(self.sy);
        let steps = ((span * 6.0) as usize).clamp(8, 96);
        let point = |i: usize| {
            center + Vec2::from_degrees(i as f64 * 360.0 / steps as f64) * radius
        };
        for i in 0..steps {
            self.plot_line(map, point(i), point(i + 1));
        }
    }

    /// Lay a dot layer over the grid. Dots landing in a cell that already
    /// holds braille merge with it and take the new colour.
    fn paint(&mut self, map: &DotMap, color: Color, bold: bool) {
        let mut style = Style::default().fg(color).bg(BG);
        if bold {
            style = style.add_modifier(Modifier::BOLD);
        }
        for (&(cx, cy), &bits) in map {
            if cx >= self.w || cy >= self.h || bits == 0 {
                continue;
            }
            let existing = self.grid[cy][cx].0 as u32;
            let bits = if (0x2800..0x2900).contains(&existing) {
                (existing - 0x2800) as u8 | bits
            } else {
                bits
            };
            let ch = char::from_u32(0x2800 + bits as u32).unwrap_or(' ');
            self.grid[cy][cx] = (ch, style);
        }
    }

    fn into_lines(self) -> Vec<Line<'static>> {
        self.grid
            .into_iter()
            .map(|row| {
                let spans: Vec<Span<'static>> = row
                    .into_iter()
                    .map(|(ch, style)| Span::styled(String::from(ch), style))
                    .collect();
                Line::from(spans)
            })
            .collect()
    }
}

fn draw_backdrop(canvas: &mut Canvas, tuning: &Tuning) {
    let ground_y = tuning.ground_y();
    for yi in 0..canvas.h {
        let cell_top = (yi * 4) as f64 / canvas.sy;
        for xi in 0..canvas.w {
            if cell_top >= ground_y {
                canvas.grid[yi][xi] = ('▓', Style::default().fg(GROUND).bg(BG));
                continue;
            }
            let hash = ((xi * 7 + yi * 13 + 37) * 31) % 250;
            if hash < 2 {
                let b = 35 + (hash as u8) * 15;
                canvas.grid[yi][xi] = ('.', Style::default().fg(Color::Rgb(b, b, b + 8)).bg(BG));
            }
        }
    }
    let mut surface = DotMap::new();
    canvas.plot_line(
        &mut surface,
        Vec2::new(0.0, ground_y),
        Vec2::new(tuning.field_width, ground_y),
    );
    canvas.paint(&surface, SURFACE, false);
}

fn draw_scenery(canvas: &mut Canvas, entities: &EntitySet, now_ms: f64, pulse: bool) {
    for obstacle in &entities.obstacles {
        let mut map = DotMap::new();
        canvas.plot_circle(&mut map, obstacle.pos, obstacle.radius);
        canvas.paint(&map, ROCK, false);
    }

    let beacon_color = if pulse {
        Color::Rgb(80, 255, 160)
    } else {
        Color::Rgb(40, 190, 120)
    };
    for beacon in entities.beacons.iter().filter(|b| b.lifecycle.is_alive()) {
        let mut map = DotMap::new();
        canvas.plot_circle(&mut map, beacon.pos, beacon.radius);
        canvas.plot(&mut map, beacon.pos);
        canvas.paint(&map, beacon_color, true);
    }

    for laser in entities.lasers.iter().filter(|l| l.lifecycle.is_alive()) {
        let mut map = DotMap::new();
        canvas.plot_fat(&mut map, laser.pos);
        // trail
        canvas.plot(&mut map, laser.pos - laser.vel * 1.5);
        canvas.paint(&map, laser_color(laser.age_ms(now_ms)), true);
    }

    for particle in entities.particles.iter().filter(|p| p.lifecycle.is_alive()) {
        let mut map = DotMap::new();
        if particle.size >= 4 {
            canvas.plot_fat(&mut map, particle.pos);
        } else {
            canvas.plot(&mut map, particle.pos);
        }
        canvas.paint(&map, scale_color(particle.color, particle.fade), false);
    }
}

fn draw_ship(canvas: &mut Canvas, player: &Player, tuning: &Tuning, flicker: bool) {
    let hull = player.hull(tuning);
    let mut ship = DotMap::new();
    for i in 0..3 {
        canvas.plot_line(&mut ship, hull[i], hull[(i + 1) % 3]);
    }
    let color = if player.landed {
        Color::Rgb(120, 255, 140)
    } else if player.thrusting {
        Color::Rgb(100, 230, 255)
    } else {
        Color::Rgb(230, 230, 240)
    };

    if player.gear_deployed || player.landed {
        let back = Vec2::from_degrees(player.angle) * -1.0;
        let side = Vec2::from_degrees(player.angle + 90.0);
        let mut gear = DotMap::new();
        for (corner, out) in [(hull[1], -1.0), (hull[2], 1.0)] {
            let foot = corner + back * 6.0 + side * (3.0 * out);
            canvas.plot_line(&mut gear, corner, foot);
            canvas.plot_line(&mut gear, foot - side * 2.0, foot + side * 2.0);
        }
        for key in ship.keys() {
            gear.remove(key);
        }
        canvas.paint(&gear, GEAR, false);
    }

    canvas.paint(&ship, color, true);

    if player.thrusting {
        let length = if player.boosting { 22.0 } else { 12.0 };
        let exhaust = player.angle + 180.0;
        let tail = player.tail(tuning);
        let mut flame = DotMap::new();
        for i in 0..10 {
            let dist = i as f64 * length / 10.0;
            let spread = (i as f64 * 2.0) * if i % 2 == 0 { 1.0 } else { -1.0 };
            canvas.plot(&mut flame, tail + Vec2::from_degrees(exhaust + spread) * dist);
        }
        // keep the hull readable
        for key in ship.keys() {
            flame.remove(key);
        }
        let flame_color = match (player.boosting, flicker) {
            (true, _) => Color::Rgb(120, 180, 255),
            (false, true) => Color::Rgb(255, 200, 60),
            (false, false) => Color::Rgb(255, 130, 30),
        };
        canvas.paint(&flame, flame_color, false);
    }
}

fn render_field(session: &GameSession, width: usize, height: usize) -> Vec<Line<'static>> {
    let tuning = session.tuning();
    let mut canvas = Canvas::new(width, height, tuning);
    let frame_no = (session.clock_ms() / tuning.frame_ms) as u64;

    draw_backdrop(&mut canvas, tuning);
    draw_scenery(
        &mut canvas,
        session.entities(),
        session.clock_ms(),
        frame_no % 40 < 20,
    );
    if let Some(player) = session.entities().player.as_ref() {
        draw_ship(&mut canvas, player, tuning, frame_no % 3 == 0);
    }
    canvas.into_lines()
}

fn fuel_gauge(hud: &Hud) -> (String, Color) {
    let ratio = if hud.max_fuel > 0.0 {
        (hud.fuel / hud.max_fuel).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let filled = (ratio * FUEL_BAR_WIDTH as f64).round() as usize;
    let bar = format!(
        "[{}{}] {:>3}%",
        "█".repeat(filled),
        "░".repeat(FUEL_BAR_WIDTH - filled),
        (ratio * 100.0).round() as u32
    );
    let color = if ratio > 0.5 {
        Color::Green
    } else if ratio > 0.25 {
        Color::Yellow
    } else {
        Color::Red
    };
    (bar, color)
}

fn status_line(hud: &Hud) -> Line<'static> {
    let sep = || Span::styled(" | ", Style::default().fg(Color::DarkGray));
    let (gauge, gauge_color) = fuel_gauge(hud);
    let mut spans = vec![
        Span::styled(" Fuel ", Style::default().fg(Color::Gray)),
        Span::styled(gauge, Style::default().fg(gauge_color).add_modifier(Modifier::BOLD)),
        sep(),
        Span::styled(
            format!("Score: {}", hud.score),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        sep(),
        Span::styled(format!("Level: {}", hud.level), Style::default().fg(Color::Green)),
        sep(),
        Span::styled(
            format!("Ships: {}", "▲ ".repeat(hud.ships as usize)),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        sep(),
        Span::styled(
            format!("Beacons: {}", hud.beacons_remaining),
            Style::default().fg(Color::Rgb(80, 255, 160)),
        ),
        sep(),
        Span::styled(format!("Angle: {:>3.0}°", hud.angle), Style::default().fg(Color::Cyan)),
    ];
    if hud.landed {
        spans.push(sep());
        spans.push(Span::styled(
            "LANDED",
            Style::default().fg(Color::Rgb(120, 255, 140)).add_modifier(Modifier::BOLD),
        ));
    }
    Line::from(spans)
}

fn help_line(session: &GameSession) -> Line<'static> {
    let key = Style::default().fg(Color::DarkGray);
    let bar = Style::default().fg(Color::Rgb(60, 60, 60));
    match session.state() {
        GameState::Playing => Line::from(vec![
            Span::styled(" ←→ Rotate ", key),
            Span::styled("| ", bar),
            Span::styled("↑ Thrust ", key),
            Span::styled("| ", bar),
            Span::styled("Shift+↑/b Boost ", key),
            Span::styled("| ", bar),
            Span::styled("Space Fire ", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::styled("| ", bar),
            Span::styled("Esc Quit", key),
        ]),
        GameState::PlayerExploding => Line::from(Span::styled(
            " SHIP DESTROYED ",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        GameState::LevelComplete => Line::from(Span::styled(
            format!(" LEVEL {} COMPLETE ", session.level()),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )),
        GameState::GameOver => Line::from(Span::styled(
            " GAME OVER ",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
    }
}

fn render_banner(frame: &mut Frame, area: Rect, title: &str, color: Color, lines: Vec<Line>) {
    let overlay = super::centered(area, 34, (lines.len() + 2) as u16);
    frame.render_widget(Clear, overlay);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(color))
        .title(title.to_string())
        .title_style(Style::default().fg(color).add_modifier(Modifier::BOLD))
        .style(Style::default().bg(Color::Rgb(15, 15, 25)));
    let p = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(block);
    frame.render_widget(p, overlay);
}

pub fn render_game(frame: &mut Frame, area: Rect, session: &GameSession) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Rgb(255, 140, 60)))
        .title(format!(" Thrust · Level {} ", session.level()))
        .title_style(Style::default().fg(Color::Rgb(255, 180, 100)).add_modifier(Modifier::BOLD));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(4),
            Constraint::Length(1),
        ])
        .split(inner);

    let hud = session.hud();
    frame.render_widget(Paragraph::new(status_line(&hud)), chunks[0]);

    let fw = chunks[1].width as usize;
    let fh = chunks[1].height as usize;
    if fw > 0 && fh > 0 {
        frame.render_widget(Paragraph::new(render_field(session, fw, fh)), chunks[1]);
    }

    frame.render_widget(Paragraph::new(help_line(session)), chunks[2]);

    let score = Span::styled(
        format!("Score: {}", hud.score),
        Style::default().fg(Color::Rgb(255, 215, 0)).add_modifier(Modifier::BOLD),
    );
    match session.state() {
        GameState::LevelComplete => render_banner(
            frame,
            chunks[1],
            " LEVEL COMPLETE ",
            Color::Rgb(120, 255, 140),
            vec![
                Line::from(""),
                Line::from(format!("Level {} cleared", session.level())),
                Line::from(score),
                Line::from(format!("Ships: {}", hud.ships)),
            ],
        ),
        GameState::GameOver => render_banner(
            frame,
            chunks[1],
            " GAME OVER ",
            Color::Rgb(255, 90, 90),
            vec![
                Line::from(""),
                Line::from(score),
                Line::from(format!("Reached level {}", session.level())),
            ],
        ),
        GameState::Playing | GameState::PlayerExploding => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Intents;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn draw(session: &GameSession) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal
            .draw(|frame| render_game(frame, frame.area(), session))
            .unwrap();
        let buffer = terminal.backend().buffer();
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn lasers_dim_with_age() {
        assert_eq!(laser_color(0.0), Color::Rgb(255, 80, 80));
        assert_eq!(laser_color(500.0), Color::Rgb(191, 60, 60));
        assert_eq!(laser_color(1000.0), laser_color(5000.0));
        assert_eq!(laser_color(5000.0), Color::Rgb(127, 40, 40));
    }

    #[test]
    fn braille_projection_corners() {
        let tuning = Tuning::default();
        let canvas = Canvas::new(40, 10, &tuning);
        let mut map = DotMap::new();
        canvas.plot(&mut map, Vec2::new(0.0, 0.0));
        canvas.plot(&mut map, Vec2::new(tuning.field_width - 0.01, tuning.field_height - 0.01));
        assert_eq!(map.get(&(0, 0)), Some(&0x01));
        assert_eq!(map.get(&(39, 9)), Some(&0x80));

        // off-field points are dropped
        canvas.plot(&mut map, Vec2::new(-5.0, 10.0));
        canvas.plot(&mut map, Vec2::new(10.0, tuning.field_height + 1.0));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn paint_merges_braille_bits() {
        let tuning = Tuning::default();
        let mut canvas = Canvas::new(4, 4, &tuning);
        let mut a = DotMap::new();
        a.insert((1, 1), 0x01);
        let mut b = DotMap::new();
        b.insert((1, 1), 0x80);
        canvas.paint(&a, Color::Red, false);
        canvas.paint(&b, Color::Blue, false);
        assert_eq!(canvas.grid[1][1].0, '\u{2881}');
        assert_eq!(canvas.grid[1][1].1.fg, Some(Color::Blue));
    }

    #[test]
    fn line_cells_reaches_both_ends() {
        let cells = line_cells(0, 0, 5, -3);
        assert_eq!(cells.first(), Some(&(0, 0)));
        assert_eq!(cells.last(), Some(&(5, -3)));
    }

    #[test]
    fn fuel_gauge_levels() {
        let mut hud = GameSession::new(Tuning::default(), StdRng::seed_from_u64(1)).hud();
        let (bar, color) = fuel_gauge(&hud);
        assert_eq!(bar, "[██████████] 100%");
        assert_eq!(color, Color::Green);

        hud.fuel = 20.0;
        let (bar, color) = fuel_gauge(&hud);
        assert_eq!(bar, "[██░░░░░░░░]  20%");
        assert_eq!(color, Color::Red);
    }

    #[test]
    fn playing_screen_has_hud() {
        let session = GameSession::new(Tuning::default(), StdRng::seed_from_u64(1));
        let text = draw(&session);
        assert!(text.contains("Score: 0"));
        assert!(text.contains("Level: 1"));
        assert!(text.contains("Beacons: 5"));
        assert!(text.contains("Space Fire"));
    }

    #[test]
    fn game_over_banner() {
        let mut session =
            GameSession::at_level(Tuning::default(), StdRng::seed_from_u64(1), 1, 0, 1);
        for _ in 0..2000 {
            if session.state() == GameState::GameOver {
                break;
            }
            session.update(&Intents::default());
        }
        assert_eq!(session.state(), GameState::GameOver);
        let text = draw(&session);
        assert!(text.contains("GAME OVER"));
        assert!(text.contains("Reached level 1"));
    }

    #[test]
    fn tiny_area_does_not_panic() {
        let session = GameSession::new(Tuning::default(), StdRng::seed_from_u64(1));
        let mut terminal = Terminal::new(TestBackend::new(6, 3)).unwrap();
        terminal
            .draw(|frame| render_game(frame, frame.area(), &session))
            .unwrap();
    }
}
