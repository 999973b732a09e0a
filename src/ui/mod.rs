pub mod field;
pub mod menu;

use ratatui::prelude::*;

use crate::app::{App, Screen};

pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    match (app.screen, app.session.as_ref()) {
        (Screen::Playing, Some(session)) => field::render_game(frame, area, session),
        _ => menu::render_menu(frame, area, &app.high_scores, app.last_score),
    }
}

/// A `width`×`height` rectangle centred in `area`, clipped to fit.
pub(crate) fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width.saturating_sub(4));
    let h = height.min(area.height.saturating_sub(2));
    let x = area.x + area.width.saturating_sub(w) / 2;
    let y = area.y + area.height.saturating_sub(h) / 2;
    Rect::new(x, y, w, h)
}
