use crate::network::{BoardView, ConnectionStatus};
use macroquad::prelude::*;
use shared::{NamedColor, RichText, SidebarRow};

pub const FONT_SIZE: f32 = 20.0;
pub const LINE_HEIGHT: f32 = 22.0;
pub const PADDING: f32 = 8.0;
/// Gap between a row's text and its score
pub const SCORE_GAP: f32 = 16.0;
pub const MARGIN: f32 = 12.0;

const PANEL_COLOR: Color = Color::new(0.0, 0.0, 0.0, 0.45);
const TITLE_BAR_COLOR: Color = Color::new(0.0, 0.0, 0.0, 0.6);
const SCORE_COLOR: NamedColor = NamedColor::Red;

/// Where each part of the sidebar goes, in screen pixels
#[derive(Debug, Clone, PartialEq)]
pub struct SidebarLayout {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Left edge of the centered title
    pub title_x: f32,
    /// Baseline of the title
    pub title_y: f32,
    /// Baseline of each row, top to bottom
    pub row_ys: Vec<f32>,
    /// Left edge of row text
    pub text_x: f32,
    /// Right edge scores are aligned against
    pub score_right: f32,
}

/// Measured widths of what will be drawn
#[derive(Debug, Clone, Copy)]
pub struct RowWidths {
    pub text: f32,
    pub score: f32,
}

/// Places the sidebar at the right edge, vertically centered
pub fn layout(screen_width: f32, screen_height: f32, title_width: f32, rows: &[RowWidths]) -> SidebarLayout {
    let widest_row = rows
        .iter()
        .map(|row| row.text + SCORE_GAP + row.score)
        .fold(0.0_f32, f32::max);
    let width = widest_row.max(title_width) + PADDING * 2.0;
    let height = LINE_HEIGHT * (rows.len() + 1) as f32 + PADDING * 2.0;

    let x = (screen_width - width - MARGIN).max(0.0);
    let y = ((screen_height - height) / 2.0).max(0.0);

    let title_x = x + (width - title_width) / 2.0;
    let title_y = y + PADDING + FONT_SIZE * 0.8;
    let row_ys = (0..rows.len())
        .map(|i| title_y + LINE_HEIGHT * (i + 1) as f32)
        .collect();

    SidebarLayout {
        x,
        y,
        width,
        height,
        title_x,
        title_y,
        row_ys,
        text_x: x + PADDING,
        score_right: x + width - PADDING,
    }
}

fn to_color(color: NamedColor) -> Color {
    let (r, g, b) = color.rgb_f32();
    Color::new(r, g, b, 1.0)
}

fn text_width(text: &RichText) -> f32 {
    text.spans()
        .iter()
        .map(|span| measure_text(&span.text, None, FONT_SIZE as u16, 1.0).width)
        .sum()
}

pub struct Renderer {
    width: f32,
    height: f32,
}

impl Renderer {
    pub fn new(width: usize, height: usize) -> Self {
        Renderer {
            width: width as f32,
            height: height as f32,
        }
    }

    pub fn render(&mut self, view: &BoardView) {
        clear_background(Color::from_rgba(26, 26, 26, 255));

        self.width = screen_width();
        self.height = screen_height();

        self.draw_status(&view.status);

        let Some(title) = view.board.sidebar_title() else {
            return;
        };
        let rows = view.board.sidebar_lines();
        self.draw_sidebar(title, &rows);
    }

    fn draw_sidebar(&mut self, title: &RichText, rows: &[SidebarRow]) {
        let scores: Vec<String> = rows.iter().map(|row| row.score.to_string()).collect();
        let widths: Vec<RowWidths> = rows
            .iter()
            .zip(&scores)
            .map(|(row, score)| RowWidths {
                text: text_width(&row.text),
                score: measure_text(score, None, FONT_SIZE as u16, 1.0).width,
            })
            .collect();

        let area = layout(self.width, self.height, text_width(title), &widths);

        draw_rectangle(area.x, area.y, area.width, area.height, PANEL_COLOR);
        draw_rectangle(area.x, area.y, area.width, LINE_HEIGHT + PADDING, TITLE_BAR_COLOR);
        self.draw_rich_text(title, area.title_x, area.title_y);

        for ((row, score), (width, y)) in rows
            .iter()
            .zip(&scores)
            .zip(widths.iter().zip(&area.row_ys))
        {
            self.draw_rich_text(&row.text, area.text_x, *y);
            draw_text(
                score,
                area.score_right - width.score,
                *y,
                FONT_SIZE,
                to_color(SCORE_COLOR),
            );
        }
    }

    /// Draws each span in its own color, with bold faked by a 1px offset
    fn draw_rich_text(&mut self, text: &RichText, x: f32, y: f32) {
        let mut cursor = x;
        for span in text.spans() {
            if span.text.is_empty() {
                continue;
            }

            let color = to_color(span.style.color.unwrap_or(NamedColor::White));
            let dims = measure_text(&span.text, None, FONT_SIZE as u16, 1.0);
            let shown = if span.style.obfuscated {
                "#".repeat(span.text.chars().count())
            } else {
                span.text.clone()
            };

            draw_text(&shown, cursor, y, FONT_SIZE, color);
            if span.style.bold {
                draw_text(&shown, cursor + 1.0, y, FONT_SIZE, color);
            }
            if span.style.underlined {
                draw_line(cursor, y + 2.0, cursor + dims.width, y + 2.0, 1.0, color);
            }
            if span.style.strikethrough {
                let mid = y - dims.offset_y / 2.0;
                draw_line(cursor, mid, cursor + dims.width, mid, 1.0, color);
            }

            cursor += dims.width;
        }
    }

    fn draw_status(&mut self, status: &ConnectionStatus) {
        let (label, color) = match status {
            ConnectionStatus::Connecting => ("Connecting...".to_string(), YELLOW),
            ConnectionStatus::Connected { client_id } => (format!("Client {}", client_id), GREEN),
            ConnectionStatus::Disconnected { reason } => (format!("Disconnected: {}", reason), RED),
        };

        draw_rectangle(10.0, 10.0, 8.0, 8.0, color);
        draw_text(&label, 24.0, 18.0, 16.0, WHITE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_layout_hugs_right_edge() {
        let rows = [
            RowWidths { text: 100.0, score: 10.0 },
            RowWidths { text: 60.0, score: 20.0 },
        ];
        let area = layout(800.0, 600.0, 80.0, &rows);

        let expected_width = 100.0 + SCORE_GAP + 10.0 + PADDING * 2.0;
        assert_approx_eq!(area.width, expected_width);
        assert_approx_eq!(area.x + area.width, 800.0 - MARGIN);
        assert_approx_eq!(area.score_right, area.x + area.width - PADDING);
        assert_approx_eq!(area.text_x, area.x + PADDING);
    }

    #[test]
    fn test_layout_centers_vertically_and_title() {
        let rows = [RowWidths { text: 40.0, score: 10.0 }; 3];
        let area = layout(800.0, 600.0, 120.0, &rows);

        let expected_height = LINE_HEIGHT * 4.0 + PADDING * 2.0;
        assert_approx_eq!(area.height, expected_height);
        assert_approx_eq!(area.y, (600.0 - expected_height) / 2.0);

        // The title is the widest element, so it sits one padding in
        assert_approx_eq!(area.title_x, area.x + PADDING);
        assert_eq!(area.row_ys.len(), 3);
        assert_approx_eq!(area.row_ys[1] - area.row_ys[0], LINE_HEIGHT);
        assert!(area.row_ys[0] > area.title_y);
    }

    #[test]
    fn test_layout_never_leaves_screen() {
        let rows = [RowWidths { text: 2000.0, score: 10.0 }; 40];
        let area = layout(320.0, 240.0, 10.0, &rows);

        assert_approx_eq!(area.x, 0.0);
        assert_approx_eq!(area.y, 0.0);
    }

    #[test]
    fn test_empty_sidebar_only_holds_title() {
        let area = layout(800.0, 600.0, 50.0, &[]);
        assert!(area.row_ys.is_empty());
        assert_approx_eq!(area.width, 50.0 + PADDING * 2.0);
    }
}
