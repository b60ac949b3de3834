use super::raster::{blend_rect, draw_rect_outline, write_pixel_rgba_clipped, ScreenRectPx};

const GLYPH_WIDTH: i32 = 3;
const GLYPH_HEIGHT: i32 = 5;
const TEXT_SCALE: i32 = 2;
const GLYPH_ADVANCE: i32 = (GLYPH_WIDTH + 1) * TEXT_SCALE;
const LINE_ADVANCE: i32 = (GLYPH_HEIGHT + 2) * TEXT_SCALE;
const PANEL_INSET: i32 = 4 * TEXT_SCALE;
const SCREEN_MARGIN: i32 = 10;
const INFO_PANEL_MAX_WIDTH_FRACTION: f32 = 0.8;
const TEXT_COLOR: [u8; 4] = [244, 248, 252, 255];
const PANEL_BG_COLOR: [u8; 4] = [10, 12, 16, 200];
const PANEL_BORDER_COLOR: [u8; 4] = [92, 106, 126, 255];

/// Objective line in the top-left corner.
pub(crate) fn draw_status_panel(frame: &mut [u8], width: u32, height: u32, status: &str) {
    if status.is_empty() {
        return;
    }
    let max_chars = chars_that_fit(width as i32 - 2 * (SCREEN_MARGIN + PANEL_INSET));
    let lines = wrap_text(status, max_chars);
    draw_text_panel(frame, width, height, SCREEN_MARGIN, SCREEN_MARGIN, &lines);
}

/// Wrapped message panel centred along the bottom edge.
pub(crate) fn draw_info_panel(frame: &mut [u8], width: u32, height: u32, message: &str) {
    if message.is_empty() || width == 0 || height == 0 {
        return;
    }
    let max_panel_width = (width as f32 * INFO_PANEL_MAX_WIDTH_FRACTION) as i32;
    let lines = wrap_text(message, chars_that_fit(max_panel_width - 2 * PANEL_INSET));
    let (panel_width, panel_height) = panel_size(&lines);
    let left = (width as i32 - panel_width) / 2;
    let top = height as i32 - SCREEN_MARGIN - panel_height;
    draw_text_panel(frame, width, height, left, top, &lines);
}

fn chars_that_fit(pixels: i32) -> usize {
    (pixels / GLYPH_ADVANCE).max(1) as usize
}

fn panel_size(lines: &[String]) -> (i32, i32) {
    let longest = lines
        .iter()
        .map(|line| line.chars().count() as i32)
        .max()
        .unwrap_or(0);
    (
        longest * GLYPH_ADVANCE + PANEL_INSET * 2,
        lines.len() as i32 * LINE_ADVANCE + PANEL_INSET * 2,
    )
}

fn draw_text_panel(frame: &mut [u8], width: u32, height: u32, left: i32, top: i32, lines: &[String]) {
    if lines.is_empty() {
        return;
    }
    let (panel_width, panel_height) = panel_size(lines);
    let panel = ScreenRectPx::from_origin_size(left, top, panel_width, panel_height);
    blend_rect(frame, width, height, panel, PANEL_BG_COLOR);
    draw_rect_outline(frame, width, height, panel, PANEL_BORDER_COLOR);

    for (index, line) in lines.iter().enumerate() {
        let y = top + PANEL_INSET + index as i32 * LINE_ADVANCE;
        draw_text(frame, width, height, left + PANEL_INSET, y, line, TEXT_COLOR);
    }
}

/// Greedy word wrap. Words longer than a line are split.
pub(crate) fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_chars {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let rest = word.split_off(max_chars);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        if word.is_empty() {
            continue;
        }

        let needed = if current_len == 0 {
            word.len()
        } else {
            current_len + 1 + word.len()
        };
        if needed > max_chars {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.extend(word.iter());
        current_len += word.len();
    }
    if current_len > 0 {
        lines.push(current);
    }
    lines
}

pub(crate) fn draw_text(
    frame: &mut [u8],
    width: u32,
    height: u32,
    mut x: i32,
    y: i32,
    text: &str,
    color: [u8; 4],
) {
    for ch in text.chars() {
        let rows = glyph_rows(ch);
        for (row_index, bits) in rows.iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                    continue;
                }
                let px = x + col * TEXT_SCALE;
                let py = y + row_index as i32 * TEXT_SCALE;
                for sy in 0..TEXT_SCALE {
                    for sx in 0..TEXT_SCALE {
                        write_pixel_rgba_clipped(frame, width, height, px + sx, py + sy, color);
                    }
                }
            }
        }
        x += GLYPH_ADVANCE;
    }
}

/// 3x5 bitmap rows, most significant bit on the left. Lowercase renders as
/// uppercase; anything without a glyph renders as `?`.
fn glyph_rows(ch: char) -> [u8; 5] {
    match ch.to_ascii_uppercase() {
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        'A' => [0b010, 0b101, 0b111, 0b101, 0b101],
        'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'C' => [0b011, 0b100, 0b100, 0b100, 0b011],
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => [0b111, 0b100, 0b110, 0b100, 0b111],
        'F' => [0b111, 0b100, 0b110, 0b100, 0b100],
        'G' => [0b011, 0b100, 0b101, 0b101, 0b011],
        'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'J' => [0b001, 0b001, 0b001, 0b101, 0b010],
        'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'M' => [0b101, 0b111, 0b111, 0b101, 0b101],
        'N' => [0b110, 0b101, 0b101, 0b101, 0b101],
        'O' => [0b010, 0b101, 0b101, 0b101, 0b010],
        'P' => [0b110, 0b101, 0b110, 0b100, 0b100],
        'Q' => [0b010, 0b101, 0b101, 0b110, 0b011],
        'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        'S' => [0b011, 0b100, 0b010, 0b001, 0b110],
        'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'V' => [0b101, 0b101, 0b101, 0b101, 0b010],
        'W' => [0b101, 0b101, 0b111, 0b111, 0b101],
        'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'Y' => [0b101, 0b101, 0b010, 0b010, 0b010],
        'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b110, 0b001, 0b010, 0b100, 0b111],
        '3' => [0b110, 0b001, 0b010, 0b001, 0b110],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b110, 0b001, 0b110],
        '6' => [0b011, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b010, 0b010, 0b010],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b110],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        ';' => [0b000, 0b010, 0b000, 0b010, 0b100],
        '!' => [0b010, 0b010, 0b010, 0b000, 0b010],
        '(' => [0b001, 0b010, 0b010, 0b010, 0b001],
        ')' => [0b100, 0b010, 0b010, 0b010, 0b100],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '\'' => [0b010, 0b010, 0b000, 0b000, 0b000],
        '"' => [0b101, 0b101, 0b000, 0b000, 0b000],
        '&' => [0b010, 0b101, 0b010, 0b101, 0b011],
        '%' => [0b101, 0b001, 0b010, 0b100, 0b101],
        _ => [0b110, 0b001, 0b010, 0b000, 0b010],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_breaks_on_word_boundaries() {
        let lines = wrap_text("Main Library: Quiet study space and books", 16);
        assert_eq!(
            lines,
            vec!["Main Library:", "Quiet study", "space and books"]
        );
    }

    #[test]
    fn wrap_splits_words_longer_than_a_line() {
        assert_eq!(wrap_text("abcdefgh ij", 3), vec!["abc", "def", "gh", "ij"]);
    }

    #[test]
    fn wrap_of_blank_text_is_empty() {
        assert!(wrap_text("   ", 10).is_empty());
    }

    #[test]
    fn lowercase_and_uppercase_share_glyphs() {
        assert_eq!(glyph_rows('q'), glyph_rows('Q'));
        assert_eq!(glyph_rows('\u{e9}'), glyph_rows('#'));
    }

    #[test]
    fn info_panel_stays_inside_frame() {
        let (width, height) = (120u32, 80u32);
        let mut frame = vec![0u8; (width * height * 4) as usize];
        draw_info_panel(
            &mut frame,
            width,
            height,
            "A very long message that must wrap across several lines to fit",
        );
        assert!(frame.iter().any(|byte| *byte != 0));
        assert_eq!(frame.len(), (width * height * 4) as usize);
    }

    #[test]
    fn text_on_tiny_frames_is_safe() {
        let mut frame = vec![0u8; 4];
        draw_text(&mut frame, 1, 1, -3, -3, "HELLO", TEXT_COLOR);
        draw_status_panel(&mut frame, 1, 1, "Find (1/5): Library");
        draw_info_panel(&mut frame, 0, 0, "x");
    }
}
