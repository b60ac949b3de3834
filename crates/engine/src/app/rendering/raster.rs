/// Half-open pixel rectangle: `left..right`, `top..bottom`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ScreenRectPx {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl ScreenRectPx {
    pub(crate) fn from_origin_size(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            right: left.saturating_add(width),
            bottom: top.saturating_add(height),
        }
    }

    pub(crate) fn clipped(self, width: u32, height: u32) -> Option<Self> {
        let clipped = Self {
            left: self.left.max(0),
            top: self.top.max(0),
            right: self.right.min(width as i32),
            bottom: self.bottom.min(height as i32),
        };
        (clipped.left < clipped.right && clipped.top < clipped.bottom).then_some(clipped)
    }
}

pub(crate) fn clear(frame: &mut [u8], color: [u8; 4]) {
    for pixel in frame.chunks_exact_mut(4) {
        pixel.copy_from_slice(&color);
    }
}

fn pixel_range(frame_len: usize, width: u32, height: u32, x: i32, y: i32) -> Option<(usize, usize)> {
    if x < 0 || y < 0 || x >= width as i32 || y >= height as i32 {
        return None;
    }
    let pixel_offset = (y as usize)
        .checked_mul(width as usize)?
        .checked_add(x as usize)?;
    let start = pixel_offset.checked_mul(4)?;
    let end = start.checked_add(4)?;
    (end <= frame_len).then_some((start, end))
}

pub(crate) fn write_pixel_rgba_clipped(
    frame: &mut [u8],
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    color: [u8; 4],
) {
    if let Some((start, end)) = pixel_range(frame.len(), width, height, x, y) {
        frame[start..end].copy_from_slice(&color);
    }
}

/// Alpha-blends `color` over the existing pixel using `color[3]`.
pub(crate) fn blend_pixel_clipped(
    frame: &mut [u8],
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    color: [u8; 4],
) {
    let Some((start, _)) = pixel_range(frame.len(), width, height, x, y) else {
        return;
    };
    let alpha = color[3] as u32;
    for channel in 0..3 {
        let dst = frame[start + channel] as u32;
        let src = color[channel] as u32;
        frame[start + channel] = ((src * alpha + dst * (255 - alpha)) / 255) as u8;
    }
    frame[start + 3] = 255;
}

pub(crate) fn fill_rect(frame: &mut [u8], width: u32, height: u32, rect: ScreenRectPx, color: [u8; 4]) {
    let Some(rect) = rect.clipped(width, height) else {
        return;
    };
    for y in rect.top..rect.bottom {
        for x in rect.left..rect.right {
            write_pixel_rgba_clipped(frame, width, height, x, y, color);
        }
    }
}

pub(crate) fn blend_rect(frame: &mut [u8], width: u32, height: u32, rect: ScreenRectPx, color: [u8; 4]) {
    let Some(rect) = rect.clipped(width, height) else {
        return;
    };
    for y in rect.top..rect.bottom {
        for x in rect.left..rect.right {
            blend_pixel_clipped(frame, width, height, x, y, color);
        }
    }
}

pub(crate) fn draw_rect_outline(
    frame: &mut [u8],
    width: u32,
    height: u32,
    rect: ScreenRectPx,
    color: [u8; 4],
) {
    if rect.right - rect.left <= 1 || rect.bottom - rect.top <= 1 {
        return;
    }
    for x in rect.left..rect.right {
        write_pixel_rgba_clipped(frame, width, height, x, rect.top, color);
        write_pixel_rgba_clipped(frame, width, height, x, rect.bottom - 1, color);
    }
    for y in rect.top..rect.bottom {
        write_pixel_rgba_clipped(frame, width, height, rect.left, y, color);
        write_pixel_rgba_clipped(frame, width, height, rect.right - 1, y, color);
    }
}

/// Filled disc; `thickness` > 0 draws only the outer ring of that width.
#[allow(clippy::too_many_arguments)]
pub(crate) fn draw_circle(
    frame: &mut [u8],
    width: u32,
    height: u32,
    cx: i32,
    cy: i32,
    radius: i32,
    thickness: i32,
    color: [u8; 4],
) {
    if radius <= 0 {
        return;
    }
    let outer = radius * radius;
    let inner_radius = if thickness > 0 {
        (radius - thickness).max(0)
    } else {
        0
    };
    let inner = inner_radius * inner_radius;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let distance_sq = dx * dx + dy * dy;
            if distance_sq > outer || (thickness > 0 && distance_sq < inner) {
                continue;
            }
            write_pixel_rgba_clipped(frame, width, height, cx + dx, cy + dy, color);
        }
    }
}
