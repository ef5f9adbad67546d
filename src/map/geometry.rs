use crate::braille::BrailleCanvas;

/// Draw a line using Bresenham's algorithm.
pub fn draw_line(canvas: &mut BrailleCanvas, x0: i32, y0: i32, x1: i32, y1: i32) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut x = x0;
    let mut y = y0;

    loop {
        canvas.set_pixel(x, y);

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;

        if e2 >= dy {
            if x == x1 {
                break;
            }
            err += dy;
            x += sx;
        }

        if e2 <= dx {
            if y == y1 {
                break;
            }
            err += dx;
            y += sy;
        }
    }
}

/// Draw a filled disc (site markers).
pub fn draw_disc(canvas: &mut BrailleCanvas, cx: i32, cy: i32, radius: i32) {
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                canvas.set_pixel(cx + dx, cy + dy);
            }
        }
    }
}

/// Draw a one-pixel ring (selection highlight around a marker).
pub fn draw_ring(canvas: &mut BrailleCanvas, cx: i32, cy: i32, radius: i32) {
    let r2 = radius * radius;
    let inner = (radius - 1) * (radius - 1);
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let d2 = dx * dx + dy * dy;
            if d2 <= r2 && d2 > inner {
                canvas.set_pixel(cx + dx, cy + dy);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(canvas: &BrailleCanvas) -> usize {
        (0..canvas.rows()).map(|r| canvas.row_cells(r).count()).sum()
    }

    #[test]
    fn test_line_reaches_both_ends() {
        let mut canvas = BrailleCanvas::new(8, 2);
        draw_line(&mut canvas, 0, 0, 15, 7);
        assert!(lit(&canvas) > 0);
    }

    #[test]
    fn test_disc_fills_center() {
        let mut canvas = BrailleCanvas::new(4, 2);
        draw_disc(&mut canvas, 4, 4, 2);
        assert!(lit(&canvas) > 0);
    }
}
