//! Optional background outlines (coastlines, borders) drawn under the
//! marker layer.

use crate::braille::BrailleCanvas;
use crate::map::geometry::draw_line;
use crate::map::projection::Viewport;

/// A geographic line: sequence of (lon, lat) pairs.
pub type Outline = Vec<(f64, f64)>;

/// Draw all outlines with per-segment viewport culling.
pub fn draw(outlines: &[Outline], canvas: &mut BrailleCanvas, viewport: &Viewport) {
    for line in outlines {
        draw_outline(line, canvas, viewport);
    }
}

fn draw_outline(line: &[(f64, f64)], canvas: &mut BrailleCanvas, viewport: &Viewport) {
    if line.len() < 2 {
        return;
    }
    let mut prev: Option<(i32, i32)> = None;
    for &(lon, lat) in line {
        let (px, py) = viewport.project(lon, lat);
        if let Some((prev_x, prev_y)) = prev {
            // skip wrap-around jumps wider than the canvas
            let dist = ((px - prev_x).abs() + (py - prev_y).abs()) as usize;
            if dist < viewport.width && viewport.line_might_be_visible((prev_x, prev_y), (px, py)) {
                draw_line(canvas, prev_x, prev_y, px, py);
            }
        }
        prev = Some((px, py));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_outline_lights_pixels() {
        let viewport = Viewport::new(45.0, 24.0, 6.0, 80, 40);
        let mut canvas = BrailleCanvas::new(40, 10);
        let outline: Outline = vec![(44.9, 23.9), (45.1, 24.1)];
        draw(&[outline], &mut canvas, &viewport);
        let lit: usize = (0..canvas.rows()).map(|r| canvas.row_cells(r).count()).sum();
        assert!(lit > 0);
    }

    #[test]
    fn test_single_point_outline_is_ignored() {
        let viewport = Viewport::new(0.0, 0.0, 2.0, 80, 40);
        let mut canvas = BrailleCanvas::new(40, 10);
        draw(&[vec![(0.0, 0.0)]], &mut canvas, &viewport);
        let lit: usize = (0..canvas.rows()).map(|r| canvas.row_cells(r).count()).sum();
        assert_eq!(lit, 0);
    }
}
