use crate::braille::BrailleCanvas;

/// Draw a line using Bresenham's algorithm
pub fn draw_line(canvas: &mut BrailleCanvas, x0: i32, y0: i32, x1: i32, y1: i32) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut x = x0;
    let mut y = y0;

    loop {
        canvas.set_pixel_signed(x, y);

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

/// Even-odd scanline fill of a closed ring, sampled at pixel centers
pub fn fill_ring(canvas: &mut BrailleCanvas, points: &[(f64, f64)]) {
    if points.len() < 3 {
        return;
    }

    let (min_y, max_y) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| (lo.min(p.1), hi.max(p.1)));
    let y_start = min_y.floor().max(0.0) as i32;
    let y_end = max_y.ceil().min(canvas.pixel_height() as f64) as i32;
    let x_limit = canvas.pixel_width() as f64;

    let mut crossings: Vec<f64> = Vec::new();
    for y in y_start..y_end {
        let sample = y as f64 + 0.5;
        crossings.clear();

        let mut j = points.len() - 1;
        for i in 0..points.len() {
            let (xi, yi) = points[i];
            let (xj, yj) = points[j];
            if (yi > sample) != (yj > sample) {
                crossings.push(xi + (sample - yi) * (xj - xi) / (yj - yi));
            }
            j = i;
        }
        crossings.sort_by(f64::total_cmp);

        for span in crossings.chunks_exact(2) {
            let x0 = (span[0] - 0.5).ceil().max(0.0);
            let x1 = (span[1] - 0.5).floor().min(x_limit - 1.0);
            let mut x = x0;
            while x <= x1 {
                canvas.set_pixel(x as usize, y as usize);
                x += 1.0;
            }
        }
    }
}

/// Draw a point marker (small cross)
pub fn draw_marker(canvas: &mut BrailleCanvas, x: i32, y: i32, size: i32) {
    for i in -size..=size {
        canvas.set_pixel_signed(x + i, y);
        canvas.set_pixel_signed(x, y + i);
    }
}
