//! Pie chart drawn from polygons on the root area.

use crate::aggregation::GroupTotal;
use crate::types::DeliveryStatus;
use anyhow::Result;
use plotters::prelude::*;
use std::f64::consts::{FRAC_PI_2, TAU};
use std::path::Path;

use super::{CAPTION_FONT, CHART_SIZE};

const RADIUS: f64 = 170.0;
const EXPLODE_OFFSET: f64 = 18.0;
const ARC_STEPS_PER_TURN: f64 = 180.0;

const PALETTE: [RGBColor; 6] = [
    RGBColor(70, 130, 180),
    RGBColor(240, 128, 60),
    RGBColor(46, 139, 87),
    RGBColor(205, 92, 92),
    RGBColor(147, 112, 219),
    RGBColor(218, 165, 32),
];

/// Draw one slice per positive total, starting at twelve o'clock and
/// running clockwise. The largest slice is offset from the centre.
pub(super) fn draw_pie(path: &Path, title: &str, totals: &[GroupTotal]) -> Result<()> {
    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let area = root.titled(title, CAPTION_FONT)?;

    let (width, height) = area.dim_in_pixel();
    let center = (width as f64 / 2.0, height as f64 / 2.0);
    let sum: f64 = totals.iter().map(|t| t.value.max(0.0)).sum();
    let largest = totals
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.value.total_cmp(&b.1.value))
        .map(|(i, _)| i);

    let mut start = -FRAC_PI_2;
    for (i, total) in totals.iter().enumerate() {
        if total.value <= 0.0 {
            continue;
        }
        let sweep = total.value / sum * TAU;
        let mid = start + sweep / 2.0;
        let offset = if Some(i) == largest { EXPLODE_OFFSET } else { 0.0 };
        let origin = (center.0 + offset * mid.cos(), center.1 + offset * mid.sin());
        let color = slice_color(i, &total.key);

        area.draw(&Polygon::new(slice_points(origin, start, sweep), color.filled()))?;

        let label_radius = RADIUS + 30.0;
        let label_at = (
            origin.0 + label_radius * mid.cos(),
            origin.1 + label_radius * mid.sin(),
        );
        let label = format!("{} ({:.1}%)", total.key, total.value / sum * 100.0);
        area.draw(&Text::new(
            label,
            (label_at.0 as i32 - 40, label_at.1 as i32),
            ("sans-serif", 16).into_font().color(&BLACK),
        ))?;

        start += sweep;
    }

    root.present()?;
    Ok(())
}

fn slice_color(index: usize, key: &str) -> RGBColor {
    match DeliveryStatus::parse(key) {
        Some(DeliveryStatus::Delivered) => RGBColor(46, 139, 87),
        Some(DeliveryStatus::Pending) => RGBColor(240, 128, 60),
        Some(DeliveryStatus::Canceled) => RGBColor(205, 92, 92),
        None => PALETTE[index % PALETTE.len()],
    }
}

fn slice_points(origin: (f64, f64), start: f64, sweep: f64) -> Vec<(i32, i32)> {
    let steps = ((sweep / TAU) * ARC_STEPS_PER_TURN).ceil().max(2.0) as usize;
    let mut points = Vec::with_capacity(steps + 2);
    points.push((origin.0 as i32, origin.1 as i32));
    for step in 0..=steps {
        let angle = start + sweep * step as f64 / steps as f64;
        points.push((
            (origin.0 + RADIUS * angle.cos()).round() as i32,
            (origin.1 + RADIUS * angle.sin()).round() as i32,
        ));
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_turn_closes_on_start_point() {
        let points = slice_points((0.0, 0.0), -FRAC_PI_2, TAU);
        assert_eq!(points[0], (0, 0));
        assert_eq!(points[1], (0, -170));
        assert_eq!(points.last(), Some(&(0, -170)));
    }

    #[test]
    fn test_status_slices_have_fixed_colors() {
        assert_eq!(slice_color(0, "Canceled"), slice_color(3, "Canceled"));
        assert_eq!(slice_color(1, "other"), PALETTE[1]);
    }

    #[test]
    fn test_pie_writes_labels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pie.svg");
        let totals = vec![
            GroupTotal { key: "Delivered".into(), value: 3.0 },
            GroupTotal { key: "Pending".into(), value: 1.0 },
            GroupTotal { key: "Cancelled".into(), value: 0.0 },
        ];

        draw_pie(&path, "Delivery status", &totals).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("Delivered (75.0%)"));
        assert!(content.contains("Pending (25.0%)"));
        assert!(!content.contains("Cancelled"));
    }
}
