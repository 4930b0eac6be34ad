use crate::analytics::{format_magnitude, top_n};
use crate::charts::scale::{BandScale, LinearScale};
use crate::charts::{Anchor, Chart, Margin, Paint, Primitive, Scene, Size, Tooltip};

const MARGIN: Margin = Margin::new(40.0, 30.0, 60.0, 60.0);

/// Categories beyond this are dropped after sorting by value.
pub const MAX_BARS: usize = 10;

/// Share of each band occupied by its bar.
const BAR_FILL: f64 = 0.7;

/// Labels longer than this are cut and suffixed with `...`.
const LABEL_MAX_CHARS: usize = 8;

/// Labels longer than this are drawn at an angle.
const ROTATE_AFTER_CHARS: usize = 6;

/// XP per project, highest first.
pub fn xp_bar(projects: &[(String, i64)], size: Size) -> Chart {
    let bars = top_n(projects, MAX_BARS);
    let max = bars.iter().map(|(_, xp)| *xp).max().unwrap_or(0);
    if bars.is_empty() || max <= 0 {
        return Chart::no_data(size, "No project XP data available");
    }

    let (plot_w, plot_h) = MARGIN.inner(size);
    let baseline = MARGIN.top + plot_h;
    let band = BandScale::new(MARGIN.left, plot_w, bars.len());
    let height = LinearScale::new((0.0, max as f64), (0.0, plot_h));
    let bar_w = band.step() * BAR_FILL;

    let mut scene = Scene::new(size);

    for (i, (name, xp)) in bars.iter().enumerate() {
        let h = height.map(*xp as f64).max(0.0);
        let cx = band.center(i);
        scene.push_with_tooltip(
            Primitive::Rect {
                x: cx - bar_w / 2.0,
                y: baseline - h,
                width: bar_w,
                height: h,
                fill: Paint::Primary,
            },
            Tooltip::new(name.clone(), vec![format!("XP: {}", format_magnitude(*xp))]),
        );

        let label_y = size.height - MARGIN.bottom / 2.0;
        let chars = name.chars().count();
        let content = if chars > LABEL_MAX_CHARS {
            format!("{}...", name.chars().take(LABEL_MAX_CHARS).collect::<String>())
        } else {
            name.clone()
        };
        let (anchor, rotate) = if chars > ROTATE_AFTER_CHARS {
            (Anchor::End, Some(-45.0))
        } else {
            (Anchor::Middle, None)
        };
        scene.push(Primitive::Text {
            x: cx,
            y: label_y,
            content,
            paint: Paint::Text,
            font_size: 12.0,
            anchor,
            rotate,
            bold: false,
        });
    }

    scene.push(Primitive::axis(MARGIN.left, MARGIN.top, MARGIN.left, baseline));
    scene.push(Primitive::axis(MARGIN.left, baseline, MARGIN.left + plot_w, baseline));

    scene.push(Primitive::Text {
        x: MARGIN.left / 3.0,
        y: MARGIN.top + plot_h / 2.0,
        content: "XP Amount".to_string(),
        paint: Paint::Text,
        font_size: 12.0,
        anchor: Anchor::Middle,
        rotate: Some(-90.0),
        bold: false,
    });
    scene.push(Primitive::title(size.width / 2.0, MARGIN.top / 2.0, "XP per Project"));

    Chart::Drawn(scene)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rects(chart: &Chart) -> Vec<(f64, f64)> {
        chart
            .scene()
            .unwrap()
            .primitives()
            .filter_map(|p| match p {
                Primitive::Rect { width, height, .. } => Some((*width, *height)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn tallest_bar_fills_plot_height() {
        let data = vec![("a".to_string(), 50), ("b".to_string(), 100)];
        let chart = xp_bar(&data, Size::new(600.0, 320.0));
        let bars = rects(&chart);
        assert_eq!(bars.len(), 2);
        // sorted descending: b first, full height 220
        assert_eq!(bars[0].1, 220.0);
        assert_eq!(bars[1].1, 110.0);
        // 510 px / 2 bands * 0.7
        assert!((bars[0].0 - 178.5).abs() < 1e-9);
    }

    #[test]
    fn caps_at_ten_bars() {
        let data: Vec<_> = (1..=15).map(|i| (format!("p{i}"), i * 10)).collect();
        let chart = xp_bar(&data, Size::new(600.0, 320.0));
        assert_eq!(rects(&chart).len(), MAX_BARS);
    }

    #[test]
    fn long_labels_truncate_and_rotate() {
        let data = vec![("groupie-tracker".to_string(), 10)];
        let chart = xp_bar(&data, Size::new(600.0, 320.0));
        let label = chart
            .scene()
            .unwrap()
            .primitives()
            .find_map(|p| match p {
                Primitive::Text { content, rotate, .. } if content.ends_with("...") => {
                    Some((content.clone(), *rotate))
                }
                _ => None,
            })
            .unwrap();
        assert_eq!(label, ("groupie-...".to_string(), Some(-45.0)));
    }

    #[test]
    fn empty_or_zero_is_placeholder() {
        let size = Size::new(600.0, 320.0);
        assert!(!xp_bar(&[], size).is_drawn());
        assert!(!xp_bar(&[("a".to_string(), 0)], size).is_drawn());
    }
}
