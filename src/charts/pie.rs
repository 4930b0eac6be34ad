use std::f64::consts::TAU;

use crate::analytics::PassFail;
use crate::charts::{Anchor, Chart, Paint, Primitive, Scene, Size, Tooltip};

const LEGEND_SWATCH: f64 = 15.0;

/// One pie category.
#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub label: String,
    pub value: f64,
    pub paint: Paint,
    /// What `value` counts, shown in the tooltip (`"projects"`, `"XP"`).
    pub unit: Option<String>,
}

impl Slice {
    pub fn new(label: impl Into<String>, value: f64, paint: Paint) -> Self {
        Self { label: label.into(), value, paint, unit: None }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    fn tooltip_line(&self, percent: f64) -> String {
        let value = self.value as i64;
        match &self.unit {
            Some(unit) => format!("{percent}% ({value} {unit})"),
            None => format!("{percent}% ({value})"),
        }
    }
}

/// Sectors in input order, starting at angle 0.
///
/// Zero-valued slices get no sector but keep their legend entry. A zero
/// total renders the placeholder.
pub fn pie(slices: &[Slice], size: Size, title: &str) -> Chart {
    let value_of = |s: &Slice| if s.value.is_finite() { s.value.max(0.0) } else { 0.0 };
    let total: f64 = slices.iter().map(value_of).sum();
    if total <= 0.0 {
        return Chart::no_data(size, "No project data available");
    }

    let radius = (size.width.min(size.height) / 2.0 - 40.0).max(10.0);
    let (cx, cy) = (size.width / 2.0, size.height / 2.0);
    let mut scene = Scene::new(size);

    let mut start = 0.0;
    for slice in slices {
        let value = value_of(slice);
        if value <= 0.0 {
            continue;
        }
        let share = value / total;
        let end = start + TAU * share;
        let percent = (share * 100.0).round();

        scene.push_with_tooltip(
            Primitive::Sector { cx, cy, radius, start, end, fill: slice.paint },
            Tooltip::new(slice.label.clone(), vec![slice.tooltip_line(percent)]),
        );

        let mid = (start + end) / 2.0;
        scene.push(Primitive::Text {
            x: cx + radius * 0.65 * mid.cos(),
            y: cy + radius * 0.65 * mid.sin(),
            content: format!("{percent}%"),
            paint: Paint::Background,
            font_size: 12.0,
            anchor: Anchor::Middle,
            rotate: None,
            bold: true,
        });
        start = end;
    }

    let legend_x = cx - radius;
    let mut legend_y = cy + radius + 20.0;
    for slice in slices {
        scene.push(Primitive::Rect {
            x: legend_x,
            y: legend_y,
            width: LEGEND_SWATCH,
            height: LEGEND_SWATCH,
            fill: slice.paint,
        });
        scene.push(Primitive::label(
            legend_x + LEGEND_SWATCH + 5.0,
            legend_y + 12.0,
            format!("{} ({})", slice.label, slice.value as i64),
            Anchor::Start,
        ));
        legend_y += LEGEND_SWATCH + 10.0;
    }

    scene.push(Primitive::title(size.width / 2.0, 20.0, title));
    Chart::Drawn(scene)
}

/// Passed against failed projects. Pending records are not drawn.
pub fn pass_fail_pie(counts: &PassFail, size: Size) -> Chart {
    pie(
        &[
            Slice::new("Passed", counts.passed as f64, Paint::Success).with_unit("projects"),
            Slice::new("Failed", counts.failed as f64, Paint::Danger).with_unit("projects"),
        ],
        size,
        "Project Pass/Fail Ratio",
    )
}
