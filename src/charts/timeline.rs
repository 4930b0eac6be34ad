use chrono::NaiveDate;

use crate::analytics::{MonthBucket, format_magnitude};
use crate::charts::scale::LinearScale;
use crate::charts::{
    Anchor, Chart, Margin, Paint, PathCmd, Primitive, Scene, Size, Tooltip, short_month,
};

const MARGIN: Margin = Margin::new(40.0, 30.0, 50.0, 60.0);

/// Above this many points only every n-th gets a marker.
const MAX_MARKERS: usize = 12;

struct Point {
    date: NaiveDate,
    label: String,
    monthly: i64,
    cumulative: i64,
}

/// Indices that get a marker: every `ceil(n / 12)`-th point, plus the last.
pub(crate) fn marker_indices(n: usize) -> Vec<usize> {
    if n <= MAX_MARKERS {
        return (0..n).collect();
    }
    let step = n.div_ceil(MAX_MARKERS);
    let mut picked: Vec<usize> = (0..n).step_by(step).collect();
    if picked.last() != Some(&(n - 1)) {
        picked.push(n - 1);
    }
    picked
}

/// Indices that get an x-axis label.
fn axis_label_indices(n: usize) -> Vec<usize> {
    if n <= 6 {
        return (0..n).collect();
    }
    let step = n.div_ceil(4);
    let mut picked = vec![0];
    picked.extend((step..n.saturating_sub(step)).step_by(step));
    picked.push(n - 1);
    picked
}

/// Cumulative XP over time from ascending monthly buckets.
///
/// The x axis is proportional to elapsed days, not bucket index.
pub fn xp_timeline(buckets: &[MonthBucket], size: Size) -> Chart {
    let mut running = 0;
    let points: Vec<Point> = buckets
        .iter()
        .filter_map(|b| {
            running += b.total;
            Some(Point {
                date: b.start()?,
                label: b.label(),
                monthly: b.total,
                cumulative: running,
            })
        })
        .collect();

    // the floor drops below zero when a running total goes negative
    let max = points.iter().map(|p| p.cumulative).max().unwrap_or(0).max(0);
    let floor = points.iter().map(|p| p.cumulative).min().unwrap_or(0).min(0);
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return Chart::no_data(size, "No XP timeline data available");
    };
    if max == floor {
        return Chart::no_data(size, "No XP timeline data available");
    }

    let (plot_w, plot_h) = MARGIN.inner(size);
    let baseline = MARGIN.top + plot_h;
    let total_days = (last.date - first.date).num_days() as f64;
    let x = LinearScale::new((0.0, total_days), (MARGIN.left, MARGIN.left + plot_w));
    let y = LinearScale::new((floor as f64, max as f64), (baseline, MARGIN.top));
    let px = |p: &Point| x.map((p.date - first.date).num_days() as f64);

    let mut scene = Scene::new(size);

    // grid and y labels at 0/25/50/75/100% of the range
    for i in 0..=4 {
        let value = floor as f64 + (max - floor) as f64 * i as f64 / 4.0;
        let gy = y.map(value);
        scene.push(Primitive::grid(MARGIN.left, gy, MARGIN.left + plot_w, gy));
        scene.push(Primitive::label(
            MARGIN.left - 10.0,
            gy + 4.0,
            format_magnitude(value.round() as i64),
            Anchor::End,
        ));
    }

    let line: Vec<PathCmd> = points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let (lx, ly) = (px(p), y.map(p.cumulative as f64));
            if i == 0 { PathCmd::MoveTo(lx, ly) } else { PathCmd::LineTo(lx, ly) }
        })
        .collect();

    let mut area = line.clone();
    area.push(PathCmd::LineTo(px(last), y.map(0.0)));
    area.push(PathCmd::LineTo(px(first), y.map(0.0)));
    area.push(PathCmd::Close);
    scene.push(Primitive::Path {
        commands: area,
        stroke: None,
        fill: Some(Paint::Primary),
        fill_opacity: 0.1,
    });

    scene.push(Primitive::Path {
        commands: line,
        stroke: Some(Paint::Primary),
        fill: None,
        fill_opacity: 0.0,
    });

    for i in marker_indices(points.len()) {
        let p = &points[i];
        scene.push_with_tooltip(
            Primitive::Circle { cx: px(p), cy: y.map(p.cumulative as f64), r: 4.0, fill: Paint::Primary },
            Tooltip::new(
                p.label.clone(),
                vec![
                    format!("Total XP: {}", format_magnitude(p.cumulative)),
                    format!("Monthly XP: {}", format_magnitude(p.monthly)),
                ],
            ),
        );
    }

    scene.push(Primitive::axis(MARGIN.left, baseline, MARGIN.left + plot_w, baseline));
    scene.push(Primitive::axis(MARGIN.left, MARGIN.top, MARGIN.left, baseline));
    for i in axis_label_indices(points.len()) {
        let p = &points[i];
        scene.push(Primitive::label(px(p), baseline + 20.0, short_month(p.date), Anchor::Middle));
    }

    scene.push(Primitive::title(size.width / 2.0, MARGIN.top / 2.0, "XP Growth Over Time"));
    Chart::Drawn(scene)
}
