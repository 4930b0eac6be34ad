//! Audit charts: monthly history of audits given and received, and a
//! two-bar comparison of their point totals.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::analytics::{audit_ratio, format_number, total_amount};
use crate::charts::scale::LinearScale;
use crate::charts::{
    Anchor, Chart, Margin, Paint, PathCmd, Primitive, Scene, Size, Tooltip, month_start,
    short_month,
};
use crate::model::{Audits, Transaction};

const HISTORY_MARGIN: Margin = Margin::new(30.0, 30.0, 40.0, 50.0);
const TOTALS_MARGIN: Margin = Margin::new(40.0, 30.0, 70.0, 60.0);

const NO_AUDITS: &str = "No audit data available";

/// Series colors, shared by every audit chart.
const RECEIVED_PAINT: Paint = Paint::Success;
const GIVEN_PAINT: Paint = Paint::Primary;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct MonthTally {
    count: usize,
    points: i64,
}

fn tally_by_month(audits: &[Transaction]) -> BTreeMap<(i32, u32), MonthTally> {
    let mut months: BTreeMap<(i32, u32), MonthTally> = BTreeMap::new();
    for tx in audits {
        let entry = months
            .entry((tx.created_at.year(), tx.created_at.month()))
            .or_default();
        entry.count += 1;
        entry.points += tx.amount;
    }
    months
}

/// Every month from `first` to `last` inclusive.
pub(crate) fn month_range(first: (i32, u32), last: (i32, u32)) -> Vec<(i32, u32)> {
    let mut out = Vec::new();
    let (mut year, mut month) = first;
    while (year, month) <= last {
        out.push((year, month));
        if month == 12 {
            year += 1;
            month = 1;
        } else {
            month += 1;
        }
    }
    out
}

struct HistoryPoint {
    date: NaiveDate,
    given: MonthTally,
    received: MonthTally,
}

/// Audits given and received per month, on one shared count scale.
///
/// Months without activity inside the range are drawn as zero.
pub fn audit_history(audits: &Audits, size: Size) -> Chart {
    let given = tally_by_month(&audits.given);
    let received = tally_by_month(&audits.received);

    let first = given.keys().chain(received.keys()).min().copied();
    let last = given.keys().chain(received.keys()).max().copied();
    let (Some(first), Some(last)) = (first, last) else {
        return Chart::no_data(size, NO_AUDITS);
    };

    let points: Vec<HistoryPoint> = month_range(first, last)
        .into_iter()
        .filter_map(|key| {
            Some(HistoryPoint {
                date: month_start(key.0, key.1)?,
                given: given.get(&key).copied().unwrap_or_default(),
                received: received.get(&key).copied().unwrap_or_default(),
            })
        })
        .collect();
    let (Some(start), Some(end)) = (points.first(), points.last()) else {
        return Chart::no_data(size, NO_AUDITS);
    };

    let max_count = points
        .iter()
        .map(|p| p.given.count.max(p.received.count))
        .max()
        .unwrap_or(0);

    let m = HISTORY_MARGIN;
    let (plot_w, plot_h) = m.inner(size);
    let baseline = m.top + plot_h;
    let total_days = (end.date - start.date).num_days() as f64;
    let x = LinearScale::new((0.0, total_days), (m.left, m.left + plot_w));
    let y = LinearScale::new((0.0, max_count as f64), (baseline, m.top));
    let px = |p: &HistoryPoint| x.map((p.date - start.date).num_days() as f64);

    let mut scene = Scene::new(size);

    let series: [(&str, Paint, fn(&HistoryPoint) -> MonthTally); 2] = [
        ("Received", RECEIVED_PAINT, |p| p.received),
        ("Given", GIVEN_PAINT, |p| p.given),
    ];

    for (_, paint, pick) in series {
        let commands = points
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let (lx, ly) = (px(p), y.map(pick(p).count as f64));
                if i == 0 { PathCmd::MoveTo(lx, ly) } else { PathCmd::LineTo(lx, ly) }
            })
            .collect();
        scene.push(Primitive::Path { commands, stroke: Some(paint), fill: None, fill_opacity: 0.0 });
    }

    for p in &points {
        for (name, paint, pick) in series {
            let tally = pick(p);
            if tally.count == 0 {
                continue;
            }
            scene.push_with_tooltip(
                Primitive::Circle { cx: px(p), cy: y.map(tally.count as f64), r: 4.0, fill: paint },
                Tooltip::new(
                    p.date.format("%b %Y").to_string(),
                    vec![
                        format!("{name}: {} audits", tally.count),
                        format!("{} points", format_number(tally.points)),
                    ],
                ),
            );
        }
    }

    scene.push(Primitive::axis(m.left, baseline, m.left + plot_w, baseline));
    scene.push(Primitive::axis(m.left, m.top, m.left, baseline));

    let label_indices: Vec<usize> = if points.len() <= 6 {
        (0..points.len()).collect()
    } else {
        vec![0, points.len() / 2, points.len() - 1]
    };
    for i in label_indices {
        let p = &points[i];
        scene.push(Primitive::label(px(p), baseline + 20.0, short_month(p.date), Anchor::Middle));
    }

    let mut y_ticks = vec![0, max_count.div_ceil(2), max_count];
    y_ticks.dedup();
    for tick in y_ticks {
        scene.push(Primitive::label(
            m.left - 15.0,
            y.map(tick as f64) + 4.0,
            tick.to_string(),
            Anchor::End,
        ));
    }

    let mut legend_x = m.left + 10.0;
    for (name, paint, _) in series {
        scene.push(Primitive::Rect { x: legend_x, y: 5.0, width: 12.0, height: 12.0, fill: paint });
        scene.push(Primitive::label(legend_x + 18.0, 15.0, name, Anchor::Start));
        legend_x += 90.0;
    }

    scene.push(Primitive::Text {
        x: m.left / 3.0,
        y: m.top + plot_h / 2.0,
        content: "Audits".to_string(),
        paint: Paint::Text,
        font_size: 12.0,
        anchor: Anchor::Middle,
        rotate: Some(-90.0),
        bold: false,
    });

    Chart::Drawn(scene)
}

/// Point totals of audits given against received, titled with the ratio.
pub fn audit_totals(audits: &Audits, size: Size) -> Chart {
    let given = total_amount(&audits.given);
    let received = total_amount(&audits.received);
    let max = given.max(received);
    if audits.is_empty() || max <= 0 {
        return Chart::no_data(size, NO_AUDITS);
    }

    let m = TOTALS_MARGIN;
    let (plot_w, plot_h) = m.inner(size);
    let baseline = m.top + plot_h;
    let bar_w = plot_w / 3.0;
    let height = LinearScale::new((0.0, max as f64), (0.0, plot_h));

    let mut scene = Scene::new(size);
    let bars = [
        ("Given", given, GIVEN_PAINT, m.left + plot_w / 4.0),
        ("Received", received, RECEIVED_PAINT, m.left + plot_w * 3.0 / 4.0),
    ];
    for (label, value, paint, center) in bars {
        let h = height.map(value as f64).max(0.0);
        let top = baseline - h;
        scene.push_with_tooltip(
            Primitive::Rect { x: center - bar_w / 2.0, y: top, width: bar_w, height: h, fill: paint },
            Tooltip::new(label, vec![format!("{} points", format_number(value))]),
        );
        scene.push(Primitive::Text {
            x: center,
            y: top - 10.0,
            content: format_number(value),
            paint: Paint::Text,
            font_size: 14.0,
            anchor: Anchor::Middle,
            rotate: None,
            bold: false,
        });
        scene.push(Primitive::Text {
            x: center,
            y: baseline + 20.0,
            content: label.to_string(),
            paint: Paint::Text,
            font_size: 14.0,
            anchor: Anchor::Middle,
            rotate: None,
            bold: false,
        });
    }

    scene.push(Primitive::axis(m.left, baseline, m.left + plot_w, baseline));
    scene.push(Primitive::title(
        size.width / 2.0,
        m.top / 2.0,
        format!("Audit Ratio: {}", audit_ratio(given, received)),
    ));

    Chart::Drawn(scene)
}
