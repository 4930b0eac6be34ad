//! SVG painter for chart scenes.
//!
//! Elements with a tooltip get a `data-tooltip` attribute (read by the web
//! page's hover script) and a `<title>` child (native fallback).

use std::f64::consts::{PI, TAU};
use std::fmt::Write as _;

use crate::charts::{Anchor, Chart, Element, Palette, PathCmd, Primitive};

/// Paint a chart with the given palette.
pub fn render(chart: &Chart, palette: &Palette) -> String {
    let size = chart.size();
    let mut out = String::new();
    let _ = write!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" class="chart" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = num(size.width),
        h = num(size.height),
    );

    match chart {
        Chart::NoData { message, .. } => {
            let _ = write!(
                out,
                r#"<text class="no-data" x="{}" y="{}" text-anchor="middle" fill="{}">{}</text>"#,
                num(size.width / 2.0),
                num(size.height / 2.0),
                palette.text,
                escape(message),
            );
        }
        Chart::Drawn(scene) => {
            for element in &scene.elements {
                paint_element(&mut out, element, palette);
            }
        }
    }

    out.push_str("</svg>");
    out
}

fn paint_element(out: &mut String, element: &Element, palette: &Palette) {
    let (tag, attrs) = shape(&element.primitive, palette);
    let tip_attr = element
        .tooltip
        .as_ref()
        .map(|t| format!(r#" class="has-tooltip" data-tooltip="{}""#, escape(&t.text())))
        .unwrap_or_default();

    let body = match &element.primitive {
        Primitive::Text { content, .. } => Some(escape(content)),
        _ => None,
    };
    let title = element
        .tooltip
        .as_ref()
        .map(|t| format!("<title>{}</title>", escape(&t.text())));

    match (body, title) {
        (None, None) => {
            let _ = write!(out, "<{tag}{attrs}{tip_attr}/>");
        }
        (body, title) => {
            let _ = write!(
                out,
                "<{tag}{attrs}{tip_attr}>{}{}</{tag}>",
                title.unwrap_or_default(),
                body.unwrap_or_default(),
            );
        }
    }
}

/// Tag name and attribute string for a primitive.
fn shape(primitive: &Primitive, palette: &Palette) -> (&'static str, String) {
    match primitive {
        Primitive::Rect { x, y, width, height, fill } => (
            "rect",
            format!(
                r#" x="{}" y="{}" width="{}" height="{}" fill="{}""#,
                num(*x),
                num(*y),
                num(*width),
                num(*height),
                palette.resolve(*fill),
            ),
        ),
        Primitive::Sector { cx, cy, radius, start, end, fill } => (
            "path",
            format!(
                r#" d="{}" fill="{}""#,
                sector_path(*cx, *cy, *radius, *start, *end),
                palette.resolve(*fill),
            ),
        ),
        Primitive::Line { x1, y1, x2, y2, stroke, width, dashed } => (
            "line",
            format!(
                r#" x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="{}"{}"#,
                num(*x1),
                num(*y1),
                num(*x2),
                num(*y2),
                palette.resolve(*stroke),
                num(*width),
                if *dashed { r#" stroke-dasharray="3,3""# } else { "" },
            ),
        ),
        Primitive::Path { commands, stroke, fill, fill_opacity } => {
            let mut attrs = format!(r#" d="{}""#, path_data(commands));
            match fill {
                Some(paint) => {
                    let _ = write!(
                        attrs,
                        r#" fill="{}" fill-opacity="{}""#,
                        palette.resolve(*paint),
                        num(*fill_opacity),
                    );
                }
                None => attrs.push_str(r#" fill="none""#),
            }
            if let Some(paint) = stroke {
                let _ = write!(attrs, r#" stroke="{}" stroke-width="2""#, palette.resolve(*paint));
            }
            ("path", attrs)
        }
        Primitive::Circle { cx, cy, r, fill } => (
            "circle",
            format!(
                r#" cx="{}" cy="{}" r="{}" fill="{}""#,
                num(*cx),
                num(*cy),
                num(*r),
                palette.resolve(*fill),
            ),
        ),
        Primitive::Text { x, y, paint, font_size, anchor, rotate, bold, .. } => {
            let anchor = match anchor {
                Anchor::Start => "start",
                Anchor::Middle => "middle",
                Anchor::End => "end",
            };
            let mut attrs = format!(
                r#" x="{}" y="{}" fill="{}" font-size="{}px" text-anchor="{anchor}""#,
                num(*x),
                num(*y),
                palette.resolve(*paint),
                num(*font_size),
            );
            if *bold {
                attrs.push_str(r#" font-weight="bold""#);
            }
            if let Some(deg) = rotate {
                let _ = write!(attrs, r#" transform="rotate({} {} {})""#, num(*deg), num(*x), num(*y));
            }
            ("text", attrs)
        }
    }
}

fn path_data(commands: &[PathCmd]) -> String {
    commands
        .iter()
        .map(|cmd| match cmd {
            PathCmd::MoveTo(x, y) => format!("M {} {}", num(*x), num(*y)),
            PathCmd::LineTo(x, y) => format!("L {} {}", num(*x), num(*y)),
            PathCmd::Close => "Z".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Path for a filled sector. A full turn is drawn as two half arcs since a
/// single arc with identical endpoints renders nothing.
pub(crate) fn sector_path(cx: f64, cy: f64, r: f64, start: f64, end: f64) -> String {
    let sweep = end - start;
    if sweep >= TAU - 1e-9 {
        return format!(
            "M {x0} {cy} A {r} {r} 0 1 1 {x1} {cy} A {r} {r} 0 1 1 {x0} {cy} Z",
            x0 = num(cx + r),
            x1 = num(cx - r),
            cy = num(cy),
            r = num(r),
        );
    }

    let large_arc = if sweep > PI { 1 } else { 0 };
    format!(
        "M {} {} L {} {} A {r} {r} 0 {large_arc} 1 {} {} Z",
        num(cx),
        num(cy),
        num(cx + r * start.cos()),
        num(cy + r * start.sin()),
        num(cx + r * end.cos()),
        num(cy + r * end.sin()),
        r = num(r),
    )
}

/// Compact decimal: at most two places, no trailing zeros.
fn num(value: f64) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let s = format!("{value:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

/// Escape text for XML content and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '\n' => out.push_str("&#10;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::{Paint, Scene, Size, Tooltip};

    #[test]
    fn numbers_are_compact() {
        assert_eq!(num(10.0), "10");
        assert_eq!(num(10.5), "10.5");
        assert_eq!(num(1.0 / 3.0), "0.33");
        assert_eq!(num(-0.001), "0");
        assert_eq!(num(f64::NAN), "0");
    }

    #[test]
    fn full_circle_uses_two_arcs() {
        let d = sector_path(100.0, 100.0, 50.0, 0.0, TAU);
        assert_eq!(d.matches(" A ").count(), 2);
        let half = sector_path(100.0, 100.0, 50.0, 0.0, PI);
        assert_eq!(half.matches(" A ").count(), 1);
        assert!(half.contains(" 0 0 1 "));
    }

    #[test]
    fn palette_applies_at_paint_time() {
        let mut scene = Scene::new(Size::new(100.0, 100.0));
        scene.push_with_tooltip(
            Primitive::Circle { cx: 1.0, cy: 2.0, r: 3.0, fill: Paint::Primary },
            Tooltip::new("A & B", vec!["<1>".to_string()]),
        );
        let chart = Chart::Drawn(scene);
        let dark = render(&chart, &Palette::DARK);
        let light = render(&chart, &Palette::LIGHT);
        assert!(dark.contains(Palette::DARK.primary));
        assert!(light.contains(Palette::LIGHT.primary));
        assert!(dark.contains(r#"data-tooltip="A &amp; B&#10;&lt;1&gt;""#));
        assert!(dark.contains("<title>A &amp; B&#10;&lt;1&gt;</title>"));
    }

    #[test]
    fn placeholder_renders_message() {
        let chart = Chart::no_data(Size::new(200.0, 100.0), "No audit data available");
        let svg = render(&chart, &Palette::LIGHT);
        assert!(svg.contains(">No audit data available</text>"));
        assert!(svg.starts_with("<svg"));
    }
}
