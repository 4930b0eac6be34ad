//! Chart scenes built from aggregated dashboard data.
//!
//! A renderer is a pure function from data and a canvas [`Size`] to a
//! [`Chart`]: either a drawn [`Scene`] of primitives or a no-data
//! placeholder. Primitives carry color *roles* ([`Paint`]), never concrete
//! colors; a [`Palette`] resolves roles when the scene is painted, so a
//! theme switch repaints without recomputing any geometry.
//!
//! Hover behavior is data too: an [`Element`] may carry a [`Tooltip`] that
//! an adapter shows on pointer-move and hides on pointer-exit.

pub mod audit;
pub mod bar;
pub mod pie;
pub mod scale;
pub mod svg;
pub mod theme;
pub mod timeline;

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

pub use audit::{audit_history, audit_totals};
pub use bar::xp_bar;
pub use pie::{Slice, pass_fail_pie, pie};
pub use theme::Palette;
pub use timeline::xp_timeline;

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// Canvas size in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Space reserved around the plot area for axes, labels and titles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margin {
    pub const fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self { top, right, bottom, left }
    }

    /// Plot width and height, never negative.
    pub fn inner(&self, size: Size) -> (f64, f64) {
        (
            (size.width - self.left - self.right).max(0.0),
            (size.height - self.top - self.bottom).max(0.0),
        )
    }
}

pub(crate) fn month_start(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Axis label for a month, e.g. `"Mar 24"`.
pub(crate) fn short_month(date: NaiveDate) -> String {
    date.format("%b %y").to_string()
}

// ---------------------------------------------------------------------------
// Primitives
// ---------------------------------------------------------------------------

/// Color role, resolved against a [`Palette`] at paint time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Paint {
    Text,
    Axis,
    Primary,
    Secondary,
    Success,
    Danger,
    Warning,
    Background,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Middle,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCmd {
    MoveTo(f64, f64),
    LineTo(f64, f64),
    Close,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: Paint,
    },
    /// Filled circular sector; angles in radians, clockwise from +x.
    Sector {
        cx: f64,
        cy: f64,
        radius: f64,
        start: f64,
        end: f64,
        fill: Paint,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        stroke: Paint,
        width: f64,
        dashed: bool,
    },
    Path {
        commands: Vec<PathCmd>,
        stroke: Option<Paint>,
        fill: Option<Paint>,
        fill_opacity: f64,
    },
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
        fill: Paint,
    },
    Text {
        x: f64,
        y: f64,
        content: String,
        paint: Paint,
        font_size: f64,
        anchor: Anchor,
        /// Degrees around `(x, y)`.
        rotate: Option<f64>,
        bold: bool,
    },
}

impl Primitive {
    /// Plain text with the default label styling.
    pub fn label(x: f64, y: f64, content: impl Into<String>, anchor: Anchor) -> Self {
        Self::Text {
            x,
            y,
            content: content.into(),
            paint: Paint::Text,
            font_size: 12.0,
            anchor,
            rotate: None,
            bold: false,
        }
    }

    /// Centered bold heading.
    pub fn title(x: f64, y: f64, content: impl Into<String>) -> Self {
        Self::Text {
            x,
            y,
            content: content.into(),
            paint: Paint::Text,
            font_size: 16.0,
            anchor: Anchor::Middle,
            rotate: None,
            bold: true,
        }
    }

    pub fn axis(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::Line { x1, y1, x2, y2, stroke: Paint::Axis, width: 1.0, dashed: false }
    }

    pub fn grid(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::Line { x1, y1, x2, y2, stroke: Paint::Axis, width: 0.5, dashed: true }
    }

    /// Every coordinate and size in the primitive.
    pub fn numbers(&self) -> Vec<f64> {
        match self {
            Self::Rect { x, y, width, height, .. } => vec![*x, *y, *width, *height],
            Self::Sector { cx, cy, radius, start, end, .. } => vec![*cx, *cy, *radius, *start, *end],
            Self::Line { x1, y1, x2, y2, width, .. } => vec![*x1, *y1, *x2, *y2, *width],
            Self::Path { commands, fill_opacity, .. } => {
                let mut out = vec![*fill_opacity];
                for cmd in commands {
                    if let PathCmd::MoveTo(x, y) | PathCmd::LineTo(x, y) = cmd {
                        out.extend([*x, *y]);
                    }
                }
                out
            }
            Self::Circle { cx, cy, r, .. } => vec![*cx, *cy, *r],
            Self::Text { x, y, font_size, rotate, .. } => {
                let mut out = vec![*x, *y, *font_size];
                out.extend(*rotate);
                out
            }
        }
    }
}

/// Hover payload for an element.
#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub title: String,
    pub lines: Vec<String>,
}

impl Tooltip {
    pub fn new(title: impl Into<String>, lines: Vec<String>) -> Self {
        Self { title: title.into(), lines }
    }

    /// Title and lines, one per row.
    pub fn text(&self) -> String {
        std::iter::once(self.title.as_str())
            .chain(self.lines.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub primitive: Primitive,
    pub tooltip: Option<Tooltip>,
}

// ---------------------------------------------------------------------------
// Scene / Chart
// ---------------------------------------------------------------------------

/// Ordered drawing list; later elements paint over earlier ones.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub size: Size,
    pub elements: Vec<Element>,
}

impl Scene {
    pub fn new(size: Size) -> Self {
        Self { size, elements: Vec::new() }
    }

    pub fn push(&mut self, primitive: Primitive) {
        self.elements.push(Element { primitive, tooltip: None });
    }

    pub fn push_with_tooltip(&mut self, primitive: Primitive, tooltip: Tooltip) {
        self.elements.push(Element { primitive, tooltip: Some(tooltip) });
    }

    pub fn primitives(&self) -> impl Iterator<Item = &Primitive> {
        self.elements.iter().map(|e| &e.primitive)
    }

    pub fn sectors(&self) -> impl Iterator<Item = &Primitive> {
        self.primitives().filter(|p| matches!(p, Primitive::Sector { .. }))
    }

    pub fn tooltips(&self) -> impl Iterator<Item = &Tooltip> {
        self.elements.iter().filter_map(|e| e.tooltip.as_ref())
    }

    /// Whether every number in the scene is finite.
    pub fn is_finite(&self) -> bool {
        self.primitives()
            .flat_map(Primitive::numbers)
            .all(f64::is_finite)
    }
}

/// Result of one render call.
#[derive(Debug, Clone, PartialEq)]
pub enum Chart {
    Drawn(Scene),
    NoData { size: Size, message: String },
}

impl Chart {
    pub fn no_data(size: Size, message: impl Into<String>) -> Self {
        Self::NoData { size, message: message.into() }
    }

    pub fn is_drawn(&self) -> bool {
        matches!(self, Self::Drawn(_))
    }

    pub fn scene(&self) -> Option<&Scene> {
        match self {
            Self::Drawn(scene) => Some(scene),
            Self::NoData { .. } => None,
        }
    }

    pub fn size(&self) -> Size {
        match self {
            Self::Drawn(scene) => scene.size,
            Self::NoData { size, .. } => *size,
        }
    }
}

// ---------------------------------------------------------------------------
// Kinds
// ---------------------------------------------------------------------------

/// The charts the dashboard can draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartKind {
    XpBar,
    PassFail,
    Timeline,
    AuditHistory,
    AuditTotals,
}

impl ChartKind {
    pub const ALL: [ChartKind; 5] = [
        Self::XpBar,
        Self::PassFail,
        Self::Timeline,
        Self::AuditHistory,
        Self::AuditTotals,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::XpBar => "xp-bar",
            Self::PassFail => "pass-fail",
            Self::Timeline => "timeline",
            Self::AuditHistory => "audit-history",
            Self::AuditTotals => "audit-totals",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|k| k.as_str()).collect();
                format!("unknown chart '{s}' (expected one of: {})", known.join(", "))
            })
    }
}
