//! Serializable chart descriptions handed to whatever draws them

use hd_core::{Dimension, RowKey, Service, ViewId};
use serde::Serialize;

/// Interaction the drawing surface should offer on drag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DragMode {
    Select,
    Zoom,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceMode {
    Lines,
    Markers,
    LinesMarkers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Symbol {
    Circle,
    Diamond,
}

/// What a series stands for when a selection is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesRole {
    Base,
    Selected,
    Context,
}

/// One plotted mark. `values` is used by multi-dimensional charts and is
/// aligned with the chart's dimension list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mark {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<RowKey>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<Option<f64>>,
    pub size: f64,
    pub symbol: Symbol,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hover: Option<String>,
}

impl Mark {
    pub fn at(key: RowKey, x: f64, y: f64, color: &str) -> Self {
        Self {
            key: Some(key),
            x: Some(x),
            y: Some(y),
            values: Vec::new(),
            size: 5.0,
            symbol: Symbol::Circle,
            color: color.to_string(),
            hover: None,
        }
    }

    pub fn multi(key: RowKey, values: Vec<Option<f64>>, color: &str) -> Self {
        Self {
            key: Some(key),
            x: None,
            y: None,
            values,
            size: 5.0,
            symbol: Symbol::Circle,
            color: color.to_string(),
            hover: None,
        }
    }

    pub fn sized(mut self, size: f64) -> Self {
        self.size = size;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<Service>,
    pub mode: TraceMode,
    pub role: SeriesRole,
    pub color: String,
    pub opacity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_width: Option<f64>,
    pub show_legend: bool,
    pub marks: Vec<Mark>,
}

impl Series {
    pub fn new(name: impl Into<String>, mode: TraceMode, color: &str) -> Self {
        Self {
            name: name.into(),
            service: None,
            mode,
            role: SeriesRole::Base,
            color: color.to_string(),
            opacity: 1.0,
            line_width: None,
            show_legend: true,
            marks: Vec::new(),
        }
    }

    pub fn for_service(service: Service, mode: TraceMode) -> Self {
        Self {
            service: Some(service),
            ..Self::new(service.label(), mode, service.color())
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = RowKey> + '_ {
        self.marks.iter().filter_map(|m| m.key)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tick_step: Option<f64>,
}

impl Axis {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            range: None,
            tick_step: None,
        }
    }

    pub fn with_range(mut self, range: [f64; 2]) -> Self {
        self.range = Some(range);
        self
    }

    pub fn with_ticks(mut self, step: f64) -> Self {
        self.tick_step = Some(step);
        self
    }
}

/// Reference line drawn across a panel
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Guide {
    Horizontal {
        y: f64,
        color: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
    Vertical {
        x: f64,
        color: String,
    },
    /// Shaded x interval spanning the panel
    Band {
        x0: f64,
        x1: f64,
        color: String,
    },
}

impl Guide {
    pub fn horizontal(y: f64, color: &str) -> Self {
        Guide::Horizontal {
            y,
            color: color.to_string(),
            label: None,
        }
    }

    pub fn labelled(y: f64, color: &str, label: impl Into<String>) -> Self {
        Guide::Horizontal {
            y,
            color: color.to_string(),
            label: Some(label.into()),
        }
    }

    pub fn vertical(x: f64, color: &str) -> Self {
        Guide::Vertical {
            x,
            color: color.to_string(),
        }
    }

    /// One week wide, centred on `week`
    pub fn week_band(week: u32, color: &str) -> Self {
        Guide::Band {
            x0: week as f64 - 0.5,
            x1: week as f64 + 0.5,
            color: color.to_string(),
        }
    }
}

/// One stacked panel of a cartesian chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    pub y_axis: Axis,
    pub series: Vec<Series>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub guides: Vec<Guide>,
}

/// An axis of a multi-dimensional chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionAxis {
    pub dimension: Dimension,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraint: Option<[f64; 2]>,
}

impl DimensionAxis {
    pub fn new(dimension: Dimension, label: &str) -> Self {
        Self {
            dimension,
            label: label.to_string(),
            range: dimension.fixed_range(),
            constraint: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub label: String,
    pub service: Service,
    pub value: f64,
    pub color: String,
    /// Values shown on hover, in display order
    pub details: Vec<(String, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkNode {
    pub id: String,
    pub label: String,
    pub kind: NodeKind,
    pub color: String,
    pub size: f64,
    /// Staff nodes only: part of the team shown
    pub working: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Department,
    Role,
    Staff,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkEdge {
    pub source: String,
    pub target: String,
}

/// A metric for the shown team next to the department average
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricComparison {
    pub metric: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    pub average: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartBody {
    Cartesian {
        x_axis: Axis,
        panels: Vec<Panel>,
    },
    Matrix {
        dimensions: Vec<DimensionAxis>,
        series: Vec<Series>,
    },
    Bars {
        x_axis: Axis,
        y_axis: Axis,
        bars: Vec<Bar>,
        guides: Vec<Guide>,
    },
    Parallel {
        dimensions: Vec<DimensionAxis>,
        series: Vec<Series>,
    },
    Network {
        department: Service,
        week: u32,
        nodes: Vec<NetworkNode>,
        edges: Vec<NetworkEdge>,
        metrics: Vec<MetricComparison>,
        status: String,
        team_size: usize,
        custom_team: bool,
    },
    Empty {
        message: String,
    },
}

/// Complete description of one view's figure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub view: ViewId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    pub drag_mode: DragMode,
    /// Selection epoch the figure was drawn against; echoed back with box moves
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection_epoch: Option<u64>,
    pub body: ChartBody,
}

impl ChartSpec {
    pub fn new(view: ViewId, title: impl Into<String>, body: ChartBody) -> Self {
        Self {
            view,
            title: title.into(),
            subtitle: None,
            drag_mode: DragMode::None,
            selection_epoch: None,
            body,
        }
    }

    pub fn empty(view: ViewId, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            view,
            title,
            ChartBody::Empty {
                message: message.into(),
            },
        )
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn with_drag_mode(mut self, drag_mode: DragMode) -> Self {
        self.drag_mode = drag_mode;
        self
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.body, ChartBody::Empty { .. })
    }

    /// Every series of the chart regardless of body kind
    pub fn series(&self) -> Vec<&Series> {
        match &self.body {
            ChartBody::Cartesian { panels, .. } => panels.iter().flat_map(|p| p.series.iter()).collect(),
            ChartBody::Matrix { series, .. } | ChartBody::Parallel { series, .. } => series.iter().collect(),
            _ => Vec::new(),
        }
    }
}
