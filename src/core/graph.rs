use crate::core::geo::to_view_box_position;
use crate::core::ranking::color_for_score;
use crate::domain::indicators::IndicatorCode;
use crate::domain::model::{CountryRecord, EdgeKind, GraphEdge, GraphNode, RankingEntry};
use std::collections::HashMap;

pub const DEFAULT_NODE_LIMIT: usize = 18;
pub const TRADE_CHAIN_LENGTH: usize = 6;
pub const PROXIMITY_FLOOR: f64 = 0.35;
pub const TRADE_FLOOR: f64 = 0.45;
/// Smallest weight a plotted node may get, so every node stays visible.
pub const MIN_NODE_WEIGHT: f64 = 0.05;

#[derive(Debug, Clone)]
pub struct NodeOptions {
    pub limit: usize,
}

impl Default for NodeOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_NODE_LIMIT,
        }
    }
}

/// Turns an already-ranked list into plotted nodes.
///
/// Unplottable countries are skipped before the limit applies, and so are
/// zero or negative values (deflation, for one), which have no meaningful
/// ratio to the anchor. Weights are relative to the first (top-ranked) node,
/// which always gets 1.0; for lower-is-better indicators the ratio is
/// inverted so weaker performers still shrink. Weights never drop below
/// `MIN_NODE_WEIGHT`.
pub fn build_nodes(
    entries: &[RankingEntry],
    indicator: IndicatorCode,
    options: &NodeOptions,
) -> Vec<GraphNode> {
    let plottable: Vec<_> = entries
        .iter()
        .filter(|e| e.value.is_finite() && e.value > 0.0)
        .filter_map(|e| to_view_box_position(&e.code).map(|p| (e, p)))
        .take(options.limit)
        .collect();

    let Some(top_value) = plottable.first().map(|(e, _)| e.value) else {
        return Vec::new();
    };

    plottable
        .into_iter()
        .map(|(entry, point)| {
            let weight = relative_weight(entry.value, top_value, indicator.is_lower_better());
            GraphNode {
                id: entry.code.clone(),
                label: entry.name.clone(),
                metric_label: format!("{} {}", indicator.label(), indicator.format_value(entry.value)),
                value: entry.value,
                x: point.x,
                y: point.y,
                weight,
                color: color_for_score(Some(weight * 100.0)),
            }
        })
        .collect()
}

fn relative_weight(value: f64, top_value: f64, lower_is_better: bool) -> f64 {
    // both sides are positive once build_nodes has filtered its entries
    let ratio = if lower_is_better {
        top_value / value
    } else {
        value / top_value
    };
    ratio.clamp(MIN_NODE_WEIGHT, 1.0)
}

/// Proximity edges plus the trade-intensity chain, merged per unordered pair.
///
/// When both classes connect the same pair, the stronger edge is kept.
pub fn build_network_links(countries: &[CountryRecord], nodes: &[GraphNode]) -> Vec<GraphEdge> {
    if nodes.len() < 2 {
        return Vec::new();
    }

    let mut edges = EdgeSet::default();

    for edge in proximity_edges(nodes) {
        edges.insert(edge);
    }
    for edge in trade_chain_edges(countries, nodes) {
        edges.insert(edge);
    }

    edges.into_vec()
}

/// Each node linked to its closest neighbour in viewport space.
pub fn proximity_edges(nodes: &[GraphNode]) -> Vec<GraphEdge> {
    let Some((min, max)) = value_range(nodes.iter().map(|n| n.value)) else {
        return Vec::new();
    };

    let mut edges = EdgeSet::default();
    for node in nodes {
        let nearest = nodes
            .iter()
            .filter(|other| other.id != node.id)
            .min_by(|a, b| distance(node, a).total_cmp(&distance(node, b)));

        if let Some(nearest) = nearest {
            let strength = normalize((node.value + nearest.value) / 2.0, min, max, PROXIMITY_FLOOR);
            edges.insert(edge(node, nearest, strength, EdgeKind::Proximity));
        }
    }
    edges.into_vec()
}

/// Path through the leading exporters among `nodes`, in descending export order.
pub fn trade_chain_edges(countries: &[CountryRecord], nodes: &[GraphNode]) -> Vec<GraphEdge> {
    let by_code: HashMap<&str, &CountryRecord> =
        countries.iter().map(|c| (c.code.as_str(), c)).collect();

    let mut exporters: Vec<(&GraphNode, f64)> = nodes
        .iter()
        .filter_map(|n| {
            by_code
                .get(n.id.as_str())
                .and_then(|c| c.value(IndicatorCode::Exports))
                .map(|v| (n, v))
        })
        .collect();
    exporters.sort_by(|a, b| b.1.total_cmp(&a.1));
    exporters.truncate(TRADE_CHAIN_LENGTH);

    let Some((min, max)) = value_range(exporters.iter().map(|(_, v)| *v)) else {
        return Vec::new();
    };

    exporters
        .windows(2)
        .filter(|pair| pair[0].0.id != pair[1].0.id)
        .map(|pair| {
            let (from, from_value) = pair[0];
            let (to, to_value) = pair[1];
            let strength = normalize((from_value + to_value) / 2.0, min, max, TRADE_FLOOR);
            edge(from, to, strength, EdgeKind::Trade)
        })
        .collect()
}

/// Edges keyed by unordered pair, in first-insertion order.
#[derive(Default)]
struct EdgeSet {
    edges: Vec<GraphEdge>,
    index: HashMap<String, usize>,
}

impl EdgeSet {
    fn insert(&mut self, edge: GraphEdge) {
        if edge.from == edge.to {
            return;
        }
        match self.index.get(&edge.id) {
            Some(&i) => {
                if edge.strength > self.edges[i].strength {
                    self.edges[i] = edge;
                }
            }
            None => {
                self.index.insert(edge.id.clone(), self.edges.len());
                self.edges.push(edge);
            }
        }
    }

    fn into_vec(self) -> Vec<GraphEdge> {
        self.edges
    }
}

fn edge(from: &GraphNode, to: &GraphNode, strength: f64, kind: EdgeKind) -> GraphEdge {
    GraphEdge {
        id: pair_key(&from.id, &to.id),
        from: from.id.clone(),
        to: to.id.clone(),
        strength,
        kind,
    }
}

pub fn pair_key(a: &str, b: &str) -> String {
    if a <= b {
        format!("{}-{}", a, b)
    } else {
        format!("{}-{}", b, a)
    }
}

fn distance(a: &GraphNode, b: &GraphNode) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

fn value_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.filter(|v| v.is_finite()).fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((min, max)) => Some((min.min(v), max.max(v))),
    })
}

/// Min–max normalization into `[floor, 1.0]`. A flat range maps to 1.0.
fn normalize(value: f64, min: f64, max: f64, floor: f64) -> f64 {
    let span = max - min;
    if span <= f64::EPSILON {
        return 1.0;
    }
    let t = ((value - min) / span).clamp(0.0, 1.0);
    (floor + (1.0 - floor) * t).min(1.0)
}
