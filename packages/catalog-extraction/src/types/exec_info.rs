//! Execution diagnostics for a single extraction.

use std::fmt::Write as _;
use std::time::Duration;

/// Token counts reported by the model service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl std::ops::AddAssign for TokenUsage {
    fn add_assign(&mut self, other: Self) {
        self.prompt_tokens = self.prompt_tokens.saturating_add(other.prompt_tokens);
        self.completion_tokens = self.completion_tokens.saturating_add(other.completion_tokens);
        self.total_tokens = self.total_tokens.saturating_add(other.total_tokens);
    }
}

#[cfg(feature = "openai")]
impl From<openai_client::Usage> for TokenUsage {
    fn from(usage: openai_client::Usage) -> Self {
        Self {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        }
    }
}

/// One step of an extraction (content preparation, generation, parsing).
#[derive(Debug, Clone)]
pub struct NodeInfo {
    pub node_name: String,
    pub duration: Duration,
    pub usage: TokenUsage,
}

impl NodeInfo {
    pub fn new(node_name: impl Into<String>, duration: Duration) -> Self {
        Self {
            node_name: node_name.into(),
            duration,
            usage: TokenUsage::default(),
        }
    }

    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = usage;
        self
    }
}

/// Per-node execution record of one extraction.
#[derive(Debug, Clone, Default)]
pub struct ExecutionInfo {
    pub nodes: Vec<NodeInfo>,
}

impl ExecutionInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: NodeInfo) {
        self.nodes.push(node);
    }

    pub fn total_duration(&self) -> Duration {
        self.nodes.iter().map(|n| n.duration).sum()
    }

    pub fn total_usage(&self) -> TokenUsage {
        let mut total = TokenUsage::default();
        for node in &self.nodes {
            total += node.usage;
        }
        total
    }

    /// Render as a fixed-width table, one row per node plus a total row.
    pub fn prettify(&self) -> String {
        const HEADERS: [&str; 5] = [
            "node_name",
            "total_tokens",
            "prompt_tokens",
            "completion_tokens",
            "exec_time",
        ];

        let mut rows: Vec<[String; 5]> = self
            .nodes
            .iter()
            .map(|n| row(&n.node_name, n.usage, n.duration))
            .collect();
        rows.push(row("TOTAL RESULT", self.total_usage(), self.total_duration()));

        let mut widths = HEADERS.map(str::len);
        for r in &rows {
            for (w, cell) in widths.iter_mut().zip(r.iter()) {
                *w = (*w).max(cell.len());
            }
        }

        let mut out = String::new();
        let header: Vec<String> = HEADERS.iter().map(|h| h.to_string()).collect();
        for line in std::iter::once(header.as_slice()).chain(rows.iter().map(|r| r.as_slice())) {
            let cells: Vec<String> = line
                .iter()
                .zip(widths.iter())
                .map(|(cell, w)| format!("{cell:<w$}"))
                .collect();
            let _ = writeln!(out, "{}", cells.join("  ").trim_end());
        }
        out
    }
}

fn row(name: &str, usage: TokenUsage, duration: Duration) -> [String; 5] {
    [
        name.to_string(),
        usage.total_tokens.to_string(),
        usage.prompt_tokens.to_string(),
        usage.completion_tokens.to_string(),
        format!("{:.3}s", duration.as_secs_f64()),
    ]
}
