//! Monitored tickers: the configured table plus symbols added at runtime.

use crate::models::strategy::{LongCriteria, ShortCriteria, TickerCriteria};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickerChanges {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TickerRegistry {
    configured: Vec<TickerCriteria>,
    /// Display order of every monitored symbol.
    order: Vec<String>,
    dynamic: BTreeSet<String>,
}

impl TickerRegistry {
    pub fn new(configured: Vec<TickerCriteria>) -> Self {
        let mut order = Vec::with_capacity(configured.len());
        for ticker in &configured {
            if !order.contains(&ticker.symbol) {
                order.push(ticker.symbol.clone());
            }
        }
        Self {
            configured,
            order,
            dynamic: BTreeSet::new(),
        }
    }

    pub fn symbols(&self) -> &[String] {
        &self.order
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.order.iter().any(|s| s == symbol)
    }

    pub fn is_configured(&self, symbol: &str) -> bool {
        self.configured.iter().any(|t| t.symbol == symbol)
    }

    /// Criteria for `symbol`. Runtime-added symbols have none, so they are
    /// tracked but never signal.
    pub fn criteria(&self, symbol: &str) -> (Option<ShortCriteria>, Option<LongCriteria>) {
        self.configured
            .iter()
            .find(|t| t.symbol == symbol)
            .map(|t| (t.short.clone(), t.long.clone()))
            .unwrap_or((None, None))
    }

    /// Replace the runtime-added set with `symbols`. Configured tickers are
    /// never removed.
    pub fn set_dynamic(&mut self, symbols: &[String]) -> TickerChanges {
        let next: BTreeSet<String> = symbols.iter().cloned().collect();

        let removed: Vec<String> = self
            .dynamic
            .difference(&next)
            .filter(|s| !self.is_configured(s))
            .cloned()
            .collect();
        self.order.retain(|s| !removed.contains(s));

        let mut added = Vec::new();
        for symbol in symbols {
            if !self.contains(symbol) {
                self.order.push(symbol.clone());
                added.push(symbol.clone());
            }
        }

        self.dynamic = next;
        TickerChanges { added, removed }
    }
}
