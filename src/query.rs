use crate::models::{NationCard, PlayerCard, TownCard};
use serde::Deserialize;

/// Query-string parameters shared by every list endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub q: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub limit: Option<usize>,
}

/// What a card exposes to search and sort. `numeric_key` returns None for
/// unknown keys, which fall back to the name sort.
pub trait CardQuery {
    fn name(&self) -> &str;
    fn haystack(&self) -> String;
    fn numeric_key(&self, key: &str) -> Option<f64>;
}

impl CardQuery for TownCard {
    fn name(&self) -> &str {
        &self.name
    }

    fn haystack(&self) -> String {
        format!("{} {} {}", self.name, self.mayor, self.nation).to_lowercase()
    }

    fn numeric_key(&self, key: &str) -> Option<f64> {
        match key {
            "residents" => Some(f64::from(self.residents)),
            "townblocks" => Some(f64::from(self.town_blocks)),
            "balance" => Some(self.balance),
            _ => None,
        }
    }
}

impl CardQuery for NationCard {
    fn name(&self) -> &str {
        &self.name
    }

    fn haystack(&self) -> String {
        format!("{} {} {}", self.name, self.king, self.capital).to_lowercase()
    }

    fn numeric_key(&self, key: &str) -> Option<f64> {
        match key {
            "towns" => Some(f64::from(self.towns)),
            "residents" => Some(f64::from(self.residents)),
            "balance" => Some(self.balance),
            _ => None,
        }
    }
}

impl CardQuery for PlayerCard {
    fn name(&self) -> &str {
        &self.name
    }

    fn haystack(&self) -> String {
        format!("{} {} {}", self.name, self.town, self.nation).to_lowercase()
    }

    fn numeric_key(&self, key: &str) -> Option<f64> {
        match key {
            "balance" => Some(self.balance),
            "lastonline" => Some(self.last_online.unwrap_or(0) as f64),
            _ => None,
        }
    }
}

/// Filter, sort, and cap a cached list. Name sorts ascend, numeric sorts
/// descend, `order=asc|desc` overrides either. Sorting is stable, so equal
/// keys keep their cached order.
pub fn apply<T: CardQuery>(mut items: Vec<T>, params: &ListParams) -> Vec<T> {
    if let Some(q) = params.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        let needle = q.to_lowercase();
        items.retain(|item| item.haystack().contains(&needle));
    }

    let sort = params
        .sort
        .as_deref()
        .map(str::to_lowercase)
        .unwrap_or_else(|| "name".to_string());
    let numeric = items
        .first()
        .is_some_and(|item| item.numeric_key(&sort).is_some());
    let descending = match params.order.as_deref() {
        Some("asc") => false,
        Some("desc") => true,
        _ => numeric,
    };

    if numeric {
        items.sort_by(|a, b| {
            let (first, second) = if descending { (b, a) } else { (a, b) };
            let first_key = first.numeric_key(&sort).unwrap_or(0.0);
            let second_key = second.numeric_key(&sort).unwrap_or(0.0);
            first_key.total_cmp(&second_key)
        });
    } else {
        items.sort_by(|a, b| {
            let (first, second) = if descending { (b, a) } else { (a, b) };
            first.name().to_lowercase().cmp(&second.name().to_lowercase())
        });
    }

    if let Some(limit) = params.limit.filter(|limit| *limit > 0) {
        items.truncate(limit);
    }
    items
}
