use std::collections::HashMap;

use serde_json::Value;

use crate::types::ContentRow;

/// Post-processing applied once to the assembled result.
pub trait RowEnricher: Send + Sync {
    fn enrich(&self, rows: Vec<ContentRow>) -> Vec<ContentRow>;
}

/// Copies a series' titles onto the season rows that belong to it.
///
/// Only series present in the same result are considered; the first row
/// seen for a series id wins. Order and length are preserved.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeriesTitleEnricher;

impl RowEnricher for SeriesTitleEnricher {
    fn enrich(&self, rows: Vec<ContentRow>) -> Vec<ContentRow> {
        let mut series: HashMap<String, Value> = HashMap::new();
        for row in rows.iter().filter(|row| row.is_kind("series")) {
            series
                .entry(row.id.clone())
                .or_insert_with(|| row.titles.0.clone());
        }

        rows.into_iter()
            .map(|row| {
                let titles = row
                    .parent()
                    .filter(|_| row.is_kind("season"))
                    .and_then(|parent| series.get(parent))
                    .cloned();
                match titles {
                    Some(titles) => ContentRow {
                        series_titles: Some(titles),
                        ..row
                    },
                    None => row,
                }
            })
            .collect()
    }
}
