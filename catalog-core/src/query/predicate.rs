//! Validated filter state and its compilation into a WHERE expression.
//!
//! # Schema Reference
//!
//! Clauses are written against two tables whose names come from
//! [`TableNames`]:
//!
//! - media content (`id`, `parent_id`, `data jsonb`). `data` holds `kind`,
//!   `titles` (language → title, a string or an object whose JSON text is
//!   matched), `genres` (array of objects, matched on `value`),
//!   `productionDate` (`{ year, month, day }` or `null`) and `adultContent`.
//! - asset (`id`, `content_id`, `channel_id`, `data jsonb`, plus
//!   `{linear,buy,catchup,rent,subscription}_{start,end}` timestamps).
//!   `data->'restrictions'->'allowCatchup'` flags open-ended catchup.

use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::criteria::{DateRange, SearchCriteria};
use crate::dates::{parse_date, parse_timestamp};
use crate::query::params::{ParamValue, Params};
use crate::query::tables::TableNames;

/// One clause of the compiled WHERE expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClauseKind {
    AdultContent,
    Title,
    Kinds,
    Genres,
    ProductionDate,
    Sources,
    Availability,
}

impl ClauseKind {
    /// Order in which clauses appear in the compiled expression.
    pub const ORDER: [ClauseKind; 7] = [
        ClauseKind::AdultContent,
        ClauseKind::Title,
        ClauseKind::Kinds,
        ClauseKind::Genres,
        ClauseKind::ProductionDate,
        ClauseKind::Sources,
        ClauseKind::Availability,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClauseKind::AdultContent => "adult_content",
            ClauseKind::Title => "title",
            ClauseKind::Kinds => "kinds",
            ClauseKind::Genres => "genres",
            ClauseKind::ProductionDate => "production_date",
            ClauseKind::Sources => "sources",
            ClauseKind::Availability => "availability",
        }
    }
}

/// Filter state validated from [`SearchCriteria`].
///
/// A field is `Some` only when the matching criterion was present, of the
/// right shape, non-empty and (for dates) parseable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PredicateState {
    content_type: Option<String>,
    title: Option<String>,
    kinds: Option<Vec<String>>,
    genres: Option<Vec<String>>,
    production_from: Option<NaiveDate>,
    production_to: Option<NaiveDate>,
    sources: Option<Vec<String>>,
    available_from: Option<NaiveDateTime>,
    available_to: Option<NaiveDateTime>,
}

impl PredicateState {
    pub fn from_criteria(criteria: &SearchCriteria) -> Self {
        let (production_from, production_to) =
            bounds(criteria.production_dates.as_ref(), parse_date);
        let (available_from, available_to) =
            bounds(criteria.available_dates.as_ref(), parse_timestamp);

        Self {
            content_type: non_empty_text(criteria.content_type.as_deref()),
            title: non_empty_text(criteria.title.as_deref()),
            kinds: non_empty_list(criteria.kinds.as_deref()),
            genres: non_empty_list(criteria.genres.as_deref()),
            production_from,
            production_to,
            sources: non_empty_list(criteria.sources.as_deref()),
            available_from,
            available_to,
        }
    }

    /// Category tag from the request. Kept for callers; never filtered on.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn production_range(&self) -> (Option<NaiveDate>, Option<NaiveDate>) {
        (self.production_from, self.production_to)
    }

    /// Compile the state into an ordered clause list and the complete
    /// parameter map. Unset criteria bind `NULL`.
    pub fn compile(&self, tables: &TableNames) -> Predicate {
        let clauses: Vec<(ClauseKind, String)> = ClauseKind::ORDER
            .iter()
            .filter_map(|&kind| {
                self.render(kind, tables).map(|sql| (kind, sql))
            })
            .collect();

        let mut params = Params::new();
        params.insert("availableFrom", self.available_from.into());
        params.insert("availableTo", self.available_to.into());
        params.insert("genres", self.genres.clone().into());
        params.insert("kinds", self.kinds.clone().into());
        params.insert("productionFrom", self.production_from.into());
        params.insert("productionTo", self.production_to.into());
        params.insert("sources", self.sources.clone().into());
        params.insert(
            "title",
            self.title
                .as_ref()
                .map(|title| format!("%{title}%"))
                .into(),
        );

        debug!(
            clauses = ?clauses.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>(),
            content_type = ?self.content_type,
            "compiled search predicate"
        );

        Predicate { clauses, params }
    }

    fn render(&self, kind: ClauseKind, tables: &TableNames) -> Option<String> {
        let content = tables.media_content();
        let asset = tables.asset();

        match kind {
            ClauseKind::AdultContent => {
                Some(format!("{content}.data->>'adultContent' <> 'true'"))
            }
            ClauseKind::Title => self.title.as_ref().map(|_| {
                format!(
                    "EXISTS (SELECT 1 FROM jsonb_each_text({content}.data->'titles') \
                     AS title WHERE title.value ILIKE :title)"
                )
            }),
            ClauseKind::Kinds => self
                .kinds
                .as_ref()
                .map(|_| format!("{content}.data->>'kind' IN (:kinds)")),
            ClauseKind::Genres => self.genres.as_ref().map(|_| {
                format!(
                    "EXISTS (SELECT 1 FROM jsonb_array_elements({content}.data->'genres') \
                     AS genre WHERE genre->>'value' IN (:genres))"
                )
            }),
            ClauseKind::ProductionDate => self.render_production(content),
            ClauseKind::Sources => self
                .sources
                .as_ref()
                .map(|_| format!("{asset}.channel_id IN (:sources)")),
            ClauseKind::Availability => self.render_availability(asset),
        }
    }

    fn render_production(&self, content: &str) -> Option<String> {
        if self.production_from.is_none() && self.production_to.is_none() {
            return None;
        }

        let mut sql = vec![
            "EXISTS (SELECT 1 FROM make_date(".to_string(),
            format!("({content}.data->'productionDate'->>'year')::int,"),
            format!("({content}.data->'productionDate'->>'month')::int,"),
            format!("({content}.data->'productionDate'->>'day')::int"),
            ") AS production_date".to_string(),
            format!(
                "WHERE jsonb_typeof({content}.data->'productionDate') <> 'null'"
            ),
        ];
        if self.production_from.is_some() {
            sql.push("AND production_date >= :productionFrom::date".into());
        }
        if self.production_to.is_some() {
            sql.push("AND production_date <= :productionTo::date".into());
        }
        sql.push(")".into());

        Some(sql.join(" "))
    }

    fn render_availability(&self, asset: &str) -> Option<String> {
        if self.available_from.is_none() && self.available_to.is_none() {
            return None;
        }

        let still_available = |bound: &str| {
            format!(
                "AND (end_ >= :{bound}::timestamp OR ({asset}.catchup_end IS NULL \
                 AND {asset}.data @> '{{\"restrictions\": {{\"allowCatchup\": true}}}}'))"
            )
        };

        let mut sql = vec![
            "EXISTS (SELECT 1 FROM (SELECT".to_string(),
            format!("{asset}.linear_start AS start_,"),
            format!(
                "GREATEST({asset}.linear_end, {asset}.buy_end, {asset}.catchup_end, \
                 {asset}.rent_end, {asset}.subscription_end) AS end_"
            ),
            ") AS availability_window".to_string(),
            "WHERE start_ IS NOT NULL AND end_ IS NOT NULL".to_string(),
        ];

        if self.available_from.is_some() {
            sql.push("AND start_ <= :availableFrom::timestamp".into());
            if self.available_to.is_none() {
                sql.push(still_available("availableFrom"));
            }
        }
        if self.available_to.is_some() {
            sql.push(still_available("availableTo"));
            if self.available_from.is_none() {
                sql.push("AND start_ <= :availableTo::timestamp".into());
            }
        }
        sql.push(")".into());

        Some(sql.join(" "))
    }
}

/// Compiled WHERE expression: ordered clauses plus every named parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    clauses: Vec<(ClauseKind, String)>,
    params: Params,
}

impl Predicate {
    /// Clauses joined with `AND`.
    pub fn expression(&self) -> String {
        self.clauses
            .iter()
            .map(|(_, sql)| sql.as_str())
            .collect::<Vec<_>>()
            .join(" AND ")
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn clause_kinds(&self) -> Vec<ClauseKind> {
        self.clauses.iter().map(|(kind, _)| *kind).collect()
    }

    pub fn clause(&self, kind: ClauseKind) -> Option<&str> {
        self.clauses
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, sql)| sql.as_str())
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name)
    }

    pub fn into_params(self) -> Params {
        self.params
    }
}

fn non_empty_text(value: Option<&str>) -> Option<String> {
    value.filter(|s| !s.is_empty()).map(str::to_owned)
}

fn non_empty_list(value: Option<&[String]>) -> Option<Vec<String>> {
    value.filter(|items| !items.is_empty()).map(<[String]>::to_vec)
}

fn bounds<T>(
    range: Option<&DateRange>,
    parse: impl Fn(&str) -> Option<T>,
) -> (Option<T>, Option<T>) {
    match range.filter(|r| r.has_bound()) {
        Some(range) => (
            range.from.as_deref().and_then(&parse),
            range.to.as_deref().and_then(&parse),
        ),
        None => (None, None),
    }
}
