use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::types::Json;

/// One search result: a content entity flattened with its optional asset.
///
/// Asset-derived columns are `None` for content without an asset.
/// `titles` (language → title) and `genres` are passed through as stored;
/// their entries may be plain strings or objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ContentRow {
    pub id: String,
    pub parent_id: Option<String>,
    pub kind: Option<String>,
    pub titles: Json<Value>,
    pub genres: Json<Value>,
    pub production_date: Option<NaiveDate>,
    pub adult_content: bool,

    pub asset_id: Option<String>,
    pub asset_kind: Option<String>,
    pub channel_id: Option<String>,
    pub linear_start: Option<NaiveDateTime>,
    pub linear_end: Option<NaiveDateTime>,
    pub buy_start: Option<NaiveDateTime>,
    pub buy_end: Option<NaiveDateTime>,
    pub catchup_start: Option<NaiveDateTime>,
    pub catchup_end: Option<NaiveDateTime>,
    pub rent_start: Option<NaiveDateTime>,
    pub rent_end: Option<NaiveDateTime>,
    pub subscription_start: Option<NaiveDateTime>,
    pub subscription_end: Option<NaiveDateTime>,
    pub allow_catchup: bool,

    /// Titles of the parent series, filled in for season rows by
    /// [`SeriesTitleEnricher`](crate::enrich::SeriesTitleEnricher).
    #[sqlx(skip)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series_titles: Option<Value>,
}

impl ContentRow {
    /// Bare content row without asset data.
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent_id: None,
            kind: Some(kind.into()),
            titles: Json(Value::Object(Map::new())),
            genres: Json(Value::Array(Vec::new())),
            production_date: None,
            adult_content: false,
            asset_id: None,
            asset_kind: None,
            channel_id: None,
            linear_start: None,
            linear_end: None,
            buy_start: None,
            buy_end: None,
            catchup_start: None,
            catchup_end: None,
            rent_start: None,
            rent_end: None,
            subscription_start: None,
            subscription_end: None,
            allow_catchup: false,
            series_titles: None,
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_title(
        mut self,
        language: impl Into<String>,
        title: impl Into<Value>,
    ) -> Self {
        if !self.titles.0.is_object() {
            self.titles.0 = Value::Object(Map::new());
        }
        if let Value::Object(titles) = &mut self.titles.0 {
            titles.insert(language.into(), title.into());
        }
        self
    }

    /// Parent id, ignoring empty strings.
    pub fn parent(&self) -> Option<&str> {
        self.parent_id.as_deref().filter(|id| !id.is_empty())
    }

    pub fn is_kind(&self, kind: &str) -> bool {
        self.kind.as_deref() == Some(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn titles_and_genres_keep_their_stored_shape() {
        let row: ContentRow = serde_json::from_value(json!({
            "id": "m1",
            "parentId": null,
            "kind": "movie",
            "titles": { "en": { "title": "Harbour", "sort": "harbour" } },
            "genres": [{ "id": 3 }, { "value": "drama" }],
            "productionDate": null,
            "adultContent": false,
            "assetId": null,
            "assetKind": null,
            "channelId": null,
            "linearStart": null,
            "linearEnd": null,
            "buyStart": null,
            "buyEnd": null,
            "catchupStart": null,
            "catchupEnd": null,
            "rentStart": null,
            "rentEnd": null,
            "subscriptionStart": null,
            "subscriptionEnd": null,
            "allowCatchup": false
        }))
        .expect("row");

        assert_eq!(row.titles.0["en"]["title"], "Harbour");
        assert_eq!(row.genres.0[0]["id"], 3);
        assert_eq!(row.genres.0[1]["value"], "drama");
    }

    #[test]
    fn with_title_accepts_object_titles() {
        let row = ContentRow::new("m1", "movie")
            .with_title("en", json!({ "title": "Harbour" }))
            .with_title("fi", "Satama");

        assert_eq!(
            row.titles.0,
            json!({ "en": { "title": "Harbour" }, "fi": "Satama" })
        );
    }

    #[test]
    fn empty_parent_id_is_no_parent() {
        let row = ContentRow::new("s1", "season").with_parent("");
        assert_eq!(row.parent(), None);
    }
}
