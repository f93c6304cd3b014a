//! End-to-end search against PostgreSQL.
//!
//! Run with `DATABASE_URL` pointing at a server the test may create
//! databases on: `cargo test -p catalog-core -- --ignored`.

use std::sync::Arc;

use anyhow::Result;
use catalog_core::{
    CatalogSearch, ContentRow, SearchCriteria, database::PostgresCatalogStore,
    query::TableNames,
};
use serde_json::json;
use sqlx::PgPool;

const SCHEMA: &str = r#"
CREATE TABLE media_content (
    id text PRIMARY KEY,
    parent_id text REFERENCES media_content (id),
    data jsonb NOT NULL
);

CREATE TABLE asset (
    id text PRIMARY KEY,
    content_id text NOT NULL REFERENCES media_content (id),
    channel_id text,
    data jsonb NOT NULL DEFAULT '{}'::jsonb,
    linear_start timestamp,
    linear_end timestamp,
    buy_start timestamp,
    buy_end timestamp,
    catchup_start timestamp,
    catchup_end timestamp,
    rent_start timestamp,
    rent_end timestamp,
    subscription_start timestamp,
    subscription_end timestamp
);

INSERT INTO media_content (id, parent_id, data) VALUES
    ('show', NULL, '{"kind": "series", "adultContent": false, "titles": {"en": "Night Shift"}, "genres": [{"value": "drama"}], "productionDate": null}'),
    ('s1', 'show', '{"kind": "season", "adultContent": false, "titles": {"en": "Season 1"}, "genres": [], "productionDate": null}'),
    ('e1', 's1', '{"kind": "episode", "adultContent": false, "titles": {"en": "Night Shift: Pilot"}, "genres": [{"value": "drama"}], "productionDate": {"year": 2019, "month": 5, "day": 2}}'),
    ('m1', NULL, '{"kind": "movie", "adultContent": false, "titles": {"en": "Harbour Lights"}, "genres": [{"value": "comedy"}], "productionDate": {"year": 1998, "month": 1, "day": 20}}'),
    ('m2', NULL, '{"kind": "movie", "adultContent": true, "titles": {"en": "Late Pilot"}, "genres": [], "productionDate": null}');

INSERT INTO asset (id, content_id, channel_id, data, linear_start, linear_end, catchup_end) VALUES
    ('a-e1', 'e1', 'ch-1', '{"kind": "episode"}', '2024-01-01 00:00:00', '2024-12-31 23:59:59', NULL),
    ('a-m1', 'm1', 'ch-2', '{"kind": "movie", "restrictions": {"allowCatchup": true}}', '2023-01-01 00:00:00', '2023-02-01 00:00:00', NULL),
    ('a-m2', 'm2', 'ch-1', '{"kind": "movie"}', '2024-01-01 00:00:00', '2024-12-31 23:59:59', NULL);
"#;

const WINDOWS: &str = r#"
INSERT INTO media_content (id, parent_id, data) VALUES
    ('early', NULL, '{"kind": "clip", "adultContent": false, "titles": {"en": "Early"}, "genres": []}'),
    ('short', NULL, '{"kind": "clip", "adultContent": false, "titles": {"en": "Short"}, "genres": []}'),
    ('late', NULL, '{"kind": "clip", "adultContent": false, "titles": {"en": "Late"}, "genres": []}'),
    ('expired', NULL, '{"kind": "clip", "adultContent": false, "titles": {"en": "Expired"}, "genres": []}');

INSERT INTO asset (id, content_id, channel_id, linear_start, linear_end) VALUES
    ('a-early', 'early', 'ch-3', '2024-01-01 00:00:00', '2024-12-31 00:00:00'),
    ('a-short', 'short', 'ch-3', '2024-01-01 00:00:00', '2024-07-01 00:00:00'),
    ('a-late', 'late', 'ch-3', '2024-09-01 00:00:00', '2024-12-31 00:00:00'),
    ('a-expired', 'expired', 'ch-3', '2023-01-01 00:00:00', '2023-06-01 00:00:00');
"#;

async fn search_over(pool: PgPool) -> Result<CatalogSearch> {
    sqlx::raw_sql(SCHEMA).execute(&pool).await?;
    let store = PostgresCatalogStore::new(pool);
    Ok(CatalogSearch::new(Arc::new(store), TableNames::default()))
}

fn criteria(value: serde_json::Value) -> SearchCriteria {
    serde_json::from_value(value).expect("criteria json")
}

fn ids(rows: &[ContentRow]) -> Vec<&str> {
    rows.iter().map(|r| r.id.as_str()).collect()
}

#[sqlx::test(migrations = false)]
#[ignore = "requires DATABASE_URL"]
async fn title_search_returns_episode_with_ancestors(pool: PgPool) -> Result<()> {
    let search = search_over(pool).await?;

    let rows = search
        .search(&criteria(json!({ "title": "pilot", "kinds": ["episode"] })))
        .await?;

    assert_eq!(ids(&rows), vec!["show", "s1", "e1"]);
    let season = &rows[1];
    assert_eq!(
        season.series_titles.as_ref().and_then(|t| t.get("en")),
        Some(&serde_json::Value::from("Night Shift"))
    );
    let episode = &rows[2];
    assert_eq!(episode.channel_id.as_deref(), Some("ch-1"));
    assert_eq!(
        episode.production_date,
        chrono::NaiveDate::from_ymd_opt(2019, 5, 2)
    );
    Ok(())
}

#[sqlx::test(migrations = false)]
#[ignore = "requires DATABASE_URL"]
async fn adult_content_is_never_returned(pool: PgPool) -> Result<()> {
    let search = search_over(pool).await?;

    let rows = search.search(&criteria(json!({ "kinds": ["movie"] }))).await?;

    assert_eq!(ids(&rows), vec!["m1"]);
    Ok(())
}

#[sqlx::test(migrations = false)]
#[ignore = "requires DATABASE_URL"]
async fn availability_honours_open_catchup(pool: PgPool) -> Result<()> {
    let search = search_over(pool).await?;

    let rows = search
        .search(&criteria(json!({
            "kinds": ["movie", "episode"],
            "availableDates": { "from": "2024-06-01 00:00:00" },
        })))
        .await?;

    let mut matched = ids(&rows);
    matched.sort_unstable();
    assert_eq!(matched, vec!["e1", "m1", "s1", "show"]);
    Ok(())
}

#[sqlx::test(migrations = false)]
#[ignore = "requires DATABASE_URL"]
async fn production_and_source_filters_combine(pool: PgPool) -> Result<()> {
    let search = search_over(pool).await?;

    let rows = search
        .search(&criteria(json!({
            "productionDates": { "from": "1990-01-01", "to": "2000-01-01" },
            "sources": ["ch-2"],
            "genres": ["comedy"],
        })))
        .await?;

    assert_eq!(ids(&rows), vec!["m1"]);
    Ok(())
}

async fn clips_available(
    pool: PgPool,
    available: serde_json::Value,
) -> Result<Vec<String>> {
    sqlx::raw_sql(WINDOWS).execute(&pool).await?;
    let search = search_over(pool).await?;

    let rows = search
        .search(&criteria(json!({
            "kinds": ["clip"],
            "availableDates": available,
        })))
        .await?;

    let mut matched: Vec<String> = rows.into_iter().map(|r| r.id).collect();
    matched.sort_unstable();
    Ok(matched)
}

#[sqlx::test(migrations = false)]
#[ignore = "requires DATABASE_URL"]
async fn availability_from_excludes_windows_starting_later(
    pool: PgPool,
) -> Result<()> {
    let matched =
        clips_available(pool, json!({ "from": "2024-06-01 00:00:00" })).await?;

    assert_eq!(matched, vec!["early", "short"]);
    Ok(())
}

#[sqlx::test(migrations = false)]
#[ignore = "requires DATABASE_URL"]
async fn availability_to_requires_window_open_at_bound(
    pool: PgPool,
) -> Result<()> {
    let matched =
        clips_available(pool, json!({ "to": "2024-10-01 00:00:00" })).await?;

    assert_eq!(matched, vec!["early", "late"]);
    Ok(())
}

#[sqlx::test(migrations = false)]
#[ignore = "requires DATABASE_URL"]
async fn availability_with_both_bounds_needs_whole_range(
    pool: PgPool,
) -> Result<()> {
    let matched = clips_available(
        pool,
        json!({ "from": "2024-06-01 00:00:00", "to": "2024-10-01 00:00:00" }),
    )
    .await?;

    assert_eq!(matched, vec!["early"]);
    Ok(())
}

#[sqlx::test(migrations = false)]
#[ignore = "requires DATABASE_URL"]
async fn rows_with_object_titles_and_bare_genres_decode(
    pool: PgPool,
) -> Result<()> {
    let search = search_over(pool.clone()).await?;
    sqlx::raw_sql(
        r#"INSERT INTO media_content (id, parent_id, data) VALUES
            ('m3', NULL, '{"kind": "documentary", "adultContent": false, "titles": {"en": {"title": "Harbour"}}, "genres": [{"id": 3}]}');"#,
    )
    .execute(&pool)
    .await?;

    let rows = search
        .search(&criteria(json!({ "title": "harbour", "kinds": ["documentary"] })))
        .await?;

    assert_eq!(ids(&rows), vec!["m3"]);
    assert_eq!(rows[0].titles.0["en"]["title"], "Harbour");
    assert_eq!(rows[0].genres.0[0]["id"], 3);
    Ok(())
}
