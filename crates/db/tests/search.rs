//! Search and discovery queries against a migrated database.

use chrono::{TimeZone, Utc};
use collabbridge_core::search::{
    rank_suggestions, ProfessionalSort, SuggestionCandidate, SuggestionKind,
};
use collabbridge_core::types::{DbId, Timestamp};
use collabbridge_db::models::search::{EventFilters, FacetValue, ProfessionalFilters};
use collabbridge_db::models::user::CreateUser;
use collabbridge_db::repositories::{SearchRepo, UserRepo};
use sqlx::PgPool;

async fn user(pool: &PgPool, uid: &str, role: &str) -> DbId {
    UserRepo::create(
        pool,
        &CreateUser {
            firebase_uid: uid.to_string(),
            email: format!("{uid}@example.com"),
            name: uid.to_string(),
            role: role.to_string(),
            avatar: None,
            is_verified: true,
        },
    )
    .await
    .unwrap()
    .id
}

/// A creative professional with a profile.
async fn professional(
    pool: &PgPool,
    name: &str,
    location: &str,
    categories: &[&str],
    skills: &[&str],
    available: bool,
) -> DbId {
    let id = user(pool, &name.to_lowercase().replace(' ', "-"), "CREATIVE_PROFESSIONAL").await;
    sqlx::query("UPDATE users SET name = $2, location = $3 WHERE id = $1")
        .bind(id)
        .bind(name)
        .bind(location)
        .execute(pool)
        .await
        .unwrap();
    sqlx::query(
        "INSERT INTO creative_profiles (user_id, categories, skills, hourly_rate, is_available) \
         VALUES ($1, $2, $3, 80, $4)",
    )
    .bind(id)
    .bind(categories.iter().map(|c| c.to_string()).collect::<Vec<_>>())
    .bind(skills.iter().map(|s| s.to_string()).collect::<Vec<_>>())
    .bind(available)
    .execute(pool)
    .await
    .unwrap();
    id
}

async fn review(pool: &PgPool, author_id: DbId, subject_id: DbId, rating: i32) {
    sqlx::query("INSERT INTO reviews (author_id, subject_id, rating) VALUES ($1, $2, $3)")
        .bind(author_id)
        .bind(subject_id)
        .bind(rating)
        .execute(pool)
        .await
        .unwrap();
}

async fn event(
    pool: &PgPool,
    creator_id: DbId,
    title: &str,
    event_type: &str,
    start: Timestamp,
    status: &str,
) -> DbId {
    sqlx::query_scalar(
        "INSERT INTO events (creator_id, title, event_type, start_date, end_date, status) \
         VALUES ($1, $2, $3, $4, $4 + INTERVAL '4 hours', $5) RETURNING id",
    )
    .bind(creator_id)
    .bind(title)
    .bind(event_type)
    .bind(start)
    .bind(status)
    .fetch_one(pool)
    .await
    .unwrap()
}

fn day(month: u32, day: u32) -> Timestamp {
    Utc.with_ymd_and_hms(2030, month, day, 18, 0, 0).unwrap()
}

fn facet(value: &str, count: i64) -> (String, i64) {
    (value.to_string(), count)
}

fn pairs(values: &[FacetValue]) -> Vec<(String, i64)> {
    values.iter().map(|f| (f.value.clone(), f.count)).collect()
}

// ---------------------------------------------------------------------------
// Test: category and minimum rating narrow professional search
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_professionals_filtered_by_category_and_rating(pool: PgPool) {
    let p1 = user(&pool, "uid-p1", "EVENT_PLANNER").await;
    let p2 = user(&pool, "uid-p2", "EVENT_PLANNER").await;

    let ana = professional(&pool, "Ana Lens", "Lisbon", &["PHOTOGRAPHY"], &[], true).await;
    let ben = professional(&pool, "Ben Shutter", "Porto", &["PHOTOGRAPHY"], &[], true).await;
    professional(&pool, "Cy Fresh", "Lisbon", &["PHOTOGRAPHY"], &[], true).await;
    let dee = professional(&pool, "Dee Keys", "Lisbon", &["MUSIC"], &[], true).await;

    review(&pool, p1, ana, 5).await;
    review(&pool, p2, ana, 4).await;
    review(&pool, p1, ben, 3).await;
    review(&pool, p1, dee, 5).await;

    let filters = ProfessionalFilters {
        categories: vec!["photography".into()],
        min_rating: Some(4.0),
        ..Default::default()
    };
    let results = SearchRepo::search_professionals(&pool, &filters, 20, 0)
        .await
        .unwrap();
    assert_eq!(results.iter().map(|r| r.id).collect::<Vec<_>>(), vec![ana]);
    assert_eq!(results[0].average_rating, 4.5);
    assert_eq!(results[0].review_count, 2);
    assert_eq!(SearchRepo::count_professionals(&pool, &filters).await.unwrap(), 1);
}

// ---------------------------------------------------------------------------
// Test: rating sort puts unreviewed professionals last, even when newest
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_rating_sort_ranks_unreviewed_last(pool: PgPool) {
    let planner = user(&pool, "uid-rs", "EVENT_PLANNER").await;
    let ana = professional(&pool, "Ana Lens", "Lisbon", &["PHOTOGRAPHY"], &[], true).await;
    let ben = professional(&pool, "Ben Shutter", "Porto", &["PHOTOGRAPHY"], &[], true).await;
    let newest = professional(&pool, "Cy Fresh", "Lisbon", &["PHOTOGRAPHY"], &[], true).await;
    review(&pool, planner, ana, 5).await;
    review(&pool, planner, ben, 2).await;

    let filters = ProfessionalFilters {
        sort_by: ProfessionalSort::Rating,
        ..Default::default()
    };
    let results = SearchRepo::search_professionals(&pool, &filters, 20, 0)
        .await
        .unwrap();

    assert_eq!(
        results.iter().map(|r| r.id).collect::<Vec<_>>(),
        vec![ana, ben, newest]
    );
    assert_eq!(results[2].average_rating, 0.0);
    assert_eq!(results[2].review_count, 0);
}

// ---------------------------------------------------------------------------
// Test: event search by type and date window
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_events_filtered_by_type_and_dates(pool: PgPool) {
    let planner = user(&pool, "uid-ev", "EVENT_PLANNER").await;
    let concert =
        event(&pool, planner, "Harbour Concert", "CONCERT", day(6, 10), "PUBLISHED").await;
    event(&pool, planner, "Garden Wedding", "WEDDING", day(6, 12), "PUBLISHED").await;
    event(&pool, planner, "Autumn Concert", "CONCERT", day(9, 1), "PUBLISHED").await;
    event(&pool, planner, "Draft Concert", "CONCERT", day(6, 15), "DRAFT").await;

    let filters = EventFilters {
        event_type: Some("CONCERT".into()),
        date_from: Some(Utc.with_ymd_and_hms(2030, 6, 1, 0, 0, 0).unwrap()),
        date_to: Some(Utc.with_ymd_and_hms(2030, 6, 30, 23, 59, 59).unwrap()),
        ..Default::default()
    };
    let results = SearchRepo::search_events(&pool, &filters, 20, 0).await.unwrap();

    assert_eq!(results.iter().map(|e| e.id).collect::<Vec<_>>(), vec![concert]);
    assert_eq!(results[0].planner_name, "uid-ev");
    assert_eq!(SearchRepo::count_events(&pool, &filters).await.unwrap(), 1);

    let window_only = EventFilters {
        event_type: None,
        ..filters
    };
    let titles: Vec<String> = SearchRepo::search_events(&pool, &window_only, 20, 0)
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.title)
        .collect();
    assert_eq!(titles, vec!["Harbour Concert", "Garden Wedding"]);
}

// ---------------------------------------------------------------------------
// Test: facets ignore their own filter but honour the others
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_facets_count_alternatives(pool: PgPool) {
    professional(&pool, "Ana Lens", "Lisbon", &["PHOTOGRAPHY"], &[], true).await;
    professional(&pool, "Ben Shutter", "Porto", &["PHOTOGRAPHY", "VIDEOGRAPHY"], &[], false).await;
    professional(&pool, "Dee Keys", "Lisbon", &["MUSIC"], &[], true).await;

    let filters = ProfessionalFilters {
        categories: vec!["PHOTOGRAPHY".into()],
        available: Some(true),
        ..Default::default()
    };
    let facets = SearchRepo::professional_facets(&pool, &filters).await.unwrap();

    assert_eq!(
        pairs(&facets.categories),
        vec![facet("MUSIC", 1), facet("PHOTOGRAPHY", 1)]
    );
    assert_eq!(pairs(&facets.locations), vec![facet("Lisbon", 1)]);
    assert_eq!(
        pairs(&facets.availability),
        vec![facet("available", 1), facet("unavailable", 1)]
    );
}

// ---------------------------------------------------------------------------
// Test: typeahead draws on people, events and skills, then ranks them
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_suggestions_rank_candidates_from_every_source(pool: PgPool) {
    let planner = user(&pool, "uid-sg", "EVENT_PLANNER").await;
    professional(&pool, "Jazz Hands Trio", "Lisbon", &["MUSIC"], &["jazz piano"], true).await;
    event(&pool, planner, "Late Jazz Night", "CONCERT", day(7, 4), "PUBLISHED").await;
    event(&pool, planner, "Jazz Rehearsal", "CONCERT", day(7, 5), "DRAFT").await;

    let rows = SearchRepo::suggestion_candidates(&pool, "jazz", 8).await.unwrap();
    let candidates = rows
        .into_iter()
        .map(|row| SuggestionCandidate {
            kind: row.kind.parse::<SuggestionKind>().unwrap(),
            text: row.text,
            entity_id: row.entity_id,
        })
        .collect();
    let ranked = rank_suggestions("jazz", candidates, 8);

    assert_eq!(
        ranked
            .iter()
            .map(|s| (s.kind, s.text.as_str()))
            .collect::<Vec<_>>(),
        vec![
            (SuggestionKind::Skill, "jazz piano"),
            (SuggestionKind::Professional, "Jazz Hands Trio"),
            (SuggestionKind::Event, "Late Jazz Night"),
        ]
    );
    assert!(ranked.iter().all(|s| s.score == 2));
}
