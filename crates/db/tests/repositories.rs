//! Repository integration tests against a real database.
//!
//! `#[sqlx::test]` creates a scratch database per test from `DATABASE_URL`.

use chrono::{Duration, Utc};
use ocwiki_db::models::admin_session::CreateAdminSession;
use ocwiki_db::models::admin_user::CreateAdminUser;
use ocwiki_db::models::oc::{CreateOc, UpdateOc};
use ocwiki_db::models::site_settings::{UpdateSiteSettings, DEFAULT_SITE_NAME};
use ocwiki_db::models::timeline::CreateTimeline;
use ocwiki_db::models::timeline_event::CreateTimelineEvent;
use ocwiki_db::models::world::CreateWorld;
use ocwiki_db::models::writing_prompt::CreateWritingPrompt;
use ocwiki_db::repositories::{
    AdminSessionRepo, AdminUserRepo, OcRepo, SiteSettingsRepo, TimelineEventRepo, TimelineRepo,
    WorldRepo, WritingPromptRepo,
};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_world(name: &str) -> CreateWorld {
    CreateWorld {
        name: name.to_string(),
        slug: None,
        summary: None,
        description_md: None,
        genre: None,
        header_image_url: None,
        is_public: None,
    }
}

fn new_oc(name: &str, world_id: Option<i64>) -> CreateOc {
    CreateOc {
        world_id,
        name: name.to_string(),
        slug: None,
        tagline: None,
        age: None,
        gender: None,
        pronouns: None,
        species: None,
        occupation: None,
        status: None,
        image_url: None,
        bio_md: None,
        tags: Vec::new(),
        is_public: None,
    }
}

fn empty_oc_update() -> UpdateOc {
    UpdateOc {
        world_id: None,
        name: None,
        slug: None,
        tagline: None,
        age: None,
        gender: None,
        pronouns: None,
        species: None,
        occupation: None,
        status: None,
        image_url: None,
        bio_md: None,
        tags: None,
        is_public: None,
    }
}

fn new_event(timeline_id: i64, title: &str, sort_key: Option<i64>, oc_ids: Vec<i64>) -> CreateTimelineEvent {
    CreateTimelineEvent {
        timeline_id: Some(timeline_id),
        title: title.to_string(),
        date_label: None,
        sort_key,
        description_md: None,
        oc_ids,
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

// ---------------------------------------------------------------------------
// Worlds and OCs
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn world_crud_roundtrip(pool: PgPool) {
    let world = WorldRepo::create(&pool, &new_world("Aetheria"), "aetheria")
        .await
        .unwrap();
    assert!(world.is_public);

    let found = WorldRepo::find_public_by_slug(&pool, "aetheria").await.unwrap();
    assert_eq!(found.map(|w| w.id), Some(world.id));

    assert!(WorldRepo::delete(&pool, world.id).await.unwrap());
    assert!(!WorldRepo::delete(&pool, world.id).await.unwrap());
    assert_eq!(WorldRepo::count(&pool).await.unwrap(), 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn duplicate_slug_is_a_unique_violation(pool: PgPool) {
    WorldRepo::create(&pool, &new_world("One"), "same").await.unwrap();
    let err = WorldRepo::create(&pool, &new_world("Two"), "same")
        .await
        .unwrap_err();
    assert!(is_unique_violation(&err), "unexpected error: {err}");
}

#[sqlx::test(migrations = "./migrations")]
async fn private_ocs_are_hidden_from_public_queries(pool: PgPool) {
    let mut hidden = new_oc("Hidden", None);
    hidden.is_public = Some(false);
    OcRepo::create(&pool, &hidden, "hidden").await.unwrap();
    OcRepo::create(&pool, &new_oc("Shown", None), "shown").await.unwrap();

    assert!(OcRepo::find_public_by_slug(&pool, "hidden").await.unwrap().is_none());
    assert_eq!(OcRepo::list_public_slugs(&pool).await.unwrap(), vec!["shown"]);
    assert_eq!(OcRepo::list(&pool).await.unwrap().len(), 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn public_list_filters_by_world_and_search(pool: PgPool) {
    let world = WorldRepo::create(&pool, &new_world("Aetheria"), "aetheria")
        .await
        .unwrap();
    let mut aria = new_oc("Aria Nightshade", Some(world.id));
    aria.tags = vec!["mage".into()];
    OcRepo::create(&pool, &aria, "aria").await.unwrap();
    OcRepo::create(&pool, &new_oc("Bram", None), "bram").await.unwrap();

    let in_world = OcRepo::list_public(&pool, Some("aetheria"), None).await.unwrap();
    assert_eq!(in_world.len(), 1);
    assert_eq!(in_world[0].world_slug.as_deref(), Some("aetheria"));

    let by_name = OcRepo::list_public(&pool, None, Some("night")).await.unwrap();
    assert_eq!(by_name.len(), 1);

    let by_tag = OcRepo::list_public(&pool, None, Some("mage")).await.unwrap();
    assert_eq!(by_tag.len(), 1);

    let wildcard = OcRepo::list_public(&pool, None, Some("%")).await.unwrap();
    assert!(wildcard.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn private_world_is_hidden_from_cards_and_summaries(pool: PgPool) {
    let mut secret = new_world("Secretland");
    secret.is_public = Some(false);
    let world = WorldRepo::create(&pool, &secret, "secretland").await.unwrap();
    OcRepo::create(&pool, &new_oc("Mira", Some(world.id)), "mira").await.unwrap();
    TimelineRepo::create(
        &pool,
        &CreateTimeline {
            world_id: Some(world.id),
            name: "Ages".into(),
            slug: None,
            description_md: None,
        },
        "ages",
    )
    .await
    .unwrap();

    let cards = OcRepo::list_public(&pool, None, None).await.unwrap();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].world_name, None);
    assert_eq!(cards[0].world_slug, None);

    let recent = OcRepo::list_recent_public(&pool, 6).await.unwrap();
    assert_eq!(recent[0].world_name, None);

    assert!(OcRepo::list_public(&pool, Some("secretland"), None)
        .await
        .unwrap()
        .is_empty());

    let summaries = TimelineRepo::list_with_world(&pool).await.unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].world_name, None);
}

#[sqlx::test(migrations = "./migrations")]
async fn partial_update_keeps_unset_fields(pool: PgPool) {
    let mut input = new_oc("Aria", None);
    input.species = Some("Elf".into());
    let oc = OcRepo::create(&pool, &input, "aria").await.unwrap();

    let mut update = empty_oc_update();
    update.tagline = Some("Wanderer".into());
    let updated = OcRepo::update(&pool, oc.id, &update).await.unwrap().unwrap();
    assert_eq!(updated.species.as_deref(), Some("Elf"));
    assert_eq!(updated.tagline.as_deref(), Some("Wanderer"));

    assert!(OcRepo::update(&pool, oc.id + 1000, &update).await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn deleting_world_detaches_ocs(pool: PgPool) {
    let world = WorldRepo::create(&pool, &new_world("Gone"), "gone").await.unwrap();
    let oc = OcRepo::create(&pool, &new_oc("Left", Some(world.id)), "left")
        .await
        .unwrap();
    WorldRepo::delete(&pool, world.id).await.unwrap();
    let oc = OcRepo::find_by_id(&pool, oc.id).await.unwrap().unwrap();
    assert_eq!(oc.world_id, None);
}

// ---------------------------------------------------------------------------
// Timelines
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn events_are_ordered_and_linked_to_ocs(pool: PgPool) {
    let oc = OcRepo::create(&pool, &new_oc("Aria", None), "aria").await.unwrap();
    let timeline = TimelineRepo::create(
        &pool,
        &CreateTimeline {
            world_id: None,
            name: "Main".into(),
            slug: None,
            description_md: None,
        },
        "main",
    )
    .await
    .unwrap();

    TimelineEventRepo::create(&pool, timeline.id, &new_event(timeline.id, "Undated", None, vec![]))
        .await
        .unwrap();
    TimelineEventRepo::create(&pool, timeline.id, &new_event(timeline.id, "Later", Some(20), vec![oc.id]))
        .await
        .unwrap();
    TimelineEventRepo::create(&pool, timeline.id, &new_event(timeline.id, "Earlier", Some(10), vec![]))
        .await
        .unwrap();

    let titles: Vec<String> = TimelineEventRepo::list_by_timeline(&pool, timeline.id)
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.title)
        .collect();
    assert_eq!(titles, vec!["Earlier", "Later", "Undated"]);

    let appearances = TimelineEventRepo::list_for_oc(&pool, oc.id).await.unwrap();
    assert_eq!(appearances.len(), 1);
    assert_eq!(appearances[0].timeline_slug, "main");

    let summaries = TimelineRepo::list_with_world(&pool).await.unwrap();
    assert_eq!(summaries[0].event_count, 3);

    assert!(TimelineRepo::delete(&pool, timeline.id).await.unwrap());
    assert_eq!(TimelineEventRepo::count(&pool).await.unwrap(), 0);
}

// ---------------------------------------------------------------------------
// Prompts and settings
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn only_active_prompts_are_listed(pool: PgPool) {
    let prompt = |text: &str, active: Option<bool>| CreateWritingPrompt {
        world_id: None,
        prompt: text.to_string(),
        category: None,
        is_active: active,
    };
    WritingPromptRepo::create(&pool, &prompt("on", None)).await.unwrap();
    WritingPromptRepo::create(&pool, &prompt("off", Some(false))).await.unwrap();

    let active = WritingPromptRepo::list_active(&pool).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].prompt, "on");
    assert_eq!(WritingPromptRepo::count(&pool).await.unwrap(), 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn settings_upsert_is_partial(pool: PgPool) {
    let settings = SiteSettingsRepo::get(&pool).await.unwrap();
    assert_eq!(settings.site_name, DEFAULT_SITE_NAME);

    let updated = SiteSettingsRepo::upsert(
        &pool,
        &UpdateSiteSettings {
            site_name: None,
            tagline: Some("Stories".into()),
            about_md: None,
            footer_text: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.site_name, DEFAULT_SITE_NAME);
    assert_eq!(updated.tagline.as_deref(), Some("Stories"));
}

// ---------------------------------------------------------------------------
// Admin auth
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn first_admin_can_only_be_created_once(pool: PgPool) {
    let input = |name: &str| CreateAdminUser {
        username: name.to_string(),
        password_hash: "hash".to_string(),
    };
    assert!(AdminUserRepo::create_first(&pool, &input("root")).await.unwrap().is_some());
    assert!(AdminUserRepo::create_first(&pool, &input("other")).await.unwrap().is_none());
    assert_eq!(AdminUserRepo::count(&pool).await.unwrap(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn failed_logins_count_up_and_reset(pool: PgPool) {
    let user = AdminUserRepo::create_first(
        &pool,
        &CreateAdminUser {
            username: "root".into(),
            password_hash: "hash".into(),
        },
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(AdminUserRepo::increment_failed_login(&pool, user.id).await.unwrap(), 1);
    assert_eq!(AdminUserRepo::increment_failed_login(&pool, user.id).await.unwrap(), 2);
    AdminUserRepo::lock_account(&pool, user.id, Utc::now() + Duration::minutes(15))
        .await
        .unwrap();

    AdminUserRepo::record_successful_login(&pool, user.id).await.unwrap();
    let user = AdminUserRepo::find_by_username(&pool, "root").await.unwrap().unwrap();
    assert_eq!(user.failed_login_count, 0);
    assert!(user.locked_until.is_none());
    assert!(user.last_login_at.is_some());
}

#[sqlx::test(migrations = "./migrations")]
async fn sessions_expire_and_revoke(pool: PgPool) {
    let user = AdminUserRepo::create_first(
        &pool,
        &CreateAdminUser {
            username: "root".into(),
            password_hash: "hash".into(),
        },
    )
    .await
    .unwrap()
    .unwrap();

    let session = |hash: &str, expires_in: Duration| CreateAdminSession {
        admin_user_id: user.id,
        token_hash: hash.to_string(),
        expires_at: Utc::now() + expires_in,
        user_agent: None,
        ip_address: None,
    };
    AdminSessionRepo::create(&pool, &session("live", Duration::hours(1))).await.unwrap();
    AdminSessionRepo::create(&pool, &session("stale", Duration::hours(-1))).await.unwrap();

    assert!(AdminSessionRepo::find_active_by_token_hash(&pool, "live").await.unwrap().is_some());
    assert!(AdminSessionRepo::find_active_by_token_hash(&pool, "stale").await.unwrap().is_none());

    assert!(AdminSessionRepo::revoke(&pool, "live").await.unwrap());
    assert!(AdminSessionRepo::find_active_by_token_hash(&pool, "live").await.unwrap().is_none());

    assert_eq!(AdminSessionRepo::cleanup_expired(&pool).await.unwrap(), 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn revoking_all_sessions_of_a_user(pool: PgPool) {
    let user = AdminUserRepo::create_first(
        &pool,
        &CreateAdminUser {
            username: "root".into(),
            password_hash: "hash".into(),
        },
    )
    .await
    .unwrap()
    .unwrap();

    for hash in ["laptop", "phone"] {
        AdminSessionRepo::create(
            &pool,
            &CreateAdminSession {
                admin_user_id: user.id,
                token_hash: hash.to_string(),
                expires_at: Utc::now() + Duration::hours(1),
                user_agent: None,
                ip_address: None,
            },
        )
        .await
        .unwrap();
    }

    assert_eq!(AdminSessionRepo::revoke_all_for_user(&pool, user.id).await.unwrap(), 2);
    assert!(AdminSessionRepo::find_active_by_token_hash(&pool, "phone").await.unwrap().is_none());
    assert_eq!(AdminSessionRepo::revoke_all_for_user(&pool, user.id).await.unwrap(), 0);
}
