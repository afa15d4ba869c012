//! End-to-end controller flows: onboarding, swiping, matching, chat and
//! session teardown, driven purely through events.

use carematch::client::models::app_state::{App, AppView};
use carematch::client::models::events::{Event, NavTarget};
use carematch::client::services::match_service::SwipePhase;
use carematch::common::config::ClientConfig;
use carematch::common::models::{Profile, Swipe, UserRole};
use carematch::store::{AuthClient, Store};
use chrono::Utc;
use std::time::Duration;

fn test_config() -> ClientConfig {
    ClientConfig {
        database_url: "sqlite::memory:".to_string(),
        log_level: "debug".to_string(),
        photo_base_url: "https://picsum.photos/seed".to_string(),
    }
}

async fn memory_app() -> (App, Store) {
    let store = Store::connect("sqlite::memory:")
        .await
        .expect("in-memory store should connect");
    let auth = AuthClient::new(store.clone());
    let app = App::new(store.clone(), auth, &test_config());
    (app, store)
}

fn candidate(id: &str, role: UserRole) -> Profile {
    Profile {
        id: id.to_string(),
        name: format!("User {}", id),
        role,
        photo: format!("https://picsum.photos/seed/{}/200/200", id),
        location: "Berlin".to_string(),
        bio: "Test bio".to_string(),
        tags: vec!["Flexible".to_string()],
        rating: 4.0,
    }
}

async fn register(app: &mut App, email: &str) {
    if app.is_login {
        app.update(Event::ToggleLoginRegister).await;
    }
    app.update(Event::EmailChanged(email.to_string())).await;
    app.update(Event::PasswordChanged("secret1".to_string())).await;
    app.update(Event::SubmitLoginOrRegister).await;
}

/// Registers, picks a role and saves a minimal profile, landing on the
/// swipe view. Returns the new account id.
async fn onboard(app: &mut App, email: &str, role: UserRole) -> String {
    register(app, email).await;
    assert_eq!(app.view, AppView::RoleSelect);
    app.update(Event::RoleSelected(role)).await;
    assert_eq!(app.view, AppView::ProfileEdit);
    app.update(Event::NameChanged("Tester".to_string())).await;
    app.update(Event::SaveProfile).await;
    assert_eq!(app.view, AppView::Swipe);
    app.account_id.clone().expect("onboarded app has an account")
}

#[tokio::test]
async fn fresh_account_walks_auth_role_profile_swipe() {
    let (mut app, store) = memory_app().await;
    assert_eq!(app.view, AppView::Auth);

    register(&mut app, "new@example.com").await;
    assert_eq!(app.view, AppView::RoleSelect);
    let account_id = app.account_id.clone().unwrap();

    app.update(Event::RoleSelected(UserRole::Careseeker)).await;
    assert_eq!(app.view, AppView::ProfileEdit);
    let draft = app.profile.clone().unwrap();
    assert_eq!(draft.id, account_id);
    assert!(draft.name.is_empty());
    assert_eq!(draft.rating, 5.0);

    app.update(Event::NameChanged("Thomas".to_string())).await;
    app.update(Event::LocationChanged("Munich".to_string())).await;
    app.update(Event::BioChanged("Needs a hand weekly".to_string())).await;
    app.update(Event::TagsChanged(vec!["Shopping".to_string()])).await;
    app.update(Event::SaveProfile).await;

    assert_eq!(app.view, AppView::Swipe);
    assert_eq!(app.swipe.phase, SwipePhase::Exhausted);

    let stored = store.get_profile(&account_id).await.unwrap().unwrap();
    assert_eq!(stored.name, "Thomas");
    assert_eq!(stored.role, UserRole::Careseeker);
    assert_eq!(stored.tags, vec!["Shopping".to_string()]);
}

#[tokio::test]
async fn failed_sign_in_shows_inline_error() {
    let (mut app, _store) = memory_app().await;

    app.update(Event::EmailChanged("ghost@example.com".to_string())).await;
    app.update(Event::PasswordChanged("whatever".to_string())).await;
    app.update(Event::SubmitLoginOrRegister).await;

    assert_eq!(app.view, AppView::Auth);
    assert!(app.error_message.is_some());
    assert!(app.account_id.is_none());
}

#[tokio::test]
async fn candidates_exclude_self_same_role_and_already_swiped() {
    let (mut app, store) = memory_app().await;
    let me = onboard(&mut app, "seeker@example.com", UserRole::Careseeker).await;

    store.set_profile(&candidate("cg-anna", UserRole::Caregiver)).await.unwrap();
    store.set_profile(&candidate("cg-elena", UserRole::Caregiver)).await.unwrap();
    store.set_profile(&candidate("cg-mark", UserRole::Caregiver)).await.unwrap();
    store.set_profile(&candidate("cs-thomas", UserRole::Careseeker)).await.unwrap();

    // Already passed on one caregiver.
    store
        .upsert_swipe(&Swipe {
            from_user_id: me.clone(),
            to_user_id: "cg-mark".to_string(),
            liked: false,
            timestamp: Utc::now(),
        })
        .await
        .unwrap();

    app.update(Event::ReloadCandidates).await;

    let ids: Vec<&str> = app.swipe.candidates.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["cg-anna", "cg-elena"]);
    assert_eq!(app.swipe.phase, SwipePhase::Ready(0));
}

#[tokio::test]
async fn mutual_like_creates_one_match_and_shows_overlay() {
    let (mut app, store) = memory_app().await;
    let me = onboard(&mut app, "seeker@example.com", UserRole::Careseeker).await;

    store.set_profile(&candidate("cg-anna", UserRole::Caregiver)).await.unwrap();
    // Anna liked me before I ever saw her card.
    store
        .upsert_swipe(&Swipe {
            from_user_id: "cg-anna".to_string(),
            to_user_id: me.clone(),
            liked: true,
            timestamp: Utc::now(),
        })
        .await
        .unwrap();

    app.update(Event::ReloadCandidates).await;
    assert_eq!(app.swipe.current().unwrap().id, "cg-anna");

    app.update(Event::SwipeLike).await;

    let overlay = app.swipe.match_found.clone().expect("mutual like shows the overlay");
    assert_eq!(overlay.id, "cg-anna");
    assert_eq!(app.matches.len(), 1);
    assert_eq!(store.matches_for(&me).await.unwrap().len(), 1);

    // The live subscription confirms: first the pre-match snapshot, then
    // the one carrying the new record. The stale snapshot must not hide
    // the match that was just surfaced.
    let first = tokio::time::timeout(Duration::from_secs(2), app.poll_background())
        .await
        .expect("initial snapshot should arrive");
    app.update(first).await;
    assert_eq!(app.matches.len(), 1);
    assert_eq!(app.matches[0].id, "cg-anna");
    let second = tokio::time::timeout(Duration::from_secs(2), app.poll_background())
        .await
        .expect("match snapshot should arrive");
    app.update(second).await;
    assert_eq!(app.matches.len(), 1);
    assert_eq!(app.matches[0].id, "cg-anna");

    app.update(Event::DismissMatchOverlay).await;
    assert!(app.swipe.match_found.is_none());
    assert_eq!(app.swipe.phase, SwipePhase::Exhausted);
}

#[tokio::test]
async fn like_without_reverse_like_creates_no_match() {
    let (mut app, store) = memory_app().await;
    let me = onboard(&mut app, "seeker@example.com", UserRole::Careseeker).await;

    store.set_profile(&candidate("cg-anna", UserRole::Caregiver)).await.unwrap();
    app.update(Event::ReloadCandidates).await;

    app.update(Event::SwipeLike).await;

    assert!(app.swipe.match_found.is_none());
    assert!(app.matches.is_empty());
    assert!(store.matches_for(&me).await.unwrap().is_empty());
    assert_eq!(app.swipe.phase, SwipePhase::Exhausted);

    // The liked swipe itself is on record for the later mutual check.
    assert!(store.liked_swipe_exists(&me, "cg-anna").await.unwrap());
}

#[tokio::test]
async fn failed_swipe_write_keeps_the_cursor_in_place() {
    let (mut app, store) = memory_app().await;
    onboard(&mut app, "seeker@example.com", UserRole::Careseeker).await;

    store.set_profile(&candidate("cg-anna", UserRole::Caregiver)).await.unwrap();
    store.set_profile(&candidate("cg-elena", UserRole::Caregiver)).await.unwrap();
    app.update(Event::ReloadCandidates).await;
    assert_eq!(app.swipe.current().unwrap().id, "cg-anna");

    // Every write fails once the pool is closed.
    store.pool.close().await;
    app.update(Event::SwipeLike).await;

    assert_eq!(app.swipe.phase, SwipePhase::Ready(0));
    assert_eq!(app.swipe.current().unwrap().id, "cg-anna");
    assert!(app.swipe.match_found.is_none());
}

#[tokio::test]
async fn match_chat_is_local_and_resets_per_visit() {
    let (mut app, store) = memory_app().await;
    let me = onboard(&mut app, "seeker@example.com", UserRole::Careseeker).await;

    store.set_profile(&candidate("cg-anna", UserRole::Caregiver)).await.unwrap();
    store
        .upsert_swipe(&Swipe {
            from_user_id: "cg-anna".to_string(),
            to_user_id: me,
            liked: true,
            timestamp: Utc::now(),
        })
        .await
        .unwrap();
    app.update(Event::ReloadCandidates).await;
    app.update(Event::SwipeLike).await;

    app.update(Event::OpenMatchChat).await;
    assert_eq!(app.view, AppView::ChatDetail);
    let session = app.active_chat.as_ref().unwrap();
    assert_eq!(session.participant.id, "cg-anna");
    assert!(session.messages.is_empty());

    app.update(Event::MessageInputChanged("hello!".to_string())).await;
    app.update(Event::SendMessage).await;
    app.update(Event::MessageInputChanged("   ".to_string())).await;
    app.update(Event::SendMessage).await;
    assert_eq!(app.active_chat.as_ref().unwrap().messages.len(), 1);
    assert!(app.message_input.is_empty());

    // Leaving the view drops the history; reopening starts clean.
    app.update(Event::BackToChats).await;
    assert_eq!(app.view, AppView::Chats);
    assert!(app.active_chat.is_none());

    app.update(Event::SelectChat("cg-anna".to_string())).await;
    assert_eq!(app.view, AppView::ChatDetail);
    assert!(app.active_chat.as_ref().unwrap().messages.is_empty());
}

#[tokio::test]
async fn navigation_is_gated_until_onboarding_is_done() {
    let (mut app, _store) = memory_app().await;
    register(&mut app, "new@example.com").await;
    assert_eq!(app.view, AppView::RoleSelect);

    app.update(Event::NavigateTo(NavTarget::Chats)).await;
    assert_eq!(app.view, AppView::RoleSelect);

    app.update(Event::RoleSelected(UserRole::Caregiver)).await;
    app.update(Event::NavigateTo(NavTarget::Settings)).await;
    assert_eq!(app.view, AppView::ProfileEdit);
}

#[tokio::test]
async fn role_select_and_save_are_onboarding_only() {
    let (mut app, store) = memory_app().await;
    let me = onboard(&mut app, "seeker@example.com", UserRole::Careseeker).await;

    // A stray role pick after onboarding neither replaces the profile nor
    // leaves the swipe view.
    app.update(Event::RoleSelected(UserRole::Caregiver)).await;
    assert_eq!(app.view, AppView::Swipe);
    let profile = app.profile.as_ref().unwrap();
    assert_eq!(profile.role, UserRole::Careseeker);
    assert_eq!(profile.name, "Tester");

    // Saving is only possible from the edit view.
    app.update(Event::SaveProfile).await;
    assert_eq!(app.view, AppView::Swipe);
    let stored = store.get_profile(&me).await.unwrap().unwrap();
    assert_eq!(stored.name, "Tester");
    assert_eq!(stored.role, UserRole::Careseeker);
}

#[tokio::test]
async fn nav_overlay_only_opens_where_the_header_shows() {
    let (mut app, _store) = memory_app().await;

    // No overlay on the auth view.
    app.update(Event::OpenNav).await;
    assert!(!app.nav_open);

    onboard(&mut app, "seeker@example.com", UserRole::Careseeker).await;
    app.update(Event::OpenNav).await;
    assert!(app.nav_open);
    app.update(Event::CloseNav).await;
    assert!(!app.nav_open);

    // Navigating closes the overlay as a side effect.
    app.update(Event::OpenNav).await;
    app.update(Event::NavigateTo(NavTarget::Chats)).await;
    assert!(!app.nav_open);
    assert_eq!(app.view, AppView::Chats);
}

#[tokio::test]
async fn settings_allows_editing_the_saved_profile() {
    let (mut app, store) = memory_app().await;
    let me = onboard(&mut app, "seeker@example.com", UserRole::Careseeker).await;

    app.update(Event::NavigateTo(NavTarget::Settings)).await;
    assert_eq!(app.view, AppView::Settings);

    app.update(Event::EditProfile).await;
    assert_eq!(app.view, AppView::ProfileEdit);
    app.update(Event::BioChanged("Now with more detail".to_string())).await;
    app.update(Event::SaveProfile).await;
    assert_eq!(app.view, AppView::Swipe);

    let stored = store.get_profile(&me).await.unwrap().unwrap();
    assert_eq!(stored.bio, "Now with more detail");
}

#[tokio::test]
async fn logout_resets_state_and_silences_background_updates() {
    let (mut app, store) = memory_app().await;
    let me = onboard(&mut app, "seeker@example.com", UserRole::Careseeker).await;

    app.update(Event::Logout).await;
    assert_eq!(app.view, AppView::Auth);
    assert!(app.account_id.is_none());
    assert!(app.profile.is_none());
    assert!(app.matches.is_empty());
    assert_eq!(app.swipe.phase, SwipePhase::Loading);

    // A match landing after logout must not wake the signed-out client.
    store.insert_match(&me, "cg-anna").await.unwrap();
    let woke = tokio::time::timeout(Duration::from_millis(300), app.poll_background()).await;
    assert!(woke.is_err(), "no background event should arrive after logout");
}

#[tokio::test]
async fn returning_account_lands_directly_on_swipe() {
    let (mut app, store) = memory_app().await;
    onboard(&mut app, "seeker@example.com", UserRole::Careseeker).await;
    app.update(Event::Logout).await;

    // Fresh controller over the same store, as after an app restart.
    let auth = AuthClient::new(store.clone());
    let mut app = App::new(store.clone(), auth, &test_config());
    app.update(Event::EmailChanged("seeker@example.com".to_string())).await;
    app.update(Event::PasswordChanged("secret1".to_string())).await;
    app.update(Event::SubmitLoginOrRegister).await;

    assert_eq!(app.view, AppView::Swipe);
    assert_eq!(app.profile.as_ref().unwrap().name, "Tester");
}
