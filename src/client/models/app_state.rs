//! The top-level navigation/session state machine. All state lives here;
//! events are applied one at a time on the event loop and every backend
//! call is awaited before the next event is processed.

use crate::client::models::events::{Event, NavTarget};
use crate::client::services::chat_service::ChatService;
use crate::client::services::match_service::{MatchService, SwipeSession};
use crate::client::services::profile_service::ProfileService;
use crate::client::utils::session_store;
use crate::common::config::ClientConfig;
use crate::common::models::{ChatSession, Match, Profile};
use crate::store::{AuthClient, MatchSubscription, Store};
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppView {
    #[default]
    Auth,
    RoleSelect,
    ProfileEdit,
    Swipe,
    Chats,
    ChatDetail,
    Settings,
}

impl AppView {
    /// The top navigation header is hidden during authentication and
    /// onboarding, visible everywhere else.
    pub fn header_visible(self) -> bool {
        !matches!(self, AppView::Auth | AppView::RoleSelect | AppView::ProfileEdit)
    }
}

pub struct App {
    pub view: AppView,
    pub nav_open: bool,
    pub loading: bool,
    // Auth form state
    pub email: String,
    pub password: String,
    pub is_login: bool,
    pub error_message: Option<String>,
    // Session
    pub account_id: Option<String>,
    pub profile: Option<Profile>,
    /// Matches resolved to the other participant's profile.
    pub matches: Vec<Profile>,
    pub active_chat: Option<ChatSession>,
    pub message_input: String,
    pub swipe: SwipeSession,

    store: Store,
    auth: AuthClient,
    auth_rx: watch::Receiver<Option<String>>,
    profiles: ProfileService,
    engine: MatchService,
    match_sub: Option<MatchSubscription>,
    sub_account: Option<String>,
    /// Matches surfaced locally but not yet seen in a subscription snapshot.
    /// Snapshots queued before the local insert must not hide them.
    pending_matches: Vec<Profile>,
}

enum Wake {
    Auth(Result<(), watch::error::RecvError>),
    Snapshot(Option<Vec<Match>>),
}

impl App {
    pub fn new(store: Store, auth: AuthClient, config: &ClientConfig) -> Self {
        let auth_rx = auth.subscribe();
        let profiles = ProfileService::new(store.clone(), config.photo_base_url.clone());
        let engine = MatchService::new(store.clone());
        Self {
            view: AppView::Auth,
            nav_open: false,
            loading: true,
            email: String::new(),
            password: String::new(),
            is_login: true,
            error_message: None,
            account_id: None,
            profile: None,
            matches: Vec::new(),
            active_chat: None,
            message_input: String::new(),
            swipe: SwipeSession::default(),
            store,
            auth,
            auth_rx,
            profiles,
            engine,
            match_sub: None,
            sub_account: None,
            pending_matches: Vec::new(),
        }
    }

    /// Startup: restore a persisted session, if any, then settle the initial
    /// view from the resulting auth state.
    pub async fn bootstrap(&mut self) {
        let restored = match session_store::load_session_token() {
            Some(token) => match self.auth.resume(&token).await {
                Ok(account) => account,
                Err(e) => {
                    log::warn!("session restore failed: {}", e);
                    None
                }
            },
            None => None,
        };
        self.on_auth_state(restored).await;
    }

    /// Applies one event. Within an event every backend step is awaited in
    /// order; errors are absorbed here per the failure policy of the view
    /// they belong to.
    pub async fn update(&mut self, event: Event) {
        match event {
            Event::EmailChanged(email) => {
                self.email = email;
            }
            Event::PasswordChanged(password) => {
                self.password = password;
            }
            Event::ToggleLoginRegister => {
                self.is_login = !self.is_login;
                self.error_message = None;
            }
            Event::SubmitLoginOrRegister => {
                self.error_message = None;
                let result = if self.is_login {
                    self.auth.sign_in(&self.email, &self.password).await
                } else {
                    self.auth.sign_up(&self.email, &self.password).await
                };
                match result {
                    Ok(session) => {
                        self.password.clear();
                        if let Err(e) = session_store::save_session_token(&session.session_token)
                        {
                            log::warn!("failed to persist session token: {}", e);
                        }
                        self.on_auth_state(Some(session.account_id)).await;
                    }
                    // Auth errors surface as inline text, nothing retries.
                    Err(e) => {
                        self.error_message = Some(e.to_string());
                    }
                }
            }
            Event::AuthStateChanged(account) => {
                self.on_auth_state(account).await;
            }
            Event::RoleSelected(role) => {
                // Role is picked once, during onboarding; a saved profile is
                // never replaced by a fresh draft.
                if self.view == AppView::RoleSelect {
                    if let Some(account_id) = self.account_id.clone() {
                        self.profile = Some(self.profiles.draft_profile(&account_id, role));
                        self.view = AppView::ProfileEdit;
                    }
                }
            }
            Event::NameChanged(name) => {
                if let Some(profile) = self.profile.as_mut() {
                    profile.name = name;
                }
            }
            Event::LocationChanged(location) => {
                if let Some(profile) = self.profile.as_mut() {
                    profile.location = location;
                }
            }
            Event::BioChanged(bio) => {
                if let Some(profile) = self.profile.as_mut() {
                    profile.bio = bio;
                }
            }
            Event::TagsChanged(tags) => {
                if let Some(profile) = self.profile.as_mut() {
                    profile.tags = tags;
                }
            }
            Event::SaveProfile => {
                if self.view == AppView::ProfileEdit {
                    if let Some(profile) = self.profile.clone() {
                        match self.profiles.save(&profile).await {
                            Ok(()) => {
                                self.ensure_match_subscription(&profile.id);
                                self.view = AppView::Swipe;
                                self.enter_swipe().await;
                            }
                            // Save failure keeps the user on the edit view.
                            Err(e) => {
                                log::error!("error saving profile: {}", e);
                            }
                        }
                    }
                }
            }
            Event::EditProfile => {
                if self.view == AppView::Settings && self.profile.is_some() {
                    self.nav_open = false;
                    self.view = AppView::ProfileEdit;
                }
            }
            Event::OpenNav => {
                if self.view.header_visible() {
                    self.nav_open = true;
                }
            }
            Event::CloseNav => {
                self.nav_open = false;
            }
            Event::NavigateTo(target) => {
                if self.view.header_visible() {
                    self.nav_open = false;
                    match target {
                        NavTarget::Swipe => {
                            self.view = AppView::Swipe;
                            self.enter_swipe().await;
                        }
                        NavTarget::Chats => {
                            self.view = AppView::Chats;
                        }
                        NavTarget::Settings => {
                            self.view = AppView::Settings;
                        }
                    }
                }
            }
            Event::SwipeLike => {
                self.on_swipe(true).await;
            }
            Event::SwipePass => {
                self.on_swipe(false).await;
            }
            Event::ReloadCandidates => {
                if self.view == AppView::Swipe {
                    self.enter_swipe().await;
                }
            }
            Event::DismissMatchOverlay => {
                self.swipe.match_found = None;
            }
            Event::OpenMatchChat => {
                if let Some(participant) = self.swipe.match_found.take() {
                    self.active_chat = Some(ChatService::open_session(participant));
                    self.view = AppView::ChatDetail;
                }
            }
            Event::SelectChat(participant_id) => {
                if let Some(participant) =
                    self.matches.iter().find(|p| p.id == participant_id).cloned()
                {
                    self.active_chat = Some(ChatService::open_session(participant));
                    self.view = AppView::ChatDetail;
                }
            }
            Event::MessageInputChanged(input) => {
                self.message_input = input;
            }
            Event::SendMessage => {
                if let Some(session) = self.active_chat.as_mut() {
                    ChatService::send_message(session, &self.message_input);
                    self.message_input.clear();
                }
            }
            Event::BackToChats => {
                if self.view == AppView::ChatDetail {
                    // The session's message history lives only as long as
                    // the view.
                    self.active_chat = None;
                    self.view = AppView::Chats;
                }
            }
            Event::Logout => {
                self.nav_open = false;
                if let Err(e) = session_store::clear_session_token() {
                    log::warn!("failed to clear session token: {}", e);
                }
                if let Err(e) = self.auth.sign_out().await {
                    log::error!("sign-out failed: {}", e);
                }
                self.on_auth_state(None).await;
            }
            Event::MatchesUpdated(records) => {
                self.resolve_matches(records).await;
            }
        }
    }

    /// Waits for the next background notification: an auth-state flip or a
    /// fresh snapshot from the live match subscription.
    pub async fn poll_background(&mut self) -> Event {
        loop {
            let wake = if let Some(sub) = self.match_sub.as_mut() {
                tokio::select! {
                    changed = self.auth_rx.changed() => Wake::Auth(changed),
                    snapshot = sub.recv() => Wake::Snapshot(snapshot),
                }
            } else {
                Wake::Auth(self.auth_rx.changed().await)
            };

            match wake {
                Wake::Auth(Ok(())) => {
                    let state = self.auth_rx.borrow().clone();
                    if state != self.account_id {
                        return Event::AuthStateChanged(state);
                    }
                }
                Wake::Auth(Err(_)) => {
                    // Auth collaborator went away; report sign-out once.
                    if self.account_id.is_some() {
                        return Event::AuthStateChanged(None);
                    }
                    std::future::pending::<()>().await;
                }
                Wake::Snapshot(Some(records)) => {
                    return Event::MatchesUpdated(records);
                }
                Wake::Snapshot(None) => {
                    self.match_sub = None;
                    self.sub_account = None;
                }
            }
        }
    }

    async fn on_auth_state(&mut self, account: Option<String>) {
        self.loading = false;
        match account {
            Some(account_id) => {
                self.account_id = Some(account_id.clone());
                match self.profiles.load(&account_id).await {
                    Ok(Some(profile)) => {
                        self.ensure_match_subscription(&profile.id);
                        self.profile = Some(profile);
                        self.view = AppView::Swipe;
                        self.enter_swipe().await;
                    }
                    Ok(None) => {
                        self.profile = None;
                        self.view = AppView::RoleSelect;
                    }
                    Err(e) => {
                        log::error!("profile load failed: {}", e);
                        self.error_message = Some("could not load profile".to_string());
                        self.view = AppView::Auth;
                    }
                }
            }
            None => {
                self.account_id = None;
                self.profile = None;
                self.matches.clear();
                self.pending_matches.clear();
                self.active_chat = None;
                self.swipe = SwipeSession::default();
                self.release_match_subscription();
                self.view = AppView::Auth;
            }
        }
    }

    async fn enter_swipe(&mut self) {
        let Some(profile) = self.profile.clone() else {
            return;
        };
        self.swipe = SwipeSession::default();
        let candidates = self.engine.load_candidates(profile.role, &profile.id).await;
        self.swipe = SwipeSession::with_candidates(candidates);
    }

    async fn on_swipe(&mut self, liked: bool) {
        if self.view != AppView::Swipe {
            return;
        }
        let Some(self_id) = self.account_id.clone() else {
            return;
        };
        let Some(candidate) = self.swipe.current().cloned() else {
            return;
        };

        match self.engine.record_swipe(&self_id, &candidate.id, liked).await {
            Ok(matched) => {
                if matched {
                    // Surface the match immediately, ahead of the
                    // subscription confirmation.
                    self.matches.push(candidate.clone());
                    self.pending_matches.push(candidate.clone());
                    self.swipe.match_found = Some(candidate);
                }
                self.swipe.advance_cursor();
            }
            // Failed write: the cursor stays on this candidate so visible
            // progress cannot outrun recorded state.
            Err(e) => {
                log::error!("swipe write failed: {}", e);
            }
        }
    }

    /// Resolves each match to the other participant's profile. A match whose
    /// profile cannot be loaded is skipped, not fatal to the update.
    async fn resolve_matches(&mut self, records: Vec<Match>) {
        let Some(me) = self.account_id.clone() else {
            return;
        };
        let mut resolved = Vec::new();
        for record in records {
            let Some(other) = record.other_user(&me) else {
                continue;
            };
            match self.store.get_profile(other).await {
                Ok(Some(profile)) => resolved.push(profile),
                Ok(None) => {
                    log::warn!("match {} references missing profile {}", record.id, other);
                }
                Err(e) => {
                    log::warn!("match profile resolution failed for {}: {}", other, e);
                }
            }
        }
        // Carry locally surfaced matches through snapshots generated before
        // their insert; once a snapshot contains them they are no longer
        // pending.
        self.pending_matches
            .retain(|p| !resolved.iter().any(|r| r.id == p.id));
        resolved.extend(self.pending_matches.iter().cloned());
        self.matches = resolved;
    }

    fn ensure_match_subscription(&mut self, account_id: &str) {
        if self.sub_account.as_deref() == Some(account_id) {
            return;
        }
        self.release_match_subscription();
        self.match_sub = Some(self.store.watch_matches(account_id));
        self.sub_account = Some(account_id.to_string());
    }

    fn release_match_subscription(&mut self) {
        if let Some(sub) = self.match_sub.take() {
            sub.release();
        }
        self.sub_account = None;
    }
}
