use crate::common::models::{Match, UserRole};

/// Destinations reachable through the navigation overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavTarget {
    Swipe,
    Chats,
    Settings,
}

/// Everything that can drive the controller: user actions plus the
/// asynchronous notifications delivered by the backend subscriptions.
#[derive(Debug, Clone)]
pub enum Event {
    // Auth form
    EmailChanged(String),
    PasswordChanged(String),
    ToggleLoginRegister,
    SubmitLoginOrRegister,
    AuthStateChanged(Option<String>),
    // Onboarding and profile editing
    RoleSelected(UserRole),
    NameChanged(String),
    LocationChanged(String),
    BioChanged(String),
    TagsChanged(Vec<String>),
    SaveProfile,
    EditProfile,
    // Navigation overlay
    OpenNav,
    CloseNav,
    NavigateTo(NavTarget),
    // Swipe flow
    SwipeLike,
    SwipePass,
    ReloadCandidates,
    DismissMatchOverlay,
    OpenMatchChat,
    // Chats
    SelectChat(String),
    MessageInputChanged(String),
    SendMessage,
    BackToChats,
    // Session
    Logout,
    // Live match-collection updates
    MatchesUpdated(Vec<Match>),
}
