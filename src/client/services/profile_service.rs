use crate::common::models::{Profile, UserRole};
use crate::store::Store;

/// Loads, drafts and saves the current user's profile.
#[derive(Debug, Clone)]
pub struct ProfileService {
    store: Store,
    photo_base_url: String,
}

impl ProfileService {
    pub fn new(store: Store, photo_base_url: String) -> Self {
        Self {
            store,
            photo_base_url,
        }
    }

    /// Seeds the in-memory draft created right after role selection: empty
    /// text fields, a default photo derived from the account id, rating 5.
    pub fn draft_profile(&self, account_id: &str, role: UserRole) -> Profile {
        Profile {
            id: account_id.to_string(),
            name: String::new(),
            role,
            photo: format!("{}/{}/200/200", self.photo_base_url, account_id),
            location: String::new(),
            bio: String::new(),
            tags: Vec::new(),
            rating: 5.0,
        }
    }

    pub async fn load(&self, account_id: &str) -> anyhow::Result<Option<Profile>> {
        self.store.get_profile(account_id).await
    }

    /// Persists the profile as a full overwrite of the stored document.
    pub async fn save(&self, profile: &Profile) -> anyhow::Result<()> {
        self.store.set_profile(profile).await
    }
}
