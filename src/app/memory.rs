// In-memory facade implementation.
//
// Backs the dev server and the end-to-end tests. State lives in mutexes
// keyed the way the real store would key it; every business method records
// its name in an invocation log so tests can assert which calls ran (and
// which were short-circuited away).

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::app::{AppError, AppResult, AppService};
use crate::model::{
    new_id, Channel, License, Permission, Post, Preference, Scheme, SchemePatch, SchemeScope,
    Session, Team,
};

#[derive(Default)]
pub struct MemoryApp {
    schemes: Mutex<HashMap<String, Scheme>>,
    scheme_teams: Mutex<HashMap<String, Vec<Team>>>,
    scheme_channels: Mutex<HashMap<String, Vec<Channel>>>,
    // user_id -> preference rows
    preferences: Mutex<HashMap<String, Vec<Preference>>>,
    posts: Mutex<HashMap<String, Post>>,
    // channel_id -> member user ids
    channel_members: Mutex<HashMap<String, HashSet<String>>>,
    license: Mutex<Option<License>>,
    calls: Mutex<Vec<&'static str>>,
}

impl MemoryApp {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, name: &'static str) {
        self.calls.lock().unwrap().push(name);
    }

    /// Business method invocation log, in call order
    pub fn business_calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn set_license(&self, license: Option<License>) {
        *self.license.lock().unwrap() = license;
    }

    pub fn seed_scheme(&self, scheme: Scheme) {
        self.schemes.lock().unwrap().insert(scheme.id.clone(), scheme);
    }

    pub fn attach_team(&self, scheme_id: &str, team: Team) {
        self.scheme_teams
            .lock()
            .unwrap()
            .entry(scheme_id.to_string())
            .or_default()
            .push(team);
    }

    pub fn attach_channel(&self, scheme_id: &str, channel: Channel) {
        self.scheme_channels
            .lock()
            .unwrap()
            .entry(scheme_id.to_string())
            .or_default()
            .push(channel);
    }

    pub fn seed_post(&self, post: Post) {
        self.posts.lock().unwrap().insert(post.id.clone(), post);
    }

    pub fn add_channel_member(&self, channel_id: &str, user_id: &str) {
        self.channel_members
            .lock()
            .unwrap()
            .entry(channel_id.to_string())
            .or_default()
            .insert(user_id.to_string());
    }
}

fn page_slice<T: Clone>(items: &[T], page: u64, per_page: u64) -> Vec<T> {
    items
        .iter()
        .skip((page * per_page) as usize)
        .take(per_page as usize)
        .cloned()
        .collect()
}

#[async_trait]
impl AppService for MemoryApp {
    async fn create_scheme(&self, mut draft: Scheme) -> AppResult<Scheme> {
        self.record("create_scheme");

        if draft.name.is_empty() {
            return Err(AppError::new(
                "app.scheme.create.invalid",
                400,
                "scheme name must not be empty",
            ));
        }

        let now = Utc::now();
        draft.id = new_id();
        draft.create_at = Some(now);
        draft.update_at = Some(now);
        draft.delete_at = None;

        self.schemes.lock().unwrap().insert(draft.id.clone(), draft.clone());
        Ok(draft)
    }

    async fn get_scheme(&self, scheme_id: &str) -> AppResult<Scheme> {
        self.record("get_scheme");

        self.schemes
            .lock()
            .unwrap()
            .get(scheme_id)
            .cloned()
            .ok_or_else(|| AppError::new("app.scheme.get.not_found", 404, "scheme not found"))
    }

    async fn get_schemes_page(
        &self,
        scope: Option<SchemeScope>,
        page: u64,
        per_page: u64,
    ) -> AppResult<Vec<Scheme>> {
        self.record("get_schemes_page");

        let mut schemes: Vec<Scheme> = self
            .schemes
            .lock()
            .unwrap()
            .values()
            .filter(|s| scope.map_or(true, |scope| s.scope == scope))
            .cloned()
            .collect();
        schemes.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(page_slice(&schemes, page, per_page))
    }

    async fn patch_scheme(&self, scheme: &Scheme, patch: &SchemePatch) -> AppResult<Scheme> {
        self.record("patch_scheme");

        let mut schemes = self.schemes.lock().unwrap();
        let stored = schemes
            .get_mut(&scheme.id)
            .ok_or_else(|| AppError::new("app.scheme.patch.not_found", 404, "scheme not found"))?;

        if let Some(name) = &patch.name {
            stored.name = name.clone();
        }
        if let Some(display_name) = &patch.display_name {
            stored.display_name = display_name.clone();
        }
        if let Some(description) = &patch.description {
            stored.description = description.clone();
        }
        stored.update_at = Some(Utc::now());

        Ok(stored.clone())
    }

    async fn delete_scheme(&self, scheme_id: &str) -> AppResult<Scheme> {
        self.record("delete_scheme");

        let mut scheme = self
            .schemes
            .lock()
            .unwrap()
            .remove(scheme_id)
            .ok_or_else(|| AppError::new("app.scheme.delete.not_found", 404, "scheme not found"))?;
        scheme.delete_at = Some(Utc::now());

        Ok(scheme)
    }

    async fn get_teams_for_scheme_page(
        &self,
        scheme: &Scheme,
        page: u64,
        per_page: u64,
    ) -> AppResult<Vec<Team>> {
        self.record("get_teams_for_scheme_page");

        let teams = self.scheme_teams.lock().unwrap();
        Ok(page_slice(
            teams.get(&scheme.id).map_or(&[][..], |v| v.as_slice()),
            page,
            per_page,
        ))
    }

    async fn get_channels_for_scheme_page(
        &self,
        scheme: &Scheme,
        page: u64,
        per_page: u64,
    ) -> AppResult<Vec<Channel>> {
        self.record("get_channels_for_scheme_page");

        let channels = self.scheme_channels.lock().unwrap();
        Ok(page_slice(
            channels.get(&scheme.id).map_or(&[][..], |v| v.as_slice()),
            page,
            per_page,
        ))
    }

    async fn get_preferences_for_user(&self, user_id: &str) -> AppResult<Vec<Preference>> {
        self.record("get_preferences_for_user");

        Ok(self
            .preferences
            .lock()
            .unwrap()
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_preferences_by_category(
        &self,
        user_id: &str,
        category: &str,
    ) -> AppResult<Vec<Preference>> {
        self.record("get_preferences_by_category");

        Ok(self
            .preferences
            .lock()
            .unwrap()
            .get(user_id)
            .map(|rows| rows.iter().filter(|p| p.category == category).cloned().collect())
            .unwrap_or_default())
    }

    async fn get_preference_by_category_and_name(
        &self,
        user_id: &str,
        category: &str,
        name: &str,
    ) -> AppResult<Preference> {
        self.record("get_preference_by_category_and_name");

        self.preferences
            .lock()
            .unwrap()
            .get(user_id)
            .and_then(|rows| {
                rows.iter()
                    .find(|p| p.category == category && p.name == name)
                    .cloned()
            })
            .ok_or_else(|| {
                AppError::new("app.preference.get.not_found", 404, "preference not found")
            })
    }

    async fn update_preferences(&self, user_id: &str, preferences: &[Preference]) -> AppResult<()> {
        self.record("update_preferences");

        let mut store = self.preferences.lock().unwrap();
        let rows = store.entry(user_id.to_string()).or_default();

        for incoming in preferences {
            let mut incoming = incoming.clone();
            incoming.user_id = user_id.to_string();

            match rows
                .iter_mut()
                .find(|p| p.category == incoming.category && p.name == incoming.name)
            {
                Some(existing) => *existing = incoming,
                None => rows.push(incoming),
            }
        }

        Ok(())
    }

    async fn delete_preferences(&self, user_id: &str, preferences: &[Preference]) -> AppResult<()> {
        self.record("delete_preferences");

        let mut store = self.preferences.lock().unwrap();
        if let Some(rows) = store.get_mut(user_id) {
            rows.retain(|p| {
                !preferences
                    .iter()
                    .any(|del| del.category == p.category && del.name == p.name)
            });
        }

        Ok(())
    }

    async fn get_single_post(&self, post_id: &str) -> AppResult<Post> {
        self.record("get_single_post");

        self.posts
            .lock()
            .unwrap()
            .get(post_id)
            .cloned()
            .ok_or_else(|| AppError::new("app.post.get.not_found", 404, "post not found"))
    }

    async fn session_has_permission_to(&self, session: &Session, permission: &Permission) -> bool {
        session.grants(permission)
    }

    async fn session_has_permission_to_user(&self, session: &Session, user_id: &str) -> bool {
        session.user_id == user_id
            || session.grants(&crate::model::permissions::EDIT_OTHER_USERS)
    }

    async fn session_has_permission_to_channel(
        &self,
        session: &Session,
        channel_id: &str,
        permission: &Permission,
    ) -> bool {
        // membership is required; the grant alone is not enough
        let member = self
            .channel_members
            .lock()
            .unwrap()
            .get(channel_id)
            .map_or(false, |members| members.contains(&session.user_id));

        member && session.grants(permission)
    }

    fn license(&self) -> Option<License> {
        self.license.lock().unwrap().clone()
    }
}
