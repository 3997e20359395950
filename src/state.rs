use folio_config::UserConfig;
use folio_library::{Actor, Coordinator, LibraryAccess};
use folio_render::DEFAULT_MAX_DIMENSION;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Shared state for request handlers.
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<Coordinator>,
    /// Actors keyed by bearer token.
    users: Arc<BTreeMap<String, Actor>>,
    /// Cover requests asking for more pixels on either axis are rejected.
    pub max_cover_dimension: u32,
}

impl AppState {
    pub fn new(coordinator: Arc<Coordinator>, users: BTreeMap<String, Actor>) -> Self {
        Self {
            coordinator,
            users: Arc::new(users),
            max_cover_dimension: DEFAULT_MAX_DIMENSION,
        }
    }

    pub fn with_max_cover_dimension(self, max_cover_dimension: u32) -> Self {
        Self { max_cover_dimension, ..self }
    }

    pub fn from_config(coordinator: Arc<Coordinator>, users: &BTreeMap<String, UserConfig>) -> Self {
        let users = users
            .iter()
            .map(|(token, user)| (token.clone(), actor(user)))
            .collect();
        Self::new(coordinator, users)
    }

    pub fn actor(&self, token: &str) -> Option<&Actor> {
        self.users.get(token)
    }
}

fn actor(user: &UserConfig) -> Actor {
    let libraries = match &user.libraries {
        Some(libraries) => libraries.iter().cloned().collect(),
        None => LibraryAccess::All,
    };
    Actor::new(user.id.clone(), user.can_update, libraries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actor_from_config() {
        let admin = actor(&UserConfig {
            id: "usr_admin".to_string(),
            can_update: true,
            libraries: None,
        });
        assert_eq!(admin, Actor::new("usr_admin", true, LibraryAccess::All));

        let reader = actor(&UserConfig {
            id: "usr_reader".to_string(),
            can_update: false,
            libraries: Some(vec!["lib1".to_string()]),
        });
        assert!(reader.libraries.allows("lib1"));
        assert!(!reader.libraries.allows("lib2"));
        assert!(!reader.can_update);
    }
}
