// JSON-file backed role directory.
//
// The file holds role assignments and recipient profiles:
// { "roles": [{ "user_id": 1, "role": "saasSuperAdmin" }], "profiles": [...] }
// It is read once at startup.

use crate::core::moderation::{
    ModerationError, RecipientProfile, RoleAssignment, RoleDirectory, Scope, UserId,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// On-disk shape of the directory file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoleSnapshot {
    #[serde(default)]
    pub roles: Vec<RoleAssignment>,
    #[serde(default)]
    pub profiles: Vec<RecipientProfile>,
}

pub struct JsonRoleDirectory {
    roles: Vec<RoleAssignment>,
    profiles: HashMap<UserId, RecipientProfile>,
}

impl JsonRoleDirectory {
    /// Load a directory file. A missing file yields an empty directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModerationError> {
        let path = path.as_ref();
        let snapshot = if path.exists() {
            let file = std::fs::File::open(path)
                .map_err(|e| ModerationError::RoleLookupError(e.to_string()))?;
            serde_json::from_reader(file)
                .map_err(|e| ModerationError::RoleLookupError(e.to_string()))?
        } else {
            tracing::warn!(path = %path.display(), "Role directory file not found, no admins will be notified");
            RoleSnapshot::default()
        };
        Ok(Self::from_snapshot(snapshot))
    }

    pub fn from_snapshot(snapshot: RoleSnapshot) -> Self {
        let profiles = snapshot
            .profiles
            .into_iter()
            .map(|p| (p.user_id, p))
            .collect();
        Self {
            roles: snapshot.roles,
            profiles,
        }
    }
}

#[async_trait]
impl RoleDirectory for JsonRoleDirectory {
    async fn role_assignments(&self, scope: Scope) -> Result<Vec<RoleAssignment>, ModerationError> {
        Ok(match scope {
            Scope::Global => self.roles.clone(),
            Scope::Subsite(subsite_id) => self
                .roles
                .iter()
                .filter(|r| r.subsite_id == Some(subsite_id))
                .cloned()
                .collect(),
        })
    }

    async fn recipient_profile(
        &self,
        user_id: UserId,
    ) -> Result<Option<RecipientProfile>, ModerationError> {
        Ok(self.profiles.get(&user_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const DIRECTORY: &str = r#"{
        "roles": [
            { "user_id": 1, "role": "saasSuperAdmin" },
            { "user_id": 2, "role": "admin", "subsite_id": 3 },
            { "user_id": 4, "role": "admin", "subsite_id": 9 }
        ],
        "profiles": [
            { "user_id": 1, "account_email": "root@example.org" },
            { "user_id": 2, "public_email": "sub@example.org" }
        ]
    }"#;

    #[tokio::test]
    async fn test_load_and_filter_by_scope() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(DIRECTORY.as_bytes()).unwrap();

        let directory = JsonRoleDirectory::load(file.path()).unwrap();

        assert_eq!(directory.role_assignments(Scope::Global).await.unwrap().len(), 3);
        let subsite = directory.role_assignments(Scope::Subsite(3)).await.unwrap();
        assert_eq!(subsite.len(), 1);
        assert_eq!(subsite[0].user_id, 2);

        let profile = directory.recipient_profile(2).await.unwrap().unwrap();
        assert_eq!(profile.admin_email(), Some("sub@example.org"));
        assert!(directory.recipient_profile(4).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let directory = JsonRoleDirectory::load(dir.path().join("roles.json")).unwrap();
        assert!(directory.role_assignments(Scope::Global).await.unwrap().is_empty());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();
        assert!(matches!(
            JsonRoleDirectory::load(file.path()),
            Err(ModerationError::RoleLookupError(_))
        ));
    }
}
