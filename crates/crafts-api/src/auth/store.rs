//! 자격증명 저장소.
//!
//! 인증 코어는 저장소를 구현하지 않고 조회 인터페이스만 사용합니다.
//! 영속 저장소는 외부 협력자이며, 여기서는 인메모리 구현을 제공합니다.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::Role;

/// 저장된 자격증명.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredential {
    /// 고유 식별자
    pub username: String,
    /// PHC 형식 비밀번호 해시
    pub password_hash: String,
    /// 현재 역할 집합
    pub roles: BTreeSet<Role>,
    /// 비활성화된 계정은 인증할 수 없음 (삭제 대신 비활성화)
    pub active: bool,
}

impl StoredCredential {
    /// 활성 상태의 자격증명 생성.
    pub fn new(
        username: impl Into<String>,
        password_hash: impl Into<String>,
        roles: impl IntoIterator<Item = Role>,
    ) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
            roles: roles.into_iter().collect(),
            active: true,
        }
    }

    /// 비활성화 상태로 변경.
    #[must_use]
    pub fn deactivated(mut self) -> Self {
        self.active = false;
        self
    }
}

/// 저장소 에러.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("이미 존재하는 사용자: {0}")]
    Duplicate(String),
    #[error("역할이 비어 있습니다: {0}")]
    EmptyRoles(String),
    #[error("저장소 에러: {0}")]
    Backend(String),
}

/// 자격증명 조회/등록 인터페이스.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// 식별자로 자격증명 조회. 없으면 `Ok(None)`.
    async fn lookup(&self, username: &str) -> Result<Option<StoredCredential>, StoreError>;

    /// 새 자격증명 등록. 식별자가 중복되면 `Duplicate`.
    async fn register(&self, credential: StoredCredential) -> Result<(), StoreError>;
}

/// 인메모리 자격증명 저장소.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    credentials: RwLock<HashMap<String, StoredCredential>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn lookup(&self, username: &str) -> Result<Option<StoredCredential>, StoreError> {
        Ok(self.credentials.read().await.get(username).cloned())
    }

    async fn register(&self, credential: StoredCredential) -> Result<(), StoreError> {
        if credential.roles.is_empty() {
            return Err(StoreError::EmptyRoles(credential.username));
        }

        let mut credentials = self.credentials.write().await;
        if credentials.contains_key(&credential.username) {
            return Err(StoreError::Duplicate(credential.username));
        }
        credentials.insert(credential.username.clone(), credential);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_register_and_lookup() {
        let store = InMemoryCredentialStore::new();
        store
            .register(StoredCredential::new("alice", "$hash", [Role::User]))
            .await
            .unwrap();

        let found = store.lookup("alice").await.unwrap().unwrap();
        assert_eq!(found.username, "alice");
        assert!(found.active);
        assert!(store.lookup("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_lookup_is_case_sensitive() {
        let store = InMemoryCredentialStore::new();
        store
            .register(StoredCredential::new("alice", "$hash", [Role::User]))
            .await
            .unwrap();

        assert!(store.lookup("Alice").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_rejected() {
        let store = InMemoryCredentialStore::new();
        store
            .register(StoredCredential::new("alice", "$hash", [Role::User]))
            .await
            .unwrap();

        let result = store
            .register(StoredCredential::new("alice", "$other", [Role::Seller]))
            .await;
        assert!(matches!(result, Err(StoreError::Duplicate(_))));
        let kept = store.lookup("alice").await.unwrap().unwrap();
        assert_eq!(kept.password_hash, "$hash");
    }

    #[tokio::test]
    async fn test_empty_roles_rejected() {
        let store = InMemoryCredentialStore::new();
        let result = store
            .register(StoredCredential::new("nobody", "$hash", []))
            .await;

        assert!(matches!(result, Err(StoreError::EmptyRoles(_))));
        assert!(store.lookup("nobody").await.unwrap().is_none());
    }
}
