//! 역할 및 인증 주체(Principal) 정의.
//!
//! 역할 간 상하 관계는 없습니다. "역할 X 보유"는 항상
//! 주체의 역할 집합과 {X}의 교집합 여부로 판단합니다.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// 사용자 역할.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// 일반 구매자
    User,
    /// 판매자 - 상점/상품 등록
    Seller,
    /// 관리자 - 판매자 승인, 계정 정지
    Admin,
    /// 최고 관리자
    SuperAdmin,
}

impl Role {
    /// 모든 역할.
    pub const ALL: [Role; 4] = [Role::User, Role::Seller, Role::Admin, Role::SuperAdmin];

    /// 대문자 역할 이름 반환.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Seller => "SELLER",
            Role::Admin => "ADMIN",
            Role::SuperAdmin => "SUPER_ADMIN",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 인증된 주체.
///
/// 식별자와 비어 있지 않은 역할 집합으로 구성됩니다.
/// 토큰에서 복원된 경우 역할은 발급 시점의 스냅샷입니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// 고유 식별자 (username)
    pub username: String,
    /// 역할 집합
    pub roles: BTreeSet<Role>,
}

impl Principal {
    /// 새 Principal 생성. 역할 집합이 비어 있으면 `None`.
    pub fn new(username: impl Into<String>, roles: impl IntoIterator<Item = Role>) -> Option<Self> {
        let roles: BTreeSet<Role> = roles.into_iter().collect();
        if roles.is_empty() {
            return None;
        }
        Some(Self {
            username: username.into(),
            roles,
        })
    }

    /// 특정 역할 보유 여부.
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// 주어진 역할 중 하나라도 보유하는지 확인.
    pub fn has_any_role(&self, required: &BTreeSet<Role>) -> bool {
        !self.roles.is_disjoint(required)
    }
}
