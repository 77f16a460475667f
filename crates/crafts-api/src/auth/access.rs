//! 경로 기반 접근 제어 매트릭스.
//!
//! 순서가 있는 규칙 목록을 위에서부터 검사하며, 처음 일치한 규칙이
//! 결과를 결정합니다. 일치하는 규칙이 없으면 인증만 요구합니다.

use std::collections::BTreeSet;

use super::{Principal, Role};

/// 경로 패턴.
///
/// - `/a/b`: 전체 경로가 정확히 일치해야 함
/// - `/a/**`: `/a` 자신과 `/a/` 아래의 모든 경로
///
/// 대소문자를 구분합니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPattern {
    Exact(String),
    Prefix(String),
}

impl PathPattern {
    /// 패턴 문자열 파싱.
    pub fn parse(pattern: &str) -> Self {
        match pattern.strip_suffix("/**") {
            Some(prefix) => PathPattern::Prefix(prefix.to_string()),
            None => PathPattern::Exact(pattern.to_string()),
        }
    }

    /// 경로 일치 여부.
    pub fn matches(&self, path: &str) -> bool {
        match self {
            PathPattern::Exact(exact) => path == exact,
            PathPattern::Prefix(prefix) => match path.strip_prefix(prefix.as_str()) {
                Some(rest) => rest.is_empty() || rest.starts_with('/'),
                None => false,
            },
        }
    }
}

impl std::fmt::Display for PathPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathPattern::Exact(exact) => f.write_str(exact),
            PathPattern::Prefix(prefix) => write!(f, "{}/**", prefix),
        }
    }
}

/// 접근 모드.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessMode {
    /// 검사 없음
    PermitAll,
    /// 인증된 주체면 누구나
    AuthenticatedOnly,
    /// 역할 집합이 교집합을 가져야 함
    RoleAny(BTreeSet<Role>),
}

impl AccessMode {
    /// 주체에 대한 판정.
    pub fn decide(&self, principal: Option<&Principal>) -> Decision {
        match (self, principal) {
            (AccessMode::PermitAll, _) => Decision::Allow,
            (_, None) => Decision::DenyUnauthenticated,
            (AccessMode::AuthenticatedOnly, Some(_)) => Decision::Allow,
            (AccessMode::RoleAny(required), Some(principal)) => {
                if principal.has_any_role(required) {
                    Decision::Allow
                } else {
                    Decision::DenyForbidden
                }
            }
        }
    }
}

/// 접근 판정 결과.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    /// 인증 필요 (401)
    DenyUnauthenticated,
    /// 권한 부족 (403)
    DenyForbidden,
}

/// 접근 규칙 하나.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRule {
    pub pattern: PathPattern,
    pub mode: AccessMode,
}

impl AccessRule {
    pub fn new(pattern: &str, mode: AccessMode) -> Self {
        Self {
            pattern: PathPattern::parse(pattern),
            mode,
        }
    }
}

/// 순서가 있는 접근 규칙 목록.
///
/// 부팅 시 구성된 뒤 변경되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessControlMatrix {
    rules: Vec<AccessRule>,
    default_mode: AccessMode,
}

impl AccessControlMatrix {
    /// 규칙 빌더 시작.
    pub fn builder() -> AccessControlMatrixBuilder {
        AccessControlMatrixBuilder::default()
    }

    /// 마켓플레이스 API 접근 정책.
    pub fn marketplace() -> Self {
        use Role::*;

        Self::builder()
            .permit_all(&[
                "/auth/register",
                "/auth/login",
                "/v3/api-docs/**",
                "/swagger-ui/**",
                "/swagger-ui.html",
            ])
            .authenticated(&["/auth/userinfo", "/profile", "/profile/**"])
            .role_any(&["/product/all-with-shops"], &[User, Seller, Admin, SuperAdmin])
            .role_any(&["/auth/user/**"], &[User])
            .role_any(&["/auth/seller/**"], &[Seller])
            .role_any(
                &[
                    "/shop/add",
                    "/shop/my-shops",
                    "/product/add/**",
                    "/product/my-products",
                    "/seller/my-products",
                ],
                &[Seller],
            )
            .role_any(&["/auth/admin/**"], &[Admin, SuperAdmin])
            .role_any(
                &[
                    "/shop/approve/**",
                    "/shop/pending",
                    "/auth/users/pending-sellers",
                    "/auth/users/approved-sellers",
                    "/auth/users/approve/**",
                    "/auth/users/suspend/**",
                    "/admin/**",
                ],
                &[Admin, SuperAdmin],
            )
            .build()
    }

    /// 등록된 규칙 (평가 순서대로).
    pub fn rules(&self) -> &[AccessRule] {
        &self.rules
    }

    /// 경로에 처음 일치하는 규칙.
    pub fn matching_rule(&self, path: &str) -> Option<&AccessRule> {
        self.rules.iter().find(|rule| rule.pattern.matches(path))
    }

    /// 요청 경로와 주체에 대한 접근 판정.
    pub fn evaluate(&self, path: &str, principal: Option<&Principal>) -> Decision {
        let mode = self
            .matching_rule(path)
            .map(|rule| &rule.mode)
            .unwrap_or(&self.default_mode);

        mode.decide(principal)
    }
}

/// [`AccessControlMatrix`] 빌더.
///
/// 호출 순서가 곧 평가 순서입니다.
#[derive(Debug, Default)]
pub struct AccessControlMatrixBuilder {
    rules: Vec<AccessRule>,
}

impl AccessControlMatrixBuilder {
    /// 규칙 하나 추가.
    pub fn rule(mut self, pattern: &str, mode: AccessMode) -> Self {
        self.rules.push(AccessRule::new(pattern, mode));
        self
    }

    pub fn permit_all(self, patterns: &[&str]) -> Self {
        self.patterns(patterns, AccessMode::PermitAll)
    }

    pub fn authenticated(self, patterns: &[&str]) -> Self {
        self.patterns(patterns, AccessMode::AuthenticatedOnly)
    }

    pub fn role_any(self, patterns: &[&str], roles: &[Role]) -> Self {
        let roles: BTreeSet<Role> = roles.iter().copied().collect();
        self.patterns(patterns, AccessMode::RoleAny(roles))
    }

    fn patterns(self, patterns: &[&str], mode: AccessMode) -> Self {
        patterns
            .iter()
            .fold(self, |builder, pattern| builder.rule(pattern, mode.clone()))
    }

    /// 기본 규칙(인증 필요)으로 매트릭스 생성.
    pub fn build(self) -> AccessControlMatrix {
        AccessControlMatrix {
            rules: self.rules,
            default_mode: AccessMode::AuthenticatedOnly,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn principal(roles: &[Role]) -> Principal {
        Principal::new("tester", roles.iter().copied()).unwrap()
    }

    #[test]
    fn test_pattern_parse() {
        assert_eq!(
            PathPattern::parse("/admin/**"),
            PathPattern::Prefix("/admin".to_string())
        );
        assert_eq!(
            PathPattern::parse("/shop/pending"),
            PathPattern::Exact("/shop/pending".to_string())
        );
        assert_eq!(PathPattern::parse("/admin/**").to_string(), "/admin/**");
    }

    #[test]
    fn test_prefix_matching() {
        let pattern = PathPattern::parse("/profile/**");

        assert!(pattern.matches("/profile"));
        assert!(pattern.matches("/profile/"));
        assert!(pattern.matches("/profile/edit/photo"));
        assert!(!pattern.matches("/profiles"));
        assert!(!pattern.matches("/Profile/edit"));
        assert!(!pattern.matches("/api/profile/edit"));
    }

    #[test]
    fn test_exact_matching() {
        let pattern = PathPattern::parse("/shop/pending");

        assert!(pattern.matches("/shop/pending"));
        assert!(!pattern.matches("/shop/pending/"));
        assert!(!pattern.matches("/shop/pending/1"));
        assert!(!pattern.matches("/shop/PENDING"));
    }

    #[test]
    fn test_public_endpoints() {
        let matrix = AccessControlMatrix::marketplace();

        for path in ["/auth/login", "/auth/register", "/swagger-ui/index.html", "/v3/api-docs"] {
            assert_eq!(matrix.evaluate(path, None), Decision::Allow, "{}", path);
            assert_eq!(
                matrix.evaluate(path, Some(&principal(&[Role::User]))),
                Decision::Allow
            );
        }
    }

    #[test]
    fn test_authenticated_only() {
        let matrix = AccessControlMatrix::marketplace();

        assert_eq!(matrix.evaluate("/profile", None), Decision::DenyUnauthenticated);
        assert_eq!(
            matrix.evaluate("/profile/settings", Some(&principal(&[Role::Seller]))),
            Decision::Allow
        );
        assert_eq!(
            matrix.evaluate("/auth/userinfo", Some(&principal(&[Role::User]))),
            Decision::Allow
        );
    }

    #[test]
    fn test_admin_routes() {
        let matrix = AccessControlMatrix::marketplace();

        assert_eq!(
            matrix.evaluate("/shop/pending", Some(&principal(&[Role::User]))),
            Decision::DenyForbidden
        );
        assert_eq!(
            matrix.evaluate("/shop/pending", Some(&principal(&[Role::Admin]))),
            Decision::Allow
        );
        assert_eq!(
            matrix.evaluate("/auth/users/suspend/42", Some(&principal(&[Role::SuperAdmin]))),
            Decision::Allow
        );
        assert_eq!(
            matrix.evaluate("/admin/anything", None),
            Decision::DenyUnauthenticated
        );
    }

    #[test]
    fn test_seller_routes() {
        let matrix = AccessControlMatrix::marketplace();

        assert_eq!(
            matrix.evaluate("/product/add/7", Some(&principal(&[Role::Seller]))),
            Decision::Allow
        );
        assert_eq!(
            matrix.evaluate("/shop/add", Some(&principal(&[Role::Admin]))),
            Decision::DenyForbidden
        );
        assert_eq!(
            matrix.evaluate("/auth/seller/dashboard", Some(&principal(&[Role::User]))),
            Decision::DenyForbidden
        );
    }

    #[test]
    fn test_user_routes_have_no_hierarchy() {
        let matrix = AccessControlMatrix::marketplace();

        assert_eq!(
            matrix.evaluate("/auth/user/orders", Some(&principal(&[Role::User]))),
            Decision::Allow
        );
        assert_eq!(
            matrix.evaluate("/auth/user/orders", Some(&principal(&[Role::SuperAdmin]))),
            Decision::DenyForbidden
        );
    }

    #[test]
    fn test_all_with_shops_for_every_role() {
        let matrix = AccessControlMatrix::marketplace();

        for role in Role::ALL {
            assert_eq!(
                matrix.evaluate("/product/all-with-shops", Some(&principal(&[role]))),
                Decision::Allow
            );
        }
        assert_eq!(
            matrix.evaluate("/product/all-with-shops", None),
            Decision::DenyUnauthenticated
        );
    }

    #[test]
    fn test_default_rule() {
        let matrix = AccessControlMatrix::marketplace();

        assert_eq!(
            matrix.evaluate("/some/unlisted/path", Some(&principal(&[Role::User]))),
            Decision::Allow
        );
        assert_eq!(
            matrix.evaluate("/some/unlisted/path", None),
            Decision::DenyUnauthenticated
        );
        assert!(matrix.matching_rule("/some/unlisted/path").is_none());
    }

    #[test]
    fn test_first_match_wins() {
        let matrix = AccessControlMatrix::builder()
            .permit_all(&["/docs/public"])
            .role_any(&["/docs/**"], &[Role::Admin])
            .build();

        assert_eq!(matrix.evaluate("/docs/public", None), Decision::Allow);
        assert_eq!(
            matrix.evaluate("/docs/internal", Some(&principal(&[Role::User]))),
            Decision::DenyForbidden
        );
    }

    #[test]
    fn test_rule_order_is_preserved() {
        let matrix = AccessControlMatrix::marketplace();
        let first = &matrix.rules()[0];
        let last = matrix.rules().last().unwrap();

        assert_eq!(first.pattern.to_string(), "/auth/register");
        assert_eq!(first.mode, AccessMode::PermitAll);
        assert_eq!(last.pattern.to_string(), "/admin/**");
        assert_eq!(matrix.rules().len(), 24);
    }

    #[test]
    fn test_every_marketplace_rule() {
        use Decision::*;
        use Role::*;

        // (패턴, 일치 경로, 허용 주체, 거부 경로, 거부 주체, 거부 결과)
        #[rustfmt::skip]
        let table: &[(&str, &str, Option<&[Role]>, &str, Option<&[Role]>, Decision)] = &[
            ("/auth/register", "/auth/register", None, "/auth/register/extra", None, DenyUnauthenticated),
            ("/auth/login", "/auth/login", None, "/auth/Login", None, DenyUnauthenticated),
            ("/v3/api-docs/**", "/v3/api-docs/swagger-config", None, "/v3/api-docsx", None, DenyUnauthenticated),
            ("/swagger-ui/**", "/swagger-ui/index.html", None, "/swagger-uix", None, DenyUnauthenticated),
            ("/swagger-ui.html", "/swagger-ui.html", None, "/swagger-ui.htm", None, DenyUnauthenticated),
            ("/auth/userinfo", "/auth/userinfo", Some(&[User]), "/auth/userinfo", None, DenyUnauthenticated),
            ("/profile", "/profile", Some(&[Seller]), "/profile", None, DenyUnauthenticated),
            ("/profile/**", "/profile/edit", Some(&[Admin]), "/profile/edit", None, DenyUnauthenticated),
            ("/product/all-with-shops", "/product/all-with-shops", Some(&[SuperAdmin]), "/product/all-with-shops", None, DenyUnauthenticated),
            ("/auth/user/**", "/auth/user/orders", Some(&[User]), "/auth/user/orders", Some(&[Admin]), DenyForbidden),
            ("/auth/seller/**", "/auth/seller/stats", Some(&[Seller]), "/auth/seller/stats", Some(&[User]), DenyForbidden),
            ("/shop/add", "/shop/add", Some(&[Seller]), "/shop/add", Some(&[User]), DenyForbidden),
            ("/shop/my-shops", "/shop/my-shops", Some(&[Seller]), "/shop/my-shops", Some(&[Admin]), DenyForbidden),
            ("/product/add/**", "/product/add/3", Some(&[Seller]), "/product/add/3", Some(&[SuperAdmin]), DenyForbidden),
            ("/product/my-products", "/product/my-products", Some(&[Seller]), "/product/my-products", Some(&[User]), DenyForbidden),
            ("/seller/my-products", "/seller/my-products", Some(&[Seller]), "/seller/my-products", Some(&[Admin]), DenyForbidden),
            ("/auth/admin/**", "/auth/admin/reports", Some(&[Admin]), "/auth/admin/reports", Some(&[Seller]), DenyForbidden),
            ("/shop/approve/**", "/shop/approve/5", Some(&[SuperAdmin]), "/shop/approve/5", Some(&[Seller]), DenyForbidden),
            ("/shop/pending", "/shop/pending", Some(&[Admin]), "/shop/pending", Some(&[User]), DenyForbidden),
            ("/auth/users/pending-sellers", "/auth/users/pending-sellers", Some(&[Admin]), "/auth/users/pending-sellers", Some(&[Seller]), DenyForbidden),
            ("/auth/users/approved-sellers", "/auth/users/approved-sellers", Some(&[SuperAdmin]), "/auth/users/approved-sellers", Some(&[User]), DenyForbidden),
            ("/auth/users/approve/**", "/auth/users/approve/9", Some(&[Admin]), "/auth/users/approve/9", Some(&[Seller]), DenyForbidden),
            ("/auth/users/suspend/**", "/auth/users/suspend/9", Some(&[SuperAdmin]), "/auth/users/suspend/9", Some(&[User]), DenyForbidden),
            ("/admin/**", "/admin/users", Some(&[Admin]), "/admin/users", None, DenyUnauthenticated),
        ];

        let matrix = AccessControlMatrix::marketplace();
        assert_eq!(table.len(), matrix.rules().len());

        for (rule, (pattern, path, allowed, denied_path, denied_roles, denied)) in
            matrix.rules().iter().zip(table)
        {
            assert_eq!(rule.pattern.to_string(), *pattern);

            let matched = matrix.matching_rule(path).unwrap();
            assert_eq!(matched.pattern.to_string(), *pattern, "{}", path);

            let allowed = (*allowed).map(principal);
            assert_eq!(matrix.evaluate(path, allowed.as_ref()), Allow, "{}", path);

            let denied_principal = (*denied_roles).map(principal);
            assert_eq!(
                matrix.evaluate(denied_path, denied_principal.as_ref()),
                *denied,
                "{} as {:?}",
                denied_path,
                denied_roles
            );
        }
    }

    proptest! {
        #[test]
        fn prop_prefix_matches_any_suffix(suffix in "[a-z0-9/_-]{0,24}") {
            let pattern = PathPattern::parse("/admin/**");
            let path = format!("/admin/{}", suffix);
            prop_assert!(pattern.matches(&path));
        }

        #[test]
        fn prop_prefix_rejects_sibling_paths(tail in "[a-z0-9_-]{1,16}") {
            let pattern = PathPattern::parse("/admin/**");
            let path = format!("/admin{}", tail);
            prop_assert!(!pattern.matches(&path));
        }

        #[test]
        fn prop_permit_all_ignores_principal(role_idx in 0usize..4, authenticated in any::<bool>()) {
            let matrix = AccessControlMatrix::marketplace();
            let principal = principal(&[Role::ALL[role_idx]]);
            let principal = authenticated.then_some(&principal);
            prop_assert_eq!(matrix.evaluate("/auth/login", principal), Decision::Allow);
        }

        #[test]
        fn prop_anonymous_never_allowed_off_public_routes(path in "/[a-z]{1,8}(/[a-z0-9]{1,8}){0,3}") {
            let matrix = AccessControlMatrix::marketplace();
            let public = matches!(
                matrix.matching_rule(&path).map(|rule| &rule.mode),
                Some(AccessMode::PermitAll)
            );
            prop_assume!(!public);
            prop_assert_eq!(matrix.evaluate(&path, None), Decision::DenyUnauthenticated);
        }
    }
}
