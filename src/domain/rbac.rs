//! Static role → permission matrix and the route table consulted by the
//! request guards.

use std::fmt;

use uuid::Uuid;

use super::user::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    ProductsRead,
    ProductsCreate,
    ProductsUpdate,
    ProductsDelete,
    OrdersRead,
    OrdersUpdate,
    OrdersDelete,
    UsersRead,
    UsersCreate,
    UsersUpdate,
    UsersDelete,
    AdminRead,
    AdminWrite,
    AdminDelete,
    ArtisansRead,
    ArtisansCreate,
    ArtisansUpdate,
    ArtisansDelete,
    AnalyticsRead,
    AnalyticsExport,
    SystemBackup,
    SystemConfig,
    SystemAudit,
    FinancialRead,
    FinancialWrite,
    ContentRead,
    ContentWrite,
    ContentDelete,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductsRead => "products:read",
            ProductsCreate => "products:create",
            ProductsUpdate => "products:update",
            ProductsDelete => "products:delete",
            OrdersRead => "orders:read",
            OrdersUpdate => "orders:update",
            OrdersDelete => "orders:delete",
            UsersRead => "users:read",
            UsersCreate => "users:create",
            UsersUpdate => "users:update",
            UsersDelete => "users:delete",
            AdminRead => "admin:read",
            AdminWrite => "admin:write",
            AdminDelete => "admin:delete",
            ArtisansRead => "artisans:read",
            ArtisansCreate => "artisans:create",
            ArtisansUpdate => "artisans:update",
            ArtisansDelete => "artisans:delete",
            AnalyticsRead => "analytics:read",
            AnalyticsExport => "analytics:export",
            SystemBackup => "system:backup",
            SystemConfig => "system:config",
            SystemAudit => "system:audit",
            FinancialRead => "financial:read",
            FinancialWrite => "financial:write",
            ContentRead => "content:read",
            ContentWrite => "content:write",
            ContentDelete => "content:delete",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

use Permission::*;

#[rustfmt::skip]
const SUPER_ADMIN: &[Permission] = &[
    ProductsRead, ProductsCreate, ProductsUpdate, ProductsDelete,
    OrdersRead, OrdersUpdate, OrdersDelete,
    UsersRead, UsersCreate, UsersUpdate, UsersDelete,
    AdminRead, AdminWrite, AdminDelete,
    ArtisansRead, ArtisansCreate, ArtisansUpdate, ArtisansDelete,
    AnalyticsRead, AnalyticsExport,
    SystemBackup, SystemConfig, SystemAudit,
    FinancialRead, FinancialWrite,
    ContentRead, ContentWrite, ContentDelete,
];

#[rustfmt::skip]
const ADMIN: &[Permission] = &[
    ProductsRead, ProductsCreate, ProductsUpdate, ProductsDelete,
    OrdersRead, OrdersUpdate,
    UsersRead, UsersUpdate,
    AdminRead, AdminWrite,
    ArtisansRead, ArtisansCreate, ArtisansUpdate,
    AnalyticsRead,
    ContentRead, ContentWrite, ContentDelete,
];

#[rustfmt::skip]
const MANAGER: &[Permission] = &[
    ProductsRead, ProductsUpdate,
    OrdersRead, OrdersUpdate,
    UsersRead,
    AdminRead,
    ArtisansRead,
    AnalyticsRead,
    ContentRead, ContentWrite,
];

// Support may move orders along for customer service but has no admin panel.
#[rustfmt::skip]
const SUPPORT: &[Permission] = &[
    ProductsRead,
    OrdersRead, OrdersUpdate,
    UsersRead,
    ArtisansRead,
    ContentRead,
];

#[rustfmt::skip]
const ARTISAN: &[Permission] = &[
    ProductsRead, ProductsCreate, ProductsUpdate,
    OrdersRead,
    UsersRead,
    AnalyticsRead,
];

#[rustfmt::skip]
const CUSTOMER: &[Permission] = &[
    ProductsRead,
    OrdersRead,
    UsersRead,
    ArtisansRead,
    ContentRead,
];

impl Role {
    pub fn permissions(&self) -> &'static [Permission] {
        match self {
            Role::SuperAdmin => SUPER_ADMIN,
            Role::Admin => ADMIN,
            Role::Manager => MANAGER,
            Role::Support => SUPPORT,
            Role::Artisan => ARTISAN,
            Role::Customer => CUSTOMER,
        }
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }

    pub fn has_all_permissions(&self, permissions: &[Permission]) -> bool {
        permissions.iter().all(|p| self.has_permission(*p))
    }

    pub fn has_any_permission(&self, permissions: &[Permission]) -> bool {
        permissions.iter().any(|p| self.has_permission(*p))
    }
}

// ── Route table ──────────────────────────────────────────────────────────────

struct RouteRule {
    method: &'static str,
    path: &'static str,
    permissions: &'static [Permission],
}

const fn rule(
    method: &'static str,
    path: &'static str,
    permissions: &'static [Permission],
) -> RouteRule {
    RouteRule {
        method,
        path,
        permissions,
    }
}

static ROUTE_PERMISSIONS: &[RouteRule] = &[
    rule("GET", "/api/orders", &[OrdersRead]),
    rule("PUT", "/api/orders", &[OrdersUpdate]),
    rule("DELETE", "/api/orders", &[OrdersDelete]),
    rule("GET", "/api/admin", &[AdminRead]),
    rule("POST", "/api/admin", &[AdminWrite]),
    rule("PUT", "/api/admin", &[AdminWrite]),
    rule("DELETE", "/api/admin", &[AdminDelete]),
    rule("GET", "/api/admin/orders", &[OrdersRead, AdminRead]),
    rule("PUT", "/api/admin/orders", &[OrdersUpdate, AdminWrite]),
    rule("POST", "/api/admin/products", &[ProductsCreate, AdminWrite]),
    rule("PUT", "/api/admin/products", &[ProductsUpdate, AdminWrite]),
    rule("DELETE", "/api/admin/products", &[ProductsDelete, AdminWrite]),
    rule("POST", "/api/admin/artisans", &[ArtisansCreate, AdminWrite]),
    rule("PUT", "/api/admin/artisans", &[ArtisansUpdate, AdminWrite]),
    rule("DELETE", "/api/admin/artisans", &[ArtisansDelete, AdminWrite]),
    rule("POST", "/api/admin/categories", &[ContentWrite, AdminWrite]),
    rule("PUT", "/api/admin/categories", &[ContentWrite, AdminWrite]),
    rule("DELETE", "/api/admin/categories", &[ContentDelete, AdminWrite]),
    rule("POST", "/api/admin/banners", &[ContentWrite, AdminWrite]),
    rule("PUT", "/api/admin/banners", &[ContentWrite, AdminWrite]),
    rule("DELETE", "/api/admin/banners", &[ContentDelete, AdminWrite]),
    rule("POST", "/api/admin/coupons", &[ContentWrite, AdminWrite]),
];

fn is_path_prefix(prefix: &str, path: &str) -> bool {
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Permissions a route requires: exact match first, then the longest
/// matching path prefix for the same method. Unlisted routes require none.
pub fn required_permissions(method: &str, path: &str) -> &'static [Permission] {
    let method = method.to_ascii_uppercase();
    let candidates = ROUTE_PERMISSIONS.iter().filter(|r| r.method == method);

    if let Some(exact) = candidates.clone().find(|r| r.path == path) {
        return exact.permissions;
    }

    candidates
        .filter(|r| is_path_prefix(r.path, path))
        .max_by_key(|r| r.path.len())
        .map(|r| r.permissions)
        .unwrap_or(&[])
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteAccess {
    pub allowed: bool,
    pub missing: Vec<Permission>,
}

pub fn validate_route_access(role: Role, method: &str, path: &str) -> RouteAccess {
    let missing: Vec<Permission> = required_permissions(method, path)
        .iter()
        .copied()
        .filter(|p| !role.has_permission(*p))
        .collect();
    RouteAccess {
        allowed: missing.is_empty(),
        missing,
    }
}

// ── Ownership ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Order,
    Product,
    Profile,
}

/// Ownership facts about a resource, as far as access control cares.
#[derive(Debug, Clone)]
pub struct OwnedResource {
    pub kind: ResourceKind,
    pub owner_id: Option<Uuid>,
    pub artisan_id: Option<String>,
}

impl OwnedResource {
    pub fn order(owner_id: Uuid) -> Self {
        Self {
            kind: ResourceKind::Order,
            owner_id: Some(owner_id),
            artisan_id: None,
        }
    }
}

/// Permission check followed by the role-keyed ownership rule.
pub fn can_access_resource(
    role: Role,
    user_id: Uuid,
    resource: &OwnedResource,
    permission: Permission,
) -> bool {
    if role == Role::SuperAdmin {
        return true;
    }
    if !role.has_permission(permission) {
        return false;
    }
    let owns = resource.owner_id == Some(user_id);
    match role {
        Role::Customer => owns,
        Role::Artisan => {
            owns || (resource.kind == ResourceKind::Product
                && resource.artisan_id.as_deref() == Some(user_id.to_string().as_str()))
        }
        Role::Support | Role::Manager | Role::Admin | Role::SuperAdmin => true,
    }
}
