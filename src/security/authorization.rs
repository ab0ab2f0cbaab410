//! Authorization checks for actions, menu items and entities.

use crate::action::ActionDto;
use crate::entity::EntityDto;
use crate::menu::MenuItem;

use super::user::AdminUser;

/// Permission names passed to [`AuthorizationChecker::is_granted`].
pub mod permission {
    pub const EXECUTE_ACTION: &str = "ADMIN_EXECUTE_ACTION";
    pub const VIEW_MENU_ITEM: &str = "ADMIN_VIEW_MENU_ITEM";
    pub const ACCESS_ENTITY: &str = "ADMIN_ACCESS_ENTITY";
}

/// Role that everybody has, including anonymous users.
pub const PUBLIC_ACCESS: &str = "PUBLIC_ACCESS";

/// What a permission is checked against.
#[derive(Debug, Clone, Copy)]
pub enum AuthSubject<'a> {
    Action {
        action: &'a ActionDto,
        entity: Option<&'a EntityDto>,
    },
    MenuItem(&'a MenuItem),
    Entity(&'a EntityDto),
}

pub trait AuthorizationChecker: Send + Sync {
    fn is_granted(&self, user: Option<&AdminUser>, permission: &str, subject: AuthSubject<'_>) -> bool;
}

/// Grants access when the subject requires no role or the user has the required one.
#[derive(Debug, Default, Clone, Copy)]
pub struct RoleAuthorizationChecker;

impl AuthorizationChecker for RoleAuthorizationChecker {
    fn is_granted(&self, user: Option<&AdminUser>, permission: &str, subject: AuthSubject<'_>) -> bool {
        let required = match subject {
            AuthSubject::Action { action, .. } => action.permission(),
            AuthSubject::MenuItem(item) => item.permission.as_deref(),
            AuthSubject::Entity(entity) => entity.permission.as_deref(),
        };

        let granted = match required {
            None | Some(PUBLIC_ACCESS) => true,
            Some(role) => user.is_some_and(|u| u.has_role(role)),
        };
        if !granted {
            tracing::debug!(
                permission,
                required = ?required,
                user = ?user.map(|u| &u.identifier),
                "Access denied"
            );
        }
        granted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::MenuItem;

    #[test]
    fn test_role_checks() {
        let checker = RoleAuthorizationChecker;
        let admin = AdminUser::new("alice").with_roles(["ROLE_ADMIN"]);
        let editor = AdminUser::new("bob").with_roles(["ROLE_EDITOR"]);

        let open = MenuItem::link_to_url("Docs", None, "/docs").build();
        let restricted = MenuItem::link_to_url("Users", None, "/users")
            .set_permission("ROLE_ADMIN")
            .build();
        let public = MenuItem::link_to_url("Home", None, "/")
            .set_permission(PUBLIC_ACCESS)
            .build();

        let view = permission::VIEW_MENU_ITEM;
        assert!(checker.is_granted(None, view, AuthSubject::MenuItem(&open)));
        assert!(checker.is_granted(None, view, AuthSubject::MenuItem(&public)));
        assert!(checker.is_granted(Some(&admin), view, AuthSubject::MenuItem(&restricted)));
        assert!(!checker.is_granted(Some(&editor), view, AuthSubject::MenuItem(&restricted)));
        assert!(!checker.is_granted(None, view, AuthSubject::MenuItem(&restricted)));
    }
}
