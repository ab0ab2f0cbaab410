//! Resolves configured menu items for the current request.

use std::sync::Arc;

use serde_json::Value;

use super::{MainMenu, MenuItem, MenuItemMatcher, MenuItemType, UserMenu};
use crate::context::AdminContext;
use crate::i18n::Translator;
use crate::option;
use crate::security::{permission, AuthSubject, AuthorizationChecker};

pub struct MenuFactory {
    authorization: Arc<dyn AuthorizationChecker>,
    translator: Arc<dyn Translator>,
    matcher: MenuItemMatcher,
}

impl std::fmt::Debug for MenuFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MenuFactory").finish_non_exhaustive()
    }
}

impl MenuFactory {
    pub fn new(authorization: Arc<dyn AuthorizationChecker>, translator: Arc<dyn Translator>) -> Self {
        Self {
            authorization,
            translator,
            matcher: MenuItemMatcher,
        }
    }

    pub fn create_main_menu(&self, context: &AdminContext, items: Vec<MenuItem>) -> MainMenu {
        let mut items = self.build_items(context, items);
        self.matcher.mark_selected_menu_item(&mut items, context);
        MainMenu { items }
    }

    pub fn create_user_menu(&self, context: &AdminContext, mut menu: UserMenu) -> UserMenu {
        menu.items = self.build_items(context, std::mem::take(&mut menu.items));
        menu
    }

    /// Drops items the user may not see, translates labels and resolves URLs.
    fn build_items(&self, context: &AdminContext, items: Vec<MenuItem>) -> Vec<MenuItem> {
        items
            .into_iter()
            .filter(|item| {
                self.authorization.is_granted(
                    context.user(),
                    permission::VIEW_MENU_ITEM,
                    AuthSubject::MenuItem(item),
                )
            })
            .map(|mut item| {
                if !item.label.is_empty() {
                    item.label = context
                        .i18n()
                        .trans(self.translator.as_ref(), &item.label, &item.translation_parameters);
                }
                item.link_url = self.generate_url(context, &item);
                let sub_items = std::mem::take(&mut item.sub_items);
                item.sub_items = self.build_items(context, sub_items);
                item
            })
            .collect()
    }

    fn generate_url(&self, context: &AdminContext, item: &MenuItem) -> String {
        let dashboard_url = || {
            context
                .url_generator()
                .unset_all()
                .set_dashboard(context.dashboard_fqcn())
        };

        match item.item_type {
            MenuItemType::Dashboard
            | MenuItemType::AccessImpersonation
            | MenuItemType::ExitImpersonation => dashboard_url()
                .set_all(item.route_parameters.clone())
                .generate_url(),
            MenuItemType::Crud => {
                let mut params = item.route_parameters.clone();
                let entity = params
                    .shift_remove(option::ENTITY_FQCN)
                    .and_then(|v| v.as_str().map(str::to_string));
                let explicit = params
                    .get(option::CRUD_CONTROLLER_FQCN)
                    .and_then(Value::as_str)
                    .map(str::to_string);
                let controller = explicit.or_else(|| {
                    entity
                        .as_deref()
                        .and_then(|entity| context.routes().cruds_for_entity(entity).into_iter().next())
                });
                let Some(controller) = controller else {
                    tracing::warn!(
                        label = %item.label,
                        entity = ?entity,
                        "No CRUD controller manages the entity of this menu item"
                    );
                    return String::new();
                };
                params.insert(option::CRUD_CONTROLLER_FQCN.into(), Value::String(controller));
                dashboard_url().set_all(params).generate_url()
            }
            MenuItemType::Route => match &item.route_name {
                Some(route_name) => dashboard_url()
                    .set_route(route_name.clone(), item.route_parameters.clone())
                    .generate_url(),
                None => String::new(),
            },
            MenuItemType::Url => item.link_url.clone(),
            MenuItemType::Section | MenuItemType::Submenu => String::new(),
        }
    }
}
