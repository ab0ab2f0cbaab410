//! Per-page action configuration.

use std::collections::{BTreeMap, HashMap};

use super::{
    Action, ActionDto, Page, BATCH_DELETE, DELETE, EDIT, INDEX, NEW, SAVE_AND_ADD_ANOTHER, SAVE_AND_CONTINUE,
    SAVE_AND_RETURN,
};

/// Actions displayed on each CRUD page, in display order.
#[derive(Debug, Clone, Default)]
pub struct Actions {
    pages: BTreeMap<Page, Vec<ActionDto>>,
    disabled: Vec<String>,
    permissions: HashMap<String, String>,
}

impl Actions {
    /// No actions at all.
    pub fn new() -> Self {
        Self::default()
    }

    /// The actions every dashboard starts from.
    pub fn default_config() -> Self {
        Self::new()
            .add(
                Page::Index,
                Action::new(NEW).set_label("Create").set_icon("fa fa-plus").create_as_global_action(),
            )
            .add(Page::Index, Action::new(EDIT))
            .add(Page::Index, Action::new(DELETE).set_icon("fa fa-trash-o"))
            .add(
                Page::Index,
                Action::new(BATCH_DELETE)
                    .set_label("Delete")
                    .set_icon("fa fa-trash-o")
                    .create_as_batch_action(),
            )
            .add(Page::Detail, Action::new(EDIT))
            .add(
                Page::Detail,
                Action::new(INDEX)
                    .set_label("Back to listing")
                    .create_as_global_action(),
            )
            .add(Page::Detail, Action::new(DELETE).set_icon("fa fa-trash-o"))
            .add(Page::Edit, save_action(SAVE_AND_RETURN, "Save changes", EDIT))
            .add(Page::Edit, save_action(SAVE_AND_CONTINUE, "Save and continue editing", EDIT))
            .add(Page::New, save_action(SAVE_AND_RETURN, "Create", NEW))
            .add(Page::New, save_action(SAVE_AND_ADD_ANOTHER, "Create and add another", NEW))
    }

    /// Adds `action` to `page`, replacing an action with the same name.
    pub fn add(mut self, page: Page, action: impl Into<ActionDto>) -> Self {
        let action = action.into();
        let actions = self.pages.entry(page).or_default();
        match actions.iter_mut().find(|a| a.name == action.name) {
            Some(existing) => *existing = action,
            None => actions.push(action),
        }
        self
    }

    pub fn remove(mut self, page: Page, name: &str) -> Self {
        if let Some(actions) = self.pages.get_mut(&page) {
            actions.retain(|a| a.name != name);
        }
        self
    }

    /// Rebuilds the action `name` of `page`; unknown actions are left alone.
    pub fn update<F>(mut self, page: Page, name: &str, update: F) -> Self
    where
        F: FnOnce(Action) -> Action,
    {
        if let Some(actions) = self.pages.get_mut(&page) {
            if let Some(position) = actions.iter().position(|a| a.name == name) {
                let action = Action::from(actions[position].clone());
                actions[position] = update(action).into_dto();
            }
        }
        self
    }

    /// Disables actions on every page.
    pub fn disable<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            let name = name.into();
            if !self.disabled.contains(&name) {
                self.disabled.push(name);
            }
        }
        self
    }

    pub fn set_permission(mut self, name: impl Into<String>, role: impl Into<String>) -> Self {
        self.permissions.insert(name.into(), role.into());
        self
    }

    pub fn is_disabled(&self, name: &str) -> bool {
        self.disabled.iter().any(|d| d == name)
    }

    /// Enabled actions of `page` with their permissions applied.
    pub fn get_actions(&self, page: Page) -> Vec<ActionDto> {
        self.pages
            .get(&page)
            .into_iter()
            .flatten()
            .filter(|action| !self.is_disabled(&action.name))
            .map(|action| {
                let mut action = action.clone();
                if let Some(role) = self.permissions.get(&action.name) {
                    action.permission = Some(role.clone());
                }
                action
            })
            .collect()
    }
}

fn save_action(name: &str, label: &str, crud_action: &str) -> Action {
    Action::new(name)
        .set_label(label)
        .render_as_button()
        .link_to_crud_action(crud_action)
        .set_css_class("btn btn-primary")
        .set_html_attribute("type", "submit")
        .set_html_attribute("name", "ea[submit]")
        .set_html_attribute("value", name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::DETAIL;

    fn names(actions: &[ActionDto]) -> Vec<&str> {
        actions.iter().map(|a| a.name.as_str()).collect()
    }

    #[test]
    fn test_default_config() {
        let actions = Actions::default_config();
        assert_eq!(names(&actions.get_actions(Page::Index)), [NEW, EDIT, DELETE, BATCH_DELETE]);
        assert_eq!(names(&actions.get_actions(Page::Detail)), [EDIT, INDEX, DELETE]);
        assert_eq!(names(&actions.get_actions(Page::Edit)), [SAVE_AND_RETURN, SAVE_AND_CONTINUE]);
        assert_eq!(names(&actions.get_actions(Page::New)), [SAVE_AND_RETURN, SAVE_AND_ADD_ANOTHER]);
    }

    #[test]
    fn test_disable_and_permissions() {
        let actions = Actions::default_config()
            .disable([DELETE, BATCH_DELETE])
            .set_permission(EDIT, "ROLE_EDITOR")
            .add(Page::Index, Action::new(DETAIL).set_label("Show"));

        let index = actions.get_actions(Page::Index);
        assert_eq!(names(&index), [NEW, EDIT, DETAIL]);
        assert_eq!(index[1].permission(), Some("ROLE_EDITOR"));
        assert!(actions.is_disabled(DELETE));
    }

    #[test]
    fn test_update_and_remove() {
        let actions = Actions::default_config()
            .update(Page::Index, EDIT, |a| a.set_icon("fa fa-pencil").hide_label())
            .update(Page::Index, "unknown", |a| a.set_label("never"))
            .remove(Page::Detail, INDEX);

        let edit = &actions.get_actions(Page::Index)[1];
        assert_eq!(edit.icon.as_deref(), Some("fa fa-pencil"));
        assert!(edit.label.is_none());
        assert_eq!(names(&actions.get_actions(Page::Detail)), [EDIT, DELETE]);
    }
}
