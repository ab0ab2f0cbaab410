//! Selected and expanded menu items.
//!
//! Matching runs in three phases and stops at the first one that selects an item:
//! 1. exact match of path and query, ignoring index page state (sort, page, query, filters)
//! 2. items whose URL ends with the index URL of the current CRUD controller, with the query
//! 3. the same without the query
//!
//! Sections never match and empty URLs never suffix-match.

use serde_json::{Map, Value};

use super::MenuItem;
use crate::action::INDEX;
use crate::context::AdminContext;
use crate::http::query::{build_query, parse_query, sorted};
use crate::option;

const IGNORED_QUERY_PARAMETERS: [&str; 4] = [option::SORT, option::PAGE, option::QUERY, option::FILTERS];

/// Admin attributes, replaced when the index URL is synthesized.
const ADMIN_QUERY_PARAMETERS: [&str; 6] = [
    option::DASHBOARD_CONTROLLER_FQCN,
    option::CRUD_CONTROLLER_FQCN,
    option::CRUD_ACTION,
    option::ENTITY_ID,
    option::REFERRER,
    option::ROUTE_NAME,
];

#[derive(Debug, Default, Clone, Copy)]
pub struct MenuItemMatcher;

impl MenuItemMatcher {
    pub fn mark_selected_menu_item(&self, items: &mut [MenuItem], context: &AdminContext) {
        let request = context.request();
        let current = normalized(&request.path, &request.query);

        let mut index_urls = Vec::new();
        if let Some(crud) = context.crud() {
            let index = context
                .url_generator()
                .unset_all()
                .set_dashboard(context.dashboard_fqcn())
                .set_controller(crud.controller_fqcn.clone())
                .set_action(INDEX);

            let mut query = filtered(&request.query);
            query.retain(|key, _| !ADMIN_QUERY_PARAMETERS.contains(&key.as_str()));
            index_urls.push(index.clone().set_all(query).generate_url());
            index_urls.push(index.generate_url());
        }

        self.mark_selected(items, &current, &index_urls);
    }

    /// Marks the item matching `current` (or one of `index_urls`) as selected,
    /// then expands its ancestors.
    pub fn mark_selected(&self, items: &mut [MenuItem], current: &str, index_urls: &[String]) {
        let selected = select_exact(items, current)
            || index_urls
                .iter()
                .filter(|url| !url.is_empty())
                .any(|url| select_suffix(items, url));
        if selected {
            mark_expanded(items);
        }
    }
}

fn select_exact(items: &mut [MenuItem], current: &str) -> bool {
    for item in items.iter_mut() {
        if item.is_section() {
            continue;
        }
        if select_exact(&mut item.sub_items, current) {
            return true;
        }
        if !item.link_url.is_empty() && normalized_url(&item.link_url) == current {
            item.selected = true;
            return true;
        }
    }
    false
}

fn select_suffix(items: &mut [MenuItem], index_url: &str) -> bool {
    for item in items.iter_mut() {
        if item.is_section() {
            continue;
        }
        if select_suffix(&mut item.sub_items, index_url) {
            return true;
        }
        if !item.link_url.is_empty() && item.link_url.ends_with(index_url) {
            item.selected = true;
            return true;
        }
    }
    false
}

/// Sets `expanded` on every ancestor of a selected item; true when `items` holds one.
fn mark_expanded(items: &mut [MenuItem]) -> bool {
    let mut found = false;
    for item in items.iter_mut() {
        if mark_expanded(&mut item.sub_items) {
            item.expanded = true;
            found = true;
        }
        found |= item.selected;
    }
    found
}

fn filtered(query: &Map<String, Value>) -> Map<String, Value> {
    let mut query = query.clone();
    query.retain(|key, _| !IGNORED_QUERY_PARAMETERS.contains(&key.as_str()));
    query
}

fn normalized(path: &str, query: &Map<String, Value>) -> String {
    let query = build_query(&sorted(&filtered(query)));
    if query.is_empty() {
        path.to_string()
    } else {
        format!("{path}?{query}")
    }
}

/// Path and normalized query of a menu URL; the origin of absolute URLs is dropped.
fn normalized_url(url: &str) -> String {
    let relative = match url.split_once("://") {
        Some((_, rest)) => rest.find('/').map_or("/", |i| &rest[i..]),
        None => url,
    };
    let (path, query) = relative.split_once('?').unwrap_or((relative, ""));
    normalized(path, &parse_query(query))
}
