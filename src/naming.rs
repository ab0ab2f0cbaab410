//! Name derivation for controllers, routes and entities.

/// Last segment of a fully qualified class name (`App\Entity\User` → `User`).
pub fn short_class_name(fqcn: &str) -> &str {
    fqcn.rsplit(['\\', ':']).next().unwrap_or(fqcn)
}

/// `App\Controller\Admin\BlogPostCrudController` → `blog-post`.
pub fn crud_route_path(fqcn: &str) -> String {
    separate_words(&controller_base_name(fqcn), '-')
        .trim_matches('/')
        .to_string()
}

/// `App\Controller\Admin\BlogPostCrudController` → `blog_post`.
pub fn crud_route_name(fqcn: &str) -> String {
    separate_words(&controller_base_name(fqcn), '_')
        .trim_matches('_')
        .to_string()
}

/// Default path of a custom action (`exportCsv` → `/export-csv`).
pub fn action_route_path(action: &str) -> String {
    format!("/{}", separate_words(action, '-'))
}

/// Default name of a custom action (`exportCsv` → `export_csv`).
pub fn action_route_name(action: &str) -> String {
    separate_words(action, '_')
}

/// Route names may only contain ASCII letters, digits, `_` and `-`.
pub fn is_valid_route_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

/// `firstName` / `first_name` → `First name`.
pub fn humanize(property: &str) -> String {
    let spaced = separate_words(property, ' ').replace('_', " ");
    let mut words = spaced.split_whitespace();
    let mut out = String::with_capacity(spaced.len());
    if let Some(first) = words.next() {
        let mut chars = first.chars();
        if let Some(c) = chars.next() {
            out.extend(c.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    for word in words {
        out.push(' ');
        out.push_str(word);
    }
    out
}

fn controller_base_name(fqcn: &str) -> String {
    short_class_name(fqcn)
        .replace("CrudController", "")
        .replace("Controller", "")
}

/// Lowercases `name`, inserting `separator` before every uppercase letter but the first.
fn separate_words(name: &str, separator: char) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if i > 0 && c.is_ascii_uppercase() {
            out.push(separator);
        }
        out.push(c.to_ascii_lowercase());
    }
    out
}
