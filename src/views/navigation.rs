//! Sidebar navigation

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub label: &'static str,
    pub href: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavGroup {
    pub label: &'static str,
    pub items: Vec<NavItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sidebar {
    pub title: String,
    pub groups: Vec<NavGroup>,
    /// Preferred or first name of the signed-in user
    pub display_name: Option<String>,
}

const USER_ACTIONS: &[(&str, &str)] = &[
    ("Home", "/"),
    ("Events", "/events"),
    ("Resources", "/resources"),
    ("Settings", "/settings"),
];

const ADMIN_ACTIONS: &[(&str, &str)] = &[
    ("Admin", "/admin"),
    ("Events", "/admin/events"),
    ("Resources", "/admin/resources"),
    ("Users", "/admin/users"),
    ("Tags", "/admin/tags"),
];

fn group(label: &'static str, actions: &[(&'static str, &'static str)]) -> NavGroup {
    NavGroup {
        label,
        items: actions
            .iter()
            .map(|&(label, href)| NavItem { label, href })
            .collect(),
    }
}

/// Build the sidebar; the admin group only appears for admins
pub fn sidebar(app_name: &str, is_admin: bool, display_name: Option<String>) -> Sidebar {
    let mut groups = vec![group("User Actions", USER_ACTIONS)];
    if is_admin {
        groups.push(group("Admin Actions", ADMIN_ACTIONS));
    }
    Sidebar {
        title: app_name.to_string(),
        groups,
        display_name,
    }
}
