//! Page view models
//!
//! Every dashboard page is served as one of these JSON documents. Builders
//! are pure: handlers fetch the data and hand it to a `Presenter`.

use chrono::FixedOffset;
use serde::Serialize;
use uuid::Uuid;

use super::dialog::{event_dialog, resource_dialog, tag_dialog, ConfirmDialog, FormDialog};
use super::filter::{filter_by_tag, TagSelection, ALL};
use super::format::{
    format_date, format_date_time, format_event_date, is_same_day, month_day, offset_from_minutes,
};
use super::navigation::{NavItem, Sidebar};
use crate::config::AppConfig;
use crate::models::{Event, Profile, Resource, ResourceWithTags, Role, Tag};
use crate::utils::helpers::{pluralize, truncate_text, url_host};

/// Characters of a description shown on a card
const SUMMARY_CHARS: usize = 120;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmptyState {
    pub title: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateBadge {
    pub month: String,
    pub day: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventCard {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub summary: Option<String>,
    pub location: String,
    pub badge: DateBadge,
    /// Start, or `start - end` when the event spans days
    pub when: String,
    /// `"Mon, Jan 15"`
    pub date: String,
    /// `"6:00 PM - 8:00 PM"`
    pub time: String,
    /// Only set for images on an allowed host
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagChip {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceCard {
    pub id: Uuid,
    pub name: String,
    pub link: String,
    pub description: Option<String>,
    pub summary: Option<String>,
    pub is_pinned: bool,
    pub created: Option<String>,
    pub tags: Vec<TagChip>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HomePage {
    pub sidebar: Sidebar,
    pub greeting: String,
    pub events: Vec<EventCard>,
    pub events_empty: Option<EmptyState>,
    pub pinned_resources: Vec<ResourceCard>,
    pub resources_empty: Option<EmptyState>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventsPage {
    pub sidebar: Sidebar,
    pub title: &'static str,
    pub subtitle: String,
    pub events: Vec<EventCard>,
    pub empty: Option<EmptyState>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagTab {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourcesPage {
    pub sidebar: Sidebar,
    pub tabs: Vec<TagTab>,
    pub selection: TagSelection,
    pub resources: Vec<ResourceCard>,
    pub empty: Option<EmptyState>,
}

/// Current values of the profile settings form
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileDefaults {
    pub preferred_name: String,
    pub major: String,
    pub graduation_year: String,
    pub instrument: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettingsPage {
    pub sidebar: Sidebar,
    pub email: Option<String>,
    pub action: &'static str,
    pub form: ProfileDefaults,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminIndexPage {
    pub sidebar: Sidebar,
    pub sections: Vec<NavItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminEventRow {
    pub card: EventCard,
    pub edit_dialog: FormDialog,
    pub delete_dialog: ConfirmDialog,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminEventsPage {
    pub sidebar: Sidebar,
    pub count_label: String,
    pub create_dialog: FormDialog,
    pub events: Vec<AdminEventRow>,
    pub empty: Option<EmptyState>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminResourceRow {
    pub card: ResourceCard,
    pub edit_dialog: FormDialog,
    pub delete_dialog: ConfirmDialog,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminResourcesPage {
    pub sidebar: Sidebar,
    pub count_label: String,
    pub create_dialog: FormDialog,
    pub resources: Vec<AdminResourceRow>,
    pub empty: Option<EmptyState>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminUserRow {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub major: Option<String>,
    pub graduation_year: Option<i32>,
    pub role: Role,
    /// Own row: role select and delete are disabled
    pub is_self: bool,
    pub role_action: String,
    pub delete_dialog: Option<ConfirmDialog>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminUsersPage {
    pub sidebar: Sidebar,
    pub count_label: String,
    pub users: Vec<AdminUserRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminTagRow {
    pub tag: Tag,
    pub edit_dialog: FormDialog,
    pub delete_dialog: ConfirmDialog,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminTagsPage {
    pub sidebar: Sidebar,
    pub count_label: String,
    pub create_dialog: FormDialog,
    pub tags: Vec<AdminTagRow>,
}

/// Builds page view models in the configured offset and image allowlist
#[derive(Debug, Clone)]
pub struct Presenter {
    app_name: String,
    offset: FixedOffset,
    image_domains: Vec<String>,
}

impl Presenter {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            app_name: config.name.clone(),
            offset: offset_from_minutes(config.utc_offset_minutes),
            image_domains: config.image_domains.clone(),
        }
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    fn allowed_image(&self, url: Option<&str>) -> Option<String> {
        let url = url.filter(|u| !u.is_empty())?;
        let host = url_host(url)?;
        self.image_domains
            .iter()
            .any(|domain| domain.eq_ignore_ascii_case(&host))
            .then(|| url.to_string())
    }

    pub fn event_card(&self, event: &Event) -> EventCard {
        let (month, day) = month_day(event.start_time, self.offset);
        let (date, time) = format_event_date(event.start_time, event.end_time, self.offset);
        let when = if is_same_day(event.start_time, event.end_time, self.offset) {
            format_date_time(event.start_time, self.offset)
        } else {
            format!(
                "{} - {}",
                format_date_time(event.start_time, self.offset),
                format_date_time(event.end_time, self.offset)
            )
        };

        EventCard {
            id: event.id,
            title: event.title.clone(),
            description: event.description.clone(),
            summary: event.description.as_deref().map(|d| truncate_text(d, SUMMARY_CHARS)),
            location: event.location.clone(),
            badge: DateBadge { month, day },
            when,
            date,
            time,
            image_url: self.allowed_image(event.image_url.as_deref()),
        }
    }

    pub fn resource_card(&self, resource: &Resource, tags: &[Tag]) -> ResourceCard {
        ResourceCard {
            id: resource.id,
            name: resource.name.clone(),
            link: resource.link.clone(),
            description: resource.description.clone(),
            summary: resource
                .description
                .as_deref()
                .map(|d| truncate_text(d, SUMMARY_CHARS)),
            is_pinned: resource.is_pinned,
            created: resource.created_at.map(|at| format_date(at, self.offset)),
            tags: tags
                .iter()
                .map(|t| TagChip {
                    id: t.id,
                    name: t.name.clone(),
                })
                .collect(),
        }
    }

    pub fn home(
        &self,
        sidebar: Sidebar,
        first_name: Option<&str>,
        events: &[Event],
        pinned: &[Resource],
    ) -> HomePage {
        let greeting = match first_name {
            Some(name) if !name.is_empty() => format!("Welcome to {}, {}.", self.app_name, name),
            _ => format!("Welcome to {}.", self.app_name),
        };

        HomePage {
            sidebar,
            greeting,
            events: events.iter().map(|e| self.event_card(e)).collect(),
            events_empty: events.is_empty().then_some(EmptyState {
                title: "No upcoming events",
                message: "Check back soon for new events!",
            }),
            pinned_resources: pinned.iter().map(|r| self.resource_card(r, &[])).collect(),
            resources_empty: pinned.is_empty().then_some(EmptyState {
                title: "No pinned resources",
                message: "Pinned resources will show up here.",
            }),
        }
    }

    pub fn events(&self, sidebar: Sidebar, events: &[Event]) -> EventsPage {
        EventsPage {
            sidebar,
            title: "Upcoming Events",
            subtitle: format!("Discover what's happening next with {}", self.app_name),
            events: events.iter().map(|e| self.event_card(e)).collect(),
            empty: events.is_empty().then_some(EmptyState {
                title: "No upcoming events",
                message: "Check back soon for new events!",
            }),
        }
    }

    pub fn resources(
        &self,
        sidebar: Sidebar,
        tags: &[Tag],
        resources: &[ResourceWithTags],
        selection: TagSelection,
    ) -> ResourcesPage {
        let mut tabs = vec![TagTab {
            value: ALL.to_string(),
            label: "All".to_string(),
            selected: selection == TagSelection::All,
        }];
        tabs.extend(tags.iter().map(|tag| TagTab {
            value: tag.id.to_string(),
            label: tag.name.clone(),
            selected: selection == TagSelection::Tag(tag.id),
        }));

        let filtered: Vec<ResourceCard> = filter_by_tag(resources, &selection)
            .into_iter()
            .map(|r| self.resource_card(&r.resource, &r.tags))
            .collect();

        ResourcesPage {
            sidebar,
            tabs,
            selection,
            empty: filtered.is_empty().then_some(EmptyState {
                title: "No resources found",
                message: "Try a different tag.",
            }),
            resources: filtered,
        }
    }

    pub fn settings(&self, sidebar: Sidebar, profile: Option<&Profile>) -> SettingsPage {
        let text = |value: Option<&String>| value.cloned().unwrap_or_default();
        SettingsPage {
            sidebar,
            email: profile.and_then(|p| p.email.clone()),
            action: "/settings/profile",
            form: ProfileDefaults {
                preferred_name: text(profile.and_then(|p| p.preferred_name.as_ref())),
                major: text(profile.and_then(|p| p.major.as_ref())),
                graduation_year: profile
                    .and_then(|p| p.graduation_year)
                    .map(|y| y.to_string())
                    .unwrap_or_default(),
                instrument: text(profile.and_then(|p| p.instrument.as_ref())),
            },
        }
    }

    pub fn admin_index(&self, sidebar: Sidebar) -> AdminIndexPage {
        let sections = sidebar
            .groups
            .iter()
            .filter(|g| g.label == "Admin Actions")
            .flat_map(|g| g.items.iter().filter(|i| i.href != "/admin").cloned())
            .collect();
        AdminIndexPage { sidebar, sections }
    }

    pub fn admin_events(&self, sidebar: Sidebar, events: &[Event]) -> AdminEventsPage {
        AdminEventsPage {
            sidebar,
            count_label: format!("{} total", pluralize(events.len(), "event")),
            create_dialog: event_dialog(None, self.offset),
            events: events
                .iter()
                .map(|event| AdminEventRow {
                    card: self.event_card(event),
                    edit_dialog: event_dialog(Some(event), self.offset),
                    delete_dialog: ConfirmDialog::delete(
                        "Event",
                        &event.title,
                        format!("/admin/events/{}/delete", event.id),
                    ),
                })
                .collect(),
            empty: events.is_empty().then_some(EmptyState {
                title: "No events yet",
                message: "Add your first event to get started.",
            }),
        }
    }

    pub fn admin_resources(
        &self,
        sidebar: Sidebar,
        resources: &[ResourceWithTags],
        tags: &[Tag],
    ) -> AdminResourcesPage {
        AdminResourcesPage {
            sidebar,
            count_label: format!("{} total", pluralize(resources.len(), "resource")),
            create_dialog: resource_dialog(None, tags),
            resources: resources
                .iter()
                .map(|item| AdminResourceRow {
                    card: self.resource_card(&item.resource, &item.tags),
                    edit_dialog: resource_dialog(Some(item), tags),
                    delete_dialog: ConfirmDialog::delete(
                        "Resource",
                        &item.resource.name,
                        format!("/admin/resources/{}/delete", item.resource.id),
                    ),
                })
                .collect(),
            empty: resources.is_empty().then_some(EmptyState {
                title: "No resources yet",
                message: "Add your first resource to get started.",
            }),
        }
    }

    pub fn admin_users(&self, sidebar: Sidebar, profiles: &[Profile], current_user: Uuid) -> AdminUsersPage {
        AdminUsersPage {
            sidebar,
            count_label: format!("{} total", pluralize(profiles.len(), "user")),
            users: profiles
                .iter()
                .map(|profile| {
                    let name = profile.display_name().unwrap_or("Unnamed").to_string();
                    let is_self = profile.id == current_user;
                    AdminUserRow {
                        id: profile.id,
                        email: profile.email.clone(),
                        major: profile.major.clone(),
                        graduation_year: profile.graduation_year,
                        role: profile.role,
                        is_self,
                        role_action: format!("/admin/users/{}/role", profile.id),
                        delete_dialog: (!is_self).then(|| {
                            ConfirmDialog::delete(
                                "User",
                                &name,
                                format!("/admin/users/{}/delete", profile.id),
                            )
                        }),
                        name,
                    }
                })
                .collect(),
        }
    }

    pub fn admin_tags(&self, sidebar: Sidebar, tags: &[Tag]) -> AdminTagsPage {
        AdminTagsPage {
            sidebar,
            count_label: format!("{} total", pluralize(tags.len(), "tag")),
            create_dialog: tag_dialog(None),
            tags: tags
                .iter()
                .map(|tag| AdminTagRow {
                    tag: tag.clone(),
                    edit_dialog: tag_dialog(Some(tag)),
                    delete_dialog: ConfirmDialog::delete(
                        "Tag",
                        &tag.name,
                        format!("/admin/tags/{}/delete", tag.id),
                    ),
                })
                .collect(),
        }
    }
}
