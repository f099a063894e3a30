use chrono::{DateTime, Utc};
use dioxus::prelude::*;

use community_graph::{GithubActivity, LinkScore, MeetupListing};

use super::format::{humanise, shorten};

#[derive(Clone, PartialEq)]
pub struct RepositoryView {
    pub title: String,
    pub url: String,
    pub owner: String,
    pub favorites: i64,
    pub created: String,
    pub updated: String,
}

#[derive(Clone, PartialEq)]
pub struct LinkView {
    pub url: String,
    pub title: String,
    pub score: i64,
    pub first_shared: String,
    pub users: String,
}

#[derive(Clone, PartialEq)]
pub struct EventView {
    pub name: String,
    pub link: String,
    pub when: String,
    pub venue: Option<String>,
    pub yes_rsvp_count: i64,
    pub group_name: String,
    pub group_link: String,
}

#[derive(Clone, PartialEq)]
pub struct PageHeader {
    pub title: String,
    pub logo_url: Option<String>,
    pub generated_at: String,
}

impl RepositoryView {
    pub fn new(row: &GithubActivity, now: DateTime<Utc>) -> Self {
        Self {
            title: shorten(&row.title),
            url: row.url.clone(),
            owner: row.owner.clone(),
            favorites: row.favorites,
            created: humanise(row.created, now),
            updated: humanise(row.updated, now),
        }
    }
}

impl LinkView {
    /// Links without a scraped title fall back to their URL.
    pub fn new(row: &LinkScore, now: DateTime<Utc>) -> Self {
        let title = row
            .title
            .as_deref()
            .filter(|t| !t.is_empty() && *t != crate::links::NO_TITLE)
            .unwrap_or(&row.url);
        Self {
            url: row.url.clone(),
            title: shorten(title),
            score: row.score,
            first_shared: humanise(row.first_shared, now),
            users: row.users.join(", "),
        }
    }
}

impl EventView {
    pub fn new(row: &MeetupListing, now: DateTime<Utc>) -> Self {
        Self {
            name: shorten(&row.event_name),
            link: row.event_link.clone(),
            when: humanise(row.time, now),
            venue: row.venue_name.clone(),
            yes_rsvp_count: row.yes_rsvp_count,
            group_name: row.group_name.clone(),
            group_link: row.group_link.clone(),
        }
    }
}

#[allow(non_snake_case)]
#[component]
fn SummaryPage(
    header: PageHeader,
    repositories: Vec<RepositoryView>,
    links: Vec<LinkView>,
    events: Vec<EventView>,
) -> Element {
    rsx! {
        head {
            meta { charset: "utf-8" }
            meta { name: "viewport", content: "width=device-width, initial-scale=1" }
            title { "{header.title}" }
            script { src: "https://cdn.tailwindcss.com" }
        }
        body { class: "bg-gray-50 font-sans text-gray-900",
            div { class: "max-w-4xl mx-auto p-6",
                div { class: "flex items-center gap-4 mb-2",
                    if let Some(logo) = header.logo_url.as_ref() {
                        img { src: "{logo}", alt: "logo", class: "h-12" }
                    }
                    h1 { class: "text-2xl font-semibold", "{header.title}" }
                }
                p { class: "text-xs text-gray-400 mb-8", "Generated {header.generated_at}" }

                section { id: "github", class: "mb-10",
                    h2 { class: "text-xl font-semibold mb-3", "GitHub" }
                    if repositories.is_empty() {
                        p { class: "text-gray-400", "No repository activity this week." }
                    }
                    for repo in repositories.iter() {
                        div { class: "bg-white border border-gray-200 rounded-lg p-4 mb-3",
                            a { href: "{repo.url}", class: "font-semibold text-blue-600", "{repo.title}" }
                            div { class: "flex gap-3 text-xs text-gray-400 mt-1",
                                span { "by {repo.owner}" }
                                span { "★ {repo.favorites}" }
                                span { "created {repo.created}" }
                                span { "updated {repo.updated}" }
                            }
                        }
                    }
                }

                section { id: "twitter", class: "mb-10",
                    h2 { class: "text-xl font-semibold mb-3", "Twitter" }
                    if links.is_empty() {
                        p { class: "text-gray-400", "No links shared this week." }
                    }
                    for link in links.iter() {
                        div { class: "bg-white border border-gray-200 rounded-lg p-4 mb-3",
                            a { href: "{link.url}", class: "font-semibold text-blue-600", "{link.title}" }
                            div { class: "flex gap-3 text-xs text-gray-400 mt-1",
                                span { "score {link.score}" }
                                span { "first shared {link.first_shared}" }
                                span { "{link.users}" }
                            }
                        }
                    }
                }

                section { id: "meetup",
                    h2 { class: "text-xl font-semibold mb-3", "Meetup" }
                    if events.is_empty() {
                        p { class: "text-gray-400", "No events this week." }
                    }
                    for event in events.iter() {
                        div { class: "bg-white border border-gray-200 rounded-lg p-4 mb-3",
                            a { href: "{event.link}", class: "font-semibold text-blue-600", "{event.name}" }
                            div { class: "flex gap-3 text-xs text-gray-400 mt-1",
                                a { href: "{event.group_link}", "{event.group_name}" }
                                span { "{event.when}" }
                                if let Some(venue) = event.venue.as_ref() {
                                    span { "{venue}" }
                                }
                                span { "{event.yes_rsvp_count} going" }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Render the whole summary document.
pub fn render_summary(
    header: PageHeader,
    repositories: Vec<RepositoryView>,
    links: Vec<LinkView>,
    events: Vec<EventView>,
) -> String {
    let mut dom = VirtualDom::new_with_props(
        SummaryPage,
        SummaryPageProps {
            header,
            repositories,
            links,
            events,
        },
    );
    dom.rebuild_in_place();
    format!(
        "<!DOCTYPE html><html lang=\"en\">{}</html>",
        dioxus::ssr::render(&dom)
    )
}
