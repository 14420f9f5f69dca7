use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use url::Url;

use crate::config::SchedulerConfig;
use crate::models::ScheduledPost;

pub const PLACEHOLDER: &str = "-";

const HEADERS: [&str; 6] = ["Title", "Account", "Scheduled for", "Status", "Video", "Actions"];

/// Markup for the scheduled-posts container. An empty list yields the empty-state
/// message rather than an empty table.
pub fn render_posts(posts: &[ScheduledPost], config: &SchedulerConfig) -> String {
    if posts.is_empty() {
        return format!(
            "<p class=\"empty-state text-muted\">{}</p>",
            text(&config.empty_message)
        );
    }

    let mut html = String::from("<table class=\"table scheduled-posts-table\"><thead><tr>");
    for header in HEADERS {
        html.push_str(&format!("<th>{}</th>", header));
    }
    html.push_str("</tr></thead><tbody>");

    for post in posts {
        html.push_str(&render_row(post, config));
    }

    html.push_str("</tbody></table>");
    html
}

pub fn render_row(post: &ScheduledPost, config: &SchedulerConfig) -> String {
    let mut row = String::from("<tr");
    if let Some(id) = post.id() {
        row.push_str(&format!(" data-post-id=\"{}\"", attr(&id.to_string())));
    }
    row.push_str(&format!(
        " data-video-url=\"{}\" data-content=\"{}\">",
        attr(post.video_url().unwrap_or_default()),
        attr(post.content().unwrap_or_default()),
    ));

    row.push_str(&cell(&text(post.title().unwrap_or(PLACEHOLDER))));
    row.push_str(&cell(&account_cell(post)));
    row.push_str(&cell(&text(
        post.display_time().as_deref().unwrap_or(PLACEHOLDER),
    )));
    row.push_str(&cell(&status_badge(post, config)));
    row.push_str(&cell(&video_cell(post, config)));
    row.push_str(&cell(&delete_cell(post, config)));

    row.push_str("</tr>");
    row
}

fn cell(content: &str) -> String {
    format!("<td>{}</td>", content)
}

fn account_cell(post: &ScheduledPost) -> String {
    match (post.account(), post.account_platform()) {
        (Some(account), Some(platform)) => format!(
            "{} <small class=\"text-muted\">({})</small>",
            text(account),
            text(platform)
        ),
        (Some(account), None) => text(account).into_owned(),
        (None, _) => PLACEHOLDER.to_string(),
    }
}

fn status_badge(post: &ScheduledPost, config: &SchedulerConfig) -> String {
    let label = post.status().unwrap_or(&config.pending_label);
    format!(
        "<span class=\"badge status-{}\">{}</span>",
        status_slug(label),
        text(label)
    )
}

fn status_slug(label: &str) -> String {
    let slug: String = label
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    if slug.is_empty() {
        "unknown".to_string()
    } else {
        slug
    }
}

fn video_cell(post: &ScheduledPost, config: &SchedulerConfig) -> String {
    match post.video_url().filter(|url| is_safe_link(url)) {
        Some(url) => format!(
            "<a href=\"{}\" target=\"_blank\" rel=\"noopener\">{}</a>",
            attr(url),
            text(&config.video_label)
        ),
        None => PLACEHOLDER.to_string(),
    }
}

fn delete_cell(post: &ScheduledPost, config: &SchedulerConfig) -> String {
    let Some(id) = post.id() else {
        return PLACEHOLDER.to_string();
    };

    format!(
        "<form method=\"post\" action=\"{action}\" class=\"inline-form\" data-confirm=\"{confirm}\">\
         <input type=\"hidden\" name=\"{field}\" value=\"{id}\">\
         <button type=\"submit\" class=\"btn btn-danger btn-sm\">{label}</button>\
         </form>",
        action = attr(&config.delete_endpoint),
        confirm = attr(&config.delete_confirm),
        field = attr(&config.id_field),
        id = attr(&id.to_string()),
        label = text(&config.delete_label),
    )
}

/// Only web links and relative paths become anchors.
fn is_safe_link(raw: &str) -> bool {
    match Url::parse(raw) {
        Ok(url) => matches!(url.scheme(), "http" | "https"),
        Err(url::ParseError::RelativeUrlWithoutBase) => true,
        Err(_) => false,
    }
}
