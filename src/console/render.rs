use std::fmt::Write;

use crate::dto::user_dto::{UpdateUserPayload, UsersResponse};
use crate::models::notification::{Toast, ToastVariant};
use crate::models::ui_state::UiState;
use crate::models::user::{SortField, SortOrder, User};
use crate::services::cache_service::UsersView;
use crate::utils::pagination::{page_window, summary, PageItem};
use crate::utils::text::{fit, initials};
use crate::utils::time::format_date;

const COLUMNS: [(&str, Option<SortField>, usize); 7] = [
    ("", None, 3),
    ("Name", Some(SortField::Name), 18),
    ("Email", Some(SortField::Email), 26),
    ("Role", Some(SortField::Role), 8),
    ("Status", Some(SortField::Status), 9),
    ("Department", None, 12),
    ("Joined", Some(SortField::JoinedAt), 13),
];

pub fn dashboard(view: &UsersView, ui: &UiState) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "== User Management ==");
    match &view.data {
        Some(data) => {
            let _ = writeln!(out, "{} users across all departments", data.total);
        }
        None => {
            let _ = writeln!(out, "Loading users...");
        }
    }

    if let Some(data) = &view.data {
        let stats = data.stats();
        let _ = writeln!(
            out,
            "Total Users: {} | Active: {} | Pending: {} | Admins: {}",
            stats.total, stats.active, stats.pending, stats.admins
        );
    }

    let mut toolbar = format!("Search: [{}]", ui.search_input);
    if !ui.debounced_search.is_empty() {
        toolbar.push_str("  (`reset` clears filters)");
    }
    if view.is_fetching && !view.is_loading {
        toolbar.push_str("  Syncing...");
    }
    let _ = writeln!(out, "{}", toolbar);

    if view.is_loading {
        let _ = writeln!(out, "  ...");
        return out;
    }

    match (&view.error, &view.data) {
        (Some(error), None) => {
            let _ = writeln!(out, "Failed to load users");
            let _ = writeln!(out, "{}", error);
            let _ = writeln!(out, "`refresh` to try again");
        }
        (_, Some(data)) if data.users.is_empty() => {
            let _ = writeln!(out, "No users found");
            if ui.debounced_search.is_empty() {
                let _ = writeln!(out, "No users exist yet.");
            } else {
                let _ = writeln!(out, "No users match your search criteria.");
            }
        }
        (_, Some(data)) => {
            table(&mut out, data, ui);
            pagination(&mut out, data, ui);
        }
        (None, None) => {}
    }

    out
}

fn table(out: &mut String, data: &UsersResponse, ui: &UiState) {
    let header: Vec<String> = COLUMNS
        .iter()
        .map(|(label, field, width)| {
            let marker = match field {
                Some(f) if *f == ui.sort_field => match ui.sort_order {
                    SortOrder::Asc => " ^",
                    SortOrder::Desc => " v",
                },
                _ => "",
            };
            fit(&format!("{}{}", label, marker), *width)
        })
        .collect();
    let _ = writeln!(out, "{}", header.join(" "));

    for user in &data.users {
        let _ = writeln!(out, "{}", row(user));
    }
}

fn row(user: &User) -> String {
    let cells = [
        initials(&user.name),
        user.name.clone(),
        user.email.clone(),
        user.role.as_str().to_string(),
        user.status.as_str().to_string(),
        user.department.clone(),
        format_date(user.joined_at),
    ];
    cells
        .iter()
        .zip(COLUMNS.iter())
        .map(|(cell, (_, _, width))| fit(cell, *width))
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end()
        .to_string()
}

fn pagination(out: &mut String, data: &UsersResponse, ui: &UiState) {
    let pages: Vec<String> = page_window(ui.page, data.total_pages)
        .into_iter()
        .map(|item| match item {
            PageItem::Page(p) if p == ui.page => format!("[{}]", p),
            PageItem::Page(p) => p.to_string(),
            PageItem::Ellipsis => "…".to_string(),
        })
        .collect();
    let _ = writeln!(
        out,
        "{}  Rows: {}  Pages: {}",
        summary(ui.page, ui.limit, data.total),
        ui.limit,
        pages.join(" ")
    );
}

pub fn edit_dialog(user: &User, form: &UpdateUserPayload) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "-- Edit User ({}) --", initials(&user.name));
    let _ = writeln!(out, "{} <{}>", user.name, user.email);
    match serde_json::to_string(form) {
        Ok(json) => {
            let _ = writeln!(out, "current: {}", json);
        }
        Err(e) => {
            let _ = writeln!(out, "current: <unavailable: {}>", e);
        }
    }
    let _ = writeln!(out, "`save <json>` to apply changes, `cancel` to close");
    out
}

pub fn toast(toast: &Toast) -> String {
    let tag = match toast.variant {
        ToastVariant::Success => "ok",
        ToastVariant::Destructive => "error",
    };
    format!("[{}] {}: {}", tag, toast.title, toast.description)
}
