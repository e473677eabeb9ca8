pub mod command;
pub mod render;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

use crate::console::command::{Command, HELP};
use crate::dto::user_dto::UpdateUserPayload;
use crate::error::Result;
use crate::AppState;

/// Interactive dashboard on stdin/stdout. Redraws whenever the UI state or
/// the cache changes and prints toasts as they arrive.
pub async fn run(state: AppState) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ui_changes = state.ui.subscribe();
    let mut cache_changes = state.users.subscribe();
    let mut toasts = state.notification_service.subscribe();
    let mut last_frame = String::new();

    println!("{}", HELP);
    redraw(&state, &mut last_frame, true);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match line.parse::<Command>() {
                    Ok(Command::Quit) => break,
                    Ok(command) => handle(&state, command, &mut last_frame).await?,
                    Err(message) => println!("{}", message),
                }
            }
            changed = ui_changes.changed() => {
                if changed.is_err() {
                    break;
                }
                redraw(&state, &mut last_frame, false);
            }
            changed = cache_changes.changed() => {
                if changed.is_err() {
                    break;
                }
                redraw(&state, &mut last_frame, false);
            }
            changed = toasts.changed() => {
                if changed.is_err() {
                    break;
                }
                for toast in state.notification_service.drain() {
                    println!("{}", render::toast(&toast));
                }
            }
        }
    }

    debug!("console closed");
    Ok(())
}

fn redraw(state: &AppState, last_frame: &mut String, force: bool) {
    let view = state.users.view();
    let frame = render::dashboard(&view, &state.ui.snapshot());
    if force || frame != *last_frame {
        println!("{}", frame);
        *last_frame = frame;
    }
}

fn total_pages(state: &AppState) -> u32 {
    state
        .users
        .view()
        .data
        .map(|data| data.total_pages)
        .unwrap_or(1)
        .max(1)
}

async fn handle(state: &AppState, command: Command, last_frame: &mut String) -> Result<()> {
    let ui = &state.ui;
    match command {
        Command::Search(text) => ui.set_search_input(text),
        Command::ClearSearch => ui.set_search_input(""),
        Command::Page(page) => ui.set_page(page.min(total_pages(state))),
        Command::NextPage => {
            let page = ui.page();
            if page < total_pages(state) {
                ui.set_page(page + 1);
            }
        }
        Command::PrevPage => {
            let page = ui.page();
            if page > 1 {
                ui.set_page(page - 1);
            }
        }
        Command::Limit(limit) => ui.set_limit(limit),
        Command::Sort(field) => ui.set_sorting(field),
        Command::Reset => ui.reset_filters(),
        Command::Refresh => {
            let users = state.users.clone();
            tokio::spawn(async move {
                if let Err(e) = users.refetch().await {
                    warn!(error = %e, "refresh failed");
                }
            });
        }
        Command::Edit(id) => {
            state.edit_service.open(id.clone());
            match state.edit_service.editing_user().await? {
                Some(user) => {
                    let form = UpdateUserPayload::from(&user);
                    print!("{}", render::edit_dialog(&user, &form));
                }
                None => {
                    println!("User {} not found", id);
                    state.edit_service.cancel();
                }
            }
        }
        Command::Save(payload) => {
            if !state.edit_service.is_open() {
                println!("no user is being edited (try `edit <id>`)");
                return Ok(());
            }
            let edit_service = state.edit_service.clone();
            tokio::spawn(async move {
                if let Err(e) = edit_service.save(payload).await {
                    debug!(error = %e, "save rejected");
                }
            });
        }
        Command::Cancel => state.edit_service.cancel(),
        Command::Show => redraw(state, last_frame, true),
        Command::Json => match state.users.view().data {
            Some(data) => println!("{}", serde_json::to_string_pretty(&data)?),
            None => println!("nothing loaded yet"),
        },
        Command::Help => println!("{}", HELP),
        Command::Quit => {}
    }
    Ok(())
}
