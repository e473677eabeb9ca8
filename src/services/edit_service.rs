use std::sync::Arc;
use tracing::info;

use crate::dto::user_dto::UpdateUserPayload;
use crate::error::{Error, Result};
use crate::models::notification::Toast;
use crate::models::user::User;
use crate::services::cache_service::UsersQueryClient;
use crate::services::notification_service::NotificationService;
use crate::services::ui_store::UiStore;
use crate::services::user_service::UsersApi;

/// The edit dialog: tracks the target id in the UI store and routes saves
/// through the optimistic cache layer.
#[derive(Clone)]
pub struct EditUserService {
    ui: UiStore,
    users: UsersQueryClient,
    api: Arc<dyn UsersApi>,
    notifications: NotificationService,
}

impl EditUserService {
    pub fn new(
        ui: UiStore,
        users: UsersQueryClient,
        api: Arc<dyn UsersApi>,
        notifications: NotificationService,
    ) -> Self {
        Self {
            ui,
            users,
            api,
            notifications,
        }
    }

    pub fn open(&self, id: impl Into<String>) {
        let id = id.into();
        info!(user_id = %id, "edit dialog opened");
        self.ui.open_edit_modal(id);
    }

    pub fn is_open(&self) -> bool {
        self.ui.editing_user_id().is_some()
    }

    /// Record targeted by the dialog, looked up by id. `None` when the dialog
    /// is closed or the id no longer resolves.
    pub async fn editing_user(&self) -> Result<Option<User>> {
        let Some(id) = self.ui.editing_user_id() else {
            return Ok(None);
        };
        match self.api.get_user(id).await {
            Ok(user) => Ok(Some(user)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Form contents the dialog starts from.
    pub async fn initial_form(&self) -> Result<Option<UpdateUserPayload>> {
        Ok(self.editing_user().await?.as_ref().map(UpdateUserPayload::from))
    }

    /// Closes the dialog on success. On failure the dialog stays open and a
    /// destructive toast is queued.
    pub async fn save(&self, payload: UpdateUserPayload) -> Result<User> {
        let Some(id) = self.ui.editing_user_id() else {
            return Err(Error::BadRequest("No user is being edited".to_string()));
        };

        match self.users.update_user(&id, payload).await {
            Ok(user) => {
                self.notifications.push(Toast::success(
                    "User updated",
                    format!("{} has been saved successfully.", user.name),
                ));
                self.ui.close_edit_modal();
                Ok(user)
            }
            Err(e) => {
                let toast = match &e {
                    Error::Validation(_) => e.toast(),
                    _ => Toast::destructive(
                        "Update failed",
                        "Could not save changes. Please try again.",
                    ),
                };
                self.notifications.push(toast);
                Err(e)
            }
        }
    }

    pub fn cancel(&self) {
        self.ui.close_edit_modal();
    }
}

impl std::fmt::Debug for EditUserService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditUserService")
            .field("editing_user_id", &self.ui.editing_user_id())
            .finish_non_exhaustive()
    }
}
