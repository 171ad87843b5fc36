use std::sync::Arc;

use domain::{DomainError, Notification, NotificationId, NotificationRepository, UserId};

use crate::{clock::Clock, delivery::EventDispatcher, error::ApplicationError};

#[derive(Debug, Clone)]
pub struct CreateNotificationRequest {
    pub user_id: UserId,
    pub notification_type: String,
    pub title: String,
    pub description: String,
}

pub struct NotificationServiceDependencies {
    pub notification_repository: Arc<dyn NotificationRepository>,
    pub dispatcher: Arc<dyn EventDispatcher>,
    pub clock: Arc<dyn Clock>,
}

pub struct NotificationService {
    deps: NotificationServiceDependencies,
}

impl NotificationService {
    pub fn new(deps: NotificationServiceDependencies) -> Self {
        Self { deps }
    }

    async fn load(&self, id: NotificationId) -> Result<Notification, ApplicationError> {
        self.deps
            .notification_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("notification", id))
    }

    /// 保存通知并推送给所属用户
    pub async fn create_notification(
        &self,
        request: CreateNotificationRequest,
    ) -> Result<Notification, ApplicationError> {
        let now = self.deps.clock.now();
        let notification = Notification::new(
            NotificationId::generate(),
            request.user_id,
            request.notification_type,
            request.title,
            request.description,
            now,
        )?;

        let notification = self
            .deps
            .notification_repository
            .create(notification)
            .await?;
        tracing::info!(
            notification_id = %notification.id,
            user_id = %notification.user_id,
            notification_type = %notification.notification_type,
            "通知已创建"
        );

        self.deps
            .dispatcher
            .deliver_new_notification(notification.clone())
            .await;

        Ok(notification)
    }

    pub async fn delete_notification(&self, id: NotificationId) -> Result<(), ApplicationError> {
        let notification = self.load(id).await?;

        self.deps.notification_repository.delete(id).await?;
        tracing::info!(notification_id = %id, "通知已删除");

        self.deps
            .dispatcher
            .deliver_notification_deleted(id, notification.user_id)
            .await;

        Ok(())
    }

    /// 标记已读，不推送
    pub async fn mark_read(&self, id: NotificationId) -> Result<Notification, ApplicationError> {
        let mut notification = self.load(id).await?;
        if notification.read {
            return Ok(notification);
        }

        notification.mark_as_read();
        Ok(self
            .deps
            .notification_repository
            .update(notification)
            .await?)
    }

    /// 用户的通知，最新的在前
    pub async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Notification>, ApplicationError> {
        if user_id.is_unset() {
            return Err(DomainError::validation_error("user_id", "用户ID不能为空").into());
        }

        let mut notifications = self
            .deps
            .notification_repository
            .list_for_user(user_id)
            .await?;
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notifications)
    }

    pub async fn unread_count(&self, user_id: &UserId) -> Result<usize, ApplicationError> {
        let notifications = self.list_for_user(user_id).await?;
        Ok(notifications.iter().filter(|n| !n.read).count())
    }
}
