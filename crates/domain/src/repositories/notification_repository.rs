//! 通知Repository接口定义

use async_trait::async_trait;

use crate::entities::Notification;
use crate::errors::RepositoryError;
use crate::value_objects::{NotificationId, UserId};

/// 通知Repository接口
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// 创建通知
    async fn create(&self, notification: Notification) -> Result<Notification, RepositoryError>;

    /// 根据ID查找通知
    async fn find_by_id(
        &self,
        id: NotificationId,
    ) -> Result<Option<Notification>, RepositoryError>;

    /// 更新通知
    async fn update(&self, notification: Notification) -> Result<Notification, RepositoryError>;

    /// 删除通知
    async fn delete(&self, id: NotificationId) -> Result<(), RepositoryError>;

    /// 获取用户的通知，最新的排在前面
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Notification>, RepositoryError>;
}
