//! Notifications Domain
//!
//! Stores notifications and the queue of those still waiting for delivery.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────┐
//! │ PendingNotificationQueue │  ← enqueue, dequeue oldest, delete
//! └────────────┬─────────────┘
//!              │
//! ┌────────────▼─────────────┐
//! │       Repositories       │  ← Notification + PendingNotification (trait + impls)
//! └────────────┬─────────────┘
//!              │
//! ┌────────────▼─────────────┐
//! │          Models          │  ← Notification, PendingNotification, channels
//! └──────────────────────────┘
//! ```
//!
//! A pending entry only points at its notification. Removing the entry,
//! whether by dequeue or by delete, leaves the notification in place.
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_notifications::{
//!     InMemoryNotificationRepository, InMemoryPendingNotificationRepository, NewNotification,
//!     NotificationChannel, PendingNotificationQueue,
//! };
//!
//! # async fn example() -> domain_notifications::NotificationResult<()> {
//! let queue = PendingNotificationQueue::new(
//!     InMemoryNotificationRepository::new(),
//!     InMemoryPendingNotificationRepository::new(),
//! );
//!
//! queue
//!     .submit(NewNotification {
//!         user_id: uuid::Uuid::new_v4(),
//!         channels: vec![NotificationChannel::Email],
//!         subject: "Hello".to_string(),
//!         body: "World".to_string(),
//!     })
//!     .await?;
//!
//! while let Some(pending) = queue.dequeue_oldest().await? {
//!     // hand off to delivery
//! }
//! # Ok(())
//! # }
//! ```

pub mod entity;
pub mod error;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{NotificationError, NotificationResult};
pub use models::{NewNotification, Notification, NotificationChannel, PendingNotification};
pub use postgres::{PgNotificationRepository, PgPendingNotificationRepository};
pub use repository::{
    InMemoryNotificationRepository, InMemoryPendingNotificationRepository, NotificationRepository,
    PendingNotificationRepository,
};
pub use service::PendingNotificationQueue;
