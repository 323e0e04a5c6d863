//! Notification settings model and the dispatch engine.

mod dispatcher;
mod profiles;
mod types;

pub use dispatcher::{
    select_deliveries, ChannelDelivery, ChannelOutcome, ChannelStatus, DispatchReport,
    DispatcherStats, DispatcherStatsSnapshot, NotificationDispatcher,
};
pub use types::{
    ChannelCategory, InputType, NotificationChannel, NotificationPolicy,
    NotificationServiceConfig, NotificationServiceTestResult, NotificationSettings,
    ServiceFieldSchema, ServiceKind, ServiceSettings, ServiceType, ServiceTypeSchema, Severity,
    TestStatus, Trigger, TriggerDomain, UnknownVariant,
};
