// File: eunoia-common/src/models/mod.rs
pub mod chat;
pub mod community;
pub mod course;
pub mod entity;
pub mod report;
pub mod style;
pub mod user;

pub use chat::{ChatHistory, ChatMessage};
pub use community::{Comment, Favorite, Notification, Post};
pub use course::Course;
pub use entity::{EntityKind, ListQuery, Scope, SortDirection};
pub use report::{AnalysisStatus, EmotionReport, TrendAnalysis};
pub use style::{ChatStyle, StyleStatus};
pub use user::{MeteredAction, PublicProfile, SubscriptionTier, User};
