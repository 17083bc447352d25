// src/repositories/sqlite/mod.rs

pub mod chat_history;
pub mod chat_style;
pub mod comment;
pub mod course;
pub mod emotion_report;
pub mod favorite;
pub mod notification;
pub mod post;
pub mod trend_analysis;
pub mod user;

pub use chat_history::ChatHistoryRepository;
pub use chat_style::ChatStyleRepository;
pub use comment::CommentRepository;
pub use course::CourseRepository;
pub use emotion_report::EmotionReportRepository;
pub use favorite::FavoriteRepository;
pub use notification::NotificationRepository;
pub use post::PostRepository;
pub use trend_analysis::TrendAnalysisRepository;
pub use user::UserRepository;
