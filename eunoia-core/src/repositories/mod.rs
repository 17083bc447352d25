// src/repositories/mod.rs

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use eunoia_common::models::{EntityKind, ListQuery, Scope};
use eunoia_common::Error;

pub mod sqlite;

pub use eunoia_common::traits::repository_traits::{
    ChatHistoryRepo, ChatStyleRepo, EmotionReportRepo, EntityRepository,
    TrendAnalysisRepo, UserRepo,
};

/// Decode a storage-shaped JSON record into its typed model. Failures are
/// validation errors: the payload claimed a shape the entity does not have.
pub(crate) fn decode<T: DeserializeOwned>(value: Value) -> Result<T, Error> {
    serde_json::from_value(value).map_err(|e| Error::Validation(e.to_string()))
}

pub(crate) fn encode<T: Serialize>(model: &T) -> Result<Value, Error> {
    Ok(serde_json::to_value(model)?)
}

/// Assemble `SELECT * FROM <table> [WHERE <scope>] [ORDER BY ..] [LIMIT ..]`.
/// The order field is checked against the kind's static column list, so the
/// interpolation cannot smuggle SQL; the scope value is returned as a bind.
pub(crate) fn build_list_sql(kind: EntityKind, query: &ListQuery) -> (String, Option<String>) {
    let mut sql = format!("SELECT * FROM {}", kind.table());
    let mut bind = None;

    match kind.scope() {
        Scope::ByCreator => {
            if let Some(email) = &query.scope_email {
                sql.push_str(" WHERE created_by = ?");
                bind = Some(email.clone());
            }
        }
        Scope::ByRecipient => {
            if let Some(email) = &query.scope_email {
                sql.push_str(" WHERE recipient_email = ?");
                bind = Some(email.clone());
            }
        }
        Scope::Unscoped => {}
    }

    if let Some((field, direction)) = &query.order {
        if kind.columns().contains(&field.as_str()) {
            sql.push_str(&format!(" ORDER BY {} {}", field, direction.sql()));
        }
    }

    if let Some(limit) = query.limit {
        sql.push_str(&format!(" LIMIT {}", limit));
    }

    (sql, bind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use eunoia_common::models::SortDirection;

    #[test]
    fn list_sql_scopes_and_orders() {
        let query = ListQuery {
            order: Some(("created_at".to_string(), SortDirection::Desc)),
            limit: Some(20),
            scope_email: Some("a@example.com".to_string()),
        };
        let (sql, bind) = build_list_sql(EntityKind::Favorite, &query);
        assert_eq!(
            sql,
            "SELECT * FROM favorites WHERE created_by = ? ORDER BY created_at DESC LIMIT 20"
        );
        assert_eq!(bind.as_deref(), Some("a@example.com"));
    }

    #[test]
    fn list_sql_ignores_unknown_order_columns() {
        let query = ListQuery {
            order: Some(("1; DROP TABLE posts".to_string(), SortDirection::Asc)),
            limit: None,
            scope_email: None,
        };
        let (sql, _) = build_list_sql(EntityKind::Post, &query);
        assert_eq!(sql, "SELECT * FROM posts");
    }

    #[test]
    fn notifications_scope_by_recipient() {
        let query = ListQuery {
            order: None,
            limit: None,
            scope_email: Some("b@example.com".to_string()),
        };
        let (sql, _) = build_list_sql(EntityKind::Notification, &query);
        assert_eq!(sql, "SELECT * FROM notifications WHERE recipient_email = ?");
    }
}
