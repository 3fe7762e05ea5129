//! Maps each notification type to its delivery strategy and push link.

use crate::models::{Metadata, NotificationType};

/// Delivery strategy for a notification type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Email to the named recipient regardless of preferences. No push.
    Transactional,
    /// Email to the recipient when opted in, push to their subscriptions.
    PreferenceGated,
    /// Email to every opted-in user, push to every subscription.
    Broadcast,
    /// Email and push to the users listed in `mentionedUsers`.
    Mention,
    /// Accepted on the wire but never delivered.
    Undeliverable,
}

impl NotificationType {
    pub fn route(self) -> Route {
        match self {
            NotificationType::ForgotPassword => Route::Transactional,
            NotificationType::NewComment
            | NotificationType::NewLike
            | NotificationType::NotificationsActivated => Route::PreferenceGated,
            NotificationType::NewRecipe
            | NotificationType::NewBlog
            | NotificationType::NewEvent
            | NotificationType::EventEndingSoon => Route::Broadcast,
            NotificationType::MentionInComment => Route::Mention,
            NotificationType::NewQuest | NotificationType::QuestFulfilled => Route::Undeliverable,
        }
    }

    /// Site-relative link opened when the push notification is clicked.
    pub fn push_path(self, metadata: &Metadata) -> String {
        let get = |key: &str| {
            metadata
                .get(key)
                .map(String::as_str)
                .filter(|v| !v.is_empty())
        };

        let path = match self {
            NotificationType::NewRecipe => get("slug")
                .or_else(|| get("recipeId"))
                .map(|target| format!("/recipes/{target}")),
            NotificationType::NewComment
            | NotificationType::NewLike
            | NotificationType::MentionInComment => {
                get("recipeId").map(|id| format!("/recipes/{id}"))
            }
            NotificationType::NewBlog => get("blog_id").map(|id| format!("/blog/{id}")),
            NotificationType::NewEvent | NotificationType::EventEndingSoon => {
                get("eventId").map(|id| format!("/events/{id}"))
            }
            NotificationType::NewQuest | NotificationType::QuestFulfilled => {
                get("questId").map(|id| format!("/quests/{id}"))
            }
            NotificationType::NotificationsActivated => {
                Some("/settings/notifications".to_string())
            }
            NotificationType::ForgotPassword => None,
        };

        path.unwrap_or_else(|| "/".to_string())
    }
}

/// Ids listed in a comma-separated `mentionedUsers` value, trimmed, blanks dropped.
pub fn parse_mentions(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    fn meta(pairs: &[(&str, &str)]) -> Metadata {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_every_type_has_a_route() {
        let transactional: Vec<_> = NotificationType::iter()
            .filter(|t| t.route() == Route::Transactional)
            .collect();
        assert_eq!(transactional, vec![NotificationType::ForgotPassword]);
        assert_eq!(NotificationType::NewQuest.route(), Route::Undeliverable);
        assert_eq!(NotificationType::QuestFulfilled.route(), Route::Undeliverable);
        assert_eq!(NotificationType::MentionInComment.route(), Route::Mention);
    }

    #[test]
    fn test_recipe_link_prefers_slug() {
        let with_slug = meta(&[("slug", "paella"), ("recipeId", "abc")]);
        assert_eq!(NotificationType::NewRecipe.push_path(&with_slug), "/recipes/paella");

        let id_only = meta(&[("recipeId", "abc")]);
        assert_eq!(NotificationType::NewRecipe.push_path(&id_only), "/recipes/abc");
    }

    #[test]
    fn test_links_per_type() {
        assert_eq!(
            NotificationType::NewBlog.push_path(&meta(&[("blog_id", "7")])),
            "/blog/7"
        );
        assert_eq!(
            NotificationType::EventEndingSoon.push_path(&meta(&[("eventId", "e1")])),
            "/events/e1"
        );
        assert_eq!(
            NotificationType::QuestFulfilled.push_path(&meta(&[("questId", "q1")])),
            "/quests/q1"
        );
        assert_eq!(
            NotificationType::NotificationsActivated.push_path(&Metadata::new()),
            "/settings/notifications"
        );
    }

    #[test]
    fn test_missing_metadata_links_to_root() {
        assert_eq!(NotificationType::NewLike.push_path(&Metadata::new()), "/");
        assert_eq!(
            NotificationType::NewEvent.push_path(&meta(&[("eventId", "")])),
            "/"
        );
    }

    #[test]
    fn test_parse_mentions() {
        assert_eq!(parse_mentions(Some(" a , ,b,")), vec!["a", "b"]);
        assert!(parse_mentions(Some(" , ")).is_empty());
        assert!(parse_mentions(None).is_empty());
    }
}
