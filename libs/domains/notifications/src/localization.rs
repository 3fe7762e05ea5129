//! Language resolution and push notification texts.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::models::{Metadata, NotificationType, User};

/// Supported content languages. Spanish is the base language.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Language {
    #[default]
    Es,
    Ca,
    En,
}

impl Language {
    /// Parse a stored language code. Unknown or empty codes map to the base language.
    pub fn from_code(code: &str) -> Self {
        code.trim().parse().unwrap_or_default()
    }

    pub fn code(self) -> &'static str {
        match self {
            Language::Es => "es",
            Language::Ca => "ca",
            Language::En => "en",
        }
    }
}

/// Preferred language of a user, or the base language when unset.
pub fn resolve_language(user: &User) -> Language {
    user.language
        .as_deref()
        .map(Language::from_code)
        .unwrap_or_default()
}

/// Title and body shown by the browser for a push notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushText {
    pub title: String,
    pub message: String,
}

impl PushText {
    fn new(title: &str, message: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            message: message.into(),
        }
    }

    /// Generic text used when a type has no dedicated push copy.
    pub fn placeholder(language: Language) -> Self {
        match language {
            Language::Es => Self::new("Notificación", "Tienes una nueva notificación"),
            Language::Ca => Self::new("Notificació", "Tens una nova notificació"),
            Language::En => Self::new("Notification", "You have a new notification"),
        }
    }
}

/// Localized push text for a notification, filled from its metadata.
pub fn push_text(kind: NotificationType, language: Language, metadata: &Metadata) -> PushText {
    use Language::*;

    let field = |key: &str| metadata.get(key).map(String::as_str).filter(|v| !v.is_empty());

    match kind {
        NotificationType::NewLike => match (language, field("likedBy")) {
            (Es, Some(who)) => PushText::new("Nuevo Like", format!("{who} le ha dado like a tu receta")),
            (Es, None) => PushText::new("Nuevo Like", "Alguien le ha dado like a tu receta"),
            (Ca, Some(who)) => PushText::new("Nou Like", format!("{who} ha fet like a la teva recepta")),
            (Ca, None) => PushText::new("Nou Like", "Algú ha fet like a la teva recepta"),
            (En, Some(who)) => PushText::new("New Like", format!("{who} liked your recipe")),
            (En, None) => PushText::new("New Like", "Someone liked your recipe"),
        },
        NotificationType::NewComment => match (language, field("authorName")) {
            (Es, Some(who)) => PushText::new("Nuevo Comentario", format!("{who} ha comentado en tu receta")),
            (Es, None) => PushText::new("Nuevo Comentario", "Nuevo comentario en tu receta"),
            (Ca, Some(who)) => PushText::new("Nou Comentari", format!("{who} ha comentat a la teva recepta")),
            (Ca, None) => PushText::new("Nou Comentari", "Nou comentari a la teva recepta"),
            (En, Some(who)) => PushText::new("New Comment", format!("{who} commented on your recipe")),
            (En, None) => PushText::new("New Comment", "New comment on your recipe"),
        },
        NotificationType::NotificationsActivated => match language {
            Es => PushText::new("Notificaciones Activadas", "Has activado las notificaciones con éxito"),
            Ca => PushText::new("Notificacions Activades", "Has activat les notificacions amb èxit"),
            En => PushText::new("Notifications Activated", "You have successfully activated notifications"),
        },
        NotificationType::MentionInComment => match language {
            Es => PushText::new("¡Te mencionaron!", "Te mencionaron en un comentario"),
            Ca => PushText::new("T'han mencionat!", "T'han mencionat en un comentari"),
            En => PushText::new("You were mentioned!", "You were mentioned in a comment"),
        },
        NotificationType::NewRecipe => {
            let (title, available) = match language {
                Es => ("¡Nueva Receta!", "Nueva receta disponible"),
                Ca => ("Nova Recepta!", "Nova recepta disponible"),
                En => ("New Recipe!", "New recipe available"),
            };
            match field("recipeName") {
                Some(name) => PushText::new(title, format!("{available}: {name}")),
                None => PushText::new(title, available),
            }
        }
        NotificationType::NewBlog => {
            let title = match language {
                Es => "¡Nuevo Post de Blog!",
                Ca => "Nou Post de Blog!",
                En => "New Blog Post!",
            };
            PushText::new(title, field("title").unwrap_or_default())
        }
        NotificationType::NewEvent => {
            let title = match language {
                Es => "¡Nuevo Evento!",
                Ca => "Nou Esdeveniment!",
                En => "New Event!",
            };
            PushText::new(title, field("title").unwrap_or_default())
        }
        NotificationType::EventEndingSoon => {
            let event = field("title").unwrap_or_default();
            match language {
                Es => PushText::new("¡Evento Terminando!", format!("{event} termina en 3 días")),
                Ca => PushText::new("L'Esdeveniment Acaba Aviat!", format!("{event} acaba en 3 dies")),
                En => PushText::new("Event Ending Soon!", format!("{event} ends in 3 days")),
            }
        }
        NotificationType::NewQuest => match language {
            Es => PushText::new("¡Nueva Quest!", "Se ha publicado una nueva quest en Jorbites"),
            Ca => PushText::new("Nova Quest!", "S'ha publicat una nova quest a Jorbites"),
            En => PushText::new("New Quest!", "A new quest has been posted on Jorbites"),
        },
        NotificationType::QuestFulfilled => match (language, field("fulfilledByName")) {
            (Es, Some(who)) => PushText::new("¡Misión Completada!", format!("{who} ha completado tu misión")),
            (Es, None) => PushText::new("¡Misión Completada!", "Tu misión ha sido completada"),
            (Ca, Some(who)) => PushText::new("Missió Completada!", format!("{who} ha completat la teva missió")),
            (Ca, None) => PushText::new("Missió Completada!", "La teva missió ha estat completada"),
            (En, Some(who)) => PushText::new("Quest Fulfilled!", format!("{who} fulfilled your quest")),
            (En, None) => PushText::new("Quest Fulfilled!", "Your quest has been fulfilled"),
        },
        NotificationType::ForgotPassword => PushText::placeholder(language),
    }
}
