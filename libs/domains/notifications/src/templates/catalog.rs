//! Email copy for every notification type and language.
//!
//! Bodies are Handlebars fragments rendered with `site_url` and `metadata`
//! in scope, then wrapped in [`LAYOUT`].

use crate::localization::Language;
use crate::models::NotificationType;

#[derive(Clone, Copy)]
pub(super) struct Entry {
    pub kind: NotificationType,
    pub language: Language,
    pub subject: &'static str,
    pub body: &'static str,
}

const fn entry(
    kind: NotificationType,
    language: Language,
    subject: &'static str,
    body: &'static str,
) -> Entry {
    Entry {
        kind,
        language,
        subject,
        body,
    }
}

use Language::{Ca, En, Es};
use NotificationType::*;

pub(super) const CATALOG: &[Entry] = &[
    // NEW_COMMENT
    entry(NewComment, Es, "Nuevo Comentario en tu Receta - Jorbites", r#"
<h2>¡Tienes un nuevo comentario!</h2>
<p>Hola,</p>
<p><strong>{{metadata.authorName}}</strong> ha dejado un comentario en tu receta.</p>
<a href="{{site_url}}/recipes/{{metadata.recipeId}}" class="button">Ver Comentario</a>
"#),
    entry(NewComment, Ca, "Nou Comentari a la teva Recepta - Jorbites", r#"
<h2>Tens un nou comentari!</h2>
<p>Hola,</p>
<p><strong>{{metadata.authorName}}</strong> ha deixat un comentari a la teva recepta.</p>
<a href="{{site_url}}/recipes/{{metadata.recipeId}}" class="button">Veure Comentari</a>
"#),
    entry(NewComment, En, "New Comment on Your Recipe - Jorbites", r#"
<h2>You have a new comment!</h2>
<p>Hi there,</p>
<p><strong>{{metadata.authorName}}</strong> has left a comment on your recipe.</p>
<a href="{{site_url}}/recipes/{{metadata.recipeId}}" class="button">View Comment</a>
"#),
    // NEW_LIKE
    entry(NewLike, Es, "Nuevo Like en tu Receta - Jorbites", r#"
<h2>¡Alguien le ha dado like a tu receta!</h2>
<p>Hola,</p>
<p><strong>{{metadata.likedBy}}</strong> le ha dado like a tu receta.</p>
<a href="{{site_url}}/recipes/{{metadata.recipeId}}" class="button">Ver Receta</a>
"#),
    entry(NewLike, Ca, "Nou Like a la teva Recepta - Jorbites", r#"
<h2>Algú ha fet like a la teva recepta!</h2>
<p>Hola,</p>
<p><strong>{{metadata.likedBy}}</strong> ha fet like a la teva recepta.</p>
<a href="{{site_url}}/recipes/{{metadata.recipeId}}" class="button">Veure Recepta</a>
"#),
    entry(NewLike, En, "New Like on Your Recipe - Jorbites", r#"
<h2>Someone liked your recipe!</h2>
<p>Hi there,</p>
<p><strong>{{metadata.likedBy}}</strong> has liked your recipe.</p>
<a href="{{site_url}}/recipes/{{metadata.recipeId}}" class="button">View Recipe</a>
"#),
    // NEW_RECIPE
    entry(NewRecipe, Es, "Nueva Receta Disponible - Jorbites", r#"
<h2>¡Nueva Receta! 🍳</h2>
<p>Hola,</p>
<p>¡Se ha publicado una nueva receta en Jorbites!</p>
<a href="{{site_url}}/recipes/{{metadata.recipeId}}" class="button">Ver Receta</a>
"#),
    entry(NewRecipe, Ca, "Nova Recepta Disponible - Jorbites", r#"
<h2>Nova Recepta! 🍳</h2>
<p>Hola,</p>
<p>S'ha publicat una nova recepta a Jorbites!</p>
<a href="{{site_url}}/recipes/{{metadata.recipeId}}" class="button">Veure Recepta</a>
"#),
    entry(NewRecipe, En, "New Recipe Available - Jorbites", r#"
<h2>New Recipe Alert! 🍳</h2>
<p>Hi there,</p>
<p>A new recipe has been posted on Jorbites!</p>
<a href="{{site_url}}/recipes/{{metadata.recipeId}}" class="button">Check it out</a>
"#),
    // NOTIFICATIONS_ACTIVATED
    entry(NotificationsActivated, Es, "Bienvenido a las Notificaciones de Jorbites", r#"
<h2>¡Notificaciones Activadas! 🎉</h2>
<p>Hola,</p>
<p>Has activado con éxito las notificaciones por email de Jorbites.</p>
<p>Ahora recibirás actualizaciones sobre:</p>
<ul>
    <li>Nuevos comentarios en tus recetas</li>
    <li>Likes en tus recetas</li>
    <li>Nuevas recetas de tus chefs favoritos</li>
</ul>
"#),
    entry(NotificationsActivated, Ca, "Benvingut a les Notificacions de Jorbites", r#"
<h2>Notificacions Activades! 🎉</h2>
<p>Hola,</p>
<p>Has activat amb èxit les notificacions per email de Jorbites.</p>
<p>Ara rebràs actualitzacions sobre:</p>
<ul>
    <li>Nous comentaris a les teves receptes</li>
    <li>Likes a les teves receptes</li>
    <li>Noves receptes dels teus xefs favorits</li>
</ul>
"#),
    entry(NotificationsActivated, En, "Welcome to Jorbites Notifications", r#"
<h2>Notifications Activated! 🎉</h2>
<p>Hi there,</p>
<p>You've successfully activated email notifications for Jorbites.</p>
<p>You'll now receive updates about:</p>
<ul>
    <li>New comments on your recipes</li>
    <li>Likes on your recipes</li>
    <li>New recipes from your favorite chefs</li>
</ul>
"#),
    // FORGOT_PASSWORD
    entry(ForgotPassword, Es, "Solicitud de Restablecimiento de Contraseña - Jorbites", r#"
<h2>Restablecer Contraseña</h2>
<p>Hola,</p>
<p>Has solicitado restablecer tu contraseña. Haz clic en el siguiente enlace para crear una nueva contraseña:</p>
<a href="{{metadata.resetUrl}}" class="button">Restablecer Contraseña</a>
<p>Este enlace expirará en 1 hora.</p>
<p>Si no solicitaste este cambio, puedes ignorar este correo.</p>
"#),
    entry(ForgotPassword, Ca, "Sol·licitud de Restabliment de Contrasenya - Jorbites", r#"
<h2>Restablir Contrasenya</h2>
<p>Hola,</p>
<p>Has sol·licitat restablir la teva contrasenya. Fes clic a l'enllaç següent per crear una nova contrasenya:</p>
<a href="{{metadata.resetUrl}}" class="button">Restablir Contrasenya</a>
<p>Aquest enllaç expirarà en 1 hora.</p>
<p>Si no has sol·licitat aquest canvi, pots ignorar aquest correu.</p>
"#),
    entry(ForgotPassword, En, "Password Reset Request - Jorbites", r#"
<h2>Password Reset</h2>
<p>Hi there,</p>
<p>You have requested to reset your password. Click on the following link to create a new password:</p>
<a href="{{metadata.resetUrl}}" class="button">Reset Password</a>
<p>This link will expire in 1 hour.</p>
<p>If you did not request this change, you can ignore this email.</p>
"#),
    // MENTION_IN_COMMENT
    entry(MentionInComment, Es, "Te Mencionaron en un Comentario - Jorbites", r#"
<h2>¡Te mencionaron en un comentario!</h2>
<p>Hola,</p>
<p><strong>{{metadata.authorName}}</strong> te mencionó en un comentario de una receta.</p>
<p>Haz clic en el botón de abajo para ver la receta:</p>
<a href="{{site_url}}/recipes/{{metadata.recipeId}}" class="button">Ver Receta</a>
"#),
    entry(MentionInComment, Ca, "T'han Mencionat en un Comentari - Jorbites", r#"
<h2>T'han mencionat en un comentari!</h2>
<p>Hola,</p>
<p><strong>{{metadata.authorName}}</strong> t'ha mencionat en un comentari d'una recepta.</p>
<p>Fes clic al botó de sota per veure la recepta:</p>
<a href="{{site_url}}/recipes/{{metadata.recipeId}}" class="button">Veure Recepta</a>
"#),
    entry(MentionInComment, En, "You Were Mentioned in a Comment - Jorbites", r#"
<h2>You were mentioned in a comment!</h2>
<p>Hi there,</p>
<p><strong>{{metadata.authorName}}</strong> mentioned you in a comment on a recipe.</p>
<p>Click the button below to view the recipe:</p>
<a href="{{site_url}}/recipes/{{metadata.recipeId}}" class="button">View Recipe</a>
"#),
    // NEW_BLOG
    entry(NewBlog, Es, "Nueva Entrada de Blog Disponible - Jorbites", r#"
<h2>¡Nueva Entrada de Blog! 📝</h2>
<p>Hola,</p>
<p>¡Se ha publicado una nueva entrada de blog en Jorbites!</p>
<a href="{{site_url}}/blog/{{metadata.blog_id}}" class="button">Leer Ahora</a>
"#),
    entry(NewBlog, Ca, "Nova Entrada de Blog Disponible - Jorbites", r#"
<h2>Nova Entrada de Blog! 📝</h2>
<p>Hola,</p>
<p>S'ha publicat una nova entrada de blog a Jorbites!</p>
<a href="{{site_url}}/blog/{{metadata.blog_id}}" class="button">Llegir Ara</a>
"#),
    entry(NewBlog, En, "New Blog Post Available - Jorbites", r#"
<h2>New Blog Post! 📝</h2>
<p>Hi there,</p>
<p>A new blog post has been published on Jorbites!</p>
<a href="{{site_url}}/blog/{{metadata.blog_id}}" class="button">Read it now</a>
"#),
    // NEW_EVENT
    entry(NewEvent, Es, "Nuevo Evento Disponible - Jorbites", r#"
<h2>¡Nuevo Evento! 🎉</h2>
<p>Hola,</p>
<p>¡Se ha publicado un nuevo evento en Jorbites!</p>
<a href="{{site_url}}/events/{{metadata.eventId}}" class="button">Ver Evento</a>
"#),
    entry(NewEvent, Ca, "Nou Esdeveniment Disponible - Jorbites", r#"
<h2>Nou Esdeveniment! 🎉</h2>
<p>Hola,</p>
<p>S'ha publicat un nou esdeveniment a Jorbites!</p>
<a href="{{site_url}}/events/{{metadata.eventId}}" class="button">Veure Esdeveniment</a>
"#),
    entry(NewEvent, En, "New Event Available - Jorbites", r#"
<h2>New Event! 🎉</h2>
<p>Hi there,</p>
<p>A new event has been published on Jorbites!</p>
<a href="{{site_url}}/events/{{metadata.eventId}}" class="button">View Event</a>
"#),
    // EVENT_ENDING_SOON
    entry(EventEndingSoon, Es, "¡El Evento Está por Terminar! - Jorbites", r#"
<h2>¡El Evento Está por Terminar! ⏰</h2>
<p>Hola,</p>
<p>El evento <strong>{{metadata.title}}</strong> terminará en 3 días.</p>
<p>¡No te lo pierdas! Todavía tienes tiempo para participar.</p>
<a href="{{site_url}}/events/{{metadata.eventId}}" class="button">Ver Evento</a>
"#),
    entry(EventEndingSoon, Ca, "L'Esdeveniment Està a Punt d'Acabar! - Jorbites", r#"
<h2>L'Esdeveniment Està a Punt d'Acabar! ⏰</h2>
<p>Hola,</p>
<p>L'esdeveniment <strong>{{metadata.title}}</strong> acabarà en 3 dies.</p>
<p>No te'l perdis! Encara tens temps per participar.</p>
<a href="{{site_url}}/events/{{metadata.eventId}}" class="button">Veure Esdeveniment</a>
"#),
    entry(EventEndingSoon, En, "Event Ending Soon! - Jorbites", r#"
<h2>Event Ending Soon! ⏰</h2>
<p>Hi there,</p>
<p>The event <strong>{{metadata.title}}</strong> will end in 3 days.</p>
<p>Don't miss out! You still have time to participate.</p>
<a href="{{site_url}}/events/{{metadata.eventId}}" class="button">View Event</a>
"#),
    // NEW_QUEST
    entry(NewQuest, Es, "Nueva Misión Disponible - Jorbites", r#"
<h2>¡Nueva Misión! 🎯</h2>
<p>Hola,</p>
<p>¡Alguien ha solicitado una nueva receta en Jorbites!</p>
<a href="{{site_url}}/quests/{{metadata.questId}}" class="button">Ver Misión</a>
"#),
    entry(NewQuest, Ca, "Nova Missió Disponible - Jorbites", r#"
<h2>Nova Missió! 🎯</h2>
<p>Hola,</p>
<p>Algú ha sol·licitat una nova recepta a Jorbites!</p>
<a href="{{site_url}}/quests/{{metadata.questId}}" class="button">Veure Missió</a>
"#),
    entry(NewQuest, En, "New Quest Available - Jorbites", r#"
<h2>New Quest! 🎯</h2>
<p>Hi there,</p>
<p>Someone has requested a new recipe on Jorbites!</p>
<a href="{{site_url}}/quests/{{metadata.questId}}" class="button">View Quest</a>
"#),
    // QUEST_FULFILLED
    entry(QuestFulfilled, Es, "¡Tu Misión ha sido completada! - Jorbites", r#"
<h2>¡Tu Misión ha sido completada! 🏆</h2>
<p>Hola,</p>
<p><strong>{{metadata.fulfilledByName}}</strong> ha completado tu misión con una receta.</p>
<a href="{{site_url}}/quests/{{metadata.questId}}" class="button">Ver Envío</a>
"#),
    entry(QuestFulfilled, Ca, "La teva Missió ha estat completada! - Jorbites", r#"
<h2>La teva Missió ha estat completada! 🏆</h2>
<p>Hola,</p>
<p><strong>{{metadata.fulfilledByName}}</strong> ha completat la teva missió amb una recepta.</p>
<a href="{{site_url}}/quests/{{metadata.questId}}" class="button">Veure Enviament</a>
"#),
    entry(QuestFulfilled, En, "Your Quest has been fulfilled! - Jorbites", r#"
<h2>Your Quest has been fulfilled! 🏆</h2>
<p>Hi there,</p>
<p><strong>{{metadata.fulfilledByName}}</strong> has fulfilled your quest with a recipe.</p>
<a href="{{site_url}}/quests/{{metadata.questId}}" class="button">View Submission</a>
"#),
];

/// Generic copy for a type with no catalog entry in any language.
pub(super) fn placeholder(language: Language) -> (&'static str, &'static str) {
    match language {
        Es => (
            "Notificación de Jorbites",
            r#"
<h2>Notificación de Jorbites</h2>
<p>Hola,</p>
<p>Tienes una nueva notificación en Jorbites.</p>
<a href="{{site_url}}" class="button">Visitar Jorbites</a>
"#,
        ),
        Ca => (
            "Notificació de Jorbites",
            r#"
<h2>Notificació de Jorbites</h2>
<p>Hola,</p>
<p>Tens una nova notificació a Jorbites.</p>
<a href="{{site_url}}" class="button">Visitar Jorbites</a>
"#,
        ),
        En => (
            "Notification from Jorbites",
            r#"
<h2>Notification from Jorbites</h2>
<p>Hi there,</p>
<p>You have a new notification on Jorbites.</p>
<a href="{{site_url}}" class="button">Visit Jorbites</a>
"#,
        ),
    }
}

pub(super) fn footer(language: Language) -> &'static str {
    match language {
        Es => r#"
<p>Estás recibiendo este correo porque tienes las notificaciones activadas en Jorbites.</p>
<p>Para gestionar tus preferencias de correo, ve a <a href="{{site_url}}">Ajustes → Notificaciones por Email</a></p>
<p>© {{year}} Jorbites. Todos los derechos reservados.</p>
"#,
        Ca => r#"
<p>Estàs rebent aquest correu perquè tens les notificacions activades a Jorbites.</p>
<p>Per gestionar les teves preferències de correu, vés a <a href="{{site_url}}">Configuració → Notificacions per Email</a></p>
<p>© {{year}} Jorbites. Tots els drets reservats.</p>
"#,
        En => r#"
<p>You're receiving this email because you have notifications enabled on Jorbites.</p>
<p>To manage your email preferences, go to <a href="{{site_url}}">Settings → Email Notifications</a></p>
<p>© {{year}} Jorbites. All rights reserved.</p>
"#,
    }
}

pub(super) const LAYOUT: &str = r#"<!DOCTYPE html>
<html lang="{{lang}}">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{{subject}}</title>
    <style>
        body { font-family: 'Nunito', Arial, sans-serif; line-height: 1.6; margin: 0; padding: 0; background-color: #f8f9fa; color: #2d3748; }
        .container { max-width: 600px; margin: 40px auto; background-color: #ffffff; border-radius: 12px; box-shadow: 0 4px 6px rgba(0,0,0,0.05); padding: 40px; }
        .header { text-align: center; padding-bottom: 30px; border-bottom: 1px solid #edf2f7; margin-bottom: 30px; }
        .logo { max-width: 140px; height: auto; }
        .content { color: #4a5568; font-size: 16px; }
        h2 { color: #1a202c; font-weight: 700; margin-top: 0; }
        .footer { text-align: center; padding-top: 30px; color: #a0aec0; font-size: 12px; border-top: 1px solid #edf2f7; margin-top: 40px; }
        .footer a { color: #718096; text-decoration: underline; }
        .button { display: inline-block; padding: 12px 24px; background-color: #C5F0A4; color: #1a202c !important; text-decoration: none; border-radius: 6px; font-weight: 700; margin: 20px 0; }
    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <img src="{{logo_url}}" alt="Jorbites Logo" class="logo">
        </div>
        <div class="content">
            {{{content}}}
        </div>
        <div class="footer">
            {{{footer}}}
        </div>
    </div>
</body>
</html>
"#;
