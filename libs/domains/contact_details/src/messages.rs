//! Message catalog.
//!
//! [`resolve`] is a pure lookup of `(key, locale, params)` to text. Templates
//! use positional placeholders `{0}`, `{1}`, ... filled from `params`.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use utoipa::ToSchema;

/// Supported message locales.
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
    Display,
    EnumString,
    EnumIter,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Locale {
    #[default]
    En,
    Fr,
}

impl Locale {
    /// First supported tag in preference order, else `fallback`.
    ///
    /// Tags are primary language subtags as produced by
    /// `axum_helpers::AcceptLanguage`.
    pub fn negotiate<S: AsRef<str>>(tags: &[S], fallback: Locale) -> Locale {
        tags.iter()
            .find_map(|tag| tag.as_ref().parse().ok())
            .unwrap_or(fallback)
    }
}

/// Machine-readable message keys returned to clients as `messageKey`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumIter)]
pub enum MessageKey {
    #[strum(to_string = "notification.error.authorization.permissionMissing")]
    PermissionMissing,
    #[strum(to_string = "notification.error.userContactDetails.notFound")]
    UserContactDetailsNotFound,
    #[strum(to_string = "notification.error.email.invalid")]
    EmailInvalid,
    #[strum(to_string = "notification.error.email.duplicated")]
    EmailDuplicated,
    #[strum(to_string = "notification.error.field.invariant")]
    FieldIsInvariant,
    #[strum(to_string = "notification.error.idMismatch")]
    IdMismatch,
    #[strum(to_string = "notification.error.verification.tokenInvalid")]
    TokenInvalid,
    #[strum(to_string = "notification.error.verification.tokenExpired")]
    TokenExpired,
    #[strum(to_string = "notification.error.userContactDetails.noEmail")]
    UserHasNoEmail,
    #[strum(to_string = "notification.error.userContactDetails.emailAlreadyVerified")]
    UserEmailAlreadyVerified,
    #[strum(to_string = "notification.error.database")]
    DatabaseError,
    #[strum(to_string = "notification.error.internal")]
    InternalError,
    #[strum(to_string = "notification.email.verification.success")]
    EmailVerificationSuccess,
    #[strum(to_string = "notification.email.verification.subject")]
    VerificationEmailSubject,
    #[strum(to_string = "notification.email.verification.body")]
    VerificationEmailBody,
}

fn template(key: MessageKey, locale: Locale) -> &'static str {
    use MessageKey::*;

    match locale {
        Locale::En => match key {
            PermissionMissing => "You do not have permission to manage contact details of user {0}",
            UserContactDetailsNotFound => "Contact details for user {0} not found",
            EmailInvalid => "The email address '{0}' is not valid",
            EmailDuplicated => "The email address '{0}' is already used by another user",
            FieldIsInvariant => "The field '{0}' cannot be changed",
            IdMismatch => "The identifier {0} does not match {1}",
            TokenInvalid => "The verification token {0} is invalid",
            TokenExpired => "The verification token {0} has expired",
            UserHasNoEmail => "User {0} has no email address to verify",
            UserEmailAlreadyVerified => "The email address of user {0} is already verified",
            DatabaseError => "A storage error occurred",
            InternalError => "An internal error occurred",
            EmailVerificationSuccess => "The email address {0} has been verified",
            VerificationEmailSubject => "Verify your email address",
            VerificationEmailBody => {
                "Please confirm {0} by opening {1}\n\nThe link expires at {2}."
            }
        },
        Locale::Fr => match key {
            PermissionMissing => {
                "Vous n'avez pas l'autorisation de gérer les coordonnées de l'utilisateur {0}"
            }
            UserContactDetailsNotFound => "Coordonnées introuvables pour l'utilisateur {0}",
            EmailInvalid => "L'adresse e-mail '{0}' n'est pas valide",
            EmailDuplicated => "L'adresse e-mail '{0}' est déjà utilisée par un autre utilisateur",
            FieldIsInvariant => "Le champ '{0}' ne peut pas être modifié",
            IdMismatch => "L'identifiant {0} ne correspond pas à {1}",
            TokenInvalid => "Le jeton de vérification {0} n'est pas valide",
            TokenExpired => "Le jeton de vérification {0} a expiré",
            UserHasNoEmail => "L'utilisateur {0} n'a pas d'adresse e-mail à vérifier",
            UserEmailAlreadyVerified => "L'adresse e-mail de l'utilisateur {0} est déjà vérifiée",
            DatabaseError => "Une erreur de stockage est survenue",
            InternalError => "Une erreur interne est survenue",
            EmailVerificationSuccess => "L'adresse e-mail {0} a été vérifiée",
            VerificationEmailSubject => "Vérifiez votre adresse e-mail",
            VerificationEmailBody => {
                "Veuillez confirmer {0} en ouvrant {1}\n\nLe lien expire le {2}."
            }
        },
    }
}

/// Render `key` for `locale`.
///
/// Placeholders without a matching parameter are left as written.
///
/// ```
/// use domain_contact_details::{resolve, Locale, MessageKey};
///
/// let text = resolve(MessageKey::EmailVerificationSuccess, Locale::En, &["a@x.com"]);
/// assert_eq!(text, "The email address a@x.com has been verified");
/// ```
pub fn resolve(key: MessageKey, locale: Locale, params: &[&str]) -> String {
    let template = template(key, locale);
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let substituted = after.find('}').and_then(|close| {
            let index: usize = after[..close].parse().ok()?;
            let value = params.get(index)?;
            Some((value, close))
        });

        match substituted {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_every_key_has_text_in_every_locale() {
        for locale in Locale::iter() {
            for key in MessageKey::iter() {
                assert!(!template(key, locale).is_empty(), "{key} / {locale}");
            }
        }
    }

    #[test]
    fn test_keys_are_namespaced() {
        for key in MessageKey::iter() {
            assert!(key.as_ref().starts_with("notification."), "{key}");
        }
        assert_eq!(
            MessageKey::TokenExpired.as_ref(),
            "notification.error.verification.tokenExpired"
        );
    }

    #[test]
    fn test_positional_parameters() {
        let text = resolve(MessageKey::IdMismatch, Locale::En, &["a", "b"]);
        assert_eq!(text, "The identifier a does not match b");
    }

    #[test]
    fn test_parameters_are_not_reinterpreted() {
        let text = resolve(MessageKey::IdMismatch, Locale::En, &["{1}", "b"]);
        assert_eq!(text, "The identifier {1} does not match b");
    }

    #[test]
    fn test_missing_parameter_keeps_placeholder() {
        let text = resolve(MessageKey::TokenInvalid, Locale::En, &[]);
        assert_eq!(text, "The verification token {0} is invalid");
    }

    #[test]
    fn test_french_catalog() {
        let text = resolve(MessageKey::EmailVerificationSuccess, Locale::Fr, &["a@x.com"]);
        assert_eq!(text, "L'adresse e-mail a@x.com a été vérifiée");
    }

    #[test]
    fn test_locale_negotiation() {
        assert_eq!(Locale::negotiate(&["de", "fr", "en"], Locale::En), Locale::Fr);
        assert_eq!(Locale::negotiate(&["de"], Locale::Fr), Locale::Fr);
        assert_eq!(Locale::negotiate::<&str>(&[], Locale::En), Locale::En);
        assert_eq!("FR".parse::<Locale>().unwrap(), Locale::Fr);
    }
}
