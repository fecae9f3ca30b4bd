//! # fg-authn
//!
//! Remote authentication result translation for the federation gateway.
//!
//! A remote IdP hands over a [`fg_model::RemotelyAuthenticatedInput`]. The
//! [`RemoteAuthnTranslator`] runs the translation profile configured for
//! the authenticator, reconciles the local store and decides the outcome.
//!
//! ## Outcomes
//!
//! - `Successful`: mapped to an enabled local entity
//! - `SuccessfulPartial`: dry run, nothing written
//! - `UnknownRemotePrincipal`: no local counterpart
//! - `Denied`: a profile policy or a disabled account stopped the login
//!
//! ## Example
//!
//! ```ignore
//! use fg_authn::{RemoteAuthnTranslator, TranslationOptions};
//!
//! let translator = RemoteAuthnTranslator::from_store(store, repository, registry);
//! let outcome = translator
//!     .get_translated_result(&input, "ldap", &TranslationOptions::new())
//!     .await?;
//! if let Some(entity) = outcome.entity() {
//!     println!("logged in as {}", entity.entity_id);
//! }
//! ```

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod error;
pub mod principal;
pub mod translator;

pub use error::{AuthError, AuthResult};
pub use principal::{
    AuthenticatedEntity, DenyReason, RemoteAuthenticationResult, RemotelyAuthenticatedPrincipal,
};
pub use translator::{RemoteAuthnTranslator, TranslationOptions};
