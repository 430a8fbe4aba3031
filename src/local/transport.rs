//! Authenticated git transport options.

use git2::{Cred, CredentialType, FetchOptions, RemoteCallbacks};

use crate::github::PersonalAccessToken;

/// Username GitHub accepts alongside a token for HTTPS git operations.
const TOKEN_USERNAME: &str = "x-access-token";

/// Builds fetch options answering credential prompts with `token`.
///
/// The credential callback answers once per operation; a second prompt
/// means the token was rejected and is reported as an error instead of
/// looping.
pub(super) fn fetch_options(token: Option<&PersonalAccessToken>) -> FetchOptions<'_> {
    let mut callbacks = RemoteCallbacks::new();
    let mut prompted = false;
    callbacks.credentials(move |_url, _username, allowed| {
        let Some(credential) = token else {
            return Err(git2::Error::from_str("remote requires credentials"));
        };
        if prompted {
            return Err(git2::Error::from_str("access token was rejected"));
        }
        prompted = true;
        if !allowed.contains(CredentialType::USER_PASS_PLAINTEXT) {
            return Err(git2::Error::from_str(
                "remote does not accept token authentication",
            ));
        }
        Cred::userpass_plaintext(TOKEN_USERNAME, credential.value())
    });

    let mut options = FetchOptions::new();
    options.remote_callbacks(callbacks);
    options
}

/// Builds the HTTPS clone URL of `owner/name` under `base_url`.
pub(super) fn remote_url(base_url: &str, owner: &str, name: &str) -> String {
    format!("{}/{owner}/{name}.git", base_url.trim_end_matches('/'))
}
