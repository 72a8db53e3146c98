// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Login handshake state machine.
//!
//! The integration port asks for a user name, then a password, and then
//! prints its `GNET> ` prompt whenever it is ready for a command:
//!
//! ```text
//! AwaitingUsername --"login: "--> AwaitingPassword --"password: "--> SteadyState
//! ```
//!
//! An unexpected prompt leaves the state unchanged. Nothing retries; the
//! connection stalls until the controller sends the expected prompt or the
//! link drops.

use serde::Deserialize;

/// Prompt tokens printed by the controller.
///
/// Defaults match RadioRA 2 Main Repeater firmware. Other Lutron systems use
/// different ready markers (`QNET>` on Quantum / `HomeWorks QS`), so every
/// token can be overridden.
///
/// # Examples
///
/// ```
/// use radiora_lib::protocol::Prompts;
///
/// let prompts = Prompts::default();
/// assert!(prompts.is_login("login: "));
/// assert!(prompts.is_password("password:"));
/// assert_eq!(prompts.match_ready("GNET> "), Some(""));
///
/// let quantum = Prompts::default().with_ready("QNET>");
/// assert_eq!(quantum.match_ready("QNET> "), Some(""));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Prompts {
    /// Token that starts the user name prompt.
    pub login: String,
    /// Token that starts the password prompt.
    pub password: String,
    /// Marker of the command prompt.
    pub ready: String,
}

impl Default for Prompts {
    fn default() -> Self {
        Self {
            login: "login:".to_string(),
            password: "password:".to_string(),
            ready: "GNET>".to_string(),
        }
    }
}

impl Prompts {
    /// Sets the login token.
    #[must_use]
    pub fn with_login(mut self, token: impl Into<String>) -> Self {
        self.login = token.into();
        self
    }

    /// Sets the password token.
    #[must_use]
    pub fn with_password(mut self, token: impl Into<String>) -> Self {
        self.password = token.into();
        self
    }

    /// Sets the ready marker.
    #[must_use]
    pub fn with_ready(mut self, marker: impl Into<String>) -> Self {
        self.ready = marker.into();
        self
    }

    /// Returns true if `input` is the user name prompt.
    #[must_use]
    pub fn is_login(&self, input: &str) -> bool {
        matches_token(input, &self.login)
    }

    /// Returns true if `input` is the password prompt.
    #[must_use]
    pub fn is_password(&self, input: &str) -> bool {
        matches_token(input, &self.password)
    }

    /// Looks for the ready marker followed by whitespace (or end of input).
    ///
    /// Returns the trimmed text after the marker, which is non-empty when the
    /// controller printed a report on the same line as its prompt.
    #[must_use]
    pub fn match_ready<'a>(&self, input: &'a str) -> Option<&'a str> {
        let start = input.find(self.ready.as_str())?;
        let rest = &input[start + self.ready.len()..];
        match rest.chars().next() {
            None => Some(""),
            Some(c) if c.is_whitespace() => Some(rest.trim()),
            Some(_) => None,
        }
    }
}

/// Prefix match with only whitespace allowed after the token.
fn matches_token(input: &str, token: &str) -> bool {
    input
        .strip_prefix(token)
        .is_some_and(|rest| rest.trim().is_empty())
}

/// Current position in the login handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginState {
    /// Waiting for the user name prompt.
    #[default]
    AwaitingUsername,
    /// User name sent, waiting for the password prompt.
    AwaitingPassword,
    /// Credentials sent; every further line is a report or a prompt.
    SteadyState,
}

/// What the caller must do with an input fed to [`LoginState::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginStep<'a> {
    /// Write the user name.
    SendUsername,
    /// Write the password.
    SendPassword,
    /// The input did not match the expected prompt; state is unchanged.
    Desync {
        /// State that rejected the input.
        state: LoginState,
        /// The offending input.
        input: &'a str,
    },
    /// Handshake is over; hand the line to the steady-state handler.
    Steady(&'a str),
}

impl LoginState {
    /// Feeds one line or prompt and transitions.
    #[must_use]
    pub fn advance<'a>(&mut self, input: &'a str, prompts: &Prompts) -> LoginStep<'a> {
        match *self {
            Self::AwaitingUsername if prompts.is_login(input) => {
                *self = Self::AwaitingPassword;
                LoginStep::SendUsername
            }
            Self::AwaitingPassword if prompts.is_password(input) => {
                *self = Self::SteadyState;
                LoginStep::SendPassword
            }
            Self::AwaitingUsername | Self::AwaitingPassword => LoginStep::Desync {
                state: *self,
                input,
            },
            Self::SteadyState => LoginStep::Steady(input),
        }
    }
}
