//! Customer resolution: name/phone drafts, debounced suggestion lookups and
//! the staleness guard on their responses.
//!
//! The resolver is a plain state machine. It never sleeps and never calls the
//! gateway itself; the session asks it when the next lookup is due
//! ([`CustomerResolver::next_deadline`]), dispatches what
//! [`CustomerResolver::poll_due`] hands out, and feeds responses back through
//! [`CustomerResolver::complete`]. Time is passed in, so every transition is
//! testable without a clock.
//!
//! ```text
//!            keystroke (>= 2 chars, significant)
//!   Idle ─────────────────────────────────────────▶ Debouncing{query, deadline}
//!    ▲                                                 │   ▲ keystroke: query replaced,
//!    │ response / reset                      deadline  │   │ deadline pushed back
//!    │                                        reached  ▼   │
//!    ├──────────────────────────────────────── InFlight{token, query}
//!    │                                           │    ▲
//!    │                          draft != query   ▼    │ draft == query again
//!    └──────────────────────────────────────── Stale{token, query}
//! ```

use std::time::Duration;

use tokio::time::Instant;

use tillpoint_parties::Customer;

use crate::gateway::GatewayError;

/// Drafts shorter than this (in characters) never trigger a lookup.
pub const MIN_QUERY_CHARS: usize = 2;

/// Identifies one dispatched lookup. Tokens increase monotonically.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LookupToken(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupPhase {
    Idle,
    /// A lookup for `query` fires at `deadline` unless another keystroke
    /// pushes it back.
    Debouncing { query: String, deadline: Instant },
    /// A lookup for the current draft is on the wire.
    InFlight { token: LookupToken, query: String },
    /// A lookup is on the wire but the draft has moved on; its response will
    /// be discarded unless the draft comes back to `query`.
    Stale { token: LookupToken, query: String },
}

/// Lookup the session must send to the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    pub token: LookupToken,
    pub query: String,
}

/// Gateway answer to a [`LookupRequest`], tagged with its originating query.
#[derive(Debug, Clone)]
pub struct LookupResponse {
    pub token: LookupToken,
    pub query: String,
    pub result: Result<Vec<Customer>, GatewayError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// Suggestions replaced with `count` candidates.
    Applied { count: usize },
    /// The lookup for the current draft failed; suggestions were cleared.
    Failed(GatewayError),
    /// The response no longer matched the draft and was dropped.
    Discarded,
}

#[derive(Debug, Clone)]
pub struct CustomerResolver {
    name_draft: String,
    phone_draft: String,
    suggestions: Vec<Customer>,
    last_queried_name: String,
    phase: LookupPhase,
    quiet_window: Duration,
    next_token: u64,
    /// Responses carrying a token below this are ignored.
    token_floor: u64,
    discarded: u64,
}

impl CustomerResolver {
    pub fn new(quiet_window: Duration) -> Self {
        Self {
            name_draft: String::new(),
            phone_draft: String::new(),
            suggestions: Vec::new(),
            last_queried_name: String::new(),
            phase: LookupPhase::Idle,
            quiet_window,
            next_token: 0,
            token_floor: 0,
            discarded: 0,
        }
    }

    pub fn name_draft(&self) -> &str {
        &self.name_draft
    }

    pub fn phone_draft(&self) -> &str {
        &self.phone_draft
    }

    pub fn suggestions(&self) -> &[Customer] {
        &self.suggestions
    }

    /// Query of the last lookup actually dispatched.
    pub fn last_queried_name(&self) -> &str {
        &self.last_queried_name
    }

    pub fn phase(&self) -> &LookupPhase {
        &self.phase
    }

    /// Number of responses dropped by the staleness guard so far.
    pub fn discarded_responses(&self) -> u64 {
        self.discarded
    }

    /// When the pending debounce timer fires, if one is pending.
    pub fn next_deadline(&self) -> Option<Instant> {
        match &self.phase {
            LookupPhase::Debouncing { deadline, .. } => Some(*deadline),
            _ => None,
        }
    }

    /// Store a new name draft; returns whether a lookup is now scheduled.
    pub fn update_name_draft(&mut self, text: &str, now: Instant) -> bool {
        self.name_draft = text.to_string();

        if text.chars().count() < MIN_QUERY_CHARS {
            self.suggestions.clear();
            if matches!(self.phase, LookupPhase::Debouncing { .. }) {
                self.phase = LookupPhase::Idle;
            }
            self.refresh_staleness();
            return false;
        }

        let deadline = now + self.quiet_window;

        if let LookupPhase::Debouncing {
            query,
            deadline: pending,
        } = &mut self.phase
        {
            *query = text.to_string();
            *pending = deadline;
            tracing::debug!(query = %text, "suggestion lookup rescheduled");
            return true;
        }

        if differs_significantly(text, &self.last_queried_name) {
            self.phase = LookupPhase::Debouncing {
                query: text.to_string(),
                deadline,
            };
            tracing::debug!(query = %text, "suggestion lookup scheduled");
            return true;
        }

        self.refresh_staleness();
        false
    }

    /// Store a new phone draft. Phone edits never trigger a lookup.
    pub fn update_phone_draft(&mut self, text: &str) {
        self.phone_draft = text.to_string();
    }

    /// Hand out the debounced lookup once its deadline has passed.
    pub fn poll_due(&mut self, now: Instant) -> Option<LookupRequest> {
        match std::mem::replace(&mut self.phase, LookupPhase::Idle) {
            LookupPhase::Debouncing { query, deadline } if deadline <= now => {
                let token = LookupToken(self.next_token);
                self.next_token += 1;
                self.last_queried_name = query.clone();
                self.phase = LookupPhase::InFlight {
                    token,
                    query: query.clone(),
                };
                tracing::debug!(token = token.0, query = %query, "suggestion lookup dispatched");
                Some(LookupRequest { token, query })
            }
            other => {
                self.phase = other;
                None
            }
        }
    }

    /// Apply a lookup response if it still matches the current draft.
    pub fn complete(&mut self, response: LookupResponse) -> LookupOutcome {
        if let LookupPhase::InFlight { token, .. } | LookupPhase::Stale { token, .. } = &self.phase {
            if *token == response.token {
                self.phase = LookupPhase::Idle;
            }
        }

        if response.token.0 < self.token_floor || response.query != self.name_draft {
            self.discarded += 1;
            tracing::debug!(
                token = response.token.0,
                query = %response.query,
                draft = %self.name_draft,
                "stale suggestion response discarded"
            );
            return LookupOutcome::Discarded;
        }

        self.token_floor = response.token.0 + 1;
        match response.result {
            Ok(candidates) => {
                let count = candidates.len();
                self.suggestions = candidates;
                LookupOutcome::Applied { count }
            }
            Err(err) => {
                self.suggestions.clear();
                LookupOutcome::Failed(err)
            }
        }
    }

    /// Adopt a chosen suggestion: drafts mirror it, suggestions go away and
    /// nothing still pending may repopulate them.
    pub fn select_suggestion(&mut self, customer: &Customer) {
        self.name_draft = customer.name.clone();
        self.phone_draft = customer.phone.clone();
        self.last_queried_name = customer.name.clone();
        self.suggestions.clear();
        self.phase = LookupPhase::Idle;
        self.token_floor = self.next_token;
    }

    /// Back to empty drafts; responses already on the wire are ignored.
    pub fn reset(&mut self) {
        self.name_draft.clear();
        self.phone_draft.clear();
        self.suggestions.clear();
        self.last_queried_name.clear();
        self.phase = LookupPhase::Idle;
        self.token_floor = self.next_token;
    }

    fn refresh_staleness(&mut self) {
        let next = match &self.phase {
            LookupPhase::InFlight { token, query } if *query != self.name_draft => {
                LookupPhase::Stale {
                    token: *token,
                    query: query.clone(),
                }
            }
            LookupPhase::Stale { token, query } if *query == self.name_draft => {
                LookupPhase::InFlight {
                    token: *token,
                    query: query.clone(),
                }
            }
            _ => return,
        };
        self.phase = next;
    }
}

/// Whether `text` warrants a fresh lookup compared to the last dispatched
/// query: neither contains the other, or the length moved by more than one.
pub fn differs_significantly(text: &str, last_query: &str) -> bool {
    if last_query.is_empty() {
        return true;
    }
    let delta = text.chars().count().abs_diff(last_query.chars().count());
    delta > 1 || !(last_query.contains(text) || text.contains(last_query))
}
