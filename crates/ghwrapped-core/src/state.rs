//! Lifecycle of an asynchronous fetch.
//!
//! `Idle -> Pending -> {Success, Failure}`. `start` may be called from any
//! state and discards what was there; completion is only accepted while
//! pending.

use std::future::Future;

use tracing::warn;

use crate::StatsError;

#[derive(Debug, Clone, PartialEq)]
pub enum FetchState<T> {
    Idle,
    Pending,
    Success(T),
    Failure(String),
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        FetchState::Idle
    }
}

impl<T> FetchState<T> {
    pub fn start(&mut self) {
        *self = FetchState::Pending;
    }

    /// Returns `false` (and keeps the current state) unless pending.
    pub fn succeed(&mut self, data: T) -> bool {
        if !self.is_loading() {
            warn!("ignoring fetch result outside of a pending fetch");
            return false;
        }
        *self = FetchState::Success(data);
        true
    }

    /// Returns `false` (and keeps the current state) unless pending.
    pub fn fail(&mut self, message: impl Into<String>) -> bool {
        if !self.is_loading() {
            warn!("ignoring fetch failure outside of a pending fetch");
            return false;
        }
        *self = FetchState::Failure(message.into());
        true
    }

    pub fn reset(&mut self) {
        *self = FetchState::Idle;
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, FetchState::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Pending)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FetchState::Success(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            FetchState::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            FetchState::Failure(message) => Some(message),
            _ => None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            FetchState::Success(data) => Some(data),
            _ => None,
        }
    }

    /// Drive one fetch to completion and return its data on success.
    pub async fn run<F>(&mut self, fetch: F) -> Option<&T>
    where
        F: Future<Output = Result<T, StatsError>>,
    {
        self.start();
        match fetch.await {
            Ok(data) => {
                self.succeed(data);
            }
            Err(e) => {
                self.fail(e.to_string());
            }
        }
        self.data()
    }
}
