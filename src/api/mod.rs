//! Thin wrappers around the Studywat backend
//!
//! [`Backend`] bundles one wrapper per resource over a shared
//! [`ApiClient`]. Public endpoints never ask for a token; the rest go
//! through the session's [`TokenProvider`].

pub mod auth;
pub mod client;
pub mod institutions;
pub mod normalize;
pub mod orchestrator;
pub mod profile;
pub mod program_lists;
pub mod programs;

use std::sync::Arc;

pub use client::{ApiClient, Auth, TokenProvider};

use auth::AuthApi;
use institutions::InstitutionsApi;
use orchestrator::OrchestratorApi;
use profile::ProfileApi;
use program_lists::ProgramListsApi;
use programs::ProgramsApi;

#[derive(Debug, Clone)]
pub struct Backend {
    pub programs: ProgramsApi,
    pub institutions: InstitutionsApi,
    pub program_lists: ProgramListsApi,
    pub profile: ProfileApi,
    pub orchestrator: OrchestratorApi,
}

impl Backend {
    /// `client` is the unauthenticated base client; `tokens` supplies bearer
    /// tokens for protected resources
    pub fn new(client: &ApiClient, tokens: Arc<dyn TokenProvider>) -> Self {
        let authed = client.with_tokens(tokens);
        Self {
            programs: ProgramsApi::new(client.clone()),
            institutions: InstitutionsApi::new(client.clone()),
            program_lists: ProgramListsApi::new(authed.clone()),
            profile: ProfileApi::new(authed.clone()),
            orchestrator: OrchestratorApi::new(authed),
        }
    }

    pub fn auth(client: &ApiClient) -> AuthApi {
        AuthApi::new(client.clone())
    }
}
