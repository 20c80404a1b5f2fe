//! In-memory [`EnvironmentClient`] used by the unit tests of this crate.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use github_client::models::{Environment, EnvironmentUpdatePayload, TeamRepository};
use github_client::{EnvironmentClient, Error, Team, User};

use crate::RepositoryIdentity;

pub(crate) const OWNER: &str = "owner";
pub(crate) const REPO: &str = "repo";

pub(crate) fn repository() -> RepositoryIdentity {
    RepositoryIdentity::new(OWNER, REPO).expect("valid repository")
}

/// Builds an environment record from its JSON wire form.
pub(crate) fn environment(value: serde_json::Value) -> Environment {
    serde_json::from_value(value).expect("Failed to deserialize Environment")
}

pub(crate) fn not_found() -> Error {
    Error::api("Not Found", Some(404))
}

/// A call received by the mock, in order of arrival.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    GetEnvironment(String),
    CreateOrUpdate(String, EnvironmentUpdatePayload),
    Delete(String),
    ListEnvironments,
    GetUser(String),
    GetTeam(String),
    ListTeamRepositories(String),
}

impl Call {
    fn is_mutating(&self) -> bool {
        matches!(self, Call::CreateOrUpdate(..) | Call::Delete(_))
    }
}

/// Mock GitHub client for testing.
///
/// Anything that was not configured answers with a `Not Found` error.
#[derive(Default)]
pub(crate) struct MockEnvironmentClient {
    // `None` stands for a successful response with a null body
    environments: Vec<(String, Option<Environment>)>,
    environment_errors: HashMap<String, Error>,
    list_error: Option<Error>,
    users: HashMap<String, Result<User, Error>>,
    teams: HashMap<String, Result<Team, Error>>,
    team_repositories: HashMap<String, Vec<TeamRepository>>,
    put_error: Option<Error>,
    delete_error: Option<Error>,
    calls: Mutex<Vec<Call>>,
}

impl MockEnvironmentClient {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_environment(mut self, name: &str, environment: Environment) -> Self {
        self.environments.push((name.to_string(), Some(environment)));
        self
    }

    /// Adds an existing environment without protection rules.
    pub(crate) fn with_empty_environment(self, name: &str) -> Self {
        let record = Environment {
            name: name.to_string(),
            ..Default::default()
        };
        self.with_environment(name, record)
    }

    pub(crate) fn with_null_environment(mut self, name: &str) -> Self {
        self.environments.push((name.to_string(), None));
        self
    }

    pub(crate) fn with_environment_error(mut self, name: &str, error: Error) -> Self {
        self.environment_errors.insert(name.to_string(), error);
        self
    }

    pub(crate) fn with_list_error(mut self, error: Error) -> Self {
        self.list_error = Some(error);
        self
    }

    pub(crate) fn with_user(mut self, login: &str, id: u64) -> Self {
        let user = User {
            id,
            login: login.to_string(),
        };
        self.users.insert(login.to_string(), Ok(user));
        self
    }

    pub(crate) fn with_user_error(mut self, login: &str, error: Error) -> Self {
        self.users.insert(login.to_string(), Err(error));
        self
    }

    pub(crate) fn with_team(mut self, slug: &str, id: u64) -> Self {
        let team = Team {
            id,
            slug: slug.to_string(),
            name: None,
        };
        self.teams.insert(slug.to_string(), Ok(team));
        self
    }

    pub(crate) fn with_team_error(mut self, slug: &str, error: Error) -> Self {
        self.teams.insert(slug.to_string(), Err(error));
        self
    }

    /// Grants the team access to the given repositories (`owner/repo`).
    pub(crate) fn with_team_access(mut self, slug: &str, repositories: &[&str]) -> Self {
        let repositories = repositories
            .iter()
            .map(|full_name| TeamRepository {
                full_name: full_name.to_string(),
            })
            .collect();
        self.team_repositories.insert(slug.to_string(), repositories);
        self
    }

    /// Adds a team that exists and may review deployments to `owner/repo`.
    pub(crate) fn with_accessible_team(self, slug: &str, id: u64) -> Self {
        self.with_team(slug, id)
            .with_team_access(slug, &[&format!("{}/{}", OWNER, REPO)])
    }

    pub(crate) fn with_put_error(mut self, error: Error) -> Self {
        self.put_error = Some(error);
        self
    }

    pub(crate) fn with_delete_error(mut self, error: Error) -> Self {
        self.delete_error = Some(error);
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub(crate) fn mutating_calls(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutating).collect()
    }

    /// Payloads of all create or update calls, in order.
    pub(crate) fn put_payloads(&self) -> Vec<(String, EnvironmentUpdatePayload)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::CreateOrUpdate(name, payload) => Some((name, payload)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().expect("calls lock").push(call);
    }

    fn check_repository(owner: &str, repo: &str) {
        assert_eq!(owner, OWNER, "unexpected owner");
        assert_eq!(repo, REPO, "unexpected repository");
    }
}

#[async_trait]
impl EnvironmentClient for MockEnvironmentClient {
    async fn get_environment(
        &self,
        owner: &str,
        repo: &str,
        name: &str,
    ) -> Result<Option<Environment>, Error> {
        Self::check_repository(owner, repo);
        self.record(Call::GetEnvironment(name.to_string()));

        if let Some(error) = self.environment_errors.get(name) {
            return Err(error.clone());
        }
        self.environments
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, record)| record.clone())
            .ok_or_else(not_found)
    }

    async fn create_or_update_environment(
        &self,
        owner: &str,
        repo: &str,
        name: &str,
        payload: &EnvironmentUpdatePayload,
    ) -> Result<(), Error> {
        Self::check_repository(owner, repo);
        self.record(Call::CreateOrUpdate(name.to_string(), payload.clone()));

        match &self.put_error {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    async fn delete_environment(&self, owner: &str, repo: &str, name: &str) -> Result<(), Error> {
        Self::check_repository(owner, repo);
        self.record(Call::Delete(name.to_string()));

        match &self.delete_error {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    async fn list_environments(&self, owner: &str, repo: &str) -> Result<Vec<String>, Error> {
        Self::check_repository(owner, repo);
        self.record(Call::ListEnvironments);

        match &self.list_error {
            Some(error) => Err(error.clone()),
            None => Ok(self.environments.iter().map(|(n, _)| n.clone()).collect()),
        }
    }

    async fn get_user_by_username(&self, username: &str) -> Result<User, Error> {
        self.record(Call::GetUser(username.to_string()));
        self.users
            .get(username)
            .cloned()
            .unwrap_or_else(|| Err(not_found()))
    }

    async fn get_team_by_slug(&self, org: &str, slug: &str) -> Result<Team, Error> {
        assert_eq!(org, OWNER, "teams are looked up in the repository owner");
        self.record(Call::GetTeam(slug.to_string()));
        self.teams
            .get(slug)
            .cloned()
            .unwrap_or_else(|| Err(not_found()))
    }

    async fn list_team_repositories(
        &self,
        org: &str,
        slug: &str,
    ) -> Result<Vec<TeamRepository>, Error> {
        assert_eq!(org, OWNER, "teams are looked up in the repository owner");
        self.record(Call::ListTeamRepositories(slug.to_string()));
        self.team_repositories
            .get(slug)
            .cloned()
            .ok_or_else(not_found)
    }
}
