//! Account and auth token storage.

use async_trait::async_trait;
use pagination::PageWindow;
use tracing::debug;

use super::{Account, InMemorySocialStore, PasswordHash};
use crate::domain::ports::{AccountRepository, AccountRepositoryError};
use crate::domain::{AuthToken, Identity, LoginCredentials, UserId, UserName};

fn issue_token(
    tokens: &mut std::collections::HashMap<String, UserName>,
    account: &mut Account,
) -> AuthToken {
    if let Some(previous) = account.token.take() {
        tokens.remove(&previous);
    }
    let token = AuthToken::generate();
    tokens.insert(token.expose().to_owned(), account.name.clone());
    account.token = Some(token.expose().to_owned());
    token
}

#[async_trait]
impl AccountRepository for InMemorySocialStore {
    async fn user_exists(&self, name: &UserName) -> Result<bool, AccountRepositoryError> {
        let state = self.read().map_err(AccountRepositoryError::query)?;
        Ok(state.accounts.contains_key(name))
    }

    async fn find_user_id(
        &self,
        name: &UserName,
    ) -> Result<Option<UserId>, AccountRepositoryError> {
        let state = self.read().map_err(AccountRepositoryError::query)?;
        Ok(state.accounts.get(name).map(|account| account.id.clone()))
    }

    async fn add_user(
        &self,
        name: &UserName,
        password: &str,
    ) -> Result<AuthToken, AccountRepositoryError> {
        let mut guard = self.write().map_err(AccountRepositoryError::query)?;
        let state = &mut *guard;
        if state.accounts.contains_key(name) {
            return Err(AccountRepositoryError::query(format!(
                "account {name} already exists"
            )));
        }
        let mut account = Account {
            id: UserId::random(),
            name: name.clone(),
            password: PasswordHash::new(password),
            token: None,
        };
        let token = issue_token(&mut state.tokens, &mut account);
        state.names.insert(account.id.clone(), name.clone());
        state.registrations.push(name.clone());
        state.accounts.insert(name.clone(), account);
        debug!(user = %name, "account stored");
        Ok(token)
    }

    async fn verify_password(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<bool, AccountRepositoryError> {
        let state = self.read().map_err(AccountRepositoryError::query)?;
        Ok(state
            .accounts
            .get(credentials.username())
            .is_some_and(|account| account.password.matches(credentials.password())))
    }

    async fn add_auth(&self, name: &UserName) -> Result<AuthToken, AccountRepositoryError> {
        let mut guard = self.write().map_err(AccountRepositoryError::query)?;
        let state = &mut *guard;
        let account = state
            .accounts
            .get_mut(name)
            .ok_or_else(|| AccountRepositoryError::query(format!("unknown account {name}")))?;
        Ok(issue_token(&mut state.tokens, account))
    }

    async fn delete_auth(&self, name: &UserName) -> Result<(), AccountRepositoryError> {
        let mut guard = self.write().map_err(AccountRepositoryError::query)?;
        let state = &mut *guard;
        if let Some(previous) = state
            .accounts
            .get_mut(name)
            .and_then(|account| account.token.take())
        {
            state.tokens.remove(&previous);
        }
        Ok(())
    }

    async fn identity_for_token(
        &self,
        token: &AuthToken,
    ) -> Result<Option<Identity>, AccountRepositoryError> {
        let state = self.read().map_err(AccountRepositoryError::query)?;
        Ok(state
            .tokens
            .get(token.expose())
            .and_then(|name| state.accounts.get(name))
            .map(|account| Identity::new(account.id.clone(), account.name.clone())))
    }

    async fn newest_users(
        &self,
        window: &PageWindow,
    ) -> Result<Vec<UserName>, AccountRepositoryError> {
        let state = self.read().map_err(AccountRepositoryError::query)?;
        let newest: Vec<UserName> = state.registrations.iter().rev().cloned().collect();
        if window.is_full_range() {
            Ok(newest.into_iter().take(self.settings.newest_users).collect())
        } else {
            Ok(self.page_of(&newest, window).items)
        }
    }
}
