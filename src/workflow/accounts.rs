use uuid::Uuid;
use validator::Validate;

use crate::auth;
use crate::models::{Session, SignUpRequest, User};
use crate::store::{NewUserRecord, StoreError};
use crate::workflow::{WorkflowError, WorkflowService};

impl WorkflowService {
    /// Creates the user plus its profile, then establishes a session so the
    /// new account is authenticated immediately. `parent_email` is stored
    /// as given; it only feeds notifications for students.
    pub async fn sign_up(
        &self,
        request: SignUpRequest,
    ) -> Result<(User, Session), WorkflowError> {
        request
            .validate()
            .map_err(|e| WorkflowError::Validation(e.to_string()))?;

        let password_hash = auth::hash_password(&request.password)
            .map_err(|e| WorkflowError::Validation(e.to_string()))?;

        let user = match self
            .store
            .create_user(NewUserRecord {
                username: request.username,
                email: request.email,
                password_hash,
            })
            .await
        {
            Ok(user) => user,
            Err(StoreError::Duplicate) => {
                return Err(WorkflowError::Validation(
                    "That username is already taken.".into(),
                ))
            }
            Err(err) => return Err(err.into()),
        };

        self.store
            .create_profile(user.id, request.role, request.parent_email)
            .await?;

        let session = self.store.create_session(user.id).await?;
        Ok((user, session))
    }

    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(User, Session), WorkflowError> {
        let user = self
            .store
            .user_by_username(username)
            .await?
            .filter(|user| auth::verify_password(password, &user.password_hash))
            .ok_or_else(|| WorkflowError::Forbidden("Invalid username or password.".into()))?;

        let session = self.store.create_session(user.id).await?;
        Ok((user, session))
    }

    pub async fn logout(&self, token: Uuid) -> Result<(), WorkflowError> {
        self.store.delete_session(token).await?;
        Ok(())
    }
}
