//! Entity operations on top of a console session
//!
//! Every operation is a command template over the two session primitives.
//! Changes are made durable with `persist`: creations and credential
//! updates fail when it fails, deletes and toggles only log it.

mod request;

pub use request::{failure, GatewayRequest};

use std::collections::BTreeMap;

use serde::Serialize;

use jc_core::config::CustomerConfig;
use jc_core::credentials::{
    parse_flag, MessagingCredentials, Permission, QuotaField, NOT_DETERMINED,
};
use jc_core::error::{CommandError, JcError};
use jc_core::parse::{parse_group_listing, parse_user_detail, parse_user_listing};
use jc_core::traits::ConsoleConnector;
use jc_core::types::CustomerIds;
use jc_core::{Group, GroupId, User, UserId};
use jc_protocol::prompt::{FORM_SAVE, PERSIST_COMMAND};
use jc_protocol::{has_error_marker, Outcome};

use crate::session::ConsoleSession;

/// Message reported by `delete_customer`
pub const CUSTOMER_DELETED: &str = "Customer deleted";

/// A change the console accepted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Confirmation {
    /// Identifier the console echoed back, if any
    pub identifier: Option<String>,
    /// Console response text
    pub message: String,
}

/// Output of `user -s`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserDetail {
    /// Raw console response
    pub response: String,
    /// Credentials scraped from the response
    pub mt_messaging_cred: MessagingCredentials,
}

/// jCli user and group administration
pub struct Gateway<C: ConsoleConnector> {
    session: ConsoleSession<C>,
    customer: CustomerConfig,
}

impl<C: ConsoleConnector> Gateway<C> {
    /// Create a gateway over `session`
    pub fn new(session: ConsoleSession<C>, customer: CustomerConfig) -> Self {
        Self { session, customer }
    }

    /// Close the console session
    pub async fn disconnect(&mut self) {
        self.session.disconnect().await;
    }

    /// Create a group
    pub async fn create_group(&mut self, gid: &GroupId) -> Result<Confirmation, JcError> {
        let steps = vec![format!("gid {}", gid), FORM_SAVE.to_string()];
        let outcome = self.session.execute_interactive("group -a", &steps).await?;
        let confirmation = self.accept(outcome)?;
        self.persist().await?;

        tracing::info!("Created group {}", gid);
        Ok(confirmation)
    }

    /// Create a user in an existing group
    pub async fn create_user(
        &mut self,
        uid: &UserId,
        gid: &GroupId,
        username: &str,
        password: &str,
    ) -> Result<Confirmation, JcError> {
        let steps = vec![
            format!("uid {}", uid),
            format!("gid {}", gid),
            format!("username {}", username),
            format!("password {}", password),
            FORM_SAVE.to_string(),
        ];
        let outcome = self.session.execute_interactive("user -a", &steps).await?;
        let confirmation = self.accept(outcome)?;
        self.persist().await?;

        tracing::info!("Created user {} in group {}", uid, gid);
        Ok(confirmation)
    }

    /// Create a customer's group, then its user.
    ///
    /// No user is attempted when the group fails. A user failure leaves the
    /// group in place.
    pub async fn create_customer(
        &mut self,
        username: &str,
        password: &str,
    ) -> Result<CustomerIds, JcError> {
        let ids = CustomerIds::derive(username, &self.customer);

        self.create_group(&ids.group_id).await?;

        tokio::time::sleep(self.customer.settle_delay).await;

        if let Err(e) = self
            .create_user(&ids.user_id, &ids.group_id, username, password)
            .await
        {
            tracing::warn!(
                "User {} failed after group {} was created: {}",
                ids.user_id,
                ids.group_id,
                e
            );
            return Err(
                CommandError::Rejected(format!("Group created but user failed: {}", e)).into(),
            );
        }

        Ok(ids)
    }

    /// Remove a user
    pub async fn delete_user(&mut self, uid: &UserId) -> Result<String, JcError> {
        self.simple_change(&format!("user -r {}", uid)).await
    }

    /// Remove a group
    pub async fn delete_group(&mut self, gid: &GroupId) -> Result<String, JcError> {
        self.simple_change(&format!("group -r {}", gid)).await
    }

    /// Remove a customer's user, then its group.
    ///
    /// Always reports success; individual failures are only logged.
    pub async fn delete_customer(&mut self, username: &str) -> String {
        let ids = CustomerIds::derive(username, &self.customer);

        if let Err(e) = self.delete_user(&ids.user_id).await {
            tracing::warn!("Deleting user {} failed: {}", ids.user_id, e);
        }
        if let Err(e) = self.delete_group(&ids.group_id).await {
            tracing::warn!("Deleting group {} failed: {}", ids.group_id, e);
        }

        CUSTOMER_DELETED.to_string()
    }

    /// List all groups
    pub async fn list_groups(&mut self) -> Result<Vec<Group>, JcError> {
        let response = self.session.execute_simple("group -l").await?;
        Ok(parse_group_listing(&response))
    }

    /// List all users, with credentials fetched one user at a time
    pub async fn list_users(&mut self) -> Result<Vec<User>, JcError> {
        let response = self.session.execute_simple("user -l").await?;
        let mut users = parse_user_listing(&response);

        for user in &mut users {
            match self.session.execute_simple(&format!("user -s {}", user.uid)).await {
                Ok(detail) => user.mt_messaging_cred = parse_user_detail(&detail),
                Err(e) if e.breaks_session() => return Err(e),
                Err(e) => {
                    tracing::warn!("Could not read details of user {}: {}", user.uid, e);
                }
            }
        }

        Ok(users)
    }

    /// Show one user
    pub async fn show_user(&mut self, uid: &UserId) -> Result<UserDetail, JcError> {
        let response = self.session.execute_simple(&format!("user -s {}", uid)).await?;
        if has_error_marker(&response) {
            return Err(CommandError::Rejected(response).into());
        }

        Ok(UserDetail {
            mt_messaging_cred: parse_user_detail(&response),
            response,
        })
    }

    /// Enable a user
    pub async fn enable_user(&mut self, uid: &UserId) -> Result<String, JcError> {
        self.simple_change(&format!("user -e {}", uid)).await
    }

    /// Disable a user
    pub async fn disable_user(&mut self, uid: &UserId) -> Result<String, JcError> {
        self.simple_change(&format!("user -d {}", uid)).await
    }

    /// Set authorization flags.
    ///
    /// Values are `0`/`1` or `true`/`false`. Unknown names and values are
    /// skipped. Returns the flags that were sent, by logical name.
    pub async fn update_user_permissions(
        &mut self,
        uid: &UserId,
        permissions: &BTreeMap<String, String>,
    ) -> Result<BTreeMap<String, bool>, JcError> {
        let mut applied = BTreeMap::new();
        let mut steps = Vec::new();

        for (name, value) in permissions {
            let Some(permission) = Permission::from_name(name) else {
                tracing::warn!("Skipping unknown permission '{}'", name);
                continue;
            };
            let Some(granted) = parse_flag(value) else {
                tracing::warn!("Skipping permission '{}' with value '{}'", name, value);
                continue;
            };
            steps.push(permission.update_line(granted));
            applied.insert(permission.name().to_string(), granted);
        }

        if steps.is_empty() {
            return Err(
                CommandError::InvalidArgument("No valid permissions to update".into()).into(),
            );
        }

        self.update_user(uid, steps).await?;
        Ok(applied)
    }

    /// Set quota values.
    ///
    /// Fields are accepted by console label or short alias; empty and `ND`
    /// values are skipped. Returns the values that were sent, by label.
    pub async fn update_user_balance(
        &mut self,
        uid: &UserId,
        balance: &BTreeMap<String, String>,
    ) -> Result<BTreeMap<String, String>, JcError> {
        let mut applied = BTreeMap::new();
        let mut steps = Vec::new();

        for (name, value) in balance {
            let value = value.trim();
            if value.is_empty() || value == NOT_DETERMINED {
                continue;
            }
            let Some(field) = QuotaField::from_name(name) else {
                tracing::warn!("Skipping unknown quota field '{}'", name);
                continue;
            };
            steps.push(field.update_line(value));
            applied.insert(field.label().to_string(), value.to_string());
        }

        if steps.is_empty() {
            return Err(CommandError::InvalidArgument(
                "No valid balance settings to update".into(),
            )
            .into());
        }

        self.update_user(uid, steps).await?;
        Ok(applied)
    }

    /// Run `request` and render the JSON reply
    pub async fn dispatch(
        &mut self,
        request: GatewayRequest,
    ) -> Result<serde_json::Value, JcError> {
        request::dispatch(self, request).await
    }

    async fn update_user(&mut self, uid: &UserId, mut steps: Vec<String>) -> Result<(), JcError> {
        steps.push(FORM_SAVE.to_string());
        let outcome = self
            .session
            .execute_interactive(&format!("user -u {}", uid), &steps)
            .await?;
        self.accept(outcome)?;
        self.persist().await?;

        tracing::info!("Updated user {}", uid);
        Ok(())
    }

    /// Run a one-line change, then persist without failing on it
    async fn simple_change(&mut self, command: &str) -> Result<String, JcError> {
        let response = self.session.execute_simple(command).await?;
        if has_error_marker(&response) {
            return Err(CommandError::Rejected(response).into());
        }

        if let Err(e) = self.persist().await {
            tracing::warn!("'{}' applied but not persisted: {}", command, e);
        }
        Ok(response)
    }

    async fn persist(&mut self) -> Result<(), JcError> {
        let response = self
            .session
            .execute_simple(PERSIST_COMMAND)
            .await
            .map_err(|e| CommandError::Persistence(e.to_string()))?;

        if has_error_marker(&response) {
            return Err(CommandError::Persistence(response).into());
        }

        tracing::debug!(%response, "Configuration persisted");
        Ok(())
    }

    fn accept(&self, outcome: Outcome) -> Result<Confirmation, JcError> {
        match outcome {
            Outcome::Success {
                identifier,
                message,
            } => Ok(Confirmation {
                identifier,
                message,
            }),
            Outcome::Failure { message } => Err(CommandError::Rejected(message).into()),
            Outcome::Ambiguous { text } if self.session.config().strict_responses => {
                Err(CommandError::ProtocolMismatch(text).into())
            }
            Outcome::Ambiguous { text } => {
                tracing::warn!(response = %text, "Accepting unrecognized console response");
                Ok(Confirmation {
                    identifier: None,
                    message: text,
                })
            }
        }
    }
}
