//! Serializable gateway requests and their JSON replies

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use jc_core::error::JcError;
use jc_core::traits::ConsoleConnector;
use jc_core::{GroupId, UserId};

use super::Gateway;

/// One gateway operation with its arguments
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum GatewayRequest {
    CreateGroup {
        gid: String,
    },
    CreateUser {
        uid: String,
        gid: String,
        username: String,
        password: String,
    },
    CreateCustomer {
        username: String,
        password: String,
    },
    DeleteUser {
        uid: String,
    },
    DeleteGroup {
        gid: String,
    },
    DeleteCustomer {
        username: String,
    },
    ListUsers,
    ListGroups,
    EnableUser {
        uid: String,
    },
    DisableUser {
        uid: String,
    },
    UpdatePermissions {
        uid: String,
        permissions: BTreeMap<String, String>,
    },
    UpdateBalance {
        uid: String,
        balance: BTreeMap<String, String>,
    },
    ShowUser {
        uid: String,
    },
}

impl GatewayRequest {
    /// Command name, as typed on the command line
    pub fn name(&self) -> &'static str {
        match self {
            GatewayRequest::CreateGroup { .. } => "create_group",
            GatewayRequest::CreateUser { .. } => "create_user",
            GatewayRequest::CreateCustomer { .. } => "create_customer",
            GatewayRequest::DeleteUser { .. } => "delete_user",
            GatewayRequest::DeleteGroup { .. } => "delete_group",
            GatewayRequest::DeleteCustomer { .. } => "delete_customer",
            GatewayRequest::ListUsers => "list_users",
            GatewayRequest::ListGroups => "list_groups",
            GatewayRequest::EnableUser { .. } => "enable_user",
            GatewayRequest::DisableUser { .. } => "disable_user",
            GatewayRequest::UpdatePermissions { .. } => "update_permissions",
            GatewayRequest::UpdateBalance { .. } => "update_balance",
            GatewayRequest::ShowUser { .. } => "show_user",
        }
    }
}

// Passwords stay out of debug output
impl std::fmt::Debug for GatewayRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayRequest::CreateUser {
                uid, gid, username, ..
            } => f
                .debug_struct("CreateUser")
                .field("uid", uid)
                .field("gid", gid)
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            GatewayRequest::CreateCustomer { username, .. } => f
                .debug_struct("CreateCustomer")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            GatewayRequest::UpdatePermissions { uid, permissions } => f
                .debug_struct("UpdatePermissions")
                .field("uid", uid)
                .field("permissions", permissions)
                .finish(),
            GatewayRequest::UpdateBalance { uid, balance } => f
                .debug_struct("UpdateBalance")
                .field("uid", uid)
                .field("balance", balance)
                .finish(),
            GatewayRequest::CreateGroup { gid } | GatewayRequest::DeleteGroup { gid } => {
                write!(f, "{}({})", self.name(), gid)
            }
            GatewayRequest::DeleteCustomer { username } => {
                write!(f, "{}({})", self.name(), username)
            }
            GatewayRequest::DeleteUser { uid }
            | GatewayRequest::EnableUser { uid }
            | GatewayRequest::DisableUser { uid }
            | GatewayRequest::ShowUser { uid } => write!(f, "{}({})", self.name(), uid),
            GatewayRequest::ListUsers | GatewayRequest::ListGroups => {
                write!(f, "{}", self.name())
            }
        }
    }
}

pub(super) async fn dispatch<C: ConsoleConnector>(
    gateway: &mut Gateway<C>,
    request: GatewayRequest,
) -> Result<Value, JcError> {
    tracing::debug!(command = request.name(), "Dispatching request");

    let reply = match request {
        GatewayRequest::CreateGroup { gid } => {
            let confirmation = gateway.create_group(&GroupId::new(gid.as_str())).await?;
            json!({
                "success": true,
                "group_id": confirmation.identifier.unwrap_or(gid),
                "message": confirmation.message,
            })
        }
        GatewayRequest::CreateUser {
            uid,
            gid,
            username,
            password,
        } => {
            let confirmation = gateway
                .create_user(
                    &UserId::new(uid.as_str()),
                    &GroupId::new(gid.as_str()),
                    &username,
                    &password,
                )
                .await?;
            json!({
                "success": true,
                "username": username,
                "uid": uid,
                "gid": gid,
                "message": confirmation.message,
            })
        }
        GatewayRequest::CreateCustomer { username, password } => {
            let ids = gateway.create_customer(&username, &password).await?;
            json!({
                "success": true,
                "group_id": ids.group_id,
                "user_id": ids.user_id,
                "username": username,
            })
        }
        GatewayRequest::DeleteUser { uid } => {
            let response = gateway.delete_user(&UserId::new(uid)).await?;
            json!({ "success": true, "response": response })
        }
        GatewayRequest::DeleteGroup { gid } => {
            let response = gateway.delete_group(&GroupId::new(gid)).await?;
            json!({ "success": true, "response": response })
        }
        GatewayRequest::DeleteCustomer { username } => {
            let message = gateway.delete_customer(&username).await;
            json!({ "success": true, "message": message })
        }
        GatewayRequest::ListUsers => {
            let users = gateway.list_users().await?;
            json!({ "success": true, "count": users.len(), "users": users })
        }
        GatewayRequest::ListGroups => {
            let groups = gateway.list_groups().await?;
            json!({ "success": true, "count": groups.len(), "groups": groups })
        }
        GatewayRequest::EnableUser { uid } => {
            let response = gateway.enable_user(&UserId::new(uid)).await?;
            json!({ "success": true, "response": response })
        }
        GatewayRequest::DisableUser { uid } => {
            let response = gateway.disable_user(&UserId::new(uid)).await?;
            json!({ "success": true, "response": response })
        }
        GatewayRequest::UpdatePermissions { uid, permissions } => {
            let applied = gateway
                .update_user_permissions(&UserId::new(uid), &permissions)
                .await?;
            json!({
                "success": true,
                "message": "Permissions updated successfully",
                "permissions": applied,
            })
        }
        GatewayRequest::UpdateBalance { uid, balance } => {
            let applied = gateway
                .update_user_balance(&UserId::new(uid), &balance)
                .await?;
            json!({
                "success": true,
                "message": "Balance updated successfully",
                "balance_data": applied,
            })
        }
        GatewayRequest::ShowUser { uid } => {
            let detail = gateway.show_user(&UserId::new(uid)).await?;
            json!({
                "success": true,
                "response": detail.response,
                "mt_messaging_cred": detail.mt_messaging_cred,
            })
        }
    };

    Ok(reply)
}

/// JSON reply for a failed request
pub fn failure(error: &JcError) -> Value {
    json!({ "success": false, "error": error.to_string() })
}
