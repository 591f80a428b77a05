//! Parsers for jCli listing and detail output
//!
//! Listings are fixed-width tables framed by a `#`-prefixed header and a
//! `Total ...` footer. Rows start with `#` (enabled) or `#!` (disabled)
//! followed by whitespace-separated columns.

use crate::credentials::{MessagingCredentials, Permission, QuotaField};
use crate::types::{Group, GroupId, User, UserId, UserStatus};

/// Lines containing any of these are not group rows
const GROUP_LISTING_SKIP: [&str; 3] = ["Total", "Group id", "---"];

/// Lines containing any of these are not user rows
const USER_LISTING_SKIP: [&str; 8] = [
    "Total",
    "User id",
    "Group id",
    "Username",
    "Balance",
    "MT SMS",
    "Throughput",
    "---",
];

/// First tokens left behind by the echoed listing command
const ECHO_TOKENS: [&str; 4] = ["group", "user", "-l", "jcli"];

fn data_lines<'a>(text: &'a str, skip: &'a [&'a str]) -> impl Iterator<Item = &'a str> + 'a {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(move |line| !skip.iter().any(|marker| line.contains(marker)))
}

fn strip_marker(token: &str) -> &str {
    token.trim_start_matches(|c| c == '!' || c == '#')
}

fn is_identifier(token: &str) -> bool {
    !token.is_empty() && !ECHO_TOKENS.contains(&token)
}

/// Status encoded in a row prefix
pub fn row_status(line: &str) -> UserStatus {
    if line.starts_with("#!") || line.starts_with("!#") {
        UserStatus::Disabled
    } else if line.starts_with('#') {
        UserStatus::Enabled
    } else {
        UserStatus::Unknown
    }
}

/// Parse the output of `group -l`
pub fn parse_group_listing(text: &str) -> Vec<Group> {
    data_lines(text, &GROUP_LISTING_SKIP)
        .filter_map(|line| line.split_whitespace().next())
        .map(strip_marker)
        .filter(|id| is_identifier(id))
        .map(Group::new)
        .collect()
}

/// Parse the output of `user -l`.
///
/// Credentials are not part of the listing and come back as defaults.
pub fn parse_user_listing(text: &str) -> Vec<User> {
    data_lines(text, &USER_LISTING_SKIP)
        .filter_map(|line| {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 3 {
                return None;
            }
            let uid = strip_marker(parts[0]);
            if !is_identifier(uid) {
                return None;
            }
            Some(User {
                uid: UserId::new(uid),
                gid: GroupId::new(parts[1]),
                username: parts[2].to_string(),
                status: row_status(line),
                mt_messaging_cred: MessagingCredentials::default(),
            })
        })
        .collect()
}

/// Parse the credential lines of `user -s <uid>`
pub fn parse_user_detail(text: &str) -> MessagingCredentials {
    let mut creds = MessagingCredentials::default();

    for line in text.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 4 || parts[0] != "mt_messaging_cred" {
            continue;
        }
        match parts[1] {
            "quota" => {
                if let Some(field) = QuotaField::from_name(parts[2]) {
                    creds.quota.set(field, parts[parts.len() - 1]);
                }
            }
            "authorization" => {
                if let Some(permission) = Permission::from_name(parts[2]) {
                    creds.authorization.set(permission, line.contains("True"));
                }
            }
            _ => {}
        }
    }

    creds
}
