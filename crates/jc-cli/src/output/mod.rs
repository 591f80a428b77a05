//! Output formatting utilities for the CLI
//!
//! Gateway replies are printed as a single JSON object on stdout. Listings
//! can instead be rendered as tables, and human-facing diagnostics use
//! colored status lines.

use clap::ValueEnum;
use serde_json::Value;
use tabled::{
    settings::{Style, Width},
    Table, Tabled,
};

use jc_core::{Group, User};

/// How command replies are printed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One JSON object
    #[default]
    Json,
    /// Tables for listings, JSON for everything else
    Table,
}

/// Render a gateway reply in the requested format
pub fn render_reply(reply: &Value, format: OutputFormat) -> String {
    if format == OutputFormat::Table && reply["success"] == Value::Bool(true) {
        if let Some(table) = reply_table(reply) {
            return table;
        }
    }

    reply.to_string()
}

/// Print a gateway reply to stdout
pub fn print_reply(reply: &Value, format: OutputFormat) {
    println!("{}", render_reply(reply, format));
}

/// Listing replies carry `users` or `groups`; anything else has no table form
fn reply_table(reply: &Value) -> Option<String> {
    if let Some(users) = reply.get("users") {
        let users: Vec<User> = serde_json::from_value(users.clone()).ok()?;
        return Some(format_users(&users));
    }
    if let Some(groups) = reply.get("groups") {
        let groups: Vec<Group> = serde_json::from_value(groups.clone()).ok()?;
        return Some(format_groups(&groups));
    }
    None
}

/// Format a list of users as an ASCII table
///
/// Returns "No users defined" if the list is empty.
pub fn format_users(users: &[User]) -> String {
    if users.is_empty() {
        return "No users defined".to_string();
    }

    #[derive(Tabled)]
    struct UserRow {
        #[tabled(rename = "UID")]
        uid: String,
        #[tabled(rename = "GID")]
        gid: String,
        #[tabled(rename = "USERNAME")]
        username: String,
        #[tabled(rename = "STATUS")]
        status: String,
        #[tabled(rename = "BALANCE")]
        balance: String,
        #[tabled(rename = "SMS COUNT")]
        sms_count: String,
    }

    let rows: Vec<UserRow> = users
        .iter()
        .map(|u| UserRow {
            uid: truncate(u.uid.as_str(), 24),
            gid: truncate(u.gid.as_str(), 24),
            username: u.username.clone(),
            status: u.status.to_string(),
            balance: u.mt_messaging_cred.quota.balance.clone(),
            sms_count: u.mt_messaging_cred.quota.sms_count.clone(),
        })
        .collect();

    Table::new(rows)
        .with(Style::rounded())
        .with(Width::wrap(100))
        .to_string()
}

/// Format a list of groups as an ASCII table
pub fn format_groups(groups: &[Group]) -> String {
    if groups.is_empty() {
        return "No groups defined".to_string();
    }

    #[derive(Tabled)]
    struct GroupRow {
        #[tabled(rename = "GID")]
        gid: String,
    }

    let rows: Vec<GroupRow> = groups
        .iter()
        .map(|g| GroupRow {
            gid: g.id.to_string(),
        })
        .collect();

    Table::new(rows).with(Style::rounded()).to_string()
}

/// Truncate a string with ellipsis if too long
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Print a success message in green with a checkmark prefix
pub fn print_success(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stdout = std::io::stdout();
    let _ = crossterm::execute!(
        stdout,
        SetForegroundColor(Color::Green),
        Print("✓ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print an error message in red with an X prefix
///
/// Outputs to stderr so stdout stays machine-readable.
pub fn print_error(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stderr = std::io::stderr();
    let _ = crossterm::execute!(
        stderr,
        SetForegroundColor(Color::Red),
        Print("✗ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print a warning message in yellow to stderr
pub fn print_warning(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stderr = std::io::stderr();
    let _ = crossterm::execute!(
        stderr,
        SetForegroundColor(Color::Yellow),
        Print("⚠ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print an informational message in cyan
pub fn print_info(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stdout = std::io::stdout();
    let _ = crossterm::execute!(
        stdout,
        SetForegroundColor(Color::Cyan),
        Print("ℹ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn listed_user(uid: &str, status: &str) -> Value {
        json!({
            "uid": uid,
            "gid": "g1",
            "username": "alice",
            "status": status,
            "mt_messaging_cred": {
                "quota": {
                    "balance": "100",
                    "sms_count": "ND",
                    "early_percent": "ND",
                    "http_throughput": "ND",
                    "smpps_throughput": "ND"
                },
                "authorization": {
                    "http_send": true,
                    "dlr_method": true,
                    "http_balance": false,
                    "smpps_send": true,
                    "priority": false,
                    "http_long_content": true,
                    "src_addr": false,
                    "dlr_level": true,
                    "http_rate": false,
                    "validity_period": false,
                    "http_bulk": false,
                    "hex_content": false
                }
            }
        })
    }

    #[test]
    fn test_json_format_is_compact_object() {
        let reply = json!({ "success": true, "count": 0, "groups": [] });
        let rendered = render_reply(&reply, OutputFormat::Json);
        assert_eq!(serde_json::from_str::<Value>(&rendered).unwrap(), reply);
        assert!(!rendered.contains('\n'));
    }

    #[test]
    fn test_group_table() {
        let reply = json!({ "success": true, "count": 2, "groups": ["g1", "g2"] });
        let rendered = render_reply(&reply, OutputFormat::Table);
        assert!(rendered.contains("GID"));
        assert!(rendered.contains("g1"));
        assert!(rendered.contains("g2"));
    }

    #[test]
    fn test_user_table() {
        let reply = json!({
            "success": true,
            "count": 1,
            "users": [listed_user("u1", "disabled")]
        });
        let rendered = render_reply(&reply, OutputFormat::Table);
        assert!(rendered.contains("USERNAME"));
        assert!(rendered.contains("alice"));
        assert!(rendered.contains("disabled"));
        assert!(rendered.contains("100"));
    }

    #[test]
    fn test_failures_stay_json_in_table_format() {
        let reply = json!({ "success": false, "error": "Unknown User: u9" });
        assert_eq!(render_reply(&reply, OutputFormat::Table), reply.to_string());
    }

    #[test]
    fn test_non_listing_stays_json_in_table_format() {
        let reply = json!({ "success": true, "response": "Successfully enabled User id:u1" });
        assert_eq!(render_reply(&reply, OutputFormat::Table), reply.to_string());
    }

    #[test]
    fn test_empty_listings() {
        assert_eq!(format_users(&[]), "No users defined");
        assert_eq!(format_groups(&[]), "No groups defined");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a_very_long_identifier", 10), "a_very_...");
    }
}
