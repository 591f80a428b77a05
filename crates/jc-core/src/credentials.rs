//! MT messaging credentials: quotas and authorizations
//!
//! The console exposes these as `mt_messaging_cred quota <field> <value>`
//! and `mt_messaging_cred authorization <label> <value>` lines, both when
//! showing a user and when updating one.

use serde::{Deserialize, Serialize};

/// Sentinel the console prints for an unset quota
pub const NOT_DETERMINED: &str = "ND";

/// Console prefix of quota lines
pub const QUOTA_PREFIX: &str = "mt_messaging_cred quota";

/// Console prefix of authorization lines
pub const AUTHORIZATION_PREFIX: &str = "mt_messaging_cred authorization";

/// A quota field of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuotaField {
    Balance,
    SmsCount,
    EarlyPercent,
    HttpThroughput,
    SmppsThroughput,
}

impl QuotaField {
    /// All quota fields in console order
    pub const ALL: [QuotaField; 5] = [
        QuotaField::Balance,
        QuotaField::SmsCount,
        QuotaField::EarlyPercent,
        QuotaField::HttpThroughput,
        QuotaField::SmppsThroughput,
    ];

    /// Label used by the console
    pub fn label(self) -> &'static str {
        match self {
            QuotaField::Balance => "balance",
            QuotaField::SmsCount => "sms_count",
            QuotaField::EarlyPercent => "early_percent",
            QuotaField::HttpThroughput => "http_throughput",
            QuotaField::SmppsThroughput => "smpps_throughput",
        }
    }

    /// Short name used by the admin panel forms
    pub fn alias(self) -> &'static str {
        match self {
            QuotaField::Balance => "balance_amt",
            QuotaField::SmsCount => "balance_sms",
            QuotaField::EarlyPercent => "balance_percent",
            QuotaField::HttpThroughput => "http_tput",
            QuotaField::SmppsThroughput => "smpp_tput",
        }
    }

    /// Resolve a field from either its console label or its alias
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.label() == name || f.alias() == name)
    }

    /// Console line setting this field
    pub fn update_line(self, value: &str) -> String {
        format!("{} {} {}", QUOTA_PREFIX, self.label(), value)
    }
}

/// An authorization flag of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    HttpSend,
    DlrMethod,
    HttpBalance,
    SmppsSend,
    Priority,
    HttpLongContent,
    SrcAddr,
    DlrLevel,
    HttpRate,
    ValidityPeriod,
    HttpBulk,
    HexContent,
}

impl Permission {
    /// All permissions
    pub const ALL: [Permission; 12] = [
        Permission::HttpSend,
        Permission::DlrMethod,
        Permission::HttpBalance,
        Permission::SmppsSend,
        Permission::Priority,
        Permission::HttpLongContent,
        Permission::SrcAddr,
        Permission::DlrLevel,
        Permission::HttpRate,
        Permission::ValidityPeriod,
        Permission::HttpBulk,
        Permission::HexContent,
    ];

    /// Logical name, as used in JSON output and CLI arguments
    pub fn name(self) -> &'static str {
        match self {
            Permission::HttpSend => "http_send",
            Permission::DlrMethod => "dlr_method",
            Permission::HttpBalance => "http_balance",
            Permission::SmppsSend => "smpps_send",
            Permission::Priority => "priority",
            Permission::HttpLongContent => "http_long_content",
            Permission::SrcAddr => "src_addr",
            Permission::DlrLevel => "dlr_level",
            Permission::HttpRate => "http_rate",
            Permission::ValidityPeriod => "validity_period",
            Permission::HttpBulk => "http_bulk",
            Permission::HexContent => "hex_content",
        }
    }

    /// Label used by the console
    pub fn label(self) -> &'static str {
        match self {
            Permission::DlrMethod => "http_dlr_method",
            other => other.name(),
        }
    }

    /// Resolve a permission from either its logical name or console label
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.name() == name || p.label() == name)
    }

    /// Console line setting this permission
    pub fn update_line(self, granted: bool) -> String {
        format!(
            "{} {} {}",
            AUTHORIZATION_PREFIX,
            self.label(),
            if granted { 1 } else { 0 }
        )
    }
}

/// Parse a permission value given as `0`/`1` or `true`/`false`
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}

/// Quota values; `"ND"` when the console did not report one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quota {
    pub balance: String,
    pub sms_count: String,
    pub early_percent: String,
    pub http_throughput: String,
    pub smpps_throughput: String,
}

impl Default for Quota {
    fn default() -> Self {
        Self {
            balance: NOT_DETERMINED.to_string(),
            sms_count: NOT_DETERMINED.to_string(),
            early_percent: NOT_DETERMINED.to_string(),
            http_throughput: NOT_DETERMINED.to_string(),
            smpps_throughput: NOT_DETERMINED.to_string(),
        }
    }
}

impl Quota {
    /// Set one field
    pub fn set(&mut self, field: QuotaField, value: impl Into<String>) {
        let slot = match field {
            QuotaField::Balance => &mut self.balance,
            QuotaField::SmsCount => &mut self.sms_count,
            QuotaField::EarlyPercent => &mut self.early_percent,
            QuotaField::HttpThroughput => &mut self.http_throughput,
            QuotaField::SmppsThroughput => &mut self.smpps_throughput,
        };
        *slot = value.into();
    }

    /// Read one field
    pub fn get(&self, field: QuotaField) -> &str {
        match field {
            QuotaField::Balance => &self.balance,
            QuotaField::SmsCount => &self.sms_count,
            QuotaField::EarlyPercent => &self.early_percent,
            QuotaField::HttpThroughput => &self.http_throughput,
            QuotaField::SmppsThroughput => &self.smpps_throughput,
        }
    }
}

/// Authorization flags; `false` unless the console reports `True`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authorization {
    pub http_send: bool,
    pub dlr_method: bool,
    pub http_balance: bool,
    pub smpps_send: bool,
    pub priority: bool,
    pub http_long_content: bool,
    pub src_addr: bool,
    pub dlr_level: bool,
    pub http_rate: bool,
    pub validity_period: bool,
    pub http_bulk: bool,
    pub hex_content: bool,
}

impl Authorization {
    fn slot(&mut self, permission: Permission) -> &mut bool {
        match permission {
            Permission::HttpSend => &mut self.http_send,
            Permission::DlrMethod => &mut self.dlr_method,
            Permission::HttpBalance => &mut self.http_balance,
            Permission::SmppsSend => &mut self.smpps_send,
            Permission::Priority => &mut self.priority,
            Permission::HttpLongContent => &mut self.http_long_content,
            Permission::SrcAddr => &mut self.src_addr,
            Permission::DlrLevel => &mut self.dlr_level,
            Permission::HttpRate => &mut self.http_rate,
            Permission::ValidityPeriod => &mut self.validity_period,
            Permission::HttpBulk => &mut self.http_bulk,
            Permission::HexContent => &mut self.hex_content,
        }
    }

    /// Set one flag
    pub fn set(&mut self, permission: Permission, granted: bool) {
        *self.slot(permission) = granted;
    }

    /// Read one flag
    pub fn get(&self, permission: Permission) -> bool {
        match permission {
            Permission::HttpSend => self.http_send,
            Permission::DlrMethod => self.dlr_method,
            Permission::HttpBalance => self.http_balance,
            Permission::SmppsSend => self.smpps_send,
            Permission::Priority => self.priority,
            Permission::HttpLongContent => self.http_long_content,
            Permission::SrcAddr => self.src_addr,
            Permission::DlrLevel => self.dlr_level,
            Permission::HttpRate => self.http_rate,
            Permission::ValidityPeriod => self.validity_period,
            Permission::HttpBulk => self.http_bulk,
            Permission::HexContent => self.hex_content,
        }
    }
}

/// The `mt_messaging_cred` section of a user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagingCredentials {
    pub quota: Quota,
    pub authorization: Authorization,
}
