//! In-memory jCli console for session and gateway tests
//!
//! `Jcli` mimics the console's prompts, forms and phrasing closely enough
//! for the session state machine to run against it without a socket.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use jc_core::config::{BackoffConfig, ConsoleConfig, CustomerConfig};
use jc_core::error::{ConnectionError, ConsoleError};
use jc_core::traits::{ConsoleConnector, TextConsole};
use jc_protocol::{ExpectBuffer, ExpectMatch};
use jc_session::{ConsoleSession, Gateway};

const PERMISSION_LABELS: [&str; 12] = [
    "http_send",
    "http_dlr_method",
    "http_balance",
    "smpps_send",
    "priority",
    "http_long_content",
    "src_addr",
    "dlr_level",
    "http_rate",
    "validity_period",
    "http_bulk",
    "hex_content",
];

const QUOTA_LABELS: [&str; 5] = [
    "balance",
    "early_percent",
    "sms_count",
    "http_throughput",
    "smpps_throughput",
];

#[derive(Debug, Clone)]
pub struct FakeUser {
    pub uid: String,
    pub gid: String,
    pub username: String,
    pub enabled: bool,
    pub quota: BTreeMap<String, String>,
    pub authorization: BTreeMap<String, bool>,
}

enum Form {
    Group { gid: Option<String> },
    User { fields: BTreeMap<String, String> },
    Update { uid: String, lines: Vec<String> },
}

enum Phase {
    Closed,
    Username,
    Password(String),
    Ready,
    Form(Form),
}

/// Simulated console state
pub struct Jcli {
    pub username: String,
    pub password: String,
    pub groups: Vec<String>,
    pub users: Vec<FakeUser>,
    /// Every line received, in order
    pub sent: Vec<String>,
    pub opens: usize,
    pub logins: usize,
    pub persists: usize,
    pub refuse_connections: bool,
    pub fail_persist: bool,
    /// Save forms without printing a result line
    pub quiet_saves: bool,
    /// Produce no output for lines starting with this
    pub stall_on: Option<String>,
    /// Close the stream on lines starting with this
    pub hangup_on: Option<String>,
    phase: Phase,
}

impl Jcli {
    pub fn new() -> Self {
        Self {
            username: "jcliadmin".to_string(),
            password: "jclipwd".to_string(),
            groups: Vec::new(),
            users: Vec::new(),
            sent: Vec::new(),
            opens: 0,
            logins: 0,
            persists: 0,
            refuse_connections: false,
            fail_persist: false,
            quiet_saves: false,
            stall_on: None,
            hangup_on: None,
            phase: Phase::Closed,
        }
    }

    pub fn add_group(&mut self, gid: &str) {
        self.groups.push(gid.to_string());
    }

    pub fn add_user(&mut self, uid: &str, gid: &str, username: &str) {
        self.users.push(FakeUser {
            uid: uid.to_string(),
            gid: gid.to_string(),
            username: username.to_string(),
            enabled: true,
            quota: BTreeMap::new(),
            authorization: BTreeMap::new(),
        });
    }

    pub fn user(&self, uid: &str) -> Option<&FakeUser> {
        self.users.iter().find(|u| u.uid == uid)
    }

    /// Whether any received line starts with `prefix`
    pub fn received(&self, prefix: &str) -> bool {
        self.sent.iter().any(|line| line.starts_with(prefix))
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.phase, Phase::Closed)
    }

    fn open(&mut self) -> String {
        self.opens += 1;
        self.phase = Phase::Username;
        "Authentication required.\n\nUsername: ".to_string()
    }

    fn input(&mut self, line: &str) -> String {
        self.sent.push(line.to_string());

        if let Some(prefix) = &self.hangup_on {
            if line.starts_with(prefix.as_str()) {
                self.phase = Phase::Closed;
                return String::new();
            }
        }
        if let Some(prefix) = &self.stall_on {
            if line.starts_with(prefix.as_str()) {
                return String::new();
            }
        }

        match std::mem::replace(&mut self.phase, Phase::Closed) {
            Phase::Closed => String::new(),
            Phase::Username => {
                self.phase = Phase::Password(line.to_string());
                format!("{}\nPassword: ", line)
            }
            Phase::Password(user) => {
                if user == self.username && line == self.password {
                    self.logins += 1;
                    self.phase = Phase::Ready;
                    "\nWelcome to Jasmin console\nType help or ? to list commands.\n\njcli : "
                        .to_string()
                } else {
                    self.phase = Phase::Username;
                    "\nIncorrect Username/Password.\n\nUsername: ".to_string()
                }
            }
            Phase::Ready => self.command(line),
            Phase::Form(form) => self.form_step(form, line),
        }
    }

    fn command(&mut self, line: &str) -> String {
        self.phase = Phase::Ready;
        let words: Vec<&str> = line.split_whitespace().collect();

        let body = match words.as_slice() {
            ["quit"] => {
                self.phase = Phase::Closed;
                return String::new();
            }
            ["persist"] => {
                if self.fail_persist {
                    "Error: could not write configuration".to_string()
                } else {
                    self.persists += 1;
                    "default configuration persisted (profile:jcli-prod)".to_string()
                }
            }
            ["group", "-a"] => {
                self.phase = Phase::Form(Form::Group { gid: None });
                return format!("{}\nAdding a new Group: (ok: save, ko: exit)\n> ", line);
            }
            ["user", "-a"] => {
                self.phase = Phase::Form(Form::User {
                    fields: BTreeMap::new(),
                });
                return format!("{}\nAdding a new User: (ok: save, ko: exit)\n> ", line);
            }
            ["user", "-u", uid] => {
                if self.user(uid).is_some() {
                    self.phase = Phase::Form(Form::Update {
                        uid: uid.to_string(),
                        lines: Vec::new(),
                    });
                    return format!("{}\nUpdating User id {}: (ok: save, ko: exit)\n> ", line, uid);
                }
                format!("Unknown User: {}", uid)
            }
            ["group", "-l"] => self.group_listing(),
            ["user", "-l"] => self.user_listing(),
            ["user", "-s", uid] => self.user_detail(uid),
            ["user", "-r", uid] => match self.users.iter().position(|u| u.uid == *uid) {
                Some(pos) => {
                    self.users.remove(pos);
                    format!("Successfully removed User id:{}", uid)
                }
                None => format!("Unknown User: {}", uid),
            },
            ["group", "-r", gid] => match self.groups.iter().position(|g| g == gid) {
                Some(pos) => {
                    self.groups.remove(pos);
                    format!("Successfully removed Group id:{}", gid)
                }
                None => format!("Unknown Group: {}", gid),
            },
            ["user", "-e", uid] => self.toggle(uid, true),
            ["user", "-d", uid] => self.toggle(uid, false),
            _ => format!("Unknown command: {}", line),
        };

        format!("{}\n{}\njcli : ", line, body)
    }

    fn toggle(&mut self, uid: &str, enabled: bool) -> String {
        match self.users.iter_mut().find(|u| u.uid == uid) {
            Some(user) => {
                user.enabled = enabled;
                let verb = if enabled { "enabled" } else { "disabled" };
                format!("Successfully {} User id:{}", verb, uid)
            }
            None => format!("Unknown User: {}", uid),
        }
    }

    fn group_listing(&self) -> String {
        let mut out = String::from("#Group id\n");
        for gid in &self.groups {
            out.push_str(&format!("#{}\n", gid));
        }
        out.push_str(&format!("Total Groups: {}", self.groups.len()));
        out
    }

    fn user_listing(&self) -> String {
        let mut out = String::from(
            "#User id          Group id         Username         Balance MT SMS Throughput\n",
        );
        for user in &self.users {
            let marker = if user.enabled { "#" } else { "#!" };
            out.push_str(&format!(
                "{}{:<16} {:<16} {:<16} ND      ND     ND/ND\n",
                marker, user.uid, user.gid, user.username
            ));
        }
        out.push_str(&format!("Total Users: {}", self.users.len()));
        out
    }

    fn user_detail(&self, uid: &str) -> String {
        let Some(user) = self.user(uid) else {
            return format!("Unknown User: {}", uid);
        };

        let mut out = format!("username {}\nuid {}\ngid {}\n", user.username, user.uid, user.gid);
        for label in QUOTA_LABELS {
            let value = user.quota.get(label).map(String::as_str).unwrap_or("ND");
            out.push_str(&format!("mt_messaging_cred quota {} {}\n", label, value));
        }
        for label in PERMISSION_LABELS {
            let granted = user.authorization.get(label).copied().unwrap_or(false);
            let value = if granted { "True" } else { "False" };
            out.push_str(&format!("mt_messaging_cred authorization {} {}\n", label, value));
        }
        out.trim_end().to_string()
    }

    fn form_step(&mut self, mut form: Form, line: &str) -> String {
        let echo = if line.starts_with("password ") {
            String::new()
        } else {
            format!("{}\n", line)
        };

        match line.trim() {
            "ko" => {
                self.phase = Phase::Ready;
                return format!("{}jcli : ", echo);
            }
            "ok" => return self.save(form, echo),
            _ => {}
        }

        if let Some((key, value)) = line.split_once(' ') {
            match &mut form {
                Form::Group { gid } => {
                    if key == "gid" {
                        *gid = Some(value.trim().to_string());
                    }
                }
                Form::User { fields } => {
                    fields.insert(key.to_string(), value.trim().to_string());
                }
                Form::Update { lines, .. } => lines.push(line.to_string()),
            }
        }

        self.phase = Phase::Form(form);
        format!("{}> ", echo)
    }

    fn save(&mut self, form: Form, echo: String) -> String {
        let saved = |this: &Self, message: String| {
            if this.quiet_saves {
                format!("{}jcli : ", echo)
            } else {
                format!("{}{}\njcli : ", echo, message)
            }
        };

        match form {
            Form::Group { gid: None } => {
                self.phase = Phase::Form(Form::Group { gid: None });
                "You must set these options before saving: gid\n> ".to_string()
            }
            Form::Group { gid: Some(gid) } => {
                if self.groups.contains(&gid) {
                    let message = format!("Error: Group id [{}] already exists\n> ", gid);
                    self.phase = Phase::Form(Form::Group { gid: Some(gid) });
                    return message;
                }
                self.groups.push(gid.clone());
                self.phase = Phase::Ready;
                saved(self, format!("Successfully added Group [{}]", gid))
            }
            Form::User { fields } => {
                let missing: Vec<&str> = ["uid", "gid", "username", "password"]
                    .into_iter()
                    .filter(|key| !fields.contains_key(*key))
                    .collect();

                let problem = if !missing.is_empty() {
                    Some(format!(
                        "You must set these options before saving: {}",
                        missing.join(", ")
                    ))
                } else if !self.groups.contains(&fields["gid"]) {
                    Some(format!("Unknown Group: {}", fields["gid"]))
                } else if self.user(&fields["uid"]).is_some() {
                    Some(format!("Error: User id [{}] already exists", fields["uid"]))
                } else {
                    None
                };

                if let Some(problem) = problem {
                    self.phase = Phase::Form(Form::User { fields });
                    return format!("{}{}\n> ", echo, problem);
                }

                let (uid, gid) = (fields["uid"].clone(), fields["gid"].clone());
                self.add_user(&uid, &gid, &fields["username"]);
                self.phase = Phase::Ready;
                saved(
                    self,
                    format!("Successfully added User [{}] to Group [{}]", uid, gid),
                )
            }
            Form::Update { uid, lines } => {
                if let Some(user) = self.users.iter_mut().find(|u| u.uid == uid) {
                    for line in &lines {
                        let parts: Vec<&str> = line.split_whitespace().collect();
                        match parts.as_slice() {
                            ["mt_messaging_cred", "quota", label, value] => {
                                user.quota.insert(label.to_string(), value.to_string());
                            }
                            ["mt_messaging_cred", "authorization", label, value] => {
                                user.authorization.insert(label.to_string(), *value == "1");
                            }
                            _ => {}
                        }
                    }
                }
                self.phase = Phase::Ready;
                saved(self, format!("Successfully updated User [{}]", uid))
            }
        }
    }
}

/// Console side of one connection to the simulated jCli
pub struct FakeConsole {
    jcli: Arc<Mutex<Jcli>>,
    buffer: ExpectBuffer,
    closed: bool,
}

#[async_trait]
impl TextConsole for FakeConsole {
    async fn send_line(&mut self, line: &str) -> Result<(), ConsoleError> {
        if self.closed {
            return Err(ConsoleError::Eof);
        }
        let output = self.jcli.lock().unwrap().input(line);
        self.buffer.push_str(&output);
        Ok(())
    }

    async fn expect_any(
        &mut self,
        markers: &[&str],
        timeout: Duration,
    ) -> Result<ExpectMatch, ConsoleError> {
        if let Some(found) = self.buffer.take_match(markers) {
            return Ok(found);
        }
        if self.closed || self.jcli.lock().unwrap().is_closed() {
            return Err(ConsoleError::Eof);
        }
        Err(ConsoleError::Timeout {
            expected: markers.iter().map(|m| m.to_string()).collect(),
            waited: timeout,
        })
    }

    async fn close(&mut self) -> Result<(), ConsoleError> {
        self.closed = true;
        Ok(())
    }
}

/// Connector handing out consoles on a shared `Jcli`
#[derive(Clone)]
pub struct FakeConnector {
    pub jcli: Arc<Mutex<Jcli>>,
}

#[async_trait]
impl ConsoleConnector for FakeConnector {
    type Console = FakeConsole;

    async fn open(&self) -> Result<FakeConsole, ConnectionError> {
        let banner = {
            let mut jcli = self.jcli.lock().unwrap();
            if jcli.refuse_connections {
                jcli.opens += 1;
                return Err(ConnectionError::Refused("fake-jcli: connection refused".into()));
            }
            jcli.open()
        };

        let mut buffer = ExpectBuffer::new();
        buffer.push_str(&banner);
        Ok(FakeConsole {
            jcli: Arc::clone(&self.jcli),
            buffer,
            closed: false,
        })
    }

    fn target(&self) -> String {
        "fake-jcli".to_string()
    }
}

pub fn console_config() -> ConsoleConfig {
    ConsoleConfig {
        timeout: Duration::from_millis(200),
        backoff: BackoffConfig {
            initial: Duration::from_millis(1),
            max: Duration::from_millis(5),
            multiplier: 2.0,
            jitter: 0.0,
        },
        ..ConsoleConfig::default()
    }
}

pub fn customer_config() -> CustomerConfig {
    CustomerConfig {
        settle_delay: Duration::ZERO,
        ..CustomerConfig::default()
    }
}

pub fn session_with(config: ConsoleConfig) -> (Arc<Mutex<Jcli>>, ConsoleSession<FakeConnector>) {
    let jcli = Arc::new(Mutex::new(Jcli::new()));
    let connector = FakeConnector {
        jcli: Arc::clone(&jcli),
    };
    (jcli, ConsoleSession::new(connector, config))
}

pub fn session() -> (Arc<Mutex<Jcli>>, ConsoleSession<FakeConnector>) {
    session_with(console_config())
}

pub fn gateway_with(config: ConsoleConfig) -> (Arc<Mutex<Jcli>>, Gateway<FakeConnector>) {
    let (jcli, session) = session_with(config);
    (jcli, Gateway::new(session, customer_config()))
}

pub fn gateway() -> (Arc<Mutex<Jcli>>, Gateway<FakeConnector>) {
    gateway_with(console_config())
}
