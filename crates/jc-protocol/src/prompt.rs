//! Literal text exchanged with the jCli console

/// Shown by the console when it wants the login name
pub const LOGIN_PROMPT: &str = "Username: ";

/// Shown by the console when it wants the password
pub const PASSWORD_PROMPT: &str = "Password: ";

/// Ready-for-command prompt
pub const STANDARD_PROMPT: &str = "jcli : ";

/// Sub-prompt shown while a multi-step form is open
pub const INTERACTIVE_PROMPT: &str = "> ";

/// Saves the in-memory configuration to disk
pub const PERSIST_COMMAND: &str = "persist";

/// Ends the console session
pub const QUIT_COMMAND: &str = "quit";

/// Saves an open form
pub const FORM_SAVE: &str = "ok";

/// Abandons an open form
pub const FORM_ABORT: &str = "ko";

/// Markers that end the output of a command, in match priority order
pub const COMMAND_PROMPTS: [&str; 2] = [STANDARD_PROMPT, INTERACTIVE_PROMPT];
