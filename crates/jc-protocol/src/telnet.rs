//! Telnet command bytes and option negotiation policy
//!
//! The jCli console runs behind a telnet server that opens the
//! conversation with a handful of option offers. The client only needs
//! enough of RFC 854 to answer those offers and strip the command bytes
//! out of the text stream.

/// Interpret As Command
pub const IAC: u8 = 255;
/// Subnegotiation begin
pub const SB: u8 = 250;
/// Subnegotiation end
pub const SE: u8 = 240;
/// Go ahead
pub const GA: u8 = 249;

/// Echo option (RFC 857)
pub const OPT_ECHO: u8 = 1;
/// Suppress go-ahead option (RFC 858)
pub const OPT_SUPPRESS_GO_AHEAD: u8 = 3;

/// Option negotiation verbs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelnetCommand {
    Will,
    Wont,
    Do,
    Dont,
}

impl TelnetCommand {
    /// Parse a negotiation verb from its byte value
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            251 => Some(Self::Will),
            252 => Some(Self::Wont),
            253 => Some(Self::Do),
            254 => Some(Self::Dont),
            _ => None,
        }
    }

    /// Byte value on the wire
    pub fn as_u8(self) -> u8 {
        match self {
            Self::Will => 251,
            Self::Wont => 252,
            Self::Do => 253,
            Self::Dont => 254,
        }
    }
}

/// Decide how to answer a negotiation received from the server.
///
/// The server may echo and suppress go-ahead; everything else is refused,
/// and the client itself never enables an option. Returns `None` when no
/// reply is required.
pub fn negotiation_reply(command: TelnetCommand, option: u8) -> Option<(TelnetCommand, u8)> {
    match command {
        TelnetCommand::Will if option == OPT_ECHO || option == OPT_SUPPRESS_GO_AHEAD => {
            Some((TelnetCommand::Do, option))
        }
        TelnetCommand::Will => Some((TelnetCommand::Dont, option)),
        TelnetCommand::Do => Some((TelnetCommand::Wont, option)),
        TelnetCommand::Wont | TelnetCommand::Dont => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_byte_mapping() {
        for cmd in [
            TelnetCommand::Will,
            TelnetCommand::Wont,
            TelnetCommand::Do,
            TelnetCommand::Dont,
        ] {
            assert_eq!(TelnetCommand::from_u8(cmd.as_u8()), Some(cmd));
        }
        assert_eq!(TelnetCommand::from_u8(IAC), None);
    }

    #[test]
    fn test_server_echo_is_accepted() {
        assert_eq!(
            negotiation_reply(TelnetCommand::Will, OPT_ECHO),
            Some((TelnetCommand::Do, OPT_ECHO))
        );
        assert_eq!(
            negotiation_reply(TelnetCommand::Will, OPT_SUPPRESS_GO_AHEAD),
            Some((TelnetCommand::Do, OPT_SUPPRESS_GO_AHEAD))
        );
    }

    #[test]
    fn test_other_options_are_refused() {
        // NAWS
        assert_eq!(
            negotiation_reply(TelnetCommand::Will, 31),
            Some((TelnetCommand::Dont, 31))
        );
        assert_eq!(
            negotiation_reply(TelnetCommand::Do, OPT_ECHO),
            Some((TelnetCommand::Wont, OPT_ECHO))
        );
        assert_eq!(negotiation_reply(TelnetCommand::Dont, OPT_ECHO), None);
    }
}
