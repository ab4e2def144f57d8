#[derive(Eq, Hash, PartialEq, Debug, Clone, Copy)]
pub enum FtpCommand {
    USER,
    PASS,
    ACCT,
    QUIT,
    FEAT,
    PORT,
    PASV,
    SYST,
    HELP,
    NOOP,
    CWD,
    CDUP,
    SMNT,
    REIN,
    RETR,
    TYPE,
    STRU,
    MODE,
    STOR,
    STOU,
    APPE,
    ALLO,
    REST,
    RNFR,
    RNTO,
    ABOR,
    DELE,
    RMD,
    MKD,
    PWD,
    LIST,
    NLST,
    SITE,
}

impl FtpCommand {
    pub fn from_str(cmd: &str) -> Option<FtpCommand> {
        match cmd.to_ascii_uppercase().as_str() {
            "USER" => Some(FtpCommand::USER),
            "PASS" => Some(FtpCommand::PASS),
            "ACCT" => Some(FtpCommand::ACCT),
            "QUIT" => Some(FtpCommand::QUIT),
            "FEAT" => Some(FtpCommand::FEAT),
            "PORT" => Some(FtpCommand::PORT),
            "PASV" => Some(FtpCommand::PASV),
            "SYST" => Some(FtpCommand::SYST),
            "HELP" => Some(FtpCommand::HELP),
            "NOOP" => Some(FtpCommand::NOOP),
            "CWD" => Some(FtpCommand::CWD),
            "CDUP" => Some(FtpCommand::CDUP),
            "SMNT" => Some(FtpCommand::SMNT),
            "REIN" => Some(FtpCommand::REIN),
            "RETR" => Some(FtpCommand::RETR),
            "TYPE" => Some(FtpCommand::TYPE),
            "STRU" => Some(FtpCommand::STRU),
            "MODE" => Some(FtpCommand::MODE),
            "STOR" => Some(FtpCommand::STOR),
            "STOU" => Some(FtpCommand::STOU),
            "APPE" => Some(FtpCommand::APPE),
            "ALLO" => Some(FtpCommand::ALLO),
            "REST" => Some(FtpCommand::REST),
            "RNFR" => Some(FtpCommand::RNFR),
            "RNTO" => Some(FtpCommand::RNTO),
            "ABOR" => Some(FtpCommand::ABOR),
            "DELE" => Some(FtpCommand::DELE),
            "RMD" => Some(FtpCommand::RMD),
            "MKD" => Some(FtpCommand::MKD),
            "PWD" => Some(FtpCommand::PWD),
            "LIST" => Some(FtpCommand::LIST),
            "NLST" => Some(FtpCommand::NLST),
            "SITE" => Some(FtpCommand::SITE),
            _ => None,
        }
    }

    /// Commands outside this set are refused until USER/PASS succeeds.
    pub fn requires_login(self) -> bool {
        !matches!(
            self,
            FtpCommand::USER
                | FtpCommand::PASS
                | FtpCommand::ACCT
                | FtpCommand::QUIT
                | FtpCommand::FEAT
                | FtpCommand::PORT
                | FtpCommand::PASV
                | FtpCommand::SYST
                | FtpCommand::HELP
                | FtpCommand::NOOP
        )
    }
}

/// Splits a raw command line into its upper-cased verb and trimmed argument.
///
/// The verb is the leading run of ASCII letters; an empty verb means the
/// line carried no command at all.
pub fn parse_command_line(line: &str) -> (String, &str) {
    let verb_len = line
        .bytes()
        .take_while(|b| b.is_ascii_alphabetic())
        .count();
    let verb = line[..verb_len].to_ascii_uppercase();
    let arg = line[verb_len..].trim();
    (verb, arg)
}
