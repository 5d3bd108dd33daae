#[derive(Eq, Hash, PartialEq, Debug, Clone, Copy)]
pub enum FtpCommand {
    USER,
    PASS,
    QUIT,
    AUTH,
    NOOP,
    SYST,
    FEAT,
    PWD,
    CWD,
    CDUP,
    TYPE,
    PASV,
    PORT,
    LIST,
    NLST,
    MKD,
    RMD,
    DELE,
    RNFR,
    RNTO,
    STOR,
    APPE,
    STOU,
    RETR,
    SITE,
}

impl FtpCommand {
    pub fn from_str(cmd: &str) -> Option<FtpCommand> {
        match cmd.to_ascii_uppercase().as_str() {
            "USER" => Some(FtpCommand::USER),
            "PASS" => Some(FtpCommand::PASS),
            "QUIT" => Some(FtpCommand::QUIT),
            "AUTH" => Some(FtpCommand::AUTH),
            "NOOP" => Some(FtpCommand::NOOP),
            "SYST" => Some(FtpCommand::SYST),
            "FEAT" => Some(FtpCommand::FEAT),
            "PWD" | "XPWD" => Some(FtpCommand::PWD),
            "CWD" | "XCWD" => Some(FtpCommand::CWD),
            "CDUP" | "XCUP" => Some(FtpCommand::CDUP),
            "TYPE" => Some(FtpCommand::TYPE),
            "PASV" => Some(FtpCommand::PASV),
            "PORT" => Some(FtpCommand::PORT),
            "LIST" => Some(FtpCommand::LIST),
            "NLST" => Some(FtpCommand::NLST),
            "MKD" | "XMKD" => Some(FtpCommand::MKD),
            "RMD" | "XRMD" => Some(FtpCommand::RMD),
            "DELE" => Some(FtpCommand::DELE),
            "RNFR" => Some(FtpCommand::RNFR),
            "RNTO" => Some(FtpCommand::RNTO),
            "STOR" => Some(FtpCommand::STOR),
            "APPE" => Some(FtpCommand::APPE),
            "STOU" => Some(FtpCommand::STOU),
            "RETR" => Some(FtpCommand::RETR),
            "SITE" => Some(FtpCommand::SITE),
            _ => None,
        }
    }

    /// Commands accepted before a successful PASS.
    pub fn requires_login(&self) -> bool {
        !matches!(
            self,
            FtpCommand::USER
                | FtpCommand::PASS
                | FtpCommand::QUIT
                | FtpCommand::AUTH
                | FtpCommand::NOOP
                | FtpCommand::SYST
                | FtpCommand::FEAT
        )
    }
}
