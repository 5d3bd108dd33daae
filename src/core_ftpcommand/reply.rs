use std::fmt;

/// A coded reply sent back on the control channel.
///
/// `detail` is the localisation key (`"AUTH.SSL"`, `"AUTH"`, ...). When a
/// reply is built with [`FtpReply::with_detail`] the message text comes
/// from the built-in catalogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FtpReply {
    code: u16,
    message: String,
    detail: Option<String>,
}

impl FtpReply {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            detail: None,
        }
    }

    pub fn with_detail(code: u16, detail: &str) -> Self {
        Self {
            code,
            message: default_message(code, detail).to_string(),
            detail: Some(detail.to_string()),
        }
    }

    /// Multi-line reply. The last line carries the final `CODE ` marker.
    pub fn multiline<I, S>(code: u16, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let message = lines
            .into_iter()
            .map(|line| line.as_ref().to_string())
            .collect::<Vec<_>>()
            .join("\n");
        Self::new(code, message)
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    pub fn is_positive(&self) -> bool {
        self.code < 400
    }

    /// Wire encoding, CRLF terminated.
    pub fn to_wire(&self) -> String {
        let lines: Vec<&str> = self.message.split('\n').map(|l| l.trim_end_matches('\r')).collect();
        let mut out = String::new();
        let last = lines.len() - 1;
        for (i, line) in lines.iter().enumerate() {
            let sep = if i == last { ' ' } else { '-' };
            out.push_str(&format!("{}{}{}\r\n", self.code, sep, line));
        }
        out
    }
}

impl fmt::Display for FtpReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{} {} [{}]", self.code, self.message, detail),
            None => write!(f, "{} {}", self.code, self.message),
        }
    }
}

fn default_message(code: u16, detail: &str) -> &'static str {
    match (code, detail) {
        (234, "AUTH.SSL") => "Command AUTH okay; starting SSL connection.",
        (234, "AUTH.TLS") => "Command AUTH okay; starting TLS connection.",
        (431, "AUTH") => "Service is unavailable, no TLS support configured.",
        (502, "AUTH") => "Command AUTH not implemented for that parameter.",
        (200, _) => "Command okay.",
        (221, _) => "Service closing control connection.",
        (226, _) => "Closing data connection. Requested file action successful.",
        (230, _) => "User logged in, proceed.",
        (250, _) => "Requested file action okay, completed.",
        (331, _) => "User name okay, need password.",
        (350, _) => "Requested file action pending further information.",
        (421, _) => "Service not available, closing control connection.",
        (425, _) => "Can't open data connection.",
        (426, _) => "Connection closed; transfer aborted.",
        (451, _) => "Requested action aborted. Local error in processing.",
        (501, _) => "Syntax error in parameters or arguments.",
        (502, _) => "Command not implemented.",
        (503, _) => "Bad sequence of commands.",
        (504, _) => "Command not implemented for that parameter.",
        (530, _) => "Not logged in.",
        (550, _) => "Requested action not taken.",
        _ => "",
    }
}
