use chrono::{DateTime, Local};

/// One parsed control-channel line: `VERB [argument]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FtpRequest {
    verb: String,
    argument: Option<String>,
    received_at: DateTime<Local>,
}

impl FtpRequest {
    /// Parses a raw line. Returns `None` for blank lines.
    ///
    /// The verb is upper-cased; the argument keeps its case and inner
    /// spacing, only the surrounding whitespace is trimmed.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim_end_matches(['\r', '\n']).trim_start();
        if line.trim().is_empty() {
            return None;
        }

        let (verb, rest) = match line.find(' ') {
            Some(idx) => (&line[..idx], Some(&line[idx + 1..])),
            None => (line, None),
        };

        let argument = rest
            .map(str::trim)
            .filter(|arg| !arg.is_empty())
            .map(str::to_string);

        Some(Self {
            verb: verb.to_ascii_uppercase(),
            argument,
            received_at: Local::now(),
        })
    }

    pub fn verb(&self) -> &str {
        &self.verb
    }

    pub fn argument(&self) -> Option<&str> {
        self.argument.as_deref()
    }

    pub fn received_at(&self) -> DateTime<Local> {
        self.received_at
    }

    /// Line suitable for logs; passwords are masked.
    pub fn loggable(&self) -> String {
        match (&self.argument, self.verb.as_str()) {
            (Some(_), "PASS") => "PASS ****".to_string(),
            (Some(arg), _) => format!("{} {}", self.verb, arg),
            (None, _) => self.verb.clone(),
        }
    }
}
