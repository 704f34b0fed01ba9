use crate::ledger::error::{BOOK_RESERVED_MARKER, INEXISTENT_BOOK_MARKER, NO_COPIES_MARKER};

pub const RESERVE_INTER_LIBRARY: &str = "RESERVE_INTER_LIBRARY";
pub const GET_NON_RETURNERS: &str = "GET_NON_RETURNERS";

/// Method tag + sender institution + at least one parameter.
const MIN_FIELDS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("empty datagram")]
    Empty,

    #[error("expected at least 3 fields, found {0}")]
    TooFewFields(usize),

    #[error("unknown method '{0}'")]
    UnknownMethod(String),

    #[error("{method} expects {expected} parameters, found {found}")]
    Arity {
        method: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("invalid number of days '{0}'")]
    InvalidNumber(String),

    #[error("field '{0}' contains the message delimiter")]
    FieldContainsDelimiter(String),
}

/// The operations one institution can ask of another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterNodeRequest {
    ReserveInterLibrary {
        username: String,
        title: String,
        author: String,
    },
    GetNonReturners {
        num_days: i32,
    },
}

impl InterNodeRequest {
    pub fn method(&self) -> &'static str {
        match self {
            Self::ReserveInterLibrary { .. } => RESERVE_INTER_LIBRARY,
            Self::GetNonReturners { .. } => GET_NON_RETURNERS,
        }
    }

    fn params(&self) -> Vec<String> {
        match self {
            Self::ReserveInterLibrary {
                username,
                title,
                author,
            } => vec![username.clone(), title.clone(), author.clone()],
            Self::GetNonReturners { num_days } => vec![num_days.to_string()],
        }
    }
}

/// A request together with the institution that sent it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub sender: String,
    pub request: InterNodeRequest,
}

/// How the initiator reads a peer's reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyOutcome {
    Reserved,
    BookUnavailable,
    Other,
}

impl ReplyOutcome {
    /// Ledger messages open with their marker; a marker inside a book title does not count.
    pub fn classify(reply: &str) -> Self {
        let reply = reply.trim_start();
        if reply.starts_with(BOOK_RESERVED_MARKER) {
            Self::Reserved
        } else if reply.starts_with(INEXISTENT_BOOK_MARKER) || reply.starts_with(NO_COPIES_MARKER)
        {
            Self::BookUnavailable
        } else {
            Self::Other
        }
    }
}

#[derive(Debug, Clone)]
pub struct MessageCodec {
    delimiter: String,
}

impl MessageCodec {
    pub fn new(delimiter: impl Into<String>) -> Self {
        Self {
            delimiter: delimiter.into(),
        }
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    pub fn encode(&self, envelope: &Envelope) -> Result<String, CodecError> {
        let mut fields = vec![
            envelope.request.method().to_string(),
            envelope.sender.clone(),
        ];
        fields.extend(envelope.request.params());

        if let Some(field) = fields.iter().find(|f| f.contains(self.delimiter.as_str())) {
            return Err(CodecError::FieldContainsDelimiter(field.clone()));
        }

        Ok(fields.join(&self.delimiter))
    }

    pub fn decode(&self, raw: &str) -> Result<Envelope, CodecError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(CodecError::Empty);
        }

        let fields: Vec<&str> = raw.split(self.delimiter.as_str()).collect();
        if fields.len() < MIN_FIELDS {
            return Err(CodecError::TooFewFields(fields.len()));
        }

        let sender = fields[1].to_string();
        let params = &fields[2..];

        let request = match fields[0] {
            RESERVE_INTER_LIBRARY => {
                expect_arity(RESERVE_INTER_LIBRARY, params, 3)?;
                InterNodeRequest::ReserveInterLibrary {
                    username: params[0].to_string(),
                    title: params[1].to_string(),
                    author: params[2].to_string(),
                }
            }
            GET_NON_RETURNERS => {
                expect_arity(GET_NON_RETURNERS, params, 1)?;
                let num_days = params[0]
                    .trim()
                    .parse::<i32>()
                    .map_err(|_| CodecError::InvalidNumber(params[0].to_string()))?;
                InterNodeRequest::GetNonReturners { num_days }
            }
            other => return Err(CodecError::UnknownMethod(other.to_string())),
        };

        Ok(Envelope { sender, request })
    }
}

fn expect_arity(method: &'static str, params: &[&str], expected: usize) -> Result<(), CodecError> {
    if params.len() != expected {
        return Err(CodecError::Arity {
            method,
            expected,
            found: params.len(),
        });
    }
    Ok(())
}
