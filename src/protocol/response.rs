//! Server replies

/// First byte of every response frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    Ok = 0x00,
    NotFound = 0x01,
    Error = 0x02,
}

/// A status plus its payload
///
/// OK carries listing JSON, picture bytes, or nothing. ERROR carries a
/// UTF-8 message of the form `KIND: detail`. NOT_FOUND is always empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: Status,
    pub payload: Option<Vec<u8>>,
}

impl Response {
    pub fn ok(payload: Option<Vec<u8>>) -> Self {
        Response {
            status: Status::Ok,
            payload,
        }
    }

    pub fn not_found() -> Self {
        Response {
            status: Status::NotFound,
            payload: None,
        }
    }

    pub fn error(message: &str) -> Self {
        Response {
            status: Status::Error,
            payload: Some(message.into()),
        }
    }

    /// Text of an ERROR response; `None` for any other status
    pub fn message(&self) -> Option<String> {
        if self.status != Status::Error {
            return None;
        }
        self.payload
            .as_deref()
            .map(|p| String::from_utf8_lossy(p).into_owned())
    }
}
