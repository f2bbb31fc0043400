use sc_derive::sc_error;
use std::borrow::Cow;

#[sc_error]
pub enum LookupError {
    #[error("Transport error{}: {source}", format_context(.context))]
    Transport {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn read() -> Result<(), LookupError> {
    Err(std::io::Error::other("boom")).context("reading tech record")
}

fn main() {
    let _ = read();
    let _: LookupError = "fallback".into();
}
