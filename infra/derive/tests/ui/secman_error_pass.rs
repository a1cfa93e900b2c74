use secman_derive::secman_error;
use std::borrow::Cow;

#[secman_error]
pub enum DemoError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn read() -> Result<(), DemoError> {
    Err(std::io::Error::other("disk on fire")).context("Reading")
}

fn main() {
    let err = read().unwrap_err();
    assert!(matches!(err, DemoError::Io { context: Some(_), .. }));

    let internal: DemoError = "boom".into();
    assert_eq!(internal.to_string(), "Internal error: boom");

    let tagged: Result<(), DemoError> = Err(internal);
    let tagged = tagged.context("while testing").unwrap_err();
    assert_eq!(tagged.to_string(), "Internal error (while testing): boom");
}
