use secman_derive::secman_error;
use std::borrow::Cow;
use std::error::Error as _;

#[secman_error]
pub enum PipelineError {
    #[error("Step failed{}: {message}", format_context(.context))]
    Step { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    // Both variants wrap the same type, which only works without `From` impls.
    #[error("Load failed{}: {cause}", format_context(.context))]
    Load {
        #[source]
        cause: Box<PipelineError>,
        context: Option<Cow<'static, str>>,
    },

    #[error("Save failed{}: {cause}", format_context(.context))]
    Save {
        #[source]
        cause: Box<PipelineError>,
        context: Option<Cow<'static, str>>,
    },
}

fn main() {
    let step = PipelineError::Step { message: "decode".into(), context: None };
    let load = PipelineError::Load { cause: Box::new(step), context: None };

    assert_eq!(load.to_string(), "Load failed: Step failed: decode");
    assert!(load.source().is_some());
}
