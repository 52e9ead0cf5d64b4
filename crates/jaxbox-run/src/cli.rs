use clap::Parser;
use jaxbox_common::logging::{TracingFormat, default_tracing_format};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// GPU selector: the literal `all`, or device indices like "2 5"
    pub gpus: String,

    /// Command forwarded into each container; empty keeps the image default
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,

    /// Log formatter to use
    #[arg(long, value_enum, default_value_t = default_tracing_format())]
    pub tracing: TracingFormat,
}
