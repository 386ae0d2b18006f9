use clap::Parser;

/// This is a confidence assessment program for imported county election results.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The JSON file describing the county and its elections.
    /// For more information about the file format, read the documentation of the
    /// election_confidence::manual module.
    #[clap(short, long, value_parser)]
    pub config: String,

    /// (file path) A reference file containing a previous assessment in JSON format. If provided, bcdq will
    /// check that the computed assessment matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the assessment will be written in JSON format to the given
    /// location. Setting this option overrides the path that may be specified in the configuration.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
