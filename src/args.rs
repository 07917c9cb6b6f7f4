use clap::Parser;

/// Cross-tabulation and chi-square tests of independence for survey responses.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The analysis plan in JSON format: the survey file, the recoding maps
    /// and the list of analyses to run. See the manual for the format.
    #[clap(short, long, value_parser)]
    pub config: String,

    /// (file path) A reference summary in JSON format. If provided, survtab will
    /// check that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path or 'stdout') If specified, the summary of all the analyses will be written
    /// in JSON format to the given location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) The survey responses. Setting this option overrides the file that may be
    /// specified in the analysis plan.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (xlsx or csv) The type of the input. Overrides the provider of the analysis plan.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// When using an Excel file, indicates the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
